pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Gender, MaritalStatus};
pub use error::CoreError;
pub use structs::{Customer, CustomerId, Product, ProductId, Sale, SaleId};
