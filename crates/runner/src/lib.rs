//! # Report Runner
//!
//! Orchestration on top of the pure `analytics` crate: a `SnapshotStore` that can be
//! refreshed while reports are running, and a `ReportRunner` that computes the full
//! report suite in parallel into one `ReportBundle`.

pub mod bundle;
pub mod error;
pub mod runner;
pub mod store;

pub use bundle::{CustomerReports, InventoryReports, ReportBundle, SalesReports};
pub use error::RunnerError;
pub use runner::ReportRunner;
pub use store::SnapshotStore;
