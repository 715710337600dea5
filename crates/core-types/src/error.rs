use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Duplicate {entity} identifier: {id}")]
    DuplicateId { entity: &'static str, id: u32 },

    #[error("Monetary value out of range: {0}")]
    OutOfRange(String),
}
