use configuration::ConfigError;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid analytics settings: {0}")]
    InvalidSettings(#[from] ConfigError),

    #[error("Invalid input data: {0}")]
    InvalidInput(#[from] CoreError),
}
