use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Report task failed to complete: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Report group '{0}' produced no result")]
    MissingGroup(&'static str),
}
