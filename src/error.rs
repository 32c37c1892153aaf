use thiserror::Error;

#[derive(Error, Debug)]
pub enum SoloCraftError {
    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Validation(String),

    #[error("Mission not found: {0}")]
    MissionNotFound(String),

    #[error("Insight debt not found: {0}")]
    DebtNotFound(String),

    #[error("Id prefix '{0}' matches more than one record")]
    AmbiguousId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SoloCraftError>;
