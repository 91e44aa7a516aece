use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown scope level: {0}")]
    UnknownLevel(String),
    #[error("unknown time range: {0}")]
    UnknownRange(String),
    #[error("unknown view mode: {0}")]
    UnknownViewMode(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
