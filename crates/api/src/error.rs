#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Symbol source error: {0}")]
    Source(String),
    #[error("Artifact sink error: {0}")]
    Sink(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
