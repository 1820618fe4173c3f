use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Symbol source error: {0}")]
    SymbolSource(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Dependency cycle error: {0}")]
    DependencyCycle(String),
    #[error("Registry generation failed: {message}")]
    Generation {
        message: String,
        #[source]
        source: Option<Box<ProcessorError>>,
    },
    #[error("Artifact sink error: {0}")]
    Sink(String),
}

impl ProcessorError {
    pub fn generation(message: impl Into<String>) -> Self {
        ProcessorError::Generation {
            message: message.into(),
            source: None,
        }
    }

    pub fn generation_caused_by(message: impl Into<String>, cause: ProcessorError) -> Self {
        ProcessorError::Generation {
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }
}

impl From<wireup_api::ApiError> for ProcessorError {
    fn from(err: wireup_api::ApiError) -> Self {
        match err {
            wireup_api::ApiError::Source(msg) => ProcessorError::SymbolSource(msg),
            wireup_api::ApiError::Sink(msg) => ProcessorError::Sink(msg),
            other => ProcessorError::SymbolSource(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProcessorError>;
