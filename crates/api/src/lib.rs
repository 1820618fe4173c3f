pub mod error;
pub mod models;
pub mod sink;
pub mod source;

// Re-export commonly used types
pub use error::{ApiError, ApiResult};
pub use models::*;
pub use sink::ArtifactSink;
pub use source::SymbolSource;
