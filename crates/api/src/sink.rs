use crate::error::ApiResult;
use crate::models::RegistryArtifact;

/// Persists a fully-formed registry artifact.
///
/// The sink owns rendering and storage (typically writing a generated source
/// file); the processor never hands it a partial artifact.
pub trait ArtifactSink {
    fn write(&mut self, artifact: &RegistryArtifact) -> ApiResult<()>;
}
