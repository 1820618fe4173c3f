pub mod fqn;

// Re-export the shared API models the pipeline operates on.
pub use wireup_api::models::{
    AnnotationValue, Declaration, MarkerKind, ModuleDescriptor, ProviderDescriptor,
    RegistryArtifact, SourceUnit,
};
