use super::descriptor::{ModuleDescriptor, ProviderDescriptor};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// In-memory form of the generated registry artifact.
///
/// The sink is responsible for rendering this into target-language source;
/// everything the rendition needs is carried here. Iteration order of the two
/// maps is first-seen order of the input descriptor lists.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RegistryArtifact {
    /// Output namespace the registry type lives in.
    pub package_name: String,
    /// Name of the generated registry type.
    pub class_name: String,
    /// File-header comment for the rendition.
    pub header: String,
    /// Whether the rendition should carry doc comments.
    pub documented: bool,
    /// Whether the provider-descriptor record type is part of the artifact.
    pub provider_record: bool,
    /// Whether the module-descriptor record type is part of the artifact.
    pub module_record: bool,
    /// Providers keyed by `implementation_id`, first-seen order.
    pub providers: IndexMap<String, ProviderDescriptor>,
    /// Modules keyed by `name`, first-seen order.
    pub modules: IndexMap<String, ModuleDescriptor>,
}

impl RegistryArtifact {
    /// Exact-key provider lookup.
    pub fn provider(&self, implementation_id: &str) -> Option<&ProviderDescriptor> {
        self.providers.get(implementation_id)
    }

    /// Exact-key module lookup.
    pub fn module(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(name)
    }

    /// Every provider whose `interfaces` contains `interface_name`, in
    /// registry iteration order.
    pub fn providers_by_interface(&self, interface_name: &str) -> Vec<&ProviderDescriptor> {
        self.providers
            .values()
            .filter(|p| p.interfaces.iter().any(|i| i == interface_name))
            .collect()
    }

    /// Every provider whose `module` equals `module_id`, in registry
    /// iteration order.
    pub fn providers_by_module(&self, module_id: &str) -> Vec<&ProviderDescriptor> {
        self.providers
            .values()
            .filter(|p| p.module == module_id)
            .collect()
    }

    pub fn all_providers(&self) -> Vec<&ProviderDescriptor> {
        self.providers.values().collect()
    }

    pub fn all_modules(&self) -> Vec<&ModuleDescriptor> {
        self.modules.values().collect()
    }
}
