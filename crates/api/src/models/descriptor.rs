use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A concrete implementation registered against one or more interfaces.
///
/// `implementation_id` is the primary identity and must be unique across one
/// generation pass.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct ProviderDescriptor {
    pub implementation_id: String,
    pub owner_namespace: String,
    #[schemars(with = "String")]
    pub short_id: SmolStr,
    /// Fully-qualified interface names, in declaration order. May be empty
    /// (warned during extraction).
    pub interfaces: Vec<String>,
    pub singleton: bool,
    /// Interface or implementation identifiers this provider needs available.
    pub dependencies: Vec<String>,
    /// Higher wins among multiple implementations of the same interface.
    pub priority: u32,
    pub lazy: bool,
    /// Owning module identifier; empty means unassigned.
    pub module: String,
}

/// A named logical grouping of providers, itself depending on other modules.
///
/// `name` is the module's logical identity and must be unique across one
/// generation pass; it is distinct from `implementation_id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct ModuleDescriptor {
    pub implementation_id: String,
    pub owner_namespace: String,
    #[schemars(with = "String")]
    pub short_id: SmolStr,
    pub name: String,
    pub description: String,
    pub version: String,
    /// Names of other modules this module depends on.
    pub dependencies: Vec<String>,
    pub auto_load: bool,
    pub priority: u32,
}
