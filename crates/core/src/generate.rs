//! Renders validated descriptor lists into the registry artifact.
//!
//! Output is deterministic for the same input lists: map iteration order is
//! the insertion order of the inputs, with no resorting. Any failure is
//! wrapped into the generation error variant and no partial artifact escapes.

use crate::config::ProcessorOptions;
use crate::diag::Diagnostics;
use crate::error::{ProcessorError, Result};
use crate::model::fqn;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::SystemTime;
use wireup_api::models::{ModuleDescriptor, ProviderDescriptor, RegistryArtifact};

static CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-zA-Z0-9_]*$").expect("class regex"));

pub struct RegistryGenerator<'a> {
    options: &'a ProcessorOptions,
    diag: &'a Diagnostics,
}

impl<'a> RegistryGenerator<'a> {
    pub fn new(options: &'a ProcessorOptions, diag: &'a Diagnostics) -> Self {
        Self { options, diag }
    }

    pub fn generate(
        &self,
        providers: Vec<ProviderDescriptor>,
        modules: Vec<ModuleDescriptor>,
    ) -> Result<RegistryArtifact> {
        let package_name = self.options.registry_package.as_str();
        let class_name = self.options.registry_class_name.as_str();

        // Blank packaging identifiers are hard errors; malformed but
        // non-blank values only warn and generation proceeds as given.
        if package_name.trim().is_empty() {
            return Err(ProcessorError::generation(
                "registry package name must not be blank",
            ));
        }
        if class_name.trim().is_empty() {
            return Err(ProcessorError::generation(
                "registry class name must not be blank",
            ));
        }
        if !fqn::is_valid_namespace(package_name) {
            self.diag.warn(&format!(
                "registry package name '{package_name}' looks malformed"
            ));
        }
        if !CLASS_RE.is_match(class_name) {
            self.diag.warn(&format!(
                "registry class name '{class_name}' looks malformed"
            ));
        }

        if providers.is_empty() && modules.is_empty() {
            self.diag
                .warn("creating an empty registry: no providers and no modules");
        }

        self.diag.info(&format!(
            "generating registry {package_name}.{class_name}: {} provider(s), {} module(s)",
            providers.len(),
            modules.len()
        ));

        let provider_record = !providers.is_empty();
        let module_record = !modules.is_empty();
        let header = self.header(providers.len(), modules.len());

        let mut provider_map: IndexMap<String, ProviderDescriptor> =
            IndexMap::with_capacity(providers.len());
        let mut duplicate_providers: Vec<String> = Vec::new();
        for provider in providers {
            let key = provider.implementation_id.clone();
            if provider_map.insert(key.clone(), provider).is_some()
                && !duplicate_providers.contains(&key)
            {
                duplicate_providers.push(key);
            }
        }
        if !duplicate_providers.is_empty() {
            return Err(ProcessorError::generation(format!(
                "duplicate provider implementation id(s): {}",
                duplicate_providers.join(", ")
            )));
        }

        let mut module_map: IndexMap<String, ModuleDescriptor> =
            IndexMap::with_capacity(modules.len());
        let mut duplicate_modules: Vec<String> = Vec::new();
        for module in modules {
            let key = module.name.clone();
            if module_map.insert(key.clone(), module).is_some()
                && !duplicate_modules.contains(&key)
            {
                duplicate_modules.push(key);
            }
        }
        if !duplicate_modules.is_empty() {
            return Err(ProcessorError::generation(format!(
                "duplicate module name(s): {}",
                duplicate_modules.join(", ")
            )));
        }

        let artifact = RegistryArtifact {
            package_name: package_name.to_string(),
            class_name: class_name.to_string(),
            header,
            documented: self.options.generate_documentation,
            provider_record,
            module_record,
            providers: provider_map,
            modules: module_map,
        };

        self.diag.info(&format!(
            "registry artifact ready: {}.{}",
            artifact.package_name, artifact.class_name
        ));

        Ok(artifact)
    }

    fn header(&self, provider_count: usize, module_count: usize) -> String {
        let epoch = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format!(
            "Generated by the wireup processor.\n\
             Generated at (unix): {epoch}\n\
             \n\
             Do not modify this file manually; it will be overwritten.\n\
             \n\
             Providers: {provider_count}\n\
             Modules: {module_count}"
        )
    }
}
