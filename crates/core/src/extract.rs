//! Scans annotated declarations and extracts descriptor metadata.
//!
//! One malformed declaration never aborts the batch: typed argument
//! accessors degrade to defaults on shape mismatch, and any error while
//! processing a single declaration is logged and skips only that
//! declaration.

use crate::cache::ChangeTracker;
use crate::config::ProcessorOptions;
use crate::diag::Diagnostics;
use crate::error::{ProcessorError, Result};
use crate::model::fqn;
use once_cell::sync::Lazy;
use regex::Regex;
use wireup_api::models::{
    AnnotationValue, Declaration, ModuleDescriptor, ProviderDescriptor,
};

pub(crate) static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+.*$").expect("version regex"));

pub const PROVIDER_PRIORITY_MAX: u32 = 1000;
pub const MODULE_PRIORITY_MAX: u32 = 100;

#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractionStats {
    pub processed_providers: usize,
    pub skipped_providers: usize,
    pub errored_providers: usize,
    pub processed_modules: usize,
    pub skipped_modules: usize,
    pub errored_modules: usize,
}

/// Result of one scan over the declaration batch.
#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    pub providers: Vec<ProviderDescriptor>,
    pub modules: Vec<ModuleDescriptor>,
    /// Declarations the symbol source could not resolve yet; returned to the
    /// caller for retry on the next incremental pass.
    pub deferred: Vec<Declaration>,
    pub stats: ExtractionStats,
}

pub struct Extractor<'a> {
    options: &'a ProcessorOptions,
    diag: &'a Diagnostics,
}

impl<'a> Extractor<'a> {
    pub fn new(options: &'a ProcessorOptions, diag: &'a Diagnostics) -> Self {
        Self { options, diag }
    }

    pub fn run(
        &self,
        provider_decls: Vec<Declaration>,
        module_decls: Vec<Declaration>,
        tracker: &mut ChangeTracker,
    ) -> ExtractionOutcome {
        let mut outcome = ExtractionOutcome::default();

        if self.options.show_progress {
            self.diag.info("processing provider declarations...");
        }
        let provider_total = provider_decls.len();
        for decl in provider_decls {
            if !decl.is_valid {
                outcome.deferred.push(decl);
                continue;
            }
            if !self.options.accepts_namespace(&decl.package_name) {
                outcome.stats.skipped_providers += 1;
                self.diag.debug(&format!(
                    "skipping {} (excluded by namespace filter)",
                    decl.qualified_name
                ));
                continue;
            }
            match self.extract_provider(&decl, tracker) {
                Ok(descriptor) => {
                    outcome.providers.push(descriptor);
                    outcome.stats.processed_providers += 1;
                    if self.options.show_progress && outcome.stats.processed_providers % 10 == 0 {
                        self.diag.progress(
                            outcome.stats.processed_providers,
                            provider_total,
                            "providers",
                        );
                    }
                }
                Err(err) => {
                    outcome.stats.errored_providers += 1;
                    self.diag.error(&format!(
                        "error while processing provider {}: {err}",
                        decl.qualified_name
                    ));
                }
            }
        }

        if self.options.show_progress {
            self.diag.info("processing module declarations...");
        }
        let module_total = module_decls.len();
        for decl in module_decls {
            if !decl.is_valid {
                outcome.deferred.push(decl);
                continue;
            }
            if !self.options.accepts_namespace(&decl.package_name) {
                outcome.stats.skipped_modules += 1;
                self.diag.debug(&format!(
                    "skipping module {} (excluded by namespace filter)",
                    decl.qualified_name
                ));
                continue;
            }
            match self.extract_module(&decl, tracker) {
                Ok(descriptor) => {
                    outcome.modules.push(descriptor);
                    outcome.stats.processed_modules += 1;
                    if self.options.show_progress && outcome.stats.processed_modules % 10 == 0 {
                        self.diag.progress(
                            outcome.stats.processed_modules,
                            module_total,
                            "modules",
                        );
                    }
                }
                Err(err) => {
                    outcome.stats.errored_modules += 1;
                    self.diag.error(&format!(
                        "error while processing module {}: {err}",
                        decl.qualified_name
                    ));
                }
            }
        }

        outcome
    }

    fn extract_provider(
        &self,
        decl: &Declaration,
        tracker: &mut ChangeTracker,
    ) -> Result<ProviderDescriptor> {
        self.diag
            .debug(&format!("processing provider {}", decl.qualified_name));

        // Change detection first: a changed unit evicts its cached symbols
        // before the dependency-reuse check below can see them.
        self.detect_change(decl, tracker);

        if !decl.has_arg("interfaces") {
            return Err(ProcessorError::Validation(format!(
                "provider {} is missing the required 'interfaces' argument",
                decl.qualified_name
            )));
        }

        let interfaces = self.list_arg(decl, "interfaces");
        let singleton = self.bool_arg(decl, "singleton", true);
        let priority = self.int_arg(decl, "priority", 0);
        let lazy = self.bool_arg(decl, "lazy", false);
        let module = self.string_arg(decl, "module", "");
        let dependencies = self.provider_dependencies(decl, tracker);

        if interfaces.is_empty() {
            self.diag.warn(&format!(
                "provider {} declares no interfaces",
                decl.qualified_name
            ));
        }
        if priority > PROVIDER_PRIORITY_MAX {
            self.diag.warn(&format!(
                "provider {} priority {priority} is outside the recommended range [0, {PROVIDER_PRIORITY_MAX}]",
                decl.qualified_name
            ));
        }
        for dependency in &dependencies {
            if dependency.trim().is_empty() {
                self.diag.warn(&format!(
                    "provider {} declares an empty dependency entry",
                    decl.qualified_name
                ));
            }
        }

        if self.options.show_detailed_validation {
            self.diag.info(&format!(
                "validated provider {}: interfaces={}, singleton={singleton}, dependencies={}, priority={priority}, lazy={lazy}, module={}",
                decl.qualified_name,
                interfaces.len(),
                dependencies.len(),
                if module.is_empty() { "<unassigned>" } else { &module },
            ));
        }

        self.record(decl, tracker);

        Ok(ProviderDescriptor {
            implementation_id: decl.qualified_name.clone(),
            owner_namespace: decl.package_name.clone(),
            short_id: decl.simple_name.clone(),
            interfaces,
            singleton,
            dependencies,
            priority,
            lazy,
            module,
        })
    }

    fn extract_module(
        &self,
        decl: &Declaration,
        tracker: &mut ChangeTracker,
    ) -> Result<ModuleDescriptor> {
        self.diag
            .debug(&format!("processing module {}", decl.qualified_name));

        self.detect_change(decl, tracker);

        if !decl.has_arg("name") {
            return Err(ProcessorError::Validation(format!(
                "module {} is missing the required 'name' argument",
                decl.qualified_name
            )));
        }

        let mut name = self.string_arg(decl, "name", decl.simple_name.as_str());
        if name.trim().is_empty() {
            self.diag.warn(&format!(
                "module {} has a blank name; falling back to its simple name",
                decl.qualified_name
            ));
            name = decl.simple_name.to_string();
        }

        let description = self.string_arg(decl, "description", "");
        let version = self.string_arg(decl, "version", "1.0.0");
        let auto_load = self.bool_arg(decl, "autoLoad", true);
        let priority = self.int_arg(decl, "priority", 0);

        // Blank module dependencies are dropped here; provider dependencies
        // are kept for the validator to reject.
        let dependencies: Vec<String> = self
            .list_arg(decl, "dependencies")
            .into_iter()
            .filter(|dep| {
                if dep.trim().is_empty() {
                    self.diag.warn(&format!(
                        "module {} declares a blank dependency entry; dropping it",
                        decl.qualified_name
                    ));
                    false
                } else {
                    true
                }
            })
            .collect();

        if !VERSION_RE.is_match(&version) {
            self.diag.warn(&format!(
                "module {} version '{version}' does not follow MAJOR.MINOR.PATCH",
                decl.qualified_name
            ));
        }
        if priority > MODULE_PRIORITY_MAX {
            self.diag.warn(&format!(
                "module {} priority {priority} is outside the recommended range [0, {MODULE_PRIORITY_MAX}]",
                decl.qualified_name
            ));
        }

        if self.options.show_detailed_validation {
            self.diag.info(&format!(
                "validated module {}: name={name}, version={version}, dependencies={}, autoLoad={auto_load}, priority={priority}",
                decl.qualified_name,
                dependencies.len(),
            ));
        }

        self.record(decl, tracker);

        Ok(ModuleDescriptor {
            implementation_id: decl.qualified_name.clone(),
            owner_namespace: if decl.package_name.is_empty() {
                fqn::package_of(&decl.qualified_name).to_string()
            } else {
                decl.package_name.clone()
            },
            short_id: decl.simple_name.clone(),
            name,
            description,
            version,
            dependencies,
            auto_load,
            priority,
        })
    }

    /// Reuse the cached dependency list when the owning unit is unchanged
    /// and the symbol was already processed; otherwise decode and cache.
    fn provider_dependencies(
        &self,
        decl: &Declaration,
        tracker: &mut ChangeTracker,
    ) -> Vec<String> {
        if self.options.enable_incremental && tracker.is_symbol_processed(&decl.qualified_name) {
            if let Some(cached) = tracker.cached_dependencies(&decl.qualified_name) {
                self.diag.debug(&format!(
                    "using cached dependencies for {}",
                    decl.qualified_name
                ));
                return cached.to_vec();
            }
        }
        let dependencies = self.list_arg(decl, "dependencies");
        if self.options.enable_incremental {
            tracker.cache_dependencies(&decl.qualified_name, &dependencies);
        }
        dependencies
    }

    fn detect_change(&self, decl: &Declaration, tracker: &mut ChangeTracker) {
        if !self.options.enable_incremental {
            return;
        }
        if let Some(unit) = &decl.unit {
            if tracker.should_reprocess(unit, self.diag) {
                self.diag
                    .debug(&format!("unit changed: {}", unit.path.display()));
            }
        }
    }

    fn record(&self, decl: &Declaration, tracker: &mut ChangeTracker) {
        if !self.options.enable_incremental {
            return;
        }
        if let Some(unit) = &decl.unit {
            tracker.record_symbol(unit, &decl.qualified_name);
        }
    }

    fn string_arg(&self, decl: &Declaration, name: &str, default: &str) -> String {
        match decl.arg(name) {
            None => default.to_string(),
            Some(AnnotationValue::Str(s)) => s.clone(),
            Some(other) => {
                self.diag.warn(&format!(
                    "argument '{name}' on {}: expected string, got {}; using coerced form",
                    decl.qualified_name,
                    other.shape()
                ));
                other.coerce_string()
            }
        }
    }

    fn bool_arg(&self, decl: &Declaration, name: &str, default: bool) -> bool {
        match decl.arg(name) {
            None => default,
            Some(AnnotationValue::Bool(b)) => *b,
            Some(other) => {
                self.diag.warn(&format!(
                    "argument '{name}' on {}: expected bool, got {}; using default {default}",
                    decl.qualified_name,
                    other.shape()
                ));
                default
            }
        }
    }

    fn int_arg(&self, decl: &Declaration, name: &str, default: u32) -> u32 {
        match decl.arg(name) {
            None => default,
            Some(AnnotationValue::Int(i)) => {
                if *i < 0 {
                    self.diag.warn(&format!(
                        "argument '{name}' on {} is negative ({i}); using default {default}",
                        decl.qualified_name
                    ));
                    default
                } else {
                    u32::try_from(*i).unwrap_or(u32::MAX)
                }
            }
            Some(other) => {
                self.diag.warn(&format!(
                    "argument '{name}' on {}: expected int, got {}; using default {default}",
                    decl.qualified_name,
                    other.shape()
                ));
                default
            }
        }
    }

    fn list_arg(&self, decl: &Declaration, name: &str) -> Vec<String> {
        match decl.arg(name) {
            None => Vec::new(),
            Some(AnnotationValue::IdentList(items)) => items.clone(),
            Some(other) => {
                self.diag.warn(&format!(
                    "argument '{name}' on {}: expected identifier list, got {}; using empty list",
                    decl.qualified_name,
                    other.shape()
                ));
                Vec::new()
            }
        }
    }
}
