use crate::diag::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_REGISTRY_PACKAGE: &str = "com.wireup.registry";
pub const DEFAULT_REGISTRY_CLASS: &str = "ServiceRegistry";

/// Options for one processing pass, decoded from the host's flat
/// string-keyed option map. Unknown keys are ignored; malformed values fall
/// back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorOptions {
    pub registry_package: String,
    pub registry_class_name: String,
    pub enable_debug_logging: bool,
    pub log_level: LogLevel,
    pub enable_incremental: bool,
    pub validate_dependencies: bool,
    pub generate_documentation: bool,
    pub show_progress: bool,
    pub show_performance_stats: bool,
    pub show_detailed_validation: bool,
    /// Namespace prefixes to drop. Ignored when `include_packages` is set.
    pub exclude_packages: Vec<String>,
    /// Namespace prefixes to keep; takes precedence over the exclude list.
    pub include_packages: Vec<String>,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            registry_package: DEFAULT_REGISTRY_PACKAGE.to_string(),
            registry_class_name: DEFAULT_REGISTRY_CLASS.to_string(),
            enable_debug_logging: false,
            log_level: LogLevel::Info,
            enable_incremental: true,
            validate_dependencies: true,
            generate_documentation: false,
            show_progress: true,
            show_performance_stats: false,
            show_detailed_validation: false,
            exclude_packages: Vec::new(),
            include_packages: Vec::new(),
        }
    }
}

impl ProcessorOptions {
    pub fn from_map(options: &HashMap<String, String>) -> Self {
        let defaults = Self::default();

        let mut parsed = Self {
            registry_package: options
                .get("serviceRegistryPackage")
                .cloned()
                .unwrap_or(defaults.registry_package),
            registry_class_name: options
                .get("serviceRegistryClassName")
                .cloned()
                .unwrap_or(defaults.registry_class_name),
            enable_debug_logging: bool_option(options, "enableDebugLogging", false),
            log_level: options
                .get("logLevel")
                .map(|v| LogLevel::parse(v))
                .unwrap_or(LogLevel::Info),
            enable_incremental: bool_option(options, "enableIncremental", true),
            validate_dependencies: bool_option(options, "validateDependencies", true),
            generate_documentation: bool_option(options, "generateDocumentation", false),
            show_progress: bool_option(options, "showProgress", true),
            show_performance_stats: bool_option(options, "showPerformanceStats", false),
            show_detailed_validation: bool_option(options, "showDetailedValidation", false),
            exclude_packages: list_option(options, "excludePackages"),
            include_packages: list_option(options, "includePackages"),
        };

        if parsed.enable_debug_logging {
            parsed.log_level = LogLevel::Debug;
        }

        parsed
    }

    /// Namespace filter: an include list keeps only matching prefixes and
    /// takes precedence; otherwise an exclude list drops matching prefixes.
    pub fn accepts_namespace(&self, namespace: &str) -> bool {
        if !self.include_packages.is_empty() {
            return self
                .include_packages
                .iter()
                .any(|prefix| namespace.starts_with(prefix.as_str()));
        }
        if !self.exclude_packages.is_empty() {
            return !self
                .exclude_packages
                .iter()
                .any(|prefix| namespace.starts_with(prefix.as_str()));
        }
        true
    }
}

fn bool_option(options: &HashMap<String, String>, key: &str, default: bool) -> bool {
    options
        .get(key)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn list_option(options: &HashMap<String, String>, key: &str) -> Vec<String> {
    options
        .get(key)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
