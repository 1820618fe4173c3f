use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::path::PathBuf;

/// Which marker annotation a declaration was discovered through.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Provider,
    Module,
}

/// A raw annotation argument as reported by the symbol source.
///
/// Decoding into descriptor fields happens in the extractor; unexpected shapes
/// degrade to defaults there, never here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationValue {
    Str(String),
    Bool(bool),
    Int(i64),
    IdentList(Vec<String>),
}

impl AnnotationValue {
    /// Human-readable shape name used in type-mismatch warnings.
    pub fn shape(&self) -> &'static str {
        match self {
            AnnotationValue::Str(_) => "string",
            AnnotationValue::Bool(_) => "bool",
            AnnotationValue::Int(_) => "int",
            AnnotationValue::IdentList(_) => "identifier list",
        }
    }

    /// Best-effort string form, used when a string argument carries an
    /// unexpected shape.
    pub fn coerce_string(&self) -> String {
        match self {
            AnnotationValue::Str(s) => s.clone(),
            AnnotationValue::Bool(b) => b.to_string(),
            AnnotationValue::Int(i) => i.to_string(),
            AnnotationValue::IdentList(items) => items.join(","),
        }
    }
}

/// The source unit (file) that owns a declaration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct SourceUnit {
    pub path: PathBuf,
    /// UNIX timestamp of the unit's last modification, as observed by the
    /// symbol source.
    pub last_modified: u64,
}

/// One annotated declaration handed over by the external symbol source.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct Declaration {
    /// Fully-qualified name of the declaring type.
    pub qualified_name: String,
    pub package_name: String,
    #[schemars(with = "String")]
    pub simple_name: SmolStr,
    pub marker: MarkerKind,
    /// Raw annotation arguments in declaration order.
    pub args: Vec<(String, AnnotationValue)>,
    /// False when the symbol source could not fully resolve the declaration
    /// yet; such declarations are deferred to a later incremental pass.
    pub is_valid: bool,
    pub unit: Option<SourceUnit>,
}

impl Declaration {
    pub fn arg(&self, name: &str) -> Option<&AnnotationValue> {
        self.args
            .iter()
            .find(|(arg_name, _)| arg_name == name)
            .map(|(_, value)| value)
    }

    pub fn has_arg(&self, name: &str) -> bool {
        self.arg(name).is_some()
    }
}
