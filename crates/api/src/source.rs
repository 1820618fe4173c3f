use crate::error::ApiResult;
use crate::models::Declaration;

/// External source of annotated declarations, one query per marker kind.
///
/// Implementations adapt the host build tool's symbol resolution. A returned
/// declaration with `is_valid == false` is deferred, not an error.
pub trait SymbolSource {
    /// All declarations carrying the provider marker.
    fn provider_declarations(&self) -> ApiResult<Vec<Declaration>>;

    /// All declarations carrying the module marker.
    fn module_declarations(&self) -> ApiResult<Vec<Declaration>>;
}
