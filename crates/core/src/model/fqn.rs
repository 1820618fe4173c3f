//! Helpers for splitting and checking qualified type names.

/// Namespace portion of a qualified name, empty when unqualified.
pub fn package_of(qualified_name: &str) -> &str {
    match qualified_name.rfind('.') {
        Some(idx) if idx > 0 => &qualified_name[..idx],
        _ => "",
    }
}

/// Last segment of a qualified name.
pub fn simple_name_of(qualified_name: &str) -> &str {
    match qualified_name.rfind('.') {
        Some(idx) => &qualified_name[idx + 1..],
        None => qualified_name,
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Every dot-separated segment must be a well-formed identifier.
pub fn is_valid_type_name(name: &str) -> bool {
    if name.trim().is_empty() {
        return false;
    }
    name.split('.').all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if is_ident_start(first) => chars.all(is_ident_part),
            _ => false,
        }
    })
}

/// Empty namespaces are valid; non-empty ones follow the same segment rules.
pub fn is_valid_namespace(namespace: &str) -> bool {
    if namespace.is_empty() {
        return true;
    }
    is_valid_type_name(namespace)
}
