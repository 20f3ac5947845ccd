//! Field type classification
//!
//! Classification works on identifier tokens rather than substrings, so a
//! user type such as `Point` is never mistaken for `int`.

use regex::Regex;
use std::sync::LazyLock;

static OPTIONAL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:const\s+)?(?:std::)?optional\s*<\s*(.+?)\s*>$").ok());

const PRIMITIVES: &[&str] = &[
    "int", "Int", "CInt", "long", "Long", "CLong", "float", "Float", "CFloat", "double", "Double",
    "CDouble", "bool", "Bool", "CBool", "char", "Char", "CChar", "unsigned", "UInt", "CUInt",
    "short", "Short", "CShort", "signed", "size_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t",
    "int8_t", "int16_t", "int32_t", "int64_t",
];

/// How a field's value is carried through JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Primitive,
    /// Another serializable type or an enum
    Nested,
}

/// Inner type of an `optional<..>` or `std::optional<..>` wrapper
pub fn optional_inner(field_type: &str) -> Option<&str> {
    let re = OPTIONAL.as_ref()?;
    re.captures(field_type.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn is_optional(field_type: &str) -> bool {
    optional_inner(field_type).is_some()
}

fn tokens(ty: &str) -> impl Iterator<Item = &str> {
    ty.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == ':'))
        .filter(|t| !t.is_empty() && *t != "const")
        .map(|t| t.strip_prefix("std::").unwrap_or(t))
}

/// Whether the type, or the type an optional wraps, is a string
pub fn is_string_type(field_type: &str) -> bool {
    let ty = optional_inner(field_type).unwrap_or(field_type);
    tokens(ty).any(|t| t.to_ascii_lowercase().contains("string"))
}

pub fn is_primitive_type(ty: &str) -> bool {
    if ty.contains('<') {
        return false;
    }
    let mut seen = false;
    for token in tokens(ty) {
        if !PRIMITIVES.contains(&token) {
            return false;
        }
        seen = true;
    }
    seen
}

/// Classifies a bare (already unwrapped) type
pub fn classify(ty: &str) -> FieldKind {
    if is_string_type(ty) {
        FieldKind::String
    } else if is_primitive_type(ty) {
        FieldKind::Primitive
    } else {
        FieldKind::Nested
    }
}

/// Target of the `as<..>()` read for a primitive type
pub fn primitive_cast(ty: &str) -> String {
    let lower = ty.to_ascii_lowercase();
    ["bool", "int", "float", "double", "char"]
        .into_iter()
        .find(|candidate| lower.contains(candidate))
        .map_or_else(|| ty.trim().to_string(), str::to_string)
}
