//! Derived, per-run descriptions of what the scanner found in a header
//!
//! Everything here is recomputed from source text on every run. Line numbers
//! are 1-indexed throughout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

/// Kind of type definition a span was located for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TypeKind {
    Class,
    Struct,
    Enum,
}

/// Brace-balanced extent of a class, struct or enum definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpan {
    pub name: String,
    pub kind: TypeKind,
    /// Line holding the declaration keyword
    pub start_line: usize,
    /// Line holding the closing brace
    pub end_line: usize,
}

impl TypeSpan {
    /// Whether `line` falls inside the span, inclusive
    pub fn contains(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }

    /// Whether the two spans share any line
    pub fn overlaps(&self, other: &TypeSpan) -> bool {
        self.start_line <= other.end_line && other.start_line <= self.end_line
    }

    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// A single marker comment found in source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerOccurrence {
    /// Marker name without the leading `@`
    pub logical_name: String,
    pub line: usize,
    /// True when the marker is already in its processed sentinel form
    pub processed: bool,
}

/// Access region a member was declared in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AccessRegion {
    Public,
    Private,
    Protected,
    #[default]
    None,
}

/// A data member of an annotated class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Declared type, with surrounding whitespace trimmed
    pub field_type: String,
    pub name: String,
    pub access: AccessRegion,
    pub is_const: bool,
    /// Validation markers attached to this field, in source order
    pub validation_markers: Vec<String>,
    /// Whether the field carries the primary-key marker
    pub is_key: bool,
    pub line: usize,
}

impl FieldDecl {
    /// Creates a field with no markers attached
    pub fn new(field_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into().trim().to_string(),
            name: name.into(),
            access: AccessRegion::None,
            is_const: false,
            validation_markers: Vec::new(),
            is_key: false,
            line: 0,
        }
    }
}

/// A member function declared in a class body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    /// Access and modifier keywords as written, e.g. `["Public", "Virtual"]`
    pub access_modifiers: Vec<String>,
    pub return_type: String,
    pub name: String,
    /// Parameter list text between the parentheses
    pub parameter_list: String,
    pub is_const: bool,
    pub is_override: bool,
    pub is_pure: bool,
    pub line: usize,
}

/// Repository interface discovered in a header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub class_name: String,
    /// First template argument of the repository base
    pub entity_type: String,
    /// Second template argument of the repository base
    pub id_type: String,
    /// Whether the repository is itself a class template
    pub is_templated: bool,
}

impl RepositoryDescriptor {
    pub fn impl_class_name(&self) -> String {
        format!("{}Impl", self.class_name)
    }

    pub fn impl_file_name(&self) -> String {
        format!("{}.h", self.impl_class_name())
    }

    /// Smart-pointer alias introduced by the pointer macro
    pub fn pointer_alias(&self) -> String {
        format!("{}Ptr", self.class_name)
    }

    /// Entity type used inside generated finder bodies
    ///
    /// Templated repositories over a placeholder parameter refer to the
    /// template parameter `Entity`; everything else uses the concrete type.
    pub fn finder_entity_type(&self) -> String {
        if self.is_templated && matches!(self.entity_type.as_str(), "Entity" | "T" | "E") {
            "Entity".to_string()
        } else {
            self.entity_type.clone()
        }
    }
}

/// Marker name to validation function mapping, discovered once per run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationMacroTable {
    entries: BTreeMap<String, String>,
}

impl ValidationMacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a macro; the first definition of a name wins
    pub fn insert(&mut self, marker: impl Into<String>, function: impl Into<String>) -> bool {
        let marker = marker.into();
        if self.entries.contains_key(&marker) {
            return false;
        }
        self.entries.insert(marker, function.into());
        true
    }

    /// Merges another table, keeping existing definitions
    pub fn extend(&mut self, other: ValidationMacroTable) {
        for (marker, function) in other.entries {
            self.insert(marker, function);
        }
    }

    pub fn function_for(&self, marker: &str) -> Option<&str> {
        self.entries.get(marker).map(String::as_str)
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.entries.contains_key(marker)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(marker, function)| (marker.as_str(), function.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for ValidationMacroTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (marker, function) in iter {
            table.insert(marker, function);
        }
        table
    }
}
