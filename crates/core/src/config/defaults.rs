//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_KEY_MARKER: &str = "Id";
pub(crate) const DEFAULT_REPOSITORY_MARKER: &str = "Repository";
pub(crate) const DEFAULT_INDENT: &str = "    ";
pub(crate) const DEFAULT_VALIDATION_NAMESPACE: &str = "nayan::validation";
pub(crate) const DEFAULT_SERIALIZER_NAMESPACE: &str = "nayan::serializer";
pub(crate) const DEFAULT_ROOT_NAMESPACE: &str = "nayan::";
pub(crate) const DEFAULT_SERIALIZER_HEADER: &str = "<NayanSerializer.h>";
pub(crate) const DEFAULT_BASE_INTERFACE: &str = "CpaRepository";
pub(crate) const DEFAULT_BASE_IMPL: &str = "CpaRepositoryImpl";
pub(crate) const DEFAULT_POINTER_MACRO: &str = "DefineStandardPointers";
pub(crate) const DEFAULT_OUTPUT_SUBDIR: &str = "src/repository";
pub(crate) const DEFAULT_PROJECT_MARKER: &str = "platformio.ini";

pub(crate) fn default_entity_markers() -> Vec<String> {
    vec!["Entity".to_string(), "Serializable".to_string()]
}

pub(crate) fn default_key_marker() -> String {
    DEFAULT_KEY_MARKER.to_string()
}

pub(crate) fn default_repository_marker() -> String {
    DEFAULT_REPOSITORY_MARKER.to_string()
}

pub(crate) fn default_class_lookahead() -> usize {
    10
}

pub(crate) fn default_validation_lookahead() -> usize {
    10
}

pub(crate) fn default_key_lookahead() -> usize {
    15
}

pub(crate) fn default_indent() -> String {
    DEFAULT_INDENT.to_string()
}

pub(crate) fn default_validation_namespace() -> String {
    DEFAULT_VALIDATION_NAMESPACE.to_string()
}

pub(crate) fn default_serializer_namespace() -> String {
    DEFAULT_SERIALIZER_NAMESPACE.to_string()
}

pub(crate) fn default_root_namespace() -> String {
    DEFAULT_ROOT_NAMESPACE.to_string()
}

pub(crate) fn default_serializer_header() -> String {
    DEFAULT_SERIALIZER_HEADER.to_string()
}

pub(crate) fn default_base_interface() -> String {
    DEFAULT_BASE_INTERFACE.to_string()
}

pub(crate) fn default_base_impl() -> String {
    DEFAULT_BASE_IMPL.to_string()
}

pub(crate) fn default_pointer_macro() -> String {
    DEFAULT_POINTER_MACRO.to_string()
}

pub(crate) fn default_output_subdir() -> String {
    DEFAULT_OUTPUT_SUBDIR.to_string()
}

pub(crate) fn default_extensions() -> Vec<String> {
    vec![".h".to_string(), ".hpp".to_string()]
}

pub(crate) fn default_exclude_dirs() -> Vec<String> {
    [".pio", ".git", "build", ".vscode", ".idea"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}

pub(crate) fn default_skip_libraries() -> Vec<String> {
    vec!["arduinojson".to_string()]
}

pub(crate) fn default_project_marker() -> String {
    DEFAULT_PROJECT_MARKER.to_string()
}
