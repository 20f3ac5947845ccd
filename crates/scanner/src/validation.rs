//! Validation macro discovery
//!
//! A validation marker `/// @NotBlank` is only meaningful when some header
//! defines the macro with a function annotation:
//!
//! ```text
//! #define NotBlank /* Validation Function -> NotBlank */
//! ```

use headergen_core::entities::ValidationMacroTable;
use regex::Regex;
use std::sync::LazyLock;

static VALIDATION_DEFINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^[^/]*#define\s+(\w+)\s+/\*\s*Validation\s+Function\s*->\s*([^*]+?)\s*\*/")
        .ok()
});

/// Function-name fragments of validators that only apply to string fields
const STRING_ONLY_FRAGMENTS: &[&str] = &["NotBlank", "NotEmpty", "String"];

/// Parses every validation macro definition in one header's text
///
/// Commented-out lines and lines where `//` precedes the `#define` are ignored.
/// Within the text the first definition of a name wins.
pub fn parse_validation_macros(text: &str) -> ValidationMacroTable {
    let Some(re) = VALIDATION_DEFINE.as_ref() else {
        return ValidationMacroTable::new();
    };

    text.lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .filter_map(|line| re.captures(line))
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().trim();
            let function = caps.get(2)?.as_str().trim();
            Some((name.to_string(), function.to_string()))
        })
        .collect()
}

/// Whether the validator may only be attached to string-typed fields
pub fn is_string_only_validator(function: &str) -> bool {
    STRING_ONLY_FRAGMENTS
        .iter()
        .any(|fragment| function.contains(fragment))
}
