//! Repository method name decomposition
//!
//! Custom repository methods follow the `<Action>By<Field>` convention,
//! e.g. `FindByLastName` is a `Find` over the `lastName` field.

use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use strum_macros::{Display, EnumIter, EnumString};

static ACTION_PREFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([A-Z][a-z]+)By").ok());

static DECLARED_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?:Public|Private|Protected|Virtual)?\s*(?:Virtual\s+|Static\s+)?[A-Za-z_][A-Za-z0-9_<>:&*,\s]+\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(",
    )
    .ok()
});

static FIND_BY: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)^FindBy(.+)$").ok());

static FIRST_PARAMETERS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\(([^)]*)\)").ok());

static TRAILING_IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*$").ok());

/// Repository actions recognized in method names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Action {
    Find,
    Delete,
    Save,
    Update,
    Exists,
    Count,
}

/// Lowercases the first character only
pub fn pascal_to_camel(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Maps a method name onto its action
///
/// `<Action>By...` is accepted for any action, as are the exact names
/// `<Action>`, `<Action>All` and `<Action>ById`.
pub fn method_name_to_action(name: &str) -> Option<Action> {
    if name.is_empty() {
        return None;
    }

    if let Some(caps) = ACTION_PREFIX.as_ref().and_then(|re| re.captures(name)) {
        if let Ok(action) = Action::from_str(&caps[1]) {
            return Some(action);
        }
    }

    let base = name
        .strip_suffix("ById")
        .or_else(|| name.strip_suffix("All"))
        .unwrap_or(name);
    Action::from_str(base).ok()
}

/// Method name of a full declaration, e.g. `FindByRollNo` out of
/// `Public Virtual Entity FindByRollNo(int rollNo) = 0;`
pub fn extract_method_name(declaration: &str) -> Option<String> {
    let re = DECLARED_NAME.as_ref()?;
    re.captures(declaration)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Field a `FindBy<Suffix>` method filters on, in camelCase
///
/// Accepts either a bare method name or a full declaration.
pub fn extract_find_by_variable(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let name = extract_method_name(input).unwrap_or_else(|| input.to_string());
    let caps = FIND_BY.as_ref()?.captures(&name)?;
    let suffix = caps.get(1)?.as_str();
    Some(pascal_to_camel(suffix))
}

/// Name of the first parameter in a declaration
///
/// The parameter list is split on the first comma, so a first parameter whose
/// type carries a comma inside template arguments yields the identifier that
/// precedes that comma.
pub fn extract_parameter_name(declaration: &str) -> Option<String> {
    let caps = FIRST_PARAMETERS.as_ref()?.captures(declaration)?;
    let parameters = caps.get(1)?.as_str().trim();
    if parameters.is_empty() {
        return None;
    }
    let first = parameters.split(',').next().unwrap_or_default();
    // Drop a default argument
    let first = first.split('=').next().unwrap_or_default().trim();
    TRAILING_IDENTIFIER
        .as_ref()?
        .captures(first)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn test_pascal_to_camel() {
        assert_eq!(pascal_to_camel("LastName"), "lastName");
        assert_eq!(pascal_to_camel("ID"), "iD");
        assert_eq!(pascal_to_camel("already"), "already");
        assert_eq!(pascal_to_camel(""), "");
    }

    #[test]
    fn test_method_name_to_action_table() {
        let cases = [
            ("FindByLastName", Some(Action::Find)),
            ("DeleteById", Some(Action::Delete)),
            ("Save", Some(Action::Save)),
            ("CountByStatus", Some(Action::Count)),
            ("RandomHelper", None),
            ("FindAll", Some(Action::Find)),
            ("ExistsById", Some(Action::Exists)),
            ("UpdateAll", Some(Action::Update)),
            ("Saved", None),
            ("LookupByName", None),
            ("", None),
        ];
        for (name, expected) in cases {
            assert_eq!(method_name_to_action(name), expected, "{name}");
        }
    }

    #[test]
    fn test_every_action_round_trips_through_its_name() {
        for action in Action::iter() {
            assert_eq!(method_name_to_action(&action.to_string()), Some(action));
        }
    }

    #[test]
    fn test_extract_find_by_variable() {
        assert_eq!(extract_find_by_variable("FindByLastName").as_deref(), Some("lastName"));
        assert_eq!(
            extract_find_by_variable("Public Virtual Entity FindByRollNo(int rollNo) = 0;")
                .as_deref(),
            Some("rollNo")
        );
        assert_eq!(extract_find_by_variable("findbyname").as_deref(), Some("name"));
        assert_eq!(extract_find_by_variable("DeleteByName"), None);
        assert_eq!(extract_find_by_variable("FindBy"), None);
        assert_eq!(extract_find_by_variable("  "), None);
    }

    #[test]
    fn test_extract_method_name() {
        assert_eq!(
            extract_method_name("Entity FindByUsername(CStdString& username) = 0;").as_deref(),
            Some("FindByUsername")
        );
        assert_eq!(
            extract_method_name("Public Virtual optional<Entity> FindById(ID id);").as_deref(),
            Some("FindById")
        );
        assert_eq!(extract_method_name("FindByName"), None);
    }

    #[test]
    fn test_extract_parameter_name() {
        let cases = [
            ("Public Virtual SomeClass FindByName(string xyz);", Some("xyz")),
            ("Public Virtual SomeClass FindByName(std::string abcf_ffd);", Some("abcf_ffd")),
            ("Public Virtual Entity Save(Entity& entity);", Some("entity")),
            ("Entity FindByUsername(CStdString& username) = 0;", Some("username")),
            ("Entity FindByAge(int age = 18);", Some("age")),
            ("StdVector<Entity> FindAll();", None),
            ("no parens here", None),
        ];
        for (decl, expected) in cases {
            assert_eq!(extract_parameter_name(decl).as_deref(), expected, "{decl}");
        }
    }

    #[test]
    fn test_parameter_with_generic_comma_yields_inner_identifier() {
        // Splitting on the first comma cuts through the template arguments
        assert_eq!(
            extract_parameter_name("Entity FindByKey(StdMap<int, StdString> key);").as_deref(),
            Some("int")
        );
    }
}
