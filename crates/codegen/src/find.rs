//! Bodies for custom `FindBy<Field>` repository methods
//!
//! A finder loads every entity through `FindAll()` and compares the named
//! field against the method's first parameter. The return type decides
//! whether the first match, all matches or a default value comes back.

use crate::writer::CodeWriter;
use headergen_core::config::CodegenConfig;
use headergen_core::entities::MethodDecl;
use headergen_scanner::naming::{
    extract_find_by_variable, extract_parameter_name, method_name_to_action, Action,
};
use regex::Regex;
use std::sync::LazyLock;
use strum_macros::Display;
use tracing::debug;

static TRAILING_IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*\s*$").ok());

/// Methods every generated implementation already delegates to its base
pub const DELEGATED_METHODS: &[&str] = &[
    "Save",
    "FindById",
    "FindAll",
    "Update",
    "DeleteById",
    "Delete",
    "ExistsById",
];

/// What a finder hands back, read off its declared return type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FinderReturn {
    /// `optional<..>`: first match or `std::nullopt`
    Optional,
    /// A vector: every match
    Collection,
    /// Bare entity: first match or a default-constructed entity
    Single,
}

impl FinderReturn {
    pub fn of(return_type: &str) -> Self {
        if return_type.contains("optional") || return_type.contains("Optional") {
            FinderReturn::Optional
        } else if ["StdVector", "vector", "Vector"]
            .iter()
            .any(|v| return_type.contains(v))
        {
            FinderReturn::Collection
        } else {
            FinderReturn::Single
        }
    }
}

/// Decomposition of a custom repository method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderPlan {
    pub action: Action,
    /// Entity field compared against the parameter, in camelCase
    pub variable: String,
    pub parameter: String,
}

/// Declaration text as written, used by the name helpers
fn declaration_text(decl: &MethodDecl) -> String {
    let mut parts: Vec<&str> = decl.access_modifiers.iter().map(String::as_str).collect();
    parts.push(&decl.return_type);
    format!("{} {}({})", parts.join(" "), decl.name, decl.parameter_list)
}

/// Decomposes a method into action, field and parameter
///
/// Returns `None` when any of the three cannot be recovered.
pub fn plan_finder(decl: &MethodDecl) -> Option<FinderPlan> {
    let action = method_name_to_action(&decl.name)?;
    let text = declaration_text(decl);
    let variable = extract_find_by_variable(&text)?;
    let parameter = extract_parameter_name(&text)?;
    Some(FinderPlan {
        action,
        variable,
        parameter,
    })
}

/// Access prefix for the generated override
///
/// An explicit `Public`/`Private`/`Protected` is kept and followed by
/// `Virtual` when declared so; a lone `Virtual` stays as is; no access
/// keyword at all means `Public`.
pub fn finder_access(decl: &MethodDecl) -> String {
    let mut modifiers = decl.access_modifiers.iter().map(String::as_str);
    match modifiers.next() {
        Some(access @ ("Public" | "Private" | "Protected")) => {
            if modifiers.next() == Some("Virtual") {
                format!("{access} Virtual")
            } else {
                access.to_string()
            }
        }
        Some("Virtual") => "Virtual".to_string(),
        _ => "Public".to_string(),
    }
}

/// Parameter list with the first declared name swapped for `parameter`
fn parameter_declaration(decl: &MethodDecl, parameter: &str) -> String {
    let params = decl.parameter_list.trim();
    match TRAILING_IDENTIFIER.as_ref() {
        Some(re) if !params.is_empty() => re.replace(params, parameter).into_owned(),
        _ => params.to_string(),
    }
}

/// Generates the override body for one custom method
///
/// Only `Find` actions produce a body.
pub fn generate_finder(
    decl: &MethodDecl,
    entity_type: &str,
    config: &CodegenConfig,
) -> Option<Vec<String>> {
    if DELEGATED_METHODS.contains(&decl.name.as_str()) {
        return None;
    }
    let Some(plan) = plan_finder(decl) else {
        debug!("{} is not a recognizable finder", decl.name);
        return None;
    };
    if plan.action != Action::Find {
        debug!("No body generated for {} action {}", plan.action, decl.name);
        return None;
    }

    let returns = FinderReturn::of(&decl.return_type);
    let (var, param) = (&plan.variable, &plan.parameter);
    let mut w = CodeWriter::new(config.indent.clone());
    w.open(format!(
        "{} {} {}({}) override {{",
        finder_access(decl),
        decl.return_type,
        decl.name,
        parameter_declaration(decl, param)
    ))
    .line(format!("StdVector<{entity_type}> entities = FindAll();"));

    let on_match = match returns {
        FinderReturn::Collection => {
            w.line(format!("StdVector<{entity_type}> result;"));
            "result.push_back(entity);"
        }
        FinderReturn::Optional | FinderReturn::Single => "return entity;",
    };
    w.open("for (const auto& entity : entities) {")
        .open(format!("if (entity.{var} == {param}) {{"))
        .line(on_match)
        .close("}")
        .close("}");

    match returns {
        FinderReturn::Optional => {
            w.line("return std::nullopt;");
        }
        FinderReturn::Collection => {
            w.line("return result;");
        }
        FinderReturn::Single => {
            w.line("// Not found: fall back to a default-constructed entity")
                .line(format!("return {entity_type}();"));
        }
    }
    w.close("}");
    Some(w.finish())
}

/// Bodies for every custom finder, separated by blank lines
pub fn generate_custom_finders(
    methods: &[MethodDecl],
    entity_type: &str,
    config: &CodegenConfig,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for body in methods
        .iter()
        .filter_map(|m| generate_finder(m, entity_type, config))
    {
        if !out.is_empty() {
            out.push(String::new());
        }
        out.extend(body);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decl(modifiers: &[&str], ret: &str, name: &str, params: &str) -> MethodDecl {
        MethodDecl {
            access_modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
            return_type: ret.to_string(),
            name: name.to_string(),
            parameter_list: params.to_string(),
            is_const: false,
            is_override: false,
            is_pure: true,
            line: 0,
        }
    }

    #[test]
    fn test_optional_finder() {
        let method = decl(
            &["Public", "Virtual"],
            "optional<Entity>",
            "FindByLastName",
            "CStdString& lastName",
        );
        let lines = generate_finder(&method, "Entity", &CodegenConfig::default()).expect("body");
        assert_eq!(
            lines,
            vec![
                "Public Virtual optional<Entity> FindByLastName(CStdString& lastName) override {",
                "    StdVector<Entity> entities = FindAll();",
                "    for (const auto& entity : entities) {",
                "        if (entity.lastName == lastName) {",
                "            return entity;",
                "        }",
                "    }",
                "    return std::nullopt;",
                "}",
            ]
        );
    }

    #[test]
    fn test_bare_return_without_access_defaults_to_public() {
        let method = decl(&[], "Entity", "FindByUsername", "CStdString& username");
        let text = generate_finder(&method, "User", &CodegenConfig::default())
            .expect("body")
            .join("\n");
        assert!(text.starts_with("Public Entity FindByUsername(CStdString& username) override {"));
        assert!(text.contains("if (entity.username == username) {"));
        assert!(text.contains("StdVector<User> entities = FindAll();"));
        assert!(text.ends_with("    return User();\n}"));
    }

    #[test]
    fn test_collection_finder_collects_matches() {
        let method = decl(&["Public", "Virtual"], "StdVector<Entity>", "FindByStatus", "int status");
        let text = generate_finder(&method, "Entity", &CodegenConfig::default())
            .expect("body")
            .join("\n");
        assert!(text.contains("StdVector<Entity> result;"));
        assert!(text.contains("result.push_back(entity);"));
        assert!(text.contains("return result;"));
    }

    #[test]
    fn test_non_find_actions_and_delegated_names_are_skipped() {
        let config = CodegenConfig::default();
        let delete = decl(&["Public", "Virtual"], "Void", "DeleteByName", "CStdString& name");
        assert!(generate_finder(&delete, "Entity", &config).is_none());
        let find_by_id = decl(&["Public", "Virtual"], "optional<Entity>", "FindById", "ID id");
        assert!(generate_finder(&find_by_id, "Entity", &config).is_none());
        let helper = decl(&["Public"], "int", "Helper", "int x");
        assert!(generate_finder(&helper, "Entity", &config).is_none());
    }

    #[test]
    fn test_finder_access() {
        let cases = [
            (vec!["Public", "Virtual"], "Public Virtual"),
            (vec!["Protected"], "Protected"),
            (vec!["Virtual"], "Virtual"),
            (vec!["Public", "Static"], "Public"),
            (vec![], "Public"),
        ];
        for (modifiers, expected) in cases {
            let method = decl(&modifiers, "Entity", "FindByX", "int x");
            assert_eq!(finder_access(&method), expected);
        }
    }

    #[test]
    fn test_custom_finders_are_separated_by_blank_lines() {
        let methods = vec![
            decl(&["Public", "Virtual"], "optional<Entity>", "FindByEmail", "CStdString& email"),
            decl(&["Public", "Virtual"], "Void", "DeleteByEmail", "CStdString& email"),
            decl(&["Public", "Virtual"], "Entity", "FindByAge", "int age"),
        ];
        let lines = generate_custom_finders(&methods, "Entity", &CodegenConfig::default());
        let headers: Vec<&String> = lines.iter().filter(|l| l.ends_with("override {")).collect();
        assert_eq!(headers.len(), 2);
        let blanks = lines.iter().filter(|l| l.is_empty()).count();
        assert_eq!(blanks, 1);
    }

    #[test]
    fn test_finder_return_classification() {
        assert_eq!(FinderReturn::of("optional<User>"), FinderReturn::Optional);
        assert_eq!(FinderReturn::of("StdVector<User>"), FinderReturn::Collection);
        assert_eq!(FinderReturn::of("std::vector<User>"), FinderReturn::Collection);
        assert_eq!(FinderReturn::of("User"), FinderReturn::Single);
    }
}
