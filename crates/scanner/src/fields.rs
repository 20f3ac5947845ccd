//! Data member extraction from a located class span

use crate::boundary::member_lines;
use crate::lexer::code_lines;
use crate::markers::{associate, find_markers, Lookahead, MarkerStyle, MarkerSyntax};
use crate::types::is_string_type;
use crate::validation::is_string_only_validator;
use headergen_core::config::{MarkersConfig, ScannerConfig};
use headergen_core::entities::{AccessRegion, FieldDecl, TypeSpan, ValidationMacroTable};
use regex::Regex;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::debug;

static ACCESS_LABEL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^(public|private|protected)\s*:\s*(.*)$").ok());

static FIELD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:(Public|Private|Protected)\s+)?",
        r"(const\s+)?",
        r"([A-Za-z_][A-Za-z0-9_<>*&,:\s]*?[\s*&>])\s*",
        r"([A-Za-z_][A-Za-z0-9_]*)\s*(?:\[[^\]]*\]\s*)?[;=]",
    ))
    .ok()
});

/// Leading words that start a declaration which is never a data member
const NON_FIELD_PREFIXES: &[&str] = &[
    "using",
    "typedef",
    "return",
    "friend",
    "static_assert",
    "static",
    "Static",
    "constexpr",
    "namespace",
    "template",
    "class",
    "struct",
    "enum",
    "union",
    "delete",
    "throw",
    "goto",
    "case",
];

/// A field declaration recognized on a single code line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedField {
    pub field_type: String,
    pub name: String,
    pub is_const: bool,
    /// Region set by an access prefix macro on the same line
    pub access: Option<AccessRegion>,
}

/// Parses one comment-free code line as a field declaration
pub fn parse_field_line(code: &str) -> Option<ParsedField> {
    let code = code.trim();
    if code.contains('(') || code.contains(')') {
        return None;
    }
    let first_word = code
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .next()
        .unwrap_or_default();
    if NON_FIELD_PREFIXES.contains(&first_word) {
        return None;
    }

    let caps = FIELD.as_ref()?.captures(code)?;
    let field_type = caps.get(3)?.as_str().trim().to_string();
    let name = caps.get(4)?.as_str().to_string();

    if matches!(
        name.to_ascii_lowercase().as_str(),
        "public" | "private" | "protected" | "const"
    ) {
        return None;
    }
    // `int a, b;` declares two members; only generic arguments may hold commas
    if has_top_level_comma(&field_type) {
        return None;
    }

    Some(ParsedField {
        field_type,
        name,
        is_const: caps.get(2).is_some(),
        access: caps
            .get(1)
            .and_then(|m| AccessRegion::from_str(m.as_str()).ok()),
    })
}

fn has_top_level_comma(ty: &str) -> bool {
    let mut depth = 0i32;
    for c in ty.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth <= 0 => return true,
            _ => {}
        }
    }
    false
}

/// Splits an access label off a line, e.g. `public: int x;` gives `(Public, "int x;")`
pub fn split_access_label(code: &str) -> Option<(AccessRegion, &str)> {
    let caps = ACCESS_LABEL.as_ref()?.captures(code.trim())?;
    let region = AccessRegion::from_str(caps.get(1)?.as_str()).ok()?;
    let rest = caps.get(2).map_or("", |m| m.as_str());
    Some((region, rest))
}

/// Field text with any access label removed
fn field_text(code: &str) -> &str {
    split_access_label(code).map_or(code.trim(), |(_, rest)| rest)
}

/// Extracts every data member at class-body depth 1
///
/// Key markers (`/* @Id */`, processed or not) and validation markers
/// (`/// @X` with `X` in `table`) are attached to the field they associate
/// with. String-only validators are dropped from non-string fields.
pub fn extract_fields<S: AsRef<str>>(
    lines: &[S],
    span: &TypeSpan,
    table: &ValidationMacroTable,
    markers: &MarkersConfig,
    scanner: &ScannerConfig,
) -> Vec<FieldDecl> {
    let code = code_lines(lines);
    let members = member_lines(&code, span);

    let mut fields: Vec<FieldDecl> = Vec::new();
    let mut by_line: BTreeMap<usize, usize> = BTreeMap::new();
    let mut region = AccessRegion::None;

    for &idx in &members {
        let text = code[idx].trimmed();
        if text.is_empty() {
            continue;
        }
        let mut rest = text;
        if let Some((label, after)) = split_access_label(text) {
            region = label;
            rest = after;
        }
        let Some(parsed) = parse_field_line(rest) else {
            continue;
        };
        if let Some(prefix_region) = parsed.access {
            region = prefix_region;
        }
        let mut field = FieldDecl::new(parsed.field_type, parsed.name);
        field.access = region;
        field.is_const = parsed.is_const;
        field.line = idx + 1;
        by_line.insert(field.line, fields.len());
        fields.push(field);
    }

    if fields.is_empty() {
        return fields;
    }

    let is_member = |line: usize| by_line.contains_key(&line);
    let in_body = |line: usize| line > span.start_line && line < span.end_line;
    let is_field = |text: &str| parse_field_line(field_text(text)).is_some();

    if let Ok(key) = MarkerSyntax::block(&markers.key_marker) {
        for marker in find_markers(lines, &key) {
            if !in_body(marker.line) {
                continue;
            }
            let lookahead = Lookahead::for_field(scanner.key_lookahead);
            match associate(&code, marker.line, lookahead, is_field).filter(|l| is_member(*l)) {
                Some(line) => {
                    if let Some(&i) = by_line.get(&line) {
                        fields[i].is_key = true;
                    }
                }
                None => debug!(
                    "Key marker at line {} in {} has no field",
                    marker.line, span.name
                ),
            }
        }
    }

    let mut attached: Vec<(usize, usize, String)> = Vec::new();
    for (macro_name, function) in table.iter() {
        let Ok(syntax) = MarkerSyntax::new(macro_name, MarkerStyle::DocLineUnmutated) else {
            continue;
        };
        for marker in find_markers(lines, &syntax) {
            if !in_body(marker.line) {
                continue;
            }
            let lookahead = Lookahead::for_field(scanner.validation_lookahead);
            let Some(line) = associate(&code, marker.line, lookahead, is_field) else {
                debug!(
                    "Validation marker @{macro_name} at line {} in {} has no field",
                    marker.line, span.name
                );
                continue;
            };
            let Some(&i) = by_line.get(&line) else {
                continue;
            };
            if is_string_only_validator(function) && !is_string_type(&fields[i].field_type) {
                debug!(
                    "Ignoring @{macro_name} on non-string field {}::{}",
                    span.name, fields[i].name
                );
                continue;
            }
            attached.push((i, marker.line, macro_name.to_string()));
        }
    }

    // Markers are kept in source order per field
    attached.sort_by_key(|(i, line, _)| (*i, *line));
    for (i, _, macro_name) in attached {
        if !fields[i].validation_markers.contains(&macro_name) {
            fields[i].validation_markers.push(macro_name);
        }
    }

    fields
}

/// Fields of `span` that carry the key marker, in declaration order
pub fn key_fields(fields: &[FieldDecl]) -> impl Iterator<Item = &FieldDecl> {
    fields.iter().filter(|f| f.is_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::find_type_span;
    use headergen_core::entities::TypeKind;
    use pretty_assertions::assert_eq;

    fn extract(src: &str, class: &str, table: &ValidationMacroTable) -> Vec<FieldDecl> {
        let lines: Vec<&str> = src.lines().collect();
        let span = find_type_span(&lines, class, TypeKind::Class).expect("class span");
        extract_fields(
            &lines,
            &span,
            table,
            &MarkersConfig::default(),
            &ScannerConfig::default(),
        )
    }

    fn table() -> ValidationMacroTable {
        [
            ("NotBlank".to_string(), "NotBlank".to_string()),
            ("NotNull".to_string(), "NotNull".to_string()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_parse_field_line() {
        let field = parse_field_line("optional<StdString> email;").expect("field");
        assert_eq!(field.field_type, "optional<StdString>");
        assert_eq!(field.name, "email");

        let field = parse_field_line("Public const int count = 3;").expect("field");
        assert_eq!(field.field_type, "int");
        assert!(field.is_const);
        assert_eq!(field.access, Some(AccessRegion::Public));

        let field = parse_field_line("StdMap<int, StdString> index;").expect("field");
        assert_eq!(field.field_type, "StdMap<int, StdString>");

        let field = parse_field_line("char* buffer;").expect("field");
        assert_eq!(field.field_type, "char*");
        assert_eq!(field.name, "buffer");

        assert!(parse_field_line("int GetId();").is_none());
        assert!(parse_field_line("using Id = int;").is_none());
        assert!(parse_field_line("return value;").is_none());
        assert!(parse_field_line("static int counter;").is_none());
        assert!(parse_field_line("int a, b;").is_none());
        assert!(parse_field_line("intx;").is_none());
    }

    #[test]
    fn test_access_regions_are_tracked() {
        let src = concat!(
            "class User {\n",
            "  int a;\n",
            "public:\n",
            "  int b;\n",
            "  PROTECTED:\n",
            "  int c;\n",
            "  Private int d;\n",
            "};\n",
        );
        let fields = extract(src, "User", &ValidationMacroTable::new());
        let regions: Vec<(&str, AccessRegion)> =
            fields.iter().map(|f| (f.name.as_str(), f.access)).collect();
        assert_eq!(
            regions,
            vec![
                ("a", AccessRegion::None),
                ("b", AccessRegion::Public),
                ("c", AccessRegion::Protected),
                ("d", AccessRegion::Private),
            ]
        );
    }

    #[test]
    fn test_nested_types_and_methods_are_skipped() {
        let src = concat!(
            "class User {\n",
            "  struct Meta {\n",
            "    int hidden;\n",
            "  };\n",
            "  int Get() {\n",
            "    int local = 0;\n",
            "    return local;\n",
            "  }\n",
            "  optional<int> age;\n",
            "};\n",
        );
        let names: Vec<String> = extract(src, "User", &ValidationMacroTable::new())
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["age"]);
    }

    #[test]
    fn test_key_marker_attaches_to_next_field() {
        let src = concat!(
            "class Customer {\n",
            "  /* @Id */\n",
            "\n",
            "  int id;\n",
            "  optional<StdString> email;\n",
            "};\n",
        );
        let fields = extract(src, "Customer", &ValidationMacroTable::new());
        let keys: Vec<&str> = key_fields(&fields).map(|f| f.name.as_str()).collect();
        assert_eq!(keys, vec!["id"]);
    }

    #[test]
    fn test_same_line_key_marker() {
        let src = "class Customer {\n  /* @Id */ int id;\n  int other;\n};\n";
        let fields = extract(src, "Customer", &ValidationMacroTable::new());
        assert!(fields[0].is_key);
        assert!(!fields[1].is_key);
    }

    #[test]
    fn test_key_marker_cancelled_by_method() {
        let src = "class Customer {\n  /* @Id */\n  int Get();\n  int id;\n};\n";
        let fields = extract(src, "Customer", &ValidationMacroTable::new());
        assert!(key_fields(&fields).next().is_none());
    }

    #[test]
    fn test_validation_markers_attach_in_source_order() {
        let src = concat!(
            "class Customer {\n",
            "  /// @NotNull\n",
            "  /// @NotBlank\n",
            "  optional<StdString> name;\n",
            "  /// @NotBlank\n",
            "  optional<int> age;\n",
            "  /// @Unknown\n",
            "  int other;\n",
            "};\n",
        );
        let fields = extract(src, "Customer", &table());
        assert_eq!(fields[0].validation_markers, vec!["NotNull", "NotBlank"]);
        // String-only validator on an int is dropped
        assert!(fields[1].validation_markers.is_empty());
        assert!(fields[2].validation_markers.is_empty());
    }

    #[test]
    fn test_validation_marker_cancelled_by_access_specifier() {
        let src = concat!(
            "class Customer {\n",
            "  /// @NotNull\n",
            "public:\n",
            "  optional<int> age;\n",
            "};\n",
        );
        let fields = extract(src, "Customer", &table());
        assert!(fields[0].validation_markers.is_empty());
    }
}
