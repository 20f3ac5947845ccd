//! Primary-key and table-name accessors

use crate::writer::CodeWriter;
use headergen_core::config::CodegenConfig;
use headergen_core::entities::FieldDecl;
use headergen_scanner::fields::key_fields;

/// `GetPrimaryKey`, `GetPrimaryKeyName` and `GetTableName`
///
/// The first key field wins. Without one, the key is an `int` zero with an
/// empty name.
pub fn generate_primary_key_methods(
    class_name: &str,
    fields: &[FieldDecl],
    config: &CodegenConfig,
) -> Vec<String> {
    let (key_type, key_expr, key_name) = match key_fields(fields).next() {
        Some(key) => (key.field_type.as_str(), key.name.as_str(), key.name.as_str()),
        None => ("int", "0", ""),
    };

    let mut w = CodeWriter::new(config.indent.clone());
    w.line("// Primary key methods")
        .open(format!("inline {key_type} GetPrimaryKey() {{"))
        .line(format!("return {key_expr};"))
        .close("}")
        .blank()
        .open("inline Static StdString GetPrimaryKeyName() {")
        .line(format!("return \"{key_name}\";"))
        .close("}")
        .blank()
        .open("inline Static StdString GetTableName() {")
        .line(format!("return \"{class_name}\";"))
        .close("}");
    w.finish()
}
