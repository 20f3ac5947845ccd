//! `Serialize`, `ValidateFields` and `Deserialize` member generation
//!
//! Only optional-wrapped fields take part in JSON conversion. Generated text
//! sits at member level with no base indentation; the injector adds the
//! class's own member indentation.

use crate::primary_key::generate_primary_key_methods;
use crate::writer::CodeWriter;
use headergen_core::config::CodegenConfig;
use headergen_core::entities::{FieldDecl, ValidationMacroTable};
use headergen_scanner::types::{classify, optional_inner, primitive_cast, FieldKind};
use std::collections::HashSet;

/// An optional field with its unwrapped type and JSON classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalField<'a> {
    pub name: &'a str,
    pub inner_type: &'a str,
    pub kind: FieldKind,
}

/// Optional fields in declaration order
pub fn optional_fields(fields: &[FieldDecl]) -> Vec<OptionalField<'_>> {
    fields
        .iter()
        .filter_map(|field| {
            let inner_type = optional_inner(&field.field_type)?;
            Some(OptionalField {
                name: &field.name,
                inner_type,
                kind: classify(inner_type),
            })
        })
        .collect()
}

/// Whether any optional field holds a nested object or enum
pub fn needs_serializer_helpers(fields: &[FieldDecl]) -> bool {
    optional_fields(fields)
        .iter()
        .any(|f| f.kind == FieldKind::Nested)
}

/// Generates every member injected into an entity class
pub struct SerializationGenerator<'a> {
    config: &'a CodegenConfig,
    table: &'a ValidationMacroTable,
}

impl<'a> SerializationGenerator<'a> {
    pub fn new(config: &'a CodegenConfig, table: &'a ValidationMacroTable) -> Self {
        Self { config, table }
    }

    fn writer(&self) -> CodeWriter {
        CodeWriter::new(self.config.indent.clone())
    }

    /// Serialize, ValidateFields, Deserialize and the primary-key accessors
    pub fn entity_members(&self, class_name: &str, fields: &[FieldDecl]) -> Vec<String> {
        let mut out = self.serialize(fields);
        out.push(String::new());
        out.extend(self.validate_fields(fields));
        out.push(String::new());
        out.extend(self.deserialize(class_name, fields));
        out.push(String::new());
        out.extend(generate_primary_key_methods(class_name, fields, self.config));
        out
    }

    pub fn serialize(&self, fields: &[FieldDecl]) -> Vec<String> {
        let ns = &self.config.serializer_namespace;
        let mut w = self.writer();
        w.line("// Serialization method");
        w.open("Public StdString Serialize() const {");
        w.line("JsonDocument doc;").blank();

        let optional = optional_fields(fields);
        if optional.is_empty() {
            w.line("// No optional fields to serialize");
        }
        for field in &optional {
            let f = field.name;
            w.open(format!("if ({f}.has_value()) {{"));
            match field.kind {
                FieldKind::String => {
                    w.line(format!("doc[\"{f}\"] = {f}.value().c_str();"));
                }
                FieldKind::Primitive => {
                    w.line(format!("doc[\"{f}\"] = {f}.value();"));
                }
                FieldKind::Nested => {
                    w.line(format!("StdString {f}_json = {ns}::SerializeValue({f}.value());"))
                        .line(format!("JsonDocument {f}_doc;"))
                        .line(format!(
                            "DeserializationError {f}_error = deserializeJson({f}_doc, {f}_json.c_str());"
                        ));
                    w.open(format!(
                        "if ({f}_error == DeserializationError::Ok && {f}_doc.is<JsonObject>()) {{"
                    ))
                    .line(format!("doc[\"{f}\"] = {f}_doc.as<JsonObject>();"))
                    .close("} else {")
                    .indent()
                    .line(format!("doc[\"{f}\"] = {f}_json.c_str();"))
                    .close("}");
                }
            }
            w.close("} else {")
                .indent()
                .line(format!("doc[\"{f}\"] = nullptr;"))
                .close("}");
        }

        w.blank()
            .line("StdString output;")
            .line("serializeJson(doc, output);")
            .line("return StdString(output.c_str());")
            .close("}");
        w.finish()
    }

    /// Fully qualified call target for a validation function
    pub fn qualified_validator(&self, function: &str) -> String {
        if function.starts_with(&self.config.root_namespace) {
            function.to_string()
        } else {
            format!("{}::{function}", self.config.validation_namespace)
        }
    }

    pub fn validate_fields(&self, fields: &[FieldDecl]) -> Vec<String> {
        let mut w = self.writer();
        w.line("// Validation method for all validation macros")
            .line("#pragma GCC diagnostic push")
            .line("#pragma GCC diagnostic ignored \"-Wunused-parameter\"")
            .line("Public template<typename DocType>")
            .open("Static StdString ValidateFields(DocType& doc) {")
            .line("StdString validationErrors;")
            .blank();

        let mut any = false;
        for (marker, function) in self.table.iter() {
            let call = self.qualified_validator(function);
            for field in fields
                .iter()
                .filter(|f| f.validation_markers.iter().any(|m| m == marker))
            {
                any = true;
                let f = &field.name;
                if let Some(inner) = optional_inner(&field.field_type) {
                    if classify(inner) == FieldKind::Nested {
                        nested_validation(&mut w, f, inner);
                    }
                }
                w.line(format!("{call}(doc, \"{f}\", validationErrors);"));
            }
        }
        if !any {
            w.line("// No validation macros defined for this class");
        }

        w.blank()
            .line("return validationErrors;")
            .close("}")
            .line("#pragma GCC diagnostic pop");
        w.finish()
    }

    pub fn deserialize(&self, class_name: &str, fields: &[FieldDecl]) -> Vec<String> {
        let validated: HashSet<&str> = fields
            .iter()
            .filter(|f| f.validation_markers.iter().any(|m| self.table.contains(m)))
            .map(|f| f.name.as_str())
            .collect();

        let mut w = self.writer();
        w.line("// Deserialization method")
            .open(format!(
                "Public Static {class_name} Deserialize(const StdString& input) {{"
            ))
            .line("JsonDocument doc;")
            .line("DeserializationError error = deserializeJson(doc, input.c_str());")
            .open("if (error) {")
            .line("StdString errorMsg = \"JSON parse error: \";")
            .line("errorMsg += error.c_str();")
            .line("throw std::runtime_error(errorMsg.c_str());")
            .close("}")
            .blank()
            .line("StdString validationErrors = ValidateFields(doc);")
            .open("if (!validationErrors.empty()) {")
            .line("throw std::runtime_error(validationErrors.c_str());")
            .close("}")
            .blank()
            .line(format!("{class_name} obj;"))
            .blank();

        let optional = optional_fields(fields);
        if optional.is_empty() {
            w.line("// No optional fields to deserialize");
        }
        for field in &optional {
            if validated.contains(field.name) {
                self.assign_field(&mut w, field);
            } else {
                w.open(format!("if (!doc[\"{}\"].isNull()) {{", field.name));
                self.assign_field(&mut w, field);
                w.close("}");
            }
        }

        w.blank().line("return obj;").close("}");
        w.finish()
    }

    fn assign_field(&self, w: &mut CodeWriter, field: &OptionalField<'_>) {
        let f = field.name;
        match field.kind {
            FieldKind::String => {
                w.line(format!(
                    "obj.{f} = StdString(doc[\"{f}\"].as<const char*>());"
                ));
            }
            FieldKind::Primitive => {
                let cast = primitive_cast(field.inner_type);
                w.line(format!("obj.{f} = doc[\"{f}\"].as<{cast}>();"));
            }
            FieldKind::Nested => {
                w.line(format!("StdString {f}_json;"))
                    .open(format!("if (doc[\"{f}\"].is<const char*>()) {{"))
                    .line(format!(
                        "{f}_json = StdString(doc[\"{f}\"].as<const char*>());"
                    ))
                    .close("} else {")
                    .indent()
                    .line(format!(
                        "JsonObject {f}_obj = doc[\"{f}\"].as<JsonObject>();"
                    ))
                    .line(format!("serializeJson({f}_obj, {f}_json);"))
                    .close("}")
                    .line(format!(
                        "obj.{f} = {}::DeserializeValue<{}>({f}_json);",
                        self.config.serializer_namespace, field.inner_type
                    ));
            }
        }
    }
}

/// Recurses into a nested object's own `ValidateFields`
fn nested_validation(w: &mut CodeWriter, f: &str, nested_type: &str) {
    w.open(format!("if (!doc[\"{f}\"].isNull()) {{"))
        .line(format!(
            "JsonObject {f}_obj = doc[\"{f}\"].template as<JsonObject>();"
        ))
        .line(format!("JsonDocument {f}_doc;"))
        .line(format!("{f}_doc.set({f}_obj);"))
        .line(format!(
            "StdString {f}_nested_errors = {nested_type}::ValidateFields({f}_doc);"
        ))
        .open(format!("if (!{f}_nested_errors.empty()) {{"))
        .line("if (!validationErrors.empty()) validationErrors += \",\\n\";")
        .line(format!(
            "validationErrors += \"Validation errors in nested object '{f}': \";"
        ))
        .line(format!("validationErrors += {f}_nested_errors;"))
        .close("}")
        .close("}");
}
