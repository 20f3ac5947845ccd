//! Companion `<Repository>Impl.h` generation
//!
//! The generated class derives from both the annotated interface and the
//! storage-backed base implementation, forwards the standard operations to
//! the base, adds bodies for custom finders and registers itself through
//! `Implementation<..>` specializations.

use crate::find::generate_custom_finders;
use crate::writer::CodeWriter;
use headergen_core::config::{CodegenConfig, RepositoryConfig};
use headergen_core::entities::{MethodDecl, RepositoryDescriptor};

/// Return shape of a forwarded base operation
#[derive(Clone, Copy)]
enum Returns {
    Entity,
    OptionalEntity,
    Entities,
    Bool,
    Void,
}

impl Returns {
    fn render(self, entity: &str) -> String {
        match self {
            Returns::Entity => entity.to_string(),
            Returns::OptionalEntity => format!("optional<{entity}>"),
            Returns::Entities => format!("StdVector<{entity}>"),
            Returns::Bool => "Bool".to_string(),
            Returns::Void => "Void".to_string(),
        }
    }
}

#[derive(Clone, Copy)]
enum Param {
    Entity,
    Id,
    None,
}

/// Base operations every implementation forwards, in emission order
const DELEGATIONS: &[(&str, Returns, Param)] = &[
    ("Save", Returns::Entity, Param::Entity),
    ("FindById", Returns::OptionalEntity, Param::Id),
    ("FindAll", Returns::Entities, Param::None),
    ("Update", Returns::Entity, Param::Entity),
    ("DeleteById", Returns::Void, Param::Id),
    ("Delete", Returns::Void, Param::Entity),
    ("ExistsById", Returns::Bool, Param::Id),
];

/// Header guard for an implementation class, e.g. `_USERREPOSITORYIMPL_H_`
pub fn header_guard(descriptor: &RepositoryDescriptor) -> String {
    format!("_{}_H_", descriptor.impl_class_name().to_uppercase())
}

/// Renders the complete implementation header
pub fn generate_impl_header(
    descriptor: &RepositoryDescriptor,
    methods: &[MethodDecl],
    repository: &RepositoryConfig,
    codegen: &CodegenConfig,
) -> String {
    let class = &descriptor.class_name;
    let impl_class = descriptor.impl_class_name();
    let guard = header_guard(descriptor);
    let base_impl = &repository.base_impl;

    // Templated repositories are written against their own parameters
    let (entity, id) = if descriptor.is_templated {
        ("Entity".to_string(), "ID".to_string())
    } else {
        (descriptor.entity_type.clone(), descriptor.id_type.clone())
    };
    let base = format!("{base_impl}<{entity}, {id}>");

    let mut w = CodeWriter::new(codegen.indent.clone());
    w.line(format!("#ifndef {guard}"))
        .line(format!("#define {guard}"))
        .blank()
        .line(format!("#include \"{base_impl}.h\""))
        .blank();

    if descriptor.is_templated {
        w.line("template<typename Entity, typename ID>").open(format!(
            "class {impl_class} : public {class}<Entity, ID>, public {base} {{"
        ));
    } else {
        w.open(format!("class {impl_class} : public {class}, public {base} {{"));
    }
    w.line(format!("Public Virtual ~{impl_class}() = default;"));

    for (i, &(name, returns, param)) in DELEGATIONS.iter().enumerate() {
        if i > 0 {
            w.blank();
        }
        let (param_decl, arg) = match param {
            Param::Entity => (format!("{entity}& entity"), "entity"),
            Param::Id => (format!("{id} id"), "id"),
            Param::None => (String::new(), ""),
        };
        let call = format!("{base}::{name}({arg});");
        w.open(format!(
            "Public Virtual {} {name}({param_decl}) override {{",
            returns.render(&entity)
        ));
        match returns {
            Returns::Void => w.line(call),
            _ => w.line(format!("return {call}")),
        };
        w.close("}");
    }

    let finders = generate_custom_finders(methods, &descriptor.finder_entity_type(), codegen);
    if !finders.is_empty() {
        w.blank().extend(&finders);
    }

    let pointer = descriptor.pointer_alias();
    let constructed = if descriptor.is_templated {
        format!("{impl_class}<Entity, ID>")
    } else {
        impl_class.clone()
    };
    w.blank()
        .open(format!("Public Static {pointer} GetInstance() {{"))
        .line(format!("static {pointer} instance(new {constructed}());"))
        .line("return instance;")
        .close("}")
        .close("};")
        .blank();

    let (template_head, target) = if descriptor.is_templated {
        ("template <typename Entity, typename ID>", format!("{class}<Entity, ID>"))
    } else {
        ("template <>", class.clone())
    };
    for suffix in ["", "*"] {
        w.line(template_head)
            .open(format!("struct Implementation<{target}{suffix}> {{"))
            .line(format!("using type = {constructed}{suffix};"))
            .close("};")
            .blank();
    }
    w.line(format!("#endif // {guard}"));

    let mut text = w.render();
    text.push('\n');
    text
}
