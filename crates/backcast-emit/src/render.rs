//! Descriptor-to-source rendering.
//!
//! The emitted text uses the same attribute grammar the extractor parses,
//! so a rendered module extracts back to the descriptors it was rendered
//! from. Field attributes render the default first, then metadata entries
//! in insertion order.

use crate::writer::SourceWriter;
use backcast_schema::{
    node::{ClassDescriptor, EnumDescriptor, FieldDefault, FieldDescriptor},
    value::Literal,
};

/// First line of every generated model file.
pub const GENERATED_BANNER: &str = "// Generated by backcast. Do not edit by hand.";

///
/// ModuleEntry
///
/// One top-level item of a module to render, in declaration order.
///

#[derive(Clone, Copy, Debug)]
pub enum ModuleEntry<'a> {
    Class(&'a ClassDescriptor),
    Enum(&'a EnumDescriptor),
    Verbatim(&'a str),
}

///
/// UnionSpec
///
/// A cross-version union artifact: one tuple variant per version module,
/// newest first, each wrapping that version's rendition of the symbol.
///

#[derive(Clone, Debug)]
pub struct UnionSpec {
    pub symbol: String,
    pub module_path: String,
    pub version_modules: Vec<String>,
}

/// Render one module: banner, then entries separated by blank lines.
#[must_use]
pub fn render_module(entries: &[ModuleEntry<'_>]) -> String {
    let mut w = SourceWriter::new();
    w.line(GENERATED_BANNER);

    for entry in entries {
        w.blank();
        match entry {
            ModuleEntry::Class(class) => render_class_into(&mut w, class),
            ModuleEntry::Enum(descriptor) => render_enum_into(&mut w, descriptor),
            ModuleEntry::Verbatim(text) => {
                for line in text.lines() {
                    w.line(line);
                }
            }
        }
    }

    w.finish()
}

#[must_use]
pub fn render_class(class: &ClassDescriptor) -> String {
    let mut w = SourceWriter::new();
    render_class_into(&mut w, class);

    w.finish()
}

#[must_use]
pub fn render_enum(descriptor: &EnumDescriptor) -> String {
    let mut w = SourceWriter::new();
    render_enum_into(&mut w, descriptor);

    w.finish()
}

/// Render a union artifact file: banner, then one union enum per spec.
#[must_use]
pub fn render_union_file(specs: &[UnionSpec]) -> String {
    let mut w = SourceWriter::new();
    w.line(GENERATED_BANNER);

    for spec in specs {
        w.blank();
        render_union_into(&mut w, spec);
    }

    w.finish()
}

#[must_use]
pub fn render_union(spec: &UnionSpec) -> String {
    let mut w = SourceWriter::new();
    render_union_into(&mut w, spec);

    w.finish()
}

fn render_union_into(w: &mut SourceWriter, spec: &UnionSpec) {
    w.line("#[model_union]");
    if spec.version_modules.is_empty() {
        w.line(format!("pub enum {} {{}}", spec.symbol));
        return;
    }

    w.line(format!("pub enum {} {{", spec.symbol));
    w.indent();
    for module in &spec.version_modules {
        let variant = variant_name(module);
        let payload = if spec.module_path.is_empty() {
            format!("crate::{module}::{}", spec.symbol)
        } else {
            format!("crate::{module}::{}::{}", spec.module_path, spec.symbol)
        };
        w.line(format!("{variant}({payload}),"));
    }
    w.dedent();
    w.line("}");
}

fn variant_name(module: &str) -> String {
    let mut chars = module.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn render_class_into(w: &mut SourceWriter, class: &ClassDescriptor) {
    if class.bases.is_empty() {
        w.line("#[model]");
    } else {
        w.line(format!("#[model(bases({}))]", class.bases.join(", ")));
    }

    if class.fields.is_empty() {
        w.line(format!("pub struct {} {{}}", class.name));
    } else {
        w.line(format!("pub struct {} {{", class.name));
        w.indent();
        for field in &class.fields {
            render_field_into(w, field);
        }
        w.dedent();
        w.line("}");
    }

    if class.properties.is_empty() {
        return;
    }

    w.blank();
    w.line(format!("impl {} {{", class.name));
    w.indent();
    for (i, property) in class.properties.iter().enumerate() {
        if i > 0 {
            w.blank();
        }
        w.line("#[accessor]");
        for line in property.lines() {
            w.line(line);
        }
    }
    w.dedent();
    w.line("}");
}

fn render_field_into(w: &mut SourceWriter, field: &FieldDescriptor) {
    let mut pieces = Vec::new();

    match &field.default {
        Some(FieldDefault::Literal(value)) => pieces.push(format!("default = {value}")),
        Some(FieldDefault::Factory(name)) => pieces.push(format!("default_factory = {name}")),
        None => {}
    }

    for (key, value) in field.meta.iter() {
        match value {
            Literal::Bool(true) => pieces.push(key.to_string()),
            Literal::List(items) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                pieces.push(format!("{key}({})", items.join(", ")));
            }
            other => pieces.push(format!("{key} = {other}")),
        }
    }

    if !pieces.is_empty() {
        w.line(format!("#[field({})]", pieces.join(", ")));
    }
    w.line(format!("pub {}: {},", field.name, field.ty));
}

fn render_enum_into(w: &mut SourceWriter, descriptor: &EnumDescriptor) {
    w.line("#[model]");

    if descriptor.members.is_empty() {
        w.line(format!("pub enum {} {{}}", descriptor.name));
        return;
    }

    w.line(format!("pub enum {} {{", descriptor.name));
    w.indent();
    for member in &descriptor.members {
        match &member.value {
            Literal::Int(value) => w.line(format!("{} = {value},", member.name)),
            other => {
                w.line(format!("#[value({other})]"));
                w.line(format!("{},", member.name));
            }
        }
    }
    w.dedent();
    w.line("}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use backcast_schema::{
        extract::extract_source,
        node::{MetaKey, PropertyDescriptor},
        types::{Primitive, TypeExpr},
    };

    fn sample_class() -> ClassDescriptor {
        let mut class = ClassDescriptor::new("UserSchema").with_base("Entity");
        class.fields.push(
            FieldDescriptor::new("name", Primitive::Text)
                .with_default(FieldDefault::Literal("anon".into()))
                .with_meta(MetaKey::MaxLength, 32.into()),
        );
        class.fields.push(
            FieldDescriptor::new("tags", TypeExpr::list(Primitive::Text.into()))
                .with_default(FieldDefault::Factory("empty_tags".to_string())),
        );
        class.fields.push(FieldDescriptor::new(
            "age",
            TypeExpr::opt(Primitive::Int32.into()),
        ));
        class
    }

    #[test]
    fn class_renders_attributes_and_fields_in_order() {
        let rendered = render_class(&sample_class());

        assert_eq!(
            rendered,
            "#[model(bases(Entity))]\n\
             pub struct UserSchema {\n    \
                 #[field(default = \"anon\", max_length = 32)]\n    \
                 pub name: Text,\n    \
                 #[field(default_factory = empty_tags)]\n    \
                 pub tags: List<Text>,\n    \
                 pub age: Opt<Int32>,\n\
             }\n"
        );
    }

    #[test]
    fn empty_class_renders_braces_on_one_line() {
        let rendered = render_class(&ClassDescriptor::new("Marker"));
        assert_eq!(rendered, "#[model]\npub struct Marker {}\n");
    }

    #[test]
    fn flag_metadata_renders_as_a_bare_key() {
        let mut class = ClassDescriptor::new("S");
        class.fields.push(
            FieldDescriptor::new("items", TypeExpr::list(Primitive::Text.into()))
                .with_meta(MetaKey::UniqueItems, true.into()),
        );

        let rendered = render_class(&class);
        assert!(rendered.contains("#[field(unique_items)]"));
    }

    #[test]
    fn list_metadata_renders_in_call_form() {
        let mut class = ClassDescriptor::new("S");
        class.fields.push(
            FieldDescriptor::new("score", Primitive::Int32)
                .with_meta(MetaKey::Include, Literal::List(vec![1.into(), 2.into()])),
        );

        let rendered = render_class(&class);
        assert!(rendered.contains("#[field(include(1, 2))]"));
    }

    #[test]
    fn properties_render_as_one_impl_block() {
        let mut class = ClassDescriptor::new("UserSchema");
        class
            .fields
            .push(FieldDescriptor::new("foo", Primitive::Text));
        class.overlay_property(
            PropertyDescriptor::parse(
                "display",
                "pub fn display(&self) -> Text {\n    self.foo.clone()\n}",
            )
            .expect("valid accessor"),
        );

        let rendered = render_class(&class);
        assert!(rendered.ends_with(
            "impl UserSchema {\n    \
                 #[accessor]\n    \
                 pub fn display(&self) -> Text {\n        \
                     self.foo.clone()\n    \
                 }\n\
             }\n"
        ));
    }

    #[test]
    fn enum_renders_discriminants_and_value_attrs() {
        let descriptor = EnumDescriptor::new("Color")
            .with_member("Red", 1)
            .with_member("Green", "g");

        assert_eq!(
            render_enum(&descriptor),
            "#[model]\n\
             pub enum Color {\n    \
                 Red = 1,\n    \
                 #[value(\"g\")]\n    \
                 Green,\n\
             }\n"
        );
    }

    #[test]
    fn union_variants_are_newest_first_and_fully_qualified() {
        let rendered = render_union_file(&[UnionSpec {
            symbol: "UserSchema".to_string(),
            module_path: "models::user".to_string(),
            version_modules: vec!["v2001_01_01".to_string(), "v2000_01_01".to_string()],
        }]);

        assert_eq!(
            rendered,
            "// Generated by backcast. Do not edit by hand.\n\n\
             #[model_union]\n\
             pub enum UserSchema {\n    \
                 V2001_01_01(crate::v2001_01_01::models::user::UserSchema),\n    \
                 V2000_01_01(crate::v2000_01_01::models::user::UserSchema),\n\
             }\n"
        );
    }

    #[test]
    fn union_without_a_module_path_qualifies_from_the_version_root() {
        let rendered = render_union(&UnionSpec {
            symbol: "Color".to_string(),
            module_path: String::new(),
            version_modules: vec!["v2000_01_01".to_string()],
        });

        assert!(rendered.contains("V2000_01_01(crate::v2000_01_01::Color),"));
    }

    #[test]
    fn rendered_modules_extract_back_to_the_same_descriptors() {
        let class = sample_class();
        let colors = EnumDescriptor::new("Color")
            .with_member("Red", 1)
            .with_member("Green", "g");

        let rendered = render_module(&[ModuleEntry::Class(&class), ModuleEntry::Enum(&colors)]);
        let extraction = extract_source(&rendered).expect("rendered output parses");

        assert_eq!(extraction.classes, vec![class]);
        assert_eq!(extraction.enums, vec![colors]);
    }

    #[test]
    fn rendering_is_reproducible() {
        let class = sample_class();
        assert_eq!(render_class(&class), render_class(&class));
    }
}
