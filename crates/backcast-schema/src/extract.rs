//! Structural extraction from model source.
//!
//! The extractor is a static source parser: model structs and enums carry
//! `#[model(...)]` attributes, computed accessors are `#[accessor]` methods
//! in an inherent impl block. Items without a model marker are preserved
//! verbatim by span slicing, so mixed modules survive regeneration.

use crate::{
    node::{
        ClassDescriptor, EnumDescriptor, FieldDefault, FieldDescriptor, MetaKey, MetaMap,
        NodeError, PropertyDescriptor,
    },
    types::{Primitive, TypeExpr},
    value::Literal,
};
use serde::Serialize;
use std::{path::PathBuf, str::FromStr};
use syn::spanned::Spanned;
use thiserror::Error as ThisError;

///
/// CodeGenerationError
///
/// Structural mismatches found while extracting descriptors or traversing a
/// source tree. Always fatal; the run produces no output.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum CodeGenerationError {
    #[error("invalid accessor on model '{class}': {source}")]
    Accessor { class: String, source: NodeError },

    #[error("model '{class}' participates in a base cycle")]
    BaseCycle { class: String },

    #[error("field '{field}' declares both a default and a default factory")]
    ConflictingDefault { field: String },

    #[error("symbol '{name}' is defined more than once")]
    DuplicateSymbol { name: String },

    #[error("expected a directory but found a file at '{path}'")]
    ExpectedDirectory { path: PathBuf },

    #[error("base '{base}' of model '{class}' is an enum, not a model")]
    InvalidBase { class: String, base: String },

    #[error("identifier '{symbol}' must be {expected}")]
    InvalidName {
        symbol: String,
        expected: &'static str,
    },

    #[error("source does not parse: {message}")]
    Parse { message: String },

    #[error("property '{property}' of model '{class}' collides with a field of the same name")]
    PropertyCollidesWithField { class: String, property: String },

    #[error("base '{base}' of model '{class}' is not a known model")]
    UnknownBase { class: String, base: String },

    #[error("field '{field}' uses unrecognized metadata key '{key}'")]
    UnknownMetaKey { field: String, key: String },

    #[error("symbol '{name}' is not a known model or enum")]
    UnknownSymbol { name: String },

    #[error("member '{member}' of enum '{enum_name}' is not a recognized member shape")]
    UnsupportedMember { enum_name: String, member: String },

    #[error("'{name}' is not a recognized model shape: {detail}")]
    UnsupportedShape { name: String, detail: String },

    #[error("field '{field}' has an unsupported declared type")]
    UnsupportedType { field: String },

    #[error("field '{field}' carries a value that is not a supported literal")]
    UnsupportedValue { field: String },
}

///
/// SourceItem
///
/// One top-level item of a parsed module, in declaration order. Model items
/// are referenced by name and re-rendered per version; everything else is
/// carried through verbatim.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SourceItem {
    Class(String),
    Enum(String),
    Verbatim(String),
}

///
/// Extraction
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct Extraction {
    pub items: Vec<SourceItem>,
    pub classes: Vec<ClassDescriptor>,
    pub enums: Vec<EnumDescriptor>,
}

impl Extraction {
    #[must_use]
    pub fn has_models(&self) -> bool {
        !(self.classes.is_empty() && self.enums.is_empty())
    }

    /// Model and enum names in declaration order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            SourceItem::Class(name) | SourceItem::Enum(name) => Some(name.as_str()),
            SourceItem::Verbatim(_) => None,
        })
    }
}

/// Extract all model descriptors from one module's source text.
pub fn extract_source(source: &str) -> Result<Extraction, CodeGenerationError> {
    let file = syn::parse_file(source).map_err(|e| CodeGenerationError::Parse {
        message: e.to_string(),
    })?;

    let mut extraction = Extraction::default();

    // Pass 1: descriptors, so accessor impls can attach regardless of the
    // order items appear in.
    for item in &file.items {
        match item {
            syn::Item::Struct(item) if has_marker(&item.attrs, "model") => {
                extraction.classes.push(extract_class(item)?);
            }
            syn::Item::Enum(item) if has_marker(&item.attrs, "model") => {
                extraction.enums.push(extract_enum(item)?);
            }
            _ => {}
        }
    }

    // Pass 2: item order, accessors, verbatim text.
    for item in &file.items {
        match item {
            syn::Item::Struct(s) if has_marker(&s.attrs, "model") => {
                extraction.items.push(SourceItem::Class(s.ident.to_string()));
            }
            syn::Item::Enum(e) if has_marker(&e.attrs, "model") => {
                extraction.items.push(SourceItem::Enum(e.ident.to_string()));
            }
            syn::Item::Impl(block) if accessor_impl_target(block).is_some() => {
                attach_accessors(source, block, &mut extraction.classes)?;
            }
            other => {
                extraction
                    .items
                    .push(SourceItem::Verbatim(item_text(source, other.span())));
            }
        }
    }

    Ok(extraction)
}

fn has_marker(attrs: &[syn::Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

/// The self type of an inherent impl block containing `#[accessor]` items,
/// if any.
fn accessor_impl_target(block: &syn::ItemImpl) -> Option<String> {
    if block.trait_.is_some() {
        return None;
    }
    let has_accessor = block.items.iter().any(|item| match item {
        syn::ImplItem::Fn(f) => has_marker(&f.attrs, "accessor"),
        _ => false,
    });
    if !has_accessor {
        return None;
    }

    match block.self_ty.as_ref() {
        syn::Type::Path(path) => path.path.get_ident().map(ToString::to_string),
        _ => None,
    }
}

fn attach_accessors(
    source: &str,
    block: &syn::ItemImpl,
    classes: &mut [ClassDescriptor],
) -> Result<(), CodeGenerationError> {
    let target = accessor_impl_target(block).ok_or_else(|| CodeGenerationError::Parse {
        message: "accessor impl has no resolvable self type".to_string(),
    })?;

    let class = classes
        .iter_mut()
        .find(|c| c.name == target)
        .ok_or_else(|| CodeGenerationError::UnsupportedShape {
            name: target.clone(),
            detail: "accessor impl targets an item that is not a model in this module".to_string(),
        })?;

    for item in &block.items {
        let syn::ImplItem::Fn(function) = item else {
            return Err(CodeGenerationError::UnsupportedShape {
                name: target.clone(),
                detail: "accessor impl blocks may only contain accessor functions".to_string(),
            });
        };
        if !has_marker(&function.attrs, "accessor") {
            return Err(CodeGenerationError::UnsupportedShape {
                name: target.clone(),
                detail: "accessor impl blocks may only contain accessor functions".to_string(),
            });
        }

        let text: String = item_text(source, function.span())
            .lines()
            .filter(|line| line.trim() != "#[accessor]")
            .collect::<Vec<_>>()
            .join("\n");

        let property = PropertyDescriptor::parse(function.sig.ident.to_string(), &text).map_err(
            |source| CodeGenerationError::Accessor {
                class: target.clone(),
                source,
            },
        )?;
        class.properties.push(property);
    }

    Ok(())
}

fn extract_class(item: &syn::ItemStruct) -> Result<ClassDescriptor, CodeGenerationError> {
    let name = item.ident.to_string();

    if !item.generics.params.is_empty() || item.generics.where_clause.is_some() {
        return Err(CodeGenerationError::UnsupportedShape {
            name,
            detail: "generic models are not supported".to_string(),
        });
    }

    let mut class = ClassDescriptor::new(&name);
    class.bases = model_bases(&item.attrs, &name)?;

    match &item.fields {
        syn::Fields::Named(named) => {
            for field in &named.named {
                let field_name = field
                    .ident
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                let ty = parse_type_expr(&field_name, &field.ty)?;
                let (default, meta) = field_attr(&field_name, &field.attrs)?;

                let mut descriptor = FieldDescriptor::new(&field_name, ty);
                descriptor.default = default;
                descriptor.meta = meta;
                class.fields.push(descriptor);
            }
        }
        syn::Fields::Unit => {}
        syn::Fields::Unnamed(_) => {
            return Err(CodeGenerationError::UnsupportedShape {
                name,
                detail: "tuple structs are not supported".to_string(),
            });
        }
    }

    Ok(class)
}

fn extract_enum(item: &syn::ItemEnum) -> Result<EnumDescriptor, CodeGenerationError> {
    let name = item.ident.to_string();

    if !item.generics.params.is_empty() {
        return Err(CodeGenerationError::UnsupportedShape {
            name,
            detail: "generic enums are not supported".to_string(),
        });
    }
    if !model_bases(&item.attrs, &name)?.is_empty() {
        return Err(CodeGenerationError::UnsupportedShape {
            name,
            detail: "enums cannot declare bases".to_string(),
        });
    }

    let mut descriptor = EnumDescriptor::new(&name);

    for variant in &item.variants {
        let member = variant.ident.to_string();
        let unsupported = || CodeGenerationError::UnsupportedMember {
            enum_name: name.clone(),
            member: member.clone(),
        };

        if !matches!(variant.fields, syn::Fields::Unit) {
            return Err(unsupported());
        }

        let value_attr = variant.attrs.iter().find(|a| a.path().is_ident("value"));
        let value = match (&variant.discriminant, value_attr) {
            (Some((_, expr)), None) => {
                let value = literal_from_expr(&member, expr)?;
                if !matches!(value, Literal::Int(_)) {
                    return Err(unsupported());
                }
                value
            }
            (None, Some(attr)) => {
                let lit: syn::Lit = attr.parse_args().map_err(|_| unsupported())?;
                literal_from_lit(&member, &lit)?
            }
            _ => return Err(unsupported()),
        };

        descriptor.set_member(member, value);
    }

    Ok(descriptor)
}

fn model_bases(
    attrs: &[syn::Attribute],
    name: &str,
) -> Result<Vec<String>, CodeGenerationError> {
    let Some(attr) = attrs.iter().find(|a| a.path().is_ident("model")) else {
        return Ok(Vec::new());
    };

    match &attr.meta {
        syn::Meta::Path(_) => Ok(Vec::new()),
        syn::Meta::List(list) => {
            let entries = list
                .parse_args_with(
                    syn::punctuated::Punctuated::<syn::Meta, syn::Token![,]>::parse_terminated,
                )
                .map_err(|e| CodeGenerationError::Parse {
                    message: e.to_string(),
                })?;

            let mut bases = Vec::new();
            for entry in entries {
                let syn::Meta::List(inner) = &entry else {
                    return Err(unsupported_model_attr(name));
                };
                if !inner.path.is_ident("bases") {
                    return Err(unsupported_model_attr(name));
                }

                let paths = inner
                    .parse_args_with(
                        syn::punctuated::Punctuated::<syn::Path, syn::Token![,]>::parse_terminated,
                    )
                    .map_err(|e| CodeGenerationError::Parse {
                        message: e.to_string(),
                    })?;
                for path in paths {
                    let base = path
                        .get_ident()
                        .map(ToString::to_string)
                        .ok_or_else(|| unsupported_model_attr(name))?;
                    bases.push(base);
                }
            }

            Ok(bases)
        }
        syn::Meta::NameValue(_) => Err(unsupported_model_attr(name)),
    }
}

fn unsupported_model_attr(name: &str) -> CodeGenerationError {
    CodeGenerationError::UnsupportedShape {
        name: name.to_string(),
        detail: "unsupported entry in #[model(...)] attribute".to_string(),
    }
}

fn field_attr(
    field: &str,
    attrs: &[syn::Attribute],
) -> Result<(Option<FieldDefault>, MetaMap), CodeGenerationError> {
    let Some(attr) = attrs.iter().find(|a| a.path().is_ident("field")) else {
        return Ok((None, MetaMap::new()));
    };

    let mut default = None;
    let mut meta = MetaMap::new();

    let syn::Meta::List(list) = &attr.meta else {
        return Ok((None, MetaMap::new()));
    };
    let entries = list
        .parse_args_with(syn::punctuated::Punctuated::<syn::Meta, syn::Token![,]>::parse_terminated)
        .map_err(|e| CodeGenerationError::Parse {
            message: e.to_string(),
        })?;

    for entry in entries {
        match entry {
            syn::Meta::Path(path) => {
                let key = meta_key(field, &path)?;
                meta.insert(key, Literal::Bool(true));
            }
            syn::Meta::NameValue(nv) => {
                if nv.path.is_ident("default") {
                    set_default(
                        field,
                        &mut default,
                        FieldDefault::Literal(literal_from_expr(field, &nv.value)?),
                    )?;
                } else if nv.path.is_ident("default_factory") {
                    let syn::Expr::Path(factory) = &nv.value else {
                        return Err(CodeGenerationError::UnsupportedValue {
                            field: field.to_string(),
                        });
                    };
                    let factory = factory.path.get_ident().map(ToString::to_string).ok_or(
                        CodeGenerationError::UnsupportedValue {
                            field: field.to_string(),
                        },
                    )?;
                    set_default(field, &mut default, FieldDefault::Factory(factory))?;
                } else {
                    let key = meta_key(field, &nv.path)?;
                    meta.insert(key, literal_from_expr(field, &nv.value)?);
                }
            }
            syn::Meta::List(inner) => {
                let key = meta_key(field, &inner.path)?;
                let exprs = inner
                    .parse_args_with(
                        syn::punctuated::Punctuated::<syn::Expr, syn::Token![,]>::parse_terminated,
                    )
                    .map_err(|e| CodeGenerationError::Parse {
                        message: e.to_string(),
                    })?;

                let mut items = Vec::new();
                for expr in &exprs {
                    items.push(literal_from_expr(field, expr)?);
                }
                meta.insert(key, Literal::List(items));
            }
        }
    }

    Ok((default, meta))
}

fn set_default(
    field: &str,
    slot: &mut Option<FieldDefault>,
    value: FieldDefault,
) -> Result<(), CodeGenerationError> {
    if slot.is_some() {
        return Err(CodeGenerationError::ConflictingDefault {
            field: field.to_string(),
        });
    }
    *slot = Some(value);

    Ok(())
}

fn meta_key(field: &str, path: &syn::Path) -> Result<MetaKey, CodeGenerationError> {
    let ident = path
        .get_ident()
        .map(ToString::to_string)
        .unwrap_or_default();

    MetaKey::from_str(&ident).map_err(|_| CodeGenerationError::UnknownMetaKey {
        field: field.to_string(),
        key: ident,
    })
}

/// Parse a declared field type: a primitive name, an `Opt<...>`/`List<...>`
/// wrapper, or a bare model/enum reference.
pub fn parse_type_expr(field: &str, ty: &syn::Type) -> Result<TypeExpr, CodeGenerationError> {
    let unsupported = || CodeGenerationError::UnsupportedType {
        field: field.to_string(),
    };

    let syn::Type::Path(path) = ty else {
        return Err(unsupported());
    };
    if path.qself.is_some() || path.path.segments.len() != 1 {
        return Err(unsupported());
    }

    let segment = &path.path.segments[0];
    let ident = segment.ident.to_string();

    match &segment.arguments {
        syn::PathArguments::None => Primitive::from_str(&ident)
            .map_or_else(|_| Ok(TypeExpr::Model(ident)), |p| Ok(TypeExpr::Primitive(p))),
        syn::PathArguments::AngleBracketed(args) if args.args.len() == 1 => {
            let syn::GenericArgument::Type(inner) = &args.args[0] else {
                return Err(unsupported());
            };
            let inner = parse_type_expr(field, inner)?;

            match ident.as_str() {
                "Opt" => Ok(TypeExpr::opt(inner)),
                "List" => Ok(TypeExpr::list(inner)),
                _ => Err(unsupported()),
            }
        }
        _ => Err(unsupported()),
    }
}

fn literal_from_expr(field: &str, expr: &syn::Expr) -> Result<Literal, CodeGenerationError> {
    match expr {
        syn::Expr::Lit(lit) => literal_from_lit(field, &lit.lit),
        syn::Expr::Unary(unary) if matches!(unary.op, syn::UnOp::Neg(_)) => {
            match literal_from_expr(field, &unary.expr)? {
                Literal::Int(v) => Ok(Literal::Int(-v)),
                Literal::Float(v) => Ok(Literal::Float(-v)),
                _ => Err(CodeGenerationError::UnsupportedValue {
                    field: field.to_string(),
                }),
            }
        }
        syn::Expr::Array(array) => {
            let mut items = Vec::new();
            for element in &array.elems {
                items.push(literal_from_expr(field, element)?);
            }
            Ok(Literal::List(items))
        }
        _ => Err(CodeGenerationError::UnsupportedValue {
            field: field.to_string(),
        }),
    }
}

fn literal_from_lit(field: &str, lit: &syn::Lit) -> Result<Literal, CodeGenerationError> {
    let unsupported = || CodeGenerationError::UnsupportedValue {
        field: field.to_string(),
    };

    match lit {
        syn::Lit::Bool(v) => Ok(Literal::Bool(v.value)),
        syn::Lit::Int(v) => v.base10_parse().map(Literal::Int).map_err(|_| unsupported()),
        syn::Lit::Float(v) => v
            .base10_parse()
            .map(Literal::Float)
            .map_err(|_| unsupported()),
        syn::Lit::Str(v) => Ok(Literal::Str(v.value())),
        _ => Err(unsupported()),
    }
}

/// Slice the original text of one item out of the source, using span line
/// and column information.
fn item_text(source: &str, span: proc_macro2::Span) -> String {
    let start = span.start();
    let end = span.end();
    let lines: Vec<&str> = source.lines().collect();

    if start.line == 0 || start.line > lines.len() || end.line > lines.len() {
        return String::new();
    }

    if start.line == end.line {
        let line = lines[start.line - 1];
        return line[col_to_byte(line, start.column)..col_to_byte(line, end.column)].to_string();
    }

    let mut out = Vec::with_capacity(end.line - start.line + 1);
    let first = lines[start.line - 1];
    out.push(&first[col_to_byte(first, start.column)..]);
    for line in &lines[start.line..end.line - 1] {
        out.push(line);
    }
    let last = lines[end.line - 1];
    out.push(&last[..col_to_byte(last, end.column)]);

    out.join("\n")
}

fn col_to_byte(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map_or(line.len(), |(offset, _)| offset)
}
