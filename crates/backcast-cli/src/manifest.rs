//! JSON version manifest.
//!
//! The manifest is the on-disk form of a version bundle: dated entries,
//! newest first, each carrying its instruction list. Parsing goes through
//! the same instruction builders the library API uses, so a manifest can
//! never produce an instruction the builders would reject.

use backcast_migrate::{
    enum_def, schema, FieldEdit, FieldInfo, Instruction, StructureError, Version, VersionBundle,
    VersionChange,
};
use backcast_schema::{node::MetaKey, types::TypeExpr, value::Literal};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error as ThisError;
use time::{macros::format_description, Date};

///
/// ManifestError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum ManifestError {
    #[error("invalid date '{date}': expected YYYY-MM-DD")]
    Date { date: String },

    #[error("manifest does not parse: {0}")]
    Json(#[from] serde_json::Error),

    #[error("'{key}' is not a recognized field metadata key")]
    MetaKey { key: String },

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error("invalid type expression '{ty}'")]
    Type { ty: String },

    #[error("unsupported literal value '{value}'")]
    Value { value: String },
}

#[derive(Debug, Deserialize)]
struct Manifest {
    versions: Vec<ManifestVersion>,
}

#[derive(Debug, Deserialize)]
struct ManifestVersion {
    date: String,

    #[serde(default)]
    description: String,

    #[serde(default)]
    instructions: Vec<ManifestInstruction>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ManifestInstruction {
    EnumDidntHave {
        #[serde(rename = "enum")]
        enum_name: String,
        member: String,
    },
    EnumHad {
        #[serde(rename = "enum")]
        enum_name: String,
        members: Vec<(String, Value)>,
    },
    FieldDidntExist {
        schema: String,
        field: String,
    },
    FieldExistedWith {
        schema: String,
        field: String,
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        default: Option<Value>,
        #[serde(default)]
        default_factory: Option<String>,
        #[serde(default)]
        meta: Vec<(String, Value)>,
    },
    FieldHad {
        schema: String,
        field: String,
        #[serde(rename = "type", default)]
        ty: Option<String>,
        #[serde(default)]
        default: Option<Value>,
        #[serde(default)]
        default_factory: Option<String>,
        #[serde(default)]
        meta: Vec<(String, Value)>,
    },
    PropertyAdd {
        schema: String,
        property: String,
        source: String,
    },
    PropertyRemove {
        schema: String,
        property: String,
    },
}

/// Parse a manifest document into a validated version bundle.
pub fn parse_manifest(text: &str) -> Result<VersionBundle, ManifestError> {
    let manifest: Manifest = serde_json::from_str(text)?;

    let mut versions = Vec::with_capacity(manifest.versions.len());
    for entry in manifest.versions {
        let date = parse_date(&entry.date)?;

        let mut instructions = Vec::with_capacity(entry.instructions.len());
        for instruction in entry.instructions {
            instructions.push(build_instruction(instruction)?);
        }

        if instructions.is_empty() {
            versions.push(Version::new(date));
        } else {
            versions.push(Version::changed(
                date,
                VersionChange::new(entry.description, instructions),
            ));
        }
    }

    Ok(VersionBundle::new(versions)?)
}

fn build_instruction(instruction: ManifestInstruction) -> Result<Instruction, ManifestError> {
    match instruction {
        ManifestInstruction::FieldHad {
            schema: name,
            field,
            ty,
            default,
            default_factory,
            meta,
        } => {
            let mut edit = FieldEdit::new();
            if let Some(ty) = ty {
                edit = edit.ty(parse_type(&ty)?);
            }
            if let Some(value) = default {
                edit = edit.default(literal(&value)?);
            }
            if let Some(factory) = default_factory {
                edit = edit.default_factory(factory);
            }
            for (key, value) in meta {
                edit = edit.meta(meta_key(&key)?, literal(&value)?);
            }

            Ok(schema(name).field(field).had(edit)?)
        }
        ManifestInstruction::FieldDidntExist {
            schema: name,
            field,
        } => Ok(schema(name).field(field).didnt_exist()),
        ManifestInstruction::FieldExistedWith {
            schema: name,
            field,
            ty,
            default,
            default_factory,
            meta,
        } => {
            let mut info = FieldInfo::new();
            if let Some(value) = default {
                info = info.default(literal(&value)?);
            }
            if let Some(factory) = default_factory {
                info = info.default_factory(factory);
            }
            for (key, value) in meta {
                info = info.meta(meta_key(&key)?, literal(&value)?);
            }

            Ok(schema(name).field(field).existed_with(parse_type(&ty)?, info)?)
        }
        ManifestInstruction::EnumHad { enum_name, members } => {
            let mut resolved = Vec::with_capacity(members.len());
            for (member, value) in &members {
                resolved.push((member.as_str(), literal(value)?));
            }

            Ok(enum_def(enum_name).had(resolved))
        }
        ManifestInstruction::EnumDidntHave { enum_name, member } => {
            Ok(enum_def(enum_name).didnt_have(member))
        }
        ManifestInstruction::PropertyAdd {
            schema: name,
            property,
            source,
        } => Ok(schema(name).property(property).add(&source)?),
        ManifestInstruction::PropertyRemove {
            schema: name,
            property,
        } => Ok(schema(name).property(property).remove()),
    }
}

fn parse_date(date: &str) -> Result<Date, ManifestError> {
    Date::parse(date, format_description!("[year]-[month]-[day]")).map_err(|_| {
        ManifestError::Date {
            date: date.to_string(),
        }
    })
}

fn parse_type(ty: &str) -> Result<TypeExpr, ManifestError> {
    TypeExpr::from_str(ty).map_err(|_| ManifestError::Type { ty: ty.to_string() })
}

fn meta_key(key: &str) -> Result<MetaKey, ManifestError> {
    MetaKey::from_str(key).map_err(|_| ManifestError::MetaKey {
        key: key.to_string(),
    })
}

/// Convert a JSON value into a literal. Objects and nulls have no literal
/// form and are rejected.
fn literal(value: &Value) -> Result<Literal, ManifestError> {
    let unsupported = || ManifestError::Value {
        value: value.to_string(),
    };

    match value {
        Value::Bool(v) => Ok(Literal::Bool(*v)),
        Value::Number(n) => n.as_i64().map_or_else(
            || n.as_f64().map(Literal::Float).ok_or_else(unsupported),
            |v| Ok(Literal::Int(v)),
        ),
        Value::String(s) => Ok(Literal::Str(s.clone())),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(literal(item)?);
            }
            Ok(Literal::List(out))
        }
        Value::Null | Value::Object(_) => Err(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "versions": [
            {
                "date": "2001-01-01",
                "description": "tighten the user schema",
                "instructions": [
                    {"kind": "field_didnt_exist", "schema": "UserSchema", "field": "age"},
                    {"kind": "field_had", "schema": "UserSchema", "field": "name",
                     "meta": [["max_length", 32], ["title", "Name"]]},
                    {"kind": "enum_had", "enum": "Color", "members": [["Blue", 3]]}
                ]
            },
            {"date": "2000-01-01"}
        ]
    }"#;

    #[test]
    fn parses_a_full_manifest() {
        let bundle = parse_manifest(MANIFEST).expect("valid manifest");
        assert_eq!(bundle.len(), 2);

        let newest = &bundle.versions()[0];
        assert_eq!(newest.module_name(), "v2001_01_01");

        let change = newest.change.as_ref().expect("change");
        assert_eq!(change.description, "tighten the user schema");
        assert_eq!(change.instructions.len(), 3);
        assert!(matches!(
            change.instructions[0],
            Instruction::FieldDidntExist { .. }
        ));

        assert!(bundle.versions()[1].change.is_none());
    }

    #[test]
    fn meta_entries_keep_manifest_order() {
        let bundle = parse_manifest(MANIFEST).expect("valid manifest");
        let change = bundle.versions()[0].change.as_ref().expect("change");

        let Instruction::FieldHad { edit, .. } = &change.instructions[1] else {
            panic!("expected a field edit");
        };
        let keys: Vec<MetaKey> = edit.meta_entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![MetaKey::MaxLength, MetaKey::Title]);
    }

    #[test]
    fn rejects_bad_dates() {
        let err = parse_manifest(r#"{"versions": [{"date": "01/01/2001"}]}"#)
            .expect_err("bad date format");
        assert!(matches!(err, ManifestError::Date { .. }));
    }

    #[test]
    fn rejects_unknown_meta_keys() {
        let text = r#"{"versions": [
            {"date": "2001-01-01", "instructions": [
                {"kind": "field_had", "schema": "S", "field": "f",
                 "meta": [["frobnicate", 1]]}
            ]},
            {"date": "2000-01-01"}
        ]}"#;

        let err = parse_manifest(text).expect_err("unknown key");
        assert!(matches!(err, ManifestError::MetaKey { .. }));
    }

    #[test]
    fn property_sources_are_validated_while_parsing() {
        let text = r#"{"versions": [
            {"date": "2001-01-01", "instructions": [
                {"kind": "property_add", "schema": "S", "property": "p",
                 "source": "pub fn p(&self, x: Text) -> Text { x }"}
            ]},
            {"date": "2000-01-01"}
        ]}"#;

        let err = parse_manifest(text).expect_err("bad arity");
        assert!(err
            .to_string()
            .contains("property 'p' must have one argument and it has 2"));
    }

    #[test]
    fn out_of_order_manifests_are_rejected() {
        let text = r#"{"versions": [
            {"date": "2000-01-01"},
            {"date": "2001-01-01"}
        ]}"#;

        let err = parse_manifest(text).expect_err("out of order");
        assert!(matches!(
            err,
            ManifestError::Structure(StructureError::UnorderedVersions { .. })
        ));
    }
}
