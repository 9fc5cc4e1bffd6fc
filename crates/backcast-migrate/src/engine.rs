//! The backward fold: one registry snapshot per version.
//!
//! The newest version's snapshot is the extracted registry, untouched. Each
//! change is then folded over a clone of the previous snapshot, in listed
//! instruction order, producing the next-older snapshot. Validation reads
//! the effective merged field set; mutation only ever touches the owning
//! class's own set.

use crate::{
    instruction::Instruction,
    version::{Version, VersionBundle},
    Error,
};
use backcast_schema::{
    node::{ClassDescriptor, EnumDescriptor, FieldDefault, FieldDescriptor},
    registry::Registry,
    types::TypeExpr,
    value::Literal,
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;
use time::Date;

///
/// InvalidInstructionError
///
/// A well-formed instruction that is semantically inconsistent with the
/// snapshot it is applied to. Any such error aborts the whole run; the
/// variants carry enough detail to pinpoint the offending instruction.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum InvalidInstructionError {
    #[error("schema '{class}' was not found")]
    ClassNotFound { class: String },

    #[error("member '{member}' already exists in enum '{enum_name}' with the same value")]
    DuplicateEnumMember { enum_name: String, member: String },

    #[error("enum '{enum_name}' was not found")]
    EnumNotFound { enum_name: String },

    #[error("field '{field}' already exists in schema '{class}'")]
    FieldAlreadyExists { class: String, field: String },

    #[error("field '{field}' was not found in schema '{class}'")]
    FieldNotFound { class: String, field: String },

    #[error("field '{field}' of schema '{class}' is only inherited; removing it here would change nothing")]
    InheritedOnlyField { class: String, field: String },

    #[error("member '{member}' was not found in enum '{enum_name}'")]
    MemberNotFound { enum_name: String, member: String },

    #[error("property '{property}' of schema '{class}': there is no such property defined in any of the migrations")]
    NoSuchProperty { class: String, property: String },

    #[error("cannot add property '{property}' to schema '{class}': a field of the same name exists")]
    PropertyCollidesWithField { class: String, property: String },

    #[error("field '{field}' of schema '{class}' already has type '{ty}'")]
    RedundantTypeChange {
        class: String,
        field: String,
        ty: TypeExpr,
    },
}

///
/// VersionSnapshot
///
/// The full registry as it stood at one version.
///

#[derive(Clone, Debug)]
pub struct VersionSnapshot {
    pub date: Date,
    pub module_name: String,
    pub registry: Registry,
}

/// Fold the bundle over the extracted head registry, newest to oldest.
/// Returns one snapshot per version, in bundle order.
pub fn migrate(head: &Registry, bundle: &VersionBundle) -> Result<Vec<VersionSnapshot>, Error> {
    let versions = bundle.versions();
    let mut snapshots = Vec::with_capacity(versions.len());

    // Property names known to the fold so far: seeded from the head models,
    // extended by adds, consumed by removals.
    let mut known_properties: BTreeMap<String, BTreeSet<String>> = head
        .classes()
        .map(|(name, class)| {
            (
                name.clone(),
                class.properties.iter().map(|p| p.name.clone()).collect(),
            )
        })
        .collect();

    let mut current = head.clone();
    snapshots.push(snapshot(&versions[0], &current));

    for pair in versions.windows(2) {
        if let Some(change) = &pair[0].change {
            for instruction in &change.instructions {
                apply(&mut current, &mut known_properties, instruction)?;
            }
        }
        snapshots.push(snapshot(&pair[1], &current));
    }

    Ok(snapshots)
}

fn snapshot(version: &Version, registry: &Registry) -> VersionSnapshot {
    VersionSnapshot {
        date: version.date,
        module_name: version.module_name(),
        registry: registry.clone(),
    }
}

fn apply(
    registry: &mut Registry,
    known_properties: &mut BTreeMap<String, BTreeSet<String>>,
    instruction: &Instruction,
) -> Result<(), Error> {
    match instruction {
        Instruction::FieldHad { class, field, edit } => {
            let effective = effective_fields(registry, class)?;
            let Some(existing) = effective.get(field) else {
                return Err(field_not_found(class, field));
            };

            if let Some(ty) = &edit.ty {
                if *ty == existing.ty {
                    return Err(InvalidInstructionError::RedundantTypeChange {
                        class: class.clone(),
                        field: field.clone(),
                        ty: ty.clone(),
                    }
                    .into());
                }
            }

            let mut updated = existing.clone();
            if let Some(ty) = &edit.ty {
                updated.ty = ty.clone();
            }
            if let Some(value) = &edit.default {
                updated.default = Some(FieldDefault::Literal(value.clone()));
            }
            if let Some(factory) = &edit.default_factory {
                updated.default = Some(FieldDefault::Factory(factory.clone()));
            }
            for (key, value) in &edit.meta {
                updated.meta.insert(*key, value.clone());
            }

            class_mut(registry, class)?.fields.overlay(updated);
        }

        Instruction::FieldDidntExist { class, field } => {
            let effective = effective_fields(registry, class)?;
            if !effective.contains(field) {
                return Err(field_not_found(class, field));
            }

            let owner = class_mut(registry, class)?;
            if owner.fields.remove(field).is_none() {
                return Err(InvalidInstructionError::InheritedOnlyField {
                    class: class.clone(),
                    field: field.clone(),
                }
                .into());
            }
        }

        Instruction::FieldExistedWith {
            class,
            field,
            ty,
            info,
        } => {
            let effective = effective_fields(registry, class)?;
            if effective.contains(field) {
                return Err(InvalidInstructionError::FieldAlreadyExists {
                    class: class.clone(),
                    field: field.clone(),
                }
                .into());
            }

            let (default, meta) = info.clone().into_default();
            let mut descriptor = FieldDescriptor::new(field, ty.clone());
            descriptor.default = default;
            for (key, value) in meta {
                descriptor.meta.insert(key, value);
            }

            class_mut(registry, class)?.fields.push(descriptor);
        }

        Instruction::EnumHad { enum_name, members } => {
            let descriptor = enum_mut(registry, enum_name)?;

            for (member, value) in members {
                check_enum_member(descriptor, enum_name, member, value)?;
                descriptor.set_member(member.clone(), value.clone());
            }
        }

        Instruction::EnumDidntHave { enum_name, member } => {
            let descriptor = enum_mut(registry, enum_name)?;

            if descriptor.remove_member(member).is_none() {
                return Err(InvalidInstructionError::MemberNotFound {
                    enum_name: enum_name.clone(),
                    member: member.clone(),
                }
                .into());
            }
        }

        Instruction::PropertyAdd { class, property } => {
            let effective = effective_fields(registry, class)?;
            if effective.contains(&property.name) {
                return Err(InvalidInstructionError::PropertyCollidesWithField {
                    class: class.clone(),
                    property: property.name.clone(),
                }
                .into());
            }

            class_mut(registry, class)?.overlay_property(property.clone());
            known_properties
                .entry(class.clone())
                .or_default()
                .insert(property.name.clone());
        }

        Instruction::PropertyRemove { class, property } => {
            let live = known_properties
                .get_mut(class)
                .is_some_and(|names| names.remove(property));
            if !live {
                return Err(InvalidInstructionError::NoSuchProperty {
                    class: class.clone(),
                    property: property.clone(),
                }
                .into());
            }

            class_mut(registry, class)?.remove_property(property);
        }
    }

    Ok(())
}

fn check_enum_member(
    descriptor: &EnumDescriptor,
    enum_name: &str,
    member: &str,
    value: &Literal,
) -> Result<(), Error> {
    let duplicate = |member: &str| InvalidInstructionError::DuplicateEnumMember {
        enum_name: enum_name.to_string(),
        member: member.to_string(),
    };

    // Re-adding a member with its existing value is a no-op in disguise;
    // sharing a value with a different member would alias it. The alias
    // check applies to overwrites as much as to new members.
    if let Some(existing) = descriptor.member(member) {
        if existing.value.same_value(value) {
            return Err(duplicate(member).into());
        }
    }
    if let Some(existing) = descriptor.member_with_value(value, member) {
        return Err(duplicate(&existing.name).into());
    }

    Ok(())
}

fn effective_fields(
    registry: &Registry,
    class: &str,
) -> Result<backcast_schema::node::FieldList, Error> {
    if registry.get_class(class).is_none() {
        return Err(InvalidInstructionError::ClassNotFound {
            class: class.to_string(),
        }
        .into());
    }

    Ok(registry.effective_fields(class)?)
}

fn class_mut<'a>(
    registry: &'a mut Registry,
    class: &str,
) -> Result<&'a mut ClassDescriptor, Error> {
    registry
        .class_mut(class)
        .ok_or_else(|| {
            InvalidInstructionError::ClassNotFound {
                class: class.to_string(),
            }
            .into()
        })
}

fn enum_mut<'a>(
    registry: &'a mut Registry,
    enum_name: &str,
) -> Result<&'a mut EnumDescriptor, Error> {
    registry
        .enum_mut(enum_name)
        .ok_or_else(|| {
            InvalidInstructionError::EnumNotFound {
                enum_name: enum_name.to_string(),
            }
            .into()
        })
}

fn field_not_found(class: &str, field: &str) -> Error {
    InvalidInstructionError::FieldNotFound {
        class: class.to_string(),
        field: field.to_string(),
    }
    .into()
}
