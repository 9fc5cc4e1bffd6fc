//! Typed, self-validating edit instructions.
//!
//! Instructions are built through one fluent builder API
//! (`schema("Name").field("foo").had(...)`, `enum_def("Name").had(...)`)
//! and validate their own shape eagerly; semantic checks against an actual
//! registry happen in the engine.

use crate::StructureError;
use backcast_schema::{
    node::{FieldDefault, MetaKey, PropertyDescriptor},
    types::TypeExpr,
    value::Literal,
};
use serde::Serialize;

///
/// Instruction
///

#[derive(Clone, Debug, Serialize)]
#[remain::sorted]
pub enum Instruction {
    EnumDidntHave {
        enum_name: String,
        member: String,
    },
    EnumHad {
        enum_name: String,
        members: Vec<(String, Literal)>,
    },
    FieldDidntExist {
        class: String,
        field: String,
    },
    FieldExistedWith {
        class: String,
        field: String,
        ty: TypeExpr,
        info: FieldInfo,
    },
    FieldHad {
        class: String,
        field: String,
        edit: FieldEdit,
    },
    PropertyAdd {
        class: String,
        property: PropertyDescriptor,
    },
    PropertyRemove {
        class: String,
        property: String,
    },
}

///
/// FieldEdit
///
/// The attribute overrides of a `FieldHad`. Only the listed attributes are
/// touched; everything else on the field survives unchanged. Metadata keys
/// keep the order they were supplied in.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct FieldEdit {
    pub(crate) ty: Option<TypeExpr>,
    pub(crate) default: Option<Literal>,
    pub(crate) default_factory: Option<String>,
    pub(crate) meta: Vec<(MetaKey, Literal)>,
}

impl FieldEdit {
    // Not `Self::default()`: the inherent `default` builder below shadows
    // the trait method in path resolution.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ty: None,
            default: None,
            default_factory: None,
            meta: Vec::new(),
        }
    }

    #[must_use]
    pub fn ty(mut self, ty: impl Into<TypeExpr>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    #[must_use]
    pub fn default(mut self, value: impl Into<Literal>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn default_factory(mut self, factory: impl Into<String>) -> Self {
        self.default_factory = Some(factory.into());
        self
    }

    #[must_use]
    pub fn meta(mut self, key: MetaKey, value: impl Into<Literal>) -> Self {
        self.meta.push((key, value.into()));
        self
    }

    /// Metadata overrides in the order they were supplied.
    pub fn meta_entries(&self) -> impl Iterator<Item = (MetaKey, &Literal)> {
        self.meta.iter().map(|(k, v)| (*k, v))
    }

    fn is_empty(&self) -> bool {
        self.ty.is_none()
            && self.default.is_none()
            && self.default_factory.is_none()
            && self.meta.is_empty()
    }
}

///
/// FieldInfo
///
/// Full field payload of a `FieldExistedWith`: the default and metadata the
/// historical field carried (its type is a required argument of the
/// instruction itself).
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct FieldInfo {
    pub(crate) default: Option<Literal>,
    pub(crate) default_factory: Option<String>,
    pub(crate) meta: Vec<(MetaKey, Literal)>,
}

impl FieldInfo {
    // Not `Self::default()`: the inherent `default` builder below shadows
    // the trait method in path resolution.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            default: None,
            default_factory: None,
            meta: Vec::new(),
        }
    }

    #[must_use]
    pub fn default(mut self, value: impl Into<Literal>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn default_factory(mut self, factory: impl Into<String>) -> Self {
        self.default_factory = Some(factory.into());
        self
    }

    #[must_use]
    pub fn meta(mut self, key: MetaKey, value: impl Into<Literal>) -> Self {
        self.meta.push((key, value.into()));
        self
    }

    pub(crate) fn into_default(self) -> (Option<FieldDefault>, Vec<(MetaKey, Literal)>) {
        let default = match (self.default, self.default_factory) {
            (Some(value), _) => Some(FieldDefault::Literal(value)),
            (None, Some(factory)) => Some(FieldDefault::Factory(factory)),
            (None, None) => None,
        };

        (default, self.meta)
    }
}

/// Entry point for schema (model struct) instructions.
#[must_use]
pub fn schema(name: impl Into<String>) -> SchemaTarget {
    SchemaTarget { class: name.into() }
}

/// Entry point for enum instructions.
#[must_use]
pub fn enum_def(name: impl Into<String>) -> EnumTarget {
    EnumTarget {
        enum_name: name.into(),
    }
}

///
/// SchemaTarget
///

pub struct SchemaTarget {
    class: String,
}

impl SchemaTarget {
    #[must_use]
    pub fn field(self, name: impl Into<String>) -> FieldTarget {
        FieldTarget {
            class: self.class,
            field: name.into(),
        }
    }

    #[must_use]
    pub fn property(self, name: impl Into<String>) -> PropertyTarget {
        PropertyTarget {
            class: self.class,
            property: name.into(),
        }
    }
}

///
/// FieldTarget
///

pub struct FieldTarget {
    class: String,
    field: String,
}

impl FieldTarget {
    /// The field carried different attributes in the older version.
    pub fn had(self, edit: FieldEdit) -> Result<Instruction, StructureError> {
        if edit.is_empty() {
            return Err(StructureError::EmptyEdit { field: self.field });
        }
        if edit.default.is_some() && edit.default_factory.is_some() {
            return Err(StructureError::ConflictingDefault { field: self.field });
        }

        Ok(Instruction::FieldHad {
            class: self.class,
            field: self.field,
            edit,
        })
    }

    /// The field did not exist in the older version.
    #[must_use]
    pub fn didnt_exist(self) -> Instruction {
        Instruction::FieldDidntExist {
            class: self.class,
            field: self.field,
        }
    }

    /// The field existed in the older version, with the given type and info.
    pub fn existed_with(
        self,
        ty: impl Into<TypeExpr>,
        info: FieldInfo,
    ) -> Result<Instruction, StructureError> {
        if info.default.is_some() && info.default_factory.is_some() {
            return Err(StructureError::ConflictingDefault { field: self.field });
        }

        Ok(Instruction::FieldExistedWith {
            class: self.class,
            field: self.field,
            ty: ty.into(),
            info,
        })
    }
}

///
/// PropertyTarget
///

pub struct PropertyTarget {
    class: String,
    property: String,
}

impl PropertyTarget {
    /// The property existed in the older version with the given accessor.
    /// The accessor must take exactly one argument; violations fail here,
    /// before any schema is touched.
    pub fn add(self, source: &str) -> Result<Instruction, StructureError> {
        let property = PropertyDescriptor::parse(self.property, source)?;

        Ok(Instruction::PropertyAdd {
            class: self.class,
            property,
        })
    }

    /// The property did not exist in the older version.
    #[must_use]
    pub fn remove(self) -> Instruction {
        Instruction::PropertyRemove {
            class: self.class,
            property: self.property,
        }
    }
}

///
/// EnumTarget
///

pub struct EnumTarget {
    enum_name: String,
}

impl EnumTarget {
    /// The enum carried the given members in the older version.
    #[must_use]
    pub fn had(self, members: Vec<(&str, Literal)>) -> Instruction {
        Instruction::EnumHad {
            enum_name: self.enum_name,
            members: members
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    /// The enum did not have the named member in the older version.
    #[must_use]
    pub fn didnt_have(self, member: impl Into<String>) -> Instruction {
        Instruction::EnumDidntHave {
            enum_name: self.enum_name,
            member: member.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backcast_schema::types::Primitive;

    #[test]
    fn property_add_validates_arity_eagerly() {
        let err = schema("UserSchema")
            .property("bar")
            .add("pub fn bar(&self, x: Text) -> Text { x }")
            .expect_err("two arguments");

        assert_eq!(
            err.to_string(),
            "property 'bar' must have one argument and it has 2"
        );
    }

    #[test]
    fn fresh_builders_carry_no_overrides() {
        let edit = FieldEdit::new();
        assert!(edit.is_empty());

        let instruction = schema("UserSchema")
            .field("foo")
            .existed_with(Primitive::Text, FieldInfo::new())
            .expect("valid instruction");
        let Instruction::FieldExistedWith { info, .. } = instruction else {
            panic!("expected a field addition");
        };
        assert!(info.default.is_none());
        assert!(info.default_factory.is_none());
        assert!(info.meta.is_empty());
    }

    #[test]
    fn empty_field_edit_is_rejected() {
        let err = schema("UserSchema")
            .field("foo")
            .had(FieldEdit::new())
            .expect_err("empty edit");

        assert!(matches!(err, StructureError::EmptyEdit { .. }));
    }

    #[test]
    fn conflicting_defaults_are_rejected() {
        let err = schema("UserSchema")
            .field("foo")
            .had(FieldEdit::new().default(1).default_factory("mk"))
            .expect_err("both defaults");

        assert!(matches!(err, StructureError::ConflictingDefault { .. }));
    }

    #[test]
    fn builders_produce_tagged_instructions() {
        let instruction = schema("UserSchema")
            .field("foo")
            .had(FieldEdit::new().ty(Primitive::Int32))
            .expect("valid edit");

        assert!(matches!(instruction, Instruction::FieldHad { .. }));

        let instruction = enum_def("Color").didnt_have("Red");
        assert!(matches!(instruction, Instruction::EnumDidntHave { .. }));
    }
}
