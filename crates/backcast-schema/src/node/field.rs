use crate::{
    node::{MetaKey, MetaMap},
    types::TypeExpr,
    value::Literal,
};
use serde::Serialize;
use std::slice::Iter;

///
/// FieldDefault
///
/// A field carries either an inline literal default or a reference to a
/// default factory, never both. Factory references render as the bound name.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum FieldDefault {
    Factory(String),
    Literal(Literal),
}

///
/// FieldDescriptor
///
/// Immutable snapshot of one field. Edits clone and rebuild; descriptors are
/// never mutated in place by the engine.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeExpr,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldDefault>,

    #[serde(default, skip_serializing_if = "MetaMap::is_empty")]
    pub meta: MetaMap,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<TypeExpr>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            default: None,
            meta: MetaMap::new(),
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn with_meta(mut self, key: MetaKey, value: Literal) -> Self {
        self.meta.insert(key, value);
        self
    }
}

///
/// FieldList
///
/// Declaration-ordered field collection with merged-overlay semantics: a
/// field that shadows an existing name keeps the original position, new
/// names append.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FieldList {
    fields: Vec<FieldDescriptor>,
}

impl FieldList {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn push(&mut self, field: FieldDescriptor) {
        self.fields.push(field);
    }

    /// Replace an existing field of the same name in place, or append.
    pub fn overlay(&mut self, field: FieldDescriptor) {
        if let Some(slot) = self.fields.iter_mut().find(|f| f.name == field.name) {
            *slot = field;
        } else {
            self.fields.push(field);
        }
    }

    /// Insert only if the name is not yet present. Used when folding base
    /// chains, where the first declaration wins.
    pub fn merge_inherited(&mut self, field: FieldDescriptor) {
        if !self.contains(&field.name) {
            self.fields.push(field);
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldDescriptor> {
        let index = self.fields.iter().position(|f| f.name == name)?;

        Some(self.fields.remove(index))
    }

    pub fn iter(&self) -> Iter<'_, FieldDescriptor> {
        self.fields.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a FieldDescriptor;
    type IntoIter = Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl FromIterator<FieldDescriptor> for FieldList {
    fn from_iter<I: IntoIterator<Item = FieldDescriptor>>(iter: I) -> Self {
        let mut list = Self::new();
        for field in iter {
            list.push(field);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;

    #[test]
    fn overlay_keeps_position_of_shadowed_field() {
        let mut list = FieldList::new();
        list.push(FieldDescriptor::new("a", Primitive::Text));
        list.push(FieldDescriptor::new("b", Primitive::Int32));
        list.overlay(FieldDescriptor::new("a", Primitive::Bool));

        let names: Vec<&str> = list.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(
            list.get("a").expect("field a").ty,
            TypeExpr::from(Primitive::Bool)
        );
    }

    #[test]
    fn merge_inherited_never_replaces() {
        let mut list = FieldList::new();
        list.push(FieldDescriptor::new("a", Primitive::Text));
        list.merge_inherited(FieldDescriptor::new("a", Primitive::Bool));

        assert_eq!(
            list.get("a").expect("field a").ty,
            TypeExpr::from(Primitive::Text)
        );
    }
}
