use crate::node::{FieldList, PropertyDescriptor};
use serde::Serialize;

///
/// ClassDescriptor
///
/// Structural snapshot of one model struct: ordered base list, own fields
/// and own properties in declaration order. The *effective* field set
/// (own overlaid on inherited) is resolved by the registry, since it needs
/// the other descriptors of the run.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassDescriptor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,

    pub fields: FieldList,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDescriptor>,
}

impl ClassDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            fields: FieldList::new(),
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.bases.push(base.into());
        self
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Replace a property of the same name in place, or append.
    pub fn overlay_property(&mut self, property: PropertyDescriptor) {
        if let Some(slot) = self.properties.iter_mut().find(|p| p.name == property.name) {
            *slot = property;
        } else {
            self.properties.push(property);
        }
    }

    pub fn remove_property(&mut self, name: &str) -> Option<PropertyDescriptor> {
        let index = self.properties.iter().position(|p| p.name == name)?;

        Some(self.properties.remove(index))
    }
}
