use crate::value::Literal;
use serde::Serialize;

///
/// EnumDescriptor
///
/// Ordered member list of one enumeration. Members compare by name and by
/// value; the engine uses both when validating edits.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnumDescriptor {
    pub name: String,
    pub members: Vec<EnumMember>,
}

impl EnumDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_member(mut self, name: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.members.push(EnumMember {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// The first member (if any) holding `value` under a different name.
    #[must_use]
    pub fn member_with_value(&self, value: &Literal, excluding: &str) -> Option<&EnumMember> {
        self.members
            .iter()
            .find(|m| m.name != excluding && m.value.same_value(value))
    }

    pub fn set_member(&mut self, name: impl Into<String>, value: Literal) {
        let name = name.into();

        if let Some(member) = self.members.iter_mut().find(|m| m.name == name) {
            member.value = value;
        } else {
            self.members.push(EnumMember { name, value });
        }
    }

    pub fn remove_member(&mut self, name: &str) -> Option<EnumMember> {
        let index = self.members.iter().position(|m| m.name == name)?;

        Some(self.members.remove(index))
    }
}

///
/// EnumMember
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnumMember {
    pub name: String,
    pub value: Literal,
}
