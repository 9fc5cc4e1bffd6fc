use crate::{
    extract::CodeGenerationError,
    node::{ClassDescriptor, EnumDescriptor, FieldList},
};
use serde::Serialize;
use std::collections::BTreeMap;

///
/// Registry
///
/// Per-run symbol table mapping names to extracted descriptors. Built fresh
/// for every regeneration run; never cached across runs, since the
/// underlying definitions may change between runs. The migration engine
/// clones the registry once per version and folds instructions over the
/// clone.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct Registry {
    classes: BTreeMap<String, ClassDescriptor>,
    enums: BTreeMap<String, EnumDescriptor>,
}

impl Registry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            classes: BTreeMap::new(),
            enums: BTreeMap::new(),
        }
    }

    pub fn insert_class(&mut self, class: ClassDescriptor) -> Result<(), CodeGenerationError> {
        if self.contains(&class.name) {
            return Err(CodeGenerationError::DuplicateSymbol {
                name: class.name,
            });
        }
        self.classes.insert(class.name.clone(), class);

        Ok(())
    }

    pub fn insert_enum(&mut self, descriptor: EnumDescriptor) -> Result<(), CodeGenerationError> {
        if self.contains(&descriptor.name) {
            return Err(CodeGenerationError::DuplicateSymbol {
                name: descriptor.name,
            });
        }
        self.enums.insert(descriptor.name.clone(), descriptor);

        Ok(())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name) || self.enums.contains_key(name)
    }

    #[must_use]
    pub fn get_class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    #[must_use]
    pub fn get_enum(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.get(name)
    }

    pub fn class_mut(&mut self, name: &str) -> Option<&mut ClassDescriptor> {
        self.classes.get_mut(name)
    }

    pub fn enum_mut(&mut self, name: &str) -> Option<&mut EnumDescriptor> {
        self.enums.get_mut(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = (&String, &ClassDescriptor)> {
        self.classes.iter()
    }

    pub fn enums(&self) -> impl Iterator<Item = (&String, &EnumDescriptor)> {
        self.enums.iter()
    }

    /// Resolve the effective field set of a class through its full base
    /// chain: inherited names keep first-declared order, own names append
    /// afterward, own declarations shadow inherited ones in place.
    pub fn effective_fields(&self, name: &str) -> Result<FieldList, CodeGenerationError> {
        let mut stack = Vec::new();

        self.resolve_fields(name, &mut stack)
    }

    fn resolve_fields(
        &self,
        name: &str,
        stack: &mut Vec<String>,
    ) -> Result<FieldList, CodeGenerationError> {
        if stack.iter().any(|seen| seen == name) {
            return Err(CodeGenerationError::BaseCycle {
                class: name.to_string(),
            });
        }

        let class = self
            .get_class(name)
            .ok_or_else(|| CodeGenerationError::UnknownSymbol {
                name: name.to_string(),
            })?;

        stack.push(name.to_string());

        let mut merged = FieldList::new();
        for base in &class.bases {
            if self.get_enum(base).is_some() {
                return Err(CodeGenerationError::InvalidBase {
                    class: name.to_string(),
                    base: base.clone(),
                });
            }
            if self.get_class(base).is_none() {
                return Err(CodeGenerationError::UnknownBase {
                    class: name.to_string(),
                    base: base.clone(),
                });
            }

            let inherited = self.resolve_fields(base, stack)?;
            for field in &inherited {
                merged.merge_inherited(field.clone());
            }
        }
        for field in &class.fields {
            merged.overlay(field.clone());
        }

        stack.pop();

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{node::FieldDescriptor, types::Primitive};

    fn registry() -> Registry {
        let mut reg = Registry::new();

        let mut base = ClassDescriptor::new("Base");
        base.fields.push(FieldDescriptor::new("id", Primitive::Ulid));
        base.fields.push(FieldDescriptor::new("name", Primitive::Text));
        reg.insert_class(base).expect("insert Base");

        let mut child = ClassDescriptor::new("Child").with_base("Base");
        child.fields.push(FieldDescriptor::new("name", Primitive::Bool));
        child.fields.push(FieldDescriptor::new("extra", Primitive::Int32));
        reg.insert_class(child).expect("insert Child");

        reg
    }

    #[test]
    fn effective_fields_shadow_in_place_and_append_own() {
        let reg = registry();
        let effective = reg.effective_fields("Child").expect("resolve Child");

        let names: Vec<&str> = effective.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "extra"]);
        assert_eq!(
            effective.get("name").expect("name").ty,
            Primitive::Bool.into()
        );
    }

    #[test]
    fn base_cycles_are_detected() {
        let mut reg = Registry::new();
        reg.insert_class(ClassDescriptor::new("A").with_base("B"))
            .expect("insert A");
        reg.insert_class(ClassDescriptor::new("B").with_base("A"))
            .expect("insert B");

        let err = reg.effective_fields("A").expect_err("cycle");
        assert!(matches!(err, CodeGenerationError::BaseCycle { .. }));
    }

    #[test]
    fn serializes_for_schema_dumps() {
        let reg = registry();
        let json = serde_json::to_value(&reg).expect("serialize registry");

        assert_eq!(json["classes"]["Child"]["bases"][0], "Base");
        assert_eq!(
            json["classes"]["Base"]["fields"]["fields"][0]["name"],
            "id"
        );
    }

    #[test]
    fn duplicate_symbols_are_rejected_across_kinds() {
        let mut reg = Registry::new();
        reg.insert_class(ClassDescriptor::new("Thing"))
            .expect("insert class");

        let err = reg
            .insert_enum(crate::node::EnumDescriptor::new("Thing"))
            .expect_err("duplicate");
        assert!(matches!(err, CodeGenerationError::DuplicateSymbol { .. }));
    }
}
