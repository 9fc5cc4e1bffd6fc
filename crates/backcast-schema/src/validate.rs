//! Registry validation, run once per regeneration before any migration.

use crate::{
    extract::CodeGenerationError, registry::Registry, MAX_FIELD_NAME_LEN, MAX_MODEL_NAME_LEN,
};
use convert_case::{Case, Casing};

/// Run full registry validation in a staged, deterministic order.
pub fn validate_registry(registry: &Registry) -> Result<(), CodeGenerationError> {
    // Phase 1: per-node naming and length invariants.
    validate_nodes(registry)?;

    // Phase 2: invariants that need the full registry (base resolution,
    // cycles, property/field collisions on the effective set).
    validate_global(registry)
}

fn validate_nodes(registry: &Registry) -> Result<(), CodeGenerationError> {
    for (name, class) in registry.classes() {
        check_pascal(name, MAX_MODEL_NAME_LEN)?;
        for field in &class.fields {
            check_snake(&field.name, MAX_FIELD_NAME_LEN)?;
        }
        for property in &class.properties {
            check_snake(&property.name, MAX_FIELD_NAME_LEN)?;
        }
    }

    for (name, descriptor) in registry.enums() {
        check_pascal(name, MAX_MODEL_NAME_LEN)?;
        for member in &descriptor.members {
            check_pascal(&member.name, MAX_FIELD_NAME_LEN)?;
        }
    }

    Ok(())
}

fn validate_global(registry: &Registry) -> Result<(), CodeGenerationError> {
    for (name, class) in registry.classes() {
        let effective = registry.effective_fields(name)?;

        for property in &class.properties {
            if effective.contains(&property.name) {
                return Err(CodeGenerationError::PropertyCollidesWithField {
                    class: name.clone(),
                    property: property.name.clone(),
                });
            }
        }
    }

    Ok(())
}

fn check_pascal(symbol: &str, max_len: usize) -> Result<(), CodeGenerationError> {
    check_len(symbol, max_len)?;
    if symbol.to_case(Case::Pascal) != symbol {
        return Err(CodeGenerationError::InvalidName {
            symbol: symbol.to_string(),
            expected: "PascalCase",
        });
    }

    Ok(())
}

fn check_snake(symbol: &str, max_len: usize) -> Result<(), CodeGenerationError> {
    check_len(symbol, max_len)?;
    if symbol.to_case(Case::Snake) != symbol {
        return Err(CodeGenerationError::InvalidName {
            symbol: symbol.to_string(),
            expected: "snake_case",
        });
    }

    Ok(())
}

fn check_len(symbol: &str, max_len: usize) -> Result<(), CodeGenerationError> {
    if symbol.len() > max_len {
        return Err(CodeGenerationError::InvalidName {
            symbol: symbol.to_string(),
            expected: "no longer than the identifier limit",
        });
    }

    Ok(())
}
