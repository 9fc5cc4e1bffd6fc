use derive_more::{Display, FromStr};
use serde::Serialize;
use std::fmt;
use thiserror::Error as ThisError;

///
/// Primitive
///

#[derive(Clone, Copy, Debug, Display, Eq, FromStr, PartialEq, Serialize)]
#[remain::sorted]
pub enum Primitive {
    Bool,
    Bytes,
    Date,
    Decimal,
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Int64,
    Nat8,
    Nat16,
    Nat32,
    Nat64,
    Text,
    Timestamp,
    Ulid,
    Unit,
}

///
/// TypeExpr
///
/// Declared type of a field. Comparison is by declared identity, which is
/// what the migration engine uses to reject redundant type changes.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TypeExpr {
    Primitive(Primitive),

    /// Reference to another model or enum by name.
    Model(String),

    Opt(Box<TypeExpr>),
    List(Box<TypeExpr>),
}

impl TypeExpr {
    #[must_use]
    pub fn model(name: impl Into<String>) -> Self {
        Self::Model(name.into())
    }

    #[must_use]
    pub fn opt(inner: Self) -> Self {
        Self::Opt(Box::new(inner))
    }

    #[must_use]
    pub fn list(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }
}

impl From<Primitive> for TypeExpr {
    fn from(primitive: Primitive) -> Self {
        Self::Primitive(primitive)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Model(name) => write!(f, "{name}"),
            Self::Opt(inner) => write!(f, "Opt<{inner}>"),
            Self::List(inner) => write!(f, "List<{inner}>"),
        }
    }
}

///
/// ParseTypeError
///

#[derive(Debug, ThisError)]
#[error("'{input}' is not a valid type expression")]
pub struct ParseTypeError {
    pub input: String,
}

impl std::str::FromStr for TypeExpr {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseTypeError {
            input: s.to_string(),
        };

        if let Some(inner) = s.strip_prefix("Opt<").and_then(|r| r.strip_suffix('>')) {
            return Ok(Self::opt(inner.parse()?));
        }
        if let Some(inner) = s.strip_prefix("List<").and_then(|r| r.strip_suffix('>')) {
            return Ok(Self::list(inner.parse()?));
        }
        if s.is_empty() || s.contains(['<', '>', ':', ' ']) {
            return Err(err());
        }
        if let Ok(primitive) = Primitive::from_str(s) {
            return Ok(Self::Primitive(primitive));
        }

        Ok(Self::Model(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_through_from_str() {
        let cases = [
            TypeExpr::from(Primitive::Text),
            TypeExpr::model("UserSchema"),
            TypeExpr::opt(Primitive::Int32.into()),
            TypeExpr::list(TypeExpr::opt(Primitive::Ulid.into())),
        ];

        for ty in cases {
            let parsed: TypeExpr = ty.to_string().parse().expect("parse rendered type");
            assert_eq!(parsed, ty);
        }
    }

    #[test]
    fn from_str_rejects_malformed_expressions() {
        for input in ["", "Opt<", "List<Text", "a b", "Vec<Text>:"] {
            assert!(input.parse::<TypeExpr>().is_err(), "accepted '{input}'");
        }
    }

    #[test]
    fn identity_comparison_distinguishes_wrappers() {
        assert_ne!(
            TypeExpr::from(Primitive::Text),
            TypeExpr::opt(Primitive::Text.into()),
        );
    }
}
