use serde::Serialize;
use std::fmt;

///
/// Literal
///
/// Structured literal carried by defaults, metadata entries and enum
/// members. Rendering is deterministic and always valid source text.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[remain::sorted]
pub enum Literal {
    Bool(bool),
    Float(f64),
    Int(i64),
    List(Vec<Literal>),
    Str(String),
}

impl Literal {
    /// True when two literals compare equal under value identity.
    #[must_use]
    pub fn same_value(&self, other: &Self) -> bool {
        self == other
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => {
                let rendered = format!("{v}");
                if rendered.contains(['.', 'e', 'E']) {
                    write!(f, "{rendered}")
                } else {
                    write!(f, "{rendered}.0")
                }
            }
            Self::Str(v) => write!(f, "{v:?}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<Self>> for Literal {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_valid_source_text() {
        assert_eq!(Literal::from(7).to_string(), "7");
        assert_eq!(Literal::from(-3).to_string(), "-3");
        assert_eq!(Literal::from(true).to_string(), "true");
        assert_eq!(Literal::from(2.5).to_string(), "2.5");
        assert_eq!(Literal::from(3.0).to_string(), "3.0");
        assert_eq!(Literal::from("he\"wwo").to_string(), "\"he\\\"wwo\"");
        assert_eq!(
            Literal::List(vec![1.into(), 2.into()]).to_string(),
            "[1, 2]"
        );
    }
}
