use crate::node::NodeError;
use serde::Serialize;

///
/// PropertyDescriptor
///
/// A computed accessor on a model. The accessor function must take exactly
/// one parameter (its receiver); arity is validated eagerly, before any
/// schema is consulted. The stored lines are the dedented source of the
/// whole function, without the `#[accessor]` marker.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    pub name: String,
    lines: Vec<String>,
}

impl PropertyDescriptor {
    /// Parse and validate an accessor function for the named property.
    ///
    /// Fails when the source does not parse as an inherent function, when
    /// the function name does not match the property name, or when the
    /// function does not take exactly one argument.
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self, NodeError> {
        let name = name.into();

        let function: syn::ImplItemFn =
            syn::parse_str(source).map_err(|e| NodeError::AccessorParse {
                name: name.clone(),
                message: e.to_string(),
            })?;

        let ident = function.sig.ident.to_string();
        if ident != name {
            return Err(NodeError::AccessorName {
                property: name,
                function: ident,
            });
        }

        let count = function.sig.inputs.len();
        if count != 1 {
            return Err(NodeError::AccessorArity { name, count });
        }

        Ok(Self {
            name,
            lines: dedent(source),
        })
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Strip blank edge lines and the common leading indentation, so the same
/// accessor always normalizes to the same line sequence.
fn dedent(source: &str) -> Vec<String> {
    let lines: Vec<&str> = source
        .lines()
        .skip_while(|l| l.trim().is_empty())
        .collect();
    let lines: Vec<&str> = lines
        .iter()
        .rev()
        .skip_while(|l| l.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    // Margin is counted in chars, not bytes: leading whitespace may be
    // multibyte, and a byte index taken from one line can land inside a
    // char on another.
    let margin = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                let cut = l
                    .char_indices()
                    .nth(margin)
                    .map_or(l.len(), |(offset, _)| offset);
                l[cut..].trim_end().to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_argument_accessor() {
        let property = PropertyDescriptor::parse(
            "bar",
            "pub fn bar(&self) -> Text {\n    self.foo.clone()\n}",
        )
        .expect("valid accessor");

        assert_eq!(property.name, "bar");
        assert_eq!(property.lines()[0], "pub fn bar(&self) -> Text {");
    }

    #[test]
    fn rejects_wrong_arity() {
        let err = PropertyDescriptor::parse(
            "bar",
            "pub fn bar(&self, extra: Text) -> Text { extra }",
        )
        .expect_err("two arguments");

        assert_eq!(
            err.to_string(),
            "property 'bar' must have one argument and it has 2"
        );
    }

    #[test]
    fn rejects_zero_arguments() {
        let err = PropertyDescriptor::parse("bar", "pub fn bar() -> Text { Text::new() }")
            .expect_err("no receiver");

        assert_eq!(
            err.to_string(),
            "property 'bar' must have one argument and it has 0"
        );
    }

    #[test]
    fn rejects_mismatched_function_name() {
        let err = PropertyDescriptor::parse("bar", "pub fn baz(&self) -> Text { self.x() }")
            .expect_err("name mismatch");

        assert!(matches!(err, NodeError::AccessorName { .. }));
    }

    #[test]
    fn dedent_survives_multibyte_whitespace_indentation() {
        // U+2028 is three bytes of valid leading whitespace; a byte-based
        // margin taken from the four-space lines would split it.
        let source = "    pub fn bar(&self) -> Text {\n\u{2028}\u{2028}\u{2028}\u{2028}        self.foo.clone()\n    }";

        let property = PropertyDescriptor::parse("bar", source).expect("multibyte indentation");
        assert_eq!(property.lines()[0], "pub fn bar(&self) -> Text {");
        assert_eq!(property.lines()[2], "}");
    }

    #[test]
    fn dedent_is_stable_under_indentation() {
        let indented = "    pub fn bar(&self) -> Text {\n        self.foo.clone()\n    }";
        let flat = "pub fn bar(&self) -> Text {\n    self.foo.clone()\n}";

        let a = PropertyDescriptor::parse("bar", indented).expect("indented");
        let b = PropertyDescriptor::parse("bar", flat).expect("flat");
        assert_eq!(a, b);
    }
}
