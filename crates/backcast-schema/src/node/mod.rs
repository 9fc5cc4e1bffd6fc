mod class;
mod r#enum;
mod field;
mod meta;
mod property;

pub use self::class::*;
pub use self::field::*;
pub use self::meta::*;
pub use self::property::*;
pub use self::r#enum::*;

use thiserror::Error as ThisError;

///
/// NodeError
///
/// Structural errors raised while constructing a descriptor, independent of
/// any target schema.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum NodeError {
    #[error("property '{name}' must have one argument and it has {count}")]
    AccessorArity { name: String, count: usize },

    #[error("property '{property}' is implemented by a function named '{function}'")]
    AccessorName { property: String, function: String },

    #[error("property '{name}' accessor does not parse: {message}")]
    AccessorParse { name: String, message: String },
}
