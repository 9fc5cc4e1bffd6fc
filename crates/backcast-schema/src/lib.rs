pub mod extract;
pub mod node;
pub mod registry;
pub mod types;
pub mod validate;
pub mod value;

/// Maximum length for model and enum schema identifiers.
pub const MAX_MODEL_NAME_LEN: usize = 64;

/// Maximum length for field, property and member schema identifiers.
pub const MAX_FIELD_NAME_LEN: usize = 64;

use crate::node::NodeError;
use thiserror::Error as ThisError;

pub use crate::extract::CodeGenerationError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        extract::CodeGenerationError,
        node::*,
        registry::Registry,
        types::{Primitive, TypeExpr},
        value::Literal,
    };
    pub use serde::Serialize;
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    CodeGeneration(#[from] CodeGenerationError),

    #[error(transparent)]
    Node(#[from] NodeError),
}
