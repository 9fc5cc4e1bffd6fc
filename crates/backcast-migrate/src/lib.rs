pub mod engine;
pub mod instruction;
pub mod version;

use backcast_schema::{extract::CodeGenerationError, node::NodeError};
use thiserror::Error as ThisError;
use time::Date;

pub use crate::{
    engine::{migrate, InvalidInstructionError, VersionSnapshot},
    instruction::{enum_def, schema, FieldEdit, FieldInfo, Instruction},
    version::{Version, VersionBundle, VersionChange},
};

///
/// StructureError
///
/// An instruction or version bundle built in a self-inconsistent way,
/// independent of any schema. Raised at construction time, before the
/// engine ever runs.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum StructureError {
    #[error("field '{field}' cannot combine a default with a default factory")]
    ConflictingDefault { field: String },

    #[error("a version bundle must contain at least one version")]
    EmptyBundle,

    #[error("field edit for '{field}' changes nothing")]
    EmptyEdit { field: String },

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("the oldest version ({date}) carries a change that can never be applied")]
    TrailingChange { date: Date },

    #[error("version dates must be strictly decreasing: '{older}' does not precede '{newer}'")]
    UnorderedVersions { newer: Date, older: Date },
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    CodeGeneration(#[from] CodeGenerationError),

    #[error(transparent)]
    Invalid(#[from] InvalidInstructionError),

    #[error(transparent)]
    Structure(#[from] StructureError),
}
