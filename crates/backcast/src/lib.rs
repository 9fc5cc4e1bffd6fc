//! Facade crate: tree loading, version regeneration, union artifacts.

pub mod regen;

use backcast_schema::extract::CodeGenerationError;
use std::path::PathBuf;
use thiserror::Error as ThisError;

pub use crate::regen::{load_tree, regenerate, ScannedFile, SourceTree};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{load_tree, regenerate, Error, ScannedFile, SourceTree};
    pub use backcast_migrate::{
        enum_def, migrate, schema, FieldEdit, FieldInfo, Instruction, InvalidInstructionError,
        StructureError, Version, VersionBundle, VersionChange, VersionSnapshot,
    };
    pub use backcast_schema::{
        extract::CodeGenerationError,
        registry::Registry,
        types::{Primitive, TypeExpr},
        value::Literal,
    };
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    CodeGeneration(#[from] CodeGenerationError),

    #[error("io error at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Migrate(#[from] backcast_migrate::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
