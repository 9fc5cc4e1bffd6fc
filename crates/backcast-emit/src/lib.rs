//! Deterministic source rendering for model descriptors.
//!
//! Rendering is a pure function of the descriptors: identical input always
//! produces byte-identical output. Anything the renderer cannot express is
//! rejected earlier, at extraction or migration time, so rendering itself
//! is infallible.

pub mod render;
pub mod writer;

pub use crate::{
    render::{
        render_class, render_enum, render_module, render_union, render_union_file, ModuleEntry,
        UnionSpec, GENERATED_BANNER,
    },
    writer::SourceWriter,
};
