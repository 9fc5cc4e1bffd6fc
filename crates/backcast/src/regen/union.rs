//! Cross-version union artifacts.
//!
//! For each model file, one artifact at the file's relative path above the
//! per-version trees, holding one union enum per symbol. Variants are
//! listed newest first and reference the symbol inside each version tree.

use crate::{
    regen::{ScannedFile, SourceTree},
    Error,
};
use backcast_emit::{render_union_file, UnionSpec};
use backcast_migrate::VersionSnapshot;
use std::{fs, path::Path};
use tracing::debug;

pub(crate) fn write_unions(
    tree: &SourceTree,
    snapshots: &[VersionSnapshot],
    out: &Path,
) -> Result<(), Error> {
    let version_modules: Vec<String> = snapshots
        .iter()
        .map(|s| s.module_name.clone())
        .collect();

    for file in &tree.files {
        if !file.extraction.has_models() {
            continue;
        }

        let specs: Vec<UnionSpec> = file
            .extraction
            .symbols()
            .map(|symbol| UnionSpec {
                symbol: symbol.to_string(),
                module_path: module_path(file),
                version_modules: version_modules.clone(),
            })
            .collect();

        let dest = out.join(&file.relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        debug!(file = %dest.display(), unions = specs.len(), "union artifact");
        fs::write(&dest, render_union_file(&specs)).map_err(|e| Error::io(&dest, e))?;
    }

    Ok(())
}

/// Module path of a file relative to its version root: path components
/// joined by `::`, without the `.rs` extension; a `mod.rs` resolves to its
/// directory path.
fn module_path(file: &ScannedFile) -> String {
    let mut components: Vec<String> = file
        .relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if components.last().is_some_and(|last| last == "mod") {
        components.pop();
    }

    components.join("::")
}
