//! Directory regeneration.
//!
//! One run walks the tree of current definitions, extracts every model,
//! folds the version bundle over the extracted registry, then writes one
//! complete tree per version plus the cross-version union artifacts.
//! Traversal is sorted, so two runs over the same tree produce identical
//! output.

pub mod union;

use crate::Error;
use backcast_emit::{render_module, ModuleEntry};
use backcast_migrate::{migrate, VersionBundle, VersionSnapshot};
use backcast_schema::{
    extract::{extract_source, CodeGenerationError, Extraction, SourceItem},
    registry::Registry,
    validate::validate_registry,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

///
/// ScannedFile
///
/// One file of the definition tree: its path relative to the root, its raw
/// text, and whatever models were extracted from it. Files without models
/// carry an empty extraction and are copied through byte-for-byte.
///

#[derive(Clone, Debug)]
pub struct ScannedFile {
    pub relative: PathBuf,
    pub source: String,
    pub extraction: Extraction,
}

///
/// SourceTree
///

#[derive(Clone, Debug)]
pub struct SourceTree {
    pub files: Vec<ScannedFile>,
    pub registry: Registry,
}

/// Walk the definition tree, extract every model file and build the
/// validated registry of the run.
pub fn load_tree(root: &Path) -> Result<SourceTree, Error> {
    if !root.is_dir() {
        return Err(CodeGenerationError::ExpectedDirectory {
            path: root.to_path_buf(),
        }
        .into());
    }

    let mut files = Vec::new();
    scan_dir(root, Path::new(""), &mut files)?;

    let mut registry = Registry::new();
    for file in &files {
        for class in &file.extraction.classes {
            registry.insert_class(class.clone())?;
        }
        for descriptor in &file.extraction.enums {
            registry.insert_enum(descriptor.clone())?;
        }
    }
    validate_registry(&registry)?;

    Ok(SourceTree { files, registry })
}

/// Regenerate every version of the tree at `root` into `out`: one subtree
/// per version, union artifacts alongside them.
pub fn regenerate(root: &Path, out: &Path, bundle: &VersionBundle) -> Result<(), Error> {
    let tree = load_tree(root)?;
    let snapshots = migrate(&tree.registry, bundle)?;

    for snapshot in &snapshots {
        info!(version = %snapshot.module_name, "writing version tree");
        write_version_tree(&tree, snapshot, &out.join(&snapshot.module_name))?;
    }

    union::write_unions(&tree, &snapshots, out)?;

    Ok(())
}

fn scan_dir(dir: &Path, relative: &Path, files: &mut Vec<ScannedFile>) -> Result<(), Error> {
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .collect::<Result<_, _>>()
        .map_err(|e| Error::io(dir, e))?;
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let path = entry.path();
        let relative = relative.join(entry.file_name());

        if path.is_dir() {
            scan_dir(&path, &relative, files)?;
            continue;
        }

        let source = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let extraction = if path.extension().is_some_and(|ext| ext == "rs") {
            extract_source(&source)?
        } else {
            Extraction::default()
        };

        debug!(file = %relative.display(), models = extraction.has_models(), "scanned");
        files.push(ScannedFile {
            relative,
            source,
            extraction,
        });
    }

    Ok(())
}

fn write_version_tree(
    tree: &SourceTree,
    snapshot: &VersionSnapshot,
    base: &Path,
) -> Result<(), Error> {
    for file in &tree.files {
        let dest = base.join(&file.relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let content = if file.extraction.has_models() {
            render_file(file, &snapshot.registry)?
        } else {
            file.source.clone()
        };

        debug!(file = %dest.display(), "written");
        fs::write(&dest, content).map_err(|e| Error::io(&dest, e))?;
    }

    Ok(())
}

/// Re-render one model file against a version's registry, keeping item
/// order and verbatim text from the original.
fn render_file(file: &ScannedFile, registry: &Registry) -> Result<String, Error> {
    let mut entries = Vec::with_capacity(file.extraction.items.len());

    for item in &file.extraction.items {
        match item {
            SourceItem::Class(name) => {
                let class = registry.get_class(name).ok_or_else(|| {
                    CodeGenerationError::UnknownSymbol { name: name.clone() }
                })?;
                entries.push(ModuleEntry::Class(class));
            }
            SourceItem::Enum(name) => {
                let descriptor = registry.get_enum(name).ok_or_else(|| {
                    CodeGenerationError::UnknownSymbol { name: name.clone() }
                })?;
                entries.push(ModuleEntry::Enum(descriptor));
            }
            SourceItem::Verbatim(text) => entries.push(ModuleEntry::Verbatim(text)),
        }
    }

    Ok(render_module(&entries))
}
