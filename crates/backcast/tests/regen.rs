use backcast::prelude::*;
use backcast_schema::extract::extract_source;
use std::{fs, path::Path};
use tempfile::TempDir;
use time::macros::date;

const USER_RS: &str = "\
pub const LIMIT: Nat32 = 10;

#[model]
pub struct UserSchema {
    #[field(default = \"anon\")]
    pub name: Text,
    pub age: Int32,
}

#[model]
pub enum Color {
    Red = 1,
    Green = 2,
}
";

const UTIL_RS: &str = "pub const ANSWER: Nat32 = 42;\n";
const NOTES_TXT: &str = "plain text, no models here\n";

fn write_tree(root: &Path) {
    fs::create_dir_all(root.join("models")).expect("create models dir");
    fs::write(root.join("models/user.rs"), USER_RS).expect("write user.rs");
    fs::write(root.join("util.rs"), UTIL_RS).expect("write util.rs");
    fs::write(root.join("notes.txt"), NOTES_TXT).expect("write notes.txt");
}

fn bundle() -> VersionBundle {
    let change = VersionChange::new(
        "drop the age field and the Green member",
        vec![
            schema("UserSchema").field("age").didnt_exist(),
            enum_def("Color").didnt_have("Green"),
        ],
    );

    VersionBundle::new(vec![
        Version::changed(date!(2001 - 01 - 01), change),
        Version::new(date!(2000 - 01 - 01)),
    ])
    .expect("valid bundle")
}

fn run() -> (TempDir, TempDir) {
    let root = TempDir::new().expect("root dir");
    let out = TempDir::new().expect("out dir");
    write_tree(root.path());

    regenerate(root.path(), out.path(), &bundle()).expect("regeneration succeeds");

    (root, out)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

#[test]
fn version_trees_reflect_their_snapshots() {
    let (_root, out) = run();

    let newest = read(&out.path().join("v2001_01_01/models/user.rs"));
    assert!(newest.contains("pub age: Int32,"));
    assert!(newest.contains("Green = 2,"));

    let oldest = read(&out.path().join("v2000_01_01/models/user.rs"));
    assert!(!oldest.contains("age"));
    assert!(!oldest.contains("Green"));
    assert!(oldest.contains("#[field(default = \"anon\")]"));
}

#[test]
fn model_files_carry_the_generated_banner_and_verbatim_items() {
    let (_root, out) = run();

    for version in ["v2001_01_01", "v2000_01_01"] {
        let rendered = read(&out.path().join(version).join("models/user.rs"));
        assert!(rendered.starts_with("// Generated by backcast. Do not edit by hand.\n"));
        assert!(rendered.contains("pub const LIMIT: Nat32 = 10;"));
    }
}

#[test]
fn files_without_models_are_copied_byte_for_byte() {
    let (_root, out) = run();

    for version in ["v2001_01_01", "v2000_01_01"] {
        assert_eq!(read(&out.path().join(version).join("util.rs")), UTIL_RS);
        assert_eq!(read(&out.path().join(version).join("notes.txt")), NOTES_TXT);
    }
}

#[test]
fn union_artifacts_sit_above_the_version_trees() {
    let (_root, out) = run();

    let unions = read(&out.path().join("models/user.rs"));
    assert!(unions.contains("#[model_union]"));
    assert!(unions.contains("V2001_01_01(crate::v2001_01_01::models::user::UserSchema),"));
    assert!(unions.contains("V2000_01_01(crate::v2000_01_01::models::user::UserSchema),"));
    assert!(unions.contains("V2001_01_01(crate::v2001_01_01::models::user::Color),"));
}

#[test]
fn newest_tree_extracts_back_to_the_loaded_registry() {
    let (root, out) = run();

    let tree = load_tree(root.path()).expect("load tree");
    let rendered = read(&out.path().join("v2001_01_01/models/user.rs"));
    let extraction = extract_source(&rendered).expect("rendered output parses");

    assert_eq!(
        extraction.classes,
        vec![tree.registry.get_class("UserSchema").expect("class").clone()]
    );
    assert_eq!(
        extraction.enums,
        vec![tree.registry.get_enum("Color").expect("enum").clone()]
    );
}

#[test]
fn a_file_root_is_rejected() {
    let dir = TempDir::new().expect("dir");
    let file = dir.path().join("not-a-dir.rs");
    fs::write(&file, "").expect("write file");

    let err = load_tree(&file).expect_err("file is not a tree root");
    assert!(matches!(
        err,
        Error::CodeGeneration(CodeGenerationError::ExpectedDirectory { .. })
    ));
}

#[test]
fn invalid_instructions_abort_with_no_partial_output() {
    let root = TempDir::new().expect("root dir");
    let out = TempDir::new().expect("out dir");
    write_tree(root.path());

    let change = VersionChange::new(
        "remove a field that was never declared",
        vec![schema("UserSchema").field("missing").didnt_exist()],
    );
    let bundle = VersionBundle::new(vec![
        Version::changed(date!(2001 - 01 - 01), change),
        Version::new(date!(2000 - 01 - 01)),
    ])
    .expect("valid bundle");

    let err = regenerate(root.path(), out.path(), &bundle).expect_err("invalid instruction");
    assert!(err.to_string().contains("'missing' was not found"));

    let entries: Vec<_> = fs::read_dir(out.path()).expect("read out dir").collect();
    assert!(entries.is_empty(), "no trees written on failure");
}
