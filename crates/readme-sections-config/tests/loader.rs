use std::fs;
use std::io::Write;
use std::path::Path;

use readme_sections_config::{Manifest, ManifestError};
use readme_sections_core::Section;
use tempfile::TempDir;

fn write_file(path: impl AsRef<Path>, contents: &str) {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    let mut file = fs::File::create(path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
}

#[test]
fn loads_sections_in_declared_order() {
    let temp = TempDir::new().expect("tempdir");
    let manifest_path = temp.path().join("sections.toml");
    write_file(&temp.path().join("docs/notes.md"), "Hand-picked notes.\n");
    write_file(
        &manifest_path,
        r#"
        document = "docs/README.md"

        [[section]]
        title = "Supported Languages"
        items = ["en", "es"]

        [[section]]
        title = "Notes"
        content_file = "docs/notes.md"

        [[section]]
        title = "Empty"
        content = ""
        "#,
    );

    let manifest = Manifest::load(&manifest_path).expect("load manifest");

    assert_eq!(manifest.source, manifest_path);
    assert_eq!(manifest.document, temp.path().join("docs/README.md"));
    assert_eq!(
        manifest.sections,
        vec![
            Section::new("Supported Languages", "- en\n- es\n"),
            Section::new("Notes", "Hand-picked notes.\n"),
            Section::new("Empty", ""),
        ]
    );
}

#[test]
fn missing_manifest_is_an_io_error() {
    let temp = TempDir::new().expect("tempdir");
    let err = Manifest::load(temp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ManifestError::Io { .. }));
}

#[test]
fn missing_content_file_is_an_io_error() {
    let temp = TempDir::new().expect("tempdir");
    let manifest_path = temp.path().join("sections.toml");
    write_file(
        &manifest_path,
        "[[section]]\ntitle = \"Notes\"\ncontent_file = \"nope.md\"\n",
    );

    let err = Manifest::load(&manifest_path).unwrap_err();
    match err {
        ManifestError::Io { path, .. } => assert_eq!(path, temp.path().join("nope.md")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_keys_fail_to_parse() {
    let temp = TempDir::new().expect("tempdir");
    let manifest_path = temp.path().join("sections.toml");
    write_file(
        &manifest_path,
        "[[section]]\ntitle = \"A\"\nbody = \"typo\"\n",
    );

    let err = Manifest::load(&manifest_path).unwrap_err();
    assert!(matches!(err, ManifestError::Parse { .. }));
    assert!(err.to_string().contains("sections.toml"));
}

#[test]
fn empty_manifest_has_no_sections() {
    let temp = TempDir::new().expect("tempdir");
    let manifest_path = temp.path().join("sections.toml");
    write_file(&manifest_path, "");

    let manifest = Manifest::load(&manifest_path).expect("load manifest");
    assert!(manifest.sections.is_empty());
    assert_eq!(manifest.document, temp.path().join("README.md"));
}
