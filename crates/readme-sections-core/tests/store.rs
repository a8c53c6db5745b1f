use std::fs;

use pretty_assertions::assert_eq;
use readme_sections_core::{
    bullet_list, MemoryFs, MergeAction, Section, SectionError, SectionStore, StdFs,
};
use tempfile::tempdir;

#[test]
fn flush_writes_sections_in_first_added_order() {
    let memory = MemoryFs::new();
    let mut store = SectionStore::new(&memory);
    store.add([
        Section::new("A", "alpha\n"),
        Section::new("B", "beta\n"),
        Section::new("C", "gamma\n"),
    ]);

    let report = store.flush_all().unwrap();

    let actions: Vec<_> = report.outcomes.iter().map(|o| o.action).collect();
    assert_eq!(
        actions,
        vec![
            MergeAction::Created,
            MergeAction::Appended,
            MergeAction::Appended
        ]
    );
    assert_eq!(
        memory.contents("README.md").unwrap(),
        "## A\n\nalpha\n\n## B\n\nbeta\n\n## C\n\ngamma\n"
    );
    assert_eq!(report.result(), memory.contents("README.md").as_deref());
}

#[test]
fn reflushing_unchanged_store_writes_nothing() {
    let memory = MemoryFs::new();
    let mut store = SectionStore::new(&memory);
    store.add([Section::new("A", "alpha\n"), Section::new("B", "beta\n")]);
    store.flush_all().unwrap();
    let writes = memory.write_count();

    let report = store.flush_all().unwrap();

    assert!(!report.changed());
    assert_eq!(memory.write_count(), writes);
}

#[test]
fn updated_content_replaces_only_its_block() {
    let memory = MemoryFs::new();
    let mut store = SectionStore::new(&memory);
    store.add([
        Section::new("Languages", bullet_list(["en", "es"])),
        Section::new("Features", bullet_list(["Feature 1", "Feature 2"])),
    ]);
    store.flush_all().unwrap();

    store.add([Section::new("Languages", bullet_list(["en", "es", "fr"]))]);
    assert_eq!(store.sections().len(), 2);
    assert_eq!(store.sections()[0].title, "Languages");

    let report = store.flush_all().unwrap();

    assert_eq!(report.outcomes[0].action, MergeAction::Replaced);
    assert_eq!(report.outcomes[1].action, MergeAction::Unchanged);
    assert_eq!(
        memory.contents("README.md").unwrap(),
        "## Languages\n\n- en\n- es\n- fr\n\n## Features\n\n- Feature 1\n- Feature 2\n"
    );
}

#[test]
fn flush_stops_at_first_error_and_keeps_earlier_writes() {
    let memory = MemoryFs::new();
    memory.fail_writes_after(1);
    let mut store = SectionStore::new(&memory);
    store.add([
        Section::new("A", "alpha\n"),
        Section::new("B", "beta\n"),
        Section::new("C", "gamma\n"),
    ]);

    let err = store.flush_all().unwrap_err();

    assert!(matches!(err, SectionError::Write { .. }));
    assert_eq!(memory.contents("README.md").unwrap(), "## A\n\nalpha\n");
    assert_eq!(store.sections().len(), 3);
}

#[test]
fn cached_sections_reach_a_real_readme() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("README.md");
    fs::write(&path, "# Project\n\nHand written.\n").unwrap();

    let mut store = SectionStore::new(StdFs::new());
    store.set_path(&path);
    store.add([
        Section::new("Languages", "- en\n- es\n"),
        Section::new("Features", "- Feature 1\n- Feature 2\n"),
    ]);
    store.flush_all().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "# Project\n\nHand written.\n\n## Languages\n\n- en\n- es\n\n## Features\n\n- Feature 1\n- Feature 2\n"
    );
    assert_eq!(store.path(), path.as_path());
}
