//! Id maps persisted between runs.

#![allow(clippy::unwrap_used)]

use std::fs;

use kolasu::ids::{FileBasedIdShortener, IdError, NodeIdProvider, SequenceIdAssigner, StructuralIdProvider};
use tempfile::TempDir;

use crate::helpers::*;

fn shortener(dir: &TempDir) -> FileBasedIdShortener<StructuralIdProvider> {
    FileBasedIdShortener::open(dir.path().join("ids.csv"), StructuralIdProvider::with_source_id("s")).unwrap()
}

#[test]
fn test_short_ids_survive_reopening() {
    let dir = TempDir::new().unwrap();
    let fixture = fixture();
    let first_run: Vec<String> = {
        let mut ids = shortener(&dir);
        fixture
            .ast
            .walk(fixture.root)
            .map(|node| ids.id(&fixture.ast, node).unwrap())
            .collect()
    };
    assert_eq!(first_run[0], "1");
    assert_eq!(first_run[9], "10");

    let mut ids = shortener(&dir);
    assert_eq!(ids.id(&fixture.ast, fixture.small).unwrap(), first_run[5]);
    assert_eq!(ids.original_id("1"), Some("s_root"));
    assert_eq!(ids.shorten("elsewhere").unwrap(), "11");
}

#[test]
fn test_mapping_file_format() {
    let dir = TempDir::new().unwrap();
    let fixture = fixture();
    let mut ids = shortener(&dir);
    ids.id(&fixture.ast, fixture.first).unwrap();
    ids.flush().unwrap();
    let content = fs::read_to_string(ids.path()).unwrap();
    assert_eq!(content, "s_root_children,1\n");
}

#[test]
fn test_malformed_mapping_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ids.csv");
    fs::write(&path, "s_root,1\nbroken\n").unwrap();
    let result = FileBasedIdShortener::open(&path, StructuralIdProvider::with_source_id("s"));
    assert!(matches!(result, Err(IdError::MalformedLine { line_number: 2, .. })));
}

#[test]
fn test_sequence_resumes_after_largest() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sequence.txt");
    let fixture = fixture();
    {
        let mut ids = SequenceIdAssigner::open(&path).unwrap();
        assert_eq!(ids.id(&fixture.ast, fixture.root).unwrap(), "1");
        assert_eq!(ids.id(&fixture.ast, fixture.big).unwrap(), "2");
        assert_eq!(ids.id(&fixture.ast, fixture.root).unwrap(), "1");
    }
    let mut ids = SequenceIdAssigner::open(&path).unwrap();
    assert_eq!(ids.id(&fixture.ast, fixture.small).unwrap(), "3");
}
