use super::write_fixture;
use inreplace::{inreplace_pairs, InreplaceError, Matcher, PairsOptions, Rule};
use std::fs;
use tempfile::TempDir;

#[test]
fn pairs_see_text_modified_by_earlier_pairs() {
    let dir = TempDir::new().unwrap();
    let f = write_fixture(dir.path(), "f", "A");

    let result = inreplace_pairs(
        &f,
        &[Rule::new("A", "B"), Rule::new("B", "C")],
        PairsOptions::default(),
    )
    .unwrap();

    assert_eq!(result, b"C");
    assert_eq!(fs::read_to_string(&f).unwrap(), "C");
}

#[test]
fn read_only_returns_result_without_writing() {
    let dir = TempDir::new().unwrap();
    let f = write_fixture(dir.path(), "configure", "prefix=/usr/local\ncc=gcc\n");
    let before = fs::read(&f).unwrap();

    let result = inreplace_pairs(
        &f,
        &[
            Rule::new("/usr/local", "/opt/homebrew"),
            Rule::new(Matcher::pattern(r"cc=(\w+)").unwrap(), "cc=${1}-13"),
        ],
        PairsOptions {
            read_only: true,
            silent: true,
        },
    )
    .unwrap();

    assert_eq!(result, b"prefix=/opt/homebrew\ncc=gcc-13\n");
    assert_eq!(fs::read(&f).unwrap(), before);
}

#[test]
fn blank_pair_is_reported_while_later_pairs_still_apply() {
    let dir = TempDir::new().unwrap();
    let f = write_fixture(dir.path(), "f", "one two");

    let err = inreplace_pairs(
        &f,
        &[
            Rule::new("", "orphan"),
            Rule::new("one", "1"),
            Rule::new("three", "3"),
        ],
        PairsOptions::default(),
    )
    .unwrap_err();

    let messages = err.report().unwrap().for_file(&f).unwrap();
    assert_eq!(
        messages,
        [
            "no matcher given for replacement \"orphan\"; were the arguments swapped?".to_string(),
            "expected replacement of \"three\" with \"3\"".to_string(),
        ]
    );
    // Nothing is written when any pair failed.
    assert_eq!(fs::read_to_string(&f).unwrap(), "one two");
}

#[test]
fn blank_pair_alone_only_reports_itself() {
    let dir = TempDir::new().unwrap();
    let f = write_fixture(dir.path(), "f", "one two");

    let err = inreplace_pairs(
        &f,
        &[Rule::new("   ", "x"), Rule::new("two", "2")],
        PairsOptions::default(),
    )
    .unwrap_err();

    let report = err.report().unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report.for_file(&f).unwrap().len(), 1);
}

#[test]
fn unreadable_file_propagates_io_error() {
    let dir = TempDir::new().unwrap();

    let err = inreplace_pairs(
        dir.path().join("absent"),
        &[Rule::new("a", "b")],
        PairsOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, InreplaceError::Read { .. }));
}

#[test]
fn empty_pair_list_returns_content_unchanged() {
    let dir = TempDir::new().unwrap();
    let f = write_fixture(dir.path(), "f", "untouched");

    let result = inreplace_pairs(&f, &[], PairsOptions::default()).unwrap();

    assert_eq!(result, b"untouched");
}
