use super::write_fixture;
use inreplace::{
    inreplace, inreplace_with, Inreplace, InreplaceError, Matcher, ReportKey, TextBuffer,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn valid_file_is_written_even_when_sibling_fails() {
    let dir = TempDir::new().unwrap();
    let f1 = write_fixture(dir.path(), "f1.mk", "PREFIX = /usr/local\n");
    let f2 = write_fixture(dir.path(), "f2.mk", "DESTDIR = /tmp/stage\n");

    let err = inreplace([&f1, &f2], "/usr/local", "/opt/homebrew").unwrap_err();

    let report = err.report().expect("aggregate report");
    let failed: Vec<_> = report.files().collect();
    assert_eq!(failed, [f2.as_path()]);
    assert_eq!(
        report.for_file(&f2).unwrap(),
        ["expected replacement of \"/usr/local\" with \"/opt/homebrew\"".to_string()]
    );

    assert_eq!(fs::read_to_string(&f1).unwrap(), "PREFIX = /opt/homebrew\n");
    assert_eq!(fs::read_to_string(&f2).unwrap(), "DESTDIR = /tmp/stage\n");
}

#[test]
fn aggregate_message_lists_every_failing_file() {
    let dir = TempDir::new().unwrap();
    let a = write_fixture(dir.path(), "a", "one\n");
    let b = write_fixture(dir.path(), "b", "two\n");
    let c = write_fixture(dir.path(), "c", "needle\n");

    let err = inreplace([&a, &b, &c], "needle", "pin").unwrap_err();

    let rendered = err.to_string();
    let expected = format!(
        "inreplace failed\n{}:\n  expected replacement of \"needle\" with \"pin\"\n{}:\n  expected replacement of \"needle\" with \"pin\"\n",
        a.display(),
        b.display()
    );
    assert_eq!(rendered, expected);
    assert_eq!(fs::read_to_string(&c).unwrap(), "pin\n");
}

#[test]
fn report_preserves_input_order() {
    let dir = TempDir::new().unwrap();
    let z = write_fixture(dir.path(), "z", "x");
    let a = write_fixture(dir.path(), "a", "x");

    let err = inreplace([&z, &a], "missing", "y").unwrap_err();

    let failed: Vec<_> = err.report().unwrap().files().collect();
    assert_eq!(failed, [z.as_path(), a.as_path()]);
}

#[test]
fn empty_path_list_is_keyed_to_parameter() {
    let err = inreplace(Vec::<String>::new(), "a", "b").unwrap_err();

    let report = err.report().unwrap();
    assert_eq!(report.files().count(), 0);
    assert_eq!(
        report.get(&ReportKey::parameter("paths")).unwrap(),
        ["`paths` was empty".to_string()]
    );
    assert!(err.to_string().contains("`paths` parameter:\n  `paths` was empty"));
}

#[test]
fn validation_off_leaves_unmatched_file_alone() {
    let dir = TempDir::new().unwrap();
    let f = write_fixture(dir.path(), "f", "content\n");

    let rewrites = Inreplace::new([&f])
        .rule("absent", "present")
        .validate(false)
        .run()
        .unwrap();

    assert_eq!(rewrites.len(), 1);
    assert!(!rewrites[0].changed());
    assert!(!rewrites[0].written);
    assert_eq!(fs::read_to_string(&f).unwrap(), "content\n");
}

#[test]
fn identity_replacement_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let f = write_fixture(dir.path(), "f", "A B A");

    inreplace([&f], "A", "A").unwrap();

    assert_eq!(fs::read(&f).unwrap(), b"A B A");
}

#[test]
fn regex_rule_expands_captures() {
    let dir = TempDir::new().unwrap();
    let f = write_fixture(
        dir.path(),
        "setup.cfg",
        "version = 1.2.3\nrequires = foo>=1.0\n",
    );

    Inreplace::new([&f])
        .rule(
            Matcher::pattern(r"(?m)^version = (\d+)\.(\d+)\.\d+$").unwrap(),
            "version = $1.$2.0",
        )
        .run()
        .unwrap()
        .into_iter()
        .for_each(|rewrite| assert!(rewrite.written));

    assert_eq!(
        fs::read_to_string(&f).unwrap(),
        "version = 1.2.0\nrequires = foo>=1.0\n"
    );
}

#[test]
fn path_matcher_replaces_displayed_path() {
    let dir = TempDir::new().unwrap();
    let prefix = dir.path().join("prefix");
    let f = write_fixture(
        dir.path(),
        "paths.h",
        &format!("#define PREFIX \"{}\"\n", prefix.display()),
    );

    inreplace([&f], prefix.as_path(), "/opt/homebrew").unwrap();

    assert_eq!(
        fs::read_to_string(&f).unwrap(),
        "#define PREFIX \"/opt/homebrew\"\n"
    );
}

#[test]
fn transform_errors_are_aggregated_per_file() {
    let dir = TempDir::new().unwrap();
    let good = write_fixture(dir.path(), "good/Makefile", "CC = gcc\nCFLAGS = -O2\n");
    let bad = write_fixture(dir.path(), "bad/Makefile", "CC = gcc\n");

    let err = inreplace_with([&good, &bad], |s: &mut TextBuffer| {
        s.change_make_var("CC", "clang");
        s.remove_make_var(&["CFLAGS"]);
    })
    .unwrap_err();

    let report = err.report().unwrap();
    assert!(report.for_file(&good).is_none());
    assert_eq!(
        report.for_file(&bad).unwrap(),
        ["expected to remove \"CFLAGS\"".to_string()]
    );
    assert_eq!(fs::read_to_string(&good).unwrap(), "CC=clang\n");
    assert_eq!(fs::read_to_string(&bad).unwrap(), "CC = gcc\n");
}

#[test]
fn transform_may_apply_several_rules() {
    let dir = TempDir::new().unwrap();
    let f = write_fixture(dir.path(), "f", "alpha beta gamma");

    inreplace_with([&f], |s: &mut TextBuffer| {
        s.replace_all(&Matcher::literal("alpha"), "a", true);
        s.replace_first(&Matcher::pattern(r"b\w+").unwrap(), "b", true);
    })
    .unwrap();

    assert_eq!(fs::read_to_string(&f).unwrap(), "a b gamma");
}

#[test]
fn io_failure_is_not_aggregated() {
    let dir = TempDir::new().unwrap();
    let first = write_fixture(dir.path(), "first", "x");
    let missing = dir.path().join("missing");

    let err = inreplace([&first, &missing], "x", "y").unwrap_err();

    assert!(matches!(err, InreplaceError::Read { ref path, .. } if path == &missing));
    // Earlier files were already committed before the failure.
    assert_eq!(fs::read_to_string(&first).unwrap(), "y");
}

#[test]
fn non_utf8_file_is_rewritten_byte_for_byte() {
    let dir = TempDir::new().unwrap();
    let f = dir.path().join("Makefile");
    fs::write(&f, b"# Ren\xe9\nPREFIX = /usr/local\n\xff\n").unwrap();

    let rewrites = Inreplace::new([&f])
        .rule("/usr/local", "/opt")
        .run()
        .unwrap();

    assert!(rewrites[0].written);
    assert_eq!(fs::read(&f).unwrap(), b"# Ren\xe9\nPREFIX = /opt\n\xff\n");
}

#[test]
fn non_utf8_file_reports_misses_like_any_other() {
    let dir = TempDir::new().unwrap();
    let f = dir.path().join("latin1.txt");
    fs::write(&f, [b'c', b'a', b'f', 0xe9]).unwrap();

    let err = inreplace([&f], "cafe", "coffee").unwrap_err();

    assert_eq!(
        err.report().unwrap().for_file(&f).unwrap(),
        ["expected replacement of \"cafe\" with \"coffee\"".to_string()]
    );
    assert_eq!(fs::read(&f).unwrap(), [b'c', b'a', b'f', 0xe9]);
}
