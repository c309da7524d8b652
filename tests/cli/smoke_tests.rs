use assert_cmd::Command;
use asm_versions_engine::fixture::AssemblyImage;
use predicates::prelude::*;

use crate::common::{ECMA_KEY, ScanTree};

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_asm_versions"))
}

#[test]
fn shows_help() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("asm_versions"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn lists_assemblies_under_path() {
    let tree = ScanTree::new();
    tree.assembly(
        "lib/Contoso.Core.dll",
        AssemblyImage::new("Contoso.Core")
            .version(1, 2, 3, 4)
            .public_key(&ECMA_KEY),
    );
    tree.file("lib/broken.dll", b"not an image");

    bin()
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("PublicKeyToken"))
        .stdout(predicate::str::contains("Contoso.Core"))
        .stdout(predicate::str::contains("1.2.3.4"))
        .stdout(predicate::str::contains("b77a5c561934e089"))
        .stdout(predicate::str::contains("broken.dll").not())
        .stderr(predicate::str::is_empty());
}

#[test]
fn scans_current_directory_by_default() {
    let tree = ScanTree::new();
    tree.assembly("Here.dll", AssemblyImage::new("Here"));

    bin()
        .current_dir(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Here.dll"));
}

#[test]
fn filter_is_completed_with_extension() {
    let tree = ScanTree::new();
    tree.assembly("Foo.dll", AssemblyImage::new("Foo"));
    tree.assembly("FooBar.dll", AssemblyImage::new("FooBar"));

    bin()
        .arg(tree.path())
        .arg("Foo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Foo.dll"))
        .stdout(predicate::str::contains("FooBar").not());
}

#[test]
fn empty_tree_succeeds_with_headers() {
    let tree = ScanTree::new();

    bin()
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Name"));
}

#[test]
fn missing_root_fails() {
    let tree = ScanTree::new();

    bin()
        .arg(tree.path().join("does-not-exist"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn invalid_filter_fails() {
    let tree = ScanTree::new();

    bin()
        .arg(tree.path())
        .arg("[broken")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid name filter"));
}

#[test]
fn json_format_is_parseable() {
    let tree = ScanTree::new();
    tree.assembly("A.dll", AssemblyImage::new("A").version(3, 0, 0, 0));

    let output = bin()
        .arg(tree.path())
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["name"], "A");
    assert_eq!(value[0]["version"], "3.0.0.0");
}

#[test]
fn verbose_reports_skipped_files() {
    let tree = ScanTree::new();
    tree.file("broken.dll", b"garbage");

    bin()
        .arg(tree.path())
        .arg("-vv")
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping"))
        .stderr(predicate::str::contains("broken.dll"));
}
