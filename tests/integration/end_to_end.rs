// tests/integration/end_to_end.rs
use std::path::Path;

use asm_versions::presentation::{displayable_rows, write_results};
use asm_versions_engine::{
    config::{Config, ConfigBuilder},
    fixture::AssemblyImage,
    options::OutputFormat,
    run,
};

use crate::common::{ECMA_KEY, ScanTree, native};

fn config(root: &Path, filter: Option<&str>) -> Config {
    ConfigBuilder::default()
        .root(root)
        .filter(filter.map(str::to_owned))
        .build()
        .unwrap()
}

fn render(config: &Config) -> String {
    let result = run(config).unwrap();
    let mut out = Vec::new();
    write_results(&result, config, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn displayed_names(root: &Path, filter: Option<&str>) -> Vec<String> {
    let result = run(&config(root, filter)).unwrap();
    displayable_rows(&result.records)
        .iter()
        .map(|r| r.name.clone())
        .collect()
}

#[test]
fn malformed_file_is_skipped_without_aborting() {
    let tree = ScanTree::new();
    tree.assembly("Valid.dll", AssemblyImage::new("Valid").version(1, 0, 0, 0));
    tree.file("Corrupt.dll", b"MZ\x90\x00\x03\x00\x00\x00truncated");

    let result = run(&config(tree.path(), None)).unwrap();
    assert_eq!(result.scanned(), 2);
    let rows = displayable_rows(&result.records);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Valid");
}

#[test]
fn rows_never_exceed_matched_files() {
    let tree = ScanTree::new();
    tree.assembly("a/One.dll", AssemblyImage::new("One"));
    tree.assembly("b/Two.dll", AssemblyImage::new("Two"));
    tree.file("b/Native.dll", b"\x7FELF not a PE image");
    tree.assembly("c/Part.dll", AssemblyImage::new("Part").without_assembly_row());
    tree.file("c/notes.txt", b"ignored");

    let result = run(&config(tree.path(), None)).unwrap();
    assert_eq!(result.scanned(), 4);
    assert_eq!(displayable_rows(&result.records).len(), 2);
}

#[test]
fn bare_filter_matches_exact_name_only() {
    let tree = ScanTree::new();
    tree.assembly("Foo.dll", AssemblyImage::new("Foo"));
    tree.assembly("FooBar.dll", AssemblyImage::new("FooBar"));
    tree.assembly("XFooY.dll", AssemblyImage::new("XFooY"));

    assert_eq!(displayed_names(tree.path(), Some("Foo")), ["Foo"]);
    assert_eq!(
        displayed_names(tree.path(), Some("*Foo*")),
        ["Foo", "FooBar", "XFooY"]
    );
}

#[test]
fn default_filter_ignores_other_extensions() {
    let tree = ScanTree::new();
    tree.assembly("Lib.dll", AssemblyImage::new("Lib"));
    tree.assembly("Tool.exe", AssemblyImage::new("Tool"));

    assert_eq!(displayed_names(tree.path(), None), ["Lib"]);

    let exe = ConfigBuilder::default()
        .root(tree.path())
        .extension("exe")
        .build()
        .unwrap();
    let result = run(&exe).unwrap();
    assert_eq!(result.pattern, "*.exe");
    assert_eq!(result.records[0].name, "Tool");
}

#[test]
fn paths_are_relative_to_the_root() {
    let tree = ScanTree::new();
    tree.assembly("sub/dir/file.dll", AssemblyImage::new("Deep"));

    let result = run(&config(tree.path(), None)).unwrap();
    assert_eq!(result.records[0].relative_path, native("sub/dir/file.dll"));
}

#[test]
fn signed_assemblies_report_their_token() {
    let tree = ScanTree::new();
    tree.assembly(
        "System.Runtime.dll",
        AssemblyImage::new("System.Runtime")
            .version(8, 0, 0, 0)
            .public_key(&ECMA_KEY),
    );
    tree.assembly("Unsigned.dll", AssemblyImage::new("Unsigned").version(0, 1, 0, 0));

    let out = render(&config(tree.path(), None));
    let signed = out.lines().find(|l| l.starts_with("System.Runtime")).unwrap();
    assert!(signed.contains("8.0.0.0"));
    assert!(signed.contains("b77a5c561934e089"));
    let unsigned = out.lines().find(|l| l.starts_with("Unsigned")).unwrap();
    assert!(!unsigned.contains("b77a5c561934e089"));
}

#[test]
fn versions_of_one_library_are_listed_newest_first() {
    let tree = ScanTree::new();
    tree.assembly("app1/Json.dll", AssemblyImage::new("Json").version(12, 0, 1, 0));
    tree.assembly("app2/Json.dll", AssemblyImage::new("Json").version(13, 0, 3, 0));
    tree.assembly("app3/Json.dll", AssemblyImage::new("Json").version(9, 0, 0, 0));

    let result = run(&config(tree.path(), None)).unwrap();
    let versions: Vec<_> = displayable_rows(&result.records)
        .iter()
        .map(|r| r.version.to_string())
        .collect();
    assert_eq!(versions, ["13.0.3.0", "12.0.1.0", "9.0.0.0"]);
}

#[test]
fn repeated_scans_produce_identical_output() {
    let tree = ScanTree::new();
    tree.assembly("z/B.dll", AssemblyImage::new("B").version(1, 0, 0, 0));
    tree.assembly("a/B.dll", AssemblyImage::new("B").version(1, 0, 0, 0));
    tree.assembly("A.dll", AssemblyImage::new("A").version(2, 0, 0, 0));
    tree.file("junk.dll", b"junk");

    let cfg = config(tree.path(), None);
    assert_eq!(render(&cfg), render(&cfg));
}

#[test]
fn empty_directory_renders_headers_only() {
    let tree = ScanTree::new();
    let out = render(&config(tree.path(), None));
    let first = out.lines().next().unwrap();
    for header in ["Name", "Version", "PublicKeyToken", "Path"] {
        assert!(first.contains(header));
    }
    assert!(!out.contains(".dll"));
}

#[test]
fn json_output_carries_culture() {
    let tree = ScanTree::new();
    tree.assembly(
        "de/App.resources.dll",
        AssemblyImage::new("App.resources").culture("de"),
    );

    let cfg = Config {
        format: OutputFormat::Json,
        ..config(tree.path(), None)
    };
    let value: serde_json::Value = serde_json::from_str(&render(&cfg)).unwrap();
    assert_eq!(value[0]["name"], "App.resources");
    assert_eq!(value[0]["culture"], "de");
    assert_eq!(value[0]["path"], native("de/App.resources.dll"));
}
