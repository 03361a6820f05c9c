//! Unit tests for CLI commands

use crate::cli::{run_cli, Cli, Commands};
use clap::Parser;
use std::io::Write;
use tempfile::NamedTempFile;

const LIBRARY: &str = r#"
name: library
base_path: /lib
types:
  - name: Book
resources:
  - name: Book
    path: /books/{id:[0-9]+}
    methods:
      - name: GET
        responses:
          - type: Book
            media_types: [application/json]
  - name: Shelf
    path: /shelves
    methods:
      - name: GET
        responses:
          - type: any
            media_types: [application/xml]
"#;

fn declaration() -> NamedTempFile {
    let mut temp = NamedTempFile::with_suffix(".yaml").unwrap();
    temp.write_all(LIBRARY.as_bytes()).unwrap();
    temp.flush().unwrap();
    temp
}

fn run(args: &[&str]) -> (bool, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    let ok = run_cli(&cli, &mut out).unwrap();
    (ok, String::from_utf8(out).unwrap())
}

#[test]
fn test_lint_command_with_flags() {
    let cli = Cli::try_parse_from([
        "declarest",
        "lint",
        "--file",
        "decl.yaml",
        "--fail-on-warning",
        "--errors-only",
    ])
    .unwrap();

    match cli.command {
        Commands::Lint {
            file,
            fail_on_warning,
            errors_only,
        } => {
            assert_eq!(file.to_string_lossy(), "decl.yaml");
            assert!(fail_on_warning);
            assert!(errors_only);
        }
        other => panic!("Expected Lint command, got {other:?}"),
    }
}

#[test]
fn test_all_commands_parse() {
    let commands = [
        vec!["declarest", "inspect", "--file", "d.yaml", "--json"],
        vec!["declarest", "lint", "-f", "d.yaml"],
        vec!["declarest", "match", "--file", "d.yaml", "--uri", "/x", "-m", "GET"],
        vec!["declarest", "--log-level", "debug", "inspect", "--file", "d.yaml"],
    ];
    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {args:?}");
    }
    assert!(Cli::try_parse_from(["declarest", "match", "--file", "d.yaml"]).is_err());
}

#[test]
fn test_inspect_lists_methods() {
    let file = declaration();
    let path = file.path().to_str().unwrap();
    let (ok, out) = run(&["declarest", "inspect", "--file", path]);
    assert!(ok);
    assert!(out.starts_with("library (2 resources)"));
    assert!(out.contains("GET /lib/books/{id:[0-9]+} -> Book"));
    assert!(out.contains("OPTIONS /lib/shelves -> Shelf"));
}

#[test]
fn test_inspect_json_descriptor() {
    let file = declaration();
    let path = file.path().to_str().unwrap();
    let (ok, out) = run(&["declarest", "inspect", "--file", path, "--json"]);
    assert!(ok);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["name"], "library");
    assert_eq!(json["resources"].as_array().unwrap().len(), 2);
}

#[test]
fn test_lint_threshold() {
    let file = declaration();
    let path = file.path().to_str().unwrap();

    // application/xml has no built-in writer: a warning, not an error.
    let (ok, out) = run(&["declarest", "lint", "--file", path]);
    assert!(ok, "{out}");
    let (ok, _) = run(&["declarest", "lint", "--file", path, "--fail-on-warning"]);
    assert!(!ok);
}

#[test]
fn test_match_uri() {
    let file = declaration();
    let path = file.path().to_str().unwrap();

    let (ok, out) = run(&["declarest", "match", "--file", path, "--uri", "/lib/books/12", "-m", "GET"]);
    assert!(ok);
    assert!(out.contains("resource: Book"));
    assert!(out.contains("id = 12"));

    let (ok, out) = run(&["declarest", "match", "--file", path, "--uri", "/lib/books/twelve"]);
    assert!(!ok);
    assert!(out.starts_with("no match"));

    let (ok, out) = run(&["declarest", "match", "--file", path, "--uri", "/lib/shelves", "-m", "PUT"]);
    assert!(!ok);
    assert!(out.contains("allowed: GET, OPTIONS"));
}

#[test]
fn test_missing_file_is_an_error() {
    let cli = Cli::try_parse_from(["declarest", "inspect", "--file", "/nonexistent/decl.yaml"]).unwrap();
    let mut out = Vec::new();
    let err = run_cli(&cli, &mut out).unwrap_err();
    assert!(format!("{err:#}").contains("failed to load declarations"));
}
