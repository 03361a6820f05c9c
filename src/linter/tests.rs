#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::codec::{CodecRegistry, CodecSpec, EntityReader, EntityWriter, JsonCodec};
use crate::dispatcher::{Dispatcher, ExecutorSpec, Outcome};
use crate::generators::GeneratorRegistry;
use crate::linter::{count_at_least, lint_application, LintIssue, LintSeverity};
use crate::metadata::{load_application_from_str, Application, Format};
use crate::runtime_config::RuntimeConfig;
use std::sync::Arc;

const STORE: &str = r#"
name: store
types:
  - name: Order
resources:
  - name: Orders
    path: /orders
    methods:
      - name: POST
        requests:
          - type: Order
            media_types: [application/json]
        responses:
          - type: Order
            media_types: [application/json, application/xml]
  - name: Order
    path: /orders/{id}
    methods:
      - name: GET
        filters:
          - name: view
            default: full
            generator: view-picker
        headers:
          - name: X-Served
            generator: now
          - name: X-Region
            generator: region
        responses:
          - type: Order
  - name: OrderAlias
    path: /orders/{id}
    methods:
      - name: GET
        responses:
          - type: any
"#;

fn store() -> Arc<Application> {
    Arc::new(load_application_from_str(STORE, Format::Yaml, &RuntimeConfig::default()).unwrap())
}

fn lint(codecs: &CodecRegistry, dispatcher: &Dispatcher) -> Vec<LintIssue> {
    lint_application(dispatcher.application(), codecs, dispatcher, &GeneratorRegistry::new())
}

fn of_kind<'a>(issues: &'a [LintIssue], kind: &str) -> Vec<&'a LintIssue> {
    issues.iter().filter(|i| i.kind == kind).collect()
}

#[test]
fn test_lint_missing_writer() {
    let codecs = CodecRegistry::with_builtin_codecs(true).unwrap();
    let dispatcher = Dispatcher::new(store());
    let issues = lint(&codecs, &dispatcher);

    let missing = of_kind(&issues, "missing_writer");
    assert_eq!(missing.len(), 1, "only application/xml lacks a writer: {issues:?}");
    assert_eq!(missing[0].severity, LintSeverity::Warning);
    assert_eq!(missing[0].location, "Orders/POST/response:Order");
    assert!(of_kind(&issues, "missing_reader").is_empty());
}

#[test]
fn test_lint_ambiguous_writer() {
    let mut codecs = CodecRegistry::new(true);
    let order = store().types.get("Order").cloned().unwrap();
    for name in ["orders-a", "orders-b"] {
        codecs
            .register_writer(
                CodecSpec::new(name, order.clone()).media_types(["application/json"]),
                Arc::new(JsonCodec) as Arc<dyn EntityWriter>,
            )
            .unwrap();
    }
    codecs
        .register_reader(
            CodecSpec::new("orders-in", order).media_types(["application/json"]),
            Arc::new(JsonCodec) as Arc<dyn EntityReader>,
        )
        .unwrap();

    let dispatcher = Dispatcher::new(store());
    let issues = lint(&codecs, &dispatcher);
    let ambiguous = of_kind(&issues, "ambiguous_writer");
    assert_eq!(ambiguous.len(), 1);
    assert_eq!(ambiguous[0].severity, LintSeverity::Error);
    assert!(ambiguous[0].message.contains("orders-a, orders-b"));
    assert!(of_kind(&issues, "missing_reader").is_empty());
}

#[test]
fn test_lint_default_executor() {
    let codecs = CodecRegistry::with_builtin_codecs(true).unwrap();
    let mut dispatcher = Dispatcher::new(store());

    let before = of_kind(&lint(&codecs, &dispatcher), "default_executor").len();
    assert_eq!(before, 3, "OPTIONS is answered by the options executor");

    dispatcher
        .register_executor(
            ExecutorSpec::new("orders").resource("Order.*"),
            Arc::new(|_ctx: &mut crate::dispatcher::ExecutionContext| -> anyhow::Result<Outcome> {
                Ok(Outcome::Empty)
            }),
        )
        .unwrap();
    let issues = lint(&codecs, &dispatcher);
    let remaining = of_kind(&issues, "default_executor");
    assert!(remaining.is_empty(), "unexpected: {remaining:?}");
}

#[test]
fn test_lint_unknown_generators() {
    let codecs = CodecRegistry::with_builtin_codecs(true).unwrap();
    let dispatcher = Dispatcher::new(store());
    let issues = lint(&codecs, &dispatcher);

    let mut locations: Vec<&str> = of_kind(&issues, "unknown_generator")
        .iter()
        .map(|i| i.location.as_str())
        .collect();
    locations.sort_unstable();
    assert_eq!(
        locations,
        vec!["Order/GET/filter:view", "Order/GET/header:X-Region"]
    );
}

#[test]
fn test_lint_duplicate_template() {
    let codecs = CodecRegistry::with_builtin_codecs(true).unwrap();
    let dispatcher = Dispatcher::new(store());
    let issues = lint(&codecs, &dispatcher);
    let duplicates = of_kind(&issues, "duplicate_template");
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].location, "OrderAlias");
}

#[test]
fn test_severity_threshold() {
    let issues = vec![
        LintIssue::new("a", LintSeverity::Info, "x", "x"),
        LintIssue::new("b", LintSeverity::Warning, "y", "y"),
        LintIssue::new("c", LintSeverity::Error, "z", "z"),
    ];
    assert_eq!(count_at_least(&issues, LintSeverity::Info), 3);
    assert_eq!(count_at_least(&issues, LintSeverity::Warning), 2);
    assert_eq!(count_at_least(&issues, LintSeverity::Error), 1);
    assert_eq!(LintSeverity::Warning.to_string(), "warning");
}

#[test]
fn test_issue_serializes_without_empty_suggestion() {
    let issue = LintIssue::new("Order/GET", LintSeverity::Info, "default_executor", "m");
    let json = serde_json::to_value(&issue).unwrap();
    assert_eq!(json["severity"], "info");
    assert!(json.get("suggestion").is_none());
}
