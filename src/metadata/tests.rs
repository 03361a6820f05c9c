use super::*;
use crate::error::MetadataError;
use crate::runtime_config::RuntimeConfig;

const MOVIES: &str = r#"
name: movies
base_path: api/
transport_guarantee: confidential
types:
  - name: Media
  - name: Movie
    extends: [Media]
resources:
  - name: Movies
    path: /movies
    methods:
      - name: POST
        default_status: 201
        see_other: Movie
        requests:
          - type: Movie
            media_types: [application/json]
        responses:
          - type: Movie
  - name: Movie
    path: /movies/{id:[0-9]+}
    methods:
      - name: GET
        roles_allowed: [viewer]
        interceptors: [audit]
        filters:
          - name: lang
            default: en
            pattern: "[a-z]{2}"
        headers:
          - name: X-Count
            kind: integer
            default: "3"
        responses:
          - type: Movie
            media_types: [application/json, application/xml]
            headers:
              - name: Last-Modified
                kind: date
"#;

fn build(yaml: &str) -> Result<Application, anyhow::Error> {
    load_application_from_str(yaml, Format::Yaml, &RuntimeConfig::default())
}

fn metadata_error(yaml: &str) -> MetadataError {
    let err = build(yaml).unwrap_err();
    match err.downcast::<MetadataError>() {
        Ok(e) => e,
        Err(other) => panic!("expected MetadataError, got {other:#}"),
    }
}

#[test]
fn test_build_movies_application() {
    let app = build(MOVIES).unwrap();
    assert_eq!(app.name, "movies");
    assert_eq!(app.base_path, "/api");
    assert_eq!(app.transport_guarantee, TransportGuarantee::Confidential);

    let movie = app.resource("Movie").unwrap();
    let get = movie.method("GET").unwrap();
    assert!(get.is_restricted());
    assert!(get.declares_interceptor("audit"));
    assert_eq!(get.filters[0].default.as_deref(), Some("en"));
    assert!(get.filters[0].accepts("fr"));
    assert!(!get.filters[0].accepts("french"));
    let response = get.response("Movie").unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.media_types.len(), 2);
    assert_eq!(response.headers[0].kind, HeaderKind::Date);

    let post = app.resource("Movies").unwrap().method("POST").unwrap();
    assert_eq!(post.default_status, 201);
    assert_eq!(post.response("Movie").unwrap().status, 201);
    assert_eq!(post.see_other.as_deref(), Some("Movie"));
}

#[test]
fn test_implicit_options_method() {
    let app = build(MOVIES).unwrap();
    let movie = app.resource("Movie").unwrap();
    assert_eq!(movie.allowed_methods(), vec!["GET", "OPTIONS"]);

    let config = RuntimeConfig {
        implicit_options: false,
        ..RuntimeConfig::default()
    };
    let app = load_application_from_str(MOVIES, Format::Yaml, &config).unwrap();
    assert_eq!(app.resource("Movie").unwrap().allowed_methods(), vec!["GET"]);
}

#[test]
fn test_type_assignability_follows_declared_ancestors() {
    let app = build(MOVIES).unwrap();
    let media = app.types.get("Media").unwrap();
    let movie = app.types.get("Movie").unwrap();
    let any = app.types.get(ANY_TYPE).unwrap();
    assert!(media.is_assignable_from(movie));
    assert!(!movie.is_assignable_from(media));
    assert!(any.is_assignable_from(movie));
    assert!(movie.is_assignable_from(movie));
}

#[test]
fn test_method_without_response_is_rejected() {
    let yaml = r#"
name: app
resources:
  - name: R
    path: /r
    methods:
      - name: GET
"#;
    assert!(matches!(
        metadata_error(yaml),
        MetadataError::MissingResponse { ref method, .. } if method == "GET"
    ));
}

#[test]
fn test_bad_media_type_is_rejected() {
    let yaml = r#"
name: app
resources:
  - name: R
    path: /r
    methods:
      - name: GET
        responses:
          - media_types: [json]
"#;
    assert!(matches!(metadata_error(yaml), MetadataError::MediaType(_)));
}

#[test]
fn test_duplicate_names_are_rejected() {
    let yaml = r#"
name: app
resources:
  - name: R
    path: /r
    methods:
      - name: GET
        responses: [{}]
  - name: R
    path: /s
    methods:
      - name: GET
        responses: [{}]
"#;
    assert!(matches!(
        metadata_error(yaml),
        MetadataError::Duplicate { kind: "resource", .. }
    ));
}

#[test]
fn test_unknown_type_and_see_other_target() {
    let unknown = r#"
name: app
resources:
  - name: R
    path: /r
    methods:
      - name: GET
        responses: [{type: Ghost}]
"#;
    assert!(matches!(metadata_error(unknown), MetadataError::UnknownType { .. }));

    let dangling = r#"
name: app
resources:
  - name: R
    path: /r
    methods:
      - name: POST
        see_other: Nowhere
        responses: [{}]
"#;
    assert!(matches!(metadata_error(dangling), MetadataError::Invalid { .. }));
}

#[test]
fn test_invalid_filter_and_header_defaults() {
    let filter = r#"
name: app
resources:
  - name: R
    path: /r
    methods:
      - name: GET
        filters: [{name: page, type: integer, default: "first"}]
        responses: [{}]
"#;
    assert!(matches!(metadata_error(filter), MetadataError::Invalid { .. }));

    let header = r#"
name: app
resources:
  - name: R
    path: /r
    methods:
      - name: GET
        headers: [{name: X-Total, kind: integer, default: "lots"}]
        responses: [{}]
"#;
    assert!(matches!(metadata_error(header), MetadataError::Invalid { .. }));

    let pattern = r#"
name: app
resources:
  - name: R
    path: /r
    methods:
      - name: GET
        filters: [{name: q, pattern: "("}]
        responses: [{}]
"#;
    assert!(matches!(metadata_error(pattern), MetadataError::Pattern { .. }));
}

#[test]
fn test_duplicate_template_groups_are_rejected() {
    let yaml = r#"
name: app
resources:
  - name: R
    path: /r/{id}/{id}
    methods:
      - name: GET
        responses: [{}]
"#;
    assert!(matches!(metadata_error(yaml), MetadataError::Template { .. }));
}

#[test]
fn test_describe_lists_resources_and_variants() {
    let app = build(MOVIES).unwrap();
    let descriptor = app.describe();
    assert_eq!(descriptor.resources.len(), 2);
    let movie = descriptor
        .resources
        .iter()
        .find(|r| r.name == "Movie")
        .unwrap();
    assert_eq!(movie.path, "/movies/{id:[0-9]+}");
    let get = movie.methods.iter().find(|m| m.name == "GET").unwrap();
    assert_eq!(get.filters[0].pattern.as_deref(), Some("[a-z]{2}"));
    assert_eq!(
        get.responses[0].media_types,
        vec![
            "application/json; charset=UTF-8".to_string(),
            "application/xml; charset=UTF-8".to_string()
        ]
    );

    let json = serde_json::to_value(&descriptor).unwrap();
    assert_eq!(json["transport_guarantee"], "confidential");
}

#[test]
fn test_dump_lists_every_method() {
    let app = build(MOVIES).unwrap();
    let lines = app.dump();
    assert!(lines.contains(&"GET /api/movies/{id:[0-9]+} -> Movie".to_string()));
    assert!(lines.contains(&"POST /api/movies -> Movies".to_string()));
}

#[test]
fn test_json_format() {
    let json = r#"{"name":"app","resources":[{"name":"R","path":"/r","methods":[{"name":"GET","responses":[{"type":"any"}]}]}]}"#;
    let app = load_application_from_str(json, Format::Json, &RuntimeConfig::default()).unwrap();
    assert!(app.resource("R").is_some());
}
