use super::{PathTemplate, Router};
use crate::metadata::{load_application_from_str, Format};
use crate::runtime_config::RuntimeConfig;

fn compile(t: &str) -> PathTemplate {
    PathTemplate::compile(t).unwrap()
}

#[test]
fn test_root_path() {
    let t = compile("/");
    assert!(t.match_path("/").is_some());
    assert!(t.names().is_empty());
}

#[test]
fn test_parameterized_path() {
    let t = compile("/items/{id}");
    let params = t.match_path("/items/123").unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(&*params[0].0, "id");
    assert_eq!(params[0].1, "123");
}

#[test]
fn test_custom_group_pattern() {
    let t = compile("/movies/{id:[0-9]+}");
    assert!(t.match_path("/movies/42").is_some());
    assert!(t.match_path("/movies/abc").is_none());
}

#[test]
fn test_nested_braces_in_pattern() {
    let t = compile("/codes/{code:[A-Z]{3}}");
    assert!(t.match_path("/codes/ABC").is_some());
    assert!(t.match_path("/codes/ABCD").is_none());
}

#[test]
fn test_full_match_required() {
    let t = compile("/a/{b}/c");
    assert!(t.match_path("/a/1/c").is_some());
    assert!(t.match_path("/a/1/c/d").is_none());
    assert!(t.match_path("/x/a/1/c").is_none());
    assert!(t.match_path("/a/1/2/c").is_none());
}

#[test]
fn test_literal_regex_characters_are_escaped() {
    let t = compile("/files/v1.0/{name}");
    assert!(t.match_path("/files/v1.0/readme").is_some());
    assert!(t.match_path("/files/v1x0/readme").is_none());
}

#[test]
fn test_template_errors() {
    for bad in ["/a/{", "/a/}", "/a/{}", "/a/{id}/{id}", "/a/{id:(}", "/a/{na me}", "/a/{id:}"] {
        assert!(PathTemplate::compile(bad).is_err(), "expected failure for {bad:?}");
    }
}

#[test]
fn test_render_round_trip() {
    let cases = [
        ("/movies/{id}", "/movies/42"),
        ("/a/{x}/b/{y:[0-9]+}", "/a/hello%20world/b/7"),
        ("/static", "/static"),
        ("/users/{user}/posts/{post}/comments", "/users/ann/posts/p-1/comments"),
    ];
    for (template, uri) in cases {
        let t = compile(template);
        let params = t.match_path(uri).unwrap();
        let rendered = t.render(params.iter().map(|(_, v)| v.as_str())).unwrap();
        assert_eq!(rendered, uri, "round trip failed for {template}");
    }
}

#[test]
fn test_render_requires_exact_value_count() {
    let t = compile("/a/{x}/{y}");
    assert_eq!(t.render(["1"]), None);
    assert_eq!(t.render(["1", "2", "3"]), None);
    assert_eq!(t.render(["1", "2"]).as_deref(), Some("/a/1/2"));
}

#[test]
fn test_render_with_lookup() {
    let t = compile("/movies/{id}/cast/{name}");
    let rendered = t.render_with(|n| match n {
        "id" => Some("7"),
        "name" => Some("kim"),
        _ => None,
    });
    assert_eq!(rendered.as_deref(), Some("/movies/7/cast/kim"));
    assert_eq!(t.render_with(|_| None), None);
}

#[test]
fn test_match_uri_strips_base_and_query() {
    let t = compile("/movies/{id}");
    let params = t.match_uri("/api", "/api/movies/9?lang=en").unwrap();
    assert_eq!(params[0].1, "9");
    assert!(t.match_uri("/api", "/apix/movies/9").is_none());
    assert!(t.match_uri("/api", "/movies/9").is_none());
}

const CATALOG: &str = r#"
name: catalog
base_path: /api
resources:
  - name: Movie
    path: /movies/{id}
    methods:
      - name: GET
        responses: [{}]
  - name: Latest
    path: /movies/latest
    methods:
      - name: GET
        responses: [{}]
  - name: Root
    path: /
    methods:
      - name: GET
        responses: [{}]
"#;

fn router() -> Router {
    let app = load_application_from_str(CATALOG, Format::Yaml, &RuntimeConfig::default()).unwrap();
    Router::new(&app)
}

#[test]
fn test_router_prefers_literal_templates() {
    let r = router();
    assert_eq!(r.route("/api/movies/latest").unwrap().resource.name, "Latest");
    let m = r.route("/api/movies/12").unwrap();
    assert_eq!(m.resource.name, "Movie");
    assert_eq!(m.get_path_param("id"), Some("12"));
    assert_eq!(m.params(), vec![("id".to_string(), "12".to_string())]);
}

#[test]
fn test_router_base_path_root() {
    let r = router();
    assert_eq!(r.route("/api").unwrap().resource.name, "Root");
    assert_eq!(r.route("/api/").unwrap().resource.name, "Root");
}

#[test]
fn test_router_reports_unmatched_path() {
    let r = router();
    let err = r.route("/api/books/1").unwrap_err();
    assert_eq!(err.status(), 404);
    assert!(r.route("/other/movies/1").is_err());
}
