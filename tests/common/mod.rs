#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Write `content` to a temporary declaration file with extension `ext`.
    ///
    /// The file is removed when the returned handle drops.
    pub fn create_temp_declaration(content: &str, ext: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(format!(".{ext}")).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        create_temp_declaration(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> NamedTempFile {
        create_temp_declaration(content, "json")
    }
}

pub mod fixtures {
    use declarest::metadata::{load_application_from_str, Application, Format};
    use declarest::runtime_config::RuntimeConfig;
    use std::sync::Arc;

    /// A small movie catalogue exercising templates, variants, filters and roles.
    pub const CINEMA: &str = r#"
name: cinema
base_path: /api
description: Movie catalogue
types:
  - name: Movie
  - name: Feature
    extends: [Movie]
  - name: Review
resources:
  - name: Movies
    path: /movies
    methods:
      - name: GET
        filters:
          - name: genre
            default: all
            pattern: "[a-z]+"
          - name: limit
            type: integer
            default: "20"
        responses:
          - type: Movie
            media_types: [application/json, application/yaml, text/plain]
      - name: POST
        default_status: 201
        see_other: Movie
        requests:
          - type: Movie
            media_types: [application/json]
        responses:
          - type: Movie
  - name: Latest
    path: /movies/latest
    methods:
      - name: GET
        responses:
          - type: Feature
            media_types: [application/json]
  - name: Movie
    path: /movies/{id:[0-9]+}
    methods:
      - name: GET
        headers:
          - name: X-Catalogue
            default: main
        responses:
          - type: Feature
            media_types: [application/json]
          - type: Review
            media_types: [application/json]
            status: 203
      - name: DELETE
        default_status: 204
        roles_allowed: [admin]
        responses:
          - type: any
  - name: Cast
    path: /movies/{id:[0-9]+}/cast/{name}
    methods:
      - name: GET
        responses:
          - type: any
            media_types: [application/json]
"#;

    pub fn cinema() -> Arc<Application> {
        Arc::new(load_application_from_str(CINEMA, Format::Yaml, &RuntimeConfig::default()).unwrap())
    }
}
