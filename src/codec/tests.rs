use super::*;
use crate::error::ResolutionError;
use crate::media::MediaType;
use crate::metadata::{PayloadType, TypeRegistry};
use crate::version::VersionRange;
use serde_json::{json, Value};
use std::sync::Arc;

struct Tag(&'static str);

impl EntityWriter for Tag {
    fn write(&self, _entity: &Value, _media_type: &MediaType) -> anyhow::Result<Vec<u8>> {
        Ok(self.0.as_bytes().to_vec())
    }
}

fn mt(s: &str) -> MediaType {
    MediaType::parse(s).unwrap()
}

fn types() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    types.declare("Media", &[]).unwrap();
    types.declare("Movie", &["Media".to_string()]).unwrap();
    types.declare("Book", &["Media".to_string()]).unwrap();
    types
}

fn writer(registry: &mut CodecRegistry, spec: CodecSpec, tag: &'static str) {
    registry.register_writer(spec, Arc::new(Tag(tag))).unwrap();
}

#[test]
fn test_single_matching_writer_is_returned() {
    let types = types();
    let movie = types.get("Movie").unwrap();
    let mut registry = CodecRegistry::new(true);
    writer(
        &mut registry,
        CodecSpec::new("movie-xml", movie.clone()).media_types(["application/xml"]),
        "xml",
    );
    let w = registry
        .resolve_writer(movie, &mt("application/xml"), None)
        .unwrap();
    assert_eq!(w.name(), "movie-xml");
}

#[test]
fn test_overlapping_writers_are_ambiguous() {
    let types = types();
    let movie = types.get("Movie").unwrap();
    let media = types.get("Media").unwrap();
    let mut registry = CodecRegistry::new(true);
    writer(
        &mut registry,
        CodecSpec::new("movie-json", movie.clone()).media_types(["application/json"]),
        "a",
    );
    writer(
        &mut registry,
        CodecSpec::new("media-json", media.clone()).media_types(["application/vnd.media+json"]),
        "b",
    );
    let err = registry
        .resolve_writer(movie, &mt("application/json"), None)
        .unwrap_err();
    match err {
        ResolutionError::MediaTypeAmbiguous { candidates, .. } => {
            assert_eq!(candidates, vec!["movie-json".to_string(), "media-json".to_string()]);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
    assert_eq!(registry.cache_size(), 0);
}

#[test]
fn test_type_assignability_narrows_candidates() {
    let types = types();
    let mut registry = CodecRegistry::new(true);
    writer(
        &mut registry,
        CodecSpec::new("movie", types.get("Movie").unwrap().clone()),
        "m",
    );
    let book = types.get("Book").unwrap();
    let err = registry
        .resolve_writer(book, &mt("application/json"), None)
        .unwrap_err();
    assert_eq!(err.status(), 406);
}

#[test]
fn test_empty_media_type_list_matches_anything() {
    let mut registry = CodecRegistry::new(false);
    writer(&mut registry, CodecSpec::new("catch-all", PayloadType::any()), "x");
    let w = registry
        .resolve_writer(&PayloadType::named("Anything"), &mt("image/png"), None)
        .unwrap();
    assert_eq!(w.name(), "catch-all");
}

#[test]
fn test_versioned_writer_closest_to_requested_range() {
    let types = types();
    let movie = types.get("Movie").unwrap();
    let mut registry = CodecRegistry::new(true);
    for (name, version) in [("v1", "1.0"), ("v2", "2.0")] {
        writer(
            &mut registry,
            CodecSpec::new(name, movie.clone())
                .media_types(["application/json"])
                .version(version),
            name,
        );
    }
    let json = mt("application/json");
    let range = VersionRange::parse("[1.0,2.0[").unwrap();
    assert_eq!(registry.resolve_writer(movie, &json, Some(&range)).unwrap().name(), "v1");

    let up_to = VersionRange::up_to("1.5").unwrap();
    assert_eq!(registry.resolve_writer(movie, &json, Some(&up_to)).unwrap().name(), "v1");

    let future = VersionRange::parse("[3,)").unwrap();
    assert!(registry.resolve_writer(movie, &json, Some(&future)).is_err());
}

#[test]
fn test_unversioned_writer_is_fallback_for_range() {
    let types = types();
    let movie = types.get("Movie").unwrap();
    let mut registry = CodecRegistry::new(true);
    writer(&mut registry, CodecSpec::new("plain", movie.clone()), "p");
    writer(
        &mut registry,
        CodecSpec::new("v2", movie.clone()).version("2.0"),
        "v2",
    );
    let json = mt("application/json");
    let old = VersionRange::up_to("1").unwrap();
    assert_eq!(registry.resolve_writer(movie, &json, Some(&old)).unwrap().name(), "plain");
    let any_version = VersionRange::unbounded();
    assert_eq!(registry.resolve_writer(movie, &json, Some(&any_version)).unwrap().name(), "v2");
}

fn assert_ambiguous(err: ResolutionError, expected: &[&str]) {
    match err {
        ResolutionError::MediaTypeAmbiguous { candidates, .. } => {
            assert_eq!(candidates, expected.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn test_without_range_every_candidate_counts() {
    let types = types();
    let movie = types.get("Movie").unwrap();
    let json = mt("application/json");

    let mut mixed = CodecRegistry::new(true);
    writer(
        &mut mixed,
        CodecSpec::new("plain", movie.clone()).media_types(["application/json"]),
        "p",
    );
    writer(
        &mut mixed,
        CodecSpec::new("v1", movie.clone())
            .media_types(["application/json"])
            .version("1.0"),
        "v1",
    );
    assert_ambiguous(
        mixed.resolve_writer(movie, &json, None).unwrap_err(),
        &["plain", "v1"],
    );

    let mut versioned = CodecRegistry::new(true);
    for (name, version) in [("v1", "1.0"), ("v2", "2.0")] {
        writer(
            &mut versioned,
            CodecSpec::new(name, movie.clone())
                .media_types(["application/json"])
                .version(version),
            name,
        );
    }
    assert_ambiguous(
        versioned.resolve_writer(movie, &json, None).unwrap_err(),
        &["v1", "v2"],
    );
    assert_eq!(versioned.cache_size(), 0);
}

#[test]
fn test_concurrent_resolution_shares_one_registration() {
    let types = types();
    let movie = types.get("Movie").unwrap();
    let mut registry = CodecRegistry::new(true);
    writer(
        &mut registry,
        CodecSpec::new("movie-json", movie.clone()).media_types(["application/json"]),
        "m",
    );
    let json = mt("application/json");
    let registry = &registry;

    let resolved: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    (0..50)
                        .map(|_| registry.resolve_writer(movie, &json, None).unwrap())
                        .last()
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let registered = &registry.writers()[0];
    assert_eq!(resolved.len(), 8);
    for w in &resolved {
        assert!(Arc::ptr_eq(w, registered));
    }
    assert_eq!(registry.cache_size(), 1);
}

#[test]
fn test_successful_resolutions_are_cached() {
    let mut registry = CodecRegistry::new(true);
    writer(&mut registry, CodecSpec::new("any", PayloadType::any()), "x");
    let movie = PayloadType::named("Movie");
    let json = mt("application/json");
    let first = registry.resolve_writer(&movie, &json, None).unwrap();
    let second = registry.resolve_writer(&movie, &json, None).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.cache_size(), 1);

    let uncached = CodecRegistry::new(false);
    assert_eq!(uncached.cache_size(), 0);
}

#[test]
fn test_duplicate_and_invalid_registrations() {
    let mut registry = CodecRegistry::new(true);
    writer(&mut registry, CodecSpec::new("dup", PayloadType::any()), "x");
    assert!(registry
        .register_writer(CodecSpec::new("dup", PayloadType::any()), Arc::new(Tag("y")))
        .is_err());
    assert!(registry
        .register_writer(
            CodecSpec::new("bad-media", PayloadType::any()).media_types(["json"]),
            Arc::new(Tag("z"))
        )
        .is_err());
    assert!(registry
        .register_writer(
            CodecSpec::new("bad-version", PayloadType::any()).version("one"),
            Arc::new(Tag("z"))
        )
        .is_err());
}

#[test]
fn test_builtin_codecs_round_trip_json() {
    let registry = CodecRegistry::with_builtin_codecs(true).unwrap();
    let movie = PayloadType::named("Movie");
    let json = mt("application/json");
    let w = registry.resolve_writer(&movie, &json, None).unwrap();
    let bytes = w.write(&json!({"title": "Alien"}), &json).unwrap();
    let r = registry.resolve_reader(&movie, &json, None).unwrap();
    assert_eq!(r.read(&bytes, &json).unwrap(), json!({"title": "Alien"}));
}

#[test]
fn test_builtin_text_and_yaml() {
    let registry = CodecRegistry::with_builtin_codecs(false).unwrap();
    let any = PayloadType::any();
    let text = mt("text/plain");
    let w = registry.resolve_writer(&any, &text, None).unwrap();
    assert_eq!(w.write(&json!("hello"), &text).unwrap(), b"hello".to_vec());

    let yaml = mt("application/x-yaml");
    let w = registry.resolve_writer(&any, &yaml, None).unwrap();
    let out = String::from_utf8(w.write(&json!({"a": 1}), &yaml).unwrap()).unwrap();
    assert!(out.contains("a: 1"));
}

#[test]
fn test_vendor_json_resolves_to_builtin_json() {
    let registry = CodecRegistry::with_builtin_codecs(true).unwrap();
    let w = registry
        .resolve_writer(
            &PayloadType::named("Movie"),
            &mt("application/vnd.movie.v1+json"),
            None,
        )
        .unwrap();
    assert_eq!(w.name(), "json");
}

#[test]
fn test_negotiate_walks_accept_entries_in_order() {
    let registry = CodecRegistry::with_builtin_codecs(true).unwrap();
    let movie = PayloadType::named("Movie");
    let n = registry
        .negotiate_writer(&movie, &[], Some("image/png, text/plain;q=0.5"), None)
        .unwrap();
    assert_eq!(n.writer.name(), "text");
    assert_eq!(n.media_type.subtype(), "plain");
}

#[test]
fn test_negotiate_expands_wildcard_to_declared_types() {
    let registry = CodecRegistry::with_builtin_codecs(true).unwrap();
    let movie = PayloadType::named("Movie");
    let produces = vec![mt("application/json")];
    let n = registry
        .negotiate_writer(&movie, &produces, None, None)
        .unwrap();
    assert_eq!(n.writer.name(), "json");
    assert_eq!(n.media_type.to_string(), "application/json; charset=UTF-8");

    let err = registry
        .negotiate_writer(&movie, &[], Some("*/*"), None)
        .unwrap_err();
    assert!(matches!(err, ResolutionError::MediaTypeAmbiguous { .. }));

    let err = registry
        .negotiate_writer(&movie, &produces, Some("image/png"), None)
        .unwrap_err();
    assert!(matches!(err, ResolutionError::MediaTypeNotSupported { .. }));
}

#[test]
fn test_negotiate_uses_version_header_and_embedded_version() {
    let movie = PayloadType::named("Movie");
    let mut registry = CodecRegistry::new(true);
    for (name, version) in [("v1", "1.0"), ("v2", "2.0")] {
        writer(
            &mut registry,
            CodecSpec::new(name, movie.clone())
                .media_types(["application/json"])
                .version(version),
            name,
        );
    }
    let accept = Some("application/json");
    let pick = |version: Option<&str>| {
        registry
            .negotiate_writer(&movie, &[], accept, version)
            .map(|n| n.writer.name().to_string())
    };
    assert_eq!(pick(Some("1.5")).unwrap(), "v1");
    assert_eq!(pick(Some("[1.0,2.0[")).unwrap(), "v1");
    assert_eq!(pick(Some("(,)")).unwrap(), "v2");
    assert_ambiguous(pick(Some("garbage")).unwrap_err(), &["v1", "v2"]);
    assert_ambiguous(pick(None).unwrap_err(), &["v1", "v2"]);

    let n = registry
        .negotiate_writer(&movie, &[], Some("application/vnd.movie.v1+json"), None)
        .unwrap();
    assert_eq!(n.writer.name(), "v1");
}
