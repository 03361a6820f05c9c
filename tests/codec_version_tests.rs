use declarest::codec::{CodecRegistry, CodecSpec, EntityWriter, JsonCodec};
use declarest::error::ResolutionError;
use declarest::media::MediaType;
use declarest::metadata::{PayloadType, TypeRegistry};
use declarest::version::VersionRange;
use serde_json::json;
use std::sync::Arc;

const VENDOR: &str = "application/vnd.movie+json";

fn movie() -> PayloadType {
    let mut types = TypeRegistry::new();
    types.declare("Movie", &[]).unwrap()
}

fn registry() -> CodecRegistry {
    let mut codecs = CodecRegistry::with_builtin_codecs(true).unwrap();
    for (name, version) in [("movie-v1", "1.0"), ("movie-v1.5", "1.5"), ("movie-v2", "2.0")] {
        codecs
            .register_writer(
                CodecSpec::new(name, movie()).media_types([VENDOR]).version(version),
                Arc::new(JsonCodec) as Arc<dyn EntityWriter>,
            )
            .unwrap();
    }
    codecs
}

fn negotiate(accept: &str, version: Option<&str>) -> Result<String, ResolutionError> {
    let produces = [MediaType::parse(VENDOR).unwrap()];
    registry()
        .negotiate_writer(&movie(), &produces, Some(accept), version)
        .map(|n| n.writer.name().to_string())
}

fn negotiated(accept: &str, version: Option<&str>) -> String {
    negotiate(accept, version).unwrap()
}

fn ambiguous_candidates(err: ResolutionError) -> Vec<String> {
    match err {
        ResolutionError::MediaTypeAmbiguous { candidates, .. } => candidates,
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

const ALL_JSON_WRITERS: [&str; 4] = ["json", "movie-v1", "movie-v1.5", "movie-v2"];

#[test]
fn test_embedded_version_picks_latest_compatible() {
    assert_eq!(negotiated("application/vnd.movie.v1+json", None), "movie-v1.5");
    assert_eq!(negotiated("application/vnd.movie.v2+json", None), "movie-v2");
    assert_eq!(negotiated("application/vnd.movie.v1.0+json", None), "movie-v1");
}

#[test]
fn test_unversioned_request_with_versioned_writers_is_ambiguous() {
    let err = negotiate(VENDOR, None).unwrap_err();
    assert_eq!(err.status(), 500);
    assert_eq!(ambiguous_candidates(err), ALL_JSON_WRITERS);
}

#[test]
fn test_version_header_overrides_media_type() {
    assert_eq!(negotiated(VENDOR, Some("2")), "movie-v2");
    assert_eq!(negotiated("application/vnd.movie.v2+json", Some("[1.0,1.2)")), "movie-v1");
    assert_eq!(negotiated(VENDOR, Some("(,)")), "movie-v2");
}

#[test]
fn test_out_of_range_falls_back_to_unversioned() {
    assert_eq!(negotiated(VENDOR, Some("[3,)")), "json");
}

#[test]
fn test_unparsable_version_header_leaves_no_range() {
    let err = negotiate(VENDOR, Some("not-a-version")).unwrap_err();
    assert_eq!(ambiguous_candidates(err), ALL_JSON_WRITERS);
}

#[test]
fn test_same_version_twice_is_ambiguous() {
    let mut codecs = registry();
    codecs
        .register_writer(
            CodecSpec::new("movie-v2-alt", movie()).media_types([VENDOR]).version("2"),
            Arc::new(JsonCodec) as Arc<dyn EntityWriter>,
        )
        .unwrap();
    let media_type = MediaType::parse(VENDOR).unwrap();
    let range = VersionRange::parse("[2,)").unwrap();
    let err = codecs.resolve_writer(&movie(), &media_type, Some(&range)).unwrap_err();
    match err {
        ResolutionError::MediaTypeAmbiguous { candidates, .. } => {
            assert_eq!(candidates, vec!["movie-v2".to_string(), "movie-v2-alt".to_string()]);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn test_duplicate_writer_name_rejected() {
    let mut codecs = registry();
    let err = codecs
        .register_writer(
            CodecSpec::new("movie-v1", movie()).media_types([VENDOR]),
            Arc::new(JsonCodec) as Arc<dyn EntityWriter>,
        )
        .unwrap_err();
    assert!(err.to_string().contains("duplicate writer 'movie-v1'"));
}

#[test]
fn test_cache_returns_same_registration() {
    let codecs = registry();
    let media_type = MediaType::parse(VENDOR).unwrap();
    let range = VersionRange::parse("[1,2)").unwrap();
    let first = codecs.resolve_writer(&movie(), &media_type, Some(&range)).unwrap();
    let second = codecs.resolve_writer(&movie(), &media_type, Some(&range)).unwrap();
    assert_eq!(first.name(), "movie-v1.5");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(codecs.cache_size(), 1);
    assert_eq!(first.write(&json!("x"), &media_type).unwrap(), b"\"x\"".to_vec());
}
