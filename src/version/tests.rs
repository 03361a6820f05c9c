use super::{resolve_best, resolve_best_expr, Version, VersionRange};
use std::collections::BTreeMap;

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

fn range(s: &str) -> VersionRange {
    VersionRange::parse(s).unwrap()
}

#[test]
fn test_parse_version_defaults_missing_components() {
    assert_eq!(v("1"), Version::new(1, 0, 0));
    assert_eq!(v("1.2"), Version::new(1, 2, 0));
    assert_eq!(v("1.2.3"), Version::new(1, 2, 3));
}

#[test]
fn test_parse_version_rejects_garbage() {
    for bad in ["", "a", "1.", "1..2", "1.2.3.4", "1.2b", "-1", "v1"] {
        assert!(Version::parse(bad).is_err(), "expected failure for {bad:?}");
    }
}

#[test]
fn test_version_ordering() {
    assert!(v("1.10") > v("1.9"));
    assert!(v("2") > v("1.99.99"));
    assert!(v("1.0.1") > v("1"));
}

#[test]
fn test_inclusive_range_boundaries() {
    let r = range("[1,2]");
    assert!(r.includes(&v("1")));
    assert!(r.includes(&v("2")));
    assert!(r.includes(&v("2.9999")));
    assert!(!r.includes(&v("3")));
    assert!(!r.includes(&v("0.9")));
}

#[test]
fn test_exclusive_range_boundaries() {
    assert!(!range("[1,2[").includes(&v("2")));
    assert!(range("[1,2[").includes(&v("1.9.9")));
    assert!(!range("]1,2[").includes(&v("1")));
    assert!(range("]1,2[").includes(&v("1.0.1")));
    assert!(!range("(1,2)").includes(&v("2.0.0")));
}

#[test]
fn test_upper_release_is_open_when_unspecified() {
    let r = range("[1.0,2.0]");
    assert!(r.includes(&v("2.0.77")));
    assert!(!r.includes(&v("2.1")));
}

#[test]
fn test_unbounded_ends() {
    assert!(range("(,)").includes(&v("999.1")));
    assert!(range("(,)").is_unbounded());
    assert!(range("[1.5,)").includes(&v("40")));
    assert!(!range("[1.5,)").includes(&v("1.4")));
    assert!(range("(,3)").includes(&v("2.1")));
    assert!(!range("(,3)").includes(&v("3.0.1")));
}

#[test]
fn test_bare_version_is_exact() {
    let r = range("1.5");
    assert!(r.includes(&v("1.5")));
    assert!(r.includes(&v("1.5.3")));
    assert!(!r.includes(&v("1.6")));
    assert!(!r.includes(&v("1.4.9")));
}

#[test]
fn test_range_rejects_malformed_expressions() {
    for bad in ["", "[", "[1,2,3]", "[a,2]", "[1,b)"] {
        assert!(VersionRange::parse(bad).is_err(), "expected failure for {bad:?}");
    }
}

#[test]
fn test_up_to_range() {
    let r = VersionRange::up_to("1.5").unwrap();
    assert!(r.includes(&v("1.0")));
    assert!(r.includes(&v("1.5.2")));
    assert!(!r.includes(&v("1.6")));
}

#[test]
fn test_range_display() {
    assert_eq!(range("[1.0,2.0[").to_string(), "[1.0,2.0)");
    assert_eq!(range("(,)").to_string(), "(,)");
}

fn candidates() -> BTreeMap<Version, &'static str> {
    BTreeMap::from([
        (v("1"), "a"),
        (v("1.1"), "b"),
        (v("2.1"), "c"),
        (v("3.0.1"), "d"),
    ])
}

#[test]
fn test_resolve_best_picks_greatest_match() {
    let c = candidates();
    assert_eq!(resolve_best(&c, &range("(,)")), Some(&"d"));
    assert_eq!(resolve_best(&c, &range("(,3)")), Some(&"c"));
    assert_eq!(resolve_best(&c, &range("[1,1.1]")), Some(&"b"));
    assert_eq!(resolve_best(&c, &range("[4,)")), None);
}

#[test]
fn test_resolve_best_expr_on_empty_input() {
    let empty: BTreeMap<Version, &str> = BTreeMap::new();
    assert_eq!(resolve_best_expr(&empty, "(,)").unwrap(), None);
    assert_eq!(resolve_best_expr(&empty, "not a range").unwrap(), None);
    assert!(resolve_best_expr(&candidates(), "[x,").is_err());
}
