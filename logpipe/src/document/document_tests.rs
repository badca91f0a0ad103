//! Tests for path-addressed document operations.

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn doc(value: Value) -> Document {
    Document::from_value(value).unwrap()
}

#[test]
fn test_new_rejects_empty_map() {
    assert_eq!(Document::new(Map::new()), Err(DocumentError::Empty));
}

#[test]
fn test_from_value_rejects_non_object() {
    assert_eq!(Document::from_value(json!([1, 2])), Err(DocumentError::NotAnObject));
    assert_eq!(Document::from_value(json!({})), Err(DocumentError::Empty));
}

#[test]
fn test_set_then_get_round_trip() {
    let mut d = doc(json!({"a": 1}));
    d.set("x.y.z", "v");

    assert_eq!(d.get("x.y.z").unwrap(), &json!("v"));
    assert_eq!(d.get("a").unwrap(), &json!(1));
}

#[test]
fn test_get_missing_field() {
    let d = doc(json!({"a": {"b": 1}}));

    assert_eq!(
        d.get("a.c").unwrap_err(),
        DocumentError::field_not_found("a.c")
    );
    assert!(d.get("a.b.c").is_err());
}

#[test]
fn test_remove_then_has_is_false() {
    let mut d = doc(json!({"a": {"b": 1, "c": 2}}));

    assert!(d.remove("a.b"));
    assert!(!d.has("a.b"));
    assert!(d.has("a.c"));
}

#[test]
fn test_remove_absent_returns_false() {
    let mut d = doc(json!({"a": "scalar"}));

    assert!(!d.remove("missing"));
    assert!(!d.remove("a.b"));
    assert!(!d.remove("x.y.z"));
}

#[test]
fn test_escaped_dot_addresses_single_key() {
    let mut d = doc(json!({"host.name": "web-1", "host": {"name": "nested"}}));

    assert_eq!(d.get(r"host\.name").unwrap(), &json!("web-1"));
    assert_eq!(d.get("host.name").unwrap(), &json!("nested"));

    d.set(r"a\.b", 1);
    assert!(d.source().contains_key("a.b"));
    assert!(!d.source().contains_key("a"));
}

#[test]
fn test_set_overwrites_non_map_intermediate() {
    let mut d = doc(json!({"a": "scalar"}));
    d.set("a.b", true);

    assert_eq!(d.get("a").unwrap(), &json!({"b": true}));
}

#[test]
fn test_has_kind() {
    let d = doc(json!({"s": "x", "n": 3, "l": [1], "m": {"k": null}}));

    assert!(d.has_kind("s", ValueKind::String));
    assert!(d.has_kind("n", ValueKind::Number));
    assert!(d.has_kind("l", ValueKind::List));
    assert!(d.has_kind("m", ValueKind::Map));
    assert!(d.has_kind("m.k", ValueKind::Null));
    assert!(!d.has_kind("s", ValueKind::Number));
    assert!(!d.has_kind("missing", ValueKind::String));
}

#[test]
fn test_get_as_typed() {
    let d = doc(json!({"status": 404, "tags": ["a", "b"]}));

    assert_eq!(d.get_as::<u16>("status").unwrap(), 404);
    assert_eq!(d.get_as::<Vec<String>>("tags").unwrap(), vec!["a", "b"]);
    assert!(matches!(
        d.get_as::<String>("status"),
        Err(DocumentError::TypeMismatch { .. })
    ));
    assert!(matches!(
        d.get_as::<String>("nope"),
        Err(DocumentError::FieldNotFound { .. })
    ));
}

#[test]
fn test_append_to_missing_field_creates_list() {
    let mut d = doc(json!({"a": 1}));
    d.append_to_list("tags", "first");

    assert_eq!(d.get("tags").unwrap(), &json!(["first"]));
}

#[test]
fn test_append_list_to_missing_field_stores_list() {
    let mut d = doc(json!({"a": 1}));
    d.append_to_list("x.tags", json!(["a", "b"]));

    assert_eq!(d.get("x.tags").unwrap(), &json!(["a", "b"]));
}

#[test]
fn test_append_to_scalar_coerces_preserving_order() {
    let mut d = doc(json!({"tag": "original"}));
    d.append_to_list("tag", "added");

    assert_eq!(d.get("tag").unwrap(), &json!(["original", "added"]));
}

#[test]
fn test_append_list_flattens_one_level() {
    let mut d = doc(json!({"tags": ["a"]}));
    d.append_to_list("tags", json!(["b", ["c", "d"]]));

    assert_eq!(d.get("tags").unwrap(), &json!(["a", "b", ["c", "d"]]));
}

#[test]
fn test_remove_from_list() {
    let mut d = doc(json!({"tags": ["a", "b", "a", "c"]}));

    assert!(d.remove_from_list("tags", "a"));
    assert_eq!(d.get("tags").unwrap(), &json!(["b", "c"]));

    assert!(d.remove_from_list("tags", json!(["b", "c", "zzz"])));
    assert_eq!(d.get("tags").unwrap(), &json!([]));
}

#[test]
fn test_remove_from_list_missing_or_scalar() {
    let mut d = doc(json!({"tag": "a"}));

    assert!(!d.remove_from_list("tag", "a"));
    assert!(!d.remove_from_list("missing", "a"));
    assert_eq!(d.get("tag").unwrap(), &json!("a"));
}

#[test]
fn test_replace_all_swaps_source() {
    let mut d = doc(json!({"old": 1}));
    let mut fresh = Map::new();
    fresh.insert("new".to_string(), json!(2));

    let previous = d.replace_all(fresh);

    assert!(previous.contains_key("old"));
    assert!(!d.has("old"));
    assert_eq!(d.get("new").unwrap(), &json!(2));
}

#[test]
fn test_replace_if_present() {
    let mut d = doc(json!({"a": {"b": 1}}));

    assert!(d.replace_if_present("a.b", "two"));
    assert_eq!(d.get("a.b").unwrap(), &json!("two"));

    assert!(!d.replace_if_present("a.c", "three"));
    assert!(!d.has("a.c"));
}

#[test]
fn test_get_mut_updates_in_place() {
    let mut d = doc(json!({"counter": {"hits": 1}}));
    *d.get_mut("counter.hits").unwrap() = json!(2);

    assert_eq!(d.get("counter.hits").unwrap(), &json!(2));
}

#[test]
fn test_serde_round_trip_and_empty_rejected() {
    let d = doc(json!({"a": {"b": [1, 2]}}));
    let text = serde_json::to_string(&d).unwrap();
    assert_eq!(text, r#"{"a":{"b":[1,2]}}"#);

    let parsed: Document = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, d);

    assert!(serde_json::from_str::<Document>("{}").is_err());
}

#[test]
fn test_display_is_json() {
    let d = doc(json!({"a": 1}));
    assert_eq!(d.to_string(), r#"{"a":1}"#);
}
