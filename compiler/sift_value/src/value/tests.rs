use super::*;
use crate::errors::{no_such_field, EvalErrorKind};
use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;
use sift_ir::ExprId;

fn id(raw: u32) -> ExprId {
    ExprId::new(raw)
}

#[test]
fn test_value_kinds() {
    assert_eq!(Value::Null.kind(), ValueKind::Null);
    assert_eq!(Value::Int(1).kind(), ValueKind::Int);
    assert_eq!(Value::string("a").kind(), ValueKind::String);
    assert_eq!(Value::list(vec![]).kind(), ValueKind::List);
    assert_eq!(Value::unknown(Unknown::new(id(1))).kind(), ValueKind::Unknown);
    assert_eq!(
        Value::error_kind(EvalErrorKind::InvalidSelectOperand).kind(),
        ValueKind::Error
    );
}

#[test]
fn test_value_display() {
    assert_eq!(Value::Int(42).to_string(), "42");
    assert_eq!(Value::Uint(7).to_string(), "7u");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::string("hello").to_string(), "\"hello\"");
    assert_eq!(
        Value::list(vec![Value::Int(1), Value::string("x")]).to_string(),
        "[1, \"x\"]"
    );
    assert_eq!(
        Value::unknown(Unknown::from_iter([id(3), id(1)])).to_string(),
        "unknown{3, 1}"
    );
}

#[test]
fn test_tri_state_predicates() {
    let err = Value::error_kind(EvalErrorKind::InvalidSelectOperand);
    let unknown = Value::unknown(Unknown::new(id(2)));

    assert!(err.is_error());
    assert!(err.is_error_or_unknown());
    assert!(!err.is_unknown());
    assert!(unknown.is_unknown());
    assert!(unknown.is_error_or_unknown());
    assert!(!Value::Int(0).is_error_or_unknown());
}

#[test]
fn test_unknown_prepend_keeps_outermost_first() {
    let inner = Unknown::new(id(1));
    let middle = inner.prepend(id(2));
    let outer = middle.prepend(id(3));

    assert_eq!(outer.ids(), &[id(3), id(2), id(1)]);
    assert_eq!(inner.ids(), &[id(1)]);
    assert!(outer.contains(id(2)));
    assert_eq!(outer.len(), 3);
    assert!(Unknown::empty().is_empty());
}

#[test]
fn test_map_indexer() {
    let map: MapValue = [
        (MapKey::String("a".into()), Value::Int(1)),
        (MapKey::Int(2), Value::string("two")),
    ]
    .into_iter()
    .collect();
    let value = Value::map(map);
    let indexer = value.as_indexer().unwrap_or_else(|| panic!("map is indexable"));

    assert_eq!(indexer.get(&Value::string("a")), Value::Int(1));
    assert_eq!(indexer.get(&Value::Int(2)), Value::string("two"));
    assert_eq!(
        indexer.get(&Value::string("missing")).to_string(),
        "error: no such key: \"missing\""
    );
    assert!(indexer.get(&Value::Double(1.0)).is_error());
}

#[test]
fn test_map_later_insert_overwrites() {
    let mut map = MapValue::new();
    assert_eq!(map.insert(MapKey::Bool(true), Value::Int(1)), None);
    assert_eq!(map.insert(MapKey::Bool(true), Value::Int(2)), Some(Value::Int(1)));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&MapKey::Bool(true)), Some(&Value::Int(2)));
}

#[test]
fn test_map_key_conversion() {
    assert_eq!(
        MapKey::try_from(&Value::string("k")),
        Ok(MapKey::String("k".to_string()))
    );
    assert_eq!(MapKey::Uint(3).to_value(), Value::Uint(3));

    let err = MapKey::try_from(&Value::Double(1.5));
    assert_eq!(
        err.map_err(|e| e.to_string()),
        Err("unsupported map key type: double".to_string())
    );
}

#[test]
fn test_object_indexer() {
    let mut fields = FxHashMap::default();
    fields.insert("x".to_string(), Value::Int(3));
    let value = Value::object(ObjectValue::new("geo.Point", fields));

    assert_eq!(value.type_name(), "geo.Point");
    let indexer = value.as_indexer().unwrap_or_else(|| panic!("object is indexable"));
    assert_eq!(indexer.get(&Value::string("x")), Value::Int(3));
    assert_eq!(
        indexer.get(&Value::string("y")),
        Value::error(no_such_field("geo.Point", "y"))
    );
}

#[test]
fn test_list_indexer() {
    let value = Value::list(vec![Value::Int(10), Value::Int(20)]);
    let indexer = value.as_indexer().unwrap_or_else(|| panic!("list is indexable"));

    assert_eq!(indexer.get(&Value::Int(1)), Value::Int(20));
    assert_eq!(indexer.get(&Value::Uint(0)), Value::Int(10));
    assert_eq!(
        indexer.get(&Value::Int(-1)).to_string(),
        "error: index -1 out of bounds for list of length 2"
    );
    assert_eq!(
        indexer.get(&Value::string("a")).to_string(),
        "error: list cannot be indexed by string"
    );
}

#[test]
fn test_scalars_are_not_indexable() {
    assert!(Value::Int(1).as_indexer().is_none());
    assert!(Value::string("abc").as_indexer().is_none());
    assert!(Value::unknown(Unknown::new(id(1))).as_indexer().is_none());
}

#[test]
fn test_accessors() {
    assert_eq!(Value::from(true).as_bool(), Some(true));
    assert_eq!(Value::from(5i64).as_int(), Some(5));
    assert_eq!(Value::from("s").as_str(), Some("s"));
    assert_eq!(Value::Int(5).as_str(), None);
    assert_eq!(
        Value::unknown(Unknown::new(id(4))).as_unknown().map(Unknown::ids),
        Some(&[id(4)][..])
    );
}
