//! Aggregate values: maps, typed objects, and the indexing capability.

use rustc_hash::FxHashMap;
use std::fmt;

use super::{Value, ValueKind};
use crate::errors::{
    index_out_of_bounds, no_such_field, no_such_key, unsupported_index, unsupported_map_key,
    EvalError,
};

/// Field and key access capability.
///
/// Values that implement `Indexer` can be the operand of a select; everything
/// else is rejected with an "invalid operand in select" error.
pub trait Indexer {
    /// Look up `index`, returning the element or an error value.
    fn get(&self, index: &Value) -> Value;
}

/// Key of a map value.
///
/// Only scalar, hashable values may key a map; doubles and aggregates are
/// rejected when the map is built.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    Bool(bool),
    Int(i64),
    Uint(u64),
    String(String),
}

impl MapKey {
    /// The key as a value.
    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Bool(b) => Value::Bool(*b),
            MapKey::Int(i) => Value::Int(*i),
            MapKey::Uint(u) => Value::Uint(*u),
            MapKey::String(s) => Value::string(s.as_str()),
        }
    }
}

impl TryFrom<&Value> for MapKey {
    type Error = EvalError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(b) => Ok(MapKey::Bool(*b)),
            Value::Int(i) => Ok(MapKey::Int(*i)),
            Value::Uint(u) => Ok(MapKey::Uint(*u)),
            Value::String(s) => Ok(MapKey::String(s.to_string())),
            other => Err(unsupported_map_key(other.type_name())),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Bool(b) => write!(f, "{b}"),
            MapKey::Int(i) => write!(f, "{i}"),
            MapKey::Uint(u) => write!(f, "{u}u"),
            MapKey::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Map from scalar keys to values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapValue {
    entries: FxHashMap<MapKey, Value>,
}

impl MapValue {
    pub fn new() -> Self {
        MapValue::default()
    }

    /// Insert an entry; a later insert of the same key replaces the earlier value.
    pub fn insert(&mut self, key: MapKey, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &MapKey) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MapKey, &Value)> {
        self.entries.iter()
    }
}

impl FromIterator<(MapKey, Value)> for MapValue {
    fn from_iter<I: IntoIterator<Item = (MapKey, Value)>>(iter: I) -> Self {
        let mut map = MapValue::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Indexer for MapValue {
    fn get(&self, index: &Value) -> Value {
        let key = match MapKey::try_from(index) {
            Ok(key) => key,
            Err(_) => return Value::error(unsupported_index("map", index.type_name())),
        };
        match self.entries.get(&key) {
            Some(value) => value.clone(),
            None => Value::error(no_such_key(key.to_string())),
        }
    }
}

/// Instance of a named message/record type built by a type provider.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectValue {
    type_name: String,
    fields: FxHashMap<String, Value>,
}

impl ObjectValue {
    pub fn new(type_name: impl Into<String>, fields: FxHashMap<String, Value>) -> Self {
        ObjectValue {
            type_name: type_name.into(),
            fields,
        }
    }

    /// Fully-qualified type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &FxHashMap<String, Value> {
        &self.fields
    }
}

impl Indexer for ObjectValue {
    fn get(&self, index: &Value) -> Value {
        let Some(name) = index.as_str() else {
            return Value::error(unsupported_index(&self.type_name, index.type_name()));
        };
        match self.fields.get(name) {
            Some(value) => value.clone(),
            None => Value::error(no_such_field(&self.type_name, name)),
        }
    }
}

impl Indexer for Vec<Value> {
    fn get(&self, index: &Value) -> Value {
        let position = match index {
            Value::Int(i) => *i,
            Value::Uint(u) => i64::try_from(*u).unwrap_or(i64::MAX),
            other => {
                return Value::error(unsupported_index(
                    ValueKind::List.as_str(),
                    other.type_name(),
                ))
            }
        };
        let element = usize::try_from(position)
            .ok()
            .and_then(|position| self.as_slice().get(position));
        match element {
            Some(value) => value.clone(),
            None => Value::error(index_out_of_bounds(position, self.len())),
        }
    }
}
