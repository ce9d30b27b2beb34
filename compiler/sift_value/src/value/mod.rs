//! Runtime values for the Sift evaluator.
//!
//! # Heap Values
//!
//! Strings, bytes, lists, maps, objects and errors live behind [`Heap`], so
//! copying a `Value` out of the evaluation table never deep-clones. Build
//! them through the factory methods:
//!
//! ```
//! use sift_value::Value;
//!
//! let s = Value::string("hello");
//! let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
//! assert_eq!(s.as_str(), Some("hello"));
//! assert_eq!(list.as_list().map(<[Value]>::len), Some(2));
//! ```
//!
//! # Tri-state Results
//!
//! `Value::Error` and `Value::Unknown` are ordinary variants. Strict consumers
//! check [`Value::is_error_or_unknown`] and forward the offending value.

mod composite;
mod unknown;

use std::fmt;

pub use composite::{Indexer, MapKey, MapValue, ObjectValue};
pub use unknown::Unknown;

use crate::errors::{EvalError, EvalErrorKind};
use crate::heap::Heap;

/// Runtime type tag of a value, used for overload selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Uint,
    Double,
    String,
    Bytes,
    List,
    Map,
    Object,
    Error,
    Unknown,
}

impl ValueKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Uint => "uint",
            ValueKind::Double => "double",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::List => "list",
            ValueKind::Map => "map",
            ValueKind::Object => "object",
            ValueKind::Error => "error",
            ValueKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    // Scalars (inline, no heap allocation)
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Double(f64),

    // Heap types
    String(Heap<str>),
    Bytes(Heap<[u8]>),
    List(Heap<Vec<Value>>),
    Map(Heap<MapValue>),
    /// Instance of a named type, produced by a type provider.
    Object(Heap<ObjectValue>),

    // Non-values
    /// A failure, propagated like a value.
    Error(Heap<EvalError>),
    /// A result that could not be computed from the available inputs.
    Unknown(Unknown),
}

// Factory Methods

impl Value {
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        let s: String = s.into();
        Value::String(Heap::from_string(s))
    }

    #[inline]
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Value::Bytes(Heap::from_bytes(bytes))
    }

    #[inline]
    pub fn list(elements: Vec<Value>) -> Self {
        Value::List(Heap::new(elements))
    }

    #[inline]
    pub fn map(map: MapValue) -> Self {
        Value::Map(Heap::new(map))
    }

    #[inline]
    pub fn object(object: ObjectValue) -> Self {
        Value::Object(Heap::new(object))
    }

    #[inline]
    pub fn error(error: EvalError) -> Self {
        Value::Error(Heap::new(error))
    }

    #[inline]
    pub fn error_kind(kind: EvalErrorKind) -> Self {
        Value::error(EvalError::new(kind))
    }

    #[inline]
    pub fn unknown(unknown: Unknown) -> Self {
        Value::Unknown(unknown)
    }
}

// Inspection

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Uint(_) => ValueKind::Uint,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::Object(_) => ValueKind::Object,
            Value::Error(_) => ValueKind::Error,
            Value::Unknown(_) => ValueKind::Unknown,
        }
    }

    /// Type name for diagnostics: the qualified name for objects, the kind otherwise.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Object(object) => object.type_name(),
            other => other.kind().as_str(),
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown(_))
    }

    /// Whether a strict consumer must short-circuit on this value.
    #[inline]
    pub fn is_error_or_unknown(&self) -> bool {
        matches!(self, Value::Error(_) | Value::Unknown(_))
    }

    /// Field/key access capability, if this value has one.
    pub fn as_indexer(&self) -> Option<&dyn Indexer> {
        match self {
            Value::Map(map) => Some(&**map),
            Value::Object(object) => Some(&**object),
            Value::List(list) => Some(&**list),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(map) => Some(&**map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Value::Object(object) => Some(&**object),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&EvalError> {
        match self {
            Value::Error(err) => Some(&**err),
            _ => None,
        }
    }

    pub fn as_unknown(&self) -> Option<&Unknown> {
        match self {
            Value::Unknown(unknown) => Some(unknown),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(u)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<EvalError> for Value {
    fn from(err: EvalError) -> Self {
        Value::error(err)
    }
}

impl From<Unknown> for Value {
    fn from(unknown: Unknown) -> Self {
        Value::Unknown(unknown)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}u"),
            Value::Double(d) => write!(f, "{d:?}"),
            Value::String(s) => write!(f, "{:?}", &**s),
            Value::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            Value::List(list) => {
                write!(f, "[")?;
                for (i, element) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                write!(f, "{{")?;
                for (i, (key, value)) in entries.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Object(object) => {
                let mut fields: Vec<_> = object.fields().iter().collect();
                fields.sort_by(|a, b| a.0.cmp(b.0));
                write!(f, "{}{{", object.type_name())?;
                for (i, (name, value)) in fields.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Error(err) => write!(f, "error: {err}"),
            Value::Unknown(unknown) => write!(f, "{unknown}"),
        }
    }
}

#[cfg(test)]
mod tests;
