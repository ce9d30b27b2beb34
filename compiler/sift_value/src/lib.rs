//! Sift Value - the runtime value model of the evaluator.
//!
//! Evaluation results are three-way: a concrete [`Value`], an error carried as
//! `Value::Error`, or an [`Unknown`] placeholder recording which expression ids
//! could not be resolved. All three travel as ordinary values so that a caller
//! can inspect partially evaluated programs instead of receiving a single
//! failure.
//!
//! # Re-exports
//!
//! - `Value`, `ValueKind`, `Heap`
//! - `MapKey`, `MapValue`, `ObjectValue`, `Indexer`
//! - `Unknown`
//! - `EvalError`, `EvalErrorKind` and their factory functions

mod errors;
mod heap;
mod value;

pub use errors::{
    custom_error, index_out_of_bounds, invalid_select_operand, no_matching_overload, no_such_field,
    no_such_key, step_limit_exceeded, unknown_type, unsupported_index, unsupported_map_key,
    EvalError, EvalErrorKind,
};
pub use heap::Heap;
pub use value::{Indexer, MapKey, MapValue, ObjectValue, Unknown, Value, ValueKind};
