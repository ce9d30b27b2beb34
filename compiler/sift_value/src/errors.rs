//! Error values produced during evaluation.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` provides typed error categories so callers can match on the
//! failure instead of parsing messages. Factory functions (e.g.
//! `invalid_select_operand()`) are the public construction API.
//!
//! Errors are values: the evaluator stores them in the evaluation table like
//! any other result and strict instructions propagate them unchanged.

use sift_ir::Span;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    /// A select was applied to a value without field access.
    #[error("invalid operand in select")]
    InvalidSelectOperand,

    /// The dispatcher found no overload for the call.
    #[error("no matching overload for '{function}' applied to ({})", .args.join(", "))]
    NoMatchingOverload { function: String, args: Vec<String> },

    #[error("no such key: {key}")]
    NoSuchKey { key: String },

    #[error("no such field '{field}' on {type_name}")]
    NoSuchField { type_name: String, field: String },

    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("{container} cannot be indexed by {index}")]
    UnsupportedIndex { container: String, index: String },

    #[error("unsupported map key type: {kind}")]
    UnsupportedMapKey { kind: String },

    #[error("unknown type: {name}")]
    UnknownType { name: String },

    /// The cooperative step budget of a budgeted evaluation ran out.
    #[error("evaluation exceeded step limit of {limit}")]
    StepLimitExceeded { limit: u64 },

    /// Catch-all for failures raised by function overloads.
    #[error("{message}")]
    Custom { message: String },
}

/// Evaluation error.
///
/// Carries the structured kind plus the source span of the expression that
/// produced it, when the program recorded one.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError {
    kind: EvalErrorKind,
    span: Option<Span>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError { kind, span: None }
    }

    /// Attach a source span.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn kind(&self) -> &EvalErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// The rendered message, without location.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind)
    }
}

// Factory functions

pub fn invalid_select_operand() -> EvalError {
    EvalError::new(EvalErrorKind::InvalidSelectOperand)
}

pub fn no_matching_overload(function: &str, args: Vec<String>) -> EvalError {
    EvalError::new(EvalErrorKind::NoMatchingOverload {
        function: function.to_string(),
        args,
    })
}

pub fn no_such_key(key: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::NoSuchKey { key: key.into() })
}

pub fn no_such_field(type_name: &str, field: &str) -> EvalError {
    EvalError::new(EvalErrorKind::NoSuchField {
        type_name: type_name.to_string(),
        field: field.to_string(),
    })
}

pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::new(EvalErrorKind::IndexOutOfBounds { index, len })
}

pub fn unsupported_index(container: &str, index: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UnsupportedIndex {
        container: container.to_string(),
        index: index.to_string(),
    })
}

pub fn unsupported_map_key(kind: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UnsupportedMapKey {
        kind: kind.to_string(),
    })
}

pub fn unknown_type(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UnknownType {
        name: name.to_string(),
    })
}

pub fn step_limit_exceeded(limit: u64) -> EvalError {
    EvalError::new(EvalErrorKind::StepLimitExceeded { limit })
}

pub fn custom_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Custom {
        message: message.into(),
    })
}
