//! Function overload registry and call dispatch.
//!
//! # Resolution Order
//!
//! A call is resolved against the overloads registered under its function
//! name:
//! 1. Only overloads whose parameter count equals the argument count apply.
//! 2. Every parameter must accept its argument: `ParamType::Exact(kind)`
//!    accepts values of that kind, `ParamType::Dyn` accepts anything
//!    (including errors and unknowns handed to non-strict calls).
//! 3. Among applicable overloads the one with the most `Exact` parameters
//!    wins; on a tie the earliest registration wins.
//!
//! The tie-break is part of the public contract: registration order decides
//! between overloads that are equally specific for the given arguments.
//!
//! A call with no applicable overload produces an error value, never a panic.

use rustc_hash::FxHashMap;
use std::fmt;

use sift_ir::{ExprId, ProgramMetadata};
use sift_value::{no_matching_overload, Value, ValueKind};

use crate::Activation;

/// Parameter type of an overload signature.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Accepts only values of this kind.
    Exact(ValueKind),
    /// Accepts any value.
    Dyn,
}

impl ParamType {
    #[inline]
    fn accepts(self, value: &Value) -> bool {
        match self {
            ParamType::Exact(kind) => value.kind() == kind,
            ParamType::Dyn => true,
        }
    }

    #[inline]
    fn is_exact(self) -> bool {
        matches!(self, ParamType::Exact(_))
    }
}

impl From<ValueKind> for ParamType {
    fn from(kind: ValueKind) -> Self {
        ParamType::Exact(kind)
    }
}

/// Everything an overload may need to know about the call being dispatched.
///
/// Built per call instruction and dropped once dispatch returns.
pub struct CallContext<'a> {
    id: ExprId,
    function: &'a str,
    strict: bool,
    args: &'a [Value],
    activation: &'a dyn Activation,
    metadata: &'a ProgramMetadata,
}

impl<'a> CallContext<'a> {
    pub fn new(
        id: ExprId,
        function: &'a str,
        strict: bool,
        args: &'a [Value],
        activation: &'a dyn Activation,
        metadata: &'a ProgramMetadata,
    ) -> Self {
        CallContext {
            id,
            function,
            strict,
            args,
            activation,
            metadata,
        }
    }

    /// Id of the call instruction.
    pub fn id(&self) -> ExprId {
        self.id
    }

    pub fn function(&self) -> &'a str {
        self.function
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    /// Bindings visible at the call site.
    pub fn activation(&self) -> &'a dyn Activation {
        self.activation
    }

    pub fn metadata(&self) -> &'a ProgramMetadata {
        self.metadata
    }
}

impl fmt::Debug for CallContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("id", &self.id)
            .field("function", &self.function)
            .field("strict", &self.strict)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

type OverloadFn = dyn for<'a> Fn(&CallContext<'a>) -> Value + Send + Sync;

/// One implementation of a named function for a fixed parameter list.
pub struct Overload {
    id: String,
    function: String,
    params: Vec<ParamType>,
    implementation: Box<OverloadFn>,
}

impl Overload {
    /// Overload whose implementation only needs the argument values.
    pub fn new(
        id: impl Into<String>,
        function: impl Into<String>,
        params: impl Into<Vec<ParamType>>,
        implementation: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        Overload::contextual(id, function, params, move |ctx: &CallContext<'_>| {
            implementation(ctx.args())
        })
    }

    /// Overload whose implementation receives the full call context.
    pub fn contextual(
        id: impl Into<String>,
        function: impl Into<String>,
        params: impl Into<Vec<ParamType>>,
        implementation: impl for<'a> Fn(&CallContext<'a>) -> Value + Send + Sync + 'static,
    ) -> Self {
        Overload {
            id: id.into(),
            function: function.into(),
            params: params.into(),
            implementation: Box::new(implementation),
        }
    }

    /// Single-argument overload.
    pub fn unary(
        id: impl Into<String>,
        function: impl Into<String>,
        param: ParamType,
        implementation: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Overload::new(id, function, vec![param], move |args: &[Value]| match args {
            [arg] => implementation(arg),
            _ => unreachable_arity(args.len(), 1),
        })
    }

    /// Two-argument overload.
    pub fn binary(
        id: impl Into<String>,
        function: impl Into<String>,
        lhs: ParamType,
        rhs: ParamType,
        implementation: impl Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Overload::new(id, function, vec![lhs, rhs], move |args: &[Value]| match args {
            [left, right] => implementation(left, right),
            _ => unreachable_arity(args.len(), 2),
        })
    }

    /// Overload id, e.g. `add_int64`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Function name the overload is registered under, e.g. `_+_`.
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Run the implementation.
    pub fn invoke(&self, ctx: &CallContext<'_>) -> Value {
        (self.implementation)(ctx)
    }

    fn accepts(&self, args: &[Value]) -> bool {
        self.params.len() == args.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(param, arg)| param.accepts(arg))
    }

    fn exactness(&self) -> usize {
        self.params.iter().filter(|param| param.is_exact()).count()
    }

    fn same_signature(&self, other: &Overload) -> bool {
        self.function == other.function && self.params == other.params
    }
}

/// The dispatcher checks arity before invoking, so a mismatch here means the
/// overload was invoked directly with the wrong arguments.
fn unreachable_arity(got: usize, expected: usize) -> Value {
    Value::error(sift_value::custom_error(format!(
        "overload expects {expected} argument(s), got {got}"
    )))
}

impl fmt::Debug for Overload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overload")
            .field("id", &self.id)
            .field("function", &self.function)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Error registering overloads.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("overload '{id}' has an empty function name")]
    EmptyFunctionName { id: String },
}

/// Registry of function overloads.
///
/// Built once, then shared read-only by every interpretable of an
/// `Interpreter`.
#[derive(Debug, Default)]
pub struct Dispatcher {
    overloads: FxHashMap<String, Vec<Overload>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher::default()
    }

    /// Register overloads.
    ///
    /// Re-registering a signature (same function name and parameter list)
    /// keeps the first registration.
    pub fn add(&mut self, overloads: impl IntoIterator<Item = Overload>) -> Result<(), DispatchError> {
        for overload in overloads {
            if overload.function.is_empty() {
                return Err(DispatchError::EmptyFunctionName { id: overload.id });
            }
            let registered = self.overloads.entry(overload.function.clone()).or_default();
            if let Some(existing) = registered.iter().find(|o| o.same_signature(&overload)) {
                tracing::debug!(
                    function = %overload.function,
                    kept = %existing.id,
                    skipped = %overload.id,
                    "duplicate overload signature"
                );
                continue;
            }
            registered.push(overload);
        }
        Ok(())
    }

    /// Whether any overload is registered under `function`.
    pub fn has_function(&self, function: &str) -> bool {
        self.overloads.contains_key(function)
    }

    /// Overloads registered under `function`, in registration order.
    pub fn overloads(&self, function: &str) -> &[Overload] {
        self.overloads.get(function).map_or(&[], Vec::as_slice)
    }

    /// Total number of registered overloads.
    pub fn len(&self) -> usize {
        self.overloads.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.overloads.is_empty()
    }

    /// The overload a call to `function` with `args` resolves to.
    pub fn find_overload(&self, function: &str, args: &[Value]) -> Option<&Overload> {
        let mut best: Option<&Overload> = None;
        for candidate in self.overloads(function) {
            if !candidate.accepts(args) {
                continue;
            }
            match best {
                Some(current) if current.exactness() >= candidate.exactness() => {}
                _ => best = Some(candidate),
            }
        }
        best
    }

    /// Resolve and invoke the call described by `ctx`.
    ///
    /// Returns a "no matching overload" error value when nothing applies.
    pub fn dispatch(&self, ctx: &CallContext<'_>) -> Value {
        if let Some(overload) = self.find_overload(ctx.function(), ctx.args()) {
            tracing::trace!(function = ctx.function(), overload = overload.id(), "dispatch");
            return overload.invoke(ctx);
        }

        let arg_types: Vec<String> = ctx
            .args()
            .iter()
            .map(|arg| arg.type_name().to_string())
            .collect();
        tracing::debug!(function = ctx.function(), args = ?arg_types, "no matching overload");
        let mut err = no_matching_overload(ctx.function(), arg_types);
        if let Some(span) = ctx.metadata().id_span(ctx.id()) {
            err = err.with_span(span);
        }
        Value::error(err)
    }
}
