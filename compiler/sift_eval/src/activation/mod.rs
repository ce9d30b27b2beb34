//! Variable bindings consulted during evaluation.
//!
//! An [`Activation`] answers two questions for the evaluator: what value a
//! name is bound to, and whether a select expression has already been
//! resolved to a concrete value by the caller. Activations form a chain;
//! lookups walk from the innermost frame to the root.
//!
//! Callers supply the root (usually a [`MapActivation`]). Scopes opened by the
//! program itself live on an internal frame stack whose bindings read the
//! evaluation table when resolved, so a scope may refer to a value that is
//! computed after the scope was opened.

use rustc_hash::FxHashMap;
use std::fmt;

use sift_ir::ExprId;
use sift_value::{Unknown, Value};

use crate::EvalState;

/// Name resolution environment.
pub trait Activation {
    /// Value bound to `name`, searching parent frames when this one has no binding.
    fn resolve_name(&self, name: &str) -> Option<Value>;

    /// Value previously recorded for the select expression `id`.
    ///
    /// Lets callers short-circuit qualified-name reconstruction for selects
    /// they already know the meaning of.
    fn resolve_reference(&self, id: ExprId) -> Option<Value> {
        let _ = id;
        None
    }

    /// The enclosing activation, or `None` at the root.
    ///
    /// Asking the root for its parent is not an error here; the evaluator
    /// never does so. Leaving a scope that was never opened is the fault
    /// case, and `PopScope` panics on it with "unbalanced scope".
    ///
    /// The activation handed to overloads ([`ScopedActivation`]) reports the
    /// caller's root as its parent whenever any program scope is open, no
    /// matter how many are. Program scopes are frames of one activation,
    /// not a chain of their own.
    fn parent(&self) -> Option<&dyn Activation> {
        None
    }
}

/// Activation with no bindings.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyActivation;

impl Activation for EmptyActivation {
    fn resolve_name(&self, _name: &str) -> Option<Value> {
        None
    }
}

type LazyFn = dyn Fn() -> Value + Send + Sync;

/// A name binding: either a value or a computation run on each lookup.
pub enum Binding {
    Value(Value),
    Lazy(Box<LazyFn>),
}

impl Binding {
    /// Produce the bound value. Lazy bindings run once per call.
    pub fn resolve(&self) -> Value {
        match self {
            Binding::Value(value) => value.clone(),
            Binding::Lazy(produce) => produce(),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Binding::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// A single frame of named bindings plus recorded select references.
#[derive(Debug, Default)]
pub struct MapActivation {
    bindings: FxHashMap<String, Binding>,
    references: FxHashMap<ExprId, Value>,
}

impl MapActivation {
    pub fn new() -> Self {
        MapActivation::default()
    }

    /// Bind `name` to a value.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), Binding::Value(value));
    }

    /// Bind `name` to a computation evaluated on every lookup.
    pub fn bind_lazy(
        &mut self,
        name: impl Into<String>,
        produce: impl Fn() -> Value + Send + Sync + 'static,
    ) {
        self.bindings
            .insert(name.into(), Binding::Lazy(Box::new(produce)));
    }

    /// Record that the select expression `id` means `value`.
    pub fn record_reference(&mut self, id: ExprId, value: Value) {
        self.references.insert(id, value);
    }

    /// Builder-style [`bind`](Self::bind).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.bind(name, value);
        self
    }

    /// Builder-style [`bind_lazy`](Self::bind_lazy).
    #[must_use]
    pub fn with_lazy(
        mut self,
        name: impl Into<String>,
        produce: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        self.bind_lazy(name, produce);
        self
    }

    /// Builder-style [`record_reference`](Self::record_reference).
    #[must_use]
    pub fn with_reference(mut self, id: ExprId, value: Value) -> Self {
        self.record_reference(id, value);
        self
    }
}

impl<N: Into<String>> FromIterator<(N, Value)> for MapActivation {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        let mut activation = MapActivation::new();
        for (name, value) in iter {
            activation.bind(name, value);
        }
        activation
    }
}

impl Activation for MapActivation {
    fn resolve_name(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).map(Binding::resolve)
    }

    fn resolve_reference(&self, id: ExprId) -> Option<Value> {
        self.references.get(&id).cloned()
    }
}

/// A child frame layered over a borrowed parent.
///
/// Constructing a child never modifies the parent.
pub struct HierarchicalActivation<'p, C = MapActivation> {
    parent: &'p dyn Activation,
    child: C,
}

impl<'p, C: Activation> HierarchicalActivation<'p, C> {
    pub fn new(parent: &'p dyn Activation, child: C) -> Self {
        HierarchicalActivation { parent, child }
    }

    pub fn child(&self) -> &C {
        &self.child
    }
}

impl<C: Activation> Activation for HierarchicalActivation<'_, C> {
    fn resolve_name(&self, name: &str) -> Option<Value> {
        self.child
            .resolve_name(name)
            .or_else(|| self.parent.resolve_name(name))
    }

    fn resolve_reference(&self, id: ExprId) -> Option<Value> {
        self.child
            .resolve_reference(id)
            .or_else(|| self.parent.resolve_reference(id))
    }

    fn parent(&self) -> Option<&dyn Activation> {
        Some(self.parent)
    }
}

/// Bindings of one program-opened scope: each name reads an evaluation slot.
#[derive(Clone, Debug, Default)]
pub(crate) struct ScopeFrame {
    slots: FxHashMap<String, ExprId>,
}

impl ScopeFrame {
    pub(crate) fn new(declarations: &[(String, ExprId)]) -> Self {
        ScopeFrame {
            slots: declarations.iter().cloned().collect(),
        }
    }

    fn resolve(&self, name: &str, state: &EvalState) -> Option<Value> {
        let id = *self.slots.get(name)?;
        Some(
            state
                .get(id)
                .cloned()
                .unwrap_or_else(|| Value::unknown(Unknown::new(id))),
        )
    }
}

/// The caller's activation plus the scopes the program has opened on top of it.
pub(crate) struct ScopeStack<'a> {
    root: &'a dyn Activation,
    frames: Vec<ScopeFrame>,
}

impl<'a> ScopeStack<'a> {
    pub(crate) fn new(root: &'a dyn Activation) -> Self {
        ScopeStack {
            root,
            frames: Vec::new(),
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn push(&mut self, frame: ScopeFrame) {
        self.frames.push(frame);
    }

    /// Close the innermost scope.
    ///
    /// # Panics
    /// Panics when no scope is open: the caller's activation has no parent
    /// to return to, so the program's scope instructions are unbalanced.
    pub(crate) fn pop(&mut self, at: ExprId) {
        if self.frames.pop().is_none() {
            tracing::error!(id = ?at, "scope pop without a matching push");
            panic!("unbalanced scope: pop at {at:?} with no open scope");
        }
    }

    /// Resolve `name` through open scopes (innermost first), then the caller's activation.
    pub(crate) fn resolve_name(&self, name: &str, state: &EvalState) -> Option<Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.resolve(name, state))
            .or_else(|| self.root.resolve_name(name))
    }

    pub(crate) fn resolve_reference(&self, id: ExprId) -> Option<Value> {
        self.root.resolve_reference(id)
    }

    /// Read-only view usable as an `Activation` while `state` is borrowed.
    pub(crate) fn view<'s>(&'s self, state: &'s EvalState) -> ScopedActivation<'s> {
        ScopedActivation {
            root: self.root,
            frames: &self.frames,
            state,
        }
    }
}

/// An [`Activation`] over the open scopes at one point of evaluation.
///
/// Handed to function overloads through the call context.
pub struct ScopedActivation<'s> {
    root: &'s dyn Activation,
    frames: &'s [ScopeFrame],
    state: &'s EvalState,
}

impl Activation for ScopedActivation<'_> {
    fn resolve_name(&self, name: &str) -> Option<Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.resolve(name, self.state))
            .or_else(|| self.root.resolve_name(name))
    }

    fn resolve_reference(&self, id: ExprId) -> Option<Value> {
        self.root.resolve_reference(id)
    }

    fn parent(&self) -> Option<&dyn Activation> {
        // Open program frames collapse into this view; the next link is the
        // caller's root.
        if self.frames.is_empty() {
            self.root.parent()
        } else {
            Some(self.root)
        }
    }
}
