//! Per-evaluation result table.
//!
//! Maps every expression id to the last result computed for it. The evaluator
//! uses it as working memory; callers receive it after evaluation to inspect
//! which sub-expressions produced errors or stayed unknown.

use sift_ir::ExprId;
use sift_value::Value;

/// Dense table of results indexed by `ExprId`.
///
/// Sized once from the program's largest id and never resized during an
/// evaluation. Writing outside that range means the program referenced an id
/// it never declared, which is a defect in the program builder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvalState {
    values: Vec<Option<Value>>,
}

impl EvalState {
    /// Create a table with one empty slot per id in `0..size`.
    pub fn new(size: usize) -> Self {
        EvalState {
            values: vec![None; size],
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Store the result for `id`, replacing any previous one.
    ///
    /// # Panics
    /// Panics if `id` lies outside the table.
    pub fn set(&mut self, id: ExprId, value: Value) {
        let size = self.values.len();
        match self.values.get_mut(id.index()) {
            Some(slot) => *slot = Some(value),
            None => {
                tracing::error!(?id, size, "result written outside the evaluation table");
                panic!("expression id {id:?} is outside the evaluation table of size {size}");
            }
        }
    }

    /// The stored result for `id`, if any.
    pub fn get(&self, id: ExprId) -> Option<&Value> {
        self.values.get(id.index()).and_then(Option::as_ref)
    }

    /// The single stored result, when exactly one slot holds a value.
    pub fn only_value(&self) -> Option<&Value> {
        let mut stored = self.values.iter().flatten();
        let first = stored.next()?;
        match stored.next() {
            Some(_) => None,
            None => Some(first),
        }
    }

    /// Stored results in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &Value)> {
        self.values.iter().enumerate().filter_map(|(index, slot)| {
            let value = slot.as_ref()?;
            let raw = u32::try_from(index).ok()?;
            Some((ExprId::new(raw), value))
        })
    }

    /// Ids whose stored result is unknown.
    pub fn unknown_ids(&self) -> Vec<ExprId> {
        self.iter()
            .filter(|(_, value)| value.is_unknown())
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of slots holding a result.
    pub fn len(&self) -> usize {
        self.values.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}
