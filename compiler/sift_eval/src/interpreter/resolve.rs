//! Qualified-name recovery for selects over unknown operands.
//!
//! Without type information `a.b.c` parses as `Select(Select(Ident a, b), c)`
//! even when it names one qualified identifier. When `a` is unbound the
//! chain produces unknowns whose contributor ids still point at the `Ident`
//! and `Select` instructions, which is enough to spell the name back out and
//! look it up whole.

use sift_ir::ExprId;
use sift_value::{Unknown, Value};

use super::exec::Machine;
use crate::{Instruction, Program};

impl<P: Program> Machine<'_, P> {
    /// Result of selecting `field` (instruction `select_id`) from `unknown`.
    pub(super) fn resolve_unknown(&mut self, unknown: &Unknown, select_id: ExprId, field: &str) -> Value {
        if let Some(value) = self.scopes.resolve_reference(select_id) {
            tracing::trace!(id = ?select_id, "select resolved by recorded reference");
            return value;
        }

        self.mode.count_unknown_resolution();
        if let Some(name) = self.qualified_name(unknown, field) {
            for candidate in self.interpreter.packager.resolve_candidate_names(&name) {
                let found = self
                    .scopes
                    .resolve_name(&candidate, self.state)
                    .or_else(|| self.interpreter.provider.find_ident(&candidate));
                if let Some(value) = found {
                    tracing::trace!(id = ?select_id, name = %candidate, "qualified name resolved");
                    return value;
                }
            }
            tracing::trace!(id = ?select_id, name = %name, "qualified name unresolved");
        }

        Value::unknown(unknown.prepend(select_id))
    }

    /// Spell the dotted name the unknown chain stands for, ending in `field`.
    ///
    /// Contributor ids are outermost first; each one adds the segment before
    /// the previous. `None` when a contributor is neither an `Ident`, a
    /// `Select`, nor an instruction whose value is a string.
    fn qualified_name(&self, unknown: &Unknown, field: &str) -> Option<String> {
        let mut segments = Vec::with_capacity(unknown.len() + 1);
        segments.push(field.to_string());
        for id in unknown.ids() {
            let segment = match self.program.instruction(*id) {
                Some(Instruction::Ident { name, .. }) => name.clone(),
                Some(Instruction::Select { field: selected, .. }) => selected.clone(),
                _ => match self.value(*id) {
                    Value::String(s) => s.to_string(),
                    other => {
                        tracing::trace!(id = ?id, kind = %other.kind(), "not a name segment");
                        return None;
                    }
                },
            };
            segments.push(segment);
        }
        segments.reverse();
        Some(segments.join("."))
    }
}
