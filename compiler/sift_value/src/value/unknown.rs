//! Unknown placeholders and their provenance.

use sift_ir::ExprId;
use smallvec::SmallVec;
use std::fmt;

/// Placeholder for a result that could not be computed yet.
///
/// Records the ids of the expressions that produced it, outermost first.
/// Resolution of a dotted name walks these ids in order, so the order is
/// part of the contract: a select over an unknown operand prepends its own
/// id before the ids of the operand's unknown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Unknown {
    ids: SmallVec<[ExprId; 4]>,
}

impl Unknown {
    /// Unknown produced by a single expression.
    pub fn new(id: ExprId) -> Self {
        let mut ids = SmallVec::new();
        ids.push(id);
        Unknown { ids }
    }

    /// Unknown with no contributing expressions.
    pub fn empty() -> Self {
        Unknown::default()
    }

    /// Contributing ids, outermost first.
    pub fn ids(&self) -> &[ExprId] {
        &self.ids
    }

    /// A new unknown with `id` placed before every existing contributor.
    #[must_use]
    pub fn prepend(&self, id: ExprId) -> Unknown {
        let mut ids = SmallVec::with_capacity(self.ids.len().saturating_add(1));
        ids.push(id);
        ids.extend_from_slice(&self.ids);
        Unknown { ids }
    }

    pub fn contains(&self, id: ExprId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<ExprId> for Unknown {
    fn from_iter<I: IntoIterator<Item = ExprId>>(iter: I) -> Self {
        Unknown {
            ids: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown{{")?;
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", id.raw())?;
        }
        write!(f, "}}")
    }
}
