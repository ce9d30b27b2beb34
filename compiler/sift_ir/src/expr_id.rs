//! Expression ids for compiled programs.
//!
//! Every instruction carries an `ExprId`; the evaluator uses the same id as the
//! index of the slot holding that instruction's last computed result.

use std::fmt;

/// Index of an instruction and of its evaluation slot.
///
/// - Memory: 4 bytes
/// - Equality: O(1) integer compare
/// - Dense: ids are expected to be small so the evaluation table stays compact
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// Invalid expression ID (sentinel value).
    pub const INVALID: ExprId = ExprId(u32::MAX);

    /// Create a new `ExprId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    /// Get the index into the evaluation table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this is a valid ID.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl From<u32> for ExprId {
    #[inline]
    fn from(index: u32) -> Self {
        ExprId(index)
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "ExprId({})", self.0)
        } else {
            write!(f, "ExprId::INVALID")
        }
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Default for ExprId {
    fn default() -> Self {
        Self::INVALID
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::ExprId;
    crate::static_assert_size!(ExprId, 4);
}
