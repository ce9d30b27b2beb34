//! Evaluation modes and per-evaluation bookkeeping.
//!
//! The core loop has no suspension point, so callers that need a deadline
//! choose `EvalMode::Budgeted`: the loop checks the budget before every
//! instruction and stops with a `StepLimitExceeded` error once it runs out.

/// Evaluation policy for an `Interpreter`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EvalMode {
    /// Run every program to completion.
    #[default]
    Unbounded,
    /// Stop after `max_steps` executed instructions.
    Budgeted {
        /// Maximum number of instructions per evaluation.
        max_steps: u64,
    },
}

impl EvalMode {
    /// Step budget, or `None` when unbounded.
    #[inline]
    pub fn max_steps(self) -> Option<u64> {
        match self {
            EvalMode::Unbounded => None,
            EvalMode::Budgeted { max_steps } => Some(max_steps),
        }
    }
}

/// Profiling counters for one evaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalCounters {
    pub instructions: u64,
    pub calls: u64,
    pub unknown_resolutions: u64,
}

impl EvalCounters {
    #[inline]
    pub fn count_instruction(&mut self) {
        self.instructions = self.instructions.wrapping_add(1);
    }

    #[inline]
    pub fn count_call(&mut self) {
        self.calls = self.calls.wrapping_add(1);
    }

    #[inline]
    pub fn count_unknown_resolution(&mut self) {
        self.unknown_resolutions = self.unknown_resolutions.wrapping_add(1);
    }

    /// Human-readable summary for logs.
    pub fn report(&self) -> String {
        format!(
            "{} instructions, {} calls, {} unknown resolutions",
            self.instructions, self.calls, self.unknown_resolutions
        )
    }
}

/// Mutable state tracked alongside `EvalMode` during one evaluation.
///
/// Counters are `None` unless profiling is enabled, making every increment a
/// no-op in that case.
#[derive(Clone, Debug)]
pub(crate) struct ModeState {
    steps: u64,
    budget: Option<u64>,
    counters: Option<EvalCounters>,
}

impl ModeState {
    pub(crate) fn new(mode: EvalMode, profile: bool) -> Self {
        ModeState {
            steps: 0,
            budget: mode.max_steps(),
            counters: profile.then(EvalCounters::default),
        }
    }

    /// Clear step count and counters before a new evaluation.
    pub(crate) fn reset(&mut self) {
        self.steps = 0;
        if let Some(counters) = &mut self.counters {
            *counters = EvalCounters::default();
        }
    }

    /// Consume one step of the budget.
    #[inline]
    pub(crate) fn check_budget(&mut self) -> Result<(), BudgetExceeded> {
        if let Some(budget) = self.budget {
            if self.steps >= budget {
                return Err(BudgetExceeded { budget });
            }
            self.steps = self.steps.saturating_add(1);
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn count_instruction(&mut self) {
        if let Some(c) = &mut self.counters {
            c.count_instruction();
        }
    }

    #[inline]
    pub(crate) fn count_call(&mut self) {
        if let Some(c) = &mut self.counters {
            c.count_call();
        }
    }

    #[inline]
    pub(crate) fn count_unknown_resolution(&mut self) {
        if let Some(c) = &mut self.counters {
            c.count_unknown_resolution();
        }
    }

    pub(crate) fn counters(&self) -> Option<&EvalCounters> {
        self.counters.as_ref()
    }
}

/// The step budget ran out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct BudgetExceeded {
    pub(crate) budget: u64,
}
