//! Interpreter and interpretable programs.
//!
//! # Architecture
//!
//! An [`Interpreter`] bundles the collaborators every evaluation needs: the
//! function [`Dispatcher`], the [`Packager`] that spells out qualified-name
//! candidates, and the [`TypeProvider`]. It is cheap to clone and safe to share
//! between threads; all three collaborators are read-only once built.
//!
//! `Interpreter::new_interpretable` binds a [`Program`] to those
//! collaborators. It sizes the evaluation table from the program's largest id
//! and runs `Program::init` once, producing the starting table that every
//! evaluation is reset to.
//!
//! An [`Interpretable`] runs the program against an [`Activation`]:
//!
//! - `exec.rs` - the stepping loop and per-instruction semantics
//! - `resolve.rs` - reinterpretation of unknown select chains as qualified names
//!
//! # Concurrency
//!
//! `Interpretable::eval` takes `&mut self`: the evaluation table is working
//! memory, so one interpretable runs one evaluation at a time. Build one
//! interpretable per thread from a shared `Interpreter` for parallel use.

mod builder;
mod exec;
mod resolve;

pub use builder::InterpreterBuilder;

use sift_value::Value;

use crate::eval_mode::{EvalCounters, EvalMode, ModeState};
use crate::{
    Activation, Dispatcher, EvalState, Packager, Program, SharedRegistry, TypeProvider,
};
use exec::Machine;

/// Factory for [`Interpretable`]s sharing one set of collaborators.
#[derive(Clone)]
pub struct Interpreter {
    dispatcher: SharedRegistry<Dispatcher>,
    packager: SharedRegistry<dyn Packager>,
    provider: SharedRegistry<dyn TypeProvider>,
    mode: EvalMode,
    profile: bool,
}

impl Interpreter {
    /// Interpreter with the given collaborators, unbounded and without profiling.
    pub fn new(
        dispatcher: SharedRegistry<Dispatcher>,
        packager: SharedRegistry<dyn Packager>,
        provider: SharedRegistry<dyn TypeProvider>,
    ) -> Self {
        Interpreter {
            dispatcher,
            packager,
            provider,
            mode: EvalMode::default(),
            profile: false,
        }
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn packager(&self) -> &dyn Packager {
        &*self.packager
    }

    pub fn provider(&self) -> &dyn TypeProvider {
        &*self.provider
    }

    pub fn mode(&self) -> EvalMode {
        self.mode
    }

    /// Bind `program` to this interpreter's collaborators.
    #[tracing::instrument(level = "debug", skip_all, fields(program = %program.metadata().description()))]
    pub fn new_interpretable<P: Program>(&self, mut program: P) -> Interpretable<P> {
        let size = program
            .max_instruction_id()
            .map_or(0, |max| max.index() + 1);
        let mut initial = EvalState::new(size);
        program.init(&self.dispatcher, &mut initial);
        tracing::debug!(size, seeded = initial.len(), "interpretable ready");

        Interpretable {
            interpreter: self.clone(),
            program,
            state: initial.clone(),
            initial,
            mode_state: ModeState::new(self.mode, self.profile),
        }
    }
}

impl Default for Interpreter {
    /// Empty dispatcher, root packager and empty type registry.
    fn default() -> Self {
        InterpreterBuilder::new().build()
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("overloads", &self.dispatcher.len())
            .field("mode", &self.mode)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

/// A program bound to an interpreter, ready to evaluate.
pub struct Interpretable<P> {
    interpreter: Interpreter,
    program: P,
    initial: EvalState,
    state: EvalState,
    mode_state: ModeState,
}

impl<P: Program> Interpretable<P> {
    /// Evaluate against `activation`.
    ///
    /// Returns the result together with the evaluation table, which records
    /// the last value computed for every expression id. Each call starts
    /// from the table produced by `Program::init`.
    ///
    /// # Panics
    /// Panics if the program is malformed: a jump leaving the program, a
    /// scope pop with no open scope, or an id outside the evaluation table.
    #[tracing::instrument(level = "debug", skip_all, fields(program = %self.program.metadata().description()))]
    pub fn eval(&mut self, activation: &dyn Activation) -> (Value, &EvalState) {
        self.state.clone_from(&self.initial);
        self.mode_state.reset();

        let result = Machine::new(
            &self.interpreter,
            &self.program,
            &mut self.state,
            activation,
            &mut self.mode_state,
        )
        .run();

        if let Some(counters) = self.mode_state.counters() {
            tracing::debug!(profile = %counters.report(), "evaluation finished");
        }
        (result, &self.state)
    }

    /// Counters of the last evaluation, when profiling is enabled.
    pub fn counters(&self) -> Option<&EvalCounters> {
        self.mode_state.counters()
    }

    pub fn program(&self) -> &P {
        &self.program
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// The table as of the last evaluation.
    pub fn state(&self) -> &EvalState {
        &self.state
    }
}

impl<P: std::fmt::Debug> std::fmt::Debug for Interpretable<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpretable")
            .field("program", &self.program)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
