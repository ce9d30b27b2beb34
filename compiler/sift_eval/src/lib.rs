//! Sift Eval - evaluator for compiled expression programs.
//!
//! Runs linearized instruction programs against caller-supplied bindings and
//! returns the result together with the table of every intermediate result.
//!
//! # Architecture
//!
//! - `Program` / `InstructionProgram`: ordered, prunable instructions with a
//!   restartable `Stepper`
//! - `EvalState`: dense expression-id → result table
//! - `Activation`: name resolution, root frames supplied by the caller
//! - `Dispatcher`: overload registry resolving calls by name, arity and kinds
//! - `Packager` / `TypeProvider`: qualified-name candidates, package-level
//!   identifiers and object construction
//! - `Interpreter` / `Interpretable`: binds a program to the collaborators and
//!   evaluates it
//!
//! Results are three-way (`Value`, `Value::Error`, `Value::Unknown`); see
//! `sift_value`. Malformed programs are defects of the program builder and
//! panic.
//!
//! # Re-exports
//!
//! `ExprId`, `ProgramMetadata` from `sift_ir` and `Value`, `Unknown`,
//! `EvalError`, `ValueKind` from `sift_value`.

mod activation;
mod dispatcher;
mod eval_mode;
mod eval_state;
mod interpreter;
mod packages;
mod program;
mod provider;
mod shared;

pub use sift_ir::{ExprId, ProgramMetadata};
pub use sift_value::{EvalError, Unknown, Value, ValueKind};

pub use activation::{
    Activation, Binding, EmptyActivation, HierarchicalActivation, MapActivation, ScopedActivation,
};
pub use dispatcher::{CallContext, DispatchError, Dispatcher, Overload, ParamType};
pub use eval_mode::{EvalCounters, EvalMode};
pub use eval_state::EvalState;
pub use interpreter::{Interpretable, Interpreter, InterpreterBuilder};
pub use packages::{DefaultPackager, Package, Packager};
pub use program::{Instruction, InstructionProgram, JumpCondition, Program, ProgramError, Stepper};
pub use provider::{RegistryError, TypeDescriptor, TypeProvider, TypeRegistry};
pub use shared::SharedRegistry;
