//! Linearized instruction programs.
//!
//! A program is an ordered list of [`Instruction`]s. Each instruction writes
//! its result into the evaluation slot named by its id; later instructions
//! read operands from those slots. Control instructions (`Jump`, scopes) move
//! the cursor or the binding environment instead of producing a value.
//!
//! # Ids
//!
//! Value-producing and control instructions carry unique ids. A `Mov` is the
//! exception: its id names the slot it copies *from*, which is the id of the
//! instruction that produced the value, so `Mov`s are not indexed by id.
//!
//! # Pruning
//!
//! [`Program::init`] runs once before the first evaluation. The provided
//! [`InstructionProgram`] uses it to pre-seed constants into the initial
//! evaluation table and drop them from the schedule; a constant whose slot is
//! overwritten by a `Mov` stays scheduled so each run restores it.

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

use sift_ir::{ExprId, ProgramMetadata};
use sift_value::Value;

use crate::{Dispatcher, EvalState};

type ConditionFn = dyn Fn(&EvalState) -> bool + Send + Sync;

/// Predicate deciding whether a `Jump` is taken.
pub struct JumpCondition(Box<ConditionFn>);

impl JumpCondition {
    /// Condition computed from the evaluation table.
    pub fn new(condition: impl Fn(&EvalState) -> bool + Send + Sync + 'static) -> Self {
        JumpCondition(Box::new(condition))
    }

    /// Unconditional jump.
    pub fn always() -> Self {
        JumpCondition::new(|_| true)
    }

    pub fn never() -> Self {
        JumpCondition::new(|_| false)
    }

    /// Jump when the slot `id` holds `true`.
    pub fn if_true(id: impl Into<ExprId>) -> Self {
        let id = id.into();
        JumpCondition::new(move |state| matches!(state.get(id), Some(Value::Bool(true))))
    }

    /// Jump when the slot `id` holds `false`.
    ///
    /// Errors and unknowns do not jump.
    pub fn if_false(id: impl Into<ExprId>) -> Self {
        let id = id.into();
        JumpCondition::new(move |state| matches!(state.get(id), Some(Value::Bool(false))))
    }

    pub fn test(&self, state: &EvalState) -> bool {
        (self.0)(state)
    }
}

impl fmt::Debug for JumpCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JumpCondition(..)")
    }
}

/// One step of a program.
#[derive(Debug)]
pub enum Instruction {
    /// Literal value.
    Const { id: ExprId, value: Value },
    /// Variable or package-level identifier.
    Ident { id: ExprId, name: String },
    /// Field or key access on the value at `operand`.
    Select {
        id: ExprId,
        operand: ExprId,
        field: String,
    },
    /// Function call. A strict call short-circuits on the first error or
    /// unknown argument.
    Call {
        id: ExprId,
        function: String,
        args: Vec<ExprId>,
        strict: bool,
    },
    CreateList { id: ExprId, elements: Vec<ExprId> },
    /// Map literal as `(key, value)` slot pairs in declaration order.
    CreateMap {
        id: ExprId,
        entries: Vec<(ExprId, ExprId)>,
    },
    /// Typed object literal as `(field, value slot)` pairs.
    CreateObject {
        id: ExprId,
        type_name: String,
        fields: Vec<(String, ExprId)>,
    },
    /// Copy the value at `id` into `target`.
    Mov { id: ExprId, target: ExprId },
    /// When `condition` holds, move the cursor `count` positions relative to
    /// the instruction after the jump.
    Jump {
        id: ExprId,
        condition: JumpCondition,
        count: i64,
    },
    /// Open a scope binding each name to an evaluation slot.
    PushScope {
        id: ExprId,
        declarations: Vec<(String, ExprId)>,
    },
    PopScope { id: ExprId },
}

impl Instruction {
    pub fn constant(id: impl Into<ExprId>, value: impl Into<Value>) -> Self {
        Instruction::Const {
            id: id.into(),
            value: value.into(),
        }
    }

    pub fn ident(id: impl Into<ExprId>, name: impl Into<String>) -> Self {
        Instruction::Ident {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn select(
        id: impl Into<ExprId>,
        operand: impl Into<ExprId>,
        field: impl Into<String>,
    ) -> Self {
        Instruction::Select {
            id: id.into(),
            operand: operand.into(),
            field: field.into(),
        }
    }

    /// Strict call.
    pub fn call<A: Into<ExprId>>(
        id: impl Into<ExprId>,
        function: impl Into<String>,
        args: impl IntoIterator<Item = A>,
    ) -> Self {
        Instruction::Call {
            id: id.into(),
            function: function.into(),
            args: args.into_iter().map(Into::into).collect(),
            strict: true,
        }
    }

    /// Call whose overloads receive error and unknown arguments.
    pub fn non_strict_call<A: Into<ExprId>>(
        id: impl Into<ExprId>,
        function: impl Into<String>,
        args: impl IntoIterator<Item = A>,
    ) -> Self {
        Instruction::Call {
            id: id.into(),
            function: function.into(),
            args: args.into_iter().map(Into::into).collect(),
            strict: false,
        }
    }

    pub fn list<E: Into<ExprId>>(
        id: impl Into<ExprId>,
        elements: impl IntoIterator<Item = E>,
    ) -> Self {
        Instruction::CreateList {
            id: id.into(),
            elements: elements.into_iter().map(Into::into).collect(),
        }
    }

    pub fn map<K: Into<ExprId>, V: Into<ExprId>>(
        id: impl Into<ExprId>,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Instruction::CreateMap {
            id: id.into(),
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn object<N: Into<String>, V: Into<ExprId>>(
        id: impl Into<ExprId>,
        type_name: impl Into<String>,
        fields: impl IntoIterator<Item = (N, V)>,
    ) -> Self {
        Instruction::CreateObject {
            id: id.into(),
            type_name: type_name.into(),
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    pub fn mov(id: impl Into<ExprId>, target: impl Into<ExprId>) -> Self {
        Instruction::Mov {
            id: id.into(),
            target: target.into(),
        }
    }

    pub fn jump(id: impl Into<ExprId>, condition: JumpCondition, count: i64) -> Self {
        Instruction::Jump {
            id: id.into(),
            condition,
            count,
        }
    }

    pub fn push_scope<N: Into<String>, V: Into<ExprId>>(
        id: impl Into<ExprId>,
        declarations: impl IntoIterator<Item = (N, V)>,
    ) -> Self {
        Instruction::PushScope {
            id: id.into(),
            declarations: declarations
                .into_iter()
                .map(|(name, slot)| (name.into(), slot.into()))
                .collect(),
        }
    }

    pub fn pop_scope(id: impl Into<ExprId>) -> Self {
        Instruction::PopScope { id: id.into() }
    }

    /// The instruction's id. For `Mov` this is the source slot.
    pub fn id(&self) -> ExprId {
        match self {
            Instruction::Const { id, .. }
            | Instruction::Ident { id, .. }
            | Instruction::Select { id, .. }
            | Instruction::Call { id, .. }
            | Instruction::CreateList { id, .. }
            | Instruction::CreateMap { id, .. }
            | Instruction::CreateObject { id, .. }
            | Instruction::Mov { id, .. }
            | Instruction::Jump { id, .. }
            | Instruction::PushScope { id, .. }
            | Instruction::PopScope { id } => *id,
        }
    }

    /// Variant name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Const { .. } => "Const",
            Instruction::Ident { .. } => "Ident",
            Instruction::Select { .. } => "Select",
            Instruction::Call { .. } => "Call",
            Instruction::CreateList { .. } => "CreateList",
            Instruction::CreateMap { .. } => "CreateMap",
            Instruction::CreateObject { .. } => "CreateObject",
            Instruction::Mov { .. } => "Mov",
            Instruction::Jump { .. } => "Jump",
            Instruction::PushScope { .. } => "PushScope",
            Instruction::PopScope { .. } => "PopScope",
        }
    }

    /// Slot this instruction writes, if it writes one.
    pub fn result_slot(&self) -> Option<ExprId> {
        match self {
            Instruction::Mov { target, .. } => Some(*target),
            Instruction::Jump { .. } | Instruction::PushScope { .. } | Instruction::PopScope { .. } => {
                None
            }
            other => Some(other.id()),
        }
    }

    /// Every id the instruction mentions: its own, operands and targets.
    fn referenced_ids(&self) -> Vec<ExprId> {
        let mut ids = vec![self.id()];
        match self {
            Instruction::Select { operand, .. } => ids.push(*operand),
            Instruction::Call { args, .. } => ids.extend(args),
            Instruction::CreateList { elements, .. } => ids.extend(elements),
            Instruction::CreateMap { entries, .. } => {
                for (key, value) in entries {
                    ids.push(*key);
                    ids.push(*value);
                }
            }
            Instruction::CreateObject { fields, .. } => {
                ids.extend(fields.iter().map(|(_, slot)| *slot));
            }
            Instruction::Mov { target, .. } => ids.push(*target),
            Instruction::PushScope { declarations, .. } => {
                ids.extend(declarations.iter().map(|(_, slot)| *slot));
            }
            Instruction::Const { .. }
            | Instruction::Ident { .. }
            | Instruction::Jump { .. }
            | Instruction::PopScope { .. } => {}
        }
        ids
    }
}

/// Restartable cursor over a program's scheduled instructions.
#[derive(Debug)]
pub struct Stepper<'p> {
    instructions: &'p [Instruction],
    pruned: &'p [bool],
    cursor: usize,
}

impl<'p> Stepper<'p> {
    /// Cursor at the first instruction. `pruned[i]` removes instruction `i`
    /// from the schedule; a shorter mask leaves the remainder scheduled.
    pub fn new(instructions: &'p [Instruction], pruned: &'p [bool]) -> Self {
        Stepper {
            instructions,
            pruned,
            cursor: 0,
        }
    }

    /// Position of the next instruction to consider.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Move the cursor `count` positions from where it stands (just past the
    /// jump that requested it).
    ///
    /// Returns `false` and leaves the cursor unchanged when the target falls
    /// outside `0..=len`. Landing exactly on `len` ends the program.
    pub fn jump(&mut self, count: i64) -> bool {
        let Ok(cursor) = i64::try_from(self.cursor) else {
            return false;
        };
        let Some(target) = cursor.checked_add(count) else {
            return false;
        };
        match usize::try_from(target) {
            Ok(target) if target <= self.instructions.len() => {
                self.cursor = target;
                true
            }
            _ => false,
        }
    }
}

impl<'p> Iterator for Stepper<'p> {
    type Item = &'p Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(instruction) = self.instructions.get(self.cursor) {
            let position = self.cursor;
            self.cursor += 1;
            if !self.pruned.get(position).copied().unwrap_or(false) {
                return Some(instruction);
            }
        }
        None
    }
}

/// A program the interpreter can run.
pub trait Program {
    /// Cursor at the start of the schedule.
    fn begin(&self) -> Stepper<'_>;

    /// The instruction with this id. `Mov`s are not addressable.
    fn instruction(&self, id: ExprId) -> Option<&Instruction>;

    /// Largest id defined or referenced, or `None` for an empty program.
    fn max_instruction_id(&self) -> Option<ExprId>;

    fn metadata(&self) -> &ProgramMetadata;

    /// One-time setup before the first evaluation. May seed `state`, which
    /// becomes the starting table of every evaluation.
    fn init(&mut self, dispatcher: &Dispatcher, state: &mut EvalState);
}

/// Error building a program.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("duplicate instruction id {id}")]
    DuplicateId { id: ExprId },
    #[error("instruction at position {position} uses the invalid id sentinel")]
    InvalidId { position: usize },
}

/// Program backed by a vector of instructions.
#[derive(Debug)]
pub struct InstructionProgram {
    instructions: Vec<Instruction>,
    pruned: Vec<bool>,
    index: FxHashMap<ExprId, usize>,
    max_id: Option<ExprId>,
    metadata: ProgramMetadata,
}

impl InstructionProgram {
    pub fn new(
        instructions: Vec<Instruction>,
        metadata: ProgramMetadata,
    ) -> Result<Self, ProgramError> {
        let mut index = FxHashMap::default();
        let mut max_id: Option<ExprId> = None;

        for (position, instruction) in instructions.iter().enumerate() {
            for id in instruction.referenced_ids() {
                if !id.is_valid() {
                    return Err(ProgramError::InvalidId { position });
                }
                max_id = Some(max_id.map_or(id, |max| max.max(id)));
            }
            if matches!(instruction, Instruction::Mov { .. }) {
                continue;
            }
            let id = instruction.id();
            if index.insert(id, position).is_some() {
                return Err(ProgramError::DuplicateId { id });
            }
        }

        let pruned = vec![false; instructions.len()];
        Ok(InstructionProgram {
            instructions,
            pruned,
            index,
            max_id,
            metadata,
        })
    }

    /// Instructions in schedule order, pruned ones included.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions still scheduled.
    pub fn scheduled_len(&self) -> usize {
        self.pruned.iter().filter(|pruned| !**pruned).count()
    }
}

impl Program for InstructionProgram {
    fn begin(&self) -> Stepper<'_> {
        Stepper::new(&self.instructions, &self.pruned)
    }

    fn instruction(&self, id: ExprId) -> Option<&Instruction> {
        self.index
            .get(&id)
            .and_then(|position| self.instructions.get(*position))
    }

    fn max_instruction_id(&self) -> Option<ExprId> {
        self.max_id
    }

    fn metadata(&self) -> &ProgramMetadata {
        &self.metadata
    }

    fn init(&mut self, dispatcher: &Dispatcher, state: &mut EvalState) {
        let mov_targets: FxHashSet<ExprId> = self
            .instructions
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::Mov { target, .. } => Some(*target),
                _ => None,
            })
            .collect();

        for (instruction, pruned) in self.instructions.iter().zip(self.pruned.iter_mut()) {
            match instruction {
                Instruction::Const { id, value } if !mov_targets.contains(id) => {
                    state.set(*id, value.clone());
                    *pruned = true;
                }
                Instruction::Call { id, function, .. } if !dispatcher.has_function(function) => {
                    tracing::debug!(?id, function = %function, "call to function with no overloads");
                }
                _ => {}
            }
        }
        tracing::debug!(
            scheduled = self.scheduled_len(),
            total = self.instructions.len(),
            "program initialized"
        );
    }
}
