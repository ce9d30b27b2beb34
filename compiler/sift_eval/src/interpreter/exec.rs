//! The stepping loop.
//!
//! Every value-producing instruction reads its operands from the evaluation
//! table and writes its result under its own id (`Mov` writes under its
//! target). An operand slot that was never written reads as an unknown for
//! that id.
//!
//! Strict instructions (strict calls and all aggregate constructors) store
//! the first error or unknown operand, in declaration order, as their own
//! result and evaluate nothing further.

use rustc_hash::FxHashMap;

use sift_ir::ExprId;
use sift_value::{
    invalid_select_operand, step_limit_exceeded, MapKey, MapValue, Unknown, Value,
};

use super::Interpreter;
use crate::activation::{ScopeFrame, ScopeStack};
use crate::eval_mode::ModeState;
use crate::{Activation, CallContext, EvalState, Instruction, Program};

/// One evaluation in progress: split borrows of an `Interpretable`.
pub(super) struct Machine<'a, P> {
    pub(super) interpreter: &'a Interpreter,
    pub(super) program: &'a P,
    pub(super) state: &'a mut EvalState,
    pub(super) scopes: ScopeStack<'a>,
    pub(super) mode: &'a mut ModeState,
}

impl<'a, P: Program> Machine<'a, P> {
    pub(super) fn new(
        interpreter: &'a Interpreter,
        program: &'a P,
        state: &'a mut EvalState,
        activation: &'a dyn Activation,
        mode: &'a mut ModeState,
    ) -> Self {
        Machine {
            interpreter,
            program,
            state,
            scopes: ScopeStack::new(activation),
            mode,
        }
    }

    /// Run to completion and produce the final result.
    pub(super) fn run(&mut self) -> Value {
        let program = self.program;
        let mut stepper = program.begin();
        let mut result_slot: Option<ExprId> = None;

        while let Some(instruction) = stepper.next() {
            if let Err(exceeded) = self.mode.check_budget() {
                tracing::debug!(budget = exceeded.budget, "step budget exhausted");
                return Value::error(step_limit_exceeded(exceeded.budget));
            }
            self.mode.count_instruction();
            tracing::trace!(id = ?instruction.id(), instruction = instruction.name(), "step");

            match instruction {
                Instruction::Const { id, value } => self.state.set(*id, value.clone()),
                Instruction::Ident { id, name } => self.eval_ident(*id, name),
                Instruction::Select { id, operand, field } => {
                    self.eval_select(*id, *operand, field);
                }
                Instruction::Call {
                    id,
                    function,
                    args,
                    strict,
                } => self.eval_call(*id, function, args, *strict),
                Instruction::CreateList { id, elements } => self.eval_create_list(*id, elements),
                Instruction::CreateMap { id, entries } => self.eval_create_map(*id, entries),
                Instruction::CreateObject {
                    id,
                    type_name,
                    fields,
                } => self.eval_create_object(*id, type_name, fields),
                Instruction::Mov { id, target } => {
                    let value = self.value(*id);
                    self.state.set(*target, value);
                }
                Instruction::Jump {
                    id,
                    condition,
                    count,
                } => {
                    if condition.test(self.state) && !stepper.jump(*count) {
                        tracing::error!(?id, count, position = stepper.position(), "jump out of range");
                        panic!("jump at {id:?} by {count} leaves the program");
                    }
                }
                Instruction::PushScope { declarations, .. } => {
                    self.scopes.push(ScopeFrame::new(declarations));
                    tracing::trace!(depth = self.scopes.depth(), "scope opened");
                }
                Instruction::PopScope { id } => {
                    self.scopes.pop(*id);
                    tracing::trace!(depth = self.scopes.depth(), "scope closed");
                }
            }

            if let Some(slot) = instruction.result_slot() {
                result_slot = Some(slot);
            }
        }

        match result_slot {
            Some(slot) => self.value(slot),
            None => self
                .state
                .only_value()
                .cloned()
                .unwrap_or_else(|| Value::unknown(Unknown::empty())),
        }
    }

    /// The stored value for `id`, or an unknown naming `id` when unset.
    pub(super) fn value(&self, id: ExprId) -> Value {
        self.state
            .get(id)
            .cloned()
            .unwrap_or_else(|| Value::unknown(Unknown::new(id)))
    }

    /// Activation bindings first, then package-level identifiers.
    fn eval_ident(&mut self, id: ExprId, name: &str) {
        let value = self
            .scopes
            .resolve_name(name, self.state)
            .or_else(|| self.interpreter.provider.find_ident(name))
            .unwrap_or_else(|| Value::unknown(Unknown::new(id)));
        self.state.set(id, value);
    }

    fn eval_select(&mut self, id: ExprId, operand: ExprId, field: &str) {
        let target = self.value(operand);
        let result = match &target {
            Value::Unknown(unknown) => self.resolve_unknown(unknown, id, field),
            Value::Error(_) => target.clone(),
            other => match other.as_indexer() {
                Some(indexer) => indexer.get(&Value::string(field)),
                None => {
                    let mut err = invalid_select_operand();
                    if let Some(span) = self.program.metadata().id_span(id) {
                        err = err.with_span(span);
                    }
                    Value::error(err)
                }
            },
        };
        self.state.set(id, result);
    }

    fn eval_call(&mut self, id: ExprId, function: &str, arg_ids: &[ExprId], strict: bool) {
        let mut args = Vec::with_capacity(arg_ids.len());
        for arg_id in arg_ids {
            let arg = self.value(*arg_id);
            if strict && arg.is_error_or_unknown() {
                self.state.set(id, arg);
                return;
            }
            args.push(arg);
        }

        self.mode.count_call();
        let result = {
            let activation = self.scopes.view(self.state);
            let ctx = CallContext::new(
                id,
                function,
                strict,
                &args,
                &activation,
                self.program.metadata(),
            );
            self.interpreter.dispatcher.dispatch(&ctx)
        };
        self.state.set(id, result);
    }

    fn eval_create_list(&mut self, id: ExprId, element_ids: &[ExprId]) {
        let mut elements = Vec::with_capacity(element_ids.len());
        for element_id in element_ids {
            let element = self.value(*element_id);
            if element.is_error_or_unknown() {
                self.state.set(id, element);
                return;
            }
            elements.push(element);
        }
        self.state.set(id, Value::list(elements));
    }

    fn eval_create_map(&mut self, id: ExprId, entries: &[(ExprId, ExprId)]) {
        let mut map = MapValue::new();
        for (key_id, value_id) in entries {
            let key = self.value(*key_id);
            if key.is_error_or_unknown() {
                self.state.set(id, key);
                return;
            }
            let value = self.value(*value_id);
            if value.is_error_or_unknown() {
                self.state.set(id, value);
                return;
            }
            match MapKey::try_from(&key) {
                Ok(key) => {
                    map.insert(key, value);
                }
                Err(err) => {
                    self.state.set(id, Value::error(err));
                    return;
                }
            }
        }
        self.state.set(id, Value::map(map));
    }

    fn eval_create_object(&mut self, id: ExprId, type_name: &str, field_ids: &[(String, ExprId)]) {
        let mut fields = FxHashMap::default();
        for (name, value_id) in field_ids {
            let value = self.value(*value_id);
            if value.is_error_or_unknown() {
                self.state.set(id, value);
                return;
            }
            fields.insert(name.clone(), value);
        }

        let provider = &*self.interpreter.provider;
        let qualified = self
            .interpreter
            .packager
            .resolve_candidate_names(type_name)
            .into_iter()
            .find(|candidate| provider.find_type(candidate).is_some())
            .unwrap_or_else(|| type_name.to_string());
        tracing::trace!(?id, type_name, qualified = %qualified, "create object");
        self.state.set(id, provider.new_value(&qualified, fields));
    }
}
