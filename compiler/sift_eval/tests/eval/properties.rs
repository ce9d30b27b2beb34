//! Result propagation, short-circuiting and determinism.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use sift_eval::{
    Dispatcher, EmptyActivation, ExprId, Instruction, Interpreter, MapActivation, TypeRegistry,
    Value,
};

use crate::common::{call_log, logged_add, program, standard, unknown};

#[test]
fn ident_plus_ident() {
    let interpreter = Interpreter::builder().dispatcher(standard()).build();
    let mut interpretable = interpreter.new_interpretable(program(vec![
        Instruction::ident(1, "x"),
        Instruction::call(2, "_+_", [1, 1]),
    ]));
    let activation = MapActivation::new().with("x", Value::Int(3));

    let (value, state) = interpretable.eval(&activation);
    assert_eq!(value, Value::Int(6));
    assert_eq!(state.get(ExprId::new(1)), Some(&Value::Int(3)));
    assert_eq!(state.get(ExprId::new(2)), Some(&Value::Int(6)));
}

#[test]
fn activation_wins_over_provider() {
    let provider = TypeRegistry::new().with_ident("x", Value::string("package"));
    let interpreter = Interpreter::builder().provider(provider).build();
    let mut interpretable = interpreter.new_interpretable(program(vec![Instruction::ident(1, "x")]));

    let scoped = MapActivation::new().with("x", Value::string("scope"));
    assert_eq!(interpretable.eval(&scoped).0, Value::string("scope"));
    assert_eq!(interpretable.eval(&EmptyActivation).0, Value::string("package"));
}

#[test]
fn strict_call_skips_overload_on_offending_argument() {
    let log = call_log();
    let mut dispatcher = Dispatcher::new();
    dispatcher.add([logged_add(log)]).unwrap();
    let interpreter = Interpreter::builder().dispatcher(dispatcher).build();
    let mut interpretable = interpreter.new_interpretable(program(vec![
        Instruction::constant(1, 1i64),
        Instruction::ident(2, "missing"),
        Instruction::call(3, "_+_", [1, 1]),
        Instruction::call(4, "_+_", [2, 3]),
        Instruction::call(5, "_+_", [4, 1]),
    ]));

    let (value, state) = interpretable.eval(&EmptyActivation);
    assert_eq!(value, unknown(&[2]));
    assert_eq!(state.get(ExprId::new(4)), Some(&unknown(&[2])));
    // Only call 3 reached the overload.
    assert_eq!(*log.lock(), vec!["_+_".to_string()]);
}

#[test]
fn error_propagates_through_aggregates() {
    let interpreter = Interpreter::builder().dispatcher(standard()).build();
    let mut interpretable = interpreter.new_interpretable(program(vec![
        Instruction::constant(1, "text"),
        Instruction::ident(2, "later"),
        Instruction::call(3, "_+_", [1, 1]),
        Instruction::list(4, [3, 2]),
        Instruction::map(5, [(1, 4)]),
    ]));

    let (value, state) = interpretable.eval(&EmptyActivation);
    let error = state.get(ExprId::new(3)).cloned().unwrap();
    assert!(error.is_error());
    // The error is first in declaration order, ahead of the unknown.
    assert_eq!(state.get(ExprId::new(4)), Some(&error));
    assert_eq!(value, error);
}

/// `x + x` where `x` is bound to `n`, chained `depth` times.
fn doubling_chain(depth: u32) -> Vec<Instruction> {
    let mut instructions = vec![Instruction::ident(1, "x")];
    for step in 0..depth {
        instructions.push(Instruction::call(step + 2, "_+_", [step + 1, step + 1]));
    }
    instructions
}

proptest! {
    #[test]
    fn eval_is_deterministic(n in -1_000i64..1_000, depth in 0u32..8) {
        let interpreter = Interpreter::builder().dispatcher(standard()).build();
        let mut first = interpreter.new_interpretable(program(doubling_chain(depth)));
        let mut second = interpreter.new_interpretable(program(doubling_chain(depth)));
        let activation = MapActivation::new().with("x", Value::Int(n));

        let (a, state_a) = first.eval(&activation);
        let state_a = state_a.clone();
        let (b, state_b) = second.eval(&activation);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(&state_a, state_b);
        prop_assert_eq!(a, Value::Int(n * (1 << depth)));

        // Re-running the same interpretable gives the same answer.
        let (again, _) = first.eval(&activation);
        prop_assert_eq!(again, b);
    }

    #[test]
    fn mov_copies_value_at_execution_time(original in any::<i64>(), replacement in any::<i64>()) {
        // A -> B, then A is overwritten; B must keep the original.
        let mut interpretable = Interpreter::default().new_interpretable(program(vec![
            Instruction::ident(1, "a"),
            Instruction::mov(1, 2),
            Instruction::ident(3, "b"),
            Instruction::mov(3, 1),
            Instruction::list(4, [1, 2]),
        ]));
        let activation = MapActivation::new()
            .with("a", Value::Int(original))
            .with("b", Value::Int(replacement));

        let (value, state) = interpretable.eval(&activation);
        prop_assert_eq!(state.get(ExprId::new(2)), Some(&Value::Int(original)));
        prop_assert_eq!(
            value,
            Value::list(vec![Value::Int(replacement), Value::Int(original)])
        );
    }
}
