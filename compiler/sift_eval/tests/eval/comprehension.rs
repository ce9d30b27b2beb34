//! Loops built from scopes, moves and jumps.

use pretty_assertions::assert_eq;

use sift_eval::{
    EmptyActivation, EvalMode, ExprId, Instruction, Interpreter, JumpCondition, MapActivation,
    Value,
};
use sift_value::EvalErrorKind;

use crate::common::{program, standard};

/// Sum of `range` via an accumulator loop.
///
/// Slot 10 is the accumulator and slot 11 the loop index; both are threaded
/// across iterations with `Mov`.
fn sum_loop(range: u32) -> Vec<Instruction> {
    vec![
        // 0..3: initial accumulator and index
        Instruction::constant(2, 0i64),
        Instruction::constant(3, 0i64),
        Instruction::mov(2, 10),
        Instruction::mov(3, 11),
        // 4
        Instruction::push_scope(4, [("__acc", 10), ("__i", 11), ("__range", range)]),
        // 5..9: loop condition
        Instruction::ident(12, "__i"),
        Instruction::ident(13, "__range"),
        Instruction::call(14, "size", [13]),
        Instruction::call(15, "_<_", [12, 14]),
        Instruction::jump(16, JumpCondition::if_false(15), 8),
        // 10..17: body
        Instruction::ident(17, "__acc"),
        Instruction::call(18, "_[_]", [13, 12]),
        Instruction::call(19, "_+_", [17, 18]),
        Instruction::constant(20, 1i64),
        Instruction::call(21, "_+_", [12, 20]),
        Instruction::mov(19, 10),
        Instruction::mov(21, 11),
        Instruction::jump(22, JumpCondition::always(), -13),
        // 18..19: result
        Instruction::ident(23, "__acc"),
        Instruction::pop_scope(24),
    ]
}

fn with_list(elements: &[i64]) -> Vec<Instruction> {
    let mut instructions = vec![
        Instruction::constant(30, Value::list(elements.iter().copied().map(Value::Int).collect())),
        Instruction::mov(30, 1),
    ];
    instructions.extend(sum_loop(1));
    instructions
}

#[test]
fn sums_list_through_scoped_loop() {
    let interpreter = Interpreter::builder().dispatcher(standard()).build();
    let mut interpretable = interpreter.new_interpretable(program(with_list(&[1, 2, 3])));

    let (value, state) = interpretable.eval(&EmptyActivation);
    assert_eq!(value, Value::Int(6));
    assert_eq!(state.get(ExprId::new(11)), Some(&Value::Int(3)));
    assert_eq!(state.get(ExprId::new(15)), Some(&Value::Bool(false)));
}

#[test]
fn loop_over_empty_list_skips_body() {
    let interpreter = Interpreter::builder().dispatcher(standard()).build();
    let mut interpretable = interpreter.new_interpretable(program(with_list(&[])));

    let (value, state) = interpretable.eval(&EmptyActivation);
    assert_eq!(value, Value::Int(0));
    assert_eq!(state.get(ExprId::new(17)), None);
}

#[test]
fn loop_reads_range_from_activation() {
    let interpreter = Interpreter::builder().dispatcher(standard()).build();
    let mut instructions = vec![Instruction::ident(1, "items")];
    instructions.extend(sum_loop(1));
    let mut interpretable = interpreter.new_interpretable(program(instructions));

    let items = Value::list(vec![Value::Int(10), Value::Int(20)]);
    let (value, _) = interpretable.eval(&MapActivation::new().with("items", items));
    assert_eq!(value, Value::Int(30));

    // Repeated evaluation restarts the accumulator.
    let items = Value::list(vec![Value::Int(5)]);
    let (value, _) = interpretable.eval(&MapActivation::new().with("items", items));
    assert_eq!(value, Value::Int(5));
}

#[test]
fn budget_cuts_long_loop() {
    let interpreter = Interpreter::builder()
        .dispatcher(standard())
        .mode(EvalMode::Budgeted { max_steps: 20 })
        .profile(true)
        .build();
    let mut interpretable =
        interpreter.new_interpretable(program(with_list(&[1, 2, 3, 4, 5, 6, 7, 8])));

    let (value, _) = interpretable.eval(&EmptyActivation);
    assert_eq!(
        value.as_error().map(|e| e.kind().clone()),
        Some(EvalErrorKind::StepLimitExceeded { limit: 20 })
    );
    assert_eq!(interpretable.counters().map(|c| c.instructions), Some(20));
}

#[test]
#[should_panic(expected = "leaves the program")]
fn backward_jump_past_start_panics() {
    let mut interpretable = Interpreter::default().new_interpretable(program(vec![
        Instruction::ident(1, "x"),
        Instruction::jump(2, JumpCondition::always(), -3),
    ]));
    let _ = interpretable.eval(&EmptyActivation);
}

#[test]
#[should_panic(expected = "unbalanced scope")]
fn extra_pop_panics() {
    let mut interpretable = Interpreter::default().new_interpretable(program(vec![
        Instruction::push_scope(1, [("x", 2)]),
        Instruction::pop_scope(3),
        Instruction::pop_scope(4),
    ]));
    let _ = interpretable.eval(&EmptyActivation);
}
