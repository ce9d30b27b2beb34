//! Shared helpers for evaluator tests.

use parking_lot::Mutex;

use sift_eval::{
    Dispatcher, ExprId, Instruction, InstructionProgram, Overload, ParamType, ProgramMetadata,
    Unknown, Value, ValueKind,
};

/// Integer arithmetic, comparison and list access.
pub fn standard() -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add(standard_overloads()).unwrap();
    dispatcher
}

pub fn standard_overloads() -> Vec<Overload> {
    let int = ParamType::Exact(ValueKind::Int);
    vec![
        Overload::binary("add_int64", "_+_", int, int, |a, b| {
            match (a.as_int(), b.as_int()) {
                (Some(a), Some(b)) => Value::Int(a.wrapping_add(b)),
                _ => Value::Null,
            }
        }),
        Overload::binary("less_int64", "_<_", int, int, |a, b| {
            Value::Bool(a.as_int() < b.as_int())
        }),
        Overload::unary("size_list", "size", ParamType::Exact(ValueKind::List), |list| {
            Value::Int(list.as_list().map_or(0, |l| i64::try_from(l.len()).unwrap()))
        }),
        Overload::binary(
            "index_list",
            "_[_]",
            ParamType::Exact(ValueKind::List),
            int,
            |list, index| match list.as_indexer() {
                Some(indexer) => indexer.get(index),
                None => Value::Null,
            },
        ),
    ]
}

/// Record of overload invocations, by function name.
pub type CallLog = &'static Mutex<Vec<String>>;

pub fn call_log() -> CallLog {
    Box::leak(Box::new(Mutex::new(Vec::new())))
}

/// `_+_` over ints that records each invocation in `log`.
pub fn logged_add(log: CallLog) -> Overload {
    let int = ParamType::Exact(ValueKind::Int);
    Overload::binary("logged_add", "_+_", int, int, move |a, b| {
        log.lock().push("_+_".to_string());
        match (a.as_int(), b.as_int()) {
            (Some(a), Some(b)) => Value::Int(a.wrapping_add(b)),
            _ => Value::Null,
        }
    })
}

pub fn program(instructions: Vec<Instruction>) -> InstructionProgram {
    InstructionProgram::new(instructions, ProgramMetadata::new("test")).unwrap()
}

pub fn unknown(ids: &[u32]) -> Value {
    Value::unknown(ids.iter().copied().map(ExprId::new).collect::<Unknown>())
}
