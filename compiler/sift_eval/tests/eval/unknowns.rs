//! Unknown provenance and qualified-name recovery.

use pretty_assertions::assert_eq;

use sift_eval::{
    EmptyActivation, ExprId, Instruction, Interpreter, MapActivation, Packager, TypeDescriptor,
    TypeProvider, TypeRegistry, Value,
};

use crate::common::{program, unknown};

/// Packager declaring the expression inside package `pkg`.
struct PkgPackager;

impl Packager for PkgPackager {
    fn resolve_candidate_names(&self, name: &str) -> Vec<String> {
        vec![format!("pkg.{name}"), name.to_string()]
    }
}

fn abc() -> Vec<Instruction> {
    vec![
        Instruction::ident(1, "a"),
        Instruction::select(2, 1, "b"),
        Instruction::select(3, 2, "c"),
    ]
}

#[test]
fn select_on_unbound_ident() {
    let mut interpretable = Interpreter::default().new_interpretable(program(vec![
        Instruction::ident(1, "y"),
        Instruction::select(2, 1, "z"),
    ]));

    let (value, state) = interpretable.eval(&EmptyActivation);
    let ids = value.as_unknown().unwrap().ids().to_vec();
    // Outermost first.
    assert_eq!(ids, vec![ExprId::new(2), ExprId::new(1)]);
    assert_eq!(state.unknown_ids(), vec![ExprId::new(1), ExprId::new(2)]);
}

#[test]
fn provenance_accumulates_outer_to_inner() {
    let mut interpretable = Interpreter::default().new_interpretable(program(abc()));
    let (value, state) = interpretable.eval(&EmptyActivation);

    assert_eq!(value, unknown(&[3, 2, 1]));
    assert_eq!(state.get(ExprId::new(2)), Some(&unknown(&[2, 1])));
}

#[test]
fn qualified_name_found_by_provider() {
    let provider = TypeRegistry::new().with_ident("a.b.c", Value::string("found"));
    let interpreter = Interpreter::builder()
        .packager(PkgPackager)
        .provider(provider)
        .build();
    let mut interpretable = interpreter.new_interpretable(program(abc()));

    let (value, state) = interpretable.eval(&EmptyActivation);
    assert_eq!(value, Value::string("found"));
    // Intermediate selects stay unknown.
    assert_eq!(state.get(ExprId::new(2)), Some(&unknown(&[2, 1])));
}

#[test]
fn package_candidate_wins_over_root_name() {
    let provider = TypeRegistry::new()
        .with_ident("a.b.c", Value::string("root"))
        .with_ident("pkg.a.b.c", Value::string("package"));
    let interpreter = Interpreter::builder()
        .packager(PkgPackager)
        .provider(provider)
        .build();
    let mut interpretable = interpreter.new_interpretable(program(abc()));

    assert_eq!(interpretable.eval(&EmptyActivation).0, Value::string("package"));
}

#[test]
fn qualified_name_found_in_activation() {
    // A binding spelled with dots is checked before the provider.
    let provider = TypeRegistry::new().with_ident("a.b.c", Value::string("provider"));
    let interpreter = Interpreter::builder().provider(provider).build();
    let mut interpretable = interpreter.new_interpretable(program(abc()));
    let activation = MapActivation::new().with("a.b.c", Value::Int(42));

    assert_eq!(interpretable.eval(&activation).0, Value::Int(42));
}

#[test]
fn partial_name_resolves_then_selects_normally() {
    let mut fields = rustc_hash::FxHashMap::default();
    fields.insert("c".to_string(), Value::Int(7));
    let mut provider = TypeRegistry::new();
    provider
        .register_type(TypeDescriptor::new("Record", ["c"]))
        .unwrap();
    let record = provider.new_value("Record", fields);
    let provider = provider.with_ident("a.b", record);

    let interpreter = Interpreter::builder().provider(provider).build();
    let mut interpretable = interpreter.new_interpretable(program(abc()));

    let (value, state) = interpretable.eval(&EmptyActivation);
    assert!(state.get(ExprId::new(2)).unwrap().as_object().is_some());
    assert_eq!(value, Value::Int(7));
}
