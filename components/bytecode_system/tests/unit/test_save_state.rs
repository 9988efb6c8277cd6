//! Tests for persisted story state

use bytecode_system::{Codec, DecodeError, Divert, Opcode, Path, SaveState, Value, VariablePointer};

#[test]
fn test_runtime_objects_survive_a_save() {
    let codec = Codec::new().unwrap();
    let mut state = SaveState::new();
    let target = state.tree.add(Value::divert_target(Path::parse("knot.stitch")));
    let pointer = state
        .tree
        .add(Value::VariablePointer(VariablePointer::with_context("hp", 1)));
    let divert = state.tree.add(Divert::to_path(Path::parse("knot")));
    state.eval_stack = vec![target, pointer];
    state.variables = vec![("jump".to_string(), divert)];
    state.turn_indices = vec![("knot".to_string(), 9)];

    let text = state.to_json_string(&codec).unwrap();
    let restored = SaveState::from_str(&codec, &text).unwrap();

    let opcodes: Vec<&Opcode> = restored
        .eval_stack
        .iter()
        .map(|id| restored.tree.opcode(*id))
        .collect();
    assert_eq!(
        opcodes,
        vec![
            &Opcode::Value(Value::divert_target(Path::parse("knot.stitch"))),
            &Opcode::Value(Value::VariablePointer(VariablePointer::with_context("hp", 1))),
        ]
    );
    assert_eq!(restored.turn_indices, vec![("knot".to_string(), 9)]);
    assert_eq!(restored.to_json_string(&codec).unwrap(), text);
}

#[test]
fn test_bad_choice_is_rejected() {
    let codec = Codec::new().unwrap();
    let text = r#"{"turnIdx":0,"storySeed":0,"currentChoices":[{"text":"x"}],"evalStack":[],"variablesState":{}}"#;
    assert!(matches!(
        SaveState::from_str(&codec, text),
        Err(DecodeError::MissingField { field: "index", .. })
    ));
}

#[test]
fn test_state_must_be_an_object() {
    let codec = Codec::new().unwrap();
    assert!(matches!(
        SaveState::from_str(&codec, "[]"),
        Err(DecodeError::ExpectedObject(_))
    ));
}

#[test]
fn test_large_visit_count_table_keeps_order() {
    let codec = Codec::new().unwrap();
    let mut state = SaveState::new();
    state.visit_counts = (0..100_000)
        .map(|i| (format!("knot_{}", 99_999 - i), i))
        .collect();

    let text = state.to_json_string(&codec).unwrap();
    let restored = SaveState::from_str(&codec, &text).unwrap();

    assert_eq!(restored.visit_counts.len(), 100_000);
    assert_eq!(restored.visit_counts[0], ("knot_99999".to_string(), 0));
    assert_eq!(restored.visit_counts[99_999], ("knot_0".to_string(), 99_999));
    assert_eq!(restored.visit_counts, state.visit_counts);
}
