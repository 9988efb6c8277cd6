//! Contract compliance tests for compiler
//! Verifies the public API and the built-in vocabulary

use bytecode_system::NativeFunctionCall;
use compiler::{
    is_built_in, CompileError, Compiler, CompilerOptions, Expression, Flow, Statement, Story,
    GLOBAL_DECLARATION_NAME,
};

/// Built-in names are reserved and never lowered as story functions
#[test]
fn test_contract_built_in_names() {
    for name in ["CHOICE_COUNT", "TURNS", "TURNS_SINCE", "READ_COUNT", "RANDOM", "SEED_RANDOM"] {
        assert!(is_built_in(name), "{} should be built in", name);
    }
    for native in NativeFunctionCall::all() {
        assert!(is_built_in(native.name()));
    }
    assert!(!is_built_in("turns"));
}

/// The global declarations container name is part of the story format
#[test]
fn test_contract_global_declaration_name() {
    assert_eq!(GLOBAL_DECLARATION_NAME, "global decl");
}

/// Compiling an empty story succeeds and yields the fixed root shape
#[test]
fn test_contract_empty_story() {
    let document = Compiler::new(CompilerOptions::new()).compile(&Story::new()).unwrap();
    assert_eq!(document.tree.content(document.root).len(), 2);
    assert!(document.flow_names().is_empty());
}

/// Error diagnostics turn into a single fatal error carrying their count
#[test]
fn test_contract_errors_are_counted() {
    let story = Story::new().with_root(vec![
        Statement::output(Expression::variable("a")),
        Statement::output(Expression::variable("b")),
    ]);
    let mut compiler = Compiler::default();
    match compiler.compile(&story) {
        Err(CompileError::Diagnostics { errors }) => assert_eq!(errors, 2),
        other => panic!("expected diagnostics error, got {:?}", other.map(|_| ())),
    }
}

/// Flow names must be unique among siblings
#[test]
fn test_contract_duplicate_flow_names() {
    let story = Story::new()
        .with_flow(Flow::knot("k", vec![]))
        .with_flow(Flow::knot("k", vec![]));
    let mut compiler = Compiler::default();
    assert!(compiler.compile(&story).is_err());
    assert_eq!(compiler.diagnostics()[0].message, "Duplicate flow name: 'k'");
}
