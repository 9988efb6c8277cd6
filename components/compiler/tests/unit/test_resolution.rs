//! Tests for the reference resolution pass

use bytecode_system::{
    ControlCommand, CountFlags, Divert, NodeId, Opcode, Path, StoryDocument, Value,
    VariableReference,
};
use compiler::{Compiler, CompilerOptions, Expression, Flow, FunctionCall, Statement, Story};
use core_types::DebugMetadata;

fn generate(story: &Story) -> (StoryDocument, Compiler) {
    let mut compiler = Compiler::default();
    let document = compiler.generate(story).expect("lowering");
    (document, compiler)
}

fn main_opcodes(document: &StoryDocument) -> Vec<Opcode> {
    let main = document.tree.content(document.root)[0];
    document
        .tree
        .content(main)
        .iter()
        .map(|id| document.tree.opcode(*id).clone())
        .collect()
}

fn flow(document: &StoryDocument, name: &str) -> NodeId {
    document
        .tree
        .container(document.root)
        .and_then(|c| c.named_child(name))
        .expect("flow")
}

fn turns_since(argument: Expression) -> Statement {
    Statement::output(FunctionCall::new("TURNS_SINCE", vec![argument]).into())
}

fn some_knot() -> Flow {
    Flow::knot("someKnot", vec![Statement::text("hello")])
}

#[test]
fn test_turns_since_divert_target_marks_turn_counting() {
    let story = Story::new()
        .with_root(vec![turns_since(Expression::divert_target("someKnot"))])
        .with_flow(some_knot());
    let (document, compiler) = generate(&story);
    assert!(!compiler.has_errors());

    let main = main_opcodes(&document);
    assert_eq!(
        &main[1..3],
        &[
            Value::divert_target(Path::parse("someKnot")).into(),
            Opcode::from(ControlCommand::TurnsSince),
        ]
    );
    let knot = document.tree.container(flow(&document, "someKnot")).unwrap();
    assert!(knot.turn_index_should_be_counted());
}

#[test]
fn test_read_count_marks_visits() {
    let story = Story::new()
        .with_root(vec![Statement::output(
            FunctionCall::new("READ_COUNT", vec![Expression::divert_target("someKnot")]).into(),
        )])
        .with_flow(some_knot());
    let (document, _) = generate(&story);
    let knot = document.tree.container(flow(&document, "someKnot")).unwrap();
    assert!(knot.count_flags().contains(CountFlags::VISITS));
    assert!(main_opcodes(&document).contains(&ControlCommand::ReadCount.into()));
}

#[test]
fn test_turns_since_of_variable_target_with_arrow_is_rejected() {
    let story = Story::new()
        .with_global("target", Expression::divert_target("someKnot"))
        .with_root(vec![turns_since(Expression::divert_target("target"))])
        .with_flow(some_knot());
    let (_, compiler) = generate(&story);
    assert_eq!(
        compiler.diagnostics()[0].message,
        "When getting the TURNS_SINCE() of a variable target, remove the '->' - i.e. it should just be TURNS_SINCE(target)"
    );
}

#[test]
fn test_turns_since_of_variable_target_without_arrow() {
    let story = Story::new()
        .with_global("target", Expression::divert_target("someKnot"))
        .with_root(vec![turns_since(Expression::variable("target"))])
        .with_flow(some_knot());
    let (document, compiler) = generate(&story);
    assert!(!compiler.has_errors());
    assert_eq!(main_opcodes(&document)[1], VariableReference::Named("target".to_string()).into());
}

#[test]
fn test_turns_since_of_knot_without_arrow_is_rejected() {
    let story = Story::new()
        .with_root(vec![turns_since(Expression::variable("someKnot"))])
        .with_flow(some_knot());
    let (_, compiler) = generate(&story);
    assert_eq!(
        compiler.diagnostics()[0].message,
        "Should be TURNS_SINCE(-> someKnot). Usage without the '->' only makes sense for variable targets."
    );
}

#[test]
fn test_turns_since_missing_target() {
    let story = Story::new().with_root(vec![turns_since(Expression::divert_target("nowhere"))]);
    let (_, compiler) = generate(&story);
    assert_eq!(
        compiler.diagnostics()[0].message,
        "Failed to find target for TURNS_SINCE: 'nowhere'"
    );
}

#[test]
fn test_flow_name_reads_its_visit_count() {
    let story = Story::new()
        .with_root(vec![Statement::output(Expression::variable("someKnot"))])
        .with_flow(some_knot());
    let (document, compiler) = generate(&story);
    assert!(!compiler.has_errors());

    assert_eq!(
        main_opcodes(&document)[1],
        VariableReference::ReadCount(Path::parse("someKnot")).into()
    );
    let knot = document.tree.container(flow(&document, "someKnot")).unwrap();
    assert!(knot.visits_should_be_counted());
}

#[test]
fn test_native_call_arguments_resolve_forward_references() {
    // The knot is declared after the call that reads it
    let min = FunctionCall::new(
        "MIN",
        vec![Expression::variable("later"), Expression::Int(3)],
    );
    let story = Story::new()
        .with_root(vec![Statement::output(min.into())])
        .with_flow(Flow::knot("later", vec![Statement::text("x")]));
    let (document, compiler) = generate(&story);
    assert!(!compiler.has_errors());
    assert_eq!(
        main_opcodes(&document)[1],
        VariableReference::ReadCount(Path::parse("later")).into()
    );
}

#[test]
fn test_unresolved_variable() {
    let story = Story::new().with_root(vec![Statement::output(Expression::variable("ghost"))]);
    let (_, compiler) = generate(&story);
    assert_eq!(compiler.diagnostics()[0].message, "Unresolved variable: ghost");
}

#[test]
fn test_divert_to_variable_target() {
    let story = Story::new()
        .with_global("next", Expression::divert_target("someKnot"))
        .with_root(vec![Statement::divert("next")])
        .with_flow(some_knot());
    let (document, compiler) = generate(&story);
    assert!(!compiler.has_errors());
    assert_eq!(main_opcodes(&document)[0], Divert::to_variable("next").into());
}

#[test]
fn test_stitch_targets_resolve_within_knot() {
    let knot = Flow::knot("k", vec![])
        .with_stitch(Flow::stitch("one", vec![Statement::divert("two")]))
        .with_stitch(Flow::stitch("two", vec![Statement::divert("k.one")]));
    let story = Story::new().with_flow(knot);
    let (document, compiler) = generate(&story);
    assert!(!compiler.has_errors(), "{:?}", compiler.diagnostics());

    let k = flow(&document, "k");
    let container = document.tree.container(k).unwrap();
    let one = container.named_child("one").unwrap();
    let two = container.named_child("two").unwrap();

    // An empty knot runs its first stitch
    let entry = document.tree.content(k)[0];
    assert_eq!(document.tree.opcode(entry), &Opcode::from(Divert::to_path(Path::parse("k.one"))));

    let from_one = document.tree.content(one)[0];
    assert_eq!(document.tree.opcode(from_one), &Opcode::from(Divert::to_path(Path::parse("k.two"))));
    let from_two = document.tree.content(two)[0];
    assert_eq!(document.tree.opcode(from_two), &Opcode::from(Divert::to_path(Path::parse("k.one"))));
}

#[test]
fn test_divert_target_value_of_variable_is_rejected() {
    let story = Story::new()
        .with_global("x", Expression::Int(1))
        .with_root(vec![Statement::output(Expression::divert_target("x"))]);
    let (_, compiler) = generate(&story);
    assert_eq!(
        compiler.diagnostics()[0].message,
        "Since 'x' is a variable, it shouldn't be preceded by '->' here."
    );
}

#[test]
fn test_resolution_errors_carry_statement_location() {
    let statement = Statement::output(Expression::variable("ghost")).at(DebugMetadata::new(None, 12, 12));
    let story = Story::new().with_root(vec![statement]);
    let mut compiler = Compiler::new(CompilerOptions::new().with_source_filename("main.ink"));
    let _ = compiler.generate(&story).unwrap();

    let dm = compiler.diagnostics()[0].debug_metadata.as_ref().unwrap();
    assert_eq!(dm.start_line_number, 12);
    assert_eq!(dm.file_name.as_deref(), Some("main.ink"));
    assert_eq!(
        compiler.diagnostics()[0].to_string(),
        "ERROR: line 12 of main.ink: Unresolved variable: ghost"
    );
}

#[test]
fn test_call_metadata_spans_nested_calls() {
    let inner = FunctionCall::new("TURNS", vec![]).at(DebugMetadata::new(None, 4, 5));
    let outer = FunctionCall::new("FLOAT", vec![inner.into()]).at(DebugMetadata::new(None, 3, 3));
    let story = Story::new().with_root(vec![Statement::output(outer.into())]);
    let (document, _) = generate(&story);

    let main = document.tree.content(document.root)[0];
    let float_node = document.tree.content(main)[2];
    let dm = document.tree.node(float_node).own_debug_metadata().unwrap();
    assert_eq!((dm.start_line_number, dm.end_line_number), (3, 5));
}
