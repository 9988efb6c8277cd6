//! Tests for statement, call and flow lowering

use bytecode_system::{
    ControlCommand, Divert, NativeFunctionCall, NodeId, Opcode, Path, StoryDocument, Value,
    VariableAssignment, VariableReference,
};
use compiler::{
    BinaryOperator, Compiler, CompilerOptions, Expression, Flow, FunctionCall, Statement,
    StatementKind, Story,
};
use core_types::ErrorType;

fn generate(story: &Story) -> (StoryDocument, Compiler) {
    let mut compiler = Compiler::default();
    let document = compiler.generate(story).expect("lowering");
    (document, compiler)
}

fn main_content(document: &StoryDocument) -> NodeId {
    document.tree.content(document.root)[0]
}

fn flow(document: &StoryDocument, name: &str) -> NodeId {
    document
        .tree
        .container(document.root)
        .and_then(|c| c.named_child(name))
        .expect("flow")
}

fn opcodes(document: &StoryDocument, container: NodeId) -> Vec<Opcode> {
    document
        .tree
        .content(container)
        .iter()
        .map(|id| document.tree.opcode(*id).clone())
        .collect()
}

fn command(command: ControlCommand) -> Opcode {
    command.into()
}

fn native(name: &str) -> Opcode {
    NativeFunctionCall::with_name(name).unwrap().into()
}

fn named(name: &str) -> Opcode {
    VariableReference::Named(name.to_string()).into()
}

fn add_function() -> Flow {
    Flow::function(
        "add",
        vec![Statement::return_value(Some(Expression::binary(
            BinaryOperator::Add,
            Expression::variable("a"),
            Expression::variable("b"),
        )))],
    )
    .with_parameters(&["a", "b"])
}

#[test]
fn test_function_parameters_are_assigned_in_reverse() {
    let story = Story::new().with_flow(add_function());
    let (document, compiler) = generate(&story);
    assert!(!compiler.has_errors());

    let add = flow(&document, "add");
    assert_eq!(
        opcodes(&document, add),
        vec![
            VariableAssignment::temporary("b", true).into(),
            VariableAssignment::temporary("a", true).into(),
            command(ControlCommand::EvalStart),
            named("a"),
            named("b"),
            native("+"),
            command(ControlCommand::EvalEnd),
            command(ControlCommand::PopFunction),
        ]
    );
}

#[test]
fn test_function_call_in_output() {
    let call = FunctionCall::new("add", vec![Expression::Int(1), Expression::Int(2)]);
    let story = Story::new()
        .with_root(vec![Statement::output(call.into())])
        .with_flow(add_function());
    let (document, compiler) = generate(&story);
    assert!(!compiler.has_errors());

    assert_eq!(
        opcodes(&document, main_content(&document)),
        vec![
            command(ControlCommand::EvalStart),
            Value::Int(1).into(),
            Value::Int(2).into(),
            Divert::function_call(Path::parse("add")).into(),
            command(ControlCommand::EvalOutput),
            command(ControlCommand::EvalEnd),
        ]
    );
}

#[test]
fn test_standalone_call_pops_result() {
    let call = FunctionCall::new("add", vec![Expression::Int(1), Expression::Int(2)]);
    let story = Story::new()
        .with_root(vec![Statement::call(call)])
        .with_flow(add_function());
    let (document, _) = generate(&story);

    let main = opcodes(&document, main_content(&document));
    assert_eq!(main[3], Divert::function_call(Path::parse("add")).into());
    assert_eq!(main[4], command(ControlCommand::PopEvaluatedValue));
    assert_eq!(main[5], command(ControlCommand::EvalEnd));
}

#[test]
fn test_wrong_argument_count_to_story_function() {
    let call = FunctionCall::new("add", vec![Expression::Int(1)]);
    let story = Story::new()
        .with_root(vec![Statement::call(call)])
        .with_flow(add_function());
    let (_, compiler) = generate(&story);
    assert_eq!(
        compiler.diagnostics()[0].message,
        "Wrong number of arguments were passed to 'add', which expects 2 parameters"
    );
}

#[test]
fn test_external_call_carries_argument_count() {
    let call = FunctionCall::new("play_sound", vec![Expression::String("bell".to_string())]);
    let story = Story::new()
        .with_external("play_sound", &["name"])
        .with_root(vec![Statement::call(call)]);
    let (document, compiler) = generate(&story);
    assert!(!compiler.has_errors());

    let main = opcodes(&document, main_content(&document));
    assert_eq!(
        &main[main.len() - 3..],
        &[
            Divert::external("play_sound", 1).into(),
            command(ControlCommand::PopEvaluatedValue),
            command(ControlCommand::EvalEnd),
        ]
    );
}

#[test]
fn test_external_arity_is_checked() {
    let call = FunctionCall::new("play_sound", vec![]);
    let story = Story::new()
        .with_external("play_sound", &["name"])
        .with_root(vec![Statement::call(call)]);
    let (document, compiler) = generate(&story);
    assert!(compiler.has_errors());
    assert!(opcodes(&document, main_content(&document)).contains(&Divert::external("play_sound", 0).into()));
}

#[test]
fn test_function_without_return_gets_implicit_void_return() {
    let story = Story::new().with_flow(Flow::function("noop", vec![Statement::text("x")]));
    let (document, _) = generate(&story);
    let content = opcodes(&document, flow(&document, "noop"));
    assert_eq!(
        &content[1..],
        &[
            command(ControlCommand::EvalStart),
            Opcode::Void,
            command(ControlCommand::EvalEnd),
            command(ControlCommand::PopFunction),
        ]
    );
}

#[test]
fn test_return_outside_function_is_an_error() {
    let story = Story::new().with_flow(Flow::knot("k", vec![Statement::return_value(None)]));
    let (document, compiler) = generate(&story);
    assert_eq!(
        compiler.diagnostics()[0].message,
        "Return statements can only be used in knots that are declared as functions"
    );
    assert!(opcodes(&document, flow(&document, "k")).is_empty());
}

#[test]
fn test_tunnel_call_and_return() {
    let tunnel = Flow::knot("tunnel", vec![Statement::new(StatementKind::TunnelReturn)])
        .with_parameters(&["n"]);
    let story = Story::new()
        .with_root(vec![Statement::new(StatementKind::TunnelCall {
            target: "tunnel".to_string(),
            arguments: vec![Expression::Int(3)],
        })])
        .with_flow(tunnel);
    let (document, compiler) = generate(&story);
    assert!(!compiler.has_errors());

    assert_eq!(
        opcodes(&document, main_content(&document)),
        vec![
            command(ControlCommand::EvalStart),
            Value::Int(3).into(),
            command(ControlCommand::EvalEnd),
            Divert::tunnel(Path::parse("tunnel")).into(),
        ]
    );
    assert_eq!(
        opcodes(&document, flow(&document, "tunnel")),
        vec![
            VariableAssignment::temporary("n", true).into(),
            command(ControlCommand::EvalStart),
            Opcode::Void,
            command(ControlCommand::EvalEnd),
            command(ControlCommand::PopTunnel),
        ]
    );
}

#[test]
fn test_assignments() {
    let story = Story::new()
        .with_global("score", Expression::Int(0))
        .with_root(vec![
            Statement::temp("bonus", Expression::Int(2)),
            Statement::assign("bonus", Expression::Int(3)),
            Statement::assign("score", Expression::variable("bonus")),
        ]);
    let (document, compiler) = generate(&story);
    assert!(!compiler.has_errors());

    let assignments: Vec<Opcode> = opcodes(&document, main_content(&document))
        .into_iter()
        .filter(|op| matches!(op, Opcode::VariableAssignment(_)))
        .collect();
    assert_eq!(
        assignments,
        vec![
            VariableAssignment::temporary("bonus", true).into(),
            VariableAssignment::temporary("bonus", false).into(),
            VariableAssignment::global("score", false).into(),
        ]
    );
}

#[test]
fn test_text_glue_tags_and_ends() {
    let story = Story::new().with_root(vec![
        Statement::text("Hello"),
        Statement::new(StatementKind::Glue),
        Statement::new(StatementKind::Tag("mood".to_string())),
        Statement::newline(),
        Statement::divert("DONE"),
        Statement::new(StatementKind::End),
    ]);
    let (document, _) = generate(&story);
    let content = opcodes(&document, main_content(&document));
    assert_eq!(content[0], Value::string("Hello").into());
    assert_eq!(content[1], Opcode::Glue);
    assert!(matches!(&content[2], Opcode::Tag(tag) if tag.text == "mood"));
    assert_eq!(content[3], Value::string("\n").into());
    assert_eq!(content[4], command(ControlCommand::Done));
    assert_eq!(content[5], command(ControlCommand::End));
}

#[test]
fn test_author_note_is_not_an_error() {
    let story = Story::new().with_root(vec![Statement::new(StatementKind::AuthorNote(
        "rewrite this scene".to_string(),
    ))]);
    let mut compiler = Compiler::default();
    assert!(compiler.compile(&story).is_ok());
    assert_eq!(compiler.diagnostics()[0].error_type, ErrorType::Author);
}

#[test]
fn test_count_all_visits_marks_every_flow() {
    let story = Story::new().with_flow(
        Flow::knot("k", vec![Statement::text("a")])
            .with_stitch(Flow::stitch("s", vec![Statement::text("b")])),
    );
    let mut compiler = Compiler::new(CompilerOptions::new().with_count_all_visits(true));
    let document = compiler.compile(&story).unwrap();

    let knot = flow(&document, "k");
    let stitch = document.tree.container(knot).and_then(|c| c.named_child("s")).unwrap();
    for id in [knot, stitch] {
        assert!(document.tree.container(id).unwrap().visits_should_be_counted());
    }
}

#[test]
fn test_random_three_arguments_in_story() {
    let call = FunctionCall::new(
        "RANDOM",
        vec![Expression::Int(1), Expression::Int(2), Expression::Int(3)],
    );
    let story = Story::new().with_root(vec![Statement::output(call.into())]);
    let (document, compiler) = generate(&story);
    assert_eq!(compiler.diagnostics().iter().filter(|d| d.error_type.is_error()).count(), 1);
    assert!(!opcodes(&document, main_content(&document)).contains(&command(ControlCommand::Random)));
}

#[test]
fn test_standalone_turns_since_pops_result() {
    let call = FunctionCall::new("TURNS_SINCE", vec![Expression::divert_target("k")]);
    let story = Story::new()
        .with_root(vec![Statement::call(call)])
        .with_flow(Flow::knot("k", vec![Statement::text("a")]));
    let (document, compiler) = generate(&story);
    assert!(!compiler.has_errors());

    let main = opcodes(&document, main_content(&document));
    assert_eq!(main[0], command(ControlCommand::EvalStart));
    assert_eq!(main[1], Value::divert_target(Path::parse("k")).into());
    assert_eq!(main[2], command(ControlCommand::TurnsSince));
    assert_eq!(main[3], command(ControlCommand::PopEvaluatedValue));
    assert_eq!(main[4], command(ControlCommand::EvalEnd));
}
