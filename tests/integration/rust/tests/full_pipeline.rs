//! Full Pipeline Integration Tests
//!
//! Tests the complete flow: Story -> Compiler -> Tree -> Codec -> JSON -> Codec -> Tree

use bytecode_system::{
    Codec, ControlCommand, CountFlags, Divert, Opcode, Path, StoryDocument, CURRENT_VERSION,
};
use compiler::{BinaryOperator, Compiler, Expression, Flow, FunctionCall, Statement, Story};

fn codec() -> Codec {
    Codec::new().expect("token table")
}

fn adventure() -> Story {
    let double = Flow::function(
        "double",
        vec![Statement::return_value(Some(Expression::binary(
            BinaryOperator::Multiply,
            Expression::variable("x"),
            Expression::Int(2),
        )))],
    )
    .with_parameters(&["x"]);

    let hall = Flow::knot(
        "hall",
        vec![
            Statement::text("A long hall."),
            Statement::newline(),
            Statement::output(
                FunctionCall::new("TURNS_SINCE", vec![Expression::divert_target("hall.door")]).into(),
            ),
            Statement::divert("door"),
        ],
    )
    .with_stitch(Flow::stitch(
        "door",
        vec![
            Statement::assign(
                "coins",
                FunctionCall::new("double", vec![Expression::variable("coins")]).into(),
            ),
            Statement::divert("END"),
        ],
    ));

    Story::new()
        .with_global("coins", Expression::Int(3))
        .with_root(vec![Statement::divert("hall")])
        .with_flow(double)
        .with_flow(hall)
}

/// Helper function to compile and encode a story
fn compile_to_text(story: &Story) -> Result<String, String> {
    let document = Compiler::default()
        .compile(story)
        .map_err(|e| format!("Compile error: {:?}", e))?;
    document
        .to_json_string(&codec())
        .map_err(|e| format!("Encode error: {:?}", e))
}

/// Test: compiled story decodes to the same tree and re-encodes to the same text
#[test]
fn test_full_pipeline_round_trip() {
    let text = compile_to_text(&adventure()).expect("pipeline failed");
    let codec = codec();

    let restored = StoryDocument::from_str(&codec, &text).expect("decode failed");
    assert_eq!(restored.version, CURRENT_VERSION);
    assert_eq!(restored.to_json_string(&codec).unwrap(), text);
}

/// Test: the streaming writer and the value tree produce the same text
#[test]
fn test_full_pipeline_streaming_matches_tree() {
    let document = Compiler::default().compile(&adventure()).unwrap();
    let codec = codec();
    let streamed = document.to_json_string(&codec).unwrap();
    assert_eq!(document.to_json(&codec).to_json_string(), streamed);
}

/// Test: count flags set by resolution survive the round trip
#[test]
fn test_full_pipeline_count_flags() {
    let text = compile_to_text(&adventure()).unwrap();
    let restored = StoryDocument::from_str(&codec(), &text).unwrap();

    let door = restored
        .tree
        .content_at_path(restored.root, &Path::parse("hall.door"))
        .expect("stitch");
    let flags = restored.tree.container(door).unwrap().count_flags();
    assert!(flags.contains(CountFlags::TURNS));
}

/// Test: node paths computed on the decoded tree lead back to the node
#[test]
fn test_full_pipeline_paths() {
    let text = compile_to_text(&adventure()).unwrap();
    let restored = StoryDocument::from_str(&codec(), &text).unwrap();

    for id in restored.tree.descendants(restored.root) {
        let path = restored.tree.path(id);
        assert_eq!(
            restored.tree.content_at_path(restored.root, &path),
            Some(id),
            "path {} does not lead back",
            path
        );
    }
}

/// Test: flows are listed in declaration order, followed by global declarations
#[test]
fn test_full_pipeline_flow_order() {
    let document = Compiler::default().compile(&adventure()).unwrap();
    assert_eq!(document.flow_names(), vec!["double", "hall", "global decl"]);
}

/// Test: the function call inside the stitch is a function divert
#[test]
fn test_full_pipeline_function_divert() {
    let document = Compiler::default().compile(&adventure()).unwrap();
    let door = document
        .tree
        .content_at_path(document.root, &Path::parse("hall.door"))
        .unwrap();
    let call = Opcode::from(Divert::function_call(Path::parse("double")));
    assert!(document
        .tree
        .content(door)
        .iter()
        .any(|id| document.tree.opcode(*id) == &call));
    assert!(document
        .tree
        .content(door)
        .iter()
        .any(|id| document.tree.opcode(*id) == &Opcode::from(ControlCommand::End)));
}

/// Test: a story with errors yields no document
#[test]
fn test_full_pipeline_errors_discard_output() {
    let story = Story::new().with_root(vec![Statement::divert("missing")]);
    let mut compiler = Compiler::default();
    assert!(compiler.compile(&story).is_err());
    assert_eq!(compiler.diagnostics()[0].message, "Divert target not found: '-> missing'");
}
