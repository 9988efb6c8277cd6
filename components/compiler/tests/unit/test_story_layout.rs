//! Tests for the shape of compiled stories on the wire

use bytecode_system::{Codec, StoryDocument};
use compiler::{
    Compiler, Expression, Flow, FunctionCall, Statement, Story, GLOBAL_DECLARATION_NAME,
};

fn codec() -> Codec {
    Codec::new().expect("token table")
}

fn compile(story: &Story) -> StoryDocument {
    Compiler::default().compile(story).expect("compile")
}

#[test]
fn test_root_layout() {
    let story = Story::new()
        .with_root(vec![
            Statement::text("Hello"),
            Statement::newline(),
            Statement::divert("knot"),
        ])
        .with_flow(Flow::knot("knot", vec![Statement::text("Hi"), Statement::divert("END")]));

    let text = compile(&story).to_json_string(&codec()).unwrap();
    assert_eq!(
        text,
        r#"{"inkVersion":12,"root":[["^Hello","\n",{"->":"knot"},null],"done",{"knot":["^Hi","end",null]}]}"#
    );
}

#[test]
fn test_global_declarations_container() {
    let story = Story::new()
        .with_global("score", Expression::Int(5))
        .with_root(vec![Statement::assign("score", Expression::Int(6))]);
    let document = compile(&story);
    let codec = codec();

    let declarations = document
        .tree
        .container(document.root)
        .and_then(|c| c.named_child(GLOBAL_DECLARATION_NAME))
        .unwrap();
    assert_eq!(
        codec
            .write_runtime_container(&document.tree, declarations, true)
            .to_string(),
        r#"["ev",5,{"VAR=":"score"},"/ev","end",null]"#
    );

    let main = document.tree.content(document.root)[0];
    assert_eq!(
        codec.write_runtime_object(&document.tree, main).to_string(),
        r#"["ev",6,"/ev",{"VAR=":"score","re":true},null]"#
    );
}

#[test]
fn test_random_scenario_encoding() {
    let mut compiler = Compiler::default();
    let call = FunctionCall::new("RANDOM", vec![Expression::Int(1), Expression::Int(6)]);
    let (tree, root) = compiler.lower_expression(&call.into()).unwrap();
    assert!(!compiler.has_errors());
    assert_eq!(
        codec().write_runtime_object(&tree, root).to_string(),
        r#"[1,6,"rnd",null]"#
    );
}

#[test]
fn test_compiled_story_survives_round_trip() {
    let story = Story::new()
        .with_global("seen", Expression::Bool(false))
        .with_root(vec![Statement::output(
            FunctionCall::new("TURNS_SINCE", vec![Expression::divert_target("knot")]).into(),
        )])
        .with_flow(
            Flow::knot("knot", vec![Statement::text("a")])
                .with_stitch(Flow::stitch("inner", vec![Statement::divert("DONE")])),
        );
    let document = compile(&story);
    let codec = codec();

    let text = document.to_json_string(&codec).unwrap();
    let restored = StoryDocument::from_str(&codec, &text).unwrap();
    assert!(document
        .tree
        .same_structure(document.root, &restored.tree, restored.root));
    assert_eq!(restored.to_json_string(&codec).unwrap(), text);
    assert_eq!(restored.flow_names(), vec!["knot", GLOBAL_DECLARATION_NAME]);
}

#[test]
fn test_string_expression_encoding() {
    let story = Story::new().with_root(vec![Statement::output(Expression::String(
        "^caret".to_string(),
    ))]);
    let document = compile(&story);
    let main = document.tree.content(document.root)[0];
    assert_eq!(
        codec().write_runtime_object(&document.tree, main).to_string(),
        r#"["ev","str","^^caret","/str","out","/ev",null]"#
    );
}
