//! Built-in sample story, assembled from parsed-story types

use compiler::{
    BinaryOperator, Expression, Flow, FunctionCall, Statement, StatementKind, Story,
};

/// A small story touching every kind of statement and call strategy
pub fn sample_story() -> Story {
    let roll = FunctionCall::new("RANDOM", vec![Expression::Int(1), Expression::Int(6)]);
    let visited = FunctionCall::new("TURNS_SINCE", vec![Expression::divert_target("cellar")]);
    let greet = FunctionCall::new("greet", vec![Expression::String("traveller".to_string())]);

    let greet_fn = Flow::function(
        "greet",
        vec![
            Statement::text("Welcome, "),
            Statement::output(Expression::variable("who")),
            Statement::newline(),
        ],
    )
    .with_parameters(&["who"]);

    let cellar = Flow::knot(
        "cellar",
        vec![
            Statement::text("It is dark."),
            Statement::newline(),
            Statement::assign(
                "gold",
                Expression::binary(
                    BinaryOperator::Add,
                    Expression::variable("gold"),
                    Expression::Call(roll),
                ),
            ),
            Statement::new(StatementKind::Tag("dark".to_string())),
            Statement::divert("END"),
        ],
    )
    .with_stitch(Flow::stitch(
        "stairs",
        vec![
            Statement::output(Expression::Call(visited)),
            Statement::call(FunctionCall::new("play_sound", vec![Expression::String("creak".to_string())])),
            Statement::divert("DONE"),
        ],
    ));

    Story::new()
        .with_global("gold", Expression::Int(0))
        .with_external("play_sound", &["name"])
        .with_root(vec![
            Statement::call(greet),
            Statement::text("You stand at the top of the stairs."),
            Statement::newline(),
            Statement::divert("cellar"),
        ])
        .with_flow(greet_fn)
        .with_flow(cellar)
}
