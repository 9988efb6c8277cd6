//! Parsed story hierarchy
//!
//! These are the types a source parser hands to the compiler. Paths and
//! names are still plain strings here; the compiler resolves them against
//! the finished content tree.

use core_types::DebugMetadata;

/// A whole parsed story
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Story {
    /// Top-level content, run when the story starts
    pub root: Vec<Statement>,
    /// Knots and functions, in source order
    pub flows: Vec<Flow>,
    /// `VAR` declarations
    pub globals: Vec<GlobalDeclaration>,
    /// `EXTERNAL` function declarations
    pub externals: Vec<ExternalDeclaration>,
}

impl Story {
    /// Create an empty story
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add top-level content
    pub fn with_root(mut self, statements: Vec<Statement>) -> Self {
        self.root.extend(statements);
        self
    }

    /// Builder: add a flow
    pub fn with_flow(mut self, flow: Flow) -> Self {
        self.flows.push(flow);
        self
    }

    /// Builder: declare a global variable
    pub fn with_global(mut self, name: impl Into<String>, initial_value: Expression) -> Self {
        self.globals.push(GlobalDeclaration {
            name: name.into(),
            initial_value,
            debug_metadata: None,
        });
        self
    }

    /// Builder: declare a host function
    pub fn with_external(mut self, name: impl Into<String>, parameters: &[&str]) -> Self {
        self.externals.push(ExternalDeclaration {
            name: name.into(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
        });
        self
    }
}

/// `VAR name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalDeclaration {
    /// Variable name
    pub name: String,
    /// Initial value
    pub initial_value: Expression,
    /// Source location
    pub debug_metadata: Option<DebugMetadata>,
}

/// `EXTERNAL name(params)`
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalDeclaration {
    /// Host function name
    pub name: String,
    /// Parameter names
    pub parameters: Vec<String>,
}

/// Whether a flow is entered by diverting or by calling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// `=== knot ===`, entered with `->` or as a tunnel
    Knot,
    /// `=== function f ===`, entered with a call
    Function,
    /// `= stitch` inside a knot
    Stitch,
}

/// A knot, function or stitch
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    /// Flow name
    pub name: String,
    /// Knot, function or stitch
    pub kind: FlowKind,
    /// Parameter names, in call order
    pub parameters: Vec<String>,
    /// Content
    pub body: Vec<Statement>,
    /// Stitches nested in a knot
    pub stitches: Vec<Flow>,
    /// Source location
    pub debug_metadata: Option<DebugMetadata>,
}

impl Flow {
    /// A knot with no parameters
    pub fn knot(name: impl Into<String>, body: Vec<Statement>) -> Self {
        Self::with_kind(name, FlowKind::Knot, body)
    }

    /// A function with no parameters
    pub fn function(name: impl Into<String>, body: Vec<Statement>) -> Self {
        Self::with_kind(name, FlowKind::Function, body)
    }

    /// A stitch with no parameters
    pub fn stitch(name: impl Into<String>, body: Vec<Statement>) -> Self {
        Self::with_kind(name, FlowKind::Stitch, body)
    }

    fn with_kind(name: impl Into<String>, kind: FlowKind, body: Vec<Statement>) -> Self {
        Self {
            name: name.into(),
            kind,
            parameters: Vec::new(),
            body,
            stitches: Vec::new(),
            debug_metadata: None,
        }
    }

    /// Builder: set parameters
    pub fn with_parameters(mut self, parameters: &[&str]) -> Self {
        self.parameters = parameters.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Builder: add a stitch
    pub fn with_stitch(mut self, stitch: Flow) -> Self {
        self.stitches.push(stitch);
        self
    }

    /// Builder: set source location
    pub fn at(mut self, debug_metadata: DebugMetadata) -> Self {
        self.debug_metadata = Some(debug_metadata);
        self
    }
}

/// One line of story content
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// What the line does
    pub kind: StatementKind,
    /// Source location
    pub debug_metadata: Option<DebugMetadata>,
}

impl Statement {
    /// Statement without a source location
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            debug_metadata: None,
        }
    }

    /// Builder: set source location
    pub fn at(mut self, debug_metadata: DebugMetadata) -> Self {
        self.debug_metadata = Some(debug_metadata);
        self
    }

    /// Literal text output
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(StatementKind::Text(text.into()))
    }

    /// End of a line of output
    pub fn newline() -> Self {
        Self::new(StatementKind::Newline)
    }

    /// `{expr}` output
    pub fn output(expression: Expression) -> Self {
        Self::new(StatementKind::Output(expression))
    }

    /// `~ f()` with the result discarded
    pub fn call(call: FunctionCall) -> Self {
        Self::new(StatementKind::Call(call))
    }

    /// `-> target`
    pub fn divert(target: impl Into<String>) -> Self {
        Self::new(StatementKind::Divert(target.into()))
    }

    /// `~ temp name = value`
    pub fn temp(name: impl Into<String>, value: Expression) -> Self {
        Self::new(StatementKind::Assignment {
            name: name.into(),
            value,
            is_new_declaration: true,
        })
    }

    /// `~ name = value`
    pub fn assign(name: impl Into<String>, value: Expression) -> Self {
        Self::new(StatementKind::Assignment {
            name: name.into(),
            value,
            is_new_declaration: false,
        })
    }

    /// `~ return value`
    pub fn return_value(value: Option<Expression>) -> Self {
        Self::new(StatementKind::Return(value))
    }
}

/// Kinds of story content
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// Literal text
    Text(String),
    /// Line break in output
    Newline,
    /// `<>`
    Glue,
    /// `# tag`
    Tag(String),
    /// `{expr}`
    Output(Expression),
    /// `~ f(args)`; the returned value is popped
    Call(FunctionCall),
    /// `-> target`, to a flow path or a variable holding a divert target
    Divert(String),
    /// `-> target(args) ->`
    TunnelCall {
        /// Flow path
        target: String,
        /// Arguments
        arguments: Vec<Expression>,
    },
    /// `->->`
    TunnelReturn,
    /// `~ return` inside a function
    Return(Option<Expression>),
    /// `~ temp x = ...` or `~ x = ...`
    Assignment {
        /// Variable written
        name: String,
        /// Value
        value: Expression,
        /// `temp` declaration rather than reassignment
        is_new_declaration: bool,
    },
    /// `TODO:` line left by the author
    AuthorNote(String),
    /// `-> DONE`
    Done,
    /// `-> END`
    End,
}

/// Binary operators, each backed by a native operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessOrEqual,
    /// `>=`
    GreaterOrEqual,
    /// `&&` / `and`
    And,
    /// `||` / `or`
    Or,
    /// `?` / `has`
    Has,
    /// `!?` / `hasnt`
    Hasnt,
    /// `^`
    Intersect,
}

/// Unary operators, each backed by a native operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// `-x`
    Negate,
    /// `not x`
    Not,
}

/// Expression trees
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Integer literal
    Int(i32),
    /// Float literal
    Float(f32),
    /// `true` / `false`
    Bool(bool),
    /// String literal
    String(String),
    /// Variable, parameter, or flow name (read count)
    Variable(String),
    /// `-> target` used as a value
    DivertTarget(String),
    /// Binary operation
    Binary {
        /// Operator
        operator: BinaryOperator,
        /// Left operand
        left: Box<Expression>,
        /// Right operand
        right: Box<Expression>,
    },
    /// Unary operation
    Unary {
        /// Operator
        operator: UnaryOperator,
        /// Operand
        operand: Box<Expression>,
    },
    /// Call of a built-in, native operator, function or external
    Call(FunctionCall),
}

impl Expression {
    /// `left op right`
    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `op operand`
    pub fn unary(operator: UnaryOperator, operand: Expression) -> Self {
        Expression::Unary {
            operator,
            operand: Box::new(operand),
        }
    }

    /// Variable reference
    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    /// Divert target literal
    pub fn divert_target(target: impl Into<String>) -> Self {
        Expression::DivertTarget(target.into())
    }

    /// Check if this is a number literal
    pub fn is_number_literal(&self) -> bool {
        matches!(self, Expression::Int(_) | Expression::Float(_))
    }
}

/// `name(arguments)`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Called name: a built-in, native operator, function or external
    pub name: String,
    /// Arguments, in order
    pub arguments: Vec<Expression>,
    /// Source location of the call
    pub debug_metadata: Option<DebugMetadata>,
}

impl FunctionCall {
    /// Create a call
    pub fn new(name: impl Into<String>, arguments: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            arguments,
            debug_metadata: None,
        }
    }

    /// Builder: set source location
    pub fn at(mut self, debug_metadata: DebugMetadata) -> Self {
        self.debug_metadata = Some(debug_metadata);
        self
    }

    /// Source range covering the call and every call nested in its arguments
    pub fn source_range(&self) -> Option<DebugMetadata> {
        let mut range = self.debug_metadata.clone();
        for argument in &self.arguments {
            if let Expression::Call(inner) = argument {
                range = match (range, inner.source_range()) {
                    (Some(outer), Some(nested)) => Some(outer.merge(&nested)),
                    (outer, nested) => outer.or(nested),
                };
            }
        }
        range
    }
}

impl From<FunctionCall> for Expression {
    fn from(call: FunctionCall) -> Self {
        Expression::Call(call)
    }
}
