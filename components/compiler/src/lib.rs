//! Story compiler: parsed story hierarchy to content tree
//!
//! This crate lowers the parsed representation of a story (flows,
//! statements, expressions and calls) into the node tree defined by
//! `bytecode_system`, then resolves every name against the finished tree.
//!
//! # Features
//!
//! - Call lowering for built-ins, native operators, externals and story functions
//! - Expression and statement lowering in evaluation-mode blocks
//! - Second pass resolving variables, divert targets and read counts
//! - Non-fatal diagnostics with an optional caller-supplied handler
//!
//! # Example
//!
//! ```
//! use bytecode_system::Codec;
//! use compiler::{Compiler, Expression, FunctionCall};
//!
//! let mut compiler = Compiler::default();
//! let call = FunctionCall::new("RANDOM", vec![Expression::Int(1), Expression::Int(6)]);
//! let (tree, root) = compiler.lower_expression(&Expression::Call(call)).unwrap();
//!
//! let codec = Codec::new().unwrap();
//! assert_eq!(codec.write_runtime_object(&tree, root).to_string(), r#"[1,6,"rnd",null]"#);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
mod codegen;
pub mod compiler;
pub mod error;
mod expression;
pub mod function_call;
mod resolve;

// Re-export main types at crate root
pub use ast::{
    BinaryOperator, Expression, ExternalDeclaration, Flow, FlowKind, FunctionCall,
    GlobalDeclaration, Statement, StatementKind, Story, UnaryOperator,
};
pub use codegen::GLOBAL_DECLARATION_NAME;
pub use compiler::{Compiler, CompilerOptions};
pub use error::{CompileError, Diagnostic, Diagnostics, ErrorHandler, Result};
pub use function_call::is_built_in;
