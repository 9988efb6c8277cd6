//! Lowering of call-like constructs
//!
//! A call is lowered by exactly one strategy, chosen by name in this order:
//! zero-argument built-ins, visit-count queries, `RANDOM`, `SEED_RANDOM`,
//! native operators, declared externals, and finally a divert into a story
//! function. Validation failures are reported as diagnostics and lowering
//! carries on with the next construct.

use crate::ast::{Expression, FunctionCall, UnaryOperator};
use crate::codegen::Generator;
use crate::error::Result;
use crate::resolve::{CountQuery, DivertKind, Reference};
use bytecode_system::{ControlCommand, Divert, NativeFunctionCall, NodeId, Path};
use core_types::DebugMetadata;

/// Number of choices generated so far
pub const CHOICE_COUNT: &str = "CHOICE_COUNT";
/// Current turn index
pub const TURNS: &str = "TURNS";
/// Turns since a target was last visited
pub const TURNS_SINCE: &str = "TURNS_SINCE";
/// Visit count of a target
pub const READ_COUNT: &str = "READ_COUNT";
/// Random integer in an inclusive range
pub const RANDOM: &str = "RANDOM";
/// Seed the random generator
pub const SEED_RANDOM: &str = "SEED_RANDOM";

/// Check if `name` is handled without a story function
pub fn is_built_in(name: &str) -> bool {
    NativeFunctionCall::exists_with_name(name)
        || matches!(
            name,
            CHOICE_COUNT | TURNS | TURNS_SINCE | READ_COUNT | RANDOM | SEED_RANDOM
        )
}

/// "1 parameter", "2 parameters"
pub(crate) fn parameter_count(count: usize) -> String {
    if count > 1 {
        format!("{} parameters", count)
    } else {
        format!("{} parameter", count)
    }
}

// Only literals are type checked; computed arguments pass through.
fn is_non_integer_literal(expression: &Expression) -> bool {
    match expression {
        Expression::Float(_) => true,
        Expression::Unary {
            operator: UnaryOperator::Negate,
            operand,
        } => matches!(**operand, Expression::Float(_)),
        _ => false,
    }
}

impl Generator<'_> {
    /// Lower `call` into `container`.
    ///
    /// With `should_pop_returned_value`, the call's opcodes are followed by a
    /// pop of the unused result.
    pub(crate) fn lower_function_call(
        &mut self,
        container: NodeId,
        call: &FunctionCall,
        should_pop_returned_value: bool,
    ) -> Result<()> {
        let debug_metadata = self.metadata(call.source_range().as_ref());
        let name = call.name.as_str();
        let arguments = &call.arguments;

        let lowered = match name {
            CHOICE_COUNT | TURNS => {
                if !arguments.is_empty() {
                    self.report_error(
                        format!("The {}() function shouldn't take any arguments", name),
                        debug_metadata.clone(),
                    );
                }
                let command = if name == TURNS {
                    ControlCommand::Turns
                } else {
                    ControlCommand::ChoiceCount
                };
                Some(self.emit(container, command)?)
            }
            TURNS_SINCE | READ_COUNT => {
                let query = if name == TURNS_SINCE {
                    CountQuery::TurnsSince
                } else {
                    CountQuery::ReadCount
                };
                self.lower_count_query(container, call, query, debug_metadata.clone())?
            }
            RANDOM => {
                if arguments.len() != 2 {
                    self.report_error(
                        "RANDOM should take 2 parameters: a minimum and a maximum integer",
                        debug_metadata.clone(),
                    );
                    None
                } else {
                    for (index, argument) in arguments.iter().enumerate() {
                        if is_non_integer_literal(argument) {
                            let parameter = if index == 0 { "minimum" } else { "maximum" };
                            self.report_error(
                                format!("RANDOM's {} parameter should be an integer", parameter),
                                debug_metadata.clone(),
                            );
                        }
                        self.lower_expression(container, argument)?;
                    }
                    Some(self.emit(container, ControlCommand::Random)?)
                }
            }
            SEED_RANDOM => match arguments.as_slice() {
                [seed] => {
                    if is_non_integer_literal(seed) {
                        self.report_error(
                            "SEED_RANDOM's parameter should be an integer seed",
                            debug_metadata.clone(),
                        );
                    }
                    self.lower_expression(container, seed)?;
                    Some(self.emit(container, ControlCommand::SeedRandom)?)
                }
                _ => {
                    self.report_error(
                        "SEED_RANDOM should take 1 parameter - an integer seed",
                        debug_metadata.clone(),
                    );
                    None
                }
            },
            _ => Some(self.lower_call(container, call, debug_metadata.clone())?),
        };

        let Some(node) = lowered else {
            return Ok(());
        };
        if debug_metadata.is_some() {
            self.tree.set_debug_metadata(node, debug_metadata);
        }

        if should_pop_returned_value {
            self.emit(container, ControlCommand::PopEvaluatedValue)?;
        }
        Ok(())
    }

    fn lower_count_query(
        &mut self,
        container: NodeId,
        call: &FunctionCall,
        query: CountQuery,
        debug_metadata: Option<DebugMetadata>,
    ) -> Result<Option<NodeId>> {
        match call.arguments.as_slice() {
            [Expression::DivertTarget(target)] => {
                self.lower_divert_target(container, target, Some(query))?;
            }
            [Expression::Variable(variable)] => {
                self.lower_variable(container, variable, Some(query))?;
            }
            _ => {
                self.report_error(
                    format!(
                        "The {}() function should take one argument: a divert target to the target knot, stitch, gather or choice you want to check. e.g. TURNS_SINCE(-> myKnot)",
                        call.name
                    ),
                    debug_metadata,
                );
                return Ok(None);
            }
        }
        Ok(Some(self.emit(container, query.command())?))
    }

    /// Native operators, externals and story functions
    fn lower_call(
        &mut self,
        container: NodeId,
        call: &FunctionCall,
        debug_metadata: Option<DebugMetadata>,
    ) -> Result<NodeId> {
        let name = call.name.as_str();
        let arguments = &call.arguments;

        if let Some(native) = NativeFunctionCall::with_name(name) {
            if native.number_of_parameters() != arguments.len() {
                self.report_error(
                    format!(
                        "{} should take {}",
                        name,
                        parameter_count(native.number_of_parameters())
                    ),
                    debug_metadata,
                );
            }
            self.lower_arguments(container, arguments)?;
            return self.emit(container, native);
        }

        if let Some(&expected) = self.externals.get(name) {
            if expected != arguments.len() {
                self.report_error(
                    format!(
                        "Wrong number of arguments were passed to external function '{}', which expects {}",
                        name,
                        parameter_count(expected)
                    ),
                    debug_metadata,
                );
            }
            self.lower_arguments(container, arguments)?;
            return self.emit(container, Divert::external(name, arguments.len() as u32));
        }

        // Arguments are pushed flat before the jump; the callee pops them
        // into its parameters.
        self.lower_arguments(container, arguments)?;
        let node = self.emit(container, Divert::function_call(Path::parse(name)))?;
        self.record(Reference::Divert {
            node,
            target: name.to_string(),
            scope: self.scope,
            kind: DivertKind::Function,
            arguments: arguments.len(),
        });
        Ok(node)
    }

    pub(crate) fn lower_arguments(
        &mut self,
        container: NodeId,
        arguments: &[Expression],
    ) -> Result<()> {
        for argument in arguments {
            self.lower_expression(container, argument)?;
        }
        Ok(())
    }
}
