//! Expression lowering

use crate::ast::{BinaryOperator, Expression, UnaryOperator};
use crate::codegen::Generator;
use crate::error::Result;
use crate::resolve::{CountQuery, Reference};
use bytecode_system::{
    ControlCommand, NativeFunctionCall, NodeId, Path, Value, VariableReference,
};

impl BinaryOperator {
    /// Name of the native operator implementing this operator
    pub fn native_name(self) -> &'static str {
        match self {
            BinaryOperator::Add => NativeFunctionCall::ADD,
            BinaryOperator::Subtract => NativeFunctionCall::SUBTRACT,
            BinaryOperator::Multiply => NativeFunctionCall::MULTIPLY,
            BinaryOperator::Divide => NativeFunctionCall::DIVIDE,
            BinaryOperator::Modulo => NativeFunctionCall::MOD,
            BinaryOperator::Equal => NativeFunctionCall::EQUAL,
            BinaryOperator::NotEqual => NativeFunctionCall::NOT_EQUALS,
            BinaryOperator::Less => NativeFunctionCall::LESS,
            BinaryOperator::Greater => NativeFunctionCall::GREATER,
            BinaryOperator::LessOrEqual => NativeFunctionCall::LESS_THAN_OR_EQUALS,
            BinaryOperator::GreaterOrEqual => NativeFunctionCall::GREATER_THAN_OR_EQUALS,
            BinaryOperator::And => NativeFunctionCall::AND,
            BinaryOperator::Or => NativeFunctionCall::OR,
            BinaryOperator::Has => NativeFunctionCall::HAS,
            BinaryOperator::Hasnt => NativeFunctionCall::HASNT,
            BinaryOperator::Intersect => NativeFunctionCall::INTERSECT,
        }
    }
}

impl UnaryOperator {
    /// Name of the native operator implementing this operator
    pub fn native_name(self) -> &'static str {
        match self {
            UnaryOperator::Negate => NativeFunctionCall::NEGATE,
            UnaryOperator::Not => NativeFunctionCall::NOT,
        }
    }
}

impl Generator<'_> {
    /// Lower an expression; its value ends up on the evaluation stack
    pub(crate) fn lower_expression(
        &mut self,
        container: NodeId,
        expression: &Expression,
    ) -> Result<()> {
        match expression {
            Expression::Int(value) => {
                self.emit(container, Value::Int(*value))?;
            }
            Expression::Float(value) => {
                self.emit(container, Value::Float(*value))?;
            }
            Expression::Bool(value) => {
                self.emit(container, Value::Bool(*value))?;
            }
            Expression::String(text) => {
                self.emit(container, ControlCommand::BeginString)?;
                self.emit(container, Value::string(text.as_str()))?;
                self.emit(container, ControlCommand::EndString)?;
            }
            Expression::Variable(name) => self.lower_variable(container, name, None)?,
            Expression::DivertTarget(target) => {
                self.lower_divert_target(container, target, None)?
            }
            Expression::Binary {
                operator,
                left,
                right,
            } => {
                self.lower_expression(container, left)?;
                self.lower_expression(container, right)?;
                self.emit_operator(container, operator.native_name())?;
            }
            Expression::Unary {
                operator: UnaryOperator::Negate,
                operand,
            } if operand.is_number_literal() => {
                // Fold to a negative literal
                let negated = match **operand {
                    Expression::Int(value) => Value::Int(value.wrapping_neg()),
                    Expression::Float(value) => Value::Float(-value),
                    _ => return Ok(()),
                };
                self.emit(container, negated)?;
            }
            Expression::Unary { operator, operand } => {
                self.lower_expression(container, operand)?;
                self.emit_operator(container, operator.native_name())?;
            }
            Expression::Call(call) => self.lower_function_call(container, call, false)?,
        }
        Ok(())
    }

    fn emit_operator(&mut self, container: NodeId, name: &'static str) -> Result<()> {
        match NativeFunctionCall::with_name(name) {
            Some(native) => {
                self.emit(container, native)?;
            }
            None => self.report_error(format!("Unknown operator '{}'", name), None),
        }
        Ok(())
    }

    /// Push a variable's value; resolution may turn it into a read count
    pub(crate) fn lower_variable(
        &mut self,
        container: NodeId,
        name: &str,
        counted_by: Option<CountQuery>,
    ) -> Result<()> {
        let node = self.emit(container, VariableReference::Named(name.to_string()))?;
        self.record(Reference::Variable {
            node,
            name: name.to_string(),
            scope: self.scope,
            counted_by,
        });
        Ok(())
    }

    /// Push a divert target; its path is made absolute during resolution
    pub(crate) fn lower_divert_target(
        &mut self,
        container: NodeId,
        target: &str,
        counted_by: Option<CountQuery>,
    ) -> Result<()> {
        let node = self.emit(container, Value::divert_target(Path::parse(target)))?;
        self.record(Reference::DivertTarget {
            node,
            target: target.to_string(),
            scope: self.scope,
            counted_by,
        });
        Ok(())
    }
}
