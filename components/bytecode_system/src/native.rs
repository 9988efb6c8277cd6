//! Built-in operators, identified by name and arity

use std::fmt;

/// A call to one of the fixed native operators.
///
/// Instances only come from the operator table, so every value names a
/// real operator with its real arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeFunctionCall {
    name: &'static str,
    number_of_parameters: usize,
}

impl NativeFunctionCall {
    /// Addition / concatenation
    pub const ADD: &'static str = "+";
    /// Subtraction
    pub const SUBTRACT: &'static str = "-";
    /// Division
    pub const DIVIDE: &'static str = "/";
    /// Multiplication
    pub const MULTIPLY: &'static str = "*";
    /// Remainder
    pub const MOD: &'static str = "%";
    /// Unary minus
    pub const NEGATE: &'static str = "~";
    /// Equality
    pub const EQUAL: &'static str = "==";
    /// Greater than
    pub const GREATER: &'static str = ">";
    /// Less than
    pub const LESS: &'static str = "<";
    /// Greater than or equal
    pub const GREATER_THAN_OR_EQUALS: &'static str = ">=";
    /// Less than or equal
    pub const LESS_THAN_OR_EQUALS: &'static str = "<=";
    /// Inequality
    pub const NOT_EQUALS: &'static str = "!=";
    /// Logical not
    pub const NOT: &'static str = "!";
    /// Logical and
    pub const AND: &'static str = "&&";
    /// Logical or
    pub const OR: &'static str = "||";
    /// Smaller of two numbers
    pub const MIN: &'static str = "MIN";
    /// Larger of two numbers
    pub const MAX: &'static str = "MAX";
    /// Exponentiation
    pub const POW: &'static str = "POW";
    /// Round down
    pub const FLOOR: &'static str = "FLOOR";
    /// Round up
    pub const CEILING: &'static str = "CEILING";
    /// Truncate to int
    pub const INT: &'static str = "INT";
    /// Convert to float
    pub const FLOAT: &'static str = "FLOAT";
    /// Containment
    pub const HAS: &'static str = "?";
    /// Non-containment
    pub const HASNT: &'static str = "!?";
    /// Intersection. Collides with the string marker on the wire.
    pub const INTERSECT: &'static str = "^";

    /// Look up an operator by name
    pub fn with_name(name: &str) -> Option<Self> {
        NATIVE_FUNCTIONS.iter().copied().find(|f| f.name == name)
    }

    /// Check if an operator with this name exists
    pub fn exists_with_name(name: &str) -> bool {
        Self::with_name(name).is_some()
    }

    /// Look up an operator by name, only if its arity matches
    pub fn with_name_and_arity(name: &str, number_of_parameters: usize) -> Option<Self> {
        Self::with_name(name).filter(|f| f.number_of_parameters == number_of_parameters)
    }

    /// Every operator in the table
    pub fn all() -> &'static [NativeFunctionCall] {
        NATIVE_FUNCTIONS
    }

    /// Operator name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of operands popped from the evaluation stack
    pub fn number_of_parameters(&self) -> usize {
        self.number_of_parameters
    }

    const fn new(name: &'static str, number_of_parameters: usize) -> Self {
        Self {
            name,
            number_of_parameters,
        }
    }
}

impl fmt::Display for NativeFunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Native '{}'", self.name)
    }
}

const NATIVE_FUNCTIONS: &[NativeFunctionCall] = &[
    NativeFunctionCall::new(NativeFunctionCall::ADD, 2),
    NativeFunctionCall::new(NativeFunctionCall::SUBTRACT, 2),
    NativeFunctionCall::new(NativeFunctionCall::DIVIDE, 2),
    NativeFunctionCall::new(NativeFunctionCall::MULTIPLY, 2),
    NativeFunctionCall::new(NativeFunctionCall::MOD, 2),
    NativeFunctionCall::new(NativeFunctionCall::NEGATE, 1),
    NativeFunctionCall::new(NativeFunctionCall::EQUAL, 2),
    NativeFunctionCall::new(NativeFunctionCall::GREATER, 2),
    NativeFunctionCall::new(NativeFunctionCall::LESS, 2),
    NativeFunctionCall::new(NativeFunctionCall::GREATER_THAN_OR_EQUALS, 2),
    NativeFunctionCall::new(NativeFunctionCall::LESS_THAN_OR_EQUALS, 2),
    NativeFunctionCall::new(NativeFunctionCall::NOT_EQUALS, 2),
    NativeFunctionCall::new(NativeFunctionCall::NOT, 1),
    NativeFunctionCall::new(NativeFunctionCall::AND, 2),
    NativeFunctionCall::new(NativeFunctionCall::OR, 2),
    NativeFunctionCall::new(NativeFunctionCall::MIN, 2),
    NativeFunctionCall::new(NativeFunctionCall::MAX, 2),
    NativeFunctionCall::new(NativeFunctionCall::POW, 2),
    NativeFunctionCall::new(NativeFunctionCall::FLOOR, 1),
    NativeFunctionCall::new(NativeFunctionCall::CEILING, 1),
    NativeFunctionCall::new(NativeFunctionCall::INT, 1),
    NativeFunctionCall::new(NativeFunctionCall::FLOAT, 1),
    NativeFunctionCall::new(NativeFunctionCall::HAS, 2),
    NativeFunctionCall::new(NativeFunctionCall::HASNT, 2),
    NativeFunctionCall::new(NativeFunctionCall::INTERSECT, 2),
];
