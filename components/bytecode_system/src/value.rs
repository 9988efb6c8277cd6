//! Runtime values that can live in content or on the evaluation stack

use crate::path::Path;
use std::fmt;

/// A literal value pushed by the VM when it reaches the node
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 32-bit float
    Float(f32),
    /// Text
    String(StringValue),
    /// A path that can be diverted to later
    DivertTarget(Path),
    /// Reference to a variable, for pass-by-reference parameters
    VariablePointer(VariablePointer),
}

impl Value {
    /// Create a string value
    pub fn string(text: impl Into<String>) -> Self {
        Value::String(StringValue::new(text))
    }

    /// Create a divert target value
    pub fn divert_target(path: Path) -> Self {
        Value::DivertTarget(path)
    }

    /// Check if value is an int or float
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Try to get the integer
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get the text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&s.value),
            _ => None,
        }
    }

    /// Name of the value's type, for messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DivertTarget(_) => "divert target",
            Value::VariablePointer(_) => "variable pointer",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(&s.value),
            Value::DivertTarget(path) => write!(f, "DivertTargetValue({})", path),
            Value::VariablePointer(ptr) => write!(f, "VariablePointerValue({})", ptr.variable_name),
        }
    }
}

/// Text value with cached classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringValue {
    /// The text
    pub value: String,
    /// True when the text is exactly one newline
    pub is_newline: bool,
    /// True when the text is non-empty and only spaces or tabs
    pub is_inline_whitespace: bool,
}

impl StringValue {
    /// Create a string value, classifying its content
    pub fn new(text: impl Into<String>) -> Self {
        let value = text.into();
        let is_newline = value == "\n";
        let is_inline_whitespace =
            !value.is_empty() && value.chars().all(|c| c == ' ' || c == '\t');
        Self {
            value,
            is_newline,
            is_inline_whitespace,
        }
    }

    /// True when non-empty and not only whitespace
    pub fn is_non_whitespace(&self) -> bool {
        !self.is_newline && !self.is_inline_whitespace && !self.value.is_empty()
    }
}

/// Variable name plus the call-stack context it lives in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariablePointer {
    /// Variable being pointed at
    pub variable_name: String,
    /// Call-stack depth of the variable; 0 is global, -1 is not yet known
    pub context_index: i32,
}

impl VariablePointer {
    /// Create a pointer whose context is not yet known
    pub fn new(variable_name: impl Into<String>) -> Self {
        Self {
            variable_name: variable_name.into(),
            context_index: -1,
        }
    }

    /// Create a pointer into a known context
    pub fn with_context(variable_name: impl Into<String>, context_index: i32) -> Self {
        Self {
            variable_name: variable_name.into(),
            context_index,
        }
    }
}
