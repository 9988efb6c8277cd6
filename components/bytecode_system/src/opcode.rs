//! The closed set of node kinds compiled stories are built from

use crate::container::Container;
use crate::control_command::ControlCommand;
use crate::divert::Divert;
use crate::native::NativeFunctionCall;
use crate::path::Path;
use crate::value::Value;

/// Payload of a tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Opcode {
    /// Ordered, optionally named, content
    Container(Container),
    /// Literal value
    Value(Value),
    /// Stack or flow command
    Command(ControlCommand),
    /// Jump
    Divert(Divert),
    /// Offer a choice
    ChoicePoint(ChoicePoint),
    /// Read a variable or a read count
    VariableReference(VariableReference),
    /// Write a variable
    VariableAssignment(VariableAssignment),
    /// Built-in operator
    NativeFunctionCall(NativeFunctionCall),
    /// Join adjacent output without whitespace
    Glue,
    /// Metadata tag attached to output
    Tag(Tag),
    /// Result of a function that returned nothing
    Void,
    /// A presented choice, only ever found in save state
    Choice(Choice),
}

impl Opcode {
    /// Check if this is a container
    pub fn is_container(&self) -> bool {
        matches!(self, Opcode::Container(_))
    }

    /// Try to get the container
    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Opcode::Container(c) => Some(c),
            _ => None,
        }
    }

    /// Name of the node kind, for logs and messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Opcode::Container(_) => "Container",
            Opcode::Value(_) => "Value",
            Opcode::Command(_) => "ControlCommand",
            Opcode::Divert(_) => "Divert",
            Opcode::ChoicePoint(_) => "ChoicePoint",
            Opcode::VariableReference(_) => "VariableReference",
            Opcode::VariableAssignment(_) => "VariableAssignment",
            Opcode::NativeFunctionCall(_) => "NativeFunctionCall",
            Opcode::Glue => "Glue",
            Opcode::Tag(_) => "Tag",
            Opcode::Void => "Void",
            Opcode::Choice(_) => "Choice",
        }
    }
}

impl From<Container> for Opcode {
    fn from(c: Container) -> Self {
        Opcode::Container(c)
    }
}

impl From<Value> for Opcode {
    fn from(v: Value) -> Self {
        Opcode::Value(v)
    }
}

impl From<ControlCommand> for Opcode {
    fn from(c: ControlCommand) -> Self {
        Opcode::Command(c)
    }
}

impl From<Divert> for Opcode {
    fn from(d: Divert) -> Self {
        Opcode::Divert(d)
    }
}

impl From<ChoicePoint> for Opcode {
    fn from(c: ChoicePoint) -> Self {
        Opcode::ChoicePoint(c)
    }
}

impl From<VariableReference> for Opcode {
    fn from(v: VariableReference) -> Self {
        Opcode::VariableReference(v)
    }
}

impl From<VariableAssignment> for Opcode {
    fn from(v: VariableAssignment) -> Self {
        Opcode::VariableAssignment(v)
    }
}

impl From<NativeFunctionCall> for Opcode {
    fn from(n: NativeFunctionCall) -> Self {
        Opcode::NativeFunctionCall(n)
    }
}

impl From<Tag> for Opcode {
    fn from(t: Tag) -> Self {
        Opcode::Tag(t)
    }
}

impl From<Choice> for Opcode {
    fn from(c: Choice) -> Self {
        Opcode::Choice(c)
    }
}

/// Generates a choice when reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoicePoint {
    /// Content shown when the choice is taken
    pub path_on_choice: Path,
    /// Bitmask of `ChoicePoint::*` flags
    pub flags: u32,
}

impl ChoicePoint {
    /// A condition is on the evaluation stack
    pub const HAS_CONDITION: u32 = 1;
    /// Start content is on the evaluation stack
    pub const HAS_START_CONTENT: u32 = 2;
    /// Choice-only content is on the evaluation stack
    pub const HAS_CHOICE_ONLY_CONTENT: u32 = 4;
    /// Taken automatically when nothing else is available
    pub const IS_INVISIBLE_DEFAULT: u32 = 8;
    /// Not offered again once chosen
    pub const ONCE_ONLY: u32 = 16;

    /// Create a choice point
    pub fn new(path_on_choice: Path, flags: u32) -> Self {
        Self {
            path_on_choice,
            flags,
        }
    }

    /// Check a flag bit
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

/// Pushes a variable's value, or a container's read count
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableReference {
    /// Look up a variable by name
    Named(String),
    /// Push the visit count of the container at this path
    ReadCount(Path),
}

impl VariableReference {
    /// Variable name, unless this is a read count query
    pub fn name(&self) -> Option<&str> {
        match self {
            VariableReference::Named(name) => Some(name),
            VariableReference::ReadCount(_) => None,
        }
    }

    /// Path whose read count is queried
    pub fn path_for_count(&self) -> Option<&Path> {
        match self {
            VariableReference::ReadCount(path) => Some(path),
            VariableReference::Named(_) => None,
        }
    }
}

/// Pops the evaluation stack into a variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableAssignment {
    /// Variable written
    pub variable_name: String,
    /// Global (`VAR`) rather than temporary (`temp`)
    pub is_global: bool,
    /// Declares the variable rather than reassigning it
    pub is_new_declaration: bool,
}

impl VariableAssignment {
    /// Declare or reassign a temporary
    pub fn temporary(name: impl Into<String>, is_new_declaration: bool) -> Self {
        Self {
            variable_name: name.into(),
            is_global: false,
            is_new_declaration,
        }
    }

    /// Declare or reassign a global
    pub fn global(name: impl Into<String>, is_new_declaration: bool) -> Self {
        Self {
            variable_name: name.into(),
            is_global: true,
            is_new_declaration,
        }
    }
}

/// Text attached to the current line of output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag text, without the leading `#`
    pub text: String,
}

impl Tag {
    /// Create a tag
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A choice presented to the player, recorded in save state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Text shown to the player
    pub text: String,
    /// Position in the list of current choices
    pub index: i32,
    /// Path of the choice point that generated it
    pub source_path: String,
    /// Thread that generated it
    pub original_thread_index: i32,
    /// Content to continue with when chosen
    pub target_path: Path,
}
