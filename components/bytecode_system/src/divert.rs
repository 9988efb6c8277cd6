//! Jumps between containers

use crate::path::{Component, Path};

/// Kind of frame a divert pushes onto the call stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushPopType {
    /// Returns with `->->`
    Tunnel,
    /// Returns with `~ret`
    Function,
}

/// Where a divert goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DivertTarget {
    /// Fixed path, or for external calls the host function's name
    Path(Path),
    /// Variable holding a divert target value, resolved when executed
    Variable(String),
}

/// A jump descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divert {
    /// Destination
    pub target: DivertTarget,
    /// Frame pushed before jumping, if any
    pub stack_push: Option<PushPopType>,
    /// Call a host-provided function instead of story content
    pub is_external: bool,
    /// Arguments an external call pops from the evaluation stack
    pub external_args: u32,
    /// Only jump if the top of the evaluation stack is truthy
    pub is_conditional: bool,
}

impl Divert {
    /// Plain jump to a fixed path
    pub fn to_path(path: Path) -> Self {
        Self {
            target: DivertTarget::Path(path),
            stack_push: None,
            is_external: false,
            external_args: 0,
            is_conditional: false,
        }
    }

    /// Plain jump to the target held by a variable
    pub fn to_variable(name: impl Into<String>) -> Self {
        Self {
            target: DivertTarget::Variable(name.into()),
            ..Self::to_path(Path::new())
        }
    }

    /// Call into a function
    pub fn function_call(path: Path) -> Self {
        Self {
            stack_push: Some(PushPopType::Function),
            ..Self::to_path(path)
        }
    }

    /// Call into a tunnel
    pub fn tunnel(path: Path) -> Self {
        Self {
            stack_push: Some(PushPopType::Tunnel),
            ..Self::to_path(path)
        }
    }

    /// Call a host function by name
    pub fn external(name: &str, args: u32) -> Self {
        Self {
            is_external: true,
            external_args: args,
            ..Self::to_path(Path::from_components(vec![Component::name(name)]))
        }
    }

    /// Mark the divert as conditional
    pub fn conditional(mut self) -> Self {
        self.is_conditional = true;
        self
    }

    /// Check if a frame is pushed
    pub fn pushes_to_stack(&self) -> bool {
        self.stack_push.is_some()
    }

    /// Check if the target is looked up from a variable
    pub fn has_variable_target(&self) -> bool {
        matches!(self.target, DivertTarget::Variable(_))
    }

    /// Variable name of a variable target
    pub fn variable_divert_name(&self) -> Option<&str> {
        match &self.target {
            DivertTarget::Variable(name) => Some(name),
            DivertTarget::Path(_) => None,
        }
    }

    /// Fixed target path
    pub fn target_path(&self) -> Option<&Path> {
        match &self.target {
            DivertTarget::Path(path) => Some(path),
            DivertTarget::Variable(_) => None,
        }
    }

    /// Target as written on the wire: the path string or the variable name
    pub fn target_string(&self) -> String {
        match &self.target {
            DivertTarget::Path(path) => path.components_string(),
            DivertTarget::Variable(name) => name.clone(),
        }
    }
}
