//! Addresses of nodes within a content tree
//!
//! A path is a sequence of components, each either a child name, a
//! positional index, or a step up to the parent. The dotted string form
//! (`"knot.0.stitch"`, `".^.c"`) is what appears on the wire.

use std::fmt;

/// Token for the parent component in the string form
const PARENT_ID: &str = "^";

/// One step of a [`Path`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Component {
    /// Positional index into a container's content
    Index(usize),
    /// Lookup in a container's named content
    Name(String),
    /// Step up to the enclosing container
    Parent,
}

impl Component {
    /// Create a name component
    pub fn name(name: impl Into<String>) -> Self {
        Component::Name(name.into())
    }

    /// Parse one dotted segment.
    ///
    /// Digits only become an index when they print back identically, so
    /// `"01"` stays a name and round-trips unchanged.
    pub fn parse(segment: &str) -> Self {
        if segment == PARENT_ID {
            return Component::Parent;
        }
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = segment.parse::<usize>() {
                if index.to_string() == segment {
                    return Component::Index(index);
                }
            }
        }
        Component::Name(segment.to_string())
    }

    /// Check if this is a positional index
    pub fn is_index(&self) -> bool {
        matches!(self, Component::Index(_))
    }

    /// Check if this is a parent step
    pub fn is_parent(&self) -> bool {
        matches!(self, Component::Parent)
    }

    /// Try to get the name
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Component::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Try to get the index
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Component::Index(index) => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Index(index) => write!(f, "{}", index),
            Component::Name(name) => f.write_str(name),
            Component::Parent => f.write_str(PARENT_ID),
        }
    }
}

/// Address of a node, absolute from the root or relative to a container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    components: Vec<Component>,
    is_relative: bool,
}

impl Path {
    /// The empty absolute path, which addresses the root
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute path from components in root-to-leaf order
    pub fn from_components(components: Vec<Component>) -> Self {
        Self {
            components,
            is_relative: false,
        }
    }

    /// Relative path from components
    pub fn relative(components: Vec<Component>) -> Self {
        Self {
            components,
            is_relative: true,
        }
    }

    /// Parse the dotted string form.
    ///
    /// A leading `.` marks a relative path; the empty string is the root.
    ///
    /// ```
    /// use bytecode_system::{Component, Path};
    ///
    /// let path = Path::parse(".^.c");
    /// assert!(path.is_relative());
    /// assert_eq!(path.components(), &[Component::Parent, Component::name("c")]);
    /// assert_eq!(path.to_string(), ".^.c");
    /// ```
    pub fn parse(text: &str) -> Self {
        let (body, is_relative) = match text.strip_prefix('.') {
            Some(rest) => (rest, true),
            None => (text, false),
        };

        let components = if body.is_empty() {
            Vec::new()
        } else {
            body.split('.').map(Component::parse).collect()
        };

        Self {
            components,
            is_relative,
        }
    }

    /// Components in root-to-leaf order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Check if the path is resolved from a container rather than the root
    pub fn is_relative(&self) -> bool {
        self.is_relative
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if the path has no components
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// First component, if any
    pub fn head(&self) -> Option<&Component> {
        self.components.first()
    }

    /// Last component, if any
    pub fn last_component(&self) -> Option<&Component> {
        self.components.last()
    }

    /// Everything after the first component, keeping relativity
    pub fn tail(&self) -> Path {
        Path {
            components: self.components.iter().skip(1).cloned().collect(),
            is_relative: self.is_relative,
        }
    }

    /// Append a component
    pub fn push(&mut self, component: Component) {
        self.components.push(component);
    }

    /// Copy of this path with `component` appended
    pub fn with_appended(&self, component: Component) -> Path {
        let mut path = self.clone();
        path.push(component);
        path
    }

    /// The dotted string form used on the wire
    pub fn components_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_relative {
            f.write_str(".")?;
        }
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

impl From<&str> for Path {
    fn from(text: &str) -> Self {
        Path::parse(text)
    }
}
