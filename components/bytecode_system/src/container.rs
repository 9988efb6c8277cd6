//! Containers: ordered content plus a name table
//!
//! Content is only mutated through [`Tree`](crate::Tree), which keeps the
//! positional list, the name table and the children's parent links in step.

use crate::object::NodeId;
use std::fmt;

/// Bitmask of per-container bookkeeping the VM performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CountFlags(u32);

impl CountFlags {
    /// Count visits
    pub const VISITS: CountFlags = CountFlags(1);
    /// Record the turn index of the latest visit
    pub const TURNS: CountFlags = CountFlags(2);
    /// Only count a visit when entering at the start
    pub const COUNT_START_ONLY: CountFlags = CountFlags(4);

    /// No bookkeeping
    pub const fn empty() -> Self {
        CountFlags(0)
    }

    /// Wrap raw bits, as read from the wire
    pub const fn from_bits(bits: u32) -> Self {
        CountFlags(bits)
    }

    /// Raw bits
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Check if no bit is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if every bit of `other` is set
    pub const fn contains(self, other: CountFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the bits of `other`
    pub fn insert(&mut self, other: CountFlags) {
        self.0 |= other.0;
    }

    /// Clear the bits of `other`
    pub fn remove(&mut self, other: CountFlags) {
        self.0 &= !other.0;
    }
}

impl std::ops::BitOr for CountFlags {
    type Output = CountFlags;

    fn bitor(self, rhs: CountFlags) -> CountFlags {
        CountFlags(self.0 | rhs.0)
    }
}

impl fmt::Display for CountFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entry of a container's name table
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NamedEntry {
    pub(crate) name: String,
    pub(crate) id: NodeId,
    /// Also present in the positional content
    pub(crate) positional: bool,
}

impl NamedEntry {
    pub(crate) fn new(name: String, id: NodeId, positional: bool) -> Self {
        Self { name, id, positional }
    }
}

/// Ordered child content with an optional name table and count flags
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Container {
    pub(crate) content: Vec<NodeId>,
    pub(crate) named_content: Vec<NamedEntry>,
    pub(crate) count_flags: CountFlags,
    pub(crate) name: Option<String>,
}

impl Container {
    /// Create an anonymous, empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty container with a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Builder: set initial count flags
    pub fn with_count_flags(mut self, flags: CountFlags) -> Self {
        self.count_flags = flags;
        self
    }

    /// Positional content in execution order
    pub fn content(&self) -> &[NodeId] {
        &self.content
    }

    /// Every named child, positional or not, in insertion order
    pub fn named_content(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.named_content.iter().map(|e| (e.name.as_str(), e.id))
    }

    /// Named children that are not also positional content
    pub fn named_only_content(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.named_content
            .iter()
            .filter(|e| !e.positional)
            .map(|e| (e.name.as_str(), e.id))
    }

    /// Check if any named child is not positional
    pub fn has_named_only_content(&self) -> bool {
        self.named_content.iter().any(|e| !e.positional)
    }

    /// Look up a named child
    pub fn named_child(&self, name: &str) -> Option<NodeId> {
        self.named_content
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.id)
    }

    /// Own name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Check if the name is present and non-empty
    pub fn has_valid_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }

    /// Bookkeeping flags
    pub fn count_flags(&self) -> CountFlags {
        self.count_flags
    }

    /// Check if visits are counted
    pub fn visits_should_be_counted(&self) -> bool {
        self.count_flags.contains(CountFlags::VISITS)
    }

    /// Check if the latest visit's turn index is recorded
    pub fn turn_index_should_be_counted(&self) -> bool {
        self.count_flags.contains(CountFlags::TURNS)
    }

    /// Check if only visits from the start count
    pub fn counting_at_start_only(&self) -> bool {
        self.count_flags.contains(CountFlags::COUNT_START_ONLY)
    }

    /// Set count flags
    pub fn set_count_flags(&mut self, flags: CountFlags) {
        self.count_flags = flags;
    }

    /// Add count flags
    pub fn insert_count_flags(&mut self, flags: CountFlags) {
        self.count_flags.insert(flags);
    }

    pub(crate) fn position_of(&self, child: NodeId) -> Option<usize> {
        self.content.iter().position(|id| *id == child)
    }

    pub(crate) fn remove_child(&mut self, child: NodeId) {
        self.content.retain(|id| *id != child);
        self.named_content.retain(|e| e.id != child);
    }
}
