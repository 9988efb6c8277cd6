//! Arena of runtime objects with single-parent ownership
//!
//! Every node lives in a [`Tree`] and is addressed by a [`NodeId`]. A node
//! has at most one parent container; attaching it somewhere else detaches
//! it from the old parent in the same call, so there is never a moment
//! where two containers claim it.

use crate::container::{Container, CountFlags, NamedEntry};
use crate::error::TreeError;
use crate::opcode::Opcode;
use crate::path::{Component, Path};
use core_types::DebugMetadata;
use std::fmt;

/// Stable handle to a node in a [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position in the arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One runtime object and its links
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    parent: Option<NodeId>,
    debug_metadata: Option<DebugMetadata>,
    opcode: Opcode,
}

impl Node {
    /// The node's payload
    pub fn opcode(&self) -> &Opcode {
        &self.opcode
    }

    /// Owning container
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Metadata set on this node itself, ignoring ancestors
    pub fn own_debug_metadata(&self) -> Option<&DebugMetadata> {
        self.debug_metadata.as_ref()
    }
}

/// Arena owning every node of one compiled story or save state
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node id in allocation order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Allocate a detached node.
    ///
    /// A container payload starts out empty; children are attached with
    /// [`Tree::add_content`] so their parent links stay consistent.
    pub fn add(&mut self, opcode: impl Into<Opcode>) -> NodeId {
        let mut opcode = opcode.into();
        if let Opcode::Container(container) = &mut opcode {
            container.content.clear();
            container.named_content.clear();
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: None,
            debug_metadata: None,
            opcode,
        });
        id
    }

    /// Allocate a detached node carrying debug metadata
    pub fn add_with_debug_metadata(
        &mut self,
        opcode: impl Into<Opcode>,
        debug_metadata: DebugMetadata,
    ) -> NodeId {
        let id = self.add(opcode);
        self.nodes[id.index()].debug_metadata = Some(debug_metadata);
        id
    }

    /// Look up a node
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Look up a node; the id must come from this tree
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Payload of a node; the id must come from this tree
    pub fn opcode(&self, id: NodeId) -> &Opcode {
        &self.node(id).opcode
    }

    /// The node as a container, if it is one
    pub fn container(&self, id: NodeId) -> Option<&Container> {
        self.get(id).and_then(|n| n.opcode.as_container())
    }

    fn container_mut(&mut self, id: NodeId) -> Result<&mut Container, TreeError> {
        match self.nodes.get_mut(id.index()).map(|n| &mut n.opcode) {
            Some(Opcode::Container(c)) => Ok(c),
            _ => Err(TreeError::NotAContainer(id)),
        }
    }

    /// Owning container of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Positional content of a container; empty for anything else
    pub fn content(&self, id: NodeId) -> &[NodeId] {
        self.container(id).map(|c| c.content()).unwrap_or(&[])
    }

    fn attachable_name(&self, child: NodeId) -> Option<String> {
        self.container(child)
            .filter(|c| c.has_valid_name())
            .and_then(|c| c.name.clone())
    }

    fn check_attach(&self, container: NodeId, child: NodeId) -> Result<(), TreeError> {
        if self.container(container).is_none() {
            return Err(TreeError::NotAContainer(container));
        }
        let mut cursor = Some(container);
        while let Some(id) = cursor {
            if id == child {
                return Err(TreeError::Cycle(child));
            }
            cursor = self.parent(id);
        }
        Ok(())
    }

    fn check_unique_name(
        &self,
        container: NodeId,
        name: &str,
        allowed: &[NodeId],
    ) -> Result<(), TreeError> {
        match self.container(container).and_then(|c| c.named_child(name)) {
            Some(existing) if !allowed.contains(&existing) => {
                Err(TreeError::DuplicateName(name.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Append `child` to the positional content of `container`.
    ///
    /// A named container child is also entered in the name table. The child
    /// is detached from any previous parent first.
    pub fn add_content(&mut self, container: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_attach(container, child)?;
        let name = self.attachable_name(child);
        if let Some(name) = &name {
            self.check_unique_name(container, name, &[child])?;
        }

        self.detach(child);
        let target = self.container_mut(container)?;
        target.content.push(child);
        if let Some(name) = name {
            target.named_content.push(NamedEntry::new(name, child, true));
        }
        self.nodes[child.index()].parent = Some(container);
        Ok(())
    }

    /// Make a named container reachable by name only, not by position
    pub fn add_to_named_content_only(
        &mut self,
        container: NodeId,
        child: NodeId,
    ) -> Result<(), TreeError> {
        self.check_attach(container, child)?;
        let name = self
            .attachable_name(child)
            .ok_or(TreeError::UnnamedContent(child))?;
        self.check_unique_name(container, &name, &[child])?;

        self.detach(child);
        self.container_mut(container)?
            .named_content
            .push(NamedEntry::new(name, child, false));
        self.nodes[child.index()].parent = Some(container);
        Ok(())
    }

    /// Put `child` in positional slot `index`, detaching the previous
    /// occupant, which is returned.
    pub fn set_child(
        &mut self,
        container: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<NodeId, TreeError> {
        self.check_attach(container, child)?;
        let len = self.content(container).len();
        let previous = *self
            .content(container)
            .get(index)
            .ok_or(TreeError::IndexOutOfRange { index, len })?;
        if previous == child {
            return Ok(previous);
        }

        let name = self.attachable_name(child);
        if let Some(name) = &name {
            self.check_unique_name(container, name, &[child, previous])?;
        }

        // Detaching may shift positions if the child was a sibling
        self.detach(child);
        let target = self.container_mut(container)?;
        let slot = target
            .position_of(previous)
            .ok_or(TreeError::IndexOutOfRange { index, len })?;
        target.content[slot] = child;
        target.named_content.retain(|e| e.id != previous);
        if let Some(name) = name {
            target.named_content.push(NamedEntry::new(name, child, true));
        }

        self.nodes[previous.index()].parent = None;
        self.nodes[child.index()].parent = Some(container);
        Ok(previous)
    }

    /// Remove a node from its parent, if it has one
    pub fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.parent(child) {
            if let Ok(container) = self.container_mut(parent) {
                container.remove_child(child);
            }
            self.nodes[child.index()].parent = None;
        }
    }

    /// Rename a container, keeping its parent's name table in step.
    ///
    /// Removing the name of named-only content detaches it, since it
    /// would no longer be reachable.
    pub fn set_name(&mut self, id: NodeId, name: Option<String>) -> Result<(), TreeError> {
        self.container_mut(id)?;
        let valid = name.as_deref().filter(|n| !n.is_empty()).map(str::to_string);
        let parent = self.parent(id);

        if let (Some(parent), Some(new_name)) = (parent, &valid) {
            self.check_unique_name(parent, new_name, &[id])?;
        }

        let mut orphaned = false;
        if let Some(parent) = parent {
            let p = self.container_mut(parent)?;
            p.named_content.retain(|e| e.id != id);
            let positional = p.position_of(id).is_some();
            match &valid {
                Some(new_name) => p
                    .named_content
                    .push(NamedEntry::new(new_name.clone(), id, positional)),
                None => orphaned = !positional,
            }
        }

        self.container_mut(id)?.name = name;
        if orphaned {
            self.nodes[id.index()].parent = None;
        }
        Ok(())
    }

    /// Swap the payload of a leaf node, returning the old payload
    pub fn replace_opcode(
        &mut self,
        id: NodeId,
        opcode: impl Into<Opcode>,
    ) -> Result<Opcode, TreeError> {
        let opcode = opcode.into();
        let node = &mut self.nodes[id.index()];
        if node.opcode.is_container() || opcode.is_container() {
            return Err(TreeError::ContainerReplacement(id));
        }
        Ok(std::mem::replace(&mut node.opcode, opcode))
    }

    /// Overwrite a container's count flags
    pub fn set_count_flags(&mut self, id: NodeId, flags: CountFlags) -> Result<(), TreeError> {
        self.container_mut(id)?.set_count_flags(flags);
        Ok(())
    }

    /// Add to a container's count flags
    pub fn insert_count_flags(&mut self, id: NodeId, flags: CountFlags) -> Result<(), TreeError> {
        self.container_mut(id)?.insert_count_flags(flags);
        Ok(())
    }

    /// Set or clear a node's own debug metadata
    pub fn set_debug_metadata(&mut self, id: NodeId, debug_metadata: Option<DebugMetadata>) {
        self.nodes[id.index()].debug_metadata = debug_metadata;
    }

    /// Debug metadata of the node, or of its nearest ancestor that has some
    pub fn debug_metadata(&self, id: NodeId) -> Option<&DebugMetadata> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.get(current)?;
            if let Some(dm) = &node.debug_metadata {
                return Some(dm);
            }
            cursor = node.parent;
        }
        None
    }

    /// Absolute path from the root to `id`.
    ///
    /// Named containers contribute their name, everything else its index
    /// in the parent's content.
    pub fn path(&self, id: NodeId) -> Path {
        let mut components = Vec::new();
        let mut child = id;

        while let Some(parent) = self.parent(child) {
            let component = match self.container(child) {
                Some(c) if c.has_valid_name() => Component::name(c.name().unwrap_or_default()),
                _ => match self.container(parent).and_then(|p| p.position_of(child)) {
                    Some(index) => Component::Index(index),
                    None => break,
                },
            };
            components.push(component);
            child = parent;
        }

        components.reverse();
        Path::from_components(components)
    }

    /// Follow `path` from `start`.
    ///
    /// Returns `None` when any step is missing; that is an ordinary outcome,
    /// not a failure.
    pub fn content_at_path(&self, start: NodeId, path: &Path) -> Option<NodeId> {
        let mut current = start;
        for component in path.components() {
            current = match component {
                Component::Parent => self.parent(current)?,
                Component::Index(index) => *self.container(current)?.content().get(*index)?,
                Component::Name(name) => self.container(current)?.named_child(name)?,
            };
        }
        Some(current)
    }

    /// Resolve a path as seen from `from`: relative paths start at the
    /// nearest container, absolute ones at the root.
    ///
    /// From a leaf, a leading `^` is the step to the parent container and
    /// is consumed by starting there.
    pub fn resolve_path(&self, from: NodeId, path: &Path) -> Option<NodeId> {
        if !path.is_relative() {
            return self.content_at_path(self.root_content_container(from)?, path);
        }
        let start = self.nearest_container(from)?;
        match path.head() {
            Some(Component::Parent) if start != from => self.content_at_path(start, &path.tail()),
            _ => self.content_at_path(start, path),
        }
    }

    /// The node itself if it is a container, otherwise its parent
    pub fn nearest_container(&self, id: NodeId) -> Option<NodeId> {
        if self.container(id).is_some() {
            Some(id)
        } else {
            self.parent(id)
        }
    }

    /// Topmost ancestor, if it is a container
    pub fn root_content_container(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?;
        let mut ancestor = id;
        while let Some(parent) = self.parent(ancestor) {
            ancestor = parent;
        }
        self.container(ancestor).map(|_| ancestor)
    }

    /// Start line of the content `path` leads to, as seen from `from`
    pub fn debug_line_number_of_path(&self, from: NodeId, path: &Path) -> Option<u32> {
        let target = self.resolve_path(from, path)?;
        self.debug_metadata(target).map(|dm| dm.start_line_number)
    }

    /// `root` and everything it owns, depth first, positional content
    /// before named-only content
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(c) = self.container(id) {
                let named_only: Vec<NodeId> = c.named_only_content().map(|(_, n)| n).collect();
                stack.extend(named_only.into_iter().rev());
                stack.extend(c.content().iter().rev().copied());
            }
        }
        out
    }

    /// Compare the subtree at `a` with the subtree at `b` in `other`,
    /// ignoring node ids and debug metadata
    pub fn same_structure(&self, a: NodeId, other: &Tree, b: NodeId) -> bool {
        match (self.opcode(a), other.opcode(b)) {
            (Opcode::Container(ca), Opcode::Container(cb)) => {
                if ca.name() != cb.name()
                    || ca.count_flags() != cb.count_flags()
                    || ca.content().len() != cb.content().len()
                {
                    return false;
                }
                let positional = ca
                    .content()
                    .iter()
                    .zip(cb.content())
                    .all(|(x, y)| self.same_structure(*x, other, *y));
                if !positional {
                    return false;
                }
                let named_a: Vec<_> = ca.named_only_content().collect();
                let named_b: Vec<_> = cb.named_only_content().collect();
                named_a.len() == named_b.len()
                    && named_a.iter().all(|(name, x)| {
                        cb.named_child(name)
                            .is_some_and(|y| self.same_structure(*x, other, y))
                    })
            }
            (x, y) => x == y,
        }
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }
}
