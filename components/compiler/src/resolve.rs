//! Reference resolution
//!
//! Lowering leaves placeholders for every name that can only be looked up
//! once all flows exist: variable reads, divert target values and diverts.
//! Each placeholder is recorded as a [`Reference`], including those inside
//! the arguments of calls that lowered to a built-in or native operator, and
//! rewritten here against the finished tree.

use crate::codegen::Generator;
use crate::error::Result;
use bytecode_system::{
    ControlCommand, CountFlags, Divert, NodeId, Path, Value, VariableReference,
};
use std::collections::HashSet;
use tracing::{debug, trace};

pub(crate) type ScopeId = usize;

/// Names visible from one flow
#[derive(Debug, Clone)]
pub(crate) struct FlowScope {
    /// Container the flow's content is lowered into
    pub(crate) container: NodeId,
    /// Enclosing knot, for stitches; the flow itself for knots
    pub(crate) knot: Option<NodeId>,
    /// Parameters and `temp` declarations
    pub(crate) locals: HashSet<String>,
    /// Flow is entered by a function call
    pub(crate) is_function: bool,
}

/// Built-ins that query a target's visit bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CountQuery {
    TurnsSince,
    ReadCount,
}

impl CountQuery {
    pub(crate) fn function_name(self) -> &'static str {
        match self {
            CountQuery::TurnsSince => crate::function_call::TURNS_SINCE,
            CountQuery::ReadCount => crate::function_call::READ_COUNT,
        }
    }

    pub(crate) fn command(self) -> ControlCommand {
        match self {
            CountQuery::TurnsSince => ControlCommand::TurnsSince,
            CountQuery::ReadCount => ControlCommand::ReadCount,
        }
    }

    /// Bookkeeping the target container must perform for the query to work
    fn required_flags(self) -> CountFlags {
        match self {
            CountQuery::TurnsSince => CountFlags::TURNS,
            CountQuery::ReadCount => CountFlags::TURNS | CountFlags::VISITS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DivertKind {
    Plain,
    Function,
    Tunnel,
}

/// A placeholder awaiting resolution
#[derive(Debug, Clone)]
pub(crate) enum Reference {
    /// `VAR?` node whose name may turn out to be a flow
    Variable {
        node: NodeId,
        name: String,
        scope: ScopeId,
        counted_by: Option<CountQuery>,
    },
    /// Divert target value whose path is still the written target
    DivertTarget {
        node: NodeId,
        target: String,
        scope: ScopeId,
        counted_by: Option<CountQuery>,
    },
    /// Divert whose path is still the written target
    Divert {
        node: NodeId,
        target: String,
        scope: ScopeId,
        kind: DivertKind,
        arguments: usize,
    },
}

impl Generator<'_> {
    /// Rewrite every recorded placeholder against the finished tree
    pub(crate) fn resolve_references(&mut self) -> Result<()> {
        let references = std::mem::take(&mut self.references);
        debug!(count = references.len(), "resolving references");

        for (reference, location) in references {
            self.location = location;
            match reference {
                Reference::Variable {
                    node,
                    name,
                    scope,
                    counted_by,
                } => self.resolve_variable(node, &name, scope, counted_by)?,
                Reference::DivertTarget {
                    node,
                    target,
                    scope,
                    counted_by,
                } => self.resolve_divert_target(node, &target, scope, counted_by)?,
                Reference::Divert {
                    node,
                    target,
                    scope,
                    kind,
                    arguments,
                } => self.resolve_divert(node, &target, scope, kind, arguments)?,
            }
        }
        self.location = None;
        Ok(())
    }

    fn is_variable(&self, scope: ScopeId, name: &str) -> bool {
        self.scopes[scope].locals.contains(name) || self.globals.contains(name)
    }

    /// Look a flow path up from the current flow, then its knot, then the root
    fn find_flow(&self, scope: ScopeId, target: &str) -> Option<NodeId> {
        let path = Path::parse(target);
        if path.is_empty() {
            return None;
        }
        let scope = &self.scopes[scope];
        [Some(scope.container), scope.knot, Some(self.root)]
            .into_iter()
            .flatten()
            .find_map(|start| {
                self.tree
                    .content_at_path(start, &path)
                    .filter(|found| self.tree.container(*found).is_some())
            })
    }

    fn mark_counted(&mut self, target: NodeId, flags: CountFlags) -> Result<()> {
        self.tree.insert_count_flags(target, flags)?;
        debug!(target = %self.tree.path(target), flags = %flags, "count flags marked");
        Ok(())
    }

    /// Report at the node's own location, else the statement it was written
    /// in, else whatever it inherits
    fn error_at(&mut self, node: NodeId, message: String) {
        let debug_metadata = self
            .tree
            .node(node)
            .own_debug_metadata()
            .cloned()
            .or_else(|| self.location.clone())
            .or_else(|| self.tree.debug_metadata(node).cloned());
        self.report_error(message, debug_metadata);
    }

    fn resolve_variable(
        &mut self,
        node: NodeId,
        name: &str,
        scope: ScopeId,
        counted_by: Option<CountQuery>,
    ) -> Result<()> {
        if self.is_variable(scope, name) {
            return Ok(());
        }

        let Some(target) = self.find_flow(scope, name) else {
            self.error_at(node, format!("Unresolved variable: {}", name));
            return Ok(());
        };

        let path = self.tree.path(target);
        trace!(name, path = %path, "variable is a read count");
        self.tree
            .replace_opcode(node, VariableReference::ReadCount(path))?;
        self.mark_counted(target, CountFlags::VISITS)?;

        if let Some(query) = counted_by {
            self.error_at(
                node,
                format!(
                    "Should be {}(-> {}). Usage without the '->' only makes sense for variable targets.",
                    query.function_name(),
                    name
                ),
            );
        }
        Ok(())
    }

    fn resolve_divert_target(
        &mut self,
        node: NodeId,
        target: &str,
        scope: ScopeId,
        counted_by: Option<CountQuery>,
    ) -> Result<()> {
        if self.is_variable(scope, target) {
            let message = match counted_by {
                Some(query) => format!(
                    "When getting the {0}() of a variable target, remove the '->' - i.e. it should just be {0}({1})",
                    query.function_name(),
                    target
                ),
                None => format!(
                    "Since '{}' is a variable, it shouldn't be preceded by '->' here.",
                    target
                ),
            };
            self.error_at(node, message);
            return Ok(());
        }

        match self.find_flow(scope, target) {
            Some(found) => {
                let path = self.tree.path(found);
                self.tree.replace_opcode(node, Value::divert_target(path))?;
                if let Some(query) = counted_by {
                    self.mark_counted(found, query.required_flags())?;
                }
            }
            None => {
                let message = match counted_by {
                    Some(query) => format!(
                        "Failed to find target for {}: '{}'",
                        query.function_name(),
                        target
                    ),
                    None => format!("Divert target not found: '-> {}'", target),
                };
                self.error_at(node, message);
            }
        }
        Ok(())
    }

    fn resolve_divert(
        &mut self,
        node: NodeId,
        target: &str,
        scope: ScopeId,
        kind: DivertKind,
        arguments: usize,
    ) -> Result<()> {
        if kind == DivertKind::Plain && self.is_variable(scope, target) {
            self.tree.replace_opcode(node, Divert::to_variable(target))?;
            return Ok(());
        }

        let Some(found) = self.find_flow(scope, target) else {
            let message = match kind {
                DivertKind::Function => format!("Function not found: '{}'", target),
                _ => format!("Divert target not found: '-> {}'", target),
            };
            self.error_at(node, message);
            return Ok(());
        };

        let path = self.tree.path(found);
        let divert = match kind {
            DivertKind::Plain => Divert::to_path(path),
            DivertKind::Function => Divert::function_call(path),
            DivertKind::Tunnel => Divert::tunnel(path),
        };
        self.tree.replace_opcode(node, divert)?;

        if kind != DivertKind::Plain {
            if let Some(&expected) = self.flow_parameters.get(&found) {
                if expected != arguments {
                    self.error_at(
                        node,
                        format!(
                            "Wrong number of arguments were passed to '{}', which expects {}",
                            target,
                            crate::function_call::parameter_count(expected)
                        ),
                    );
                }
            }
        }
        Ok(())
    }
}
