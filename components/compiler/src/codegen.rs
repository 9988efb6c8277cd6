//! Content tree generation for stories, flows and statements

use crate::ast::{Expression, Flow, FlowKind, GlobalDeclaration, Statement, StatementKind, Story, UnaryOperator};
use crate::error::{Diagnostics, Result};
use crate::resolve::{DivertKind, FlowScope, Reference, ScopeId};
use bytecode_system::{
    Container, ControlCommand, CountFlags, Divert, NodeId, Opcode, Path, Tag, Tree, Value,
    VariableAssignment,
};
use core_types::{DebugMetadata, ErrorType};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Name of the root's container of global variable initialisers
pub const GLOBAL_DECLARATION_NAME: &str = "global decl";

/// Tree builder shared by the lowering passes
pub(crate) struct Generator<'a> {
    pub(crate) tree: Tree,
    pub(crate) root: NodeId,
    pub(crate) diagnostics: &'a mut Diagnostics,
    pub(crate) globals: HashSet<String>,
    pub(crate) externals: HashMap<String, usize>,
    pub(crate) scopes: Vec<FlowScope>,
    pub(crate) scope: ScopeId,
    pub(crate) references: Vec<(Reference, Option<DebugMetadata>)>,
    pub(crate) flow_parameters: HashMap<NodeId, usize>,
    pub(crate) location: Option<DebugMetadata>,
    source_filename: Option<String>,
    count_all_visits: bool,
}

impl<'a> Generator<'a> {
    /// Create a generator with an empty root container
    pub(crate) fn new(
        diagnostics: &'a mut Diagnostics,
        source_filename: Option<String>,
        count_all_visits: bool,
    ) -> Self {
        let mut tree = Tree::new();
        let root = tree.add(Container::new());
        Self {
            tree,
            root,
            diagnostics,
            globals: HashSet::new(),
            externals: HashMap::new(),
            scopes: vec![FlowScope {
                container: root,
                knot: None,
                locals: HashSet::new(),
                is_function: false,
            }],
            scope: 0,
            references: Vec::new(),
            flow_parameters: HashMap::new(),
            location: None,
            source_filename,
            count_all_visits,
        }
    }

    /// Hand over the finished tree
    pub(crate) fn into_tree(self) -> Tree {
        self.tree
    }

    /// Allocate a node and append it to `container`
    pub(crate) fn emit(&mut self, container: NodeId, opcode: impl Into<Opcode>) -> Result<NodeId> {
        let id = self.tree.add(opcode);
        self.tree.add_content(container, id)?;
        Ok(id)
    }

    /// Copy of `debug_metadata` with the source file filled in
    pub(crate) fn metadata(&self, debug_metadata: Option<&DebugMetadata>) -> Option<DebugMetadata> {
        debug_metadata.map(|dm| {
            let mut dm = dm.clone();
            if dm.file_name.is_none() {
                dm.file_name = self.source_filename.clone();
            }
            dm
        })
    }

    /// Report an error at `debug_metadata`, or at the statement being lowered
    pub(crate) fn report_error(
        &mut self,
        message: impl Into<String>,
        debug_metadata: Option<DebugMetadata>,
    ) {
        let debug_metadata = debug_metadata.or_else(|| self.location.clone());
        self.diagnostics
            .report(message, ErrorType::Error, debug_metadata);
    }

    /// Queue a placeholder for resolution along with the statement it came from
    pub(crate) fn record(&mut self, reference: Reference) {
        let location = self.location.clone();
        self.references.push((reference, location));
    }

    fn push_scope(&mut self, scope: FlowScope) -> ScopeId {
        self.scopes.push(scope);
        self.scopes.len() - 1
    }

    /// Lower a whole story.
    ///
    /// The root holds the main content container, a trailing `done`, and
    /// every flow plus the global declarations as named-only content.
    pub(crate) fn generate_story(&mut self, story: &Story) -> Result<NodeId> {
        for global in &story.globals {
            if !self.globals.insert(global.name.clone()) {
                self.report_error(
                    format!("Variable '{}' has already been declared", global.name),
                    self.metadata(global.debug_metadata.as_ref()),
                );
            }
        }
        self.externals = story
            .externals
            .iter()
            .map(|e| (e.name.clone(), e.parameters.len()))
            .collect();

        let root = self.root;
        let main = self.tree.add(Container::new());
        self.tree.add_content(root, main)?;
        self.emit(root, ControlCommand::Done)?;

        self.scope = self.push_scope(FlowScope {
            container: main,
            knot: None,
            locals: declared_temporaries(&story.root),
            is_function: false,
        });
        self.lower_statements(main, &story.root)?;

        for flow in &story.flows {
            self.generate_flow(root, flow, None)?;
        }

        self.scope = 0;
        if !story.globals.is_empty() {
            self.generate_global_declarations(&story.globals)?;
        }
        Ok(root)
    }

    fn generate_flow(&mut self, parent: NodeId, flow: &Flow, knot: Option<NodeId>) -> Result<()> {
        if flow.name.is_empty() {
            self.report_error("Flows must have a name", self.metadata(flow.debug_metadata.as_ref()));
            return Ok(());
        }
        let duplicate = self
            .tree
            .container(parent)
            .and_then(|c| c.named_child(&flow.name))
            .is_some();
        if duplicate {
            self.report_error(
                format!("Duplicate flow name: '{}'", flow.name),
                self.metadata(flow.debug_metadata.as_ref()),
            );
            return Ok(());
        }

        let container = self.tree.add(Container::named(flow.name.as_str()));
        let debug_metadata = self.metadata(flow.debug_metadata.as_ref());
        self.tree.set_debug_metadata(container, debug_metadata);
        self.tree.add_to_named_content_only(parent, container)?;
        if self.count_all_visits {
            self.tree.insert_count_flags(container, CountFlags::VISITS)?;
        }
        self.flow_parameters.insert(container, flow.parameters.len());
        trace!(name = %flow.name, kind = ?flow.kind, "lowering flow");

        let mut locals = declared_temporaries(&flow.body);
        locals.extend(flow.parameters.iter().cloned());
        let is_function = flow.kind == FlowKind::Function;
        let previous = self.scope;
        self.scope = self.push_scope(FlowScope {
            container,
            knot: knot.or(Some(container)),
            locals,
            is_function,
        });

        // Arguments arrive on the evaluation stack last-first
        for parameter in flow.parameters.iter().rev() {
            self.emit(container, VariableAssignment::temporary(parameter.as_str(), true))?;
        }

        if flow.body.is_empty() {
            if let Some(first) = flow.stitches.first() {
                let node = self.emit(container, Divert::to_path(Path::parse(&first.name)))?;
                self.record(Reference::Divert {
                    node,
                    target: first.name.clone(),
                    scope: self.scope,
                    kind: DivertKind::Plain,
                    arguments: 0,
                });
            }
        }
        self.lower_statements(container, &flow.body)?;

        let returns = matches!(
            flow.body.last().map(|s| &s.kind),
            Some(StatementKind::Return(_))
        );
        if is_function && !returns {
            self.emit_return(container, None)?;
        }

        for stitch in &flow.stitches {
            self.generate_flow(container, stitch, Some(container))?;
        }

        self.scope = previous;
        Ok(())
    }

    fn generate_global_declarations(&mut self, globals: &[GlobalDeclaration]) -> Result<()> {
        let declarations = self.tree.add(Container::named(GLOBAL_DECLARATION_NAME));
        self.tree.add_to_named_content_only(self.root, declarations)?;

        self.emit(declarations, ControlCommand::EvalStart)?;
        for global in globals {
            if !is_constant(&global.initial_value) {
                self.report_error(
                    format!(
                        "Initial value for variable '{}' must be a number, constant or divert target",
                        global.name
                    ),
                    self.metadata(global.debug_metadata.as_ref()),
                );
            }
            self.lower_expression(declarations, &global.initial_value)?;
            self.emit(declarations, VariableAssignment::global(global.name.as_str(), true))?;
        }
        self.emit(declarations, ControlCommand::EvalEnd)?;
        self.emit(declarations, ControlCommand::End)?;
        Ok(())
    }

    /// Lower statements into `container`, in order
    pub(crate) fn lower_statements(&mut self, container: NodeId, statements: &[Statement]) -> Result<()> {
        for statement in statements {
            self.lower_statement(container, statement)?;
        }
        Ok(())
    }

    fn lower_statement(&mut self, container: NodeId, statement: &Statement) -> Result<()> {
        let debug_metadata = self.metadata(statement.debug_metadata.as_ref());
        self.location = debug_metadata.clone();
        let first = self.tree.content(container).len();

        match &statement.kind {
            StatementKind::Text(text) => {
                self.emit(container, Value::string(text.as_str()))?;
            }
            StatementKind::Newline => {
                self.emit(container, Value::string("\n"))?;
            }
            StatementKind::Glue => {
                self.emit(container, Opcode::Glue)?;
            }
            StatementKind::Tag(text) => {
                self.emit(container, Tag::new(text.as_str()))?;
            }
            StatementKind::Output(expression) => {
                self.emit(container, ControlCommand::EvalStart)?;
                self.lower_expression(container, expression)?;
                self.emit(container, ControlCommand::EvalOutput)?;
                self.emit(container, ControlCommand::EvalEnd)?;
            }
            StatementKind::Call(call) => {
                self.emit(container, ControlCommand::EvalStart)?;
                self.lower_function_call(container, call, true)?;
                self.emit(container, ControlCommand::EvalEnd)?;
            }
            StatementKind::Divert(target) => match target.as_str() {
                "DONE" => {
                    self.emit(container, ControlCommand::Done)?;
                }
                "END" => {
                    self.emit(container, ControlCommand::End)?;
                }
                _ => {
                    let node = self.emit(container, Divert::to_path(Path::parse(target)))?;
                    self.record(Reference::Divert {
                        node,
                        target: target.clone(),
                        scope: self.scope,
                        kind: DivertKind::Plain,
                        arguments: 0,
                    });
                }
            },
            StatementKind::TunnelCall { target, arguments } => {
                if !arguments.is_empty() {
                    self.emit(container, ControlCommand::EvalStart)?;
                    self.lower_arguments(container, arguments)?;
                    self.emit(container, ControlCommand::EvalEnd)?;
                }
                let node = self.emit(container, Divert::tunnel(Path::parse(target)))?;
                self.record(Reference::Divert {
                    node,
                    target: target.clone(),
                    scope: self.scope,
                    kind: DivertKind::Tunnel,
                    arguments: arguments.len(),
                });
            }
            StatementKind::TunnelReturn => {
                self.emit(container, ControlCommand::EvalStart)?;
                self.emit(container, Opcode::Void)?;
                self.emit(container, ControlCommand::EvalEnd)?;
                self.emit(container, ControlCommand::PopTunnel)?;
            }
            StatementKind::Return(value) => {
                if self.scopes[self.scope].is_function {
                    self.emit_return(container, value.as_ref())?;
                } else {
                    self.report_error(
                        "Return statements can only be used in knots that are declared as functions",
                        None,
                    );
                }
            }
            StatementKind::Assignment {
                name,
                value,
                is_new_declaration,
            } => self.lower_assignment(container, name, value, *is_new_declaration)?,
            StatementKind::AuthorNote(note) => {
                self.diagnostics
                    .report(note.as_str(), ErrorType::Author, debug_metadata.clone());
            }
            StatementKind::Done => {
                self.emit(container, ControlCommand::Done)?;
            }
            StatementKind::End => {
                self.emit(container, ControlCommand::End)?;
            }
        }

        // The statement's first node carries its location; later nodes
        // that need one have their own
        if let Some(&primary) = self.tree.content(container).get(first) {
            if debug_metadata.is_some() && self.tree.node(primary).own_debug_metadata().is_none() {
                self.tree.set_debug_metadata(primary, debug_metadata);
            }
        }
        self.location = None;
        Ok(())
    }

    fn emit_return(&mut self, container: NodeId, value: Option<&Expression>) -> Result<()> {
        self.emit(container, ControlCommand::EvalStart)?;
        match value {
            Some(expression) => self.lower_expression(container, expression)?,
            None => {
                self.emit(container, Opcode::Void)?;
            }
        }
        self.emit(container, ControlCommand::EvalEnd)?;
        self.emit(container, ControlCommand::PopFunction)?;
        Ok(())
    }

    fn lower_assignment(
        &mut self,
        container: NodeId,
        name: &str,
        value: &Expression,
        is_new_declaration: bool,
    ) -> Result<()> {
        let assignment = if is_new_declaration {
            VariableAssignment::temporary(name, true)
        } else if self.scopes[self.scope].locals.contains(name) {
            VariableAssignment::temporary(name, false)
        } else if self.globals.contains(name) {
            VariableAssignment::global(name, false)
        } else {
            self.report_error(
                format!("Variable could not be found to assign to: '{}'", name),
                None,
            );
            return Ok(());
        };

        self.emit(container, ControlCommand::EvalStart)?;
        self.lower_expression(container, value)?;
        self.emit(container, ControlCommand::EvalEnd)?;
        self.emit(container, assignment)?;
        Ok(())
    }
}

/// Names declared with `temp` anywhere in a flow body
fn declared_temporaries(statements: &[Statement]) -> HashSet<String> {
    statements
        .iter()
        .filter_map(|s| match &s.kind {
            StatementKind::Assignment {
                name,
                is_new_declaration: true,
                ..
            } => Some(name.clone()),
            _ => None,
        })
        .collect()
}

fn is_constant(expression: &Expression) -> bool {
    match expression {
        Expression::Int(_)
        | Expression::Float(_)
        | Expression::Bool(_)
        | Expression::String(_)
        | Expression::DivertTarget(_) => true,
        Expression::Unary {
            operator: UnaryOperator::Negate,
            operand,
        } => operand.is_number_literal(),
        _ => false,
    }
}
