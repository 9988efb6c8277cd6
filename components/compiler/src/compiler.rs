//! Compiler driver

use crate::ast::{Expression, Story};
use crate::codegen::Generator;
use crate::error::{CompileError, Diagnostic, Diagnostics, ErrorHandler, Result};
use bytecode_system::{NodeId, StoryDocument, Tree};
use core_types::ErrorType;
use std::fmt;
use tracing::{debug, info, warn};

/// Compiler configuration
#[derive(Default)]
pub struct CompilerOptions {
    /// File name recorded in debug metadata that lacks one
    pub source_filename: Option<String>,
    /// Give every flow container the visits count flag
    pub count_all_visits: bool,
    error_handler: Option<ErrorHandler>,
}

impl CompilerOptions {
    /// Default options: no file name, counts only where needed, no handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the source file name
    pub fn with_source_filename(mut self, name: impl Into<String>) -> Self {
        self.source_filename = Some(name.into());
        self
    }

    /// Builder: count visits of every flow
    pub fn with_count_all_visits(mut self, enabled: bool) -> Self {
        self.count_all_visits = enabled;
        self
    }

    /// Builder: forward every diagnostic to `handler`
    pub fn with_error_handler(mut self, handler: impl FnMut(&str, ErrorType) + 'static) -> Self {
        self.error_handler = Some(Box::new(handler));
        self
    }
}

impl fmt::Debug for CompilerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerOptions")
            .field("source_filename", &self.source_filename)
            .field("count_all_visits", &self.count_all_visits)
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}

/// Lowers parsed stories into compiled story documents
#[derive(Debug)]
pub struct Compiler {
    source_filename: Option<String>,
    count_all_visits: bool,
    diagnostics: Diagnostics,
}

impl Compiler {
    /// Create a compiler
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            source_filename: options.source_filename,
            count_all_visits: options.count_all_visits,
            diagnostics: Diagnostics::with_handler(options.error_handler),
        }
    }

    /// Compile a story.
    ///
    /// Fails if any error diagnostic was reported; the partially generated
    /// tree is discarded in that case. Diagnostics stay available through
    /// [`Compiler::diagnostics`].
    pub fn compile(&mut self, story: &Story) -> Result<StoryDocument> {
        let document = self.generate(story)?;
        let errors = self.diagnostics.error_count();
        if errors > 0 {
            warn!(errors, "discarding compiled story");
            return Err(CompileError::Diagnostics { errors });
        }
        Ok(document)
    }

    /// Lower a story without discarding the result on error diagnostics.
    ///
    /// The returned tree must not be run if [`Compiler::has_errors`].
    pub fn generate(&mut self, story: &Story) -> Result<StoryDocument> {
        self.diagnostics.clear();
        info!(
            flows = story.flows.len(),
            globals = story.globals.len(),
            file = ?self.source_filename,
            "compiling story"
        );

        let mut generator = Generator::new(
            &mut self.diagnostics,
            self.source_filename.clone(),
            self.count_all_visits,
        );
        let root = generator.generate_story(story)?;
        generator.resolve_references()?;
        let tree = generator.into_tree();

        debug!(
            nodes = tree.len(),
            diagnostics = self.diagnostics.all().len(),
            errors = self.diagnostics.error_count(),
            "story compiled"
        );
        Ok(StoryDocument::new(tree, root))
    }

    /// Lower a lone expression into a fresh anonymous container.
    ///
    /// Names resolve against an empty story, so only built-ins, natives and
    /// literals are meaningful here.
    pub fn lower_expression(&mut self, expression: &Expression) -> Result<(Tree, NodeId)> {
        self.diagnostics.clear();
        let mut generator = Generator::new(
            &mut self.diagnostics,
            self.source_filename.clone(),
            self.count_all_visits,
        );
        let root = generator.root;
        generator.lower_expression(root, expression)?;
        generator.resolve_references()?;
        Ok((generator.into_tree(), root))
    }

    /// Diagnostics from the latest compile
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.all()
    }

    /// Check if the latest compile reported an error
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}
