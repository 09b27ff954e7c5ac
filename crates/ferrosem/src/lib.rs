//! Semantic analysis core for a Rust-subset source language.
//!
//! The pipeline, run in order by [`analyze`]:
//! 1. AST -> HIR lowering ([`ferrosem_hir::lower_program`])
//! 2. name resolution ([`ferrosem_resolve::resolve_program`])
//! 3. control-flow linking ([`ferrosem_check::flow::link_program`])
//! 4. semantic checking ([`ferrosem_check::QueryService`])
//! 5. exit-call validation ([`ferrosem_check::exit_check::check_exit_calls`])
//!
//! Lexing, parsing, and codegen are out of scope; callers hand in an
//! `ferrosem_ast::Program` already produced by a front-end.

pub use ferrosem_ast as ast;
pub use ferrosem_check as check;
pub use ferrosem_common as common;
pub use ferrosem_hir as hir;
pub use ferrosem_resolve as resolve;
pub use ferrosem_types as types;

use ferrosem_common::diagnostics::{DiagnosticSink, SemanticError};
use ferrosem_hir::{ImplTable, Program};
use ferrosem_types::TypeUniverse;

/// The outcome of analyzing one compilation unit.
pub struct AnalysisResult {
    pub program: Program,
    pub impl_table: ImplTable,
    pub universe: TypeUniverse,
    pub errors: Vec<SemanticError>,
}

impl AnalysisResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Runs the full pipeline over a freshly parsed AST and returns the checked
/// program together with every diagnostic raised along the way. A fresh
/// [`TypeUniverse`] is created per call, so callers get process-independent
/// results - the universe is owned per compilation unit here rather than
/// shared as a process-wide singleton.
pub fn analyze(ast: &ferrosem_ast::Program) -> AnalysisResult {
    let _span = tracing::info_span!("analyze", items = ast.items.len()).entered();

    let lowered = {
        let _span = tracing::debug_span!("lower").entered();
        ferrosem_hir::lower_program(ast)
    };
    let mut program = lowered.program;
    let impl_table = lowered.impl_table;
    let universe = TypeUniverse::new();
    let mut diagnostics = DiagnosticSink::new();

    ferrosem_check::check_program(&mut program, &impl_table, &universe, &mut diagnostics);

    AnalysisResult { program, impl_table, universe, errors: diagnostics.into_errors() }
}
