//! Semantic checking: the type universe query service, the expression
//! checker, control-flow linking, and the exit-call validation pass.

pub mod check;
pub mod coerce;
pub mod exit_check;
pub mod flow;
pub mod query;

use ferrosem_common::diagnostics::DiagnosticSink;
use ferrosem_hir::{ImplTable, Program};
use ferrosem_types::TypeUniverse;

pub use query::{ExpectationKind, QueryService, TypeExpectation};

/// Runs name resolution, control-flow linking, semantic checking, and the
/// exit-call validation pass over a whole program, in that order.
pub fn check_program(
    program: &mut Program,
    impl_table: &ImplTable,
    universe: &TypeUniverse,
    diagnostics: &mut DiagnosticSink,
) {
    let resolve_out = ferrosem_resolve::resolve_program(program, impl_table, universe, diagnostics);
    flow::link_program(program, diagnostics);

    let items = program.items.clone();
    {
        let mut service = QueryService::new(
            &mut program.arena,
            universe,
            impl_table,
            &resolve_out.globals,
            diagnostics,
            resolve_out.builtins.exit,
        );
        for item in &items {
            service.check_item(*item);
        }
    }

    exit_check::check_exit_calls(program, resolve_out.builtins.exit, diagnostics);
}

