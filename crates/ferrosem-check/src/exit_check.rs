//! Exit-call validation pass: `exit()` may only appear as the final
//! statement of the top-level `main` function, `main` must contain exactly
//! that call, and `main`'s body must have no trailing expression.

use ferrosem_common::diagnostics::{DiagnosticSink, ErrorKind, SemanticError};
use ferrosem_hir::{ExprId, ExprKind, FunctionId, HirArena, ItemRef, Program, StmtKind};

pub fn check_exit_calls(program: &Program, exit_fn: FunctionId, diagnostics: &mut DiagnosticSink) {
    let Program { items, arena } = program;
    let mut main_fn = None;
    for item in items.iter() {
        if let ItemRef::Function(fid) = item {
            if arena.function(*fid).name == "main" {
                main_fn = Some(*fid);
            }
        }
    }

    let mut checker = ExitChecker { arena, exit_fn, diagnostics, found_main_exit: false };
    for item in items.iter() {
        checker.walk_item(*item, false);
    }

    match main_fn {
        Some(fid) => {
            let span = arena.function(fid).span;
            if !checker.found_main_exit {
                diagnostics.push(SemanticError::new(
                    ErrorKind::InvalidMainShape,
                    span,
                    "`main` must end with a call to `exit`",
                ));
            }
        }
        None => {
            diagnostics.push(SemanticError::new(
                ErrorKind::InvalidMainShape,
                ferrosem_common::Span::dummy(),
                "program has no `main` function",
            ));
        }
    }
}

struct ExitChecker<'a> {
    arena: &'a HirArena,
    exit_fn: FunctionId,
    diagnostics: &'a mut DiagnosticSink,
    found_main_exit: bool,
}

impl<'a> ExitChecker<'a> {
    /// `nested` marks whether `item` was reached by recursing into some
    /// enclosing function or method body, as opposed to being one of the
    /// program's own top-level items. A function literally named `main` but
    /// declared inside another function's body is never the top-level
    /// `main`, regardless of its associated-scope depth.
    fn walk_item(&mut self, item: ItemRef, nested: bool) {
        match item {
            ItemRef::Function(fid) => {
                let is_main = !nested && self.arena.function(fid).name == "main" && self.arena.function(fid).assoc_depth == 0;
                let body = self.arena.function(fid).body;
                self.walk_function_body(body, is_main);
            }
            ItemRef::Impl(iid) => {
                for mid in self.arena.impl_def(iid).methods.clone() {
                    let body = self.arena.method(mid).body;
                    self.walk_function_body(body, false);
                }
                for fid in self.arena.impl_def(iid).assoc_functions.clone() {
                    let body = self.arena.function(fid).body;
                    self.walk_function_body(body, false);
                }
            }
            ItemRef::Trait(tid) => {
                for item in self.arena.trait_def(tid).items.clone() {
                    if let ferrosem_hir::AssocItemRef::Function(fid) = item {
                        let body = self.arena.function(fid).body;
                        self.walk_function_body(body, false);
                    }
                }
            }
            ItemRef::Const(_) | ItemRef::Struct(_) | ItemRef::Enum(_) | ItemRef::TypeAlias(_) => {}
        }
    }

    /// Walks a function body looking for misplaced `exit()` calls, and (for
    /// top-level `main` only) validates its required final-statement shape.
    fn walk_function_body(&mut self, body: ExprId, is_main: bool) {
        if is_main {
            let ExprKind::Block { stmts, final_expr } = &self.arena.expr(body).kind else {
                self.scan_non_exit(body);
                return;
            };
            if let Some(fe) = final_expr {
                self.diagnostics.push(SemanticError::new(
                    ErrorKind::InvalidMainShape,
                    self.arena.expr(*fe).span,
                    "`main` must not have a trailing expression",
                ));
                self.scan_non_exit(*fe);
            }
            for (i, s) in stmts.iter().enumerate() {
                let is_last = i + 1 == stmts.len();
                self.walk_main_stmt(*s, is_last);
            }
        } else {
            self.scan_non_exit(body);
        }
    }

    fn walk_main_stmt(&mut self, stmt_id: ferrosem_hir::StmtId, is_last: bool) {
        match &self.arena.stmt(stmt_id).kind {
            StmtKind::Expr(e) if is_last && self.is_exit_call(*e) => {
                self.found_main_exit = true;
            }
            StmtKind::Expr(e) => self.scan_non_exit(*e),
            StmtKind::Let { init, .. } => {
                if let Some(e) = init {
                    self.scan_non_exit(*e);
                }
            }
            StmtKind::Item(item) => self.walk_item(*item, true),
        }
    }

    fn is_exit_call(&self, expr_id: ExprId) -> bool {
        matches!(
            &self.arena.expr(expr_id).kind,
            ExprKind::Call { target: ferrosem_hir::CallTarget::Function(fid), .. } if *fid == self.exit_fn
        )
    }

    /// Recurses through an expression flagging any call to `exit` that is
    /// not the validated final statement of top-level `main`.
    fn scan_non_exit(&mut self, expr_id: ExprId) {
        let kind = self.arena.expr(expr_id).kind.clone();
        if self.is_exit_call(expr_id) {
            self.diagnostics.push(SemanticError::new(
                ErrorKind::InvalidMainShape,
                self.arena.expr(expr_id).span,
                "`exit` may only be called as the final statement of the top-level `main` function",
            ));
        }
        match kind {
            ExprKind::Literal(_) | ExprKind::Path { .. } => {}
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs } | ExprKind::CompoundAssign { lhs, rhs, .. } => {
                self.scan_non_exit(lhs);
                self.scan_non_exit(rhs);
            }
            ExprKind::Unary { operand, .. }
            | ExprKind::Reference { operand, .. }
            | ExprKind::Deref { operand }
            | ExprKind::Cast { operand, .. } => self.scan_non_exit(operand),
            ExprKind::Call { callee, args, .. } => {
                self.scan_non_exit(callee);
                for a in args {
                    self.scan_non_exit(a);
                }
            }
            ExprKind::MethodCall { receiver, args, .. } => {
                self.scan_non_exit(receiver);
                for a in args {
                    self.scan_non_exit(a);
                }
            }
            ExprKind::Field { receiver, .. } => self.scan_non_exit(receiver),
            ExprKind::Index { base, index } => {
                self.scan_non_exit(base);
                self.scan_non_exit(index);
            }
            ExprKind::StructLiteral { fields, .. } => {
                for (_, e) in fields {
                    self.scan_non_exit(e);
                }
            }
            ExprKind::ArrayLiteral { elems } => {
                for e in elems {
                    self.scan_non_exit(e);
                }
            }
            ExprKind::ArrayRepeat { value, count } => {
                self.scan_non_exit(value);
                self.scan_non_exit(count);
            }
            ExprKind::Block { stmts, final_expr } => {
                for s in stmts {
                    match &self.arena.stmt(s).kind {
                        StmtKind::Expr(e) => self.scan_non_exit(*e),
                        StmtKind::Let { init, .. } => {
                            if let Some(e) = init {
                                self.scan_non_exit(*e);
                            }
                        }
                        StmtKind::Item(item) => self.walk_item(*item, true),
                    }
                }
                if let Some(fe) = final_expr {
                    self.scan_non_exit(fe);
                }
            }
            ExprKind::If { cond, then_branch, else_branch } => {
                self.scan_non_exit(cond);
                self.scan_non_exit(then_branch);
                if let Some(e) = else_branch {
                    self.scan_non_exit(e);
                }
            }
            ExprKind::Loop { body } => self.scan_non_exit(body),
            ExprKind::While { cond, body } => {
                self.scan_non_exit(cond);
                self.scan_non_exit(body);
            }
            ExprKind::Break { value, .. } => {
                if let Some(v) = value {
                    self.scan_non_exit(v);
                }
            }
            ExprKind::Continue { .. } => {}
            ExprKind::Return { value, .. } => {
                if let Some(v) = value {
                    self.scan_non_exit(v);
                }
            }
        }
    }
}
