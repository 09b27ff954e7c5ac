//! Control-flow linking pass: links `return`/`break`/`continue`
//! expressions to the function/loop they target, or reports
//! `InvalidControlFlow` if no enclosing target exists. Runs after name
//! resolution and before semantic checking, so the Expression Checker never
//! needs its own function/loop stacks.

use ferrosem_common::diagnostics::{DiagnosticSink, ErrorKind, SemanticError};
use ferrosem_hir::{
    AssocItemRef, ExprId, ExprKind, FlowTarget, FunctionId, FunctionLike, HirArena, ImplId,
    ItemRef, MethodId, Program, StmtKind, TraitId,
};

struct Linker<'a> {
    arena: &'a mut HirArena,
    diagnostics: &'a mut DiagnosticSink,
    functions: Vec<FunctionLike>,
    loops: Vec<ExprId>,
}

pub fn link_program(program: &mut Program, diagnostics: &mut DiagnosticSink) {
    let Program { items, arena } = program;
    let mut linker = Linker { arena, diagnostics, functions: Vec::new(), loops: Vec::new() };
    for item in items.iter() {
        linker.link_item(*item);
    }
}

impl<'a> Linker<'a> {
    fn link_item(&mut self, item: ItemRef) {
        match item {
            ItemRef::Function(fid) => self.link_function(fid),
            ItemRef::Impl(iid) => self.link_impl(iid),
            ItemRef::Trait(tid) => self.link_trait(tid),
            ItemRef::Const(cid) => {
                let init = self.arena.const_def(cid).init;
                self.link_expr(init);
            }
            ItemRef::Struct(_) | ItemRef::Enum(_) | ItemRef::TypeAlias(_) => {}
        }
    }

    /// A nested function or method starts with empty function/loop stacks:
    /// neither `return` nor `break`/`continue` can reach through it into
    /// whatever encloses it (mirroring `StmtKind::Item` being a fresh item,
    /// not a closure).
    fn link_function(&mut self, fid: FunctionId) {
        let body = self.arena.function(fid).body;
        let outer_functions = std::mem::take(&mut self.functions);
        let outer_loops = std::mem::take(&mut self.loops);
        self.functions.push(FunctionLike::Function(fid));
        self.link_expr(body);
        self.functions = outer_functions;
        self.loops = outer_loops;
    }

    fn link_method(&mut self, mid: MethodId) {
        let body = self.arena.method(mid).body;
        let outer_functions = std::mem::take(&mut self.functions);
        let outer_loops = std::mem::take(&mut self.loops);
        self.functions.push(FunctionLike::Method(mid));
        self.link_expr(body);
        self.functions = outer_functions;
        self.loops = outer_loops;
    }

    fn link_impl(&mut self, iid: ImplId) {
        let methods = self.arena.impl_def(iid).methods.clone();
        let assoc_functions = self.arena.impl_def(iid).assoc_functions.clone();
        let assoc_consts = self.arena.impl_def(iid).assoc_consts.clone();
        for mid in methods {
            self.link_method(mid);
        }
        for fid in assoc_functions {
            self.link_function(fid);
        }
        for cid in assoc_consts {
            let init = self.arena.const_def(cid).init;
            self.link_expr(init);
        }
    }

    fn link_trait(&mut self, tid: TraitId) {
        let items = self.arena.trait_def(tid).items.clone();
        for item in items {
            match item {
                AssocItemRef::Function(fid) => self.link_function(fid),
                AssocItemRef::Const(cid) => {
                    let init = self.arena.const_def(cid).init;
                    self.link_expr(init);
                }
            }
        }
    }

    fn link_expr(&mut self, expr_id: ExprId) {
        let kind = self.arena.expr(expr_id).kind.clone();
        let span = self.arena.expr(expr_id).span;
        match kind {
            ExprKind::Literal(_) | ExprKind::Path { .. } => {}
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs } | ExprKind::CompoundAssign { lhs, rhs, .. } => {
                self.link_expr(lhs);
                self.link_expr(rhs);
            }
            ExprKind::Unary { operand, .. }
            | ExprKind::Reference { operand, .. }
            | ExprKind::Deref { operand }
            | ExprKind::Cast { operand, .. } => self.link_expr(operand),
            ExprKind::Call { callee, args, .. } => {
                self.link_expr(callee);
                for a in args {
                    self.link_expr(a);
                }
            }
            ExprKind::MethodCall { receiver, args, .. } => {
                self.link_expr(receiver);
                for a in args {
                    self.link_expr(a);
                }
            }
            ExprKind::Field { receiver, .. } => self.link_expr(receiver),
            ExprKind::Index { base, index } => {
                self.link_expr(base);
                self.link_expr(index);
            }
            ExprKind::StructLiteral { fields, .. } => {
                for (_, e) in fields {
                    self.link_expr(e);
                }
            }
            ExprKind::ArrayLiteral { elems } => {
                for e in elems {
                    self.link_expr(e);
                }
            }
            ExprKind::ArrayRepeat { value, count } => {
                self.link_expr(value);
                self.link_expr(count);
            }
            ExprKind::Block { stmts, final_expr } => {
                for s in stmts {
                    self.link_stmt(s);
                }
                if let Some(fe) = final_expr {
                    self.link_expr(fe);
                }
            }
            ExprKind::If { cond, then_branch, else_branch } => {
                self.link_expr(cond);
                self.link_expr(then_branch);
                if let Some(e) = else_branch {
                    self.link_expr(e);
                }
            }
            ExprKind::Loop { body } => {
                self.loops.push(expr_id);
                self.link_expr(body);
                self.loops.pop();
            }
            ExprKind::While { cond, body } => {
                self.link_expr(cond);
                self.loops.push(expr_id);
                self.link_expr(body);
                self.loops.pop();
            }
            ExprKind::Break { value, .. } => {
                if let Some(v) = value {
                    self.link_expr(v);
                }
                let target = match self.loops.last() {
                    Some(&loop_id) => FlowTarget::Resolved(loop_id),
                    None => {
                        self.err(span, "`break` outside a loop");
                        FlowTarget::Unlinked
                    }
                };
                if let ExprKind::Break { target: slot, .. } = &mut self.arena.expr_mut(expr_id).kind {
                    *slot = target;
                }
            }
            ExprKind::Continue { .. } => {
                let target = match self.loops.last() {
                    Some(&loop_id) => FlowTarget::Resolved(loop_id),
                    None => {
                        self.err(span, "`continue` outside a loop");
                        FlowTarget::Unlinked
                    }
                };
                if let ExprKind::Continue { target: slot } = &mut self.arena.expr_mut(expr_id).kind {
                    *slot = target;
                }
            }
            ExprKind::Return { value, .. } => {
                if let Some(v) = value {
                    self.link_expr(v);
                }
                let target = match self.functions.last() {
                    Some(&func) => FlowTarget::Resolved(func),
                    None => {
                        self.err(span, "`return` outside a function");
                        FlowTarget::Unlinked
                    }
                };
                if let ExprKind::Return { target: slot, .. } = &mut self.arena.expr_mut(expr_id).kind {
                    *slot = target;
                }
            }
        }
    }

    fn link_stmt(&mut self, stmt_id: ferrosem_hir::StmtId) {
        let kind = self.arena.stmt(stmt_id).kind.clone();
        match kind {
            StmtKind::Let { init, .. } => {
                if let Some(e) = init {
                    self.link_expr(e);
                }
            }
            StmtKind::Expr(e) => self.link_expr(e),
            StmtKind::Item(item) => self.link_item(item),
        }
    }

    fn err(&mut self, span: ferrosem_common::Span, message: impl Into<String>) {
        self.diagnostics.push(SemanticError::new(ErrorKind::InvalidControlFlow, span, message));
    }
}

