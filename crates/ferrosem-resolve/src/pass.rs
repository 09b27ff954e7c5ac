//! The name resolution pass.
//!
//! Two phases per scope: collect every item name first, then walk bodies so
//! forward references within the same scope resolve regardless of
//! declaration order. Failures are fail-fast within one top-level item -
//! resolution methods return `Result<(), ()>` and use `?` to abort
//! the rest of that item the moment a diagnostic has been raised; the
//! top-level driver loop simply moves on to the next item.

use ferrosem_common::diagnostics::{DiagnosticSink, ErrorKind, SemanticError};
use ferrosem_common::Span;
use ferrosem_hir::{
    AssocItemRef, BindingDef, BindingLink, ConstId, EnumId, ExprId, ExprKind, FunctionId, HirArena,
    ImplId, ItemRef, Local, MethodId, PatId, PathLink, PathResolution, PatternKind, Program,
    StmtId, StmtKind, StructId, StructOrEnum, TraitId, TypeAnnotation, TypeNode,
};
use ferrosem_hir::ImplTable;

use crate::builtins::{self, Builtins};
use crate::names::{self, GlobalNames};
use crate::scope::{ScopeKind, Scopes, TypeDef, ValueDef};

pub struct ResolveOutput {
    pub globals: GlobalNames,
    pub builtins: Builtins,
}

pub fn resolve_program(
    program: &mut Program,
    impl_table: &ImplTable,
    universe: &ferrosem_types::TypeUniverse,
    diagnostics: &mut DiagnosticSink,
) -> ResolveOutput {
    let Program { items, arena } = program;

    let mut scopes = Scopes::new();
    let builtins = builtins::register(arena, universe, &mut scopes);

    let mut resolver = Resolver { arena, impl_table, scopes: &mut scopes, diagnostics, pending_type_statics: Vec::new() };

    for item in items.iter() {
        resolver.collect_one_item(*item);
    }
    for item in items.iter() {
        let _ = resolver.resolve_item(*item);
    }
    resolver.finalize_type_statics();

    let globals = names::snapshot_global(&scopes);
    ResolveOutput { globals, builtins }
}

fn unit_placeholder() -> TypeAnnotation {
    TypeAnnotation::Unresolved(TypeNode::Unit)
}

struct Resolver<'a> {
    arena: &'a mut HirArena,
    impl_table: &'a ImplTable,
    scopes: &'a mut Scopes,
    diagnostics: &'a mut DiagnosticSink,
    /// `ExprId`s of two-segment `Type::member` paths whose type segment
    /// didn't resolve at first sight - drained by `finalize_type_statics`.
    pending_type_statics: Vec<ExprId>,
}

type R = Result<(), ()>;

impl<'a> Resolver<'a> {
    fn err(&mut self, kind: ErrorKind, span: Span, message: impl Into<String>) {
        self.diagnostics.push(SemanticError::new(kind, span, message));
    }

    // -----------------------------------------------------------------
    // Phase 1: collect item names
    // -----------------------------------------------------------------

    fn collect_one_item(&mut self, item: ItemRef) {
        match item {
            ItemRef::Function(fid) => {
                let name = self.arena.function(fid).name.clone();
                let span = self.arena.function(fid).span;
                if !self.scopes.define_item(&name, ValueDef::Function(fid)) {
                    self.err(ErrorKind::DuplicateDefinition, span, format!("duplicate definition of `{name}`"));
                }
            }
            ItemRef::Const(cid) => {
                let name = self.arena.const_def(cid).name.clone();
                let span = self.arena.const_def(cid).span;
                if !self.scopes.define_item(&name, ValueDef::Const(cid)) {
                    self.err(ErrorKind::DuplicateDefinition, span, format!("duplicate definition of `{name}`"));
                }
            }
            ItemRef::Struct(sid) => {
                let name = self.arena.strukt(sid).name.clone();
                let span = self.arena.strukt(sid).span;
                if !self.scopes.define_type(&name, TypeDef::Struct(sid)) {
                    self.err(ErrorKind::DuplicateDefinition, span, format!("duplicate definition of `{name}`"));
                }
            }
            ItemRef::Enum(eid) => {
                let name = self.arena.enum_def(eid).name.clone();
                let span = self.arena.enum_def(eid).span;
                if !self.scopes.define_type(&name, TypeDef::Enum(eid)) {
                    self.err(ErrorKind::DuplicateDefinition, span, format!("duplicate definition of `{name}`"));
                }
            }
            ItemRef::Trait(tid) => {
                let name = self.arena.trait_def(tid).name.clone();
                let span = self.arena.trait_def(tid).span;
                if !self.scopes.define_type(&name, TypeDef::Trait(tid)) {
                    self.err(ErrorKind::DuplicateDefinition, span, format!("duplicate definition of `{name}`"));
                }
            }
            ItemRef::TypeAlias(taid) => {
                let name = self.arena.type_alias(taid).name.clone();
                let span = self.arena.type_alias(taid).span;
                if !self.scopes.define_type(&name, TypeDef::Alias(taid)) {
                    self.err(ErrorKind::DuplicateDefinition, span, format!("duplicate definition of `{name}`"));
                }
            }
            ItemRef::Impl(_) => {}
        }
    }

    // -----------------------------------------------------------------
    // Phase 2: resolve bodies
    // -----------------------------------------------------------------

    fn resolve_item(&mut self, item: ItemRef) -> R {
        match item {
            ItemRef::Function(fid) => self.resolve_function(fid),
            ItemRef::Const(cid) => self.resolve_const(cid),
            ItemRef::Impl(iid) => self.resolve_impl(iid),
            ItemRef::Trait(tid) => self.resolve_trait(tid),
            ItemRef::Struct(sid) => self.resolve_struct(sid),
            ItemRef::Enum(eid) => self.resolve_enum(eid),
            ItemRef::TypeAlias(taid) => self.resolve_type_alias(taid),
        }
    }

    fn resolve_struct(&mut self, sid: StructId) -> R {
        let fields = self.arena.strukt(sid).fields.clone();
        let mut ok = true;
        for (_, ty) in &fields {
            ok &= self.resolve_type_annotation(ty).is_ok();
        }
        if ok {
            Ok(())
        } else {
            Err(())
        }
    }

    fn resolve_enum(&mut self, eid: EnumId) -> R {
        let variants = self.arena.enum_def(eid).variants.clone();
        let mut ok = true;
        for variant in &variants {
            if let Some(payload) = &variant.payload {
                ok &= self.resolve_type_annotation(payload).is_ok();
            }
        }
        if ok {
            Ok(())
        } else {
            Err(())
        }
    }

    fn resolve_type_alias(&mut self, taid: ferrosem_hir::TypeAliasId) -> R {
        let ty = self.arena.type_alias(taid).ty.clone();
        self.resolve_type_annotation(&ty)
    }

    fn resolve_function(&mut self, fid: FunctionId) -> R {
        self.scopes.push(ScopeKind::Function);
        let params = self.arena.function(fid).params.clone();
        let ret = self.arena.function(fid).ret.clone();
        let mut result = Ok(());
        for param in &params {
            if self.resolve_pattern(param.pattern).is_err() {
                result = Err(());
            }
            if self.resolve_type_annotation(&param.ty).is_err() {
                result = Err(());
            }
        }
        if let Some(ret) = &ret {
            if self.resolve_type_annotation(ret).is_err() {
                result = Err(());
            }
        }
        let body = self.arena.function(fid).body;
        if result.is_ok() {
            result = self.resolve_expr(body);
        }
        self.scopes.pop();
        result
    }

    fn resolve_method(&mut self, mid: MethodId) -> R {
        self.scopes.push(ScopeKind::Function);
        let span = self.arena.method(mid).span;
        let self_local = self.arena.push_local(Local {
            name: "self".to_string(),
            mutable: false,
            type_annotation: unit_placeholder(),
            span,
        });
        self.scopes.define_binding("self", ValueDef::Local(self_local));
        self.arena.method_mut(mid).self_local = BindingLink::Resolved(self_local);

        let params = self.arena.method(mid).params.clone();
        let ret = self.arena.method(mid).ret.clone();
        let mut result = Ok(());
        for param in &params {
            if self.resolve_pattern(param.pattern).is_err() {
                result = Err(());
            }
            if self.resolve_type_annotation(&param.ty).is_err() {
                result = Err(());
            }
        }
        if let Some(ret) = &ret {
            if self.resolve_type_annotation(ret).is_err() {
                result = Err(());
            }
        }
        let body = self.arena.method(mid).body;
        if result.is_ok() {
            result = self.resolve_expr(body);
        }
        self.scopes.pop();
        result
    }

    fn resolve_impl(&mut self, iid: ImplId) -> R {
        let target = self.arena.impl_def(iid).target.clone();
        let methods = self.arena.impl_def(iid).methods.clone();
        let assoc_functions = self.arena.impl_def(iid).assoc_functions.clone();
        let assoc_consts = self.arena.impl_def(iid).assoc_consts.clone();
        let mut ok = self.resolve_type_annotation(&target).is_ok();
        let self_def = self.target_type_def(&target);
        self.scopes.push(ScopeKind::Impl);
        if let Some(def) = self_def {
            self.scopes.define_type("Self", def);
        }
        for mid in methods {
            ok &= self.resolve_method(mid).is_ok();
        }
        for fid in assoc_functions {
            ok &= self.resolve_function(fid).is_ok();
        }
        for cid in assoc_consts {
            ok &= self.resolve_const(cid).is_ok();
        }
        self.scopes.pop();
        if ok {
            Ok(())
        } else {
            Err(())
        }
    }

    /// The `StructOrEnum` an `impl` block's target names, so `Self` can be
    /// registered as an alias for it in the impl's scope. The target is still
    /// an unresolved single-segment path at this point in the pass; anything
    /// else (a primitive, a reference, an array) isn't a legal impl target
    /// and is left for `type_query` to reject later.
    fn target_type_def(&self, ann: &TypeAnnotation) -> Option<TypeDef> {
        match ann {
            TypeAnnotation::Unresolved(TypeNode::Path(segments)) if segments.len() == 1 => {
                self.scopes.lookup_type(&segments[0])
            }
            _ => None,
        }
    }

    fn resolve_trait(&mut self, tid: TraitId) -> R {
        let items = self.arena.trait_def(tid).items.clone();
        let mut ok = true;
        for item in items {
            ok &= match item {
                AssocItemRef::Function(fid) => self.resolve_function(fid).is_ok(),
                AssocItemRef::Const(cid) => self.resolve_const(cid).is_ok(),
            };
        }
        if ok {
            Ok(())
        } else {
            Err(())
        }
    }

    fn resolve_const(&mut self, cid: ConstId) -> R {
        let ty = self.arena.const_def(cid).ty.clone();
        let init = self.arena.const_def(cid).init;
        let ty_ok = self.resolve_type_annotation(&ty).is_ok();
        let init_ok = self.resolve_expr(init).is_ok();
        if ty_ok && init_ok {
            Ok(())
        } else {
            Err(())
        }
    }

    // -----------------------------------------------------------------
    // Patterns
    // -----------------------------------------------------------------

    /// Commits every binding reachable from `pat_id` into the current
    /// scope, and resolves any struct/enum-variant type reference the
    /// pattern names.
    fn resolve_pattern(&mut self, pat_id: PatId) -> R {
        let data = self.arena.pat(pat_id).clone();
        match data.kind {
            PatternKind::Binding(binding) => {
                let local = self.arena.push_local(Local {
                    name: binding.name.clone(),
                    mutable: binding.mutable,
                    type_annotation: unit_placeholder(),
                    span: data.span,
                });
                self.scopes.define_binding(&binding.name, ValueDef::Local(local));
                self.arena.pat_mut(pat_id).kind = PatternKind::Binding(BindingDef {
                    name: binding.name,
                    mutable: binding.mutable,
                    local: BindingLink::Resolved(local),
                });
                Ok(())
            }
            PatternKind::Wildcard | PatternKind::Literal(_) | PatternKind::Range { .. } => Ok(()),
            PatternKind::Reference { sub, .. } => self.resolve_pattern(sub),
            PatternKind::Struct { ty, fields } => {
                let resolved_ty = match ty {
                    PathLink::Resolved(sid) => Some(sid),
                    PathLink::Unresolved(segments) => {
                        let name = segments.last().expect("path has at least one segment");
                        match self.scopes.lookup_type(name) {
                            Some(TypeDef::Struct(sid)) => Some(sid),
                            Some(_) => {
                                self.err(ErrorKind::NotAType, data.span, format!("`{name}` is not a struct type"));
                                None
                            }
                            None => {
                                self.err(ErrorKind::UnresolvedName, data.span, format!("unresolved type `{name}`"));
                                None
                            }
                        }
                    }
                };
                let mut ok = resolved_ty.is_some();
                for (_, sub_pat) in &fields {
                    ok &= self.resolve_pattern(*sub_pat).is_ok();
                }
                if let Some(sid) = resolved_ty {
                    self.arena.pat_mut(pat_id).kind = PatternKind::Struct { ty: PathLink::Resolved(sid), fields };
                }
                if ok {
                    Ok(())
                } else {
                    Err(())
                }
            }
            PatternKind::TupleLike { ty, subs } => {
                let resolved_ty = match ty {
                    PathLink::Resolved(parts) => Some(parts),
                    PathLink::Unresolved(segments) => {
                        self.resolve_tuple_like_path(&segments, data.span)
                    }
                };
                let mut ok = resolved_ty.is_some();
                for sub in &subs {
                    ok &= self.resolve_pattern(*sub).is_ok();
                }
                if let Some(parts) = resolved_ty {
                    self.arena.pat_mut(pat_id).kind = PatternKind::TupleLike { ty: PathLink::Resolved(parts), subs };
                }
                if ok {
                    Ok(())
                } else {
                    Err(())
                }
            }
        }
    }

    fn resolve_tuple_like_path(&mut self, segments: &[String], span: Span) -> Option<(EnumId, usize)> {
        if segments.len() != 2 {
            self.err(ErrorKind::UnresolvedName, span, "expected `Enum::Variant`");
            return None;
        }
        let (enum_name, variant_name) = (&segments[0], &segments[1]);
        match self.scopes.lookup_type(enum_name) {
            Some(TypeDef::Enum(eid)) => match self.arena.enum_def(eid).variant_index(variant_name) {
                Some(idx) => Some((eid, idx)),
                None => {
                    self.err(ErrorKind::UnresolvedName, span, format!("no variant `{variant_name}` on `{enum_name}`"));
                    None
                }
            },
            Some(_) => {
                self.err(ErrorKind::NotAType, span, format!("`{enum_name}` is not an enum type"));
                None
            }
            None => {
                self.err(ErrorKind::UnresolvedName, span, format!("unresolved type `{enum_name}`"));
                None
            }
        }
    }

    // -----------------------------------------------------------------
    // Type annotations
    // -----------------------------------------------------------------

    /// A `TypeAnnotation` slot is still `Unresolved` at this point, since name
    /// resolution runs before `type_query`; the only thing here worth
    /// visiting is an array size, since it's a real HIR expression that
    /// needs its own name resolution pass, same as any other expression.
    fn resolve_type_annotation(&mut self, ann: &TypeAnnotation) -> R {
        match ann {
            TypeAnnotation::Unresolved(node) => self.resolve_type_node(node),
            TypeAnnotation::Resolved(_) => Ok(()),
        }
    }

    fn resolve_type_node(&mut self, node: &TypeNode) -> R {
        match node {
            TypeNode::Path(_) | TypeNode::Primitive(_) | TypeNode::Unit => Ok(()),
            TypeNode::Array(elem, size) => {
                let elem_ok = self.resolve_type_node(elem).is_ok();
                let size_ok = self.resolve_expr(*size).is_ok();
                if elem_ok && size_ok {
                    Ok(())
                } else {
                    Err(())
                }
            }
            TypeNode::Reference(inner, _) => self.resolve_type_node(inner),
        }
    }

    // -----------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------

    fn resolve_expr(&mut self, expr_id: ExprId) -> R {
        let span = self.arena.expr(expr_id).span;
        let kind = self.arena.expr(expr_id).kind.clone();
        match kind {
            ExprKind::Literal(_) => Ok(()),
            ExprKind::Path { segments, .. } => self.resolve_path_expr(expr_id, &segments, span),
            ExprKind::Binary { lhs, rhs, .. } => {
                self.resolve_expr(lhs)?;
                self.resolve_expr(rhs)
            }
            ExprKind::Unary { operand, .. } => self.resolve_expr(operand),
            ExprKind::Call { callee, args, .. } => {
                self.resolve_expr(callee)?;
                for a in &args {
                    self.resolve_expr(*a)?;
                }
                let target = match &self.arena.expr(callee).kind {
                    ExprKind::Path { resolved: PathResolution::Function(fid), .. } => {
                        ferrosem_hir::CallTarget::Function(*fid)
                    }
                    _ => ferrosem_hir::CallTarget::NotCallable,
                };
                if let ExprKind::Call { target: slot, .. } = &mut self.arena.expr_mut(expr_id).kind {
                    *slot = target;
                }
                Ok(())
            }
            ExprKind::MethodCall { receiver, args, .. } => {
                self.resolve_expr(receiver)?;
                for a in &args {
                    self.resolve_expr(*a)?;
                }
                Ok(())
            }
            ExprKind::Field { receiver, .. } => self.resolve_expr(receiver),
            ExprKind::Index { base, index } => {
                self.resolve_expr(base)?;
                self.resolve_expr(index)
            }
            ExprKind::StructLiteral { ty, fields } => self.resolve_struct_literal(expr_id, ty, fields, span),
            ExprKind::ArrayLiteral { elems } => {
                for e in &elems {
                    self.resolve_expr(*e)?;
                }
                Ok(())
            }
            ExprKind::ArrayRepeat { value, count } => {
                self.resolve_expr(value)?;
                self.resolve_expr(count)
            }
            ExprKind::Block { stmts, final_expr } => {
                self.scopes.push(ScopeKind::Block);
                for s in &stmts {
                    if let StmtKind::Item(item) = self.arena.stmt(*s).kind {
                        self.collect_one_item(item);
                    }
                }
                let mut ok = true;
                for s in &stmts {
                    ok &= self.resolve_stmt(*s).is_ok();
                }
                if let Some(fe) = final_expr {
                    ok &= self.resolve_expr(fe).is_ok();
                }
                self.scopes.pop();
                if ok {
                    Ok(())
                } else {
                    Err(())
                }
            }
            ExprKind::If { cond, then_branch, else_branch } => {
                self.resolve_expr(cond)?;
                self.resolve_expr(then_branch)?;
                if let Some(e) = else_branch {
                    self.resolve_expr(e)?;
                }
                Ok(())
            }
            ExprKind::Loop { body } => self.resolve_expr(body),
            ExprKind::While { cond, body } => {
                self.resolve_expr(cond)?;
                self.resolve_expr(body)
            }
            ExprKind::Break { value, .. } => {
                if let Some(v) = value {
                    self.resolve_expr(v)?;
                }
                Ok(())
            }
            ExprKind::Continue { .. } => Ok(()),
            ExprKind::Return { value, .. } => {
                if let Some(v) = value {
                    self.resolve_expr(v)?;
                }
                Ok(())
            }
            ExprKind::Reference { operand, .. } => self.resolve_expr(operand),
            ExprKind::Deref { operand } => self.resolve_expr(operand),
            ExprKind::Assign { lhs, rhs } => {
                self.resolve_expr(lhs)?;
                self.resolve_expr(rhs)
            }
            ExprKind::CompoundAssign { lhs, rhs, .. } => {
                self.resolve_expr(lhs)?;
                self.resolve_expr(rhs)
            }
            ExprKind::Cast { operand, ty } => {
                self.resolve_expr(operand)?;
                self.resolve_type_annotation(&ty)
            }
        }
    }

    fn resolve_stmt(&mut self, stmt_id: StmtId) -> R {
        let kind = self.arena.stmt(stmt_id).kind.clone();
        match kind {
            StmtKind::Let { pattern, ty, init } => {
                let mut ok = true;
                if let Some(ty) = &ty {
                    ok &= self.resolve_type_annotation(ty).is_ok();
                }
                if let Some(init) = init {
                    ok &= self.resolve_expr(init).is_ok();
                }
                ok &= self.resolve_pattern(pattern).is_ok();
                if ok {
                    Ok(())
                } else {
                    Err(())
                }
            }
            StmtKind::Expr(e) => self.resolve_expr(e),
            StmtKind::Item(item) => self.resolve_item(item),
        }
    }

    fn resolve_path_expr(&mut self, expr_id: ExprId, segments: &[String], span: Span) -> R {
        let resolution = match segments.len() {
            1 => {
                let name = &segments[0];
                match self.scopes.lookup_value(name) {
                    Some(ValueDef::Local(id)) => Some(PathResolution::Local(id)),
                    Some(ValueDef::Const(id)) => Some(PathResolution::Const(id)),
                    Some(ValueDef::Function(id)) => Some(PathResolution::Function(id)),
                    None => {
                        if self.scopes.lookup_type(name).is_some() {
                            self.err(ErrorKind::NotAValue, span, format!("`{name}` is a type, not a value"));
                        } else {
                            self.err(ErrorKind::UnresolvedName, span, format!("unresolved name `{name}`"));
                        }
                        None
                    }
                }
            }
            2 => match self.resolve_qualified(&segments[0], &segments[1]) {
                Some(resolution) => Some(resolution),
                None => {
                    if self.scopes.lookup_type(&segments[0]).is_none() {
                        self.pending_type_statics.push(expr_id);
                    } else {
                        self.err(
                            ErrorKind::UnresolvedName,
                            span,
                            format!("unresolved associated item `{}::{}`", segments[0], segments[1]),
                        );
                    }
                    None
                }
            },
            _ => {
                self.err(ErrorKind::UnresolvedName, span, "unsupported path shape");
                None
            }
        };

        match resolution {
            Some(resolution) => {
                if let ExprKind::Path { resolved, .. } = &mut self.arena.expr_mut(expr_id).kind {
                    *resolved = resolution;
                }
                Ok(())
            }
            None => Err(()),
        }
    }

    fn resolve_qualified(&mut self, type_name: &str, member: &str) -> Option<PathResolution> {
        let owner = match self.scopes.lookup_type(type_name)? {
            TypeDef::Struct(sid) => StructOrEnum::Struct(sid),
            TypeDef::Enum(eid) => StructOrEnum::Enum(eid),
            TypeDef::Trait(_) | TypeDef::Alias(_) => return None,
        };
        match self.impl_table.find_assoc(owner, member) {
            Some(ferrosem_hir::AssocTarget::Function(fid)) => Some(PathResolution::Function(fid)),
            Some(ferrosem_hir::AssocTarget::Const(cid)) => Some(PathResolution::Const(cid)),
            None => None,
        }
    }

    fn resolve_struct_literal(
        &mut self,
        expr_id: ExprId,
        ty: PathLink<StructId>,
        fields: Vec<(String, ExprId)>,
        span: Span,
    ) -> R {
        let sid = match ty {
            PathLink::Resolved(sid) => Some(sid),
            PathLink::Unresolved(segments) => {
                let name = segments.last().expect("path has at least one segment");
                match self.scopes.lookup_type(name) {
                    Some(TypeDef::Struct(sid)) => Some(sid),
                    Some(_) => {
                        self.err(ErrorKind::NotAType, span, format!("`{name}` is not a struct type"));
                        None
                    }
                    None => {
                        self.err(ErrorKind::UnresolvedName, span, format!("unresolved type `{name}`"));
                        None
                    }
                }
            }
        };

        let mut ok = true;
        for (_, field_expr) in &fields {
            ok &= self.resolve_expr(*field_expr).is_ok();
        }

        let Some(sid) = sid else {
            return Err(());
        };

        let field_names: Vec<String> = self.arena.strukt(sid).fields.iter().map(|(n, _)| n.clone()).collect();

        let mut used = std::collections::HashSet::new();
        for (name, _) in &fields {
            if !used.insert(name.clone()) {
                self.err(ErrorKind::DuplicateField, span, format!("duplicate field `{name}`"));
                ok = false;
            }
            if !field_names.contains(name) {
                self.err(ErrorKind::ExtraField, span, format!("no field `{name}` on this struct"));
                ok = false;
            }
        }
        let mut canonical = Vec::with_capacity(field_names.len());
        for name in &field_names {
            match fields.iter().find(|(n, _)| n == name) {
                Some((_, expr)) => canonical.push((name.clone(), *expr)),
                None => {
                    self.err(ErrorKind::MissingField, span, format!("missing field `{name}`"));
                    ok = false;
                }
            }
        }

        if ok {
            self.arena.expr_mut(expr_id).kind =
                ExprKind::StructLiteral { ty: PathLink::Resolved(sid), fields: canonical };
            Ok(())
        } else {
            Err(())
        }
    }

    fn finalize_type_statics(&mut self) {
        let pending = std::mem::take(&mut self.pending_type_statics);
        for expr_id in pending {
            let (segments, span) = match &self.arena.expr(expr_id).kind {
                ExprKind::Path { segments, .. } => (segments.clone(), self.arena.expr(expr_id).span),
                _ => continue,
            };
            match self.resolve_qualified(&segments[0], &segments[1]) {
                Some(resolution) => {
                    if let ExprKind::Path { resolved, .. } = &mut self.arena.expr_mut(expr_id).kind {
                        *resolved = resolution;
                    }
                }
                None => {
                    self.err(
                        ErrorKind::UnresolvedName,
                        span,
                        format!("unresolved associated item `{}::{}`", segments[0], segments[1]),
                    );
                }
            }
        }
    }
}
