//! `expr_query` and the expression checker it delegates to,
//! plus the per-item drivers (`check_item` and friends) that walk a whole
//! `Program` invoking it.

use ferrosem_common::diagnostics::ErrorKind;
use ferrosem_common::Span;
use ferrosem_hir::{
    AssocItemRef, BinOp, ConstVariant, EnumDef, EnumId, EnumVariant, ExprId, ExprInfo,
    ExprKind, FunctionId, FunctionLike, ImplId, ItemRef, MethodId, Param, Place, SelfKind,
    StmtKind, StructId, StructOrEnum, TraitId, TypeAliasId, TypeAnnotation, UnOp,
};
use ferrosem_types::{NominalKind, PrimitiveKind};

use crate::coerce;
use crate::query::{ExpectationKind, QueryService, TypeExpectation};

impl<'a> QueryService<'a> {
    // -----------------------------------------------------------------
    // Top-level item drivers
    // -----------------------------------------------------------------

    /// Checks one top-level item, resetting the fail-fast flag first so a
    /// failure in a previous item doesn't bleed into this one.
    pub fn check_item(&mut self, item: ItemRef) {
        self.item_failed = false;
        self.check_item_inline(item);
    }

    fn check_item_inline(&mut self, item: ItemRef) {
        match item {
            ItemRef::Function(fid) => self.check_function(fid),
            ItemRef::Const(cid) => {
                self.const_query_def(cid);
            }
            ItemRef::Impl(iid) => self.check_impl(iid),
            ItemRef::Trait(tid) => self.check_trait(tid),
            ItemRef::Struct(sid) => self.check_struct(sid),
            ItemRef::Enum(eid) => self.check_enum(eid),
            ItemRef::TypeAlias(taid) => self.check_type_alias(taid),
        }
    }

    fn check_function(&mut self, fid: FunctionId) {
        let params = self.arena.function(fid).params.clone();
        let new_params = self.check_params(params);
        self.arena.function_mut(fid).params = new_params;
        let span = self.arena.function(fid).span;
        let ret_ty = self.function_like_return_type(FunctionLike::Function(fid), span);
        let body = self.arena.function(fid).body;
        let info = self.expr_query(body, TypeExpectation::exact(ret_ty));
        if info.has_type && !info.can_diverge && !coerce::is_assignable_to(self.universe, info.ty, ret_ty) {
            self.err(ErrorKind::TypeMismatch, span, "function body type does not match its return type");
        }
    }

    fn check_method(&mut self, mid: MethodId) {
        let owner = self.arena.method(mid).owner;
        let owner_ty = match owner {
            StructOrEnum::Struct(sid) => self.universe.struct_of(sid.0),
            StructOrEnum::Enum(eid) => self.universe.enum_of(eid.0),
        };
        let self_ty = match self.arena.method(mid).self_kind {
            SelfKind::Value => owner_ty,
            SelfKind::Ref => self.universe.reference(owner_ty, false),
            SelfKind::RefMut => self.universe.reference(owner_ty, true),
        };
        if let ferrosem_hir::BindingLink::Resolved(lid) = self.arena.method(mid).self_local {
            self.arena.local_mut(lid).type_annotation = TypeAnnotation::Resolved(self_ty);
        }
        let params = self.arena.method(mid).params.clone();
        let new_params = self.check_params(params);
        self.arena.method_mut(mid).params = new_params;
        let span = self.arena.method(mid).span;
        let ret_ty = self.function_like_return_type(FunctionLike::Method(mid), span);
        let body = self.arena.method(mid).body;
        let info = self.expr_query(body, TypeExpectation::exact(ret_ty));
        if info.has_type && !info.can_diverge && !coerce::is_assignable_to(self.universe, info.ty, ret_ty) {
            self.err(ErrorKind::TypeMismatch, span, "method body type does not match its return type");
        }
    }

    fn check_params(&mut self, params: Vec<Param>) -> Vec<Param> {
        let mut out = Vec::with_capacity(params.len());
        for p in params {
            let tid = self.type_query(&p.ty, p.span);
            self.bind_pattern_type(p.pattern, tid);
            out.push(Param { pattern: p.pattern, ty: TypeAnnotation::Resolved(tid), span: p.span });
        }
        out
    }

    fn check_impl(&mut self, iid: ImplId) {
        let target_ann = self.arena.impl_def(iid).target.clone();
        let span = self.arena.impl_def(iid).span;
        let tid = self.type_query(&target_ann, span);
        self.arena.impl_def_mut(iid).target = TypeAnnotation::Resolved(tid);

        let methods = self.arena.impl_def(iid).methods.clone();
        let assoc_functions = self.arena.impl_def(iid).assoc_functions.clone();
        let assoc_consts = self.arena.impl_def(iid).assoc_consts.clone();
        let prev_self_type = self.self_type.replace(tid);
        for mid in methods {
            self.check_method(mid);
        }
        for fid in assoc_functions {
            self.check_function(fid);
        }
        for cid in assoc_consts {
            self.const_query_def(cid);
        }
        self.self_type = prev_self_type;
    }

    fn check_trait(&mut self, tid: TraitId) {
        let items = self.arena.trait_def(tid).items.clone();
        for item in items {
            match item {
                AssocItemRef::Function(fid) => self.check_function(fid),
                AssocItemRef::Const(cid) => {
                    self.const_query_def(cid);
                }
            }
        }
    }

    fn check_struct(&mut self, sid: StructId) {
        let span = self.arena.strukt(sid).span;
        let fields = self.arena.strukt(sid).fields.clone();
        let mut new_fields = Vec::with_capacity(fields.len());
        for (name, ann) in fields {
            let tid = self.type_query(&ann, span);
            new_fields.push((name, TypeAnnotation::Resolved(tid)));
        }
        self.arena.strukt_mut(sid).fields = new_fields;
    }

    fn check_enum(&mut self, eid: EnumId) {
        let span = self.arena.enum_def(eid).span;
        let variants = self.arena.enum_def(eid).variants.clone();
        let mut new_variants = Vec::with_capacity(variants.len());
        for v in variants {
            let payload = v.payload.map(|ann| TypeAnnotation::Resolved(self.type_query(&ann, span)));
            new_variants.push(EnumVariant { name: v.name, payload });
        }
        self.arena.enum_def_mut(eid).variants = new_variants;
        let _: &EnumDef = self.arena.enum_def(eid);
    }

    fn check_type_alias(&mut self, taid: TypeAliasId) {
        let ann = self.arena.type_alias(taid).ty.clone();
        let span = self.arena.type_alias(taid).span;
        let tid = self.type_query(&ann, span);
        self.arena.type_alias_mut(taid).ty = TypeAnnotation::Resolved(tid);
    }

    fn function_like_return_type(&mut self, func: FunctionLike, span: Span) -> ferrosem_types::TypeId {
        match func {
            FunctionLike::Function(fid) => match self.arena.function(fid).ret.clone() {
                Some(ann) => {
                    let tid = self.type_query(&ann, span);
                    self.arena.function_mut(fid).ret = Some(TypeAnnotation::Resolved(tid));
                    tid
                }
                None => self.universe.unit(),
            },
            FunctionLike::Method(mid) => match self.arena.method(mid).ret.clone() {
                Some(ann) => {
                    let tid = self.type_query(&ann, span);
                    self.arena.method_mut(mid).ret = Some(TypeAnnotation::Resolved(tid));
                    tid
                }
                None => self.universe.unit(),
            },
        }
    }

    fn is_exit_call(&self, fid: FunctionId) -> bool {
        fid == self.exit_fn
    }

    // -----------------------------------------------------------------
    // expr_query
    // -----------------------------------------------------------------

    pub fn expr_query(&mut self, expr_id: ExprId, expectation: TypeExpectation) -> ExprInfo {
        if let Some(info) = self.arena.expr(expr_id).info.clone() {
            let reuse = match expectation.kind {
                ExpectationKind::None => true,
                ExpectationKind::ExactType(t) => info.has_type && coerce::is_assignable_to(self.universe, info.ty, t),
                ExpectationKind::ExactConst(t) => {
                    info.has_type && coerce::is_assignable_to(self.universe, info.ty, t) && info.const_value.is_some()
                }
            };
            if reuse {
                return info;
            }
        }
        let info = self.check_expr(expr_id, &expectation);
        self.arena.expr_mut(expr_id).info = Some(info.clone());
        info
    }

    fn finalize_and_cache(&mut self, expr_id: ExprId, info: ExprInfo) -> ExprInfo {
        if self.universe.is_integer_placeholder(info.ty) {
            let mut info = info;
            info.ty = coerce::finalize_placeholder(self.universe, info.ty);
            self.arena.expr_mut(expr_id).info = Some(info.clone());
            info
        } else {
            info
        }
    }

    // -----------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------

    fn check_stmt(&mut self, stmt_id: ferrosem_hir::StmtId) -> bool {
        if self.item_failed {
            return false;
        }
        let kind = self.arena.stmt(stmt_id).kind.clone();
        match kind {
            StmtKind::Let { pattern, ty, init } => {
                let span = self.arena.stmt(stmt_id).span;
                let expected_ty = ty.map(|ann| self.type_query(&ann, span));
                let (final_ty, diverges) = match (init, expected_ty) {
                    (Some(init_expr), Some(expected)) => {
                        let info = self.expr_query(init_expr, TypeExpectation::exact(expected));
                        if info.has_type && !coerce::is_assignable_to(self.universe, info.ty, expected) {
                            self.err(ErrorKind::TypeMismatch, span, "let initializer does not match declared type");
                        }
                        (expected, info.can_diverge)
                    }
                    (Some(init_expr), None) => {
                        let info = self.expr_query(init_expr, TypeExpectation::none());
                        (coerce::finalize_placeholder(self.universe, info.ty), info.can_diverge)
                    }
                    (None, Some(expected)) => (expected, false),
                    (None, None) => {
                        self.err(ErrorKind::TypeMismatch, span, "let binding needs a type annotation or an initializer");
                        (ferrosem_types::TypeId::INVALID, false)
                    }
                };
                self.bind_pattern_type(pattern, final_ty);
                diverges
            }
            StmtKind::Expr(e) => {
                let info = self.expr_query(e, TypeExpectation::none());
                let info = self.finalize_and_cache(e, info);
                info.can_diverge
            }
            StmtKind::Item(item) => {
                self.check_item_inline(item);
                false
            }
        }
    }

    // -----------------------------------------------------------------
    // The expression checker
    // -----------------------------------------------------------------

    fn check_expr(&mut self, expr_id: ExprId, expectation: &TypeExpectation) -> ExprInfo {
        if self.item_failed {
            return ExprInfo::failed();
        }
        let span = self.arena.expr(expr_id).span;
        if self.expr_check_depth >= ferrosem_common::limits::MAX_EXPR_CHECK_DEPTH {
            self.err(ErrorKind::InvalidOperation, span, "expression nested too deeply");
            return ExprInfo::failed();
        }
        self.expr_check_depth += 1;
        let result = self.check_expr_inner(expr_id, expectation, span);
        self.expr_check_depth -= 1;
        result
    }

    fn check_expr_inner(&mut self, expr_id: ExprId, expectation: &TypeExpectation, span: Span) -> ExprInfo {
        let kind = self.arena.expr(expr_id).kind.clone();
        match kind {
            ExprKind::Literal(lit) => self.check_literal(&lit, expectation, span),
            ExprKind::Path { resolved, .. } => self.check_path(resolved, span),
            ExprKind::Binary { op, lhs, rhs } => self.check_binary(op, lhs, rhs, expectation, span),
            ExprKind::Unary { op, operand } => self.check_unary(op, operand, expectation, span),
            ExprKind::Call { args, target, .. } => self.check_call(target, &args, span),
            ExprKind::MethodCall { receiver, method, args, .. } => {
                self.check_method_call(expr_id, receiver, &method, &args, span)
            }
            ExprKind::Field { receiver, field } => self.check_field(receiver, &field, span),
            ExprKind::Index { base, index } => self.check_index(base, index, span),
            ExprKind::StructLiteral { ty, fields } => self.check_struct_literal(ty, &fields, span),
            ExprKind::ArrayLiteral { elems } => self.check_array_literal(&elems, expectation, span),
            ExprKind::ArrayRepeat { value, count } => self.check_array_repeat(value, count, expectation, span),
            ExprKind::Block { stmts, final_expr } => self.check_block(&stmts, final_expr, expectation),
            ExprKind::If { cond, then_branch, else_branch } => {
                self.check_if(cond, then_branch, else_branch, expectation, span)
            }
            ExprKind::Loop { body } => self.check_loop(expr_id, body),
            ExprKind::While { cond, body } => self.check_while(cond, body, span),
            ExprKind::Break { value, target } => self.check_break(value, target, span),
            ExprKind::Continue { target } => self.check_continue(target, span),
            ExprKind::Return { value, target } => self.check_return(value, target, span),
            ExprKind::Reference { mutable, operand } => self.check_reference(mutable, operand, span),
            ExprKind::Deref { operand } => self.check_deref(operand, span),
            ExprKind::Assign { lhs, rhs } => self.check_assign(lhs, rhs, span),
            ExprKind::CompoundAssign { lhs, rhs, .. } => self.check_compound_assign(lhs, rhs, span),
            ExprKind::Cast { operand, ty } => self.check_cast(expr_id, operand, ty, span),
        }
    }

    fn check_literal(&mut self, lit: &ferrosem_hir::Literal, expectation: &TypeExpectation, span: Span) -> ExprInfo {
        let expected = expectation.expected();
        let nat = self.natural_literal_type(lit, expected);
        let ty = match expected {
            Some(t) if coerce::is_assignable_to(self.universe, nat, t) => t,
            Some(_) => {
                self.err(ErrorKind::TypeMismatch, span, "literal does not match the expected type");
                nat
            }
            None => nat,
        };
        let const_value = self.literal_const_value(lit, expected);
        ExprInfo { ty, has_type: true, is_mutable: false, place: Place::Value, can_diverge: false, const_value }
    }

    fn check_path(&mut self, resolved: ferrosem_hir::PathResolution, span: Span) -> ExprInfo {
        use ferrosem_hir::PathResolution;
        match resolved {
            PathResolution::Local(lid) => {
                let (mutable, ann, local_span) = {
                    let local = self.arena.local(lid);
                    (local.mutable, local.type_annotation.clone(), local.span)
                };
                let ty = self.type_query(&ann, local_span);
                self.arena.local_mut(lid).type_annotation = TypeAnnotation::Resolved(ty);
                ExprInfo { ty, has_type: true, is_mutable: mutable, place: Place::Place, can_diverge: false, const_value: None }
            }
            PathResolution::Const(cid) => {
                let ann = self.arena.const_def(cid).ty.clone();
                let const_span = self.arena.const_def(cid).span;
                let ty = self.type_query(&ann, const_span);
                self.arena.const_def_mut(cid).ty = TypeAnnotation::Resolved(ty);
                let const_value = self.const_query_def(cid);
                ExprInfo { ty, has_type: true, is_mutable: false, place: Place::Value, can_diverge: false, const_value }
            }
            PathResolution::Function(_) => {
                self.err(ErrorKind::NotAValue, span, "a function name cannot be used as a value in this language");
                ExprInfo::failed()
            }
            PathResolution::Unresolved => ExprInfo::failed(),
        }
    }

    fn check_binary(&mut self, op: BinOp, lhs: ExprId, rhs: ExprId, expectation: &TypeExpectation, span: Span) -> ExprInfo {
        if op.is_logical() {
            let bool_ty = self.universe.primitive(PrimitiveKind::Bool);
            let l = self.expr_query(lhs, TypeExpectation::exact(bool_ty));
            let r = self.expr_query(rhs, TypeExpectation::exact(bool_ty));
            if l.has_type && !coerce::is_assignable_to(self.universe, l.ty, bool_ty) {
                self.err(ErrorKind::TypeMismatch, span, "logical operator requires a bool operand");
            }
            if r.has_type && !coerce::is_assignable_to(self.universe, r.ty, bool_ty) {
                self.err(ErrorKind::TypeMismatch, span, "logical operator requires a bool operand");
            }
            let const_value = match (&l.const_value, &r.const_value) {
                (Some(ConstVariant::BoolConst(a)), Some(ConstVariant::BoolConst(b))) => {
                    Some(ConstVariant::BoolConst(fold_logical(op, *a, *b)))
                }
                _ => None,
            };
            return ExprInfo {
                ty: bool_ty,
                has_type: true,
                is_mutable: false,
                place: Place::Value,
                can_diverge: l.can_diverge || r.can_diverge,
                const_value,
            };
        }

        if op.is_comparison() {
            let l = self.expr_query(lhs, TypeExpectation::none());
            let r = self.expr_query(rhs, TypeExpectation::none());
            let bool_ty = self.universe.primitive(PrimitiveKind::Bool);
            if !self.universe.is_numeric(l.ty) || !self.universe.is_numeric(r.ty) {
                self.err(ErrorKind::InvalidOperation, span, "comparison requires numeric operands");
            }
            let const_value = match (&l.const_value, &r.const_value) {
                (Some(a), Some(b)) => fold_compare(op, a, b).map(ConstVariant::BoolConst),
                _ => None,
            };
            return ExprInfo {
                ty: bool_ty,
                has_type: true,
                is_mutable: false,
                place: Place::Value,
                can_diverge: l.can_diverge || r.can_diverge,
                const_value,
            };
        }

        // Arithmetic.
        let shared_expectation = match expectation.expected() {
            Some(t) if self.universe.is_integer(t) => TypeExpectation::exact(t),
            _ => TypeExpectation::none(),
        };
        let l = self.expr_query(lhs, shared_expectation);
        let shared = expectation.expected().filter(|&t| self.universe.is_integer(t)).unwrap_or(l.ty);
        let r = self.expr_query(rhs, TypeExpectation::exact(shared));
        if !self.universe.is_integer(l.ty) || !self.universe.is_integer(r.ty) {
            self.err(ErrorKind::InvalidOperation, span, "arithmetic requires integer operands");
        }
        let result_ty = match coerce::unify(self.universe, l.ty, r.ty) {
            Some(t) => t,
            None => {
                self.err(ErrorKind::TypeMismatch, span, "operand types do not match");
                l.ty
            }
        };
        let const_value = match (&l.const_value, &r.const_value) {
            (Some(a), Some(b)) => fold_arith(self.universe, op, result_ty, a, b),
            _ => None,
        };
        ExprInfo {
            ty: result_ty,
            has_type: true,
            is_mutable: false,
            place: Place::Value,
            can_diverge: l.can_diverge || r.can_diverge,
            const_value,
        }
    }

    fn check_unary(&mut self, op: UnOp, operand: ExprId, expectation: &TypeExpectation, span: Span) -> ExprInfo {
        match op {
            UnOp::Neg => {
                let info = self.expr_query(operand, *expectation);
                if !self.universe.is_integer(info.ty) {
                    self.err(ErrorKind::InvalidOperation, span, "unary `-` requires an integer operand");
                }
                let const_value = info.const_value.as_ref().and_then(fold_neg);
                ExprInfo {
                    ty: info.ty,
                    has_type: info.has_type,
                    is_mutable: false,
                    place: Place::Value,
                    can_diverge: info.can_diverge,
                    const_value,
                }
            }
            UnOp::Not => {
                let bool_ty = self.universe.primitive(PrimitiveKind::Bool);
                let info = self.expr_query(operand, TypeExpectation::exact(bool_ty));
                if info.has_type && !coerce::is_assignable_to(self.universe, info.ty, bool_ty) {
                    self.err(ErrorKind::TypeMismatch, span, "unary `!` requires a bool operand");
                }
                let const_value = match &info.const_value {
                    Some(ConstVariant::BoolConst(b)) => Some(ConstVariant::BoolConst(!b)),
                    _ => None,
                };
                ExprInfo {
                    ty: bool_ty,
                    has_type: true,
                    is_mutable: false,
                    place: Place::Value,
                    can_diverge: info.can_diverge,
                    const_value,
                }
            }
        }
    }

    fn check_call(&mut self, target: ferrosem_hir::CallTarget, args: &[ExprId], span: Span) -> ExprInfo {
        use ferrosem_hir::CallTarget;
        match target {
            CallTarget::Function(fid) => {
                let params = self.arena.function(fid).params.clone();
                let fn_span = self.arena.function(fid).span;
                let ret_ty = self.function_like_return_type(FunctionLike::Function(fid), fn_span);
                if params.len() != args.len() {
                    self.err(
                        ErrorKind::ArityMismatch,
                        span,
                        format!("expected {} argument(s), found {}", params.len(), args.len()),
                    );
                }
                for (i, arg) in args.iter().enumerate() {
                    if let Some(p) = params.get(i) {
                        let pty = self.type_query(&p.ty, p.span);
                        let info = self.expr_query(*arg, TypeExpectation::exact(pty));
                        if info.has_type && !coerce::is_assignable_to(self.universe, info.ty, pty) {
                            self.err(ErrorKind::TypeMismatch, span, "argument type does not match parameter type");
                        }
                    } else {
                        self.expr_query(*arg, TypeExpectation::none());
                    }
                }
                let diverges = self.is_exit_call(fid);
                let ty = if diverges { self.universe.never() } else { ret_ty };
                ExprInfo { ty, has_type: true, is_mutable: false, place: Place::Value, can_diverge: diverges, const_value: None }
            }
            CallTarget::NotCallable | CallTarget::Unresolved => {
                for a in args {
                    self.expr_query(*a, TypeExpectation::none());
                }
                if matches!(target, CallTarget::NotCallable) {
                    self.err(ErrorKind::InvalidOperation, span, "expression is not callable");
                }
                ExprInfo::failed()
            }
        }
    }

    fn check_method_call(&mut self, expr_id: ExprId, receiver: ExprId, method: &str, args: &[ExprId], span: Span) -> ExprInfo {
        let recv_info = self.expr_query(receiver, TypeExpectation::none());
        let mut owner_ty = recv_info.ty;
        if self.universe.is_reference(owner_ty) {
            owner_ty = self.universe.referenced(owner_ty).expect("checked is_reference above");
        }
        let owner = match self.universe.nominal_parts(owner_ty) {
            Some((NominalKind::Struct, id)) => Some(StructOrEnum::Struct(StructId(id))),
            Some((NominalKind::Enum, id)) => Some(StructOrEnum::Enum(EnumId(id))),
            None => None,
        };
        let Some(owner) = owner else {
            self.err(ErrorKind::NotAValue, span, format!("no method `{method}` on this type"));
            for a in args {
                self.expr_query(*a, TypeExpectation::none());
            }
            return ExprInfo::failed();
        };
        let Some(mid) = self.impl_table.find_method(owner, method) else {
            self.err(ErrorKind::UnresolvedName, span, format!("no method `{method}` on this type"));
            for a in args {
                self.expr_query(*a, TypeExpectation::none());
            }
            return ExprInfo::failed();
        };
        if let ExprKind::MethodCall { resolved, .. } = &mut self.arena.expr_mut(expr_id).kind {
            *resolved = Some(mid);
        }

        let params = self.arena.method(mid).params.clone();
        let method_span = self.arena.method(mid).span;
        let ret_ty = self.function_like_return_type(FunctionLike::Method(mid), method_span);
        if params.len() != args.len() {
            self.err(
                ErrorKind::ArityMismatch,
                span,
                format!("expected {} argument(s), found {}", params.len(), args.len()),
            );
        }
        for (i, arg) in args.iter().enumerate() {
            if let Some(p) = params.get(i) {
                let pty = self.type_query(&p.ty, p.span);
                let info = self.expr_query(*arg, TypeExpectation::exact(pty));
                if info.has_type && !coerce::is_assignable_to(self.universe, info.ty, pty) {
                    self.err(ErrorKind::TypeMismatch, span, "argument type does not match parameter type");
                }
            } else {
                self.expr_query(*arg, TypeExpectation::none());
            }
        }
        ExprInfo { ty: ret_ty, has_type: true, is_mutable: false, place: Place::Value, can_diverge: false, const_value: None }
    }

    fn check_field(&mut self, receiver: ExprId, field: &str, span: Span) -> ExprInfo {
        let recv_info = self.expr_query(receiver, TypeExpectation::none());
        let mut ty = recv_info.ty;
        let mut mutable = recv_info.is_mutable;
        if self.universe.is_reference(ty) {
            mutable = self.universe.is_mutable_reference(ty);
            ty = self.universe.referenced(ty).expect("checked is_reference above");
        }
        match self.universe.nominal_parts(ty) {
            Some((NominalKind::Struct, id)) => {
                let sid = StructId(id);
                let fields = self.arena.strukt(sid).fields.clone();
                match fields.iter().find(|(n, _)| n == field) {
                    Some((_, ann)) => {
                        let fty = self.type_query(ann, span);
                        ExprInfo { ty: fty, has_type: true, is_mutable: mutable, place: Place::Place, can_diverge: false, const_value: None }
                    }
                    None => {
                        self.err(ErrorKind::UnresolvedName, span, format!("no field `{field}` on this struct"));
                        ExprInfo::failed()
                    }
                }
            }
            _ => {
                self.err(ErrorKind::NotAValue, span, "field access on a non-struct type");
                ExprInfo::failed()
            }
        }
    }

    fn check_index(&mut self, base: ExprId, index: ExprId, span: Span) -> ExprInfo {
        let base_info = self.expr_query(base, TypeExpectation::none());
        let mut ty = base_info.ty;
        let mut mutable = base_info.is_mutable;
        if self.universe.is_reference(ty) {
            mutable = self.universe.is_mutable_reference(ty);
            ty = self.universe.referenced(ty).expect("checked is_reference above");
        }
        let usize_ty = self.universe.primitive(PrimitiveKind::Usize);
        let idx_info = self.expr_query(index, TypeExpectation::exact(usize_ty));
        if idx_info.has_type && !coerce::is_assignable_to(self.universe, idx_info.ty, usize_ty) {
            self.err(ErrorKind::TypeMismatch, span, "index must be usize");
        }
        match self.universe.array_parts(ty) {
            Some((elem, _)) => ExprInfo { ty: elem, has_type: true, is_mutable: mutable, place: Place::Place, can_diverge: false, const_value: None },
            None => {
                self.err(ErrorKind::InvalidOperation, span, "indexing a non-array type");
                ExprInfo::failed()
            }
        }
    }

    fn check_struct_literal(&mut self, ty: ferrosem_hir::PathLink<StructId>, fields: &[(String, ExprId)], span: Span) -> ExprInfo {
        use ferrosem_hir::PathLink;
        let PathLink::Resolved(sid) = ty else {
            self.err(ErrorKind::NotAType, span, "unresolved struct literal type");
            return ExprInfo::failed();
        };
        let struct_fields = self.arena.strukt(sid).fields.clone();
        for ((_, ann), (_, expr)) in struct_fields.iter().zip(fields.iter()) {
            let fty = self.type_query(ann, span);
            let info = self.expr_query(*expr, TypeExpectation::exact(fty));
            if info.has_type && !coerce::is_assignable_to(self.universe, info.ty, fty) {
                self.err(ErrorKind::TypeMismatch, span, "struct literal field type mismatch");
            }
        }
        let ty = self.universe.struct_of(sid.0);
        ExprInfo { ty, has_type: true, is_mutable: false, place: Place::Value, can_diverge: false, const_value: None }
    }

    fn check_array_literal(&mut self, elems: &[ExprId], expectation: &TypeExpectation, span: Span) -> ExprInfo {
        if elems.is_empty() {
            return match expectation.expected().filter(|&t| self.universe.is_array(t)) {
                Some(t) => ExprInfo { ty: t, has_type: true, is_mutable: false, place: Place::Value, can_diverge: false, const_value: None },
                None => {
                    self.err(ErrorKind::TypeMismatch, span, "cannot infer the element type of an empty array literal");
                    ExprInfo::failed()
                }
            };
        }
        let expected_elem = expectation.expected().and_then(|t| self.universe.array_parts(t)).map(|(e, _)| e);
        let elem_expectation = expected_elem.map_or_else(TypeExpectation::none, TypeExpectation::exact);
        let first_info = self.expr_query(elems[0], elem_expectation);
        let mut elem_ty = first_info.ty;
        let mut ok = first_info.has_type;
        for e in &elems[1..] {
            let info = self.expr_query(*e, elem_expectation);
            ok &= info.has_type;
            match coerce::unify(self.universe, elem_ty, info.ty) {
                Some(u) => elem_ty = u,
                None => {
                    self.err(ErrorKind::TypeMismatch, span, "array elements have incompatible types");
                    ok = false;
                }
            }
        }
        let ty = self.universe.array(elem_ty, elems.len() as u64);
        ExprInfo { ty, has_type: ok, is_mutable: false, place: Place::Value, can_diverge: false, const_value: None }
    }

    fn check_array_repeat(&mut self, value: ExprId, count: ExprId, expectation: &TypeExpectation, span: Span) -> ExprInfo {
        let expected_elem = expectation.expected().and_then(|t| self.universe.array_parts(t)).map(|(e, _)| e);
        let value_expectation = expected_elem.map_or_else(TypeExpectation::none, TypeExpectation::exact);
        let val_info = self.expr_query(value, value_expectation);
        let usize_ty = self.universe.primitive(PrimitiveKind::Usize);
        let n = match self.const_query(count, usize_ty) {
            Some(ConstVariant::UintConst(n)) => n as u64,
            _ => {
                self.err(ErrorKind::ConstRequirementFailed, span, "array repeat count must be a constant usize");
                0
            }
        };
        let ty = self.universe.array(val_info.ty, n);
        ExprInfo { ty, has_type: val_info.has_type, is_mutable: false, place: Place::Value, can_diverge: false, const_value: None }
    }

    fn check_block(&mut self, stmts: &[ferrosem_hir::StmtId], final_expr: Option<ExprId>, expectation: &TypeExpectation) -> ExprInfo {
        let mut diverges = false;
        for s in stmts {
            diverges |= self.check_stmt(*s);
        }
        let ty = match final_expr {
            Some(fe) => {
                let info = self.expr_query(fe, *expectation);
                let info = self.finalize_and_cache(fe, info);
                diverges |= info.can_diverge;
                info.ty
            }
            None => self.universe.unit(),
        };
        ExprInfo { ty, has_type: true, is_mutable: false, place: Place::Value, can_diverge: diverges, const_value: None }
    }

    fn check_if(
        &mut self,
        cond: ExprId,
        then_branch: ExprId,
        else_branch: Option<ExprId>,
        expectation: &TypeExpectation,
        span: Span,
    ) -> ExprInfo {
        let bool_ty = self.universe.primitive(PrimitiveKind::Bool);
        let cond_info = self.expr_query(cond, TypeExpectation::exact(bool_ty));
        if cond_info.has_type && !coerce::is_assignable_to(self.universe, cond_info.ty, bool_ty) {
            self.err(ErrorKind::TypeMismatch, span, "if condition must be bool");
        }
        let then_info = self.expr_query(then_branch, *expectation);
        match else_branch {
            Some(e) => {
                let else_info = self.expr_query(e, *expectation);
                let ty = match coerce::unify(self.universe, then_info.ty, else_info.ty) {
                    Some(t) => t,
                    None => {
                        self.err(ErrorKind::TypeMismatch, span, "if branches have incompatible types");
                        ferrosem_types::TypeId::INVALID
                    }
                };
                ExprInfo {
                    ty,
                    has_type: !ty.is_invalid(),
                    is_mutable: false,
                    place: Place::Value,
                    can_diverge: then_info.can_diverge && else_info.can_diverge,
                    const_value: None,
                }
            }
            None => {
                let unit = self.universe.unit();
                if !coerce::is_assignable_to(self.universe, then_info.ty, unit) {
                    self.err(ErrorKind::TypeMismatch, span, "`if` without `else` must have a unit-typed branch");
                }
                ExprInfo { ty: unit, has_type: true, is_mutable: false, place: Place::Value, can_diverge: false, const_value: None }
            }
        }
    }

    fn check_loop(&mut self, expr_id: ExprId, body: ExprId) -> ExprInfo {
        self.arena.expr_mut(expr_id).loop_break_ty = None;
        let unit = self.universe.unit();
        self.expr_query(body, TypeExpectation::exact(unit));
        match self.arena.expr(expr_id).loop_break_ty {
            Some(t) => ExprInfo { ty: t, has_type: true, is_mutable: false, place: Place::Value, can_diverge: false, const_value: None },
            None => {
                let never = self.universe.never();
                ExprInfo { ty: never, has_type: true, is_mutable: false, place: Place::Value, can_diverge: true, const_value: None }
            }
        }
    }

    fn check_while(&mut self, cond: ExprId, body: ExprId, span: Span) -> ExprInfo {
        let bool_ty = self.universe.primitive(PrimitiveKind::Bool);
        let cond_info = self.expr_query(cond, TypeExpectation::exact(bool_ty));
        if cond_info.has_type && !coerce::is_assignable_to(self.universe, cond_info.ty, bool_ty) {
            self.err(ErrorKind::TypeMismatch, span, "while condition must be bool");
        }
        let unit = self.universe.unit();
        self.expr_query(body, TypeExpectation::exact(unit));
        ExprInfo { ty: unit, has_type: true, is_mutable: false, place: Place::Value, can_diverge: false, const_value: None }
    }

    fn check_break(&mut self, value: Option<ExprId>, target: ferrosem_hir::FlowTarget<ExprId>, span: Span) -> ExprInfo {
        use ferrosem_hir::FlowTarget;
        let FlowTarget::Resolved(loop_id) = target else {
            self.err(ErrorKind::InvalidControlFlow, span, "`break` outside a loop");
            return ExprInfo::failed();
        };
        let current = self.arena.expr(loop_id).loop_break_ty;
        let value_expectation = current.map_or_else(TypeExpectation::none, TypeExpectation::exact);
        let v_ty = match value {
            Some(v) => self.expr_query(v, value_expectation).ty,
            None => self.universe.unit(),
        };
        let new_ty = match current {
            None => v_ty,
            Some(t) => coerce::unify(self.universe, t, v_ty).unwrap_or_else(|| {
                self.err(ErrorKind::TypeMismatch, span, "break value does not match this loop's other break values");
                t
            }),
        };
        self.arena.expr_mut(loop_id).loop_break_ty = Some(new_ty);
        let never = self.universe.never();
        ExprInfo { ty: never, has_type: true, is_mutable: false, place: Place::Value, can_diverge: true, const_value: None }
    }

    fn check_continue(&mut self, target: ferrosem_hir::FlowTarget<ExprId>, span: Span) -> ExprInfo {
        use ferrosem_hir::FlowTarget;
        if matches!(target, FlowTarget::Unlinked) {
            self.err(ErrorKind::InvalidControlFlow, span, "`continue` outside a loop");
            return ExprInfo::failed();
        }
        let never = self.universe.never();
        ExprInfo { ty: never, has_type: true, is_mutable: false, place: Place::Value, can_diverge: true, const_value: None }
    }

    fn check_return(&mut self, value: Option<ExprId>, target: ferrosem_hir::FlowTarget<FunctionLike>, span: Span) -> ExprInfo {
        use ferrosem_hir::FlowTarget;
        let FlowTarget::Resolved(func) = target else {
            self.err(ErrorKind::InvalidControlFlow, span, "`return` outside a function");
            return ExprInfo::failed();
        };
        let ret_ty = self.function_like_return_type(func, span);
        let v_ty = match value {
            Some(v) => self.expr_query(v, TypeExpectation::exact(ret_ty)).ty,
            None => self.universe.unit(),
        };
        if !coerce::is_assignable_to(self.universe, v_ty, ret_ty) {
            self.err(ErrorKind::TypeMismatch, span, "return value does not match the function's return type");
        }
        let never = self.universe.never();
        ExprInfo { ty: never, has_type: true, is_mutable: false, place: Place::Value, can_diverge: true, const_value: None }
    }

    fn check_reference(&mut self, mutable: bool, operand: ExprId, span: Span) -> ExprInfo {
        let info = self.expr_query(operand, TypeExpectation::none());
        if info.place != Place::Place {
            self.err(ErrorKind::MutabilityViolation, span, "cannot take a reference to a value that is not a place");
        }
        if mutable && !info.is_mutable {
            self.err(ErrorKind::MutabilityViolation, span, "cannot take a mutable reference to an immutable place");
        }
        let ty = self.universe.reference(info.ty, mutable);
        ExprInfo { ty, has_type: info.has_type, is_mutable: false, place: Place::Value, can_diverge: info.can_diverge, const_value: None }
    }

    fn check_deref(&mut self, operand: ExprId, span: Span) -> ExprInfo {
        let info = self.expr_query(operand, TypeExpectation::none());
        match self.universe.referenced(info.ty) {
            Some(inner) => {
                let mutable = self.universe.is_mutable_reference(info.ty);
                ExprInfo { ty: inner, has_type: true, is_mutable: mutable, place: Place::Place, can_diverge: info.can_diverge, const_value: None }
            }
            None => {
                self.err(ErrorKind::InvalidOperation, span, "cannot dereference a non-reference type");
                ExprInfo::failed()
            }
        }
    }

    fn check_assign(&mut self, lhs: ExprId, rhs: ExprId, span: Span) -> ExprInfo {
        let l = self.expr_query(lhs, TypeExpectation::none());
        if l.place != Place::Place || !l.is_mutable {
            self.err(ErrorKind::MutabilityViolation, span, "left-hand side of assignment is not a mutable place");
        }
        let r = self.expr_query(rhs, TypeExpectation::exact(l.ty));
        if r.has_type && !coerce::is_assignable_to(self.universe, r.ty, l.ty) {
            self.err(ErrorKind::TypeMismatch, span, "assignment type mismatch");
        }
        let unit = self.universe.unit();
        ExprInfo { ty: unit, has_type: true, is_mutable: false, place: Place::Value, can_diverge: l.can_diverge || r.can_diverge, const_value: None }
    }

    fn check_compound_assign(&mut self, lhs: ExprId, rhs: ExprId, span: Span) -> ExprInfo {
        let l = self.expr_query(lhs, TypeExpectation::none());
        if l.place != Place::Place || !l.is_mutable {
            self.err(ErrorKind::MutabilityViolation, span, "left-hand side of compound assignment is not a mutable place");
        }
        if !self.universe.is_integer(l.ty) {
            self.err(ErrorKind::InvalidOperation, span, "compound assignment requires an integer operand");
        }
        let r = self.expr_query(rhs, TypeExpectation::exact(l.ty));
        if r.has_type && !coerce::is_assignable_to(self.universe, r.ty, l.ty) {
            self.err(ErrorKind::TypeMismatch, span, "compound assignment type mismatch");
        }
        let unit = self.universe.unit();
        ExprInfo { ty: unit, has_type: true, is_mutable: false, place: Place::Value, can_diverge: l.can_diverge || r.can_diverge, const_value: None }
    }

    fn check_cast(&mut self, expr_id: ExprId, operand: ExprId, ty: TypeAnnotation, span: Span) -> ExprInfo {
        let target = self.type_query(&ty, span);
        if let ExprKind::Cast { ty: slot, .. } = &mut self.arena.expr_mut(expr_id).kind {
            *slot = TypeAnnotation::Resolved(target);
        }
        let info = self.expr_query(operand, TypeExpectation::none());
        let ok = (self.universe.is_numeric(info.ty) && self.universe.is_numeric(target))
            || (self.universe.primitive_kind(info.ty) == Some(PrimitiveKind::Bool) && self.universe.is_integer(target));
        if !ok {
            self.err(ErrorKind::InvalidOperation, span, "unsupported cast");
        }
        ExprInfo { ty: target, has_type: ok, is_mutable: false, place: Place::Value, can_diverge: info.can_diverge, const_value: None }
    }
}

fn fold_logical(op: BinOp, a: bool, b: bool) -> bool {
    match op {
        BinOp::And => a && b,
        BinOp::Or => a || b,
        _ => unreachable!("fold_logical called with a non-logical operator"),
    }
}

fn const_as_i64(v: &ConstVariant) -> Option<i64> {
    match v {
        ConstVariant::IntConst(n) => Some(*n as i64),
        ConstVariant::UintConst(n) => Some(*n as i64),
        _ => None,
    }
}

fn fold_compare(op: BinOp, a: &ConstVariant, b: &ConstVariant) -> Option<bool> {
    use std::cmp::Ordering;
    let ordering = match (a, b) {
        (ConstVariant::BoolConst(x), ConstVariant::BoolConst(y)) => x.cmp(y),
        (ConstVariant::CharConst(x), ConstVariant::CharConst(y)) => x.cmp(y),
        (ConstVariant::StringConst(x), ConstVariant::StringConst(y)) => x.cmp(y),
        _ => const_as_i64(a)?.cmp(&const_as_i64(b)?),
    };
    Some(match op {
        BinOp::Eq => ordering == Ordering::Equal,
        BinOp::Ne => ordering != Ordering::Equal,
        BinOp::Lt => ordering == Ordering::Less,
        BinOp::Le => ordering != Ordering::Greater,
        BinOp::Gt => ordering == Ordering::Greater,
        BinOp::Ge => ordering != Ordering::Less,
        _ => return None,
    })
}

fn fold_arith(
    universe: &ferrosem_types::TypeUniverse,
    op: BinOp,
    result_ty: ferrosem_types::TypeId,
    a: &ConstVariant,
    b: &ConstVariant,
) -> Option<ConstVariant> {
    let a = const_as_i64(a)?;
    let b = const_as_i64(b)?;
    let result = match op {
        BinOp::Add => a.checked_add(b)?,
        BinOp::Sub => a.checked_sub(b)?,
        BinOp::Mul => a.checked_mul(b)?,
        BinOp::Div if b != 0 => a.checked_div(b)?,
        BinOp::Rem if b != 0 => a.checked_rem(b)?,
        _ => return None,
    };
    let signed = universe.primitive_kind(result_ty).map(|k| k.is_signed()).unwrap_or(true);
    if signed {
        Some(ConstVariant::IntConst(result as i32))
    } else {
        Some(ConstVariant::UintConst(result as u32))
    }
}

fn fold_neg(v: &ConstVariant) -> Option<ConstVariant> {
    match v {
        ConstVariant::IntConst(n) => n.checked_neg().map(ConstVariant::IntConst),
        ConstVariant::UintConst(n) => (*n as i64).checked_neg().map(|v| ConstVariant::IntConst(v as i32)),
        _ => None,
    }
}
