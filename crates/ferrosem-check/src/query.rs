//! The semantic query service - `type_query`, `const_query`,
//! `bind_pattern_type`, and the `is_copy` query. `expr_query` and the
//! expression checker it delegates to live in `check.rs`; both impl blocks
//! share the same `QueryService` type.

use rustc_hash::FxHashSet;

use ferrosem_common::diagnostics::{DiagnosticSink, ErrorKind, SemanticError};
use ferrosem_common::Span;
use ferrosem_hir::{
    BindingLink, ConstVariant, ExprId, FunctionId, HirArena, ImplTable, Literal, PathLink, PatId,
    PatternKind, StructId, TypeAnnotation, TypeNode,
};
use ferrosem_resolve::GlobalNames;
use ferrosem_resolve::TypeDef;
use ferrosem_types::{NominalKind, PrimitiveKind, TypeId, TypeUniverse};

use crate::coerce;

/// What the caller requires of an expression's result.
#[derive(Debug, Clone, Copy)]
pub enum ExpectationKind {
    None,
    ExactType(TypeId),
    ExactConst(TypeId),
}

#[derive(Debug, Clone, Copy)]
pub struct TypeExpectation {
    pub kind: ExpectationKind,
}

impl TypeExpectation {
    pub fn none() -> Self {
        TypeExpectation { kind: ExpectationKind::None }
    }

    pub fn exact(t: TypeId) -> Self {
        TypeExpectation { kind: ExpectationKind::ExactType(t) }
    }

    pub fn exact_const(t: TypeId) -> Self {
        TypeExpectation { kind: ExpectationKind::ExactConst(t) }
    }

    pub fn expected(&self) -> Option<TypeId> {
        match self.kind {
            ExpectationKind::None => None,
            ExpectationKind::ExactType(t) | ExpectationKind::ExactConst(t) => Some(t),
        }
    }
}

pub struct QueryService<'a> {
    pub(crate) arena: &'a mut HirArena,
    pub(crate) universe: &'a TypeUniverse,
    pub(crate) impl_table: &'a ImplTable,
    pub(crate) globals: &'a GlobalNames,
    pub(crate) diagnostics: &'a mut DiagnosticSink,
    pub(crate) exit_fn: FunctionId,
    pub(crate) const_in_progress: FxHashSet<ExprId>,
    /// Set once a diagnostic has been raised while checking the current
    /// top-level item; consulted at the top of `check_expr`/`check_stmt` so
    /// the rest of that item's analysis is skipped (fail-fast-per-item policy).
    pub(crate) item_failed: bool,
    /// Current `check_expr` nesting depth; guarded against
    /// `ferrosem_common::limits::MAX_EXPR_CHECK_DEPTH`.
    pub(crate) expr_check_depth: u32,
    /// Current `resolve_type_node` nesting depth; guarded against
    /// `ferrosem_common::limits::MAX_TYPE_RESOLVE_DEPTH`.
    pub(crate) type_resolve_depth: u32,
    /// The type `Self` names while checking an impl's methods and associated
    /// items; `None` outside any impl. `GlobalNames` only holds root-scope
    /// names, so `Self` (impl-scoped) can't be resolved through it the way
    /// ordinary type paths are - this field is the type-position counterpart
    /// to name resolution registering `Self` in the impl's lexical scope.
    pub(crate) self_type: Option<TypeId>,
}

impl<'a> QueryService<'a> {
    pub fn new(
        arena: &'a mut HirArena,
        universe: &'a TypeUniverse,
        impl_table: &'a ImplTable,
        globals: &'a GlobalNames,
        diagnostics: &'a mut DiagnosticSink,
        exit_fn: FunctionId,
    ) -> Self {
        QueryService {
            arena,
            universe,
            impl_table,
            globals,
            diagnostics,
            exit_fn,
            const_in_progress: FxHashSet::default(),
            item_failed: false,
            expr_check_depth: 0,
            type_resolve_depth: 0,
            self_type: None,
        }
    }

    pub(crate) fn err(&mut self, kind: ErrorKind, span: Span, message: impl Into<String>) {
        self.diagnostics.push(SemanticError::new(kind, span, message));
        self.item_failed = true;
    }

    // -----------------------------------------------------------------
    // type_query
    // -----------------------------------------------------------------

    pub fn type_query(&mut self, annotation: &TypeAnnotation, span: Span) -> TypeId {
        match annotation {
            TypeAnnotation::Resolved(tid) => *tid,
            TypeAnnotation::Unresolved(node) => {
                let node = node.clone();
                self.resolve_type_node(&node, span)
            }
        }
    }

    fn resolve_type_node(&mut self, node: &TypeNode, span: Span) -> TypeId {
        if self.type_resolve_depth >= ferrosem_common::limits::MAX_TYPE_RESOLVE_DEPTH {
            self.err(ErrorKind::NotAType, span, "type annotation nested too deeply");
            return TypeId::INVALID;
        }
        self.type_resolve_depth += 1;
        let result = self.resolve_type_node_inner(node, span);
        self.type_resolve_depth -= 1;
        result
    }

    fn resolve_type_node_inner(&mut self, node: &TypeNode, span: Span) -> TypeId {
        match node {
            TypeNode::Primitive(kind) => self.universe.primitive(*kind),
            TypeNode::Unit => self.universe.unit(),
            TypeNode::Reference(inner, mutable) => {
                let inner_tid = self.resolve_type_node(inner, span);
                self.universe.reference(inner_tid, *mutable)
            }
            TypeNode::Array(elem, size_expr) => {
                let elem_tid = self.resolve_type_node(elem, span);
                let usize_ty = self.universe.primitive(PrimitiveKind::Usize);
                match self.const_query(*size_expr, usize_ty) {
                    Some(ConstVariant::UintConst(n)) => self.universe.array(elem_tid, n as u64),
                    _ => {
                        self.err(ErrorKind::ConstRequirementFailed, span, "array size must be a constant usize");
                        TypeId::INVALID
                    }
                }
            }
            TypeNode::Path(segments) => {
                if segments.len() != 1 {
                    self.err(ErrorKind::NotAType, span, "unsupported type path");
                    return TypeId::INVALID;
                }
                let name = &segments[0];
                if name == "Self" {
                    return match self.self_type {
                        Some(tid) => tid,
                        None => {
                            self.err(ErrorKind::UnresolvedName, span, "`Self` is only valid inside an impl");
                            TypeId::INVALID
                        }
                    };
                }
                match self.globals.lookup_type(name) {
                    Some(TypeDef::Struct(sid)) => self.universe.struct_of(sid.0),
                    Some(TypeDef::Enum(eid)) => self.universe.enum_of(eid.0),
                    Some(TypeDef::Trait(_)) => {
                        self.err(ErrorKind::NotAType, span, format!("`{name}` is a trait, not a type"));
                        TypeId::INVALID
                    }
                    Some(TypeDef::Alias(taid)) => {
                        let ann = self.arena.type_alias(taid).ty.clone();
                        let tid = self.type_query(&ann, span);
                        self.arena.type_alias_mut(taid).ty = TypeAnnotation::Resolved(tid);
                        tid
                    }
                    None => {
                        self.err(ErrorKind::UnresolvedName, span, format!("unresolved type `{name}`"));
                        TypeId::INVALID
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------
    // const_query
    // -----------------------------------------------------------------

    pub fn const_query(&mut self, expr_id: ExprId, expected: TypeId) -> Option<ConstVariant> {
        if !self.const_in_progress.insert(expr_id) {
            let span = self.arena.expr(expr_id).span;
            self.err(ErrorKind::CyclicConst, span, "cyclic constant expression");
            return None;
        }
        let info = self.expr_query(expr_id, TypeExpectation::exact_const(expected));
        self.const_in_progress.remove(&expr_id);
        info.const_value
    }

    /// The persistent variant: evaluates and caches `def.const_value`
    /// once, then reuses it on every later call.
    pub fn const_query_def(&mut self, cid: ferrosem_hir::ConstId) -> Option<ConstVariant> {
        if let Some(v) = &self.arena.const_def(cid).const_value {
            return Some(v.clone());
        }
        let ann = self.arena.const_def(cid).ty.clone();
        let span = self.arena.const_def(cid).span;
        let tid = self.type_query(&ann, span);
        self.arena.const_def_mut(cid).ty = TypeAnnotation::Resolved(tid);
        let init = self.arena.const_def(cid).init;
        let value = self.const_query(init, tid);
        self.arena.const_def_mut(cid).const_value = value.clone();
        value
    }

    // -----------------------------------------------------------------
    // bind_pattern_type
    // -----------------------------------------------------------------

    pub fn bind_pattern_type(&mut self, pat_id: PatId, expected: TypeId) {
        let data = self.arena.pat(pat_id).clone();
        match data.kind {
            PatternKind::Binding(binding) => {
                if let BindingLink::Resolved(lid) = binding.local {
                    self.arena.local_mut(lid).type_annotation = TypeAnnotation::Resolved(expected);
                }
            }
            PatternKind::Wildcard => {}
            PatternKind::Literal(lit) => {
                if !self.literal_matches(&lit, expected) {
                    self.err(ErrorKind::TypeMismatch, data.span, "literal pattern does not match expected type");
                }
            }
            PatternKind::Range { lo, hi } => {
                if !self.literal_matches(&lo, expected) || !self.literal_matches(&hi, expected) {
                    self.err(ErrorKind::TypeMismatch, data.span, "range pattern bounds do not match expected type");
                }
            }
            PatternKind::Reference { mutable, sub } => {
                if !self.universe.is_reference(expected) {
                    self.err(ErrorKind::TypeMismatch, data.span, "expected a reference type");
                    return;
                }
                if self.universe.is_mutable_reference(expected) != mutable {
                    self.err(ErrorKind::MutabilityViolation, data.span, "reference pattern mutability mismatch");
                    return;
                }
                let inner = self.universe.referenced(expected).expect("checked is_reference above");
                self.bind_pattern_type(sub, inner);
            }
            PatternKind::Struct { ty, fields } => {
                let PathLink::Resolved(sid) = ty else { return };
                let struct_fields = self.arena.strukt(sid).fields.clone();
                for (name, sub_pat) in &fields {
                    match struct_fields.iter().find(|(n, _)| n == name) {
                        Some((_, ann)) => {
                            let span = self.arena.pat(*sub_pat).span;
                            let fty = self.type_query(ann, span);
                            self.bind_pattern_type(*sub_pat, fty);
                        }
                        None => self.err(ErrorKind::ExtraField, data.span, format!("no field `{name}` on this struct")),
                    }
                }
            }
            PatternKind::TupleLike { ty, subs } => {
                let PathLink::Resolved((eid, idx)) = ty else { return };
                let variant = self.arena.enum_def(eid).variants[idx].clone();
                if let (Some(payload_ty), Some(sub)) = (&variant.payload, subs.first()) {
                    let pty = self.type_query(payload_ty, data.span);
                    self.bind_pattern_type(*sub, pty);
                }
            }
        }
    }

    /// An unsigned expectation (`U32`/`USIZE`/`AnyUInt`, e.g. an array size or
    /// index) makes an unsuffixed literal natively `AnyUInt` instead of
    /// `AnyInt`, since `AnyInt` only coerces to `I32`/`ISIZE`.
    fn expects_unsigned(&self, expected: Option<TypeId>) -> bool {
        expected
            .and_then(|t| self.universe.primitive_kind(t))
            .is_some_and(|p| matches!(p, PrimitiveKind::U32 | PrimitiveKind::Usize | PrimitiveKind::AnyUInt))
    }

    pub(crate) fn natural_literal_type(&self, lit: &Literal, expected: Option<TypeId>) -> TypeId {
        match lit {
            Literal::Int { suffix, .. } => match suffix {
                Some(kind) => self.universe.primitive(*kind),
                None if self.expects_unsigned(expected) => self.universe.primitive(PrimitiveKind::AnyUInt),
                None => self.universe.primitive(PrimitiveKind::AnyInt),
            },
            Literal::Bool(_) => self.universe.primitive(PrimitiveKind::Bool),
            Literal::Char(_) => self.universe.primitive(PrimitiveKind::Char),
            Literal::Str(_) => self.universe.primitive(PrimitiveKind::String),
        }
    }

    fn literal_matches(&self, lit: &Literal, expected: TypeId) -> bool {
        let nat = self.natural_literal_type(lit, Some(expected));
        coerce::is_assignable_to(self.universe, nat, expected)
    }

    pub(crate) fn literal_const_value(&self, lit: &Literal, expected: Option<TypeId>) -> Option<ConstVariant> {
        match lit {
            Literal::Int { value, suffix } => {
                let signed = match suffix {
                    Some(kind) => kind.is_signed(),
                    None => !self.expects_unsigned(expected),
                };
                if signed {
                    Some(ConstVariant::IntConst(*value as i32))
                } else {
                    Some(ConstVariant::UintConst(*value as u32))
                }
            }
            Literal::Bool(b) => Some(ConstVariant::BoolConst(*b)),
            Literal::Char(c) => Some(ConstVariant::CharConst(*c)),
            Literal::Str(s) => Some(ConstVariant::StringConst(s.clone())),
        }
    }

    // -----------------------------------------------------------------
    // is_copy
    // -----------------------------------------------------------------

    /// Primitives, references, arrays of copy elements, and structs whose
    /// fields are all copy. No expression-checker rule in this language
    /// actually gates on copy-ness (there is no move checker in scope), but
    /// the type universe names this query explicitly, so it is exposed as
    /// public API for downstream consumers.
    pub fn is_copy(&self, t: TypeId) -> bool {
        if self.universe.is_reference(t) || self.universe.is_numeric(t) {
            return true;
        }
        if matches!(self.universe.primitive_kind(t), Some(PrimitiveKind::Bool | PrimitiveKind::Char | PrimitiveKind::String)) {
            return true;
        }
        if let Some((elem, _)) = self.universe.array_parts(t) {
            return self.is_copy(elem);
        }
        if let Some((NominalKind::Struct, id)) = self.universe.nominal_parts(t) {
            let sid = StructId(id);
            return self.arena.strukt(sid).fields.iter().all(|(_, ann)| match ann {
                TypeAnnotation::Resolved(fty) => self.is_copy(*fty),
                TypeAnnotation::Unresolved(_) => false,
            });
        }
        false
    }
}
