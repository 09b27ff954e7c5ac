//! AST-to-HIR conversion (pipeline step 2).
//!
//! A single structural pass: every AST node becomes an HIR node with its
//! refinement slots set to their empty/unresolved state (`TypeAnnotation`
//! stays `Unresolved`, `BindingLink`/`CallTarget`/`FlowTarget` stay
//! unlinked, `ExprData::info` stays `None`). No name resolution, type
//! resolution, or linking happens here - those are later passes over the
//! same arena.
//!
//! Impl-table registration happens inline, since by the time an
//! `impl` block is lowered its target type and member names are already
//! known structurally (only the *type itself* may still be an unresolved
//! path - lowering registers it by syntactic target name, and
//! `finalize_type_statics`-style resolution in the resolve pass links it to
//! a concrete `StructOrEnum` to re-key if needed). For this language's
//! non-generic, non-aliased impl targets, the common case - `impl Point {
//! ... }` - already names the struct directly, so we resolve the owner
//! eagerly against the structs/enums collected so far.

use rustc_hash::FxHashMap;

use ferrosem_ast as ast;

use crate::arena::{HirArena, Program};
use crate::entities::*;
use crate::ids::*;
use crate::impl_table::ImplTable;

pub struct LoweredProgram {
    pub program: Program,
    pub impl_table: ImplTable,
}

struct Lowerer {
    arena: HirArena,
    impl_table: ImplTable,
    struct_by_name: FxHashMap<String, StructId>,
    enum_by_name: FxHashMap<String, EnumId>,
}

pub fn lower_program(ast: &ast::Program) -> LoweredProgram {
    let mut low = Lowerer {
        arena: HirArena::new(),
        impl_table: ImplTable::new(),
        struct_by_name: FxHashMap::default(),
        enum_by_name: FxHashMap::default(),
    };

    // Pre-register struct/enum names so impl targets and type paths declared
    // earlier in the file can refer to definitions declared later.
    for item in &ast.items {
        match item {
            ast::Item::Struct(s) => {
                let id = low.arena.push_struct(StructDef {
                    name: s.name.clone(),
                    fields: Vec::new(),
                    span: s.span,
                });
                low.struct_by_name.insert(s.name.clone(), id);
            }
            ast::Item::Enum(e) => {
                let id = low.arena.push_enum(EnumDef {
                    name: e.name.clone(),
                    variants: Vec::new(),
                    span: e.span,
                });
                low.enum_by_name.insert(e.name.clone(), id);
            }
            _ => {}
        }
    }

    let mut items = Vec::with_capacity(ast.items.len());
    for item in &ast.items {
        items.push(low.lower_item(item, 0));
    }

    LoweredProgram {
        program: Program { items, arena: low.arena },
        impl_table: low.impl_table,
    }
}

impl Lowerer {
    fn lower_item(&mut self, item: &ast::Item, assoc_depth: u32) -> ItemRef {
        match item {
            ast::Item::Function(f) => ItemRef::Function(self.lower_function(f, assoc_depth)),
            ast::Item::Struct(s) => {
                let id = self.struct_by_name[&s.name];
                let fields =
                    s.fields.iter().map(|(n, t)| (n.clone(), self.lower_type_node(t))).collect();
                self.arena.strukt_mut(id).fields = fields;
                ItemRef::Struct(id)
            }
            ast::Item::Enum(e) => {
                let id = self.enum_by_name[&e.name];
                let variants = e
                    .variants
                    .iter()
                    .map(|v| EnumVariant {
                        name: v.name.clone(),
                        payload: v.payload.as_ref().map(|t| self.lower_type_node(t)),
                    })
                    .collect();
                self.arena.enum_def_mut(id).variants = variants;
                ItemRef::Enum(id)
            }
            ast::Item::Trait(t) => ItemRef::Trait(self.lower_trait(t)),
            ast::Item::Impl(i) => ItemRef::Impl(self.lower_impl(i)),
            ast::Item::Const(c) => ItemRef::Const(self.lower_const(c)),
            ast::Item::TypeAlias(t) => ItemRef::TypeAlias(self.lower_type_alias(t)),
        }
    }

    fn lower_function(&mut self, f: &ast::Function, assoc_depth: u32) -> FunctionId {
        let params = f.params.iter().map(|p| self.lower_param(p)).collect();
        let ret = f.ret.as_ref().map(|t| self.lower_type_node(t));
        let body = self.lower_block(&f.body);
        self.arena.push_function(Function {
            name: f.name.clone(),
            params,
            ret,
            body,
            assoc_depth,
            span: f.span,
        })
    }

    fn lower_method(&mut self, f: &ast::Function, owner: StructOrEnum) -> MethodId {
        let self_kind = match f.self_param.expect("method must carry a self parameter") {
            ast::SelfKind::Value => SelfKind::Value,
            ast::SelfKind::Ref => SelfKind::Ref,
            ast::SelfKind::RefMut => SelfKind::RefMut,
        };
        let params = f.params.iter().map(|p| self.lower_param(p)).collect();
        let ret = f.ret.as_ref().map(|t| self.lower_type_node(t));
        let body = self.lower_block(&f.body);
        self.arena.push_method(Method {
            name: f.name.clone(),
            self_kind,
            self_local: BindingLink::Unresolved,
            params,
            ret,
            body,
            owner,
            span: f.span,
        })
    }

    fn lower_param(&mut self, p: &ast::Param) -> Param {
        Param { pattern: self.lower_pattern(&p.pattern), ty: self.lower_type_node(&p.ty), span: p.span }
    }

    fn lower_trait(&mut self, t: &ast::Trait) -> TraitId {
        let mut items = Vec::new();
        for item in &t.items {
            match item {
                ast::AssocItem::Function(f) => {
                    items.push(AssocItemRef::Function(self.lower_function(f, 1)))
                }
                ast::AssocItem::Const(c) => items.push(AssocItemRef::Const(self.lower_const(c))),
            }
        }
        self.arena.push_trait(Trait { name: t.name.clone(), items, span: t.span })
    }

    fn lower_impl(&mut self, i: &ast::Impl) -> ImplId {
        let target = self.lower_type_node(&i.target);
        let owner = self.resolve_impl_target(&i.target);

        let mut methods = Vec::new();
        let mut assoc_functions = Vec::new();
        let mut assoc_consts = Vec::new();

        for item in &i.items {
            match item {
                ast::AssocItem::Function(f) if f.self_param.is_some() => {
                    if let Some(owner) = owner {
                        let id = self.lower_method(f, owner);
                        methods.push(id);
                        self.impl_table.register_method(owner, f.name.clone(), id);
                    }
                }
                ast::AssocItem::Function(f) => {
                    let id = self.lower_function(f, 1);
                    assoc_functions.push(id);
                    if let Some(owner) = owner {
                        self.impl_table.register_assoc_function(owner, f.name.clone(), id);
                    }
                }
                ast::AssocItem::Const(c) => {
                    let id = self.lower_const(c);
                    assoc_consts.push(id);
                    if let Some(owner) = owner {
                        self.impl_table.register_assoc_const(owner, c.name.clone(), id);
                    }
                }
            }
        }

        if let (Some(owner), Some(trait_name)) = (owner, &i.trait_ref) {
            self.impl_table.register_trait(owner, trait_name.clone());
        }

        self.arena.push_impl(Impl {
            target,
            trait_ref: i.trait_ref.clone(),
            methods,
            assoc_functions,
            assoc_consts,
            span: i.span,
        })
    }

    /// An impl target names a struct or enum directly (no generics, no
    /// aliasing through a `TypeAlias` in this language's Non-goals). Look it
    /// up by the bare path name collected in the pre-registration pass.
    fn resolve_impl_target(&self, ty: &ast::TypeNode) -> Option<StructOrEnum> {
        let ast::TypeNode::Path(segments) = ty else { return None };
        let name = segments.last()?;
        if let Some(&id) = self.struct_by_name.get(name) {
            return Some(StructOrEnum::Struct(id));
        }
        if let Some(&id) = self.enum_by_name.get(name) {
            return Some(StructOrEnum::Enum(id));
        }
        None
    }

    fn lower_const(&mut self, c: &ast::ConstDef) -> ConstId {
        let ty = self.lower_type_node(&c.ty);
        let init = self.lower_expr(&c.init);
        self.arena.push_const(ConstDef { name: c.name.clone(), ty, init, const_value: None, span: c.span })
    }

    fn lower_type_alias(&mut self, t: &ast::TypeAlias) -> TypeAliasId {
        let ty = self.lower_type_node(&t.ty);
        self.arena.push_type_alias(TypeAliasDef { name: t.name.clone(), ty, span: t.span })
    }

    fn lower_type_node(&mut self, t: &ast::TypeNode) -> TypeAnnotation {
        TypeAnnotation::Unresolved(self.lower_type_node_inner(t))
    }

    fn lower_type_node_inner(&mut self, t: &ast::TypeNode) -> TypeNode {
        match t {
            ast::TypeNode::Path(segments) => TypeNode::Path(segments.clone()),
            ast::TypeNode::Primitive(p) => TypeNode::Primitive(lower_primitive(*p)),
            ast::TypeNode::Unit => TypeNode::Unit,
            ast::TypeNode::Array(elem, size) => {
                let elem = Box::new(self.lower_type_node_inner(elem));
                let size = self.lower_expr(size);
                TypeNode::Array(elem, size)
            }
            ast::TypeNode::Reference(inner, mutable) => {
                TypeNode::Reference(Box::new(self.lower_type_node_inner(inner)), *mutable)
            }
        }
    }

    fn lower_block(&mut self, b: &ast::Block) -> ExprId {
        let stmts = b.stmts.iter().map(|s| self.lower_stmt(s)).collect();
        let final_expr = b.final_expr.as_ref().map(|e| self.lower_expr(e));
        self.arena.push_expr(ExprData {
            kind: ExprKind::Block { stmts, final_expr },
            span: b.span,
            info: None,
            loop_break_ty: None,
        })
    }

    fn lower_stmt(&mut self, s: &ast::Stmt) -> StmtId {
        match s {
            ast::Stmt::Let { pattern, ty, init, span } => {
                let pattern = self.lower_pattern(pattern);
                let ty = ty.as_ref().map(|t| self.lower_type_node(t));
                let init = init.as_ref().map(|e| self.lower_expr(e));
                self.arena.push_stmt(StmtData { kind: StmtKind::Let { pattern, ty, init }, span: *span })
            }
            ast::Stmt::Expr(e) => {
                let span = e.span();
                let id = self.lower_expr(e);
                self.arena.push_stmt(StmtData { kind: StmtKind::Expr(id), span })
            }
            ast::Stmt::Item(item) => {
                let span = item.span();
                let item_ref = self.lower_item(item, 0);
                self.arena.push_stmt(StmtData { kind: StmtKind::Item(item_ref), span })
            }
        }
    }

    fn lower_pattern(&mut self, p: &ast::Pattern) -> PatId {
        let span = p.span();
        let kind = match p {
            ast::Pattern::Binding { name, mutable, .. } => PatternKind::Binding(BindingDef {
                name: name.clone(),
                mutable: *mutable,
                local: BindingLink::Unresolved,
            }),
            ast::Pattern::Wildcard { .. } => PatternKind::Wildcard,
            ast::Pattern::Literal { lit, .. } => PatternKind::Literal(lower_literal(lit)),
            ast::Pattern::Reference { mutable, sub, .. } => {
                let sub = self.lower_pattern(sub);
                PatternKind::Reference { mutable: *mutable, sub }
            }
            ast::Pattern::Struct { path, fields, .. } => {
                let fields =
                    fields.iter().map(|(n, p)| (n.clone(), self.lower_pattern(p))).collect();
                PatternKind::Struct { ty: PathLink::Unresolved(path.clone()), fields }
            }
            ast::Pattern::Range { lo, hi, .. } => {
                PatternKind::Range { lo: lower_literal(lo), hi: lower_literal(hi) }
            }
        };
        self.arena.push_pat(PatternData { kind, span })
    }

    fn lower_expr(&mut self, e: &ast::Expr) -> ExprId {
        let span = e.span();
        let kind = match e {
            ast::Expr::Literal { lit, .. } => ExprKind::Literal(lower_literal(lit)),
            ast::Expr::Path { segments, .. } => {
                ExprKind::Path { segments: segments.clone(), resolved: PathResolution::Unresolved }
            }
            ast::Expr::Binary { op, lhs, rhs, .. } => ExprKind::Binary {
                op: lower_binop(*op),
                lhs: self.lower_expr(lhs),
                rhs: self.lower_expr(rhs),
            },
            ast::Expr::Unary { op, operand, .. } => {
                ExprKind::Unary { op: lower_unop(*op), operand: self.lower_expr(operand) }
            }
            ast::Expr::Call { callee, args, .. } => ExprKind::Call {
                callee: self.lower_expr(callee),
                args: args.iter().map(|a| self.lower_expr(a)).collect(),
                target: CallTarget::Unresolved,
            },
            ast::Expr::MethodCall { receiver, method, args, .. } => ExprKind::MethodCall {
                receiver: self.lower_expr(receiver),
                method: method.clone(),
                args: args.iter().map(|a| self.lower_expr(a)).collect(),
                resolved: None,
            },
            ast::Expr::Field { receiver, field, .. } => {
                ExprKind::Field { receiver: self.lower_expr(receiver), field: field.clone() }
            }
            ast::Expr::Index { base, index, .. } => {
                ExprKind::Index { base: self.lower_expr(base), index: self.lower_expr(index) }
            }
            ast::Expr::StructLiteral { path, fields, .. } => ExprKind::StructLiteral {
                ty: PathLink::Unresolved(path.clone()),
                fields: fields.iter().map(|(n, e)| (n.clone(), self.lower_expr(e))).collect(),
            },
            ast::Expr::ArrayLiteral { elems, .. } => {
                ExprKind::ArrayLiteral { elems: elems.iter().map(|e| self.lower_expr(e)).collect() }
            }
            ast::Expr::ArrayRepeat { value, count, .. } => ExprKind::ArrayRepeat {
                value: self.lower_expr(value),
                count: self.lower_expr(count),
            },
            ast::Expr::Block(b) => return self.lower_block(b),
            ast::Expr::If { cond, then_branch, else_branch, .. } => ExprKind::If {
                cond: self.lower_expr(cond),
                then_branch: self.lower_block(then_branch),
                else_branch: else_branch.as_ref().map(|e| self.lower_expr(e)),
            },
            ast::Expr::Loop { body, .. } => ExprKind::Loop { body: self.lower_block(body) },
            ast::Expr::While { cond, body, .. } => {
                ExprKind::While { cond: self.lower_expr(cond), body: self.lower_block(body) }
            }
            ast::Expr::Break { value, .. } => ExprKind::Break {
                value: value.as_ref().map(|e| self.lower_expr(e)),
                target: FlowTarget::Unlinked,
            },
            ast::Expr::Continue { .. } => ExprKind::Continue { target: FlowTarget::Unlinked },
            ast::Expr::Return { value, .. } => ExprKind::Return {
                value: value.as_ref().map(|e| self.lower_expr(e)),
                target: FlowTarget::Unlinked,
            },
            ast::Expr::Reference { mutable, operand, .. } => {
                ExprKind::Reference { mutable: *mutable, operand: self.lower_expr(operand) }
            }
            ast::Expr::Deref { operand, .. } => ExprKind::Deref { operand: self.lower_expr(operand) },
            ast::Expr::Assign { lhs, rhs, .. } => {
                ExprKind::Assign { lhs: self.lower_expr(lhs), rhs: self.lower_expr(rhs) }
            }
            ast::Expr::CompoundAssign { op, lhs, rhs, .. } => ExprKind::CompoundAssign {
                op: lower_binop(*op),
                lhs: self.lower_expr(lhs),
                rhs: self.lower_expr(rhs),
            },
            ast::Expr::Cast { operand, ty, .. } => {
                ExprKind::Cast { operand: self.lower_expr(operand), ty: self.lower_type_node(ty) }
            }
        };
        self.arena.push_expr(ExprData { kind, span, info: None, loop_break_ty: None })
    }
}

fn lower_primitive(p: ast::PrimitiveKind) -> ferrosem_types::PrimitiveKind {
    use ferrosem_types::PrimitiveKind as P;
    match p {
        ast::PrimitiveKind::I32 => P::I32,
        ast::PrimitiveKind::U32 => P::U32,
        ast::PrimitiveKind::Isize => P::Isize,
        ast::PrimitiveKind::Usize => P::Usize,
        ast::PrimitiveKind::Bool => P::Bool,
        ast::PrimitiveKind::Char => P::Char,
        ast::PrimitiveKind::Str => P::String,
    }
}

fn lower_binop(op: ast::BinOp) -> BinOp {
    match op {
        ast::BinOp::Add => BinOp::Add,
        ast::BinOp::Sub => BinOp::Sub,
        ast::BinOp::Mul => BinOp::Mul,
        ast::BinOp::Div => BinOp::Div,
        ast::BinOp::Rem => BinOp::Rem,
        ast::BinOp::Eq => BinOp::Eq,
        ast::BinOp::Ne => BinOp::Ne,
        ast::BinOp::Lt => BinOp::Lt,
        ast::BinOp::Le => BinOp::Le,
        ast::BinOp::Gt => BinOp::Gt,
        ast::BinOp::Ge => BinOp::Ge,
        ast::BinOp::And => BinOp::And,
        ast::BinOp::Or => BinOp::Or,
    }
}

fn lower_unop(op: ast::UnOp) -> UnOp {
    match op {
        ast::UnOp::Neg => UnOp::Neg,
        ast::UnOp::Not => UnOp::Not,
    }
}

fn lower_literal(lit: &ast::Literal) -> Literal {
    match lit {
        ast::Literal::Int { value, suffix } => {
            Literal::Int { value: *value, suffix: suffix.map(lower_primitive) }
        }
        ast::Literal::Bool(b) => Literal::Bool(*b),
        ast::Literal::Char(c) => Literal::Char(*c),
        ast::Literal::Str(s) => Literal::Str(s.clone()),
    }
}
