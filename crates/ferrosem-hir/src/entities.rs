//! HIR data model.
//!
//! Every node carries a `Span` back to its originating AST node for
//! diagnostics. Refinement slots start empty/unresolved and are filled in
//! place by later passes: `TypeAnnotation::Unresolved` collapses to
//! `Resolved`, `BindingLink::Unresolved` becomes `Resolved(LocalId)`,
//! `ExprData::info` goes from `None` to `Some`, and so on. No node is ever
//! re-lowered into a new IR; passes mutate the slots they own.

use ferrosem_common::Span;
use ferrosem_types::TypeId;

use crate::ids::{
    ConstId, EnumId, ExprId, FunctionId, ImplId, LocalId, MethodId, PatId, StmtId, StructId,
    TraitId, TypeAliasId,
};

// ---------------------------------------------------------------------
// Types (unresolved syntax tree + resolved handle)
// ---------------------------------------------------------------------

/// An unresolved type as written in source. Array sizes are HIR expressions
/// so `const_query` can evaluate them once bound in the HIR arena.
#[derive(Debug, Clone)]
pub enum TypeNode {
    Path(Vec<String>),
    Primitive(ferrosem_types::PrimitiveKind),
    Unit,
    Array(Box<TypeNode>, ExprId),
    Reference(Box<TypeNode>, bool),
}

/// A `TypeAnnotation` refinement slot: either an owned unresolved
/// syntax tree, or - once `type_query` has run - a resolved `TypeId`.
#[derive(Debug, Clone)]
pub enum TypeAnnotation {
    Unresolved(TypeNode),
    Resolved(TypeId),
}

impl TypeAnnotation {
    pub fn resolved(&self) -> Option<TypeId> {
        match self {
            TypeAnnotation::Resolved(id) => Some(*id),
            TypeAnnotation::Unresolved(_) => None,
        }
    }
}

// ---------------------------------------------------------------------
// Program structure
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub enum ItemRef {
    Function(FunctionId),
    Struct(StructId),
    Enum(EnumId),
    Trait(TraitId),
    Impl(ImplId),
    Const(ConstId),
    TypeAlias(TypeAliasId),
}

#[derive(Debug, Clone, Copy)]
pub enum SelfKind {
    Value,
    Ref,
    RefMut,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub pattern: PatId,
    pub ty: TypeAnnotation,
    pub span: Span,
}

/// Who a `return`/`call` targets: a free function or a method. Distinct from
/// `ItemRef` because methods live in `Impl` blocks, not at top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionLike {
    Function(FunctionId),
    Method(MethodId),
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Option<TypeAnnotation>,
    pub body: ExprId,
    /// Depth of enclosing impl/trait nesting; zero for top-level functions.
    /// Used by the exit-check pass to recognize the program's `main`.
    pub assoc_depth: u32,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub self_kind: SelfKind,
    /// The implicit `self` binding. Unlike ordinary parameters, `self` has
    /// no source pattern to walk - name resolution synthesizes its `Local`
    /// directly and fills this slot the same way it fills `BindingDef.local`.
    pub self_local: BindingLink,
    pub params: Vec<Param>,
    pub ret: Option<TypeAnnotation>,
    pub body: ExprId,
    pub owner: StructOrEnum,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructOrEnum {
    Struct(StructId),
    Enum(EnumId),
}

#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: String,
    /// Declaration order is the canonical field order.
    pub fields: Vec<(String, TypeAnnotation)>,
    pub span: Span,
}

impl StructDef {
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(n, _)| n == name)
    }
}

#[derive(Debug, Clone)]
pub struct EnumVariant {
    pub name: String,
    pub payload: Option<TypeAnnotation>,
}

#[derive(Debug, Clone)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<EnumVariant>,
    pub span: Span,
}

impl EnumDef {
    pub fn variant_index(&self, name: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.name == name)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum AssocItemRef {
    Function(FunctionId),
    Const(ConstId),
}

#[derive(Debug, Clone)]
pub struct Trait {
    pub name: String,
    pub items: Vec<AssocItemRef>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Impl {
    pub target: TypeAnnotation,
    pub trait_ref: Option<String>,
    pub methods: Vec<MethodId>,
    pub assoc_functions: Vec<FunctionId>,
    pub assoc_consts: Vec<ConstId>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ConstDef {
    pub name: String,
    pub ty: TypeAnnotation,
    pub init: ExprId,
    /// Refinement slot filled by the persistent form of `const_query`.
    pub const_value: Option<ConstVariant>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeAliasDef {
    pub name: String,
    pub ty: TypeAnnotation,
    pub span: Span,
}

// ---------------------------------------------------------------------
// Locals and bindings
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Local {
    pub name: String,
    pub mutable: bool,
    /// Filled by `bind_pattern_type` once the pattern's expected
    /// type is known.
    pub type_annotation: TypeAnnotation,
    pub span: Span,
}

/// `BindingDef.local` refinement slot: empty until name resolution's
/// deferred-binding commit step registers the `Local` it points to.
#[derive(Debug, Clone, Copy)]
pub enum BindingLink {
    Unresolved,
    Resolved(LocalId),
}

#[derive(Debug, Clone)]
pub struct BindingDef {
    pub name: String,
    pub mutable: bool,
    pub local: BindingLink,
}

/// A name that resolves to a nominal type definition, used by struct/variant
/// patterns and struct literals. Unresolved until name resolution runs.
#[derive(Debug, Clone)]
pub enum PathLink<T> {
    Unresolved(Vec<String>),
    Resolved(T),
}

#[derive(Debug, Clone)]
pub enum PatternKind {
    Binding(BindingDef),
    Wildcard,
    Literal(Literal),
    Reference { mutable: bool, sub: PatId },
    /// `Name { a, b }` - fields are canonicalized to declaration order by
    /// name resolution, mirroring struct-literal canonicalization.
    Struct { ty: PathLink<StructId>, fields: Vec<(String, PatId)> },
    /// `Variant(sub)` / `Variant` - positional destructure of an enum
    /// variant's single optional payload.
    TupleLike { ty: PathLink<(EnumId, usize)>, subs: Vec<PatId> },
    Range { lo: Literal, hi: Literal },
}

#[derive(Debug, Clone)]
pub struct PatternData {
    pub kind: PatternKind,
    pub span: Span,
}

// ---------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------

/// A folded constant value. Signedness/width checking beyond these
/// fixed widths is the type checker's job, not the constant evaluator's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstVariant {
    UintConst(u32),
    IntConst(i32),
    BoolConst(bool),
    CharConst(char),
    StringConst(String),
}

#[derive(Debug, Clone)]
pub enum Literal {
    Int { value: i64, suffix: Option<ferrosem_types::PrimitiveKind> },
    Bool(bool),
    Char(char),
    Str(String),
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    pub fn is_arith(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem)
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// `call.target` refinement slot: filled by name resolution once the callee
/// path resolves to a function (method calls resolve separately, during
/// expression checking, because they need the receiver's type).
#[derive(Debug, Clone, Copy)]
pub enum CallTarget {
    Unresolved,
    Function(FunctionId),
    /// Callee is not a plain path to a function (e.g. a closure value);
    /// out of scope - recorded so the checker can report it cleanly.
    NotCallable,
}

/// `return.target` / `break.target` / `continue.target` refinement slots
/// non-owning references into the HIR, filled by the control-flow
/// linking pass.
#[derive(Debug, Clone, Copy)]
pub enum FlowTarget<T> {
    Unlinked,
    Resolved(T),
}

#[derive(Debug, Clone)]
pub enum PathResolution {
    Unresolved,
    Local(LocalId),
    Const(ConstId),
    Function(FunctionId),
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Literal),
    Path { segments: Vec<String>, resolved: PathResolution },
    Binary { op: BinOp, lhs: ExprId, rhs: ExprId },
    Unary { op: UnOp, operand: ExprId },
    Call { callee: ExprId, args: Vec<ExprId>, target: CallTarget },
    MethodCall { receiver: ExprId, method: String, args: Vec<ExprId>, resolved: Option<MethodId> },
    Field { receiver: ExprId, field: String },
    Index { base: ExprId, index: ExprId },
    StructLiteral { ty: PathLink<StructId>, fields: Vec<(String, ExprId)> },
    ArrayLiteral { elems: Vec<ExprId> },
    ArrayRepeat { value: ExprId, count: ExprId },
    Block { stmts: Vec<StmtId>, final_expr: Option<ExprId> },
    If { cond: ExprId, then_branch: ExprId, else_branch: Option<ExprId> },
    Loop { body: ExprId },
    While { cond: ExprId, body: ExprId },
    Break { value: Option<ExprId>, target: FlowTarget<ExprId> },
    Continue { target: FlowTarget<ExprId> },
    Return { value: Option<ExprId>, target: FlowTarget<FunctionLike> },
    Reference { mutable: bool, operand: ExprId },
    Deref { operand: ExprId },
    Assign { lhs: ExprId, rhs: ExprId },
    CompoundAssign { op: BinOp, lhs: ExprId, rhs: ExprId },
    Cast { operand: ExprId, ty: TypeAnnotation },
}

/// Place vs value classification ("Place / Value" in the glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Place {
    Value,
    Place,
}

/// Per-expression computed properties, cached on the node itself.
#[derive(Debug, Clone)]
pub struct ExprInfo {
    pub ty: TypeId,
    pub has_type: bool,
    pub is_mutable: bool,
    pub place: Place,
    pub can_diverge: bool,
    pub const_value: Option<ConstVariant>,
}

impl ExprInfo {
    pub fn failed() -> Self {
        ExprInfo {
            ty: TypeId::INVALID,
            has_type: false,
            is_mutable: false,
            place: Place::Value,
            can_diverge: false,
            const_value: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExprData {
    pub kind: ExprKind,
    pub span: Span,
    /// `ExprInfo` cache slot: `None` until `expr_query` has run at
    /// least once for this node.
    pub info: Option<ExprInfo>,
    /// Innermost loop this expression's `break`/`continue` loop stack frame
    /// targets while the accumulator of unified `break` types is live - used
    /// only while the expression checker is inside a `Loop`/`While` node.
    /// Not part of the public `ExprInfo`; purely a checker scratch slot.
    pub loop_break_ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Let { pattern: PatId, ty: Option<TypeAnnotation>, init: Option<ExprId> },
    Expr(ExprId),
    Item(ItemRef),
}

#[derive(Debug, Clone)]
pub struct StmtData {
    pub kind: StmtKind,
    pub span: Span,
}
