//! The input contract the semantic core consumes.
//!
//! This crate defines the syntax tree the (out-of-scope) lexer/parser
//! produces: plain owned trees, bare string identifiers, and a `Span` on
//! every node. The semantic core never constructs these nodes itself except
//! in tests - it only walks them once, during HIR conversion
//! (`ferrosem_hir::lower`), and never looks at them again.

use ferrosem_common::Span;

/// A complete compilation unit: an ordered list of top-level items.
#[derive(Debug, Clone)]
pub struct Program {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone)]
pub enum Item {
    Function(Function),
    Struct(StructDef),
    Enum(EnumDef),
    Trait(Trait),
    Impl(Impl),
    Const(ConstDef),
    TypeAlias(TypeAlias),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Function(f) => &f.name,
            Item::Struct(s) => &s.name,
            Item::Enum(e) => &e.name,
            Item::Trait(t) => &t.name,
            Item::Impl(_) => "<impl>",
            Item::Const(c) => &c.name,
            Item::TypeAlias(t) => &t.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Item::Function(f) => f.span,
            Item::Struct(s) => s.span,
            Item::Enum(e) => e.span,
            Item::Trait(t) => t.span,
            Item::Impl(i) => i.span,
            Item::Const(c) => c.span,
            Item::TypeAlias(t) => t.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub pattern: Pattern,
    pub ty: TypeNode,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfKind {
    Value,
    Ref,
    RefMut,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    /// `Some` makes this a method: the receiver's binding mode.
    pub self_param: Option<SelfKind>,
    pub params: Vec<Param>,
    pub ret: Option<TypeNode>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: String,
    /// Declaration order is the canonical field order.
    pub fields: Vec<(String, TypeNode)>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumVariant {
    pub name: String,
    pub payload: Option<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<EnumVariant>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum AssocItem {
    Function(Function),
    Const(ConstDef),
}

#[derive(Debug, Clone)]
pub struct Trait {
    pub name: String,
    pub items: Vec<AssocItem>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Impl {
    pub target: TypeNode,
    pub trait_ref: Option<String>,
    pub items: Vec<AssocItem>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ConstDef {
    pub name: String,
    pub ty: TypeNode,
    pub init: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeAlias {
    pub name: String,
    pub ty: TypeNode,
    pub span: Span,
}

/// An unresolved type as written by the programmer. The semantic core's
/// `type_query` turns this into a canonical `TypeId`.
#[derive(Debug, Clone)]
pub enum TypeNode {
    Path(Vec<String>),
    Primitive(PrimitiveKind),
    Unit,
    Array(Box<TypeNode>, Box<Expr>),
    Reference(Box<TypeNode>, bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    I32,
    U32,
    Isize,
    Usize,
    Bool,
    Char,
    Str,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub final_expr: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Let { pattern: Pattern, ty: Option<TypeNode>, init: Option<Expr>, span: Span },
    Expr(Expr),
    Item(Item),
}

#[derive(Debug, Clone)]
pub enum Pattern {
    Binding { name: String, mutable: bool, span: Span },
    Wildcard { span: Span },
    Literal { lit: Literal, span: Span },
    Reference { mutable: bool, sub: Box<Pattern>, span: Span },
    Struct { path: Vec<String>, fields: Vec<(String, Pattern)>, span: Span },
    Range { lo: Literal, hi: Literal, span: Span },
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Binding { span, .. }
            | Pattern::Wildcard { span }
            | Pattern::Literal { span, .. }
            | Pattern::Reference { span, .. }
            | Pattern::Struct { span, .. }
            | Pattern::Range { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Literal {
    Int { value: i64, suffix: Option<PrimitiveKind> },
    Bool(bool),
    Char(char),
    Str(String),
}

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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal { lit: Literal, span: Span },
    Path { segments: Vec<String>, span: Span },
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr>, span: Span },
    Unary { op: UnOp, operand: Box<Expr>, span: Span },
    Call { callee: Box<Expr>, args: Vec<Expr>, span: Span },
    MethodCall { receiver: Box<Expr>, method: String, args: Vec<Expr>, span: Span },
    Field { receiver: Box<Expr>, field: String, span: Span },
    Index { base: Box<Expr>, index: Box<Expr>, span: Span },
    StructLiteral { path: Vec<String>, fields: Vec<(String, Expr)>, span: Span },
    ArrayLiteral { elems: Vec<Expr>, span: Span },
    ArrayRepeat { value: Box<Expr>, count: Box<Expr>, span: Span },
    Block(Block),
    If { cond: Box<Expr>, then_branch: Block, else_branch: Option<Box<Expr>>, span: Span },
    Loop { body: Block, span: Span },
    While { cond: Box<Expr>, body: Block, span: Span },
    Break { value: Option<Box<Expr>>, span: Span },
    Continue { span: Span },
    Return { value: Option<Box<Expr>>, span: Span },
    Reference { mutable: bool, operand: Box<Expr>, span: Span },
    Deref { operand: Box<Expr>, span: Span },
    Assign { lhs: Box<Expr>, rhs: Box<Expr>, span: Span },
    CompoundAssign { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr>, span: Span },
    Cast { operand: Box<Expr>, ty: TypeNode, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. }
            | Expr::Path { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Call { span, .. }
            | Expr::MethodCall { span, .. }
            | Expr::Field { span, .. }
            | Expr::Index { span, .. }
            | Expr::StructLiteral { span, .. }
            | Expr::ArrayLiteral { span, .. }
            | Expr::ArrayRepeat { span, .. }
            | Expr::If { span, .. }
            | Expr::Loop { span, .. }
            | Expr::While { span, .. }
            | Expr::Break { span, .. }
            | Expr::Continue { span }
            | Expr::Return { span, .. }
            | Expr::Reference { span, .. }
            | Expr::Deref { span, .. }
            | Expr::Assign { span, .. }
            | Expr::CompoundAssign { span, .. }
            | Expr::Cast { span, .. } => *span,
            Expr::Block(b) => b.span,
        }
    }
}
