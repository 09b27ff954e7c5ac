//! The flat arenas that own every HIR node (ownership model).
//!
//! `Program` owns a `HirArena`; everything else - scopes, the impl table,
//! the query service's caches - holds `Copy` ids into it.

use crate::entities::*;
use crate::ids::*;

#[derive(Default)]
pub struct HirArena {
    pub exprs: Vec<ExprData>,
    pub stmts: Vec<StmtData>,
    pub pats: Vec<PatternData>,
    pub locals: Vec<Local>,
    pub functions: Vec<Function>,
    pub methods: Vec<Method>,
    pub structs: Vec<StructDef>,
    pub enums: Vec<EnumDef>,
    pub traits: Vec<Trait>,
    pub impls: Vec<Impl>,
    pub consts: Vec<ConstDef>,
    pub type_aliases: Vec<TypeAliasDef>,
}

macro_rules! accessors {
    ($field:ident, $id:ty, $data:ty, $push:ident, $get:ident, $get_mut:ident) => {
        pub fn $push(&mut self, value: $data) -> $id {
            self.$field.push(value);
            <$id>::new_at(self.$field.len() - 1)
        }

        pub fn $get(&self, id: $id) -> &$data {
            &self.$field[id.index()]
        }

        pub fn $get_mut(&mut self, id: $id) -> &mut $data {
            &mut self.$field[id.index()]
        }
    };
}

trait NewAt: Sized {
    fn new_at(index: usize) -> Self;
}

macro_rules! new_at {
    ($id:ty) => {
        impl NewAt for $id {
            fn new_at(index: usize) -> Self {
                Self(index as u32)
            }
        }
    };
}

new_at!(ExprId);
new_at!(StmtId);
new_at!(PatId);
new_at!(LocalId);
new_at!(FunctionId);
new_at!(MethodId);
new_at!(StructId);
new_at!(EnumId);
new_at!(TraitId);
new_at!(ImplId);
new_at!(ConstId);
new_at!(TypeAliasId);

impl HirArena {
    pub fn new() -> Self {
        Self::default()
    }

    accessors!(exprs, ExprId, ExprData, push_expr, expr, expr_mut);
    accessors!(stmts, StmtId, StmtData, push_stmt, stmt, stmt_mut);
    accessors!(pats, PatId, PatternData, push_pat, pat, pat_mut);
    accessors!(locals, LocalId, Local, push_local, local, local_mut);
    accessors!(functions, FunctionId, Function, push_function, function, function_mut);
    accessors!(methods, MethodId, Method, push_method, method, method_mut);
    accessors!(structs, StructId, StructDef, push_struct, strukt, strukt_mut);
    accessors!(enums, EnumId, EnumDef, push_enum, enum_def, enum_def_mut);
    accessors!(traits, TraitId, Trait, push_trait, trait_def, trait_def_mut);
    accessors!(impls, ImplId, Impl, push_impl, impl_def, impl_def_mut);
    accessors!(consts, ConstId, ConstDef, push_const, const_def, const_def_mut);
    accessors!(type_aliases, TypeAliasId, TypeAliasDef, push_type_alias, type_alias, type_alias_mut);
}

/// A fully HIR-converted compilation unit: `items` is the ordered
/// top-level item list; `arena` owns every node reachable from it.
pub struct Program {
    pub items: Vec<ItemRef>,
    pub arena: HirArena,
}
