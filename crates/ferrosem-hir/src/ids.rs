//! Arena index types.
//!
//! The HIR is stored as a set of flat arenas on `HirArena`, indexed by the
//! `Copy` handles below - the same pattern the type universe uses for
//! `TypeId`. Cross-references within the HIR (`call.target`,
//! `return/break/continue.target`, `BindingDef.local`, ...) are plain
//! non-owning ids into these arenas, never `Rc`/`RefCell`.

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(ExprId);
arena_id!(StmtId);
arena_id!(PatId);
arena_id!(LocalId);
arena_id!(FunctionId);
arena_id!(MethodId);
arena_id!(StructId);
arena_id!(EnumId);
arena_id!(TraitId);
arena_id!(ImplId);
arena_id!(ConstId);
arena_id!(TypeAliasId);
