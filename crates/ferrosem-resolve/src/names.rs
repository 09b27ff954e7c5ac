//! The post-resolution global name snapshot handed to the semantic query
//! service (`ferrosem-check`).
//!
//! The lexical scope *stack* used during name resolution is
//! discarded once the pass returns - nothing downstream walks scopes.
//! `type_query` still needs to resolve bare type-position paths
//! like `Foo` to a `StructDef`/`EnumDef`, though, so the pass exports the
//! root scope's item/type namespaces (functions, consts, structs, enums,
//! traits declared at the top level, plus builtins) as a flat, immutable
//! table. Block-scoped local item definitions are not re-exposed here: no
//! scenario in this language's surface syntax resolves a type-position name
//! to one, so a flat top-level table is sufficient.

use rustc_hash::FxHashMap;

use crate::scope::{Scopes, TypeDef, ValueDef};

#[derive(Default)]
pub struct GlobalNames {
    pub types: FxHashMap<String, TypeDef>,
    pub values: FxHashMap<String, ValueDef>,
}

impl GlobalNames {
    pub fn lookup_type(&self, name: &str) -> Option<TypeDef> {
        self.types.get(name).copied()
    }

    pub fn lookup_value(&self, name: &str) -> Option<ValueDef> {
        self.values.get(name).copied()
    }
}

pub(crate) fn snapshot_global(scopes: &Scopes) -> GlobalNames {
    let (values, types) = scopes.snapshot_global();
    GlobalNames { types, values }
}
