//! Impl table: associates each nominal type with its inherent and
//! trait methods/associated constants.
//!
//! Registration happens once, during HIR conversion (`lower::lower_program`);
//! name resolution then uses `find_method`/`find_assoc` to resolve paths of
//! the form `Type::ident` and method calls `recv.ident(...)`.

use rustc_hash::FxHashMap;

use crate::entities::StructOrEnum;
use crate::ids::{ConstId, FunctionId, MethodId};

#[derive(Default, Clone)]
struct TypeImpls {
    methods: FxHashMap<String, MethodId>,
    assoc_functions: FxHashMap<String, FunctionId>,
    assoc_consts: FxHashMap<String, ConstId>,
    traits: Vec<String>,
}

/// Any associated value `find_assoc` can resolve a `Type::ident` path to.
#[derive(Debug, Clone, Copy)]
pub enum AssocTarget {
    Function(FunctionId),
    Const(ConstId),
}

#[derive(Default)]
pub struct ImplTable {
    by_type: FxHashMap<StructOrEnum, TypeImpls>,
}

impl ImplTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_method(&mut self, owner: StructOrEnum, name: String, id: MethodId) {
        self.by_type.entry(owner).or_default().methods.insert(name, id);
    }

    pub fn register_assoc_function(&mut self, owner: StructOrEnum, name: String, id: FunctionId) {
        self.by_type.entry(owner).or_default().assoc_functions.insert(name, id);
    }

    pub fn register_assoc_const(&mut self, owner: StructOrEnum, name: String, id: ConstId) {
        self.by_type.entry(owner).or_default().assoc_consts.insert(name, id);
    }

    pub fn register_trait(&mut self, owner: StructOrEnum, trait_name: String) {
        self.by_type.entry(owner).or_default().traits.push(trait_name);
    }

    pub fn find_method(&self, owner: StructOrEnum, name: &str) -> Option<MethodId> {
        self.by_type.get(&owner).and_then(|t| t.methods.get(name).copied())
    }

    /// Resolve `Type::ident` to either an associated function or constant.
    pub fn find_assoc(&self, owner: StructOrEnum, name: &str) -> Option<AssocTarget> {
        let impls = self.by_type.get(&owner)?;
        if let Some(&f) = impls.assoc_functions.get(name) {
            return Some(AssocTarget::Function(f));
        }
        if let Some(&c) = impls.assoc_consts.get(name) {
            return Some(AssocTarget::Const(c));
        }
        None
    }

    pub fn implements(&self, owner: StructOrEnum, trait_name: &str) -> bool {
        self.by_type.get(&owner).is_some_and(|t| t.traits.iter().any(|t| t == trait_name))
    }
}
