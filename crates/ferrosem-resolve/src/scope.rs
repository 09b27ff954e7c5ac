//! Lexical scope stack and the three-namespace symbol table.
//!
//! Scopes are arena-allocated (mirroring the HIR's own arena-of-ids shape)
//! and stack-discipline-pushed/popped by the name resolution pass; nothing
//! outside that pass retains a `ScopeId` once the pass returns, matching the
//! "stack-allocated for the lifetime of name resolution" resource note.

use rustc_hash::FxHashMap;

use ferrosem_hir::{ConstId, EnumId, FunctionId, LocalId, StructId, TraitId, TypeAliasId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

/// What a name resolves to in the value namespace (bindings + items).
#[derive(Debug, Clone, Copy)]
pub enum ValueDef {
    Local(LocalId),
    Const(ConstId),
    Function(FunctionId),
}

/// What a name resolves to in the type namespace.
#[derive(Debug, Clone, Copy)]
pub enum TypeDef {
    Struct(StructId),
    Enum(EnumId),
    Trait(TraitId),
    Alias(TypeAliasId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
    Impl,
}

impl ScopeKind {
    /// Function scopes are boundaries: the language has no capturing
    /// closures, so binding lookup must not cross into an enclosing function.
    fn is_boundary(self) -> bool {
        matches!(self, ScopeKind::Function)
    }
}

struct ScopeData {
    parent: Option<ScopeId>,
    boundary: bool,
    items: FxHashMap<String, ValueDef>,
    bindings: FxHashMap<String, ValueDef>,
    types: FxHashMap<String, TypeDef>,
}

impl ScopeData {
    fn new(parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        ScopeData {
            parent,
            boundary: kind.is_boundary(),
            items: FxHashMap::default(),
            bindings: FxHashMap::default(),
            types: FxHashMap::default(),
        }
    }
}

/// The scope stack maintained by the name resolution pass.
pub struct Scopes {
    arena: Vec<ScopeData>,
    stack: Vec<ScopeId>,
}

impl Scopes {
    pub fn new() -> Self {
        let arena = vec![ScopeData::new(None, ScopeKind::Global)];
        Scopes { arena, stack: vec![ScopeId(0)] }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn current(&self) -> ScopeId {
        *self.stack.last().expect("scope stack is never empty")
    }

    /// Push a new scope as a child of the current one, entering it.
    pub fn push(&mut self, kind: ScopeKind) -> ScopeId {
        let parent = self.current();
        self.arena.push(ScopeData::new(Some(parent), kind));
        let id = ScopeId((self.arena.len() - 1) as u32);
        self.stack.push(id);
        id
    }

    /// Leave the current scope, returning to its parent.
    pub fn pop(&mut self) {
        assert!(self.stack.len() > 1, "cannot pop the global scope");
        self.stack.pop();
    }

    fn data(&self, id: ScopeId) -> &ScopeData {
        &self.arena[id.0 as usize]
    }

    fn data_mut(&mut self, id: ScopeId) -> &mut ScopeData {
        &mut self.arena[id.0 as usize]
    }

    /// Insert into the current scope's item namespace. `false` on a
    /// duplicate name within this same scope.
    pub fn define_item(&mut self, name: &str, def: ValueDef) -> bool {
        let scope = self.current();
        let items = &mut self.data_mut(scope).items;
        if items.contains_key(name) {
            return false;
        }
        items.insert(name.to_string(), def);
        true
    }

    /// Insert into the current scope's binding namespace. A binding of the
    /// same name in the same scope simply shadows the previous one.
    pub fn define_binding(&mut self, name: &str, def: ValueDef) {
        let scope = self.current();
        self.data_mut(scope).bindings.insert(name.to_string(), def);
    }

    /// Insert into the current scope's type namespace. `false` on a
    /// duplicate name within this same scope.
    pub fn define_type(&mut self, name: &str, def: TypeDef) -> bool {
        let scope = self.current();
        let types = &mut self.data_mut(scope).types;
        if types.contains_key(name) {
            return false;
        }
        types.insert(name.to_string(), def);
        true
    }

    /// Walk the scope chain from the current scope outward. Bindings stop
    /// being visible once a boundary scope has been crossed; items and
    /// types remain visible through every boundary.
    pub fn lookup_value(&self, name: &str) -> Option<ValueDef> {
        let mut scope = Some(self.current());
        let mut bindings_visible = true;
        while let Some(id) = scope {
            let data = self.data(id);
            if bindings_visible {
                if let Some(&def) = data.bindings.get(name) {
                    return Some(def);
                }
            }
            if let Some(&def) = data.items.get(name) {
                return Some(def);
            }
            if data.boundary {
                bindings_visible = false;
            }
            scope = data.parent;
        }
        None
    }

    pub fn lookup_type(&self, name: &str) -> Option<TypeDef> {
        let mut scope = Some(self.current());
        while let Some(id) = scope {
            let data = self.data(id);
            if let Some(&def) = data.types.get(name) {
                return Some(def);
            }
            scope = data.parent;
        }
        None
    }

    /// Current scope only - used for duplicate-binding diagnostics at a
    /// single lexical level (e.g. two parameters with the same name).
    pub fn lookup_value_local(&self, name: &str) -> Option<ValueDef> {
        let data = self.data(self.current());
        data.bindings.get(name).or_else(|| data.items.get(name)).copied()
    }

    /// A snapshot of the root scope's item/type namespaces, exported once
    /// the pass completes (see `names::GlobalNames`).
    pub fn snapshot_global(&self) -> (FxHashMap<String, ValueDef>, FxHashMap<String, TypeDef>) {
        let root = self.data(self.global());
        (root.items.clone(), root.types.clone())
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}
