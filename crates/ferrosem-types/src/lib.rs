//! The canonical, interned type universe.
//!
//! `TypeUniverse` is a process-wide registry mapping structural type keys to
//! stable opaque `TypeId` handles. Two `TypeId`s compare equal iff they
//! represent the same structural type (invariant (a)); once issued, a
//! `TypeId` remains valid and comparable for the process lifetime
//! (invariant (b)).
//!
//! The core is single-threaded and cooperative: the interner uses a
//! `RefCell`, not a lock, because there is exactly one execution context and
//! no concurrent mutation to guard against. An implementation that
//! parallelizes passes later would need to swap this for a concurrent map.

use rustc_hash::FxHashMap;
use std::cell::RefCell;

/// A stable, opaque handle into the type universe.
///
/// `TypeId` is `Copy` and carries no structure itself - comparing two
/// `TypeId`s is comparing the handles, which is sound because the universe
/// deduplicates by structural key at `intern` time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TypeId(u32);

impl TypeId {
    /// Sentinel for error paths and "not yet known". Never produced by
    /// `intern`; only ever returned on failure.
    pub const INVALID: TypeId = TypeId(u32::MAX);

    pub fn is_invalid(self) -> bool {
        self == TypeId::INVALID
    }
}

/// Primitive type kinds, including the two integer-literal placeholders.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PrimitiveKind {
    I32,
    U32,
    Isize,
    Usize,
    Bool,
    Char,
    String,
    /// Placeholder for an unsuffixed integer literal, pinned down by coercion.
    AnyInt,
    /// Placeholder for an unsuffixed literal known to be non-negative context
    /// (e.g. an array-repeat count), pinned down by coercion.
    AnyUInt,
}

impl PrimitiveKind {
    pub fn is_integer(self) -> bool {
        !matches!(self, PrimitiveKind::Bool | PrimitiveKind::Char | PrimitiveKind::String)
    }

    pub fn is_signed(self) -> bool {
        matches!(self, PrimitiveKind::I32 | PrimitiveKind::Isize | PrimitiveKind::AnyInt)
    }

    pub fn is_placeholder(self) -> bool {
        matches!(self, PrimitiveKind::AnyInt | PrimitiveKind::AnyUInt)
    }
}

/// Distinguishes which nominal definition arena a `TypeKey::Nominal` id
/// refers to. The universe stores only the id, not the definition itself -
/// `StructDef`/`EnumDef` are owned by the HIR `Program`, not by the type
/// universe (ownership model).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum NominalKind {
    Struct,
    Enum,
}

/// The structural key a `TypeId` is interned from. Two equal keys always
/// produce the same `TypeId`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TypeKey {
    Primitive(PrimitiveKind),
    Nominal(NominalKind, u32),
    Reference(TypeId, bool),
    Array(TypeId, u64),
    Unit,
    Never,
}

#[derive(Default)]
struct Interner {
    keys: Vec<TypeKey>,
    by_key: FxHashMap<TypeKey, TypeId>,
}

/// The process-wide type interner.
///
/// Implementations that need more than one compilation unit alive at once
/// (e.g. a test suite) simply construct one `TypeUniverse` per unit - nothing
/// here is truly global static state, which also makes `reset` trivial: drop
/// the instance and build a new one.
pub struct TypeUniverse {
    inner: RefCell<Interner>,
}

impl Default for TypeUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeUniverse {
    pub fn new() -> Self {
        TypeUniverse { inner: RefCell::new(Interner::default()) }
    }

    /// Intern a structural key, returning its stable handle. Subsequent
    /// calls with an equal key return the same `TypeId` (invariant (a)).
    fn intern(&self, key: TypeKey) -> TypeId {
        let mut inner = self.inner.borrow_mut();
        if let Some(&id) = inner.by_key.get(&key) {
            return id;
        }
        let id = TypeId(inner.keys.len() as u32);
        inner.keys.push(key.clone());
        inner.by_key.insert(key, id);
        id
    }

    /// `TypeId::INVALID` reports as `TypeKey::Never` so a query run against
    /// an error-path type answers safely instead of indexing out of bounds;
    /// callers treat `Never` as the universal bottom type anyway.
    pub fn key_of(&self, id: TypeId) -> TypeKey {
        if id.is_invalid() {
            return TypeKey::Never;
        }
        self.inner.borrow().keys[id.0 as usize].clone()
    }

    // ---- constructors ----

    pub fn primitive(&self, kind: PrimitiveKind) -> TypeId {
        self.intern(TypeKey::Primitive(kind))
    }

    pub fn unit(&self) -> TypeId {
        self.intern(TypeKey::Unit)
    }

    pub fn never(&self) -> TypeId {
        self.intern(TypeKey::Never)
    }

    pub fn reference(&self, inner: TypeId, mutable: bool) -> TypeId {
        self.intern(TypeKey::Reference(inner, mutable))
    }

    pub fn array(&self, elem: TypeId, size: u64) -> TypeId {
        self.intern(TypeKey::Array(elem, size))
    }

    pub fn struct_of(&self, struct_id: u32) -> TypeId {
        self.intern(TypeKey::Nominal(NominalKind::Struct, struct_id))
    }

    pub fn enum_of(&self, enum_id: u32) -> TypeId {
        self.intern(TypeKey::Nominal(NominalKind::Enum, enum_id))
    }

    // ---- queries ----

    pub fn is_reference(&self, t: TypeId) -> bool {
        matches!(self.key_of(t), TypeKey::Reference(..))
    }

    pub fn is_mutable_reference(&self, t: TypeId) -> bool {
        matches!(self.key_of(t), TypeKey::Reference(_, true))
    }

    /// The referenced type, or `None` if `t` is not a reference.
    pub fn referenced(&self, t: TypeId) -> Option<TypeId> {
        match self.key_of(t) {
            TypeKey::Reference(inner, _) => Some(inner),
            _ => None,
        }
    }

    pub fn is_array(&self, t: TypeId) -> bool {
        matches!(self.key_of(t), TypeKey::Array(..))
    }

    pub fn array_parts(&self, t: TypeId) -> Option<(TypeId, u64)> {
        match self.key_of(t) {
            TypeKey::Array(elem, size) => Some((elem, size)),
            _ => None,
        }
    }

    pub fn is_unit(&self, t: TypeId) -> bool {
        matches!(self.key_of(t), TypeKey::Unit)
    }

    pub fn is_never(&self, t: TypeId) -> bool {
        matches!(self.key_of(t), TypeKey::Never)
    }

    pub fn is_integer(&self, t: TypeId) -> bool {
        matches!(self.key_of(t), TypeKey::Primitive(p) if p.is_integer())
    }

    /// Numeric for the purposes of arithmetic/comparison: any integer
    /// primitive (the language has no floats).
    pub fn is_numeric(&self, t: TypeId) -> bool {
        self.is_integer(t)
    }

    pub fn is_integer_placeholder(&self, t: TypeId) -> bool {
        matches!(self.key_of(t), TypeKey::Primitive(p) if p.is_placeholder())
    }

    pub fn primitive_kind(&self, t: TypeId) -> Option<PrimitiveKind> {
        match self.key_of(t) {
            TypeKey::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn nominal_parts(&self, t: TypeId) -> Option<(NominalKind, u32)> {
        match self.key_of(t) {
            TypeKey::Nominal(kind, id) => Some((kind, id)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedups_structurally_equal_keys() {
        let u = TypeUniverse::new();
        let a = u.primitive(PrimitiveKind::I32);
        let b = u.primitive(PrimitiveKind::I32);
        assert_eq!(a, b);
        let c = u.primitive(PrimitiveKind::U32);
        assert_ne!(a, c);
    }

    #[test]
    fn reference_combines_inner_and_mutability() {
        let u = TypeUniverse::new();
        let i32_ty = u.primitive(PrimitiveKind::I32);
        let r1 = u.reference(i32_ty, false);
        let r2 = u.reference(i32_ty, true);
        assert_ne!(r1, r2);
        assert!(u.is_reference(r1));
        assert!(!u.is_mutable_reference(r1));
        assert!(u.is_mutable_reference(r2));
        assert_eq!(u.referenced(r1), Some(i32_ty));
    }

    #[test]
    fn array_combines_element_and_size() {
        let u = TypeUniverse::new();
        let i32_ty = u.primitive(PrimitiveKind::I32);
        let a4 = u.array(i32_ty, 4);
        let a5 = u.array(i32_ty, 5);
        assert_ne!(a4, a5);
        assert_eq!(u.array_parts(a4), Some((i32_ty, 4)));
    }

    #[test]
    fn nominal_types_hash_by_definition_id() {
        let u = TypeUniverse::new();
        let s1 = u.struct_of(0);
        let s2 = u.struct_of(0);
        let s3 = u.struct_of(1);
        let e1 = u.enum_of(0);
        assert_eq!(s1, s2);
        assert_ne!(s1, s3);
        // A struct and an enum with the same definition id are still distinct.
        assert_ne!(s1, e1);
    }

    #[test]
    fn handles_remain_stable_across_many_interns() {
        let u = TypeUniverse::new();
        let first = u.primitive(PrimitiveKind::Bool);
        for i in 0..100 {
            u.array(u.primitive(PrimitiveKind::I32), i);
        }
        let first_again = u.primitive(PrimitiveKind::Bool);
        assert_eq!(first, first_again);
    }
}
