//! Coercion and unification.

use ferrosem_types::{PrimitiveKind, TypeUniverse};
use ferrosem_types::TypeId;

/// `coerce(from, to)`: identity, `Never`-to-anything, and integer-placeholder
/// widening are the only admissible implicit conversions.
pub fn coerce(universe: &TypeUniverse, from: TypeId, to: TypeId) -> Option<TypeId> {
    if from == to {
        return Some(to);
    }
    if universe.is_never(from) {
        return Some(to);
    }
    let (Some(from_p), Some(to_p)) = (universe.primitive_kind(from), universe.primitive_kind(to)) else {
        return None;
    };
    match (from_p, to_p) {
        (PrimitiveKind::AnyInt, PrimitiveKind::I32 | PrimitiveKind::Isize) => Some(to),
        (PrimitiveKind::AnyUInt, PrimitiveKind::U32 | PrimitiveKind::Usize | PrimitiveKind::AnyInt) => Some(to),
        _ => None,
    }
}

pub fn is_assignable_to(universe: &TypeUniverse, from: TypeId, to: TypeId) -> bool {
    coerce(universe, from, to).is_some()
}

/// Unify two types for contexts like `if`/`loop` arms: identical types unify
/// to themselves; a placeholder unifies to the other side when compatible;
/// `Never` unifies to the other side unconditionally.
pub fn unify(universe: &TypeUniverse, a: TypeId, b: TypeId) -> Option<TypeId> {
    if a == b {
        return Some(a);
    }
    if universe.is_never(a) {
        return Some(b);
    }
    if universe.is_never(b) {
        return Some(a);
    }
    if coerce(universe, a, b).is_some() {
        return Some(b);
    }
    if coerce(universe, b, a).is_some() {
        return Some(a);
    }
    None
}

/// Pin an unresolved integer-literal placeholder to its statement-boundary
/// default: `AnyInt` -> `I32`, `AnyUInt` -> `U32`.
pub fn finalize_placeholder(universe: &TypeUniverse, t: TypeId) -> TypeId {
    match universe.primitive_kind(t) {
        Some(PrimitiveKind::AnyInt) => universe.primitive(PrimitiveKind::I32),
        Some(PrimitiveKind::AnyUInt) => universe.primitive(PrimitiveKind::U32),
        _ => t,
    }
}
