//! Scope/symbol-table machinery and the name resolution pass.

pub mod builtins;
pub mod names;
pub mod pass;
pub mod scope;

pub use builtins::Builtins;
pub use names::GlobalNames;
pub use pass::{resolve_program, ResolveOutput};
pub use scope::{ScopeKind, Scopes, TypeDef, ValueDef};
