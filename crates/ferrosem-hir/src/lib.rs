//! HIR data model, arenas, and AST-to-HIR conversion for the semantic core.
//!
//! This crate owns the HIR's shape but none of its semantics: name
//! resolution, type checking, control-flow linking and the exit check all
//! live downstream and mutate the refinement slots defined here.

pub mod arena;
pub mod entities;
pub mod ids;
pub mod impl_table;
pub mod lower;

pub use arena::{HirArena, Program};
pub use entities::*;
pub use ids::*;
pub use impl_table::{AssocTarget, ImplTable};
pub use lower::{lower_program, LoweredProgram};
