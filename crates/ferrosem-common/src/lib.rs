//! Shared types and utilities for the ferrosem semantic core.
//!
//! This crate has no dependency on the AST, HIR, or type universe - it only
//! defines the vocabulary they all share: source spans and diagnostics.

pub mod diagnostics;
pub mod limits;
pub mod span;

pub use diagnostics::{DiagnosticSink, ErrorKind, SemanticError};
pub use span::{Span, Spanned};
