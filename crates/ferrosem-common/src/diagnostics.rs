//! Semantic diagnostics - the error taxonomy raised by the semantic passes.
//!
//! Unlike a full compiler's diagnostic engine (locale-aware message catalogs,
//! related-information chains, suppression comments), the semantic core only
//! needs a flat, typed error with a message and a span; message formatting is
//! left to the (out-of-scope) presentation layer.

use crate::span::Span;

/// The kind of semantic failure, independent of its rendered message.
///
/// Each failure is tagged by *cause*, not by the specific HIR node that
/// triggered it, so callers can match on `kind` without parsing `message`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateDefinition,
    UnresolvedName,
    NotAType,
    NotAValue,
    TypeMismatch,
    MutabilityViolation,
    InvalidOperation,
    ConstRequirementFailed,
    CyclicConst,
    InvalidControlFlow,
    InvalidMainShape,
    MissingField,
    ExtraField,
    DuplicateField,
    ArityMismatch,
}

/// A single semantic error: a typed cause, a human-readable message, and the
/// span it was raised at (when known).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SemanticError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

impl SemanticError {
    pub fn new(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        SemanticError { kind, span, message: message.into() }
    }
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?})", self.message, self.kind)
    }
}

impl std::error::Error for SemanticError {}

/// Accumulates errors for a single item so the top-level driver can continue
/// analyzing later items after one fails (multi-error reporting), while a
/// single item's analysis itself remains fail-fast.
#[derive(Default, Debug)]
pub struct DiagnosticSink {
    errors: Vec<SemanticError>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: SemanticError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<SemanticError> {
        self.errors
    }

    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }
}
