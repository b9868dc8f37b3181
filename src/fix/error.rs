//! Errors returned by fix generation and application.

use thiserror::Error;

use crate::rules::RuleId;
use crate::syntax::{Span, SyntaxError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FixError {
    /// The document could not be parsed into a syntax view.
    #[error(transparent)]
    Unavailable(#[from] SyntaxError),

    /// Two edits of one batch touch the same text. Nothing was applied.
    #[error("conflicting edits: {first} overlaps {second}")]
    Conflict { first: Span, second: Span },

    /// The finding's preconditions no longer hold.
    #[error("fix not applicable: {0}")]
    NotApplicable(String),

    /// The rule still reports at the same anchor after its fix was applied.
    #[error("rule {rule} still reports at {span} after its fix was applied")]
    NotIdempotent { rule: RuleId, span: Span },

    /// An edit does not fit the document it is applied to.
    #[error("edit {span} is outside the document (length {len}) or splits a character")]
    OutOfBounds { span: Span, len: usize },
}
