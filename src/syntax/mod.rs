//! Syntax view over FTC robot programs.
//!
//! Documents are parsed with tree-sitter-java and reduced to a small tree of
//! [`SyntaxNode`]s (classes, methods, fields, statements, expressions,
//! literals, annotations). Pattern matchers only ever see this reduced tree,
//! so comments and string contents can never trigger a rule.
//!
//! ```text
//! ┌────────────┐     ┌───────────────┐     ┌─────────────┐
//! │ source text│────▶│ tree-sitter   │────▶│ SyntaxView  │
//! └────────────┘     │ (Java grammar)│     │ (SyntaxNode)│
//!                    └───────────────┘     └─────────────┘
//! ```

mod document;
mod java;
mod node;
mod span;
mod view;

pub(crate) use java::language;

pub use document::{SourceDocument, SyntaxError};
pub use node::{parse_numeric_literal, Declarator, Ident, NodeKind, SyntaxNode};
pub use span::Span;
pub use view::SyntaxView;
