//! Source documents: text plus its parse tree.

use thiserror::Error;

use super::{java, Span, SyntaxView};

/// Errors raised while building a syntax view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// The parser could not produce a tree at all.
    #[error("syntax view unavailable: {0}")]
    Unavailable(String),
}

/// Immutable document snapshot handed over by the host for one operation.
pub struct SourceDocument {
    text: String,
    tree: tree_sitter::Tree,
    line_starts: Vec<usize>,
}

impl SourceDocument {
    /// Parse source text into a document.
    ///
    /// Partial parse errors still produce a document (check [`has_errors`]).
    ///
    /// [`has_errors`]: SourceDocument::has_errors
    pub fn parse(text: impl Into<String>) -> Result<Self, SyntaxError> {
        let text = text.into();
        let tree = java::parse(&text)?;
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Ok(Self {
            text,
            tree,
            line_starts,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Read an arbitrary span. Returns None when the span is out of range or
    /// splits a UTF-8 sequence.
    pub fn slice(&self, span: Span) -> Option<&str> {
        self.text.get(span.start..span.end)
    }

    /// Whether the parse tree contains ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// 1-indexed line and column of a byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let column = offset.saturating_sub(self.line_starts[line]);
        (line + 1, column + 1)
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn line_indent(&self, offset: usize) -> &str {
        let (line, _) = self.line_col(offset);
        let start = self.line_starts[line - 1];
        let rest = &self.text[start..];
        let width = rest
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(rest.len());
        &rest[..width]
    }

    /// Text between the start of the line and `offset`.
    pub fn line_prefix(&self, offset: usize) -> &str {
        let (line, _) = self.line_col(offset);
        let start = self.line_starts[line - 1];
        self.text.get(start..offset).unwrap_or("")
    }

    /// Raw parse tree, for tree-sitter queries.
    pub(crate) fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// Build the reduced syntax view.
    pub fn view(&self) -> SyntaxView<'_> {
        SyntaxView::new(java::build(self.tree.root_node(), &self.text))
    }
}

impl std::fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDocument")
            .field("len", &self.text.len())
            .field("has_errors", &self.has_errors())
            .finish()
    }
}
