//! Read-only queries over the reduced syntax tree.

use super::{NodeKind, Span, SyntaxNode};

/// Facade over a parsed document exposing declarations, bodies, statements
/// and literals.
#[derive(Debug)]
pub struct SyntaxView<'src> {
    roots: Vec<SyntaxNode<'src>>,
}

impl<'src> SyntaxView<'src> {
    pub(crate) fn new(roots: Vec<SyntaxNode<'src>>) -> Self {
        Self { roots }
    }

    /// Top-level nodes in document order.
    pub fn roots(&self) -> &[SyntaxNode<'src>] {
        &self.roots
    }

    /// Every node of the document in pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = &SyntaxNode<'src>> {
        self.roots.iter().flat_map(|r| r.descendants())
    }

    /// All class declarations, nested ones included, in document order.
    pub fn classes(&self) -> Vec<&SyntaxNode<'src>> {
        self.nodes().filter(|n| n.is(NodeKind::ClassDecl)).collect()
    }

    /// Find a class declared anywhere in the document by simple name.
    pub fn find_class(&self, name: &str) -> Option<&SyntaxNode<'src>> {
        self.nodes()
            .find(|n| n.is(NodeKind::ClassDecl) && n.name_text() == Some(name))
    }

    /// Methods declared directly in `class`.
    pub fn methods<'a>(&self, class: &'a SyntaxNode<'src>) -> Vec<&'a SyntaxNode<'src>> {
        class.children_of(NodeKind::MethodDecl).collect()
    }

    /// First method declared directly in `class` with the given name.
    pub fn find_method<'a>(
        &self,
        class: &'a SyntaxNode<'src>,
        name: &str,
    ) -> Option<&'a SyntaxNode<'src>> {
        class
            .children_of(NodeKind::MethodDecl)
            .find(|m| m.name_text() == Some(name))
    }

    /// Fields declared directly in `class`.
    pub fn fields<'a>(&self, class: &'a SyntaxNode<'src>) -> Vec<&'a SyntaxNode<'src>> {
        class.children_of(NodeKind::FieldDecl).collect()
    }

    /// The body block of a method, if it has one.
    pub fn body<'a>(&self, method: &'a SyntaxNode<'src>) -> Option<&'a SyntaxNode<'src>> {
        method
            .children_of(NodeKind::Statement)
            .find(|s| s.grammar == "block" && s.field == Some("body"))
    }

    /// Top-level statements of a method body.
    pub fn statements<'a>(&self, method: &'a SyntaxNode<'src>) -> Vec<&'a SyntaxNode<'src>> {
        self.body(method)
            .map(|b| b.children_of(NodeKind::Statement).collect())
            .unwrap_or_default()
    }

    /// Literal nodes inside `span`, in document order.
    pub fn literals(&self, span: Option<Span>) -> Vec<&SyntaxNode<'src>> {
        self.nodes()
            .filter(|n| n.is(NodeKind::Literal))
            .filter(|n| span.map_or(true, |s| s.contains(n.span)))
            .collect()
    }
}
