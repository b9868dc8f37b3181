//! The reduced syntax tree handed to pattern matchers.

use std::fmt;

use super::Span;

/// Kind tag of a [`SyntaxNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    ClassDecl,
    MethodDecl,
    FieldDecl,
    Statement,
    Expression,
    Literal,
    Annotation,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::ClassDecl => "class",
            NodeKind::MethodDecl => "method",
            NodeKind::FieldDecl => "field",
            NodeKind::Statement => "statement",
            NodeKind::Expression => "expression",
            NodeKind::Literal => "literal",
            NodeKind::Annotation => "annotation",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An identifier together with where it sits in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'src> {
    pub text: &'src str,
    pub span: Span,
}

/// One variable of a field or local declaration (`DcMotor left, right;` has two).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declarator<'src> {
    pub name: Ident<'src>,
    /// The whole declarator, initializer included.
    pub span: Span,
}

/// A node of the reduced tree.
///
/// Children are strictly contained in the parent span, never overlap each
/// other and are kept in source order.
#[derive(Debug, Clone)]
pub struct SyntaxNode<'src> {
    pub kind: NodeKind,
    /// Grammar node kind this node was built from (e.g. `if_statement`).
    pub grammar: &'static str,
    /// Grammar field the node occupies in its parent (e.g. `condition`).
    pub field: Option<&'static str>,
    pub span: Span,
    pub text: &'src str,
    /// Declared name, invoked method, constructed type or assignment target.
    pub name: Option<Ident<'src>>,
    /// Call receiver, accessed object, or declared type.
    pub qualifier: Option<&'src str>,
    /// Spans of the call or construction arguments, in order.
    pub arguments: Option<Vec<Span>>,
    /// Supertypes named in `extends`/`implements` (classes only).
    pub supertypes: Vec<&'src str>,
    /// Declared variables (field and local declarations only).
    pub declarators: Vec<Declarator<'src>>,
    pub children: Vec<SyntaxNode<'src>>,
}

impl<'src> SyntaxNode<'src> {
    pub(crate) fn new(
        kind: NodeKind,
        grammar: &'static str,
        field: Option<&'static str>,
        span: Span,
        text: &'src str,
    ) -> Self {
        Self {
            kind,
            grammar,
            field,
            span,
            text,
            name: None,
            qualifier: None,
            arguments: None,
            supertypes: Vec::new(),
            declarators: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    /// Name text, if the node has one.
    pub fn name_text(&self) -> Option<&'src str> {
        self.name.map(|n| n.text)
    }

    /// Receiver with a leading `this.` removed.
    pub fn receiver(&self) -> Option<&'src str> {
        self.qualifier.map(|q| q.strip_prefix("this.").unwrap_or(q))
    }

    /// Direct children of the given kind.
    pub fn children_of(&self, kind: NodeKind) -> impl Iterator<Item = &SyntaxNode<'src>> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Pre-order iterator over this node and all of its descendants.
    pub fn descendants(&self) -> Descendants<'_, 'src> {
        Descendants { stack: vec![self] }
    }

    /// Visit every descendant together with the chain of nodes leading to it.
    ///
    /// The path starts with `self` and ends with the visited node's parent.
    pub fn walk_with_path<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a SyntaxNode<'src>, &[&'a SyntaxNode<'src>]),
    {
        let mut path = vec![self];
        for child in &self.children {
            walk_inner(child, &mut path, visit);
        }
    }

    /// Numeric value of a literal, or of a literal behind a unary sign.
    pub fn numeric_value(&self) -> Option<f64> {
        match self.kind {
            NodeKind::Literal => parse_numeric_literal(self.grammar, self.text),
            NodeKind::Expression if self.grammar == "unary_expression" => {
                let [operand] = self.children.as_slice() else {
                    return None;
                };
                if operand.kind != NodeKind::Literal {
                    return None;
                }
                let value = parse_numeric_literal(operand.grammar, operand.text)?;
                match self.text.trim_start().chars().next() {
                    Some('-') => Some(-value),
                    Some('+') => Some(value),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

fn walk_inner<'a, 'src, F>(
    node: &'a SyntaxNode<'src>,
    path: &mut Vec<&'a SyntaxNode<'src>>,
    visit: &mut F,
) where
    F: FnMut(&'a SyntaxNode<'src>, &[&'a SyntaxNode<'src>]),
{
    visit(node, path);
    path.push(node);
    for child in &node.children {
        walk_inner(child, path, visit);
    }
    path.pop();
}

/// Pre-order traversal returned by [`SyntaxNode::descendants`].
pub struct Descendants<'a, 'src> {
    stack: Vec<&'a SyntaxNode<'src>>,
}

impl<'a, 'src> Iterator for Descendants<'a, 'src> {
    type Item = &'a SyntaxNode<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Parse a decimal integer or floating point literal.
///
/// Accepts Java digit separators and type suffixes (`1_000`, `36.0d`, `2f`).
pub fn parse_numeric_literal(grammar: &str, text: &str) -> Option<f64> {
    if grammar != "decimal_integer_literal" && grammar != "decimal_floating_point_literal" {
        return None;
    }
    let cleaned: String = text
        .trim()
        .trim_end_matches(['d', 'D', 'f', 'F', 'l', 'L'])
        .chars()
        .filter(|c| *c != '_')
        .collect();
    cleaned.parse::<f64>().ok()
}
