//! Builds the reduced syntax tree from a tree-sitter-java parse tree.

use tree_sitter::{Language, Node, Parser};

use super::node::{Declarator, Ident, NodeKind, SyntaxNode};
use super::{Span, SyntaxError};

/// Grammar used for every document.
pub(crate) fn language() -> Language {
    tree_sitter_java::LANGUAGE.into()
}

pub(crate) fn parse(source: &str) -> Result<tree_sitter::Tree, SyntaxError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language())
        .map_err(|e| SyntaxError::Unavailable(format!("cannot load Java grammar: {}", e)))?;
    parser
        .parse(source, None)
        .ok_or_else(|| SyntaxError::Unavailable("parser produced no tree".to_string()))
}

/// Map a grammar node kind onto the reduced node kinds.
///
/// Anything unmapped is transparent: its mapped descendants are attached to
/// the closest mapped ancestor instead.
fn classify(grammar: &str) -> Option<NodeKind> {
    match grammar {
        "class_declaration" => Some(NodeKind::ClassDecl),
        "method_declaration" | "constructor_declaration" => Some(NodeKind::MethodDecl),
        "field_declaration" => Some(NodeKind::FieldDecl),
        "marker_annotation" | "annotation" => Some(NodeKind::Annotation),
        "block" | "local_variable_declaration" | "explicit_constructor_invocation" => {
            Some(NodeKind::Statement)
        }
        "method_invocation" | "field_access" | "array_access" => Some(NodeKind::Expression),
        "true" | "false" => Some(NodeKind::Literal),
        g if g.ends_with("_statement") => Some(NodeKind::Statement),
        g if g.ends_with("_expression") => Some(NodeKind::Expression),
        g if g.ends_with("_literal") => Some(NodeKind::Literal),
        _ => None,
    }
}

/// Build the top-level nodes of the reduced tree.
pub(crate) fn build<'src>(root: Node<'_>, source: &'src str) -> Vec<SyntaxNode<'src>> {
    let mut roots = Vec::new();
    collect_children(root, source, &mut roots);
    roots
}

fn collect_children<'src>(node: Node<'_>, source: &'src str, out: &mut Vec<SyntaxNode<'src>>) {
    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return;
    }
    loop {
        let child = cursor.node();
        let field = cursor.field_name();
        collect(child, field, source, out);
        if !cursor.goto_next_sibling() {
            break;
        }
    }
}

fn collect<'src>(
    node: Node<'_>,
    field: Option<&'static str>,
    source: &'src str,
    out: &mut Vec<SyntaxNode<'src>>,
) {
    // Comments never become nodes, and anonymous tokens have nothing to offer.
    if !node.is_named() || node.is_missing() || node.is_extra() {
        return;
    }

    match classify(node.kind()) {
        Some(kind) => {
            let span = Span::from_node(node);
            let mut mapped = SyntaxNode::new(kind, node.kind(), field, span, text_of(node, source));
            decorate(&mut mapped, node, source);
            collect_children(node, source, &mut mapped.children);
            out.push(mapped);
        }
        None => collect_children(node, source, out),
    }
}

fn text_of<'src>(node: Node<'_>, source: &'src str) -> &'src str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

fn ident<'src>(node: Node<'_>, source: &'src str) -> Ident<'src> {
    Ident {
        text: text_of(node, source),
        span: Span::from_node(node),
    }
}

fn field_ident<'src>(node: Node<'_>, field: &str, source: &'src str) -> Option<Ident<'src>> {
    node.child_by_field_name(field).map(|n| ident(n, source))
}

fn field_text<'src>(node: Node<'_>, field: &str, source: &'src str) -> Option<&'src str> {
    node.child_by_field_name(field).map(|n| text_of(n, source))
}

/// Fill in the names, receivers and other per-kind details.
fn decorate<'src>(mapped: &mut SyntaxNode<'src>, node: Node<'_>, source: &'src str) {
    match node.kind() {
        "class_declaration" => {
            mapped.name = field_ident(node, "name", source);
            mapped.supertypes = supertypes(node, source);
        }
        "method_declaration" | "constructor_declaration" => {
            mapped.name = field_ident(node, "name", source);
            mapped.qualifier = field_text(node, "type", source);
        }
        "field_declaration" | "local_variable_declaration" => {
            mapped.qualifier = field_text(node, "type", source);
            let mut cursor = node.walk();
            mapped.declarators = node
                .children_by_field_name("declarator", &mut cursor)
                .filter_map(|d| {
                    d.child_by_field_name("name").map(|name| Declarator {
                        name: ident(name, source),
                        span: Span::from_node(d),
                    })
                })
                .collect();
        }
        "marker_annotation" | "annotation" => {
            mapped.name = field_ident(node, "name", source);
        }
        "method_invocation" => {
            mapped.name = field_ident(node, "name", source);
            mapped.qualifier = field_text(node, "object", source);
            mapped.arguments = node.child_by_field_name("arguments").map(argument_spans);
        }
        "object_creation_expression" => {
            mapped.name = field_ident(node, "type", source);
            mapped.arguments = node.child_by_field_name("arguments").map(argument_spans);
        }
        "field_access" => {
            mapped.name = field_ident(node, "field", source);
            mapped.qualifier = field_text(node, "object", source);
        }
        "assignment_expression" => {
            mapped.name = field_ident(node, "left", source);
        }
        _ => {}
    }
}

fn argument_spans(arguments: Node<'_>) -> Vec<Span> {
    let mut cursor = arguments.walk();
    arguments
        .named_children(&mut cursor)
        .filter(|n| !n.is_extra())
        .map(Span::from_node)
        .collect()
}

fn supertypes<'src>(class: Node<'_>, source: &'src str) -> Vec<&'src str> {
    let mut types = Vec::new();

    if let Some(superclass) = class.child_by_field_name("superclass") {
        let mut cursor = superclass.walk();
        types.extend(
            superclass
                .named_children(&mut cursor)
                .filter(|n| !n.is_extra())
                .map(|n| text_of(n, source)),
        );
    }

    if let Some(interfaces) = class.child_by_field_name("interfaces") {
        let mut cursor = interfaces.walk();
        for list in interfaces.named_children(&mut cursor) {
            let mut inner = list.walk();
            types.extend(
                list.named_children(&mut inner)
                    .filter(|n| !n.is_extra())
                    .map(|n| text_of(n, source)),
            );
        }
    }

    types
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots(source: &str) -> Vec<SyntaxNode<'_>> {
        let tree = parse(source).unwrap();
        build(tree.root_node(), source)
    }

    #[test]
    fn test_class_with_supertypes_and_annotation() {
        let source = r#"
@TeleOp(name = "Drive")
public class Drive extends LinearOpMode implements Runnable {
    public void run() {}
}
"#;
        let roots = roots(source);
        assert_eq!(roots.len(), 1);
        let class = &roots[0];
        assert_eq!(class.kind, NodeKind::ClassDecl);
        assert_eq!(class.name_text(), Some("Drive"));
        assert_eq!(class.supertypes, vec!["LinearOpMode", "Runnable"]);

        let annotation = class.children_of(NodeKind::Annotation).next().unwrap();
        assert_eq!(annotation.name_text(), Some("TeleOp"));
        assert!(class.children_of(NodeKind::MethodDecl).any(|m| m.name_text() == Some("run")));
    }

    #[test]
    fn test_comments_and_strings_produce_no_nodes() {
        let source = r#"
class A {
    void m() {
        // waitForStart();
        String s = "waitForStart()";
    }
}
"#;
        let roots = roots(source);
        let calls: Vec<_> = roots[0]
            .descendants()
            .filter(|n| n.grammar == "method_invocation")
            .collect();
        assert!(calls.is_empty(), "no invocation should come from a comment or string");
    }

    #[test]
    fn test_invocation_details() {
        let source = r#"
class A {
    void m() {
        telemetry.addData("x", 1);
    }
}
"#;
        let roots = roots(source);
        let call = roots[0]
            .descendants()
            .find(|n| n.grammar == "method_invocation")
            .unwrap();
        assert_eq!(call.name_text(), Some("addData"));
        assert_eq!(call.qualifier, Some("telemetry"));
        assert_eq!(call.arguments.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_field_declarators() {
        let source = "class A { DcMotor left, right = null; }";
        let roots = roots(source);
        let field = roots[0].children_of(NodeKind::FieldDecl).next().unwrap();
        assert_eq!(field.qualifier, Some("DcMotor"));
        let names: Vec<_> = field.declarators.iter().map(|d| d.name.text).collect();
        assert_eq!(names, vec!["left", "right"]);
    }

    #[test]
    fn test_condition_field_is_recorded() {
        let source = "class A { void m() { if (x) { y(); } } }";
        let roots = roots(source);
        let condition = roots[0]
            .descendants()
            .find(|n| n.field == Some("condition"))
            .unwrap();
        assert_eq!(condition.grammar, "parenthesized_expression");
    }
}
