//! Fix generators: pure functions from syntax nodes to edits.

use super::{Edit, Fix, FixError};
use crate::syntax::{NodeKind, SourceDocument, Span, SyntaxNode};

/// Indentation added for statements inside a freshly opened block.
const INDENT_UNIT: &str = "    ";

/// Insert `statement` as the first statement of `body`.
pub fn insert_first_statement(
    doc: &SourceDocument,
    body: &SyntaxNode<'_>,
    statement: &str,
    label: &str,
) -> Result<Fix, FixError> {
    insert_first_statements(doc, body, &[statement.to_string()], label)
}

/// Insert `lines` (statements or `//` comments) at the top of `body`.
///
/// Existing statement indentation is reused. An empty single-line body
/// `{}` becomes `{ stmt }` unless a comment line forces a multi-line layout.
pub fn insert_first_statements(
    doc: &SourceDocument,
    body: &SyntaxNode<'_>,
    lines: &[String],
    label: &str,
) -> Result<Fix, FixError> {
    let (open, close) = block_interior(body)?;
    let multiline = lines.iter().any(|l| l.trim_start().starts_with("//"));
    let text = doc.text();

    let edit = match body.children_of(NodeKind::Statement).next() {
        Some(first) => {
            let before = &text[open..first.span.start];
            if before.contains('\n') {
                let indent = statement_indent(doc, first.span.start);
                let joined = lines.join(&format!("\n{}", indent));
                Edit::insert(first.span.start, format!("{}\n{}", joined, indent))
            } else if !multiline {
                Edit::insert(first.span.start, format!("{} ", lines.join(" ")))
            } else {
                let inner = format!("{}{}", doc.line_indent(body.span.start), INDENT_UNIT);
                let joined = lines.join(&format!("\n{}", inner));
                Edit::replace(
                    Span::new(open, open + leading_whitespace(before)),
                    format!("\n{}{}\n{}", inner, joined, inner),
                )
            }
        }
        None => empty_body_edit(doc, body, open, close, lines, multiline),
    };

    Ok(Fix::single(label, edit))
}

/// Append `statement` after the last statement of `body`.
pub fn append_last_statement(
    doc: &SourceDocument,
    body: &SyntaxNode<'_>,
    statement: &str,
    label: &str,
) -> Result<Fix, FixError> {
    let (open, close) = block_interior(body)?;
    let text = doc.text();

    let edit = match body.children_of(NodeKind::Statement).last() {
        Some(last) if is_jump(last) => insert_before(doc, last, statement),
        Some(last) => {
            let rest = &text[last.span.end..close];
            match rest.find('\n') {
                None => Edit::insert(last.span.end, format!(" {}", statement)),
                Some(newline) => {
                    // Keep a trailing comment attached to the statement it follows.
                    let tail = rest[..newline].trim();
                    let at = if tail.is_empty() || tail.starts_with("//") {
                        last.span.end + newline
                    } else {
                        last.span.end
                    };
                    let indent = statement_indent(doc, last.span.start);
                    Edit::insert(at, format!("\n{}{}", indent, statement))
                }
            }
        }
        None => empty_body_edit(doc, body, open, close, &[statement.to_string()], false),
    };

    Ok(Fix::single(label, edit))
}

fn empty_body_edit(
    doc: &SourceDocument,
    body: &SyntaxNode<'_>,
    open: usize,
    close: usize,
    lines: &[String],
    multiline: bool,
) -> Edit {
    let interior = &doc.text()[open..close];
    let lead = leading_whitespace(interior);
    if !interior.contains('\n') && !multiline {
        // Comments between the braces stay after the new statement.
        let trailing = if lead == 0 { " " } else { "" };
        return Edit::insert(open, format!(" {}{}", lines.join(" "), trailing));
    }

    let outer = doc.line_indent(body.span.start).to_string();
    let inner = format!("{}{}", outer, INDENT_UNIT);
    let joined = lines.join(&format!("\n{}", inner));
    if interior.contains('\n') {
        Edit::insert(open, format!("\n{}{}", inner, joined))
    } else if interior.trim().is_empty() {
        Edit::replace(
            Span::new(open, close),
            format!("\n{}{}\n{}", inner, joined, outer),
        )
    } else {
        Edit::replace(
            Span::new(open, open + lead),
            format!("\n{}{}\n{}", inner, joined, inner),
        )
    }
}

/// Control leaves the block at this statement; nothing may follow it.
fn is_jump(statement: &SyntaxNode<'_>) -> bool {
    matches!(
        statement.grammar,
        "return_statement"
            | "throw_statement"
            | "break_statement"
            | "continue_statement"
            | "yield_statement"
    )
}

/// Insert `statement` right before `anchor`, on its own line when `anchor`
/// starts one.
fn insert_before(doc: &SourceDocument, anchor: &SyntaxNode<'_>, statement: &str) -> Edit {
    let at = anchor.span.start;
    if doc.line_prefix(at).trim().is_empty() {
        let indent = statement_indent(doc, at);
        Edit::insert(at, format!("{}\n{}", statement, indent))
    } else {
        Edit::insert(at, format!("{} ", statement))
    }
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

/// Byte range strictly between the braces of a block.
fn block_interior(body: &SyntaxNode<'_>) -> Result<(usize, usize), FixError> {
    if body.grammar != "block" || !body.text.starts_with('{') || !body.text.ends_with('}') {
        return Err(FixError::NotApplicable(
            "method body is missing or incomplete".to_string(),
        ));
    }
    Ok((body.span.start + 1, body.span.end - 1))
}

/// Indentation to use for a statement placed next to the one at `offset`.
fn statement_indent(doc: &SourceDocument, offset: usize) -> String {
    let prefix = doc.line_prefix(offset);
    if prefix.trim().is_empty() {
        prefix.to_string()
    } else {
        format!("{}{}", doc.line_indent(offset), INDENT_UNIT)
    }
}
