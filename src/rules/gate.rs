//! Applicability gate: which classes are FTC OpModes.

use std::collections::HashSet;

use crate::syntax::{NodeKind, SyntaxNode, SyntaxView};

/// Base classes that make a class an OpMode.
pub const BASE_TYPES: [&str; 2] = ["LinearOpMode", "OpMode"];

/// Annotations that register a class with the driver station.
pub const ANNOTATIONS: [&str; 2] = ["TeleOp", "Autonomous"];

/// Whether `class` is in scope for the gated rules.
///
/// A class qualifies if it carries `@TeleOp`/`@Autonomous` or extends a base
/// type, directly or through other classes declared in the same document.
/// Evaluated per class: one document may mix OpModes and helpers.
pub fn is_in_scope<'src>(view: &SyntaxView<'src>, class: &SyntaxNode<'src>) -> bool {
    let annotated = class
        .children_of(NodeKind::Annotation)
        .filter_map(|a| a.name_text())
        .any(|name| ANNOTATIONS.contains(&short_name(name)));

    annotated || extends_base(view, class, &mut HashSet::new())
}

fn extends_base<'src>(
    view: &SyntaxView<'src>,
    class: &SyntaxNode<'src>,
    visited: &mut HashSet<&'src str>,
) -> bool {
    if let Some(name) = class.name_text() {
        // Guards against `class A extends B` / `class B extends A`.
        if !visited.insert(name) {
            return false;
        }
    }

    class.supertypes.iter().any(|supertype| {
        let name = short_name(supertype);
        BASE_TYPES.contains(&name)
            || view
                .find_class(name)
                .is_some_and(|parent| extends_base(view, parent, visited))
    })
}

/// `com.qualcomm.robotcore.hardware.DcMotor` -> `DcMotor`, `List<X>` -> `List`.
pub fn short_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name).trim();
    base.rsplit('.').next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SourceDocument;

    fn scope_of(source: &str) -> Vec<(String, bool)> {
        let doc = SourceDocument::parse(source).unwrap();
        let view = doc.view();
        view.classes()
            .into_iter()
            .map(|c| (c.name_text().unwrap_or("").to_string(), is_in_scope(&view, c)))
            .collect()
    }

    #[test]
    fn test_direct_base_and_annotation() {
        let scopes = scope_of(
            r#"
class Drive extends LinearOpMode {}
@Autonomous(name = "Park")
class Park {}
class Helper {}
class Iter extends com.qualcomm.robotcore.eventloop.opmode.OpMode {}
"#,
        );
        assert_eq!(
            scopes,
            vec![
                ("Drive".to_string(), true),
                ("Park".to_string(), true),
                ("Helper".to_string(), false),
                ("Iter".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_transitive_base() {
        let scopes = scope_of(
            r#"
abstract class Base extends LinearOpMode {}
class Middle extends Base {}
class Leaf extends Middle {}
"#,
        );
        assert!(scopes.iter().all(|(_, in_scope)| *in_scope));
    }

    #[test]
    fn test_cycle_terminates() {
        let scopes = scope_of("class A extends B {}\nclass B extends A {}\n");
        assert!(scopes.iter().all(|(_, in_scope)| !*in_scope));
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("com.qualcomm.robotcore.hardware.DcMotor"), "DcMotor");
        assert_eq!(short_name("List<DcMotor>"), "List");
        assert_eq!(short_name("Servo"), "Servo");
    }
}
