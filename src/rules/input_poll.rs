//! Gamepad press polls outside of any conditional.

use super::{Finding, Rule, RuleContext, RuleId, Scope};
use crate::syntax::SyntaxNode;

/// Input devices whose press checks are tracked.
pub const GAMEPADS: [&str; 2] = ["gamepad1", "gamepad2"];

/// Grammar kinds that make evaluation conditional.
const CONDITIONALS: [&str; 3] = ["if_statement", "ternary_expression", "switch_expression"];

pub struct UnguardedInputPoll;

impl Rule for UnguardedInputPoll {
    fn id(&self) -> RuleId {
        RuleId::UnguardedInputPoll
    }

    fn scope(&self) -> Scope {
        Scope::Gated
    }

    fn check(&self, ctx: &RuleContext<'_, '_>) -> Vec<Finding> {
        let Some(class) = ctx.class else {
            return Vec::new();
        };

        let mut findings = Vec::new();
        for method in ctx.view.methods(class) {
            for statement in ctx.view.statements(method) {
                let Some(poll) = unguarded_poll(statement) else {
                    continue;
                };
                // No fix: where the check belongs needs a human.
                findings.push(Finding::new(
                    self.id(),
                    ctx.document,
                    statement.span,
                    format!(
                        "{}.{}() is polled outside a conditional; wrap it in an if",
                        poll.receiver().unwrap_or_default(),
                        poll.name_text().unwrap_or_default()
                    ),
                ));
            }
        }
        findings
    }
}

fn is_press_poll(node: &SyntaxNode<'_>) -> bool {
    node.grammar == "method_invocation"
        && node.receiver().is_some_and(|r| GAMEPADS.contains(&r))
        && node
            .name_text()
            .is_some_and(|n| n.to_lowercase().contains("pressed"))
}

/// First press poll in `statement` with no conditional on its path.
fn unguarded_poll<'a, 'src>(statement: &'a SyntaxNode<'src>) -> Option<&'a SyntaxNode<'src>> {
    let mut found = None;
    statement.walk_with_path(&mut |node, path| {
        if found.is_some() || !is_press_poll(node) {
            return;
        }
        let guarded = path
            .iter()
            .chain(std::iter::once(&node))
            .any(|n| CONDITIONALS.contains(&n.grammar) || n.field == Some("condition"));
        if !guarded {
            found = Some(node);
        }
    });
    found
}
