//! `runOpMode()` without `waitForStart()`.

use super::calls::WAIT_FOR_START;
use super::{Finding, Rule, RuleContext, RuleId, Scope};
use crate::fix::generate;

/// Entry method of a `LinearOpMode`.
pub const ENTRY_METHOD: &str = "runOpMode";

pub struct MissingStartSignal;

impl Rule for MissingStartSignal {
    fn id(&self) -> RuleId {
        RuleId::MissingStartSignal
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
            if method.name_text() != Some(ENTRY_METHOD) {
                continue;
            }
            let (Some(name), Some(body)) = (method.name, ctx.view.body(method)) else {
                continue;
            };
            if WAIT_FOR_START.occurs_in(body) {
                continue;
            }

            let fix = generate::insert_first_statement(
                ctx.document,
                body,
                "waitForStart();",
                "Insert waitForStart()",
            )
            .ok();
            findings.push(
                Finding::new(
                    self.id(),
                    ctx.document,
                    name.span,
                    "runOpMode() never calls waitForStart(); the robot moves before START is pressed",
                )
                .with_fix(fix),
            );
        }
        findings
    }
}
