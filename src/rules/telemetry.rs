//! Telemetry staged with `addData` but never flushed.

use super::calls::{TELEMETRY_ADD_DATA, TELEMETRY_UPDATE};
use super::{Finding, Rule, RuleContext, RuleId, Scope};
use crate::fix::generate;

pub struct MissingTelemetryFlush;

impl Rule for MissingTelemetryFlush {
    fn id(&self) -> RuleId {
        RuleId::MissingTelemetryFlush
    }

    fn scope(&self) -> Scope {
        Scope::Gated
    }

    fn check(&self, ctx: &RuleContext<'_, '_>) -> Vec<Finding> {
        let Some(class) = ctx.class else {
            return Vec::new();
        };

        ctx.view
            .methods(class)
            .into_iter()
            .filter_map(|method| {
                let name = method.name?;
                let body = ctx.view.body(method)?;
                if !TELEMETRY_ADD_DATA.occurs_in(body) || TELEMETRY_UPDATE.occurs_in(body) {
                    return None;
                }

                // Appended last so every addData above it gets flushed.
                let fix = generate::append_last_statement(
                    ctx.document,
                    body,
                    "telemetry.update();",
                    "Append telemetry.update()",
                )
                .ok();
                Some(
                    Finding::new(
                        self.id(),
                        ctx.document,
                        name.span,
                        format!(
                            "{}() adds telemetry data but never calls telemetry.update()",
                            name.text
                        ),
                    )
                    .with_fix(fix),
                )
            })
            .collect()
    }
}
