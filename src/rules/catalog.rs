//! The ordered rule catalog.

use tracing::debug;

use super::{
    gate, Finding, MissingStartSignal, MissingTelemetryFlush, Rule, RuleContext, RuleId, Scope,
    Severity, UnguardedInputPoll, UninitializedHardwareField,
};
use crate::config::Config;
use crate::convert::{self, Direction};
use crate::syntax::{SourceDocument, Span};

struct Entry {
    rule: Box<dyn Rule>,
    severity: Severity,
}

/// Rules in declaration order. The order breaks ties between findings that
/// share an anchor start.
pub struct RuleCatalog {
    entries: Vec<Entry>,
}

impl RuleCatalog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a rule with its default severity.
    pub fn with_rule<R: Rule + 'static>(self, rule: R) -> Self {
        let severity = rule.id().default_severity();
        self.with_rule_severity(rule, severity)
    }

    pub fn with_rule_severity<R: Rule + 'static>(mut self, rule: R, severity: Severity) -> Self {
        self.entries.push(Entry {
            rule: Box::new(rule),
            severity,
        });
        self
    }

    /// The defect rules, minus those disabled in `config`.
    pub fn defects(config: &Config) -> Self {
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(MissingStartSignal),
            Box::new(MissingTelemetryFlush),
            Box::new(UnguardedInputPoll),
            Box::new(UninitializedHardwareField::new(
                config.extra_hardware_types.clone(),
            )),
        ];

        let entries = rules
            .into_iter()
            .filter(|rule| config.is_enabled(rule.id()))
            .map(|rule| Entry {
                severity: config.severity_for(rule.id()),
                rule,
            })
            .collect();
        Self { entries }
    }

    /// The pair of conversion rules for one direction.
    pub fn conversion(direction: Direction, half_extent: f64) -> Self {
        let entries = convert::rules(direction, half_extent)
            .into_iter()
            .map(|rule| Entry {
                severity: rule.id().default_severity(),
                rule,
            })
            .collect();
        Self { entries }
    }

    pub fn ids(&self) -> Vec<RuleId> {
        self.entries.iter().map(|e| e.rule.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every rule and return findings sorted by anchor start, ties in
    /// catalog order.
    pub fn check(&self, document: &SourceDocument, selection: Option<Span>) -> Vec<Finding> {
        let view = document.view();
        let classes: Vec<_> = view
            .classes()
            .into_iter()
            .filter(|class| gate::is_in_scope(&view, class))
            .collect();

        let mut findings = Vec::new();
        for entry in &self.entries {
            let mut found: Vec<Finding> = match entry.rule.scope() {
                Scope::Gated => classes
                    .iter()
                    .flat_map(|class| {
                        entry.rule.check(&RuleContext {
                            document,
                            view: &view,
                            class: Some(*class),
                            selection,
                        })
                    })
                    .collect(),
                Scope::Document => entry.rule.check(&RuleContext {
                    document,
                    view: &view,
                    class: None,
                    selection,
                }),
            };
            if let Some(selection) = selection {
                found.retain(|f| selection.contains(f.span));
            }

            debug!(rule = %entry.rule.id(), count = found.len(), "rule checked");
            findings.extend(found.into_iter().map(|f| Finding {
                severity: entry.severity,
                ..f
            }));
        }

        // Stable: equal starts keep catalog order.
        findings.sort_by_key(|f| f.span.start);
        findings
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::defects(&Config::default())
    }
}

impl std::fmt::Debug for RuleCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
