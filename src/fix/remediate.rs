//! The Remediator: analyze, apply, verify.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::{Fix, FixError};
use crate::rules::{Finding, RuleCatalog, RuleId};
use crate::syntax::{SourceDocument, Span};

/// Passes [`Remediator::fix_all`] makes before giving up on what remains.
pub const DEFAULT_MAX_PASSES: usize = 8;

/// A fix that [`Remediator::fix_all`] applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedFix {
    pub rule: RuleId,
    pub label: String,
    /// Line of the finding in the document the fix was generated against.
    pub line: usize,
}

/// Outcome of [`Remediator::fix_all`].
#[derive(Debug)]
pub struct FixReport {
    pub document: SourceDocument,
    pub applied: Vec<AppliedFix>,
    pub passes: usize,
    /// Findings still reported afterwards (unfixable or out of passes).
    pub remaining: Vec<Finding>,
}

impl FixReport {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Applies fixes produced by a [`RuleCatalog`] and checks that they stick.
#[derive(Debug)]
pub struct Remediator {
    catalog: RuleCatalog,
    selection: Option<Span>,
    max_passes: usize,
}

impl Remediator {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self {
            catalog,
            selection: None,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// Restrict analysis to a span of the document.
    pub fn with_selection(mut self, selection: Option<Span>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes.max(1);
        self
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Findings in document order, ties in catalog order.
    pub fn analyze(&self, document: &SourceDocument) -> Vec<Finding> {
        self.catalog.check(document, self.selection)
    }

    /// Parse and analyze raw text. An unparseable document has no findings.
    pub fn analyze_text(&self, text: &str) -> Vec<Finding> {
        match SourceDocument::parse(text) {
            Ok(document) => self.analyze(&document),
            Err(e) => {
                warn!(error = %e, "syntax view unavailable, reporting no findings");
                Vec::new()
            }
        }
    }

    /// Apply the fix carried by `finding` and verify the finding is gone.
    pub fn apply(
        &self,
        document: &SourceDocument,
        finding: &Finding,
    ) -> Result<SourceDocument, FixError> {
        let fix = finding.fix.as_ref().ok_or_else(|| {
            FixError::NotApplicable(format!("{} has no automatic fix", finding.rule))
        })?;
        let updated = SourceDocument::parse(fix.apply_to(document.text())?)?;
        self.verify(&updated, fix, std::iter::once(finding))?;
        Ok(updated)
    }

    /// Apply the fixes of several findings as one all-or-nothing batch.
    ///
    /// Findings without a fix are skipped. Overlapping edits fail with
    /// [`FixError::Conflict`] before anything is applied.
    pub fn apply_all(
        &self,
        document: &SourceDocument,
        findings: &[Finding],
    ) -> Result<SourceDocument, FixError> {
        let fixable: Vec<&Finding> = findings.iter().filter(|f| f.has_fix()).collect();
        let batch = Fix::merge(
            format!("{} fixes", fixable.len()),
            fixable.iter().filter_map(|f| f.fix.as_ref()),
        )
        .map_err(|e| {
            warn!(error = %e, "rejected fix batch");
            e
        })?;

        let updated = SourceDocument::parse(batch.apply_to(document.text())?)?;
        self.verify(&updated, &batch, fixable.into_iter())?;
        Ok(updated)
    }

    /// Regenerate the fix for `finding` against `document`.
    pub fn fix_for(&self, document: &SourceDocument, finding: &Finding) -> Result<Fix, FixError> {
        self.analyze(document)
            .into_iter()
            .find(|f| f.rule == finding.rule && f.span == finding.span)
            .ok_or_else(|| {
                FixError::NotApplicable(format!(
                    "{} is no longer reported at line {}",
                    finding.rule, finding.line
                ))
            })?
            .fix
            .ok_or_else(|| FixError::NotApplicable(format!("{} has no automatic fix", finding.rule)))
    }

    /// Apply every fixable finding, in passes of non-conflicting batches,
    /// until nothing fixable is left or the pass limit is reached.
    pub fn fix_all(&self, document: &SourceDocument) -> Result<FixReport, FixError> {
        let mut current = SourceDocument::parse(document.text())?;
        let mut applied = Vec::new();
        let mut passes = 0;

        while passes < self.max_passes {
            let findings = coalesce_insertions(self.analyze(&current));
            let batch = independent_batch(&findings);
            if batch.is_empty() {
                break;
            }
            passes += 1;
            debug!(pass = passes, fixes = batch.len(), "applying fix batch");

            current = self.apply_all(&current, &batch)?;
            applied.extend(batch.into_iter().map(|f| AppliedFix {
                rule: f.rule,
                label: f.fix.map(|fix| fix.label).unwrap_or_default(),
                line: f.line,
            }));
        }

        let remaining = self.analyze(&current);
        Ok(FixReport {
            document: current,
            applied,
            passes,
            remaining,
        })
    }

    /// Fail if any finding is still reported at its mapped anchor.
    fn verify<'a>(
        &self,
        updated: &SourceDocument,
        fix: &Fix,
        findings: impl Iterator<Item = &'a Finding>,
    ) -> Result<(), FixError> {
        let selection = self
            .selection
            .map(|s| Span::new(fix.map_offset(s.start), fix.map_offset(s.end)));
        let after = self.catalog.check(updated, selection);

        for finding in findings {
            let anchor = fix.map_offset(finding.span.start);
            if after.iter().any(|f| f.same_anchor(finding.rule, anchor)) {
                return Err(FixError::NotIdempotent {
                    rule: finding.rule,
                    span: finding.span,
                });
            }
        }
        Ok(())
    }
}

/// Keep fixable findings and fold fixes inserting at the same offset into
/// the first of them, so statements stacked at the top of one body land in
/// a single pass. Folded findings keep an empty fix.
fn coalesce_insertions(findings: Vec<Finding>) -> Vec<Finding> {
    let mut fixable: Vec<Finding> = findings.into_iter().filter(Finding::has_fix).collect();
    // Hardware is bound during init, before the start signal.
    fixable.sort_by_key(|f| f.rule == RuleId::MissingStartSignal);

    let mut carriers: HashMap<usize, usize> = HashMap::new();
    for i in 0..fixable.len() {
        let Some(at) = fixable[i].fix.as_ref().and_then(Fix::insertion_offset) else {
            continue;
        };
        match carriers.get(&at) {
            Some(&carrier) => {
                let mut taken = fixable[i].fix.take();
                if let (Some(target), Some(other)) = (fixable[carrier].fix.as_mut(), taken.as_mut()) {
                    target.absorb(other);
                }
                fixable[i].fix = taken;
            }
            None => {
                carriers.insert(at, i);
            }
        }
    }
    fixable
}

/// Greedily pick fixable findings whose edits do not overlap, in order.
fn independent_batch(findings: &[Finding]) -> Vec<Finding> {
    let mut chosen: Vec<Finding> = Vec::new();
    for finding in findings.iter().filter(|f| f.has_fix()) {
        let fits = Fix::merge(
            "",
            chosen
                .iter()
                .chain(std::iter::once(finding))
                .filter_map(|f| f.fix.as_ref()),
        )
        .is_ok();
        if fits {
            chosen.push(finding.clone());
        } else {
            debug!(rule = %finding.rule, line = finding.line, "deferring conflicting fix");
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRIVE: &str = r#"@TeleOp
public class Drive extends LinearOpMode {
    DcMotor left;
    DcMotor right;

    @Override
    public void runOpMode() {
        telemetry.addData("status", "ready");
    }
}
"#;

    fn remediator() -> Remediator {
        Remediator::new(RuleCatalog::default())
    }

    #[test]
    fn test_apply_clears_the_finding() {
        let doc = SourceDocument::parse(DRIVE).unwrap();
        let r = remediator();
        let findings = r.analyze(&doc);
        let start = findings
            .iter()
            .find(|f| f.rule == RuleId::MissingStartSignal)
            .unwrap();

        let updated = r.apply(&doc, start).unwrap();
        assert!(updated.text().contains("waitForStart();"));
        assert!(r
            .analyze(&updated)
            .iter()
            .all(|f| f.rule != RuleId::MissingStartSignal));
    }

    #[test]
    fn test_apply_all_conflict_leaves_document_untouched() {
        let doc = SourceDocument::parse(DRIVE).unwrap();
        let r = remediator();
        let hardware: Vec<_> = r
            .analyze(&doc)
            .into_iter()
            .filter(|f| f.rule == RuleId::UninitializedHardwareField)
            .collect();
        assert_eq!(hardware.len(), 2);

        let err = r.apply_all(&doc, &hardware).unwrap_err();
        assert!(matches!(err, FixError::Conflict { .. }));
        assert_eq!(doc.text(), DRIVE);
    }

    #[test]
    fn test_apply_without_fix_is_not_applicable() {
        let source = "class A extends LinearOpMode {\n    Servo claw;\n}\n";
        let doc = SourceDocument::parse(source).unwrap();
        let r = remediator();
        let findings = r.analyze(&doc);
        assert_eq!(findings.len(), 1);
        assert!(!findings[0].has_fix());
        assert!(matches!(
            r.apply(&doc, &findings[0]),
            Err(FixError::NotApplicable(_))
        ));
    }

    #[test]
    fn test_fix_for_stale_finding() {
        let doc = SourceDocument::parse(DRIVE).unwrap();
        let r = remediator();
        let start = r
            .analyze(&doc)
            .into_iter()
            .find(|f| f.rule == RuleId::MissingStartSignal)
            .unwrap();
        assert!(r.fix_for(&doc, &start).is_ok());

        let updated = r.apply(&doc, &start).unwrap();
        assert!(matches!(
            r.fix_for(&updated, &start),
            Err(FixError::NotApplicable(_))
        ));
    }

    #[test]
    fn test_fix_all_stacks_bindings_before_start() {
        let doc = SourceDocument::parse(DRIVE).unwrap();
        let report = remediator().fix_all(&doc).unwrap();

        assert_eq!(report.passes, 1);
        assert_eq!(report.applied.len(), 4);
        assert!(report.remaining.is_empty());

        let text = report.document.text();
        assert!(text.contains(
            "    public void runOpMode() {\n        left = hardwareMap.get(DcMotor.class, \"left\");\n        right = hardwareMap.get(DcMotor.class, \"right\");\n        waitForStart();\n        telemetry.addData(\"status\", \"ready\");\n        telemetry.update();\n    }"
        ));
    }

    #[test]
    fn test_empty_text_has_no_findings() {
        assert!(remediator().analyze_text("").is_empty());
    }
}
