//! Runs the catalog over files on disk.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use super::{filter_suppressed, parse_suppressions, AnalysisResult, FileAnalysis, RuleCatalog};
use crate::syntax::SourceDocument;

/// Executes the rule catalog against a set of files.
pub struct Runner {
    catalog: RuleCatalog,
    honor_suppressions: bool,
}

impl Runner {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self {
            catalog,
            honor_suppressions: true,
        }
    }

    /// Set whether `ftcfix:ignore` comments silence findings.
    pub fn honor_suppressions(mut self, honor: bool) -> Self {
        self.honor_suppressions = honor;
        self
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Analyze in-memory source text.
    pub fn analyze_source(&self, path: &str, source: &str) -> FileAnalysis {
        let mut analysis = FileAnalysis {
            path: path.to_string(),
            ..Default::default()
        };

        let document = match SourceDocument::parse(source) {
            Ok(document) => document,
            Err(e) => {
                warn!(path, error = %e, "syntax view unavailable, skipping");
                analysis.error = Some(e.to_string());
                return analysis;
            }
        };
        analysis.parse_errors = document.has_errors();

        let findings = self.catalog.check(&document, None);
        if self.honor_suppressions {
            let suppressions = parse_suppressions(source);
            let (active, suppressed) = filter_suppressed(findings, &suppressions);
            analysis.findings = active;
            analysis.suppressed = suppressed;
        } else {
            analysis.findings = findings;
        }

        debug!(
            path,
            findings = analysis.findings.len(),
            suppressed = analysis.suppressed.len(),
            "file analyzed"
        );
        analysis
    }

    /// Analyze one file. Read failures are recorded, not returned.
    pub fn analyze_file(&self, path: &Path) -> FileAnalysis {
        let shown = path.to_string_lossy();
        match std::fs::read_to_string(path) {
            Ok(source) => self.analyze_source(&shown, &source),
            Err(e) => {
                warn!(path = %shown, error = %e, "cannot read file");
                FileAnalysis {
                    path: shown.to_string(),
                    error: Some(e.to_string()),
                    ..Default::default()
                }
            }
        }
    }

    /// Analyze files in parallel. Results are sorted by path.
    pub fn run(&self, files: &[PathBuf]) -> AnalysisResult {
        let mut analyses: Vec<FileAnalysis> =
            files.par_iter().map(|p| self.analyze_file(p)).collect();
        analyses.sort_by(|a, b| a.path.cmp(&b.path));

        let mut result = AnalysisResult::new();
        for analysis in analyses {
            result.add_file(analysis);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleId;
    use tempfile::TempDir;

    const OPMODE: &str = r#"
public class Auto extends LinearOpMode {
    // ftcfix:ignore-next-line uninitialized_hardware_field - bound by the base class
    DcMotor left;

    public void runOpMode() {
        waitForStart();
    }
}
"#;

    #[test]
    fn test_runner_with_suppression() {
        let runner = Runner::new(RuleCatalog::default());
        let analysis = runner.analyze_source("Auto.java", OPMODE);
        assert!(analysis.findings.is_empty());
        assert_eq!(analysis.suppressed.len(), 1);

        let runner = Runner::new(RuleCatalog::default()).honor_suppressions(false);
        let analysis = runner.analyze_source("Auto.java", OPMODE);
        assert_eq!(analysis.findings[0].rule, RuleId::UninitializedHardwareField);
    }

    #[test]
    fn test_unreadable_file_is_recorded() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("Gone.java");
        let analysis = Runner::new(RuleCatalog::default()).analyze_file(&missing);
        assert!(analysis.path.ends_with("Gone.java"));
        assert!(analysis.error.is_some());
        assert!(analysis.findings.is_empty());
    }

    #[test]
    fn test_run_sorts_by_path() {
        let temp = TempDir::new().unwrap();
        let b = temp.path().join("B.java");
        let a = temp.path().join("A.java");
        std::fs::write(&b, OPMODE).unwrap();
        std::fs::write(&a, "class A {}").unwrap();
        let missing = temp.path().join("Missing.java");

        let runner = Runner::new(RuleCatalog::default());
        let result = runner.run(&[b, missing, a]);
        assert_eq!(result.scanned, 3);
        let names: Vec<_> = result
            .files
            .iter()
            .map(|f| Path::new(&f.path).file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["A.java", "B.java", "Missing.java"]);
        assert!(result.files[2].error.is_some());
    }
}
