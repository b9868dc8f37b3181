//! Output formatting for ftcfix results.
//!
//! Supports three output formats for `check`:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration
//!
//! The `fix`, `convert` and scaffolding commands print a short pretty summary.

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::fix::FixReport;
use crate::rules::{AnalysisResult, Finding, RuleId, Severity};
use crate::syntax::Span;

/// Output format of the `check` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Pretty,
    Json,
    Sarif,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Format::Pretty),
            "json" => Ok(Format::Json),
            "sarif" => Ok(Format::Sarif),
            _ => Err(format!(
                "invalid format {:?}, must be 'pretty', 'json', or 'sarif'",
                s
            )),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Pretty => write!(f, "pretty"),
            Format::Json => write!(f, "json"),
            Format::Sarif => write!(f, "sarif"),
        }
    }
}

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub files_scanned: usize,
    pub fixable_count: usize,
    pub findings: Vec<JsonFinding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<JsonFinding>,
    pub suppressed_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonFileError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFinding {
    pub rule: String,
    pub severity: String,
    pub file: String,
    pub line: usize,
    /// Byte range of the anchor in the analyzed source.
    pub span: Span,
    pub message: String,
    pub has_fix: bool,
    /// Label of the quick fix, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

/// A file that could not be analyzed.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFileError {
    pub file: String,
    pub error: String,
}

fn finding_to_json(file: &str, f: &Finding) -> JsonFinding {
    JsonFinding {
        rule: f.rule.as_str().to_string(),
        severity: f.severity.to_string(),
        file: file.to_string(),
        line: f.line,
        span: f.span,
        message: f.message.clone(),
        has_fix: f.has_fix(),
        fix: f.fix.as_ref().map(|fix| fix.label.clone()),
    }
}

/// Build the JSON report for an analysis run.
pub fn json_report(path: &str, config: Option<&str>, result: &AnalysisResult) -> JsonReport {
    let findings = result
        .findings()
        .map(|(file, f)| finding_to_json(file, f))
        .collect();

    let suppressed = result
        .files
        .iter()
        .flat_map(|file| file.suppressed.iter().map(move |f| finding_to_json(&file.path, f)))
        .collect();

    let errors = result
        .files
        .iter()
        .filter_map(|file| {
            file.error.as_ref().map(|e| JsonFileError {
                file: file.path.clone(),
                error: e.clone(),
            })
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        config: config.map(str::to_string),
        files_scanned: result.scanned,
        fixable_count: result.fixable_count(),
        findings,
        suppressed,
        suppressed_count: result.suppressed_count(),
        errors,
    }
}

/// Write results in JSON format.
pub fn write_json(path: &str, config: Option<&str>, result: &AnalysisResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&json_report(path, config, result))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "ftcfix";
const INFO_URI: &str = "https://github.com/zen-systems/ftcfix";

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifReport {
    pub version: String,
    #[serde(rename = "$schema")]
    pub schema: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    #[serde(rename = "informationUri")]
    pub information_uri: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRule {
    pub id: String,
    #[serde(rename = "shortDescription")]
    pub short_description: SarifMessage,
    #[serde(rename = "helpUri")]
    pub help_uri: String,
    #[serde(rename = "defaultConfiguration")]
    pub default_config: SarifRuleConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRuleConfig {
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifResult {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifact,
    pub region: SarifRegion,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifArtifact {
    pub uri: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRegion {
    #[serde(rename = "startLine")]
    pub start_line: usize,
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

fn make_relative_path(file_path: &str, base_path: &Path) -> String {
    if base_path.as_os_str().is_empty() {
        return file_path.to_string();
    }

    let file = Path::new(file_path);

    // Single file scan
    if file == base_path {
        return file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.to_string());
    }

    file.strip_prefix(base_path)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| file_path.to_string())
}

/// Build the SARIF log for an analysis run.
pub fn sarif_report(base_path: &Path, result: &AnalysisResult) -> SarifReport {
    let rule_set: BTreeSet<RuleId> = result.findings().map(|(_, f)| f.rule).collect();

    let rules = rule_set
        .into_iter()
        .map(|rule| SarifRule {
            id: rule.as_str().to_string(),
            short_description: SarifMessage {
                text: rule.description().to_string(),
            },
            help_uri: format!("{}#{}", INFO_URI, rule.as_str().replace('_', "-")),
            default_config: SarifRuleConfig {
                level: sarif_level(rule.default_severity()).to_string(),
            },
        })
        .collect();

    let results = result
        .findings()
        .map(|(file, f)| SarifResult {
            rule_id: f.rule.as_str().to_string(),
            level: sarif_level(f.severity).to_string(),
            message: SarifMessage {
                text: f.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifact {
                        uri: make_relative_path(file, base_path),
                    },
                    region: SarifRegion {
                        start_line: f.line.max(1),
                    },
                },
            }],
        })
        .collect();

    SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: INFO_URI.to_string(),
                    rules,
                },
            },
            results,
        }],
    }
}

/// Write results in SARIF format.
pub fn write_sarif(base_path: &Path, result: &AnalysisResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&sarif_report(base_path, result))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

fn write_header() {
    println!();
    print!("  ");
    print!("{}", TOOL_NAME.cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
}

/// Write results in pretty (human-readable) format.
pub fn write_pretty(
    path: &str,
    config: Option<&str>,
    result: &AnalysisResult,
    show_suppressed: bool,
) {
    write_header();

    print!("  {}", "Scanning: ".dimmed());
    println!("{} ({} files)", path, result.scanned);
    if let Some(config) = config {
        print!("  {}", "Config:   ".dimmed());
        println!("{}", config);
    }
    println!();

    write_result_summary(result);
    println!();

    let findings: Vec<(&str, &Finding)> = result.findings().collect();
    if !findings.is_empty() {
        write_findings(&findings);
    }

    let suppressed: Vec<(&str, &Finding)> = result
        .files
        .iter()
        .flat_map(|file| file.suppressed.iter().map(move |f| (file.path.as_str(), f)))
        .collect();
    if !suppressed.is_empty() {
        write_suppressed_summary(&suppressed, show_suppressed);
        println!();
    }

    let errors: Vec<_> = result.files.iter().filter(|f| f.error.is_some()).collect();
    if !errors.is_empty() {
        println!("  {} ({}):", "Skipped".yellow(), errors.len());
        for file in errors {
            println!(
                "    {}  {}",
                file.path.blue(),
                file.error.as_deref().unwrap_or_default().dimmed()
            );
        }
        println!();
    }
}

fn write_result_summary(result: &AnalysisResult) {
    let count = result.finding_count();
    if count == 0 {
        print!("  {}", "✓ CLEAN".green());
    } else if result.has_errors() {
        print!("  {}", "✗ DEFECTS".red());
    } else {
        print!("  {}", "! WARNINGS".yellow());
    }

    let plural = if count != 1 { "s" } else { "" };
    print!("  {} finding{}", count, plural);

    let fixable = result.fixable_count();
    if fixable > 0 {
        print!("  {}", format!("{} fixable with `ftcfix fix`", fixable).cyan());
    }

    let suppressed = result.suppressed_count();
    if suppressed > 0 {
        print!("  {}", format!("({} suppressed)", suppressed).dimmed());
    }
    println!();
}

fn write_findings(findings: &[(&str, &Finding)]) {
    println!("  {} ({}):", "Findings".bold(), findings.len());
    println!();

    for (file, f) in findings {
        write_severity_tag(f.severity);
        print!("   ");
        print!("{:<32}", f.rule.as_str().dimmed());
        print!("{}", file.blue());
        if f.line > 0 {
            print!("{}", format!(":{}", f.line).dimmed());
        }
        println!();

        println!("            {}", f.message);
        if let Some(fix) = &f.fix {
            println!("            {}", format!("fix: {}", fix.label).cyan());
        }
        println!();
    }
}

fn write_severity_tag(severity: Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Info => print!("    {} ", "INFO ".blue()),
    }
}

fn write_suppressed_summary(suppressed: &[(&str, &Finding)], show_details: bool) {
    println!("  {} ({}):", "Suppressed".dimmed(), suppressed.len());

    if !show_details {
        println!("    {}", "(use --show-suppressed to see details)".dimmed());
        return;
    }

    println!();
    for (file, f) in suppressed {
        print!("    {:<32}", f.rule.as_str().dimmed());
        print!("{}", file.blue());
        if f.line > 0 {
            print!("{}", format!(":{}", f.line).dimmed());
        }
        println!();
    }
}

/// Summary of a `fix` run on one file.
pub fn write_fix_summary(path: &str, report: &FixReport, dry_run: bool) {
    let verb = if dry_run { "would apply" } else { "applied" };
    if report.applied.is_empty() {
        println!("  {}  {}", "·".dimmed(), path.blue());
    } else {
        println!(
            "  {}  {}  {} {} fix{}",
            "✓".green(),
            path.blue(),
            verb,
            report.applied.len(),
            if report.applied.len() != 1 { "es" } else { "" }
        );
        for applied in &report.applied {
            println!(
                "       {:<32}{}  {}",
                applied.rule.as_str().dimmed(),
                format!(":{}", applied.line).dimmed(),
                applied.label
            );
        }
    }

    for f in &report.remaining {
        println!(
            "       {} {}{}  {}",
            "left".yellow(),
            f.rule.as_str().dimmed(),
            format!(":{}", f.line).dimmed(),
            f.message
        );
    }
}

/// One-line outcome of `convert`, `hardware-map` or `imports` on a file.
pub fn write_edit_summary(path: &str, message: &str, changed: bool) {
    if changed {
        println!("  {}  {}  {}", "✓".green(), path.blue(), message);
    } else {
        println!("  {}  {}  {}", "·".dimmed(), path.blue(), message.dimmed());
    }
}
