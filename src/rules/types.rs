//! Core types for analysis results.

use serde::{Deserialize, Serialize};

use crate::fix::Fix;
use crate::syntax::{SourceDocument, Span};

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Identifiers of every rule, in catalog declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleId {
    #[serde(rename = "missing_start_signal")]
    MissingStartSignal,
    #[serde(rename = "missing_telemetry_flush")]
    MissingTelemetryFlush,
    #[serde(rename = "unguarded_input_poll")]
    UnguardedInputPoll,
    #[serde(rename = "uninitialized_hardware_field")]
    UninitializedHardwareField,
    // Coordinate conversion rules
    #[serde(rename = "corner_to_center_pose")]
    CornerToCenterPose,
    #[serde(rename = "collapse_degrees_to_radians")]
    CollapseDegreesToRadians,
    #[serde(rename = "center_to_corner_pose")]
    CenterToCornerPose,
    #[serde(rename = "wrap_radians_as_degrees")]
    WrapRadiansAsDegrees,
}

impl RuleId {
    pub const ALL: [RuleId; 8] = [
        RuleId::MissingStartSignal,
        RuleId::MissingTelemetryFlush,
        RuleId::UnguardedInputPoll,
        RuleId::UninitializedHardwareField,
        RuleId::CornerToCenterPose,
        RuleId::CollapseDegreesToRadians,
        RuleId::CenterToCornerPose,
        RuleId::WrapRadiansAsDegrees,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::MissingStartSignal => "missing_start_signal",
            RuleId::MissingTelemetryFlush => "missing_telemetry_flush",
            RuleId::UnguardedInputPoll => "unguarded_input_poll",
            RuleId::UninitializedHardwareField => "uninitialized_hardware_field",
            RuleId::CornerToCenterPose => "corner_to_center_pose",
            RuleId::CollapseDegreesToRadians => "collapse_degrees_to_radians",
            RuleId::CenterToCornerPose => "center_to_corner_pose",
            RuleId::WrapRadiansAsDegrees => "wrap_radians_as_degrees",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.as_str() == s)
    }

    /// Whether this is one of the coordinate conversion rules.
    pub fn is_conversion(&self) -> bool {
        matches!(
            self,
            RuleId::CornerToCenterPose
                | RuleId::CollapseDegreesToRadians
                | RuleId::CenterToCornerPose
                | RuleId::WrapRadiansAsDegrees
        )
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            RuleId::UninitializedHardwareField => Severity::Error,
            RuleId::MissingStartSignal
            | RuleId::MissingTelemetryFlush
            | RuleId::UnguardedInputPoll => Severity::Warning,
            _ => Severity::Info,
        }
    }

    /// One-line description used by `list-rules` and SARIF output.
    pub fn description(&self) -> &'static str {
        match self {
            RuleId::MissingStartSignal => "runOpMode() must call waitForStart() before driving hardware",
            RuleId::MissingTelemetryFlush => "telemetry.addData() without telemetry.update() never reaches the driver station",
            RuleId::UnguardedInputPoll => "gamepad press checks outside a conditional fire on every loop iteration",
            RuleId::UninitializedHardwareField => "hardware fields must be bound with hardwareMap.get() before use",
            RuleId::CornerToCenterPose => "Pedro Pose (corner origin) to RoadRunner Pose2d (center origin)",
            RuleId::CollapseDegreesToRadians => "Math.toRadians(<literal>) collapsed to its radian value",
            RuleId::CenterToCornerPose => "RoadRunner Pose2d (center origin) to Pedro Pose (corner origin)",
            RuleId::WrapRadiansAsDegrees => "radian literal rewritten as Math.toRadians(<degrees>)",
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single detected issue or convertible pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule: RuleId,
    pub severity: Severity,
    /// Anchor span in the analyzed document.
    pub span: Span,
    /// 1-indexed line of the anchor start.
    pub line: usize,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

impl Finding {
    /// Create a finding with the rule's default severity and no fix.
    pub fn new(
        rule: RuleId,
        document: &SourceDocument,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            severity: rule.default_severity(),
            span,
            line: document.line_col(span.start).0,
            message: message.into(),
            fix: None,
        }
    }

    pub fn with_fix(mut self, fix: Option<Fix>) -> Self {
        self.fix = fix;
        self
    }

    pub fn has_fix(&self) -> bool {
        self.fix.is_some()
    }

    /// Same rule at the same anchor start.
    pub fn same_anchor(&self, rule: RuleId, offset: usize) -> bool {
        self.rule == rule && self.span.start == offset
    }
}

/// Findings of one analyzed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub path: String,
    pub findings: Vec<Finding>,
    /// Findings silenced by `ftcfix:ignore` comments.
    #[serde(default)]
    pub suppressed: Vec<Finding>,
    /// The parser recovered from syntax errors in this file.
    #[serde(default)]
    pub parse_errors: bool,
    /// Set when the file could not be read or parsed at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Results of analyzing a set of files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub files: Vec<FileAnalysis>,
    /// Number of files scanned
    pub scanned: usize,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, file: FileAnalysis) {
        self.files.push(file);
        self.scanned += 1;
    }

    /// Iterate over every active finding together with its file path.
    pub fn findings(&self) -> impl Iterator<Item = (&str, &Finding)> {
        self.files
            .iter()
            .flat_map(|f| f.findings.iter().map(move |finding| (f.path.as_str(), finding)))
    }

    pub fn finding_count(&self) -> usize {
        self.files.iter().map(|f| f.findings.len()).sum()
    }

    pub fn suppressed_count(&self) -> usize {
        self.files.iter().map(|f| f.suppressed.len()).sum()
    }

    pub fn fixable_count(&self) -> usize {
        self.findings().filter(|(_, f)| f.has_fix()).count()
    }

    /// Check if there are any error-severity findings.
    pub fn has_errors(&self) -> bool {
        self.findings().any(|(_, f)| f.severity == Severity::Error)
    }
}
