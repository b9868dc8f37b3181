//! Import bundles and OpMode skeletons.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use streaming_iterator::StreamingIterator;
use tree_sitter::{Query, QueryCursor};

use crate::fix::{Edit, Fix, FixError};
use crate::syntax::{language, SourceDocument, Span, SyntaxError};

/// Package every TeamCode OpMode lives in.
pub const TEAMCODE_PACKAGE: &str = "org.firstinspires.ftc.teamcode";

const IMPORT_QUERY: &str = r#"
(import_declaration
  [(scoped_identifier) (identifier)] @import_path
) @import
"#;

const PACKAGE_QUERY: &str = r#"
(package_declaration
  [(scoped_identifier) (identifier)] @package_name
) @package
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportBundle {
    Motor,
    Servo,
    Imu,
    Sensor,
    Vision,
    TeleOp,
    Autonomous,
    All,
}

impl ImportBundle {
    pub const ALL_BUNDLES: [ImportBundle; 8] = [
        ImportBundle::Motor,
        ImportBundle::Servo,
        ImportBundle::Imu,
        ImportBundle::Sensor,
        ImportBundle::Vision,
        ImportBundle::TeleOp,
        ImportBundle::Autonomous,
        ImportBundle::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportBundle::Motor => "motor",
            ImportBundle::Servo => "servo",
            ImportBundle::Imu => "imu",
            ImportBundle::Sensor => "sensor",
            ImportBundle::Vision => "vision",
            ImportBundle::TeleOp => "teleop",
            ImportBundle::Autonomous => "autonomous",
            ImportBundle::All => "all",
        }
    }

    /// Fully qualified names imported by this bundle.
    pub fn imports(&self) -> &'static [&'static str] {
        match self {
            ImportBundle::Motor => &[
                "com.qualcomm.robotcore.hardware.DcMotor",
                "com.qualcomm.robotcore.hardware.DcMotorSimple",
                "com.qualcomm.robotcore.hardware.HardwareMap",
                "com.qualcomm.robotcore.util.ElapsedTime",
            ],
            ImportBundle::Servo => &[
                "com.qualcomm.robotcore.hardware.CRServo",
                "com.qualcomm.robotcore.hardware.Servo",
            ],
            ImportBundle::Imu => &[
                "com.qualcomm.robotcore.hardware.IMU",
                "com.qualcomm.hardware.rev.RevHubOrientationOnRobot",
                "org.firstinspires.ftc.robotcore.external.navigation.AngleUnit",
                "org.firstinspires.ftc.robotcore.external.navigation.YawPitchRollAngles",
            ],
            ImportBundle::Sensor => &[
                "com.qualcomm.robotcore.hardware.DistanceSensor",
                "com.qualcomm.robotcore.hardware.ColorSensor",
                "com.qualcomm.robotcore.hardware.TouchSensor",
                "com.qualcomm.robotcore.hardware.VoltageSensor",
            ],
            ImportBundle::Vision => &[
                "org.firstinspires.ftc.robotcore.external.hardware.camera.WebcamName",
                "org.openftc.easyopencv.OpenCvCamera",
                "org.openftc.easyopencv.OpenCvCameraFactory",
                "org.openftc.easyopencv.OpenCvCameraRotation",
                "org.openftc.easyopencv.OpenCvPipeline",
            ],
            ImportBundle::TeleOp => &[
                "com.qualcomm.robotcore.eventloop.opmode.OpMode",
                "com.qualcomm.robotcore.eventloop.opmode.LinearOpMode",
                "com.qualcomm.robotcore.eventloop.opmode.TeleOp",
            ],
            ImportBundle::Autonomous => &[
                "com.qualcomm.robotcore.eventloop.opmode.OpMode",
                "com.qualcomm.robotcore.eventloop.opmode.LinearOpMode",
                "com.qualcomm.robotcore.eventloop.opmode.Autonomous",
            ],
            ImportBundle::All => &[
                "com.qualcomm.robotcore.hardware.DcMotor",
                "com.qualcomm.robotcore.hardware.DcMotorSimple",
                "com.qualcomm.robotcore.hardware.Servo",
                "com.qualcomm.robotcore.hardware.CRServo",
                "com.qualcomm.robotcore.hardware.HardwareMap",
                "com.qualcomm.robotcore.hardware.DistanceSensor",
                "com.qualcomm.robotcore.hardware.ColorSensor",
                "com.qualcomm.robotcore.hardware.TouchSensor",
                "com.qualcomm.robotcore.hardware.VoltageSensor",
                "com.qualcomm.robotcore.hardware.IMU",
                "com.qualcomm.hardware.rev.RevHubOrientationOnRobot",
                "org.firstinspires.ftc.robotcore.external.navigation.AngleUnit",
                "org.firstinspires.ftc.robotcore.external.ClassFactory",
                "org.firstinspires.ftc.robotcore.external.hardware.camera.WebcamName",
                "org.firstinspires.ftc.robotcore.external.tfod.TFObjectDetector",
                "org.firstinspires.ftc.robotcore.external.navigation.VuforiaLocalizer",
                "com.qualcomm.robotcore.util.ElapsedTime",
            ],
        }
    }

    /// Class name used for the skeleton when none is given.
    pub fn default_class_name(&self) -> Option<&'static str> {
        match self {
            ImportBundle::TeleOp => Some("MyTeleOp"),
            ImportBundle::Autonomous => Some("MyAutonomous"),
            _ => None,
        }
    }

    /// OpMode skeleton for the TeleOp and Autonomous bundles.
    pub fn skeleton(&self, class_name: &str) -> Option<String> {
        let (annotation, group, loop_block) = match self {
            ImportBundle::TeleOp => (
                "TeleOp",
                "TeleOp",
                "        while (opModeIsActive()) {\n            // Your loop\n        }\n",
            ),
            ImportBundle::Autonomous => (
                "Autonomous",
                "Autonomous",
                "        if (opModeIsActive()) {\n            // Your autonomous sequence\n        }\n",
            ),
            _ => return None,
        };

        Some(format!(
            "@{annotation}(name = \"{class_name}\", group = \"{group}\")\n\
             public class {class_name} extends LinearOpMode {{\n\
             \n    @Override\n    public void runOpMode() throws InterruptedException {{\n\
             \x20       waitForStart();\n\n{loop_block}    }}\n}}\n"
        ))
    }
}

impl fmt::Display for ImportBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImportBundle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL_BUNDLES
            .iter()
            .copied()
            .find(|b| b.as_str() == lower)
            .ok_or_else(|| format!("unknown import bundle: {}", s))
    }
}

/// Package and import declarations of a document.
#[derive(Debug, Default)]
struct Header {
    package: Option<Span>,
    imports: Vec<(String, Span)>,
}

fn query_error(e: tree_sitter::QueryError) -> FixError {
    FixError::Unavailable(SyntaxError::Unavailable(format!("invalid header query: {}", e)))
}

fn read_header(document: &SourceDocument) -> Result<Header, FixError> {
    let language = language();
    let root = document.tree().root_node();
    let source = document.text().as_bytes();
    let mut header = Header::default();

    let query = Query::new(&language, PACKAGE_QUERY).map_err(query_error)?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, root, source);
    while let Some(m) = matches.next() {
        for capture in m.captures {
            if header.package.is_none() && query.capture_names()[capture.index as usize] == "package" {
                header.package = Some(Span::from_node(capture.node));
            }
        }
    }

    let query = Query::new(&language, IMPORT_QUERY).map_err(query_error)?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, root, source);
    while let Some(m) = matches.next() {
        let mut path = None;
        let mut declaration = None;
        for capture in m.captures {
            match query.capture_names()[capture.index as usize] {
                "import_path" => path = document.slice(Span::from_node(capture.node)),
                "import" => declaration = Some(Span::from_node(capture.node)),
                _ => {}
            }
        }
        if let (Some(path), Some(span)) = (path, declaration) {
            header.imports.push((path.to_string(), span));
        }
    }
    header.imports.sort_by_key(|(_, span)| span.start);

    Ok(header)
}

/// Build the fix adding `bundle` to `document`.
///
/// Inserts the TeamCode package when there is none, the bundle's missing
/// imports, and for TeleOp/Autonomous a skeleton class named `class_name`
/// (or the bundle default) unless that class already exists. Returns `None`
/// when the document already has everything.
pub fn insert_imports(
    document: &SourceDocument,
    bundle: ImportBundle,
    class_name: Option<&str>,
) -> Result<Option<Fix>, FixError> {
    let header = read_header(document)?;
    let text = document.text();

    // Text to insert per offset; one offset can collect several pieces.
    let mut inserts: BTreeMap<usize, String> = BTreeMap::new();

    if header.package.is_none() {
        inserts
            .entry(0)
            .or_default()
            .push_str(&format!("package {};\n\n", TEAMCODE_PACKAGE));
    }

    let missing: Vec<String> = bundle
        .imports()
        .iter()
        .filter(|path| !header.imports.iter().any(|(existing, _)| existing == *path))
        .map(|path| format!("import {};", path))
        .collect();
    if !missing.is_empty() {
        match (header.imports.first(), header.package) {
            (Some((_, first)), _) => inserts
                .entry(first.start)
                .or_default()
                .push_str(&format!("{}\n", missing.join("\n"))),
            (None, Some(package)) => inserts
                .entry(package.end)
                .or_default()
                .push_str(&format!("\n\n{}", missing.join("\n"))),
            (None, None) => inserts
                .entry(0)
                .or_default()
                .push_str(&format!("{}\n\n", missing.join("\n"))),
        }
    }

    let skeleton_name = class_name.or(bundle.default_class_name());
    if let Some(name) = skeleton_name {
        let exists = document.view().find_class(name).is_some();
        if let (false, Some(skeleton)) = (exists, bundle.skeleton(name)) {
            let separator = if text.is_empty() {
                ""
            } else if text.ends_with('\n') {
                "\n"
            } else {
                "\n\n"
            };
            inserts
                .entry(text.len())
                .or_default()
                .push_str(&format!("{}{}", separator, skeleton));
        }
    }

    if inserts.is_empty() {
        return Ok(None);
    }
    let edits = inserts
        .into_iter()
        .map(|(at, insertion)| Edit::insert(at, insertion))
        .collect();
    Fix::new(format!("Insert {} imports", bundle), edits).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(source: &str, bundle: ImportBundle, class_name: Option<&str>) -> Option<String> {
        let doc = SourceDocument::parse(source).unwrap();
        insert_imports(&doc, bundle, class_name)
            .unwrap()
            .map(|fix| fix.apply_to(source).unwrap())
    }

    #[test]
    fn test_imports_after_package() {
        let out = apply(
            "package org.firstinspires.ftc.teamcode;\n\npublic class A {}\n",
            ImportBundle::Servo,
            None,
        )
        .unwrap();
        assert_eq!(
            out,
            "package org.firstinspires.ftc.teamcode;\n\nimport com.qualcomm.robotcore.hardware.CRServo;\nimport com.qualcomm.robotcore.hardware.Servo;\n\npublic class A {}\n"
        );
    }

    #[test]
    fn test_skips_existing_imports() {
        let source = "package x;\n\nimport com.qualcomm.robotcore.hardware.Servo;\n\nclass A {}\n";
        let out = apply(source, ImportBundle::Servo, None).unwrap();
        assert_eq!(
            out,
            "package x;\n\nimport com.qualcomm.robotcore.hardware.CRServo;\nimport com.qualcomm.robotcore.hardware.Servo;\n\nclass A {}\n"
        );
        assert!(apply(&out, ImportBundle::Servo, None).is_none());
    }

    #[test]
    fn test_empty_file_gets_everything() {
        let out = apply("", ImportBundle::TeleOp, Some("Drive")).unwrap();
        assert!(out.starts_with(
            "package org.firstinspires.ftc.teamcode;\n\nimport com.qualcomm.robotcore.eventloop.opmode.OpMode;\n"
        ));
        assert!(out.contains("@TeleOp(name = \"Drive\", group = \"TeleOp\")\npublic class Drive extends LinearOpMode {"));
        assert!(out.contains("        waitForStart();\n\n        while (opModeIsActive()) {"));

        let doc = SourceDocument::parse(out.as_str()).unwrap();
        assert!(!doc.has_errors(), "skeleton must parse cleanly");
        assert!(apply(&out, ImportBundle::TeleOp, Some("Drive")).is_none());
    }

    #[test]
    fn test_package_and_leading_import_share_offset() {
        let source = "import com.qualcomm.robotcore.hardware.IMU;\nclass A {}\n";
        let out = apply(source, ImportBundle::Imu, None).unwrap();
        assert!(out.starts_with("package org.firstinspires.ftc.teamcode;\n\nimport com.qualcomm.hardware.rev.RevHubOrientationOnRobot;\n"));
        assert!(out.contains("import com.qualcomm.robotcore.hardware.IMU;\nclass A {}"));
    }

    #[test]
    fn test_bundle_parse() {
        assert_eq!("TeleOp".parse::<ImportBundle>(), Ok(ImportBundle::TeleOp));
        assert!("camera".parse::<ImportBundle>().is_err());
        assert!(ImportBundle::Motor.skeleton("X").is_none());
    }
}
