//! Integration tests for defect detection and quick fixes.
//!
//! These tests run the default rule catalog over the OpMode samples in
//! `testdata/` and apply the fixes it proposes.

use std::path::PathBuf;

use ftcfix::fix::FixError;
use ftcfix::rules::{RuleCatalog, RuleId, Runner, Severity};
use ftcfix::{Remediator, SourceDocument};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn load(name: &str) -> SourceDocument {
    let text = std::fs::read_to_string(testdata_path().join(name)).expect("should read fixture");
    SourceDocument::parse(text).expect("fixture should parse")
}

fn remediator() -> Remediator {
    Remediator::new(RuleCatalog::default())
}

#[test]
fn test_drive_teleop_findings_in_document_order() {
    let doc = load("DriveTeleOp.java");
    let findings = remediator().analyze(&doc);

    let found: Vec<(RuleId, usize)> = findings.iter().map(|f| (f.rule, f.line)).collect();
    assert_eq!(
        found,
        vec![
            (RuleId::UninitializedHardwareField, 10),
            (RuleId::UninitializedHardwareField, 11),
            (RuleId::MissingStartSignal, 15),
            (RuleId::MissingTelemetryFlush, 15),
            (RuleId::UnguardedInputPoll, 19),
        ]
    );
    assert_eq!(findings[0].severity, Severity::Error);
    assert!(!findings[4].has_fix(), "input polls are flagged only");
}

#[test]
fn test_analysis_is_deterministic() {
    let doc = load("DriveTeleOp.java");
    let r = remediator();
    assert_eq!(r.analyze(&doc), r.analyze(&doc));
}

#[test]
fn test_fixes_are_sorted_and_disjoint() {
    let doc = load("DriveTeleOp.java");
    for finding in remediator().analyze(&doc) {
        let Some(fix) = &finding.fix else { continue };
        for pair in fix.edits().windows(2) {
            assert!(pair[0].span.end <= pair[1].span.start);
        }
    }
}

#[test]
fn test_each_fix_clears_its_finding() {
    let doc = load("DriveTeleOp.java");
    let r = remediator();
    for finding in r.analyze(&doc).iter().filter(|f| f.has_fix()) {
        let updated = r
            .apply(&doc, finding)
            .unwrap_or_else(|e| panic!("{} should apply: {}", finding.rule, e));
        let fix = finding.fix.as_ref().unwrap();
        let anchor = fix.map_offset(finding.span.start);
        assert!(
            !r.analyze(&updated).iter().any(|f| f.same_anchor(finding.rule, anchor)),
            "{} still reported after its fix",
            finding.rule
        );
    }
}

#[test]
fn test_fix_all_drive_teleop() {
    let doc = load("DriveTeleOp.java");
    let r = remediator();
    let report = r.fix_all(&doc).expect("fix_all should succeed");

    assert_eq!(report.applied.len(), 4);
    assert_eq!(report.passes, 1);
    let remaining: Vec<RuleId> = report.remaining.iter().map(|f| f.rule).collect();
    assert_eq!(remaining, vec![RuleId::UnguardedInputPoll]);

    let text = report.document.text();
    assert!(text.contains(
        "    public void runOpMode() {\n        leftDrive = hardwareMap.get(DcMotor.class, \"leftDrive\");\n        rightDrive = hardwareMap.get(DcMotor.class, \"rightDrive\");\n        waitForStart();\n        claw = hardwareMap.get(Servo.class, \"claw\");\n"
    ));
    assert!(text.contains("        }\n        telemetry.update();\n    }\n}"));

    let again = r.fix_all(&report.document).expect("second run should succeed");
    assert!(!again.changed());
}

#[test]
fn test_fix_all_many_hardware_fields_in_one_pass() {
    let source = r#"@Autonomous
public class Big extends LinearOpMode {
    DcMotor fl, fr, bl, br;
    Servo claw, wrist;
    IMU imu;
    DistanceSensor dist;

    @Override
    public void runOpMode() {
        fl.setPower(1);
    }
}
"#;
    let doc = SourceDocument::parse(source).unwrap();
    let r = remediator();
    assert_eq!(r.analyze(&doc).len(), 9);

    let report = r.fix_all(&doc).expect("fix_all should succeed");
    assert_eq!(report.applied.len(), 9);
    assert_eq!(report.passes, 1);
    assert!(report.remaining.iter().all(|f| !f.has_fix()));
    assert!(report.remaining.is_empty());

    let text = report.document.text();
    assert!(text.contains(
        "    public void runOpMode() {\n        fl = hardwareMap.get(DcMotor.class, \"fl\");\n        fr = hardwareMap.get(DcMotor.class, \"fr\");\n"
    ));
    assert!(text.contains(
        "        dist = hardwareMap.get(DistanceSensor.class, \"dist\");\n        waitForStart();\n        fl.setPower(1);\n"
    ));
}

#[test]
fn test_fix_all_inline_empty_body() {
    let source = "class A extends LinearOpMode { DcMotor m; Servo s; public void runOpMode() {} }";
    let doc = SourceDocument::parse(source).unwrap();
    let report = remediator().fix_all(&doc).unwrap();
    assert_eq!(report.passes, 1);
    assert_eq!(
        report.document.text(),
        "class A extends LinearOpMode { DcMotor m; Servo s; public void runOpMode() { m = hardwareMap.get(DcMotor.class, \"m\"); s = hardwareMap.get(Servo.class, \"s\"); waitForStart(); } }"
    );
}

#[test]
fn test_empty_entry_body_keeps_comment() {
    let source = "class A extends LinearOpMode { public void runOpMode() { /* drive here */ } }";
    let doc = SourceDocument::parse(source).unwrap();
    let r = remediator();
    let findings = r.analyze(&doc);
    assert_eq!(findings.len(), 1);

    let updated = r.apply(&doc, &findings[0]).unwrap();
    assert_eq!(
        updated.text(),
        "class A extends LinearOpMode { public void runOpMode() { waitForStart(); /* drive here */ } }"
    );
}

#[test]
fn test_telemetry_flush_stays_reachable() {
    let source = r#"@TeleOp
public class T extends OpMode {
    double speed() {
        telemetry.addData("x", 1);
        return 1.0;
    }
}
"#;
    let doc = SourceDocument::parse(source).unwrap();
    let r = remediator();
    let findings = r.analyze(&doc);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, RuleId::MissingTelemetryFlush);

    let updated = r.apply(&doc, &findings[0]).unwrap();
    assert!(updated.text().contains(
        "        telemetry.addData(\"x\", 1);\n        telemetry.update();\n        return 1.0;\n    }"
    ));
}

#[test]
fn test_scenario_empty_entry_body() {
    let source = "class A extends LinearOpMode { public void runOpMode() {} }";
    let doc = SourceDocument::parse(source).unwrap();
    let r = remediator();
    let findings = r.analyze(&doc);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, RuleId::MissingStartSignal);

    let updated = r.apply(&doc, &findings[0]).unwrap();
    assert_eq!(
        updated.text(),
        "class A extends LinearOpMode { public void runOpMode() { waitForStart(); } }"
    );
}

#[test]
fn test_scenario_telemetry_flush_goes_last() {
    let source = r#"@TeleOp
public class T extends OpMode {
    public void loop() {
        telemetry.addData("x", 1);
        telemetry.addData("y", 2);
    }
}
"#;
    let doc = SourceDocument::parse(source).unwrap();
    let r = remediator();
    let findings = r.analyze(&doc);
    assert_eq!(findings.len(), 1);

    let updated = r.apply(&doc, &findings[0]).unwrap();
    assert!(updated.text().contains(
        "        telemetry.addData(\"y\", 2);\n        telemetry.update();\n    }"
    ));
}

#[test]
fn test_scenario_hardware_binding() {
    let source = r#"public class H extends LinearOpMode {
    DcMotor left;

    public void runOpMode() {
        waitForStart();
    }
}
"#;
    let doc = SourceDocument::parse(source).unwrap();
    let r = remediator();
    let findings = r.analyze(&doc);
    assert_eq!(findings.len(), 1);

    let updated = r.apply(&doc, &findings[0]).unwrap();
    assert!(updated.text().contains(
        "    public void runOpMode() {\n        left = hardwareMap.get(DcMotor.class, \"left\");\n        waitForStart();"
    ));

    let homeless = SourceDocument::parse("public class H extends LinearOpMode { DcMotor left; }").unwrap();
    let findings = r.analyze(&homeless);
    assert_eq!(findings.len(), 1);
    assert!(!findings[0].has_fix());
}

#[test]
fn test_scenario_overlapping_batch_conflicts() {
    let doc = load("DriveTeleOp.java");
    let r = remediator();
    let findings = r.analyze(&doc);
    let before = doc.text().to_string();

    let err = r.apply_all(&doc, &findings).unwrap_err();
    assert!(matches!(err, FixError::Conflict { .. }));
    assert_eq!(doc.text(), before);
}

#[test]
fn test_clean_and_out_of_scope_files() {
    let r = remediator();
    assert!(r.analyze(&load("CleanAuto.java")).is_empty());
    assert!(r.analyze(&load("DriveHelper.java")).is_empty());
}

#[test]
fn test_runner_honors_suppressions() {
    let path = testdata_path().join("Suppressed.java");
    let runner = Runner::new(RuleCatalog::default());
    let analysis = runner.analyze_file(&path);
    assert!(analysis.findings.is_empty());
    assert_eq!(analysis.suppressed.len(), 2);

    let unsuppressed = Runner::new(RuleCatalog::default())
        .honor_suppressions(false)
        .analyze_file(&path);
    assert_eq!(unsuppressed.findings.len(), 2);
}

#[test]
fn test_runner_over_testdata() {
    let mut files: Vec<PathBuf> = std::fs::read_dir(testdata_path())
        .expect("should read testdata dir")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "java"))
        .collect();
    files.reverse();

    let result = Runner::new(RuleCatalog::default()).run(&files);
    assert_eq!(result.scanned, 5);
    assert!(result.files.windows(2).all(|w| w[0].path <= w[1].path));
    assert_eq!(result.finding_count(), 5);
    assert_eq!(result.fixable_count(), 4);
    assert!(result.has_errors());
}
