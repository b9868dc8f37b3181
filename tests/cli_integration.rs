//! End-to-end tests of the command handlers on files in a temp directory.

use std::path::{Path, PathBuf};

use ftcfix::cli::{
    self, CheckArgs, ConvertArgs, FixArgs, HardwareMapArgs, ImportsArgs, EXIT_ERROR,
    EXIT_FAILED, EXIT_SUCCESS,
};
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn copy_fixture(dir: &Path, name: &str) -> PathBuf {
    let target = dir.join(name);
    std::fs::copy(testdata_path().join(name), &target).expect("should copy fixture");
    target
}

fn check_args(path: &Path) -> CheckArgs {
    CheckArgs {
        path: path.to_path_buf(),
        config: None,
        format: "json".to_string(),
        show_suppressed: false,
        no_suppress: false,
    }
}

#[test]
fn test_check_exit_codes() {
    let dir = TempDir::new().unwrap();
    copy_fixture(dir.path(), "CleanAuto.java");
    assert_eq!(cli::run_check(&check_args(dir.path())).unwrap(), EXIT_SUCCESS);

    copy_fixture(dir.path(), "DriveTeleOp.java");
    assert_eq!(cli::run_check(&check_args(dir.path())).unwrap(), EXIT_FAILED);

    let mut bad_format = check_args(dir.path());
    bad_format.format = "xml".to_string();
    assert_eq!(cli::run_check(&bad_format).unwrap(), EXIT_ERROR);

    assert_eq!(
        cli::run_check(&check_args(&dir.path().join("missing"))).unwrap(),
        EXIT_ERROR
    );
}

#[test]
fn test_check_honors_config() {
    let dir = TempDir::new().unwrap();
    copy_fixture(dir.path(), "DriveTeleOp.java");
    std::fs::write(
        dir.path().join("ftcfix.yaml"),
        "disabled_rules:\n  - uninitialized_hardware_field\n",
    )
    .unwrap();
    // Remaining findings are warnings only.
    assert_eq!(cli::run_check(&check_args(dir.path())).unwrap(), EXIT_SUCCESS);

    std::fs::write(dir.path().join("ftcfix.yaml"), "disabled_rules:\n  - no_such_rule\n").unwrap();
    assert!(cli::run_check(&check_args(dir.path())).is_err());
}

#[test]
fn test_fix_writes_back() {
    let dir = TempDir::new().unwrap();
    let file = copy_fixture(dir.path(), "DriveTeleOp.java");
    let original = std::fs::read_to_string(&file).unwrap();

    let dry = FixArgs {
        path: file.clone(),
        config: None,
        dry_run: true,
        max_passes: 8,
    };
    assert_eq!(cli::run_fix(&dry).unwrap(), EXIT_SUCCESS);
    assert_eq!(std::fs::read_to_string(&file).unwrap(), original);

    let real = FixArgs {
        dry_run: false,
        ..dry
    };
    assert_eq!(cli::run_fix(&real).unwrap(), EXIT_SUCCESS);
    let fixed = std::fs::read_to_string(&file).unwrap();
    assert!(fixed.contains("waitForStart();"));
    assert!(fixed.contains("telemetry.update();\n    }\n}"));
}

#[test]
fn test_fix_single_pass_clears_fixable_findings() {
    let dir = TempDir::new().unwrap();
    let file = copy_fixture(dir.path(), "DriveTeleOp.java");
    let args = FixArgs {
        path: file.clone(),
        config: None,
        dry_run: false,
        max_passes: 1,
    };
    assert_eq!(cli::run_fix(&args).unwrap(), EXIT_SUCCESS);
    let fixed = std::fs::read_to_string(&file).unwrap();
    assert!(fixed.contains(
        "        rightDrive = hardwareMap.get(DcMotor.class, \"rightDrive\");\n        waitForStart();\n"
    ));
}

#[test]
fn test_convert_file() {
    let dir = TempDir::new().unwrap();
    let file = copy_fixture(dir.path(), "PedroPaths.java");
    let args = ConvertArgs {
        file: file.clone(),
        direction: "pedro-to-roadrunner".to_string(),
        selection: None,
        half_extent: None,
        config: None,
        dry_run: false,
    };
    assert_eq!(cli::run_convert(&args).unwrap(), EXIT_SUCCESS);
    let text = std::fs::read_to_string(&file).unwrap();
    assert!(text.contains("new Pose2d(-36.0000, 0.0000)"));

    // Nothing Pedro-style is left.
    assert_eq!(cli::run_convert(&args).unwrap(), EXIT_FAILED);

    let bad = ConvertArgs {
        selection: Some("0:999999".to_string()),
        direction: "forward".to_string(),
        ..args
    };
    assert_eq!(cli::run_convert(&bad).unwrap(), EXIT_ERROR);
}

#[test]
fn test_hardware_map_and_declare_device() {
    let dir = TempDir::new().unwrap();
    let file = copy_fixture(dir.path(), "DriveTeleOp.java");

    let args = HardwareMapArgs {
        file: file.clone(),
        add: None,
        device_type: None,
        config_name: None,
        config: None,
        dry_run: false,
    };
    assert_eq!(cli::run_hardware_map(&args).unwrap(), EXIT_SUCCESS);
    let text = std::fs::read_to_string(&file).unwrap();
    assert!(text.contains(
        "        // Auto-generated HardwareMap\n        leftDrive = hardwareMap.get(DcMotor.class, \"leftDrive\");\n        rightDrive = hardwareMap.get(DcMotor.class, \"rightDrive\");\n"
    ));

    let add = HardwareMapArgs {
        add: Some("imu".to_string()),
        device_type: Some("IMU".to_string()),
        config_name: Some("imu_hub".to_string()),
        ..args
    };
    assert_eq!(cli::run_hardware_map(&add).unwrap(), EXIT_SUCCESS);
    let text = std::fs::read_to_string(&file).unwrap();
    assert!(text.contains("    IMU imu;\n"));
    assert!(text.contains("imu = hardwareMap.get(IMU.class, \"imu_hub\");"));
}

#[test]
fn test_imports_into_empty_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("BlueAuto.java");
    std::fs::write(&file, "").unwrap();

    let args = ImportsArgs {
        file: file.clone(),
        bundle: "autonomous".to_string(),
        class_name: None,
        dry_run: false,
    };
    assert_eq!(cli::run_imports(&args).unwrap(), EXIT_SUCCESS);
    let text = std::fs::read_to_string(&file).unwrap();
    assert!(text.starts_with("package org.firstinspires.ftc.teamcode;\n"));
    assert!(text.contains("import com.qualcomm.robotcore.eventloop.opmode.Autonomous;"));
    assert!(text.contains("@Autonomous(name = \"BlueAuto\", group = \"Autonomous\")"));
    assert!(text.contains("public class BlueAuto extends LinearOpMode {"));

    // A second run finds nothing to add.
    assert_eq!(cli::run_imports(&args).unwrap(), EXIT_SUCCESS);
    assert_eq!(std::fs::read_to_string(&file).unwrap(), text);

    let bad = ImportsArgs {
        bundle: "lasers".to_string(),
        ..args
    };
    assert_eq!(cli::run_imports(&bad).unwrap(), EXIT_ERROR);
}
