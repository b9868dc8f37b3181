//! Command-line interface for ftcfix.

use clap::{Parser, Subcommand};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::{self, Config};
use crate::convert::{Conversion, CoordinateConverter, Direction};
use crate::fix::{Fix, Remediator, DEFAULT_MAX_PASSES};
use crate::hardware_map::{self, DeviceSpec};
use crate::report::{self, Format};
use crate::rules::{RuleCatalog, RuleId, Runner};
use crate::scaffold::{self, ImportBundle};
use crate::syntax::{SourceDocument, Span};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Defect detector, quick-fix engine and coordinate converter for FTC robot
/// programs.
///
/// ftcfix reads LinearOpMode/OpMode sources, reports common defects
/// (no waitForStart, telemetry never flushed, gamepad presses polled outside
/// a conditional, hardware never bound) and rewrites them in place.
#[derive(Parser)]
#[command(name = "ftcfix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report defects in a file or directory
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Apply every available quick fix
    Fix(FixArgs),
    /// Convert Pedro Pathing coordinates to RoadRunner or back
    Convert(ConvertArgs),
    /// Bind every unbound hardware field, or declare a new device
    HardwareMap(HardwareMapArgs),
    /// Insert an import bundle (and OpMode skeleton)
    Imports(ImportsArgs),
    /// List the available rules
    ListRules,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty, json, or sarif
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Show suppressed findings in output
    #[arg(long)]
    pub show_suppressed: bool,

    /// Ignore ftcfix:ignore comments
    #[arg(long)]
    pub no_suppress: bool,
}

#[derive(Parser)]
pub struct FixArgs {
    /// File or directory to fix
    pub path: PathBuf,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report what would change without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Maximum fix passes per file
    #[arg(long, default_value_t = DEFAULT_MAX_PASSES)]
    pub max_passes: usize,
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Java file to convert
    pub file: PathBuf,

    /// forward (Pedro to RoadRunner) or inverse
    #[arg(short, long, default_value = "forward")]
    pub direction: String,

    /// Byte range to convert, as START:END or START..END
    #[arg(short, long)]
    pub selection: Option<String>,

    /// Half the field side, in inches (default: from config, else 72)
    #[arg(long)]
    pub half_extent: Option<f64>,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the converted source instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct HardwareMapArgs {
    /// Java file to update
    pub file: PathBuf,

    /// Declare a new device field with this name
    #[arg(long, requires = "device_type")]
    pub add: Option<String>,

    /// Device type of the new field, e.g. DcMotorEx
    #[arg(long = "type", id = "device_type")]
    pub device_type: Option<String>,

    /// Robot configuration name (default: the field name)
    #[arg(long, requires = "add")]
    pub config_name: Option<String>,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the updated source instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct ImportsArgs {
    /// Java file to update
    pub file: PathBuf,

    /// motor, servo, imu, sensor, vision, teleop, autonomous or all
    #[arg(short, long)]
    pub bundle: String,

    /// Class name of the TeleOp/Autonomous skeleton (default: file stem)
    #[arg(long)]
    pub class_name: Option<String>,

    /// Print the updated source instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

lazy_static! {
    static ref SELECTION_RE: Regex =
        Regex::new(r"^\s*(\d+)\s*(?::|\.\.)\s*(\d+)\s*$").expect("invalid selection regex");
}

/// Parse `START:END` or `START..END` into a span.
pub fn parse_selection(s: &str) -> anyhow::Result<Span> {
    let caps = SELECTION_RE
        .captures(s)
        .ok_or_else(|| anyhow::anyhow!("invalid selection {:?}, expected START:END", s))?;
    let start: usize = caps[1].parse()?;
    let end: usize = caps[2].parse()?;
    if start > end {
        anyhow::bail!("invalid selection {:?}: start is after end", s);
    }
    Ok(Span::new(start, end))
}

/// Load the explicit config, or one discovered next to `target` or in the
/// working directory, or the defaults.
fn load_config(explicit: Option<&Path>, target: &Path) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let dir = if target.is_dir() {
                Some(target)
            } else {
                target.parent()
            };
            dir.and_then(config::discover)
                .or_else(|| config::discover(Path::new(".")))
        }
    };

    let Some(path) = path else {
        debug!("no config file, using defaults");
        return Ok((Config::default(), None));
    };

    let config = Config::parse_file(&path)?;
    config::validate(&config)?;
    debug!(config = %path.display(), "loaded config");
    Ok((config, Some(path)))
}

/// Collect `.java` files under `root`, skipping hidden and build directories
/// and anything matched by `excluded_paths`.
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            !(e.file_type().is_dir()
                && e.depth() > 0
                && (name.starts_with('.') || name == "build" || name == "out"))
        })
    {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().is_some_and(|e| e == "java")
            && !config.is_path_excluded(path)
        {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn read_document(path: &Path) -> anyhow::Result<SourceDocument> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
    Ok(SourceDocument::parse(text)?)
}

/// Write `text` back to `path`, or print it on a dry run.
fn emit(path: &Path, text: &str, dry_run: bool) -> anyhow::Result<()> {
    if dry_run {
        print!("{}", text);
    } else {
        std::fs::write(path, text)
            .map_err(|e| anyhow::anyhow!("cannot write {}: {}", path.display(), e))?;
        info!(path = %path.display(), "updated");
    }
    Ok(())
}

fn apply_fix(path: &Path, document: &SourceDocument, fix: &Fix, dry_run: bool) -> anyhow::Result<()> {
    let text = fix.apply_to(document.text())?;
    emit(path, &text, dry_run)
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let format: Format = match args.format.parse() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let (config, config_path) = load_config(args.config.as_deref(), &abs_path)?;
    let files = collect_files(&abs_path, &config)?;
    if files.is_empty() {
        eprintln!("Warning: no .java files to scan");
        return Ok(EXIT_SUCCESS);
    }

    let runner =
        Runner::new(RuleCatalog::defects(&config)).honor_suppressions(!args.no_suppress);
    let result = runner.run(&files);

    let path_str = args.path.to_string_lossy().to_string();
    let config_str = config_path.map(|p| p.to_string_lossy().to_string());
    match format {
        Format::Json => report::write_json(&path_str, config_str.as_deref(), &result)?,
        Format::Sarif => report::write_sarif(&abs_path, &result)?,
        Format::Pretty => {
            report::write_pretty(&path_str, config_str.as_deref(), &result, args.show_suppressed)
        }
    }

    if result.has_errors() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the fix command.
pub fn run_fix(args: &FixArgs) -> anyhow::Result<i32> {
    let (config, _) = load_config(args.config.as_deref(), &args.path)?;
    let files = collect_files(&args.path, &config)?;
    let remediator =
        Remediator::new(RuleCatalog::defects(&config)).with_max_passes(args.max_passes);

    let mut remaining = 0;
    for path in &files {
        let document = read_document(path)?;
        let fixed = remediator.fix_all(&document)?;
        remaining += fixed.remaining.iter().filter(|f| f.has_fix()).count();

        let shown = path.to_string_lossy();
        report::write_fix_summary(&shown, &fixed, args.dry_run);
        if fixed.changed() && !args.dry_run {
            emit(path, fixed.document.text(), false)?;
        }
    }

    if remaining > 0 {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the convert command.
pub fn run_convert(args: &ConvertArgs) -> anyhow::Result<i32> {
    let direction: Direction = match args.direction.parse() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let selection = args.selection.as_deref().map(parse_selection).transpose()?;

    let (config, _) = load_config(args.config.as_deref(), &args.file)?;
    let half_extent = args.half_extent.unwrap_or(config.half_extent);
    if !half_extent.is_finite() || half_extent <= 0.0 {
        eprintln!("Error: half extent must be a positive number, got {}", half_extent);
        return Ok(EXIT_ERROR);
    }

    let document = read_document(&args.file)?;
    if let Some(sel) = selection {
        if sel.end > document.len() {
            eprintln!(
                "Error: selection {}..{} is past the end of the file ({} bytes)",
                sel.start,
                sel.end,
                document.len()
            );
            return Ok(EXIT_ERROR);
        }
    }

    match CoordinateConverter::new(half_extent).convert(&document, direction, selection)? {
        Conversion::NoMatch => {
            eprintln!("{}", direction.no_match_message());
            Ok(EXIT_FAILED)
        }
        Conversion::Converted {
            document: converted,
            count,
            ..
        } => {
            emit(&args.file, converted.text(), args.dry_run)?;
            if !args.dry_run {
                report::write_edit_summary(
                    &args.file.to_string_lossy(),
                    &format!("converted {} pattern(s) {}", count, direction),
                    true,
                );
            }
            Ok(EXIT_SUCCESS)
        }
    }
}

/// Run the hardware-map command.
pub fn run_hardware_map(args: &HardwareMapArgs) -> anyhow::Result<i32> {
    let (config, _) = load_config(args.config.as_deref(), &args.file)?;
    let document = read_document(&args.file)?;
    let shown = args.file.to_string_lossy();

    if let (Some(name), Some(device)) = (&args.add, &args.device_type) {
        let spec = DeviceSpec {
            device,
            name,
            config_name: args.config_name.as_deref(),
        };
        let fix = hardware_map::declare_device(&document, &spec, &config.extra_hardware_types)?;
        apply_fix(&args.file, &document, &fix, args.dry_run)?;
        if !args.dry_run {
            report::write_edit_summary(&shown, &fix.label, true);
        }
        return Ok(EXIT_SUCCESS);
    }

    match hardware_map::generate_bindings(&document, &config.extra_hardware_types)? {
        Some(fix) => {
            apply_fix(&args.file, &document, &fix, args.dry_run)?;
            if !args.dry_run {
                report::write_edit_summary(&shown, &fix.label, true);
            }
        }
        None => report::write_edit_summary(&shown, "every hardware field is bound", false),
    }
    Ok(EXIT_SUCCESS)
}

/// Run the imports command.
pub fn run_imports(args: &ImportsArgs) -> anyhow::Result<i32> {
    let bundle: ImportBundle = match args.bundle.parse() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let stem = args
        .file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string());
    let class_name = args.class_name.clone().or(stem);

    let document = read_document(&args.file)?;
    let shown = args.file.to_string_lossy();
    match scaffold::insert_imports(&document, bundle, class_name.as_deref())? {
        Some(fix) => {
            apply_fix(&args.file, &document, &fix, args.dry_run)?;
            if !args.dry_run {
                report::write_edit_summary(&shown, &fix.label, true);
            }
        }
        None => report::write_edit_summary(&shown, "nothing to add", false),
    }
    Ok(EXIT_SUCCESS)
}

/// List the available rules.
pub fn run_list_rules() -> anyhow::Result<i32> {
    println!("Defect rules:");
    println!();
    for rule in RuleId::ALL.iter().filter(|r| !r.is_conversion()) {
        println!(
            "  {:<32} {:<8} {}",
            rule.as_str(),
            rule.default_severity(),
            rule.description()
        );
    }

    println!();
    println!("Conversion rules (ftcfix convert):");
    println!();
    for rule in RuleId::ALL.iter().filter(|r| r.is_conversion()) {
        println!("  {:<32} {}", rule.as_str(), rule.description());
    }

    Ok(EXIT_SUCCESS)
}
