//! ftcfix - defect detector, quick-fix engine and coordinate converter for
//! FTC robot programs.
//!
//! ftcfix reads LinearOpMode/OpMode sources, reports defects that make a
//! robot misbehave on the field, and rewrites them with minimal text edits.
//! It also converts pose literals between the Pedro Pathing (corner origin)
//! and RoadRunner (center origin) conventions.
//!
//! # Architecture
//!
//! - `syntax`: tree-sitter-java parse reduced to a small `SyntaxView`
//! - `rules`: applicability gate, defect rules, suppressions, the `Runner`
//! - `fix`: `Edit`/`Fix` values, fix generators and the `Remediator`
//! - `convert`: Pedro <-> RoadRunner pose and angle rewrites
//! - `hardware_map`: batch hardware binding and device declaration
//! - `scaffold`: import bundles and OpMode skeletons
//! - `config`: YAML configuration
//! - `report`: output formatting (pretty, JSON, SARIF)
//!
//! # Example
//!
//! ```no_run
//! use ftcfix::{Remediator, RuleCatalog, SourceDocument};
//!
//! let doc = SourceDocument::parse(std::fs::read_to_string("Drive.java")?)?;
//! let report = Remediator::new(RuleCatalog::default()).fix_all(&doc)?;
//! println!("{}", report.document.text());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod convert;
pub mod fix;
pub mod hardware_map;
pub mod report;
pub mod rules;
pub mod scaffold;
pub mod syntax;

pub use config::Config;
pub use convert::{Conversion, CoordinateConverter, Direction};
pub use fix::{Edit, Fix, FixError, FixReport, Remediator};
pub use rules::{AnalysisResult, Finding, Rule, RuleCatalog, RuleId, Runner, Severity};
pub use scaffold::ImportBundle;
pub use syntax::{SourceDocument, Span, SyntaxError, SyntaxView};
