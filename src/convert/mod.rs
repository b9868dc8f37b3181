//! Pedro Pathing <-> RoadRunner coordinate conversion.
//!
//! Pedro measures from a field corner and takes headings in radians;
//! RoadRunner measures from the field center. Converting is two syntactic
//! rewrites run through the same [`Remediator`] as the defect rules:
//!
//! | Direction | Pose rule                           | Angle rule                        |
//! |-----------|-------------------------------------|-----------------------------------|
//! | Forward   | `Pose(x, y)` -> `Pose2d(x-H, y-H)`  | `Math.toRadians(d)` -> radians    |
//! | Inverse   | `Pose2d(x, y)` -> `Pose(x+H, y+H)`  | `(r)` -> `Math.toRadians(deg)`    |

mod geometry;
mod rules;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use geometry::{format_number, Angle, AngleUnit, Convention, CoordinatePair};
pub use rules::{AngleRule, PoseRule};

use crate::config::DEFAULT_HALF_EXTENT;
use crate::fix::{Fix, FixError, Remediator};
use crate::rules::{Rule, RuleCatalog};
use crate::syntax::{SourceDocument, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Pedro (corner origin) to RoadRunner (center origin).
    Forward,
    /// RoadRunner back to Pedro.
    Inverse,
}

impl Direction {
    pub fn source(&self) -> Convention {
        match self {
            Direction::Forward => Convention::CornerOrigin,
            Direction::Inverse => Convention::CenterOrigin,
        }
    }

    pub fn target(&self) -> Convention {
        match self {
            Direction::Forward => Convention::CenterOrigin,
            Direction::Inverse => Convention::CornerOrigin,
        }
    }

    /// Pose type matched in the source code.
    pub fn source_type(&self) -> &'static str {
        match self {
            Direction::Forward => "Pose",
            Direction::Inverse => "Pose2d",
        }
    }

    pub fn target_type(&self) -> &'static str {
        match self {
            Direction::Forward => "Pose2d",
            Direction::Inverse => "Pose",
        }
    }

    /// Message shown when nothing in the scanned span converts.
    pub fn no_match_message(&self) -> &'static str {
        match self {
            Direction::Forward => "No Pedro-style coordinates found.",
            Direction::Inverse => "No RoadRunner-style coordinates found.",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Inverse => write!(f, "inverse"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" | "pedro-to-roadrunner" => Ok(Direction::Forward),
            "inverse" | "roadrunner-to-pedro" => Ok(Direction::Inverse),
            _ => Err(format!("unknown direction: {}", s)),
        }
    }
}

/// The two conversion rules for `direction`, pose rule first.
pub fn rules(direction: Direction, half_extent: f64) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(PoseRule {
            direction,
            half_extent,
        }),
        Box::new(AngleRule { direction }),
    ]
}

/// Result of a conversion run.
#[derive(Debug)]
pub enum Conversion {
    Converted {
        document: SourceDocument,
        /// Every edit made, against the original document.
        fix: Fix,
        /// Number of rewritten patterns.
        count: usize,
    },
    /// Nothing convertible in the scanned span. The document is unchanged.
    NoMatch,
}

impl Conversion {
    pub fn is_match(&self) -> bool {
        matches!(self, Conversion::Converted { .. })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CoordinateConverter {
    half_extent: f64,
}

impl Default for CoordinateConverter {
    fn default() -> Self {
        Self::new(DEFAULT_HALF_EXTENT)
    }
}

impl CoordinateConverter {
    pub fn new(half_extent: f64) -> Self {
        Self { half_extent }
    }

    pub fn half_extent(&self) -> f64 {
        self.half_extent
    }

    /// Convert every matching pattern of `document`, or only those wholly
    /// inside `selection`.
    pub fn convert(
        &self,
        document: &SourceDocument,
        direction: Direction,
        selection: Option<Span>,
    ) -> Result<Conversion, FixError> {
        let remediator = Remediator::new(RuleCatalog::conversion(direction, self.half_extent))
            .with_selection(selection);

        let findings = remediator.analyze(document);
        if findings.is_empty() {
            debug!(%direction, "no convertible pattern found");
            return Ok(Conversion::NoMatch);
        }

        let fix = Fix::merge(
            format!("Convert {} to {}", direction.source_type(), direction.target_type()),
            findings.iter().filter_map(|f| f.fix.as_ref()),
        )?;
        let converted = remediator.apply_all(document, &findings)?;
        debug!(%direction, count = findings.len(), "converted");

        Ok(Conversion::Converted {
            document: converted,
            fix,
            count: findings.len(),
        })
    }
}
