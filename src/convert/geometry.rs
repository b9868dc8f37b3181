//! Field coordinates and angles.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Where a coordinate system puts `(0, 0)` on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Convention {
    /// Pedro Pathing: origin in a field corner.
    CornerOrigin,
    /// RoadRunner: origin in the field center.
    CenterOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatePair {
    pub x: f64,
    pub y: f64,
    pub convention: Convention,
}

impl CoordinatePair {
    pub fn new(x: f64, y: f64, convention: Convention) -> Self {
        Self { x, y, convention }
    }

    /// Express the same field position in `target`.
    pub fn to_convention(self, target: Convention, half_extent: f64) -> Self {
        let offset = match (self.convention, target) {
            (Convention::CornerOrigin, Convention::CenterOrigin) => -half_extent,
            (Convention::CenterOrigin, Convention::CornerOrigin) => half_extent,
            _ => 0.0,
        };
        Self::new(self.x + offset, self.y + offset, target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    Degrees,
    Radians,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Angle {
    pub value: f64,
    pub unit: AngleUnit,
}

impl Angle {
    pub fn degrees(value: f64) -> Self {
        Self {
            value,
            unit: AngleUnit::Degrees,
        }
    }

    pub fn radians(value: f64) -> Self {
        Self {
            value,
            unit: AngleUnit::Radians,
        }
    }

    pub fn to_unit(self, unit: AngleUnit) -> Self {
        let value = match (self.unit, unit) {
            (AngleUnit::Degrees, AngleUnit::Radians) => self.value * PI / 180.0,
            (AngleUnit::Radians, AngleUnit::Degrees) => self.value * 180.0 / PI,
            _ => self.value,
        };
        Self { value, unit }
    }
}

/// Render a rewritten literal with exactly four decimals.
pub fn format_number(value: f64) -> String {
    let text = format!("{:.4}", value);
    // `-0.00001` would otherwise print as `-0.0000`.
    if text == "-0.0000" {
        "0.0000".to_string()
    } else {
        text
    }
}
