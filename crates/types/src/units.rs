//! Glucose units and conversion between them.
//!
//! mg/dL is the canonical unit: every stored value and every threshold
//! comparison uses it. mmol/L only exists at the rendering boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversion factor between mg/dL and mmol/L for glucose
pub const MGDL_PER_MMOL: f64 = 18.0;

/// Unit used to render glucose values
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum DisplayUnit {
    #[serde(rename = "mg/dL")]
    #[default]
    MgDl,
    #[serde(rename = "mmol/L")]
    MmolL,
}

impl DisplayUnit {
    /// Label shown next to the value
    pub fn label(self) -> &'static str {
        match self {
            DisplayUnit::MgDl => "mg/dL",
            DisplayUnit::MmolL => "mmol/L",
        }
    }

    /// Parse a loosely written unit name ("mmol", "mg/dl", "MMOL/L", ...)
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "mgdl" | "mg" => Some(DisplayUnit::MgDl),
            "mmoll" | "mmol" => Some(DisplayUnit::MmolL),
            _ => None,
        }
    }

    /// Convert a canonical (mg/dL) value into this unit, rounded for display.
    ///
    /// mg/dL rounds to an integer, mmol/L to one decimal.
    pub fn from_canonical(self, mg_dl: f64) -> f64 {
        match self {
            DisplayUnit::MgDl => mg_dl.round(),
            DisplayUnit::MmolL => (mg_dl / MGDL_PER_MMOL * 10.0).round() / 10.0,
        }
    }

    /// Convert a value expressed in this unit back to canonical mg/dL
    pub fn to_canonical(self, value: f64) -> f64 {
        match self {
            DisplayUnit::MgDl => value,
            DisplayUnit::MmolL => value * MGDL_PER_MMOL,
        }
    }

    /// Render a canonical value as text in this unit, without the label
    pub fn format_value(self, mg_dl: f64) -> String {
        match self {
            DisplayUnit::MgDl => format!("{}", self.from_canonical(mg_dl) as i64),
            DisplayUnit::MmolL => format!("{:.1}", self.from_canonical(mg_dl)),
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
