//! Glucose readings as delivered by the data source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trend direction reported alongside a reading
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    DoubleUp,
    SingleUp,
    FortyFiveUp,
    #[default]
    Flat,
    FortyFiveDown,
    SingleDown,
    DoubleDown,
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "NOT COMPUTABLE")]
    NotComputable,
    /// Anything the data source sends that we don't know about
    #[serde(other)]
    Unknown,
}

impl Direction {
    /// Parse the wire name of a direction; unknown names never fail
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim() {
            "DoubleUp" => Direction::DoubleUp,
            "SingleUp" => Direction::SingleUp,
            "FortyFiveUp" => Direction::FortyFiveUp,
            "Flat" => Direction::Flat,
            "FortyFiveDown" => Direction::FortyFiveDown,
            "SingleDown" => Direction::SingleDown,
            "DoubleDown" => Direction::DoubleDown,
            "NONE" => Direction::None,
            "NOT COMPUTABLE" => Direction::NotComputable,
            _ => Direction::Unknown,
        }
    }

    /// Short glyph suitable for a monochrome HUD
    pub fn glyph(self) -> &'static str {
        match self {
            Direction::DoubleUp => "^^",
            Direction::SingleUp => "^",
            Direction::FortyFiveUp => "/",
            Direction::Flat => "->",
            Direction::FortyFiveDown => "\\",
            Direction::SingleDown => "v",
            Direction::DoubleDown => "vv",
            Direction::None => "-",
            Direction::NotComputable => "?",
            Direction::Unknown => "->",
        }
    }

    /// Wire name, used in assistant summaries
    pub fn name(self) -> &'static str {
        match self {
            Direction::DoubleUp => "DoubleUp",
            Direction::SingleUp => "SingleUp",
            Direction::FortyFiveUp => "FortyFiveUp",
            Direction::Flat | Direction::Unknown => "Flat",
            Direction::FortyFiveDown => "FortyFiveDown",
            Direction::SingleDown => "SingleDown",
            Direction::DoubleDown => "DoubleDown",
            Direction::None => "NONE",
            Direction::NotComputable => "NOT COMPUTABLE",
        }
    }
}

/// A single glucose reading. Read-only; each fetch replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Value in mg/dL
    pub value: f64,
    #[serde(default)]
    pub direction: Direction,
    pub observed_at: DateTime<Utc>,
}

impl Reading {
    pub fn new(value: f64, direction: Direction, observed_at: DateTime<Utc>) -> Self {
        Self {
            value,
            direction,
            observed_at,
        }
    }
}

/// Severity band of a reading
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    CriticalLow,
    Low,
    Normal,
    High,
    CriticalHigh,
}

impl Severity {
    pub fn is_critical(self) -> bool {
        matches!(self, Severity::CriticalLow | Severity::CriticalHigh)
    }

    /// Human-readable English label
    pub fn label(self) -> &'static str {
        match self {
            Severity::CriticalLow => "Critical Low",
            Severity::Low => "Low",
            Severity::Normal => "Normal",
            Severity::High => "High",
            Severity::CriticalHigh => "Critical High",
        }
    }
}
