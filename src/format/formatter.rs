//! Reading → display text

use super::locale::{format_clock, resolve_zone};
use gluco_glance_types::{Configuration, Reading};
use std::fmt;

/// Symbol shown in front of the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSymbol {
    Low,
    Normal,
    High,
}

impl RangeSymbol {
    /// Compare a canonical (mg/dL) value against the configured thresholds
    pub fn classify(mg_dl: f64, config: &Configuration) -> Self {
        if mg_dl < f64::from(config.low_threshold) {
            RangeSymbol::Low
        } else if mg_dl > f64::from(config.high_threshold) {
            RangeSymbol::High
        } else {
            RangeSymbol::Normal
        }
    }

    pub fn glyph(self) -> char {
        match self {
            RangeSymbol::Low => '!',
            RangeSymbol::Normal => '*',
            RangeSymbol::High => '^',
        }
    }
}

/// Two-line display text: value line, then clock time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub symbol: char,
    pub value: String,
    pub unit: &'static str,
    pub trend: &'static str,
    pub time: String,
}

impl DisplayLine {
    /// Text sent to the renderer
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DisplayLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}\n{}",
            self.symbol, self.value, self.unit, self.trend, self.time
        )
    }
}

/// Format a reading for the HUD. Pure: the clock time is the reading's
/// observation time, not the current time.
pub fn format(reading: &Reading, config: &Configuration) -> DisplayLine {
    let zone = resolve_zone(config.time_zone.as_deref(), config.language);
    DisplayLine {
        symbol: RangeSymbol::classify(reading.value, config).glyph(),
        value: config.display_unit.format_value(reading.value),
        unit: config.display_unit.label(),
        trend: reading.direction.glyph(),
        time: format_clock(reading.observed_at, zone, config.language),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gluco_glance_types::{Direction, DisplayUnit, Language};

    fn reading(value: f64, direction: Direction) -> Reading {
        Reading::new(value, direction, Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap())
    }

    fn config() -> Configuration {
        Configuration {
            data_source_url: "demo.example".to_string(),
            data_source_token: "abc".to_string(),
            time_zone: Some("UTC".to_string()),
            ..Configuration::default()
        }
    }

    #[test]
    fn test_format_mgdl() {
        let line = format(&reading(120.0, Direction::Flat), &config());
        assert_eq!(line.text(), "* 120 mg/dL ->\n08:30 AM");
    }

    #[test]
    fn test_format_mmol_keeps_canonical_comparison() {
        let cfg = Configuration {
            display_unit: DisplayUnit::MmolL,
            ..config()
        };
        // 69.5 mg/dL renders as 3.9 mmol/L; 3.9 * 18 = 70.2 would look normal
        // if compared in display units, but the canonical value is below 70.
        let line = format(&reading(69.5, Direction::SingleDown), &cfg);
        assert_eq!(line.symbol, '!');
        assert_eq!(line.value, "3.9");
        assert_eq!(line.unit, "mmol/L");
        assert_eq!(line.trend, "v");
    }

    #[test]
    fn test_format_high_symbol() {
        let line = format(&reading(181.0, Direction::DoubleUp), &config());
        assert!(line.text().starts_with("^ 181 mg/dL ^^"));
    }

    #[test]
    fn test_invalid_zone_never_panics() {
        let cfg = Configuration {
            time_zone: Some("Not/AZone".to_string()),
            language: Language::Es,
            ..config()
        };
        let line = format(&reading(100.0, Direction::Unknown), &cfg);
        // 08:30 UTC is 09:30 in Madrid in March (CET)
        assert_eq!(line.time, "09:30");
        assert_eq!(line.trend, "->");
    }

    #[test]
    fn test_round_trip_through_display_unit() {
        for unit in [DisplayUnit::MgDl, DisplayUnit::MmolL] {
            let cfg = Configuration {
                display_unit: unit,
                ..config()
            };
            for x in [4.4, 7.2, 12.5, 80.0, 145.0] {
                let shown = format(&reading(unit.to_canonical(x), Direction::Flat), &cfg);
                let parsed: f64 = shown.value.parse().unwrap();
                let tolerance = if unit == DisplayUnit::MmolL { 0.05 } else { 0.5 };
                assert!((parsed - x).abs() <= tolerance, "{:?} {} -> {}", unit, x, parsed);
            }
        }
    }

    #[test]
    fn test_format_is_pure() {
        let r = reading(95.0, Direction::FortyFiveUp);
        assert_eq!(format(&r, &config()), format(&r, &config()));
    }
}
