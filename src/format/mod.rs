//! Metric formatting: unit conversion, trend glyphs, localized clock time,
//! and every localized string shown on the display.

mod formatter;
pub mod locale;

pub use formatter::{format, DisplayLine, RangeSymbol};
pub use locale::{resolve_zone, ZoneChoice};
