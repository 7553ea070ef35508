//! Calendar dates in order and settings fields.

use chrono::NaiveDate;

use crate::{ConfigError, ConfigResult};

const FORMATS: [&str; 2] = ["%d-%m-%Y", "%Y-%m-%d"];

/// Parse `DD-MM-YYYY` or `YYYY-MM-DD`.
pub fn parse_date(text: &str) -> ConfigResult<NaiveDate> {
    let text = text.trim();
    FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        .ok_or_else(|| ConfigError::Date(text.to_string()))
}

/// Hours from midnight of `start` to midnight of `date`.  Negative when
/// `date` is earlier.
pub fn hours_since(start: NaiveDate, date: NaiveDate) -> f64 {
    (date - start).num_days() as f64 * 24.0
}
