//! Time handling for model cycles and forecast steps.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Model cycle format used on the command line and in output file names.
pub const MODEL_CYCLE_FORMAT: &str = "%Y%m%d%H";

/// Parse a model cycle string (`YYYYMMDDHH`) into a UTC timestamp.
pub fn parse_model_cycle(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    if s.len() != 10 || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(TimeParseError::InvalidFormat(s.to_string()));
    }

    // chrono needs minutes to build a NaiveDateTime
    let ndt = NaiveDateTime::parse_from_str(&format!("{}00", s), "%Y%m%d%H%M")
        .map_err(|_| TimeParseError::InvalidFormat(s.to_string()))?;
    Ok(Utc.from_utc_datetime(&ndt))
}

/// Hours between the base run and a forecast time.
pub fn lead_hours(base_run: DateTime<Utc>, valid_time: DateTime<Utc>) -> f64 {
    (valid_time - base_run).num_seconds() as f64 / 3600.0
}

/// A single forecast step of a model run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForecastStep {
    /// Model run/initialisation time
    pub base_run: DateTime<Utc>,
    /// Time the field is valid for
    pub valid_time: DateTime<Utc>,
}

impl ForecastStep {
    pub fn new(base_run: DateTime<Utc>, valid_time: DateTime<Utc>) -> Self {
        Self {
            base_run,
            valid_time,
        }
    }

    /// The analysis step has no lead time.
    pub fn is_analysis(&self) -> bool {
        self.valid_time == self.base_run
    }

    pub fn lead_hours(&self) -> f64 {
        lead_hours(self.base_run, self.valid_time)
    }

    /// `Initial: 00UTC 2024-10-20`
    pub fn initial_label(&self) -> String {
        format!("Initial: {}", self.base_run.format("%HUTC %Y-%m-%d"))
    }

    /// `Analysis: 00UTC 2024-10-20 (t+0)` or `Forecast: 06UTC 2024-10-20 (t+6)`
    pub fn valid_label(&self) -> String {
        let stamp = self.valid_time.format("%HUTC %Y-%m-%d");
        if self.is_analysis() {
            format!("Analysis: {} (t+0)", stamp)
        } else {
            format!("Forecast: {} (t+{})", stamp, format_hours(self.lead_hours()))
        }
    }

    /// Validity window of a daily warning starting on the valid date:
    /// `20 October 2024 07.00 WIB - 21 October 2024 07.00 WIB`
    pub fn warning_period(&self) -> String {
        const STAMP: &str = "%d %B %Y 07.00 WIB";
        let end = self.valid_time + Duration::days(1);
        format!(
            "{} - {}",
            self.valid_time.format(STAMP),
            end.format(STAMP)
        )
    }

    /// Timestamp suffix of output files.
    pub fn file_stamp(&self) -> String {
        self.valid_time.format(MODEL_CYCLE_FORMAT).to_string()
    }
}

/// Whole hours print without a fraction, partial hours keep their digits.
fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}", hours as i64)
    } else {
        let s = format!("{:.4}", hours);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid model cycle: {0}. Expected 'YYYYMMDDHH'")]
    InvalidFormat(String),
}
