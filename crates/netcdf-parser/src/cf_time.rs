//! CF-convention time coordinate decoding.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{NetCdfError, NetCdfResult};

/// Parsed `"<unit> since <reference>"` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    /// Length of one unit in seconds
    pub seconds_per_unit: f64,
    pub reference: DateTime<Utc>,
}

impl TimeUnits {
    /// Parse a CF `units` attribute such as `hours since 2024-10-20 00:00:00`.
    pub fn parse(units: &str) -> NetCdfResult<Self> {
        let lower = units.trim().to_ascii_lowercase();
        let (unit, reference) = lower
            .split_once(" since ")
            .ok_or_else(|| NetCdfError::TimeUnits(units.to_string()))?;

        let seconds_per_unit = match unit.trim() {
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
            "minutes" | "minute" | "mins" | "min" => 60.0,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3600.0,
            "days" | "day" | "d" => 86400.0,
            _ => return Err(NetCdfError::TimeUnits(units.to_string())),
        };

        let reference = parse_reference(reference.trim())
            .ok_or_else(|| NetCdfError::TimeUnits(units.to_string()))?;

        Ok(Self {
            seconds_per_unit,
            reference,
        })
    }

    /// Convert an encoded coordinate value to a timestamp.
    ///
    /// Values are rounded to the nearest second.
    pub fn decode(&self, value: f64) -> DateTime<Utc> {
        let seconds = (value * self.seconds_per_unit).round() as i64;
        self.reference + Duration::seconds(seconds)
    }
}

fn parse_reference(s: &str) -> Option<DateTime<Utc>> {
    let s = s
        .trim_end_matches(" utc")
        .trim_end_matches('z')
        .trim_end_matches("+00:00")
        .trim_end_matches("+0000")
        .trim();

    const FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dt%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dt%H:%M",
        "%Y-%m-%d %H",
    ];

    for fmt in FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    // Date only
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}
