//! Common types and utilities shared across the ocean forecast plotting crates.

pub mod bbox;
pub mod error;
pub mod time;

pub use bbox::BoundingBox;
pub use error::{PlotError, PlotResult};
pub use time::{lead_hours, parse_model_cycle, ForecastStep, TimeParseError};
