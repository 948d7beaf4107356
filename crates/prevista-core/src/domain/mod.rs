//! Canonical domain types for prevista market data.
//!
//! All models validate their invariants at construction time: symbols are
//! normalized and syntax-checked, timestamps are guaranteed UTC, and series
//! values are finite and non-negative.

mod series;
mod symbol;
mod timestamp;

pub use series::{AssetSelection, TimeSeries, TimeSeriesPoint};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
