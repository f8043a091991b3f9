//! Deviation and aggregation engine.
//!
//! Turns parsed solver reports and reference sheets into per-instance,
//! per-group and grand-total deviation figures. "Not available" entries are
//! carried as [`Deviation::NotAvailable`] and never enter an average.

pub mod aggregate;
pub mod convergence;
pub mod deviation;

pub use aggregate::{GrandSummary, GroupAccumulator, GroupSummary, InstanceResult, Measurement};
pub use convergence::{CurveAverager, CurveAveraging};
pub use deviation::{deviation_against, mean_available, percent_deviation, Deviation};
