use crate::error::{BenchError, BenchResult};
use std::fmt;

/// Percentage deviation from a reference, or an explicit "not available".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deviation {
    Value(f64),
    NotAvailable,
}

impl Deviation {
    pub fn value(&self) -> Option<f64> {
        match self {
            Deviation::Value(v) => Some(*v),
            Deviation::NotAvailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Deviation::Value(_))
    }
}

impl From<Option<f64>> for Deviation {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(v) => Deviation::Value(v),
            None => Deviation::NotAvailable,
        }
    }
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deviation::Value(v) => write!(f, "{}", v),
            Deviation::NotAvailable => write!(f, "NA"),
        }
    }
}

/// `|reported - reference| / reference * 100`
///
/// A zero or non-finite reference is rejected instead of producing inf/NaN.
pub fn percent_deviation(reported: f64, reference: f64) -> BenchResult<f64> {
    if reference == 0.0 || !reference.is_finite() {
        return Err(BenchError::ReferenceUnavailable(format!(
            "reference value {} cannot be used as a divisor",
            reference
        )));
    }
    if !reported.is_finite() {
        return Err(BenchError::Validation(format!(
            "reported value {} is not finite",
            reported
        )));
    }
    Ok((reported - reference).abs() / reference * 100.0)
}

/// Deviation with missing inputs or an unusable reference mapped to `NotAvailable`.
pub fn deviation_against(reported: Option<f64>, reference: Option<f64>) -> Deviation {
    match (reported, reference) {
        (Some(v), Some(r)) => percent_deviation(v, r).ok().into(),
        _ => Deviation::NotAvailable,
    }
}

/// Mean over available entries only; `NotAvailable` when there are none.
pub fn mean_available<I>(items: I) -> Deviation
where
    I: IntoIterator<Item = Deviation>,
{
    let (sum, count) = items
        .into_iter()
        .filter_map(|d| d.value())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        Deviation::NotAvailable
    } else {
        Deviation::Value(sum / count as f64)
    }
}
