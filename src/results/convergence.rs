use serde::{Deserialize, Serialize};

/// How per-instance convergence curves are folded into a group curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CurveAveraging {
    /// `avg = (avg + new) / 2` per sample. Later curves weigh more; kept so
    /// existing result sheets can be reproduced.
    #[default]
    Pairwise,
    /// Arithmetic mean of every curve seen so far.
    Mean,
}

/// Running sample-by-sample average of convergence curves.
///
/// Curves may differ in length: overlapping samples are combined, and samples
/// past the end of the current average are appended as they are.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveAverager {
    mode: CurveAveraging,
    values: Vec<f64>,
    sums: Vec<f64>,
    counts: Vec<usize>,
    curves: usize,
}

impl CurveAverager {
    pub fn new(mode: CurveAveraging) -> Self {
        Self {
            mode,
            values: Vec::new(),
            sums: Vec::new(),
            counts: Vec::new(),
            curves: 0,
        }
    }

    pub fn push(&mut self, curve: &[f64]) {
        if self.curves == 0 {
            self.values = curve.to_vec();
            self.sums = curve.to_vec();
            self.counts = vec![1; curve.len()];
            self.curves = 1;
            return;
        }
        self.curves += 1;

        for (i, &v) in curve.iter().enumerate() {
            if i < self.values.len() {
                self.sums[i] += v;
                self.counts[i] += 1;
                self.values[i] = match self.mode {
                    CurveAveraging::Pairwise => (self.values[i] + v) / 2.0,
                    CurveAveraging::Mean => self.sums[i] / self.counts[i] as f64,
                };
            } else {
                self.values.push(v);
                self.sums.push(v);
                self.counts.push(1);
            }
        }
    }

    pub fn curves(&self) -> usize {
        self.curves
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// Sample-wise mean of curves from repeated runs, truncated to the shortest.
pub fn mean_curve(curves: &[Vec<f64>]) -> Vec<f64> {
    let Some(len) = curves.iter().map(Vec::len).min() else {
        return Vec::new();
    };
    (0..len)
        .map(|i| curves.iter().map(|c| c[i]).sum::<f64>() / curves.len() as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longer_curve_extends_average() {
        let mut avg = CurveAverager::new(CurveAveraging::Pairwise);
        avg.push(&[4.0]);
        avg.push(&[2.0, 8.0]);
        assert_eq!(avg.values(), &[3.0, 8.0]);
    }

    #[test]
    fn test_shorter_curve_only_touches_prefix() {
        let mut avg = CurveAverager::new(CurveAveraging::Mean);
        avg.push(&[4.0, 6.0]);
        avg.push(&[2.0]);
        assert_eq!(avg.values(), &[3.0, 6.0]);
    }
}
