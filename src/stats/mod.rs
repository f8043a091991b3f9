//! Significance tests used to compare algorithm variants.
//!
//! Statistics follow the usual textbook definitions (and the results of
//! `scipy.stats` for the same inputs). A test that cannot be computed, for
//! example because every value is identical, yields NaN in both fields
//! instead of an error so that a whole comparison matrix can still be written.

pub mod distributions;

use distributions::{chi2_sf, f_sf, normal_sf};

/// Test statistic and its p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    pub statistic: f64,
    pub pvalue: f64,
}

impl TestResult {
    pub const UNDEFINED: TestResult = TestResult {
        statistic: f64::NAN,
        pvalue: f64::NAN,
    };

    pub fn is_defined(&self) -> bool {
        !self.statistic.is_nan() && !self.pvalue.is_nan()
    }
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// One-way ANOVA F-test over `groups`.
pub fn f_oneway(groups: &[&[f64]]) -> TestResult {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.is_empty()) {
        return TestResult::UNDEFINED;
    }
    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    if n_total <= k {
        return TestResult::UNDEFINED;
    }

    let grand = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n_total as f64;
    let means: Vec<f64> = groups.iter().map(|g| mean(g)).collect();

    let ss_between: f64 = groups
        .iter()
        .zip(&means)
        .map(|(g, m)| g.len() as f64 * (m - grand).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .zip(&means)
        .map(|(g, m)| g.iter().map(|v| (v - m).powi(2)).sum::<f64>())
        .sum();

    let df_between = (k - 1) as f64;
    let df_within = (n_total - k) as f64;
    if ss_within == 0.0 {
        // Constant groups: separated means are certain, equal means are undefined.
        return if ss_between > 0.0 {
            TestResult {
                statistic: f64::INFINITY,
                pvalue: 0.0,
            }
        } else {
            TestResult::UNDEFINED
        };
    }

    let f = (ss_between / df_between) / (ss_within / df_within);
    TestResult {
        statistic: f,
        pvalue: f_sf(f, df_between, df_within),
    }
}

/// Average (1-based) ranks of `values`; ties share the mean of their positions.
/// Also returns the tie term `Σ(t³ - t)`.
pub fn rank_average(values: &[f64]) -> (Vec<f64>, f64) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut ties = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // positions i..j (0-based) share rank (i+1 + j) / 2
        let rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = rank;
        }
        let t = (j - i) as f64;
        ties += t * t * t - t;
        i = j;
    }
    (ranks, ties)
}

/// Kruskal-Wallis H-test with tie correction.
pub fn kruskal(groups: &[&[f64]]) -> TestResult {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.is_empty()) {
        return TestResult::UNDEFINED;
    }
    let pooled: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let n = pooled.len() as f64;
    let (ranks, ties) = rank_average(&pooled);

    let correction = 1.0 - ties / (n * n * n - n);
    if correction <= 0.0 {
        return TestResult::UNDEFINED;
    }

    let mut offset = 0;
    let mut sum = 0.0;
    for g in groups {
        let r: f64 = ranks[offset..offset + g.len()].iter().sum();
        sum += r * r / g.len() as f64;
        offset += g.len();
    }
    let h = (12.0 / (n * (n + 1.0)) * sum - 3.0 * (n + 1.0)) / correction;
    TestResult {
        statistic: h,
        pvalue: chi2_sf(h, (k - 1) as f64),
    }
}

/// Wilcoxon rank-sum test (normal approximation, no tie correction, two-sided).
pub fn ranksums(x: &[f64], y: &[f64]) -> TestResult {
    if x.is_empty() || y.is_empty() {
        return TestResult::UNDEFINED;
    }
    let n1 = x.len() as f64;
    let n2 = y.len() as f64;
    let pooled: Vec<f64> = x.iter().chain(y).copied().collect();
    let (ranks, _) = rank_average(&pooled);

    let s: f64 = ranks[..x.len()].iter().sum();
    let expected = n1 * (n1 + n2 + 1.0) / 2.0;
    let z = (s - expected) / (n1 * n2 * (n1 + n2 + 1.0) / 12.0).sqrt();
    TestResult {
        statistic: z,
        pvalue: 2.0 * normal_sf(z.abs()),
    }
}
