//! Profit/weight correlation of the benchmark instances.

use crate::catalog::{BenchmarkGroup, DataFolder, InstanceRef};
use crate::config::{Paths, Settings};
use crate::error::BenchResult;
use crate::instance::{load_instance, MmkpInstance};
use crate::workbook::{Sheet, Workbook};
use rayon::prelude::*;
use std::path::Path;
use tracing::info;

pub const ANALYSIS_WORKBOOK: &str = "ProblemAnalysis";

const HEADER_ROW: usize = 2;
const LABEL_COL: usize = 1;

/// Pearson's r from running sums. `None` when either side has no variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return None;
    }
    let (mut sx, mut sy, mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        sx += x;
        sy += y;
        sxy += x * y;
        sxx += x * x;
        syy += y * y;
    }
    let n = n as f64;
    let denom = ((n * sxx - sx * sx) * (n * syy - sy * sy)).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((n * sxy - sx * sy) / denom)
}

/// Correlations of one instance: one per constraint, then against the mean weight.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceCorrelation {
    pub label: String,
    pub per_constraint: Vec<Option<f64>>,
    pub mean_weight: Option<f64>,
}

pub fn correlate(label: String, instance: &MmkpInstance) -> InstanceCorrelation {
    let profits: Vec<f64> = instance.items().map(|i| i.profit).collect();
    let per_constraint = (0..instance.resources())
        .map(|k| {
            let weights: Vec<f64> = instance
                .items()
                .map(|i| i.weights.get(k).copied().unwrap_or(0.0))
                .collect();
            pearson(&profits, &weights)
        })
        .collect();
    let means: Vec<f64> = instance.items().map(|i| i.mean_weight()).collect();

    InstanceCorrelation {
        label,
        per_constraint,
        mean_weight: pearson(&profits, &means),
    }
}

fn analysis_label(inst: &InstanceRef) -> String {
    match inst.data_folder() {
        Some(DataFolder::Orlib) => inst.file.clone(),
        _ => format!("{}{}", inst.file, inst.index),
    }
}

pub fn analyze_group(data_dir: &Path, group: &BenchmarkGroup) -> BenchResult<Sheet> {
    let name = group.name();
    let rows = group
        .instances()
        .par_iter()
        .map(|inst| {
            let instance = load_instance(data_dir, inst)?;
            Ok(correlate(analysis_label(inst), &instance))
        })
        .collect::<BenchResult<Vec<_>>>()?;

    let constraints = rows
        .iter()
        .map(|r| r.per_constraint.len())
        .max()
        .unwrap_or(0);

    let mut sheet = Sheet::new(&name);
    sheet.write_text(0, 0, name.as_str());
    sheet.write_text(HEADER_ROW, LABEL_COL, "Problem");
    for k in 0..constraints {
        sheet.write_text(HEADER_ROW, LABEL_COL + 1 + k, format!("C_{}", k));
    }
    sheet.write_text(HEADER_ROW, LABEL_COL + 1 + constraints, "E_C/n");

    for (i, r) in rows.iter().enumerate() {
        let row = HEADER_ROW + 1 + i;
        sheet.write_text(row, LABEL_COL, r.label.as_str());
        for (k, v) in r.per_constraint.iter().enumerate() {
            sheet.write_optional(row, LABEL_COL + 1 + k, *v);
        }
        sheet.write_optional(row, LABEL_COL + 1 + constraints, r.mean_weight);
    }
    Ok(sheet)
}

/// Builds and saves `results/ProblemAnalysis`. Returns the workbook written.
pub fn problem_analysis(settings: &Settings, paths: &Paths) -> BenchResult<Workbook> {
    let mut workbook = Workbook::new();
    for group in &settings.groups {
        info!("Analysing {} ...", group.name());
        workbook.put_sheet(analyze_group(&paths.data_dir, group)?);
    }
    let out = paths.results_dir.join(ANALYSIS_WORKBOOK);
    workbook.save(&out)?;
    info!("📊 Wrote {}", out.display());
    Ok(workbook)
}
