//! Sheet layouts for the overview and convergence workbooks.
//!
//! Every function builds a whole sheet from accumulated results, so a
//! checkpoint simply re-renders and replaces the sheet.

use crate::results::{GrandSummary, GroupAccumulator};
use crate::workbook::Sheet;

pub const SUMMARY_SHEET: &str = "Results";

const HEADER_ROW: usize = 2;
const FIRST_ROW: usize = HEADER_ROW + 1;
const LABEL_COL: usize = 1;
const BLOCK_ROWS: usize = 5;

/// Column of the measured algorithm, right after the competitors.
fn measured_col(competitors: usize) -> usize {
    LABEL_COL + 1 + competitors
}

fn write_header(sheet: &mut Sheet, competitors: &[String], alg_header: &str) {
    sheet.write_text(HEADER_ROW, LABEL_COL, "Problem");
    for (i, name) in competitors.iter().enumerate() {
        sheet.write_text(HEADER_ROW, LABEL_COL + 1 + i, name.as_str());
    }
    let m = measured_col(competitors.len());
    sheet.write_text(HEADER_ROW, m, alg_header);
    sheet.write_text(HEADER_ROW, m + 1, "Runtime(sec)");
    sheet.write_text(HEADER_ROW, m + 2, "Generations");
}

/// Per-group overview: one row per instance, plus the aggregate row once the
/// group is `finished`.
pub fn overview_group_sheet(acc: &GroupAccumulator, alg_header: &str, finished: bool) -> Sheet {
    let mut sheet = Sheet::new(acc.name());
    sheet.write_text(0, 0, acc.name());
    let competitors = acc.competitor_names();
    write_header(&mut sheet, competitors, alg_header);
    let m = measured_col(competitors.len());

    for (i, inst) in acc.instances().iter().enumerate() {
        let row = FIRST_ROW + i;
        sheet.write_text(row, LABEL_COL, inst.label.as_str());
        for (c, dev) in inst.competitors.iter().enumerate() {
            sheet.write_deviation(row, LABEL_COL + 1 + c, *dev);
        }
        match &inst.measured {
            Some(meas) => {
                sheet.write_deviation(row, m, inst.deviation);
                sheet.write_rounded(row, m + 1, meas.runtime_secs);
                sheet.write_rounded(row, m + 2, meas.best_iteration);
            }
            None => sheet.write_text(row, m, "FAILED"),
        }
    }

    if finished {
        let summary = acc.summary();
        let row = FIRST_ROW + acc.instances().len();
        sheet.write_text(row, LABEL_COL, "Average");
        for (c, dev) in summary.competitor_averages.iter().enumerate() {
            sheet.write_deviation(row, LABEL_COL + 1 + c, *dev);
        }
        sheet.write_deviation(row, m, summary.measured_average);
        sheet.write_rounded(row, m + 1, summary.total_runtime);
        sheet.write_optional(row, m + 2, summary.average_generation);
    }
    sheet
}

/// Per-group convergence sheet: a five-row block per instance, followed by
/// the group's averaged curve once `finished`.
pub fn convergence_group_sheet(acc: &GroupAccumulator, finished: bool) -> Sheet {
    let mut sheet = Sheet::new(acc.name());
    sheet.write_text(0, 0, acc.name());

    for (k, inst) in acc.instances().iter().enumerate() {
        let base = k * BLOCK_ROWS;
        sheet.write_text(base + 1, 1, inst.file.as_str());
        sheet.write_text(base + 2, 1, "Gen best found:");
        sheet.write_text(base + 3, 1, "Func Eval:");
        sheet.write_text(base + 4, 1, "Best Sol Dev:");

        let Some(meas) = &inst.measured else {
            sheet.write_text(base + 2, 2, "FAILED");
            continue;
        };
        sheet.write_rounded(base + 2, 2, meas.best_iteration);
        for (i, it) in meas.iterations.iter().enumerate() {
            sheet.write_number(base + 3, 2 + i, *it as f64);
        }
        if inst.convergence_deviation.is_empty() && !meas.trace.is_empty() {
            sheet.write_text(base + 4, 2, "NA");
        }
        for (i, dev) in inst.convergence_deviation.iter().enumerate() {
            sheet.write_rounded(base + 4, 2 + i, *dev);
        }
    }

    if finished {
        let base = acc.instances().len() * BLOCK_ROWS;
        sheet.write_text(base + 2, 1, "Gen:");
        sheet.write_text(base + 3, 1, "Best Sol Dev:");
        for (i, v) in acc.curve().iter().enumerate() {
            sheet.write_number(base + 2, 2 + i, i as f64);
            sheet.write_rounded(base + 3, 2 + i, *v);
        }
    }
    sheet
}

/// Grand summary of the overview workbook: one row per group plus an overall row.
pub fn overview_summary_sheet(grand: &GrandSummary, alg_header: &str) -> Sheet {
    let mut sheet = Sheet::new(SUMMARY_SHEET);
    sheet.write_text(0, 0, "Overview Of Results");
    write_header(&mut sheet, &grand.competitor_names, alg_header);
    let m = measured_col(grand.competitor_names.len());

    for (i, g) in grand.groups.iter().enumerate() {
        let row = FIRST_ROW + i;
        sheet.write_text(row, LABEL_COL, g.name.as_str());
        for (c, name) in grand.competitor_names.iter().enumerate() {
            sheet.write_deviation(row, LABEL_COL + 1 + c, g.competitor_average(name));
        }
        sheet.write_deviation(row, m, g.measured_average);
        sheet.write_rounded(row, m + 1, g.total_runtime);
        sheet.write_optional(row, m + 2, g.average_generation);
    }

    let row = FIRST_ROW + grand.groups.len();
    sheet.write_text(row, LABEL_COL, "All");
    for (c, dev) in grand.competitor_averages.iter().enumerate() {
        sheet.write_deviation(row, LABEL_COL + 1 + c, *dev);
    }
    sheet.write_deviation(row, m, grand.measured_average);
    sheet.write_rounded(row, m + 1, grand.total_runtime);
    sheet.write_optional(row, m + 2, grand.average_generation);
    sheet
}

/// Grand summary of the convergence workbook: each group's curve and the overall curve.
pub fn convergence_summary_sheet(grand: &GrandSummary) -> Sheet {
    let mut sheet = Sheet::new(SUMMARY_SHEET);
    sheet.write_text(0, 0, "Convergence Overview");

    for (i, g) in grand.groups.iter().enumerate() {
        let row = FIRST_ROW + i;
        sheet.write_text(row, LABEL_COL, g.name.as_str());
        for (j, v) in g.curve.iter().enumerate() {
            sheet.write_rounded(row, LABEL_COL + 1 + j, *v);
        }
    }

    let row = FIRST_ROW + 1 + grand.groups.len();
    sheet.write_text(row, LABEL_COL, "All");
    for (j, v) in grand.curve.iter().enumerate() {
        sheet.write_rounded(row, LABEL_COL + 1 + j, *v);
    }
    sheet
}
