//! Pairwise significance tests between algorithm variants.
//!
//! Input is a consolidated CSV: column 0 labels the problem, every further
//! column holds one variant's result per problem. The first row names the
//! variants; a purely numeric first row is treated as data and the names come
//! from `Settings::variant_names`.

use crate::error::{BenchError, BenchResult};
use crate::stats::{f_oneway, kruskal, ranksums, TestResult};
use crate::workbook::{Sheet, Workbook, NA};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_INPUT: &str = "AllResults.csv";
pub const SIGNIFICANCE_WORKBOOK: &str = "statisticalAnalysis";

/// Variant indices of the plain and team-teaching families in the nine-column layout.
pub const PLAIN_FAMILY: [usize; 3] = [0, 3, 6];
pub const TEAM_FAMILY: [usize; 6] = [1, 2, 4, 5, 7, 8];

#[derive(Debug, Clone, PartialEq)]
pub struct VariantSamples {
    pub names: Vec<String>,
    pub columns: Vec<Vec<f64>>,
}

impl VariantSamples {
    pub fn load<P: AsRef<Path>>(path: P, fallback_names: &[String]) -> BenchResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            BenchError::Config(format!(
                "Could not open results sheet '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_reader(file, fallback_names)
    }

    pub fn from_reader<R: Read>(reader: R, fallback_names: &[String]) -> BenchResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let rows = rdr
            .records()
            .collect::<Result<Vec<_>, _>>()?;
        let Some(first) = rows.first() else {
            return Err(BenchError::Validation("results sheet is empty".into()));
        };

        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        if width < 2 {
            return Err(BenchError::Validation(
                "results sheet needs a label column and at least one variant".into(),
            ));
        }
        let variants = width - 1;

        let has_header = first
            .iter()
            .skip(1)
            .any(|cell| !cell.trim().is_empty() && cell.trim().parse::<f64>().is_err());
        let names: Vec<String> = (0..variants)
            .map(|i| {
                let from_header = if has_header {
                    first.get(i + 1).map(|s| s.trim().to_string())
                } else {
                    None
                };
                from_header
                    .filter(|s| !s.is_empty())
                    .or_else(|| fallback_names.get(i).cloned())
                    .unwrap_or_else(|| format!("variant-{}", i + 1))
            })
            .collect();

        let mut columns = vec![Vec::new(); variants];
        let data = if has_header { &rows[1..] } else { &rows[..] };
        for (r, record) in data.iter().enumerate() {
            for (i, column) in columns.iter_mut().enumerate() {
                let raw = record.get(i + 1).unwrap_or("").trim();
                if raw.is_empty() {
                    continue;
                }
                let value = raw.parse::<f64>().map_err(|_| {
                    BenchError::Validation(format!(
                        "non-numeric value '{}' in row {}, column {}",
                        raw,
                        r + 1 + usize::from(has_header),
                        i + 1
                    ))
                })?;
                column.push(value);
            }
        }
        Ok(Self { names, columns })
    }

    fn subset(&self, indices: &[usize]) -> Vec<&[f64]> {
        indices.iter().map(|&i| self.columns[i].as_slice()).collect()
    }
}

/// The three pairwise tests written by [`significance_workbook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairTest {
    Anova,
    Kruskal,
    RankSum,
}

impl PairTest {
    pub const ALL: [PairTest; 3] = [PairTest::Anova, PairTest::Kruskal, PairTest::RankSum];

    pub fn sheet_name(self) -> &'static str {
        match self {
            PairTest::Anova => "anova",
            PairTest::Kruskal => "Kruskal",
            PairTest::RankSum => "RankSum",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PairTest::Anova => "One-way ANOVA",
            PairTest::Kruskal => "Kruskal-Wallis-H-test",
            PairTest::RankSum => "Mann-Whitney-Wilcoxon Rank Sum test",
        }
    }

    pub fn statistic_label(self) -> &'static str {
        match self {
            PairTest::Anova => "f-value",
            PairTest::Kruskal => "H-statistic",
            PairTest::RankSum => "z-statistic",
        }
    }

    pub fn apply(self, a: &[f64], b: &[f64]) -> TestResult {
        match self {
            PairTest::Anova => f_oneway(&[a, b]),
            PairTest::Kruskal => kruskal(&[a, b]),
            PairTest::RankSum => ranksums(a, b),
        }
    }
}

fn write_raw(sheet: &mut Sheet, row: usize, col: usize, value: f64) {
    if value.is_nan() {
        sheet.write_text(row, col, NA);
    } else {
        sheet.write_number(row, col, value);
    }
}

/// Matrix sheet: p-values in the upper block, statistics in the lower block.
pub fn pair_sheet(test: PairTest, samples: &VariantSamples) -> Sheet {
    let n = samples.names.len();
    let mut sheet = Sheet::new(test.sheet_name());
    sheet.write_text(0, 0, test.title());
    sheet.write_text(1, 0, "p-value");
    sheet.write_text(n + 3, 0, test.statistic_label());
    for (i, name) in samples.names.iter().enumerate() {
        sheet.write_text(2, i + 2, name.as_str());
        sheet.write_text(i + 3, 1, name.as_str());
        sheet.write_text(n + 4, i + 2, name.as_str());
        sheet.write_text(n + 5 + i, 1, name.as_str());
    }

    for i in 0..n {
        for j in 0..n {
            let result = test.apply(&samples.columns[i], &samples.columns[j]);
            write_raw(&mut sheet, 3 + i, 2 + j, result.pvalue);
            write_raw(&mut sheet, n + 5 + i, 2 + j, result.statistic);
        }
    }
    sheet
}

/// Kruskal-Wallis across several variants at once, for the console log.
pub fn family_test(samples: &VariantSamples, indices: &[usize]) -> Option<TestResult> {
    if indices.iter().any(|&i| i >= samples.columns.len()) {
        return None;
    }
    Some(kruskal(&samples.subset(indices)))
}

pub fn significance_workbook(samples: &VariantSamples) -> Workbook {
    let mut workbook = Workbook::new();
    for test in PairTest::ALL {
        workbook.put_sheet(pair_sheet(test, samples));
    }
    workbook
}

fn log_family(label: &str, result: Option<TestResult>) {
    match result {
        Some(r) if r.is_defined() => info!(
            "Kruskal Wallis H-test ({}): h = {:.6}, p = {:.6}",
            label, r.statistic, r.pvalue
        ),
        Some(_) => warn!("Kruskal Wallis H-test ({}): undefined", label),
        None => {}
    }
}

/// Runs every test on `input` and saves the workbook at `output`.
pub fn run_significance(
    input: &Path,
    output: &Path,
    fallback_names: &[String],
) -> BenchResult<Workbook> {
    let samples = VariantSamples::load(input, fallback_names)?;
    info!(
        "Loaded {} variants from {}",
        samples.names.len(),
        input.display()
    );

    let all: Vec<usize> = (0..samples.columns.len()).collect();
    log_family("all variants", family_test(&samples, &all));
    if samples.columns.len() == 9 {
        log_family("tlbo", family_test(&samples, &PLAIN_FAMILY));
        log_family("tt-tlbo", family_test(&samples, &TEAM_FAMILY));
    }

    let workbook = significance_workbook(&samples);
    workbook.save(output)?;
    info!("📊 Wrote {}", output.display());
    Ok(workbook)
}
