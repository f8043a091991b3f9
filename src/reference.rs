use crate::error::{BenchError, BenchResult};
use crate::results::deviation::{deviation_against, Deviation};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Value used in reference sheets for "no comparable result".
pub const MISSING_SENTINEL: f64 = -1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CompetitorSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Exact/best-known values and published competitor results for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    pub group: String,
    pub exact: Vec<Option<f64>>,
    pub competitors: Vec<CompetitorSeries>,
}

pub fn reference_path(compare_dir: &Path, group: &str) -> PathBuf {
    compare_dir.join(format!("{}.csv", group))
}

fn parse_cell(raw: &str, row: usize, col: usize) -> BenchResult<Option<f64>> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let v: f64 = s.parse().map_err(|_| {
        BenchError::Validation(format!(
            "reference cell (row {}, col {}) is not numeric: '{}'",
            row, col, s
        ))
    })?;
    if v == MISSING_SENTINEL {
        Ok(None)
    } else {
        Ok(Some(v))
    }
}

impl ReferenceTable {
    pub fn load(compare_dir: &Path, group: &str) -> BenchResult<Self> {
        let path = reference_path(compare_dir, group);
        debug!("Loading reference sheet {}", path.display());
        let file = File::open(&path).map_err(|e| {
            BenchError::Config(format!(
                "Could not open reference sheet '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_reader(group, file)
    }

    pub fn from_reader<R: Read>(group: &str, reader: R) -> BenchResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let names: Vec<String> = rdr
            .headers()?
            .iter()
            .skip(1)
            .map(|h| h.trim().to_string())
            .collect();

        let mut exact = Vec::new();
        let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); names.len()];

        for (i, result) in rdr.records().enumerate() {
            let rec = result?;
            let row = i + 1;
            exact.push(parse_cell(rec.get(0).unwrap_or(""), row, 0)?);
            for (c, column) in columns.iter_mut().enumerate() {
                column.push(parse_cell(rec.get(c + 1).unwrap_or(""), row, c + 1)?);
            }
        }

        // Separator rows after the last instance carry no data.
        while exact.last() == Some(&None) && columns.iter().all(|c| c.last() == Some(&None)) {
            exact.pop();
            for column in columns.iter_mut() {
                column.pop();
            }
        }

        if exact.is_empty() {
            return Err(BenchError::Validation(format!(
                "reference sheet for '{}' has no rows",
                group
            )));
        }

        let competitors = names
            .into_iter()
            .zip(columns)
            .map(|(name, values)| CompetitorSeries { name, values })
            .collect();

        Ok(Self {
            group: group.to_string(),
            exact,
            competitors,
        })
    }

    /// Exact value for reference row `row`, if the sheet has one.
    pub fn exact(&self, row: usize) -> Option<f64> {
        self.exact.get(row).copied().flatten()
    }

    pub fn competitor_names(&self) -> Vec<String> {
        self.competitors.iter().map(|c| c.name.clone()).collect()
    }

    /// Deviation of every competitor at `row` against the exact value.
    pub fn competitor_deviations(&self, row: usize) -> Vec<Deviation> {
        let exact = self.exact(row);
        self.competitors
            .iter()
            .map(|c| deviation_against(c.values.get(row).copied().flatten(), exact))
            .collect()
    }
}
