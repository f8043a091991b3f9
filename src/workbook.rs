//! Minimal multi-sheet workbook.
//!
//! A saved workbook is a directory holding `workbook.json` (ordered sheet
//! list) and one CSV file per sheet. Cells are addressed by `(row, col)`.

use crate::error::{BenchError, BenchResult};
use crate::results::Deviation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::Path;

pub const MANIFEST: &str = "workbook.json";
pub const NA: &str = "NA";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => v.to_string(),
        }
    }

    fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            Cell::Empty
        } else if let Some(v) = raw.parse::<f64>().ok().filter(|v| v.is_finite()) {
            Cell::Number(v)
        } else {
            Cell::Text(raw.to_string())
        }
    }
}

/// Rounds to 3 significant digits. Presentation only.
pub fn round_sig3(x: f64) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    format!("{:.2e}", x).parse().unwrap_or(x)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    cells: BTreeMap<(usize, usize), Cell>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: BTreeMap::new(),
        }
    }

    pub fn write(&mut self, row: usize, col: usize, cell: Cell) {
        if cell == Cell::Empty {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), cell);
        }
    }

    pub fn write_text(&mut self, row: usize, col: usize, text: impl Into<String>) {
        self.write(row, col, Cell::Text(text.into()));
    }

    pub fn write_number(&mut self, row: usize, col: usize, value: f64) {
        self.write(row, col, Cell::Number(value));
    }

    pub fn write_rounded(&mut self, row: usize, col: usize, value: f64) {
        self.write(row, col, Cell::Number(round_sig3(value)));
    }

    pub fn write_deviation(&mut self, row: usize, col: usize, deviation: Deviation) {
        match deviation {
            Deviation::Value(v) => self.write_rounded(row, col, v),
            Deviation::NotAvailable => self.write_text(row, col, NA),
        }
    }

    /// Rounded number, or `NA` for `None`.
    pub fn write_optional(&mut self, row: usize, col: usize, value: Option<f64>) {
        self.write_deviation(row, col, Deviation::from(value));
    }

    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.cells.get(&(row, col)).unwrap_or(&Cell::Empty)
    }

    pub fn number(&self, row: usize, col: usize) -> Option<f64> {
        self.get(row, col).as_number()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `(rows, cols)` of the used range, counting from (0, 0).
    pub fn dimensions(&self) -> (usize, usize) {
        let rows = self.cells.keys().map(|(r, _)| r + 1).max().unwrap_or(0);
        let cols = self.cells.keys().map(|(_, c)| c + 1).max().unwrap_or(0);
        (rows, cols)
    }

    fn save_csv(&self, path: &Path) -> BenchResult<()> {
        let (rows, cols) = self.dimensions();
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)?;
        for r in 0..rows {
            let record: Vec<String> = (0..cols).map(|c| self.get(r, c).render()).collect();
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn load_csv(name: &str, path: &Path) -> BenchResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        let mut sheet = Sheet::new(name);
        for (r, result) in rdr.records().enumerate() {
            for (c, raw) in result?.iter().enumerate() {
                sheet.write(r, c, Cell::parse(raw));
            }
        }
        Ok(sheet)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ManifestEntry {
    name: String,
    file: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    sheets: Vec<ManifestEntry>,
}

fn sheet_file_name(index: usize, name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect();
    format!("{:02}_{}.csv", index, safe)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Inserts `sheet`, replacing any sheet with the same name in place.
    pub fn put_sheet(&mut self, sheet: Sheet) {
        match self.sheets.iter_mut().find(|s| s.name == sheet.name) {
            Some(existing) => *existing = sheet,
            None => self.sheets.push(sheet),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, dir: P) -> BenchResult<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut entries = Vec::with_capacity(self.sheets.len());
        for (i, sheet) in self.sheets.iter().enumerate() {
            let file = sheet_file_name(i, &sheet.name);
            sheet.save_csv(&dir.join(&file))?;
            entries.push(ManifestEntry {
                name: sheet.name.clone(),
                file,
            });
        }

        let manifest = File::create(dir.join(MANIFEST))?;
        serde_json::to_writer_pretty(manifest, &Manifest { sheets: entries })?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(dir: P) -> BenchResult<Self> {
        let dir = dir.as_ref();
        let manifest_path = dir.join(MANIFEST);
        let file = File::open(&manifest_path).map_err(|e| {
            BenchError::Config(format!(
                "Not a workbook: '{}' ({})",
                manifest_path.display(),
                e
            ))
        })?;
        let manifest: Manifest = serde_json::from_reader(file)?;

        let sheets = manifest
            .sheets
            .iter()
            .map(|entry| Sheet::load_csv(&entry.name, &dir.join(&entry.file)))
            .collect::<BenchResult<Vec<_>>>()?;
        Ok(Self { sheets })
    }
}
