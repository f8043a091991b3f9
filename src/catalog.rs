use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumString};

pub const ORLIB_FOLDER: &str = "orlib_data";
pub const HIREMATH_HILL_FOLDER: &str = "HiremathHill_data";

/// Benchmark folders whose file layout is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum DataFolder {
    #[strum(serialize = "orlib_data")]
    Orlib,
    #[strum(serialize = "HiremathHill_data")]
    HiremathHill,
}

/// A benchmark file and the number of instances it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkFile {
    pub file: String,
    pub instances: usize,
}

impl BenchmarkFile {
    pub fn new(file: &str, instances: usize) -> Self {
        Self {
            file: file.to_string(),
            instances,
        }
    }
}

/// Problem instances that share one reference sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkGroup {
    pub folder: String,
    pub files: Vec<BenchmarkFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One concrete instance inside a group, in reference-row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRef {
    pub folder: String,
    pub file: String,
    /// 1-based position inside `file`.
    pub index: usize,
    /// 0-based row inside the group's reference sheet.
    pub row: usize,
}

impl InstanceRef {
    /// Row label used in the overview sheet.
    pub fn label(&self) -> String {
        match self.data_folder() {
            Some(DataFolder::Orlib) => self.file.clone(),
            _ => self.index.to_string(),
        }
    }

    pub fn data_folder(&self) -> Option<DataFolder> {
        self.folder.parse().ok()
    }

    pub fn path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.folder).join(&self.file)
    }
}

impl BenchmarkGroup {
    pub fn new(folder: &str, files: Vec<BenchmarkFile>) -> Self {
        Self {
            folder: folder.to_string(),
            files,
            name: None,
        }
    }

    /// Sheet and reference-file name of the group.
    pub fn name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match self.folder.parse::<DataFolder>() {
            Ok(DataFolder::Orlib) => "orlib".to_string(),
            Ok(DataFolder::HiremathHill) => self
                .files
                .first()
                .map(|f| f.file.trim_end_matches(".txt").to_string())
                .unwrap_or_else(|| "default".to_string()),
            Err(_) => "default".to_string(),
        }
    }

    pub fn instance_count(&self) -> usize {
        self.files.iter().map(|f| f.instances).sum()
    }

    pub fn instances(&self) -> Vec<InstanceRef> {
        let mut out = Vec::with_capacity(self.instance_count());
        for f in &self.files {
            for index in 1..=f.instances {
                out.push(InstanceRef {
                    folder: self.folder.clone(),
                    file: f.file.clone(),
                    index,
                    row: out.len(),
                });
            }
        }
        out
    }
}

/// The full OR-Library and Hiremath-Hill catalog.
pub fn default_catalog() -> Vec<BenchmarkGroup> {
    let orlib_files = (1..=13)
        .map(|i| BenchmarkFile::new(&format!("I{:02}", i), 1))
        .collect();

    let mut groups = vec![BenchmarkGroup::new(ORLIB_FOLDER, orlib_files)];

    let hh: [(&str, usize); 20] = [
        ("TestSet1.5GP10IT5KP.txt", 30),
        ("TestSet2.10GP10IT5KP.txt", 30),
        ("TestSet3.25GP10IT5KP.txt", 30),
        ("TestSet4.5GP10IT10KP.txt", 30),
        ("TestSet5.10GP10IT10KP.txt", 30),
        ("TestSet6.25GP10IT10KP.txt", 30),
        ("TestSet7.5GP10IT25KP.txt", 30),
        ("TestSet8.10GP10IT25KP.txt", 30),
        ("TestSet9.25GP10IT25KP.txt", 30),
        ("TestSet.30GP10IT10KP.txt", 10),
        ("TestSet.50GP10IT10KP.txt", 10),
        ("TestSet.70GP10IT10KP.txt", 10),
        ("TestSet.80GP10IT10KP.txt", 10),
        ("TestSet.100GP10IT10KP.txt", 10),
        ("TestSet.150GP10IT10KP.txt", 10),
        ("TestSet.200GP10IT10KP.txt", 10),
        ("TestSet.250GP10IT10KP.txt", 10),
        ("TestSet.300GP10IT10KP.txt", 10),
        ("TestSet.350GP10IT10KP.txt", 10),
        ("TestSet.400GP10IT10KP.txt", 10),
    ];
    for (file, count) in hh {
        groups.push(BenchmarkGroup::new(
            HIREMATH_HILL_FOLDER,
            vec![BenchmarkFile::new(file, count)],
        ));
    }
    groups
}
