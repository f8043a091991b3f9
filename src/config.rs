use crate::algorithms::{self, Algorithm};
use crate::catalog::{self, BenchmarkGroup};
use crate::error::{BenchError, BenchResult};
use crate::results::CurveAveraging;
use clap::Args;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::IntoEnumIterator;

/// Where inputs are read from and reports are written to.
#[derive(Args, Debug, Clone)]
pub struct Paths {
    /// Root holding the benchmark folders (orlib_data, HiremathHill_data).
    #[arg(global = true, long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Folder of per-group reference sheets (<group>.csv).
    #[arg(global = true, long, default_value = "compareData")]
    pub compare_dir: PathBuf,

    #[arg(global = true, long, default_value = "results")]
    pub results_dir: PathBuf,

    /// Folder holding the solver executables.
    #[arg(global = true, long, default_value = ".")]
    pub solver_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            compare_dir: PathBuf::from("compareData"),
            results_dir: PathBuf::from("results"),
            solver_dir: PathBuf::from("."),
        }
    }
}

impl Paths {
    pub fn graphs_dir(&self) -> PathBuf {
        self.results_dir.join("graphs")
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.results_dir.join("runs")
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunnerOptions {
    /// Kill a solver run after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Extra attempts for a run that exits non-zero or times out.
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Save workbooks once per group instead of after every instance.
    #[arg(long, default_value_t = false)]
    pub no_checkpoint: bool,

    /// Keep the per-run report files instead of deleting them after parsing.
    #[arg(long, default_value_t = false)]
    pub keep_reports: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            retries: 0,
            no_checkpoint: false,
            keep_reports: false,
        }
    }
}

impl RunnerOptions {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SeedMode {
    /// No seed argument; the solver falls back to its built-in seed.
    #[default]
    SolverDefault,
    Fixed(u64),
    /// A fresh seed for every run.
    Random,
}

/// Per-algorithm overrides of the general parameter tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmSettings {
    pub pop_sizes: Option<Vec<usize>>,
    pub gen_sizes: Option<Vec<usize>>,
    pub modifiers: Option<Vec<Vec<String>>>,
    pub params: Option<Vec<String>>,
}

/// Immutable experiment configuration shared by every component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub groups: Vec<BenchmarkGroup>,
    pub repeats: usize,
    pub seed: SeedMode,
    pub pop_sizes: Vec<usize>,
    pub gen_sizes: Vec<usize>,
    /// Candidate digits per modifier position; every combination is swept.
    pub modifiers: Vec<Vec<String>>,
    pub algorithms: BTreeMap<String, AlgorithmSettings>,
    pub default_sequence: Vec<String>,
    pub convergence_averaging: CurveAveraging,
    /// Column names for the significance tests when the input sheet has no header.
    pub variant_names: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            groups: catalog::default_catalog(),
            repeats: 1,
            seed: SeedMode::SolverDefault,
            pop_sizes: vec![90],
            gen_sizes: vec![60],
            modifiers: vec![
                vec!["1".to_string()],
                vec!["2".to_string()],
                vec!["1".to_string()],
                vec!["0".to_string()],
            ],
            algorithms: BTreeMap::new(),
            default_sequence: algorithms::default_sequence()
                .iter()
                .map(|a| a.to_string())
                .collect(),
            convergence_averaging: CurveAveraging::Pairwise,
            variant_names: [
                "tlbo",
                "tt-tlbo",
                "stoc-tt-tlbo",
                "mod-tlbo",
                "tt-mod-tlbo",
                "stoc-tt-mod-tlbo",
                "i-tlbo",
                "tt-i-tlbo",
                "stoc-tt-i-tlbo",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// One point of the parameter grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepParams {
    pub pop_size: usize,
    pub gen_size: usize,
    pub modifier: String,
    pub params: Vec<String>,
}

impl SweepParams {
    pub fn suffix(&self) -> String {
        format!("_p{}_g{}_m{}", self.pop_size, self.gen_size, self.modifier)
    }
}

impl Settings {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> BenchResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BenchError::Config(format!(
                "Failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> BenchResult<()> {
        if self.repeats == 0 {
            return Err(BenchError::Config("repeats must be at least 1".into()));
        }
        if self.groups.is_empty() {
            return Err(BenchError::Config("no benchmark groups configured".into()));
        }

        let mut seen = HashSet::new();
        for g in &self.groups {
            let name = g.name();
            if !seen.insert(name.clone()) {
                return Err(BenchError::Config(format!(
                    "duplicate benchmark group name '{}'",
                    name
                )));
            }
            if g.instance_count() == 0 {
                return Err(BenchError::Config(format!("group '{}' has no instances", name)));
            }
        }

        for key in self.algorithms.keys() {
            Algorithm::parse_token(key)?;
        }
        for token in &self.default_sequence {
            Algorithm::parse_token(token)?;
        }

        for alg in Algorithm::iter() {
            let (pops, gens, mods) = self.grid_for(alg);
            if pops.is_empty() || gens.is_empty() || mods.is_empty() {
                return Err(BenchError::Config(format!(
                    "{}: population, generation and modifier lists must be non-empty",
                    alg
                )));
            }
            if pops.contains(&0) || gens.contains(&0) {
                return Err(BenchError::Config(format!(
                    "{}: population and generation sizes must be positive",
                    alg
                )));
            }
            if mods.iter().any(|choices| choices.is_empty()) {
                return Err(BenchError::Config(format!(
                    "{}: every modifier position needs at least one digit",
                    alg
                )));
            }
        }
        Ok(())
    }

    /// Fails when a seed would be passed to a solver that has no seed argument.
    pub fn check_seed_support(&self, algorithms: &[Algorithm]) -> BenchResult<()> {
        if self.seed == SeedMode::SolverDefault {
            return Ok(());
        }
        let unsupported: Vec<String> = algorithms
            .iter()
            .filter(|a| !a.accepts_seed())
            .map(|a| a.to_string())
            .collect();
        if unsupported.is_empty() {
            Ok(())
        } else {
            Err(BenchError::Config(format!(
                "seed mode {:?} is not supported by {} (their executable takes no seed argument)",
                self.seed,
                unsupported.join(", ")
            )))
        }
    }

    pub fn sequence(&self) -> BenchResult<Vec<Algorithm>> {
        self.default_sequence
            .iter()
            .map(|t| Algorithm::parse_token(t))
            .collect()
    }

    fn overrides(&self, alg: Algorithm) -> Option<&AlgorithmSettings> {
        self.algorithms.get(&alg.to_string())
    }

    fn grid_for(&self, alg: Algorithm) -> (&[usize], &[usize], &[Vec<String>]) {
        let o = self.overrides(alg);
        let pops = o
            .and_then(|o| o.pop_sizes.as_deref())
            .unwrap_or(&self.pop_sizes);
        let gens = o
            .and_then(|o| o.gen_sizes.as_deref())
            .unwrap_or(&self.gen_sizes);
        let mods = o
            .and_then(|o| o.modifiers.as_deref())
            .unwrap_or(&self.modifiers);
        (pops, gens, mods)
    }

    pub fn params_for(&self, alg: Algorithm) -> Vec<String> {
        self.overrides(alg)
            .and_then(|o| o.params.clone())
            .unwrap_or_else(|| alg.default_params())
    }

    /// Cartesian product of population sizes, generation counts and modifier digits.
    pub fn sweeps(&self, alg: Algorithm) -> Vec<SweepParams> {
        let (pops, gens, mods) = self.grid_for(alg);
        let params = self.params_for(alg);

        let modifiers: Vec<String> = mods
            .iter()
            .map(|choices| choices.iter())
            .multi_cartesian_product()
            .map(|digits| digits.into_iter().map(String::as_str).collect::<String>())
            .collect();

        let mut out = Vec::new();
        for &pop_size in pops {
            for &gen_size in gens {
                for modifier in &modifiers {
                    out.push(SweepParams {
                        pop_size,
                        gen_size,
                        modifier: modifier.clone(),
                        params: params.clone(),
                    });
                }
            }
        }
        out
    }
}
