use clap::Args;
use mmkp_bench::config::{Paths, Settings};
use mmkp_bench::error::BenchResult;
use mmkp_bench::significance::{self, DEFAULT_INPUT, SIGNIFICANCE_WORKBOOK};
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Consolidated results sheet. Defaults to <results-dir>/AllResults.csv.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output workbook directory. Defaults to <results-dir>/statisticalAnalysis.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: StatsArgs, settings: &Settings, paths: &Paths) -> BenchResult<()> {
    let input = args
        .input
        .unwrap_or_else(|| paths.results_dir.join(DEFAULT_INPUT));
    let output = args
        .output
        .unwrap_or_else(|| paths.results_dir.join(SIGNIFICANCE_WORKBOOK));
    significance::run_significance(&input, &output, &settings.variant_names)?;
    Ok(())
}
