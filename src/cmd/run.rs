use crate::reports;
use clap::Args;
use mmkp_bench::algorithms::Algorithm;
use mmkp_bench::config::{Paths, RunnerOptions, Settings};
use mmkp_bench::error::BenchResult;
use mmkp_bench::pipeline::Pipeline;
use mmkp_bench::solver::ProcessExecutor;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Algorithm to run (tlbo, coa, ga, bba, aco, mmhph, abc). Runs the configured
    /// sequence when omitted.
    pub algorithm: Option<String>,

    #[command(flatten)]
    pub options: RunnerOptions,
}

pub fn run(args: RunArgs, settings: &Settings, paths: &Paths) -> BenchResult<()> {
    // Resolve everything up front so a bad name fails before any workbook exists.
    let algorithms = match &args.algorithm {
        Some(token) => vec![Algorithm::parse_token(token)?],
        None => settings.sequence()?,
    };
    settings.check_seed_support(&algorithms)?;

    let mut executor = ProcessExecutor::new(
        paths.solver_dir.clone(),
        paths.data_dir.clone(),
        paths.scratch_dir(),
        args.options.timeout(),
    );
    executor.keep_reports = args.options.keep_reports;

    let start = Instant::now();
    let mut pipeline = Pipeline::new(settings, paths, &args.options, executor);
    for alg in algorithms {
        for outcome in pipeline.run(alg)? {
            for (group, reason) in &outcome.skipped_groups {
                warn!("Group '{}' was skipped: {}", group, reason);
            }
            reports::print_grand_summary(&outcome);
        }
    }
    info!("🏁 Finished in {:.1?}", start.elapsed());
    Ok(())
}
