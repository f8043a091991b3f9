use crate::algorithms::Algorithm;
use crate::catalog::{BenchmarkGroup, InstanceRef};
use crate::config::{Paths, RunnerOptions, SeedMode, Settings, SweepParams};
use crate::error::BenchResult;
use crate::reference::ReferenceTable;
use crate::render;
use crate::results::{
    percent_deviation, GrandSummary, GroupAccumulator, GroupSummary, InstanceResult, Measurement,
};
use crate::solver::{execute_with_retries, SolverExecutor, SolverRunSpec};
use crate::workbook::Workbook;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// What one sweep of one algorithm produced.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub algorithm: Algorithm,
    pub sweep: SweepParams,
    pub summary: GrandSummary,
    pub overview_path: PathBuf,
    pub graphs_path: PathBuf,
    /// Groups that could not be processed, with the reason.
    pub skipped_groups: Vec<(String, String)>,
}

/// Runs every configured group for an algorithm and writes its workbooks.
pub struct Pipeline<'a, E: SolverExecutor> {
    settings: &'a Settings,
    paths: &'a Paths,
    options: &'a RunnerOptions,
    executor: E,
    next_run_id: u64,
    rng: fastrand::Rng,
}

impl<'a, E: SolverExecutor> Pipeline<'a, E> {
    pub fn new(
        settings: &'a Settings,
        paths: &'a Paths,
        options: &'a RunnerOptions,
        executor: E,
    ) -> Self {
        Self {
            settings,
            paths,
            options,
            executor,
            next_run_id: 0,
            rng: fastrand::Rng::new(),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn run(&mut self, alg: Algorithm) -> BenchResult<Vec<SweepOutcome>> {
        let sweeps = self.settings.sweeps(alg);
        let tagged = sweeps.len() > 1;
        info!("🚀 Starting {} ({} parameter set(s))", alg.header(), sweeps.len());

        let mut outcomes = Vec::with_capacity(sweeps.len());
        for sweep in sweeps {
            let suffix = if tagged { sweep.suffix() } else { String::new() };
            outcomes.push(self.run_sweep(alg, sweep, &suffix)?);
        }
        Ok(outcomes)
    }

    fn run_sweep(
        &mut self,
        alg: Algorithm,
        sweep: SweepParams,
        suffix: &str,
    ) -> BenchResult<SweepOutcome> {
        let overview_path = self
            .paths
            .results_dir
            .join(format!("{}{}_OverviewResults", alg, suffix));
        let graphs_path = self
            .paths
            .graphs_dir()
            .join(format!("{}{}_ConvResults", alg, suffix));
        info!(
            "Parameters: pop {} | gen {} | mods {} | extra [{}]",
            sweep.pop_size,
            sweep.gen_size,
            sweep.modifier,
            sweep.params.join(" ")
        );

        let mut overview = Workbook::new();
        let mut graphs = Workbook::new();
        let mut summaries = Vec::new();
        let mut skipped_groups = Vec::new();
        let header = alg.header();

        let settings = self.settings;
        for group in &settings.groups {
            let name = group.name();
            let reference = match ReferenceTable::load(&self.paths.compare_dir, &name) {
                Ok(r) => r,
                Err(e) => {
                    error!("❌ Skipping group '{}': {}", name, e);
                    skipped_groups.push((name, e.to_string()));
                    continue;
                }
            };
            if reference.exact.len() < group.instance_count() {
                warn!(
                    "Reference sheet '{}' has {} rows for {} instances",
                    name,
                    reference.exact.len(),
                    group.instance_count()
                );
            }

            let summary = self.run_group(
                alg,
                &sweep,
                group,
                &reference,
                &header,
                (&mut overview, &overview_path),
                (&mut graphs, &graphs_path),
            )?;
            summaries.push(summary);
        }

        let summary = GrandSummary::new(
            &alg.to_string(),
            summaries,
            self.settings.convergence_averaging,
        );
        overview.put_sheet(render::overview_summary_sheet(&summary, &header));
        graphs.put_sheet(render::convergence_summary_sheet(&summary));
        overview.save(&overview_path)?;
        graphs.save(&graphs_path)?;
        info!("📊 Wrote {}", overview_path.display());

        Ok(SweepOutcome {
            algorithm: alg,
            sweep,
            summary,
            overview_path,
            graphs_path,
            skipped_groups,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn run_group(
        &mut self,
        alg: Algorithm,
        sweep: &SweepParams,
        group: &BenchmarkGroup,
        reference: &ReferenceTable,
        header: &str,
        (overview, overview_path): (&mut Workbook, &Path),
        (graphs, graphs_path): (&mut Workbook, &Path),
    ) -> BenchResult<GroupSummary> {
        let mut acc = GroupAccumulator::new(
            &group.name(),
            reference.competitor_names(),
            self.settings.convergence_averaging,
        );

        for inst in group.instances() {
            info!("Problem: {} - {} executing...", inst.file, inst.index);
            let result = self.run_instance(alg, sweep, &inst, reference);
            match (&result.measured, &result.failure) {
                (Some(m), _) => info!("Profit: {} ({})", m.objective, result.deviation),
                (None, Some(reason)) => error!("❌ {} - {} failed: {}", inst.file, inst.index, reason),
                (None, None) => {}
            }
            acc.push(result);

            if !self.options.no_checkpoint {
                overview.put_sheet(render::overview_group_sheet(&acc, header, false));
                graphs.put_sheet(render::convergence_group_sheet(&acc, false));
                overview.save(overview_path)?;
                graphs.save(graphs_path)?;
            }
        }

        overview.put_sheet(render::overview_group_sheet(&acc, header, true));
        graphs.put_sheet(render::convergence_group_sheet(&acc, true));
        overview.save(overview_path)?;
        graphs.save(graphs_path)?;
        Ok(acc.summary())
    }

    fn next_seed(&mut self) -> Option<u64> {
        match self.settings.seed {
            SeedMode::SolverDefault => None,
            SeedMode::Fixed(s) => Some(s),
            SeedMode::Random => Some(self.rng.u32(..) as u64),
        }
    }

    fn run_instance(
        &mut self,
        alg: Algorithm,
        sweep: &SweepParams,
        inst: &InstanceRef,
        reference: &ReferenceTable,
    ) -> InstanceResult {
        let competitors = reference.competitor_deviations(inst.row);
        let mut reports = Vec::with_capacity(self.settings.repeats);
        let mut failures = Vec::new();

        for _ in 0..self.settings.repeats {
            self.next_run_id += 1;
            let seed = self.next_seed();
            let spec = SolverRunSpec::new(self.next_run_id, alg, inst.clone(), sweep, seed);

            match execute_with_retries(&mut self.executor, &spec, self.options.retries) {
                Ok(report) if report.problem_number != inst.index => {
                    let reason = format!(
                        "report is for problem {}, expected {}",
                        report.problem_number, inst.index
                    );
                    warn!("Run {}: {}", spec.run_id, reason);
                    failures.push(reason);
                }
                Ok(report) => reports.push(report),
                Err(failure) => {
                    warn!("Run {} failed: {}", spec.run_id, failure);
                    failures.push(failure.to_string());
                }
            }
        }

        let label = inst.label();
        let Some(measurement) = Measurement::from_reports(&reports) else {
            return InstanceResult::failed(
                label,
                inst.file.clone(),
                competitors,
                failures.join("; "),
            );
        };

        let exact = reference.exact(inst.row);
        match exact {
            Some(r) => {
                if let Err(e) = percent_deviation(measurement.objective, r) {
                    warn!("{} - {}: {}", inst.file, inst.index, e);
                }
            }
            None => warn!(
                "{} - {}: no exact value in reference row {}",
                inst.file, inst.index, inst.row
            ),
        }
        InstanceResult::measured(label, inst.file.clone(), competitors, measurement, exact)
    }
}
