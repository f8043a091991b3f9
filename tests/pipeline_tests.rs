use mmkp_bench::algorithms::Algorithm;
use mmkp_bench::catalog::{BenchmarkFile, BenchmarkGroup, HIREMATH_HILL_FOLDER, ORLIB_FOLDER};
use mmkp_bench::config::{Paths, RunnerOptions, SeedMode, Settings};
use mmkp_bench::pipeline::Pipeline;
use mmkp_bench::render::SUMMARY_SHEET;
use mmkp_bench::results::Deviation;
use mmkp_bench::solver::{
    ConvergenceSample, RunFailure, RunOutcome, RunReport, SolverExecutor, SolverRunSpec,
};
use mmkp_bench::workbook::{Cell, Workbook};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

/// Answers runs from a table keyed by (file, index) and records every call.
#[derive(Default)]
struct FakeExecutor {
    answers: HashMap<(String, usize), RunOutcome>,
    calls: Vec<SolverRunSpec>,
}

impl FakeExecutor {
    fn answer(mut self, file: &str, index: usize, outcome: RunOutcome) -> Self {
        self.answers.insert((file.to_string(), index), outcome);
        self
    }

    fn calls_for(&self, file: &str) -> usize {
        self.calls.iter().filter(|s| s.instance.file == file).count()
    }
}

impl SolverExecutor for FakeExecutor {
    fn execute(&mut self, spec: &SolverRunSpec) -> RunOutcome {
        self.calls.push(spec.clone());
        self.answers
            .get(&(spec.instance.file.clone(), spec.instance.index))
            .cloned()
            .unwrap_or(Err(RunFailure::Spawn("no answer configured".into())))
    }
}

fn report(number: usize, objective: f64, trace: &[f64]) -> RunOutcome {
    Ok(RunReport {
        problem: "test".into(),
        problem_number: number,
        initial_objective: objective / 2.0,
        objective,
        runtime_secs: 1.0,
        best_iteration: 4,
        convergence: trace
            .iter()
            .enumerate()
            .map(|(i, &objective)| ConvergenceSample {
                iteration: i as u64 * 10,
                objective,
            })
            .collect(),
        classes: Vec::new(),
    })
}

struct TestContext {
    _dir: TempDir,
    paths: Paths,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let paths = Paths {
            data_dir: dir.path().join("data"),
            compare_dir: dir.path().join("compareData"),
            results_dir: dir.path().join("results"),
            solver_dir: dir.path().to_path_buf(),
        };
        fs::create_dir_all(&paths.compare_dir).unwrap();
        Self { _dir: dir, paths }
    }

    fn reference(&self, group: &str, content: &str) {
        fs::write(self.paths.compare_dir.join(format!("{}.csv", group)), content).unwrap();
    }
}

fn orlib_settings() -> Settings {
    Settings {
        groups: vec![BenchmarkGroup::new(
            ORLIB_FOLDER,
            vec![BenchmarkFile::new("I01", 1), BenchmarkFile::new("I02", 1)],
        )],
        ..Default::default()
    }
}

fn approx(d: Deviation, expected: f64) -> bool {
    matches!(d, Deviation::Value(v) if (v - expected).abs() < 1e-9)
}

#[test]
fn test_orlib_scenario() {
    let ctx = TestContext::new();
    ctx.reference("orlib", "exact,COMP\n10.0,11.0\n20.0,-1\n");
    let settings = orlib_settings();
    let options = RunnerOptions::default();
    let executor = FakeExecutor::default()
        .answer("I01", 1, report(1, 10.5, &[9.0, 10.0]))
        .answer("I02", 1, report(1, 19.0, &[18.0, 19.0]));

    let mut pipeline = Pipeline::new(&settings, &ctx.paths, &options, executor);
    let outcomes = pipeline.run(Algorithm::Tlbo).unwrap();
    assert_eq!(outcomes.len(), 1);

    let summary = &outcomes[0].summary;
    let group = &summary.groups[0];
    assert_eq!(group.name, "orlib");
    assert!(approx(group.measured_average, 5.0));
    assert!(approx(group.competitor_averages[0], 10.0));
    assert!(approx(summary.measured_average, 5.0));
    assert_eq!(group.total_runtime, 2.0);
    assert_eq!(group.average_generation, Some(4.0));
    // Per-instance curves [10, 0] and [10, 5], pairwise averaged.
    assert_eq!(group.curve, vec![10.0, 2.5]);

    let overview = Workbook::load(&outcomes[0].overview_path).unwrap();
    let sheet = overview.sheet("orlib").unwrap();
    assert_eq!(sheet.get(2, 2), &Cell::Text("COMP".into()));
    assert_eq!(sheet.get(2, 3), &Cell::Text("TLBO".into()));
    assert_eq!(sheet.get(3, 1), &Cell::Text("I01".into()));
    assert_eq!(sheet.number(3, 2), Some(10.0));
    assert_eq!(sheet.number(3, 3), Some(5.0));
    assert_eq!(sheet.get(4, 2), &Cell::Text("NA".into()));
    assert_eq!(sheet.number(4, 3), Some(5.0));
    assert_eq!(sheet.get(5, 1), &Cell::Text("Average".into()));
    assert_eq!(sheet.number(5, 3), Some(5.0));

    let names: Vec<&str> = overview.sheets().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["orlib", SUMMARY_SHEET]);

    let graphs = Workbook::load(&outcomes[0].graphs_path).unwrap();
    assert!(graphs.sheet("orlib").is_some());
    assert!(graphs.sheet(SUMMARY_SHEET).is_some());
}

#[test]
fn test_failed_instance_does_not_stop_group() {
    let ctx = TestContext::new();
    ctx.reference("orlib", "exact,COMP\n10.0,11.0\n20.0,-1\n");
    let settings = orlib_settings();
    let options = RunnerOptions {
        retries: 2,
        ..Default::default()
    };
    let executor = FakeExecutor::default()
        .answer("I01", 1, Err(RunFailure::Exit(Some(3))))
        .answer("I02", 1, report(1, 19.0, &[]));

    let mut pipeline = Pipeline::new(&settings, &ctx.paths, &options, executor);
    let outcomes = pipeline.run(Algorithm::Tlbo).unwrap();

    // One attempt plus two retries.
    assert_eq!(pipeline.executor().calls_for("I01"), 3);
    assert_eq!(pipeline.executor().calls_for("I02"), 1);

    let group = &outcomes[0].summary.groups[0];
    assert_eq!(group.failed, 1);
    assert!(approx(group.measured_average, 5.0));

    let sheet = Workbook::load(&outcomes[0].overview_path).unwrap();
    let sheet = sheet.sheet("orlib").unwrap();
    assert_eq!(sheet.get(3, 3), &Cell::Text("FAILED".into()));
}

#[test]
fn test_spawn_failure_is_not_retried() {
    let ctx = TestContext::new();
    ctx.reference("orlib", "exact\n10.0\n20.0\n");
    let settings = orlib_settings();
    let options = RunnerOptions {
        retries: 5,
        ..Default::default()
    };

    let mut pipeline = Pipeline::new(&settings, &ctx.paths, &options, FakeExecutor::default());
    let outcomes = pipeline.run(Algorithm::Coa).unwrap();

    assert_eq!(pipeline.executor().calls.len(), 2);
    assert_eq!(outcomes[0].summary.groups[0].failed, 2);
    assert_eq!(
        outcomes[0].summary.measured_average,
        Deviation::NotAvailable
    );
}

#[test]
fn test_missing_reference_skips_group() {
    let ctx = TestContext::new();
    ctx.reference("orlib", "exact\n10.0\n20.0\n");
    let mut settings = orlib_settings();
    settings.groups.push(BenchmarkGroup::new(
        HIREMATH_HILL_FOLDER,
        vec![BenchmarkFile::new("HHI5.txt", 2)],
    ));
    let options = RunnerOptions::default();
    let executor = FakeExecutor::default()
        .answer("I01", 1, report(1, 10.0, &[]))
        .answer("I02", 1, report(1, 20.0, &[]));

    let mut pipeline = Pipeline::new(&settings, &ctx.paths, &options, executor);
    let outcomes = pipeline.run(Algorithm::Tlbo).unwrap();

    assert_eq!(outcomes[0].skipped_groups.len(), 1);
    assert_eq!(outcomes[0].skipped_groups[0].0, "HHI5");
    assert_eq!(outcomes[0].summary.groups.len(), 1);
    assert_eq!(pipeline.executor().calls_for("HHI5.txt"), 0);
}

#[test]
fn test_zero_reference_yields_not_available() {
    let ctx = TestContext::new();
    ctx.reference("orlib", "exact\n0.0\n20.0\n");
    let settings = orlib_settings();
    let options = RunnerOptions::default();
    let executor = FakeExecutor::default()
        .answer("I01", 1, report(1, 10.0, &[5.0]))
        .answer("I02", 1, report(1, 19.0, &[]));

    let mut pipeline = Pipeline::new(&settings, &ctx.paths, &options, executor);
    let outcomes = pipeline.run(Algorithm::Tlbo).unwrap();

    let group = &outcomes[0].summary.groups[0];
    assert_eq!(group.failed, 0);
    assert!(approx(group.measured_average, 5.0));
    assert!(group.curve.is_empty());
}

#[test]
fn test_problem_number_mismatch_is_a_failure() {
    let ctx = TestContext::new();
    ctx.reference("HHI5", "exact\n10.0\n20.0\n");
    let settings = Settings {
        groups: vec![BenchmarkGroup::new(
            HIREMATH_HILL_FOLDER,
            vec![BenchmarkFile::new("HHI5.txt", 2)],
        )],
        ..Default::default()
    };
    let options = RunnerOptions::default();
    let executor = FakeExecutor::default()
        .answer("HHI5.txt", 1, report(1, 10.0, &[]))
        .answer("HHI5.txt", 2, report(1, 20.0, &[]));

    let mut pipeline = Pipeline::new(&settings, &ctx.paths, &options, executor);
    let outcomes = pipeline.run(Algorithm::Mmhph).unwrap();

    let group = &outcomes[0].summary.groups[0];
    assert_eq!(group.failed, 1);
    assert!(approx(group.measured_average, 0.0));

    let sheet = Workbook::load(&outcomes[0].overview_path).unwrap();
    let sheet = sheet.sheet("HHI5").unwrap();
    // Hiremath-Hill rows are labelled by instance number.
    assert_eq!(sheet.get(3, 1), &Cell::Text("1".into()));
    assert_eq!(sheet.get(4, 2), &Cell::Text("FAILED".into()));
}

#[test]
fn test_repeats_average_and_fixed_seed() {
    let ctx = TestContext::new();
    ctx.reference("orlib", "exact\n10.0\n20.0\n");
    let settings = Settings {
        repeats: 3,
        seed: SeedMode::Fixed(7),
        ..orlib_settings()
    };
    let options = RunnerOptions::default();
    let executor = FakeExecutor::default()
        .answer("I01", 1, report(1, 11.0, &[]))
        .answer("I02", 1, report(1, 22.0, &[]));

    let mut pipeline = Pipeline::new(&settings, &ctx.paths, &options, executor);
    let outcomes = pipeline.run(Algorithm::Ga).unwrap();

    let calls = &pipeline.executor().calls;
    assert_eq!(calls.len(), 6);
    assert!(calls.iter().all(|s| s.seed == Some(7)));
    assert_eq!(calls[0].args().last().map(String::as_str), Some("7"));

    // Run ids are unique, so report artifacts never collide.
    let mut ids: Vec<u64> = calls.iter().map(|s| s.run_id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 6);

    assert!(approx(outcomes[0].summary.measured_average, 10.0));
}

#[test]
fn test_sweeps_write_tagged_workbooks() {
    let ctx = TestContext::new();
    ctx.reference("orlib", "exact\n10.0\n20.0\n");
    let settings = Settings {
        pop_sizes: vec![30, 60],
        ..orlib_settings()
    };
    let options = RunnerOptions {
        no_checkpoint: true,
        ..Default::default()
    };
    let executor = FakeExecutor::default()
        .answer("I01", 1, report(1, 10.0, &[]))
        .answer("I02", 1, report(1, 20.0, &[]));

    let mut pipeline = Pipeline::new(&settings, &ctx.paths, &options, executor);
    let outcomes = pipeline.run(Algorithm::Tlbo).unwrap();

    assert_eq!(outcomes.len(), 2);
    let first = outcomes[0].overview_path.file_name().unwrap().to_string_lossy();
    assert_eq!(first, "tlbo_p30_g60_m1210_OverviewResults");
    assert!(outcomes[1].overview_path.exists());
    assert!(outcomes[1].graphs_path.starts_with(ctx.paths.graphs_dir()));
}
