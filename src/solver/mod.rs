pub mod parser;

use crate::algorithms::Algorithm;
use crate::catalog::InstanceRef;
use crate::config::SweepParams;
use std::fs::{self, File};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

pub use parser::{parse_report_file, parse_reports, ConvergenceSample, RunReport};

/// One concrete solver invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverRunSpec {
    pub run_id: u64,
    pub algorithm: Algorithm,
    pub instance: InstanceRef,
    pub pop_size: usize,
    pub gen_size: usize,
    pub modifier: String,
    pub params: Vec<String>,
    pub seed: Option<u64>,
}

impl SolverRunSpec {
    pub fn new(
        run_id: u64,
        algorithm: Algorithm,
        instance: InstanceRef,
        sweep: &SweepParams,
        seed: Option<u64>,
    ) -> Self {
        Self {
            run_id,
            algorithm,
            instance,
            pop_size: sweep.pop_size,
            gen_size: sweep.gen_size,
            modifier: sweep.modifier.clone(),
            params: sweep.params.clone(),
            seed,
        }
    }

    /// `<folder> <file> <index> [<tag>] <modifier> <pop> <gen> [params...] [<seed>]`
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            self.instance.folder.clone(),
            self.instance.file.clone(),
            self.instance.index.to_string(),
        ];
        if self.algorithm.takes_tag() {
            args.push(self.algorithm.to_string());
        }
        args.push(self.modifier.clone());
        args.push(self.pop_size.to_string());
        args.push(self.gen_size.to_string());
        args.extend(self.params.iter().cloned());
        if let Some(seed) = self.seed {
            args.push(seed.to_string());
        }
        args
    }

    pub fn command_line(&self) -> String {
        format!("./{} {}", self.algorithm.executable(), self.args().join(" "))
    }

    pub fn report_file_name(&self) -> String {
        format!(
            "{}-{:06}-{}.txt",
            self.algorithm,
            self.run_id,
            std::process::id()
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunFailure {
    #[error("could not start solver: {0}")]
    Spawn(String),

    #[error("solver exited with status {}", exit_label(.0))]
    Exit(Option<i32>),

    #[error("solver timed out after {0:?}")]
    TimedOut(Duration),

    #[error("unreadable report: {0}")]
    Report(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "signal".to_string(),
    }
}

impl RunFailure {
    /// Exit failures and timeouts may be transient; the rest will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RunFailure::Exit(_) | RunFailure::TimedOut(_))
    }
}

pub type RunOutcome = Result<RunReport, RunFailure>;

/// Seam between the pipeline and whatever actually runs a solver.
pub trait SolverExecutor {
    fn execute(&mut self, spec: &SolverRunSpec) -> RunOutcome;
}

/// Runs `spec`, retrying retryable failures up to `retries` extra times.
pub fn execute_with_retries<E: SolverExecutor + ?Sized>(
    executor: &mut E,
    spec: &SolverRunSpec,
    retries: u32,
) -> RunOutcome {
    let mut attempt = 0;
    loop {
        match executor.execute(spec) {
            Ok(report) => return Ok(report),
            Err(failure) if failure.is_retryable() && attempt < retries => {
                attempt += 1;
                warn!(
                    "Run {} failed ({}), retry {}/{}",
                    spec.run_id, failure, attempt, retries
                );
            }
            Err(failure) => return Err(failure),
        }
    }
}

/// Spawns the real solver binaries, one report file per run.
pub struct ProcessExecutor {
    pub solver_dir: PathBuf,
    pub data_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub timeout: Option<Duration>,
    pub keep_reports: bool,
    pub poll_interval: Duration,
}

impl ProcessExecutor {
    pub fn new(
        solver_dir: PathBuf,
        data_dir: PathBuf,
        scratch_dir: PathBuf,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            solver_dir,
            data_dir,
            scratch_dir,
            timeout,
            keep_reports: false,
            poll_interval: Duration::from_millis(20),
        }
    }

    fn executable(&self, alg: Algorithm) -> Result<PathBuf, RunFailure> {
        let path = self.solver_dir.join(alg.executable());
        // The child runs inside data_dir, so the program path must not be relative.
        fs::canonicalize(&path)
            .map_err(|e| RunFailure::Spawn(format!("{}: {}", path.display(), e)))
    }
}

impl SolverExecutor for ProcessExecutor {
    fn execute(&mut self, spec: &SolverRunSpec) -> RunOutcome {
        let program = self.executable(spec.algorithm)?;

        fs::create_dir_all(&self.scratch_dir)
            .map_err(|e| RunFailure::Spawn(format!("scratch dir: {}", e)))?;
        let report_path = self.scratch_dir.join(spec.report_file_name());
        let report_file = File::create(&report_path)
            .map_err(|e| RunFailure::Spawn(format!("{}: {}", report_path.display(), e)))?;

        debug!("Running: {}", spec.command_line());
        let mut child = Command::new(&program)
            .args(spec.args())
            .current_dir(&self.data_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(report_file))
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| RunFailure::Spawn(format!("{}: {}", program.display(), e)))?;

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if let Some(limit) = self.timeout {
                        if started.elapsed() >= limit {
                            let _ = child.kill();
                            let _ = child.wait();
                            warn!(
                                "Run {} killed after {:?}; report kept at {}",
                                spec.run_id,
                                limit,
                                report_path.display()
                            );
                            return Err(RunFailure::TimedOut(limit));
                        }
                    }
                    thread::sleep(self.poll_interval);
                }
                Err(e) => return Err(RunFailure::Spawn(e.to_string())),
            }
        };

        if !status.success() {
            warn!(
                "Run {} exited with {}; report kept at {}",
                spec.run_id,
                status,
                report_path.display()
            );
            return Err(RunFailure::Exit(status.code()));
        }

        let report = parse_report_file(&report_path, 1)
            .map_err(|e| RunFailure::Report(e.to_string()))
            .and_then(|mut reports| {
                reports
                    .pop()
                    .ok_or_else(|| RunFailure::Report("no report produced".into()))
            })?;

        if !self.keep_reports {
            if let Err(e) = fs::remove_file(&report_path) {
                debug!("Could not remove {}: {}", report_path.display(), e);
            }
        }
        Ok(report)
    }
}
