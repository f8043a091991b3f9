use super::convergence::{mean_curve, CurveAverager, CurveAveraging};
use super::deviation::{deviation_against, mean_available, Deviation};
use crate::solver::RunReport;

/// The measured algorithm's result for one instance, averaged over repeats.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub objective: f64,
    pub runtime_secs: f64,
    pub best_iteration: f64,
    /// Iteration numbers of the first run's trace.
    pub iterations: Vec<u64>,
    /// Sample-wise mean objective, aligned with `iterations`.
    pub trace: Vec<f64>,
    pub runs: usize,
}

impl Measurement {
    pub fn from_reports(reports: &[RunReport]) -> Option<Self> {
        let first = reports.first()?;
        let n = reports.len() as f64;

        let traces: Vec<Vec<f64>> = reports
            .iter()
            .map(|r| r.convergence.iter().map(|s| s.objective).collect())
            .collect();
        let trace = mean_curve(&traces);
        let iterations = first
            .convergence
            .iter()
            .take(trace.len())
            .map(|s| s.iteration)
            .collect();

        Some(Self {
            objective: reports.iter().map(|r| r.objective).sum::<f64>() / n,
            runtime_secs: reports.iter().map(|r| r.runtime_secs).sum::<f64>() / n,
            best_iteration: reports.iter().map(|r| r.best_iteration as f64).sum::<f64>() / n,
            iterations,
            trace,
            runs: reports.len(),
        })
    }
}

/// Everything known about one instance after it has been run.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceResult {
    pub label: String,
    pub file: String,
    pub competitors: Vec<Deviation>,
    pub measured: Option<Measurement>,
    pub deviation: Deviation,
    /// Deviation of each convergence sample; empty when the reference is unusable.
    pub convergence_deviation: Vec<f64>,
    pub failure: Option<String>,
}

impl InstanceResult {
    pub fn measured(
        label: String,
        file: String,
        competitors: Vec<Deviation>,
        measurement: Measurement,
        exact: Option<f64>,
    ) -> Self {
        let deviation = deviation_against(Some(measurement.objective), exact);
        let convergence_deviation = match exact {
            Some(_) => measurement
                .trace
                .iter()
                .map(|&v| deviation_against(Some(v), exact).value())
                .collect::<Option<Vec<f64>>>()
                .unwrap_or_default(),
            None => Vec::new(),
        };
        Self {
            label,
            file,
            competitors,
            measured: Some(measurement),
            deviation,
            convergence_deviation,
            failure: None,
        }
    }

    pub fn failed(label: String, file: String, competitors: Vec<Deviation>, reason: String) -> Self {
        Self {
            label,
            file,
            competitors,
            measured: None,
            deviation: Deviation::NotAvailable,
            convergence_deviation: Vec::new(),
            failure: Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub name: String,
    pub competitor_names: Vec<String>,
    pub competitor_averages: Vec<Deviation>,
    pub measured_average: Deviation,
    pub total_runtime: f64,
    pub average_generation: Option<f64>,
    pub curve: Vec<f64>,
    pub instances: usize,
    pub failed: usize,
}

impl GroupSummary {
    pub fn competitor_average(&self, name: &str) -> Deviation {
        self.competitor_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.competitor_averages[i])
            .unwrap_or(Deviation::NotAvailable)
    }
}

/// Collects instance results for one benchmark group.
#[derive(Debug, Clone)]
pub struct GroupAccumulator {
    name: String,
    competitor_names: Vec<String>,
    instances: Vec<InstanceResult>,
    curve: CurveAverager,
}

impl GroupAccumulator {
    pub fn new(name: &str, competitor_names: Vec<String>, averaging: CurveAveraging) -> Self {
        Self {
            name: name.to_string(),
            competitor_names,
            instances: Vec::new(),
            curve: CurveAverager::new(averaging),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn competitor_names(&self) -> &[String] {
        &self.competitor_names
    }

    pub fn instances(&self) -> &[InstanceResult] {
        &self.instances
    }

    pub fn curve(&self) -> &[f64] {
        self.curve.values()
    }

    pub fn push(&mut self, result: InstanceResult) {
        if !result.convergence_deviation.is_empty() {
            self.curve.push(&result.convergence_deviation);
        }
        self.instances.push(result);
    }

    pub fn summary(&self) -> GroupSummary {
        let competitor_averages = (0..self.competitor_names.len())
            .map(|c| {
                mean_available(
                    self.instances
                        .iter()
                        .map(|i| i.competitors.get(c).copied().unwrap_or(Deviation::NotAvailable)),
                )
            })
            .collect();

        let measured: Vec<&Measurement> =
            self.instances.iter().filter_map(|i| i.measured.as_ref()).collect();
        let average_generation = if measured.is_empty() {
            None
        } else {
            Some(measured.iter().map(|m| m.best_iteration).sum::<f64>() / measured.len() as f64)
        };

        GroupSummary {
            name: self.name.clone(),
            competitor_names: self.competitor_names.clone(),
            competitor_averages,
            measured_average: mean_available(self.instances.iter().map(|i| i.deviation)),
            total_runtime: measured.iter().map(|m| m.runtime_secs).sum(),
            average_generation,
            curve: self.curve.values().to_vec(),
            instances: self.instances.len(),
            failed: self.instances.iter().filter(|i| i.failure.is_some()).count(),
        }
    }
}

/// Roll-up of every group of one algorithm run.
#[derive(Debug, Clone, PartialEq)]
pub struct GrandSummary {
    pub algorithm: String,
    pub groups: Vec<GroupSummary>,
    /// Union of competitor names, in order of first appearance.
    pub competitor_names: Vec<String>,
    pub competitor_averages: Vec<Deviation>,
    pub measured_average: Deviation,
    pub total_runtime: f64,
    pub average_generation: Option<f64>,
    pub curve: Vec<f64>,
}

impl GrandSummary {
    pub fn new(algorithm: &str, groups: Vec<GroupSummary>, averaging: CurveAveraging) -> Self {
        let mut competitor_names: Vec<String> = Vec::new();
        for g in &groups {
            for n in &g.competitor_names {
                if !competitor_names.contains(n) {
                    competitor_names.push(n.clone());
                }
            }
        }

        let competitor_averages = competitor_names
            .iter()
            .map(|n| mean_available(groups.iter().map(|g| g.competitor_average(n))))
            .collect();

        let generations: Vec<f64> = groups.iter().filter_map(|g| g.average_generation).collect();
        let average_generation = if generations.is_empty() {
            None
        } else {
            Some(generations.iter().sum::<f64>() / generations.len() as f64)
        };

        let mut curve = CurveAverager::new(averaging);
        for g in groups.iter().filter(|g| !g.curve.is_empty()) {
            curve.push(&g.curve);
        }

        Self {
            algorithm: algorithm.to_string(),
            competitor_names,
            competitor_averages,
            measured_average: mean_available(groups.iter().map(|g| g.measured_average)),
            total_runtime: groups.iter().map(|g| g.total_runtime).sum(),
            average_generation,
            curve: curve.into_values(),
            groups,
        }
    }
}
