use crate::error::{BenchError, BenchResult};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Labels that introduce the starting objective; each solver app words it differently.
pub const INITIAL_OBJECTIVE_LABELS: [&str; 3] =
    ["Starting Best Sol:", "Initial Profit:", "Starting Teacher:"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceSample {
    pub iteration: u64,
    pub objective: f64,
}

/// One parsed solver report.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Echoed `<folder>/<file>`.
    pub problem: String,
    pub problem_number: usize,
    pub initial_objective: f64,
    /// Final objective; the solver prints 0 for an infeasible result.
    pub objective: f64,
    pub runtime_secs: f64,
    pub best_iteration: u64,
    pub convergence: Vec<ConvergenceSample>,
    /// Echoed item choice per class, one raw line each.
    pub classes: Vec<String>,
}

struct LineCursor<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    last_line: usize,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            last_line: 0,
        }
    }

    fn next_line(&mut self, expecting: &str) -> BenchResult<&'a str> {
        match self.lines.next() {
            Some((i, line)) => {
                self.last_line = i + 1;
                Ok(line.trim_end_matches('\r'))
            }
            None => Err(BenchError::parse(
                self.last_line + 1,
                format!("report truncated, expected {}", expecting),
            )),
        }
    }

    /// Skips blank lines; `None` at end of input.
    fn skip_blank(&mut self) -> Option<(usize, &'a str)> {
        for (i, line) in self.lines.by_ref() {
            self.last_line = i + 1;
            if !line.trim().is_empty() {
                return Some((i + 1, line));
            }
        }
        None
    }

    fn expect_label(&mut self, accepted: &[&str]) -> BenchResult<()> {
        let line = self.next_line(&format!("label '{}'", accepted[0]))?;
        check_label(self.last_line, line, accepted)
    }

    fn value<T: FromStr>(&mut self, field: &str) -> BenchResult<T> {
        let line = self.next_line(field)?;
        line.trim().parse::<T>().map_err(|_| {
            BenchError::parse(
                self.last_line,
                format!("invalid value for {}: '{}'", field, line.trim()),
            )
        })
    }
}

fn check_label(line_no: usize, line: &str, accepted: &[&str]) -> BenchResult<()> {
    let found = line.trim();
    if accepted.iter().any(|l| *l == found) {
        Ok(())
    } else {
        Err(BenchError::parse(
            line_no,
            format!("expected label '{}', found '{}'", accepted.join("' or '"), found),
        ))
    }
}

fn parse_record(cursor: &mut LineCursor<'_>, first: (usize, &str)) -> BenchResult<RunReport> {
    check_label(first.0, first.1, &["Problem:"])?;
    let problem = cursor.next_line("problem name")?.trim().to_string();

    cursor.expect_label(&["Problem Number:"])?;
    let problem_number = cursor.value("problem number")?;

    cursor.expect_label(&INITIAL_OBJECTIVE_LABELS)?;
    let initial_objective = cursor.value("initial objective")?;

    cursor.expect_label(&["Profit:"])?;
    let objective = cursor.value("profit")?;

    cursor.expect_label(&["Runtime:"])?;
    let runtime_secs: f64 = cursor.value("runtime")?;
    if runtime_secs < 0.0 {
        return Err(BenchError::parse(cursor.last_line, "negative runtime"));
    }

    cursor.expect_label(&["Sol Found in _ Iterations"])?;
    let best_iteration = cursor.value("iteration of best solution")?;

    cursor.expect_label(&["Convergence Count:"])?;
    let count: usize = cursor.value("convergence count")?;
    let mut convergence = Vec::with_capacity(count);
    for _ in 0..count {
        let iteration = cursor.value("convergence iteration")?;
        let objective = cursor.value("convergence objective")?;
        convergence.push(ConvergenceSample {
            iteration,
            objective,
        });
    }

    cursor.expect_label(&["Num of Classes:"])?;
    let class_count: usize = cursor.value("class count")?;
    let mut classes = Vec::with_capacity(class_count);
    for _ in 0..class_count {
        classes.push(cursor.next_line("class line")?.trim().to_string());
    }

    Ok(RunReport {
        problem,
        problem_number,
        initial_objective,
        objective,
        runtime_secs,
        best_iteration,
        convergence,
        classes,
    })
}

/// Parses exactly `expected` consecutive records; anything after them is an error.
pub fn parse_reports(text: &str, expected: usize) -> BenchResult<Vec<RunReport>> {
    let mut cursor = LineCursor::new(text);
    let mut reports = Vec::with_capacity(expected);

    for n in 0..expected {
        let first = cursor.skip_blank().ok_or_else(|| {
            BenchError::parse(
                cursor.last_line + 1,
                format!("expected {} report(s), found {}", expected, n),
            )
        })?;
        reports.push(parse_record(&mut cursor, first)?);
    }

    if let Some((line_no, line)) = cursor.skip_blank() {
        return Err(BenchError::parse(
            line_no,
            format!("unexpected content after {} report(s): '{}'", expected, line.trim()),
        ));
    }
    Ok(reports)
}

pub fn parse_report_file<P: AsRef<Path>>(path: P, expected: usize) -> BenchResult<Vec<RunReport>> {
    let text = fs::read_to_string(path)?;
    parse_reports(&text, expected)
}
