use crate::catalog::{DataFolder, InstanceRef};
use crate::error::{BenchError, BenchResult};
use std::fs;
use std::iter::Peekable;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub profit: f64,
    pub weights: Vec<f64>,
}

impl Item {
    pub fn mean_weight(&self) -> f64 {
        if self.weights.is_empty() {
            0.0
        } else {
            self.weights.iter().sum::<f64>() / self.weights.len() as f64
        }
    }
}

/// One MMKP instance: pick one item per class within every resource capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct MmkpInstance {
    pub capacities: Vec<f64>,
    pub classes: Vec<Vec<Item>>,
}

impl MmkpInstance {
    pub fn resources(&self) -> usize {
        self.capacities.len()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.classes.iter().flatten()
    }
}

/// Whitespace tokens with their line numbers.
struct Tokens<'a> {
    inner: Peekable<Box<dyn Iterator<Item = (usize, &'a str)> + 'a>>,
    line: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let inner: Box<dyn Iterator<Item = (usize, &'a str)> + 'a> = Box::new(
            text.lines()
                .enumerate()
                .flat_map(|(i, l)| l.split_whitespace().map(move |t| (i + 1, t))),
        );
        Self {
            inner: inner.peekable(),
            line: 0,
        }
    }

    fn is_exhausted(&mut self) -> bool {
        self.inner.peek().is_none()
    }

    fn parse_next<T: FromStr>(&mut self, what: &str) -> BenchResult<T> {
        let (line, tok) = self.inner.next().ok_or_else(|| {
            BenchError::parse(
                self.line + 1,
                format!("unexpected end of file, expected {}", what),
            )
        })?;
        self.line = line;
        tok.parse::<T>()
            .map_err(|_| BenchError::parse(line, format!("invalid {}: '{}'", what, tok)))
    }
}

fn read_body(
    tokens: &mut Tokens<'_>,
    classes: usize,
    items: usize,
    resources: usize,
) -> BenchResult<MmkpInstance> {
    let mut capacities = Vec::with_capacity(resources);
    for _ in 0..resources {
        capacities.push(tokens.parse_next("capacity")?);
    }

    let mut out = Vec::with_capacity(classes);
    for _ in 0..classes {
        let _class_id: f64 = tokens.parse_next("class id")?;
        let mut class = Vec::with_capacity(items);
        for _ in 0..items {
            let profit = tokens.parse_next("profit")?;
            let mut weights = Vec::with_capacity(resources);
            for _ in 0..resources {
                weights.push(tokens.parse_next("weight")?);
            }
            class.push(Item { profit, weights });
        }
        out.push(class);
    }
    Ok(MmkpInstance {
        capacities,
        classes: out,
    })
}

/// OR-Library layout: `classes items resources`, capacities, then per class an
/// id followed by `items` rows of `profit w_1 .. w_m`.
pub fn read_orlib(text: &str) -> BenchResult<MmkpInstance> {
    let mut tokens = Tokens::new(text);
    let classes = tokens.parse_next("class count")?;
    let items = tokens.parse_next("items per class")?;
    let resources = tokens.parse_next("resource count")?;
    read_body(&mut tokens, classes, items, resources)
}

/// Hiremath-Hill layout: several instances back to back, each prefixed by its number.
pub fn read_hiremath_hill(text: &str, number: usize) -> BenchResult<MmkpInstance> {
    let mut tokens = Tokens::new(text);
    loop {
        if tokens.is_exhausted() {
            return Err(BenchError::Validation(format!(
                "instance {} not found in file",
                number
            )));
        }
        let found: usize = tokens.parse_next("instance number")?;
        let classes = tokens.parse_next("class count")?;
        let items = tokens.parse_next("items per class")?;
        let resources = tokens.parse_next("resource count")?;
        let instance = read_body(&mut tokens, classes, items, resources)?;
        if found == number {
            return Ok(instance);
        }
    }
}

pub fn load_instance(data_dir: &Path, inst: &InstanceRef) -> BenchResult<MmkpInstance> {
    let path = inst.path(data_dir);
    let text = fs::read_to_string(&path).map_err(|e| {
        BenchError::Config(format!("Could not open '{}': {}", path.display(), e))
    })?;
    match inst.data_folder() {
        Some(DataFolder::Orlib) => read_orlib(&text),
        Some(DataFolder::HiremathHill) => read_hiremath_hill(&text, inst.index),
        None => Err(BenchError::Config(format!(
            "unrecognized benchmark folder '{}'",
            inst.folder
        ))),
    }
}
