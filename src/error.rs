use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Unknown algorithm '{0}' (expected one of: {1})")]
    UnknownAlgorithm(String, String),

    #[error("Report Parse Error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Solver Run Failed: {0}")]
    RunFailed(String),

    #[error("Reference unavailable: {0}")]
    ReferenceUnavailable(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),
}

impl BenchError {
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        BenchError::Parse {
            line,
            reason: reason.into(),
        }
    }
}

pub type BenchResult<T> = Result<T, BenchError>;
