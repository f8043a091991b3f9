use crate::error::{BenchError, BenchResult};
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// External metaheuristics the runner knows how to drive.
#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Algorithm {
    Tlbo,
    Coa,
    Ga,
    Bba,
    Aco,
    Mmhph,
    Abc,
}

impl Algorithm {
    /// Executable name, relative to the solver directory.
    pub fn executable(&self) -> &'static str {
        match self {
            Self::Mmhph => "MmhphApp",
            _ => "HeuristicApp",
        }
    }

    /// The shared `HeuristicApp` dispatches on a tag argument; dedicated apps don't take one.
    pub fn takes_tag(&self) -> bool {
        !matches!(self, Self::Mmhph)
    }

    /// Only the dedicated apps read a trailing seed; `HeuristicApp` rejects the extra argument.
    pub fn accepts_seed(&self) -> bool {
        !self.takes_tag()
    }

    /// Extra positional parameters appended after the generation count.
    pub fn default_params(&self) -> Vec<String> {
        let raw: &[&str] = match self {
            Self::Tlbo => &["0", "0"],
            Self::Coa => &["1.0", "0.8"],
            Self::Ga => &["2", "0.05"],
            Self::Aco => &["25.0", "0.98", "0.005"],
            Self::Bba | Self::Mmhph | Self::Abc => &[],
        };
        raw.iter().map(|s| s.to_string()).collect()
    }

    /// Column header used in the overview sheets.
    pub fn header(&self) -> String {
        self.to_string().to_uppercase()
    }

    pub fn parse_token(token: &str) -> BenchResult<Self> {
        Algorithm::from_str(token.trim()).map_err(|_| {
            BenchError::UnknownAlgorithm(token.to_string(), Self::known_names().join(", "))
        })
    }

    pub fn known_names() -> Vec<String> {
        Algorithm::iter().map(|a| a.to_string()).collect()
    }
}

/// The sequence run when no algorithm is named on the command line.
pub fn default_sequence() -> Vec<Algorithm> {
    vec![Algorithm::Tlbo, Algorithm::Mmhph, Algorithm::Abc]
}
