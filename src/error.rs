//! Error type shared by the HMM engine and its collaborators.
use thiserror::Error;

/// Which parameter table an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Transition,
    Emission,
    Initial,
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Table::Transition => write!(f, "transition"),
            Table::Emission => write!(f, "emission"),
            Table::Initial => write!(f, "initial"),
        }
    }
}

#[derive(Debug, Error)]
pub enum HmmError {
    /// Observation sequence of length zero.
    #[error("observation sequence is empty")]
    EmptySequence,

    /// A symbol outside `[0, num_observations)`.
    #[error("symbol {symbol} at position {position} is out of range (alphabet size {num_observations})")]
    SymbolOutOfRange {
        position: usize,
        symbol: usize,
        num_observations: usize,
    },

    #[error("{what} must be positive")]
    ZeroDimension { what: &'static str },

    #[error("{table} table has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        table: Table,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("{table} row {row} sums to {sum}, expected 1")]
    InvalidDistribution { table: Table, row: usize, sum: f64 },

    #[error("{table}[{row}][{column}] = {value} is not a probability")]
    NegativeProbability {
        table: Table,
        row: usize,
        column: usize,
        value: f64,
    },

    /// The total evidence likelihood vanished (or overflowed) at time `time`.
    #[error("evidence likelihood is {value} at time {time}; cannot normalize")]
    DegenerateNormalizer { time: usize, value: f64 },

    #[error("sequences have different lengths ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },

    #[error("can not parse {token:?} at position {position}")]
    Parse { position: usize, token: String },

    #[error("unknown token {0:?}")]
    UnknownToken(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("can not sample from the model: {0}")]
    Sampling(#[from] rand::distributions::WeightedError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HmmError>;

impl From<HmmError> for std::io::Error {
    fn from(why: HmmError) -> Self {
        match why {
            HmmError::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}
