use thiserror::Error;

/// Reasons a genetic operation cannot produce a genome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenomeError {
    #[error("genome has no genes")]
    Empty,

    #[error("parent lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("genome length {0} is not a multiple of the slot width")]
    OddLength(usize),
}

#[derive(Error, Debug)]
pub enum TierbiasError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No tier from {preferred} onward can hold file {file} ({size} units)")]
    Capacity {
        file: String,
        size: f64,
        preferred: usize,
    },

    #[error("Tier {tier} cannot hold {size} units ({available} free)")]
    TierFull {
        tier: String,
        size: f64,
        available: f64,
    },

    #[error("File {file} has invalid size {size}")]
    InvalidFileSize { file: String, size: f64 },

    #[error("File already stored: {0}")]
    DuplicateFile(String),

    #[error("Unknown tier index: {0}")]
    UnknownTier(usize),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Data loading error: {0}")]
    DataLoading(String),

    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Config source error: {0}")]
    Config(#[from] config::ConfigError),
}

impl TierbiasError {
    /// True for placement failures a caller may choose to score as infeasible.
    pub fn is_capacity(&self) -> bool {
        matches!(self, TierbiasError::Capacity { .. })
    }
}

pub type Result<T> = std::result::Result<T, TierbiasError>;
