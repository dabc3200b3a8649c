#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("duplicate group key `{0}`")]
    DuplicateGroupKey(String),

    #[error("stacked total for category `{label}` is not finite")]
    NonFiniteSum { label: String },

    #[error("empty domain")]
    EmptyDomain,

    #[error("order is not a permutation of the current cards (expected {expected} cards, got {got})")]
    NotAPermutation { expected: usize, got: usize },

    #[error("invalid color `{0}`")]
    InvalidColor(String),

    #[error("invalid chart configuration: {0}")]
    InvalidConfig(String),

    #[error("pdf export failed: {0}")]
    Pdf(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = ChartError> = std::result::Result<T, E>;
