use thiserror::Error;

/// Which half of a record a schema check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// The numeric value array.
    Numeric,
    /// The categorical value array.
    Categorical,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Numeric => write!(f, "numeric"),
            ValueKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Errors returned by feature, distance, clustering and hierarchy primitives.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Input was empty where at least one item is required.
    #[error("empty input provided")]
    EmptyInput,

    /// A record's value array does not match the schema.
    #[error("schema mismatch: expected {expected} {kind} values, found {found}")]
    SchemaMismatch {
        /// Which value array is wrong.
        kind: ValueKind,
        /// Count required by the schema.
        expected: usize,
        /// Count found on the record.
        found: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// Neither a numeric nor a categorical sub-metric was configured.
    #[error("no distance sub-metric configured")]
    NoDistanceMetric,

    /// An internal invariant broke during a merge pass.
    #[error("merge pass failed: {0}")]
    MergeFailed(String),

    /// The finished hierarchy did not pass its health check.
    #[error("invalid cluster tree: {0}")]
    InvalidTree(String),

    /// The clusterer was queried before it was built.
    #[error("clusterer has not been built")]
    NotBuilt,
}

/// Result alias for `grove`.
pub type Result<T> = std::result::Result<T, Error>;
