use thiserror::Error;

/// Errors surfaced by patch validation, engine construction and mutation.
///
/// Buffer-length mismatches between already-wired operators are not
/// represented here: those are contract violations guarded by debug
/// assertions, not recoverable conditions.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Sustain level outside the closed interval [0, 1].
    #[error("sustain level {0} is not in the interval [0, 1]")]
    InvalidSustainLevel(f32),

    /// A patch must contain at least one chain.
    #[error("patch declares no chains")]
    EmptyPatch,

    /// A chain must contain at least one operator.
    #[error("chain {chain} declares zero operators")]
    EmptyChain { chain: usize },

    /// A per-operator parameter list disagrees with the declared algorithm.
    #[error("`{field}` has {got} entries for chain {chain}, expected {expected}")]
    StructureMismatch {
        field: &'static str,
        chain: usize,
        got: usize,
        expected: usize,
    },

    /// A per-chain list disagrees with the number of chains.
    #[error("`{field}` has {got} entries, expected one per chain ({expected})")]
    ChainCountMismatch {
        field: &'static str,
        got: usize,
        expected: usize,
    },

    /// Flat parameter list cannot be reshaped to the algorithm.
    #[error("cannot reshape {got} values into an algorithm totalling {expected} operators")]
    ReshapeMismatch { got: usize, expected: usize },

    /// Chain index passed to the engine is out of range.
    #[error("chain index {index} out of range ({count} chains)")]
    ChainIndexOutOfRange { index: usize, count: usize },

    /// Serialized envelope entry is neither empty nor a 5-tuple.
    #[error("envelope entry has {0} values, expected 0 or 5")]
    MalformedEnvelope(usize),

    #[error("patch i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("patch format: {0}")]
    Json(#[from] serde_json::Error),

    #[error("wav export: {0}")]
    Wav(#[from] hound::Error),
}
