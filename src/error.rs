// Error types for the evolution engine
//
// Every recoverable failure in the library surfaces as an `EvolutionError`.
// Contract violations (selecting from an unevaluated population) panic instead,
// the same way `Population::best` does.

use thiserror::Error;

use crate::evolution::LoopState;

#[derive(Error, Debug)]
pub enum EvolutionError {
    /// Candidate and target buffers have different sizes
    #[error("dimension mismatch: target is {expected:?}, candidate is {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("palette is empty, no colors available for random triangles")]
    EmptyPalette,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The image-acquisition collaborator could not provide a target
    #[error("target unavailable ({source_name}): {reason}")]
    TargetUnavailable { source_name: String, reason: String },

    /// A lifecycle operation was called in a state that does not allow it
    #[error("cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: LoopState,
    },

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EvolutionError>;
