//! Error types for TranscriptChain

use serde::Serialize;
use thiserror::Error;

/// Why a block failed validation.
///
/// The first two causes are detected on a block in isolation; `BrokenLink`
/// needs the predecessor and is only reported by chain validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TamperCause {
    #[error("invalid Merkle root")]
    TamperedMerkleRoot,
    #[error("invalid block hash")]
    TamperedHash,
    #[error("invalid previous block hash")]
    BrokenLink,
}

/// First offending block found while scanning a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("block {index} is invalid: {cause}")]
pub struct ChainValidationError {
    pub index: usize,
    pub cause: TamperCause,
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Invalid course: {0}")]
    InvalidCourse(String),
    #[error("Invalid transcript: {0}")]
    InvalidTranscript(String),
    #[error("No courses staged for the next block")]
    EmptyStagingArea,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
