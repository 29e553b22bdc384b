//! Error types for champ_archive

use crate::model::{ContainerId, ContainerKind};
use thiserror::Error;

/// Result type alias for champ_archive operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while saving, transferring or loading archives
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Container not found: {0}")]
    NotFound(ContainerId),

    #[error("Dangling reference: {parent} refers to missing node {missing}")]
    DanglingReference {
        parent: ContainerId,
        missing: ContainerId,
    },

    #[error("Corruption detected: {0}")]
    Corruption(String),

    #[error("Container kind mismatch for {id}: expected {expected}, found {found}")]
    KindMismatch {
        id: ContainerId,
        expected: ContainerKind,
        found: ContainerKind,
    },

    #[error("Invalid archive file: {0}")]
    InvalidFile(String),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}
