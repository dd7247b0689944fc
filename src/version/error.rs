use std::time::Duration;

use thiserror::Error;

use crate::toolchain::ToolchainError;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Module not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Failures surfaced by [`Resolver`](crate::version::resolver::Resolver).
///
/// Per-version probe failures never appear here; they are recorded as incompatible.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Cannot determine local Go version: {0}")]
    ToolchainVersionUnresolvable(#[source] ToolchainError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("No versions available for {0}")]
    NoVersionsAvailable(String),

    #[error("No version of {module} is compatible with Go {toolchain}")]
    NoCompatibleVersion { module: String, toolchain: String },

    #[error("Resolution timed out after {0:?}")]
    Timeout(Duration),

    #[error("Resolution cancelled")]
    Cancelled,
}
