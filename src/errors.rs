use crate::entities::EntityKind;
use thiserror::Error;

/// Crate-wide error type.
///
/// Nothing here is fatal to the application: the store layer masks fetch
/// errors with seed data and writes degrade to optimistic local success, so
/// callers only ever surface these as transient banners or log lines.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote store error: {0}")]
    Remote(String),

    /// Sentinel reported by the stub remote client. Distinguishes "not
    /// configured at all" from "configured but unreachable" during the
    /// connectivity probe.
    #[error("remote client is a stub (mock mode)")]
    MockMode,

    /// Named but unwired operations, e.g. `update` on the store adapter.
    #[error("operation '{operation}' is not supported for {kind}")]
    Unsupported {
        kind: EntityKind,
        operation: &'static str,
    },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Whether this error is the mock-mode sentinel (see [`Error::MockMode`]).
    #[must_use]
    pub const fn is_mock_mode(&self) -> bool {
        matches!(self, Self::MockMode)
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
