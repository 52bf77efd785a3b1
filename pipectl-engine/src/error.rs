//! Error types for the reconciliation engine.

use thiserror::Error;

/// The reconciliation phase a failed remote call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Resolving whether the pipeline exists (listing).
    Resolve,
    /// Writing the pipeline (create or replace).
    Write,
    /// Reading the pipeline back.
    Read,
    /// Deleting the pipeline.
    Delete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Resolve => "resolve",
            Phase::Write => "write",
            Phase::Read => "read",
            Phase::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Errors raised by a gateway talking to the remote management API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never got a remote verdict (connection, timeout, DNS).
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote system processed the request and rejected it.
    #[error("remote error (status {status}): {message}")]
    Remote { status: u16, message: String },

    /// The remote response body was not in the expected shape.
    #[error("decode: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Whether this is the remote system reporting that the resource
    /// does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::Remote { status: 404, .. })
    }
}

/// Errors returned by the caller-facing engine entry points.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad caller input; never reaches the network.
    #[error("invalid pipeline spec: {0}")]
    Validation(String),

    /// A remote call failed during the named phase.
    #[error("{phase} failed: {source}")]
    Gateway {
        phase: Phase,
        #[source]
        source: GatewayError,
    },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
