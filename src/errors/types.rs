//! Error type definitions for the stream analysis engine
//!
//! This module defines all error types used throughout the crate, providing
//! a hierarchical error system that makes debugging and error handling more
//! straightforward.

use std::time::Duration;

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all possible errors that can occur in the
/// application. It uses `thiserror` to provide automatic error trait
/// implementations and proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Construction-time setup failures
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    /// Probe transport failures
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while constructing the analysis service and its probes
///
/// Prerequisites are checked once at construction time so that a missing
/// host tool surfaces as a clear diagnostic instead of failing every call.
#[derive(Error, Debug)]
pub enum SetupError {
    /// A required external tool could not be resolved on the PATH
    #[error("required tool '{tool}' not found on PATH: {source}")]
    ToolMissing {
        tool: String,
        #[source]
        source: which::Error,
    },

    /// The native HTTP client could not be built
    #[error("failed to build HTTP client: {source}")]
    HttpClient {
        #[source]
        source: reqwest::Error,
    },
}

/// Probe transport signals that must abort the analysis
///
/// Ordinary probe failures (unreachable host, non-zero tool exit) are *not*
/// errors: they come back as unsuccessful probe outcomes carrying the tool's
/// diagnostic text. This type covers the two signals the orchestrator maps
/// onto the error taxonomy itself: the per-probe timeout and anything
/// unexpected during spawn or capture.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The probe exceeded its wall-clock budget
    #[error("{tool} probe timed out after {limit:?}")]
    Timeout { tool: String, limit: Duration },

    /// Unexpected failure spawning the tool or capturing its output
    #[error("{tool} probe failed unexpectedly: {message}")]
    Internal { tool: String, message: String },
}

impl ProbeError {
    /// Create a timeout signal for the given tool
    pub fn timeout<S: Into<String>>(tool: S, limit: Duration) -> Self {
        Self::Timeout {
            tool: tool.into(),
            limit,
        }
    }

    /// Create an internal probe error
    pub fn internal<S: Into<String>, M: Into<String>>(tool: S, message: M) -> Self {
        Self::Internal {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// True when this signal is the distinguishable per-probe timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl AppError {
    /// Create a configuration error with a custom message
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
