//! Centralized error handling for the stream analysis engine
//!
//! Failures inside the analysis path are converted into the closed
//! [`crate::models::ErrorCode`] taxonomy and never escape to the caller as
//! raw process or OS errors. The types here cover everything outside that
//! path: construction-time setup problems, probe transport signals, and
//! configuration loading.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
