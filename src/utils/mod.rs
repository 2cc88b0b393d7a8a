//! Utility modules for the stream analysis engine
//!
//! This module contains reusable utilities that can be used
//! across different parts of the system.

pub mod metadata;
pub mod url;

// Re-export commonly used helpers for convenience
pub use metadata::extract_metadata_block;
pub use url::UrlUtils;
