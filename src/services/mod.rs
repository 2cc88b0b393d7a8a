//! Service layer for the stream analysis engine
//!
//! This module contains the analysis pipeline proper: the two probes behind
//! their narrow traits, the classification registry, the resolution engine,
//! and the orchestrating analysis service.
//!
//! # Architecture
//!
//! - **Dependency injection**: the orchestrator depends on the
//!   [`header_probe::HeaderFetcher`] and [`deep_probe::DeepDecoder`] traits,
//!   never on the concrete subprocess implementations, so probes can be
//!   swapped or mocked without touching resolution logic.
//! - **Fail fast**: concrete probes resolve their external tool at
//!   construction time; a missing host tool never fails per-call.
//! - **Closed error taxonomy**: the orchestrator converts every internal
//!   failure into an error code on the result, and raw probe output is
//!   preserved on every path for operator debugging.

pub mod classification_registry;
pub mod deep_probe;
pub mod header_probe;
pub mod resolution;
pub mod stream_analysis;

// Re-export main traits and services
pub use classification_registry::ClassificationRegistry;
pub use deep_probe::{DeepDecoder, FfmpegDeepDecoder};
pub use header_probe::{CurlHeaderFetcher, HeaderFetcher, NativeHeaderFetcher};
pub use resolution::ResolutionEngine;
pub use stream_analysis::StreamAnalysisService;
