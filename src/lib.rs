//! Stream analysis and classification engine for internet radio catalogs.
//!
//! Given a candidate stream URL, the engine determines whether it is a
//! genuinely playable audio stream, classifies it into one of a fixed set of
//! (protocol, format, metadata-dialect) combinations, and records the raw
//! diagnostic output of both probes so the decision can be explained later.
//!
//! The analysis runs two independent probes against the URL: a lightweight
//! header fetch and a heavyweight decode of the first moment of audio. When
//! the two disagree, the decode result is authoritative. Callers own
//! persistence and presentation; this crate only hands back an
//! [`models::AnalysisResult`].

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;
