//! Data model for stream analysis and classification
//!
//! Everything the engine consumes or produces is a fully-typed value defined
//! here: the classification key space, the registry entries seeded from it,
//! the per-probe outcome structs, and the single [`AnalysisResult`] handed
//! back to callers.

use serde::{Deserialize, Serialize};

/// Transport protocol component of a classification key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum StreamProtocol {
    Http,
    Https,
    Hls,
    Playlist,
}

/// In-band metadata announcement convention used by a stream server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum MetadataDialect {
    Icecast,
    Shoutcast,
    None,
}

/// Closed failure taxonomy for analysis results
///
/// Every failure mode inside the engine is converted into one of these five
/// codes; raw process or OS errors never escape to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Timeout,
    UnsupportedProtocol,
    Unreachable,
    InvalidFormat,
    NetworkError,
}

/// Which probe(s) produced the final classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DetectionMethod {
    Header,
    Deep,
    Both,
}

/// Immutable (protocol, format, metadata-dialect) triple identifying a stream type
///
/// `format` is an open set: unknown decoder codecs pass through uppercased
/// verbatim, so it stays a string rather than an enum. The constructor
/// normalizes casing so lookups are exact-match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassificationKey {
    pub protocol: StreamProtocol,
    pub format: String,
    pub dialect: MetadataDialect,
}

impl ClassificationKey {
    pub fn new<S: AsRef<str>>(protocol: StreamProtocol, format: S, dialect: MetadataDialect) -> Self {
        Self {
            protocol,
            format: format.as_ref().to_uppercase(),
            dialect,
        }
    }
}

/// One row of the classification registry
///
/// Entries are seeded administratively and read-only to the analysis core;
/// the engine never fabricates a classification id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub id: i32,
    pub key: ClassificationKey,
    pub display_name: String,
}

/// Outcome of the lightweight header probe
///
/// A transport failure (unreachable host, non-zero tool exit) is not an
/// error: it comes back as `success: false` with the tool's diagnostic text
/// preserved in `raw_output` for operator debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderProbeOutcome {
    pub success: bool,
    pub content_type: Option<String>,
    pub raw_output: String,
}

impl HeaderProbeOutcome {
    pub fn succeeded(content_type: Option<String>, raw_output: String) -> Self {
        Self {
            success: true,
            content_type,
            raw_output,
        }
    }

    pub fn failed(raw_output: String) -> Self {
        Self {
            success: false,
            content_type: None,
            raw_output,
        }
    }
}

/// Outcome of the heavyweight decode probe
///
/// `format` is the canonical uppercase name, `codec` the raw lowercased
/// token from the decoder's stream line. `success` holds iff a format was
/// parsed. `extracted_metadata` is the normalized metadata block pulled from
/// `raw_output`, when one was present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepProbeOutcome {
    pub success: bool,
    pub format: Option<String>,
    pub codec: Option<String>,
    pub raw_output: String,
    pub extracted_metadata: Option<String>,
}

impl DeepProbeOutcome {
    pub fn failed(raw_output: String, extracted_metadata: Option<String>) -> Self {
        Self {
            success: false,
            format: None,
            codec: None,
            raw_output,
            extracted_metadata,
        }
    }
}

/// The engine's sole output type
///
/// Constructed fresh per call and handed to the caller for persistence; the
/// engine holds no state across calls beyond the read-only registry.
///
/// Exactly one of `error_code` and `classification_id` is set when analysis
/// completes normally. The one deliberate exception is a recognized format
/// whose (protocol, format, dialect) triple has no registry entry: the
/// result is invalid with *neither* set, the registry miss itself being the
/// negative signal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub is_valid: bool,
    /// True iff the URL scheme is HTTPS
    pub is_secure: bool,
    pub classification_id: Option<i32>,
    pub classification_display_name: Option<String>,
    pub error_code: Option<ErrorCode>,
    pub detection_method: Option<DetectionMethod>,
    pub raw_header_output: Option<String>,
    pub raw_deep_probe_output: Option<String>,
    /// Normalized metadata snippet, always derived from the deep probe output
    pub extracted_metadata: Option<String>,
}

impl AnalysisResult {
    /// Build a failed result carrying one of the taxonomy codes
    pub fn failure(error_code: ErrorCode, is_secure: bool) -> Self {
        Self {
            is_valid: false,
            is_secure,
            error_code: Some(error_code),
            ..Self::default()
        }
    }
}
