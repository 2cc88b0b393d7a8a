//! Deep probe
//!
//! Heavyweight second stage of the dual probe: decode the first moment of
//! the stream with an external `ffmpeg`-compatible tool and scrape its
//! diagnostic output for the actual audio codec and any embedded metadata
//! block. The decode result is authoritative when the two probes disagree.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tracing::debug;

use crate::errors::{ProbeError, SetupError};
use crate::models::DeepProbeOutcome;
use crate::utils::metadata::extract_metadata_block;
use crate::utils::url::UrlUtils;

/// Decode-based inspection of a candidate stream URL, bounded by a timeout
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeepDecoder: Send + Sync {
    /// Decode the first moment of `url` and parse the diagnostic output
    ///
    /// Decode failures come back as an unsuccessful outcome carrying the
    /// diagnostic text; only the timeout signal and unexpected spawn/capture
    /// failures are returned as errors.
    async fn decode(&self, url: &str, timeout: Duration) -> Result<DeepProbeOutcome, ProbeError>;
}

/// Subprocess deep decoder invoking an `ffmpeg`-compatible tool
///
/// Decodes roughly one second of audio to a null sink and captures the
/// diagnostic stream. The tool's exit status is ignored: a usable stream
/// description can precede a decode error.
pub struct FfmpegDeepDecoder {
    tool: String,
    command: PathBuf,
    sample_duration: Duration,
}

impl FfmpegDeepDecoder {
    /// Resolve the decode tool on the PATH, failing fast when missing
    pub fn new(command: Option<String>, sample_duration: Duration) -> Result<Self, SetupError> {
        let tool = command.unwrap_or_else(|| "ffmpeg".to_string());
        let resolved = which::which(&tool).map_err(|source| SetupError::ToolMissing {
            tool: tool.clone(),
            source,
        })?;
        debug!("deep probe using {} at {}", tool, resolved.display());
        Ok(Self {
            tool,
            command: resolved,
            sample_duration,
        })
    }
}

#[async_trait]
impl DeepDecoder for FfmpegDeepDecoder {
    async fn decode(&self, url: &str, timeout: Duration) -> Result<DeepProbeOutcome, ProbeError> {
        debug!(
            "decoding stream sample for {}",
            UrlUtils::obfuscate_credentials(url)
        );

        let sample_secs = self.sample_duration.as_secs().max(1).to_string();
        let mut cmd = Command::new(&self.command);
        cmd.args(["-i", url, "-t", sample_secs.as_str(), "-f", "null", "-"]);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let output = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| ProbeError::timeout(&self.tool, timeout))?
            .map_err(|e| ProbeError::internal(&self.tool, format!("failed to execute: {e}")))?;

        // The decoder reports stream information on stderr, not stdout
        let diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        Ok(outcome_from_diagnostics(diagnostics))
    }
}

/// Build a probe outcome from captured decoder diagnostics
pub fn outcome_from_diagnostics(raw_output: String) -> DeepProbeOutcome {
    let extracted_metadata = extract_metadata_block(&raw_output);
    match parse_stream_format(&raw_output) {
        Some((format, codec)) => DeepProbeOutcome {
            success: true,
            format: Some(format),
            codec: Some(codec),
            raw_output,
            extracted_metadata,
        },
        None => DeepProbeOutcome::failed(raw_output, extracted_metadata),
    }
}

/// Parse the audio stream description line for (canonical format, raw codec)
///
/// The first line of the shape `Stream #<n>:<n>: Audio: <codec> ...`
/// determines the codec.
pub fn parse_stream_format(output: &str) -> Option<(String, String)> {
    static AUDIO_STREAM: OnceLock<Regex> = OnceLock::new();
    let pattern = AUDIO_STREAM.get_or_init(|| {
        Regex::new(r"Stream #\d+:\d+: Audio: (\w+)").expect("audio stream pattern is valid")
    });

    let codec = pattern.captures(output)?.get(1)?.as_str().to_lowercase();
    Some((canonical_format(&codec), codec))
}

/// Map a decoder codec token to the catalog's canonical format name
///
/// Unknown codecs pass through uppercased verbatim.
fn canonical_format(codec: &str) -> String {
    match codec {
        "mp3" => "MP3".to_string(),
        "aac" => "AAC".to_string(),
        "ogg" | "vorbis" => "OGG".to_string(),
        other => other.to_uppercase(),
    }
}
