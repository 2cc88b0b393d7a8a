//! Header probe
//!
//! Lightweight first stage of the dual probe: fetch the transport-level
//! response headers for a candidate stream URL without decoding any audio,
//! and extract the declared content type plus any metadata-dialect signals.
//!
//! The probe sits behind the [`HeaderFetcher`] trait so the default
//! subprocess implementation (`curl -I`) can be swapped for the in-process
//! HTTP client or a test double without touching the resolution logic.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::errors::{ProbeError, SetupError};
use crate::models::{HeaderProbeOutcome, MetadataDialect};
use crate::utils::url::UrlUtils;

/// Header-only fetch of a candidate stream URL, bounded by a timeout
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HeaderFetcher: Send + Sync {
    /// Fetch response headers for `url`
    ///
    /// Transport failures come back as an unsuccessful outcome carrying the
    /// diagnostic text; only the timeout signal and unexpected spawn/capture
    /// failures are returned as errors.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<HeaderProbeOutcome, ProbeError>;
}

/// Subprocess header fetcher invoking a `curl`-compatible tool
pub struct CurlHeaderFetcher {
    tool: String,
    command: PathBuf,
}

impl CurlHeaderFetcher {
    /// Resolve the header-fetch tool on the PATH, failing fast when missing
    pub fn new(command: Option<String>) -> Result<Self, SetupError> {
        let tool = command.unwrap_or_else(|| "curl".to_string());
        let resolved = which::which(&tool).map_err(|source| SetupError::ToolMissing {
            tool: tool.clone(),
            source,
        })?;
        debug!("header probe using {} at {}", tool, resolved.display());
        Ok(Self {
            tool,
            command: resolved,
        })
    }
}

#[async_trait]
impl HeaderFetcher for CurlHeaderFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<HeaderProbeOutcome, ProbeError> {
        debug!(
            "probing headers for {}",
            UrlUtils::obfuscate_credentials(url)
        );

        let max_time = timeout.as_secs().max(1).to_string();
        let mut cmd = Command::new(&self.command);
        cmd.args(["-I", "-sS", "--max-time", max_time.as_str(), url]);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let output = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| ProbeError::timeout(&self.tool, timeout))?
            .map_err(|e| ProbeError::internal(&self.tool, format!("failed to execute: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            debug!("header probe exited with {}", output.status);
            return Ok(HeaderProbeOutcome::failed(stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let content_type = extract_content_type(&stdout);
        Ok(HeaderProbeOutcome::succeeded(content_type, stdout))
    }
}

/// In-process header fetcher issuing an HTTP `HEAD` request
///
/// Renders the response into the same raw-text shape as the subprocess
/// fetcher so downstream parsing is identical.
pub struct NativeHeaderFetcher {
    client: reqwest::Client,
}

impl NativeHeaderFetcher {
    pub fn new() -> Result<Self, SetupError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("radioprobe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| SetupError::HttpClient { source })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HeaderFetcher for NativeHeaderFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<HeaderProbeOutcome, ProbeError> {
        debug!(
            "probing headers (native) for {}",
            UrlUtils::obfuscate_credentials(url)
        );

        let response = match self.client.head(url).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(ProbeError::timeout("http", timeout)),
            Err(e) => return Ok(HeaderProbeOutcome::failed(e.to_string())),
        };

        let mut raw = format!("{:?} {}\n", response.version(), response.status());
        for (name, value) in response.headers() {
            raw.push_str(name.as_str());
            raw.push_str(": ");
            raw.push_str(&String::from_utf8_lossy(value.as_bytes()));
            raw.push('\n');
        }

        let content_type = extract_content_type(&raw);
        Ok(HeaderProbeOutcome::succeeded(content_type, raw))
    }
}

/// Extract the declared content type from raw header text
///
/// First `content-type:` line wins, matched case-insensitively. Literal
/// `\n` sequences are treated as line breaks since some tools escape them.
pub fn extract_content_type(headers: &str) -> Option<String> {
    let normalized = headers.replace("\\n", "\n");
    for line in normalized.lines() {
        if line.to_lowercase().starts_with("content-type:") {
            return line.split_once(':').map(|(_, value)| value.trim().to_string());
        }
    }
    None
}

/// Sniff the metadata dialect announced in raw header text
///
/// The Shoutcast check takes priority over Icecast; `icy-` prefixed headers
/// count as Icecast.
pub fn sniff_metadata_dialect(raw_headers: &str) -> MetadataDialect {
    if raw_headers.is_empty() {
        return MetadataDialect::None;
    }

    let lower = raw_headers.replace("\\n", "\n").to_lowercase();
    if lower.contains("shoutcast") {
        MetadataDialect::Shoutcast
    } else if lower.contains("icecast") || lower.contains("icy-") {
        MetadataDialect::Icecast
    } else {
        MetadataDialect::None
    }
}
