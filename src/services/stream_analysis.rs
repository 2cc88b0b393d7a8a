//! Stream analysis orchestration
//!
//! Entry point of the analysis engine: gate the URL scheme, run the header
//! probe then the deep probe, and hand both outcomes to the resolution
//! engine. Every failure inside this path is converted into one of the five
//! taxonomy codes; the caller never sees a raw process or transport error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{AnalysisConfig, HeaderProbeKind};
use crate::errors::{AppResult, ProbeError};
use crate::models::{AnalysisResult, ErrorCode};
use crate::services::classification_registry::ClassificationRegistry;
use crate::services::deep_probe::{DeepDecoder, FfmpegDeepDecoder};
use crate::services::header_probe::{CurlHeaderFetcher, HeaderFetcher, NativeHeaderFetcher};
use crate::services::resolution::ResolutionEngine;
use crate::utils::url::UrlUtils;

/// Orchestrates the dual probe and result reconciliation for one URL at a time
///
/// Each call spawns and owns its probe processes; the only state shared
/// between concurrent calls is the read-only classification registry. The
/// service never retries a probe: callers re-invoke with a fresh call.
pub struct StreamAnalysisService {
    header_fetcher: Arc<dyn HeaderFetcher>,
    deep_decoder: Arc<dyn DeepDecoder>,
    resolution: ResolutionEngine,
}

impl StreamAnalysisService {
    /// Default per-probe wall-clock budget
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(
        header_fetcher: Arc<dyn HeaderFetcher>,
        deep_decoder: Arc<dyn DeepDecoder>,
        registry: Arc<ClassificationRegistry>,
    ) -> Self {
        Self {
            header_fetcher,
            deep_decoder,
            resolution: ResolutionEngine::new(registry),
        }
    }

    /// Build the full pipeline from configuration with the predefined registry
    ///
    /// Probe tools are resolved here, so a missing host tool fails the
    /// construction with a clear diagnostic instead of failing per call.
    pub fn from_config(config: &AnalysisConfig) -> AppResult<Self> {
        let header_fetcher: Arc<dyn HeaderFetcher> = match config.header_probe {
            HeaderProbeKind::Curl => Arc::new(CurlHeaderFetcher::new(Some(
                config.header_command.clone(),
            ))?),
            HeaderProbeKind::Native => Arc::new(NativeHeaderFetcher::new()?),
        };
        let deep_decoder = Arc::new(FfmpegDeepDecoder::new(
            Some(config.deep_command.clone()),
            config.sample_duration,
        )?);
        let registry = Arc::new(ClassificationRegistry::with_predefined_types());

        Ok(Self::new(header_fetcher, deep_decoder, registry))
    }

    /// Analyze a candidate stream URL within the given per-probe budget
    ///
    /// Each probe receives the full budget independently, so worst-case
    /// wall-clock latency is twice the requested timeout. This function is
    /// total: every outcome, including malformed input and probe crashes,
    /// comes back as an [`AnalysisResult`].
    pub async fn analyze(&self, url: &str, timeout: Duration) -> AnalysisResult {
        let display_url = UrlUtils::obfuscate_credentials(url);
        info!("starting analysis for {display_url}");

        let Some(scheme) = UrlUtils::supported_scheme(url) else {
            debug!("rejected {display_url}: unsupported protocol");
            return AnalysisResult::failure(ErrorCode::UnsupportedProtocol, false);
        };
        let is_secure = scheme.is_secure();

        // Header probe first, then the deep probe; order is fixed
        let header = match self.header_fetcher.fetch(url, timeout).await {
            Ok(outcome) => outcome,
            Err(error) => return Self::probe_failure(&error, is_secure),
        };
        debug!(
            "header probe for {display_url}: success={}, content_type={:?}",
            header.success, header.content_type
        );

        let deep = match self.deep_decoder.decode(url, timeout).await {
            Ok(outcome) => outcome,
            Err(error) => return Self::probe_failure(&error, is_secure),
        };
        debug!(
            "deep probe for {display_url}: success={}, format={:?}",
            deep.success, deep.format
        );

        let result = self.resolution.resolve(&header, &deep, is_secure);
        info!(
            "analysis for {display_url}: valid={}, classification={:?}, error={:?}",
            result.is_valid, result.classification_id, result.error_code
        );
        result
    }

    /// Analyze with the default per-probe budget
    pub async fn analyze_with_default_timeout(&self, url: &str) -> AnalysisResult {
        self.analyze(url, Self::DEFAULT_TIMEOUT).await
    }

    /// Map an aborted probe onto the error taxonomy
    ///
    /// A killed probe's partial output is not salvaged.
    fn probe_failure(error: &ProbeError, is_secure: bool) -> AnalysisResult {
        warn!("probe aborted: {error}");
        let code = if error.is_timeout() {
            ErrorCode::Timeout
        } else {
            ErrorCode::NetworkError
        };
        AnalysisResult::failure(code, is_secure)
    }
}
