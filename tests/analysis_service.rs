//! End-to-end tests of the analysis pipeline over stubbed probes
//!
//! These tests exercise the full orchestration path (protocol gate, dual
//! probe, resolution, registry lookup) with the probe traits replaced by
//! deterministic stubs, so no network access or external tool is required.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use radioprobe::errors::ProbeError;
use radioprobe::models::{
    AnalysisResult, DeepProbeOutcome, DetectionMethod, ErrorCode, HeaderProbeOutcome,
};
use radioprobe::services::deep_probe::{DeepDecoder, outcome_from_diagnostics};
use radioprobe::services::header_probe::HeaderFetcher;
use radioprobe::services::{ClassificationRegistry, StreamAnalysisService};
use radioprobe::utils::extract_metadata_block;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Scripted reply for a stubbed probe
enum StubReply<T> {
    Outcome(T),
    Timeout,
    Internal,
}

struct StubHeaderFetcher(StubReply<HeaderProbeOutcome>);

#[async_trait]
impl HeaderFetcher for StubHeaderFetcher {
    async fn fetch(&self, _url: &str, timeout: Duration) -> Result<HeaderProbeOutcome, ProbeError> {
        match &self.0 {
            StubReply::Outcome(outcome) => Ok(outcome.clone()),
            StubReply::Timeout => Err(ProbeError::timeout("curl", timeout)),
            StubReply::Internal => Err(ProbeError::internal("curl", "spawn failed")),
        }
    }
}

struct StubDeepDecoder(StubReply<DeepProbeOutcome>);

#[async_trait]
impl DeepDecoder for StubDeepDecoder {
    async fn decode(&self, _url: &str, timeout: Duration) -> Result<DeepProbeOutcome, ProbeError> {
        match &self.0 {
            StubReply::Outcome(outcome) => Ok(outcome.clone()),
            StubReply::Timeout => Err(ProbeError::timeout("ffmpeg", timeout)),
            StubReply::Internal => Err(ProbeError::internal("ffmpeg", "spawn failed")),
        }
    }
}

fn service(
    header: StubReply<HeaderProbeOutcome>,
    deep: StubReply<DeepProbeOutcome>,
) -> StreamAnalysisService {
    StreamAnalysisService::new(
        Arc::new(StubHeaderFetcher(header)),
        Arc::new(StubDeepDecoder(deep)),
        Arc::new(ClassificationRegistry::with_predefined_types()),
    )
}

fn header_ok(content_type: &str, raw: &str) -> StubReply<HeaderProbeOutcome> {
    StubReply::Outcome(HeaderProbeOutcome::succeeded(
        Some(content_type.to_string()),
        raw.to_string(),
    ))
}

fn header_failed(raw: &str) -> StubReply<HeaderProbeOutcome> {
    StubReply::Outcome(HeaderProbeOutcome::failed(raw.to_string()))
}

fn deep_from(diagnostics: &str) -> StubReply<DeepProbeOutcome> {
    StubReply::Outcome(outcome_from_diagnostics(diagnostics.to_string()))
}

fn assert_mutually_exclusive(result: &AnalysisResult) {
    assert_ne!(
        result.error_code.is_some(),
        result.classification_id.is_some(),
        "exactly one of error_code and classification_id must be set: {result:?}"
    );
}

#[tokio::test]
async fn rtmp_url_is_rejected_before_probing() {
    let service = service(StubReply::Internal, StubReply::Internal);

    let result = service.analyze("rtmp://x/live", TIMEOUT).await;

    // The gate short-circuits, so the poisoned stubs are never reached
    assert!(!result.is_valid);
    assert!(!result.is_secure);
    assert_eq!(result.error_code, Some(ErrorCode::UnsupportedProtocol));
}

#[tokio::test]
async fn header_only_classification_when_deep_probe_fails() {
    let service = service(
        header_ok("audio/mpeg", "HTTP/1.1 200 OK\nContent-Type: audio/mpeg\n"),
        StubReply::Outcome(DeepProbeOutcome::failed(
            "Connection refused\n".to_string(),
            None,
        )),
    );

    let result = service.analyze("http://radio.example.com/live", TIMEOUT).await;

    assert!(result.is_valid);
    assert_eq!(result.detection_method, Some(DetectionMethod::Header));
    assert_eq!(
        result.classification_display_name.as_deref(),
        Some("HTTP MP3 direct stream")
    );
    assert_mutually_exclusive(&result);
}

#[tokio::test]
async fn deep_probe_wins_when_probes_disagree() {
    let service = service(
        header_ok("audio/mpeg", "HTTP/1.1 200 OK\nContent-Type: audio/mpeg\n"),
        deep_from("Stream #0:0: Audio: aac, 44100 Hz, stereo, fltp, 96 kb/s\n"),
    );

    let result = service.analyze("http://radio.example.com/live", TIMEOUT).await;

    assert!(result.is_valid);
    assert_eq!(result.detection_method, Some(DetectionMethod::Both));
    assert_eq!(
        result.classification_display_name.as_deref(),
        Some("HTTP AAC direct stream")
    );
    assert_mutually_exclusive(&result);
}

#[tokio::test]
async fn timeout_on_either_probe_terminates_analysis() {
    let service = service(StubReply::Timeout, StubReply::Timeout);
    let result = service.analyze("http://radio.example.com/live", TIMEOUT).await;
    assert!(!result.is_valid);
    assert_eq!(result.error_code, Some(ErrorCode::Timeout));

    let service = service_with_deep_timeout();
    let result = service.analyze("https://radio.example.com/live", TIMEOUT).await;
    assert!(!result.is_valid);
    assert!(result.is_secure);
    assert_eq!(result.error_code, Some(ErrorCode::Timeout));
}

fn service_with_deep_timeout() -> StreamAnalysisService {
    service(
        header_ok("audio/mpeg", "Content-Type: audio/mpeg\n"),
        StubReply::Timeout,
    )
}

#[tokio::test]
async fn both_probes_failing_is_unreachable() {
    let service = service(
        header_failed("curl: (6) Could not resolve host\n"),
        StubReply::Outcome(DeepProbeOutcome::failed(
            "Name or service not known\n".to_string(),
            None,
        )),
    );

    let result = service.analyze("http://nosuch.example.invalid/live", TIMEOUT).await;

    assert!(!result.is_valid);
    assert_eq!(result.error_code, Some(ErrorCode::Unreachable));
    // Raw diagnostics are preserved for operator debugging
    assert!(result.raw_header_output.as_deref().unwrap().contains("resolve host"));
    assert!(result.raw_deep_probe_output.as_deref().unwrap().contains("not known"));
    assert_mutually_exclusive(&result);
}

#[tokio::test]
async fn probe_crash_maps_to_network_error() {
    let service = service(StubReply::Internal, StubReply::Internal);
    let result = service.analyze("http://radio.example.com/live", TIMEOUT).await;
    assert_eq!(result.error_code, Some(ErrorCode::NetworkError));
}

#[tokio::test]
async fn https_with_icecast_metadata_classifies_fully() {
    let diagnostics = "\
Input #0, mp3, from 'https://radio.example.com/live':
  Metadata:
    icy-name        : Example Radio
    icy-genre       : Jazz
  Duration: N/A, start: 0.000000, bitrate: 128 kb/s
  Stream #0:0: Audio: mp3 (mp3float), 44100 Hz, stereo, fltp, 128 kb/s
";
    let service = service(
        header_ok(
            "audio/mpeg",
            "HTTP/1.1 200 OK\nServer: Icecast 2.4.4\nContent-Type: audio/mpeg\nicy-br: 128\n",
        ),
        deep_from(diagnostics),
    );

    let result = service.analyze("https://radio.example.com/live", TIMEOUT).await;

    assert!(result.is_valid);
    assert!(result.is_secure);
    assert_eq!(
        result.classification_display_name.as_deref(),
        Some("HTTPS MP3 with Icecast metadata")
    );
    assert_eq!(result.detection_method, Some(DetectionMethod::Both));
    assert_eq!(
        result.extracted_metadata.as_deref(),
        Some("icy-name: Example Radio\nicy-genre: Jazz")
    );
}

#[tokio::test]
async fn shoutcast_signal_outranks_icecast_headers() {
    let service = service(
        header_ok(
            "audio/aac",
            "HTTP/1.1 200 OK\nServer: SHOUTcast v2\nicy-name: Example\nContent-Type: audio/aac\n",
        ),
        deep_from("Stream #0:0: Audio: aac (LC), 44100 Hz, stereo\n"),
    );

    let result = service.analyze("http://radio.example.com/live", TIMEOUT).await;

    assert_eq!(
        result.classification_display_name.as_deref(),
        Some("HTTP AAC with Shoutcast metadata")
    );
}

#[tokio::test]
async fn hls_override_from_decoder_output() {
    let diagnostics = "\
Input #0, hls, from 'https://cdn.example.com/live/master.m3u8':
  Stream #0:0: Audio: aac (LC), 48000 Hz, stereo, fltp
";
    let service = service(header_failed(""), deep_from(diagnostics));

    let result = service.analyze("https://cdn.example.com/live/master.m3u8", TIMEOUT).await;

    assert!(result.is_valid);
    assert_eq!(
        result.classification_display_name.as_deref(),
        Some("HTTP Live Streaming (HLS) with AAC")
    );
    assert_eq!(result.detection_method, Some(DetectionMethod::Deep));
}

#[tokio::test]
async fn recognized_format_without_registry_entry_is_invalid_without_code() {
    let service = service(
        header_ok("audio/flac", "Content-Type: audio/flac\n"),
        deep_from("Stream #0:0: Audio: flac, 96000 Hz, stereo\n"),
    );

    let result = service.analyze("http://radio.example.com/lossless", TIMEOUT).await;

    assert!(!result.is_valid);
    assert!(result.error_code.is_none());
    assert!(result.classification_id.is_none());
}

#[tokio::test]
async fn extracted_metadata_respects_bound_and_charset() {
    let noisy_value = "Rock & Roll \u{0007}\u{0001}".repeat(600);
    let diagnostics = format!(
        "Metadata:\n    icy-genre : {noisy_value}\n\nStream #0:0: Audio: mp3, 44100 Hz\n"
    );
    let service = service(header_failed(""), deep_from(&diagnostics));

    let result = service.analyze("http://radio.example.com/live", TIMEOUT).await;

    let metadata = result.extracted_metadata.expect("metadata block expected");
    assert!(metadata.chars().count() <= 4096);
    assert!(metadata.chars().all(|c| c >= ' ' || c == '\n' || c == '\t'));
}

#[test]
fn metadata_extraction_matches_reference_shape() {
    let extracted = extract_metadata_block(
        "...\nMetadata:\n    icy-genre       : Rock\n    StreamTitle     : Fallback Tune\n\n",
    );
    assert_eq!(
        extracted.as_deref(),
        Some("icy-genre: Rock\nStreamTitle: Fallback Tune")
    );
}
