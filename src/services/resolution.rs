//! Result reconciliation
//!
//! Combines the outcomes of the header probe and the deep probe into the
//! final [`AnalysisResult`] under the authority rule: whenever the deep
//! probe parsed a format, its view of the stream wins; header output is the
//! fallback classification input and the metadata-dialect signal.

use std::sync::Arc;

use crate::models::{
    AnalysisResult, DeepProbeOutcome, DetectionMethod, ErrorCode, HeaderProbeOutcome,
    MetadataDialect, StreamProtocol,
};
use crate::services::classification_registry::ClassificationRegistry;
use crate::services::header_probe::sniff_metadata_dialect;

/// Reconciles probe outcomes against the classification registry
pub struct ResolutionEngine {
    registry: Arc<ClassificationRegistry>,
}

impl ResolutionEngine {
    pub fn new(registry: Arc<ClassificationRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve both probe outcomes into the final analysis result
    ///
    /// Decision order:
    /// 1. both probes failed: unreachable
    /// 2. deep failed, header succeeded: classify from the content type alone
    /// 3. deep succeeded without a parseable format: invalid format
    /// 4. deep succeeded with a format: authoritative classification
    pub fn resolve(
        &self,
        header: &HeaderProbeOutcome,
        deep: &DeepProbeOutcome,
        is_secure: bool,
    ) -> AnalysisResult {
        if !deep.success {
            if header.success {
                return self.classify_from_header(header, deep, is_secure);
            }
            return AnalysisResult {
                is_valid: false,
                is_secure,
                error_code: Some(ErrorCode::Unreachable),
                raw_header_output: Some(header.raw_output.clone()),
                raw_deep_probe_output: Some(deep.raw_output.clone()),
                extracted_metadata: deep.extracted_metadata.clone(),
                ..AnalysisResult::default()
            };
        }

        let Some(format) = deep.format.as_deref() else {
            return AnalysisResult {
                is_valid: false,
                is_secure,
                error_code: Some(ErrorCode::InvalidFormat),
                raw_header_output: Some(header.raw_output.clone()),
                raw_deep_probe_output: Some(deep.raw_output.clone()),
                extracted_metadata: deep.extracted_metadata.clone(),
                ..AnalysisResult::default()
            };
        };

        // The decoder following playlist segments is the HLS signal
        let protocol = if deep.raw_output.to_lowercase().contains(".m3u8") {
            StreamProtocol::Hls
        } else if is_secure {
            StreamProtocol::Https
        } else {
            StreamProtocol::Http
        };

        let dialect = sniff_metadata_dialect(&header.raw_output);
        let classification_id = self.registry.find_id(protocol, format, dialect);
        let detection_method = if header.success {
            DetectionMethod::Both
        } else {
            DetectionMethod::Deep
        };

        self.classified(
            classification_id,
            detection_method,
            is_secure,
            header,
            deep,
        )
    }

    /// Classify from header content type alone; used when the deep probe is unavailable
    fn classify_from_header(
        &self,
        header: &HeaderProbeOutcome,
        deep: &DeepProbeOutcome,
        is_secure: bool,
    ) -> AnalysisResult {
        let Some(content_type) = header.content_type.as_deref() else {
            return self.header_invalid_format(header, deep, is_secure);
        };

        let lower = content_type.to_lowercase();

        let format = if lower.contains("audio/mpeg") || lower.contains("audio/mp3") {
            Some("MP3")
        } else if lower.contains("audio/aac") {
            Some("AAC")
        } else if lower.contains("audio/ogg") {
            Some("OGG")
        } else if lower.contains("application/vnd.apple.mpegurl") {
            // HLS playlist; AAC is the common case
            let classification_id =
                self.registry
                    .find_id(StreamProtocol::Hls, "AAC", MetadataDialect::None);
            return self.classified(
                classification_id,
                DetectionMethod::Header,
                is_secure,
                header,
                deep,
            );
        } else {
            None
        };

        let Some(format) = format else {
            return self.header_invalid_format(header, deep, is_secure);
        };

        let protocol = if is_secure {
            StreamProtocol::Https
        } else {
            StreamProtocol::Http
        };
        let dialect = sniff_metadata_dialect(&header.raw_output);
        let classification_id = self.registry.find_id(protocol, format, dialect);

        self.classified(
            classification_id,
            DetectionMethod::Header,
            is_secure,
            header,
            deep,
        )
    }

    fn header_invalid_format(
        &self,
        header: &HeaderProbeOutcome,
        deep: &DeepProbeOutcome,
        is_secure: bool,
    ) -> AnalysisResult {
        AnalysisResult {
            is_valid: false,
            is_secure,
            error_code: Some(ErrorCode::InvalidFormat),
            raw_header_output: Some(header.raw_output.clone()),
            raw_deep_probe_output: Some(deep.raw_output.clone()),
            extracted_metadata: deep.extracted_metadata.clone(),
            ..AnalysisResult::default()
        }
    }

    /// Assemble a classified result; a registry miss yields an invalid
    /// result with no error code, the miss itself being the negative signal
    fn classified(
        &self,
        classification_id: Option<i32>,
        detection_method: DetectionMethod,
        is_secure: bool,
        header: &HeaderProbeOutcome,
        deep: &DeepProbeOutcome,
    ) -> AnalysisResult {
        let classification_display_name = classification_id
            .and_then(|id| self.registry.display_name(id))
            .map(str::to_string);

        AnalysisResult {
            is_valid: classification_id.is_some(),
            is_secure,
            classification_id,
            classification_display_name,
            error_code: None,
            detection_method: Some(detection_method),
            raw_header_output: Some(header.raw_output.clone()),
            raw_deep_probe_output: Some(deep.raw_output.clone()),
            extracted_metadata: deep.extracted_metadata.clone(),
        }
    }
}
