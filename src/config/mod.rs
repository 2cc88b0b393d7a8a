use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

pub mod duration_serde;

/// Analysis engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Probe and timeout configuration for the analysis pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Per-probe wall-clock budget; each probe receives the full budget,
    /// so worst-case latency per analysis is twice this value
    #[serde(default = "default_probe_timeout", with = "duration_serde::duration")]
    pub probe_timeout: Duration,

    /// Header-fetch tool invoked for the header probe
    #[serde(default = "default_header_command")]
    pub header_command: String,

    /// Decode tool invoked for the deep probe
    #[serde(default = "default_deep_command")]
    pub deep_command: String,

    /// Which header probe implementation to use
    #[serde(default)]
    pub header_probe: HeaderProbeKind,

    /// Amount of audio the deep probe decodes before discarding output
    #[serde(default = "default_sample_duration", with = "duration_serde::duration")]
    pub sample_duration: Duration,
}

/// Selectable header probe implementations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderProbeKind {
    /// Subprocess fetch via the configured header tool
    #[default]
    Curl,
    /// In-process HTTP HEAD request
    Native,
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_header_command() -> String {
    "curl".to_string()
}

fn default_deep_command() -> String {
    "ffmpeg".to_string()
}

fn default_sample_duration() -> Duration {
    Duration::from_secs(1)
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            probe_timeout: default_probe_timeout(),
            header_command: default_header_command(),
            deep_command: default_deep_command(),
            header_probe: HeaderProbeKind::default(),
            sample_duration: default_sample_duration(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }
}
