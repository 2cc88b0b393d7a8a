use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use radioprobe::{
    config::Config, models::AnalysisResult, services::StreamAnalysisService,
};

#[derive(Parser)]
#[command(name = "radioprobe")]
#[command(about = "Analyze and classify internet radio stream URLs")]
#[command(long_about = None)]
struct Cli {
    /// Stream URLs to analyze
    #[arg(required = true)]
    urls: Vec<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Per-probe timeout override (e.g. "30s", "2m")
    #[arg(short, long, value_name = "DURATION")]
    timeout: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("radioprobe={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting radioprobe v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load_from_file(&cli.config)?;
    let timeout = match &cli.timeout {
        Some(value) => humantime::parse_duration(value)?,
        None => config.analysis.probe_timeout,
    };

    // Probe tools are resolved here, before any URL is touched
    let service = StreamAnalysisService::from_config(&config.analysis)?;

    let mut all_valid = true;
    for url in &cli.urls {
        let result = service.analyze(url, timeout).await;
        all_valid &= result.is_valid;
        match cli.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            OutputFormat::Text => print_text(url, &result),
        }
    }

    if !all_valid {
        std::process::exit(1);
    }
    Ok(())
}

fn print_text(url: &str, result: &AnalysisResult) {
    if result.is_valid {
        let display_name = result
            .classification_display_name
            .as_deref()
            .unwrap_or("unknown");
        let method = result
            .detection_method
            .map(|m| m.to_string())
            .unwrap_or_default();
        println!("{url}: VALID - {display_name} (detected via {method})");
    } else if let Some(code) = result.error_code {
        println!("{url}: INVALID - {code}");
    } else {
        println!("{url}: INVALID - stream recognized but no matching classification");
    }

    if let Some(metadata) = &result.extracted_metadata {
        for line in metadata.lines() {
            println!("    {line}");
        }
    }
}
