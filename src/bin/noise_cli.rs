use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use noise_monitor_core::analysis::level::DecibelStats;
use noise_monitor_core::logging::init_logging;
use noise_monitor_core::{AnalysisPipeline, AppConfig, ClassificationResult, NoiseClassifier};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "noise_cli",
    about = "Offline noise level analysis for WAV recordings"
)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a recording chunk by chunk and print JSON lines plus a summary
    Analyze {
        #[arg(long)]
        wav: PathBuf,
        /// JSON configuration file; defaults are used when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Chunk duration in milliseconds (overrides the configuration)
        #[arg(long)]
        chunk_ms: Option<u64>,
    },
    /// Classify a single decibel reading by level alone
    Classify {
        #[arg(long, allow_negative_numbers = true)]
        db: f64,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default configuration as JSON
    Config,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Analyze {
            wav,
            config,
            chunk_ms,
        } => run_analyze(&wav, config.as_deref(), chunk_ms),
        Commands::Classify { db, config } => run_classify(db, config.as_deref()),
        Commands::Config => run_config(),
    }
}

fn run_analyze(wav: &Path, config_path: Option<&Path>, chunk_ms: Option<u64>) -> Result<ExitCode> {
    let mut config = load_config(config_path)?;
    let (samples, sample_rate) = read_wav(wav)?;

    config.audio.sample_rate = sample_rate;
    if let Some(chunk_ms) = chunk_ms {
        config.audio.chunk_ms = chunk_ms;
    }

    let mut pipeline = AnalysisPipeline::new(&config).context("building analysis pipeline")?;
    let report = pipeline
        .analyze_recording(&samples, sample_rate)
        .with_context(|| format!("analyzing {}", wav.display()))?;

    for chunk in &report.chunks {
        println!("{}", serde_json::to_string(chunk)?);
    }

    let summary = SummaryPayload {
        file: wav.display().to_string(),
        sample_rate,
        duration_ms: samples.len() as f64 * 1000.0 / sample_rate as f64,
        chunk_count: report.chunks.len(),
        stats: report.stats,
        overall: &report.overall,
    };
    println!("{}", serde_json::to_string(&SummaryLine { summary })?);

    Ok(ExitCode::from(0))
}

fn run_classify(db: f64, config_path: Option<&Path>) -> Result<ExitCode> {
    let config = load_config(config_path)?;
    let classifier = NoiseClassifier::with_thresholds(config.thresholds()?);
    let result = classifier
        .classify_by_level(db)
        .with_context(|| format!("classifying {db} dB"))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(ExitCode::from(0))
}

fn run_config() -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(&AppConfig::default())?);
    Ok(ExitCode::from(0))
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let contents =
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            AppConfig::from_json_str(&contents)
                .with_context(|| format!("parsing {}", path.display()))
        }
        None => Ok(AppConfig::default()),
    }
}

/// Decode a WAV file to mono f32 samples in [-1, 1]
///
/// Multi-channel files are mixed down by averaging each frame.
fn read_wav(path: &Path) -> Result<(Vec<f32>, u32)> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(anyhow!("{} declares zero channels", path.display()));
    }

    let interleaved = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map_err(|err| anyhow!(err)))
            .collect::<Result<Vec<f32>>>()?,
        hound::SampleFormat::Int => {
            if !(8..=32).contains(&spec.bits_per_sample) {
                return Err(anyhow!(
                    "Unsupported bits per sample {} in {}",
                    spec.bits_per_sample,
                    path.display()
                ));
            }
            let max = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
            reader
                .samples::<i32>()
                .map(|sample| {
                    sample
                        .map(|value| value as f32 / max)
                        .map_err(|err| anyhow!(err))
                })
                .collect::<Result<Vec<f32>>>()?
        }
    };

    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    if samples.is_empty() {
        return Err(anyhow!("{} contains no samples", path.display()));
    }

    Ok((samples, spec.sample_rate))
}

#[derive(Serialize)]
struct SummaryLine<'a> {
    summary: SummaryPayload<'a>,
}

#[derive(Serialize)]
struct SummaryPayload<'a> {
    file: String,
    sample_rate: u32,
    duration_ms: f64,
    chunk_count: usize,
    stats: DecibelStats,
    overall: &'a ClassificationResult,
}
