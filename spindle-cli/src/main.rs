//! spindle-scan: alpha spindle analysis of delimited or `.xlsx` EEG exports.
//!
//! Usage:
//!   spindle-scan total recording.csv
//!   spindle-scan total baselines.xlsx --sheet EOBL
//!   spindle-scan channels recording.csv --format json
//!   spindle-scan wavelet recording.csv --channel Fz
//!   spindle-scan epochs recording.csv --channel Cz --epoch-secs 5
//!
//! Analysis settings fall back to SPINDLE_* environment variables (a `.env`
//! file in the working directory is honoured), then to built-in defaults.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use spindle_core::{
    is_workbook_name, load_recording, run_task, AnalysisConfig, EpochAnalysis, FrequencyBand, Recording, Scaleogram,
    SpindleParams, TableSource, Task, TaskReport,
};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "spindle-scan")]
#[command(version, about = "Count and visualise EEG alpha spindles", long_about = None)]
struct Cli {
    /// Enable verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    /// Worksheet to read from an .xlsx input (default: the first sheet)
    #[arg(long, global = true)]
    sheet: Option<String>,

    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Args, Debug)]
struct Settings {
    /// Sampling rate of the table in Hz
    #[arg(long, env = "SPINDLE_SFREQ", default_value_t = 512.0, global = true)]
    sfreq: f64,

    /// Detection threshold as a multiple of the envelope's standard deviation
    #[arg(long, env = "SPINDLE_THRESHOLD", default_value_t = 2.5, global = true)]
    threshold: f64,

    /// Shortest run kept as a spindle, in seconds
    #[arg(long, env = "SPINDLE_MIN_DURATION", default_value_t = 0.5, global = true)]
    min_duration: f64,

    /// Lower edge of the wavelet band in Hz
    #[arg(long, env = "SPINDLE_FMIN", default_value_t = 8.0, global = true)]
    fmin: f64,

    /// Upper edge of the wavelet band in Hz
    #[arg(long, env = "SPINDLE_FMAX", default_value_t = 13.0, global = true)]
    fmax: f64,

    /// Epoch length in seconds
    #[arg(long, env = "SPINDLE_EPOCH_SECS", default_value_t = 10.0, global = true)]
    epoch_secs: f64,
}

impl Settings {
    fn to_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            sample_rate: self.sfreq,
            spindle: SpindleParams {
                threshold_factor: self.threshold,
                min_duration_secs: self.min_duration,
            },
            band: FrequencyBand {
                low_hz: self.fmin,
                high_hz: self.fmax,
            },
            epoch_secs: self.epoch_secs,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Total spindle count over every channel
    Total {
        /// Delimited text (csv, tsv, or semicolon) or an .xlsx workbook
        input: PathBuf,
    },

    /// Spindle count per channel
    Channels {
        input: PathBuf,
    },

    /// Band-limited wavelet power of one channel
    Wavelet {
        input: PathBuf,

        #[arg(short, long)]
        channel: String,
    },

    /// Spindles and wavelet power per epoch of one channel
    Epochs {
        input: PathBuf,

        #[arg(short, long)]
        channel: String,
    },

    /// Shape and first rows of the table
    Summary {
        input: PathBuf,

        /// Rows to preview
        #[arg(long, default_value = "5")]
        rows: usize,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = cli.settings.to_config();
    config.validate().context("invalid analysis settings")?;

    let (task, input, channel) = match &cli.command {
        Commands::Summary { input, rows } => {
            return cmd_summary(input, cli.sheet.as_deref(), &config, *rows, cli.format)
        }
        Commands::Total { input } => (Task::TotalCount, input, None),
        Commands::Channels { input } => (Task::ChannelCounts, input, None),
        Commands::Wavelet { input, channel } => (Task::Wavelet, input, Some(channel.as_str())),
        Commands::Epochs { input, channel } => (Task::Epochs, input, Some(channel.as_str())),
    };

    let recording = load(input, cli.sheet.as_deref(), &config)?;
    let report = run_task(&recording, &config, task, channel)
        .with_context(|| format!("{} failed on {}", task.label(), input.display()))?;

    match cli.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Text => print_report(&report),
    }
    Ok(())
}

fn load(path: &Path, sheet: Option<&str>, config: &AnalysisConfig) -> Result<Recording> {
    let is_workbook = path.to_str().is_some_and(is_workbook_name);
    if sheet.is_some() && !is_workbook {
        bail!("--sheet only applies to .xlsx input, not {}", path.display());
    }

    let parsed = if is_workbook {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        load_recording(TableSource::Workbook { bytes: &bytes, sheet }, config.sample_rate)
    } else {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        load_recording(TableSource::Delimited(&text), config.sample_rate)
    };
    let recording = parsed.with_context(|| format!("parsing {}", path.display()))?;
    info!(
        "loaded {}: {} channels, {:.1} s",
        path.display(),
        recording.channels().len(),
        recording.duration_secs()
    );
    Ok(recording)
}

fn cmd_summary(path: &Path, sheet: Option<&str>, config: &AnalysisConfig, rows: usize, format: Format) -> Result<()> {
    let recording = load(path, sheet, config)?;
    let summary = recording.summary();
    let head = recording.head(rows);

    if format == Format::Json {
        let out = serde_json::json!({
            "file": path.display().to_string(),
            "summary": summary,
            "head": head,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("File: {}", path.display());
    println!(
        "Shape: {} channels x {} samples",
        summary.channel_count, summary.samples_per_channel
    );
    println!("Duration: {:.2} s at {} Hz", summary.duration_secs, summary.sample_rate);
    println!();
    println!("{}", summary.channel_names.join("\t"));
    for row in &head {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:.4}")).collect();
        println!("{}", cells.join("\t"));
    }
    Ok(())
}

fn print_report(report: &TaskReport) {
    match report {
        TaskReport::TotalCount { total } => println!("Total Alpha Spindles: {total}"),
        TaskReport::ChannelCounts { channels } => {
            println!("Spindle Count Per Electrode");
            for ch in channels {
                println!("{}: {} spindles", ch.channel, ch.count);
            }
        }
        TaskReport::Wavelet { channel, scaleogram } => {
            println!("Wavelet Power (Alpha Band) - {channel}");
            print_scaleogram(scaleogram);
        }
        TaskReport::Epochs {
            channel,
            sample_rate,
            epochs,
        } => {
            println!("Epochs of {channel}: {}", epochs.len());
            for epoch in epochs {
                print_epoch(epoch, *sample_rate);
            }
        }
    }
}

fn print_scaleogram(s: &Scaleogram) {
    if s.rows() == 0 {
        println!("  no wavelet scale falls inside the band at {} Hz", s.sample_rate);
        return;
    }
    println!("  {:>8}  {:>5}  {:>12}", "freq Hz", "scale", "mean |W|");
    for ((freq, scale), mean) in s.frequencies.iter().zip(&s.scales).zip(s.mean_magnitudes()) {
        println!("  {freq:>8.2}  {scale:>5}  {mean:>12.4}");
    }
    if let Some(peak) = s.peak_frequency() {
        println!("  peak: {peak:.2} Hz over {:.2} s", s.duration_secs());
    }
}

fn print_epoch(epoch: &EpochAnalysis, sample_rate: f64) {
    println!(
        "Epoch {} - Spindles: {}  (starts at {:.2} s)",
        epoch.index + 1,
        epoch.spindles.len(),
        epoch.start_secs(sample_rate)
    );
    for ev in &epoch.spindles {
        println!(
            "  {:.3} - {:.3} s ({:.3} s)",
            ev.start_secs(sample_rate),
            ev.end_secs(sample_rate),
            ev.duration_secs(sample_rate)
        );
    }
    if let Some(peak) = epoch.scaleogram.peak_frequency() {
        println!("  wavelet peak: {peak:.2} Hz");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["spindle-scan", "wavelet", "rec.csv", "--channel", "Fz", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Wavelet { ref channel, .. } if channel == "Fz"));
    }

    #[test]
    fn test_settings_map_onto_config() {
        let cli = Cli::try_parse_from([
            "spindle-scan",
            "epochs",
            "rec.csv",
            "-c",
            "Cz",
            "--sfreq",
            "256",
            "--epoch-secs",
            "4",
            "--fmin",
            "9",
            "--format",
            "json",
        ])
        .unwrap();
        let cfg = cli.settings.to_config();
        assert_eq!(cfg.sample_rate, 256.0);
        assert_eq!(cfg.epoch_secs, 4.0);
        assert_eq!(cfg.band.low_hz, 9.0);
        assert_eq!(cfg.band.high_hz, 13.0);
        assert_eq!(cli.format, Format::Json);
    }

    #[test]
    fn test_sheet_option_is_global() {
        let cli = Cli::try_parse_from(["spindle-scan", "total", "baselines.xlsx", "--sheet", "EOBL"]).unwrap();
        assert_eq!(cli.sheet.as_deref(), Some("EOBL"));
        let cli = Cli::try_parse_from(["spindle-scan", "--sheet", "ECBL", "channels", "baselines.xlsx"]).unwrap();
        assert_eq!(cli.sheet.as_deref(), Some("ECBL"));
    }

    #[test]
    fn test_sheet_rejected_for_text_input() {
        let err = load(Path::new("rec.csv"), Some("EOBL"), &AnalysisConfig::default()).unwrap_err();
        assert!(err.to_string().contains("--sheet"), "{err}");
    }

    #[test]
    fn test_channel_is_required_for_wavelet() {
        assert!(Cli::try_parse_from(["spindle-scan", "wavelet", "rec.csv"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
