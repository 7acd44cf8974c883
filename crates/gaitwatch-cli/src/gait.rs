//! Gait and vital sign subcommands.
//!
//! - Vital sign screening
//! - Single-sample gait classification
//! - Recovery guidance lookup
//! - Full telemetry window assessment with comparison series export

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use gaitwatch_core::{
    load_reference_dataset, load_remedy_table, AccelSample, ClassificationResult,
    ConfidenceTier, CsvSeriesRenderer, EnvelopeRenderer, FileFeed, GaitClassifier,
    HealthMonitor, MonitorConfig, MonitorReport, SnapshotStore, TelemetrySource, VitalStatus,
    VitalsReport,
};

use crate::feed::ThingSpeakClient;

/// Shown when a disorder has no guidance.
const NO_REMEDY: &str = "No remedy found for this disorder.";

/// Output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    /// Pretty table output
    #[default]
    Table,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

/// Arguments for the vitals command
#[derive(Args, Debug)]
pub struct VitalsArgs {
    /// Pulse in beats per minute
    #[arg(short, long)]
    pub pulse: f64,

    /// Blood oxygen saturation (%)
    #[arg(short, long)]
    pub oxygen: f64,

    /// Body temperature
    #[arg(short, long)]
    pub temperature: f64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the classify command
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// X acceleration
    #[arg(long, allow_hyphen_values = true)]
    pub x: f64,

    /// Y acceleration
    #[arg(long, allow_hyphen_values = true)]
    pub y: f64,

    /// Z acceleration
    #[arg(long, allow_hyphen_values = true)]
    pub z: f64,

    /// Reference table (overrides the configured path)
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Confidence threshold (overrides the configured value)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the remedy command
#[derive(Args, Debug)]
pub struct RemedyArgs {
    /// Disorder name, e.g. "Ataxic Gait" (lists all disorders when omitted)
    #[arg(short, long)]
    pub disorder: Option<String>,

    /// Reference table (overrides the configured path)
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the monitor command
#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Read the feed from a saved ThingSpeak JSON file instead of the API
    #[arg(long)]
    pub feed: Option<PathBuf>,

    /// Directory for comparison series (overrides the configured path)
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Skip writing comparison series
    #[arg(long)]
    pub no_render: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

// ============================================================================
// Display Structs for Tables
// ============================================================================

/// Vital sign display row
#[derive(Tabled, Serialize)]
struct VitalRow {
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Envelope display row
#[derive(Tabled, Serialize)]
struct EnvelopeRow {
    #[tabled(rename = "Axis")]
    axis: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Std Dev")]
    std_dev: String,
    #[tabled(rename = "Band")]
    band: String,
    #[tabled(rename = "Outside Band")]
    excursions: String,
}

/// Remedy display row
#[derive(Tabled, Serialize)]
struct RemedyRow {
    #[tabled(rename = "Disorder")]
    disorder: String,
    #[tabled(rename = "Recovery Guidance")]
    guidance: String,
}

fn status_colored(status: VitalStatus) -> ColoredString {
    match status {
        VitalStatus::Normal => "Normal".green(),
        VitalStatus::Abnormal => "Abnormal".red().bold(),
        VitalStatus::Unknown => "Unknown".yellow(),
    }
}

fn classification_colored(result: &ClassificationResult) -> ColoredString {
    let text = format!("{} ({})", result.label, result.tier);
    match result.tier {
        ConfidenceTier::Confident => text.green().bold(),
        ConfidenceTier::Uncertain => text.yellow().bold(),
        ConfidenceTier::Error => text.red().bold(),
    }
}

fn vital_rows(report: &VitalsReport) -> Vec<VitalRow> {
    report
        .rows()
        .into_iter()
        .map(|(channel, c)| VitalRow {
            channel: channel.to_string(),
            value: format!("{:.1}", c.value),
            status: status_colored(c.status).to_string(),
        })
        .collect()
}

/// Execute a gaitwatch command.
pub async fn execute(command: crate::Commands, config: &MonitorConfig) -> Result<()> {
    match command {
        crate::Commands::Vitals(args) => execute_vitals(args),
        crate::Commands::Classify(args) => execute_classify(args, config),
        crate::Commands::Remedy(args) => execute_remedy(args, config),
        crate::Commands::Monitor(args) => execute_monitor(args, config).await,
        crate::Commands::Version => {
            println!("gaitwatch {}", env!("CARGO_PKG_VERSION"));
            println!("core version: {}", gaitwatch_core::VERSION);
            Ok(())
        }
    }
}

fn execute_vitals(args: VitalsArgs) -> Result<()> {
    let report = VitalsReport::evaluate(args.pulse, args.oxygen, args.temperature);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Compact => println!(
            "pulse={} oxygen={} temperature={}",
            report.pulse.status, report.oxygen.status, report.temperature.status
        ),
        OutputFormat::Table => {
            println!("{}", "Vital Signs".bold().cyan());
            println!("{}", Table::new(vital_rows(&report)).with(Style::rounded()));
        }
    }
    Ok(())
}

fn execute_classify(args: ClassifyArgs, config: &MonitorConfig) -> Result<()> {
    let path = args.reference.unwrap_or_else(|| config.reference_path.clone());
    let threshold = effective_threshold(args.threshold, config)?;
    let live = AccelSample::new(args.x, args.y, args.z);

    // Classification degrades to an error label rather than aborting.
    let dataset = match load_reference_dataset(&path) {
        Ok(ds) => Some(ds),
        Err(e) => {
            eprintln!("{} {}", "[WARN]".yellow().bold(), e);
            None
        }
    };
    let result = GaitClassifier::with_threshold(threshold).classify(dataset.as_ref(), live);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Compact => println!("label=\"{}\" tier={}", result.label, result.tier),
        OutputFormat::Table => {
            println!("{}", "Gait Classification".bold().cyan());
            println!("{}", "=".repeat(50));
            println!(
                "  {} ({:.3}, {:.3}, {:.3})",
                "Sample:".dimmed(),
                live.x,
                live.y,
                live.z
            );
            println!("  {} {}", "Result:".dimmed(), classification_colored(&result));
            if let Some(d) = result.distance {
                println!("  {} {:.4} (threshold {})", "Distance:".dimmed(), d, threshold);
            }
        }
    }
    Ok(())
}

/// Threshold override checked with the same rules as a loaded config.
fn effective_threshold(threshold: Option<f64>, config: &MonitorConfig) -> Result<f64> {
    let Some(threshold) = threshold else {
        return Ok(config.confidence_threshold);
    };
    let effective = MonitorConfig {
        confidence_threshold: threshold,
        ..config.clone()
    };
    effective.validate()?;
    Ok(threshold)
}

fn execute_remedy(args: RemedyArgs, config: &MonitorConfig) -> Result<()> {
    let path = args.reference.unwrap_or_else(|| config.reference_path.clone());
    let remedies = load_remedy_table(&path);

    let rows: Vec<RemedyRow> = match &args.disorder {
        Some(name) => vec![RemedyRow {
            disorder: name.clone(),
            guidance: remedies.lookup_name(name).unwrap_or(NO_REMEDY).to_string(),
        }],
        None => remedies
            .iter()
            .map(|(d, text)| RemedyRow {
                disorder: d.to_string(),
                guidance: text.to_string(),
            })
            .collect(),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Compact => {
            for row in &rows {
                println!("{}: {}", row.disorder, row.guidance);
            }
        }
        OutputFormat::Table => {
            println!("{}", "Recovery Guidance".bold().cyan());
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }
    Ok(())
}

async fn execute_monitor(args: MonitorArgs, config: &MonitorConfig) -> Result<()> {
    let store = Arc::new(SnapshotStore::from_source(config.snapshot_source()));
    if !store.is_loaded() {
        eprintln!(
            "{} Reference table {} unavailable, classification disabled",
            "[WARN]".yellow().bold(),
            config.reference_path.display()
        );
    }
    let monitor = HealthMonitor::new(store, config.classifier(), config.window_size);

    let report = match &args.feed {
        Some(path) => monitor.assess_source(&FileFeed::new(path))?,
        None => {
            let client = ThingSpeakClient::from_config(config)?;
            let feed = client
                .fetch(config.window_size)
                .await
                .context("Failed to fetch telemetry feed")?;
            monitor.assess(&feed.latest_readings(config.window_size)?)?
        }
    };

    if !args.no_render {
        let dir = args.output_dir.unwrap_or_else(|| config.output_dir.clone());
        CsvSeriesRenderer::new(&dir)
            .render_all(&report.plots())
            .with_context(|| format!("Failed to write comparison series to {}", dir.display()))?;
        tracing::info!(dir = %dir.display(), "Wrote comparison series");
    }

    print_report(&report, args.format)
}

fn print_report(report: &MonitorReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Compact => println!(
            "pulse={} oxygen={} temperature={} gait=\"{}\" tier={} degraded={}",
            report.vitals.pulse.status,
            report.vitals.oxygen.status,
            report.vitals.temperature.status,
            report.classification.label,
            report.classification.tier,
            report.envelope.degraded
        ),
        OutputFormat::Table => {
            println!("{}", "Gaitwatch Report".bold().cyan());
            println!("{}", "=".repeat(50));
            println!("{}", Table::new(vital_rows(&report.vitals)).with(Style::rounded()));
            println!();

            let s = report.latest_sample;
            println!(
                "  {} X {:.3}  Y {:.3}  Z {:.3}",
                "Latest:".dimmed(),
                s.x,
                s.y,
                s.z
            );
            println!(
                "  {} {}",
                "Gait:".dimmed(),
                classification_colored(&report.classification)
            );
            if let Some(remedy) = &report.remedy {
                println!("  {} {}", "Guidance:".dimmed(), remedy);
            }
            println!();

            let rows: Vec<EnvelopeRow> = report
                .envelope
                .axes()
                .into_iter()
                .map(|a| EnvelopeRow {
                    axis: a.axis.label().to_string(),
                    mean: format!("{:.3}", a.mean),
                    std_dev: format!("{:.3}", a.std_dev),
                    band: format!("[{:.3}, {:.3}]", a.band_lower(), a.band_upper()),
                    excursions: format!("{}/{}", a.excursions().len(), a.len()),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            if report.envelope.degraded {
                println!(
                    "{} No normal reference samples; baseline uses resting acceleration",
                    "[WARN]".yellow().bold()
                );
            }
        }
    }
    Ok(())
}
