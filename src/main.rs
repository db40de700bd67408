use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use craneguard::config::MonitorConfig;
use craneguard::pipeline::{Monitor, MonitorHandle, TickReport};
use craneguard::telemetry::source::{HttpTelemetrySource, SyntheticSource, TelemetrySource};

#[derive(Parser)]
#[command(
    name = "craneguard",
    about = "Telemetry analytics and alerting for heavy-equipment monitoring",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML config file (falls back to CRANEGUARD_CONFIG, then
    /// /etc/craneguard/craneguard.toml, then defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the daemon (ingestion ticker + presentation API)
    Serve {
        /// Bind address
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,

        /// Override the telemetry endpoint URL
        #[arg(long)]
        telemetry_url: Option<String>,

        /// Override the poll interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Run a one-shot evaluation and print the resulting report
    Check {
        /// Use synthesized telemetry instead of polling the gateway
        #[arg(long)]
        synthetic: bool,

        /// Number of snapshots to ingest before reporting (5+ enables trends)
        #[arg(long, default_value = "1")]
        samples: usize,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = MonitorConfig::resolve(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    match cli.command {
        Commands::Serve {
            bind,
            telemetry_url,
            interval,
        } => {
            let mut config = config;
            if let Some(url) = telemetry_url {
                config.telemetry.url = url;
            }
            if let Some(secs) = interval {
                config.telemetry.poll_interval_secs = secs;
            }
            tracing::info!(%bind, "Starting CraneGuard daemon");
            craneguard::serve(&bind, config).await?;
        }
        Commands::Check {
            synthetic,
            samples,
            json,
        } => {
            let report = run_check(&config, synthetic, samples.max(1)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}

/// Ingest `samples` snapshots through a fresh pipeline and return the final
/// report. Falls back to synthesized data when the gateway is unreachable.
async fn run_check(config: &MonitorConfig, synthetic: bool, samples: usize) -> Result<TickReport> {
    let source: Arc<dyn TelemetrySource> = if synthetic {
        Arc::new(SyntheticSource)
    } else {
        Arc::new(HttpTelemetrySource::new(
            config.telemetry.url.as_str(),
            Duration::from_secs(config.telemetry.request_timeout_secs),
        )?)
    };

    let handle = MonitorHandle::new(Monitor::new(config)?);
    let mut report = None;
    for _ in 0..samples {
        let previous_hours = handle.previous_hours();
        let snapshot = match source.fetch(previous_hours).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "telemetry fetch failed, synthesizing snapshot");
                craneguard::telemetry::source::synthesize_snapshot(previous_hours)
            }
        };
        report = Some(handle.observe(snapshot));
    }

    // samples >= 1, so a report is always produced.
    report.ok_or_else(|| anyhow::anyhow!("no snapshot ingested"))
}

fn print_report(report: &TickReport) {
    println!("\n=== CraneGuard Telemetry Report ===");
    println!("Unit:        {}", report.unit);
    for kind in craneguard::telemetry::SensorKind::ALL {
        println!(
            "  {:<12} {:>8.1} {}",
            kind.display_name(),
            report.snapshot.value(kind),
            kind.unit()
        );
    }
    println!("Health:      {:.1} / 100", report.health);
    println!(
        "Anomaly:     {:.1} ({})",
        report.anomaly.score,
        if report.anomaly.is_anomaly {
            "ANOMALOUS"
        } else {
            "normal"
        }
    );
    println!(
        "RUL:         {:.0} h (~{} days)",
        report.rul.hours, report.rul.days
    );
    println!(
        "Alerts:      {} active ({} critical, {} warning, {} maintenance, {} info)",
        report.statistics.total(),
        report.statistics.critical,
        report.statistics.warning,
        report.statistics.maintenance,
        report.statistics.info,
    );

    if !report.alerts.is_empty() {
        println!();
        println!("{:<12} | {:<12} | {:<12} | Message", "Severity", "Status", "Sensor");
        println!("{:-<12}-|-{:-<12}-|-{:-<12}-|-{:-<40}", "", "", "", "");
        for alert in &report.alerts {
            let sensor = alert
                .sensor
                .map(|k| k.display_name())
                .unwrap_or("System");
            println!(
                "{:<12} | {:<12} | {:<12} | {}",
                alert.severity.as_str(),
                alert.status.as_str(),
                sensor,
                alert.message
            );
            println!(
                "{:<12} | {:<12} | {:<12} |   -> Recommendation: {}",
                "", "", "", alert.recommendation
            );
        }
    }
    println!("===================================\n");
}
