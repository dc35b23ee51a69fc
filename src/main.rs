mod cli;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use cli::Cli;
use defender_agent::{AgentConfig, EncodedReport, MetricsCollector, ReportFormat};
use log::{debug, error, info, log_enabled, warn};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config =
        AgentConfig::load(cli.config.as_deref()).context("Failed to load agent configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid agent configuration")?;

    if let Some(dir) = &cli.output {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    let mut collector = match cli.seed {
        Some(seed) => MetricsCollector::with_seed(seed),
        None => MetricsCollector::new(),
    };

    // Report ids only need to be unique per device; start from the wall clock
    let mut report_id = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
    let mut produced = 0u64;

    info!(
        "Starting agent: {} reports with {} tags every {:?}",
        config.report_format,
        config.tag_length,
        config.report_interval()
    );

    loop {
        match collector.build_report(&config, report_id) {
            Ok(encoded) => {
                if encoded.is_truncated() {
                    warn!(
                        "Report #{} is incomplete, truncated sources: {:?}",
                        report_id, encoded.truncated_sources
                    );
                }
                if let Err(e) = emit(&encoded, report_id, cli.output.as_deref()).await {
                    error!("Failed to write report #{}: {:#}", report_id, e);
                }
            }
            Err(e) => error!("Report cycle #{} failed: {}", report_id, e),
        }

        produced += 1;
        report_id += 1;
        if cli.count != 0 && produced >= cli.count {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(config.report_interval()) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping after {} reports", produced);
                break;
            }
        }
    }

    Ok(())
}

/// Writes one report to its own file in `output`, or to stdout
async fn emit(encoded: &EncodedReport, report_id: u64, output: Option<&Path>) -> Result<()> {
    if encoded.format == ReportFormat::Json && log_enabled!(log::Level::Debug) {
        let value: serde_json::Value = serde_json::from_slice(&encoded.bytes)?;
        debug!("Report #{}:\n{}", report_id, serde_json::to_string_pretty(&value)?);
    }

    match output {
        Some(dir) => {
            let path = dir.join(format!("report-{}.{}", report_id, encoded.format.extension()));
            tokio::fs::write(&path, &encoded.bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} bytes to {}", encoded.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&encoded.bytes)?;
            if encoded.format == ReportFormat::Json {
                stdout.write_all(b"\n")?;
            }
            stdout.flush()?;
        }
    }
    Ok(())
}
