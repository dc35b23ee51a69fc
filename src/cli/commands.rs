use std::path::PathBuf;

use clap::Parser;
use defender_agent::{AgentConfig, ReportFormat, TagLength};

/// Command line for the `dda` reporting loop
/// Flags override values loaded from the config file and environment
#[derive(Parser, Debug)]
#[command(author = "Kaipo Chen")]
#[command(version)] // Automatically uses version from Cargo.toml
#[command(about = "Device defender agent - collect network metrics and emit JSON or CBOR reports")]
#[command(long_about = "Periodically reads interface counters and TCP/UDP socket tables from /proc/net, \
builds a metrics report and writes it to stdout or to one file per report.\n\n\
Examples:\n  \
dda --count 1                         # Print a single JSON report\n  \
dda --format cbor --output /tmp/dda   # Write CBOR reports to a directory\n  \
dda --short-tags --interval 60        # Compact field names every minute\n  \
dda --config /etc/dda.toml            # Load settings from a file")]
pub struct Cli {
    /// Optional TOML config file, layered under DDA_* environment variables
    #[arg(short, long, help = "Path to a config file")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Report encoding: json or cbor")]
    pub format: Option<ReportFormat>,

    /// Use the abbreviated field names to save space on constrained links
    #[arg(short, long, help = "Use short field tags")]
    pub short_tags: bool,

    #[arg(
        short = 'n',
        long,
        default_value = "0",
        help = "Number of reports to produce before exiting (0 runs until Ctrl-C)"
    )]
    pub count: u64,

    #[arg(short, long, help = "Reporting interval in seconds")]
    pub interval: Option<u64>,

    /// Directory receiving `report-<id>.<ext>` files instead of stdout
    #[arg(short, long, help = "Write reports into this directory")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Seed the connection sampler for reproducible output")]
    pub seed: Option<u64>,
}

impl Cli {
    /// Applies command line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut AgentConfig) {
        if let Some(format) = self.format {
            config.report_format = format;
        }
        if self.short_tags {
            config.tag_length = TagLength::Short;
        }
        if let Some(interval) = self.interval {
            config.report_interval_secs = interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_loaded_values() {
        let cli = Cli::parse_from(["dda", "--format", "cbor", "--short-tags", "-i", "60", "-n", "2"]);
        let mut config = AgentConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.report_format, ReportFormat::Cbor);
        assert_eq!(config.tag_length, TagLength::Short);
        assert_eq!(config.report_interval_secs, 60);
        assert_eq!(cli.count, 2);
    }

    #[test]
    fn test_defaults_leave_config_untouched() {
        let cli = Cli::parse_from(["dda"]);
        let mut config = AgentConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config, AgentConfig::default());
        assert_eq!(cli.count, 0);
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["dda", "--format", "xml"]).is_err());
    }
}
