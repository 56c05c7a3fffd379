//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, ThresholdMode};

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Chunk compaction demo")]
pub struct CliArgs {
    /// Enable or disable chunk compaction.
    #[arg(long)]
    pub enabled: Option<bool>,

    /// Threshold selection.
    #[arg(long, value_enum)]
    pub thresholds: Option<ThresholdMode>,

    /// Log per-layer savings.
    #[arg(long)]
    pub log_deflation: Option<bool>,

    /// Chunk height in cells.
    #[arg(long)]
    pub size_y: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Seed for the generated sample chunks.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(enabled) = args.enabled {
            self.deflate.enabled = enabled;
        }
        if let Some(mode) = args.thresholds {
            self.deflate.thresholds = mode;
        }
        if let Some(log) = args.log_deflation {
            self.deflate.log_deflation = log;
        }
        if let Some(size_y) = args.size_y {
            self.chunk.size_y = size_y;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            enabled: Some(false),
            thresholds: Some(ThresholdMode::Derived),
            size_y: Some(128),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert!(!config.deflate.enabled);
        assert_eq!(config.deflate.thresholds, ThresholdMode::Derived);
        assert_eq!(config.chunk.size_y, 128);
        // Non-overridden fields retain defaults
        assert_eq!(config.chunk.size_x, 16);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::try_parse_from([
            "strata",
            "--enabled",
            "false",
            "--thresholds",
            "derived",
            "--seed",
            "7",
        ])
        .unwrap();
        assert_eq!(args.enabled, Some(false));
        assert_eq!(args.thresholds, Some(ThresholdMode::Derived));
        assert_eq!(args.seed, 7);
        assert!(args.config.is_none());
    }
}
