//! Command-line arguments.
//!
//! Parsed once in `run()` and merged over the file config to produce the
//! `LaunchArgs` handed to `Routine::init`.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;

use crate::config::{ConfigReport, HostConfig};
use crate::error::HostResult;

/// Transparent desktop overlay host for an animated desk mascot.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "mascot-host", version, about)]
pub struct Cli {
    /// Model file handed to the routine
    pub model: Option<PathBuf>,

    /// Config file (defaults to <config_dir>/mascot-host/config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Target frame rate, overrides the config file
    #[arg(long, value_name = "N")]
    pub fps: Option<u32>,

    /// Log filter (error, warn, info, debug, trace or an env_logger directive)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log to stderr only
    #[arg(long)]
    pub no_log_file: bool,
}

/// Everything the routine receives at `init`.
#[derive(Debug, Clone, Default)]
pub struct LaunchArgs {
    pub model: Option<PathBuf>,
    pub config: HostConfig,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded config.
    pub fn apply_overrides(&self, mut config: HostConfig) -> HostConfig {
        if let Some(fps) = self.fps {
            config.frame_rate = fps;
        }
        if self.no_log_file {
            config.log_to_file = false;
        }
        config
    }

    /// Load the config file, merge the overrides and validate the result.
    ///
    /// Nothing is logged here; the report is for the caller to log once the
    /// logger is installed.
    pub fn into_launch_args(self) -> HostResult<(LaunchArgs, ConfigReport)> {
        let (file_config, source) = HostConfig::load(self.config.as_deref())?;
        let mut config = self.apply_overrides(file_config);
        let warnings = config.validate();
        let args = LaunchArgs {
            model: self.model,
            config,
        };
        Ok((args, ConfigReport { source, warnings }))
    }
}

/// Help and version requests are printed by clap; everything else is a
/// usage error for the dialog.
pub fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positional_model() {
        let cli = Cli::try_parse_from(["mascot-host", "figure.pmx"]).unwrap();
        assert_eq!(cli.model, Some(PathBuf::from("figure.pmx")));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "mascot-host",
            "--fps",
            "30",
            "--log-level",
            "debug",
            "--no-log-file",
        ])
        .unwrap();
        assert_eq!(cli.fps, Some(30));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.no_log_file);
    }

    #[test]
    fn test_rejects_non_numeric_fps() {
        let err = Cli::try_parse_from(["mascot-host", "--fps", "fast"]).unwrap_err();
        assert!(!is_informational(&err));
        assert!(err.to_string().contains("--fps"));
    }

    #[test]
    fn test_unknown_flag_is_usage_error() {
        let err = Cli::try_parse_from(["mascot-host", "--fullscreen"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert!(!is_informational(&err));
    }

    #[test]
    fn test_help_and_version_are_informational() {
        let help = Cli::try_parse_from(["mascot-host", "--help"]).unwrap_err();
        assert!(is_informational(&help));
        let version = Cli::try_parse_from(["mascot-host", "--version"]).unwrap_err();
        assert!(is_informational(&version));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let cli = Cli {
            fps: Some(24),
            no_log_file: true,
            ..Default::default()
        };
        let merged = cli.apply_overrides(HostConfig::default());
        assert_eq!(merged.frame_rate, 24);
        assert!(!merged.log_to_file);
    }

    #[test]
    fn test_override_is_validated_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(&path, r#"{ "sampleCount": 4 }"#).unwrap();

        let cli = Cli {
            config: Some(path.clone()),
            fps: Some(0),
            ..Default::default()
        };
        let (args, report) = cli.into_launch_args().unwrap();
        assert_eq!(args.config.frame_rate, 1);
        assert_eq!(args.config.sample_count, 1);
        assert_eq!(report.source, Some(path));
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].starts_with("frameRate 0"));
        assert!(report.warnings[1].starts_with("sampleCount 4"));
    }

    #[test]
    fn test_into_launch_args_with_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(&path, r#"{ "frameRate": 45 }"#).unwrap();

        let cli = Cli {
            model: Some(PathBuf::from("m.vrm")),
            config: Some(path),
            ..Default::default()
        };
        let (args, report) = cli.into_launch_args().unwrap();
        assert!(report.warnings.is_empty());
        assert_eq!(args.config.frame_rate, 45);
        assert_eq!(args.model, Some(PathBuf::from("m.vrm")));
    }
}
