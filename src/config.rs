//! Host configuration.
//!
//! Settings come from three layers, later layers winning:
//! 1. `HostConfig::default()`
//! 2. A JSON file (`--config <path>`, or `<config_dir>/mascot-host/config.json`)
//! 3. Command-line overrides (see `cli.rs`)
//!
//! Out-of-range values are clamped rather than rejected. Loading happens
//! before the logger exists, so the outcome is collected in a
//! [`ConfigReport`] and logged once logging is up.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::HostResult;
use crate::types::truncate_utf16;

/// Application directory name under the platform config/data roots
pub const APP_DIR_NAME: &str = "mascot-host";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_FRAME_RATE: u32 = 60;
pub const MAX_FRAME_RATE: u32 = 240;

/// The swap chain and depth buffer are single-sampled
pub const SUPPORTED_SAMPLE_COUNT: u32 = 1;

/// `NOTIFYICONDATAW.szTip` holds 128 UTF-16 units including the terminator
pub const MAX_TOOLTIP_UNITS: usize = 127;

/// Host-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostConfig {
    /// Target frames per second for the render loop.
    pub frame_rate: u32,
    /// Scroll units forwarded to the routine per wheel notch.
    pub wheel_units_per_notch: f32,
    /// Tooltip shown on the notification icon.
    pub tray_tooltip: String,
    /// Sample count of the render targets; only 1 is supported.
    pub sample_count: u32,
    /// Tee log output to a daily file in the data directory.
    pub log_to_file: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            wheel_units_per_notch: 1.0,
            tray_tooltip: "Desk Mascot".to_string(),
            sample_count: 1,
            log_to_file: true,
        }
    }
}

impl HostConfig {
    /// Target time per frame.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate.max(1) as f64)
    }

    /// Clamp values that would break the frame loop or GPU setup.
    ///
    /// Returns one message per adjusted value.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.frame_rate == 0 || self.frame_rate > MAX_FRAME_RATE {
            let clamped = self.frame_rate.clamp(1, MAX_FRAME_RATE);
            warnings.push(format!(
                "frameRate {} out of range, using {}",
                self.frame_rate, clamped
            ));
            self.frame_rate = clamped;
        }
        if !self.wheel_units_per_notch.is_finite() {
            warnings.push("wheelUnitsPerNotch is not finite, using 1.0".to_string());
            self.wheel_units_per_notch = 1.0;
        }
        if self.sample_count != SUPPORTED_SAMPLE_COUNT {
            warnings.push(format!(
                "sampleCount {} is not supported, render targets are single-sampled",
                self.sample_count
            ));
            self.sample_count = SUPPORTED_SAMPLE_COUNT;
        }
        let kept = truncate_utf16(&self.tray_tooltip, MAX_TOOLTIP_UNITS);
        if kept.len() < self.tray_tooltip.len() {
            warnings.push(format!(
                "trayTooltip longer than {} UTF-16 units, truncating",
                MAX_TOOLTIP_UNITS
            ));
            self.tray_tooltip = kept.to_string();
        }

        warnings
    }

    /// Parse a config from JSON text.
    pub fn from_json(text: &str) -> HostResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load config from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> HostResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Load config from `path` if given, otherwise from the default location.
    ///
    /// A missing default file yields defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> HostResult<(Self, Option<PathBuf>)> {
        match path {
            Some(p) => Ok((Self::load_from(p)?, Some(p.to_path_buf()))),
            None => match default_config_path() {
                Some(p) if p.exists() => Ok((Self::load_from(&p)?, Some(p))),
                _ => Ok((Self::default(), None)),
            },
        }
    }
}

/// Where the config came from and what validation changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigReport {
    /// `None` when no file was found and defaults are in use
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl ConfigReport {
    pub fn log(&self) {
        match &self.source {
            Some(path) => log::info!("[config] Loaded {:?}", path),
            None => log::debug!("[config] No config file, using defaults"),
        }
        for warning in &self.warnings {
            log::warn!("[config] {}", warning);
        }
    }
}

/// `<config_dir>/mascot-host/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}
