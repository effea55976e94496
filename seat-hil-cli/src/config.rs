//! Configuration loading and parsing

use anyhow::{bail, Context, Result};
use seat_hil_bench::{BenchConfig, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub bench: BenchConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BusConfig {
    #[serde(default = "default_interface")]
    pub interface: String,
    #[serde(default)]
    pub channel: u8,
    #[serde(default = "default_bitrate")]
    pub bitrate: u32,
}

fn default_interface() -> String {
    "virtual".to_string()
}

fn default_bitrate() -> u32 {
    500_000
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            channel: 0,
            bitrate: default_bitrate(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
    Html,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        }
    }
}

impl AppConfig {
    /// Reject settings the bench cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.bus.interface != "virtual" {
            bail!(
                "Unsupported CAN interface '{}': only 'virtual' is available",
                self.bus.interface
            );
        }
        if self.bus.bitrate == 0 {
            bail!("CAN bitrate must be greater than zero");
        }
        if !self.bench.should_process_channel(self.bus.channel) {
            bail!(
                "bench.channel_filter excludes the bus channel {}",
                self.bus.channel
            );
        }
        if self.bench.monitor_poll_ms == 0 {
            bail!("bench.monitor_poll_ms must be greater than zero");
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}
