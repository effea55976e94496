//! Bench configuration types
//!
//! Only the knobs of the bus side live here. Pass/fail thresholds and wait
//! timeouts are constants of the test cases, not settings.

use serde::{Deserialize, Serialize};

/// Configuration for the bench library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Optional: only listen on these CAN channels
    #[serde(default)]
    pub channel_filter: Option<Vec<u8>>,

    /// How long the bus monitor blocks per receive before checking for shutdown
    #[serde(default = "default_monitor_poll")]
    pub monitor_poll_ms: u64,

    /// Whether to log every decoded payload field
    #[serde(default = "default_true")]
    pub log_payloads: bool,
}

fn default_true() -> bool {
    true
}

fn default_monitor_poll() -> u64 {
    10
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            channel_filter: None,
            monitor_poll_ms: default_monitor_poll(),
            log_payloads: true,
        }
    }
}

impl BenchConfig {
    /// Create a new bench configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set channel filter
    pub fn with_channel_filter(mut self, channels: Vec<u8>) -> Self {
        self.channel_filter = Some(channels);
        self
    }

    /// Builder method: set the monitor receive granularity
    pub fn with_monitor_poll_ms(mut self, poll_ms: u64) -> Self {
        self.monitor_poll_ms = poll_ms;
        self
    }

    /// Builder method: enable or disable payload logging
    pub fn with_payload_logging(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    /// Check if a channel should be processed
    pub fn should_process_channel(&self, channel: u8) -> bool {
        match &self.channel_filter {
            Some(channels) => channels.contains(&channel),
            None => true,
        }
    }
}
