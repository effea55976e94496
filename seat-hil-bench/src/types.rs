//! Core types for the seat module HIL bench
//!
//! This module defines the raw frame type handed over by a bus driver and the
//! error type shared by every part of the bench.

use chrono::{DateTime, Utc};
use std::time::Instant;

/// Wall-clock timestamp used in run summaries and reports
pub type Timestamp = DateTime<Utc>;

/// Result type for bench operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Raw CAN frame as received from the bus
///
/// This represents a single frame before any payload decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct CanFrame {
    /// CAN message ID (11-bit or 29-bit)
    pub can_id: u32,
    /// CAN channel number (e.g., 0, 1, 2...)
    pub channel: u8,
    /// Frame data bytes (0-8 bytes for classic CAN)
    pub data: Vec<u8>,
    /// True if this is an extended (29-bit) CAN ID
    pub is_extended: bool,
    /// Monotonic arrival time, stamped by the bus driver
    pub timestamp: Instant,
}

impl CanFrame {
    /// Create a standard-ID frame on channel 0, stamped with the current time
    pub fn new(can_id: u32, data: impl Into<Vec<u8>>) -> Self {
        Self::with_timestamp(can_id, data, Instant::now())
    }

    /// Create a standard-ID frame on channel 0 with an explicit arrival time
    pub fn with_timestamp(can_id: u32, data: impl Into<Vec<u8>>, timestamp: Instant) -> Self {
        Self {
            can_id,
            channel: 0,
            data: data.into(),
            is_extended: false,
            timestamp,
        }
    }

    /// Builder method: move the frame to another bus channel
    pub fn on_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    /// Get the data length code (DLC) - number of data bytes
    pub fn dlc(&self) -> usize {
        self.data.len()
    }
}

/// Errors that can occur while running the bench
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("CAN bus closed")]
    BusClosed,

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
