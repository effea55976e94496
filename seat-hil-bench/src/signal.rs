//! Observed signals and the channels that carry them
//!
//! Each signal type gets its own single-producer single-consumer channel. The
//! bus monitor is the only writer, the orchestrator the only reader, so an
//! observation is never shared mutable state.

use crate::frames::{ErrorFrame, FaultCode, SystemReady};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::{Duration, Instant};

/// Anything that was observed on the bus at a known instant
pub trait Observation {
    fn observed_at(&self) -> Instant;
}

/// The seat module announced readiness
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadinessSignal {
    pub observed_at: Instant,
    pub status: SystemReady,
}

impl Observation for ReadinessSignal {
    fn observed_at(&self) -> Instant {
        self.observed_at
    }
}

/// The seat module reported a fault
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultSignal {
    pub observed_at: Instant,
    pub code: FaultCode,
    pub frame: ErrorFrame,
}

impl FaultSignal {
    pub fn new(observed_at: Instant, frame: ErrorFrame) -> Self {
        Self {
            observed_at,
            code: frame.fault_code(),
            frame,
        }
    }
}

impl Observation for FaultSignal {
    fn observed_at(&self) -> Instant {
        self.observed_at
    }
}

/// Create a connected sender/receiver pair for one signal type
pub fn signal_channel<T>() -> (SignalSender<T>, SignalReceiver<T>) {
    let (tx, rx) = mpsc::channel();
    (SignalSender { tx }, SignalReceiver { rx })
}

/// Producer side, owned by the bus monitor
#[derive(Debug)]
pub struct SignalSender<T> {
    tx: Sender<T>,
}

impl<T> SignalSender<T> {
    /// Publish an observation
    ///
    /// Returns `false` once the receiver has been dropped.
    pub fn observe(&self, signal: T) -> bool {
        self.tx.send(signal).is_ok()
    }
}

/// Consumer side, owned by the orchestrator
#[derive(Debug)]
pub struct SignalReceiver<T> {
    rx: Receiver<T>,
}

/// Result of a single bounded receive
pub(crate) enum Received<T> {
    Value(T),
    Timeout,
    Disconnected,
}

impl<T> SignalReceiver<T> {
    /// Discard observations left over from a previous run
    ///
    /// Returns the number of stale observations dropped.
    pub fn reset(&self) -> usize {
        let mut discarded = 0;
        loop {
            match self.rx.try_recv() {
                Ok(_) => discarded += 1,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if discarded > 0 {
            log::debug!("Discarded {} stale observation(s)", discarded);
        }
        discarded
    }

    pub(crate) fn recv_timeout(&self, timeout: Duration) -> Received<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => Received::Value(value),
            Err(RecvTimeoutError::Timeout) => Received::Timeout,
            Err(RecvTimeoutError::Disconnected) => Received::Disconnected,
        }
    }
}
