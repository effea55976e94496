//! CAN bus access and the receiver thread
//!
//! The bench never talks to a driver directly. A [`CanBus`] hands out frames,
//! and a [`BusMonitor`] thread decodes them and forwards each recognised
//! message to its signal channel.

use crate::config::BenchConfig;
use crate::frames::{DecodedFrame, FrameDecoder};
use crate::signal::{FaultSignal, ReadinessSignal, SignalSender};
use crate::types::{BenchError, CanFrame, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Source of received CAN frames
pub trait CanBus: Send {
    /// Block for at most `timeout` waiting for the next frame
    ///
    /// Returns `Ok(None)` if the bus stayed idle and `Err(BenchError::BusClosed)`
    /// once no more frames can arrive.
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<CanFrame>>;
}

/// Create an in-process bus
pub fn virtual_bus() -> (VirtualBusSender, VirtualBus) {
    let (tx, rx) = mpsc::channel();
    (VirtualBusSender { tx }, VirtualBus { rx })
}

/// Receiving end of the in-process bus
#[derive(Debug)]
pub struct VirtualBus {
    rx: Receiver<CanFrame>,
}

impl CanBus for VirtualBus {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<CanFrame>> {
        match self.rx.recv_timeout(timeout) {
            Ok(frame) => Ok(Some(frame)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(BenchError::BusClosed),
        }
    }
}

/// Transmitting end of the in-process bus
#[derive(Debug, Clone)]
pub struct VirtualBusSender {
    tx: Sender<CanFrame>,
}

impl VirtualBusSender {
    pub fn send(&self, frame: CanFrame) -> Result<()> {
        self.tx.send(frame).map_err(|_| BenchError::BusClosed)
    }
}

/// Receiver thread feeding the readiness and fault channels
pub struct BusMonitor {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl BusMonitor {
    /// Start the receiver thread
    pub fn spawn<B>(
        bus: B,
        config: &BenchConfig,
        readiness: SignalSender<ReadinessSignal>,
        faults: SignalSender<FaultSignal>,
    ) -> Result<Self>
    where
        B: CanBus + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let router = FrameRouter {
            decoder: FrameDecoder::new().with_payload_logging(config.log_payloads),
            config: config.clone(),
            readiness,
            faults,
        };

        let handle = thread::Builder::new()
            .name("bus-monitor".to_string())
            .spawn({
                let stop = Arc::clone(&stop);
                let poll = Duration::from_millis(config.monitor_poll_ms.max(1));
                move || run_monitor(bus, router, poll, stop)
            })?;

        log::debug!("Bus monitor started");
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Signal the receiver thread and wait for it to exit
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Bus monitor thread panicked");
            }
            log::debug!("Bus monitor stopped");
        }
    }
}

impl Drop for BusMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_monitor<B: CanBus>(mut bus: B, router: FrameRouter, poll: Duration, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Relaxed) {
        match bus.recv_timeout(poll) {
            Ok(Some(frame)) => router.route(&frame),
            Ok(None) => continue,
            Err(BenchError::BusClosed) => {
                log::info!("CAN bus closed, monitor exiting");
                break;
            }
            Err(e) => {
                log::error!("CAN receive failed: {}", e);
                break;
            }
        }
    }
}

/// Decodes one frame and forwards it to the matching signal channel
struct FrameRouter {
    decoder: FrameDecoder,
    config: BenchConfig,
    readiness: SignalSender<ReadinessSignal>,
    faults: SignalSender<FaultSignal>,
}

impl FrameRouter {
    fn route(&self, frame: &CanFrame) {
        if !self.config.should_process_channel(frame.channel) {
            log::trace!("Skipping frame on filtered channel {}", frame.channel);
            return;
        }

        let delivered = match self.decoder.decode(frame) {
            Ok(Some(DecodedFrame::SystemReady(status))) => self.readiness.observe(ReadinessSignal {
                observed_at: frame.timestamp,
                status,
            }),
            Ok(Some(DecodedFrame::ErrorFrame(error))) => {
                self.faults.observe(FaultSignal::new(frame.timestamp, error))
            }
            Ok(None) => true,
            Err(e) => {
                log::warn!("Dropping malformed frame 0x{:X}: {}", frame.can_id, e);
                true
            }
        };

        if !delivered {
            log::debug!("No consumer for frame 0x{:X}", frame.can_id);
        }
    }
}
