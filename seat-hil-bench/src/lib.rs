//! Seat Comfort Module HIL Bench Library
//!
//! Validates two properties of a seat comfort ECU over CAN:
//! - boot-up completes and `SystemReady` (0x100) arrives within 2 s of power-on
//! - an injected fault produces an `ErrorFrame` (0x7FF) within 100 ms
//!
//! # Architecture
//!
//! - A [`CanBus`] hands received frames to a [`BusMonitor`] thread
//! - The monitor decodes each frame and publishes a typed signal on a
//!   per-signal channel
//! - The [`Bench`] orchestrator drives the [`HilFixture`], blocks on the
//!   channel with a deadline and judges the arrival time
//!
//! The library does NOT:
//! - Drive real CAN hardware or HIL fixture hardware
//! - Parse DBC message databases
//! - Generate report files
//!
//! Report generation is in the application layer (seat-hil-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use seat_hil_bench::{virtual_bus, Bench, BenchConfig, SimulatedSeatModule, SimulationConfig};
//!
//! let (bus_tx, bus) = virtual_bus();
//! let module = SimulatedSeatModule::new(bus_tx, SimulationConfig::new());
//!
//! let mut bench = Bench::new(bus, module, &BenchConfig::new()).unwrap();
//! let summary = bench.run_suite();
//! summary.log_report();
//!
//! println!("Total Passed: {}/{}", summary.passed(), summary.total());
//! ```

// Public modules
pub mod bus;
pub mod config;
pub mod fixture;
pub mod frames;
pub mod orchestrator;
pub mod signal;
pub mod sim;
pub mod summary;
pub mod types;
pub mod waiter;

// Re-export main types for convenience
pub use bus::{virtual_bus, BusMonitor, CanBus, VirtualBus, VirtualBusSender};
pub use config::BenchConfig;
pub use fixture::{AnalogChannel, FaultKind, HilFixture, LoggingFixture};
pub use frames::{
    DecodedFrame, ErrorFrame, FaultCode, FrameDecoder, SystemReady, ERROR_FRAME_ID,
    SYSTEM_READY_ID,
};
pub use orchestrator::{
    evaluate, Bench, Limits, TestCase, TestOutcome, Verdict, BOOT_LIMITS, FAULT_LIMITS,
};
pub use signal::{signal_channel, FaultSignal, Observation, ReadinessSignal};
pub use sim::{SimulatedSeatModule, SimulationConfig};
pub use summary::RunSummary;
pub use types::{BenchError, CanFrame, Result, Timestamp};
pub use waiter::{wait_for, wait_until, WaitOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
