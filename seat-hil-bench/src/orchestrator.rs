//! Test orchestrator
//!
//! Sequences the boot-up test (TC-001) and the fault handling tests (TC-008)
//! against a running bench. Each case follows the same shape:
//!
//! ```text
//! INIT -> AWAIT_SIGNAL -> PASS | FAIL_TIMEOUT | FAIL_THRESHOLD
//! ```
//!
//! A failing case is reported and the sequence carries on with the next one.

use crate::bus::{BusMonitor, CanBus};
use crate::config::BenchConfig;
use crate::fixture::{FaultKind, HilFixture};
use crate::frames::FaultCode;
use crate::signal::{signal_channel, FaultSignal, ReadinessSignal, SignalReceiver};
use crate::summary::RunSummary;
use crate::types::Result;
use crate::waiter::{wait_for, wait_until, WaitOutcome};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Wait and pass limits of one test case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// How long to wait for the signal at all
    pub timeout: Duration,
    /// Latest acceptable arrival, measured from the start of the case
    pub threshold: Duration,
}

/// TC-001: `SystemReady` within 2 s of power-on, give up after 3 s
pub const BOOT_LIMITS: Limits = Limits {
    timeout: Duration::from_millis(3000),
    threshold: Duration::from_millis(2000),
};

/// TC-008: `ErrorFrame` within 100 ms of the fault, give up after 500 ms
pub const FAULT_LIMITS: Limits = Limits {
    timeout: Duration::from_millis(500),
    threshold: Duration::from_millis(100),
};

/// Terminal state of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    /// The signal never arrived
    FailTimeout,
    /// The signal arrived, but too late
    FailThreshold,
}

impl Verdict {
    pub fn is_pass(self) -> bool {
        self == Verdict::Pass
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASSED"),
            Verdict::FailTimeout => write!(f, "FAILED (timeout)"),
            Verdict::FailThreshold => write!(f, "FAILED (threshold exceeded)"),
        }
    }
}

/// The test cases of the suite, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestCase {
    BootUp,
    Fault(FaultKind),
}

impl TestCase {
    pub fn id(self) -> &'static str {
        match self {
            TestCase::BootUp => "TC-001",
            TestCase::Fault(_) => "TC-008",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TestCase::BootUp => "Boot-up Time Test",
            TestCase::Fault(FaultKind::OverCurrent) => "OverCurrent Fault Test",
            TestCase::Fault(FaultKind::OverTemperature) => "OverTemp Fault Test",
        }
    }

    pub fn limits(self) -> Limits {
        match self {
            TestCase::BootUp => BOOT_LIMITS,
            TestCase::Fault(_) => FAULT_LIMITS,
        }
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}

/// Recorded result of one test case
#[derive(Debug, Clone, PartialEq)]
pub struct TestOutcome {
    pub case: TestCase,
    pub verdict: Verdict,
    /// Time from the start of the case to the signal, if it arrived
    pub elapsed: Option<Duration>,
    /// Reported fault classification (fault cases only)
    pub fault_code: Option<FaultCode>,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        self.verdict.is_pass()
    }
}

/// Judge a resolved wait against the case limits
pub fn evaluate<T>(outcome: &WaitOutcome<T>, limits: Limits) -> Verdict {
    match outcome.elapsed() {
        None => Verdict::FailTimeout,
        Some(elapsed) if elapsed <= limits.threshold => Verdict::Pass,
        Some(_) => Verdict::FailThreshold,
    }
}

/// A running bench: bus monitor, signal receivers and fixture
pub struct Bench<F: HilFixture> {
    fixture: F,
    readiness: SignalReceiver<ReadinessSignal>,
    faults: SignalReceiver<FaultSignal>,
    monitor: BusMonitor,
}

impl<F: HilFixture> Bench<F> {
    /// Start listening on `bus` and take control of `fixture`
    pub fn new<B>(bus: B, fixture: F, config: &BenchConfig) -> Result<Self>
    where
        B: CanBus + 'static,
    {
        let (readiness_tx, readiness) = signal_channel();
        let (faults_tx, faults) = signal_channel();
        let monitor = BusMonitor::spawn(bus, config, readiness_tx, faults_tx)?;

        Ok(Self {
            fixture,
            readiness,
            faults,
            monitor,
        })
    }

    pub fn fixture(&self) -> &F {
        &self.fixture
    }

    /// TC-001: power-on to `SystemReady`
    pub fn run_boot_test(&mut self) -> TestOutcome {
        let case = TestCase::BootUp;
        log::info!("Starting {}", case);
        log::info!("Pre-condition - System reset");

        let start = Instant::now();
        self.readiness.reset();

        if let Err(e) = self.fixture.power_cycle() {
            log::error!("Power cycle failed: {}", e);
        }
        log::info!("Waiting for System Ready CAN message...");

        let outcome = wait_for(&self.readiness, start, BOOT_LIMITS.timeout);
        let verdict = evaluate(&outcome, BOOT_LIMITS);

        match &outcome {
            WaitOutcome::Observed { elapsed, .. } => {
                log::info!("System Ready message received");
                log::info!("Boot Duration: {:.2} ms", as_ms(*elapsed));
            }
            WaitOutcome::TimedOut => {
                log::info!(
                    "System Ready message not received within {} ms",
                    BOOT_LIMITS.timeout.as_millis()
                );
            }
        }
        log_verdict(case, verdict, outcome.elapsed());

        TestOutcome {
            case,
            verdict,
            elapsed: outcome.elapsed(),
            fault_code: None,
        }
    }

    /// TC-008: fault injection to `ErrorFrame`
    pub fn run_fault_test(&mut self, fault: FaultKind) -> TestOutcome {
        let case = TestCase::Fault(fault);
        log::info!("Starting {}", case);
        log::info!("Pre-condition - System in normal operation");

        let start = Instant::now();
        self.faults.reset();

        log::info!("Injecting {}", fault.condition());
        if let Err(e) = self.fixture.inject_fault(fault) {
            log::error!("Fault injection failed: {}", e);
        }

        let outcome = wait_until(&self.faults, start, FAULT_LIMITS.timeout, |signal| {
            let accepted = answers_fault(fault, signal.code);
            if !accepted {
                log::warn!(
                    "Ignoring {} while waiting for {}, left over from an earlier injection",
                    signal.code,
                    fault.expected_code()
                );
            }
            accepted
        });
        let verdict = evaluate(&outcome, FAULT_LIMITS);

        let fault_code = outcome.signal().map(|signal| signal.code);
        match &outcome {
            WaitOutcome::Observed { signal, elapsed } => {
                log::info!("Error frame received, code {}", signal.code);
                log::info!("Fault detection latency: {:.2} ms", as_ms(*elapsed));
                if signal.code != fault.expected_code() {
                    log::warn!(
                        "Unexpected fault classification: expected {}, got {}",
                        fault.expected_code(),
                        signal.code
                    );
                }
            }
            WaitOutcome::TimedOut => {
                log::info!(
                    "Error frame not received within {} ms",
                    FAULT_LIMITS.timeout.as_millis()
                );
            }
        }
        log_verdict(case, verdict, outcome.elapsed());

        TestOutcome {
            case,
            verdict,
            elapsed: outcome.elapsed(),
            fault_code,
        }
    }

    /// Boot-up, then over-current, then over-temperature
    pub fn run_suite(&mut self) -> RunSummary {
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(3);

        log::info!(">>> EXECUTING TEST SUITE: INITIALIZATION");
        outcomes.push(self.run_boot_test());

        log::info!(">>> EXECUTING TEST SUITE: FAULT HANDLING");
        log::info!("Step 1: Testing OverCurrent Fault...");
        outcomes.push(self.run_fault_test(FaultKind::OverCurrent));
        log::info!("Step 2: Testing OverTemperature Fault...");
        outcomes.push(self.run_fault_test(FaultKind::OverTemperature));

        RunSummary::new(started_at, Utc::now(), outcomes)
    }

    /// Stop the bus monitor and hand back the fixture
    pub fn shutdown(mut self) -> F {
        self.monitor.stop();
        self.fixture
    }
}

/// Whether an `ErrorFrame` with `code` can be the reaction to `fault`
///
/// The classification of another injectable fault can only come from an
/// earlier stimulus. Bus failures and unlisted codes are still accepted.
fn answers_fault(fault: FaultKind, code: FaultCode) -> bool {
    match code {
        FaultCode::OverCurrent | FaultCode::OverTemperature => code == fault.expected_code(),
        FaultCode::BusFailure | FaultCode::Unknown(_) => true,
    }
}

fn log_verdict(case: TestCase, verdict: Verdict, elapsed: Option<Duration>) {
    let threshold_ms = case.limits().threshold.as_millis();
    match (verdict, elapsed) {
        (Verdict::Pass, _) => log::info!("PASS - {} within {} ms limit", case.name(), threshold_ms),
        (Verdict::FailThreshold, Some(elapsed)) => log::info!(
            "FAIL - {} exceeds {} ms limit. Expected: <={} ms, Got: {:.2} ms",
            case.name(),
            threshold_ms,
            threshold_ms,
            as_ms(elapsed)
        ),
        _ => log::info!("FAIL - {} timed out", case.name()),
    }
}

fn as_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
