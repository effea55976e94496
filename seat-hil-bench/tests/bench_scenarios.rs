// End-to-end bench runs on the virtual bus
use seat_hil_bench::{
    virtual_bus, AnalogChannel, Bench, BenchConfig, CanFrame, ErrorFrame, FaultCode, FaultKind,
    HilFixture, SimulatedSeatModule, SimulationConfig, SystemReady, TestCase, Verdict,
    VirtualBusSender, ERROR_FRAME_ID, SYSTEM_READY_ID,
};
use std::thread;
use std::time::{Duration, Instant};

/// Fixture that answers each call with frames stamped at fixed offsets
struct ScriptedFixture {
    bus: VirtualBusSender,
    ready_after: Vec<Duration>,
    fault_after: Option<(Duration, u8)>,
    fault_before: Option<Duration>,
}

impl ScriptedFixture {
    fn new(bus: VirtualBusSender) -> Self {
        Self {
            bus,
            ready_after: Vec::new(),
            fault_after: None,
            fault_before: None,
        }
    }
}

impl HilFixture for ScriptedFixture {
    fn power_cycle(&mut self) -> seat_hil_bench::Result<()> {
        let now = Instant::now();
        for offset in self.ready_after.drain(..) {
            let payload = SystemReady {
                heating_status: 0,
                massage_status: 0,
                current: 0,
                temperature: 0,
                pressure: 0,
                error_flags: 0,
            }
            .to_payload();
            self.bus.send(CanFrame::with_timestamp(SYSTEM_READY_ID, payload, now + offset))?;
        }
        Ok(())
    }

    fn set_analog(&mut self, _channel: AnalogChannel, _volts: f32) -> seat_hil_bench::Result<()> {
        if let Some((offset, code)) = self.fault_after {
            let error = ErrorFrame { error_code: code, timestamp_ms: 0 };
            let frame = CanFrame::with_timestamp(ERROR_FRAME_ID, error.to_payload(), Instant::now() + offset);
            self.bus.send(frame)?;
        }
        if let Some(age) = self.fault_before {
            let error = ErrorFrame { error_code: 1, timestamp_ms: 0 };
            let frame = CanFrame::with_timestamp(ERROR_FRAME_ID, error.to_payload(), Instant::now() - age);
            self.bus.send(frame)?;
        }
        Ok(())
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scripted_bench(configure: impl FnOnce(&mut ScriptedFixture)) -> Bench<ScriptedFixture> {
    init_logging();
    let (bus_tx, bus) = virtual_bus();
    let mut fixture = ScriptedFixture::new(bus_tx);
    configure(&mut fixture);
    Bench::new(bus, fixture, &BenchConfig::new()).unwrap()
}

fn simulated_bench(config: SimulationConfig) -> Bench<SimulatedSeatModule> {
    init_logging();
    let (bus_tx, bus) = virtual_bus();
    let module = SimulatedSeatModule::new(bus_tx, config);
    Bench::new(bus, module, &BenchConfig::new().with_payload_logging(false)).unwrap()
}

#[test]
fn boot_ready_at_1500ms_passes() {
    let mut bench = scripted_bench(|f| f.ready_after = vec![Duration::from_millis(1500)]);

    let outcome = bench.run_boot_test();

    assert_eq!(outcome.case, TestCase::BootUp);
    assert_eq!(outcome.verdict, Verdict::Pass);
    assert!(outcome.elapsed.unwrap() >= Duration::from_millis(1500));
}

#[test]
fn boot_ready_at_2500ms_exceeds_threshold() {
    let mut bench = scripted_bench(|f| f.ready_after = vec![Duration::from_millis(2500)]);

    let outcome = bench.run_boot_test();

    assert_eq!(outcome.verdict, Verdict::FailThreshold);
    assert!(outcome.elapsed.unwrap() >= Duration::from_millis(2500));
}

#[test]
fn boot_without_ready_times_out() {
    let mut bench = scripted_bench(|_| {});
    let start = Instant::now();

    let outcome = bench.run_boot_test();

    assert_eq!(outcome.verdict, Verdict::FailTimeout);
    assert_eq!(outcome.elapsed, None);
    assert!(start.elapsed() >= Duration::from_millis(3000));
}

#[test]
fn fault_at_80ms_with_code_1_passes_as_overcurrent() {
    let mut bench = scripted_bench(|f| f.fault_after = Some((Duration::from_millis(80), 1)));

    let outcome = bench.run_fault_test(FaultKind::OverCurrent);

    assert_eq!(outcome.case, TestCase::Fault(FaultKind::OverCurrent));
    assert_eq!(outcome.verdict, Verdict::Pass);
    assert_eq!(outcome.fault_code, Some(FaultCode::OverCurrent));
}

#[test]
fn late_fault_exceeds_threshold() {
    let mut bench = scripted_bench(|f| f.fault_after = Some((Duration::from_millis(150), 2)));

    let outcome = bench.run_fault_test(FaultKind::OverTemperature);

    assert_eq!(outcome.verdict, Verdict::FailThreshold);
    assert_eq!(outcome.fault_code, Some(FaultCode::OverTemperature));
}

#[test]
fn unexpected_fault_code_keeps_verdict() {
    let mut bench = scripted_bench(|f| f.fault_after = Some((Duration::from_millis(10), 0x42)));

    let outcome = bench.run_fault_test(FaultKind::OverCurrent);

    assert_eq!(outcome.verdict, Verdict::Pass);
    assert_eq!(outcome.fault_code, Some(FaultCode::Unknown(0x42)));
}

#[test]
fn stale_readiness_is_discarded_before_the_wait() {
    // First power cycle produces two SystemReady frames, the second is stale
    let mut bench = scripted_bench(|f| {
        f.ready_after = vec![Duration::from_millis(5), Duration::from_millis(6)]
    });

    assert_eq!(bench.run_boot_test().verdict, Verdict::Pass);
    thread::sleep(Duration::from_millis(50));

    // Second power cycle sends nothing
    assert_eq!(bench.run_boot_test().verdict, Verdict::FailTimeout);
}

#[test]
fn fault_received_before_the_case_does_not_count() {
    let mut bench = scripted_bench(|f| f.fault_before = Some(Duration::from_millis(300)));

    let outcome = bench.run_fault_test(FaultKind::OverCurrent);

    assert_eq!(outcome.verdict, Verdict::FailTimeout);
    assert_eq!(outcome.elapsed, None);
    assert_eq!(outcome.fault_code, None);
}

#[test]
fn simulated_module_passes_full_suite() {
    let config = SimulationConfig::new()
        .with_boot_delay_ms(50)
        .with_fault_latency_ms(20);
    let mut bench = simulated_bench(config);

    let summary = bench.run_suite();

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.passed(), 3);
    assert!(summary.all_passed());
    assert_eq!(summary.outcomes[1].fault_code, Some(FaultCode::OverCurrent));
    assert_eq!(summary.outcomes[2].fault_code, Some(FaultCode::OverTemperature));
}

#[test]
fn silent_module_fails_faults_without_aborting() {
    let config = SimulationConfig::new()
        .with_boot_delay_ms(20)
        .with_error_frames(false);
    let mut bench = simulated_bench(config);

    let summary = bench.run_suite();

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.passed(), 1);
    assert_eq!(summary.outcomes[0].verdict, Verdict::Pass);
    assert_eq!(summary.outcomes[1].verdict, Verdict::FailTimeout);
    assert_eq!(summary.outcomes[2].verdict, Verdict::FailTimeout);
    assert!(!summary.all_passed());
}

#[test]
fn slow_fault_reaction_exceeds_threshold() {
    let config = SimulationConfig::new()
        .with_boot_delay_ms(10)
        .with_fault_latency_ms(200);
    let mut bench = simulated_bench(config);

    bench.run_boot_test();
    let outcome = bench.run_fault_test(FaultKind::OverTemperature);

    assert_eq!(outcome.verdict, Verdict::FailThreshold);
    assert!(outcome.elapsed.unwrap() >= Duration::from_millis(200));
}

#[test]
fn late_overcurrent_frame_is_not_credited_to_overtemperature() {
    // Each ErrorFrame lands just after its own 500 ms wait
    let config = SimulationConfig::new()
        .with_boot_delay_ms(10)
        .with_fault_latency_ms(540);
    let mut bench = simulated_bench(config);

    let summary = bench.run_suite();

    assert_eq!(summary.outcomes[1].verdict, Verdict::FailTimeout);
    assert_eq!(summary.outcomes[2].verdict, Verdict::FailTimeout);
    assert_eq!(summary.outcomes[2].fault_code, None);
    assert_eq!(summary.passed(), 1);
}

#[test]
fn simulated_module_on_a_filtered_channel() {
    init_logging();
    let (bus_tx, bus) = virtual_bus();
    let module = SimulatedSeatModule::new(bus_tx, SimulationConfig::new().with_boot_delay_ms(10))
        .with_channel(1);
    let config = BenchConfig::new().with_channel_filter(vec![1]);
    let mut bench = Bench::new(bus, module, &config).unwrap();

    assert_eq!(bench.run_boot_test().verdict, Verdict::Pass);
}
