//! Simulated seat comfort module
//!
//! Stands in for the real ECU and fixture on the virtual bus: it announces
//! readiness some time after a power cycle and sends an `ErrorFrame` when an
//! analog input is driven past its limit.

use crate::bus::VirtualBusSender;
use crate::fixture::{AnalogChannel, HilFixture};
use crate::frames::{ErrorFrame, FaultCode, SystemReady, ERROR_FRAME_ID, SYSTEM_READY_ID};
use crate::types::{CanFrame, Result};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::{Duration, Instant};

// Analog input transfer functions
const AMPS_PER_VOLT: f32 = 3.925;
const CELSIUS_PER_VOLT: f32 = 19.6;

// Module fault limits
const CURRENT_LIMIT_A: f32 = 10.0;
const TEMPERATURE_LIMIT_C: f32 = 50.0;

/// Timing and behaviour of the simulated module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Delay between power-on and the `SystemReady` message
    #[serde(default = "default_boot_delay")]
    pub boot_delay_ms: u64,

    /// Delay between a limit violation and the `ErrorFrame`
    #[serde(default = "default_fault_latency")]
    pub fault_latency_ms: u64,

    /// Whether `SystemReady` is sent at all
    #[serde(default = "default_true")]
    pub emit_ready: bool,

    /// Whether fault conditions produce an `ErrorFrame` at all
    #[serde(default = "default_true")]
    pub emit_error_frames: bool,
}

fn default_boot_delay() -> u64 {
    850
}

fn default_fault_latency() -> u64 {
    40
}

fn default_true() -> bool {
    true
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            boot_delay_ms: default_boot_delay(),
            fault_latency_ms: default_fault_latency(),
            emit_ready: true,
            emit_error_frames: true,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boot_delay_ms(mut self, delay_ms: u64) -> Self {
        self.boot_delay_ms = delay_ms;
        self
    }

    pub fn with_fault_latency_ms(mut self, latency_ms: u64) -> Self {
        self.fault_latency_ms = latency_ms;
        self
    }

    pub fn with_ready(mut self, enabled: bool) -> Self {
        self.emit_ready = enabled;
        self
    }

    pub fn with_error_frames(mut self, enabled: bool) -> Self {
        self.emit_error_frames = enabled;
        self
    }
}

/// Simulated seat module driven through the fixture interface
pub struct SimulatedSeatModule {
    bus: VirtualBusSender,
    config: SimulationConfig,
    channel: u8,
    powered_on_at: Option<Instant>,
}

impl SimulatedSeatModule {
    pub fn new(bus: VirtualBusSender, config: SimulationConfig) -> Self {
        Self {
            bus,
            config,
            channel: 0,
            powered_on_at: None,
        }
    }

    /// Builder method: bus channel the module transmits on
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Idle status reported once boot-up completes
    fn idle_status() -> SystemReady {
        SystemReady {
            heating_status: 0,
            massage_status: 0,
            current: 1,
            // about 25 °C
            temperature: 64,
            pressure: 0,
            error_flags: 0,
        }
    }

    fn raise_fault(&self, code: FaultCode, powered_on_at: Instant) -> Result<()> {
        if !self.config.emit_error_frames {
            log::debug!("Simulated module suppresses ErrorFrame for {}", code);
            return Ok(());
        }

        let latency = Duration::from_millis(self.config.fault_latency_ms);
        let uptime_ms = (powered_on_at.elapsed() + latency).as_millis();
        let error = ErrorFrame {
            error_code: code.to_byte(),
            timestamp_ms: u16::try_from(uptime_ms).unwrap_or(u16::MAX),
        };

        log::debug!("Simulated module reports {} in {} ms", code, latency.as_millis());
        self.schedule(ERROR_FRAME_ID, error.to_payload(), latency)
    }

    /// Send a frame after `delay` from a short-lived timer thread
    fn schedule(&self, can_id: u32, payload: [u8; 8], delay: Duration) -> Result<()> {
        let bus = self.bus.clone();
        let channel = self.channel;
        thread::Builder::new()
            .name("sim-timer".to_string())
            .spawn(move || {
                thread::sleep(delay);
                if bus.send(CanFrame::new(can_id, payload).on_channel(channel)).is_err() {
                    log::debug!("Virtual bus closed before frame 0x{:X} was sent", can_id);
                }
            })?;
        Ok(())
    }
}

impl HilFixture for SimulatedSeatModule {
    fn power_cycle(&mut self) -> Result<()> {
        log::info!("Simulated module powered on");
        self.powered_on_at = Some(Instant::now());

        if !self.config.emit_ready {
            log::debug!("Simulated module suppresses SystemReady");
            return Ok(());
        }

        let delay = Duration::from_millis(self.config.boot_delay_ms);
        self.schedule(SYSTEM_READY_ID, Self::idle_status().to_payload(), delay)
    }

    fn set_analog(&mut self, channel: AnalogChannel, volts: f32) -> Result<()> {
        log::info!("Setting analog channel {} to {:.2} V", channel, volts);

        let Some(powered_on_at) = self.powered_on_at else {
            log::warn!("Simulated module is not powered, ignoring stimulus");
            return Ok(());
        };

        match channel {
            AnalogChannel::Current => {
                let amps = volts * AMPS_PER_VOLT;
                log::debug!("Simulated current: {:.1} A", amps);
                if amps > CURRENT_LIMIT_A {
                    self.raise_fault(FaultCode::OverCurrent, powered_on_at)?;
                }
            }
            AnalogChannel::Temperature => {
                let celsius = volts * CELSIUS_PER_VOLT;
                log::debug!("Simulated temperature: {:.1} °C", celsius);
                if celsius > TEMPERATURE_LIMIT_C {
                    self.raise_fault(FaultCode::OverTemperature, powered_on_at)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{virtual_bus, CanBus};
    use crate::fixture::FaultKind;

    #[test]
    fn test_power_cycle_sends_system_ready() {
        let (tx, mut bus) = virtual_bus();
        let mut module = SimulatedSeatModule::new(tx, SimulationConfig::new().with_boot_delay_ms(5));

        module.power_cycle().unwrap();

        let frame = bus.recv_timeout(Duration::from_secs(1)).unwrap().expect("frame");
        assert_eq!(frame.can_id, SYSTEM_READY_ID);
        assert_eq!(frame.channel, 0);
        assert_eq!(SystemReady::from_payload(&frame.data).unwrap(), SimulatedSeatModule::idle_status());
    }

    #[test]
    fn test_over_temperature_sends_error_frame() {
        let (tx, mut bus) = virtual_bus();
        let config = SimulationConfig::new().with_ready(false).with_fault_latency_ms(5);
        let mut module = SimulatedSeatModule::new(tx, config);

        module.power_cycle().unwrap();
        module.inject_fault(FaultKind::OverTemperature).unwrap();

        let frame = bus.recv_timeout(Duration::from_secs(1)).unwrap().expect("frame");
        assert_eq!(frame.can_id, ERROR_FRAME_ID);
        let error = ErrorFrame::from_payload(&frame.data).unwrap();
        assert_eq!(error.fault_code(), FaultCode::OverTemperature);
    }

    #[test]
    fn test_frames_carry_configured_channel() {
        let (tx, mut bus) = virtual_bus();
        let config = SimulationConfig::new().with_boot_delay_ms(1).with_fault_latency_ms(1);
        let mut module = SimulatedSeatModule::new(tx, config).with_channel(2);

        module.power_cycle().unwrap();
        let ready = bus.recv_timeout(Duration::from_secs(1)).unwrap().expect("frame");
        module.inject_fault(FaultKind::OverCurrent).unwrap();
        let error = bus.recv_timeout(Duration::from_secs(1)).unwrap().expect("frame");

        assert_eq!(ready.channel, 2);
        assert_eq!(error.channel, 2);
    }

    #[test]
    fn test_below_limit_is_quiet() {
        let (tx, mut bus) = virtual_bus();
        let config = SimulationConfig::new().with_ready(false).with_fault_latency_ms(1);
        let mut module = SimulatedSeatModule::new(tx, config);

        module.power_cycle().unwrap();
        // 2.0 V is about 7.9 A
        module.set_analog(AnalogChannel::Current, 2.0).unwrap();

        assert!(bus.recv_timeout(Duration::from_millis(50)).unwrap().is_none());
    }

    #[test]
    fn test_unpowered_module_ignores_stimulus() {
        let (tx, mut bus) = virtual_bus();
        let mut module = SimulatedSeatModule::new(tx, SimulationConfig::new().with_fault_latency_ms(1));

        module.inject_fault(FaultKind::OverCurrent).unwrap();

        assert!(bus.recv_timeout(Duration::from_millis(50)).unwrap().is_none());
    }
}
