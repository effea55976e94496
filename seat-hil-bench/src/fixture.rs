//! External HIL fixture
//!
//! The fixture powers the seat module and drives its analog inputs. The bench
//! only calls it; every effect of a stimulus is observed on the CAN bus.

use crate::frames::FaultCode;
use crate::types::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Analog fixture output wired to a seat module sensor input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalogChannel {
    /// Heater current sense input
    Current,
    /// Seat temperature sensor input
    Temperature,
}

impl fmt::Display for AnalogChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalogChannel::Current => write!(f, "CURRENT_INPUT"),
            AnalogChannel::Temperature => write!(f, "TEMP_INPUT"),
        }
    }
}

/// Fault conditions the bench injects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    OverCurrent,
    OverTemperature,
}

impl FaultKind {
    /// Fixture channel and voltage that provoke this fault
    ///
    /// 4.0 V corresponds to 15.7 A on the current input and 78.4 °C on the
    /// temperature input, both above the module's limits.
    pub fn stimulus(self) -> (AnalogChannel, f32) {
        match self {
            FaultKind::OverCurrent => (AnalogChannel::Current, 4.0),
            FaultKind::OverTemperature => (AnalogChannel::Temperature, 4.0),
        }
    }

    /// Code the module is expected to report in its `ErrorFrame`
    pub fn expected_code(self) -> FaultCode {
        match self {
            FaultKind::OverCurrent => FaultCode::OverCurrent,
            FaultKind::OverTemperature => FaultCode::OverTemperature,
        }
    }

    /// Human-readable condition for log lines
    pub fn condition(self) -> &'static str {
        match self {
            FaultKind::OverCurrent => "overcurrent condition (>10A)",
            FaultKind::OverTemperature => "over-temperature condition (>50°C)",
        }
    }
}

/// Hardware fixture around the device under test
pub trait HilFixture: Send {
    /// Reset the module and power it on
    fn power_cycle(&mut self) -> Result<()>;

    /// Drive an analog input to `volts`
    fn set_analog(&mut self, channel: AnalogChannel, volts: f32) -> Result<()>;

    /// Apply the stimulus for `fault`
    fn inject_fault(&mut self, fault: FaultKind) -> Result<()> {
        let (channel, volts) = fault.stimulus();
        self.set_analog(channel, volts)
    }
}

/// A call made to a [`LoggingFixture`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixtureCall {
    PowerCycle,
    SetAnalog(AnalogChannel, f32),
}

/// Fixture for dry runs: logs and records every call, drives nothing
#[derive(Debug, Default)]
pub struct LoggingFixture {
    calls: Vec<FixtureCall>,
}

impl LoggingFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[FixtureCall] {
        &self.calls
    }
}

impl HilFixture for LoggingFixture {
    fn power_cycle(&mut self) -> Result<()> {
        log::info!("Power cycling module (dry run)");
        self.calls.push(FixtureCall::PowerCycle);
        Ok(())
    }

    fn set_analog(&mut self, channel: AnalogChannel, volts: f32) -> Result<()> {
        log::info!("Setting analog channel {} to {:.2} V (dry run)", channel, volts);
        self.calls.push(FixtureCall::SetAnalog(channel, volts));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_stimulus_mapping() {
        assert_eq!(FaultKind::OverCurrent.stimulus(), (AnalogChannel::Current, 4.0));
        assert_eq!(FaultKind::OverTemperature.stimulus(), (AnalogChannel::Temperature, 4.0));
        assert_eq!(FaultKind::OverTemperature.expected_code(), FaultCode::OverTemperature);
    }

    #[test]
    fn test_logging_fixture_records_calls() {
        let mut fixture = LoggingFixture::new();
        fixture.power_cycle().unwrap();
        fixture.inject_fault(FaultKind::OverCurrent).unwrap();

        assert_eq!(
            fixture.calls(),
            &[
                FixtureCall::PowerCycle,
                FixtureCall::SetAnalog(AnalogChannel::Current, 4.0)
            ]
        );
    }
}
