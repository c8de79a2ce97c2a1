//! Engine and PWM timer configuration

use embassy_time::Duration;

use crate::error::Error;
use crate::gamma::DEFAULT_GAMMA_CORRECTION;

/// Default tick period of the fade timer
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(20);

/// Part of each tick left free after a hardware ramp finishes
pub const DEFAULT_RAMP_MARGIN: Duration = Duration::from_millis(10);

/// Highest supported duty resolution
pub const MAX_DUTY_RESOLUTION_BITS: u8 = 20;

/// PWM timer driving the registered channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerNumber {
    Timer0,
    Timer1,
    Timer2,
    Timer3,
}

/// PWM speed mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedMode {
    HighSpeed,
    LowSpeed,
}

/// PWM timer clock source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    Auto,
    Apb,
    RefTick,
    Rtc8M,
}

/// PWM timer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmTimerConfig {
    pub timer: TimerNumber,
    pub speed_mode: SpeedMode,
    pub frequency_hz: u32,
    pub clock_source: ClockSource,
    pub duty_resolution_bits: u8,
}

impl PwmTimerConfig {
    /// Full-scale duty value
    pub const fn duty_range(&self) -> u32 {
        1 << self.duty_resolution_bits
    }
}

impl Default for PwmTimerConfig {
    fn default() -> Self {
        Self {
            timer: TimerNumber::Timer0,
            speed_mode: SpeedMode::LowSpeed,
            frequency_hz: 5000,
            clock_source: ClockSource::Auto,
            duty_resolution_bits: 13,
        }
    }
}

/// Configuration for the light engine
#[derive(Debug, Clone, Copy)]
pub struct LightEngineConfig {
    pub pwm: PwmTimerConfig,
    /// Period of the fade timer interrupt
    pub tick_period: Duration,
    /// Time left idle at the end of each tick when ramping in hardware
    pub ramp_margin: Duration,
    /// Gamma exponent used to build the initial table
    pub gamma_correction: f32,
    /// Let the PWM peripheral ramp between ticks
    pub hardware_ramp: bool,
}

impl LightEngineConfig {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        let bits = self.pwm.duty_resolution_bits;
        if self.pwm.frequency_hz == 0 || bits == 0 || bits > MAX_DUTY_RESOLUTION_BITS {
            return Err(Error::InvalidConfig);
        }
        if self.tick_period.as_millis() == 0 || self.ramp_margin >= self.tick_period {
            return Err(Error::InvalidConfig);
        }
        if !self.gamma_correction.is_finite() || self.gamma_correction <= 0.0 {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }
}

impl Default for LightEngineConfig {
    fn default() -> Self {
        Self {
            pwm: PwmTimerConfig::default(),
            tick_period: DEFAULT_TICK_PERIOD,
            ramp_margin: DEFAULT_RAMP_MARGIN,
            gamma_correction: DEFAULT_GAMMA_CORRECTION,
            hardware_ramp: true,
        }
    }
}
