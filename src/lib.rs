#![no_std]

pub mod config;
pub mod engine;
pub mod error;
pub mod fade;
pub mod fixed;
pub mod gamma;
pub mod planner;
pub mod scheduler;

pub use config::{ClockSource, LightEngineConfig, PwmTimerConfig, SpeedMode, TimerNumber};
pub use engine::LightEngine;
pub use error::Error;
pub use fade::{ChannelState, TickWrite};
pub use gamma::{GAMMA_TABLE_SIZE, GammaTable};
pub use planner::{Direction, StepPlan, plan_by_duration};
pub use scheduler::TickScheduler;
pub use embassy_time::Duration;

/// PWM channel index
pub type ChannelId = u8;

/// Output pin number
pub type PinId = u8;

/// Abstract PWM peripheral
///
/// Implement this trait to support different hardware platforms.
/// Duty writes are called from the tick interrupt and must not block.
pub trait PwmDriver {
    type Error: core::fmt::Debug;

    /// Configure the timer that clocks all channels
    fn configure_timer(&mut self, config: &PwmTimerConfig) -> Result<(), Self::Error>;

    /// Route a channel to an output pin, clocked by `timer`
    fn configure_channel(
        &mut self,
        channel: ChannelId,
        pin: PinId,
        timer: TimerNumber,
    ) -> Result<(), Self::Error>;

    /// Set the pending duty, optionally moving the high point
    fn write_duty(&mut self, channel: ChannelId, duty: u32, hpoint: Option<u32>);

    /// Ramp the duty in hardware starting at `base`
    ///
    /// Peripherals without a ramp unit can keep the default, which jumps
    /// to where the ramp would end.
    fn write_stepped_duty(&mut self, channel: ChannelId, base: u32, plan: &StepPlan) {
        self.write_duty(channel, plan.end_duty(base), None);
    }

    /// Latch the pending duty
    fn commit(&mut self, channel: ChannelId);

    /// Duty currently output by the channel
    fn read_duty(&self, channel: ChannelId) -> u32;
}

/// Periodic timer driving the fade ticks
///
/// The platform interrupt handler for this timer must call
/// [`LightEngine::on_tick`] once per period.
pub trait TickTimer {
    type Error: core::fmt::Debug;

    fn configure(&mut self, period: Duration) -> Result<(), Self::Error>;

    fn start(&mut self);

    fn stop(&mut self);
}
