//! Tick scheduling
//!
//! Runs from the fade timer interrupt. Each tick walks the channels in id
//! order and, per channel, advances the fade/blink state, looks up the gamma
//! corrected duty and writes and commits it, all inside one critical section.

use core::cell::{Cell, RefCell};

use critical_section::Mutex;

use crate::config::LightEngineConfig;
use crate::fade::{ChannelState, TickWrite};
use crate::gamma::GammaTable;
use crate::planner::plan_by_duration;
use crate::{ChannelId, PinId, PwmDriver};

/// Channel state plus the pin it was registered with
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ChannelSlot {
    pub(crate) state: ChannelState,
    pub(crate) pin: Option<PinId>,
}

/// Per-tick channel walker
#[derive(Debug, Clone, Copy)]
pub struct TickScheduler {
    duty_range: u32,
    ramp_cycles: u32,
    hardware_ramp: bool,
}

impl TickScheduler {
    pub fn new(config: &LightEngineConfig) -> Self {
        let ramp_ms = config
            .tick_period
            .checked_sub(config.ramp_margin)
            .map_or(0, |window| window.as_millis());
        let ramp_cycles = ramp_ms * u64::from(config.pwm.frequency_hz) / 1000;

        Self {
            duty_range: config.pwm.duty_range(),
            ramp_cycles: u32::try_from(ramp_cycles).unwrap_or(u32::MAX),
            hardware_ramp: config.hardware_ramp,
        }
    }

    /// PWM cycles available to a hardware ramp within one tick
    pub const fn ramp_cycles(&self) -> u32 {
        self.ramp_cycles
    }

    /// Run one tick over all channels
    ///
    /// Returns the number of channels still animating afterwards.
    pub(crate) fn run<P: PwmDriver>(
        &self,
        channels: &[Mutex<Cell<ChannelSlot>>],
        gamma: &Mutex<RefCell<GammaTable>>,
        pwm: &Mutex<RefCell<P>>,
    ) -> usize {
        let mut active = 0;
        for (id, slot) in channels.iter().enumerate() {
            let Ok(channel) = ChannelId::try_from(id) else {
                break;
            };
            critical_section::with(|cs| {
                let cell = slot.borrow(cs);
                let mut current = cell.get();
                let Some(write) = current.state.advance() else {
                    return;
                };
                cell.set(current);

                let gamma = gamma.borrow_ref(cs);
                let mut pwm = pwm.borrow_ref_mut(cs);
                self.write(channel, &current.state, write, &gamma, &mut *pwm);

                if !current.state.is_idle() {
                    active += 1;
                }
            });
        }
        active
    }

    /// Write and latch the duty for a freshly advanced channel
    pub(crate) fn write<P: PwmDriver>(
        &self,
        channel: ChannelId,
        state: &ChannelState,
        write: TickWrite,
        gamma: &GammaTable,
        pwm: &mut P,
    ) {
        let duty = gamma.duty(state.current(), self.duty_range);

        match write {
            TickWrite::Ramp if self.hardware_ramp => {
                let base = pwm.read_duty(channel);
                let plan = plan_by_duration(base, duty, self.ramp_cycles);
                if plan.is_immediate() {
                    pwm.write_duty(channel, duty, None);
                } else {
                    pwm.write_stepped_duty(channel, base, &plan);
                }
            }
            _ => pwm.write_duty(channel, duty, None),
        }

        pwm.commit(channel);
    }
}

#[cfg(test)]
mod tests {
    use embassy_time::Duration;

    use super::*;

    #[test]
    fn test_ramp_cycles_from_config() {
        let scheduler = TickScheduler::new(&LightEngineConfig::default());
        assert_eq!(scheduler.ramp_cycles(), 50);
    }

    #[test]
    fn test_margin_longer_than_tick_disables_ramp_window() {
        let config = LightEngineConfig {
            tick_period: Duration::from_millis(10),
            ramp_margin: Duration::from_millis(30),
            ..LightEngineConfig::default()
        };
        let scheduler = TickScheduler::new(&config);
        assert_eq!(scheduler.ramp_cycles(), 0);
    }
}
