//! Per-channel fade and blink state
//!
//! A channel is either idle, running a one-shot fade towards `target`, or
//! blinking between zero and `target` with a half period of `cycle_ticks`.
//! Every transition replaces the whole record, so a reader never sees a
//! step from one plan paired with the tick count of another.

use crate::fixed::{clamp_brightness, from_u8, to_u8};

/// Kind of duty write a tick asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickWrite {
    /// Write the new duty as is
    Settle,
    /// Move towards the new duty, optionally with a hardware ramp
    Ramp,
}

/// Fade/blink state of one PWM channel
///
/// All brightness fields are Q8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelState {
    current: i32,
    target: i32,
    step: i32,
    remaining_ticks: u32,
    cycle_ticks: u32,
}

impl ChannelState {
    pub const fn new() -> Self {
        Self {
            current: 0,
            target: 0,
            step: 0,
            remaining_ticks: 0,
            cycle_ticks: 0,
        }
    }

    /// Current Q8 brightness
    pub const fn current(&self) -> i32 {
        self.current
    }

    /// Q8 brightness the fade ends at, or the upper blink level
    pub const fn target(&self) -> i32 {
        self.target
    }

    /// Signed Q8 delta applied per tick
    pub const fn step(&self) -> i32 {
        self.step
    }

    /// Ticks left in the current segment
    pub const fn remaining_ticks(&self) -> u32 {
        self.remaining_ticks
    }

    /// Blink half period in ticks, zero when not blinking
    pub const fn cycle_ticks(&self) -> u32 {
        self.cycle_ticks
    }

    /// Current brightness as 8 bits
    pub const fn value(&self) -> u8 {
        to_u8(self.current)
    }

    pub const fn is_idle(&self) -> bool {
        self.remaining_ticks == 0 && self.cycle_ticks == 0
    }

    pub const fn is_blinking(&self) -> bool {
        self.cycle_ticks != 0
    }

    /// Start a one-shot fade from the current value to `value` over `ticks`
    ///
    /// The step truncates toward zero; the last tick writes `value` exactly.
    /// Any running fade or blink is replaced.
    #[allow(clippy::cast_possible_truncation)]
    pub fn fade_to(&mut self, value: u8, ticks: u32) {
        let ticks = ticks.max(1);
        let target = from_u8(value);
        let step = (i64::from(target - self.current) / i64::from(ticks)) as i32;

        *self = Self {
            current: self.current,
            target,
            step,
            remaining_ticks: ticks,
            cycle_ticks: 0,
        };
    }

    /// Start blinking between `value` and zero
    ///
    /// With `with_fade` the channel ramps down over the first half period and
    /// back up over the next; otherwise it snaps between the two levels.
    #[allow(clippy::cast_possible_truncation)]
    pub fn blink(&mut self, value: u8, half_period_ticks: u32, with_fade: bool) {
        let half = half_period_ticks.max(1);
        let level = from_u8(value);
        let (remaining_ticks, step) = if with_fade {
            let step = (i64::from(level) / i64::from(half)) as i32;
            (half, -step.max(i32::from(level > 0)))
        } else {
            (0, 0)
        };

        *self = Self {
            current: level,
            target: level,
            step,
            remaining_ticks,
            cycle_ticks: half,
        };
    }

    /// Cancel any fade or blink, keeping the current value
    pub fn stop(&mut self) {
        *self = Self {
            remaining_ticks: 0,
            cycle_ticks: 0,
            ..*self
        };
    }

    /// Advance by one tick
    ///
    /// Returns the write the tick requires, or `None` when idle.
    pub fn advance(&mut self) -> Option<TickWrite> {
        if self.remaining_ticks > 0 {
            self.remaining_ticks -= 1;
            if self.remaining_ticks == 0 {
                self.current = self.segment_end();
                return Some(TickWrite::Settle);
            }
            if self.step == 0 {
                return Some(TickWrite::Settle);
            }
            self.current = self.bounded(self.current + self.step);
            return Some(TickWrite::Ramp);
        }

        if self.cycle_ticks != 0 {
            self.remaining_ticks = self.cycle_ticks - 1;
            if self.step != 0 {
                self.step = -self.step;
                self.current = self.bounded(self.current + self.step);
                return Some(TickWrite::Ramp);
            }
            self.current = if self.current == self.target {
                0
            } else {
                self.target
            };
            return Some(TickWrite::Settle);
        }

        None
    }

    /// Keep a stepped value within the range of the running animation
    ///
    /// Blinks never leave `[0, target]`, even when the step was rounded up.
    const fn bounded(&self, value: i32) -> i32 {
        let value = clamp_brightness(value);
        if self.cycle_ticks != 0 && value > self.target {
            self.target
        } else {
            value
        }
    }

    /// Exact value the running segment lands on
    ///
    /// Fading blinks land on zero going down and on `target` going up, so
    /// every half period starts from an exact endpoint.
    const fn segment_end(&self) -> i32 {
        if self.cycle_ticks == 0 {
            self.target
        } else if self.step < 0 {
            0
        } else if self.step > 0 {
            self.target
        } else {
            self.current
        }
    }
}
