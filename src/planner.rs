//! Duty ramp planning
//!
//! Turns "go from duty A to duty B within N PWM cycles" into the parameters
//! of a hardware stepped-duty ramp: a direction, the duty units added per
//! step, the number of steps and the number of PWM cycles each step lasts.

/// Largest value the hardware accepts for any ramp parameter
pub const MAX_RAMP_PARAM: u32 = 1023;

/// Direction of a duty ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    /// Direction that moves `from` towards `to`
    pub const fn between(from: u32, to: u32) -> Self {
        if to < from {
            Self::Decrease
        } else {
            Self::Increase
        }
    }
}

/// Parameters of a stepped duty ramp
///
/// A plan with `step_count == 0` is an immediate jump to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    pub direction: Direction,
    /// Duty units added or removed per step
    pub step_units: u32,
    /// Number of steps
    pub step_count: u32,
    /// PWM cycles spent on each step
    pub cycles_per_step: u32,
}

impl StepPlan {
    /// Plan that jumps straight to the target
    pub const fn immediate(direction: Direction) -> Self {
        Self {
            direction,
            step_units: 0,
            step_count: 0,
            cycles_per_step: 1,
        }
    }

    /// Whether the plan is a single jump
    pub const fn is_immediate(&self) -> bool {
        self.step_count == 0
    }

    /// Total duty distance covered by the steps
    pub const fn covered(&self) -> u32 {
        self.step_units * self.step_count
    }

    /// Duty reached after all steps, starting at `base`
    pub const fn end_duty(&self, base: u32) -> u32 {
        match self.direction {
            Direction::Increase => base.saturating_add(self.covered()),
            Direction::Decrease => base.saturating_sub(self.covered()),
        }
    }
}

/// Plan a ramp from `current` to `target` lasting about `duration_cycles`
///
/// Long ramps use one duty unit per step and spread each step over several
/// cycles; short ramps move several units per cycle. Every parameter is
/// clamped to [`MAX_RAMP_PARAM`] and the step size is recomputed when the
/// step count saturates.
pub const fn plan_by_duration(current: u32, target: u32, duration_cycles: u32) -> StepPlan {
    let direction = Direction::between(current, target);
    let delta = current.abs_diff(target);

    if delta == 0 || duration_cycles == 0 {
        return StepPlan::immediate(direction);
    }

    let (step_units, cycles_per_step) = if duration_cycles > delta {
        (1, min(duration_cycles / delta, MAX_RAMP_PARAM))
    } else {
        (min(delta / duration_cycles, MAX_RAMP_PARAM), 1)
    };

    plan_by_step(direction, delta, step_units, cycles_per_step)
}

/// Plan a ramp covering `delta` with a given step size
pub const fn plan_by_step(
    direction: Direction,
    delta: u32,
    step_units: u32,
    cycles_per_step: u32,
) -> StepPlan {
    if step_units == 0 {
        return StepPlan::immediate(direction);
    }

    let mut step_units = step_units;
    let mut step_count = delta / step_units;
    if step_count > MAX_RAMP_PARAM {
        // Round the step up so the leftover stays below one step
        step_units = min(delta.div_ceil(MAX_RAMP_PARAM), MAX_RAMP_PARAM);
        step_count = min(delta / step_units, MAX_RAMP_PARAM);
    }

    if step_count == 0 {
        return StepPlan::immediate(direction);
    }

    StepPlan {
        direction,
        step_units,
        step_count,
        cycles_per_step,
    }
}

const fn min(a: u32, b: u32) -> u32 {
    if a < b { a } else { b }
}
