#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use myrtio_light_fader::{
    ChannelId, Duration, LightEngineConfig, PinId, PwmDriver, PwmTimerConfig, StepPlan,
    TickTimer, TimerNumber,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutyWrite {
    Plain { channel: ChannelId, duty: u32 },
    Stepped { channel: ChannelId, base: u32, plan: StepPlan },
}

#[derive(Debug, Default)]
pub struct PwmLog {
    pub timer_config: Option<PwmTimerConfig>,
    pub channels: Vec<(ChannelId, PinId, TimerNumber)>,
    pub writes: Vec<DutyWrite>,
    pub commits: usize,
    pub pending: [u32; 8],
    pub duty: [u32; 8],
    pub reject_timer: bool,
    pub reject_channel: bool,
}

impl PwmLog {
    pub fn last_duty(&self, channel: ChannelId) -> u32 {
        self.duty[usize::from(channel)]
    }
}

/// PWM peripheral that records every call
#[derive(Debug, Clone, Default)]
pub struct FakePwm(pub Rc<RefCell<PwmLog>>);

impl PwmDriver for FakePwm {
    type Error = &'static str;

    fn configure_timer(&mut self, config: &PwmTimerConfig) -> Result<(), Self::Error> {
        let mut log = self.0.borrow_mut();
        if log.reject_timer {
            return Err("unsupported frequency");
        }
        log.timer_config = Some(*config);
        Ok(())
    }

    fn configure_channel(
        &mut self,
        channel: ChannelId,
        pin: PinId,
        timer: TimerNumber,
    ) -> Result<(), Self::Error> {
        let mut log = self.0.borrow_mut();
        if log.reject_channel {
            return Err("pin not routable");
        }
        log.channels.push((channel, pin, timer));
        Ok(())
    }

    fn write_duty(&mut self, channel: ChannelId, duty: u32, _hpoint: Option<u32>) {
        let mut log = self.0.borrow_mut();
        log.pending[usize::from(channel)] = duty;
        log.writes.push(DutyWrite::Plain { channel, duty });
    }

    fn write_stepped_duty(&mut self, channel: ChannelId, base: u32, plan: &StepPlan) {
        let mut log = self.0.borrow_mut();
        log.pending[usize::from(channel)] = plan.end_duty(base);
        log.writes.push(DutyWrite::Stepped {
            channel,
            base,
            plan: *plan,
        });
    }

    fn commit(&mut self, channel: ChannelId) {
        let mut log = self.0.borrow_mut();
        let index = usize::from(channel);
        log.duty[index] = log.pending[index];
        log.commits += 1;
    }

    fn read_duty(&self, channel: ChannelId) -> u32 {
        self.0.borrow().duty[usize::from(channel)]
    }
}

#[derive(Debug, Default)]
pub struct TimerLog {
    pub period: Option<Duration>,
    pub running: bool,
    pub starts: usize,
    pub stops: usize,
    pub reject: bool,
}

/// Tick timer that records start/stop calls
#[derive(Debug, Clone, Default)]
pub struct FakeTimer(pub Rc<RefCell<TimerLog>>);

impl TickTimer for FakeTimer {
    type Error = &'static str;

    fn configure(&mut self, period: Duration) -> Result<(), Self::Error> {
        let mut log = self.0.borrow_mut();
        if log.reject {
            return Err("period too long");
        }
        log.period = Some(period);
        Ok(())
    }

    fn start(&mut self) {
        let mut log = self.0.borrow_mut();
        log.running = true;
        log.starts += 1;
    }

    fn stop(&mut self) {
        let mut log = self.0.borrow_mut();
        log.running = false;
        log.stops += 1;
    }
}

/// 10 ms ticks with per-tick software stepping
pub fn ten_ms_config() -> LightEngineConfig {
    LightEngineConfig {
        tick_period: Duration::from_millis(10),
        ramp_margin: Duration::from_millis(5),
        hardware_ramp: false,
        ..LightEngineConfig::default()
    }
}
