use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::{CriticalSection, Mutex};
use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::config::LightEngineConfig;
use crate::error::Error;
use crate::fade::ChannelState;
use crate::fixed::duration_to_ticks;
use crate::gamma::{GAMMA_TABLE_SIZE, GammaTable};
use crate::scheduler::{ChannelSlot, TickScheduler};
use crate::{ChannelId, PinId, PwmDriver, TickTimer};

/// Number of channels of an LEDC peripheral
pub const DEFAULT_CHANNELS: usize = 8;

/// Light Engine - owns the channels, the gamma table and both peripherals
///
/// Foreground calls and [`LightEngine::on_tick`] may run concurrently (the
/// latter from an interrupt). Each call reads and republishes a whole channel
/// record inside one critical section, so a tick only ever sees complete
/// fade/blink plans.
pub struct LightEngine<P: PwmDriver, T: TickTimer, const CHANNELS: usize = DEFAULT_CHANNELS> {
    // External dependencies and configuration
    pwm: Mutex<RefCell<P>>,
    timer: Mutex<RefCell<T>>,
    config: LightEngineConfig,
    scheduler: TickScheduler,

    // Internal state
    timer_running: AtomicBool,
    gamma: Mutex<RefCell<GammaTable>>,
    channels: [Mutex<Cell<ChannelSlot>>; CHANNELS],
}

impl<P: PwmDriver, T: TickTimer, const CHANNELS: usize> LightEngine<P, T, CHANNELS> {
    /// Configure the PWM timer and the tick timer and build the gamma table
    ///
    /// The tick timer is configured but left stopped until a channel starts
    /// animating.
    pub fn init(config: LightEngineConfig, mut pwm: P, mut timer: T) -> Result<Self, Error> {
        config.validate()?;
        if CHANNELS > usize::from(ChannelId::MAX) + 1 {
            return Err(Error::InvalidConfig);
        }
        let gamma = GammaTable::build(config.gamma_correction)?;

        pwm.configure_timer(&config.pwm).map_err(|_err| {
            #[cfg(feature = "esp32-log")]
            println!("[LightEngine.init] PWM timer configuration failed: {:?}", _err);
            Error::Pwm
        })?;
        timer.configure(config.tick_period).map_err(|_err| {
            #[cfg(feature = "esp32-log")]
            println!("[LightEngine.init] tick timer configuration failed: {:?}", _err);
            Error::Timer
        })?;

        #[cfg(feature = "esp32-log")]
        println!(
            "[LightEngine.init] {} channels, {:?} ticks, {} bit duty",
            CHANNELS, config.tick_period, config.pwm.duty_resolution_bits
        );

        Ok(Self {
            pwm: Mutex::new(RefCell::new(pwm)),
            timer: Mutex::new(RefCell::new(timer)),
            scheduler: TickScheduler::new(&config),
            config,
            timer_running: AtomicBool::new(false),
            gamma: Mutex::new(RefCell::new(gamma)),
            channels: core::array::from_fn(|_| Mutex::new(Cell::new(ChannelSlot::default()))),
        })
    }

    /// Stop the tick timer and hand the peripherals back
    pub fn deinit(self) -> (P, T) {
        let mut timer = self.timer.into_inner().into_inner();
        if self.timer_running.load(Ordering::Acquire) {
            timer.stop();
        }
        (self.pwm.into_inner().into_inner(), timer)
    }

    pub const fn config(&self) -> &LightEngineConfig {
        &self.config
    }

    pub const fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    /// Route `channel` to `pin` on the engine's PWM timer
    pub fn register_channel(&self, channel: ChannelId, pin: PinId) -> Result<(), Error> {
        let slot = self.slot(channel)?;
        critical_section::with(|cs| {
            self.pwm
                .borrow_ref_mut(cs)
                .configure_channel(channel, pin, self.config.pwm.timer)
                .map_err(|_err| {
                    #[cfg(feature = "esp32-log")]
                    println!(
                        "[LightEngine.register_channel] channel {} configuration failed: {:?}",
                        channel, _err
                    );
                    Error::Pwm
                })?;

            let cell = slot.borrow(cs);
            cell.set(ChannelSlot {
                pin: Some(pin),
                ..cell.get()
            });
            Ok(())
        })?;

        #[cfg(feature = "esp32-log")]
        println!("[LightEngine.register_channel] channel {} on pin {}", channel, pin);
        Ok(())
    }

    /// Pin a channel was registered with
    pub fn pin(&self, channel: ChannelId) -> Option<PinId> {
        let slot = self.slot(channel).ok()?;
        critical_section::with(|cs| slot.borrow(cs).get().pin)
    }

    /// Fade `channel` to `value` over `fade`
    ///
    /// Durations shorter than one tick jump on the next tick. A running fade
    /// or blink is replaced, starting from the current value.
    pub fn set_value(&self, channel: ChannelId, value: u8, fade: Duration) -> Result<(), Error> {
        let ticks = duration_to_ticks(fade.as_millis(), self.tick_millis());
        self.update(channel, true, |state| state.fade_to(value, ticks))
    }

    /// Blink `channel` between `value` and zero with the given period
    pub fn start_blink(
        &self,
        channel: ChannelId,
        value: u8,
        period: Duration,
        with_fade: bool,
    ) -> Result<(), Error> {
        let half = period.as_millis() / 2 / self.tick_millis();
        let half = u32::try_from(half).unwrap_or(u32::MAX);
        self.update(channel, true, |state| state.blink(value, half, with_fade))
    }

    /// Stop any fade or blink on `channel`, holding the last written duty
    pub fn stop_blink(&self, channel: ChannelId) -> Result<(), Error> {
        self.update(channel, false, ChannelState::stop)
    }

    /// Current brightness of `channel`
    pub fn get_value(&self, channel: ChannelId) -> Result<u8, Error> {
        self.state(channel).map(|state| state.value())
    }

    /// Snapshot of the fade/blink state of `channel`
    pub fn state(&self, channel: ChannelId) -> Result<ChannelState, Error> {
        let slot = self.slot(channel)?;
        critical_section::with(|cs| {
            let current = slot.borrow(cs).get();
            if current.pin.is_none() {
                return Err(Error::ChannelNotRegistered);
            }
            Ok(current.state)
        })
    }

    pub fn is_idle(&self, channel: ChannelId) -> Result<bool, Error> {
        self.state(channel).map(|state| state.is_idle())
    }

    /// Whether any channel is fading or blinking
    pub fn is_animating(&self) -> bool {
        critical_section::with(|cs| self.any_active(cs))
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer_running.load(Ordering::Acquire)
    }

    /// Replace the gamma table
    pub fn set_gamma_table(&self, entries: &[u16; GAMMA_TABLE_SIZE]) -> Result<(), Error> {
        let table = GammaTable::from_entries(*entries)?;
        self.replace_gamma(table);
        Ok(())
    }

    /// Rebuild the gamma table from a correction exponent
    pub fn set_gamma_correction(&self, correction: f32) -> Result<(), Error> {
        let table = GammaTable::build(correction)?;
        self.replace_gamma(table);
        Ok(())
    }

    /// Copy of the active gamma table
    pub fn gamma_table(&self) -> GammaTable {
        critical_section::with(|cs| self.gamma.borrow_ref(cs).clone())
    }

    /// Advance every channel by one tick
    ///
    /// Call this from the tick timer interrupt. Stops the timer once all
    /// channels are idle.
    pub fn on_tick(&self) {
        let active = self
            .scheduler
            .run(&self.channels, &self.gamma, &self.pwm);
        if active > 0 {
            return;
        }

        critical_section::with(|cs| {
            if !self.timer_running.load(Ordering::Acquire) || self.any_active(cs) {
                return;
            }
            self.timer.borrow_ref_mut(cs).stop();
            self.timer_running.store(false, Ordering::Release);
        });
    }

    fn replace_gamma(&self, table: GammaTable) {
        critical_section::with(|cs| {
            self.gamma.replace(cs, table);
        });
    }

    /// Apply `change` to a registered channel in one critical section
    fn update<F>(&self, channel: ChannelId, start_timer: bool, change: F) -> Result<(), Error>
    where
        F: FnOnce(&mut ChannelState),
    {
        let slot = self.slot(channel)?;
        critical_section::with(|cs| {
            let cell = slot.borrow(cs);
            let mut current = cell.get();
            if current.pin.is_none() {
                return Err(Error::ChannelNotRegistered);
            }
            change(&mut current.state);
            cell.set(current);

            if start_timer && !current.state.is_idle() {
                self.ensure_timer_running(cs);
            }
            Ok(())
        })
    }

    fn ensure_timer_running(&self, cs: CriticalSection<'_>) {
        if self.timer_running.load(Ordering::Acquire) {
            return;
        }
        self.timer.borrow_ref_mut(cs).start();
        self.timer_running.store(true, Ordering::Release);
        #[cfg(feature = "esp32-log")]
        println!("[LightEngine] tick timer started");
    }

    fn any_active(&self, cs: CriticalSection<'_>) -> bool {
        self.channels
            .iter()
            .any(|slot| !slot.borrow(cs).get().state.is_idle())
    }

    fn slot(&self, channel: ChannelId) -> Result<&Mutex<Cell<ChannelSlot>>, Error> {
        self.channels
            .get(usize::from(channel))
            .ok_or(Error::InvalidChannel)
    }

    fn tick_millis(&self) -> u64 {
        self.config.tick_period.as_millis().max(1)
    }
}
