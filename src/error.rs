use core::fmt;

/// Errors reported by the light engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Channel id is outside the engine's channel range
    InvalidChannel,
    /// Channel has not been registered with a pin
    ChannelNotRegistered,
    /// Gamma table is not a valid monotonic curve
    InvalidGammaTable,
    /// Engine configuration is out of range
    InvalidConfig,
    /// PWM peripheral rejected a configuration
    Pwm,
    /// Periodic timer rejected a configuration
    Timer,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::InvalidChannel => "channel id out of range",
            Self::ChannelNotRegistered => "channel is not registered",
            Self::InvalidGammaTable => "invalid gamma table",
            Self::InvalidConfig => "invalid engine configuration",
            Self::Pwm => "PWM peripheral configuration failed",
            Self::Timer => "tick timer configuration failed",
        };
        f.write_str(message)
    }
}

impl core::error::Error for Error {}
