//! Gamma correction table
//!
//! Maps a linear 8-bit brightness index to a perceptual duty value stored as
//! Q8 of `x^(1/g) * 256`. The table is built once with floating point math;
//! lookups at tick time are integer only.

use crate::error::Error;
use crate::fixed::{FRACTION_BITS, clamp_brightness, fraction_part, integer_part};

/// Number of entries in a gamma table
pub const GAMMA_TABLE_SIZE: usize = 256;

/// Largest value a table entry can hold
pub const GAMMA_MAX: u16 = u16::MAX;

/// Default correction exponent
pub const DEFAULT_GAMMA_CORRECTION: f32 = 0.8;

/// Precomputed gamma curve shared by all channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GammaTable {
    entries: [u16; GAMMA_TABLE_SIZE],
}

impl GammaTable {
    /// Build a table for `y = x^(1/correction)`
    ///
    /// The top entry overflows 16 bits by construction and saturates to
    /// [`GAMMA_MAX`], which keeps full brightness reachable.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn build(correction: f32) -> Result<Self, Error> {
        if !correction.is_finite() || correction <= 0.0 {
            return Err(Error::InvalidConfig);
        }

        let mut entries = [0u16; GAMMA_TABLE_SIZE];
        let exponent = 1.0 / correction;
        let scale = (GAMMA_TABLE_SIZE << FRACTION_BITS) as f32;
        for (i, entry) in entries.iter_mut().enumerate() {
            let x = i as f32 / (GAMMA_TABLE_SIZE - 1) as f32;
            let y = libm::roundf(libm::powf(x, exponent) * scale);
            *entry = if y >= f32::from(GAMMA_MAX) {
                GAMMA_MAX
            } else {
                y as u16
            };
        }

        if entries[GAMMA_TABLE_SIZE - 1] == 0 {
            entries[GAMMA_TABLE_SIZE - 1] = GAMMA_MAX;
        }

        Ok(Self { entries })
    }

    /// Wrap a caller supplied table
    ///
    /// The table must start at zero, never decrease and end above zero.
    pub fn from_entries(entries: [u16; GAMMA_TABLE_SIZE]) -> Result<Self, Error> {
        if entries[0] != 0 || entries[GAMMA_TABLE_SIZE - 1] == 0 {
            return Err(Error::InvalidGammaTable);
        }
        if entries.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(Error::InvalidGammaTable);
        }
        Ok(Self { entries })
    }

    /// Raw table entries
    pub const fn entries(&self) -> &[u16; GAMMA_TABLE_SIZE] {
        &self.entries
    }

    /// Interpolated perceptual value for a Q8 brightness
    #[inline]
    #[allow(clippy::cast_sign_loss)]
    pub fn perceptual(&self, value: i32) -> u32 {
        let value = clamp_brightness(value);
        let index = integer_part(value) as usize;
        let fraction = fraction_part(value) as u32;

        let current = u32::from(self.entries[index]);
        let next = if index < GAMMA_TABLE_SIZE - 1 {
            u32::from(self.entries[index + 1])
        } else {
            current
        };

        current + (next - current) * fraction / (1 << FRACTION_BITS)
    }

    /// Hardware duty for a Q8 brightness
    ///
    /// `duty_range` is the full-scale duty of the PWM timer (`1 << bits`).
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn duty(&self, value: i32, duty_range: u32) -> u32 {
        let perceptual = u64::from(self.perceptual(value));
        (perceptual * u64::from(duty_range) / u64::from(GAMMA_MAX)) as u32
    }
}

impl Default for GammaTable {
    fn default() -> Self {
        match Self::build(DEFAULT_GAMMA_CORRECTION) {
            Ok(table) => table,
            Err(_) => unreachable!("default gamma exponent is valid"),
        }
    }
}
