//! Q8 fixed-point helpers
//!
//! Brightness is tracked as a signed Q8 accumulator so that per-tick deltas
//! smaller than one brightness unit still add up over a fade.

/// Number of fractional bits
pub const FRACTION_BITS: u32 = 8;

/// One whole brightness unit in Q8
pub const ONE: i32 = 1 << FRACTION_BITS;

/// Mask selecting the fractional part
pub const FRACTION_MASK: i32 = ONE - 1;

/// Highest representable brightness (255.0) in Q8
pub const MAX_BRIGHTNESS: i32 = 255 << FRACTION_BITS;

/// Convert an 8-bit brightness into Q8
#[inline]
pub const fn from_u8(value: u8) -> i32 {
    (value as i32) << FRACTION_BITS
}

/// Convert a Q8 brightness back to 8 bits, truncating the fraction
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn to_u8(value: i32) -> u8 {
    (clamp_brightness(value) >> FRACTION_BITS) as u8
}

/// Integer part of a Q8 value
#[inline]
pub const fn integer_part(value: i32) -> i32 {
    value >> FRACTION_BITS
}

/// Fractional part of a Q8 value (0..256)
#[inline]
pub const fn fraction_part(value: i32) -> i32 {
    value & FRACTION_MASK
}

/// Keep a Q8 brightness inside `[0, 255.0]`
#[inline]
pub const fn clamp_brightness(value: i32) -> i32 {
    if value < 0 {
        0
    } else if value > MAX_BRIGHTNESS {
        MAX_BRIGHTNESS
    } else {
        value
    }
}

/// Convert a millisecond duration into whole ticks, never less than one
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub const fn duration_to_ticks(duration_ms: u64, tick_ms: u64) -> u32 {
    let ticks = duration_ms / tick_ms;
    if ticks == 0 {
        1
    } else if ticks > u32::MAX as u64 {
        u32::MAX
    } else {
        ticks as u32
    }
}
