//! Fixed-point stick values.
//!
//! Stick deflections travel through the receiver layer as signed integers
//! where [`FIXED_ONE`] (2048) represents full deflection, i.e. a resolution
//! of 1/2048 over [-1, 1]. The wireless joystick sends its sticks as IEEE-754
//! singles; [`bits_to_fixed`] converts those without touching the FPU.

use fixed::types::I21F11;

/// Fixed-point value of a full positive deflection (1.0).
pub const FIXED_ONE: i32 = 2048;

/// Smallest stick value a decoder publishes.
pub const FIXED_MIN: i32 = -2048;

/// Largest stick value a decoder publishes.
pub const FIXED_MAX: i32 = 2047;

/// Number of fractional bits in the fixed-point representation.
const FRACTION_BITS: i32 = 11;

const MANTISSA_BITS: i32 = 23;
const MANTISSA_MASK: u32 = 0x007F_FFFF;
const IMPLICIT_BIT: u32 = 0x0080_0000;
const EXPONENT_BIAS: i32 = 127;

/// Largest left shift that keeps a 24-bit mantissa inside `i32`.
const MAX_LEFT_SHIFT: i32 = 7;

/// Convert the bit pattern of an IEEE-754 single into fixed point.
///
/// Only integer operations are used. The exponent field (bits 23..=30)
/// selects how far the 24-bit mantissa (with the implicit leading one OR'd in
/// at bit 23) is shifted right so that the binary point lands on bit 11:
///
/// ```text
/// shift = (23 - 11) - (exponent - 127)
/// ```
///
/// A zero exponent (zero and denormals) yields 0. Shifts that push every
/// mantissa bit out yield 0; values too large for `i32` saturate.
///
/// # Example
///
/// ```
/// use receiver_core::bits_to_fixed;
///
/// assert_eq!(bits_to_fixed(0.5f32.to_bits()), 1024);
/// assert_eq!(bits_to_fixed((-1.0f32).to_bits()), -2048);
/// ```
#[must_use]
pub const fn bits_to_fixed(bits: u32) -> i32 {
    let exponent = ((bits >> 23) & 0xFF) as i32;
    if exponent == 0 {
        return 0;
    }

    let negative = (bits >> 31) & 0x1 != 0;
    let mantissa = (bits & MANTISSA_MASK) | IMPLICIT_BIT;

    let shift = (MANTISSA_BITS - FRACTION_BITS) - (exponent - EXPONENT_BIAS);
    let magnitude = if shift >= 32 {
        0
    } else if shift >= 0 {
        (mantissa >> shift) as i32
    } else if -shift <= MAX_LEFT_SHIFT {
        (mantissa << -shift) as i32
    } else {
        i32::MAX
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Convert a fixed-point stick value to a float in [-1, 1].
#[inline]
#[must_use]
pub fn fixed_to_float(value: i32) -> f32 {
    I21F11::from_bits(value).to_num::<f32>()
}

/// Apply bias and deadband to a raw stick value.
///
/// With no bias captured yet the raw value passes through unchanged.
/// Otherwise the biased value is shrunk towards zero by `deadband`, giving an
/// exact zero plateau of half-width `deadband` and no jump at its edges.
///
/// # Example
///
/// ```
/// use receiver_core::normalize;
///
/// assert_eq!(normalize(300, None, 50), 300);
/// assert_eq!(normalize(50, Some(0), 50), 0);
/// assert_eq!(normalize(51, Some(0), 50), 1);
/// assert_eq!(normalize(-51, Some(0), 50), -1);
/// ```
#[inline]
#[must_use]
pub const fn normalize(raw: i32, bias: Option<i32>, deadband: i32) -> i32 {
    let Some(bias) = bias else {
        return raw;
    };

    // saturating: raw and bias may be injected from outside the stick range
    let deflection = raw.saturating_sub(bias);
    if deflection < -deadband {
        deflection.saturating_add(deadband)
    } else if deflection > deadband {
        deflection.saturating_sub(deadband)
    } else {
        0
    }
}

/// Map a pulse-width style channel value onto the fixed-point stick range.
///
/// `center` maps to 0 and `center ± half_range` to full deflection. The
/// result is clamped to [`FIXED_MIN`, `FIXED_MAX`].
#[inline]
#[must_use]
pub const fn channel_to_fixed(value: u16, center: u16, half_range: u16) -> i32 {
    if half_range == 0 {
        return 0;
    }
    let centered = value as i32 - center as i32;
    let scaled = centered * FIXED_ONE / half_range as i32;
    if scaled < FIXED_MIN {
        FIXED_MIN
    } else if scaled > FIXED_MAX {
        FIXED_MAX
    } else {
        scaled
    }
}
