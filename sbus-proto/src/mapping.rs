//! SBUS channel value scaling.
//!
//! SBUS channels are 11-bit (0..=2047) but transmitters use 172..=1811
//! with 992 at center, which corresponds to 988..=2011 µs on a PWM
//! receiver.

use receiver_core::{channel_to_fixed, CalibrationConfig, ReceiverConfig, CHANNEL_MIDDLE};

use crate::frame::SBUS_CHANNEL_COUNT;

/// SBUS channel center value.
pub const SBUS_CENTER: u16 = 992;

/// Lowest value sent at full stick deflection.
pub const SBUS_MIN: u16 = 172;

/// Highest value sent at full stick deflection.
pub const SBUS_MAX: u16 = 1811;

/// Distance from center to full deflection.
pub const SBUS_HALF_RANGE: u16 = SBUS_MAX - SBUS_CENTER + 1;

/// Receiver settings for SBUS: every channel past the sticks is auxiliary
/// and no bias is captured automatically.
pub const DEFAULT_CONFIG: ReceiverConfig = ReceiverConfig {
    auxiliary_channel_count: SBUS_CHANNEL_COUNT - receiver_core::STICK_COUNT,
    calibration: CalibrationConfig::MANUAL,
};

/// Convert an SBUS channel value to a fixed-point stick value.
#[inline]
#[must_use]
pub const fn sbus_to_fixed(value: u16) -> i32 {
    channel_to_fixed(value, SBUS_CENTER, SBUS_HALF_RANGE)
}

/// Convert an SBUS channel value to a pulse width in microseconds.
///
/// Uses the common 5/8 scaling: 172 -> 988, 992 -> 1500, 1811 -> 2011.
#[inline]
#[must_use]
pub const fn sbus_to_pwm(value: u16) -> u16 {
    let pwm = (value as i32 - SBUS_CENTER as i32) * 5 / 8 + CHANNEL_MIDDLE as i32;
    pwm as u16
}
