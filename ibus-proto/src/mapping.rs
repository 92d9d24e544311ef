//! IBUS channel value scaling.
//!
//! IBUS channels are already pulse widths in microseconds, nominally
//! 1000..=2000 with 1500 at center.

use receiver_core::{channel_to_fixed, CalibrationConfig, ReceiverConfig, STICK_COUNT};

use crate::parser::IBUS_CHANNEL_COUNT;

/// IBUS channel center value.
pub const IBUS_CENTER: u16 = 1500;

/// Distance from center to full deflection.
pub const IBUS_HALF_RANGE: u16 = 500;

/// Receiver settings for IBUS: all channels past the sticks are auxiliary
/// and no bias is captured automatically.
pub const DEFAULT_CONFIG: ReceiverConfig = ReceiverConfig {
    auxiliary_channel_count: IBUS_CHANNEL_COUNT - STICK_COUNT,
    calibration: CalibrationConfig::MANUAL,
};

/// Convert an IBUS channel value to a fixed-point stick value.
#[inline]
#[must_use]
pub const fn ibus_to_fixed(value: u16) -> i32 {
    channel_to_fixed(value, IBUS_CENTER, IBUS_HALF_RANGE)
}
