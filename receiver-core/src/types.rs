//! Core receiver types: Switches, Controls, StickValues, Eui48.

use crate::fixed::{fixed_to_float, FIXED_ONE};

/// Number of primary stick axes.
pub const STICK_COUNT: usize = 4;

/// Number of two-bit switches held by a [`Switches`] bank.
pub const SWITCH_COUNT: usize = 16;

/// Switch index conventionally used to arm the motors.
pub const MOTOR_ON_OFF_SWITCH: usize = 0;

/// Channel value of a switch in its low position; also returned for
/// out-of-range auxiliary channels.
pub const CHANNEL_LOW: u16 = 1000;

/// Channel value of a centered stick or a middle switch position.
pub const CHANNEL_MIDDLE: u16 = 1500;

/// Channel value of a switch in its high position.
pub const CHANNEL_HIGH: u16 = 2000;

/// Span between [`CHANNEL_LOW`] and [`CHANNEL_HIGH`].
pub const CHANNEL_RANGE: u16 = CHANNEL_HIGH - CHANNEL_LOW;

/// Primary stick axis.
///
/// The discriminant is the axis position in AETR order, which is also the
/// order of the first four channels of the serial protocols that use it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Axis {
    Roll = 0,
    Pitch = 1,
    Throttle = 2,
    Yaw = 3,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; STICK_COUNT] = [Axis::Roll, Axis::Pitch, Axis::Throttle, Axis::Yaw];

    /// Array index of this axis.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Bank of sixteen two-bit switch positions packed into one `u32`.
///
/// Switch `i` occupies bits `2i..2i+2`. Indices outside `0..16` read as 0
/// and writes to them are ignored.
///
/// # Example
///
/// ```
/// use receiver_core::Switches;
///
/// let mut switches = Switches::NONE;
/// switches.set(3, 2);
/// assert_eq!(switches.get(3), 2);
/// assert_eq!(switches.get(2), 0);
/// assert_eq!(switches.raw(), 0b10 << 6);
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Switches(pub u32);

impl Switches {
    /// All switches in position 0.
    pub const NONE: Self = Self(0);

    const MASK: u32 = 0b11;

    /// Position (0..=3) of switch `index`.
    #[inline]
    #[must_use]
    pub const fn get(self, index: usize) -> u8 {
        if index >= SWITCH_COUNT {
            return 0;
        }
        ((self.0 >> (2 * index)) & Self::MASK) as u8
    }

    /// Set switch `index` to `value`. Only the low two bits of `value` are kept.
    #[inline]
    pub fn set(&mut self, index: usize, value: u8) {
        if index >= SWITCH_COUNT {
            return;
        }
        let shift = 2 * index;
        self.0 = (self.0 & !(Self::MASK << shift)) | ((u32::from(value) & Self::MASK) << shift);
    }

    /// Get the raw packed word.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Normalized stick deflections as floats in [-1, 1].
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StickValues {
    pub throttle: f32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl StickValues {
    /// All sticks centered.
    pub const NEUTRAL: Self = Self {
        throttle: 0.0,
        roll: 0.0,
        pitch: 0.0,
        yaw: 0.0,
    };
}

/// Normalized stick deflections in fixed point (2048 = full deflection).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Controls {
    pub throttle: i32,
    pub roll: i32,
    pub pitch: i32,
    pub yaw: i32,
}

impl Controls {
    /// All sticks centered.
    pub const NEUTRAL: Self = Self {
        throttle: 0,
        roll: 0,
        pitch: 0,
        yaw: 0,
    };

    /// Value of `axis`.
    #[inline]
    #[must_use]
    pub const fn axis(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Roll => self.roll,
            Axis::Pitch => self.pitch,
            Axis::Throttle => self.throttle,
            Axis::Yaw => self.yaw,
        }
    }

    /// Convert to floats in [-1, 1].
    #[must_use]
    pub fn to_stick_values(&self) -> StickValues {
        StickValues {
            throttle: fixed_to_float(self.throttle),
            roll: fixed_to_float(self.roll),
            pitch: fixed_to_float(self.pitch),
            yaw: fixed_to_float(self.yaw),
        }
    }

    /// Convert to pulse widths in [`CHANNEL_LOW`, `CHANNEL_HIGH`].
    #[must_use]
    pub const fn to_pwm(&self) -> ControlsPwm {
        ControlsPwm {
            throttle: fixed_to_pwm(self.throttle),
            roll: fixed_to_pwm(self.roll),
            pitch: fixed_to_pwm(self.pitch),
            yaw: fixed_to_pwm(self.yaw),
        }
    }
}

/// Stick positions as pulse widths in microseconds (1000..=2000).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlsPwm {
    pub throttle: u16,
    pub roll: u16,
    pub pitch: u16,
    pub yaw: u16,
}

/// `value * 500 + 1500`, clamped to the channel range for any `value`.
const fn fixed_to_pwm(value: i32) -> u16 {
    let half_range = (CHANNEL_RANGE / 2) as i32;
    let offset = value.saturating_mul(half_range) / FIXED_ONE;
    let pwm = (CHANNEL_MIDDLE as i32).saturating_add(offset);
    if pwm < CHANNEL_LOW as i32 {
        CHANNEL_LOW
    } else if pwm > CHANNEL_HIGH as i32 {
        CHANNEL_HIGH
    } else {
        pwm as u16
    }
}

/// 48-bit hardware identity (MAC address) of a radio peer.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Eui48(pub [u8; 6]);

impl Eui48 {
    /// The all-zero identity, used when no peer is known.
    pub const ZERO: Self = Self([0; 6]);

    /// The broadcast identity.
    pub const BROADCAST: Self = Self([0xFF; 6]);

    #[inline]
    #[must_use]
    pub const fn octets(&self) -> &[u8; 6] {
        &self.0
    }

    /// Last three octets, used by the joystick to address its receiver.
    #[inline]
    #[must_use]
    pub const fn suffix(&self) -> [u8; 3] {
        [self.0[3], self.0[4], self.0[5]]
    }

    #[inline]
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        let o = &self.0;
        o[0] == 0 && o[1] == 0 && o[2] == 0 && o[3] == 0 && o[4] == 0 && o[5] == 0
    }
}

impl From<[u8; 6]> for Eui48 {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}
