//! Atom JoyStick packet layout and decoding.
//!
//! ```text
//! 0..3    last three octets of the receiver's MAC (addressing)
//! 3..7    yaw       f32 LE
//! 7..11   throttle  f32 LE
//! 11..15  roll      f32 LE
//! 15..19  pitch     f32 LE (sign inverted)
//! 19      arm button
//! 20      flip button
//! 21      mode (stable / sport)
//! 22      altitude mode (4 or 5)
//! 23      proactive flag
//! 24      checksum: sum of bytes 0..24, mod 256
//! [25]    pad byte added by some senders
//! ```

use receiver_core::{bits_to_fixed, Eui48, FIXED_MAX, FIXED_MIN};

/// Packet length without the pad byte.
pub const JOYSTICK_PACKET_LEN: usize = 25;

/// Packet length with the pad byte.
pub const JOYSTICK_MAX_PACKET_LEN: usize = JOYSTICK_PACKET_LEN + 1;

const IDENTITY_LEN: usize = 3;
const CHECKSUM_OFFSET: usize = 24;

const YAW_OFFSET: usize = 3;
const THROTTLE_OFFSET: usize = 7;
const ROLL_OFFSET: usize = 11;
const PITCH_OFFSET: usize = 15;
const ARM_OFFSET: usize = 19;
const FLIP_OFFSET: usize = 20;
const MODE_OFFSET: usize = 21;
const ALT_MODE_OFFSET: usize = 22;
const PROACTIVE_OFFSET: usize = 23;

/// Altitude-mode value meaning "altitude hold off".
pub const ALT_MODE_MANUAL: u8 = 4;

/// Reasons a received packet is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Packet is neither 25 nor 26 bytes.
    Length,
    /// Packet is addressed to another receiver.
    Identity,
    /// Checksum byte does not match the packet contents.
    Checksum { received: u8, computed: u8 },
}

/// A decoded packet. Sticks are fixed point (2048 = full deflection).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickPacket {
    pub yaw: i32,
    pub throttle: i32,
    pub roll: i32,
    pub pitch: i32,
    pub arm: u8,
    pub flip: u8,
    pub mode: u8,
    pub alt_mode: u8,
    pub proactive: u8,
}

/// Whether the packet's addressing bytes match `my_mac`.
#[inline]
#[must_use]
pub fn is_addressed_to(bytes: &[u8], my_mac: &Eui48) -> bool {
    bytes.len() >= IDENTITY_LEN && bytes[..IDENTITY_LEN] == my_mac.suffix()
}

/// Sum of the bytes preceding the checksum byte, mod 256.
///
/// `bytes` must hold at least the 24 payload bytes.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes[..CHECKSUM_OFFSET]
        .iter()
        .fold(0u8, |sum, &b| sum.wrapping_add(b))
}

#[inline]
fn fixed_at(bytes: &[u8], offset: usize) -> i32 {
    let bits = u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]);
    bits_to_fixed(bits)
}

/// Clamp to the published stick range. Out-of-range, infinite and NaN
/// floats land on the nearest end.
#[inline]
fn stick(value: i32) -> i32 {
    value.clamp(FIXED_MIN, FIXED_MAX)
}

/// Check and decode a packet addressed to `my_mac`.
pub fn decode(bytes: &[u8], my_mac: &Eui48) -> Result<JoystickPacket, DecodeError> {
    if bytes.len() != JOYSTICK_PACKET_LEN && bytes.len() != JOYSTICK_MAX_PACKET_LEN {
        return Err(DecodeError::Length);
    }
    if !is_addressed_to(bytes, my_mac) {
        return Err(DecodeError::Identity);
    }
    let received = bytes[CHECKSUM_OFFSET];
    let computed = checksum(bytes);
    if received != computed {
        return Err(DecodeError::Checksum { received, computed });
    }

    Ok(JoystickPacket {
        yaw: stick(fixed_at(bytes, YAW_OFFSET)),
        throttle: stick(fixed_at(bytes, THROTTLE_OFFSET)),
        roll: stick(fixed_at(bytes, ROLL_OFFSET)),
        pitch: stick(-fixed_at(bytes, PITCH_OFFSET)),
        arm: bytes[ARM_OFFSET],
        flip: bytes[FLIP_OFFSET],
        mode: bytes[MODE_OFFSET],
        alt_mode: bytes[ALT_MODE_OFFSET],
        proactive: bytes[PROACTIVE_OFFSET],
    })
}
