//! SBUS frame layout and decoding.
//!
//! ```text
//! byte 0      header 0x0F
//! bytes 1..23 16 channels x 11 bits, little-endian bit order
//! byte 23     flags: bit0 ch17, bit1 ch18, bit2 frame lost, bit3 failsafe
//! byte 24     footer 0x00 (SBUS2: low nibble 0x4)
//! ```

use receiver_core::{CHANNEL_HIGH, CHANNEL_LOW};

/// Total frame length.
pub const SBUS_FRAME_LEN: usize = 25;

/// First byte of every frame.
pub const SBUS_HEADER: u8 = 0x0F;

/// Footer of a plain SBUS frame.
pub const SBUS_FOOTER: u8 = 0x00;

/// Low nibble shared by the four SBUS2 telemetry-slot footers.
pub const SBUS2_FOOTER_NIBBLE: u8 = 0x04;

/// Number of 11-bit proportional channels.
pub const SBUS_PROPORTIONAL_CHANNELS: usize = 16;

/// Proportional channels plus the two digital flag channels.
pub const SBUS_CHANNEL_COUNT: usize = SBUS_PROPORTIONAL_CHANNELS + 2;

const DATA_OFFSET: usize = 1;
const DATA_LEN: usize = 22;
const FLAGS_OFFSET: usize = DATA_OFFSET + DATA_LEN;
const FOOTER_OFFSET: usize = FLAGS_OFFSET + 1;

const CHANNEL_BITS: usize = 11;
const CHANNEL_MASK: u32 = 0x07FF;

const FLAG_CHANNEL_17: u8 = 0x01;
const FLAG_CHANNEL_18: u8 = 0x02;
const FLAG_FRAME_LOST: u8 = 0x04;
const FLAG_FAILSAFE: u8 = 0x08;

/// Reasons a completed frame is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Frame is not exactly 25 bytes.
    Length,
    /// First byte is not 0x0F.
    Header,
    /// Last byte is neither an SBUS nor an SBUS2 footer.
    Footer,
}

/// Receiver-side link status reported in the flags byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SbusStatus {
    /// The receiver missed the transmitter's last frame.
    pub frame_lost: bool,
    /// The receiver has entered its own failsafe.
    pub failsafe: bool,
}

/// A decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SbusFrame {
    /// Channels 0..16 in SBUS units (172..=1811 typical), channels 16 and
    /// 17 as [`CHANNEL_LOW`]/[`CHANNEL_HIGH`].
    pub channels: [u16; SBUS_CHANNEL_COUNT],
    pub status: SbusStatus,
}

/// Extract 11-bit channel `index` from the 22 data bytes. Indices past the
/// proportional channels read as 0.
#[inline]
#[must_use]
pub const fn channel_at(data: &[u8; DATA_LEN], index: usize) -> u16 {
    if index >= SBUS_PROPORTIONAL_CHANNELS {
        return 0;
    }
    let bit = index * CHANNEL_BITS;
    let byte = bit / 8;
    let shift = bit % 8;

    let mut word = data[byte] as u32 | (data[byte + 1] as u32) << 8;
    if byte + 2 < DATA_LEN {
        word |= (data[byte + 2] as u32) << 16;
    }
    ((word >> shift) & CHANNEL_MASK) as u16
}

const fn is_valid_footer(footer: u8) -> bool {
    footer == SBUS_FOOTER || footer & 0x0F == SBUS2_FOOTER_NIBBLE
}

const fn flag_channel(flags: u8, mask: u8) -> u16 {
    if flags & mask != 0 {
        CHANNEL_HIGH
    } else {
        CHANNEL_LOW
    }
}

/// Decode a complete frame.
///
/// # Example
///
/// ```
/// use sbus_proto::{decode, SBUS_FRAME_LEN, SBUS_HEADER};
///
/// let mut bytes = [0u8; SBUS_FRAME_LEN];
/// bytes[0] = SBUS_HEADER;
/// bytes[1] = 0xE0; // channel 0 = 992
/// bytes[2] = 0x03;
/// let frame = decode(&bytes).unwrap();
/// assert_eq!(frame.channels[0], 992);
/// assert_eq!(frame.channels[1], 0);
/// ```
pub fn decode(bytes: &[u8]) -> Result<SbusFrame, DecodeError> {
    let bytes: &[u8; SBUS_FRAME_LEN] = bytes.try_into().map_err(|_| DecodeError::Length)?;
    if bytes[0] != SBUS_HEADER {
        return Err(DecodeError::Header);
    }
    if !is_valid_footer(bytes[FOOTER_OFFSET]) {
        return Err(DecodeError::Footer);
    }

    let mut data = [0u8; DATA_LEN];
    data.copy_from_slice(&bytes[DATA_OFFSET..FLAGS_OFFSET]);

    let mut channels = [0u16; SBUS_CHANNEL_COUNT];
    for (index, channel) in channels.iter_mut().take(SBUS_PROPORTIONAL_CHANNELS).enumerate() {
        *channel = channel_at(&data, index);
    }

    let flags = bytes[FLAGS_OFFSET];
    channels[16] = flag_channel(flags, FLAG_CHANNEL_17);
    channels[17] = flag_channel(flags, FLAG_CHANNEL_18);

    Ok(SbusFrame {
        channels,
        status: SbusStatus {
            frame_lost: flags & FLAG_FRAME_LOST != 0,
            failsafe: flags & FLAG_FAILSAFE != 0,
        },
    })
}
