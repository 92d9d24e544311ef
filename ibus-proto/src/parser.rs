//! IBUS frame layout, model detection, checksums and decoding.
//!
//! The first byte of a frame selects the receiver model:
//!
//! | Sync | Model | Frame | Channel offset | Checksum                     |
//! |------|-------|-------|----------------|------------------------------|
//! | 0x20 | IA6B  | 32    | 2              | 0xFFFF - sum of frame bytes  |
//! | 0x55 | IA6   | 31    | 1              | sum of the 14 channel words  |
//!
//! Both carry 14 little-endian channel slots followed by a little-endian
//! 16-bit checksum. Each slot holds a 12-bit channel value in its low bits;
//! the high nibbles of three consecutive slots form one extra channel, giving
//! 18 channels in total.

/// Sync byte of an IA6B frame (also its length).
pub const IBUS_SYNC_IA6B: u8 = 0x20;

/// Sync byte of an IA6 frame.
pub const IBUS_SYNC_IA6: u8 = 0x55;

/// Largest frame of any model.
pub const IBUS_MAX_FRAME_LEN: usize = 32;

/// Channel slots carried by every frame.
pub const IBUS_SLOT_COUNT: usize = 14;

/// Slots plus the channels packed into their high nibbles.
pub const IBUS_CHANNEL_COUNT: usize = 18;

const CHECKSUM_LEN: usize = 2;
const SLOT_MASK: u16 = 0x0FFF;
const NIBBLE_MASK: u8 = 0xF0;
const EXTENDED_STRIDE: usize = 6;

/// Receiver model, identified by the sync byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IbusModel {
    Ia6,
    Ia6b,
}

impl IbusModel {
    /// Model announced by `sync`, if any.
    #[inline]
    #[must_use]
    pub const fn from_sync(sync: u8) -> Option<Self> {
        match sync {
            IBUS_SYNC_IA6B => Some(Self::Ia6b),
            IBUS_SYNC_IA6 => Some(Self::Ia6),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn sync_byte(self) -> u8 {
        match self {
            Self::Ia6 => IBUS_SYNC_IA6,
            Self::Ia6b => IBUS_SYNC_IA6B,
        }
    }

    /// Total frame length including sync and checksum.
    #[inline]
    #[must_use]
    pub const fn frame_len(self) -> usize {
        match self {
            Self::Ia6 => 31,
            Self::Ia6b => 32,
        }
    }

    /// Offset of the first channel slot.
    #[inline]
    #[must_use]
    pub const fn channel_offset(self) -> usize {
        match self {
            Self::Ia6 => 1,
            Self::Ia6b => 2,
        }
    }
}

/// Reasons a completed frame is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// First byte is not a known sync byte.
    Sync,
    /// Frame length does not match the model.
    Length,
    /// Trailing checksum does not match the frame contents.
    Checksum { received: u16, computed: u16 },
}

/// A decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IbusFrame {
    pub model: IbusModel,
    /// Channel values in microseconds (1000..=2000 typical).
    pub channels: [u16; IBUS_CHANNEL_COUNT],
    pub checksum: u16,
}

#[inline]
fn word_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

/// Checksum carried in the last two bytes of `bytes`.
///
/// `bytes` must hold at least two bytes.
#[inline]
#[must_use]
pub fn received_checksum(bytes: &[u8]) -> u16 {
    word_at(bytes, bytes.len() - CHECKSUM_LEN)
}

/// Checksum of a complete `model` frame, computed over everything before
/// the checksum field.
///
/// `bytes` must hold at least `model.frame_len()` bytes.
#[must_use]
pub fn calculate_checksum(model: IbusModel, bytes: &[u8]) -> u16 {
    let payload = &bytes[..model.frame_len() - CHECKSUM_LEN];
    match model {
        IbusModel::Ia6b => payload
            .iter()
            .fold(0xFFFF_u16, |sum, &b| sum.wrapping_sub(u16::from(b))),
        IbusModel::Ia6 => (0..IBUS_SLOT_COUNT)
            .map(|slot| word_at(payload, model.channel_offset() + 2 * slot))
            .fold(0_u16, u16::wrapping_add),
    }
}

/// Unpack the 18 channels of a checked `model` frame.
fn unpack_channels(model: IbusModel, bytes: &[u8]) -> [u16; IBUS_CHANNEL_COUNT] {
    let offset = model.channel_offset();
    let mut channels = [0u16; IBUS_CHANNEL_COUNT];

    for (slot, channel) in channels.iter_mut().take(IBUS_SLOT_COUNT).enumerate() {
        *channel = word_at(bytes, offset + 2 * slot) & SLOT_MASK;
    }

    // Three high nibbles (one per slot high byte) make one 12-bit channel.
    for (i, channel) in channels.iter_mut().skip(IBUS_SLOT_COUNT).enumerate() {
        let hi = offset + 1 + i * EXTENDED_STRIDE;
        *channel = u16::from((bytes[hi] & NIBBLE_MASK) >> 4)
            | u16::from(bytes[hi + 2] & NIBBLE_MASK)
            | (u16::from(bytes[hi + 4] & NIBBLE_MASK) << 4);
    }
    channels
}

/// Check and decode a complete frame.
///
/// # Example
///
/// ```
/// use ibus_proto::{decode, DecodeError};
///
/// let mut frame = [0u8; 32];
/// frame[0] = 0x20;
/// assert!(matches!(decode(&frame), Err(DecodeError::Checksum { .. })));
/// ```
pub fn decode(bytes: &[u8]) -> Result<IbusFrame, DecodeError> {
    let model = bytes
        .first()
        .and_then(|&sync| IbusModel::from_sync(sync))
        .ok_or(DecodeError::Sync)?;
    if bytes.len() != model.frame_len() {
        return Err(DecodeError::Length);
    }

    let received = received_checksum(bytes);
    let computed = calculate_checksum(model, bytes);
    if received != computed {
        return Err(DecodeError::Checksum { received, computed });
    }

    Ok(IbusFrame {
        model,
        channels: unpack_channels(model, bytes),
        checksum: received,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// IA6B capture: roll 1499, pitch 1500, throttle 1364, yaw 1500.
    const IA6B_FRAME: [u8; 32] = [
        0x20, 0x40, 0xDB, 0x05, 0xDC, 0x05, 0x54, 0x05, 0xDC, 0x05, 0xE8, 0x03, 0xD0, 0x07, 0xD2,
        0x05, 0xE8, 0x03, 0xDC, 0x05, 0xDC, 0x05, 0xDC, 0x05, 0xDC, 0x05, 0xDC, 0x05, 0xDC, 0x05,
        0xDA, 0xF3,
    ];

    /// Same channels as an IA6 frame.
    const IA6_FRAME: [u8; 31] = [
        0x55, 0xDB, 0x05, 0xDC, 0x05, 0x54, 0x05, 0xDC, 0x05, 0xE8, 0x03, 0xD0, 0x07, 0xD2, 0x05,
        0xE8, 0x03, 0xDC, 0x05, 0xDC, 0x05, 0xDC, 0x05, 0xDC, 0x05, 0xDC, 0x05, 0xDC, 0x05, 0x81,
        0x4F,
    ];

    const EXPECTED_SLOTS: [u16; IBUS_SLOT_COUNT] = [
        0x05DB, 0x05DC, 0x0554, 0x05DC, 0x03E8, 0x07D0, 0x05D2, 0x03E8, 0x05DC, 0x05DC, 0x05DC,
        0x05DC, 0x05DC, 0x05DC,
    ];

    #[test]
    fn test_model_detection() {
        assert_eq!(IbusModel::from_sync(0x20), Some(IbusModel::Ia6b));
        assert_eq!(IbusModel::from_sync(0x55), Some(IbusModel::Ia6));
        assert_eq!(IbusModel::from_sync(0x40), None);
        assert_eq!(IbusModel::Ia6b.frame_len(), 32);
        assert_eq!(IbusModel::Ia6b.channel_offset(), 2);
        assert_eq!(IbusModel::Ia6.frame_len(), 31);
        assert_eq!(IbusModel::Ia6.channel_offset(), 1);
    }

    #[test]
    fn test_ia6b_checksum() {
        assert_eq!(received_checksum(&IA6B_FRAME), 0xF3DA);
        assert_eq!(calculate_checksum(IbusModel::Ia6b, &IA6B_FRAME), 0xF3DA);
    }

    #[test]
    fn test_decode_ia6b_fixture() {
        let frame = decode(&IA6B_FRAME).unwrap();
        assert_eq!(frame.model, IbusModel::Ia6b);
        assert_eq!(frame.channels[0], 0x05DB);
        assert_eq!(frame.channels[1], 0x05DC);
        assert_eq!(frame.channels[2], 0x0554);
        assert_eq!(&frame.channels[..IBUS_SLOT_COUNT], &EXPECTED_SLOTS);
        assert_eq!(&frame.channels[IBUS_SLOT_COUNT..], &[0, 0, 0, 0]);
        assert_eq!(frame.checksum, 0xF3DA);
    }

    #[test]
    fn test_decode_ia6_fixture() {
        assert_eq!(calculate_checksum(IbusModel::Ia6, &IA6_FRAME), 0x4F81);
        let frame = decode(&IA6_FRAME).unwrap();
        assert_eq!(frame.model, IbusModel::Ia6);
        assert_eq!(&frame.channels[..IBUS_SLOT_COUNT], &EXPECTED_SLOTS);
    }

    #[test]
    fn test_unchecked_trailer_rejected() {
        let mut frame = IA6B_FRAME;
        frame[30] = 0x80;
        frame[31] = 0x4F;
        assert_eq!(
            decode(&frame),
            Err(DecodeError::Checksum {
                received: 0x4F80,
                computed: 0xF3DA,
            })
        );
    }

    #[test]
    fn test_any_single_byte_flip_rejected() {
        for index in 0..IA6B_FRAME.len() - CHECKSUM_LEN {
            let mut frame = IA6B_FRAME;
            frame[index] ^= 0x01;
            assert!(decode(&frame).is_err(), "flip at {index} accepted");
        }
        for index in 0..IA6_FRAME.len() - CHECKSUM_LEN {
            let mut frame = IA6_FRAME;
            frame[index] ^= 0x01;
            assert!(decode(&frame).is_err(), "flip at {index} accepted");
        }
    }

    #[test]
    fn test_extended_channels_from_high_nibbles() {
        let mut frame = IA6B_FRAME;
        // channel 14 = 0xABC from slot high bytes at 3, 5, 7
        frame[3] |= 0xC0;
        frame[5] |= 0xB0;
        frame[7] |= 0xA0;
        // channel 17 from slot high bytes at 21, 23, 25
        frame[21] |= 0x10;
        frame[25] |= 0x30;
        let checksum = calculate_checksum(IbusModel::Ia6b, &frame).to_le_bytes();
        frame[30] = checksum[0];
        frame[31] = checksum[1];

        let decoded = decode(&frame).unwrap();
        assert_eq!(decoded.channels[14], 0xABC);
        assert_eq!(decoded.channels[15], 0);
        assert_eq!(decoded.channels[16], 0);
        assert_eq!(decoded.channels[17], 0x301);
        // slot values are masked to 12 bits
        assert_eq!(decoded.channels[0], 0x05DB);
        assert_eq!(decoded.channels[1], 0x05DC);
    }

    #[test]
    fn test_decode_rejects_sync_and_length() {
        assert_eq!(decode(&[]), Err(DecodeError::Sync));
        assert_eq!(decode(&[0x13; 32]), Err(DecodeError::Sync));
        assert_eq!(decode(&IA6B_FRAME[..31]), Err(DecodeError::Length));
    }
}
