//! Receiver telemetry record.
//!
//! Packs a snapshot of a receiver into a fixed little-endian record for a
//! telemetry or logging backend. The caller owns the transport.
//!
//! ```text
//! 0..4    id              u32
//! 4       record type     u8 (RECEIVER_TELEMETRY_TYPE)
//! 5       record length   u8
//! 6..8    sequence number u16 (low bits)
//! 8..12   tick interval   u32
//! 12..14  dropped delta   i16 (saturated)
//! 14..22  sticks          4 x i16 fixed point: throttle, roll, pitch, yaw
//! 22..26  switches        u32
//! 26..32  primary peer    6 octets
//! ```

use receiver_core::Receiver;

/// Record type tag for receiver telemetry.
pub const RECEIVER_TELEMETRY_TYPE: u8 = 0x02;

/// Length of a packed receiver record.
pub const RECEIVER_TELEMETRY_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryError {
    /// Output buffer shorter than [`RECEIVER_TELEMETRY_LEN`].
    BufferFull,
}

/// Pack `receiver` into `buf`, returning the number of bytes written.
pub fn pack_receiver_telemetry<R: Receiver + ?Sized>(
    buf: &mut [u8],
    id: u32,
    sequence_number: u32,
    receiver: &R,
) -> Result<usize, TelemetryError> {
    let out = buf
        .get_mut(..RECEIVER_TELEMETRY_LEN)
        .ok_or(TelemetryError::BufferFull)?;

    let controls = receiver.controls();
    let dropped = saturate_i16(receiver.dropped_packet_delta());

    out[0..4].copy_from_slice(&id.to_le_bytes());
    out[4] = RECEIVER_TELEMETRY_TYPE;
    out[5] = RECEIVER_TELEMETRY_LEN as u8;
    out[6..8].copy_from_slice(&(sequence_number as u16).to_le_bytes());
    out[8..12].copy_from_slice(&receiver.tick_delta().to_le_bytes());
    out[12..14].copy_from_slice(&dropped.to_le_bytes());

    let sticks = [controls.throttle, controls.roll, controls.pitch, controls.yaw];
    for (i, value) in sticks.iter().enumerate() {
        let offset = 14 + 2 * i;
        out[offset..offset + 2].copy_from_slice(&saturate_i16(*value).to_le_bytes());
    }

    out[22..26].copy_from_slice(&receiver.switches().raw().to_le_bytes());
    out[26..32].copy_from_slice(receiver.primary_peer_eui().octets());

    Ok(RECEIVER_TELEMETRY_LEN)
}

#[inline]
fn saturate_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use receiver_core::{Controls, NullReceiver, FIXED_MIN, FIXED_ONE};

    #[test]
    fn test_pack_null_receiver() {
        let mut receiver = NullReceiver::new();
        receiver.set_controls(Controls {
            throttle: FIXED_ONE,
            roll: FIXED_MIN,
            pitch: 0,
            yaw: 512,
        });
        receiver.set_switch(0, 1);
        receiver.set_switch(3, 2);
        receiver.update(16);

        let mut buf = [0xEEu8; 40];
        let written = pack_receiver_telemetry(&mut buf, 0x1234_5678, 0x0001_0203, &receiver).unwrap();
        assert_eq!(written, RECEIVER_TELEMETRY_LEN);

        assert_eq!(&buf[0..4], &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(buf[4], RECEIVER_TELEMETRY_TYPE);
        assert_eq!(buf[5], 32);
        assert_eq!(&buf[6..8], &[0x03, 0x02]);
        assert_eq!(&buf[8..12], &[16, 0, 0, 0]);
        assert_eq!(&buf[12..14], &[0, 0]);
        assert_eq!(&buf[14..16], &2048i16.to_le_bytes());
        assert_eq!(&buf[16..18], &(-2048i16).to_le_bytes());
        assert_eq!(&buf[18..20], &[0, 0]);
        assert_eq!(&buf[20..22], &512i16.to_le_bytes());
        // switch 0 = 1, switch 3 = 2
        assert_eq!(&buf[22..26], &[0x81, 0, 0, 0]);
        assert_eq!(&buf[26..32], &[0; 6]);
        assert_eq!(buf[32], 0xEE);
    }

    #[test]
    fn test_out_of_range_sticks_saturate() {
        let mut receiver = NullReceiver::new();
        receiver.set_controls(Controls {
            throttle: 6_144_000,
            roll: i32::MIN,
            pitch: 40_000,
            yaw: -40_000,
        });
        receiver.update(1);

        let mut buf = [0u8; RECEIVER_TELEMETRY_LEN];
        pack_receiver_telemetry(&mut buf, 0, 0, &receiver).unwrap();
        assert_eq!(&buf[14..16], &i16::MAX.to_le_bytes());
        assert_eq!(&buf[16..18], &i16::MIN.to_le_bytes());
        assert_eq!(&buf[18..20], &i16::MAX.to_le_bytes());
        assert_eq!(&buf[20..22], &i16::MIN.to_le_bytes());
    }

    #[test]
    fn test_short_buffer_rejected() {
        let receiver = NullReceiver::new();
        let mut buf = [0u8; RECEIVER_TELEMETRY_LEN - 1];
        assert_eq!(
            pack_receiver_telemetry(&mut buf, 1, 1, &receiver),
            Err(TelemetryError::BufferFull)
        );
    }
}
