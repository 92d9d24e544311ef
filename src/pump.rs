//! Task-context byte source for boards whose UART driver is async rather
//! than interrupt-callback based.
//!
//! Built with the `embedded-io` feature. Unit tests always build it, so a
//! plain `cargo test` covers the pump.

use embassy_time::Instant;
use embedded_io_async::Read;
use log::trace;
use receiver_core::{FrameSync, SerialProducer};

/// Bytes read from the UART per call.
pub const PUMP_CHUNK_LEN: usize = 32;

/// Read from `uart` and feed every byte to `producer` until end of stream.
///
/// Bytes are stamped with the time their chunk arrived, so inter-frame gap
/// resync works as it does from an interrupt handler. Returns the first
/// read error.
pub async fn pump_serial<U, S, const N: usize>(
    uart: &mut U,
    producer: &mut SerialProducer<'_, S, N>,
) -> Result<(), U::Error>
where
    U: Read,
    S: FrameSync,
{
    let mut chunk = [0u8; PUMP_CHUNK_LEN];
    loop {
        let len = uart.read(&mut chunk).await?;
        if len == 0 {
            return Ok(());
        }
        let now_us = Instant::now().as_micros() as u32;
        for &byte in &chunk[..len] {
            if producer.on_data_received_at(byte, now_us) {
                trace!("serial frame complete");
            }
        }
    }
}

#[cfg(all(test, feature = "proto-ibus"))]
mod tests {
    extern crate std;

    use super::*;
    use embassy_futures::block_on;
    use ibus_proto::{IbusLink, IbusSync};

    const IA6B_FRAME: [u8; 32] = [
        0x20, 0x40, 0xDB, 0x05, 0xDC, 0x05, 0x54, 0x05, 0xDC, 0x05, 0xE8, 0x03, 0xD0, 0x07, 0xD2,
        0x05, 0xE8, 0x03, 0xDC, 0x05, 0xDC, 0x05, 0xDC, 0x05, 0xDC, 0x05, 0xDC, 0x05, 0xDC, 0x05,
        0xDA, 0xF3,
    ];

    #[test]
    fn test_pump_publishes_frames() {
        let link = IbusLink::new();
        let mut producer = IbusSync::producer(&link);

        let mut stream = [0u8; 3 + 64];
        stream[..3].copy_from_slice(&[0x00, 0x13, 0x37]);
        stream[3..35].copy_from_slice(&IA6B_FRAME);
        stream[35..].copy_from_slice(&IA6B_FRAME);
        let mut uart: &[u8] = &stream;

        assert_eq!(block_on(pump_serial(&mut uart, &mut producer)), Ok(()));
        assert_eq!(link.received_count(), 2);
        assert_eq!(link.take().unwrap().as_slice(), &IA6B_FRAME);
    }
}
