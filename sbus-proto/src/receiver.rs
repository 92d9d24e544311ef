//! SBUS receiver: frame sync for the producer half and the decoding
//! consumer half.

use embassy_time::Duration;
use log::debug;
use receiver_core::{
    Axis, FrameLink, FrameSync, Receiver, ReceiverConfig, ReceiverState, SerialProducer,
    CHANNEL_LOW,
};

use crate::frame::{decode, SbusFrame, SbusStatus, SBUS_CHANNEL_COUNT, SBUS_FRAME_LEN, SBUS_HEADER};
use crate::mapping::{sbus_to_fixed, DEFAULT_CONFIG};

/// Silence between bytes that marks the start of a new frame.
pub const SBUS_FRAME_GAP_US: u32 = 2_000;

/// Frame slot shared by the UART interrupt and the receiver task.
pub type SbusLink = FrameLink<SBUS_FRAME_LEN>;

/// Producer half, fed from the UART receive interrupt.
pub type SbusProducer<'a> = SerialProducer<'a, SbusSync, SBUS_FRAME_LEN>;

/// Frames start with the 0x0F header and are always 25 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SbusSync;

impl FrameSync for SbusSync {
    fn frame_length(&mut self, first: u8) -> Option<usize> {
        (first == SBUS_HEADER).then_some(SBUS_FRAME_LEN)
    }
}

impl SbusSync {
    /// Producer half for `link`, resyncing on inter-frame gaps.
    #[must_use]
    pub const fn producer(link: &SbusLink) -> SbusProducer<'_> {
        SerialProducer::with_frame_gap(SbusSync, SBUS_FRAME_GAP_US, link)
    }
}

/// Consumer half of an SBUS receiver.
///
/// Channels 0..4 drive roll, pitch, yaw and throttle in that order.
pub struct SbusReceiver<'a> {
    link: &'a SbusLink,
    state: ReceiverState,
    channels: [u16; SBUS_CHANNEL_COUNT],
    status: SbusStatus,
}

impl<'a> SbusReceiver<'a> {
    #[must_use]
    pub const fn new(link: &'a SbusLink) -> Self {
        Self::with_config(link, DEFAULT_CONFIG)
    }

    #[must_use]
    pub const fn with_config(link: &'a SbusLink, config: ReceiverConfig) -> Self {
        Self {
            link,
            state: ReceiverState::new(config),
            channels: [0; SBUS_CHANNEL_COUNT],
            status: SbusStatus {
                frame_lost: false,
                failsafe: false,
            },
        }
    }

    /// Link status from the last valid frame.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> SbusStatus {
        self.status
    }

    fn apply(&mut self, frame: &SbusFrame) {
        self.channels = frame.channels;
        self.status = frame.status;

        let sticks = self.state.sticks_mut();
        sticks.set_raw(Axis::Roll, sbus_to_fixed(frame.channels[0]));
        sticks.set_raw(Axis::Pitch, sbus_to_fixed(frame.channels[1]));
        sticks.set_raw(Axis::Yaw, sbus_to_fixed(frame.channels[2]));
        sticks.set_raw(Axis::Throttle, sbus_to_fixed(frame.channels[3]));

        self.state.accept_packet();
    }
}

impl Receiver for SbusReceiver<'_> {
    async fn wait_for_data(&mut self, timeout: Duration) -> bool {
        self.link.wait(timeout).await
    }

    fn update(&mut self, tick_delta: u32) -> bool {
        let Some(frame) = self.link.take() else {
            return false;
        };
        self.state.record_packet(self.link.received_count(), tick_delta);

        match decode(&frame) {
            Ok(decoded) => self.apply(&decoded),
            Err(err) => debug!("sbus frame rejected: {:?}", err),
        }
        true
    }

    /// Channels 0..16 in SBUS units, 16 and 17 as switch levels.
    fn channel_raw(&self, index: usize) -> u16 {
        self.channels.get(index).copied().unwrap_or(CHANNEL_LOW)
    }

    fn state(&self) -> &ReceiverState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ReceiverState {
        &mut self.state
    }
}
