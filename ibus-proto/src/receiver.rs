//! IBUS receiver: model-detecting frame sync for the producer half and the
//! checksum-verifying consumer half.

use embassy_time::Duration;
use log::debug;
use receiver_core::{
    Axis, FrameLink, FrameSync, Receiver, ReceiverConfig, ReceiverState, SerialProducer,
    CHANNEL_LOW,
};

use crate::mapping::{ibus_to_fixed, DEFAULT_CONFIG};
use crate::parser::{decode, IbusFrame, IbusModel, IBUS_CHANNEL_COUNT, IBUS_MAX_FRAME_LEN};

/// Time a receiver needs to send one frame; a longer silence between bytes
/// starts a new frame.
pub const IBUS_FRAME_GAP_US: u32 = 3_000;

/// Frame slot shared by the UART interrupt and the receiver task.
pub type IbusLink = FrameLink<IBUS_MAX_FRAME_LEN>;

/// Producer half, fed from the UART receive interrupt.
pub type IbusProducer<'a> = SerialProducer<'a, IbusSync, IBUS_MAX_FRAME_LEN>;

/// Selects the frame length from the sync byte and remembers the model.
#[derive(Debug, Clone, Copy, Default)]
pub struct IbusSync {
    model: Option<IbusModel>,
}

impl IbusSync {
    pub const fn new() -> Self {
        Self { model: None }
    }

    /// Model of the most recent frame start.
    #[inline]
    #[must_use]
    pub const fn model(&self) -> Option<IbusModel> {
        self.model
    }

    /// Producer half for `link`, resyncing on inter-frame gaps.
    #[must_use]
    pub const fn producer(link: &IbusLink) -> IbusProducer<'_> {
        SerialProducer::with_frame_gap(Self::new(), IBUS_FRAME_GAP_US, link)
    }
}

impl FrameSync for IbusSync {
    fn frame_length(&mut self, first: u8) -> Option<usize> {
        let model = IbusModel::from_sync(first)?;
        self.model = Some(model);
        Some(model.frame_len())
    }
}

/// Consumer half of an IBUS receiver.
///
/// Channels are in AETR order: roll, pitch, throttle, yaw.
pub struct IbusReceiver<'a> {
    link: &'a IbusLink,
    state: ReceiverState,
    channels: [u16; IBUS_CHANNEL_COUNT],
    model: Option<IbusModel>,
}

impl<'a> IbusReceiver<'a> {
    #[must_use]
    pub const fn new(link: &'a IbusLink) -> Self {
        Self::with_config(link, DEFAULT_CONFIG)
    }

    #[must_use]
    pub const fn with_config(link: &'a IbusLink, config: ReceiverConfig) -> Self {
        Self {
            link,
            state: ReceiverState::new(config),
            channels: [0; IBUS_CHANNEL_COUNT],
            model: None,
        }
    }

    /// Model of the last valid frame.
    #[inline]
    #[must_use]
    pub const fn model(&self) -> Option<IbusModel> {
        self.model
    }

    fn apply(&mut self, frame: &IbusFrame) {
        self.channels = frame.channels;
        self.model = Some(frame.model);

        let sticks = self.state.sticks_mut();
        for axis in Axis::ALL {
            sticks.set_raw(axis, ibus_to_fixed(frame.channels[axis.index()]));
        }

        self.state.accept_packet();
    }
}

impl Receiver for IbusReceiver<'_> {
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
            Err(err) => debug!("ibus frame rejected: {:?}", err),
        }
        true
    }

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
