//! A receiver with no radio behind it.
//!
//! Useful on boards without a receiver attached and in tests of the poll
//! loop. Controls are injected directly with [`NullReceiver::set_controls`].

use embassy_time::Duration;

use crate::config::ReceiverConfig;
use crate::receiver::{Receiver, ReceiverState};
use crate::types::{Axis, Controls, CHANNEL_HIGH, CHANNEL_LOW, CHANNEL_MIDDLE};

/// Receiver that never waits and treats every update as a packet.
pub struct NullReceiver {
    state: ReceiverState,
}

impl NullReceiver {
    /// Number of switch-backed auxiliary channels.
    pub const AUXILIARY_CHANNEL_COUNT: usize = 4;

    pub const CONFIG: ReceiverConfig = ReceiverConfig {
        auxiliary_channel_count: Self::AUXILIARY_CHANNEL_COUNT,
        ..ReceiverConfig::NONE
    };

    pub const fn new() -> Self {
        Self {
            state: ReceiverState::new(Self::CONFIG),
        }
    }

    /// Set the raw stick values returned after calibration.
    pub fn set_controls(&mut self, controls: Controls) {
        let sticks = self.state.sticks_mut();
        sticks.set_raw(Axis::Throttle, controls.throttle);
        sticks.set_raw(Axis::Roll, controls.roll);
        sticks.set_raw(Axis::Pitch, controls.pitch);
        sticks.set_raw(Axis::Yaw, controls.yaw);
    }
}

impl Default for NullReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl Receiver for NullReceiver {
    async fn wait_for_data(&mut self, _timeout: Duration) -> bool {
        false
    }

    fn update(&mut self, tick_delta: u32) -> bool {
        let received = self.state.stats().received().wrapping_add(1);
        self.state.record_packet(received, tick_delta);
        self.state.accept_packet();
        true
    }

    /// Sticks read as centered; auxiliary channels follow the switch bank.
    fn channel_raw(&self, index: usize) -> u16 {
        match index {
            0..=3 => CHANNEL_MIDDLE,
            _ => self.auxiliary_channel(index - 4),
        }
    }

    fn auxiliary_channel(&self, index: usize) -> u16 {
        if index < Self::AUXILIARY_CHANNEL_COUNT && self.switch(index) != 0 {
            CHANNEL_HIGH
        } else {
            CHANNEL_LOW
        }
    }

    fn state(&self) -> &ReceiverState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ReceiverState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn test_wait_returns_immediately() {
        let mut receiver = NullReceiver::new();
        assert!(!block_on(receiver.wait_for_data(Duration::from_secs(60))));
    }

    #[test]
    fn test_update_always_processes() {
        let mut receiver = NullReceiver::new();
        for _ in 0..3 {
            assert!(receiver.update(10));
        }
        assert!(receiver.is_new_packet_available());
        assert_eq!(receiver.dropped_packet_delta(), 0);
        assert_eq!(receiver.state().stats().packet_count(), 3);
    }

    #[test]
    fn test_auxiliary_channels_follow_switches() {
        let mut receiver = NullReceiver::new();
        assert_eq!(receiver.auxiliary_channel(1), CHANNEL_LOW);
        receiver.set_switch(1, 1);
        assert_eq!(receiver.auxiliary_channel(1), CHANNEL_HIGH);
        assert_eq!(receiver.channel_raw(5), CHANNEL_HIGH);

        receiver.set_switch(4, 3);
        assert_eq!(receiver.auxiliary_channel(4), CHANNEL_LOW);
    }

    #[test]
    fn test_set_controls() {
        let mut receiver = NullReceiver::new();
        receiver.set_controls(Controls {
            throttle: 1024,
            roll: -512,
            pitch: 0,
            yaw: 2048,
        });
        let sticks = receiver.stick_values();
        assert_eq!(sticks.throttle, 0.5);
        assert_eq!(sticks.roll, -0.25);
        assert_eq!(sticks.yaw, 1.0);
    }
}
