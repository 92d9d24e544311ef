//! Atom JoyStick receiver.

use embassy_time::{Duration, Timer};
use log::{debug, trace, warn};
use receiver_core::{
    Axis, CalibrationConfig, Eui48, Receiver, ReceiverConfig, ReceiverState, CHANNEL_HIGH,
    CHANNEL_LOW, MOTOR_ON_OFF_SWITCH, STICK_COUNT, SWITCH_COUNT,
};

use crate::packet::{decode, DecodeError, JoystickPacket, ALT_MODE_MANUAL};
use crate::radio::{pairing_packet, RadioError, RadioLink, Transceiver};

/// Stable / sport mode switch.
pub const MODE_SWITCH: usize = 1;

/// Altitude hold switch.
pub const ALT_MODE_SWITCH: usize = 2;

/// The joystick has no auxiliary channels of its own; every switch is
/// exposed in their place, so switches set by the flight code show up too.
pub const JOYSTICK_AUX_CHANNEL_COUNT: usize = SWITCH_COUNT;

/// Receiver settings for the joystick: stick bias captured on the fifth
/// valid packet, since the sticks rest wherever the springs leave them.
pub const DEFAULT_CONFIG: ReceiverConfig = ReceiverConfig {
    auxiliary_channel_count: JOYSTICK_AUX_CHANNEL_COUNT,
    calibration: CalibrationConfig::AUTO,
};

/// Consumer half of the joystick receiver.
pub struct JoystickReceiver<'a, T> {
    link: &'a RadioLink,
    transceiver: T,
    state: ReceiverState,
    last_packet: JoystickPacket,
}

impl<'a, T: Transceiver> JoystickReceiver<'a, T> {
    #[must_use]
    pub const fn new(link: &'a RadioLink, transceiver: T) -> Self {
        Self::with_config(link, transceiver, DEFAULT_CONFIG)
    }

    #[must_use]
    pub const fn with_config(link: &'a RadioLink, transceiver: T, config: ReceiverConfig) -> Self {
        Self {
            link,
            transceiver,
            state: ReceiverState::new(config),
            last_packet: JoystickPacket {
                yaw: 0,
                throttle: 0,
                roll: 0,
                pitch: 0,
                arm: 0,
                flip: 0,
                mode: 0,
                alt_mode: 0,
                proactive: 0,
            },
        }
    }

    /// Last valid packet, including the flags not mapped to switches.
    #[inline]
    #[must_use]
    pub const fn last_packet(&self) -> &JoystickPacket {
        &self.last_packet
    }

    #[inline]
    #[must_use]
    pub const fn transceiver(&self) -> &T {
        &self.transceiver
    }

    /// Send the pairing broadcast once.
    pub fn broadcast_pairing(&self) -> Result<(), RadioError> {
        let packet = pairing_packet(
            self.transceiver.broadcast_channel(),
            &self.transceiver.my_mac(),
        );
        self.transceiver.broadcast(&packet)
    }

    /// Send the pairing broadcast `count` times, `interval` apart.
    pub async fn broadcast_for_binding(
        &self,
        count: usize,
        interval: Duration,
    ) -> Result<(), RadioError> {
        for i in 0..count {
            if i > 0 {
                Timer::after(interval).await;
            }
            self.broadcast_pairing()?;
        }
        Ok(())
    }

    fn apply(&mut self, packet: &JoystickPacket) {
        self.last_packet = *packet;

        let sticks = self.state.sticks_mut();
        sticks.set_raw(Axis::Yaw, packet.yaw);
        sticks.set_raw(Axis::Throttle, packet.throttle);
        sticks.set_raw(Axis::Roll, packet.roll);
        sticks.set_raw(Axis::Pitch, packet.pitch);

        let switches = self.state.switches_mut();
        switches.set(MOTOR_ON_OFF_SWITCH, packet.flip);
        switches.set(MODE_SWITCH, packet.mode);
        switches.set(
            ALT_MODE_SWITCH,
            if packet.alt_mode == ALT_MODE_MANUAL { 0 } else { 1 },
        );

        self.state.accept_packet();
    }
}

impl<T: Transceiver> Receiver for JoystickReceiver<'_, T> {
    async fn wait_for_data(&mut self, timeout: Duration) -> bool {
        self.link.primary().wait(timeout).await
    }

    fn update(&mut self, tick_delta: u32) -> bool {
        let Some(frame) = self.link.primary().take() else {
            return false;
        };

        let decoded = decode(&frame, &self.link.my_mac());
        if decoded == Err(DecodeError::Identity) {
            trace!("joystick packet for another receiver");
            return false;
        }
        self.state
            .record_packet(self.link.primary().received_count(), tick_delta);

        match decoded {
            Ok(packet) => self.apply(&packet),
            Err(err) => debug!("joystick packet rejected: {:?}", err),
        }
        true
    }

    /// Sticks as pulse widths in AETR order, then the auxiliary channels.
    fn channel_raw(&self, index: usize) -> u16 {
        if index < STICK_COUNT {
            let pwm = self.controls_pwm();
            return match Axis::ALL[index] {
                Axis::Roll => pwm.roll,
                Axis::Pitch => pwm.pitch,
                Axis::Throttle => pwm.throttle,
                Axis::Yaw => pwm.yaw,
            };
        }
        self.auxiliary_channel(index - STICK_COUNT)
    }

    fn state(&self) -> &ReceiverState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ReceiverState {
        &mut self.state
    }

    /// Switch `index` as a channel: high when on, low when off.
    fn auxiliary_channel(&self, index: usize) -> u16 {
        if index < self.auxiliary_channel_count() && self.switch(index) != 0 {
            CHANNEL_HIGH
        } else {
            CHANNEL_LOW
        }
    }

    fn my_eui(&self) -> Eui48 {
        self.link.my_mac()
    }

    fn primary_peer_eui(&self) -> Eui48 {
        self.link.primary_peer().unwrap_or(Eui48::ZERO)
    }

    fn broadcast_my_eui(&self) {
        if let Err(err) = self.broadcast_pairing() {
            warn!("pairing broadcast failed: {:?}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::cell::RefCell;
    use std::vec::Vec;

    use super::*;
    use crate::packet::tests::{build_packet, MY_MAC};
    use receiver_core::{FIXED_MAX, FIXED_MIN};
    use crate::packet::JOYSTICK_PACKET_LEN;
    use embassy_futures::block_on;

    const JOYSTICK: Eui48 = Eui48([0x4C, 0x75, 0x25, 0x10, 0x20, 0x30]);

    #[derive(Default)]
    struct FakeRadio {
        sent: RefCell<Vec<Vec<u8>>>,
        fail: bool,
    }

    impl Transceiver for &FakeRadio {
        fn my_mac(&self) -> Eui48 {
            MY_MAC
        }

        fn broadcast_channel(&self) -> u8 {
            1
        }

        fn broadcast(&self, data: &[u8]) -> Result<(), RadioError> {
            if self.fail {
                return Err(RadioError::Send);
            }
            self.sent.borrow_mut().push(Vec::from(data));
            Ok(())
        }
    }

    fn send(link: &RadioLink, sticks: [f32; 4], flags: [u8; 5]) {
        let packet = build_packet(&MY_MAC, sticks, flags);
        assert!(link.on_data_received(JOYSTICK, &packet));
    }

    #[test]
    fn test_update_maps_sticks_and_switches() {
        let radio = FakeRadio::default();
        let link = RadioLink::new(MY_MAC);
        let mut receiver = JoystickReceiver::new(&link, &radio);

        // yaw, throttle, roll, pitch; arm, flip, mode, alt, proactive
        send(&link, [0.5, 1.0, -0.25, -0.5], [1, 1, 1, 5, 0]);
        assert!(block_on(receiver.wait_for_data(Duration::from_millis(5))));
        assert!(receiver.update(10));

        let controls = receiver.controls();
        assert_eq!(controls.yaw, 1024);
        assert_eq!(controls.throttle, FIXED_MAX);
        assert_eq!(controls.roll, -512);
        assert_eq!(controls.pitch, 1024);
        assert_eq!(receiver.switch(MOTOR_ON_OFF_SWITCH), 1);
        assert_eq!(receiver.switch(MODE_SWITCH), 1);
        assert_eq!(receiver.switch(ALT_MODE_SWITCH), 1);
        assert_eq!(receiver.last_packet().arm, 1);
        assert_eq!(receiver.primary_peer_eui(), JOYSTICK);
        assert_eq!(receiver.my_eui(), MY_MAC);

        send(&link, [0.0; 4], [0, 0, 0, ALT_MODE_MANUAL, 0]);
        assert!(receiver.update(10));
        assert_eq!(receiver.switch(MOTOR_ON_OFF_SWITCH), 0);
        assert_eq!(receiver.switch(ALT_MODE_SWITCH), 0);
    }

    #[test]
    fn test_bias_captured_on_fifth_valid_packet() {
        let radio = FakeRadio::default();
        let link = RadioLink::new(MY_MAC);
        let mut receiver = JoystickReceiver::new(&link, &radio);

        for _ in 0..4 {
            send(&link, [0.0, 0.0, 0.125, 0.0], [0; 5]);
            receiver.update(1);
        }
        assert!(!receiver.state().sticks().is_calibrated());
        assert_eq!(receiver.controls().roll, 256);

        send(&link, [0.0, 0.0, 0.125, 0.0], [0; 5]);
        receiver.update(1);
        assert!(receiver.state().sticks().is_calibrated());
        assert_eq!(receiver.controls().roll, 0);

        // later packets are measured against the captured bias
        send(&link, [0.0, 0.0, 0.25, 0.0], [0; 5]);
        receiver.update(1);
        assert_eq!(receiver.controls().roll, 256);
    }

    #[test]
    fn test_huge_stick_maps_to_channel_end() {
        let radio = FakeRadio::default();
        let link = RadioLink::new(MY_MAC);
        let mut receiver = JoystickReceiver::new(&link, &radio);

        send(&link, [3000.0, 0.0, -3000.0, 0.0], [0; 5]);
        assert!(receiver.update(1));
        assert_eq!(receiver.controls().yaw, FIXED_MAX);
        assert_eq!(receiver.controls().roll, FIXED_MIN);
        assert_eq!(receiver.channel_raw(3), CHANNEL_HIGH);
        assert_eq!(receiver.channel_raw(0), CHANNEL_LOW);
    }

    #[test]
    fn test_infinite_stick_after_bias_stays_finite() {
        let radio = FakeRadio::default();
        let link = RadioLink::new(MY_MAC);
        let mut receiver = JoystickReceiver::new(&link, &radio);

        for _ in 0..5 {
            send(&link, [-0.25, 0.0, 0.0, 0.0], [0; 5]);
            receiver.update(1);
        }
        assert!(receiver.state().sticks().is_calibrated());

        send(&link, [f32::INFINITY, 0.0, 0.0, f32::NAN], [0; 5]);
        assert!(receiver.update(1));
        // full deflection measured from the captured -512 bias
        assert_eq!(receiver.controls().yaw, FIXED_MAX + 512);
        assert_eq!(receiver.channel_raw(3), CHANNEL_HIGH);
        let pitch = receiver.channel_raw(1);
        assert!((CHANNEL_LOW..=CHANNEL_HIGH).contains(&pitch));
    }

    #[test]
    fn test_bad_checksum_keeps_state_but_counts() {
        let radio = FakeRadio::default();
        let link = RadioLink::new(MY_MAC);
        let mut receiver = JoystickReceiver::new(&link, &radio);
        send(&link, [0.0, 0.5, 0.0, 0.0], [0; 5]);
        receiver.update(1);
        receiver.clear_new_packet_available();

        let mut packet = build_packet(&MY_MAC, [0.0, -0.5, 0.0, 0.0], [0; 5]);
        packet[8] ^= 0x01;
        assert!(link.on_data_received(JOYSTICK, &packet[..JOYSTICK_PACKET_LEN]));

        assert!(receiver.update(1));
        assert!(!receiver.is_new_packet_available());
        assert_eq!(receiver.controls().throttle, 1024);
        assert_eq!(receiver.state().stats().packet_count(), 2);
        assert_eq!(receiver.dropped_packet_delta(), 0);
    }

    #[test]
    fn test_foreign_packet_not_counted() {
        let radio = FakeRadio::default();
        let link = RadioLink::new(MY_MAC);
        let mut receiver = JoystickReceiver::new(&link, &radio);

        let other = Eui48([0, 0, 0, 9, 9, 9]);
        let packet = build_packet(&other, [0.0; 4], [0; 5]);
        assert!(!link.on_data_received(JOYSTICK, &packet));

        assert!(!receiver.update(1));
        assert!(!receiver.is_packet_received());
        assert_eq!(receiver.state().stats().packet_count(), 0);
        assert_eq!(receiver.primary_peer_eui(), Eui48::ZERO);
    }

    #[test]
    fn test_aux_channels_follow_switches() {
        let radio = FakeRadio::default();
        let link = RadioLink::new(MY_MAC);
        let mut receiver = JoystickReceiver::new(&link, &radio);
        send(&link, [0.0; 4], [0, 1, 0, ALT_MODE_MANUAL, 0]);
        receiver.update(1);

        assert_eq!(receiver.auxiliary_channel_count(), SWITCH_COUNT);
        assert_eq!(receiver.auxiliary_channel(MOTOR_ON_OFF_SWITCH), CHANNEL_HIGH);
        assert_eq!(receiver.auxiliary_channel(MODE_SWITCH), CHANNEL_LOW);
        assert_eq!(receiver.channel_raw(STICK_COUNT), CHANNEL_HIGH);

        // switches beyond the three the joystick drives are exposed as well
        receiver.set_switch(15, 1);
        assert_eq!(receiver.auxiliary_channel(15), CHANNEL_HIGH);
        assert_eq!(receiver.channel_raw(STICK_COUNT + 15), CHANNEL_HIGH);
        assert_eq!(receiver.auxiliary_channel(SWITCH_COUNT), CHANNEL_LOW);
        assert_eq!(receiver.auxiliary_channel(50), CHANNEL_LOW);
    }

    #[test]
    fn test_broadcast_my_eui_sends_pairing_packet() {
        let radio = FakeRadio::default();
        let link = RadioLink::new(MY_MAC);
        let receiver = JoystickReceiver::new(&link, &radio);

        receiver.broadcast_my_eui();
        block_on(receiver.broadcast_for_binding(2, Duration::from_millis(1))).unwrap();

        let sent = radio.sent.borrow();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].as_slice(), &pairing_packet(1, &MY_MAC));
    }

    #[test]
    fn test_broadcast_failure_is_reported() {
        let radio = FakeRadio {
            fail: true,
            ..FakeRadio::default()
        };
        let link = RadioLink::new(MY_MAC);
        let receiver = JoystickReceiver::new(&link, &radio);

        receiver.broadcast_my_eui();
        assert_eq!(
            block_on(receiver.broadcast_for_binding(3, Duration::from_millis(1))),
            Err(RadioError::Send)
        );
    }
}
