//! The receiver contract shared by every protocol variant.

use core::future::Future;

use embassy_time::Duration;
use portable_atomic::{AtomicBool, Ordering};

use crate::calibration::Sticks;
use crate::config::ReceiverConfig;
use crate::stats::PacketStats;
use crate::types::{
    Controls, ControlsPwm, Eui48, StickValues, Switches, CHANNEL_LOW, STICK_COUNT,
};

/// Bookkeeping common to all receivers: calibrated sticks, switch bank,
/// packet counters and the new-packet flag.
pub struct ReceiverState {
    sticks: Sticks,
    switches: Switches,
    stats: PacketStats,
    auxiliary_channel_count: usize,
    packet_received: bool,
    // Written by the decode path and read by the poll loop without any
    // further synchronization. A reader may see a value one cycle stale.
    new_packet_available: AtomicBool,
}

impl ReceiverState {
    pub const fn new(config: ReceiverConfig) -> Self {
        Self {
            sticks: Sticks::new(config.calibration),
            switches: Switches::NONE,
            stats: PacketStats::new(),
            auxiliary_channel_count: config.auxiliary_channel_count,
            packet_received: false,
            new_packet_available: AtomicBool::new(false),
        }
    }

    /// Record one processed frame, valid or not.
    pub fn record_packet(&mut self, received: u32, tick_delta: u32) {
        self.packet_received = true;
        self.stats.record(received, tick_delta);
    }

    /// Finish a successfully decoded frame whose raw sticks and switches are
    /// already stored: advance calibration and raise the new-packet flag.
    pub fn accept_packet(&mut self) {
        self.sticks.on_valid_packet();
        self.set_new_packet_available();
    }

    #[inline]
    #[must_use]
    pub const fn sticks(&self) -> &Sticks {
        &self.sticks
    }

    #[inline]
    pub fn sticks_mut(&mut self) -> &mut Sticks {
        &mut self.sticks
    }

    #[inline]
    #[must_use]
    pub const fn switches(&self) -> Switches {
        self.switches
    }

    #[inline]
    pub fn switches_mut(&mut self) -> &mut Switches {
        &mut self.switches
    }

    #[inline]
    #[must_use]
    pub const fn stats(&self) -> &PacketStats {
        &self.stats
    }

    #[inline]
    #[must_use]
    pub const fn auxiliary_channel_count(&self) -> usize {
        self.auxiliary_channel_count
    }

    #[inline]
    #[must_use]
    pub const fn is_packet_received(&self) -> bool {
        self.packet_received
    }

    #[inline]
    #[must_use]
    pub fn is_new_packet_available(&self) -> bool {
        self.new_packet_available.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_new_packet_available(&self) {
        self.new_packet_available.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn clear_new_packet_available(&self) {
        self.new_packet_available.store(false, Ordering::Relaxed);
    }
}

/// A polled radio receiver.
///
/// Implementations decode frames handed over by their producer half (a
/// serial interrupt or a radio callback) and expose the result as
/// normalized sticks, switches and auxiliary channels.
///
/// # Polling
///
/// The consumer task calls [`wait_for_data`](Self::wait_for_data) and then
/// [`update`](Self::update) once per cycle. `update` returns true whenever a
/// frame was processed, even one that failed to decode, since any frame
/// proves the link is alive. Only valid frames change published state.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait Receiver {
    /// Wait until the producer signals a frame or `timeout` elapses.
    ///
    /// Returns true if data arrived, false on timeout.
    fn wait_for_data(&mut self, timeout: Duration) -> impl Future<Output = bool>;

    /// Process the pending frame, if any.
    fn update(&mut self, tick_delta: u32) -> bool;

    /// Raw value of channel `index` as last decoded.
    fn channel_raw(&self, index: usize) -> u16;

    fn state(&self) -> &ReceiverState;

    fn state_mut(&mut self) -> &mut ReceiverState;

    /// Calibrated sticks in fixed point.
    fn controls(&self) -> Controls {
        self.state().sticks().controls()
    }

    /// Calibrated sticks as floats in [-1, 1].
    fn stick_values(&self) -> StickValues {
        self.controls().to_stick_values()
    }

    /// Calibrated sticks as pulse widths.
    fn controls_pwm(&self) -> ControlsPwm {
        self.controls().to_pwm()
    }

    fn auxiliary_channel_count(&self) -> usize {
        self.state().auxiliary_channel_count()
    }

    /// Auxiliary channel `index`, or [`CHANNEL_LOW`] when out of range.
    fn auxiliary_channel(&self, index: usize) -> u16 {
        if index >= self.auxiliary_channel_count() {
            return CHANNEL_LOW;
        }
        self.channel_raw(index + STICK_COUNT)
    }

    fn switch(&self, index: usize) -> u8 {
        self.state().switches().get(index)
    }

    fn set_switch(&mut self, index: usize, value: u8) {
        self.state_mut().switches_mut().set(index, value);
    }

    fn switches(&self) -> Switches {
        self.state().switches()
    }

    fn dropped_packet_delta(&self) -> i32 {
        self.state().stats().dropped_delta()
    }

    fn tick_delta(&self) -> u32 {
        self.state().stats().tick_delta()
    }

    fn is_packet_received(&self) -> bool {
        self.state().is_packet_received()
    }

    fn is_new_packet_available(&self) -> bool {
        self.state().is_new_packet_available()
    }

    fn clear_new_packet_available(&self) {
        self.state().clear_new_packet_available();
    }

    /// Forget the captured stick bias and deadband.
    fn reset_sticks(&mut self) {
        self.state_mut().sticks_mut().reset_sticks();
    }

    /// Hardware identity of this receiver. Zero for wired receivers.
    fn my_eui(&self) -> Eui48 {
        Eui48::ZERO
    }

    /// Identity of the transmitter this receiver is bound to, if known.
    fn primary_peer_eui(&self) -> Eui48 {
        Eui48::ZERO
    }

    /// Announce this receiver's identity for pairing. No-op for wired receivers.
    fn broadcast_my_eui(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationConfig;
    use crate::types::{Axis, CHANNEL_HIGH};

    /// Receiver whose channel `i` reads as `1000 + i`.
    struct Counting {
        state: ReceiverState,
    }

    impl Receiver for Counting {
        async fn wait_for_data(&mut self, _timeout: Duration) -> bool {
            false
        }

        fn update(&mut self, tick_delta: u32) -> bool {
            let received = self.state.stats().received() + 1;
            self.state.record_packet(received, tick_delta);
            self.state.sticks_mut().set_raw(Axis::Throttle, 2048);
            self.state.accept_packet();
            true
        }

        fn channel_raw(&self, index: usize) -> u16 {
            CHANNEL_LOW + index as u16
        }

        fn state(&self) -> &ReceiverState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut ReceiverState {
            &mut self.state
        }
    }

    fn counting(aux: usize) -> Counting {
        Counting {
            state: ReceiverState::new(ReceiverConfig {
                auxiliary_channel_count: aux,
                calibration: CalibrationConfig::MANUAL,
            }),
        }
    }

    #[test]
    fn test_auxiliary_channel_offsets_past_sticks() {
        let receiver = counting(2);
        assert_eq!(receiver.auxiliary_channel(0), CHANNEL_LOW + 4);
        assert_eq!(receiver.auxiliary_channel(1), CHANNEL_LOW + 5);
    }

    #[test]
    fn test_auxiliary_channel_out_of_range_is_low() {
        let mut receiver = counting(2);
        for index in 0..16 {
            receiver.set_switch(index, 3);
        }
        assert_eq!(receiver.auxiliary_channel(2), CHANNEL_LOW);
        assert_eq!(receiver.auxiliary_channel(100), CHANNEL_LOW);
    }

    #[test]
    fn test_update_sets_flag_and_counters() {
        let mut receiver = counting(0);
        assert!(!receiver.is_packet_received());
        assert!(!receiver.is_new_packet_available());

        assert!(receiver.update(7));
        assert!(receiver.is_packet_received());
        assert!(receiver.is_new_packet_available());
        assert_eq!(receiver.tick_delta(), 7);
        assert_eq!(receiver.dropped_packet_delta(), 0);

        receiver.clear_new_packet_available();
        assert!(!receiver.is_new_packet_available());
    }

    #[test]
    fn test_default_accessors() {
        let mut receiver = counting(0);
        receiver.update(1);
        assert_eq!(receiver.stick_values().throttle, 1.0);
        assert_eq!(receiver.controls_pwm().throttle, CHANNEL_HIGH);
        assert_eq!(receiver.my_eui(), Eui48::ZERO);
        assert_eq!(receiver.primary_peer_eui(), Eui48::ZERO);
    }
}
