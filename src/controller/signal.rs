use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use receiver_core::{FailsafeConfig, FailsafeMonitor, FailsafePhase, StickValues};

use super::traits::{RadioController, RadioControls};

/// Latest-wins mailbox between the receiver task and the flight-control task.
pub type ControlsSignal = Signal<CriticalSectionRawMutex, RadioControls>;

/// Publishes controls through a [`ControlsSignal`] and tracks link loss.
///
/// When the failsafe engages or disarms, the failsafe sticks are published
/// once so the consumer does not keep acting on the last packet.
pub struct SignalController<'a> {
    signal: &'a ControlsSignal,
    failsafe: FailsafeMonitor,
    failsafe_sticks: StickValues,
}

impl<'a> SignalController<'a> {
    #[must_use]
    pub const fn new(signal: &'a ControlsSignal, config: FailsafeConfig) -> Self {
        Self {
            signal,
            failsafe: FailsafeMonitor::new(config),
            failsafe_sticks: StickValues::NEUTRAL,
        }
    }

    /// Sticks published when the failsafe engages. Centered by default.
    #[must_use]
    pub const fn with_failsafe_sticks(mut self, sticks: StickValues) -> Self {
        self.failsafe_sticks = sticks;
        self
    }

    #[inline]
    #[must_use]
    pub const fn monitor(&self) -> &FailsafeMonitor {
        &self.failsafe
    }
}

impl RadioController for SignalController<'_> {
    fn update_controls(&mut self, controls: &RadioControls) {
        self.failsafe.on_packet(controls.tick_count);
        self.signal.signal(*controls);
    }

    fn check_failsafe(&mut self, tick_count: u32) {
        let previous = self.failsafe.phase();
        let phase = self.failsafe.check(tick_count);
        if phase != previous && phase != FailsafePhase::Idle {
            self.signal
                .signal(RadioControls::new(tick_count, self.failsafe_sticks));
        }
    }

    fn failsafe_phase(&self) -> FailsafePhase {
        self.failsafe.phase()
    }
}
