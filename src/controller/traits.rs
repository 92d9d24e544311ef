use receiver_core::{FailsafePhase, StickValues};

/// Stick positions handed to the flight controller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioControls {
    /// Tick at which the sticks were read.
    pub tick_count: u32,
    pub throttle: f32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl RadioControls {
    #[must_use]
    pub const fn new(tick_count: u32, sticks: StickValues) -> Self {
        Self {
            tick_count,
            throttle: sticks.throttle,
            roll: sticks.roll,
            pitch: sticks.pitch,
            yaw: sticks.yaw,
        }
    }

    #[must_use]
    pub const fn sticks(&self) -> StickValues {
        StickValues {
            throttle: self.throttle,
            roll: self.roll,
            pitch: self.pitch,
            yaw: self.yaw,
        }
    }
}

/// Connects a receiver to whatever consumes its sticks.
///
/// The receiver task calls [`update_controls`](Self::update_controls) for
/// every processed packet and [`check_failsafe`](Self::check_failsafe) on
/// every cycle where nothing arrived.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait RadioController {
    fn update_controls(&mut self, controls: &RadioControls);

    fn check_failsafe(&mut self, tick_count: u32);

    fn failsafe_phase(&self) -> FailsafePhase;
}

impl<C: RadioController + ?Sized> RadioController for &mut C {
    fn update_controls(&mut self, controls: &RadioControls) {
        (**self).update_controls(controls);
    }

    fn check_failsafe(&mut self, tick_count: u32) {
        (**self).check_failsafe(tick_count);
    }

    fn failsafe_phase(&self) -> FailsafePhase {
        (**self).failsafe_phase()
    }
}
