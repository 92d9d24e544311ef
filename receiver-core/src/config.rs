//! Compile-time receiver configuration.

use crate::calibration::CalibrationConfig;

/// Construction-time settings shared by all receiver variants.
///
/// Each protocol crate exports a default const of this type, in the same
/// way a mapping table is provided as a const and overridden by building a
/// new value.
///
/// # Example
///
/// ```
/// use receiver_core::{CalibrationConfig, ReceiverConfig};
///
/// const MY_CONFIG: ReceiverConfig = ReceiverConfig {
///     auxiliary_channel_count: 4,
///     calibration: CalibrationConfig {
///         bias_capture_packet: Some(10),
///         deadband: 16,
///     },
/// };
/// assert_eq!(MY_CONFIG.with_deadband(8).calibration.deadband, 8);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceiverConfig {
    /// Number of auxiliary channels beyond the four sticks.
    pub auxiliary_channel_count: usize,
    /// Bias capture and deadband.
    pub calibration: CalibrationConfig,
}

impl ReceiverConfig {
    /// No auxiliary channels, no automatic bias capture.
    pub const NONE: Self = Self {
        auxiliary_channel_count: 0,
        calibration: CalibrationConfig::MANUAL,
    };

    #[must_use]
    pub const fn with_deadband(mut self, deadband: i32) -> Self {
        self.calibration.deadband = deadband;
        self
    }

    #[must_use]
    pub const fn with_bias_capture(mut self, packet: Option<u32>) -> Self {
        self.calibration.bias_capture_packet = packet;
        self
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self::NONE
    }
}
