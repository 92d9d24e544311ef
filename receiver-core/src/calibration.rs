//! Per-axis stick calibration: zero-bias capture and deadband.
//!
//! Raw stick readings pass through unchanged until a bias has been captured.
//! Capture happens once, on the configured valid packet, so that transient
//! startup readings have settled; after that every axis is reported relative
//! to its captured center with a symmetric deadband around it.

use log::debug;

use crate::fixed::normalize;
use crate::types::{Axis, Controls, STICK_COUNT};

/// Compile-time calibration settings of a receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationConfig {
    /// Valid packet number (1-based) on which the bias is captured.
    /// `None` disables automatic capture.
    pub bias_capture_packet: Option<u32>,
    /// Deadband half-width applied once calibrated.
    pub deadband: i32,
}

impl CalibrationConfig {
    /// Capture the bias on the fifth valid packet.
    pub const AUTO: Self = Self {
        bias_capture_packet: Some(5),
        deadband: 0,
    };

    /// Never capture a bias automatically.
    pub const MANUAL: Self = Self {
        bias_capture_packet: None,
        deadband: 0,
    };
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self::AUTO
    }
}

/// Whether a bias has been captured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationState {
    #[default]
    Uncalibrated,
    Calibrated,
}

/// Raw reading, bias and deadband of one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StickCalibration {
    pub raw: i32,
    pub bias: i32,
    pub deadband: i32,
}

/// The four primary sticks with their calibration state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sticks {
    axes: [StickCalibration; STICK_COUNT],
    state: CalibrationState,
    config: CalibrationConfig,
    valid_packets: u32,
}

impl Sticks {
    pub const fn new(config: CalibrationConfig) -> Self {
        let axis = StickCalibration {
            raw: 0,
            bias: 0,
            deadband: config.deadband,
        };
        Self {
            axes: [axis; STICK_COUNT],
            state: CalibrationState::Uncalibrated,
            config,
            valid_packets: 0,
        }
    }

    #[inline]
    pub fn set_raw(&mut self, axis: Axis, raw: i32) {
        self.axes[axis.index()].raw = raw;
    }

    #[inline]
    #[must_use]
    pub fn raw(&self, axis: Axis) -> i32 {
        self.axes[axis.index()].raw
    }

    #[inline]
    #[must_use]
    pub fn axis(&self, axis: Axis) -> StickCalibration {
        self.axes[axis.index()]
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> CalibrationState {
        self.state
    }

    #[inline]
    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        matches!(self.state, CalibrationState::Calibrated)
    }

    /// Count a successfully decoded packet whose raw readings have already
    /// been stored. Captures the bias if this is the configured packet.
    ///
    /// Returns true if the bias was captured by this call.
    pub fn on_valid_packet(&mut self) -> bool {
        self.valid_packets = self.valid_packets.saturating_add(1);
        match self.config.bias_capture_packet {
            Some(capture_at) if self.valid_packets == capture_at && !self.is_calibrated() => {
                self.set_current_readings_to_bias();
                true
            }
            _ => false,
        }
    }

    /// Capture the current raw readings as the per-axis bias.
    pub fn set_current_readings_to_bias(&mut self) {
        for axis in &mut self.axes {
            axis.bias = axis.raw;
        }
        self.state = CalibrationState::Calibrated;
        debug!(
            "stick bias captured: roll={} pitch={} throttle={} yaw={}",
            self.axes[0].bias, self.axes[1].bias, self.axes[2].bias, self.axes[3].bias
        );
    }

    /// Forget bias and deadband. Automatic capture does not run again
    /// until [`recalibrate`](Self::recalibrate) is called.
    pub fn reset_sticks(&mut self) {
        for axis in &mut self.axes {
            axis.bias = 0;
            axis.deadband = 0;
        }
        self.state = CalibrationState::Uncalibrated;
    }

    /// Reset and restart the capture countdown from zero.
    pub fn recalibrate(&mut self) {
        self.reset_sticks();
        self.valid_packets = 0;
    }

    /// Set the deadband of every axis.
    pub fn set_deadband(&mut self, deadband: i32) {
        for axis in &mut self.axes {
            axis.deadband = deadband;
        }
    }

    /// Calibrated value of `axis`.
    #[must_use]
    pub fn normalized(&self, axis: Axis) -> i32 {
        let stick = self.axes[axis.index()];
        let bias = self.is_calibrated().then_some(stick.bias);
        normalize(stick.raw, bias, stick.deadband)
    }

    /// Calibrated values of all four axes.
    #[must_use]
    pub fn controls(&self) -> Controls {
        Controls {
            throttle: self.normalized(Axis::Throttle),
            roll: self.normalized(Axis::Roll),
            pitch: self.normalized(Axis::Pitch),
            yaw: self.normalized(Axis::Yaw),
        }
    }
}

impl Default for Sticks {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}
