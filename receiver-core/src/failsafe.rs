//! Link-loss detection driven by tick counts.
//!
//! The poll loop reports every processed packet with
//! [`FailsafeMonitor::on_packet`] and calls [`FailsafeMonitor::check`] on
//! cycles where nothing arrived. The monitor moves through
//! `Idle -> Active -> Disarmed` as the silence grows; any packet returns it
//! to `Idle`.

use log::{info, warn};

/// Silence thresholds, in ticks since the last packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FailsafeConfig {
    /// Silence after which failsafe engages (sticks to a safe position).
    pub activate_after_ticks: u32,
    /// Silence after which the motors are disarmed.
    pub disarm_after_ticks: u32,
}

/// One second to engage, five seconds to disarm, with a millisecond tick.
pub const DEFAULT_FAILSAFE: FailsafeConfig = FailsafeConfig {
    activate_after_ticks: 1_000,
    disarm_after_ticks: 5_000,
};

impl Default for FailsafeConfig {
    fn default() -> Self {
        DEFAULT_FAILSAFE
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailsafePhase {
    /// Link healthy, or no packet seen yet.
    #[default]
    Idle,
    /// Link silent for longer than the activation threshold.
    Active,
    /// Link silent for longer than the disarm threshold.
    Disarmed,
}

#[derive(Clone, Copy, Debug)]
pub struct FailsafeMonitor {
    config: FailsafeConfig,
    last_packet_tick: Option<u32>,
    phase: FailsafePhase,
}

impl FailsafeMonitor {
    pub const fn new(config: FailsafeConfig) -> Self {
        Self {
            config,
            last_packet_tick: None,
            phase: FailsafePhase::Idle,
        }
    }

    /// Record a packet received at `tick_count`.
    pub fn on_packet(&mut self, tick_count: u32) {
        if self.phase != FailsafePhase::Idle {
            info!("receiver link recovered");
        }
        self.last_packet_tick = Some(tick_count);
        self.phase = FailsafePhase::Idle;
    }

    /// Re-evaluate the phase at `tick_count`.
    ///
    /// Stays `Idle` until the first packet has been seen.
    pub fn check(&mut self, tick_count: u32) -> FailsafePhase {
        let Some(last) = self.last_packet_tick else {
            return self.phase;
        };

        let silence = tick_count.wrapping_sub(last);
        let phase = if silence >= self.config.disarm_after_ticks {
            FailsafePhase::Disarmed
        } else if silence >= self.config.activate_after_ticks {
            FailsafePhase::Active
        } else {
            FailsafePhase::Idle
        };

        if phase != self.phase {
            warn!("receiver failsafe {:?} after {} ticks of silence", phase, silence);
            self.phase = phase;
        }
        self.phase
    }

    #[inline]
    #[must_use]
    pub const fn phase(&self) -> FailsafePhase {
        self.phase
    }

    /// Tick of the last recorded packet.
    #[inline]
    #[must_use]
    pub const fn last_packet_tick(&self) -> Option<u32> {
        self.last_packet_tick
    }
}

impl Default for FailsafeMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_FAILSAFE)
    }
}
