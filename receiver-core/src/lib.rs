//! Platform-agnostic receiver types, framing, calibration and handoff primitives.
//!
//! This crate provides the core abstractions shared by every receiver
//! protocol without any platform-specific dependencies. It can be used both
//! in embedded `no_std` environments and on host for testing.
//!
//! # Overview
//!
//! The crate is organized into several modules:
//!
//! - [`fixed`]: IEEE-754 bit pattern to fixed-point conversion and stick normalization
//! - [`types`]: Core data structures ([`Switches`], [`Controls`], [`StickValues`], [`Eui48`])
//! - [`calibration`]: Per-axis bias capture and deadband ([`Sticks`])
//! - [`stats`]: Received/dropped packet and tick accounting ([`PacketStats`])
//! - [`signal`]: ISR-safe handoff primitives ([`DataReadySignal`], [`DataReadyQueue`])
//! - [`link`]: Newest-wins frame slot shared by producer and consumer ([`FrameLink`])
//! - [`framing`]: Byte-by-byte frame assembly ([`FrameAssembler`], [`SerialProducer`])
//! - [`receiver`]: The receiver contract ([`Receiver`], [`ReceiverState`])
//! - [`failsafe`]: Link-loss phases driven by tick counts ([`FailsafeMonitor`])
//! - [`null`]: A receiver with no radio behind it ([`NullReceiver`])
//!
//! # Data flow
//!
//! ```text
//! byte source (ISR) -> SerialProducer -> FrameLink -> Receiver::update -> Controls
//! ```
//!
//! The producer half lives in interrupt or radio-callback context and only
//! ever touches the [`FrameLink`]. The consumer half (a protocol receiver)
//! lives in exactly one task and drains the link once per poll cycle.
//!
//! # Example
//!
//! ```rust
//! use receiver_core::{bits_to_fixed, fixed_to_float, normalize};
//!
//! let one = bits_to_fixed(1.0f32.to_bits());
//! assert_eq!(one, 2048);
//! assert_eq!(fixed_to_float(one), 1.0);
//!
//! // Inside the deadband the output is pinned to zero.
//! assert_eq!(normalize(110, Some(100), 16), 0);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod calibration;
pub mod config;
pub mod failsafe;
pub mod fixed;
pub mod framing;
pub mod link;
pub mod null;
pub mod receiver;
pub mod signal;
pub mod stats;
pub mod types;

// Re-export main types at crate root
pub use calibration::{CalibrationConfig, CalibrationState, StickCalibration, Sticks};
pub use config::ReceiverConfig;
pub use failsafe::{FailsafeConfig, FailsafeMonitor, FailsafePhase, DEFAULT_FAILSAFE};
pub use fixed::{bits_to_fixed, channel_to_fixed, fixed_to_float, normalize, FIXED_MAX, FIXED_MIN, FIXED_ONE};
pub use framing::{FrameAssembler, FrameState, FrameSync, SerialProducer};
pub use link::{Frame, FrameLink};
pub use null::NullReceiver;
pub use receiver::{Receiver, ReceiverState};
pub use signal::{DataReadyQueue, DataReadySignal};
pub use stats::PacketStats;
pub use types::{
    Axis, Controls, ControlsPwm, Eui48, StickValues, Switches, CHANNEL_HIGH, CHANNEL_LOW,
    CHANNEL_MIDDLE, CHANNEL_RANGE, MOTOR_ON_OFF_SWITCH, STICK_COUNT, SWITCH_COUNT,
};
