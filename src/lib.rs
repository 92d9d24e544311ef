//! Radio receiver decode and normalize layer.
//!
//! Re-exports the protocol crates enabled by Cargo features and adds the
//! pieces that sit above a single receiver: a runtime-selectable
//! [`AnyReceiver`], the [`ReceiverTask`] poll loop, the [`RadioController`]
//! contract with a signal-based implementation, and telemetry packing.
//!
//! # Example
//!
//! ```ignore
//! use rc_receiver::{ControlsSignal, ReceiverTask, SignalController, DEFAULT_FAILSAFE};
//! use rc_receiver::sbus::{SbusLink, SbusReceiver, SbusSync};
//!
//! static LINK: SbusLink = SbusLink::new();
//! static CONTROLS: ControlsSignal = ControlsSignal::new();
//!
//! // UART interrupt: SbusSync::producer(&LINK).on_data_received(byte)
//!
//! let controller = SignalController::new(&CONTROLS, DEFAULT_FAILSAFE);
//! let mut task = ReceiverTask::new(SbusReceiver::new(&LINK), controller);
//! task.run(Duration::from_millis(50)).await;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod any;
pub mod controller;
#[cfg(any(test, feature = "embedded-io"))]
pub mod pump;
pub mod task;
pub mod telemetry;

pub use any::{AnyReceiver, AnyTransceiver};
pub use controller::{ControlsSignal, RadioController, RadioControls, SignalController};
pub use task::{ReceiverTask, ReceiverWatcher};
pub use telemetry::{pack_receiver_telemetry, TelemetryError, RECEIVER_TELEMETRY_LEN};

pub use receiver_core::*;

#[cfg(feature = "proto-ibus")]
pub use ibus_proto as ibus;
#[cfg(feature = "proto-joystick")]
pub use joystick_proto as joystick;
#[cfg(feature = "proto-sbus")]
pub use sbus_proto as sbus;

#[cfg(any(test, feature = "embedded-io"))]
pub use pump::pump_serial;
