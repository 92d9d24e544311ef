//! SBUS frame decoding and receiver.
//!
//! This crate provides chip-agnostic SBUS framing and decoding on top of
//! `receiver-core`. Bytes are pushed one at a time from any UART receive
//! interrupt; the decoded channels are exposed through the
//! [`Receiver`](receiver_core::Receiver) contract.
//!
//! # Features
//!
//! - 25-byte frame sync on the 0x0F header, with optional inter-frame gap resync
//! - Explicit shift/mask extraction of the 16 packed 11-bit channels
//! - Digital channels 17/18 and frame-lost/failsafe flags
//! - SBUS2 footers accepted
//! - Fully testable on host
//!
//! # Example
//!
//! ```ignore
//! use sbus_proto::{SbusLink, SbusReceiver, SbusSync};
//! use receiver_core::Receiver;
//!
//! static LINK: SbusLink = SbusLink::new();
//!
//! // In the UART interrupt:
//! let mut producer = SbusSync::producer(&LINK);
//! producer.on_data_received(byte);
//!
//! // In the receiver task:
//! let mut receiver = SbusReceiver::new(&LINK);
//! if receiver.wait_for_data(timeout).await && receiver.update(tick_delta) {
//!     let sticks = receiver.stick_values();
//! }
//! ```
//!
//! # UART Configuration
//!
//! SBUS uses 100000 baud, 8E2, inverted:
//! - Baud rate: 100000
//! - Data bits: 8
//! - Parity: Even
//! - Stop bits: 2
//! - Signal inverted (needs an inverter or a UART with RX inversion)

#![cfg_attr(not(feature = "std"), no_std)]

pub mod frame;
pub mod mapping;
pub mod receiver;

pub use frame::{
    channel_at, decode, DecodeError, SbusFrame, SbusStatus, SBUS2_FOOTER_NIBBLE, SBUS_CHANNEL_COUNT,
    SBUS_FOOTER, SBUS_FRAME_LEN, SBUS_HEADER, SBUS_PROPORTIONAL_CHANNELS,
};
pub use mapping::{
    sbus_to_fixed, sbus_to_pwm, DEFAULT_CONFIG, SBUS_CENTER, SBUS_HALF_RANGE, SBUS_MAX, SBUS_MIN,
};
pub use receiver::{SbusLink, SbusProducer, SbusReceiver, SbusSync, SBUS_FRAME_GAP_US};

/// SBUS baud rate.
pub const SBUS_BAUDRATE: u32 = 100_000;
