//! FlySky IBUS frame decoding and receiver.
//!
//! This crate provides chip-agnostic IBUS framing, model detection and
//! checksum verification on top of `receiver-core`. It is designed to be
//! fed from any UART receive interrupt.
//!
//! # Features
//!
//! - IA6B (32-byte) and IA6 (31-byte) frames, detected from the sync byte
//! - Both checksum variants
//! - 14 channel slots plus 4 channels packed into the slot high nibbles
//! - Optional inter-frame gap resync
//! - No chip-specific dependencies - works on any platform
//! - Fully testable on host
//!
//! # Example
//!
//! ```ignore
//! use ibus_proto::{IbusLink, IbusReceiver, IbusSync};
//! use receiver_core::Receiver;
//!
//! static LINK: IbusLink = IbusLink::new();
//!
//! // In the UART interrupt:
//! let mut producer = IbusSync::producer(&LINK);
//! producer.on_data_received(byte);
//!
//! // In the receiver task:
//! let mut receiver = IbusReceiver::new(&LINK);
//! if receiver.wait_for_data(timeout).await && receiver.update(tick_delta) {
//!     let aux = receiver.auxiliary_channel(0);
//! }
//! ```
//!
//! # UART Configuration
//!
//! IBUS uses 115200 baud, 8N1:
//! - Baud rate: 115200
//! - Data bits: 8
//! - Parity: None
//! - Stop bits: 1

#![cfg_attr(not(feature = "std"), no_std)]

pub mod mapping;
pub mod parser;
pub mod receiver;

pub use mapping::{ibus_to_fixed, DEFAULT_CONFIG, IBUS_CENTER, IBUS_HALF_RANGE};
pub use parser::{
    calculate_checksum, decode, received_checksum, DecodeError, IbusFrame, IbusModel,
    IBUS_CHANNEL_COUNT, IBUS_MAX_FRAME_LEN, IBUS_SLOT_COUNT, IBUS_SYNC_IA6, IBUS_SYNC_IA6B,
};
pub use receiver::{IbusLink, IbusProducer, IbusReceiver, IbusSync, IBUS_FRAME_GAP_US};

/// IBUS baud rate.
pub const IBUS_BAUDRATE: u32 = 115_200;
