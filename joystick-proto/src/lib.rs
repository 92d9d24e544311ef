//! M5Stack Atom JoyStick receiver over ESP-NOW.
//!
//! This crate decodes the joystick's 25-byte packets and implements the
//! [`receiver_core::Receiver`] contract on top of a [`RadioLink`] fed from
//! the radio driver's receive callback. The driver itself is abstracted
//! behind [`Transceiver`], so the crate has no chip-specific dependencies.
//!
//! # Example
//!
//! ```ignore
//! use joystick_proto::{JoystickReceiver, RadioLink};
//! use receiver_core::{Eui48, Receiver};
//!
//! static LINK: RadioLink = RadioLink::new(Eui48([0x24, 0x0A, 0xC4, 0x9E, 0x71, 0x3C]));
//!
//! // In the ESP-NOW receive callback:
//! LINK.on_data_received(src.into(), data);
//!
//! // In the receiver task:
//! let mut receiver = JoystickReceiver::new(&LINK, radio);
//! receiver.broadcast_for_binding(10, Duration::from_millis(100)).await?;
//! if receiver.wait_for_data(timeout).await && receiver.update(tick_delta) {
//!     let sticks = receiver.stick_values();
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod packet;
pub mod radio;
pub mod receiver;

pub use packet::{
    checksum, decode, is_addressed_to, DecodeError, JoystickPacket, ALT_MODE_MANUAL,
    JOYSTICK_MAX_PACKET_LEN, JOYSTICK_PACKET_LEN,
};
pub use radio::{
    pairing_packet, RadioError, RadioLink, Transceiver, ESPNOW_MAX_DATA_LEN, PAIRING_MAGIC,
    PAIRING_PACKET_LEN, SECONDARY_QUEUE_DEPTH,
};
pub use receiver::{
    JoystickReceiver, ALT_MODE_SWITCH, DEFAULT_CONFIG, JOYSTICK_AUX_CHANNEL_COUNT, MODE_SWITCH,
};
