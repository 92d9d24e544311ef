//! ESP-NOW side of the joystick receiver: the callback-facing link, the
//! transceiver abstraction and the pairing broadcast.
//!
//! The radio driver calls [`RadioLink::on_data_received`] from its receive
//! callback. Packets from the primary peer (the joystick) go into a
//! newest-wins slot; packets from an optional secondary peer (a companion
//! board) go into a newest-wins slot of their own, backed by a single
//! pending notification so every wake finds a frame.

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Duration;
use log::{info, trace};
use receiver_core::{DataReadyQueue, Eui48, Frame, FrameLink};

use crate::packet::{is_addressed_to, JOYSTICK_MAX_PACKET_LEN};

/// Largest ESP-NOW payload.
pub const ESPNOW_MAX_DATA_LEN: usize = 250;

/// Secondary notifications outstanding at once. One covers any number of
/// slot replacements made before the consumer wakes.
pub const SECONDARY_QUEUE_DEPTH: usize = 1;

/// Length of the pairing broadcast.
pub const PAIRING_PACKET_LEN: usize = 16;

/// Marker the joystick looks for in a pairing broadcast.
pub const PAIRING_MAGIC: [u8; 4] = [0xAA, 0x55, 0x16, 0x88];

/// Errors reported by a [`Transceiver`] or the peer table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// The driver failed to queue the packet.
    Send,
    /// The packet exceeds [`ESPNOW_MAX_DATA_LEN`].
    TooLong,
    /// A secondary peer is already registered.
    PeerExists,
}

/// Radio driver used to announce this receiver for pairing.
pub trait Transceiver {
    /// This device's MAC address.
    fn my_mac(&self) -> Eui48;

    /// Wi-Fi channel the pairing broadcast advertises.
    fn broadcast_channel(&self) -> u8;

    /// Send `data` to the broadcast address.
    fn broadcast(&self, data: &[u8]) -> Result<(), RadioError>;
}

/// Build the pairing broadcast: channel, MAC, magic marker, zero pad.
#[must_use]
pub fn pairing_packet(channel: u8, mac: &Eui48) -> [u8; PAIRING_PACKET_LEN] {
    let mut packet = [0u8; PAIRING_PACKET_LEN];
    packet[0] = channel;
    packet[1..7].copy_from_slice(mac.octets());
    packet[7..11].copy_from_slice(&PAIRING_MAGIC);
    packet
}

/// Shared state between the radio receive callback and the receiver task.
///
/// `const`-constructible so it can live in a `static` captured by the
/// callback registration.
pub struct RadioLink {
    my_mac: Eui48,
    primary: FrameLink<JOYSTICK_MAX_PACKET_LEN>,
    primary_peer: Mutex<CriticalSectionRawMutex, Cell<Option<Eui48>>>,
    secondary_peer: Mutex<CriticalSectionRawMutex, Cell<Option<Eui48>>>,
    secondary: Mutex<CriticalSectionRawMutex, RefCell<Option<Frame<ESPNOW_MAX_DATA_LEN>>>>,
    secondary_ready: DataReadyQueue<SECONDARY_QUEUE_DEPTH>,
}

impl RadioLink {
    pub const fn new(my_mac: Eui48) -> Self {
        Self {
            my_mac,
            primary: FrameLink::new(),
            primary_peer: Mutex::new(Cell::new(None)),
            secondary_peer: Mutex::new(Cell::new(None)),
            secondary: Mutex::new(RefCell::new(None)),
            secondary_ready: DataReadyQueue::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn my_mac(&self) -> Eui48 {
        self.my_mac
    }

    /// Peer learned from the first packet addressed to this receiver.
    #[must_use]
    pub fn primary_peer(&self) -> Option<Eui48> {
        self.primary_peer.lock(Cell::get)
    }

    #[must_use]
    pub fn secondary_peer(&self) -> Option<Eui48> {
        self.secondary_peer.lock(Cell::get)
    }

    /// Register the secondary peer. Only one is supported.
    pub fn add_secondary_peer(&self, peer: Eui48) -> Result<(), RadioError> {
        self.secondary_peer.lock(|slot| {
            if slot.get().is_some() {
                return Err(RadioError::PeerExists);
            }
            slot.set(Some(peer));
            Ok(())
        })
    }

    /// Forget the bound joystick so the next addressed packet rebinds.
    pub fn unbind_primary(&self) {
        self.primary_peer.lock(|slot| slot.set(None));
    }

    /// Receive callback entry point.
    ///
    /// Returns true if the packet was accepted. Primary packets not
    /// addressed to this receiver, or sent by a joystick other than the
    /// bound one, are dropped before they are counted.
    pub fn on_data_received(&self, src: Eui48, data: &[u8]) -> bool {
        if self.secondary_peer() == Some(src) {
            return self.publish_secondary(data);
        }

        if !is_addressed_to(data, &self.my_mac) {
            trace!("espnow packet for another receiver from {:?}", src);
            return false;
        }

        let bound = self.primary_peer.lock(|slot| match slot.get() {
            None => {
                slot.set(Some(src));
                info!("bound to joystick {:?}", src);
                true
            }
            Some(peer) => peer == src,
        });
        if !bound {
            trace!("espnow packet from unbound peer {:?}", src);
            return false;
        }

        self.primary.publish(data)
    }

    fn publish_secondary(&self, data: &[u8]) -> bool {
        let Ok(frame) = Frame::<ESPNOW_MAX_DATA_LEN>::from_slice(data) else {
            return false;
        };
        self.secondary.lock(|slot| {
            slot.borrow_mut().replace(frame);
            if !self.secondary_ready.signal_from_isr() {
                trace!("secondary packet replaced unconsumed one");
            }
        });
        true
    }

    /// Primary frame slot.
    #[inline]
    #[must_use]
    pub const fn primary(&self) -> &FrameLink<JOYSTICK_MAX_PACKET_LEN> {
        &self.primary
    }

    /// Take the latest secondary packet and clear its notification.
    pub fn take_secondary(&self) -> Option<Frame<ESPNOW_MAX_DATA_LEN>> {
        self.secondary.lock(|slot| {
            self.secondary_ready.try_take();
            slot.borrow_mut().take()
        })
    }

    /// Wait for a secondary packet or until `timeout` elapses.
    pub async fn wait_secondary(&self, timeout: Duration) -> bool {
        self.secondary_ready.wait(timeout).await
    }

    /// Secondary notifications not yet consumed.
    #[must_use]
    pub fn secondary_pending(&self) -> usize {
        self.secondary_ready.pending()
    }
}
