//! Newest-wins frame slot shared by a producer and one consumer.
//!
//! A [`FrameLink`] is the statically-lived context handle of one physical
//! peripheral: the interrupt handler or radio callback publishes completed
//! frames into it, and the receiver task takes them out. Because
//! [`FrameLink::new`] is `const`, a link can live in a plain `static` and be
//! captured by the interrupt registration at init time.
//!
//! # Example
//!
//! ```
//! use receiver_core::FrameLink;
//!
//! static LINK: FrameLink<25> = FrameLink::new();
//!
//! assert!(LINK.publish(&[0x0F; 25]));
//! assert!(LINK.publish(&[0x0E; 25]));
//! let frame = LINK.take().unwrap();
//! assert_eq!(frame[0], 0x0E); // newest wins
//! assert!(LINK.take().is_none());
//! assert_eq!(LINK.received_count(), 2);
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Duration;
use portable_atomic::{AtomicU32, Ordering};

use crate::signal::DataReadySignal;

/// One completed frame.
pub type Frame<const N: usize> = heapless::Vec<u8, N>;

/// Single-slot frame handoff with a ready signal and a received counter.
pub struct FrameLink<const N: usize> {
    slot: Mutex<CriticalSectionRawMutex, RefCell<Option<Frame<N>>>>,
    ready: DataReadySignal,
    received: AtomicU32,
}

impl<const N: usize> FrameLink<N> {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
            ready: DataReadySignal::new(),
            received: AtomicU32::new(0),
        }
    }

    /// Store a completed frame, replacing any unconsumed one, and signal the
    /// consumer. Safe to call from interrupt context.
    ///
    /// Returns false if `bytes` does not fit the slot; nothing is stored or
    /// counted in that case.
    pub fn publish(&self, bytes: &[u8]) -> bool {
        let Ok(frame) = Frame::<N>::from_slice(bytes) else {
            return false;
        };
        self.slot.lock(|slot| {
            slot.borrow_mut().replace(frame);
            self.received.fetch_add(1, Ordering::Relaxed);
            self.ready.signal_from_isr();
        });
        true
    }

    /// Take the pending frame, if any.
    pub fn take(&self) -> Option<Frame<N>> {
        self.slot.lock(|slot| {
            self.ready.reset();
            slot.borrow_mut().take()
        })
    }

    /// Whether a frame is waiting to be taken.
    #[must_use]
    pub fn has_frame(&self) -> bool {
        self.slot.lock(|slot| slot.borrow().is_some())
    }

    /// Frames published since construction (wrapping).
    #[inline]
    #[must_use]
    pub fn received_count(&self) -> u32 {
        self.received.load(Ordering::Relaxed)
    }

    /// Wait for a frame to be published or until `timeout` elapses.
    pub async fn wait(&self, timeout: Duration) -> bool {
        if self.has_frame() {
            return true;
        }
        self.ready.wait(timeout).await
    }

    /// The ready signal fired by [`publish`](Self::publish).
    #[inline]
    #[must_use]
    pub const fn ready(&self) -> &DataReadySignal {
        &self.ready
    }
}

impl<const N: usize> Default for FrameLink<N> {
    fn default() -> Self {
        Self::new()
    }
}
