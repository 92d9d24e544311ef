//! Byte-by-byte frame assembly for serial receiver protocols.
//!
//! A [`FrameAssembler`] accumulates bytes pushed one at a time (typically
//! from a UART receive interrupt) into a fixed-capacity buffer. The first
//! byte of each candidate frame is handed to a protocol-specific
//! [`FrameSync`], which either rejects it (the byte is dropped and framing
//! restarts on the next one) or declares the total frame length.
//!
//! ```text
//! Empty --first byte accepted--> Filling --last byte--> Full
//!   ^          |                                          |
//!   +--rejected+                  next byte restarts <----+
//! ```

use heapless::Vec;
use log::{trace, warn};

use crate::link::FrameLink;

/// Protocol-specific frame start detection.
pub trait FrameSync {
    /// Inspect the first byte of a candidate frame.
    ///
    /// Returns the total frame length including this byte, or `None` if the
    /// byte cannot start a frame.
    fn frame_length(&mut self, first: u8) -> Option<usize>;
}

/// Assembly state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameState {
    #[default]
    Empty,
    Filling,
    Full,
}

/// Frame accumulator with capacity `N`.
pub struct FrameAssembler<S, const N: usize> {
    sync: S,
    buffer: Vec<u8, N>,
    frame_length: usize,
    state: FrameState,
    frame_gap_us: Option<u32>,
    last_byte_us: u32,
    discarded: u32,
    resyncs: u32,
}

impl<S: FrameSync, const N: usize> FrameAssembler<S, N> {
    #[must_use]
    pub const fn new(sync: S) -> Self {
        Self {
            sync,
            buffer: Vec::new(),
            frame_length: 0,
            state: FrameState::Empty,
            frame_gap_us: None,
            last_byte_us: 0,
            discarded: 0,
            resyncs: 0,
        }
    }

    /// Create an assembler that drops a partial frame when the gap between
    /// two bytes exceeds `gap_us`. Only [`push_timed`](Self::push_timed)
    /// observes the gap.
    #[must_use]
    pub const fn with_frame_gap(sync: S, gap_us: u32) -> Self {
        let mut assembler = Self::new(sync);
        assembler.frame_gap_us = Some(gap_us);
        assembler
    }

    /// Feed one byte. Returns true if it completed a frame.
    pub fn push(&mut self, byte: u8) -> bool {
        match self.state {
            FrameState::Empty => self.start(byte),
            FrameState::Full => {
                self.reset();
                self.start(byte)
            }
            FrameState::Filling => self.append(byte),
        }
    }

    /// Feed one byte received at `now_us` (wrapping microsecond clock).
    pub fn push_timed(&mut self, byte: u8, now_us: u32) -> bool {
        if let Some(gap_us) = self.frame_gap_us {
            let elapsed = now_us.wrapping_sub(self.last_byte_us);
            if self.state == FrameState::Filling && elapsed > gap_us {
                trace!("frame gap of {}us, dropping {} bytes", elapsed, self.buffer.len());
                self.resync();
            }
        }
        self.last_byte_us = now_us;
        self.push(byte)
    }

    fn start(&mut self, byte: u8) -> bool {
        match self.sync.frame_length(byte) {
            Some(length) if length > 0 && length <= N => {
                self.frame_length = length;
                // capacity is at least `length`, which is at least one
                let _ = self.buffer.push(byte);
                self.state = FrameState::Filling;
                self.complete_if_full()
            }
            Some(length) => {
                warn!("declared frame length {} exceeds capacity {}", length, N);
                self.resync();
                false
            }
            None => {
                self.discarded = self.discarded.wrapping_add(1);
                false
            }
        }
    }

    fn append(&mut self, byte: u8) -> bool {
        if self.buffer.push(byte).is_err() {
            warn!("frame buffer overflow, resyncing");
            self.resync();
            return false;
        }
        self.complete_if_full()
    }

    fn complete_if_full(&mut self) -> bool {
        if self.buffer.len() >= self.frame_length {
            self.state = FrameState::Full;
            true
        } else {
            false
        }
    }

    fn resync(&mut self) {
        self.resyncs = self.resyncs.wrapping_add(1);
        self.reset();
    }

    /// Drop any partial or completed frame.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.frame_length = 0;
        self.state = FrameState::Empty;
    }

    /// The completed frame, if the last pushed byte completed one.
    #[must_use]
    pub fn frame(&self) -> Option<&[u8]> {
        (self.state == FrameState::Full).then_some(self.buffer.as_slice())
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> FrameState {
        self.state
    }

    /// Current write index.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.buffer.len()
    }

    /// Length declared by the current frame's first byte (0 when empty).
    #[inline]
    #[must_use]
    pub const fn frame_length(&self) -> usize {
        self.frame_length
    }

    /// Bytes rejected as frame starts.
    #[inline]
    #[must_use]
    pub const fn discarded_count(&self) -> u32 {
        self.discarded
    }

    /// Partial frames dropped because of a gap, overflow or bad length.
    #[inline]
    #[must_use]
    pub const fn resync_count(&self) -> u32 {
        self.resyncs
    }

    #[inline]
    #[must_use]
    pub const fn sync(&self) -> &S {
        &self.sync
    }
}

/// Producer half of a serial receiver: assembles bytes and publishes every
/// completed frame to a [`FrameLink`].
///
/// Owned by the interrupt handler of one UART.
///
/// # Example
///
/// ```
/// use receiver_core::{FrameLink, FrameSync, SerialProducer};
///
/// struct StartsWithAa;
///
/// impl FrameSync for StartsWithAa {
///     fn frame_length(&mut self, first: u8) -> Option<usize> {
///         (first == 0xAA).then_some(3)
///     }
/// }
///
/// static LINK: FrameLink<3> = FrameLink::new();
/// let mut producer = SerialProducer::new(StartsWithAa, &LINK);
///
/// assert!(!producer.on_data_received(0x00)); // not a frame start
/// assert!(!producer.on_data_received(0xAA));
/// assert!(!producer.on_data_received(0x01));
/// assert!(producer.on_data_received(0x02));
/// assert_eq!(LINK.take().unwrap().as_slice(), &[0xAA, 0x01, 0x02]);
/// ```
pub struct SerialProducer<'a, S, const N: usize> {
    assembler: FrameAssembler<S, N>,
    link: &'a FrameLink<N>,
}

impl<'a, S: FrameSync, const N: usize> SerialProducer<'a, S, N> {
    #[must_use]
    pub const fn new(sync: S, link: &'a FrameLink<N>) -> Self {
        Self {
            assembler: FrameAssembler::new(sync),
            link,
        }
    }

    #[must_use]
    pub const fn with_frame_gap(sync: S, gap_us: u32, link: &'a FrameLink<N>) -> Self {
        Self {
            assembler: FrameAssembler::with_frame_gap(sync, gap_us),
            link,
        }
    }

    /// Feed one received byte. Returns true if it completed a frame.
    pub fn on_data_received(&mut self, byte: u8) -> bool {
        let complete = self.assembler.push(byte);
        self.publish_if(complete)
    }

    /// Feed one received byte with its arrival time in microseconds.
    pub fn on_data_received_at(&mut self, byte: u8, now_us: u32) -> bool {
        let complete = self.assembler.push_timed(byte, now_us);
        self.publish_if(complete)
    }

    fn publish_if(&mut self, complete: bool) -> bool {
        if complete {
            if let Some(frame) = self.assembler.frame() {
                self.link.publish(frame);
            }
        }
        complete
    }

    #[inline]
    #[must_use]
    pub const fn assembler(&self) -> &FrameAssembler<S, N> {
        &self.assembler
    }

    #[inline]
    #[must_use]
    pub const fn link(&self) -> &'a FrameLink<N> {
        self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frames start with 0xA5 and are 4 bytes long; 0xB6 declares an
    /// oversized frame.
    struct TestSync;

    impl FrameSync for TestSync {
        fn frame_length(&mut self, first: u8) -> Option<usize> {
            match first {
                0xA5 => Some(4),
                0xB6 => Some(64),
                _ => None,
            }
        }
    }

    fn push_all<const N: usize>(assembler: &mut FrameAssembler<TestSync, N>, bytes: &[u8]) -> usize {
        bytes.iter().filter(|&&b| assembler.push(b)).count()
    }

    #[test]
    fn test_assembles_one_frame() {
        let mut assembler: FrameAssembler<TestSync, 8> = FrameAssembler::new(TestSync);
        assert!(!assembler.push(0xA5));
        assert_eq!(assembler.state(), FrameState::Filling);
        assert!(!assembler.push(1));
        assert!(!assembler.push(2));
        assert!(assembler.push(3));
        assert_eq!(assembler.state(), FrameState::Full);
        assert_eq!(assembler.frame(), Some(&[0xA5, 1, 2, 3][..]));
    }

    #[test]
    fn test_index_resets_on_next_byte() {
        let mut assembler: FrameAssembler<TestSync, 8> = FrameAssembler::new(TestSync);
        push_all(&mut assembler, &[0xA5, 1, 2, 3]);
        assert_eq!(assembler.index(), 4);

        assert!(!assembler.push(0xA5));
        assert_eq!(assembler.index(), 1);
        assert!(assembler.frame().is_none());
    }

    #[test]
    fn test_discards_until_sync_byte() {
        let mut assembler: FrameAssembler<TestSync, 8> = FrameAssembler::new(TestSync);
        let frames = push_all(&mut assembler, &[0x00, 0x13, 0xFF, 0xA5, 9, 8, 7]);
        assert_eq!(frames, 1);
        assert_eq!(assembler.discarded_count(), 3);
        assert_eq!(assembler.frame(), Some(&[0xA5, 9, 8, 7][..]));
    }

    #[test]
    fn test_garbage_after_full_frame_is_discarded() {
        let mut assembler: FrameAssembler<TestSync, 8> = FrameAssembler::new(TestSync);
        push_all(&mut assembler, &[0xA5, 1, 2, 3]);
        assert!(!assembler.push(0x42));
        assert_eq!(assembler.state(), FrameState::Empty);
        assert_eq!(push_all(&mut assembler, &[0xA5, 4, 5, 6]), 1);
    }

    #[test]
    fn test_oversized_declaration_resyncs() {
        let mut assembler: FrameAssembler<TestSync, 8> = FrameAssembler::new(TestSync);
        assert!(!assembler.push(0xB6));
        assert_eq!(assembler.state(), FrameState::Empty);
        assert_eq!(assembler.resync_count(), 1);
        assert_eq!(push_all(&mut assembler, &[0xA5, 1, 2, 3]), 1);
    }

    #[test]
    fn test_frame_gap_drops_partial_frame() {
        let mut assembler: FrameAssembler<TestSync, 8> =
            FrameAssembler::with_frame_gap(TestSync, 3000);
        assert!(!assembler.push_timed(0xA5, 0));
        assert!(!assembler.push_timed(1, 100));
        // long silence, then a fresh frame
        assert!(!assembler.push_timed(0xA5, 10_000));
        assert_eq!(assembler.resync_count(), 1);
        assert!(!assembler.push_timed(4, 10_100));
        assert!(!assembler.push_timed(5, 10_200));
        assert!(assembler.push_timed(6, 10_300));
        assert_eq!(assembler.frame(), Some(&[0xA5, 4, 5, 6][..]));
    }

    #[test]
    fn test_frame_gap_handles_clock_wrap() {
        let mut assembler: FrameAssembler<TestSync, 8> =
            FrameAssembler::with_frame_gap(TestSync, 3000);
        assembler.push_timed(0xA5, u32::MAX - 50);
        assembler.push_timed(1, u32::MAX);
        assembler.push_timed(2, 40);
        assert!(assembler.push_timed(3, 90));
        assert_eq!(assembler.resync_count(), 0);
    }

    #[test]
    fn test_producer_publishes_complete_frames() {
        let link: FrameLink<4> = FrameLink::new();
        let mut producer = SerialProducer::new(TestSync, &link);

        for &b in &[0x00, 0xA5, 1, 2] {
            assert!(!producer.on_data_received(b));
        }
        assert!(!link.has_frame());
        assert!(producer.on_data_received(3));
        assert_eq!(link.received_count(), 1);
        assert_eq!(link.take().unwrap().as_slice(), &[0xA5, 1, 2, 3]);
    }

    #[test]
    fn test_producer_overwrites_unconsumed_frame() {
        let link: FrameLink<4> = FrameLink::new();
        let mut producer = SerialProducer::new(TestSync, &link);
        for &b in &[0xA5, 1, 1, 1, 0xA5, 2, 2, 2] {
            producer.on_data_received(b);
        }
        assert_eq!(link.received_count(), 2);
        assert_eq!(link.take().unwrap().as_slice(), &[0xA5, 2, 2, 2]);
        assert!(link.take().is_none());
    }
}
