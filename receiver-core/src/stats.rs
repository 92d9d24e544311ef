//! Packet and tick accounting.

/// Received/consumed/dropped counters of one receiver.
///
/// `received` is maintained by the producer (every frame it completed),
/// `packet_count` by the consumer (every frame it processed). Their
/// difference is the number of frames overwritten before being consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketStats {
    received: u32,
    packet_count: u32,
    dropped: i32,
    dropped_delta: i32,
    tick_delta: u32,
}

impl PacketStats {
    pub const fn new() -> Self {
        Self {
            received: 0,
            packet_count: 0,
            dropped: 0,
            dropped_delta: 0,
            tick_delta: 0,
        }
    }

    /// Record one processed frame.
    pub fn record(&mut self, received: u32, tick_delta: u32) {
        self.tick_delta = tick_delta;
        self.received = received;
        self.packet_count = self.packet_count.wrapping_add(1);

        let dropped = received.wrapping_sub(self.packet_count) as i32;
        self.dropped_delta = dropped.wrapping_sub(self.dropped);
        self.dropped = dropped;
    }

    #[inline]
    #[must_use]
    pub const fn received(&self) -> u32 {
        self.received
    }

    #[inline]
    #[must_use]
    pub const fn packet_count(&self) -> u32 {
        self.packet_count
    }

    #[inline]
    #[must_use]
    pub const fn dropped(&self) -> i32 {
        self.dropped
    }

    /// Frames dropped since the previous processed frame.
    #[inline]
    #[must_use]
    pub const fn dropped_delta(&self) -> i32 {
        self.dropped_delta
    }

    #[inline]
    #[must_use]
    pub const fn tick_delta(&self) -> u32 {
        self.tick_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_drops_when_every_frame_consumed() {
        let mut stats = PacketStats::new();
        for received in 1..=5 {
            stats.record(received, 10);
            assert_eq!(stats.dropped(), 0);
            assert_eq!(stats.dropped_delta(), 0);
        }
        assert_eq!(stats.packet_count(), 5);
        assert_eq!(stats.tick_delta(), 10);
    }

    #[test]
    fn test_dropped_delta_tracks_overwritten_frames() {
        let mut stats = PacketStats::new();
        stats.record(1, 4);
        // producer completed three frames, only the newest was consumed
        stats.record(4, 12);
        assert_eq!(stats.dropped(), 2);
        assert_eq!(stats.dropped_delta(), 2);
        assert_eq!(stats.tick_delta(), 12);

        stats.record(5, 4);
        assert_eq!(stats.dropped(), 2);
        assert_eq!(stats.dropped_delta(), 0);
    }

    #[test]
    fn test_counters_wrap() {
        let mut stats = PacketStats::new();
        stats.record(u32::MAX, 1);
        stats.record(0, 1);
        assert_eq!(stats.dropped_delta(), 0);
    }
}
