//! Handoff primitives between a producer context (interrupt or radio
//! callback) and the single consumer task.
//!
//! Both primitives can be signalled from any context without blocking or
//! allocating, and both offer a timed wait so the consumer can tell new data
//! apart from link silence.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration};

/// Latest-wins single-slot signal.
///
/// Signalling again before the consumer has woken up collapses into one
/// wake-up.
pub struct DataReadySignal {
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl DataReadySignal {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Mark data as ready. Safe to call from interrupt context.
    #[inline]
    pub fn signal_from_isr(&self) {
        self.signal.signal(());
    }

    /// Wait until signalled or until `timeout` elapses.
    ///
    /// Returns true if the signal fired, false on timeout.
    pub async fn wait(&self, timeout: Duration) -> bool {
        with_timeout(timeout, self.signal.wait()).await.is_ok()
    }

    /// Consume a pending signal without waiting.
    #[inline]
    pub fn try_take(&self) -> bool {
        self.signal.try_take().is_some()
    }

    #[inline]
    #[must_use]
    pub fn is_signaled(&self) -> bool {
        self.signal.signaled()
    }

    #[inline]
    pub fn reset(&self) {
        self.signal.reset();
    }
}

impl Default for DataReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded FIFO of ready notifications with depth `N`.
///
/// Posts made before the consumer wakes are preserved up to capacity.
/// [`signal_from_isr`](Self::signal_from_isr) drops the post when full;
/// [`post`](Self::post) waits for space instead.
pub struct DataReadyQueue<const N: usize> {
    channel: Channel<CriticalSectionRawMutex, (), N>,
}

impl<const N: usize> DataReadyQueue<N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue a notification without blocking.
    ///
    /// Returns false if the queue was full and the notification dropped.
    #[inline]
    pub fn signal_from_isr(&self) -> bool {
        self.channel.try_send(()).is_ok()
    }

    /// Enqueue a notification, waiting for space if the queue is full.
    pub async fn post(&self) {
        self.channel.send(()).await;
    }

    /// Wait for one notification or until `timeout` elapses.
    pub async fn wait(&self, timeout: Duration) -> bool {
        with_timeout(timeout, self.channel.receive()).await.is_ok()
    }

    /// Consume one pending notification without waiting.
    #[inline]
    pub fn try_take(&self) -> bool {
        self.channel.try_receive().is_ok()
    }

    /// Number of notifications waiting to be consumed.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.channel.len()
    }
}

impl<const N: usize> Default for DataReadyQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embassy_futures::block_on;

    const SHORT: Duration = Duration::from_millis(5);

    #[test]
    fn test_signal_wait_after_signal_returns_true() {
        let signal = DataReadySignal::new();
        signal.signal_from_isr();
        assert!(block_on(signal.wait(SHORT)));
        assert!(!signal.is_signaled());
    }

    #[test]
    fn test_signal_times_out_without_post() {
        let signal = DataReadySignal::new();
        assert!(!block_on(signal.wait(SHORT)));
    }

    #[test]
    fn test_signal_is_latest_wins() {
        let signal = DataReadySignal::new();
        signal.signal_from_isr();
        signal.signal_from_isr();
        signal.signal_from_isr();
        assert!(signal.try_take());
        assert!(!signal.try_take());
    }

    #[test]
    fn test_signal_reset_clears_pending() {
        let signal = DataReadySignal::new();
        signal.signal_from_isr();
        signal.reset();
        assert!(!signal.is_signaled());
        assert!(!block_on(signal.wait(SHORT)));
    }

    #[test]
    fn test_queue_preserves_posts_up_to_capacity() {
        let queue: DataReadyQueue<2> = DataReadyQueue::new();
        assert!(queue.signal_from_isr());
        assert!(queue.signal_from_isr());
        // full, third post dropped
        assert!(!queue.signal_from_isr());
        assert_eq!(queue.pending(), 2);

        assert!(block_on(queue.wait(SHORT)));
        assert!(queue.try_take());
        assert!(!queue.try_take());
        assert!(!block_on(queue.wait(SHORT)));
    }

    #[test]
    fn test_queue_post_with_space_completes() {
        let queue: DataReadyQueue<1> = DataReadyQueue::new();
        block_on(queue.post());
        assert_eq!(queue.pending(), 1);
        assert!(block_on(queue.wait(SHORT)));
    }
}
