use embassy_time::{Duration, Instant, Ticker};
use log::trace;
use receiver_core::Receiver;

use crate::controller::{RadioController, RadioControls};

/// Notified after each processed packet, for example by a telemetry or
/// display task that wants to read the receiver state.
pub trait ReceiverWatcher {
    fn new_receiver_packet_available(&self);
}

/// Drives a receiver and forwards its sticks to a radio controller.
///
/// This abstraction decouples the receiver variant from the consumer of its
/// sticks, making both testable on host.
///
/// # Failsafe
///
/// On cycles where no packet was processed the controller's failsafe check
/// runs instead, so link loss is detected even when the producer is silent.
pub struct ReceiverTask<'w, R, C> {
    receiver: R,
    controller: C,
    watcher: Option<&'w dyn ReceiverWatcher>,
    previous_tick: u32,
}

impl<'w, R: Receiver, C: RadioController> ReceiverTask<'w, R, C> {
    pub fn new(receiver: R, controller: C) -> Self {
        Self {
            receiver,
            controller,
            watcher: None,
            previous_tick: 0,
        }
    }

    /// Attach a watcher notified after every processed packet.
    #[must_use]
    pub fn with_watcher(mut self, watcher: &'w dyn ReceiverWatcher) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// Run one cycle at `tick_count` (milliseconds, wrapping).
    ///
    /// Returns true if a packet was processed.
    pub fn poll(&mut self, tick_count: u32) -> bool {
        let tick_delta = tick_count.wrapping_sub(self.previous_tick);
        self.previous_tick = tick_count;

        if self.receiver.update(tick_delta) {
            let controls = RadioControls::new(tick_count, self.receiver.stick_values());
            trace!("receiver controls: {:?}", controls);
            self.controller.update_controls(&controls);
            if let Some(watcher) = self.watcher {
                watcher.new_receiver_packet_available();
            }
            true
        } else {
            self.controller.check_failsafe(tick_count);
            false
        }
    }

    /// Run interrupt-driven: wake on each frame, or after `timeout` of
    /// silence so the failsafe check still runs.
    ///
    /// This method never returns under normal operation.
    pub async fn run(&mut self, timeout: Duration) -> ! {
        loop {
            self.receiver.wait_for_data(timeout).await;
            self.poll(now_ticks());
        }
    }

    /// Run at a fixed `interval` without waiting on the producer.
    pub async fn run_periodic(&mut self, interval: Duration) -> ! {
        let mut ticker = Ticker::every(interval);
        loop {
            ticker.next().await;
            self.poll(now_ticks());
        }
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    pub fn receiver_mut(&mut self) -> &mut R {
        &mut self.receiver
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    /// Decompose the task into its receiver and controller.
    pub fn into_parts(self) -> (R, C) {
        (self.receiver, self.controller)
    }
}

/// Milliseconds since boot, truncated to the tick counter width.
fn now_ticks() -> u32 {
    Instant::now().as_millis() as u32
}
