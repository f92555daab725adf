//! One-second tick source.
//!
//! The driver runs a tokio interval task that pushes [`ClockTick`]s into a
//! channel. The channel's single consumer owns the session, so every tick is
//! applied on the same execution context as user commands and observer
//! delivery.
//!
//! Each `start()` takes a fresh epoch. Ticks still queued from an earlier
//! epoch (a stopped or replaced driver) are rejected by [`ClockDriver::accepts`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    pub epoch: u64,
}

pub struct ClockDriver {
    period: Duration,
    tx: mpsc::UnboundedSender<ClockTick>,
    epoch: Option<u64>,
    handle: Option<JoinHandle<()>>,
}

impl ClockDriver {
    pub fn new(tx: mpsc::UnboundedSender<ClockTick>) -> Self {
        Self::with_period(tx, TICK_PERIOD)
    }

    pub fn with_period(tx: mpsc::UnboundedSender<ClockTick>, period: Duration) -> Self {
        Self {
            period,
            tx,
            epoch: None,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.epoch.is_some()
    }

    /// Arm the ticker. A running ticker is stopped first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.stop();

        let epoch = NEXT_EPOCH.fetch_add(1, Ordering::Relaxed);
        let tx = self.tx.clone();
        let period = self.period;
        let first = Instant::now() + period;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                interval.tick().await;
                if tx.send(ClockTick { epoch }).is_err() {
                    break;
                }
            }
        });

        debug!(epoch, "clock started");
        self.epoch = Some(epoch);
        self.handle = Some(handle);
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        if let Some(epoch) = self.epoch.take() {
            debug!(epoch, "clock stopped");
        }
    }

    /// Whether `tick` was produced by this driver's current run.
    pub fn accepts(&self, tick: ClockTick) -> bool {
        self.epoch == Some(tick.epoch)
    }
}

impl Drop for ClockDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
