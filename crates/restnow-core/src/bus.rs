//! Observation bus.
//!
//! Every Session mutation is fanned out synchronously, in registration order,
//! as one [`Notification`] carrying a complete [`Snapshot`]. Observers never
//! see a phase without its matching remaining time.
//!
//! A failing observer is logged and skipped; it cannot stop delivery to the
//! observers registered after it.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ObserverError;
use crate::timer::Phase;

/// Atomic view of the session state at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub remaining_secs: u32,
    pub paused: bool,
}

/// Why a phase transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// The countdown ran out on a tick.
    Elapsed,
    StartBreakNow,
    SkipBreak,
    Reset,
}

/// What produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    /// Initial redelivery of the current state to a newly attached observer.
    Attached,
    /// Countdown decremented, phase unchanged.
    Tick,
    /// Phase (re)armed. `from == to` only for a reset issued during Work.
    Transition {
        from: Phase,
        to: Phase,
        cause: TransitionCause,
    },
    PauseToggled,
}

impl Change {
    /// True when the phase actually flipped.
    pub fn crosses_phase(&self) -> bool {
        matches!(self, Change::Transition { from, to, .. } if from != to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub change: Change,
    pub snapshot: Snapshot,
}

/// Subscriber to session notifications.
///
/// Implementations must be idempotent with respect to repeated snapshots: an
/// `Attached` redelivery of a state already seen must not replay effects.
pub trait Observer {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn notify(&mut self, notification: &Notification) -> Result<(), ObserverError>;

    /// Called once when the observer is removed from the bus.
    fn on_detach(&mut self) {}

    /// One presentation frame. Returns `true` while an animation is still
    /// running and more frames are wanted.
    fn advance_animation(&mut self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

#[derive(Default)]
pub struct ObservationBus {
    observers: Vec<(ObserverId, Box<dyn Observer>)>,
    next_id: u64,
}

impl ObservationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Register an observer and immediately hand it `current` as an
    /// [`Change::Attached`] notification.
    pub fn attach(&mut self, mut observer: Box<dyn Observer>, current: Snapshot) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;

        let initial = Notification {
            change: Change::Attached,
            snapshot: current,
        };
        deliver(observer.as_mut(), &initial);

        self.observers.push((id, observer));
        id
    }

    pub fn detach(&mut self, id: ObserverId) -> Option<Box<dyn Observer>> {
        let pos = self.observers.iter().position(|(oid, _)| *oid == id)?;
        let (_, mut observer) = self.observers.remove(pos);
        observer.on_detach();
        Some(observer)
    }

    /// Remove every observer, in registration order.
    pub fn detach_all(&mut self) {
        for (_, mut observer) in self.observers.drain(..) {
            observer.on_detach();
        }
    }

    pub fn publish(&mut self, notification: &Notification) {
        for (_, observer) in self.observers.iter_mut() {
            deliver(observer.as_mut(), notification);
        }
    }

    pub fn advance_animation(&mut self) -> bool {
        let mut animating = false;
        for (_, observer) in self.observers.iter_mut() {
            animating |= observer.advance_animation();
        }
        animating
    }
}

fn deliver(observer: &mut dyn Observer, notification: &Notification) {
    if let Err(e) = observer.notify(notification) {
        warn!(observer = observer.name(), error = %e, "observer failed, continuing delivery");
    }
}
