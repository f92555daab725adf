//! Phase timer.
//!
//! The session is a tick-driven state machine. It owns no thread and no
//! timer; the caller delivers one `tick()` per second from the clock driver.
//!
//! ## State Transitions
//!
//! ```text
//!            tick at 0 / start_break_now
//!   Work  ───────────────────────────────▶  Rest
//!         ◀───────────────────────────────
//!            tick at 0 / skip_break / reset_cycle
//! ```
//!
//! Pause is orthogonal to the phase: while paused, ticks are ignored but the
//! manual actions above still apply.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = Session::new(CycleDurations::new(1500, 300)?);
//! session.attach(Box::new(status_observer));
//! // Once per second:
//! session.tick();
//! ```

use tracing::debug;

use super::phase::{format_clock, CycleDurations, Phase};
use crate::bus::{Change, Notification, ObservationBus, Observer, ObserverId, Snapshot, TransitionCause};

/// What a session operation did.
///
/// Returned to the caller in addition to the notification sent on the bus,
/// so effects (sounds, animations) can be decided from a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation did not apply in the current state.
    Unchanged,
    Changed(Change),
}

impl Outcome {
    pub fn is_transition(&self) -> bool {
        matches!(self, Outcome::Changed(Change::Transition { .. }))
    }
}

pub struct Session {
    durations: CycleDurations,
    phase: Phase,
    remaining_secs: u32,
    paused: bool,
    bus: ObservationBus,
}

impl Session {
    /// Start in `Work`, running, with the full work countdown.
    pub fn new(durations: CycleDurations) -> Self {
        Self {
            durations,
            phase: Phase::Work,
            remaining_secs: durations.work_secs(),
            paused: false,
            bus: ObservationBus::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn durations(&self) -> CycleDurations {
        self.durations
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            paused: self.paused,
        }
    }

    /// Short label for a persistent status indicator.
    pub fn status_label(&self) -> String {
        status_label(&self.snapshot())
    }

    pub fn observer_count(&self) -> usize {
        self.bus.len()
    }

    // ── Observers ────────────────────────────────────────────────────

    pub fn attach(&mut self, observer: Box<dyn Observer>) -> ObserverId {
        let current = self.snapshot();
        self.bus.attach(observer, current)
    }

    pub fn detach(&mut self, id: ObserverId) -> Option<Box<dyn Observer>> {
        self.bus.detach(id)
    }

    pub fn detach_all(&mut self) {
        self.bus.detach_all();
    }

    /// Forward one presentation frame to the observers.
    pub fn advance_animation(&mut self) -> bool {
        self.bus.advance_animation()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn tick(&mut self) -> Outcome {
        if self.paused {
            return Outcome::Unchanged;
        }
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
            return self.publish(Change::Tick);
        }
        let to = self.phase.next();
        self.enter(to, TransitionCause::Elapsed)
    }

    /// Begin the rest phase immediately. No-op while already resting.
    pub fn start_break_now(&mut self) -> Outcome {
        match self.phase {
            Phase::Work => self.enter(Phase::Rest, TransitionCause::StartBreakNow),
            Phase::Rest => Outcome::Unchanged,
        }
    }

    /// End the rest phase immediately. No-op while working.
    pub fn skip_break(&mut self) -> Outcome {
        match self.phase {
            Phase::Rest => self.enter(Phase::Work, TransitionCause::SkipBreak),
            Phase::Work => Outcome::Unchanged,
        }
    }

    /// Re-arm a full work countdown. Always notifies, even when the state is
    /// already `(Work, work_secs)`.
    pub fn reset_cycle(&mut self) -> Outcome {
        self.enter(Phase::Work, TransitionCause::Reset)
    }

    pub fn toggle_pause(&mut self) -> Outcome {
        self.paused = !self.paused;
        debug!(paused = self.paused, "pause toggled");
        self.publish(Change::PauseToggled)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter(&mut self, to: Phase, cause: TransitionCause) -> Outcome {
        let from = self.phase;
        self.phase = to;
        self.remaining_secs = self.durations.for_phase(to);
        debug!(%from, %to, ?cause, remaining_secs = self.remaining_secs, "phase transition");
        self.publish(Change::Transition { from, to, cause })
    }

    fn publish(&mut self, change: Change) -> Outcome {
        let notification = Notification {
            change,
            snapshot: self.snapshot(),
        };
        self.bus.publish(&notification);
        Outcome::Changed(change)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.bus.detach_all();
    }
}

/// `MM:SS` during work, `Break MM:SS` during rest.
pub fn status_label(snapshot: &Snapshot) -> String {
    let clock = format_clock(snapshot.remaining_secs);
    match snapshot.phase {
        Phase::Work => clock,
        Phase::Rest => format!("Break {clock}"),
    }
}
