use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bus::{Change, Notification, Observer, TransitionCause};
use crate::error::ObserverError;
use crate::timer::{status_label, CycleDurations, Phase};

/// Serializable record of a session change.
/// `restnow run --json` prints one of these per line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        work_secs: u32,
        rest_secs: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        remaining_secs: u32,
        paused: bool,
        label: String,
        at: DateTime<Utc>,
    },
    Tick {
        phase: Phase,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
        cause: TransitionCause,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    PauseToggled {
        paused: bool,
        phase: Phase,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn session_started(durations: &CycleDurations) -> Self {
        Event::SessionStarted {
            work_secs: durations.work_secs(),
            rest_secs: durations.rest_secs(),
            at: Utc::now(),
        }
    }

    pub fn from_notification(notification: &Notification) -> Self {
        let s = notification.snapshot;
        let at = Utc::now();
        match notification.change {
            Change::Attached => Event::StateSnapshot {
                phase: s.phase,
                remaining_secs: s.remaining_secs,
                paused: s.paused,
                label: status_label(&s),
                at,
            },
            Change::Tick => Event::Tick {
                phase: s.phase,
                remaining_secs: s.remaining_secs,
                at,
            },
            Change::Transition { from, to, cause } => Event::PhaseChanged {
                from,
                to,
                cause,
                remaining_secs: s.remaining_secs,
                at,
            },
            Change::PauseToggled => Event::PauseToggled {
                paused: s.paused,
                phase: s.phase,
                remaining_secs: s.remaining_secs,
                at,
            },
        }
    }
}

/// Writes every notification as one JSON line.
pub struct JsonLinesObserver<W> {
    out: W,
}

impl<W: Write> JsonLinesObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_event(&mut self, event: &Event) -> Result<(), ObserverError> {
        let line = serde_json::to_string(event).map_err(|e| ObserverError::Sink {
            sink: "json",
            message: e.to_string(),
        })?;
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Observer for JsonLinesObserver<W> {
    fn name(&self) -> &str {
        "json"
    }

    fn notify(&mut self, notification: &Notification) -> Result<(), ObserverError> {
        self.write_event(&Event::from_notification(notification))
    }
}
