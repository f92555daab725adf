//! Status indicator and menu model.
//!
//! The host draws a persistent indicator (title) and a small menu. Both are
//! pure functions of the latest snapshot and are recomputed on every
//! notification.

use serde::Serialize;

use crate::bus::{Notification, Observer, Snapshot};
use crate::error::ObserverError;
use crate::timer::{status_label, Phase};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuState {
    pub title: String,
    pub phase: Phase,
    pub paused: bool,
    pub start_break_enabled: bool,
    pub skip_break_enabled: bool,
    pub pause_label: &'static str,
}

impl MenuState {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            title: status_label(snapshot),
            phase: snapshot.phase,
            paused: snapshot.paused,
            start_break_enabled: snapshot.phase == Phase::Work,
            skip_break_enabled: snapshot.phase == Phase::Rest,
            pause_label: if snapshot.paused {
                "Resume Cycle"
            } else {
                "Pause Cycle"
            },
        }
    }
}

/// Host-side renderer of the indicator.
pub trait StatusSink {
    fn render(&mut self, menu: &MenuState) -> Result<(), ObserverError>;
}

impl<F> StatusSink for F
where
    F: FnMut(&MenuState) -> Result<(), ObserverError>,
{
    fn render(&mut self, menu: &MenuState) -> Result<(), ObserverError> {
        self(menu)
    }
}

pub struct StatusObserver<S> {
    sink: S,
    last: Option<MenuState>,
}

impl<S: StatusSink> StatusObserver<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, last: None }
    }

    pub fn last(&self) -> Option<&MenuState> {
        self.last.as_ref()
    }
}

impl<S: StatusSink> Observer for StatusObserver<S> {
    fn name(&self) -> &str {
        "status"
    }

    fn notify(&mut self, notification: &Notification) -> Result<(), ObserverError> {
        let menu = MenuState::from_snapshot(&notification.snapshot);
        // Redraw only when something visible changed.
        if self.last.as_ref() == Some(&menu) {
            return Ok(());
        }
        self.sink.render(&menu)?;
        self.last = Some(menu);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Change;

    fn snap(phase: Phase, remaining_secs: u32, paused: bool) -> Snapshot {
        Snapshot {
            phase,
            remaining_secs,
            paused,
        }
    }

    #[test]
    fn work_enables_start_break_only() {
        let m = MenuState::from_snapshot(&snap(Phase::Work, 90, false));
        assert_eq!(m.title, "01:30");
        assert!(m.start_break_enabled);
        assert!(!m.skip_break_enabled);
        assert_eq!(m.pause_label, "Pause Cycle");
    }

    #[test]
    fn rest_enables_skip_only_and_paused_offers_resume() {
        let m = MenuState::from_snapshot(&snap(Phase::Rest, 5, true));
        assert_eq!(m.title, "Break 00:05");
        assert!(!m.start_break_enabled);
        assert!(m.skip_break_enabled);
        assert_eq!(m.pause_label, "Resume Cycle");
    }

    #[test]
    fn identical_redelivery_does_not_redraw() {
        let mut draws = 0;
        {
            let mut obs = StatusObserver::new(|_: &MenuState| {
                draws += 1;
                Ok::<(), ObserverError>(())
            });
            let n = Notification {
                change: Change::Attached,
                snapshot: snap(Phase::Work, 10, false),
            };
            obs.notify(&n).unwrap();
            obs.notify(&n).unwrap();
            obs.notify(&Notification {
                change: Change::Tick,
                snapshot: snap(Phase::Work, 9, false),
            })
            .unwrap();
        }
        assert_eq!(draws, 2);
    }
}
