//! Phase-change alerts (the "bell").
//!
//! Whether to alert is a pure function of the change that produced a
//! notification. Plain ticks, pause toggles, attach redeliveries and a reset
//! that stays in Work never alert.

use serde::{Deserialize, Serialize};

use crate::bus::{Change, Notification, Observer};
use crate::error::ObserverError;
use crate::timer::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    BreakStarted,
    BreakEnded,
}

impl Alert {
    pub fn title(self) -> &'static str {
        match self {
            Alert::BreakStarted => "Rest Now",
            Alert::BreakEnded => "Back to work",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            Alert::BreakStarted => "Time for a break. Look away from the screen and relax.",
            Alert::BreakEnded => "Break is over. The next work interval has started.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    pub on_break_start: bool,
    pub on_break_end: bool,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            on_break_start: true,
            on_break_end: false,
        }
    }
}

pub fn alert_for(change: &Change, policy: &AlertPolicy) -> Option<Alert> {
    match *change {
        Change::Transition { from, to, .. } if from != to => match to {
            Phase::Rest if policy.on_break_start => Some(Alert::BreakStarted),
            Phase::Work if policy.on_break_end => Some(Alert::BreakEnded),
            _ => None,
        },
        _ => None,
    }
}

pub trait AlertSink {
    fn alert(&mut self, alert: Alert) -> Result<(), ObserverError>;
}

pub struct AlertObserver<S> {
    sink: S,
    policy: AlertPolicy,
}

impl<S: AlertSink> AlertObserver<S> {
    pub fn new(sink: S, policy: AlertPolicy) -> Self {
        Self { sink, policy }
    }
}

impl<S: AlertSink> Observer for AlertObserver<S> {
    fn name(&self) -> &str {
        "alert"
    }

    fn notify(&mut self, notification: &Notification) -> Result<(), ObserverError> {
        match alert_for(&notification.change, &self.policy) {
            Some(alert) => self.sink.alert(alert),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::TransitionCause;

    fn transition(from: Phase, to: Phase, cause: TransitionCause) -> Change {
        Change::Transition { from, to, cause }
    }

    #[test]
    fn entering_rest_alerts_by_default() {
        let policy = AlertPolicy::default();
        assert_eq!(
            alert_for(
                &transition(Phase::Work, Phase::Rest, TransitionCause::Elapsed),
                &policy
            ),
            Some(Alert::BreakStarted)
        );
        assert_eq!(
            alert_for(
                &transition(Phase::Work, Phase::Rest, TransitionCause::StartBreakNow),
                &policy
            ),
            Some(Alert::BreakStarted)
        );
        assert_eq!(
            alert_for(
                &transition(Phase::Rest, Phase::Work, TransitionCause::Elapsed),
                &policy
            ),
            None
        );
    }

    #[test]
    fn break_end_alert_is_opt_in() {
        let policy = AlertPolicy {
            on_break_start: false,
            on_break_end: true,
        };
        assert_eq!(
            alert_for(
                &transition(Phase::Rest, Phase::Work, TransitionCause::SkipBreak),
                &policy
            ),
            Some(Alert::BreakEnded)
        );
        assert_eq!(
            alert_for(
                &transition(Phase::Work, Phase::Rest, TransitionCause::Elapsed),
                &policy
            ),
            None
        );
    }

    #[test]
    fn non_crossing_changes_never_alert() {
        let policy = AlertPolicy {
            on_break_start: true,
            on_break_end: true,
        };
        for change in [
            Change::Attached,
            Change::Tick,
            Change::PauseToggled,
            transition(Phase::Work, Phase::Work, TransitionCause::Reset),
        ] {
            assert_eq!(alert_for(&change, &policy), None);
        }
    }
}
