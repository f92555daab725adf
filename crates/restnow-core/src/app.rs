//! Composition root.
//!
//! [`App`] owns the current [`Session`] and its [`ClockDriver`]. Clock ticks
//! and host commands arrive on channels consumed by [`drive`], so the session
//! is only ever touched from one task.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::bus::Observer;
use crate::timer::{ClockDriver, ClockTick, CycleDurations, Outcome, Session};

/// Host commands. Open Settings is handled by the host itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartBreakNow,
    SkipBreak,
    ResetCycle,
    TogglePause,
    /// Replace the session with new durations, discarding the countdown.
    CommitSettings(CycleDurations),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Builds a fresh observer set for each new session.
pub trait ObserverFactory {
    fn build(&mut self, durations: &CycleDurations) -> Vec<Box<dyn Observer>>;
}

impl<F> ObserverFactory for F
where
    F: FnMut(&CycleDurations) -> Vec<Box<dyn Observer>>,
{
    fn build(&mut self, durations: &CycleDurations) -> Vec<Box<dyn Observer>> {
        self(durations)
    }
}

pub struct App<F> {
    session: Session,
    clock: ClockDriver,
    factory: F,
}

impl<F: ObserverFactory> App<F> {
    /// Build the first session and attach its observers. The clock is not
    /// started until [`App::start`].
    pub fn new(durations: CycleDurations, mut factory: F, ticks: mpsc::UnboundedSender<ClockTick>) -> Self {
        let session = build_session(durations, &mut factory);
        Self {
            session,
            clock: ClockDriver::new(ticks),
            factory,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.clock.start();
    }

    /// Apply a clock tick. Ticks from a stopped or replaced clock are dropped.
    pub fn on_tick(&mut self, tick: ClockTick) -> Outcome {
        if !self.clock.accepts(tick) {
            debug!(epoch = tick.epoch, "dropping stale tick");
            return Outcome::Unchanged;
        }
        self.session.tick()
    }

    pub fn handle(&mut self, command: Command) -> Control {
        debug!(?command, "command");
        match command {
            Command::StartBreakNow => {
                self.session.start_break_now();
            }
            Command::SkipBreak => {
                self.session.skip_break();
            }
            Command::ResetCycle => {
                self.session.reset_cycle();
            }
            Command::TogglePause => {
                self.session.toggle_pause();
            }
            Command::CommitSettings(durations) => self.replace_session(durations),
            Command::Quit => return Control::Quit,
        }
        Control::Continue
    }

    /// Stop the clock, detach the old observers, then build and start a new
    /// session with fresh observers.
    pub fn replace_session(&mut self, durations: CycleDurations) {
        let was_running = self.clock.is_running();
        self.clock.stop();
        self.session.detach_all();
        self.session = build_session(durations, &mut self.factory);
        info!(
            work_secs = durations.work_secs(),
            rest_secs = durations.rest_secs(),
            "session replaced"
        );
        if was_running {
            self.clock.start();
        }
    }

    pub fn advance_animation(&mut self) -> bool {
        self.session.advance_animation()
    }

    /// Stop ticking and detach every observer (hiding the overlay).
    pub fn shutdown(&mut self) {
        self.clock.stop();
        self.session.detach_all();
    }
}

fn build_session<F: ObserverFactory>(durations: CycleDurations, factory: &mut F) -> Session {
    let mut session = Session::new(durations);
    for observer in factory.build(&durations) {
        session.attach(observer);
    }
    session
}

/// Run the app until a `Quit` command arrives or the command channel closes.
///
/// Animation frames are only scheduled while some observer reports that it
/// is still animating.
pub async fn drive<F: ObserverFactory>(
    app: &mut App<F>,
    ticks: &mut mpsc::UnboundedReceiver<ClockTick>,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    frame_period: Duration,
) {
    let mut frames = time::interval(frame_period.max(Duration::from_millis(1)));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut animating = app.advance_animation();

    if !app.is_running() {
        app.start();
    }

    loop {
        tokio::select! {
            biased;
            command = commands.recv() => {
                let Some(command) = command else { break };
                if app.handle(command) == Control::Quit {
                    break;
                }
                animating = true;
            }
            Some(tick) = ticks.recv() => {
                if app.on_tick(tick).is_transition() {
                    animating = true;
                }
            }
            _ = frames.tick(), if animating => {
                animating = app.advance_animation();
            }
        }
    }

    app.shutdown();
}
