//! Integration tests for the composition root running on a paused tokio clock.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use restnow_core::overlay::OverlayPresenter;
use restnow_core::{
    drive, App, Command, CycleDurations, Notification, Observer, ObserverError, OverlayObserver,
    Phase,
};
use tokio::sync::mpsc;
use tokio::time::sleep;

const FRAME: Duration = Duration::from_millis(40);

// ============================================================================
// Test Helpers
// ============================================================================

type Log = Rc<RefCell<Vec<(usize, Notification)>>>;

struct Recorder {
    generation: usize,
    log: Log,
}

impl Observer for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn notify(&mut self, notification: &Notification) -> Result<(), ObserverError> {
        self.log.borrow_mut().push((self.generation, *notification));
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Visibility(Rc<RefCell<(usize, usize)>>);

impl OverlayPresenter for Visibility {
    fn show(&mut self) {
        self.0.borrow_mut().0 += 1;
    }

    fn hide(&mut self) {
        self.0.borrow_mut().1 += 1;
    }
}

fn durations(work: u32, rest: u32) -> CycleDurations {
    CycleDurations::new(work, rest).unwrap()
}

fn recording_factory(log: Log) -> impl FnMut(&CycleDurations) -> Vec<Box<dyn Observer>> {
    let mut generation = 0;
    move |_| {
        generation += 1;
        vec![Box::new(Recorder {
            generation,
            log: log.clone(),
        }) as Box<dyn Observer>]
    }
}

fn last(log: &Log) -> (usize, Notification) {
    *log.borrow().last().unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_clock_drives_session_through_work_into_rest() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let (tick_tx, mut ticks) = mpsc::unbounded_channel();
    let (cmd_tx, mut commands) = mpsc::unbounded_channel();
    let mut app = App::new(durations(10, 5), recording_factory(log.clone()), tick_tx);

    let script = async move {
        sleep(Duration::from_millis(11_500)).await;
        cmd_tx.send(Command::Quit).unwrap();
    };
    tokio::join!(drive(&mut app, &mut ticks, &mut commands, FRAME), script);

    let (_, n) = last(&log);
    assert_eq!((n.snapshot.phase, n.snapshot.remaining_secs), (Phase::Rest, 5));
    assert!(!app.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_commit_settings_replaces_session_and_clock() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let (tick_tx, mut ticks) = mpsc::unbounded_channel();
    let (cmd_tx, mut commands) = mpsc::unbounded_channel();
    let mut app = App::new(durations(10, 5), recording_factory(log.clone()), tick_tx);

    let script = async move {
        sleep(Duration::from_millis(3_500)).await;
        cmd_tx.send(Command::CommitSettings(durations(20, 7))).unwrap();
        sleep(Duration::from_millis(2_500)).await;
        cmd_tx.send(Command::Quit).unwrap();
    };
    tokio::join!(drive(&mut app, &mut ticks, &mut commands, FRAME), script);

    // The replacement clock ticked twice; the old one contributed nothing.
    let (generation, n) = last(&log);
    assert_eq!(generation, 2);
    assert_eq!((n.snapshot.phase, n.snapshot.remaining_secs), (Phase::Work, 18));
    let old_after_replace = log
        .borrow()
        .iter()
        .filter(|(g, n)| *g == 1 && n.snapshot.remaining_secs < 7)
        .count();
    assert_eq!(old_after_replace, 0);
}

#[tokio::test(start_paused = true)]
async fn test_paused_session_ignores_clock() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let (tick_tx, mut ticks) = mpsc::unbounded_channel();
    let (cmd_tx, mut commands) = mpsc::unbounded_channel();
    let mut app = App::new(durations(10, 5), recording_factory(log.clone()), tick_tx);

    let script = async move {
        sleep(Duration::from_millis(2_500)).await;
        cmd_tx.send(Command::TogglePause).unwrap();
        sleep(Duration::from_secs(30)).await;
        cmd_tx.send(Command::Quit).unwrap();
    };
    tokio::join!(drive(&mut app, &mut ticks, &mut commands, FRAME), script);

    let (_, n) = last(&log);
    assert!(n.snapshot.paused);
    assert_eq!(n.snapshot.remaining_secs, 8);
}

#[tokio::test(start_paused = true)]
async fn test_quit_hides_visible_overlay() {
    let visibility = Visibility::default();
    let counts = visibility.0.clone();
    let (tick_tx, mut ticks) = mpsc::unbounded_channel();
    let (cmd_tx, mut commands) = mpsc::unbounded_channel();
    let factory = move |_: &CycleDurations| {
        vec![Box::new(OverlayObserver::new(visibility.clone())) as Box<dyn Observer>]
    };
    let mut app = App::new(durations(10, 5), factory, tick_tx);

    let script = async move {
        sleep(Duration::from_millis(1_500)).await;
        cmd_tx.send(Command::StartBreakNow).unwrap();
        sleep(Duration::from_secs(1)).await;
        cmd_tx.send(Command::Quit).unwrap();
    };
    tokio::join!(drive(&mut app, &mut ticks, &mut commands, FRAME), script);

    assert_eq!(*counts.borrow(), (1, 1));
}

#[tokio::test(start_paused = true)]
async fn test_closed_command_channel_stops_driver() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let (tick_tx, mut ticks) = mpsc::unbounded_channel();
    let (cmd_tx, mut commands) = mpsc::unbounded_channel::<Command>();
    let mut app = App::new(durations(10, 5), recording_factory(log.clone()), tick_tx);

    let script = async move {
        sleep(Duration::from_millis(1_500)).await;
        drop(cmd_tx);
    };
    tokio::join!(drive(&mut app, &mut ticks, &mut commands, FRAME), script);

    assert!(!app.is_running());
    assert_eq!(app.session().observer_count(), 0);
}
