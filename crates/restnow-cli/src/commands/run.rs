use std::io::{self, BufRead, IsTerminal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use restnow_core::{
    drive, AlertObserver, App, Command, Config, ConfigError, CycleDurations, Event,
    JsonLinesObserver, MenuState, Observer, ObserverError, OverlayController, OverlayObserver,
    StatusObserver,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::setup;
use crate::input::{parse_line, Action, Keymap};
use crate::notify::DesktopAlerts;
use crate::terminal::{self, RawModeGuard, Screen, SharedScreen, TerminalBackend};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    let durations = match config.durations() {
        Some(durations) => durations,
        None if !json && io::stdin().is_terminal() => {
            println!("RestNow is not configured yet.");
            let durations = setup::prompt_durations()?;
            persist(&mut config, durations)?;
            durations
        }
        None => {
            return Err("durations are not configured; run `restnow setup --work 25m --rest 5m`".into())
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    if json {
        runtime.block_on(run_headless(config, durations))
    } else {
        runtime.block_on(run_interactive(config, durations))
    }
}

fn persist(config: &mut Config, durations: CycleDurations) -> Result<(), ConfigError> {
    config.set_durations(durations);
    config.save()
}

// ── Interactive ──────────────────────────────────────────────────────

async fn run_interactive(
    mut config: Config,
    durations: CycleDurations,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = RawModeGuard::enable()?;
    let screen = Screen::shared(Box::new(io::stdout()));

    let (key_tx, mut keys) = mpsc::unbounded_channel();
    let stop = Arc::new(AtomicBool::new(false));
    let reader = terminal::spawn_key_reader(key_tx, stop.clone());

    let (tick_tx, mut ticks) = mpsc::unbounded_channel();
    let (cmd_tx, mut commands) = mpsc::unbounded_channel();
    let frame = Duration::from_millis(config.overlay.frame_ms);
    let mut app = App::new(durations, interactive_observers(&config, screen.clone()), tick_tx);
    info!(
        work_secs = durations.work_secs(),
        rest_secs = durations.rest_secs(),
        "session started"
    );

    let host_screen = screen.clone();
    let host = async {
        let mut keymap = Keymap::new();
        while let Some(key) = keys.recv().await {
            let Some(action) = keymap.feed(key) else {
                continue;
            };
            let drawn = match action {
                Action::Send(command) => {
                    let _ = cmd_tx.send(command);
                    if command == Command::Quit {
                        return;
                    }
                    Ok(())
                }
                Action::Commit(durations) => {
                    let mut screen = host_screen.borrow_mut();
                    let drawn = screen.set_prompt(None);
                    if let Err(e) = persist(&mut config, durations) {
                        warn!(error = %e, "failed to save settings");
                        let _ = screen.set_notice("settings not saved");
                    }
                    drop(screen);
                    let _ = cmd_tx.send(Command::CommitSettings(durations));
                    drawn
                }
                Action::Prompt(text) => host_screen.borrow_mut().set_prompt(text),
                Action::Invalid(message) => host_screen.borrow_mut().set_notice(message),
            };
            if let Err(e) = drawn {
                warn!(error = %e, "failed to draw status line");
            }
        }
        debug!("key reader stopped");
        let _ = cmd_tx.send(Command::Quit);
    };

    tokio::join!(drive(&mut app, &mut ticks, &mut commands, frame), host);
    drop(app);

    stop.store(true, Ordering::Relaxed);
    let _ = reader.join();
    screen.borrow_mut().restore()?;
    drop(raw);
    Ok(())
}

fn interactive_observers(
    config: &Config,
    screen: SharedScreen,
) -> impl FnMut(&CycleDurations) -> Vec<Box<dyn Observer>> {
    let overlay = config.overlay.clone();
    let alerts = config.alerts.clone();
    let policy = config.alert_policy();

    move |_| {
        let mut observers: Vec<Box<dyn Observer>> = Vec::new();

        let status_screen = screen.clone();
        observers.push(Box::new(StatusObserver::new(move |menu: &MenuState| {
            status_screen
                .borrow_mut()
                .set_status(menu)
                .map_err(ObserverError::from)
        })));

        if overlay.enabled {
            let controller =
                OverlayController::new(TerminalBackend::new(screen.clone()), overlay.fade_steps)
                    .with_message(overlay.message.clone());
            observers.push(Box::new(OverlayObserver::new(controller)));
        }

        if alerts.enabled {
            let bell = alerts.terminal_bell.then(|| screen.clone());
            let sink = DesktopAlerts::new(bell, alerts.desktop_notification);
            observers.push(Box::new(AlertObserver::new(sink, policy)));
        }

        observers
    }
}

// ── Headless (--json) ────────────────────────────────────────────────

async fn run_headless(
    mut config: Config,
    durations: CycleDurations,
) -> Result<(), Box<dyn std::error::Error>> {
    let (line_tx, mut lines) = mpsc::unbounded_channel();
    spawn_line_reader(line_tx);

    let (tick_tx, mut ticks) = mpsc::unbounded_channel();
    let (cmd_tx, mut commands) = mpsc::unbounded_channel();
    let frame = Duration::from_millis(config.overlay.frame_ms);
    let mut app = App::new(durations, headless_observers(&config), tick_tx);

    let host = async {
        while let Some(line) = lines.recv().await {
            match parse_line(&line) {
                Some(Action::Send(command)) => {
                    let _ = cmd_tx.send(command);
                    if command == Command::Quit {
                        return;
                    }
                }
                Some(Action::Commit(durations)) => {
                    if let Err(e) = persist(&mut config, durations) {
                        warn!(error = %e, "failed to save settings");
                    }
                    let _ = cmd_tx.send(Command::CommitSettings(durations));
                }
                Some(Action::Invalid(message)) => warn!("{message}"),
                Some(Action::Prompt(_)) | None => {}
            }
        }
        // Without stdin the cycle keeps running until the process is stopped.
        debug!("stdin closed");
    };

    tokio::join!(drive(&mut app, &mut ticks, &mut commands, frame), host);
    Ok(())
}

fn headless_observers(config: &Config) -> impl FnMut(&CycleDurations) -> Vec<Box<dyn Observer>> {
    let alerts = config.alerts.clone();
    let policy = config.alert_policy();

    move |durations| {
        let mut json = JsonLinesObserver::new(io::stdout());
        if let Err(e) = json.write_event(&Event::session_started(durations)) {
            warn!(error = %e, "failed to write event");
        }
        let mut observers: Vec<Box<dyn Observer>> = vec![Box::new(json)];
        if alerts.enabled && alerts.desktop_notification {
            let sink = DesktopAlerts::new(None, true);
            observers.push(Box::new(AlertObserver::new(sink, policy)));
        }
        observers
    }
}

fn spawn_line_reader(tx: mpsc::UnboundedSender<String>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    break;
                }
            }
        }
    });
}
