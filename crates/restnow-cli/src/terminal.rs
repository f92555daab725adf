//! Terminal host: status line, alternate-screen overlay and key reader.
//!
//! The status line and the overlay share one [`Screen`]. While the overlay
//! is up the status line is not drawn; the overlay carries the countdown,
//! the skip hint and, on its bottom row, the settings prompt.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, queue};
use restnow_core::overlay::{DisplayId, OverlayFrame};
use restnow_core::{MenuState, ObserverError, Surface, SurfaceBackend};
use tokio::sync::mpsc;
use tracing::warn;

use crate::input::Key;

pub type SharedScreen = Rc<RefCell<Screen>>;

pub struct Screen {
    out: Box<dyn Write>,
    status: Option<MenuState>,
    prompt: Option<String>,
    notice: Option<String>,
    overlay: bool,
    overlay_shade: u8,
    overlay_text: Vec<String>,
}

impl Screen {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self {
            out,
            status: None,
            prompt: None,
            notice: None,
            overlay: false,
            overlay_shade: 0,
            overlay_text: Vec::new(),
        }
    }

    pub fn shared(out: Box<dyn Write>) -> SharedScreen {
        Rc::new(RefCell::new(Self::new(out)))
    }

    pub fn set_status(&mut self, menu: &MenuState) -> io::Result<()> {
        self.status = Some(menu.clone());
        self.draw_status()
    }

    pub fn set_prompt(&mut self, prompt: Option<String>) -> io::Result<()> {
        self.prompt = prompt;
        self.notice = None;
        self.draw_status()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) -> io::Result<()> {
        self.notice = Some(notice.into());
        self.draw_status()
    }

    pub fn bell(&mut self) -> io::Result<()> {
        self.out.write_all(b"\x07")?;
        self.out.flush()
    }

    /// Text of the single status line.
    pub fn status_line(&self) -> String {
        let Some(menu) = &self.status else {
            return String::new();
        };
        let mut line = menu.title.clone();
        if menu.paused {
            line.push_str(" [paused]");
        }
        match &self.prompt {
            Some(text) => {
                line.push_str(" | settings (work rest, e.g. 25m 5m): ");
                line.push_str(text);
                line.push('_');
            }
            None => {
                line.push_str(" |");
                if menu.start_break_enabled {
                    line.push_str(" b: start break");
                }
                if menu.skip_break_enabled {
                    line.push_str(" s: skip break");
                }
                line.push_str(" r: reset p: ");
                line.push_str(&menu.pause_label.to_lowercase());
                line.push_str(" ,: settings q: quit");
            }
        }
        if let Some(notice) = &self.notice {
            line.push_str(" | ");
            line.push_str(notice);
        }
        line
    }

    /// Prompt and notice without the key hints, for the overlay's bottom row.
    fn prompt_line(&self) -> Option<String> {
        let prompt = self
            .prompt
            .as_ref()
            .map(|text| format!("settings (work rest, e.g. 25m 5m): {text}_"));
        match (prompt, &self.notice) {
            (Some(prompt), Some(notice)) => Some(format!("{prompt} | {notice}")),
            (Some(prompt), None) => Some(prompt),
            (None, Some(notice)) => Some(notice.clone()),
            (None, None) => None,
        }
    }

    fn draw_status(&mut self) -> io::Result<()> {
        if self.overlay {
            return self.redraw_overlay();
        }
        let line = self.status_line();
        queue!(
            self.out,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(line)
        )?;
        self.out.flush()
    }

    // ── Overlay ──────────────────────────────────────────────────────

    pub fn enter_overlay(&mut self) -> io::Result<()> {
        if !self.overlay {
            queue!(self.out, EnterAlternateScreen, cursor::Hide)?;
            self.overlay = true;
        }
        self.out.flush()
    }

    pub fn draw_overlay(&mut self, frame: &OverlayFrame<'_>) -> io::Result<()> {
        if !self.overlay {
            return Ok(());
        }
        self.overlay_shade = (frame.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        self.overlay_text = [frame.title, frame.message, frame.countdown, frame.hint]
            .map(str::to_string)
            .to_vec();
        self.redraw_overlay()
    }

    /// Overlay rows top to bottom: title, message, countdown, skip hint, then
    /// the settings prompt or notice if one is open. Empty while hidden.
    pub fn overlay_lines(&self) -> Vec<String> {
        if !self.overlay || self.overlay_text.is_empty() {
            return Vec::new();
        }
        let mut lines = self.overlay_text.clone();
        lines.extend(self.prompt_line());
        lines
    }

    fn redraw_overlay(&mut self) -> io::Result<()> {
        let lines = self.overlay_lines();
        if lines.is_empty() {
            return Ok(());
        }
        let (width, height) = terminal::size().unwrap_or((80, 24));
        let shade = self.overlay_shade;
        let color = Color::Rgb {
            r: shade,
            g: shade,
            b: shade,
        };
        let middle = height / 2;
        let rows = [
            middle.saturating_sub(3),
            middle.saturating_sub(1),
            middle + 1,
            middle + 3,
            height.saturating_sub(1),
        ];

        queue!(self.out, Clear(ClearType::All), SetForegroundColor(color))?;
        for (row, text) in rows.into_iter().zip(lines) {
            let len = text.chars().count() as u16;
            let col = width.saturating_sub(len) / 2;
            queue!(self.out, cursor::MoveTo(col, row), Print(text))?;
        }
        queue!(self.out, ResetColor)?;
        self.out.flush()
    }

    pub fn leave_overlay(&mut self) -> io::Result<()> {
        if self.overlay {
            queue!(self.out, LeaveAlternateScreen, cursor::Show)?;
            self.overlay = false;
        }
        self.overlay_text.clear();
        self.draw_status()
    }

    /// Put the terminal back the way it was found.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.overlay {
            queue!(self.out, LeaveAlternateScreen, cursor::Show)?;
            self.overlay = false;
        }
        queue!(self.out, Print("\r\n"))?;
        self.out.flush()
    }
}

// ── Overlay surfaces ─────────────────────────────────────────────────

/// A terminal has exactly one "display": the alternate screen.
pub struct TerminalBackend {
    screen: SharedScreen,
}

impl TerminalBackend {
    pub fn new(screen: SharedScreen) -> Self {
        Self { screen }
    }
}

pub struct TerminalSurface {
    screen: SharedScreen,
}

impl SurfaceBackend for TerminalBackend {
    type Surface = TerminalSurface;

    fn displays(&self) -> Vec<DisplayId> {
        vec![DisplayId("terminal".into())]
    }

    fn open(&mut self, _display: &DisplayId) -> Result<TerminalSurface, ObserverError> {
        self.screen.borrow_mut().enter_overlay()?;
        Ok(TerminalSurface {
            screen: self.screen.clone(),
        })
    }
}

impl Surface for TerminalSurface {
    fn render(&mut self, frame: &OverlayFrame<'_>) -> Result<(), ObserverError> {
        self.screen.borrow_mut().draw_overlay(frame)?;
        Ok(())
    }

    fn raise(&mut self) -> Result<(), ObserverError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), ObserverError> {
        self.screen.borrow_mut().leave_overlay()?;
        Ok(())
    }
}

// ── Raw mode and keys ────────────────────────────────────────────────

pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!(error = %e, "failed to leave raw mode");
        }
    }
}

fn map_key(key: KeyEvent) -> Option<Key> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Key::Interrupt),
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Esc => Some(Key::Esc),
        _ => None,
    }
}

/// Read key presses on a plain thread until `stop` is set or the receiver
/// goes away.
pub fn spawn_key_reader(tx: mpsc::UnboundedSender<Key>, stop: Arc<AtomicBool>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            match event::poll(Duration::from_millis(100)) {
                Ok(false) => {}
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        if let Some(key) = map_key(key) {
                            if tx.send(key).is_err() {
                                break;
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "keyboard read failed");
                        break;
                    }
                },
                Err(e) => {
                    warn!(error = %e, "keyboard poll failed");
                    break;
                }
            }
        }
    })
}
