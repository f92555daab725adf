//! Keyboard and stdin command parsing.
//!
//! Single keys map directly to session commands. `,` opens an inline
//! settings prompt that takes a work and a rest duration ("25m 5m").

use restnow_core::{parse_duration, Command, CycleDurations, ValidationError};

/// Key presses the host cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Esc,
    /// Ctrl-C
    Interrupt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send(Command),
    /// Persist the durations, then replace the session.
    Commit(CycleDurations),
    /// Settings prompt text changed; `None` closes the prompt.
    Prompt(Option<String>),
    Invalid(String),
}

pub fn command_for_key(c: char) -> Option<Command> {
    match c.to_ascii_lowercase() {
        'b' => Some(Command::StartBreakNow),
        's' => Some(Command::SkipBreak),
        'r' => Some(Command::ResetCycle),
        'p' => Some(Command::TogglePause),
        'q' => Some(Command::Quit),
        _ => None,
    }
}

/// Parse "<work> <rest>", e.g. "25m 5m" or "50 10".
pub fn parse_settings(text: &str) -> Result<CycleDurations, ValidationError> {
    let mut parts = text.split_whitespace();
    let (Some(work), Some(rest), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ValidationError::InvalidDuration {
            input: text.trim().to_string(),
            message: "expected a work and a rest duration, e.g. \"25m 5m\"".into(),
        });
    };
    CycleDurations::new(parse_duration(work)?, parse_duration(rest)?)
}

/// Interactive key handling with an inline settings prompt.
#[derive(Debug, Default)]
pub struct Keymap {
    editing: Option<String>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, key: Key) -> Option<Action> {
        if key == Key::Interrupt {
            self.editing = None;
            return Some(Action::Send(Command::Quit));
        }

        let Some(buffer) = self.editing.as_mut() else {
            return match key {
                Key::Char(',') => {
                    self.editing = Some(String::new());
                    Some(Action::Prompt(Some(String::new())))
                }
                Key::Char(c) => command_for_key(c).map(Action::Send),
                Key::Esc => Some(Action::Send(Command::Quit)),
                _ => None,
            };
        };

        match key {
            Key::Char(c) => {
                buffer.push(c);
                Some(Action::Prompt(Some(buffer.clone())))
            }
            Key::Backspace => {
                buffer.pop();
                Some(Action::Prompt(Some(buffer.clone())))
            }
            Key::Esc => {
                self.editing = None;
                Some(Action::Prompt(None))
            }
            Key::Enter => match parse_settings(buffer) {
                Ok(durations) => {
                    self.editing = None;
                    Some(Action::Commit(durations))
                }
                Err(e) => Some(Action::Invalid(e.to_string())),
            },
            Key::Interrupt => None,
        }
    }
}

/// One line of headless input: a command key, or `set <work> <rest>`.
pub fn parse_line(line: &str) -> Option<Action> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix("set ") {
        return Some(match parse_settings(rest) {
            Ok(durations) => Action::Commit(durations),
            Err(e) => Action::Invalid(e.to_string()),
        });
    }
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => command_for_key(c).map(Action::Send),
        _ if line.is_empty() => None,
        _ => Some(Action::Invalid(format!("unknown command: {line}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_keys() {
        assert_eq!(command_for_key('b'), Some(Command::StartBreakNow));
        assert_eq!(command_for_key('S'), Some(Command::SkipBreak));
        assert_eq!(command_for_key('x'), None);
    }

    #[test]
    fn settings_prompt_commits_valid_durations() {
        let mut keys = Keymap::new();
        assert_eq!(keys.feed(Key::Char(',')), Some(Action::Prompt(Some(String::new()))));
        for c in "25m 5m".chars() {
            keys.feed(Key::Char(c));
        }
        assert_eq!(
            keys.feed(Key::Enter),
            Some(Action::Commit(CycleDurations::new(1500, 300).unwrap()))
        );
        assert_eq!(keys.feed(Key::Char('q')), Some(Action::Send(Command::Quit)));
    }

    #[test]
    fn invalid_settings_keep_prompt_open() {
        let mut keys = Keymap::new();
        keys.feed(Key::Char(','));
        keys.feed(Key::Char('0'));
        keys.feed(Key::Char(' '));
        keys.feed(Key::Char('5'));
        assert!(matches!(keys.feed(Key::Enter), Some(Action::Invalid(_))));
        // Command keys are text while editing.
        assert_eq!(keys.feed(Key::Char('q')), Some(Action::Prompt(Some("0 5q".into()))));
        keys.feed(Key::Backspace);

        assert_eq!(keys.feed(Key::Esc), Some(Action::Prompt(None)));
        assert_eq!(keys.feed(Key::Char('p')), Some(Action::Send(Command::TogglePause)));
    }

    #[test]
    fn interrupt_always_quits() {
        let mut keys = Keymap::new();
        keys.feed(Key::Char(','));
        assert_eq!(keys.feed(Key::Interrupt), Some(Action::Send(Command::Quit)));
    }

    #[test]
    fn headless_lines() {
        assert_eq!(parse_line("b\n"), Some(Action::Send(Command::StartBreakNow)));
        assert_eq!(parse_line(""), None);
        assert_eq!(
            parse_line("set 1h 10m"),
            Some(Action::Commit(CycleDurations::new(3600, 600).unwrap()))
        );
        assert!(matches!(parse_line("set 5m"), Some(Action::Invalid(_))));
        assert!(matches!(parse_line("hello"), Some(Action::Invalid(_))));
    }
}
