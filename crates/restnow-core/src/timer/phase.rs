use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The current mode of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Rest,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Rest => "rest",
        }
    }

    /// The phase a completed countdown flips into.
    pub fn next(self) -> Phase {
        match self {
            Phase::Work => Phase::Rest,
            Phase::Rest => Phase::Work,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work and rest lengths of one session, in whole seconds.
///
/// Both values are strictly positive. Construct through [`CycleDurations::new`]
/// so a zero length never reaches the phase timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleDurations {
    work_secs: u32,
    rest_secs: u32,
}

impl CycleDurations {
    pub fn new(work_secs: u32, rest_secs: u32) -> Result<Self, ValidationError> {
        if work_secs == 0 {
            return Err(ValidationError::ZeroDuration { field: "work" });
        }
        if rest_secs == 0 {
            return Err(ValidationError::ZeroDuration { field: "rest" });
        }
        Ok(Self {
            work_secs,
            rest_secs,
        })
    }

    pub fn from_minutes(work_min: u32, rest_min: u32) -> Result<Self, ValidationError> {
        Self::new(work_min.saturating_mul(60), rest_min.saturating_mul(60))
    }

    pub fn work_secs(&self) -> u32 {
        self.work_secs
    }

    pub fn rest_secs(&self) -> u32 {
        self.rest_secs
    }

    pub fn for_phase(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_secs,
            Phase::Rest => self.rest_secs,
        }
    }

    /// Upper bound of any countdown in this cycle.
    pub fn longest_secs(&self) -> u32 {
        self.work_secs.max(self.rest_secs)
    }
}

/// Parse a human duration such as `25m`, `90s`, `1h30m` or a bare number of
/// minutes into whole seconds.
pub fn parse_duration(input: &str) -> Result<u32, ValidationError> {
    let text = input.trim().to_ascii_lowercase();
    let invalid = |message: &str| ValidationError::InvalidDuration {
        input: input.to_string(),
        message: message.to_string(),
    };

    if text.is_empty() {
        return Err(invalid("empty value"));
    }

    // Digit runs longer than u64 can only be overflows.
    let number = |digits: &str| digits.parse::<u64>().map_err(|_| invalid("duration too long"));
    let too_long = || invalid("duration too long");

    if text.chars().all(|c| c.is_ascii_digit()) {
        let secs = number(text.as_str())?.checked_mul(60).ok_or_else(too_long)?;
        return u32::try_from(secs).map_err(|_| too_long());
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let unit: u64 = match ch {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            c if c.is_whitespace() => continue,
            _ => return Err(invalid("expected digits followed by h, m or s")),
        };
        if digits.is_empty() {
            return Err(invalid("missing number before unit"));
        }
        total = number(digits.as_str())?
            .checked_mul(unit)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(too_long)?;
        digits.clear();
    }
    if !digits.is_empty() {
        return Err(invalid("trailing number without unit"));
    }

    u32::try_from(total).map_err(|_| too_long())
}

/// `MM:SS` rendering of a second count. Minutes are not capped.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
