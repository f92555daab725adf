mod clock;
mod phase;
mod session;

pub use clock::{ClockDriver, ClockTick, TICK_PERIOD};
pub use phase::{format_clock, parse_duration, CycleDurations, Phase};
pub use session::{status_label, Outcome, Session};
