//! # RestNow Core Library
//!
//! Core logic for the RestNow break reminder: a two-phase work/rest timer
//! that nudges the user to look away from the screen at regular intervals.
//! The CLI binary is a thin host over this library.
//!
//! ## Architecture
//!
//! - **Timer**: A tick-driven Work/Rest state machine plus a one-second clock
//!   driver that feeds it
//! - **Bus**: Observer registration and change notification
//! - **Presentation**: Overlay fade controller, status indicator and alerts,
//!   all written against small traits so hosts supply the platform surface
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Session`]: Phase timer state machine
//! - [`ClockDriver`]: Tick source bound to a single consumer
//! - [`App`]: Composition root that owns the session and its clock
//! - [`Config`]: Application configuration management

pub mod alert;
pub mod app;
pub mod bus;
pub mod error;
pub mod events;
pub mod overlay;
pub mod status;
pub mod storage;
pub mod timer;

pub use alert::{Alert, AlertObserver, AlertPolicy, AlertSink};
pub use app::{drive, App, Command, Control, ObserverFactory};
pub use bus::{Change, Notification, ObservationBus, Observer, ObserverId, Snapshot, TransitionCause};
pub use error::{ConfigError, CoreError, ObserverError, ValidationError};
pub use events::{Event, JsonLinesObserver};
pub use overlay::{OverlayController, OverlayObserver, OverlayPresenter, Surface, SurfaceBackend};
pub use status::{MenuState, StatusObserver, StatusSink};
pub use storage::Config;
pub use timer::{
    format_clock, parse_duration, status_label, ClockDriver, ClockTick, CycleDurations, Outcome,
    Phase, Session,
};
