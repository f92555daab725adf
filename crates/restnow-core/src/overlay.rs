//! Break overlay presentation.
//!
//! Two layers:
//!
//! - [`OverlayObserver`] turns session notifications into `show()`/`hide()`
//!   calls. Visibility is derived from the phase alone and the presenter is
//!   only called when that derived value changes.
//! - [`OverlayController`] drives one render surface per display with a
//!   shared fade level. Repeated requests are idempotent and an interrupted
//!   fade reverses from where it is, so the latest request always settles.

use tracing::{debug, warn};

use crate::bus::{Notification, Observer, Snapshot};
use crate::error::ObserverError;
use crate::timer::{format_clock, Phase};

pub const DEFAULT_MESSAGE: &str = "Take a break. Gently look away from the screen and relax.";
pub const OVERLAY_TITLE: &str = "Rest Now";
/// How to end the break early, shown under the countdown.
pub const SKIP_HINT: &str = "s: skip break";

/// Receiver of overlay visibility requests.
pub trait OverlayPresenter {
    fn show(&mut self);
    fn hide(&mut self);

    /// Content update while the overlay may be visible (countdown text).
    fn refresh(&mut self, _snapshot: &Snapshot) {}

    /// One animation frame; `true` while still animating.
    fn advance_animation(&mut self) -> bool {
        false
    }
}

/// Maps `phase == Rest` to presenter visibility.
pub struct OverlayObserver<P> {
    presenter: P,
    visible: bool,
}

impl<P: OverlayPresenter> OverlayObserver<P> {
    /// The presenter is assumed hidden when attached.
    pub fn new(presenter: P) -> Self {
        Self {
            presenter,
            visible: false,
        }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }
}

impl<P: OverlayPresenter> Observer for OverlayObserver<P> {
    fn name(&self) -> &str {
        "overlay"
    }

    fn notify(&mut self, notification: &Notification) -> Result<(), ObserverError> {
        let snapshot = &notification.snapshot;
        let want = snapshot.phase == Phase::Rest;
        if want != self.visible {
            self.visible = want;
            if want {
                self.presenter.show();
            } else {
                self.presenter.hide();
            }
        }
        if want {
            self.presenter.refresh(snapshot);
        }
        Ok(())
    }

    fn on_detach(&mut self) {
        if self.visible {
            self.visible = false;
            self.presenter.hide();
        }
    }

    fn advance_animation(&mut self) -> bool {
        self.presenter.advance_animation()
    }
}

// ── Surfaces ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayId(pub String);

/// What every surface draws for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFrame<'a> {
    /// 0.0 (transparent) ..= 1.0 (opaque)
    pub opacity: f32,
    pub title: &'a str,
    pub message: &'a str,
    pub countdown: &'a str,
    pub hint: &'a str,
}

/// One full-screen render target on one display.
pub trait Surface {
    fn render(&mut self, frame: &OverlayFrame<'_>) -> Result<(), ObserverError>;
    /// Bring to front above other windows.
    fn raise(&mut self) -> Result<(), ObserverError>;
    fn close(&mut self) -> Result<(), ObserverError>;
}

/// Platform glue that knows the attached displays and can open surfaces.
pub trait SurfaceBackend {
    type Surface: Surface;

    fn displays(&self) -> Vec<DisplayId>;
    fn open(&mut self, display: &DisplayId) -> Result<Self::Surface, ObserverError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeState {
    Hidden,
    FadingIn,
    Shown,
    FadingOut,
}

pub struct OverlayController<B: SurfaceBackend> {
    backend: B,
    surfaces: Vec<(DisplayId, B::Surface)>,
    state: FadeState,
    level: u32,
    fade_steps: u32,
    message: String,
    countdown: String,
}

impl<B: SurfaceBackend> OverlayController<B> {
    /// `fade_steps == 0` disables the fade.
    pub fn new(backend: B, fade_steps: u32) -> Self {
        Self {
            backend,
            surfaces: Vec::new(),
            state: FadeState::Hidden,
            level: 0,
            fade_steps,
            message: DEFAULT_MESSAGE.to_string(),
            countdown: String::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn state(&self) -> FadeState {
        self.state
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn opacity(&self) -> f32 {
        match (self.state, self.fade_steps) {
            (FadeState::Hidden, _) => 0.0,
            (_, 0) => 1.0,
            _ => self.level as f32 / self.fade_steps as f32,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Open surfaces on displays that appeared since `show()` and close those
    /// whose display went away. No-op while hidden. Returns the number of
    /// surfaces opened.
    pub fn sync_displays(&mut self) -> usize {
        if self.state == FadeState::Hidden {
            return 0;
        }
        let current = self.backend.displays();

        let mut gone = Vec::new();
        self.surfaces.retain_mut(|(id, surface)| {
            if current.contains(id) {
                true
            } else {
                gone.push(id.clone());
                if let Err(e) = surface.close() {
                    warn!(display = %id.0, error = %e, "failed to close overlay surface");
                }
                false
            }
        });
        for id in gone {
            debug!(display = %id.0, "display removed");
        }

        let missing: Vec<DisplayId> = current
            .into_iter()
            .filter(|id| !self.surfaces.iter().any(|(known, _)| known == id))
            .collect();
        let mut opened = 0;
        for id in missing {
            if self.open_surface(id) {
                opened += 1;
            }
        }
        if opened > 0 {
            self.render_all();
        }
        opened
    }

    fn open_surface(&mut self, id: DisplayId) -> bool {
        match self.backend.open(&id) {
            Ok(surface) => {
                debug!(display = %id.0, "overlay surface opened");
                self.surfaces.push((id, surface));
                true
            }
            Err(e) => {
                warn!(display = %id.0, error = %e, "failed to open overlay surface");
                false
            }
        }
    }

    fn render_all(&mut self) {
        let opacity = self.opacity();
        let frame = OverlayFrame {
            opacity,
            title: OVERLAY_TITLE,
            message: &self.message,
            countdown: &self.countdown,
            hint: SKIP_HINT,
        };
        for (id, surface) in self.surfaces.iter_mut() {
            if let Err(e) = surface.render(&frame) {
                warn!(display = %id.0, error = %e, "failed to render overlay surface");
            }
        }
    }

    fn raise_all(&mut self) {
        for (id, surface) in self.surfaces.iter_mut() {
            if let Err(e) = surface.raise() {
                warn!(display = %id.0, error = %e, "failed to raise overlay surface");
            }
        }
    }

    fn close_all(&mut self) {
        for (id, mut surface) in self.surfaces.drain(..) {
            if let Err(e) = surface.close() {
                warn!(display = %id.0, error = %e, "failed to close overlay surface");
            }
        }
        self.state = FadeState::Hidden;
        self.level = 0;
    }
}

impl<B: SurfaceBackend> OverlayPresenter for OverlayController<B> {
    fn show(&mut self) {
        match self.state {
            FadeState::Hidden => {
                for id in self.backend.displays() {
                    self.open_surface(id);
                }
                if self.fade_steps == 0 {
                    self.level = 0;
                    self.state = FadeState::Shown;
                } else {
                    self.level = 0;
                    self.state = FadeState::FadingIn;
                }
                self.raise_all();
                self.render_all();
            }
            FadeState::FadingOut => {
                self.state = if self.level >= self.fade_steps {
                    FadeState::Shown
                } else {
                    FadeState::FadingIn
                };
                self.sync_displays();
                self.raise_all();
            }
            FadeState::FadingIn | FadeState::Shown => {
                self.sync_displays();
                self.raise_all();
            }
        }
    }

    fn hide(&mut self) {
        match self.state {
            FadeState::Hidden | FadeState::FadingOut => {}
            FadeState::FadingIn | FadeState::Shown => {
                if self.fade_steps == 0 || self.level == 0 {
                    self.close_all();
                } else {
                    self.state = FadeState::FadingOut;
                }
            }
        }
    }

    fn refresh(&mut self, snapshot: &Snapshot) {
        self.countdown = format_clock(snapshot.remaining_secs);
        if self.state != FadeState::Hidden {
            self.render_all();
        }
    }

    fn advance_animation(&mut self) -> bool {
        match self.state {
            FadeState::FadingIn => {
                self.level = (self.level + 1).min(self.fade_steps);
                if self.level >= self.fade_steps {
                    self.state = FadeState::Shown;
                }
                self.render_all();
                self.state == FadeState::FadingIn
            }
            FadeState::FadingOut => {
                self.level = self.level.saturating_sub(1);
                if self.level == 0 {
                    self.close_all();
                    false
                } else {
                    self.render_all();
                    true
                }
            }
            FadeState::Hidden | FadeState::Shown => false,
        }
    }
}

impl<B: SurfaceBackend> Drop for OverlayController<B> {
    fn drop(&mut self) {
        if !self.surfaces.is_empty() {
            self.close_all();
        }
    }
}
