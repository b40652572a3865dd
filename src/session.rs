//! The per-session context object.
//!
//! A [`Session`] owns everything the UI needs for one page load: the palette
//! store, the extractor, the entropy source, the preview mode, the theme and
//! the toast state. Dropping the session ends it; extractions still in flight
//! then find their store gone and discard their result.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::config::{PaletteConfig, StalePolicy};
use crate::error::{PaletteError, Result};
use crate::extract::PaletteExtractor;
use crate::notify::Toasts;
use crate::palette::Palette;
use crate::random::EntropySource;
use crate::store::{Observers, PaletteState, PaletteStore, PaletteSummary};

/// Mock layout the preview pane renders the palette into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    #[default]
    Website,
    Material,
    Dashboard,
    Minimal,
}

impl PreviewMode {
    pub const ALL: [Self; 4] = [Self::Website, Self::Material, Self::Dashboard, Self::Minimal];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Material => "material",
            Self::Dashboard => "dashboard",
            Self::Minimal => "minimal",
        }
    }

    /// Tab label ("Website", "Material", ...).
    pub const fn label(self) -> &'static str {
        match self {
            Self::Website => "Website",
            Self::Material => "Material",
            Self::Dashboard => "Dashboard",
            Self::Minimal => "Minimal",
        }
    }
}

impl fmt::Display for PreviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreviewMode {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PaletteError::Config(format!("unknown preview mode: {s}")))
    }
}

/// Page color scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// Theme matching the system `prefers-color-scheme` hint.
    pub const fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// An extraction that has been requested but not yet resolved.
///
/// Resolve it with one of the `complete*` methods once pixel data is
/// available, or with [`PendingExtraction::fail`] if loading failed. Dropping
/// it unresolved cancels the extraction.
#[derive(Debug)]
#[must_use = "an extraction does nothing until it is completed"]
pub struct PendingExtraction {
    id: u64,
    store: Weak<RefCell<PaletteStore>>,
    observers: Weak<RefCell<Observers>>,
    latest: Weak<Cell<u64>>,
    extractor: PaletteExtractor,
    policy: StalePolicy,
}

impl PendingExtraction {
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Whether a newer extraction has been requested since this one.
    pub fn is_superseded(&self) -> bool {
        self.latest
            .upgrade()
            .is_some_and(|latest| latest.get() != self.id)
    }

    /// Extract from decoded pixels and apply the result.
    pub fn complete(self, image: &RgbaImage) -> Option<Palette> {
        self.complete_rgba(image.as_raw())
    }

    /// Extract from raw RGBA bytes and apply the result.
    pub fn complete_rgba(self, rgba: &[u8]) -> Option<Palette> {
        let store = self.live_store()?;
        let palette = self.extractor.extract_rgba(rgba);
        let state = store.borrow_mut().apply_extracted(palette);
        if let Some(observers) = self.observers.upgrade() {
            Observers::notify_shared(&observers, &state);
        }
        Some(palette)
    }

    /// Decode encoded image bytes, then extract and apply. A decode failure
    /// is logged and leaves the current palette untouched.
    pub fn complete_bytes(self, bytes: &[u8]) -> Option<Palette> {
        self.live_store()?;
        match PaletteExtractor::decode(bytes) {
            Ok(image) => self.complete(&image),
            Err(e) => {
                self.fail(&e);
                None
            }
        }
    }

    /// Resolve as failed (e.g. the image never loaded). State is not touched.
    pub fn fail(self, err: &PaletteError) {
        log::error!("palette extraction {} failed: {err}", self.id);
    }

    fn live_store(&self) -> Option<Rc<RefCell<PaletteStore>>> {
        let Some(store) = self.store.upgrade() else {
            log::debug!("extraction {} finished after its session ended", self.id);
            return None;
        };
        if self.policy == StalePolicy::LatestRequest && self.is_superseded() {
            log::debug!("extraction {} superseded by a newer request", self.id);
            return None;
        }
        Some(store)
    }
}

/// Everything one page load needs, explicitly owned.
pub struct Session {
    config: PaletteConfig,
    store: Rc<RefCell<PaletteStore>>,
    observers: Rc<RefCell<Observers>>,
    latest_request: Rc<Cell<u64>>,
    extractor: PaletteExtractor,
    entropy: RefCell<Box<dyn EntropySource>>,
    mode: PreviewMode,
    theme: Theme,
    toasts: Toasts,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("observers", &self.observers)
            .field("mode", &self.mode)
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a session with a random palette.
    pub fn new(config: PaletteConfig, entropy: impl EntropySource + 'static) -> Result<Self> {
        config.validate()?;
        let mut entropy: Box<dyn EntropySource> = Box::new(entropy);
        let store = PaletteStore::new(entropy.as_mut());
        Ok(Self {
            extractor: PaletteExtractor::new(&config),
            toasts: Toasts::new(config.toast_duration_ms),
            config,
            store: Rc::new(RefCell::new(store)),
            observers: Rc::new(RefCell::new(Observers::default())),
            latest_request: Rc::new(Cell::new(0)),
            entropy: RefCell::new(entropy),
            mode: PreviewMode::default(),
            theme: Theme::default(),
        })
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: PaletteExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub const fn config(&self) -> &PaletteConfig {
        &self.config
    }

    pub fn state(&self) -> PaletteState {
        *self.store.borrow().state()
    }

    pub fn palette(&self) -> Palette {
        *self.store.borrow().palette()
    }

    pub fn selected(&self) -> Color {
        self.store.borrow().selected()
    }

    pub fn summary(&self) -> PaletteSummary {
        self.store.borrow().summary()
    }

    /// Called with the new state after every transition, once the store is
    /// no longer borrowed, so observers may read the session back.
    pub fn subscribe(&self, observer: impl FnMut(&PaletteState) + 'static) {
        self.observers.borrow_mut().subscribe(observer);
    }

    pub fn randomize(&self) {
        let state = self
            .store
            .borrow_mut()
            .randomize(self.entropy.borrow_mut().as_mut());
        Observers::notify_shared(&self.observers, &state);
    }

    pub fn select(&self, color: Color) {
        let state = self.store.borrow_mut().select(color);
        Observers::notify_shared(&self.observers, &state);
    }

    /// Parse and select a color string (e.g. from a color picker).
    pub fn select_hex(&self, hex: &str) -> Result<Color> {
        let color = Color::from_hex(hex)?;
        self.select(color);
        Ok(color)
    }

    /// Register a new extraction. The handle holds only weak references to
    /// the session.
    pub fn begin_extraction(&self) -> PendingExtraction {
        let id = self.latest_request.get() + 1;
        self.latest_request.set(id);
        PendingExtraction {
            id,
            store: Rc::downgrade(&self.store),
            observers: Rc::downgrade(&self.observers),
            latest: Rc::downgrade(&self.latest_request),
            extractor: self.extractor.clone(),
            policy: self.config.stale_policy,
        }
    }

    /// Begin and immediately complete an extraction from encoded bytes.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Option<Palette> {
        self.begin_extraction().complete_bytes(bytes)
    }

    pub fn export_css(&self) -> String {
        self.store.borrow().export_css()
    }

    pub fn export_framework_snippet(&self) -> String {
        self.store.borrow().export_framework_snippet()
    }

    pub const fn mode(&self) -> PreviewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PreviewMode) {
        self.mode = mode;
    }

    pub const fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Show a toast and return its id for later dismissal.
    pub fn notify(&mut self, message: impl Into<String>, now_ms: f64) -> u64 {
        self.toasts.show(message, now_ms)
    }

    pub const fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut Toasts {
        &mut self.toasts
    }
}
