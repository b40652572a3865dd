//! JavaScript bindings for the palette UI.
//!
//! `PaletteApp` wraps a [`Session`] for the browser: clipboard writes, change
//! and toast callbacks, and toast dismissal timers. State borrows are always
//! released before a JS callback runs, so callbacks may call back into the app.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Once;

use js_sys::{Function, Promise};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::color::{self, Color};
use crate::config::PaletteConfig;
use crate::error::PaletteError;
use crate::notify;
use crate::random::RngEntropy;
use crate::session::{PreviewMode, Session, Theme};

static LOGGER: Once = Once::new();

fn init_logging() {
    LOGGER.call_once(|| {
        // A second logger (e.g. from a host page) is not an error for us
        let _ = console_log::init_with_level(log::Level::Info);
    });
}

// Timing helper for toast deadlines.
pub(crate) fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

fn prefers_dark() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .is_some_and(|query| query.matches())
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

fn invoke(callback: Option<Function>, arg: &JsValue) {
    if let Some(callback) = callback {
        if let Err(e) = callback.call1(&JsValue::NULL, arg) {
            log::warn!("callback threw: {e:?}");
        }
    }
}

async fn write_clipboard(text: &str) -> Result<(), PaletteError> {
    let window =
        web_sys::window().ok_or_else(|| PaletteError::Clipboard("no window".to_string()))?;
    let promise = window.navigator().clipboard().write_text(text);
    JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(|e| PaletteError::Clipboard(format!("{e:?}")))
}

/// Shared state reachable from async completions and timers
struct SharedState {
    session: Session,
    on_change: Option<Function>,
    on_toast: Option<Function>,
}

/// The palette app exported to JavaScript
#[wasm_bindgen]
pub struct PaletteApp {
    state: Rc<RefCell<SharedState>>,
}

impl PaletteApp {
    fn build(config: PaletteConfig) -> Result<Self, JsValue> {
        console_error_panic_hook::set_once();
        init_logging();

        let mut session = Session::new(config, RngEntropy::from_entropy())?;
        session.set_theme(Theme::from_prefers_dark(prefers_dark()));
        Ok(Self {
            state: Rc::new(RefCell::new(SharedState {
                session,
                on_change: None,
                on_toast: None,
            })),
        })
    }

    fn notify_change(state: &Rc<RefCell<SharedState>>) {
        let (value, callback) = {
            let s = state.borrow();
            (to_js(&s.session.state()), s.on_change.clone())
        };
        match value {
            Ok(value) => invoke(callback, &value),
            Err(e) => log::warn!("could not serialize palette state: {e:?}"),
        }
    }

    fn show_toast(state: &Rc<RefCell<SharedState>>, message: String) {
        let (id, timeout, callback) = {
            let mut s = state.borrow_mut();
            let timeout = i32::try_from(s.session.config().toast_duration_ms).unwrap_or(i32::MAX);
            let id = s.session.notify(message.clone(), now_ms());
            (id, timeout, s.on_toast.clone())
        };
        invoke(callback, &JsValue::from_str(&message));

        let weak = Rc::downgrade(state);
        let dismiss = Closure::once_into_js(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let (dismissed, callback) = {
                let mut s = state.borrow_mut();
                (s.session.toasts_mut().dismiss(id), s.on_toast.clone())
            };
            if dismissed {
                invoke(callback, &JsValue::NULL);
            }
        });
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                dismiss.unchecked_ref(),
                timeout,
            );
        }
    }

    fn copy_with_toast(state: Weak<RefCell<SharedState>>, text: String, message: String) -> Promise {
        future_to_promise(async move {
            match write_clipboard(&text).await {
                Ok(()) => {
                    if let Some(state) = state.upgrade() {
                        Self::show_toast(&state, message);
                    }
                    Ok(JsValue::TRUE)
                }
                Err(e) => {
                    log::debug!("{e}");
                    Ok(JsValue::FALSE)
                }
            }
        })
    }
}

#[wasm_bindgen]
impl PaletteApp {
    /// Create an app with the default configuration and a random palette
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<PaletteApp, JsValue> {
        Self::build(PaletteConfig::default())
    }

    /// Create an app from a config object (`{ candidateCount, quality, ... }`)
    #[wasm_bindgen]
    pub fn with_config(config: JsValue) -> Result<PaletteApp, JsValue> {
        let config: PaletteConfig = serde_wasm_bindgen::from_value(config)?;
        Self::build(config)
    }

    /// `{ palette, selected }` as handed to preview renderers
    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.borrow().session.state())
    }

    /// Swatches with contrast info, the selected color and its variants
    #[wasm_bindgen]
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.borrow().session.summary())
    }

    #[wasm_bindgen]
    pub fn palette(&self) -> Vec<String> {
        self.state.borrow().session.palette().to_hex_strings()
    }

    #[wasm_bindgen]
    pub fn selected(&self) -> String {
        self.state.borrow().session.selected().to_hex()
    }

    #[wasm_bindgen]
    pub fn randomize(&self) {
        self.state.borrow().session.randomize();
        Self::notify_change(&self.state);
    }

    /// Select any color, palette member or not
    #[wasm_bindgen]
    pub fn select(&self, hex: &str) -> Result<(), JsValue> {
        self.state.borrow().session.select_hex(hex)?;
        Self::notify_change(&self.state);
        Ok(())
    }

    /// Extract a palette from encoded image bytes.
    ///
    /// Resolves to the new palette, or `null` if the image could not be
    /// decoded or the result was discarded. Never rejects.
    #[wasm_bindgen]
    pub fn extract(&self, data: Vec<u8>) -> Promise {
        let pending = self.state.borrow().session.begin_extraction();
        let state = Rc::downgrade(&self.state);
        future_to_promise(async move {
            let Some(palette) = pending.complete_bytes(&data) else {
                return Ok(JsValue::NULL);
            };
            if let Some(state) = state.upgrade() {
                Self::notify_change(&state);
            }
            to_js(&palette)
        })
    }

    /// Extract from canvas `ImageData` bytes (RGBA)
    #[wasm_bindgen]
    pub fn extract_rgba(&self, rgba: &[u8]) -> Result<JsValue, JsValue> {
        let pending = self.state.borrow().session.begin_extraction();
        let Some(palette) = pending.complete_rgba(rgba) else {
            return Ok(JsValue::NULL);
        };
        Self::notify_change(&self.state);
        to_js(&palette)
    }

    #[wasm_bindgen]
    pub fn css(&self) -> String {
        self.state.borrow().session.export_css()
    }

    #[wasm_bindgen]
    pub fn tailwind(&self) -> String {
        self.state.borrow().session.export_framework_snippet()
    }

    /// Copy the CSS variables; resolves to whether the clipboard accepted them
    #[wasm_bindgen]
    pub fn copy_css(&self) -> Promise {
        let text = self.css();
        Self::copy_with_toast(Rc::downgrade(&self.state), text, notify::CSS_COPIED.to_string())
    }

    #[wasm_bindgen]
    pub fn copy_tailwind(&self) -> Promise {
        let text = self.tailwind();
        Self::copy_with_toast(
            Rc::downgrade(&self.state),
            text,
            notify::TAILWIND_COPIED.to_string(),
        )
    }

    /// Select a swatch and copy its hex value
    #[wasm_bindgen]
    pub fn copy_color(&self, hex: &str) -> Result<Promise, JsValue> {
        let color = self.state.borrow().session.select_hex(hex)?;
        Self::notify_change(&self.state);
        let text = color.to_hex();
        let message = notify::color_copied(&text);
        Ok(Self::copy_with_toast(Rc::downgrade(&self.state), text, message))
    }

    #[wasm_bindgen]
    pub fn mode(&self) -> String {
        self.state.borrow().session.mode().as_str().to_string()
    }

    #[wasm_bindgen]
    pub fn set_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode: PreviewMode = mode.parse()?;
        self.state.borrow_mut().session.set_mode(mode);
        Self::notify_change(&self.state);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn theme(&self) -> String {
        self.state.borrow().session.theme().as_str().to_string()
    }

    /// Flip light/dark and return the new theme
    #[wasm_bindgen]
    pub fn toggle_theme(&self) -> String {
        self.state.borrow_mut().session.toggle_theme().as_str().to_string()
    }

    /// Message of the visible toast, if any
    #[wasm_bindgen]
    pub fn toast(&self) -> Option<String> {
        let mut s = self.state.borrow_mut();
        s.session.toasts_mut().expire(now_ms());
        s.session.toasts().current().map(|t| t.message.clone())
    }

    /// Called with `{ palette, selected }` after every change
    #[wasm_bindgen]
    pub fn set_on_change(&self, callback: Option<Function>) {
        self.state.borrow_mut().on_change = callback;
    }

    /// Called with the message when a toast appears and `null` when it is dismissed
    #[wasm_bindgen]
    pub fn set_on_toast(&self, callback: Option<Function>) {
        self.state.borrow_mut().on_toast = callback;
    }
}

/// Canonical `#rrggbb` for a byte triple
#[must_use]
#[wasm_bindgen]
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    color::rgb_to_hex((r, g, b)).to_hex()
}

/// WCAG contrast ratio between two hex colors
///
/// # Errors
/// Returns an error if either color is not a valid hex string.
#[wasm_bindgen]
pub fn contrast_ratio(a: &str, b: &str) -> Result<f64, JsValue> {
    Ok(color::contrast_ratio(
        Color::from_hex(a)?,
        Color::from_hex(b)?,
    ))
}

/// `{ complementary, triadic: [a, b] }` for a hex color
///
/// # Errors
/// Returns an error if the color is not a valid hex string.
#[wasm_bindgen]
pub fn generate_variants(hex: &str) -> Result<JsValue, JsValue> {
    to_js(&color::generate_variants(Color::from_hex(hex)?))
}
