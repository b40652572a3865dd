//! Structured error types for colorpalette.
//!
//! Every failure here is recoverable: callers log it and keep the previous
//! palette rather than surfacing a blocking error.

/// All errors that can occur while deriving, parsing or exporting palettes.
#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    /// Image bytes could not be decoded into pixels.
    #[error("Image decode: {0}")]
    Decode(#[from] image::ImageError),

    /// A color string is not `#rrggbb`, `rrggbb` or `#rgb`.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Configuration value out of range.
    #[error("Invalid config: {0}")]
    Config(String),

    /// Configuration JSON could not be parsed.
    #[error("Config parse: {0}")]
    Json(#[from] serde_json::Error),

    /// The environment rejected a clipboard write.
    #[error("Clipboard: {0}")]
    Clipboard(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PaletteError>;

#[cfg(target_arch = "wasm32")]
impl From<PaletteError> for wasm_bindgen::JsValue {
    fn from(e: PaletteError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
