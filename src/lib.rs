//! colorpalette - five-color palettes for the web
//!
//! Derives palettes from images or randomness and exports them, via
//! WebAssembly for the browser front end:
//! - Dominant-color extraction (median cut) from PNG, JPEG and WebP
//! - WCAG contrast ratios and complementary/triadic variants
//! - CSS custom property and Tailwind config exports
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { PaletteApp } from 'colorpalette';
//! await init();
//! const app = new PaletteApp();
//! app.set_on_change(({ palette, selected }) => render(palette, selected));
//! await app.extract(new Uint8Array(await file.arrayBuffer()));
//! await app.copy_css();
//! ```
//!
//! # Usage (Rust)
//!
//! ```rust
//! use colorpalette::{PaletteConfig, RngEntropy, Session};
//!
//! let session = Session::new(PaletteConfig::default(), RngEntropy::seeded(1)).unwrap();
//! session.randomize();
//! assert_eq!(session.selected(), session.palette().first());
//! println!("{}", session.export_css());
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod extract;
pub mod notify;
pub mod palette;
pub mod quantize;
pub mod random;
pub mod session;
pub mod store;

// Browser bindings
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use color::{Color, Variants};
pub use config::{PaletteConfig, StalePolicy};
pub use error::{PaletteError, Result};
pub use extract::PaletteExtractor;
pub use palette::{Palette, PALETTE_SIZE, PLACEHOLDER};
pub use random::{EntropySource, RngEntropy, SequenceEntropy};
pub use session::{PendingExtraction, PreviewMode, Session, Theme};
pub use store::{Observers, PaletteState, PaletteStore, PaletteSummary};

#[cfg(target_arch = "wasm32")]
pub use web::PaletteApp;

use wasm_bindgen::prelude::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
