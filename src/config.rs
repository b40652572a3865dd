//! Session configuration.
//!
//! All fields have defaults, so an empty JSON object (or no config at all)
//! gives the stock behavior.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{PaletteError, Result};
use crate::palette::{PALETTE_SIZE, PLACEHOLDER};

/// Largest candidate count the quantizer accepts.
pub const MAX_CANDIDATES: usize = 256;

/// What to do with an extraction that completes after a newer one was requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StalePolicy {
    /// Every completion is applied; the last one to finish wins.
    #[default]
    LastCompletion,
    /// Only the most recently requested extraction may apply its result.
    LatestRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaletteConfig {
    /// Colors requested from the quantizer before truncating to the palette size.
    pub candidate_count: usize,
    /// Sample every n-th pixel (1 = every pixel).
    pub quality: usize,
    /// Skip near-white pixels (all channels above 250) while sampling.
    pub ignore_white: bool,
    /// Fill color for palettes the image cannot populate.
    pub placeholder: Color,
    pub stale_policy: StalePolicy,
    /// How long a toast stays visible.
    pub toast_duration_ms: u32,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            candidate_count: PALETTE_SIZE + 1,
            quality: 10,
            ignore_white: true,
            placeholder: PLACEHOLDER,
            stale_policy: StalePolicy::LastCompletion,
            toast_duration_ms: 2200,
        }
    }
}

impl PaletteConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(2..=MAX_CANDIDATES).contains(&self.candidate_count) {
            return Err(PaletteError::Config(format!(
                "candidateCount must be between 2 and {MAX_CANDIDATES}, got {}",
                self.candidate_count
            )));
        }
        if self.quality == 0 {
            return Err(PaletteError::Config(
                "quality must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
