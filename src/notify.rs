//! Transient toast notifications.
//!
//! At most one toast is visible. Each toast carries an id so that a dismiss
//! timer scheduled for an older toast cannot clear a newer one.

use serde::Serialize;

pub const CSS_COPIED: &str = "CSS variables copied";
pub const TAILWIND_COPIED: &str = "Tailwind snippet copied";

/// Message for a single copied color.
pub fn color_copied(hex: &str) -> String {
    format!("Copied {hex}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: u64,
    pub message: String,
    /// Timestamp (ms) after which the toast is gone.
    pub expires_at: f64,
}

#[derive(Debug, Clone)]
pub struct Toasts {
    current: Option<Toast>,
    next_id: u64,
    duration_ms: f64,
}

impl Toasts {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            current: None,
            next_id: 1,
            duration_ms: f64::from(duration_ms),
        }
    }

    /// Show `message`, replacing any visible toast. Returns the new id.
    pub fn show(&mut self, message: impl Into<String>, now_ms: f64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.current = Some(Toast {
            id,
            message: message.into(),
            expires_at: now_ms + self.duration_ms,
        });
        id
    }

    /// Clear the toast only if `id` is still the visible one.
    pub fn dismiss(&mut self, id: u64) -> bool {
        if self.current.as_ref().is_some_and(|t| t.id == id) {
            self.current = None;
            return true;
        }
        false
    }

    /// Clear a toast whose deadline has passed.
    pub fn expire(&mut self, now_ms: f64) {
        if self.current.as_ref().is_some_and(|t| now_ms >= t.expires_at) {
            self.current = None;
        }
    }

    pub const fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub const fn duration_ms(&self) -> f64 {
        self.duration_ms
    }
}
