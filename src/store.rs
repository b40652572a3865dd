//! Palette state and the transitions that replace it.
//!
//! The palette and the selected color live together in a single
//! [`PaletteState`] that palette-changing transitions replace wholesale, so
//! an observer never sees a new palette paired with a stale selection.

use std::cell::RefCell;

use serde::Serialize;

use crate::color::{self, Color, Variants};
use crate::palette::Palette;
use crate::random::{self, EntropySource};

/// Everything a preview renderer needs: the palette and the accent color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaletteState {
    pub palette: Palette,
    pub selected: Color,
}

impl PaletteState {
    /// Fresh state for `palette` with its first entry selected.
    pub const fn fresh(palette: Palette) -> Self {
        Self {
            palette,
            selected: palette.first(),
        }
    }
}

/// One palette entry as shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Swatch {
    pub color: Color,
    /// Contrast against white, formatted `x.xx`.
    pub contrast_on_white: String,
    pub text_color: Color,
    pub selected: bool,
}

/// Derived, read-only view of the current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteSummary {
    pub swatches: Vec<Swatch>,
    pub selected: Color,
    pub variants: Variants,
}

type Observer = Box<dyn FnMut(&PaletteState)>;

/// Callbacks that receive the new state after every transition.
///
/// Kept apart from [`PaletteStore`] so they can run after the store borrow
/// is released and may read the store back.
#[derive(Default)]
pub struct Observers(Vec<Observer>);

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Observers").field(&self.0.len()).finish()
    }
}

impl Observers {
    pub fn subscribe(&mut self, observer: impl FnMut(&PaletteState) + 'static) {
        self.0.push(Box::new(observer));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn notify(&mut self, state: &PaletteState) {
        for observer in &mut self.0 {
            observer(state);
        }
    }

    /// Notify through a shared list without holding its borrow while the
    /// callbacks run. Observers added during the round are kept; a nested
    /// transition triggered from a callback is not re-announced to the
    /// observers already running.
    pub fn notify_shared(shared: &RefCell<Self>, state: &PaletteState) {
        let mut active = std::mem::take(&mut *shared.borrow_mut());
        active.notify(state);
        let mut slot = shared.borrow_mut();
        let added = std::mem::replace(&mut *slot, active);
        slot.0.extend(added.0);
    }
}

/// Holds the current palette and selection.
#[derive(Debug)]
pub struct PaletteStore {
    state: PaletteState,
}

impl PaletteStore {
    /// Start with a random palette, first entry selected.
    pub fn new(entropy: &mut dyn EntropySource) -> Self {
        Self::with_palette(random::generate(entropy))
    }

    pub fn with_palette(palette: Palette) -> Self {
        Self {
            state: PaletteState::fresh(palette),
        }
    }

    pub const fn state(&self) -> &PaletteState {
        &self.state
    }

    pub const fn palette(&self) -> &Palette {
        &self.state.palette
    }

    pub const fn selected(&self) -> Color {
        self.state.selected
    }

    /// Replace the palette with a random one and select its first entry.
    /// Returns the new state for the caller to announce.
    pub fn randomize(&mut self, entropy: &mut dyn EntropySource) -> PaletteState {
        let palette = random::generate(entropy);
        self.replace(PaletteState::fresh(palette))
    }

    /// Adopt an extracted palette and select its first entry.
    pub fn apply_extracted(&mut self, palette: Palette) -> PaletteState {
        log::info!("applying extracted palette {:?}", palette.to_hex_strings());
        self.replace(PaletteState::fresh(palette))
    }

    /// Set the accent color. Any color is accepted, palette member or not.
    pub fn select(&mut self, color: Color) -> PaletteState {
        self.replace(PaletteState {
            selected: color,
            ..self.state
        })
    }

    pub fn export_css(&self) -> String {
        self.state.palette.to_css_variables()
    }

    pub fn export_framework_snippet(&self) -> String {
        self.state.palette.to_tailwind_config()
    }

    pub fn summary(&self) -> PaletteSummary {
        let PaletteState { palette, selected } = self.state;
        PaletteSummary {
            swatches: palette
                .iter()
                .map(|c| Swatch {
                    color: c,
                    contrast_on_white: color::format_ratio(color::contrast_ratio(c, Color::WHITE)),
                    text_color: color::best_text_color(c),
                    selected: c == selected,
                })
                .collect(),
            selected,
            variants: color::generate_variants(selected),
        }
    }

    fn replace(&mut self, state: PaletteState) -> PaletteState {
        self.state = state;
        state
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::random::SequenceEntropy;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn grays() -> Palette {
        Palette::new([
            Color::new(0x11, 0x11, 0x11),
            Color::new(0x22, 0x22, 0x22),
            Color::new(0x33, 0x33, 0x33),
            Color::new(0x44, 0x44, 0x44),
            Color::new(0x55, 0x55, 0x55),
        ])
    }

    #[test]
    fn test_new_selects_first() {
        let mut entropy = SequenceEntropy::new([9, 8, 7]);
        let store = PaletteStore::new(&mut entropy);
        assert_eq!(store.selected(), Color::new(9, 8, 7));
        assert_eq!(store.selected(), store.palette().first());
    }

    #[test]
    fn test_select_only_changes_selection() {
        let mut store = PaletteStore::with_palette(grays());
        store.select(Color::new(0x33, 0x33, 0x33));
        assert_eq!(store.palette(), &grays());
        assert_eq!(store.selected(), Color::new(0x33, 0x33, 0x33));
    }

    #[test]
    fn test_transitions_return_new_state() {
        let mut store = PaletteStore::with_palette(grays());

        let selected = store.select(Color::WHITE);
        assert_eq!(selected.selected, Color::WHITE);
        assert_eq!(selected.palette, grays());

        let fresh = store.apply_extracted(grays());
        assert_eq!(fresh, PaletteState::fresh(grays()));
        assert_eq!(store.state(), &fresh);
    }

    #[test]
    fn test_shared_observers_may_reenter() {
        let shared = Rc::new(RefCell::new(Observers::default()));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let list = Rc::downgrade(&shared);
        shared.borrow_mut().subscribe(move |state| {
            sink.borrow_mut().push(state.selected);
            // Subscribing from inside a callback must not panic
            if let Some(list) = list.upgrade() {
                list.borrow_mut().subscribe(|_| {});
            }
        });

        let state = PaletteState::fresh(grays());
        Observers::notify_shared(&shared, &state);
        Observers::notify_shared(&shared, &state);

        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(shared.borrow().len(), 3);
    }

    #[test]
    fn test_summary_marks_selected_and_contrast() {
        let mut store = PaletteStore::with_palette(grays());
        store.select(Color::new(0x22, 0x22, 0x22));
        let summary = store.summary();

        assert_eq!(summary.swatches.len(), 5);
        let flagged: Vec<bool> = summary.swatches.iter().map(|s| s.selected).collect();
        assert_eq!(flagged, [false, true, false, false, false]);
        assert_eq!(summary.swatches[0].contrast_on_white, "18.88");
        assert_eq!(summary.swatches[0].text_color, Color::WHITE);
        // Grays are achromatic, so every variant is the gray itself
        assert_eq!(summary.variants.complementary, summary.selected);
    }

    #[test]
    fn test_state_serializes_for_renderers() {
        let store = PaletteStore::with_palette(grays());
        let json = serde_json::to_value(store.state()).unwrap();
        assert_eq!(json["selected"], "#111111");
        assert_eq!(json["palette"][4], "#555555");
    }
}
