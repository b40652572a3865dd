//! Session behavior: state transitions, in-flight extractions and exports
//!
//! Extractions are driven through `PendingExtraction` handles so that
//! overlapping and late completions can be ordered explicitly.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use colorpalette::{
    Palette, PaletteConfig, PaletteError, PaletteExtractor, PaletteState, PreviewMode,
    RngEntropy, SequenceEntropy, Session, StalePolicy, Theme, PLACEHOLDER,
};
use common::*;

fn session() -> Session {
    Session::new(PaletteConfig::default(), RngEntropy::seeded(7)).unwrap()
}

fn session_with(policy: StalePolicy) -> Session {
    let config = PaletteConfig {
        stale_policy: policy,
        ..PaletteConfig::default()
    };
    Session::new(config, RngEntropy::seeded(7)).unwrap()
}

/// Record every state observers are notified with.
fn record(session: &Session) -> Rc<RefCell<Vec<PaletteState>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    session.subscribe(move |state| sink.borrow_mut().push(*state));
    seen
}

// =============================================================================
// Initial state and randomize
// =============================================================================

#[test]
fn test_starts_with_first_color_selected() {
    let s = session();
    assert_eq!(s.selected(), s.palette().first());
    assert!(s.palette().to_hex_strings().iter().all(|h| is_canonical_hex(h)));
}

#[test]
fn test_randomize_replaces_palette_and_selection_together() {
    let s = session();
    let seen = record(&s);

    for _ in 0..20 {
        s.randomize();
    }

    let seen = seen.borrow();
    assert_eq!(seen.len(), 20);
    for state in seen.iter() {
        assert_eq!(state.selected, state.palette.first());
    }
    assert_eq!(*seen.last().unwrap(), s.state());
}

#[test]
fn test_randomize_from_byte_sequence() {
    let bytes: Vec<u8> = (0..15).collect();
    let s = Session::new(PaletteConfig::default(), SequenceEntropy::new(bytes)).unwrap();
    s.randomize();
    // The sequence wraps, so the second palette repeats the first
    assert_eq!(
        s.palette().to_hex_strings(),
        ["#000102", "#030405", "#060708", "#090a0b", "#0c0d0e"]
    );
}

#[test]
fn test_seeded_sessions_agree() {
    let a = session();
    let b = session();
    assert_eq!(a.palette(), b.palette());
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn test_select_non_member_is_accepted() {
    let s = session();
    let palette = s.palette();
    let outsider = hex("#123456");
    assert!(!palette.contains(outsider));

    s.select(outsider);

    assert_eq!(s.selected(), outsider);
    assert_eq!(s.palette(), palette);
}

#[test]
fn test_select_hex_rejects_garbage() {
    let s = session();
    let before = s.state();

    let err = s.select_hex("#12345g").unwrap_err();

    assert!(matches!(err, PaletteError::InvalidColor(_)));
    assert_eq!(s.state(), before);
}

#[test]
fn test_select_hex_normalizes() {
    let s = session();
    assert_eq!(s.select_hex(" #ABC ").unwrap().to_hex(), "#aabbcc");
    assert_eq!(s.summary().selected.to_hex(), "#aabbcc");
}

#[test]
fn test_summary_marks_selected_swatch() {
    let s = session();
    s.begin_extraction()
        .complete(&solid(4, 4, hex("#111111"), 255))
        .unwrap();

    let summary = s.summary();
    assert_eq!(summary.swatches.len(), 5);
    assert!(summary.swatches[0].selected);
    assert_eq!(summary.swatches[0].contrast_on_white, "18.88");
    assert!(summary.swatches[1..].iter().all(|w| w.color == PLACEHOLDER));
}

#[test]
fn test_observers_may_read_the_session_back() {
    let s = Rc::new(session());
    let summaries = Rc::new(RefCell::new(Vec::new()));

    let weak = Rc::downgrade(&s);
    let sink = Rc::clone(&summaries);
    s.subscribe(move |state| {
        let Some(session) = weak.upgrade() else {
            return;
        };
        assert_eq!(session.state(), *state);
        sink.borrow_mut().push(session.summary().selected);
    });

    s.select(hex("#010203"));
    s.randomize();
    let randomized = s.selected();
    s.begin_extraction().complete(&solid(4, 4, RED, 255)).unwrap();

    assert_eq!(*summaries.borrow(), vec![hex("#010203"), randomized, RED]);
}

#[test]
fn test_observer_may_subscribe_and_select_during_notification() {
    let s = Rc::new(session());
    let calls = Rc::new(RefCell::new(0));

    let weak = Rc::downgrade(&s);
    let counter = Rc::clone(&calls);
    s.subscribe(move |state| {
        *counter.borrow_mut() += 1;
        if let Some(session) = weak.upgrade() {
            if state.selected == RED {
                session.subscribe(|_| {});
                session.select(BLUE);
            }
        }
    });

    s.select(RED);

    assert_eq!(s.selected(), BLUE);
    // The nested selection is applied but not announced to the running observer
    assert_eq!(*calls.borrow(), 1);
}

// =============================================================================
// Extraction lifecycle
// =============================================================================

#[test]
fn test_extraction_applies_and_selects_first() {
    let s = session();
    let seen = record(&s);
    let png = encode_png(&two_tone(10, 10, 6, RED, BLUE));

    let palette = s.extract_bytes(&png).unwrap();

    assert_eq!(palette.first(), RED);
    assert_eq!(s.palette(), palette);
    assert_eq!(s.selected(), RED);
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_decode_failure_leaves_state_unchanged() {
    let s = session();
    s.select(hex("#abcdef"));
    let before = s.state();
    let seen = record(&s);

    assert!(s.extract_bytes(b"definitely not a png").is_none());

    assert_eq!(s.state(), before);
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_failed_handle_leaves_state_unchanged() {
    let s = session();
    let before = s.state();

    s.begin_extraction()
        .fail(&PaletteError::Clipboard("image never loaded".to_string()));

    assert_eq!(s.state(), before);
}

#[test]
fn test_dropped_handle_cancels() {
    let s = session();
    let before = s.state();
    {
        let _pending = s.begin_extraction();
    }
    assert_eq!(s.state(), before);
}

#[test]
fn test_late_completion_after_session_ends_is_ignored() {
    let s = session();
    let pending = s.begin_extraction();
    drop(s);

    assert!(pending.complete(&two_tone(10, 10, 6, RED, BLUE)).is_none());
}

#[test]
fn test_last_completion_wins_by_default() {
    let s = session();
    let first = s.begin_extraction();
    let second = s.begin_extraction();
    assert!(first.is_superseded());
    assert!(!second.is_superseded());

    second.complete(&solid(4, 4, BLUE, 255)).unwrap();
    first.complete(&solid(4, 4, RED, 255)).unwrap();

    assert_eq!(s.palette().first(), RED);
    assert_eq!(s.selected(), RED);
}

#[test]
fn test_latest_request_policy_discards_superseded() {
    let s = session_with(StalePolicy::LatestRequest);
    let first = s.begin_extraction();
    let second = s.begin_extraction();

    second.complete(&solid(4, 4, BLUE, 255)).unwrap();
    assert!(first.complete(&solid(4, 4, RED, 255)).is_none());

    assert_eq!(s.palette().first(), BLUE);
}

#[test]
fn test_request_ids_increase() {
    let s = session();
    let a = s.begin_extraction();
    let b = s.begin_extraction();
    assert!(b.id() > a.id());
}

#[test]
fn test_custom_extractor_is_used() {
    let config = PaletteConfig {
        placeholder: hex("#000000"),
        ..PaletteConfig::default()
    };
    let s = session().with_extractor(PaletteExtractor::new(&config));

    let palette = s.begin_extraction().complete(&solid(4, 4, RED, 255)).unwrap();

    assert_eq!(palette.get(4), Some(hex("#000000")));
}

// =============================================================================
// Exports
// =============================================================================

#[test]
fn test_export_css() {
    let s = session();
    s.begin_extraction().complete(&two_tone(10, 10, 6, RED, BLUE)).unwrap();

    assert_eq!(
        s.export_css(),
        ":root {\n  --p1: #ff0000;\n  --p2: #0000ff;\n  --p3: #e5e7eb;\n  --p4: #e5e7eb;\n  --p5: #e5e7eb;\n}"
    );
}

#[test]
fn test_export_tailwind_lists_every_color() {
    let s = session();
    let snippet = s.export_framework_snippet();
    for (i, hex) in s.palette().to_hex_strings().iter().enumerate() {
        assert!(snippet.contains(&format!("\"p{}\": \"{hex}\"", i + 1)), "{snippet}");
    }
}

#[test]
fn test_exports_ignore_selection() {
    let s = session();
    let css = s.export_css();
    s.select(hex("#010101"));
    assert_eq!(s.export_css(), css);
}

// =============================================================================
// Config, preview mode and theme
// =============================================================================

#[test]
fn test_invalid_config_is_rejected() {
    let config = PaletteConfig {
        quality: 0,
        ..PaletteConfig::default()
    };
    let err = Session::new(config, RngEntropy::seeded(1)).unwrap_err();
    assert!(matches!(err, PaletteError::Config(_)));
}

#[test]
fn test_config_from_json() {
    let config =
        PaletteConfig::from_json(r#"{ "candidateCount": 8, "stalePolicy": "latestRequest" }"#)
            .unwrap();
    let s = Session::new(config, RngEntropy::seeded(1)).unwrap();
    assert_eq!(s.config().candidate_count, 8);
    assert_eq!(s.config().stale_policy, StalePolicy::LatestRequest);
    assert_eq!(s.config().quality, 10);
}

#[test]
fn test_mode_and_theme() {
    let mut s = session();
    assert_eq!(s.mode(), PreviewMode::Website);
    s.set_mode("dashboard".parse().unwrap());
    assert_eq!(s.mode(), PreviewMode::Dashboard);

    s.set_theme(Theme::Light);
    assert_eq!(s.toggle_theme(), Theme::Dark);
    assert_eq!(s.theme(), Theme::Dark);
}

#[test]
fn test_mode_change_does_not_touch_palette() {
    let mut s = session();
    let seen = record(&s);
    let before = s.state();

    s.set_mode(PreviewMode::Minimal);
    s.toggle_theme();

    assert_eq!(s.state(), before);
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_toasts_follow_config_duration() {
    let config = PaletteConfig {
        toast_duration_ms: 500,
        ..PaletteConfig::default()
    };
    let mut s = Session::new(config, RngEntropy::seeded(1)).unwrap();

    let id = s.notify("Copied #ff0000", 1000.0);
    s.toasts_mut().expire(1499.0);
    assert_eq!(s.toasts().current().unwrap().id, id);
    s.toasts_mut().expire(1500.0);
    assert!(s.toasts().current().is_none());
}

#[test]
fn test_palette_serializes_as_hex_array() {
    let s = session();
    let json = serde_json::to_value(s.state()).unwrap();
    let palette: Palette = serde_json::from_value(json["palette"].clone()).unwrap();
    assert_eq!(palette, s.palette());
    assert_eq!(json["selected"], serde_json::json!(s.selected().to_hex()));
}
