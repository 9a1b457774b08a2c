//! Mapping-state resolution scenarios: leaf commits, the disambiguation
//! window, and dead-end recovery.

use std::time::{Duration, Instant};

use mindmap_core::parse_inputs;
use mindmap_tui::app::App;
use mindmap_tui::controller::ControllerState;
use mindmap_tui::user_config::{Keymap, UserConfig};

fn app_with(keymaps: &[(&str, &str)], mapping_delay_ms: u64) -> App {
    let config = UserConfig {
        mapping_delay_ms,
        keymaps: keymaps
            .iter()
            .map(|(keys, replacement)| Keymap {
                keys: keys.to_string(),
                replacement: replacement.to_string(),
            })
            .collect(),
        ..Default::default()
    };
    App::new(config).expect("wiring succeeds")
}

fn push_str(app: &App, s: &str) {
    for input in parse_inputs(s) {
        app.stack.push(input);
    }
}

fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(3600)
}

#[test]
fn unambiguous_leaf_commits_immediately() {
    let app = app_with(&[("gg", ":center<CR>")], 1000);

    push_str(&app, "gg");

    // The replacement expanded through free typing into a command call,
    // without any timer involved.
    assert_eq!(app.calls.dequeue().unwrap().name, "center");
    assert!(app.stack.is_empty());
    assert_eq!(app.controller.borrow().state(), ControllerState::Mapping);
    assert!(!app.controller.borrow().has_pending_timer());
    assert!(app.next_deadline().is_none());
}

#[test]
fn dead_end_clears_the_stack() {
    let app = app_with(&[("gg", ":center<CR>")], 1000);

    push_str(&app, "gx");

    assert!(app.stack.is_empty());
    assert!(app.calls.is_empty());

    // The cursor is back on the root: the same mapping still resolves.
    push_str(&app, "gg");
    assert_eq!(app.calls.dequeue().unwrap().name, "center");
}

#[test]
fn strict_prefix_waits_without_a_timer() {
    let app = app_with(&[("gg", ":center<CR>")], 1000);

    push_str(&app, "g");

    assert_eq!(app.stack.contents(), parse_inputs("g"));
    assert!(!app.controller.borrow().has_pending_timer());
    assert!(app.calls.is_empty());

    // Nothing to time out: pumping far into the future changes nothing.
    app.pump(far_future());
    assert_eq!(app.stack.contents(), parse_inputs("g"));
    assert!(app.calls.is_empty());
}

#[test]
fn ambiguous_mapping_arms_the_disambiguation_timer() {
    let app = app_with(&[("gg", ":center<CR>"), ("ggg", ":quit<CR>")], 50);

    push_str(&app, "gg");

    assert!(app.controller.borrow().has_pending_timer());
    assert!(app.calls.is_empty());

    // The delay elapses with no further input: the shorter mapping commits.
    app.pump(far_future());
    assert_eq!(app.calls.dequeue().unwrap().name, "center");
    assert!(app.calls.is_empty());
    assert!(!app.controller.borrow().has_pending_timer());
}

#[test]
fn third_symbol_cancels_the_timer_and_extends_the_match() {
    let app = app_with(&[("gg", ":center<CR>"), ("ggg", ":quit<CR>")], 50);

    push_str(&app, "gg");
    assert!(app.controller.borrow().has_pending_timer());

    push_str(&app, "g");
    assert!(!app.controller.borrow().has_pending_timer());
    assert_eq!(app.calls.dequeue().unwrap().name, "quit");

    // The cancelled timer must never deliver the shorter mapping.
    app.pump(far_future());
    assert!(app.calls.is_empty());
}

#[test]
fn dead_end_with_a_pending_timer_cancels_it() {
    let app = app_with(&[("gg", ":center<CR>"), ("ggg", ":quit<CR>")], 50);

    push_str(&app, "gg");
    assert!(app.controller.borrow().has_pending_timer());

    push_str(&app, "x");
    assert!(!app.controller.borrow().has_pending_timer());
    assert!(app.stack.is_empty());

    app.pump(far_future());
    assert!(app.calls.is_empty());
}

#[test]
fn replacement_symbols_are_re_resolved() {
    // "h" has no mapping of its own, so the committed replacement dead-ends
    // and is discarded rather than lingering as a spurious partial match.
    let app = app_with(&[("gg", "h")], 1000);

    push_str(&app, "gg");

    assert!(app.stack.is_empty());
    assert!(app.calls.is_empty());
    assert_eq!(app.controller.borrow().state(), ControllerState::Mapping);
}

#[test]
fn chained_mappings_resolve_through_each_other() {
    let app = app_with(&[("gg", "Z"), ("Z", ":center<CR>")], 1000);

    push_str(&app, "gg");

    assert_eq!(app.calls.dequeue().unwrap().name, "center");
    assert!(app.stack.is_empty());
}

#[test]
fn redefined_mapping_uses_the_last_writer() {
    let app = app_with(&[("gg", ":center<CR>"), ("gg", ":quit<CR>")], 1000);

    push_str(&app, "gg");
    assert_eq!(app.calls.dequeue().unwrap().name, "quit");
}
