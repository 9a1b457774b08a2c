//! Free-typing scenarios: prompt entry, command submission, backspace, and
//! aborting.

use mindmap_core::parse_inputs;
use mindmap_tui::app::App;
use mindmap_tui::controller::ControllerState;
use mindmap_tui::user_config::UserConfig;

fn app() -> App {
    App::new(UserConfig::default()).expect("wiring succeeds")
}

fn push_str(app: &App, s: &str) {
    for input in parse_inputs(s) {
        app.stack.push(input);
    }
}

#[test]
fn trigger_opens_free_typing_with_an_empty_buffer() {
    let app = app();

    push_str(&app, ":");

    let controller = app.controller.borrow();
    assert_eq!(controller.state(), ControllerState::FreeTyping);
    assert_eq!(controller.buffer(), "");
    // The trigger stays on the stack as the visible prompt.
    assert_eq!(app.stack.contents(), parse_inputs(":"));
}

#[test]
fn enter_tokenizes_the_buffer_into_a_command_call() {
    let app = app();

    push_str(&app, ":save file.json<CR>");

    let call = app.calls.dequeue().unwrap();
    assert_eq!(call.name, "save");
    assert_eq!(call.args, vec!["file.json".to_string()]);

    assert!(app.stack.is_empty());
    assert_eq!(app.controller.borrow().state(), ControllerState::Mapping);
}

#[test]
fn repeated_whitespace_separates_arguments() {
    let app = app();

    push_str(&app, ":open  a   b<CR>");

    let call = app.calls.dequeue().unwrap();
    assert_eq!(call.name, "open");
    assert_eq!(call.args, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn empty_enter_emits_nothing_but_leaves_free_typing() {
    let app = app();

    push_str(&app, ":<CR>");

    assert!(app.calls.is_empty());
    assert!(app.stack.is_empty());
    assert_eq!(app.controller.borrow().state(), ControllerState::Mapping);
}

#[test]
fn whitespace_only_enter_emits_nothing() {
    let app = app();

    push_str(&app, ":   <CR>");

    assert!(app.calls.is_empty());
    assert!(app.stack.is_empty());
}

#[test]
fn backspace_retracts_one_character_from_buffer_and_stack() {
    let app = app();

    push_str(&app, ":sa<BS>");

    {
        let controller = app.controller.borrow();
        assert_eq!(controller.state(), ControllerState::FreeTyping);
        assert_eq!(controller.buffer(), "s");
    }
    assert_eq!(app.stack.contents(), parse_inputs(":s"));

    // The retained prefix still submits cleanly.
    push_str(&app, "<CR>");
    assert_eq!(app.calls.dequeue().unwrap().name, "s");
}

#[test]
fn backspace_on_an_empty_buffer_closes_the_prompt() {
    let app = app();

    push_str(&app, ":<BS>");

    assert!(app.stack.is_empty());
    assert_eq!(app.controller.borrow().state(), ControllerState::Mapping);
    assert!(app.calls.is_empty());
}

#[test]
fn escape_aborts_without_a_call() {
    let app = app();

    push_str(&app, ":quit<Esc>");

    assert!(app.calls.is_empty());
    assert!(app.stack.is_empty());
    assert_eq!(app.controller.borrow().state(), ControllerState::Mapping);
}

#[test]
fn trigger_typed_inside_free_typing_is_a_plain_character() {
    let app = app();

    push_str(&app, ":a:b<CR>");

    let call = app.calls.dequeue().unwrap();
    assert_eq!(call.name, "a:b");
    assert!(call.args.is_empty());
}

#[test]
fn consecutive_commands_resolve_independently() {
    let app = app();

    push_str(&app, ":first<CR>:second two<CR>");

    assert_eq!(app.calls.dequeue().unwrap().name, "first");
    let second = app.calls.dequeue().unwrap();
    assert_eq!(second.name, "second");
    assert_eq!(second.args, vec!["two".to_string()]);
    assert!(app.calls.is_empty());
}
