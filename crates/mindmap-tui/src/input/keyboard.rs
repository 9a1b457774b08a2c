//! Keyboard translation edge.
//!
//! The platform input collaborator owns the mapping from raw key events to
//! input symbols; this adapter is its crossterm edge. Anything without a
//! symbol equivalent (function keys, modifiers on their own, releases) is
//! dropped here.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use mindmap_core::Input;

pub fn translate_key(key: &KeyEvent) -> Option<Input> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    match key.code {
        KeyCode::Enter => Some(Input::enter()),
        KeyCode::Backspace => Some(Input::backspace()),
        KeyCode::Esc => Some(Input::escape()),
        KeyCode::Char(c) => Some(Input::char(c)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn translates_named_keys_and_characters() {
        assert_eq!(translate_key(&press(KeyCode::Enter)), Some(Input::enter()));
        assert_eq!(
            translate_key(&press(KeyCode::Backspace)),
            Some(Input::backspace())
        );
        assert_eq!(translate_key(&press(KeyCode::Esc)), Some(Input::escape()));
        assert_eq!(
            translate_key(&press(KeyCode::Char('g'))),
            Some(Input::char('g'))
        );
    }

    #[test]
    fn ignores_untranslatable_keys() {
        assert_eq!(translate_key(&press(KeyCode::F(1))), None);
        assert_eq!(translate_key(&press(KeyCode::Home)), None);

        let mut release = press(KeyCode::Char('g'));
        release.kind = KeyEventKind::Release;
        assert_eq!(translate_key(&release), None);
    }
}
