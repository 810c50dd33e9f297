use std::collections::HashSet;

use super::types::{Key, KeyState};

/// Keyboard state for the window.
///
/// Keys are sticky: a press is remembered until [`poll_key`](Self::poll_key)
/// observes it, so a press and release that both land between two polls is
/// not lost.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Set of currently held keys.
    keys_down: HashSet<Key>,

    /// Keys pressed since their last poll.
    sticky: HashSet<Key>,
}

impl InputState {
    /// Records a key transition.
    pub fn apply_key(&mut self, key: Key, state: KeyState) {
        match state {
            KeyState::Pressed => {
                self.keys_down.insert(key);
                self.sticky.insert(key);
            }
            KeyState::Released => {
                self.keys_down.remove(&key);
            }
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            // Release events are not delivered to unfocused windows.
            self.keys_down.clear();
        }
    }

    /// Whether `key` is held right now.
    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Reports `Pressed` if `key` is held or was pressed since the previous poll.
    ///
    /// Consumes the sticky press.
    pub fn poll_key(&mut self, key: Key) -> KeyState {
        let was_pressed = self.sticky.remove(&key);
        if was_pressed || self.key_down(key) {
            KeyState::Pressed
        } else {
            KeyState::Released
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_key_is_released() {
        let mut input = InputState::default();
        assert_eq!(input.poll_key(Key::Escape), KeyState::Released);
    }

    #[test]
    fn held_key_polls_pressed_repeatedly() {
        let mut input = InputState::default();
        input.apply_key(Key::Escape, KeyState::Pressed);
        assert_eq!(input.poll_key(Key::Escape), KeyState::Pressed);
        assert_eq!(input.poll_key(Key::Escape), KeyState::Pressed);
    }

    #[test]
    fn tap_between_polls_is_reported_once() {
        let mut input = InputState::default();
        input.apply_key(Key::Escape, KeyState::Pressed);
        input.apply_key(Key::Escape, KeyState::Released);

        assert!(!input.key_down(Key::Escape));
        assert_eq!(input.poll_key(Key::Escape), KeyState::Pressed);
        assert_eq!(input.poll_key(Key::Escape), KeyState::Released);
    }

    #[test]
    fn sticky_presses_are_per_key() {
        let mut input = InputState::default();
        input.apply_key(Key::Space, KeyState::Pressed);
        input.apply_key(Key::Space, KeyState::Released);

        assert_eq!(input.poll_key(Key::Escape), KeyState::Released);
        assert_eq!(input.poll_key(Key::Space), KeyState::Pressed);
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut input = InputState::default();
        input.set_focused(true);
        input.apply_key(Key::Enter, KeyState::Pressed);
        input.set_focused(false);
        assert!(!input.key_down(Key::Enter));
    }
}
