use std::collections::HashSet;

use anyhow::{anyhow, Result};
use glam::Vec2;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
    Function(u8),
}

impl KeyCode {
    /// Parses a key name as produced by winit or a browser `KeyboardEvent.key`.
    ///
    /// Letters are case-insensitive, so `"w"` and `"W"` name the same key.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if ch.is_ascii_alphabetic() {
                return Some(Self::Character(ch.to_ascii_uppercase()));
            }
            if ch.is_ascii_digit() {
                return Some(Self::Digit(ch as u8 - b'0'));
            }
        }
        if let Some(function) = name.strip_prefix('F').or_else(|| name.strip_prefix('f')) {
            if let Ok(index) = function.parse::<u8>() {
                if (1..=25).contains(&index) {
                    return Some(Self::Function(index));
                }
            }
        }
        None
    }

    pub fn is_shift(self) -> bool {
        matches!(
            self,
            Self::Named(NamedKey::LeftShift) | Self::Named(NamedKey::RightShift)
        )
    }
}

fn parse_named_key(name: &str) -> Option<KeyCode> {
    use NamedKey::*;
    let key = match name {
        "Space" | " " => Space,
        "Enter" | "Return" => Enter,
        "Tab" => Tab,
        "Left" | "ArrowLeft" => Left,
        "Right" | "ArrowRight" => Right,
        "Up" | "ArrowUp" => Up,
        "Down" | "ArrowDown" => Down,
        "Escape" | "Esc" => Escape,
        "Backspace" => Backspace,
        "Shift" | "LeftShift" | "LShift" | "ShiftLeft" => LeftShift,
        "RightShift" | "RShift" | "ShiftRight" => RightShift,
        "Control" | "LeftCtrl" | "LControl" | "ControlLeft" => LeftCtrl,
        "RightCtrl" | "RControl" | "ControlRight" => RightCtrl,
        "Alt" | "LeftAlt" | "LAlt" | "AltLeft" => LeftAlt,
        "RightAlt" | "RAlt" | "AltRight" => RightAlt,
        _ => return None,
    };
    Some(KeyCode::Named(key))
}

/// Friendly names for the non-printable keys the runtime reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Backspace,
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
}

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// Immutable set of keys held at the start of a frame.
///
/// Per-frame consumers read a latch instead of the live [`InputState`] so a
/// key event arriving mid-frame cannot split one update across two inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLatch {
    held: HashSet<KeyCode>,
}

impl InputLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys(keys: impl IntoIterator<Item = KeyCode>) -> Self {
        Self {
            held: keys.into_iter().collect(),
        }
    }

    /// Builds a latch from key names, rejecting names that do not map to a key.
    pub fn from_names<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Result<Self> {
        let mut latch = Self::new();
        for name in names {
            let name = name.as_ref();
            let key = KeyCode::from_name(name).ok_or_else(|| anyhow!("unknown key name {name:?}"))?;
            latch.press(key);
        }
        Ok(latch)
    }

    pub fn press(&mut self, key: KeyCode) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    pub fn is_held_by_name(&self, name: &str) -> bool {
        KeyCode::from_name(name).is_some_and(|key| self.is_held(key))
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

/// Input shared between the event handler and the frame loop.
#[derive(Debug, Default)]
pub struct InputState {
    keys: RwLock<HashSet<KeyCode>>,
    mouse_buttons: RwLock<HashSet<MouseButton>>,
    mouse_position: RwLock<Vec2>,
    drag_delta: RwLock<Vec2>,
    scroll: RwLock<f32>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as held. Returns `true` only on the transition from
    /// released to held, so auto-repeat events can be told apart.
    pub fn set_key_down(&self, key: KeyCode) -> bool {
        self.keys.write().insert(key)
    }

    pub fn set_key_up(&self, key: KeyCode) {
        self.keys.write().remove(&key);
    }

    pub fn set_mouse_button_down(&self, button: MouseButton) {
        self.mouse_buttons.write().insert(button);
    }

    pub fn set_mouse_button_up(&self, button: MouseButton) {
        self.mouse_buttons.write().remove(&button);
    }

    /// Records the cursor position; movement while the left button is held
    /// accumulates into the orbit drag delta.
    pub fn set_mouse_position(&self, position: Vec2) {
        let previous = std::mem::replace(&mut *self.mouse_position.write(), position);
        if self.is_mouse_button_down(MouseButton::LEFT) {
            *self.drag_delta.write() += position - previous;
        }
    }

    pub fn add_scroll(&self, amount: f32) {
        *self.scroll.write() += amount;
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.read().contains(&key)
    }

    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.read().contains(&button)
    }

    pub fn is_key_down_by_name(&self, name: &str) -> bool {
        match parse_input_name(name) {
            Some(InputName::Key(key)) => self.is_key_down(key),
            Some(InputName::Mouse(button)) => self.is_mouse_button_down(button),
            None => false,
        }
    }

    pub fn mouse_position(&self) -> Vec2 {
        *self.mouse_position.read()
    }

    /// Snapshot of the held keys for this frame.
    pub fn latch(&self) -> InputLatch {
        InputLatch {
            held: self.keys.read().clone(),
        }
    }

    /// Returns and clears the drag distance accumulated since the last call.
    pub fn take_drag_delta(&self) -> Vec2 {
        std::mem::take(&mut *self.drag_delta.write())
    }

    /// Returns and clears the scroll amount accumulated since the last call.
    pub fn take_scroll(&self) -> f32 {
        std::mem::take(&mut *self.scroll.write())
    }
}

enum InputName {
    Key(KeyCode),
    Mouse(MouseButton),
}

fn parse_input_name(name: &str) -> Option<InputName> {
    if let Some(button) = parse_mouse_button(name) {
        return Some(InputName::Mouse(button));
    }
    KeyCode::from_name(name).map(InputName::Key)
}

fn parse_mouse_button(name: &str) -> Option<MouseButton> {
    if name.len() < 5 || !name.is_char_boundary(5) {
        return None;
    }
    if !name[..5].eq_ignore_ascii_case("mouse") {
        return None;
    }
    let suffix = &name[5..];
    if suffix.is_empty() {
        return Some(MouseButton::LEFT);
    }
    let index = suffix.parse::<u8>().ok()?;
    Some(MouseButton::new(index.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_character_keys() {
        assert_eq!(
            KeyCode::from_name("Space"),
            Some(KeyCode::Named(NamedKey::Space))
        );
        assert_eq!(KeyCode::from_name("w"), Some(KeyCode::Character('W')));
        assert_eq!(KeyCode::from_name("F12"), Some(KeyCode::Function(12)));
        assert_eq!(
            KeyCode::from_name("ArrowUp"),
            Some(KeyCode::Named(NamedKey::Up))
        );
        assert_eq!(KeyCode::from_name("Meta"), None);
    }

    #[test]
    fn browser_shift_names_are_shift() {
        for name in ["Shift", "ShiftLeft", "ShiftRight"] {
            assert!(KeyCode::from_name(name).unwrap().is_shift(), "{name}");
        }
        assert!(!KeyCode::Character('S').is_shift());
    }

    #[test]
    fn mouse_names_are_supported() {
        assert_eq!(mouse_index("Mouse1"), 0);
        assert_eq!(mouse_index("mouse3"), 2);
    }

    #[test]
    fn key_down_reports_only_the_first_press() {
        let state = InputState::new();
        assert!(state.set_key_down(KeyCode::Named(NamedKey::LeftShift)));
        assert!(!state.set_key_down(KeyCode::Named(NamedKey::LeftShift)));
        state.set_key_up(KeyCode::Named(NamedKey::LeftShift));
        assert!(state.set_key_down(KeyCode::Named(NamedKey::LeftShift)));
    }

    #[test]
    fn latch_is_a_snapshot() {
        let state = InputState::new();
        state.set_key_down(KeyCode::Character('W'));
        let latch = state.latch();
        state.set_key_up(KeyCode::Character('W'));
        assert!(latch.is_held_by_name("w"));
        assert!(!state.is_key_down_by_name("w"));
    }

    #[test]
    fn latch_from_names_rejects_unknown_keys() {
        let latch = InputLatch::from_names(["w", "a"]).unwrap();
        assert!(latch.is_held(KeyCode::Character('A')));
        assert!(InputLatch::from_names(["w", "not-a-key"]).is_err());
    }

    #[test]
    fn drag_accumulates_only_while_left_button_is_held() {
        let state = InputState::new();
        state.set_mouse_position(Vec2::new(10.0, 10.0));
        state.set_mouse_position(Vec2::new(20.0, 10.0));
        assert_eq!(state.take_drag_delta(), Vec2::ZERO);

        state.set_mouse_button_down(MouseButton::LEFT);
        state.set_mouse_position(Vec2::new(25.0, 4.0));
        state.set_mouse_position(Vec2::new(30.0, 2.0));
        assert_eq!(state.take_drag_delta(), Vec2::new(10.0, -8.0));
        assert_eq!(state.take_drag_delta(), Vec2::ZERO);
    }

    fn mouse_index(name: &str) -> u8 {
        match parse_input_name(name).unwrap() {
            InputName::Mouse(button) => button.index(),
            InputName::Key(_) => panic!("expected mouse button"),
        }
    }
}
