//! Key code definitions and US layout character mapping
//!
//! Numpad digits map to their characters here; whether NumLock turns them
//! into navigation keys is tracked by the keystroke translator.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Represents a physical key code (Linux evdev scancode numbering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const ENTER: KeyCode = KeyCode(28);
    pub const KP_ENTER: KeyCode = KeyCode(96);
    pub const LEFT_SHIFT: KeyCode = KeyCode(42);
    pub const RIGHT_SHIFT: KeyCode = KeyCode(54);
    pub const CAPS_LOCK: KeyCode = KeyCode(58);
    pub const NUM_LOCK: KeyCode = KeyCode(69);
    pub const LEFT_CTRL: KeyCode = KeyCode(29);
    pub const RIGHT_CTRL: KeyCode = KeyCode(97);
    pub const LEFT_ALT: KeyCode = KeyCode(56);
    pub const RIGHT_ALT: KeyCode = KeyCode(100);
    pub const LEFT_META: KeyCode = KeyCode(125);
    pub const RIGHT_META: KeyCode = KeyCode(126);

    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn is_shift(&self) -> bool {
        matches!(*self, Self::LEFT_SHIFT | Self::RIGHT_SHIFT)
    }

    /// Ctrl, Alt and Meta: keys that turn a printable key into a chord
    pub fn is_chord_modifier(&self) -> bool {
        matches!(
            *self,
            Self::LEFT_CTRL
                | Self::RIGHT_CTRL
                | Self::LEFT_ALT
                | Self::RIGHT_ALT
                | Self::LEFT_META
                | Self::RIGHT_META
        )
    }

    /// Any key that changes how later keys are read, including the locks
    pub fn is_modifier(&self) -> bool {
        self.is_shift()
            || self.is_chord_modifier()
            || matches!(*self, Self::CAPS_LOCK | Self::NUM_LOCK)
    }

    pub fn is_enter(&self) -> bool {
        matches!(*self, Self::ENTER | Self::KP_ENTER)
    }

    /// Numpad digit and dot keys, which navigate instead when NumLock is off
    pub fn is_numpad_navigation(&self) -> bool {
        matches!(self.0, 71..=73 | 75..=77 | 79..=83)
    }
}

impl From<u16> for KeyCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl From<device_query::Keycode> for KeyCode {
    fn from(keycode: device_query::Keycode) -> Self {
        use device_query::Keycode as DK;
        // Map device_query keycodes to Linux evdev scancodes
        let code = match keycode {
            DK::Escape => 1,
            DK::Key1 => 2,
            DK::Key2 => 3,
            DK::Key3 => 4,
            DK::Key4 => 5,
            DK::Key5 => 6,
            DK::Key6 => 7,
            DK::Key7 => 8,
            DK::Key8 => 9,
            DK::Key9 => 10,
            DK::Key0 => 11,
            DK::Minus => 12,
            DK::Equal => 13,
            DK::Backspace => 14,
            DK::Tab => 15,
            DK::Q => 16,
            DK::W => 17,
            DK::E => 18,
            DK::R => 19,
            DK::T => 20,
            DK::Y => 21,
            DK::U => 22,
            DK::I => 23,
            DK::O => 24,
            DK::P => 25,
            DK::LeftBracket => 26,
            DK::RightBracket => 27,
            DK::Enter => 28,
            DK::LControl => 29,
            DK::A => 30,
            DK::S => 31,
            DK::D => 32,
            DK::F => 33,
            DK::G => 34,
            DK::H => 35,
            DK::J => 36,
            DK::K => 37,
            DK::L => 38,
            DK::Semicolon => 39,
            DK::Apostrophe => 40,
            DK::Grave => 41,
            DK::LShift => 42,
            DK::BackSlash => 43,
            DK::Z => 44,
            DK::X => 45,
            DK::C => 46,
            DK::V => 47,
            DK::B => 48,
            DK::N => 49,
            DK::M => 50,
            DK::Comma => 51,
            DK::Dot => 52,
            DK::Slash => 53,
            DK::RShift => 54,
            DK::LAlt => 56,
            DK::Space => 57,
            DK::CapsLock => 58,
            DK::RControl => 97,
            DK::RAlt => 100,
            DK::LMeta => 125,
            DK::RMeta => 126,
            DK::Numpad0 => 82,
            DK::Numpad1 => 79,
            DK::Numpad2 => 80,
            DK::Numpad3 => 81,
            DK::Numpad4 => 75,
            DK::Numpad5 => 76,
            DK::Numpad6 => 77,
            DK::Numpad7 => 71,
            DK::Numpad8 => 72,
            DK::Numpad9 => 73,
            DK::NumpadSubtract => 74,
            DK::NumpadAdd => 78,
            DK::NumpadDivide => 98,
            DK::NumpadMultiply => 55,
            // Navigation and function keys never reach a scan buffer
            _ => 0,
        };
        Self(code)
    }
}

/// Information about a key
#[derive(Debug, Clone)]
pub struct KeyInfo {
    /// Display name for the key
    pub name: &'static str,
    /// Character produced without shift
    pub plain: Option<char>,
    /// Character produced with shift
    pub shifted: Option<char>,
}

impl KeyInfo {
    const fn printable(name: &'static str, plain: char, shifted: char) -> Self {
        Self { name, plain: Some(plain), shifted: Some(shifted) }
    }

    const fn control(name: &'static str) -> Self {
        Self { name, plain: None, shifted: None }
    }

    /// Letter keys are the only ones caps lock affects
    pub fn is_letter(&self) -> bool {
        self.plain.is_some_and(|c| c.is_ascii_lowercase())
    }
}

/// Static keymap for standard US keyboard layout
pub static KEYMAP: LazyLock<HashMap<KeyCode, KeyInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Number row
    map.insert(KeyCode(41), KeyInfo::printable("Grave", '`', '~'));
    map.insert(KeyCode(2), KeyInfo::printable("1", '1', '!'));
    map.insert(KeyCode(3), KeyInfo::printable("2", '2', '@'));
    map.insert(KeyCode(4), KeyInfo::printable("3", '3', '#'));
    map.insert(KeyCode(5), KeyInfo::printable("4", '4', '$'));
    map.insert(KeyCode(6), KeyInfo::printable("5", '5', '%'));
    map.insert(KeyCode(7), KeyInfo::printable("6", '6', '^'));
    map.insert(KeyCode(8), KeyInfo::printable("7", '7', '&'));
    map.insert(KeyCode(9), KeyInfo::printable("8", '8', '*'));
    map.insert(KeyCode(10), KeyInfo::printable("9", '9', '('));
    map.insert(KeyCode(11), KeyInfo::printable("0", '0', ')'));
    map.insert(KeyCode(12), KeyInfo::printable("Minus", '-', '_'));
    map.insert(KeyCode(13), KeyInfo::printable("Equals", '=', '+'));

    // Top letter row
    map.insert(KeyCode(16), KeyInfo::printable("Q", 'q', 'Q'));
    map.insert(KeyCode(17), KeyInfo::printable("W", 'w', 'W'));
    map.insert(KeyCode(18), KeyInfo::printable("E", 'e', 'E'));
    map.insert(KeyCode(19), KeyInfo::printable("R", 'r', 'R'));
    map.insert(KeyCode(20), KeyInfo::printable("T", 't', 'T'));
    map.insert(KeyCode(21), KeyInfo::printable("Y", 'y', 'Y'));
    map.insert(KeyCode(22), KeyInfo::printable("U", 'u', 'U'));
    map.insert(KeyCode(23), KeyInfo::printable("I", 'i', 'I'));
    map.insert(KeyCode(24), KeyInfo::printable("O", 'o', 'O'));
    map.insert(KeyCode(25), KeyInfo::printable("P", 'p', 'P'));
    map.insert(KeyCode(26), KeyInfo::printable("LeftBracket", '[', '{'));
    map.insert(KeyCode(27), KeyInfo::printable("RightBracket", ']', '}'));
    map.insert(KeyCode(43), KeyInfo::printable("Backslash", '\\', '|'));

    // Home row
    map.insert(KeyCode(30), KeyInfo::printable("A", 'a', 'A'));
    map.insert(KeyCode(31), KeyInfo::printable("S", 's', 'S'));
    map.insert(KeyCode(32), KeyInfo::printable("D", 'd', 'D'));
    map.insert(KeyCode(33), KeyInfo::printable("F", 'f', 'F'));
    map.insert(KeyCode(34), KeyInfo::printable("G", 'g', 'G'));
    map.insert(KeyCode(35), KeyInfo::printable("H", 'h', 'H'));
    map.insert(KeyCode(36), KeyInfo::printable("J", 'j', 'J'));
    map.insert(KeyCode(37), KeyInfo::printable("K", 'k', 'K'));
    map.insert(KeyCode(38), KeyInfo::printable("L", 'l', 'L'));
    map.insert(KeyCode(39), KeyInfo::printable("Semicolon", ';', ':'));
    map.insert(KeyCode(40), KeyInfo::printable("Apostrophe", '\'', '"'));

    // Bottom letter row
    map.insert(KeyCode(44), KeyInfo::printable("Z", 'z', 'Z'));
    map.insert(KeyCode(45), KeyInfo::printable("X", 'x', 'X'));
    map.insert(KeyCode(46), KeyInfo::printable("C", 'c', 'C'));
    map.insert(KeyCode(47), KeyInfo::printable("V", 'v', 'V'));
    map.insert(KeyCode(48), KeyInfo::printable("B", 'b', 'B'));
    map.insert(KeyCode(49), KeyInfo::printable("N", 'n', 'N'));
    map.insert(KeyCode(50), KeyInfo::printable("M", 'm', 'M'));
    map.insert(KeyCode(51), KeyInfo::printable("Comma", ',', '<'));
    map.insert(KeyCode(52), KeyInfo::printable("Period", '.', '>'));
    map.insert(KeyCode(53), KeyInfo::printable("Slash", '/', '?'));
    map.insert(KeyCode(57), KeyInfo::printable("Space", ' ', ' '));

    // Numpad (scanners configured for keypad emulation send these)
    map.insert(KeyCode(71), KeyInfo::printable("Numpad7", '7', '7'));
    map.insert(KeyCode(72), KeyInfo::printable("Numpad8", '8', '8'));
    map.insert(KeyCode(73), KeyInfo::printable("Numpad9", '9', '9'));
    map.insert(KeyCode(74), KeyInfo::printable("NumpadMinus", '-', '-'));
    map.insert(KeyCode(75), KeyInfo::printable("Numpad4", '4', '4'));
    map.insert(KeyCode(76), KeyInfo::printable("Numpad5", '5', '5'));
    map.insert(KeyCode(77), KeyInfo::printable("Numpad6", '6', '6'));
    map.insert(KeyCode(78), KeyInfo::printable("NumpadPlus", '+', '+'));
    map.insert(KeyCode(79), KeyInfo::printable("Numpad1", '1', '1'));
    map.insert(KeyCode(80), KeyInfo::printable("Numpad2", '2', '2'));
    map.insert(KeyCode(81), KeyInfo::printable("Numpad3", '3', '3'));
    map.insert(KeyCode(82), KeyInfo::printable("Numpad0", '0', '0'));
    map.insert(KeyCode(83), KeyInfo::printable("NumpadDot", '.', '.'));
    map.insert(KeyCode(55), KeyInfo::printable("NumpadAsterisk", '*', '*'));
    map.insert(KeyCode(98), KeyInfo::printable("NumpadSlash", '/', '/'));

    // Non-printing keys a scanner may send around the payload
    map.insert(KeyCode(1), KeyInfo::control("Escape"));
    map.insert(KeyCode(14), KeyInfo::control("Backspace"));
    map.insert(KeyCode(15), KeyInfo::control("Tab"));
    map.insert(KeyCode(28), KeyInfo::control("Enter"));
    map.insert(KeyCode(96), KeyInfo::control("NumpadEnter"));
    map.insert(KeyCode(42), KeyInfo::control("LeftShift"));
    map.insert(KeyCode(54), KeyInfo::control("RightShift"));
    map.insert(KeyCode(58), KeyInfo::control("CapsLock"));
    map.insert(KeyCode(69), KeyInfo::control("NumLock"));
    map.insert(KeyCode(29), KeyInfo::control("LeftCtrl"));
    map.insert(KeyCode(97), KeyInfo::control("RightCtrl"));
    map.insert(KeyCode(56), KeyInfo::control("LeftAlt"));
    map.insert(KeyCode(100), KeyInfo::control("RightAlt"));
    map.insert(KeyCode(125), KeyInfo::control("LeftMeta"));
    map.insert(KeyCode(126), KeyInfo::control("RightMeta"));

    map
});

/// Get key info by code, returns a default if not found
pub fn get_key_info(code: KeyCode) -> KeyInfo {
    KEYMAP.get(&code).cloned().unwrap_or_else(|| KeyInfo::control("Unknown"))
}

/// Character a key produces on a US layout, if it is printable
pub fn to_char(code: KeyCode, shifted: bool) -> Option<char> {
    let info = KEYMAP.get(&code)?;
    if shifted {
        info.shifted
    } else {
        info.plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_and_letters() {
        assert_eq!(to_char(KeyCode(8), false), Some('7'));
        assert_eq!(to_char(KeyCode(30), false), Some('a'));
        assert_eq!(to_char(KeyCode(30), true), Some('A'));
        assert_eq!(to_char(KeyCode(12), true), Some('_'));
    }

    #[test]
    fn numpad_ignores_shift() {
        assert_eq!(to_char(KeyCode(79), false), Some('1'));
        assert_eq!(to_char(KeyCode(79), true), Some('1'));
    }

    #[test]
    fn control_keys_are_not_printable() {
        assert_eq!(to_char(KeyCode::ENTER, false), None);
        assert_eq!(to_char(KeyCode::LEFT_SHIFT, true), None);
        assert_eq!(to_char(KeyCode(999), false), None);
    }

    #[test]
    fn unknown_key_info() {
        let info = get_key_info(KeyCode(999));
        assert_eq!(info.name, "Unknown");
        assert!(info.plain.is_none());
    }

    #[test]
    fn letter_detection() {
        assert!(get_key_info(KeyCode(44)).is_letter());
        assert!(!get_key_info(KeyCode(2)).is_letter());
        assert!(!get_key_info(KeyCode::ENTER).is_letter());
    }

    #[test]
    fn modifier_classification() {
        assert!(KeyCode::RIGHT_SHIFT.is_shift());
        assert!(KeyCode::LEFT_CTRL.is_chord_modifier());
        assert!(!KeyCode::LEFT_SHIFT.is_chord_modifier());
        assert!(KeyCode::KP_ENTER.is_enter());
        assert!(KeyCode::CAPS_LOCK.is_modifier());
        assert!(KeyCode::RIGHT_ALT.is_modifier());
        assert!(!KeyCode(30).is_modifier());
    }

    #[test]
    fn numpad_navigation_keys() {
        assert!(KeyCode(79).is_numpad_navigation());
        assert!(KeyCode(83).is_numpad_navigation());
        // Operators type the same with NumLock off
        assert!(!KeyCode(74).is_numpad_navigation());
        assert!(!KeyCode(78).is_numpad_navigation());
        assert!(!KeyCode(2).is_numpad_navigation());
    }

    #[test]
    fn device_query_mapping() {
        assert_eq!(KeyCode::from(device_query::Keycode::Key7), KeyCode(8));
        assert_eq!(KeyCode::from(device_query::Keycode::Enter), KeyCode::ENTER);
        assert_eq!(KeyCode::from(device_query::Keycode::Numpad0), KeyCode(82));
    }
}
