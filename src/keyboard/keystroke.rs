//! Translation of raw key events into the keystrokes the decoder consumes

use super::{keymap, KeyCode, KeyEvent, KeyEventType};
use crossterm::event::{KeyCode as TermKeyCode, KeyEvent as TermKeyEvent, KeyModifiers};

/// A keypress as the decoder sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    /// A single printable character
    Char(char),
    /// The terminating Enter key
    Enter,
    /// Anything else: navigation, function keys, modifier chords
    Other,
}

/// Turns press/release events from a listener into keystrokes.
///
/// Tracks shift, caps lock, num lock and chord modifiers (ctrl, alt, meta)
/// across events. Releases and bare modifier presses produce nothing. Any
/// key held under a chord, Enter included, is `Other`.
///
/// Lock state starts as caps lock off and num lock on, the state a scanner
/// in keypad emulation expects; the actual LED state is not read.
#[derive(Debug, Default)]
pub struct KeystrokeTranslator {
    shift_held: u8,
    chord_held: u8,
    caps_lock: bool,
    num_lock_off: bool,
}

impl KeystrokeTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event: &KeyEvent) -> Option<Keystroke> {
        let key = event.key;
        match event.event_type {
            KeyEventType::Press => self.press(key),
            KeyEventType::Release => {
                if key.is_shift() {
                    self.shift_held = self.shift_held.saturating_sub(1);
                } else if key.is_chord_modifier() {
                    self.chord_held = self.chord_held.saturating_sub(1);
                }
                None
            }
        }
    }

    fn press(&mut self, key: KeyCode) -> Option<Keystroke> {
        if key.is_shift() {
            self.shift_held = self.shift_held.saturating_add(1);
            return None;
        }
        if key.is_chord_modifier() {
            self.chord_held = self.chord_held.saturating_add(1);
            return None;
        }
        if key == KeyCode::CAPS_LOCK {
            self.caps_lock = !self.caps_lock;
            return None;
        }
        if key == KeyCode::NUM_LOCK {
            self.num_lock_off = !self.num_lock_off;
            return None;
        }
        if self.chord_held > 0 {
            return Some(Keystroke::Other);
        }
        if key.is_enter() {
            return Some(Keystroke::Enter);
        }
        if self.num_lock_off && key.is_numpad_navigation() {
            return Some(Keystroke::Other);
        }

        let info = keymap::get_key_info(key);
        let mut shifted = self.shift_held > 0;
        if self.caps_lock && info.is_letter() {
            shifted = !shifted;
        }
        Some(match keymap::to_char(key, shifted) {
            Some(c) => Keystroke::Char(c),
            None => Keystroke::Other,
        })
    }

    /// Forget held modifiers, e.g. after a listener lost events
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Keystroke for a terminal key event.
///
/// Ctrl and Alt chords are never printable, so application shortcuts bound
/// to them keep working while the decoder owns plain characters.
pub fn keystroke_from_terminal(event: &TermKeyEvent) -> Keystroke {
    if event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return Keystroke::Other;
    }
    match event.code {
        TermKeyCode::Char(c) if !c.is_control() => Keystroke::Char(c),
        TermKeyCode::Enter => Keystroke::Enter,
        _ => Keystroke::Other,
    }
}
