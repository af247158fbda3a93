//! Keyboard event handling and keystroke translation

mod event;
pub mod keymap;
mod keystroke;

#[cfg(target_os = "linux")]
mod evdev_listener;

pub use event::{KeyEvent, KeyEventType, KeyboardListener};
pub use keymap::{get_key_info, KeyCode, KeyInfo, KEYMAP};
pub use keystroke::{keystroke_from_terminal, Keystroke, KeystrokeTranslator};

#[cfg(target_os = "linux")]
pub use evdev_listener::{evdev_status, EvdevListener, ListenerError};
