//! Keyboard event types and the polling listener

use super::KeyCode;
use device_query::{DeviceQuery, DeviceState, Keycode};
use std::sync::mpsc;
use std::time::Instant;

/// Type of keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventType {
    /// Key was pressed down
    Press,
    /// Key was released
    Release,
}

/// A keyboard event with timing information
#[derive(Debug, Clone)]
pub struct KeyEvent {
    /// The key code
    pub key: KeyCode,
    /// Type of event (press/release)
    pub event_type: KeyEventType,
    /// When the event was observed
    pub timestamp: Instant,
}

impl KeyEvent {
    pub fn new(key: KeyCode, event_type: KeyEventType, timestamp: Instant) -> Self {
        Self {
            key,
            event_type,
            timestamp,
        }
    }

    pub fn press(key: KeyCode, timestamp: Instant) -> Self {
        Self::new(key, KeyEventType::Press, timestamp)
    }

    pub fn release(key: KeyCode, timestamp: Instant) -> Self {
        Self::new(key, KeyEventType::Release, timestamp)
    }
}

/// Order the state changes seen in one poll.
///
/// Releases go first so a quick re-press of the same key stays ordered.
/// Among presses, modifiers go first: a scanner presses Shift a few
/// microseconds before the letter, but the key state snapshot lists keys in
/// keycode order, which would put `A` ahead of Shift.
fn ordered_changes(
    released: Vec<KeyCode>,
    mut pressed: Vec<KeyCode>,
) -> Vec<(KeyCode, KeyEventType)> {
    pressed.sort_by_key(|k| !k.is_modifier());
    released
        .into_iter()
        .map(|k| (k, KeyEventType::Release))
        .chain(pressed.into_iter().map(|k| (k, KeyEventType::Press)))
        .collect()
}

/// Portable listener that diffs the global key state on every poll.
///
/// Works wherever `device_query` does, but cannot tell devices apart and may
/// merge keystrokes that land between two polls. Poll faster than the
/// scanner types.
pub struct KeyboardListener {
    device_state: DeviceState,
    held: Vec<Keycode>,
    event_tx: mpsc::Sender<KeyEvent>,
}

impl KeyboardListener {
    pub fn new(event_tx: mpsc::Sender<KeyEvent>) -> Self {
        Self {
            device_state: DeviceState::new(),
            held: Vec::new(),
            event_tx,
        }
    }

    /// Poll for keyboard state changes.
    /// Returns the number of events generated
    pub fn poll(&mut self) -> usize {
        let current = self.device_state.get_keys();
        let released: Vec<KeyCode> = self
            .held
            .iter()
            .filter(|k| !current.contains(k))
            .map(|&k| KeyCode::from(k))
            .collect();
        let pressed: Vec<KeyCode> = current
            .iter()
            .filter(|k| !self.held.contains(k))
            .map(|&k| KeyCode::from(k))
            .collect();
        self.held = current;

        if released.is_empty() && pressed.is_empty() {
            return 0;
        }

        let now = Instant::now();
        let mut sent = 0;
        for (key, event_type) in ordered_changes(released, pressed) {
            let event = KeyEvent::new(key, event_type, now);
            if self.event_tx.send(event).is_ok() {
                sent += 1;
            }
        }
        sent
    }
}
