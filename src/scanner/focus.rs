//! Focus query used to keep the decoder out of text-entry controls

use std::cell::Cell;
use std::rc::Rc;

/// Kind of control that currently has input focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    /// Nothing focused (document level)
    #[default]
    None,
    /// Single-line text input
    Input,
    /// Multi-line text area
    TextArea,
    /// Option list / select box
    Select,
    /// Any other focusable control (buttons, tables, ...)
    Other,
}

impl FocusTarget {
    /// Whether keystrokes aimed at this target belong to the user, not a scanner
    pub fn is_text_entry(self) -> bool {
        matches!(self, Self::Input | Self::TextArea | Self::Select)
    }
}

/// Answers "what has input focus right now?" at dispatch time.
pub trait FocusProbe {
    fn current_target(&self) -> FocusTarget;

    fn is_text_entry(&self) -> bool {
        self.current_target().is_text_entry()
    }
}

/// Probe for headless use: there is never a focused control.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFocus;

impl FocusProbe for NoFocus {
    fn current_target(&self) -> FocusTarget {
        FocusTarget::None
    }
}

/// Shared focus slot written by the UI and read by the decoder.
///
/// Clones share the same slot, so the UI keeps one handle and hands another
/// to the decoder.
#[derive(Debug, Clone, Default)]
pub struct FocusCell(Rc<Cell<FocusTarget>>);

impl FocusCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, target: FocusTarget) {
        self.0.set(target);
    }

    pub fn get(&self) -> FocusTarget {
        self.0.get()
    }
}

impl FocusProbe for FocusCell {
    fn current_target(&self) -> FocusTarget {
        self.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_entry_targets() {
        assert!(FocusTarget::Input.is_text_entry());
        assert!(FocusTarget::TextArea.is_text_entry());
        assert!(FocusTarget::Select.is_text_entry());
        assert!(!FocusTarget::None.is_text_entry());
        assert!(!FocusTarget::Other.is_text_entry());
    }

    #[test]
    fn no_focus_is_never_text_entry() {
        assert_eq!(NoFocus.current_target(), FocusTarget::None);
        assert!(!NoFocus.is_text_entry());
    }

    #[test]
    fn focus_cell_clones_share_state() {
        let ui_handle = FocusCell::new();
        let decoder_handle = ui_handle.clone();

        ui_handle.set(FocusTarget::TextArea);
        assert!(decoder_handle.is_text_entry());

        ui_handle.set(FocusTarget::Other);
        assert_eq!(decoder_handle.current_target(), FocusTarget::Other);
        assert!(!decoder_handle.is_text_entry());
    }
}
