//! Custom TUI widgets

use super::theme::ThemeColors;
use crate::scanner::{ScanHistory, ScanSource};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Scan history, newest at the top
pub struct HistoryPanel<'a> {
    history: &'a ScanHistory,
    colors: ThemeColors,
}

impl<'a> HistoryPanel<'a> {
    pub fn new(history: &'a ScanHistory, colors: ThemeColors) -> Self {
        Self { history, colors }
    }
}

impl<'a> Widget for HistoryPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(" Scans ({}) ", self.history.total());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(self.colors.dim));

        let inner = block.inner(area);
        block.render(area, buf);

        if self.history.is_empty() {
            let hint = " Scan a barcode, or press Tab to type one ";
            buf.set_string(inner.x, inner.y, hint, Style::default().fg(self.colors.dim));
            return;
        }

        for (row, record) in self.history.iter().take(inner.height as usize).enumerate() {
            let (tag, color) = match record.source {
                ScanSource::Scanner => ("SCAN", self.colors.scanned),
                ScanSource::Manual => ("KEYD", self.colors.manual),
            };
            // HH:MM:SS out of the RFC 3339 stamp
            let time = record.scanned_at.get(11..19).unwrap_or("--:--:--");

            let line = Line::from(vec![
                Span::styled(format!(" {} ", time), Style::default().fg(self.colors.dim)),
                Span::styled(format!("[{}] ", tag), Style::default().fg(color)),
                Span::styled(
                    record.code.as_str(),
                    Style::default().fg(self.colors.fg).add_modifier(Modifier::BOLD),
                ),
            ]);
            buf.set_line(inner.x, inner.y + row as u16, &line, inner.width);
        }
    }
}

/// Manual entry field
pub struct EntryField<'a> {
    text: &'a str,
    focused: bool,
    colors: ThemeColors,
}

impl<'a> EntryField<'a> {
    pub fn new(text: &'a str, focused: bool, colors: ThemeColors) -> Self {
        Self { text, focused, colors }
    }
}

impl<'a> Widget for EntryField<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_color = if self.focused { self.colors.accent } else { self.colors.dim };
        let block = Block::default()
            .title(" Manual entry ")
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(border_color));

        let inner = block.inner(area);
        block.render(area, buf);

        let content = if self.focused {
            format!(" {}_", self.text)
        } else if self.text.is_empty() {
            " (Tab to focus)".to_string()
        } else {
            format!(" {}", self.text)
        };
        let style = if self.focused {
            Style::default().fg(self.colors.fg)
        } else {
            Style::default().fg(self.colors.dim)
        };
        buf.set_stringn(inner.x, inner.y, content, inner.width as usize, style);
    }
}

/// Widget for the help screen
pub struct HelpPanel {
    colors: ThemeColors,
}

impl HelpPanel {
    pub fn new(colors: ThemeColors) -> Self {
        Self { colors }
    }
}

impl Widget for HelpPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Help - Scan Wedge ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.colors.accent));

        let inner = block.inner(area);
        block.render(area, buf);

        let help_text = [
            "",
            " SCANNING",
            " -----------",
            " Printable keys outside the entry field go to the decoder.",
            " A burst ending in Enter becomes a scan; slow typing is dropped.",
            "",
            " CONTROLS",
            " -----------",
            " Tab              : Focus / leave the manual entry field",
            " Enter            : Submit manual entry (when focused)",
            " F1               : Toggle this help",
            " F2               : Enable / disable the scanner",
            " F5               : Export report to JSON",
            " Ctrl+L           : Clear scan history",
            " Ctrl+R           : Reset decoder counters",
            " Esc / Ctrl+C     : Quit",
        ];

        for (i, line) in help_text.iter().enumerate() {
            if i as u16 >= inner.height {
                break;
            }
            let style = if line.contains("---") {
                Style::default().fg(self.colors.dim)
            } else if line.len() > 1 && line[1..].chars().all(|c| c.is_ascii_uppercase()) {
                Style::default().fg(self.colors.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.colors.fg)
            };
            buf.set_string(inner.x, inner.y + i as u16, line, style);
        }
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    enabled: bool,
    scanning: bool,
    elapsed: &'a str,
    emitted: u64,
    dropped: u64,
    message: Option<&'a str>,
    colors: ThemeColors,
}

impl<'a> StatusBar<'a> {
    pub fn new(enabled: bool, scanning: bool, elapsed: &'a str, colors: ThemeColors) -> Self {
        Self {
            enabled,
            scanning,
            elapsed,
            emitted: 0,
            dropped: 0,
            message: None,
            colors,
        }
    }

    pub fn counts(mut self, emitted: u64, dropped: u64) -> Self {
        self.emitted = emitted;
        self.dropped = dropped;
        self
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg_style = Style::default().bg(self.colors.bar_bg).fg(self.colors.fg);
        for x in area.x..area.x + area.width {
            buf.set_string(x, area.y, " ", bg_style);
        }

        // Left side: decoder state
        let (state, state_color) = match (self.enabled, self.scanning) {
            (false, _) => (" DISABLED ", self.colors.disabled),
            (true, true) => (" SCANNING ", self.colors.pending),
            (true, false) => (" READY ", self.colors.scanned),
        };
        buf.set_string(
            area.x,
            area.y,
            state,
            bg_style.fg(state_color).add_modifier(Modifier::BOLD),
        );

        if let Some(msg) = self.message {
            let msg_x = area.x + (area.width / 2).saturating_sub(msg.len() as u16 / 2);
            buf.set_string(msg_x, area.y, msg, bg_style.fg(self.colors.accent));
        }

        let right = format!(
            " {} | Scans: {} | Dropped: {} ",
            self.elapsed, self.emitted, self.dropped
        );
        let right_x = area.x + area.width.saturating_sub(right.len() as u16);
        buf.set_string(right_x, area.y, &right, bg_style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ScanRecord;

    fn render<W: Widget>(widget: W, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn history_panel_lists_codes() {
        let mut history = ScanHistory::new(10);
        history.push(ScanRecord::new("4006381333931", ScanSource::Scanner));

        let buf = render(HistoryPanel::new(&history, ThemeColors::dark()), 50, 4);
        assert!(row_text(&buf, 1).contains("4006381333931"));
        assert!(row_text(&buf, 1).contains("[SCAN]"));
    }

    #[test]
    fn status_bar_shows_state() {
        let buf = render(StatusBar::new(true, true, "00:05", ThemeColors::dark()), 60, 1);
        assert!(row_text(&buf, 0).contains("SCANNING"));

        let buf = render(StatusBar::new(false, false, "00:05", ThemeColors::dark()), 60, 1);
        assert!(row_text(&buf, 0).contains("DISABLED"));
    }

    #[test]
    fn entry_field_shows_cursor_when_focused() {
        let buf = render(EntryField::new("AB", true, ThemeColors::dark()), 20, 3);
        assert!(row_text(&buf, 1).contains("AB_"));
    }
}
