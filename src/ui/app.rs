//! Main application state and logic

use crate::config::Config;
use crate::keyboard::keystroke_from_terminal;
use crate::report::ScanReport;
use crate::scanner::{
    BarcodeDecoder, FocusCell, FocusTarget, ScanHistory, ScanRecord, ScanSource,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::info;
use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    Scans,
    Help,
}

impl AppView {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scans => "Scans",
            Self::Help => "Help",
        }
    }
}

/// Application running state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,
    Quitting,
}

/// Main application.
///
/// Terminal key events reach the decoder before anything else. Keys the
/// decoder passes through drive the manual entry field when it has focus,
/// and the application controls otherwise.
pub struct App {
    /// Current view
    pub view: AppView,
    /// Application state
    pub state: AppState,
    /// Configuration
    pub config: Config,
    /// Scan decoder fed with every terminal keypress
    pub decoder: BarcodeDecoder<FocusCell>,
    /// Completed scans, newest first
    pub history: ScanHistory,
    /// Manual entry field contents
    pub entry: String,
    /// Application start time
    pub start_time: Instant,
    focus: FocusCell,
    scan_rx: mpsc::Receiver<String>,
    status_message: Option<String>,
    status_time: Option<Instant>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let focus = FocusCell::new();
        let (scan_tx, scan_rx) = mpsc::channel();
        let decoder = BarcodeDecoder::new(config.scanner.options(), focus.clone(), move |code| {
            let _ = scan_tx.send(code.to_string());
        });

        Self {
            view: AppView::Scans,
            state: AppState::Running,
            history: ScanHistory::new(config.ui.history_len),
            config,
            decoder,
            entry: String::new(),
            start_time: Instant::now(),
            focus,
            scan_rx,
            status_message: None,
            status_time: None,
        }
    }

    /// Route one terminal key event observed at `now`
    pub fn handle_key(&mut self, key: &KeyEvent, now: Instant) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        let consumed = self.decoder.handle_key(keystroke_from_terminal(key), now).is_consumed();
        self.collect_scans();
        if consumed {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
        } else if self.entry_focused() {
            self.handle_entry_key(key);
        } else {
            self.handle_control_key(key);
        }
    }

    /// Fire decoder timeouts and pick up finished scans
    pub fn tick(&mut self, now: Instant) {
        self.decoder.poll(now);
        self.collect_scans();
    }

    /// How long the event loop may block before the next `tick` is due
    pub fn poll_timeout(&self, tick_rate: Duration, now: Instant) -> Duration {
        match self.decoder.next_deadline() {
            // One extra millisecond so the deadline has strictly passed
            Some(deadline) => {
                let until = deadline.saturating_duration_since(now) + Duration::from_millis(1);
                tick_rate.min(until)
            }
            None => tick_rate,
        }
    }

    fn handle_entry_key(&mut self, key: &KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.entry.push(c),
            KeyCode::Backspace => {
                self.entry.pop();
            }
            KeyCode::Enter => self.submit_entry(),
            KeyCode::Esc | KeyCode::Tab => self.set_entry_focus(false),
            _ => {}
        }
    }

    fn handle_control_key(&mut self, key: &KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Tab => self.set_entry_focus(true),
            KeyCode::F(1) => self.toggle_help(),
            KeyCode::F(2) => self.toggle_decoder(),
            KeyCode::F(5) => {
                let filename = format!(
                    "scan_report_{}.json",
                    chrono::Local::now().format("%Y%m%d_%H%M%S")
                );
                if let Err(e) = self.export_report(&filename) {
                    self.set_status(format!("Export failed: {}", e));
                }
            }
            KeyCode::Char('l') if ctrl => self.clear_history(),
            KeyCode::Char('r') if ctrl => {
                self.decoder.reset_stats();
                self.set_status("Counters reset".to_string());
            }
            _ => {}
        }
    }

    fn submit_entry(&mut self) {
        let code = self.entry.trim().to_string();
        self.entry.clear();
        if code.is_empty() {
            return;
        }
        info!("manual entry: {}", code);
        self.set_status(format!("Entered {}", code));
        self.history.push(ScanRecord::new(code, ScanSource::Manual));
    }

    fn collect_scans(&mut self) {
        while let Ok(code) = self.scan_rx.try_recv() {
            info!("scan: {}", code);
            self.set_status(format!("Scanned {}", code));
            self.history.push(ScanRecord::new(code, ScanSource::Scanner));
        }
    }

    pub fn entry_focused(&self) -> bool {
        self.focus.get() == FocusTarget::Input
    }

    /// Move focus into or out of the manual entry field
    pub fn set_entry_focus(&mut self, focused: bool) {
        self.focus.set(if focused { FocusTarget::Input } else { FocusTarget::None });
    }

    pub fn toggle_decoder(&mut self) {
        let enabled = !self.decoder.is_enabled();
        self.decoder.set_enabled(enabled);
        self.set_status(if enabled { "Scanner enabled" } else { "Scanner disabled" }.to_string());
    }

    pub fn toggle_help(&mut self) {
        self.view = match self.view {
            AppView::Scans => AppView::Help,
            AppView::Help => AppView::Scans,
        };
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.set_status("History cleared".to_string());
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.state = AppState::Quitting;
    }

    /// Set a status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_time = Some(Instant::now());
    }

    /// Get status message if still valid (within 3 seconds)
    pub fn get_status(&self) -> Option<&str> {
        match (&self.status_message, self.status_time) {
            (Some(msg), Some(time)) if time.elapsed().as_secs() < 3 => Some(msg),
            _ => None,
        }
    }

    /// Get elapsed time formatted
    pub fn elapsed_formatted(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    pub fn generate_report(&self) -> ScanReport {
        ScanReport::new(self.start_time, self.decoder.stats(), &self.history)
    }

    /// Export session report to JSON file
    pub fn export_report(&mut self, filename: &str) -> Result<String, std::io::Error> {
        let report = self.generate_report();
        report.export_json(Path::new(filename))?;
        let msg = format!("Exported to {}", filename);
        info!("{}", msg);
        self.set_status(msg.clone());
        Ok(msg)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_burst(app: &mut App, text: &str, start: Instant) -> Instant {
        let mut at = start;
        for c in text.chars() {
            app.handle_key(&key(KeyCode::Char(c)), at);
            at += Duration::from_millis(10);
        }
        at
    }

    #[test]
    fn scanner_burst_lands_in_history() {
        let mut app = App::default();
        let start = Instant::now();

        let at = type_burst(&mut app, "7501234", start);
        app.handle_key(&key(KeyCode::Enter), at);

        let latest = app.history.latest().expect("scan recorded");
        assert_eq!(latest.code, "7501234");
        assert_eq!(latest.source, ScanSource::Scanner);
    }

    #[test]
    fn consumed_keys_do_not_trigger_controls() {
        let mut app = App::default();
        let start = Instant::now();

        // Plain chars belong to the decoder, so nothing here may quit
        let at = type_burst(&mut app, "q?x", start);
        assert_eq!(app.state, AppState::Running);
        assert!(app.decoder.is_scanning());

        app.tick(at + Duration::from_millis(200));
        assert!(!app.decoder.is_scanning());
        assert!(app.history.is_empty());
    }

    #[test]
    fn entry_field_keeps_typing_away_from_decoder() {
        let mut app = App::default();
        let start = Instant::now();

        app.handle_key(&key(KeyCode::Tab), start);
        assert!(app.entry_focused());

        let at = type_burst(&mut app, "ABC-42", start);
        assert_eq!(app.entry, "ABC-42");
        assert!(!app.decoder.is_scanning());

        app.handle_key(&key(KeyCode::Enter), at);
        assert!(app.entry.is_empty());
        let latest = app.history.latest().expect("manual record");
        assert_eq!(latest.code, "ABC-42");
        assert_eq!(latest.source, ScanSource::Manual);

        app.handle_key(&key(KeyCode::Esc), at);
        assert!(!app.entry_focused());
        assert_eq!(app.state, AppState::Running);
    }

    #[test]
    fn entry_backspace_and_blank_submit() {
        let mut app = App::default();
        let now = Instant::now();

        app.set_entry_focus(true);
        app.handle_key(&key(KeyCode::Char(' ')), now);
        app.handle_key(&key(KeyCode::Char('x')), now);
        app.handle_key(&key(KeyCode::Backspace), now);
        app.handle_key(&key(KeyCode::Enter), now);

        assert!(app.history.is_empty());
    }

    #[test]
    fn disabled_decoder_lets_keys_through() {
        let mut app = App::default();
        let start = Instant::now();

        app.handle_key(&key(KeyCode::F(2)), start);
        assert!(!app.decoder.is_enabled());

        let at = type_burst(&mut app, "123456", start);
        app.handle_key(&key(KeyCode::Enter), at);
        assert!(app.history.is_empty());
        assert!(!app.decoder.is_scanning());
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        let mut app = App::default();
        app.handle_key(&key(KeyCode::Esc), Instant::now());
        assert_eq!(app.state, AppState::Quitting);

        let mut app = App::default();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        app.set_entry_focus(true);
        app.handle_key(&ctrl_c, Instant::now());
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn help_toggles() {
        let mut app = App::default();
        app.handle_key(&key(KeyCode::F(1)), Instant::now());
        assert_eq!(app.view, AppView::Help);
        app.handle_key(&key(KeyCode::F(1)), Instant::now());
        assert_eq!(app.view, AppView::Scans);
    }

    #[test]
    fn poll_timeout_tracks_pending_deadline() {
        let mut app = App::default();
        let start = Instant::now();
        let tick = Duration::from_millis(500);

        assert_eq!(app.poll_timeout(tick, start), tick);

        app.handle_key(&key(KeyCode::Char('9')), start);
        assert_eq!(app.poll_timeout(tick, start), Duration::from_millis(101));
    }

    #[test]
    fn clear_history_via_ctrl_l() {
        let mut app = App::default();
        let start = Instant::now();
        let at = type_burst(&mut app, "ABCDEF", start);
        app.handle_key(&key(KeyCode::Enter), at);
        assert_eq!(app.history.len(), 1);

        let ctrl_l = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL);
        app.handle_key(&ctrl_l, at);
        assert!(app.history.is_empty());
    }
}
