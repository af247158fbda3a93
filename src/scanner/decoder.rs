//! Keystroke-to-barcode decoder
//!
//! HID barcode scanners type the payload as a burst of keystrokes followed by
//! Enter. The decoder buffers printable keystrokes that arrive closer together
//! than the configured timeout and emits the buffer when Enter arrives. A gap
//! longer than the timeout means a human is typing, and the buffer is dropped.

use super::focus::FocusProbe;
use crate::keyboard::Keystroke;
use log::debug;
use std::fmt;
use std::time::{Duration, Instant};

/// Decoder tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Minimum accepted code length (inclusive, in chars)
    pub min_length: usize,
    /// Maximum accepted code length (inclusive, in chars)
    pub max_length: usize,
    /// Maximum gap between keystrokes of one scan
    pub timeout: Duration,
    /// Whether the decoder observes keystrokes at all
    pub enabled: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            min_length: 3,
            max_length: 50,
            timeout: Duration::from_millis(100),
            enabled: true,
        }
    }
}

/// What happened to a keystroke handed to the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Swallowed by the decoder; the caller must not act on it
    Consumed,
    /// Not ours; the caller handles it as usual
    PassThrough,
}

impl Disposition {
    pub fn is_consumed(self) -> bool {
        self == Self::Consumed
    }
}

/// Running counters, for status display and reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DecoderStats {
    /// Scans delivered to the callback
    pub emitted: u64,
    /// Scans dropped at Enter for being too short or too long
    pub rejected_length: u64,
    /// Buffers discarded because the timeout fired
    pub abandoned: u64,
    /// Keystrokes swallowed by the decoder
    pub consumed_keys: u64,
    /// Keystrokes left for the caller
    pub passed_keys: u64,
}

/// Reconstructs barcode scans from a keystroke stream.
pub struct BarcodeDecoder<F: FocusProbe> {
    options: ScanOptions,
    focus: F,
    on_scan: Box<dyn FnMut(&str)>,
    buffer: String,
    pending_timeout: Option<Instant>,
    stats: DecoderStats,
}

impl<F: FocusProbe> BarcodeDecoder<F> {
    pub fn new(options: ScanOptions, focus: F, on_scan: impl FnMut(&str) + 'static) -> Self {
        Self {
            options,
            focus,
            on_scan: Box::new(on_scan),
            buffer: String::new(),
            pending_timeout: None,
            stats: DecoderStats::default(),
        }
    }

    /// Feed one keypress observed at `now`.
    pub fn handle_key(&mut self, key: Keystroke, now: Instant) -> Disposition {
        if !self.options.enabled {
            return Disposition::PassThrough;
        }

        // The timer may have run out while no events arrived
        self.poll(now);

        if self.focus.is_text_entry() {
            return self.pass();
        }

        match key {
            Keystroke::Char(c) => {
                self.buffer.push(c);
                self.pending_timeout = Some(now + self.options.timeout);
                self.consume()
            }
            Keystroke::Enter => {
                self.finish_scan();
                self.consume()
            }
            Keystroke::Other => self.pass(),
        }
    }

    /// Fire the pending timeout if its deadline has passed.
    ///
    /// Returns true when an in-progress buffer was discarded.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending_timeout {
            Some(deadline) if now > deadline => {
                debug!("scan abandoned after timeout ({} chars)", self.buffer.chars().count());
                self.reset();
                self.stats.abandoned += 1;
                true
            }
            _ => false,
        }
    }

    /// Deadline of the pending timeout, if one is live
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending_timeout
    }

    /// True while a buffer is being assembled.
    ///
    /// Expiry is lazy: past the deadline this stays true until the next
    /// `poll` or `handle_key`, so call `poll(now)` before reading it.
    pub fn is_scanning(&self) -> bool {
        !self.buffer.is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    /// Enable or disable observation. Disabling drops any buffer and timeout.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.reset();
        }
        self.options.enabled = enabled;
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = DecoderStats::default();
    }

    fn finish_scan(&mut self) {
        let raw = std::mem::take(&mut self.buffer);
        self.pending_timeout = None;

        let code = raw.trim();
        let len = code.chars().count();
        if (self.options.min_length..=self.options.max_length).contains(&len) {
            self.stats.emitted += 1;
            (self.on_scan)(code);
        } else if !raw.is_empty() {
            debug!(
                "scan of {} chars outside [{}, {}], dropped",
                len, self.options.min_length, self.options.max_length
            );
            self.stats.rejected_length += 1;
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.pending_timeout = None;
    }

    fn consume(&mut self) -> Disposition {
        self.stats.consumed_keys += 1;
        Disposition::Consumed
    }

    fn pass(&mut self) -> Disposition {
        self.stats.passed_keys += 1;
        Disposition::PassThrough
    }
}

impl<F: FocusProbe> fmt::Debug for BarcodeDecoder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BarcodeDecoder")
            .field("options", &self.options)
            .field("scanning", &self.is_scanning())
            .field("pending_timeout", &self.pending_timeout)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
