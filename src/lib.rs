//! Scan Wedge - keyboard-wedge barcode scanner decoding
//!
//! USB barcode scanners in HID mode type each scan as a fast burst of
//! keystrokes ending in Enter. This crate turns a keystroke stream back into
//! discrete scans, telling scanner bursts apart from human typing by timing,
//! and leaves keystrokes aimed at text-entry controls alone.

pub mod config;
pub mod keyboard;
pub mod report;
pub mod scanner;
pub mod simulate;
pub mod ui;

pub use config::Config;
pub use scanner::{BarcodeDecoder, Disposition, ScanOptions};
