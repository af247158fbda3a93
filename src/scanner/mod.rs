//! Barcode scan reconstruction from keystrokes

mod decoder;
pub mod focus;
mod history;

pub use decoder::{BarcodeDecoder, DecoderStats, Disposition, ScanOptions};
pub use focus::{FocusCell, FocusProbe, FocusTarget, NoFocus};
pub use history::{ScanHistory, ScanRecord, ScanSource};
