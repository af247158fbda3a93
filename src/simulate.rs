//! Synthetic scanner: types a code at device speed through the OS
//!
//! Useful for checking a deployment end to end without hardware. Requires
//! the `virtual-send` feature and the platform's input injection libraries
//! (libxdo on Linux, etc.).

use std::time::Duration;

/// Delay between synthetic keystrokes, well under the decoder timeout
pub const DEFAULT_KEY_DELAY: Duration = Duration::from_millis(8);

#[cfg(feature = "virtual-send")]
pub struct ScanSimulator {
    enigo: enigo::Enigo,
    key_delay: Duration,
}

#[cfg(feature = "virtual-send")]
impl ScanSimulator {
    pub fn new(key_delay: Duration) -> anyhow::Result<Self> {
        use enigo::{Enigo, Settings};

        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| anyhow::anyhow!("Failed to init input injection: {}", e))?;
        Ok(Self { enigo, key_delay })
    }

    /// Type `code` one key at a time, then Enter
    pub fn send(&mut self, code: &str) -> anyhow::Result<()> {
        use enigo::{Direction, Key, Keyboard};
        use std::thread;

        for c in code.chars() {
            self.enigo
                .key(Key::Unicode(c), Direction::Click)
                .map_err(|e| anyhow::anyhow!("Key '{}' failed: {}", c, e))?;
            thread::sleep(self.key_delay);
        }
        self.enigo
            .key(Key::Return, Direction::Click)
            .map_err(|e| anyhow::anyhow!("Enter failed: {}", e))?;
        log::info!("simulated scan of {} chars", code.chars().count());
        Ok(())
    }

    pub fn is_available() -> bool {
        true
    }
}

/// Stub implementation when virtual-send feature is not enabled
#[cfg(not(feature = "virtual-send"))]
pub struct ScanSimulator;

#[cfg(not(feature = "virtual-send"))]
impl ScanSimulator {
    pub fn new(_key_delay: Duration) -> anyhow::Result<Self> {
        anyhow::bail!("Scan simulation not available - build with --features virtual-send")
    }

    pub fn send(&mut self, _code: &str) -> anyhow::Result<()> {
        anyhow::bail!("Scan simulation not available - build with --features virtual-send")
    }

    pub fn is_available() -> bool {
        false
    }
}

#[cfg(all(test, not(feature = "virtual-send")))]
mod tests {
    use super::*;

    #[test]
    fn stub_reports_unavailable() {
        assert!(!ScanSimulator::is_available());
        let err = ScanSimulator::new(DEFAULT_KEY_DELAY).err().expect("stub must fail");
        assert!(err.to_string().contains("virtual-send"));
    }
}
