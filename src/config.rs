//! Configuration management for Scan Wedge
//!
//! Configuration lives in a platform-specific TOML file. A missing file means
//! defaults; a present but malformed or inconsistent file is an error.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/scan-wedge/config.toml` |
//! | macOS | `~/Library/Application Support/scan-wedge/config.toml` |
//! | Windows | `%APPDATA%\scan-wedge\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use scan_wedge::Config;
//!
//! let mut config = Config::load().unwrap_or_default();
//! config.scanner.timeout_ms = 60;
//! config.save().expect("Failed to save config");
//! ```

use crate::scanner::ScanOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading or writing config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Values parse but contradict each other
    #[error("Invalid config: {0}")]
    Invalid(String),
}

const APP_DIR: &str = "scan-wedge";

/// Returns the path to the config file.
///
/// Creates the config directory if it doesn't exist.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let app_dir = config_dir.join(APP_DIR);

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir.join("config.toml"))
}

/// Directory for the TUI's log file and exported reports
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base = dirs::data_local_dir().ok_or(ConfigError::NoConfigDir)?;
    let dir = base.join(APP_DIR);
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Scan decoding settings
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// Headless listener settings
    #[serde(default)]
    pub listener: ListenerConfig,
    /// UI settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// Scan decoding configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScannerConfig {
    /// Shortest code accepted
    pub min_length: usize,
    /// Longest code accepted
    pub max_length: usize,
    /// Longest pause between keystrokes of one scan, in ms
    pub timeout_ms: u64,
    /// Start with the decoder active
    pub enabled: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        let options = ScanOptions::default();
        Self {
            min_length: options.min_length,
            max_length: options.max_length,
            timeout_ms: options.timeout.as_millis() as u64,
            enabled: options.enabled,
        }
    }
}

impl ScannerConfig {
    pub fn options(&self) -> ScanOptions {
        ScanOptions {
            min_length: self.min_length,
            max_length: self.max_length,
            timeout: Duration::from_millis(self.timeout_ms),
            enabled: self.enabled,
        }
    }
}

/// Headless listener configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Read only this evdev device (the scanner); all keyboards when unset
    pub device: Option<PathBuf>,
    /// Grab the device exclusively so scans don't reach other applications
    pub grab: bool,
    /// Sleep between polls, in ms
    pub poll_interval_ms: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            device: None,
            grab: false,
            poll_interval_ms: 2,
        }
    }
}

impl ListenerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UiConfig {
    /// Refresh rate for UI updates (in Hz)
    pub refresh_rate_hz: u32,
    /// Scans kept in the history panel
    pub history_len: usize,
    /// Color theme (dark/light)
    pub theme: Theme,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: 30,
            history_len: 200,
            theme: Theme::Dark,
        }
    }
}

/// Color theme options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and validate configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the decoder or UI cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scanner = &self.scanner;
        if scanner.min_length == 0 {
            return Err(ConfigError::Invalid("scanner.min_length must be at least 1".into()));
        }
        if scanner.min_length > scanner.max_length {
            return Err(ConfigError::Invalid(format!(
                "scanner.min_length ({}) exceeds scanner.max_length ({})",
                scanner.min_length, scanner.max_length
            )));
        }
        if scanner.timeout_ms == 0 {
            return Err(ConfigError::Invalid("scanner.timeout_ms must be positive".into()));
        }
        if self.ui.refresh_rate_hz == 0 {
            return Err(ConfigError::Invalid("ui.refresh_rate_hz must be positive".into()));
        }
        Ok(())
    }

    /// Get UI refresh interval as Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.ui.refresh_rate_hz.max(1) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_config_path(tag: &str) -> PathBuf {
        env::temp_dir().join(format!("scan-wedge-test-{}-{}.toml", tag, std::process::id()))
    }

    #[test]
    fn config_default_values() {
        let config = Config::default();
        assert_eq!(config.scanner.min_length, 3);
        assert_eq!(config.scanner.max_length, 50);
        assert_eq!(config.scanner.timeout_ms, 100);
        assert!(config.scanner.enabled);
        assert_eq!(config.listener.device, None);
        assert!(!config.listener.grab);
        assert_eq!(config.ui.history_len, 200);
        assert_eq!(config.ui.theme, Theme::Dark);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn scanner_config_to_options() {
        let config = ScannerConfig {
            min_length: 8,
            max_length: 13,
            timeout_ms: 40,
            enabled: false,
        };
        let options = config.options();
        assert_eq!(options.min_length, 8);
        assert_eq!(options.max_length, 13);
        assert_eq!(options.timeout, Duration::from_millis(40));
        assert!(!options.enabled);
    }

    #[test]
    fn config_refresh_interval() {
        let config = Config::default();
        // 30 Hz = 33333 microseconds per frame
        assert_eq!(config.refresh_interval().as_micros(), 33333);
    }

    #[test]
    fn config_save_and_load_roundtrip() {
        let path = temp_config_path("roundtrip");

        let mut config = Config::default();
        config.scanner.timeout_ms = 60;
        config.listener.device = Some(PathBuf::from("/dev/input/event7"));
        config.ui.theme = Theme::Light;

        config.save_to(&path).expect("Failed to save config");
        let loaded = Config::load_from(&path).expect("Failed to load config");
        assert_eq!(loaded, config);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn config_load_missing_file_is_io_error() {
        let result = Config::load_from(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let toml_str = r#"
[scanner]
min_length = 8
"#;
        let config: Config = toml::from_str(toml_str).expect("Failed to deserialize");
        assert_eq!(config.scanner.min_length, 8);
        assert_eq!(config.scanner.max_length, 50);
        assert_eq!(config.scanner.timeout_ms, 100);
        assert_eq!(config.ui, UiConfig::default());
    }

    #[test]
    fn config_deserializes_from_toml() {
        let toml_str = r#"
[scanner]
min_length = 6
max_length = 20
timeout_ms = 50
enabled = false

[listener]
device = "/dev/input/by-id/usb-scanner-event-kbd"
grab = true
poll_interval_ms = 5

[ui]
refresh_rate_hz = 60
history_len = 10
theme = "Light"
"#;
        let config: Config = toml::from_str(toml_str).expect("Failed to deserialize");

        assert_eq!(config.scanner.min_length, 6);
        assert_eq!(config.scanner.max_length, 20);
        assert_eq!(config.scanner.timeout_ms, 50);
        assert!(!config.scanner.enabled);
        assert_eq!(
            config.listener.device,
            Some(PathBuf::from("/dev/input/by-id/usb-scanner-event-kbd"))
        );
        assert!(config.listener.grab);
        assert_eq!(config.listener.poll_interval(), Duration::from_millis(5));
        assert_eq!(config.ui.history_len, 10);
        assert_eq!(config.ui.theme, Theme::Light);
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let mut config = Config::default();
        config.scanner.min_length = 20;
        config.scanner.max_length = 10;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn validate_rejects_zero_values() {
        let mut config = Config::default();
        config.scanner.min_length = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.scanner.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.ui.refresh_rate_hz = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_from_validates() {
        let path = temp_config_path("invalid");
        fs::write(&path, "[scanner]\ntimeout_ms = 0\n").expect("write temp config");

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let listener = ListenerConfig {
            poll_interval_ms: 0,
            ..ListenerConfig::default()
        };
        assert_eq!(listener.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::NoConfigDir;
        assert_eq!(err.to_string(), "Could not determine config directory");

        let io_err = ConfigError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(io_err.to_string().contains("IO error"));
    }

    #[test]
    fn theme_serializes_by_name() {
        let mut config = Config::default();
        config.ui.theme = Theme::Light;
        let toml_str = toml::to_string_pretty(&config).expect("Failed to serialize");
        assert!(toml_str.contains("theme = \"Light\""));
    }
}
