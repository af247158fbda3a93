//! Session report and export functionality

use crate::scanner::{DecoderStats, ScanHistory, ScanRecord};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Complete session report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Decoder counters for the session
    pub decoder: DecoderStats,
    /// Scans still held in history, newest first
    pub scans: Vec<ScanRecord>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    /// Session duration in seconds
    pub duration_secs: f64,
    /// Scans recorded, including ones evicted from history
    pub total_scans: u64,
}

impl ScanReport {
    pub fn new(start_time: Instant, stats: &DecoderStats, history: &ScanHistory) -> Self {
        let now: DateTime<Local> = Local::now();
        Self {
            metadata: ReportMetadata {
                generated_at: now.to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                duration_secs: start_time.elapsed().as_secs_f64(),
                total_scans: history.total(),
            },
            decoder: *stats,
            scans: history.iter().cloned().collect(),
        }
    }

    /// Export report to JSON file
    pub fn export_json(&self, path: &Path) -> std::io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Export report to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ScanSource;

    #[test]
    fn report_json_shape() {
        let mut history = ScanHistory::new(5);
        history.push(ScanRecord::new("7501234", ScanSource::Scanner));
        history.push(ScanRecord::new("MANUAL-1", ScanSource::Manual));
        let stats = DecoderStats {
            emitted: 1,
            rejected_length: 2,
            ..DecoderStats::default()
        };

        let report = ScanReport::new(Instant::now(), &stats, &history);
        let value: serde_json::Value =
            serde_json::from_str(&report.to_json().expect("serialize")).expect("parse");

        assert_eq!(value["metadata"]["total_scans"], 2);
        assert_eq!(value["decoder"]["rejected_length"], 2);
        assert_eq!(value["scans"][0]["code"], "MANUAL-1");
        assert_eq!(value["scans"][1]["source"], "scanner");
    }

    #[test]
    fn export_writes_file() {
        let path = std::env::temp_dir().join(format!("scan-wedge-report-{}.json", std::process::id()));
        let report = ScanReport::new(Instant::now(), &DecoderStats::default(), &ScanHistory::default());

        report.export_json(&path).expect("export");
        let contents = std::fs::read_to_string(&path).expect("read back");
        assert!(contents.contains("\"version\""));

        let _ = std::fs::remove_file(&path);
    }
}
