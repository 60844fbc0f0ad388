// Tue Jan 13 2026 - Alex

use crate::memory::{Endianness, RegionScanLevel};
use crate::value::ScanDataType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("bad value `{value}` for option `{name}`: {reason}")]
    BadValue {
        name: String,
        value: String,
        reason: String,
    },
}

/// Session options, loadable from JSON and adjustable with `option`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub scan_data_type: ScanDataType,
    pub region_scan_level: RegionScanLevel,
    pub endianness: Endianness,
    pub dump_with_ascii: bool,
    /// Delay between polls in `watch`, and the unit `set` repeats are
    /// rounded to.
    pub poll_interval_ms: u64,
    pub show_progress: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            scan_data_type: ScanDataType::AnyNumber,
            region_scan_level: RegionScanLevel::HeapStackExecutableBss,
            endianness: Endianness::Host,
            dump_with_ascii: true,
            poll_interval_ms: 100,
            show_progress: true,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn with_data_type(mut self, data_type: ScanDataType) -> Self {
        self.scan_data_type = data_type;
        self
    }

    pub fn with_scan_level(mut self, level: RegionScanLevel) -> Self {
        self.region_scan_level = level;
        self
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::BadValue {
                name: "poll_interval_ms".to_string(),
                value: "0".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Applies `option <name> <value>`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let bad = |reason: &str| ConfigError::BadValue {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };
        match name {
            "scan_data_type" => {
                self.scan_data_type = value.parse().map_err(|e: String| bad(&e))?;
            }
            "region_scan_level" => {
                self.region_scan_level = value
                    .parse::<u8>()
                    .ok()
                    .and_then(RegionScanLevel::from_level)
                    .ok_or_else(|| bad("expected 1, 2 or 3"))?;
            }
            "endianness" => {
                self.endianness = value
                    .parse::<u8>()
                    .ok()
                    .and_then(Endianness::from_option)
                    .ok_or_else(|| bad("expected 0 (host), 1 (little) or 2 (big)"))?;
            }
            "dump_with_ascii" => {
                self.dump_with_ascii = parse_flag(value).ok_or_else(|| bad("expected 0 or 1"))?;
            }
            "poll_interval_ms" => {
                self.poll_interval_ms = value
                    .parse::<u64>()
                    .ok()
                    .filter(|ms| *ms > 0)
                    .ok_or_else(|| bad("expected a positive number of milliseconds"))?;
            }
            "show_progress" => {
                self.show_progress = parse_flag(value).ok_or_else(|| bad("expected 0 or 1"))?;
            }
            _ => return Err(ConfigError::UnknownOption(name.to_string())),
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_set_options() {
        let mut options = Options::new();
        options.set("scan_data_type", "int32").unwrap();
        assert_eq!(options.scan_data_type, ScanDataType::Integer32);
        options.set("region_scan_level", "3").unwrap();
        assert_eq!(options.region_scan_level, RegionScanLevel::All);
        options.set("endianness", "2").unwrap();
        assert_eq!(options.endianness, Endianness::Big);
        options.set("dump_with_ascii", "0").unwrap();
        assert!(!options.dump_with_ascii);

        assert!(matches!(options.set("nope", "1"), Err(ConfigError::UnknownOption(_))));
        assert!(matches!(options.set("region_scan_level", "4"), Err(ConfigError::BadValue { .. })));
        assert!(options.set("poll_interval_ms", "0").is_err());
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"scan_data_type": "float64", "poll_interval_ms": 5}}"#).unwrap();
        let options = Options::load(file.path()).unwrap();
        assert_eq!(options.scan_data_type, ScanDataType::Float64);
        assert_eq!(options.poll_interval_ms, 5);
        assert!(options.dump_with_ascii);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memscan.json");
        let options = Options::new()
            .with_data_type(ScanDataType::String)
            .with_scan_level(RegionScanLevel::All)
            .with_progress(false);
        options.save(&path).unwrap();
        assert_eq!(Options::load(&path).unwrap(), options);
    }
}
