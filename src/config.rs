//! Service configuration, read from an optional TOML file

use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub port: String,
    pub baud_rate: u32,
    pub whitelist_path: PathBuf,
    pub refresh_interval_secs: u64,
    pub poll_interval_ms: u64,
    pub read_timeout_ms: u32,
    pub usb_authorized_path: PathBuf,
    pub usb_settle_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".into(),
            baud_rate: 9600,
            whitelist_path: "whitelist.txt".into(),
            refresh_interval_secs: 60,
            poll_interval_ms: 1,
            read_timeout_ms: 1000,
            usb_authorized_path: crate::usb::DEFAULT_USB_AUTHORIZED_PATH.into(),
            usb_settle_secs: crate::usb::DEFAULT_SETTLE.as_secs(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading config from {:?}", path);
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn usb_settle(&self) -> Duration {
        Duration::from_secs(self.usb_settle_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_controller_firmware() {
        let cfg = Config::default();
        assert_eq!(cfg.port, "/dev/ttyACM0");
        assert_eq!(cfg.baud_rate, 9600);
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(60));
        assert_eq!(cfg.usb_settle(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"/dev/ttyUSB1\"").unwrap();
        writeln!(file, "refresh_interval_secs = 30").unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.port, "/dev/ttyUSB1");
        assert_eq!(cfg.refresh_interval_secs, 30);
        assert_eq!(cfg.baud_rate, 9600);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "baudrate = 115200").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load(&dir.path().join("laser.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
