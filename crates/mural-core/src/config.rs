//! Configuration loading and defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MuralError, Result};

/// Top-level Mural configuration.
///
/// Every section is optional; accessors supply defaults so a missing or
/// empty config file yields a working server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter, overridden by `RUST_LOG`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

pub const DEFAULT_PORT: u16 = 9340;
pub const DEFAULT_CANVAS_WIDTH: u32 = 128;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 128;

impl Config {
    /// Load config from a JSON file. A missing file is not an error; it
    /// yields the defaults.
    pub fn load(path: &Path) -> Result<Config> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Config::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw)
            .map_err(|e| MuralError::Config(format!("{}: {e}", path.display())))
    }

    pub fn bind_addr(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.bind.clone())
            .unwrap_or_else(|| "0.0.0.0".to_string())
    }

    pub fn port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn canvas_width(&self) -> u32 {
        self.canvas
            .as_ref()
            .and_then(|c| c.width)
            .unwrap_or(DEFAULT_CANVAS_WIDTH)
    }

    pub fn canvas_height(&self) -> u32 {
        self.canvas
            .as_ref()
            .and_then(|c| c.height)
            .unwrap_or(DEFAULT_CANVAS_HEIGHT)
    }

    pub fn log_filter(&self) -> String {
        self.logging
            .as_ref()
            .and_then(|l| l.filter.clone())
            .unwrap_or_else(|| "info".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0");
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.canvas_width(), DEFAULT_CANVAS_WIDTH);
        assert_eq!(config.canvas_height(), DEFAULT_CANVAS_HEIGHT);
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_partial_config() {
        let config: Config = serde_json::from_str(
            r#"{"server": {"port": 8080}, "canvas": {"width": 64, "height": 32}}"#,
        )
        .unwrap();
        assert_eq!(config.port(), 8080);
        assert_eq!(config.bind_addr(), "0.0.0.0");
        assert_eq!(config.canvas_width(), 64);
        assert_eq!(config.canvas_height(), 32);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let config = Config::load(Path::new("/nonexistent/mural.json")).unwrap();
        assert_eq!(config.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = std::env::temp_dir().join("mural-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, MuralError::Config(_)));
    }
}
