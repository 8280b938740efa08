//! upiqr runtime configuration handling

use crate::error::{Error, Result};
use crate::export::ExportOptions;
use crate::link::{LinkOptions, ValueEncoding};
use crate::qr::{EccLevel, QrOptions};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure read from disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpiqrConfig {
    /// Link construction settings
    pub link: LinkOptions,
    /// QR rendering settings
    pub qr: QrOptions,
    /// Download target settings
    pub export: ExportOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

impl UpiqrConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No upiqr.toml / upiqr.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["upiqr.toml", "upiqr.yaml", "upiqr.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("upiqr");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    pub(crate) fn apply_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(encoding) = var("UPIQR_ENCODING") {
            self.link.encoding = encoding.parse::<ValueEncoding>().map_err(Error::Config)?;
        }
        if let Some(value) = var("UPIQR_INCLUDE_NOTE").and_then(|v| parse_flag(&v)) {
            self.link.include_note = value;
        }
        if let Some(value) = var("UPIQR_STRICT_AMOUNT").and_then(|v| parse_flag(&v)) {
            self.link.strict_amount = value;
        }
        if let Some(size) = var("UPIQR_QR_SIZE") {
            self.qr.size = size
                .parse::<u32>()
                .map_err(|e| Error::Config(format!("Invalid UPIQR_QR_SIZE '{size}': {e}")))?;
        }
        if let Some(margin) = var("UPIQR_QR_MARGIN") {
            self.qr.margin = margin
                .parse::<u32>()
                .map_err(|e| Error::Config(format!("Invalid UPIQR_QR_MARGIN '{margin}': {e}")))?;
        }
        if let Some(ecc) = var("UPIQR_QR_ECC") {
            self.qr.ecc = ecc.parse::<EccLevel>().map_err(Error::Config)?;
        }
        if let Some(dir) = var("UPIQR_EXPORT_DIR") {
            self.export.directory = if dir.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }
        if let Some(name) = var("UPIQR_EXPORT_FILE").filter(|n| !n.trim().is_empty()) {
            self.export.file_name = name;
        }
        self.logging.apply_overrides(&var);
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `UPIQR_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in terminal logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    fn apply_overrides<F>(&mut self, var: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = var("UPIQR_LOG_LEVEL") {
            self.level = level;
        }
        if let Some(file) = var("UPIQR_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Some(color) = var("UPIQR_LOG_COLOR").and_then(|v| parse_flag(&v)) {
            self.color = color;
        }
        if let Some(rotation) = var("UPIQR_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::from_str(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}
