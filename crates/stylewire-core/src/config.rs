//! Configuration resolution for Stylewire.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/stylewire/settings.json)
//! 3. Project config (.stylewire/settings.json)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete Stylewire configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Relay listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 1111,
        }
    }
}

impl RelayConfig {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| Error::Config(format!("Invalid host {:?}: {}", self.host, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    /// Log every routed payload in full instead of a truncated preview.
    pub log_payloads: bool,
    /// Characters of payload kept in the truncated preview.
    pub payload_preview_len: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_payloads: false,
            payload_preview_len: 50,
        }
    }
}

/// A settings file: every field optional, so layers only override what they set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    relay: RelayLayer,
    logging: LoggingLayer,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RelayLayer {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct LoggingLayer {
    level: Option<String>,
    json: Option<bool>,
    log_payloads: Option<bool>,
    payload_preview_len: Option<usize>,
}

/// Load configuration with hierarchical resolution.
pub fn load_config(project_dir: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path()
        && global_path.exists()
    {
        let global = load_config_file(&global_path)?;
        merge_layer(&mut config, global);
        tracing::debug!(path = %global_path.display(), "Applied global config");
    }

    if let Some(dir) = project_dir {
        let project_path = project_config_path(dir);
        if project_path.exists() {
            let project = load_config_file(&project_path)?;
            merge_layer(&mut config, project);
            tracing::debug!(path = %project_path.display(), "Applied project config");
        }
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".stylewire").join("settings.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/stylewire/settings.json"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("stylewire").join("settings.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

/// Project config file path under `dir`.
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(".stylewire").join("settings.json")
}

fn load_config_file(path: &Path) -> Result<ConfigLayer> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_layer(base: &mut Config, overlay: ConfigLayer) {
    if let Some(host) = overlay.relay.host {
        base.relay.host = host;
    }
    if let Some(port) = overlay.relay.port {
        base.relay.port = port;
    }
    if let Some(level) = overlay.logging.level {
        base.logging.level = level;
    }
    if let Some(json) = overlay.logging.json {
        base.logging.json = json;
    }
    if let Some(log_payloads) = overlay.logging.log_payloads {
        base.logging.log_payloads = log_payloads;
    }
    if let Some(len) = overlay.logging.payload_preview_len {
        base.logging.payload_preview_len = len;
    }
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("STYLEWIRE_HOST") {
        config.relay.host = val;
    }
    if let Some(n) = var("STYLEWIRE_PORT").and_then(|v| v.parse().ok()) {
        config.relay.port = n;
    }
    if let Some(val) = var("STYLEWIRE_LOG_LEVEL") {
        config.logging.level = val;
    }
    if let Some(b) = var("STYLEWIRE_LOG_JSON").and_then(|v| parse_bool(&v)) {
        config.logging.json = b;
    }
    if let Some(b) = var("STYLEWIRE_LOG_PAYLOADS").and_then(|v| parse_bool(&v)) {
        config.logging.log_payloads = b;
    }
    if let Some(n) = var("STYLEWIRE_PAYLOAD_PREVIEW_LEN").and_then(|v| v.parse().ok()) {
        config.logging.payload_preview_len = n;
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
