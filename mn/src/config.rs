//! mpdnotify configuration types and loading
//!
//! Settings are layered, lowest precedence first: built-in defaults, the TOML
//! config file, environment variables (`MPD_HOST`, `MPD_PORT`, `MPD_TIMEOUT`,
//! `DEBUG`) and finally command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::cli::Cli;

/// Main mpdnotify configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// MPD server connection
    pub mpd: MpdConfig,

    /// GNTP/Growl notification server
    pub gntp: GntpConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Verbose diagnostics (also enabled by `DEBUG=1`)
    pub debug: bool,
}

/// MPD server connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MpdConfig {
    pub host: String,

    /// Accepts `6600` or `"6600"`
    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,

    /// Connect and request timeout in seconds
    pub timeout: u64,

    pub password: Option<String>,
}

impl Default for MpdConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6600,
            timeout: 10,
            password: None,
        }
    }
}

impl MpdConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// GNTP/Growl notification server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GntpConfig {
    pub host: String,

    /// Accepts `23053` or `"23053"`
    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,

    pub password: Option<String>,

    /// Icon delivery: binary, dataurl, fileurl or httpurl
    pub icon_mode: String,
}

impl Default for GntpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: gntp::DEFAULT_PORT,
            password: None,
            icon_mode: "binary".to_string(),
        }
    }
}

fn deserialize_port<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port: {}", text))),
    }
}

/// Default config file location: `<config_dir>/mpdnotify/mpdnotify.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mpdnotify").join("mpdnotify.toml"))
}

impl Config {
    /// Resolve the effective configuration: file, then environment, then flags
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = Self::load(cli.config.as_ref())?;
        config.apply_env();
        config.apply_cli(cli);
        debug!(?config, "Config::resolve: resolved");
        Ok(config)
    }

    /// Load configuration with fallback chain
    ///
    /// An explicit path that does not exist yields defaults with a warning;
    /// a file that exists but does not parse is an error.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            if !path.exists() {
                warn!("Config file {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        if let Some(user_config) = default_config_path()
            && user_config.exists()
        {
            return Self::load_from_file(&user_config)
                .context(format!("Failed to load config from {}", user_config.display()));
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let path = config_path.cloned().or_else(default_config_path)?;
        let content = fs::read_to_string(path).ok()?;
        toml::from_str::<Self>(&content).ok()?.log_level
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("MPD_HOST").filter(|h| !h.is_empty()) {
            debug!(%host, "Config::apply_env_with: MPD_HOST");
            self.mpd.host = host;
        }

        if let Some(port) = lookup("MPD_PORT").filter(|p| !p.is_empty()) {
            match port.trim().parse() {
                Ok(port) => self.mpd.port = port,
                Err(_) => warn!(%port, "Ignoring invalid MPD_PORT"),
            }
        }

        if let Some(timeout) = lookup("MPD_TIMEOUT").filter(|t| !t.is_empty()) {
            match timeout.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.mpd.timeout = secs,
                _ => warn!(%timeout, "Ignoring invalid MPD_TIMEOUT"),
            }
        }

        if lookup("DEBUG").as_deref() == Some("1") {
            self.debug = true;
        }
    }

    /// Apply command-line overrides
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(host) = &cli.mpd_host {
            self.mpd.host = host.clone();
        }
        if let Some(port) = cli.mpd_port {
            self.mpd.port = port;
        }
        if let Some(timeout) = cli.mpd_timeout {
            self.mpd.timeout = timeout;
        }
        if let Some(password) = &cli.mpd_password {
            self.mpd.password = Some(password.clone());
        }
        if let Some(host) = &cli.gntp_host {
            self.gntp.host = host.clone();
        }
        if let Some(port) = cli.gntp_port {
            self.gntp.port = port;
        }
        if let Some(password) = &cli.gntp_password {
            self.gntp.password = Some(password.clone());
        }
        if let Some(mode) = &cli.icon_mode {
            self.gntp.icon_mode = mode.clone();
        }
        if let Some(level) = &cli.log_level {
            self.log_level = Some(level.clone());
        }
        if cli.debug {
            self.debug = true;
        }
    }
}
