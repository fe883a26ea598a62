//! CLI definition

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use crate::config::default_config_path;

/// mpdnotify - MPD watcher with GNTP/Growl notifications
#[derive(Debug, Parser)]
#[command(
    name = "mn",
    about = "Watch an MPD server and announce song and player-state changes via GNTP/Growl",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// MPD host (overrides MPD_HOST)
    #[arg(long, value_name = "HOST")]
    pub mpd_host: Option<String>,

    /// MPD port (overrides MPD_PORT)
    #[arg(long, value_name = "PORT")]
    pub mpd_port: Option<u16>,

    /// MPD connect and request timeout in seconds (overrides MPD_TIMEOUT)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub mpd_timeout: Option<u64>,

    /// MPD password
    #[arg(long, value_name = "PASSWORD")]
    pub mpd_password: Option<String>,

    /// GNTP/Growl host
    #[arg(long, value_name = "HOST")]
    pub gntp_host: Option<String>,

    /// GNTP/Growl port
    #[arg(long, value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub gntp_port: Option<u16>,

    /// GNTP/Growl password
    #[arg(long, value_name = "PASSWORD")]
    pub gntp_password: Option<String>,

    /// Icon delivery: binary, dataurl, fileurl, httpurl
    #[arg(long, value_name = "MODE")]
    pub icon_mode: Option<String>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Verbose diagnostics (same as DEBUG=1)
    #[arg(short, long)]
    pub debug: bool,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mpdnotify")
        .join("logs")
        .join("mpdnotify.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with config and log locations
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let mut help = String::new();

    help.push_str("Environment:\n");
    help.push_str("  MPD_HOST, MPD_PORT, MPD_TIMEOUT  override the config file\n");
    help.push_str("  DEBUG=1                          enable debug diagnostics\n");

    help.push('\n');
    match default_config_path() {
        Some(path) => {
            let icon = if path.exists() { "\u{2705}" } else { "\u{274C}" };
            help.push_str(&format!("Config file: {} {}\n", icon, path.display()));
        }
        None => help.push_str("Config file: unavailable\n"),
    }

    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}
