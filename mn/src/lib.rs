//! mpdnotify - MPD watcher with GNTP/Growl notifications
//!
//! Keeps a session open to an MPD server, subscribes to player and mixer
//! changes, prints a now-playing block on the console and sends Growl
//! notifications (with cover art) when the song or the player state changes.
//! Lost connections are re-established with linear backoff.
//!
//! # Modules
//!
//! - [`mpd`] - MPD protocol client and session traits
//! - [`watcher`] - `idle` subscription with owned pump and drain tasks
//! - [`tracker`] - Song/state transition detection
//! - [`format`] - Notification and console text
//! - [`console`] - Terminal output
//! - [`notify`] - Notification sink trait and the GNTP implementation
//! - [`monitor`] - Status checks and the reconnection supervisor
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod console;
pub mod format;
pub mod monitor;
pub mod mpd;
pub mod notify;
pub mod tracker;
pub mod watcher;

pub use config::Config;
pub use monitor::{Monitor, Supervisor, SupervisorError, SupervisorSettings, TcpConnector};
pub use mpd::{MpdClient, MpdError};
pub use notify::{GntpNotifier, Notifier, NotifyError};
pub use tracker::{TrackerState, Transition};
