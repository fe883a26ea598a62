//! Daemon change notifications

mod event_watcher;

pub use event_watcher::{EventWatcher, WATCHED_SUBSYSTEMS};
