//! Notification sink
//!
//! The monitor hands finished notifications to a [`Notifier`]. Delivery
//! problems are reported back as [`NotifyError`] so the caller can log them;
//! they never stop monitoring.

mod growl;

#[cfg(test)]
pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::mpd::Artwork;

pub use self::growl::GntpNotifier;

/// Application name announced to the notification server
pub const APP_NAME: &str = "MPD Monitor";

/// Registered notification categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    SongChange,
    PlayerState,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 2] = [NotificationKind::SongChange, NotificationKind::PlayerState];

    pub fn name(&self) -> &'static str {
        match self {
            NotificationKind::SongChange => "song_change",
            NotificationKind::PlayerState => "player_state",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NotificationKind::SongChange => "Song Changed",
            NotificationKind::PlayerState => "Player State",
        }
    }
}

/// A finished notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub icon: Option<Artwork>,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("GNTP error: {0}")]
    Gntp(#[from] gntp::GntpError),

    #[error("Notification sink unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce the application and both notification kinds
    async fn register(&self) -> Result<(), NotifyError>;

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Where notifications go, for the startup banner
    fn address(&self) -> String;

    /// Icon delivery mode, for the startup banner
    fn icon_mode(&self) -> String;
}

/// Register with the sink; on failure notifications stay off for the whole run
pub async fn register_or_disable(notifier: Arc<dyn Notifier>, debug: bool) -> Option<Arc<dyn Notifier>> {
    debug!(address = %notifier.address(), "register_or_disable: called");
    match notifier.register().await {
        Ok(()) => Some(notifier),
        Err(e) => {
            if debug {
                warn!(error = %e, "Failed to register with GNTP");
            } else {
                debug!(error = %e, "Failed to register with GNTP");
            }
            warn!("GNTP/Growl not available - notifications disabled");
            None
        }
    }
}
