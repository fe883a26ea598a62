//! Seams between the monitor and a live daemon connection

use async_trait::async_trait;

use super::error::MpdError;
use super::types::{Artwork, PlaybackStatus, TrackInfo};

/// Request/response half of a daemon session
///
/// Calls block until the daemon answers, the request times out or the
/// transport fails. Nothing retries internally; reconnecting is the
/// supervisor's job.
#[async_trait]
pub trait PlayerSession: Send {
    /// Liveness probe
    async fn ping(&mut self) -> Result<(), MpdError>;

    async fn status(&mut self) -> Result<PlaybackStatus, MpdError>;

    async fn current_track(&mut self) -> Result<TrackInfo, MpdError>;

    /// Embedded picture first, then external cover art; `None` when neither exists
    async fn fetch_artwork(&mut self, file: &str) -> Option<Artwork>;
}

/// Source of subsystem change notifications (MPD's `idle`)
#[async_trait]
pub trait IdleSource: Send + 'static {
    /// Wait until one of `subsystems` changes and return the changed names
    async fn idle(&mut self, subsystems: &[String]) -> Result<Vec<String>, MpdError>;
}
