//! One status check: fetch, compare, print, notify

use std::sync::Arc;

use tracing::{debug, warn};

use crate::console::{Console, ConsoleOutput};
use crate::format::{song_notification, state_notification};
use crate::mpd::{MpdError, PlayerSession};
use crate::notify::{Notification, NotificationKind, Notifier};
use crate::tracker::{TrackerState, Transition};

/// What a single check observed and did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub transition: Transition,
    pub console: ConsoleOutput,
    pub notified: Vec<NotificationKind>,
}

/// Everything a status check needs besides the session
///
/// Owned by the supervisor for the whole run, so the tracker memory
/// carries across reconnects.
pub struct Monitor {
    tracker: TrackerState,
    notifier: Option<Arc<dyn Notifier>>,
    console: Console,
    debug: bool,
}

impl Monitor {
    /// `notifier` is `None` when notifications are disabled
    pub fn new(notifier: Option<Arc<dyn Notifier>>, console: Console, debug: bool) -> Self {
        Self {
            tracker: TrackerState::new(),
            notifier,
            console,
            debug,
        }
    }

    pub fn tracker(&self) -> &TrackerState {
        &self.tracker
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifier.is_some()
    }

    /// Print a one-line message on the console
    pub fn notice(&mut self, message: &str) {
        self.console.notice(message);
    }

    /// Run one status check against `session`
    ///
    /// Session errors are returned unchanged; notification failures are only logged.
    pub async fn check<S: PlayerSession>(&mut self, session: &mut S) -> Result<CheckReport, MpdError> {
        debug!("Monitor::check: called");
        session.ping().await?;
        let status = session.status().await?;
        let track = session.current_track().await?;

        let transition = self.tracker.evaluate(&status, &track);
        let playing = status.state.is_playing();

        let console = if playing && !track.is_empty() {
            self.console.now_playing(&track, &status);
            ConsoleOutput::NowPlaying
        } else if transition.state_changed {
            self.console.state_line(&status.state);
            ConsoleOutput::StateLine
        } else {
            ConsoleOutput::Nothing
        };

        let mut notified = Vec::new();
        let Some(notifier) = self.notifier.clone() else {
            return Ok(CheckReport {
                transition,
                console,
                notified,
            });
        };

        let send_song = transition.song_changed && playing;
        let send_state = transition.state_changed;
        let wants_artwork = !track.file.is_empty() && (send_song || send_state);
        let artwork = if wants_artwork {
            session.fetch_artwork(&track.file).await
        } else {
            None
        };
        debug!(send_song, send_state, has_artwork = artwork.is_some(), "Monitor::check: notifications");

        if send_song {
            let notification = song_notification(&track, &status, artwork.clone());
            if deliver(notifier.as_ref(), &notification, self.debug).await {
                notified.push(NotificationKind::SongChange);
            }
        }

        if send_state {
            let notification = state_notification(&track, &status, artwork);
            if deliver(notifier.as_ref(), &notification, self.debug).await {
                notified.push(NotificationKind::PlayerState);
            }
        }

        Ok(CheckReport {
            transition,
            console,
            notified,
        })
    }
}

/// Send one notification; failures are logged and reported as `false`
async fn deliver(notifier: &dyn Notifier, notification: &Notification, verbose: bool) -> bool {
    match notifier.notify(notification).await {
        Ok(()) => true,
        Err(e) => {
            if verbose {
                warn!(kind = notification.kind.name(), error = %e, "Failed to send notification");
            } else {
                debug!(kind = notification.kind.name(), error = %e, "Failed to send notification");
            }
            false
        }
    }
}
