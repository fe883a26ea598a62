//! Last-known playback memory and transition detection

use tracing::debug;

use crate::mpd::{PlaybackState, PlaybackStatus, TrackInfo};

/// What changed since the previous check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    /// A different, non-empty file is current
    pub song_changed: bool,
    /// The player state differs from a previously known state
    pub state_changed: bool,
}

impl Transition {
    pub fn any(&self) -> bool {
        self.song_changed || self.state_changed
    }
}

/// Last observed file and player state
///
/// Lives for the whole process, so it survives reconnects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerState {
    last_file: String,
    last_state: PlaybackState,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_file(&self) -> &str {
        &self.last_file
    }

    pub fn last_state(&self) -> &PlaybackState {
        &self.last_state
    }

    /// Compare a fresh snapshot against memory, then remember the snapshot
    pub fn evaluate(&mut self, status: &PlaybackStatus, track: &TrackInfo) -> Transition {
        let transition = Transition {
            song_changed: !track.file.is_empty() && track.file != self.last_file,
            state_changed: self.last_state.is_known() && status.state != self.last_state,
        };
        debug!(
            file = %track.file,
            state = %status.state,
            song_changed = transition.song_changed,
            state_changed = transition.state_changed,
            "TrackerState::evaluate: called"
        );

        self.last_file = track.file.clone();
        self.last_state = status.state.clone();
        transition
    }
}
