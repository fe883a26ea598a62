//! Snapshots of daemon state returned by the session client

use std::fmt;

/// Player state as reported in the `state` field of `status`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    Play,
    Pause,
    Stop,
    /// Any state string this crate does not know about
    Other(String),
    /// Nothing observed yet
    #[default]
    Unknown,
}

impl PlaybackState {
    pub fn parse(s: &str) -> Self {
        match s {
            "play" => PlaybackState::Play,
            "pause" => PlaybackState::Pause,
            "stop" => PlaybackState::Stop,
            "" => PlaybackState::Unknown,
            other => PlaybackState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PlaybackState::Play => "play",
            PlaybackState::Pause => "pause",
            PlaybackState::Stop => "stop",
            PlaybackState::Other(s) => s,
            PlaybackState::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, PlaybackState::Unknown)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Play)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the `status` command, reduced to the fields the monitor uses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    /// Zero-based index of the current song in the queue
    pub song_position: Option<u32>,
    pub playlist_length: u32,
    /// Seconds, as sent by the daemon (may be fractional)
    pub elapsed: String,
    /// `samplerate:bits:channels`
    pub audio: Option<String>,
    /// Instantaneous bitrate in kbps
    pub bitrate: Option<String>,
}

/// Result of the `currentsong` command
///
/// The file path is the identity of a track; an empty path means nothing is queued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInfo {
    pub file: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub track: Option<String>,
    /// Seconds, as sent by the daemon (may be fractional)
    pub duration: String,
}

impl TrackInfo {
    pub fn is_empty(&self) -> bool {
        self.file.is_empty()
    }

    /// Title, or the file path when the track carries no title tag
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() { &self.file } else { &self.title }
    }
}

/// Cover art bytes with a sniffed MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub data: Vec<u8>,
    pub mime: &'static str,
}

const PNG_MAGIC: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];

impl Artwork {
    /// The daemon does not report a content type: PNG if the magic matches, JPEG otherwise
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let mime = if data.len() > 8 && data.starts_with(&PNG_MAGIC) {
            "image/png"
        } else {
            "image/jpeg"
        };
        Self { data, mime }
    }
}
