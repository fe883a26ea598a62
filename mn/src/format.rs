//! Notification text, built from a status/track snapshot
//!
//! Everything here is pure: missing metadata turns into fallbacks, never errors.

use crate::mpd::{Artwork, PlaybackState, PlaybackStatus, TrackInfo};
use crate::notify::{Notification, NotificationKind};

/// `seconds` (possibly fractional) as `m:ss`; empty or unparsable input gives `0:00`
pub fn format_duration(seconds: &str) -> String {
    let Ok(secs) = seconds.trim().parse::<f64>() else {
        return "0:00".to_string();
    };
    if !secs.is_finite() || secs < 0.0 {
        return "0:00".to_string();
    }
    let total = secs as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Sample rate from the audio format, else bitrate, else `N/A`
pub fn format_bitrate(status: &PlaybackStatus) -> String {
    if let Some(audio) = &status.audio
        && let Some(rate) = audio.split(':').next()
        && let Ok(rate) = rate.parse::<u64>()
    {
        return format!("{} kHz", rate / 1000);
    }
    match &status.bitrate {
        Some(bitrate) => format!("{} kbps", bitrate),
        None => "N/A".to_string(),
    }
}

/// Label used as title of player-state notifications
pub fn state_label(state: &PlaybackState) -> String {
    match state {
        PlaybackState::Play => "▶ Playing".to_string(),
        PlaybackState::Pause => "⏸ Paused".to_string(),
        PlaybackState::Stop => "⏹ Stopped".to_string(),
        other => format!("State: {}", other),
    }
}

/// Display fields shared by the notification body and the console block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub position: String,
    pub total: String,
    pub track_number: String,
    pub title: String,
    pub elapsed: String,
    pub duration: String,
    pub artist: String,
    pub album: String,
    pub bitrate: String,
    pub file: String,
}

impl NowPlaying {
    pub fn new(track: &TrackInfo, status: &PlaybackStatus) -> Self {
        Self {
            position: status.song_position.map(|p| p.to_string()).unwrap_or_default(),
            total: status.playlist_length.to_string(),
            track_number: track.track.clone().unwrap_or_else(|| "?".to_string()),
            title: track.display_title().to_string(),
            elapsed: format_duration(&status.elapsed),
            duration: format_duration(&track.duration),
            artist: track.artist.clone(),
            album: track.album.clone(),
            bitrate: format_bitrate(status),
            file: track.file.clone(),
        }
    }

    /// `position/total/track. title`
    pub fn heading(&self) -> String {
        format!("{}/{}/{}. {}", self.position, self.total, self.track_number, self.title)
    }

    /// `elapsed / duration`
    pub fn times(&self) -> String {
        format!("{} / {}", self.elapsed, self.duration)
    }
}

/// Multi-line notification body
pub fn notification_body(track: &TrackInfo, status: &PlaybackStatus) -> String {
    let np = NowPlaying::new(track, status);
    let mut lines = vec![np.heading(), np.times()];
    if !np.artist.is_empty() {
        lines.push(format!("🎤 {}", np.artist));
    }
    if !np.album.is_empty() {
        lines.push(format!("💿 {}", np.album));
    }
    lines.push(format!("🎵 {}", np.bitrate));
    lines.push(format!("📁 {}", np.file));
    lines.join("\n")
}

/// Notification for a new song
pub fn song_notification(track: &TrackInfo, status: &PlaybackStatus, artwork: Option<Artwork>) -> Notification {
    Notification {
        kind: NotificationKind::SongChange,
        title: track.display_title().to_string(),
        body: notification_body(track, status),
        icon: artwork,
    }
}

/// Notification for a player-state change
///
/// While playing a track the body is the full track description, otherwise the label.
pub fn state_notification(track: &TrackInfo, status: &PlaybackStatus, artwork: Option<Artwork>) -> Notification {
    let label = state_label(&status.state);
    let body = if status.state.is_playing() && !track.is_empty() {
        notification_body(track, status)
    } else {
        label.clone()
    };
    Notification {
        kind: NotificationKind::PlayerState,
        title: label,
        body,
        icon: artwork,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> (TrackInfo, PlaybackStatus) {
        let track = TrackInfo {
            file: "Band/Record/03 - Song.flac".to_string(),
            title: "Song".to_string(),
            artist: "Band".to_string(),
            album: "Record".to_string(),
            track: Some("3".to_string()),
            duration: "241.3".to_string(),
        };
        let status = PlaybackStatus {
            state: PlaybackState::Play,
            song_position: Some(2),
            playlist_length: 10,
            elapsed: "65.9".to_string(),
            audio: Some("44100:16:2".to_string()),
            bitrate: Some("1024".to_string()),
        };
        (track, status)
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration("135"), "2:15");
        assert_eq!(format_duration("241.853"), "4:01");
        assert_eq!(format_duration("5"), "0:05");
        assert_eq!(format_duration("3600"), "60:00");
        assert_eq!(format_duration(""), "0:00");
        assert_eq!(format_duration("abc"), "0:00");
        assert_eq!(format_duration("-3"), "0:00");
    }

    #[test]
    fn test_format_bitrate() {
        let mut status = PlaybackStatus {
            audio: Some("44100:16:2".to_string()),
            ..Default::default()
        };
        assert_eq!(format_bitrate(&status), "44 kHz");

        status.audio = None;
        status.bitrate = Some("320".to_string());
        assert_eq!(format_bitrate(&status), "320 kbps");

        status.bitrate = None;
        assert_eq!(format_bitrate(&status), "N/A");

        // DSD style descriptors have no numeric sample rate
        status.audio = Some("dsd64:2".to_string());
        status.bitrate = Some("2822".to_string());
        assert_eq!(format_bitrate(&status), "2822 kbps");
    }

    #[test]
    fn test_state_label() {
        assert_eq!(state_label(&PlaybackState::Play), "▶ Playing");
        assert_eq!(state_label(&PlaybackState::Pause), "⏸ Paused");
        assert_eq!(state_label(&PlaybackState::Stop), "⏹ Stopped");
        assert_eq!(
            state_label(&PlaybackState::Other("seeking".to_string())),
            "State: seeking"
        );
    }

    #[test]
    fn test_full_body() {
        let (track, status) = playing();
        assert_eq!(
            notification_body(&track, &status),
            "2/10/3. Song\n1:05 / 4:01\n🎤 Band\n💿 Record\n🎵 44 kHz\n📁 Band/Record/03 - Song.flac"
        );
    }

    #[test]
    fn test_body_fallbacks() {
        let track = TrackInfo {
            file: "loose/file.mp3".to_string(),
            ..Default::default()
        };
        let status = PlaybackStatus {
            state: PlaybackState::Play,
            playlist_length: 1,
            song_position: Some(0),
            ..Default::default()
        };
        let body = notification_body(&track, &status);

        assert!(body.starts_with("0/1/?. loose/file.mp3\n"));
        assert!(!body.contains("🎤"));
        assert!(!body.contains("💿"));
        assert!(body.contains("0:00 / 0:00"));
        assert!(body.contains("🎵 N/A"));
    }

    #[test]
    fn test_song_notification() {
        let (track, status) = playing();
        let artwork = Artwork::from_bytes(vec![0xFF; 16]);
        let n = song_notification(&track, &status, Some(artwork.clone()));
        assert_eq!(n.kind, NotificationKind::SongChange);
        assert_eq!(n.title, "Song");
        assert_eq!(n.icon, Some(artwork));
    }

    #[test]
    fn test_state_notification_body() {
        let (track, mut status) = playing();
        let n = state_notification(&track, &status, None);
        assert_eq!(n.kind, NotificationKind::PlayerState);
        assert_eq!(n.title, "▶ Playing");
        assert!(n.body.starts_with("2/10/3. Song"));

        status.state = PlaybackState::Pause;
        let n = state_notification(&track, &status, None);
        assert_eq!(n.title, "⏸ Paused");
        assert_eq!(n.body, "⏸ Paused");
    }
}
