//! Line-level pieces of the MPD text protocol

use super::error::MpdError;
use super::types::{PlaybackState, PlaybackStatus, TrackInfo};

/// Response pairs in the order the daemon sent them
pub type Pairs = Vec<(String, String)>;

/// Check the `OK MPD <version>` greeting and return the version
pub fn parse_greeting(line: &str) -> Result<String, MpdError> {
    line.trim_end()
        .strip_prefix("OK MPD ")
        .map(str::to_string)
        .ok_or_else(|| MpdError::Protocol(format!("unexpected greeting: {}", line.trim_end())))
}

/// Quote a command argument
pub fn quote(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    for c in arg.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Parse `ACK [code@index] {command} message`
pub fn parse_ack(line: &str) -> Option<MpdError> {
    let rest = line.trim_end().strip_prefix("ACK ")?;
    let (codes, rest) = rest.strip_prefix('[')?.split_once(']')?;
    let (code, index) = codes.split_once('@')?;
    let (command, message) = rest.trim_start().strip_prefix('{')?.split_once('}')?;
    Some(MpdError::Ack {
        code: code.parse().ok()?,
        index: index.parse().ok()?,
        command: command.to_string(),
        message: message.trim().to_string(),
    })
}

/// Split a `key: value` line
pub fn parse_pair(line: &str) -> Option<(&str, &str)> {
    line.trim_end_matches(['\r', '\n']).split_once(": ")
}

/// First value for `key`
pub fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

pub fn status_from_pairs(pairs: &[(String, String)]) -> PlaybackStatus {
    PlaybackStatus {
        state: lookup(pairs, "state").map(PlaybackState::parse).unwrap_or_default(),
        song_position: lookup(pairs, "song").and_then(|v| v.parse().ok()),
        playlist_length: lookup(pairs, "playlistlength")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        elapsed: lookup(pairs, "elapsed").unwrap_or_default().to_string(),
        audio: lookup(pairs, "audio").map(str::to_string),
        bitrate: lookup(pairs, "bitrate").map(str::to_string),
    }
}

pub fn track_from_pairs(pairs: &[(String, String)]) -> TrackInfo {
    let text = |key: &str| lookup(pairs, key).unwrap_or_default().to_string();
    TrackInfo {
        file: text("file"),
        title: text("Title"),
        artist: text("Artist"),
        album: text("Album"),
        track: lookup(pairs, "Track").filter(|v| !v.is_empty()).map(str::to_string),
        duration: lookup(pairs, "duration")
            .or_else(|| lookup(pairs, "Time"))
            .unwrap_or_default()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Pairs {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_parse_greeting() {
        assert_eq!(parse_greeting("OK MPD 0.23.5\n").unwrap(), "0.23.5");
        assert!(matches!(parse_greeting("HTTP/1.1 400\n"), Err(MpdError::Protocol(_))));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a b"), "\"a b\"");
        assert_eq!(quote(r#"say "hi"\now"#), r#""say \"hi\"\\now""#);
    }

    #[test]
    fn test_parse_ack() {
        match parse_ack("ACK [50@0] {readpicture} No such file\n") {
            Some(MpdError::Ack {
                code,
                index,
                command,
                message,
            }) => {
                assert_eq!(code, 50);
                assert_eq!(index, 0);
                assert_eq!(command, "readpicture");
                assert_eq!(message, "No such file");
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(parse_ack("OK\n").is_none());
        assert!(parse_ack("ACK garbage").is_none());
    }

    #[test]
    fn test_parse_pair_keeps_colons_in_value() {
        assert_eq!(parse_pair("audio: 44100:16:2\n"), Some(("audio", "44100:16:2")));
        assert_eq!(parse_pair("OK"), None);
    }

    #[test]
    fn test_status_from_pairs() {
        let status = status_from_pairs(&pairs(&[
            ("volume", "80"),
            ("state", "play"),
            ("song", "3"),
            ("playlistlength", "12"),
            ("elapsed", "61.204"),
            ("bitrate", "320"),
            ("audio", "44100:16:2"),
        ]));
        assert_eq!(status.state, PlaybackState::Play);
        assert_eq!(status.song_position, Some(3));
        assert_eq!(status.playlist_length, 12);
        assert_eq!(status.elapsed, "61.204");
        assert_eq!(status.audio.as_deref(), Some("44100:16:2"));
        assert_eq!(status.bitrate.as_deref(), Some("320"));
    }

    #[test]
    fn test_status_from_stopped_pairs() {
        let status = status_from_pairs(&pairs(&[("state", "stop"), ("playlistlength", "0")]));
        assert_eq!(status.state, PlaybackState::Stop);
        assert_eq!(status.song_position, None);
        assert!(status.audio.is_none());
        assert!(status.elapsed.is_empty());
    }

    #[test]
    fn test_track_from_pairs() {
        let track = track_from_pairs(&pairs(&[
            ("file", "Artist/Album/01.flac"),
            ("Title", "Intro"),
            ("Artist", "Someone"),
            ("Album", "Record"),
            ("Track", "1"),
            ("Time", "200"),
            ("duration", "199.853"),
        ]));
        assert_eq!(track.file, "Artist/Album/01.flac");
        assert_eq!(track.title, "Intro");
        assert_eq!(track.track.as_deref(), Some("1"));
        assert_eq!(track.duration, "199.853");
    }

    #[test]
    fn test_track_duration_falls_back_to_time() {
        let track = track_from_pairs(&pairs(&[("file", "a.mp3"), ("Time", "135")]));
        assert_eq!(track.duration, "135");
        assert!(track.track.is_none());
        assert!(track.title.is_empty());
    }
}
