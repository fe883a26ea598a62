//! Terminal output: now-playing block, state line, separators and banner

use std::io::Write;

use colored::{ColoredString, Colorize};
use tracing::debug;

use crate::format::NowPlaying;
use crate::mpd::{PlaybackState, PlaybackStatus, TrackInfo};

/// Width used when the terminal size cannot be determined
const FALLBACK_WIDTH: usize = 80;

/// What a status check put on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOutput {
    NowPlaying,
    StateLine,
    Nothing,
}

/// Startup facts shown in the banner
#[derive(Debug, Clone)]
pub struct Banner {
    pub mpd_address: String,
    /// Notification server address and icon mode, `None` when disabled
    pub notifications: Option<(String, String)>,
    pub debug: bool,
}

pub struct Console {
    out: Box<dyn Write + Send>,
    width: Option<usize>,
}

impl Console {
    pub fn stdout() -> Self {
        Self {
            out: Box::new(std::io::stdout()),
            width: None,
        }
    }

    /// Console over any writer with a fixed width
    pub fn with_writer(out: Box<dyn Write + Send>, width: usize) -> Self {
        Self {
            out,
            width: Some(width),
        }
    }

    fn width(&self) -> usize {
        self.width.unwrap_or_else(terminal_width)
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            debug!(error = %e, "Console::emit: write failed");
        }
    }

    fn separator(&self) -> String {
        "─".repeat(self.width())
    }

    /// Blank line, colored track block, separator
    pub fn now_playing(&mut self, track: &TrackInfo, status: &PlaybackStatus) {
        let np = NowPlaying::new(track, status);
        let mut lines: Vec<ColoredString> = vec![
            format!("▶ {}", np.heading()).bright_cyan(),
            format!("  🕓 {}", np.times()).bright_cyan(),
        ];
        if !np.artist.is_empty() {
            lines.push(format!("  🎤 {}", np.artist).bright_yellow());
        }
        if !np.album.is_empty() {
            lines.push(format!("  💿 {}", np.album).truecolor(255, 175, 135));
        }
        lines.push(format!("  🎵 {}", np.bitrate).bright_blue());
        lines.push(format!("  📁 {}", np.file).bright_green());

        let mut text = String::from("\n");
        for line in lines {
            text.push_str(&line.to_string());
            text.push('\n');
        }
        text.push_str(&self.separator());
        text.push('\n');
        self.emit(&text);
    }

    /// Compact line for non-playing state changes
    pub fn state_line(&mut self, state: &PlaybackState) {
        let text = format!("⏸  State: {}\n{}\n", state, self.separator());
        self.emit(&text);
    }

    pub fn notice(&mut self, message: &str) {
        self.emit(&format!("{}\n", message));
    }

    pub fn banner(&mut self, banner: &Banner) {
        let mut text = String::new();
        text.push_str("🎵 MPD Monitor started\n");
        text.push_str(&format!("📡 Monitoring: {}\n", banner.mpd_address));
        match &banner.notifications {
            Some((address, icon_mode)) => {
                text.push_str(&format!("📢 GNTP Server: {}\n", address));
                text.push_str(&format!("✅ GNTP registered (icon mode: {})\n", icon_mode));
            }
            None => text.push_str("📢 GNTP/Growl notifications: disabled\n"),
        }
        if banner.debug {
            text.push_str("🐛 Debug mode: enabled\n");
        }
        text.push_str(&"=".repeat(self.width()));
        text.push('\n');
        self.emit(&text);
    }
}

fn terminal_width() -> usize {
    match crossterm::terminal::size() {
        Ok((cols, _)) if cols > 0 => cols as usize,
        _ => FALLBACK_WIDTH,
    }
}
