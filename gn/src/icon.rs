//! Notification icons and the ways they can be delivered to the server

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use url::Url;

/// Cover files kept by [`Icon::write_file_url`]
pub const MAX_COVER_FILES: usize = 16;

const COVER_PREFIX: &str = "cover-";

/// How icon bytes reach the GNTP server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconMode {
    /// Inline binary resource referenced by `x-growl-resource://` (works everywhere)
    #[default]
    Binary,
    /// `data:` URL embedded in the header
    DataUrl,
    /// Image written to a local file and referenced by `file://` URL
    FileUrl,
    /// Image served by a built-in HTTP server
    HttpUrl,
}

impl IconMode {
    /// Parse a mode name, falling back to [`IconMode::Binary`] for anything unknown
    pub fn parse_lenient(s: &str) -> Self {
        debug!(%s, "IconMode::parse_lenient: called");
        match s.parse() {
            Ok(mode) => mode,
            Err(_) => {
                warn!(mode = %s, "Unknown icon mode, falling back to binary");
                IconMode::Binary
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IconMode::Binary => "binary",
            IconMode::DataUrl => "dataurl",
            IconMode::FileUrl => "fileurl",
            IconMode::HttpUrl => "httpurl",
        }
    }
}

impl FromStr for IconMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "binary" => Ok(IconMode::Binary),
            "dataurl" => Ok(IconMode::DataUrl),
            "fileurl" => Ok(IconMode::FileUrl),
            "httpurl" => Ok(IconMode::HttpUrl),
            _ => Err(format!("Unknown icon mode: {}", s)),
        }
    }
}

impl fmt::Display for IconMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image bytes attached to a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub data: Vec<u8>,
    pub mime: String,
}

impl Icon {
    pub fn new(data: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            data,
            mime: mime.into(),
        }
    }

    /// Content identifier: lowercase hex SHA-256 of the bytes
    pub fn identifier(&self) -> String {
        format!("{:x}", Sha256::digest(&self.data))
    }

    /// File extension matching the MIME type
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "jpg",
        }
    }

    /// `data:<mime>;base64,...` URL for the image
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }

    /// Write the image below `dir` (named by content) and return its `file://` URL
    ///
    /// Only the newest [`MAX_COVER_FILES`] covers are kept in `dir`.
    pub fn write_file_url(&self, dir: &Path) -> std::io::Result<String> {
        debug!(dir = %dir.display(), "Icon::write_file_url: called");
        std::fs::create_dir_all(dir)?;
        let dir = std::path::absolute(dir)?;
        let path: PathBuf = dir.join(format!("{}{}.{}", COVER_PREFIX, self.identifier(), self.extension()));
        // Rewriting refreshes the mtime so a reused cover is not pruned first
        std::fs::write(&path, &self.data)?;
        prune_covers(&dir, &path)?;

        let url = Url::from_file_path(&path).map_err(|()| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("cannot express {} as a file URL", path.display()),
            )
        })?;
        Ok(url.into())
    }
}

/// Remove the oldest `cover-*` files in `dir` beyond [`MAX_COVER_FILES`], never `keep`
fn prune_covers(dir: &Path, keep: &Path) -> std::io::Result<()> {
    let mut covers: Vec<(SystemTime, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(COVER_PREFIX))
        .map(|entry| entry.path())
        .filter(|path| path != keep)
        .filter_map(|path| {
            let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok()?;
            Some((modified, path))
        })
        .collect();

    let excess = (covers.len() + 1).saturating_sub(MAX_COVER_FILES);
    if excess == 0 {
        return Ok(());
    }
    covers.sort();
    for (_, path) in covers.into_iter().take(excess) {
        debug!(path = %path.display(), "Icon::write_file_url: pruning cover");
        if let Err(e) = std::fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "Failed to remove old cover");
        }
    }
    Ok(())
}
