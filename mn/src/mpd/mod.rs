//! MPD session client
//!
//! Speaks the small part of the MPD protocol the monitor needs: `status`,
//! `currentsong`, `ping`, `idle`, `readpicture` and `albumart`.

mod client;
mod error;
mod protocol;
mod session;
mod types;

#[cfg(test)]
pub mod mock;

pub use client::MpdClient;
pub use error::MpdError;
pub use session::{IdleSource, PlayerSession};
pub use types::{Artwork, PlaybackState, PlaybackStatus, TrackInfo};
