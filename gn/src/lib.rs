//! gntp - minimal Growl Notification Transport Protocol client
//!
//! Supports what a notifying application needs: registering the application
//! with its notification types and sending notifications, optionally with an
//! icon delivered inline, as a data URL, as a local file or over HTTP.
//!
//! # Modules
//!
//! - [`client`] - Request/response client
//! - [`message`] - GNTP/1.0 encoding and response parsing
//! - [`icon`] - Icons and icon delivery modes
//! - [`server`] - HTTP server for `httpurl` icons

pub mod client;
pub mod error;
pub mod icon;
pub mod message;
pub mod server;

pub use client::{DEFAULT_PORT, GntpClient};
pub use error::GntpError;
pub use icon::{Icon, IconMode};
pub use message::{KeyHash, Notification, NotificationType};
pub use server::ArtworkServer;
