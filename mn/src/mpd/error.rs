//! MPD session error types

use std::io::ErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the session client and the event watcher
#[derive(Debug, Error)]
pub enum MpdError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed by server")]
    Closed,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Connection unusable after an earlier failure")]
    Broken,

    #[error("Event watcher closed")]
    WatcherClosed,

    #[error("Server error [{code}@{index}] {{{command}}} {message}")]
    Ack {
        code: u32,
        index: u32,
        command: String,
        message: String,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl MpdError {
    /// Check if this is a transport failure that a fresh connection may cure
    pub fn is_transient(&self) -> bool {
        match self {
            MpdError::Io(e) => matches!(
                e.kind(),
                ErrorKind::ConnectionRefused
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::NotConnected
                    | ErrorKind::BrokenPipe
                    | ErrorKind::UnexpectedEof
                    | ErrorKind::TimedOut
                    | ErrorKind::Interrupted
                    | ErrorKind::AddrNotAvailable
                    | ErrorKind::NetworkUnreachable
                    | ErrorKind::HostUnreachable
                    | ErrorKind::NetworkDown
            ),
            MpdError::Closed => true,
            MpdError::Timeout(_) => true,
            MpdError::Broken => true,
            MpdError::WatcherClosed => true,
            MpdError::Ack { .. } => false,
            MpdError::Protocol(_) => false,
        }
    }

    /// Check if the stream may be out of sync after this error
    pub(crate) fn poisons_connection(&self) -> bool {
        !matches!(self, MpdError::Ack { .. })
    }
}
