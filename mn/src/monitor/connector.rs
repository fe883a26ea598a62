//! How the supervisor opens daemon sessions

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::MpdConfig;
use crate::mpd::{MpdClient, MpdError, PlayerSession};
use crate::watcher::{EventWatcher, WATCHED_SUBSYSTEMS};

/// Opens the two halves of a daemon connection
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: PlayerSession + 'static;

    /// Request/response session used for pings and status checks
    async fn connect(&self) -> Result<Self::Session, MpdError>;

    /// Separate subscription for change events
    async fn open_watcher(&self) -> Result<EventWatcher, MpdError>;

    /// `host:port` for logs and the banner
    fn address(&self) -> String;
}

/// Connector for a real MPD server over TCP
#[derive(Debug, Clone)]
pub struct TcpConnector {
    host: String,
    port: u16,
    timeout: Duration,
    password: Option<String>,
}

impl TcpConnector {
    pub fn new(config: &MpdConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            timeout: config.timeout(),
            password: config.password.clone().filter(|p| !p.is_empty()),
        }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Session = MpdClient;

    async fn connect(&self) -> Result<MpdClient, MpdError> {
        debug!(host = %self.host, port = self.port, "TcpConnector::connect: called");
        MpdClient::connect(&self.host, self.port, self.timeout, self.password.as_deref()).await
    }

    async fn open_watcher(&self) -> Result<EventWatcher, MpdError> {
        debug!(host = %self.host, port = self.port, "TcpConnector::open_watcher: called");
        EventWatcher::open(
            &self.host,
            self.port,
            self.timeout,
            self.password.as_deref(),
            &WATCHED_SUBSYSTEMS,
        )
        .await
    }

    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_connector_from_config() {
        let config = MpdConfig {
            host: "music.lan".to_string(),
            port: 6601,
            timeout: 3,
            password: Some(String::new()),
        };
        let connector = TcpConnector::new(&config);
        assert_eq!(connector.address(), "music.lan:6601");
        assert_eq!(connector.timeout, Duration::from_secs(3));
        assert!(connector.password.is_none());
    }

    #[tokio::test]
    async fn test_tcp_connector_refused() {
        // Grab a free port, then close it so nothing is listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = MpdConfig {
            host: "127.0.0.1".to_string(),
            port,
            timeout: 1,
            password: None,
        };
        let err = TcpConnector::new(&config).connect().await.err().unwrap();
        assert!(err.is_transient());
    }
}
