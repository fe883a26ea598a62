//! GNTP client
//!
//! Every request opens a fresh TCP connection, writes one message, reads the
//! response header block and closes. That is how Growl servers expect
//! non-callback requests to be delivered.

use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::GntpError;
use crate::icon::IconMode;
use crate::message::{self, IconRef, KeyHash, Notification, NotificationType};
use crate::server::ArtworkServer;

/// Default GNTP port
pub const DEFAULT_PORT: u16 = 23053;

/// Default timeout for a single request
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for one application talking to one GNTP server
pub struct GntpClient {
    app_name: String,
    host: String,
    port: u16,
    password: Option<String>,
    icon_mode: IconMode,
    icon_dir: PathBuf,
    timeout: Duration,
    artwork_server: OnceCell<ArtworkServer>,
}

impl GntpClient {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            password: None,
            icon_mode: IconMode::default(),
            icon_dir: std::env::temp_dir().join("gntp"),
            timeout: DEFAULT_TIMEOUT,
            artwork_server: OnceCell::new(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the password; an empty string means no password
    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password.filter(|p| !p.is_empty());
        self
    }

    pub fn with_icon_mode(mut self, icon_mode: IconMode) -> Self {
        self.icon_mode = icon_mode;
        self
    }

    /// Directory used for icons in [`IconMode::FileUrl`]
    pub fn with_icon_dir(mut self, icon_dir: PathBuf) -> Self {
        self.icon_dir = icon_dir;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn icon_mode(&self) -> IconMode {
        self.icon_mode
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn key(&self) -> Option<KeyHash> {
        self.password.as_deref().map(KeyHash::generate)
    }

    /// Announce the application and its notification types
    pub async fn register(&self, types: &[NotificationType]) -> Result<(), GntpError> {
        debug!(app = %self.app_name, count = types.len(), "GntpClient::register: called");
        let key = self.key();
        let request = message::encode_register(&self.app_name, types, key.as_ref());
        let stream = self.connect().await?;
        self.exchange(stream, &request).await?;
        info!(app = %self.app_name, server = %self.address(), "Registered with GNTP server");
        Ok(())
    }

    /// Display one notification
    pub async fn notify(&self, notification: &Notification) -> Result<(), GntpError> {
        debug!(name = %notification.name, title = %notification.title, "GntpClient::notify: called");
        let key = self.key();
        let stream = self.connect().await?;

        let url = match (&notification.icon, self.icon_mode) {
            (None, _) | (Some(_), IconMode::Binary) => None,
            (Some(icon), IconMode::DataUrl) => Some(icon.data_url()),
            (Some(icon), IconMode::FileUrl) => Some(icon.write_file_url(&self.icon_dir)?),
            (Some(icon), IconMode::HttpUrl) => {
                let server = self.artwork_server.get_or_try_init(ArtworkServer::start).await?;
                Some(server.publish(icon, stream.local_addr()?))
            }
        };

        let icon_ref = match (&notification.icon, url.as_deref()) {
            (_, Some(url)) => Some(IconRef::Url(url)),
            (Some(icon), None) => Some(IconRef::Inline(icon)),
            (None, None) => None,
        };

        let request = message::encode_notify(&self.app_name, notification, icon_ref, key.as_ref());
        self.exchange(stream, &request).await
    }

    async fn connect(&self) -> Result<TcpStream, GntpError> {
        debug!(host = %self.host, port = self.port, "GntpClient::connect: called");
        let stream = tokio::time::timeout(self.timeout, TcpStream::connect((self.host.as_str(), self.port)))
            .await
            .map_err(|_| GntpError::Timeout(self.timeout))??;
        Ok(stream)
    }

    /// Write a request and read the response header block
    async fn exchange(&self, stream: TcpStream, request: &[u8]) -> Result<(), GntpError> {
        tokio::time::timeout(self.timeout, async {
            let (reader, mut writer) = stream.into_split();
            writer.write_all(request).await?;
            writer.flush().await?;

            let mut reader = BufReader::new(reader);
            let mut response = String::new();
            loop {
                let mut line = String::new();
                let n = reader.read_line(&mut line).await?;
                if n == 0 || (line.trim().is_empty() && !response.is_empty()) {
                    break;
                }
                response.push_str(&line);
            }
            debug!(response = %response.trim_end(), "GntpClient::exchange: received response");
            message::parse_response(&response)
        })
        .await
        .map_err(|_| GntpError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::Icon;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// Accept `count` requests, answer each with `response`, forward raw requests
    async fn mock_server(count: usize, response: &'static str) -> (u16, mpsc::Receiver<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = mpsc::channel(8);

        tokio::spawn(async move {
            for _ in 0..count {
                let (mut stream, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                // Requests end with a blank line; inline resources end with one too
                loop {
                    let n = stream.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.ends_with(b"\r\n\r\n") {
                        break;
                    }
                }
                stream.write_all(response.as_bytes()).await.unwrap();
                tx.send(buf).await.unwrap();
            }
        });

        (port, rx)
    }

    fn client(port: u16) -> GntpClient {
        GntpClient::new("MPD Monitor")
            .with_host("127.0.0.1")
            .with_port(port)
            .with_timeout(Duration::from_secs(2))
    }

    #[test]
    fn test_builder() {
        let client = GntpClient::new("app")
            .with_host("growl.local")
            .with_port(1234)
            .with_password(Some(String::new()))
            .with_icon_mode(IconMode::DataUrl);
        assert_eq!(client.address(), "growl.local:1234");
        assert_eq!(client.icon_mode(), IconMode::DataUrl);
        assert!(client.password.is_none());
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);
    }

    #[tokio::test]
    async fn test_register_ok() {
        let (port, mut rx) = mock_server(1, "GNTP/1.0 -OK NONE\r\nResponse-Action: REGISTER\r\n\r\n").await;
        let types = vec![NotificationType::new("song_change").with_display_name("Song Changed")];

        client(port).register(&types).await.unwrap();

        let request = String::from_utf8(rx.recv().await.unwrap()).unwrap();
        assert!(request.starts_with("GNTP/1.0 REGISTER NONE\r\n"));
        assert!(request.contains("Notification-Display-Name: Song Changed"));
    }

    #[tokio::test]
    async fn test_register_rejected() {
        let (port, _rx) = mock_server(
            1,
            "GNTP/1.0 -ERROR NONE\r\nError-Code: 400\r\nError-Description: Bad password\r\n\r\n",
        )
        .await;
        let err = client(port).register(&[]).await.unwrap_err();
        assert!(err.is_rejected());
    }

    #[tokio::test]
    async fn test_register_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = client(port).register(&[]).await.unwrap_err();
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn test_notify_with_password_and_data_url() {
        let (port, mut rx) = mock_server(1, "GNTP/1.0 -OK NONE\r\n\r\n").await;
        let client = client(port)
            .with_password(Some("secret".to_string()))
            .with_icon_mode(IconMode::DataUrl);
        let notification = Notification::new("song_change", "Song", "Body")
            .with_icon(Some(Icon::new(b"hi".to_vec(), "image/png")));

        client.notify(&notification).await.unwrap();

        let request = String::from_utf8(rx.recv().await.unwrap()).unwrap();
        assert!(request.starts_with("GNTP/1.0 NOTIFY NONE SHA256:"));
        assert!(request.contains("Notification-Icon: data:image/png;base64,aGk=\r\n"));
    }

    #[tokio::test]
    async fn test_notify_file_url() {
        let temp = tempfile::TempDir::new().unwrap();
        let (port, mut rx) = mock_server(1, "GNTP/1.0 -OK NONE\r\n\r\n").await;
        let client = client(port)
            .with_icon_mode(IconMode::FileUrl)
            .with_icon_dir(temp.path().to_path_buf());
        let notification =
            Notification::new("song_change", "Song", "Body").with_icon(Some(Icon::new(vec![1, 2], "image/jpeg")));

        client.notify(&notification).await.unwrap();

        let request = String::from_utf8(rx.recv().await.unwrap()).unwrap();
        assert!(request.contains("Notification-Icon: file://"));
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_notify_http_url_publishes_icon() {
        let (port, mut rx) = mock_server(1, "GNTP/1.0 -OK NONE\r\n\r\n").await;
        let client = client(port).with_icon_mode(IconMode::HttpUrl);
        let icon = Icon::new(vec![9, 9, 9], "image/jpeg");
        let notification = Notification::new("song_change", "Song", "Body").with_icon(Some(icon.clone()));

        client.notify(&notification).await.unwrap();

        let request = String::from_utf8(rx.recv().await.unwrap()).unwrap();
        let expected = format!("/{}\r\n", icon.identifier());
        assert!(request.contains("Notification-Icon: http://127.0.0.1:"));
        assert!(request.contains(&expected));
    }
}
