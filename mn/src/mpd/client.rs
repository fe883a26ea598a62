//! TCP client for the MPD text protocol
//!
//! One connection, one request in flight. After a transport error, a timeout
//! or a malformed response the stream may be out of sync, so the client
//! marks itself broken and every later call fails fast with
//! [`MpdError::Broken`].

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::debug;

use super::error::MpdError;
use super::protocol::{self, Pairs};
use super::session::{IdleSource, PlayerSession};
use super::types::{Artwork, PlaybackStatus, TrackInfo};

/// Largest picture accepted from the daemon
const MAX_ARTWORK_SIZE: usize = 32 * 1024 * 1024;

/// A parsed response: key/value pairs plus an optional binary payload
type Response = (Pairs, Option<Vec<u8>>);

pub struct MpdClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    timeout: Duration,
    version: String,
    broken: bool,
}

impl MpdClient {
    /// Connect, read the greeting and authenticate if a password is given
    pub async fn connect(host: &str, port: u16, timeout: Duration, password: Option<&str>) -> Result<Self, MpdError> {
        debug!(%host, port, ?timeout, "MpdClient::connect: called");
        let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| MpdError::Timeout(timeout))??;
        stream.set_nodelay(true)?;

        let (reader, writer) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(reader),
            writer,
            timeout,
            version: String::new(),
            broken: false,
        };

        let greeting = tokio::time::timeout(timeout, client.read_line())
            .await
            .map_err(|_| MpdError::Timeout(timeout))??;
        client.version = protocol::parse_greeting(&greeting)?;
        debug!(version = %client.version, "MpdClient::connect: greeting received");

        if let Some(password) = password.filter(|p| !p.is_empty()) {
            debug!("MpdClient::connect: sending password");
            client.command(&format!("password {}", protocol::quote(password))).await?;
        }

        Ok(client)
    }

    /// Protocol version announced by the daemon
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    async fn read_line(&mut self) -> Result<String, MpdError> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(MpdError::Closed);
        }
        Ok(line)
    }

    async fn read_response(&mut self) -> Result<Response, MpdError> {
        let mut pairs = Pairs::new();
        let mut binary = None;
        loop {
            let line = self.read_line().await?;
            if line == "OK\n" {
                return Ok((pairs, binary));
            }
            if line.starts_with("ACK ") {
                return Err(protocol::parse_ack(&line)
                    .unwrap_or_else(|| MpdError::Protocol(format!("malformed ACK: {}", line.trim_end()))));
            }
            let (key, value) = protocol::parse_pair(&line)
                .ok_or_else(|| MpdError::Protocol(format!("unexpected line: {}", line.trim_end())))?;

            if key == "binary" {
                let len: usize = value
                    .parse()
                    .map_err(|_| MpdError::Protocol(format!("bad binary length: {}", value)))?;
                if len > MAX_ARTWORK_SIZE {
                    return Err(MpdError::Protocol(format!("binary chunk too large: {} bytes", len)));
                }
                let mut data = vec![0u8; len];
                self.reader.read_exact(&mut data).await?;
                let mut newline = [0u8; 1];
                self.reader.read_exact(&mut newline).await?;
                binary = Some(data);
            } else {
                pairs.push((key.to_string(), value.to_string()));
            }
        }
    }

    /// Send one command line and read its response
    ///
    /// `timeout` of `None` waits indefinitely (used by `idle`).
    async fn run(&mut self, line: &str, timeout: Option<Duration>) -> Result<Response, MpdError> {
        if self.broken {
            return Err(MpdError::Broken);
        }
        debug!(command = %line, "MpdClient::run: called");

        let exchange = async {
            self.writer.write_all(line.as_bytes()).await?;
            self.writer.write_all(b"\n").await?;
            self.writer.flush().await?;
            self.read_response().await
        };

        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .unwrap_or_else(|_| Err(MpdError::Timeout(limit))),
            None => exchange.await,
        };

        if let Err(e) = &result
            && e.poisons_connection()
        {
            debug!(error = %e, "MpdClient::run: connection marked broken");
            self.broken = true;
        }
        result
    }

    async fn command(&mut self, line: &str) -> Result<Pairs, MpdError> {
        let timeout = self.timeout;
        let (pairs, _) = self.run(line, Some(timeout)).await?;
        Ok(pairs)
    }

    /// Read a chunked binary response (`readpicture` / `albumart`) to completion
    async fn read_binary(&mut self, command: &str, file: &str) -> Result<Vec<u8>, MpdError> {
        let timeout = self.timeout;
        let mut data = Vec::new();
        loop {
            let line = format!("{} {} {}", command, protocol::quote(file), data.len());
            let (pairs, chunk) = self.run(&line, Some(timeout)).await?;

            let Some(size) = protocol::lookup(&pairs, "size").and_then(|v| v.parse::<usize>().ok()) else {
                // No picture
                return Ok(Vec::new());
            };
            if size > MAX_ARTWORK_SIZE {
                return Err(MpdError::Protocol(format!("artwork too large: {} bytes", size)));
            }

            match chunk {
                Some(chunk) if !chunk.is_empty() => data.extend_from_slice(&chunk),
                _ => break,
            }
            if data.len() >= size {
                break;
            }
        }
        Ok(data)
    }
}

#[async_trait]
impl PlayerSession for MpdClient {
    async fn ping(&mut self) -> Result<(), MpdError> {
        debug!("MpdClient::ping: called");
        self.command("ping").await.map(|_| ())
    }

    async fn status(&mut self) -> Result<PlaybackStatus, MpdError> {
        debug!("MpdClient::status: called");
        let pairs = self.command("status").await?;
        Ok(protocol::status_from_pairs(&pairs))
    }

    async fn current_track(&mut self) -> Result<TrackInfo, MpdError> {
        debug!("MpdClient::current_track: called");
        let pairs = self.command("currentsong").await?;
        Ok(protocol::track_from_pairs(&pairs))
    }

    async fn fetch_artwork(&mut self, file: &str) -> Option<Artwork> {
        debug!(%file, "MpdClient::fetch_artwork: called");
        for command in ["readpicture", "albumart"] {
            match self.read_binary(command, file).await {
                Ok(data) if !data.is_empty() => {
                    debug!(%command, len = data.len(), "MpdClient::fetch_artwork: found artwork");
                    return Some(Artwork::from_bytes(data));
                }
                Ok(_) => {
                    debug!(%command, "MpdClient::fetch_artwork: no artwork");
                }
                Err(e) => {
                    debug!(%command, error = %e, "MpdClient::fetch_artwork: lookup failed");
                }
            }
        }
        None
    }
}

#[async_trait]
impl IdleSource for MpdClient {
    async fn idle(&mut self, subsystems: &[String]) -> Result<Vec<String>, MpdError> {
        debug!(?subsystems, "MpdClient::idle: called");
        let mut line = String::from("idle");
        for subsystem in subsystems {
            line.push(' ');
            line.push_str(subsystem);
        }
        let (pairs, _) = self.run(&line, None).await?;
        Ok(pairs
            .into_iter()
            .filter(|(k, _)| k == "changed")
            .map(|(_, v)| v)
            .collect())
    }
}
