//! Reconnection supervisor
//!
//! Drives the CONNECTING → WATCHING → CONNECTING cycle:
//! - after every connect a resync check runs before waiting for events
//! - while watching, events trigger checks and an idle timer triggers pings
//! - a transport failure tears the watcher down, waits, then reconnects
//!   with linear backoff
//! - exhausting the retry budget or a non-transport connect error is fatal
//!
//! Shutdown is honoured while watching and during every wait.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::backoff::{ConnectOutcome, Connection, RetryPolicy, connect_once, connect_with_retry};
use super::check::Monitor;
use super::connector::Connector;
use crate::mpd::{MpdError, PlayerSession};
use crate::watcher::EventWatcher;

/// Events that never affect what is playing
const IGNORED_EVENTS: [&str; 2] = ["database", "update"];

#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    pub retry: RetryPolicy,
    /// Wait between losing a connection and the first reconnect attempt
    pub reconnect_delay: Duration,
    /// Ping when no event arrived for this long
    pub ping_interval: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            reconnect_delay: Duration::from_secs(2),
            ping_interval: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Failed to connect to MPD: {0}")]
    InitialConnect(MpdError),

    #[error("Failed to reconnect to MPD after {attempts} attempts: {last_error}")]
    ExhaustedRetries { attempts: u32, last_error: MpdError },

    #[error("Fatal MPD error: {0}")]
    Fatal(MpdError),
}

/// Why a watch cycle ended
#[derive(Debug)]
enum CycleEnd {
    Shutdown,
    Lost(MpdError),
}

/// Single startup attempt; any failure is fatal
pub async fn connect_initial<C: Connector>(connector: &C) -> Result<Connection<C::Session>, SupervisorError> {
    debug!(address = %connector.address(), "connect_initial: called");
    connect_once(connector).await.map_err(SupervisorError::InitialConnect)
}

pub struct Supervisor<C: Connector> {
    connector: C,
    monitor: Monitor,
    settings: SupervisorSettings,
}

impl<C: Connector> Supervisor<C> {
    pub fn new(connector: C, monitor: Monitor, settings: SupervisorSettings) -> Self {
        Self {
            connector,
            monitor,
            settings,
        }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// Watch `initial` and keep reconnecting until shutdown or a fatal error
    pub async fn run(
        &mut self,
        initial: Connection<C::Session>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), SupervisorError> {
        info!(address = %self.connector.address(), "Supervisor::run: started");
        let mut connection = initial;

        loop {
            let Connection { mut session, mut watcher } = connection;
            let end = self.watch_cycle(&mut session, &mut watcher, &mut shutdown).await;
            watcher.close().await;
            drop(session);

            let cause = match end {
                CycleEnd::Shutdown => {
                    info!("Supervisor::run: shutdown requested");
                    return Ok(());
                }
                CycleEnd::Lost(e) => e,
            };

            warn!(error = %cause, "Lost connection to MPD");
            self.monitor.notice(&format!("⚠️  Lost connection to MPD: {}", cause));

            tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => return Ok(()),
                _ = tokio::time::sleep(self.settings.reconnect_delay) => {}
            }

            self.monitor.notice("🔄 Reconnecting to MPD...");
            let outcome = tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => return Ok(()),
                outcome = connect_with_retry(&self.connector, &self.settings.retry) => outcome,
            };

            connection = match outcome {
                Ok(ConnectOutcome::Connected(connection)) => {
                    self.monitor.notice("✅ Reconnected to MPD");
                    connection
                }
                Ok(ConnectOutcome::ExhaustedRetries { attempts, last_error }) => {
                    error!(attempts, error = %last_error, "Supervisor::run: retries exhausted");
                    return Err(SupervisorError::ExhaustedRetries { attempts, last_error });
                }
                Err(e) => {
                    error!(error = %e, "Supervisor::run: fatal connect error");
                    return Err(SupervisorError::Fatal(e));
                }
            };
        }
    }

    async fn watch_cycle(
        &mut self,
        session: &mut C::Session,
        watcher: &mut EventWatcher,
        shutdown: &mut watch::Receiver<bool>,
    ) -> CycleEnd {
        debug!("Supervisor::watch_cycle: called");
        if let Err(e) = self.run_check(session).await {
            return CycleEnd::Lost(e);
        }

        loop {
            tokio::select! {
                biased;
                _ = shutdown_requested(shutdown) => return CycleEnd::Shutdown,
                event = watcher.next_event() => {
                    let Some(event) = event else {
                        return CycleEnd::Lost(MpdError::WatcherClosed);
                    };
                    if IGNORED_EVENTS.contains(&event.as_str()) {
                        debug!(%event, "Supervisor::watch_cycle: ignoring event");
                        continue;
                    }
                    debug!(%event, "Supervisor::watch_cycle: event");
                    if let Err(e) = self.run_check(session).await {
                        return CycleEnd::Lost(e);
                    }
                }
                _ = tokio::time::sleep(self.settings.ping_interval) => {
                    debug!("Supervisor::watch_cycle: idle, pinging");
                    if let Err(e) = session.ping().await {
                        return CycleEnd::Lost(e);
                    }
                }
            }
        }
    }

    /// Run one check; only transport errors are returned
    async fn run_check(&mut self, session: &mut C::Session) -> Result<(), MpdError> {
        match self.monitor.check(session).await {
            Ok(report) => {
                debug!(?report, "Supervisor::run_check: done");
                Ok(())
            }
            Err(e) if e.is_transient() => Err(e),
            Err(e) => {
                warn!(error = %e, "Status check failed");
                Ok(())
            }
        }
    }
}

/// Resolves once shutdown is signalled; never resolves if the sender is gone
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
