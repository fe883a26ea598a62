//! Connection establishment and the reconnect retry loop

use std::time::Duration;

use tracing::{debug, info, warn};

use super::connector::Connector;
use crate::mpd::{MpdError, PlayerSession};
use crate::watcher::EventWatcher;

/// Linear backoff: wait `step × attempt` after each failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            step: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.step * attempt
    }
}

/// A pinged request session plus its event subscription
pub struct Connection<S> {
    pub session: S,
    pub watcher: EventWatcher,
}

pub enum ConnectOutcome<S> {
    Connected(Connection<S>),
    ExhaustedRetries { attempts: u32, last_error: MpdError },
}

/// Open a session, probe it with `ping`, then open the watcher
pub async fn connect_once<C: Connector>(connector: &C) -> Result<Connection<C::Session>, MpdError> {
    debug!(address = %connector.address(), "connect_once: called");
    let mut session = connector.connect().await?;
    session.ping().await?;
    let watcher = connector.open_watcher().await?;
    Ok(Connection { session, watcher })
}

/// Retry `connect_once` on transient errors
///
/// Non-transient errors are returned as `Err` straight away.
pub async fn connect_with_retry<C: Connector>(
    connector: &C,
    policy: &RetryPolicy,
) -> Result<ConnectOutcome<C::Session>, MpdError> {
    debug!(address = %connector.address(), ?policy, "connect_with_retry: called");
    let mut attempt = 0;
    loop {
        attempt += 1;
        match connect_once(connector).await {
            Ok(connection) => {
                info!(attempt, "Reconnected to MPD");
                return Ok(ConnectOutcome::Connected(connection));
            }
            Err(e) if !e.is_transient() => {
                debug!(attempt, error = %e, "connect_with_retry: fatal error");
                return Err(e);
            }
            Err(e) => {
                if attempt >= policy.max_attempts {
                    warn!(attempt, error = %e, "Giving up reconnecting to MPD");
                    return Ok(ConnectOutcome::ExhaustedRetries {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                let delay = policy.delay_for(attempt);
                warn!(attempt, ?delay, error = %e, "Reconnect attempt failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}
