//! EventWatcher - owns an `idle` subscription and its error drain
//!
//! Two tasks run for the watcher's whole life:
//! - the pump loops on `idle` and forwards changed subsystem names
//! - the drain consumes the pump's errors and logs them
//!
//! Both stop when the watcher is closed. `close()` waits for them, so
//! nothing from an old session is still running once it returns.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::mpd::{IdleSource, MpdClient, MpdError};

/// Subsystems the monitor subscribes to
pub const WATCHED_SUBSYSTEMS: [&str; 2] = ["player", "mixer"];

/// Buffered events and errors per watcher
const CHANNEL_CAPACITY: usize = 64;

/// Pause after a server-side error before idling again
const ERROR_PAUSE: Duration = Duration::from_secs(1);

pub struct EventWatcher {
    events: mpsc::Receiver<String>,
    done: watch::Sender<bool>,
    pump: Option<JoinHandle<()>>,
    drain: Option<JoinHandle<()>>,
}

impl EventWatcher {
    /// Open a dedicated connection and subscribe to `subsystems`
    pub async fn open(
        host: &str,
        port: u16,
        timeout: Duration,
        password: Option<&str>,
        subsystems: &[&str],
    ) -> Result<Self, MpdError> {
        debug!(%host, port, ?subsystems, "EventWatcher::open: called");
        let client = MpdClient::connect(host, port, timeout, password).await?;
        Ok(Self::spawn(client, subsystems.iter().map(|s| s.to_string()).collect()))
    }

    /// Start the pump and drain tasks over any idle source
    pub fn spawn<S: IdleSource>(source: S, subsystems: Vec<String>) -> Self {
        debug!(?subsystems, "EventWatcher::spawn: called");
        let (event_tx, events) = mpsc::channel(CHANNEL_CAPACITY);
        let (error_tx, error_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (done, done_rx) = watch::channel(false);

        let pump = tokio::spawn(pump(source, subsystems, event_tx, error_tx, done_rx.clone()));
        let drain = tokio::spawn(drain(error_rx, done_rx));

        Self {
            events,
            done,
            pump: Some(pump),
            drain: Some(drain),
        }
    }

    /// Next changed subsystem; `None` once the subscription has ended
    pub async fn next_event(&mut self) -> Option<String> {
        self.events.recv().await
    }

    /// Stop both tasks and wait for them
    pub async fn close(mut self) {
        debug!("EventWatcher::close: called");
        let _ = self.done.send(true);
        self.events.close();

        for (name, handle) in [("pump", self.pump.take()), ("drain", self.drain.take())] {
            if let Some(handle) = handle
                && let Err(e) = handle.await
            {
                warn!(task = name, error = %e, "EventWatcher::close: task ended abnormally");
            }
        }
        debug!("EventWatcher::close: closed");
    }
}

impl Drop for EventWatcher {
    fn drop(&mut self) {
        // Only reached with live handles when close() was skipped
        for handle in [self.pump.take(), self.drain.take()].into_iter().flatten() {
            handle.abort();
        }
    }
}

async fn pump<S: IdleSource>(
    mut source: S,
    subsystems: Vec<String>,
    events: mpsc::Sender<String>,
    errors: mpsc::Sender<MpdError>,
    mut done: watch::Receiver<bool>,
) {
    loop {
        let result = tokio::select! {
            biased;
            _ = done.changed() => break,
            result = source.idle(&subsystems) => result,
        };

        match result {
            Ok(changed) => {
                for name in changed {
                    debug!(subsystem = %name, "EventWatcher pump: subsystem changed");
                    if events.send(name).await.is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                let transient = e.is_transient();
                let _ = errors.send(e).await;
                if transient {
                    debug!("EventWatcher pump: transport error, ending subscription");
                    break;
                }
                tokio::select! {
                    biased;
                    _ = done.changed() => break,
                    _ = tokio::time::sleep(ERROR_PAUSE) => {}
                }
            }
        }
    }
    debug!("EventWatcher pump: stopped");
}

async fn drain(mut errors: mpsc::Receiver<MpdError>, mut done: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            biased;
            _ = done.changed() => break,
            error = errors.recv() => match error {
                Some(e) => warn!(error = %e, "Watcher error"),
                None => break,
            },
        }
    }
    debug!("EventWatcher drain: stopped");
}
