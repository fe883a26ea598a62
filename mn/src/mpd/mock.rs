//! In-memory daemon doubles for unit tests

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use super::error::MpdError;
use super::session::{IdleSource, PlayerSession};
use super::types::{Artwork, PlaybackState, PlaybackStatus, TrackInfo};

/// Idle source that replays a fixed script, then waits forever
pub struct ScriptedIdle {
    script: VecDeque<Result<Vec<String>, MpdError>>,
    requested: Arc<Mutex<Vec<Vec<String>>>>,
    dropped: Arc<AtomicBool>,
}

impl ScriptedIdle {
    pub fn new(script: Vec<Result<Vec<String>, MpdError>>) -> Self {
        Self {
            script: script.into(),
            requested: Arc::new(Mutex::new(Vec::new())),
            dropped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subsystem lists passed to each `idle` call
    pub fn requested(&self) -> Arc<Mutex<Vec<Vec<String>>>> {
        self.requested.clone()
    }

    /// Set once the source has been dropped
    pub fn dropped_flag(&self) -> Arc<AtomicBool> {
        self.dropped.clone()
    }
}

impl Drop for ScriptedIdle {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdleSource for ScriptedIdle {
    async fn idle(&mut self, subsystems: &[String]) -> Result<Vec<String>, MpdError> {
        self.requested.lock().unwrap().push(subsystems.to_vec());
        match self.script.pop_front() {
            Some(step) => step,
            None => std::future::pending().await,
        }
    }
}

#[derive(Default)]
struct DaemonState {
    status: PlaybackStatus,
    track: TrackInfo,
    artwork: Option<Artwork>,
    /// Bumped by `disconnect()`; sessions from older generations are dead
    generation: usize,
    reachable: bool,
    /// Error returned by the next connect attempts instead of connecting
    refuse_with_ack: bool,
    idle_tx: Option<mpsc::UnboundedSender<String>>,
}

/// Shared fake daemon: tests change its state while sessions read it
#[derive(Clone)]
pub struct FakeDaemon {
    state: Arc<Mutex<DaemonState>>,
    status_calls: Arc<AtomicUsize>,
    artwork_calls: Arc<AtomicUsize>,
    connects: Arc<AtomicUsize>,
}

impl Default for FakeDaemon {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDaemon {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(DaemonState {
                reachable: true,
                ..Default::default()
            })),
            status_calls: Arc::new(AtomicUsize::new(0)),
            artwork_calls: Arc::new(AtomicUsize::new(0)),
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Start playing `file` as the only queued track
    pub fn play(&self, file: &str, title: &str) {
        let mut state = self.state.lock().unwrap();
        state.status = PlaybackStatus {
            state: PlaybackState::Play,
            song_position: Some(0),
            playlist_length: 1,
            elapsed: "0".to_string(),
            audio: Some("44100:16:2".to_string()),
            bitrate: None,
        };
        state.track = TrackInfo {
            file: file.to_string(),
            title: title.to_string(),
            duration: "180".to_string(),
            ..Default::default()
        };
    }

    pub fn set_state(&self, playback: PlaybackState) {
        self.state.lock().unwrap().status.state = playback;
    }

    pub fn clear_queue(&self) {
        let mut state = self.state.lock().unwrap();
        state.status = PlaybackStatus {
            state: PlaybackState::Stop,
            ..Default::default()
        };
        state.track = TrackInfo::default();
    }

    pub fn set_artwork(&self, artwork: Option<Artwork>) {
        self.state.lock().unwrap().artwork = artwork;
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.state.lock().unwrap().reachable = reachable;
    }

    pub fn refuse_with_ack(&self) {
        self.state.lock().unwrap().refuse_with_ack = true;
    }

    /// Announce a subsystem change to the current watcher
    pub fn emit(&self, subsystem: &str) {
        if let Some(tx) = &self.state.lock().unwrap().idle_tx {
            let _ = tx.send(subsystem.to_string());
        }
    }

    /// Drop every open connection
    pub fn disconnect(&self) {
        let mut state = self.state.lock().unwrap();
        state.generation += 1;
        state.idle_tx = None;
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn artwork_calls(&self) -> usize {
        self.artwork_calls.load(Ordering::SeqCst)
    }

    /// Successful request-connection opens
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<usize, MpdError> {
        let state = self.state.lock().unwrap();
        if state.refuse_with_ack {
            return Err(MpdError::Ack {
                code: 3,
                index: 0,
                command: "password".to_string(),
                message: "incorrect password".to_string(),
            });
        }
        if !state.reachable {
            return Err(MpdError::Io(std::io::Error::from(ErrorKind::ConnectionRefused)));
        }
        Ok(state.generation)
    }

    /// Open a request session
    pub fn session(&self) -> Result<MockSession, MpdError> {
        let generation = self.check_reachable()?;
        self.connects.fetch_add(1, Ordering::SeqCst);
        debug!(generation, "FakeDaemon::session: opened");
        Ok(MockSession {
            daemon: self.clone(),
            generation,
        })
    }

    /// Open an idle subscription; replaces any previous one
    pub fn idle_source(&self) -> Result<ChannelIdle, MpdError> {
        self.check_reachable()?;
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().unwrap().idle_tx = Some(tx);
        Ok(ChannelIdle { rx })
    }
}

/// Request session against a [`FakeDaemon`]
pub struct MockSession {
    daemon: FakeDaemon,
    generation: usize,
}

impl MockSession {
    fn alive(&self) -> Result<(), MpdError> {
        let state = self.daemon.state.lock().unwrap();
        if state.generation != self.generation || !state.reachable {
            return Err(MpdError::Io(std::io::Error::from(ErrorKind::ConnectionReset)));
        }
        Ok(())
    }
}

#[async_trait]
impl PlayerSession for MockSession {
    async fn ping(&mut self) -> Result<(), MpdError> {
        self.alive()
    }

    async fn status(&mut self) -> Result<PlaybackStatus, MpdError> {
        self.alive()?;
        self.daemon.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.daemon.state.lock().unwrap().status.clone())
    }

    async fn current_track(&mut self) -> Result<TrackInfo, MpdError> {
        self.alive()?;
        Ok(self.daemon.state.lock().unwrap().track.clone())
    }

    async fn fetch_artwork(&mut self, _file: &str) -> Option<Artwork> {
        self.alive().ok()?;
        self.daemon.artwork_calls.fetch_add(1, Ordering::SeqCst);
        self.daemon.state.lock().unwrap().artwork.clone()
    }
}

/// Idle source fed by [`FakeDaemon::emit`]; ends when the daemon disconnects
pub struct ChannelIdle {
    rx: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl IdleSource for ChannelIdle {
    async fn idle(&mut self, _subsystems: &[String]) -> Result<Vec<String>, MpdError> {
        match self.rx.recv().await {
            Some(subsystem) => Ok(vec![subsystem]),
            None => Err(MpdError::Io(std::io::Error::from(ErrorKind::UnexpectedEof))),
        }
    }
}
