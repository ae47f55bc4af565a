//! Test utilities shared by unit tests, integration tests and benchmarks
//!
//! Fixtures for host state and snapshots, a self-cleaning temporary
//! directory, recording fakes for the [`Desktop`] and [`Transport`] seams, and
//! a [`LogCapture`] for asserting on emitted log lines.

#![cfg(any(test, feature = "benchmark"))]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use bytes::Bytes;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use crate::desktop::Desktop;
use crate::protocol::Transport;
use crate::types::{LINK_VERSION, PlayerState, Snapshot, Vec3, WorldState};
use crate::{LinkError, Result};

/// A snapshot with every field populated
pub fn sample_snapshot() -> Snapshot {
    Snapshot {
        ui_version: LINK_VERSION,
        ui_tick: 0,
        avatar_position: [10.0, -20.0, 64.0],
        avatar_front: [0.0, 1.0, 0.0],
        avatar_top: [0.0, 0.0, 1.0],
        name: "Minecraft".to_string(),
        camera_position: [10.0, -20.0, 64.0],
        camera_front: [0.0, 1.0, 0.0],
        camera_top: [0.0, 0.0, 1.0],
        identity: r#"{"name":"Steve","world":"minecraft:overworld"}"#.to_string(),
        context: r#"{"domain":"AllTalk"}"#.to_string(),
        description: "A Minecraft mod that provides position data to VoIP clients.".to_string(),
    }
}

/// Player at the given host position, looking along +Z
pub fn player_at(name: &str, x: f64, y: f64, z: f64) -> PlayerState {
    PlayerState::new(name, Vec3::new(x, y, z), Vec3::new(0.0, 0.0, 1.0))
}

pub fn world(identifier: &str) -> WorldState {
    WorldState::new(identifier)
}

/// Directory under the system temp dir, removed on drop
#[derive(Debug)]
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "mumblelink-{}-{}-{}",
            prefix,
            std::process::id(),
            unique
        ));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).expect("create temp dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// [`Desktop`] that records URIs instead of opening them
///
/// Like the real one, it refuses to browse while headless.
#[derive(Debug, Default)]
pub struct RecordingDesktop {
    headless: AtomicBool,
    fail: bool,
    clears: AtomicUsize,
    opened: Mutex<Vec<String>>,
}

impl RecordingDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headless() -> Self {
        Self { headless: AtomicBool::new(true), ..Self::default() }
    }

    /// Every browse attempt fails
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl Desktop for RecordingDesktop {
    fn is_headless(&self) -> bool {
        self.headless.load(Ordering::SeqCst)
    }

    fn clear_headless(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.headless.store(false, Ordering::SeqCst);
    }

    fn browse(&self, uri: &str) -> Result<()> {
        if self.is_headless() {
            return Err(LinkError::launch_failed("environment is headless"));
        }
        if self.fail {
            return Err(LinkError::launch_failed("no handler registered"));
        }
        self.opened.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(uri.to_string());
        Ok(())
    }
}

/// One payload captured by [`RecordingTransport`]
#[derive(Debug, Clone)]
pub struct SentPayload {
    pub recipient: String,
    pub channel: String,
    pub payload: Bytes,
}

/// [`Transport`] that keeps every payload it is given
#[derive(Debug, Default)]
pub struct RecordingTransport {
    failing_for: Option<String>,
    sent: Vec<SentPayload>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends to `recipient` fail; everyone else is recorded
    pub fn failing_for(recipient: &str) -> Self {
        Self { failing_for: Some(recipient.to_string()), sent: Vec::new() }
    }

    pub fn sent(&self) -> &[SentPayload] {
        &self.sent
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, recipient: &str, channel: &str, payload: Bytes) -> Result<()> {
        if self.failing_for.as_deref() == Some(recipient) {
            return Err(LinkError::transport_failed(recipient, "player disconnected"));
        }
        self.sent.push(SentPayload {
            recipient: recipient.to_string(),
            channel: channel.to_string(),
            payload,
        });
        Ok(())
    }
}

/// Collects formatted log output written while [`LogCapture::run`] is active
///
/// Output is plain text without timestamps, so each line starts with the level.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with a subscriber that records events at `level` and above
    pub fn run<R>(&self, level: Level, f: impl FnOnce() -> R) -> R {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .without_time()
            .with_writer(self.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Captured lines emitted at exactly `level`
    pub fn lines_at(&self, level: Level) -> Vec<String> {
        let level = level.to_string();
        self.contents()
            .lines()
            .filter(|line| line.split_whitespace().next() == Some(level.as_str()))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
