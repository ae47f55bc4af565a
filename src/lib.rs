//! Positional audio bridge for Mumble Link.
//!
//! Publishes the local player's position and orientation into the shared
//! memory segment that Mumble (and TeamSpeak's Link plugin) polls, and
//! negotiates a launch URL so a server can send its players straight into
//! the right voice channel.
//!
//! # Features
//!
//! - **Link**: lazy, idempotent connect/disconnect of the shared segment
//! - **Snapshots**: axis conversion and per-world muting offsets
//! - **Launch URLs**: wire codec, URI assembly and auto-launch handling
//! - **Driver**: tick-driven or tokio-driven publishing
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mumblelink::{ClientConfig, MumbleLink, PlayerState, TickState, Vec3, WorldState};
//!
//! let mut driver = MumbleLink::system(ClientConfig::default());
//!
//! // Once per host tick
//! let player = PlayerState::new("Steve", Vec3::new(10.0, 64.0, -20.0), Vec3::new(0.0, 0.0, 1.0));
//! let state = TickState::in_world(player, WorldState::new("minecraft:overworld"));
//! let status = driver.tick(&state);
//! println!("linked: {} (tick {})", status.connected, status.tick);
//! ```
//!
//! ## Example (async driver)
//!
//! ```rust,no_run
//! use mumblelink::{ClientConfig, MumbleLink, TickState};
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (state_tx, state_rx) = watch::channel(TickState::Absent);
//!     let channels = MumbleLink::system(ClientConfig::default()).spawn(state_rx);
//!
//!     // The host updates `state_tx` from its own loop...
//!     # drop(state_tx);
//!     channels.cancel.cancel();
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Link publishing
pub mod driver;
pub mod encoder;
pub mod provider;
pub mod schema;
pub mod segment;
pub mod session;

// Launch URL negotiation
pub mod desktop;
pub mod protocol;

// Platform-specific modules
#[cfg(windows)]
pub mod windows;

// Core exports
pub use error::*;
pub use types::*;

pub use config::{AutoLaunchOption, ClientConfig, ConfigStore, ServerConfig};
pub use desktop::{Desktop, SystemDesktop};
pub use driver::{DriverChannels, LinkDriver};
pub use encoder::{compute_snapshot, stable_hash, world_offset};
pub use protocol::{
    BROADCAST_MUMBLE_URL_CHANNEL, MumbleUrlMessage, ReceiveOutcome, Recipient, Transport,
    UrlBroadcaster, UrlReceiver, UrlTrigger, VoipClient,
};
pub use provider::{StateSource, poll_fn};
pub use schema::LinkedMem;
pub use segment::{MemoryBackend, Segment, SegmentBackend, SystemBackend};
pub use session::{LinkSession, LinkedSegment};

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// For hosts without their own subscriber; does nothing if one is already set.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Unified entry point for the link and launch URL handling.
pub struct MumbleLink;

impl MumbleLink {
    /// Driver writing into the operating system's shared segment.
    ///
    /// Nothing is opened until the first tick with a player in a world.
    pub fn system(config: ClientConfig) -> LinkDriver<SystemBackend> {
        LinkDriver::new(SystemBackend::new(), config)
    }

    /// Driver writing into an in-process segment.
    ///
    /// The returned backend shares the segment and can be inspected.
    pub fn in_memory(config: ClientConfig) -> (LinkDriver<MemoryBackend>, MemoryBackend) {
        let backend = MemoryBackend::new();
        (LinkDriver::new(backend.clone(), config), backend)
    }

    /// Receiver for launch URLs using the system URI handler
    pub fn receiver(config: &ClientConfig) -> UrlReceiver<SystemDesktop> {
        UrlReceiver::new(config.auto_launch_option, SystemDesktop::detect(config.headless))
    }

    /// Server-side sender for launch URLs
    pub fn broadcaster(config: ServerConfig) -> UrlBroadcaster {
        UrlBroadcaster::new(config)
    }
}
