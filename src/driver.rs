//! Driver turns host ticks into link writes
//!
//! [`LinkDriver::tick`] is the synchronous entry point for hosts that already
//! have a tick callback. [`LinkDriver::spawn`] moves the driver into a tokio
//! task that samples a [`StateSource`] at the configured rate.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::Result;
use crate::config::ClientConfig;
use crate::encoder::compute_snapshot;
use crate::provider::StateSource;
use crate::segment::SegmentBackend;
use crate::session::LinkSession;
use crate::types::{LinkStatus, PlayerState, TickState, WorldState};

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Receiver for the status after every tick
    pub status: watch::Receiver<LinkStatus>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

impl DriverChannels {
    /// Status updates as a stream, starting with the current value
    pub fn status_updates(&self) -> WatchStream<LinkStatus> {
        WatchStream::new(self.status.clone())
    }
}

/// Owns the link session and publishes one snapshot per tick
pub struct LinkDriver<B: SegmentBackend> {
    session: LinkSession<B>,
    config: ClientConfig,
    status: LinkStatus,
}

impl<B: SegmentBackend> LinkDriver<B> {
    pub fn new(backend: B, config: ClientConfig) -> Self {
        Self { session: LinkSession::new(backend), config, status: LinkStatus::disconnected() }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn status(&self) -> &LinkStatus {
        &self.status
    }

    pub fn session(&self) -> &LinkSession<B> {
        &self.session
    }

    /// Handle one host tick.
    ///
    /// With a player in a world the snapshot is published, linking first if
    /// needed. Otherwise, or when publishing fails, the link is closed and
    /// retried on the next tick.
    pub fn tick(&mut self, state: &TickState) -> &LinkStatus {
        match state {
            TickState::InWorld { player, world } => match self.publish(player, world) {
                Ok(tick) => {
                    self.status = LinkStatus {
                        connected: true,
                        tick,
                        world: Some(world.identifier.clone()),
                    };
                }
                Err(e) => {
                    debug!(error = %e, retryable = e.is_retryable(), "Link unavailable, retrying next tick");
                    self.disconnect();
                }
            },
            TickState::Absent => {
                if self.session.is_connected() {
                    debug!("No player in world, closing link");
                }
                self.disconnect();
            }
        }
        &self.status
    }

    fn publish(&mut self, player: &PlayerState, world: &WorldState) -> Result<u32> {
        let snapshot = compute_snapshot(player, world, &self.config)?;
        let linked = self.session.ensure_linked()?;
        let written = linked.publish(snapshot)?;
        Ok(written.ui_tick)
    }

    fn disconnect(&mut self) {
        self.session.ensure_closed();
        self.status = LinkStatus::disconnected();
    }

    /// Close the link; the driver can keep ticking afterwards
    pub fn shutdown(&mut self) {
        self.disconnect();
    }

    fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.config.tick_rate_hz.max(1)))
    }

    /// Spawn the driver task for the given source
    ///
    /// Returns a status receiver and a cancellation token. The task also ends
    /// when the source ends; the link is closed either way.
    pub fn spawn<S>(self, source: S) -> DriverChannels
    where
        S: StateSource,
    {
        let (status_tx, status_rx) = watch::channel(self.status.clone());
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        tokio::spawn(async move {
            self.run(source, status_tx, cancel_task).await;
        });

        DriverChannels { status: status_rx, cancel }
    }

    async fn run<S>(
        mut self,
        mut source: S,
        status_tx: watch::Sender<LinkStatus>,
        cancel: CancellationToken,
    ) where
        S: StateSource,
    {
        let period = self.tick_period();
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(rate_hz = self.config.tick_rate_hz, "Link driver started");
        let mut tick_count = 0u64;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Link driver cancelled");
                    break;
                }
                _ = interval.tick() => {}
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Link driver cancelled while sampling");
                    break;
                }
                result = source.next_state() => result,
            };

            match result {
                Ok(Some(state)) => {
                    tick_count += 1;
                    let status = self.tick(&state).clone();
                    trace!(tick_count, connected = status.connected, link_tick = status.tick, "Driver tick");
                    status_tx.send_replace(status);
                }
                Ok(None) => {
                    info!(tick_count, "State source ended");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "State source failed, closing link for this tick");
                    self.disconnect();
                    status_tx.send_replace(self.status.clone());
                }
            }
        }

        self.shutdown();
        status_tx.send_replace(self.status.clone());
        info!(tick_count, "Link driver stopped");
    }
}
