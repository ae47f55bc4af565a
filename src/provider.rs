//! Sources of per-tick host state

use futures::{Stream, StreamExt};
use tokio::sync::watch;

use crate::Result;
use crate::types::TickState;

/// Something the driver can sample once per tick
///
/// Returns:
/// - `Ok(Some(state))` - Current host state
/// - `Ok(None)` - Source ended (driver shuts down)
/// - `Err(e)` - Transient failure; the link is closed for this tick
#[async_trait::async_trait]
pub trait StateSource: Send + 'static {
    async fn next_state(&mut self) -> Result<Option<TickState>>;
}

/// Samples the latest value; ends once the sender is gone
#[async_trait::async_trait]
impl StateSource for watch::Receiver<TickState> {
    async fn next_state(&mut self) -> Result<Option<TickState>> {
        if self.has_changed().is_err() {
            return Ok(None);
        }
        Ok(Some(self.borrow_and_update().clone()))
    }
}

/// Source backed by a closure called on every tick
pub struct PollFn<F> {
    poll: F,
}

/// Wrap a closure as a [`StateSource`]
pub fn poll_fn<F>(poll: F) -> PollFn<F>
where
    F: FnMut() -> TickState + Send + 'static,
{
    PollFn { poll }
}

#[async_trait::async_trait]
impl<F> StateSource for PollFn<F>
where
    F: FnMut() -> TickState + Send + 'static,
{
    async fn next_state(&mut self) -> Result<Option<TickState>> {
        Ok(Some((self.poll)()))
    }
}

/// Source that takes one item per tick from a stream
pub struct StreamSource<S> {
    stream: S,
}

impl<S> StreamSource<S>
where
    S: Stream<Item = TickState> + Unpin + Send + 'static,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

#[async_trait::async_trait]
impl<S> StateSource for StreamSource<S>
where
    S: Stream<Item = TickState> + Unpin + Send + 'static,
{
    async fn next_state(&mut self) -> Result<Option<TickState>> {
        Ok(self.stream.next().await)
    }
}
