//! Link session lifecycle
//!
//! [`LinkSession`] owns at most one mapped segment. Linking is lazy and
//! idempotent; closing is idempotent and never fails. A failed open leaves the
//! session disconnected so the caller can simply retry on the next tick.

use tracing::{debug, info, trace};

use crate::Result;
use crate::schema::LinkedMem;
use crate::segment::{Segment, SegmentBackend};
use crate::types::Snapshot;

/// Connection to the shared segment
pub struct LinkSession<B: SegmentBackend> {
    backend: B,
    linked: Option<LinkedSegment<B::Segment>>,
}

impl<B: SegmentBackend> LinkSession<B> {
    /// Create a disconnected session
    pub fn new(backend: B) -> Self {
        Self { backend, linked: None }
    }

    pub fn is_connected(&self) -> bool {
        self.linked.is_some()
    }

    /// Return the live segment, opening it first if needed
    pub fn ensure_linked(&mut self) -> Result<&mut LinkedSegment<B::Segment>> {
        let linked = match self.linked.take() {
            Some(linked) => linked,
            None => {
                // Retried every tick while no client is running
                debug!("Linking to VoIP client...");
                let segment = self.backend.open()?;
                info!(segment = segment.name(), "Linked");
                LinkedSegment::new(segment)
            }
        };
        Ok(self.linked.insert(linked))
    }

    /// Release the segment if one is mapped
    pub fn ensure_closed(&mut self) {
        if let Some(linked) = self.linked.take() {
            info!(segment = linked.segment.name(), last_tick = linked.tick, "Unlinking from VoIP client...");
            drop(linked);
            info!("Unlinked");
        } else {
            trace!("Link already closed");
        }
    }

    /// The live segment, without opening one
    pub fn linked(&mut self) -> Option<&mut LinkedSegment<B::Segment>> {
        self.linked.as_mut()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: SegmentBackend> Drop for LinkSession<B> {
    fn drop(&mut self) {
        if self.linked.is_some() {
            debug!("Dropping linked session");
            self.ensure_closed();
        }
    }
}

/// A mapped segment plus the tick counter of this connection
pub struct LinkedSegment<S> {
    segment: S,
    tick: u32,
}

impl<S: Segment> LinkedSegment<S> {
    fn new(segment: S) -> Self {
        Self { segment, tick: 0 }
    }

    /// Last tick written through this connection (0 before the first write)
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Stamp the snapshot with the next tick and overwrite the record.
    ///
    /// The record is fully encoded before the single copy into the segment.
    /// The tick only advances when the write succeeds.
    pub fn publish(&mut self, snapshot: Snapshot) -> Result<Snapshot> {
        let next = self.tick.wrapping_add(1);
        let snapshot = snapshot.with_tick(next);
        let mem = LinkedMem::from_snapshot(&snapshot);
        self.segment.write(&mem)?;
        self.tick = next;
        trace!(tick = next, "Published link snapshot");
        Ok(snapshot)
    }

    pub fn segment(&self) -> &S {
        &self.segment
    }
}
