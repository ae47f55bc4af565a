//! In-process segment backend
//!
//! Behaves like the OS mapping without touching the OS: the record lives in a
//! shared buffer that clones of the backend can inspect, and availability of
//! the "peer" can be toggled to exercise reconnects.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{Segment, SegmentBackend};
use crate::schema::{LINKED_MEM_SIZE, LinkedMem};
use crate::{LinkError, Result};

const MEMORY_SEGMENT_NAME: &str = "memory:MumbleLink";

#[derive(Debug)]
struct Shared {
    available: bool,
    bytes: Vec<u8>,
    opens: usize,
    live: usize,
    writes: usize,
}

/// Backend whose segment is a shared in-process buffer
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    shared: Arc<Mutex<Shared>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Backend whose peer is available
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                available: true,
                bytes: vec![0; LINKED_MEM_SIZE],
                opens: 0,
                live: 0,
                writes: 0,
            })),
        }
    }

    /// Backend whose peer has not created the segment yet
    pub fn unavailable() -> Self {
        let backend = Self::new();
        backend.set_available(false);
        backend
    }

    /// Simulate the peer starting or stopping.
    ///
    /// Segments that are already open keep working, like a real mapping does.
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Current contents of the record
    pub fn read(&self) -> Result<LinkedMem> {
        LinkedMem::parse_from_memory(&self.lock().bytes)
    }

    /// Number of successful opens so far
    pub fn open_count(&self) -> usize {
        self.lock().opens
    }

    /// Number of segments currently mapped
    pub fn live_handles(&self) -> usize {
        self.lock().live
    }

    /// Number of records written so far
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SegmentBackend for MemoryBackend {
    type Segment = MemorySegment;

    fn open(&mut self) -> Result<Self::Segment> {
        let mut shared = self.lock();
        if !shared.available {
            return Err(LinkError::unavailable("in-memory peer is not running"));
        }
        shared.opens += 1;
        shared.live += 1;
        drop(shared);

        Ok(MemorySegment { shared: Arc::clone(&self.shared) })
    }
}

/// Open handle on a [`MemoryBackend`]'s buffer
#[derive(Debug)]
pub struct MemorySegment {
    shared: Arc<Mutex<Shared>>,
}

impl Segment for MemorySegment {
    fn write(&mut self, mem: &LinkedMem) -> Result<()> {
        let mut shared = self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        shared.bytes.copy_from_slice(mem.as_bytes());
        shared.writes += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        MEMORY_SEGMENT_NAME
    }
}

impl Drop for MemorySegment {
    fn drop(&mut self) {
        let mut shared = self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        shared.live = shared.live.saturating_sub(1);
    }
}
