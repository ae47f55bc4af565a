//! Shared segment backends
//!
//! A [`SegmentBackend`] knows how to open the well-known named segment; the
//! returned [`Segment`] owns the mapping and releases it on drop. The session
//! manager is generic over the backend so hosts and tests can swap the OS
//! mapping for [`MemoryBackend`].
//!
//! | Backend | Platform | Segment name |
//! |---------|----------|--------------|
//! | [`crate::windows::WindowsBackend`] | Windows | `MumbleLink` |
//! | [`ShmBackend`] | Unix | `/MumbleLink.<uid>` |
//! | [`MemoryBackend`] | any | in-process |

mod memory;
#[cfg(unix)]
mod unix;

pub use memory::{MemoryBackend, MemorySegment};
#[cfg(unix)]
pub use unix::{ShmBackend, ShmSegment};

use crate::Result;
use crate::schema::LinkedMem;

/// An open mapping of the shared record
pub trait Segment: Send {
    /// Overwrite the whole record in one copy
    fn write(&mut self, mem: &LinkedMem) -> Result<()>;

    /// Name of the underlying segment, for logging
    fn name(&self) -> &str;
}

/// Opens the shared segment on demand
pub trait SegmentBackend: Send + 'static {
    type Segment: Segment;

    /// Open (map) the segment.
    ///
    /// Failing here is expected while the voice client is not running.
    fn open(&mut self) -> Result<Self::Segment>;
}

/// Backend for the current operating system
#[cfg(windows)]
pub type SystemBackend = crate::windows::WindowsBackend;

/// Backend for the current operating system
#[cfg(unix)]
pub type SystemBackend = ShmBackend;

/// Backend for the current operating system
#[cfg(not(any(windows, unix)))]
pub type SystemBackend = UnsupportedBackend;

/// Placeholder backend on platforms without named shared memory
#[cfg(not(any(windows, unix)))]
#[derive(Debug, Default)]
pub struct UnsupportedBackend;

#[cfg(not(any(windows, unix)))]
impl UnsupportedBackend {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(any(windows, unix)))]
impl SegmentBackend for UnsupportedBackend {
    type Segment = MemorySegment;

    fn open(&mut self) -> Result<Self::Segment> {
        Err(crate::LinkError::unsupported_platform("Link shared memory", "Windows or Unix"))
    }
}
