//! POSIX shared memory backend
//!
//! Mumble creates `/MumbleLink.<uid>` with `shm_open` when its Link plugin
//! starts. We only ever open it; if it is missing the voice client simply is
//! not running yet.

use std::ffi::CString;
use std::ptr::{self, NonNull};
use tracing::{debug, trace};

use super::{Segment, SegmentBackend};
use crate::schema::{LINKED_MEM_SIZE, LinkedMem};
use crate::{LinkError, Result};

/// Opens Mumble's per-user POSIX segment
#[derive(Debug, Clone)]
pub struct ShmBackend {
    name: String,
}

impl Default for ShmBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ShmBackend {
    /// Backend for the current user's segment
    pub fn new() -> Self {
        // Safety: getuid has no preconditions and cannot fail
        let uid = unsafe { libc::getuid() };
        Self { name: format!("/MumbleLink.{}", uid) }
    }

    /// Backend for an explicitly named segment
    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SegmentBackend for ShmBackend {
    type Segment = ShmSegment;

    fn open(&mut self) -> Result<Self::Segment> {
        trace!(name = %self.name, "Opening POSIX link segment");

        let c_name = CString::new(self.name.as_str()).map_err(|e| {
            LinkError::unavailable_with_source("segment name contains NUL", Box::new(e))
        })?;

        let fd = shm_open_rw(&c_name);
        if fd < 0 {
            let err = std::io::Error::last_os_error();
            return Err(LinkError::unavailable_with_source(
                format!("shm_open({}) failed", self.name),
                Box::new(err),
            ));
        }

        // Mapping past the end of a short object raises SIGBUS on access
        let mut stat: libc::stat = unsafe { std::mem::zeroed() };
        if unsafe { libc::fstat(fd, &mut stat) } != 0 {
            let err = std::io::Error::last_os_error();
            unsafe { libc::close(fd) };
            return Err(LinkError::unavailable_with_source(
                format!("fstat({}) failed", self.name),
                Box::new(err),
            ));
        }
        let found = stat.st_size.max(0) as usize;
        if found < LINKED_MEM_SIZE {
            unsafe { libc::close(fd) };
            return Err(LinkError::SegmentTooSmall { expected: LINKED_MEM_SIZE, found });
        }

        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                LINKED_MEM_SIZE,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        // The mapping keeps the object alive; the descriptor is no longer needed
        unsafe { libc::close(fd) };

        if ptr == libc::MAP_FAILED {
            let err = std::io::Error::last_os_error();
            return Err(LinkError::unavailable_with_source(
                format!("mmap({}) failed", self.name),
                Box::new(err),
            ));
        }

        let base = NonNull::new(ptr as *mut u8)
            .ok_or_else(|| LinkError::unavailable(format!("mmap({}) returned null", self.name)))?;

        debug!(name = %self.name, size = LINKED_MEM_SIZE, "Mapped POSIX link segment");
        Ok(ShmSegment { name: self.name.clone(), base })
    }
}

#[cfg(target_vendor = "apple")]
fn shm_open_rw(name: &CString) -> libc::c_int {
    // Variadic on Apple platforms; mode is only read with O_CREAT
    unsafe { libc::shm_open(name.as_ptr(), libc::O_RDWR) }
}

#[cfg(not(target_vendor = "apple"))]
fn shm_open_rw(name: &CString) -> libc::c_int {
    unsafe { libc::shm_open(name.as_ptr(), libc::O_RDWR, 0) }
}

/// Mapped view of the POSIX segment
#[derive(Debug)]
pub struct ShmSegment {
    name: String,
    base: NonNull<u8>,
}

impl Segment for ShmSegment {
    fn write(&mut self, mem: &LinkedMem) -> Result<()> {
        let bytes = mem.as_bytes();
        // Safety: base maps at least LINKED_MEM_SIZE writable bytes
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), self.base.as_ptr(), bytes.len()) };
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ShmSegment {
    fn drop(&mut self) {
        unsafe {
            let _ = libc::munmap(self.base.as_ptr() as *mut libc::c_void, LINKED_MEM_SIZE);
        }
    }
}

// SAFETY: the segment exclusively owns its mapping; the pointer is only
// dereferenced through &mut self
unsafe impl Send for ShmSegment {}
