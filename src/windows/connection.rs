//! Mumble Link named file mapping
//!
//! Mirrors the reference client code in Mumble's Link plugin documentation:
//! open the `MumbleLink` mapping, create it on the paging file if Mumble has
//! not done so yet, then map a writable view of the record.

use crate::schema::{LINKED_MEM_SIZE, LinkedMem};
use crate::segment::{Segment, SegmentBackend};
use crate::{LinkError, Result};
use std::ptr::NonNull;
use tracing::{debug, trace};
use windows::Win32::Foundation::{CloseHandle, HANDLE, INVALID_HANDLE_VALUE};
use windows::Win32::System::Memory::{
    CreateFileMappingW, FILE_MAP_ALL_ACCESS, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile,
    OpenFileMappingW, PAGE_READWRITE, UnmapViewOfFile,
};
use windows::core::PCWSTR;

/// Mumble Link file mapping name
const LINK_MEMMAPFILENAME: &str = "MumbleLink";

/// Opens (or creates) the `MumbleLink` file mapping
#[derive(Debug, Clone)]
pub struct WindowsBackend {
    name: String,
}

impl Default for WindowsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowsBackend {
    pub fn new() -> Self {
        Self { name: LINK_MEMMAPFILENAME.to_string() }
    }

    /// Backend for an explicitly named mapping
    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl SegmentBackend for WindowsBackend {
    type Segment = WindowsSegment;

    fn open(&mut self) -> Result<Self::Segment> {
        trace!(name = %self.name, "Attempting to open Mumble Link mapping");

        let wide_name = wide_string(&self.name);
        let mapping = unsafe {
            match OpenFileMappingW(
                FILE_MAP_ALL_ACCESS.0,
                false,
                PCWSTR::from_raw(wide_name.as_ptr()),
            ) {
                Ok(handle) => handle,
                Err(open_err) => {
                    debug!(error = %open_err, "Link mapping not found, creating it");
                    CreateFileMappingW(
                        INVALID_HANDLE_VALUE,
                        None,
                        PAGE_READWRITE,
                        0,
                        LINKED_MEM_SIZE as u32,
                        PCWSTR::from_raw(wide_name.as_ptr()),
                    )
                    .map_err(|e| LinkError::windows_api_error("CreateFileMappingW", e))?
                }
            }
        };

        let base = unsafe {
            let ptr = MapViewOfFile(mapping, FILE_MAP_ALL_ACCESS, 0, 0, LINKED_MEM_SIZE);
            match NonNull::new(ptr.Value as *mut u8) {
                Some(base) => base,
                None => {
                    let win_err = windows::core::Error::from_thread();
                    let _ = CloseHandle(mapping);
                    return Err(LinkError::windows_api_error("MapViewOfFile", win_err));
                }
            }
        };

        debug!(name = %self.name, size = LINKED_MEM_SIZE, "Mapped Mumble Link view");
        Ok(WindowsSegment { name: self.name.clone(), mapping, base })
    }
}

/// Writable view of the `MumbleLink` mapping
pub struct WindowsSegment {
    name: String,
    mapping: HANDLE,
    base: NonNull<u8>,
}

impl Segment for WindowsSegment {
    fn write(&mut self, mem: &LinkedMem) -> Result<()> {
        let bytes = mem.as_bytes();
        // Safety: the view spans LINKED_MEM_SIZE writable bytes
        unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.base.as_ptr(), bytes.len()) };
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for WindowsSegment {
    fn drop(&mut self) {
        unsafe {
            let addr = MEMORY_MAPPED_VIEW_ADDRESS { Value: self.base.as_ptr() as *mut _ };
            let _ = UnmapViewOfFile(addr);
            let _ = CloseHandle(self.mapping);
        }
    }
}

// SAFETY: the segment exclusively owns its handle and view; the view is only
// written through &mut self
unsafe impl Send for WindowsSegment {}

/// Convert string to null-terminated wide string for Windows APIs
fn wide_string(s: &str) -> Vec<u16> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

#[cfg(all(test, windows))]
mod tests {
    use super::*;

    #[test]
    fn constants_match_mumble_link() {
        assert_eq!(LINK_MEMMAPFILENAME, "MumbleLink");
        assert_eq!(LINKED_MEM_SIZE, 5460);
    }

    #[test]
    fn wide_string_is_nul_terminated() {
        let wide = wide_string("MumbleLink");
        assert_eq!(wide.len(), 11);
        assert_eq!(wide.last(), Some(&0));
    }

    #[test]
    fn private_mapping_accepts_writes() {
        let mut backend = WindowsBackend::with_name("Local\\MumbleLinkCrateTest");
        let mut segment = backend.open().expect("create private mapping");
        segment.write(&LinkedMem::zeroed()).expect("write");
    }

    #[test]
    #[ignore = "mumble_required"]
    fn opens_running_mumble_mapping() {
        let mut backend = WindowsBackend::new();
        let mut segment = backend.open().expect("Mumble must be running with Link enabled");
        segment.write(&LinkedMem::zeroed()).expect("write");
    }
}
