//! Mumble Link shared memory layout
//!
//! The record follows the `LinkedMem` structure published by Mumble's Link
//! plugin:
//! ```c
//! struct LinkedMem {
//!     UINT32  uiVersion;
//!     DWORD   uiTick;
//!     float   fAvatarPosition[3];
//!     float   fAvatarFront[3];
//!     float   fAvatarTop[3];
//!     wchar_t name[256];
//!     float   fCameraPosition[3];
//!     float   fCameraFront[3];
//!     float   fCameraTop[3];
//!     wchar_t identity[256];
//!     UINT32  context_len;
//!     unsigned char context[256];
//!     wchar_t description[2048];
//! };
//! ```
//!
//! # Memory Layout
//!
//! `wchar_t` is the platform's C wide character: 2 bytes (UTF-16) on Windows,
//! 4 bytes (UTF-32) everywhere else. That gives 5460 bytes on Windows and
//! 10580 bytes on Linux and macOS. Every field is 4-byte aligned either way, so
//! the struct has no padding and can be viewed as plain bytes.
//!
//! Wide strings are NUL-terminated and truncated to capacity - 1 units.
//! `context` is raw bytes (UTF-8 here) with an explicit length instead.

use crate::types::{LINK_VERSION, Snapshot};
use crate::{LinkError, Result};
use std::mem;
use tracing::trace;

/// C `wchar_t` on this platform
#[cfg(windows)]
pub type WChar = u16;
/// C `wchar_t` on this platform
#[cfg(not(windows))]
pub type WChar = u32;

pub const NAME_CAPACITY: usize = 256;
pub const IDENTITY_CAPACITY: usize = 256;
pub const CONTEXT_CAPACITY: usize = 256;
pub const DESCRIPTION_CAPACITY: usize = 2048;

/// Size in bytes of the shared record
pub const LINKED_MEM_SIZE: usize = mem::size_of::<LinkedMem>();

#[cfg(windows)]
const _: () = assert!(LINKED_MEM_SIZE == 5460);
#[cfg(not(windows))]
const _: () = assert!(LINKED_MEM_SIZE == 10580);

/// Shared record matching Mumble's `LinkedMem`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct LinkedMem {
    pub ui_version: u32,
    pub ui_tick: u32,
    pub avatar_position: [f32; 3],
    pub avatar_front: [f32; 3],
    pub avatar_top: [f32; 3],
    pub name: [WChar; NAME_CAPACITY],
    pub camera_position: [f32; 3],
    pub camera_front: [f32; 3],
    pub camera_top: [f32; 3],
    pub identity: [WChar; IDENTITY_CAPACITY],
    pub context_len: u32,
    pub context: [u8; CONTEXT_CAPACITY],
    pub description: [WChar; DESCRIPTION_CAPACITY],
}

impl LinkedMem {
    /// All-zero record, which Mumble treats as "no game linked"
    pub fn zeroed() -> Self {
        Self {
            ui_version: 0,
            ui_tick: 0,
            avatar_position: [0.0; 3],
            avatar_front: [0.0; 3],
            avatar_top: [0.0; 3],
            name: [0; NAME_CAPACITY],
            camera_position: [0.0; 3],
            camera_front: [0.0; 3],
            camera_top: [0.0; 3],
            identity: [0; IDENTITY_CAPACITY],
            context_len: 0,
            context: [0; CONTEXT_CAPACITY],
            description: [0; DESCRIPTION_CAPACITY],
        }
    }

    /// Encode a snapshot into the shared layout
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let (context, context_len) = encode_context(&snapshot.context);
        Self {
            ui_version: snapshot.ui_version,
            ui_tick: snapshot.ui_tick,
            avatar_position: snapshot.avatar_position,
            avatar_front: snapshot.avatar_front,
            avatar_top: snapshot.avatar_top,
            name: encode_wide(&snapshot.name),
            camera_position: snapshot.camera_position,
            camera_front: snapshot.camera_front,
            camera_top: snapshot.camera_top,
            identity: encode_wide(&snapshot.identity),
            context_len,
            context,
            description: encode_wide(&snapshot.description),
        }
    }

    /// Decode the shared layout back into a snapshot
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            ui_version: self.ui_version,
            ui_tick: self.ui_tick,
            avatar_position: self.avatar_position,
            avatar_front: self.avatar_front,
            avatar_top: self.avatar_top,
            name: decode_wide(&self.name),
            camera_position: self.camera_position,
            camera_front: self.camera_front,
            camera_top: self.camera_top,
            identity: decode_wide(&self.identity),
            context: self.context_str(),
            description: decode_wide(&self.description),
        }
    }

    /// Parse a record from raw segment bytes
    pub fn parse_from_memory(memory: &[u8]) -> Result<Self> {
        if memory.len() < LINKED_MEM_SIZE {
            return Err(LinkError::SegmentTooSmall {
                expected: LINKED_MEM_SIZE,
                found: memory.len(),
            });
        }

        // Safety: length checked above; every field accepts any bit pattern
        let mem = unsafe { std::ptr::read_unaligned(memory.as_ptr() as *const LinkedMem) };
        trace!(ui_version = mem.ui_version, ui_tick = mem.ui_tick, "Parsed link record");
        Ok(mem)
    }

    /// View the record as the exact bytes written into the segment
    pub fn as_bytes(&self) -> &[u8] {
        // Safety: repr(C) without padding (size asserted at compile time)
        unsafe { std::slice::from_raw_parts(self as *const Self as *const u8, LINKED_MEM_SIZE) }
    }

    /// Whether a game has ever written the record
    pub fn is_linked(&self) -> bool {
        self.ui_version == LINK_VERSION
    }

    pub fn name(&self) -> String {
        decode_wide(&self.name)
    }

    pub fn identity(&self) -> String {
        decode_wide(&self.identity)
    }

    pub fn description(&self) -> String {
        decode_wide(&self.description)
    }

    pub fn context_str(&self) -> String {
        let len = (self.context_len as usize).min(CONTEXT_CAPACITY);
        String::from_utf8_lossy(&self.context[..len]).into_owned()
    }
}

/// Encode into a NUL-terminated wide buffer, truncating on a character boundary
#[cfg(windows)]
pub fn encode_wide<const N: usize>(s: &str) -> [WChar; N] {
    let mut out = [0; N];
    let mut len = 0;
    for ch in s.chars() {
        let mut units = [0u16; 2];
        let encoded = ch.encode_utf16(&mut units);
        if len + encoded.len() >= N {
            break;
        }
        out[len..len + encoded.len()].copy_from_slice(encoded);
        len += encoded.len();
    }
    out
}

/// Encode into a NUL-terminated wide buffer, truncating on a character boundary
#[cfg(not(windows))]
pub fn encode_wide<const N: usize>(s: &str) -> [WChar; N] {
    let mut out = [0; N];
    for (slot, ch) in out.iter_mut().take(N.saturating_sub(1)).zip(s.chars()) {
        *slot = ch as u32;
    }
    out
}

/// Decode a NUL-terminated wide buffer
#[cfg(windows)]
pub fn decode_wide(units: &[WChar]) -> String {
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..end])
}

/// Decode a NUL-terminated wide buffer
#[cfg(not(windows))]
pub fn decode_wide(units: &[WChar]) -> String {
    units
        .iter()
        .take_while(|&&u| u != 0)
        .map(|&u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn encode_context(context: &str) -> ([u8; CONTEXT_CAPACITY], u32) {
    let mut end = context.len().min(CONTEXT_CAPACITY);
    while !context.is_char_boundary(end) {
        end -= 1;
    }

    let mut out = [0u8; CONTEXT_CAPACITY];
    out[..end].copy_from_slice(&context.as_bytes()[..end]);
    (out, end as u32)
}
