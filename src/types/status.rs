//! Link status reported by the driver

use serde::{Deserialize, Serialize};

/// Observable state of the link after a tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct LinkStatus {
    /// Whether a shared segment is currently mapped
    pub connected: bool,
    /// Last tick written into the segment (0 before the first write)
    pub tick: u32,
    /// World of the last published snapshot
    pub world: Option<String>,
}

impl LinkStatus {
    pub fn disconnected() -> Self {
        Self::default()
    }
}
