//! The per-tick record published to the voice client

use serde::{Deserialize, Serialize};

/// Link protocol version written to `ui_version`.
pub const LINK_VERSION: u32 = 2;

/// Complete positional and identity record for one tick.
///
/// All triples are already in link axes (see [`crate::Vec3::to_link_axes`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Snapshot {
    pub ui_version: u32,
    pub ui_tick: u32,
    pub avatar_position: [f32; 3],
    pub avatar_front: [f32; 3],
    pub avatar_top: [f32; 3],
    pub name: String,
    pub camera_position: [f32; 3],
    pub camera_front: [f32; 3],
    pub camera_top: [f32; 3],
    pub identity: String,
    pub context: String,
    pub description: String,
}

impl Snapshot {
    /// Same snapshot stamped with a different tick.
    pub fn with_tick(mut self, tick: u32) -> Self {
        self.ui_tick = tick;
        self
    }
}

/// Identity descriptor, serialized into [`Snapshot::identity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity<'a> {
    pub name: &'a str,
    pub world: &'a str,
}

/// Grouping key, serialized into [`Snapshot::context`].
///
/// Players only hear each other positionally when their contexts match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context<'a> {
    pub domain: &'a str,
}
