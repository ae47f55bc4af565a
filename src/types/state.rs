//! Per-tick state supplied by the host

use serde::{Deserialize, Serialize};

use super::Vec3;

/// The local player as seen by the host on one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Display name, published in the link identity
    pub name: String,
    /// Camera (eye) position in host coordinates
    pub eye_position: Vec3,
    /// Unit look direction
    pub look: Vec3,
    /// Unit up direction, usually [`Vec3::UP`]
    pub up: Vec3,
}

impl PlayerState {
    pub fn new(name: impl Into<String>, eye_position: Vec3, look: Vec3) -> Self {
        Self { name: name.into(), eye_position, look, up: Vec3::UP }
    }
}

/// The world (dimension, instance) the player is in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldState {
    /// Namespaced world identifier such as `minecraft:overworld`
    pub identifier: String,
}

impl WorldState {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self { identifier: identifier.into() }
    }
}

/// What the host reports on a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickState {
    /// A player is loaded into a world; publish a snapshot
    InWorld { player: PlayerState, world: WorldState },
    /// No player or no world (menus, loading screens); unlink
    Absent,
}

impl TickState {
    pub fn in_world(player: PlayerState, world: WorldState) -> Self {
        TickState::InWorld { player, world }
    }

    pub fn is_in_world(&self) -> bool {
        matches!(self, TickState::InWorld { .. })
    }
}
