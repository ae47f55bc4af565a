//! Snapshot encoder
//!
//! Turns the host's per-tick state into a [`Snapshot`] in link axes:
//!
//! 1. Position, look and up vectors go through [`Vec3::to_link_axes`].
//! 2. The vertical slot of the position is pushed by a per-world offset so
//!    players in different worlds end up far apart and the voice client's
//!    distance attenuation mutes them. Players sharing a world share the
//!    offset, so distances inside a world are untouched.
//! 3. Identity and context are serialized as JSON for the peer.

use crate::Result;
use crate::config::ClientConfig;
use crate::types::{Context, Identity, LINK_VERSION, PlayerState, Snapshot, Vec3, WorldState};

/// Offsets repeat every this many hash values
pub const WORLD_OFFSET_MODULUS: i32 = 2048;

/// Index of the vertical axis in link space
pub const VERTICAL_SLOT: usize = 2;

/// Deterministic 32-bit hash of a world identifier.
///
/// Polynomial hash over UTF-16 code units (`h = 31 * h + unit`, wrapping), so
/// every process computes the same value for the same identifier.
pub fn stable_hash(identifier: &str) -> i32 {
    identifier.encode_utf16().fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Vertical offset for a world with the given hash.
///
/// The modulus is Euclidean, so negative hashes also land in `[0, 2048)`.
pub fn muting_offset(hash: i32, adjust_per_unit: f32) -> f32 {
    hash.rem_euclid(WORLD_OFFSET_MODULUS) as f32 * adjust_per_unit
}

/// Vertical offset applied to every player in `world`.
pub fn world_offset(world: &WorldState, adjust_per_unit: f32) -> f32 {
    muting_offset(stable_hash(&world.identifier), adjust_per_unit)
}

/// Build the snapshot for one tick.
///
/// `ui_tick` is left at 0; [`crate::LinkedSegment::publish`] stamps it.
pub fn compute_snapshot(
    player: &PlayerState,
    world: &WorldState,
    config: &ClientConfig,
) -> Result<Snapshot> {
    let mut position = player.eye_position.to_link_axes();
    position[VERTICAL_SLOT] += world_offset(world, config.world_axis_adjust);

    let front = player.look.to_link_axes();
    let top = player.up.to_link_axes();

    let identity = serde_json::to_string(&Identity {
        name: &player.name,
        world: &world.identifier,
    })?;
    let context = serde_json::to_string(&Context { domain: &config.context_domain })?;

    Ok(Snapshot {
        ui_version: LINK_VERSION,
        ui_tick: 0,
        avatar_position: position,
        avatar_front: front,
        avatar_top: top,
        name: config.application_name.clone(),
        camera_position: position,
        camera_front: front,
        camera_top: top,
        identity,
        context,
        description: config.description.clone(),
    })
}

/// Unit look vector from yaw and pitch in degrees.
///
/// Host convention: yaw 0 faces +Z, yaw 90 faces -X, positive pitch looks
/// down.
pub fn look_vector(yaw_degrees: f32, pitch_degrees: f32) -> Vec3 {
    let yaw = (yaw_degrees as f64).to_radians();
    let pitch = (pitch_degrees as f64).to_radians();
    Vec3::new(-yaw.sin() * pitch.cos(), -pitch.sin(), yaw.cos() * pitch.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{player_at, world};
    use crate::types::link_magnitude;
    use proptest::prelude::*;

    fn config_with_adjust(adjust: f32) -> ClientConfig {
        ClientConfig { world_axis_adjust: adjust, ..ClientConfig::default() }
    }

    #[test]
    fn stable_hash_matches_known_values() {
        assert_eq!(stable_hash(""), 0);
        assert_eq!(stable_hash("a"), 97);
        assert_eq!(stable_hash("ab"), 97 * 31 + 98);
        // Wrapping arithmetic over a longer identifier
        assert_eq!(stable_hash("minecraft:overworld"), stable_hash("minecraft:overworld"));
        assert_ne!(stable_hash("minecraft:overworld"), stable_hash("minecraft:the_nether"));
    }

    #[test]
    fn offset_for_small_hash_is_the_hash() {
        assert_eq!(muting_offset(5, 1.0), 5.0);
    }

    #[test]
    fn hashes_congruent_mod_2048_share_offset() {
        assert_eq!(muting_offset(5, 1.0), muting_offset(2053, 1.0));
        assert_eq!(muting_offset(2053, 1.0), 5.0);
    }

    #[test]
    fn negative_hashes_stay_in_range() {
        assert_eq!(muting_offset(-1, 1.0), 2047.0);
        assert_eq!(muting_offset(i32::MIN, 1.0), 0.0);
    }

    #[test]
    fn zero_adjust_disables_muting() {
        assert_eq!(world_offset(&world("minecraft:the_end"), 0.0), 0.0);
    }

    #[test]
    fn known_state_converts_axes() {
        let config = config_with_adjust(0.0);
        let mut player = player_at("Steve", 10.0, 64.0, -20.0);
        player.look = Vec3::new(0.0, 0.0, 1.0);

        let snapshot =
            compute_snapshot(&player, &world("minecraft:overworld"), &config).expect("snapshot");

        assert_eq!(snapshot.avatar_position, [10.0, -20.0, 64.0]);
        assert_eq!(snapshot.avatar_front, [0.0, 1.0, 0.0]);
        assert_eq!(snapshot.avatar_top, [0.0, 0.0, 1.0]);
        assert_eq!(snapshot.camera_position, snapshot.avatar_position);
        assert_eq!(snapshot.camera_front, snapshot.avatar_front);
        assert_eq!(snapshot.camera_top, snapshot.avatar_top);
        assert_eq!(snapshot.ui_version, LINK_VERSION);
    }

    #[test]
    fn offset_lands_on_vertical_slot() {
        let config = config_with_adjust(1.0);
        let overworld = world("minecraft:overworld");
        let player = player_at("Steve", 0.0, 64.0, 0.0);

        let snapshot = compute_snapshot(&player, &overworld, &config).expect("snapshot");
        let offset = world_offset(&overworld, 1.0);

        assert_eq!(snapshot.avatar_position[0], 0.0);
        assert_eq!(snapshot.avatar_position[1], 0.0);
        assert_eq!(snapshot.avatar_position[2], 64.0 + offset);
    }

    #[test]
    fn identity_and_context_are_json() {
        let config = ClientConfig::default();
        let snapshot = compute_snapshot(
            &player_at("Alex", 0.0, 0.0, 0.0),
            &world("minecraft:the_nether"),
            &config,
        )
        .expect("snapshot");

        let identity: serde_json::Value = serde_json::from_str(&snapshot.identity).expect("json");
        assert_eq!(identity["name"], "Alex");
        assert_eq!(identity["world"], "minecraft:the_nether");

        let context: serde_json::Value = serde_json::from_str(&snapshot.context).expect("json");
        assert_eq!(context["domain"], "AllTalk");

        assert_eq!(snapshot.name, config.application_name);
        assert_eq!(snapshot.description, config.description);
    }

    #[test]
    fn look_vector_cardinal_directions() {
        let south = look_vector(0.0, 0.0);
        assert!((south.z - 1.0).abs() < 1e-9);

        let west = look_vector(90.0, 0.0);
        assert!((west.x + 1.0).abs() < 1e-9);

        let down = look_vector(0.0, 90.0);
        assert!((down.y + 1.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn front_and_top_keep_their_length(
            yaw in -180.0f32..180.0,
            pitch in -90.0f32..90.0,
        ) {
            let mut player = player_at("Steve", 0.0, 0.0, 0.0);
            player.look = look_vector(yaw, pitch);
            let snapshot = compute_snapshot(&player, &world("minecraft:overworld"), &ClientConfig::default())
                .expect("snapshot");

            prop_assert!((link_magnitude(snapshot.avatar_front) - 1.0).abs() < 1e-5);
            prop_assert!((link_magnitude(snapshot.avatar_top) - 1.0).abs() < 1e-6);
        }

        #[test]
        fn players_in_one_world_share_the_offset(
            world_id in "[a-z]{1,12}:[a-z_]{1,16}",
            ax in -1000.0f64..1000.0, ay in -64.0f64..320.0, az in -1000.0f64..1000.0,
            bx in -1000.0f64..1000.0, by in -64.0f64..320.0, bz in -1000.0f64..1000.0,
        ) {
            let config = config_with_adjust(1.0);
            let shared = world(&world_id);
            let a = compute_snapshot(&player_at("A", ax, ay, az), &shared, &config).expect("a");
            let b = compute_snapshot(&player_at("B", bx, by, bz), &shared, &config).expect("b");

            let offset = world_offset(&shared, 1.0);
            prop_assert!((a.avatar_position[2] - (ay as f32 + offset)).abs() < 1e-3);
            prop_assert!((b.avatar_position[2] - (by as f32 + offset)).abs() < 1e-3);

            // Vertical separation is what it was in host space
            let host_dy = (ay - by) as f32;
            let link_dy = a.avatar_position[2] - b.avatar_position[2];
            prop_assert!((host_dy - link_dy).abs() < 1e-2);
        }

        #[test]
        fn offset_is_pure(hash in any::<i32>(), adjust in 0.0f32..16.0) {
            let first = muting_offset(hash, adjust);
            prop_assert_eq!(first, muting_offset(hash, adjust));
            prop_assert_eq!(first, muting_offset(hash.wrapping_add(WORLD_OFFSET_MODULUS), adjust));
            prop_assert!(first >= 0.0);
            prop_assert!(first <= (WORLD_OFFSET_MODULUS - 1) as f32 * adjust);
        }
    }
}
