//! Host-space vectors and the conversion into link axes

use serde::{Deserialize, Serialize};

/// A vector in host coordinates.
///
/// Host space is right-handed: X right, Y up, Z pointing back toward the
/// viewer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Unit vector pointing up in host space.
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Convert into the link's left-handed axes.
    ///
    /// Y and Z trade places, so the vertical axis lands in slot 2. A single
    /// swap is a reflection, which is what flips the handedness. The same
    /// conversion applies to positions, front and top vectors.
    pub fn to_link_axes(self) -> [f32; 3] {
        [self.x as f32, self.z as f32, self.y as f32]
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Euclidean length of a link-space triple.
pub fn link_magnitude(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn up_maps_to_third_slot() {
        assert_eq!(Vec3::UP.to_link_axes(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn known_vectors_convert() {
        assert_eq!(Vec3::new(1.0, 2.0, 3.0).to_link_axes(), [1.0, 3.0, 2.0]);
        assert_eq!(Vec3::new(0.0, 0.0, -1.0).to_link_axes(), [0.0, -1.0, 0.0]);
        assert_eq!(Vec3::new(-4.5, 64.0, 100.25).to_link_axes(), [-4.5, 100.25, 64.0]);
    }

    #[test]
    fn conversion_flips_handedness() {
        // Right-handed basis: x cross y = z
        let x = Vec3::new(1.0, 0.0, 0.0).to_link_axes();
        let y = Vec3::new(0.0, 1.0, 0.0).to_link_axes();
        let z = Vec3::new(0.0, 0.0, 1.0).to_link_axes();
        let cross = [
            x[1] * y[2] - x[2] * y[1],
            x[2] * y[0] - x[0] * y[2],
            x[0] * y[1] - x[1] * y[0],
        ];
        // In link space the images satisfy x cross y = -z
        assert_eq!(cross, [-z[0], -z[1], -z[2]]);
    }

    proptest! {
        #[test]
        fn conversion_preserves_magnitude(
            x in -30_000_000.0f64..30_000_000.0,
            y in -2048.0f64..4096.0,
            z in -30_000_000.0f64..30_000_000.0,
        ) {
            let v = Vec3::new(x, y, z);
            let expected = v.magnitude();
            let actual = link_magnitude(v.to_link_axes()) as f64;
            prop_assert!((expected - actual).abs() <= expected.max(1.0) * 1e-6);
        }
    }
}
