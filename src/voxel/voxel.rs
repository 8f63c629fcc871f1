//! Voxel data type

use bytemuck::{Pod, Zeroable};
use rkyv::{Archive, Deserialize, Serialize};

/// Single voxel - an RGBA8 color, exactly 4 bytes.
///
/// Occupancy is encoded in the color itself: a cell is empty iff it equals
/// [`Voxel::EMPTY`]. Alpha carries no occupancy meaning, so a fully
/// transparent non-black color is still a solid cell. Always test occupancy
/// with [`Voxel::is_empty`].
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash,
    Pod, Zeroable, Archive, Deserialize, Serialize,
    serde::Serialize, serde::Deserialize,
)]
pub struct Voxel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Voxel {
    /// Empty/air voxel; the only value treated as unoccupied
    pub const EMPTY: Voxel = Voxel::rgba(0, 0, 0, 0);

    /// Create voxel from RGBA values
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create opaque voxel from RGB values
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Check if voxel is empty (air)
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Normalized color for vertex buffers
    pub fn to_f32_array(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size() {
        assert_eq!(std::mem::size_of::<Voxel>(), 4);
    }

    #[test]
    fn test_empty() {
        assert!(Voxel::EMPTY.is_empty());
        assert!(Voxel::default().is_empty());
        assert!(!Voxel::rgb(255, 0, 0).is_empty());
    }

    #[test]
    fn test_alpha_is_not_occupancy() {
        // Zero alpha with a color is occupied; full alpha black is occupied too.
        assert!(!Voxel::rgba(10, 20, 30, 0).is_empty());
        assert!(!Voxel::rgba(0, 0, 0, 255).is_empty());
    }

    #[test]
    fn test_to_f32_array() {
        assert_eq!(Voxel::rgb(255, 0, 0).to_f32_array(), [1.0, 0.0, 0.0, 1.0]);
    }
}
