//! Integer coordinates and extents

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use glam::{IVec3, Vec3};

/// Absolute or relative integer voxel coordinate
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
    serde::Serialize, serde::Deserialize,
)]
pub struct VoxelLocation {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelLocation {
    pub const ZERO: VoxelLocation = VoxelLocation { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// World-space position of this cell's minimum corner (unit voxels).
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Component-wise minimum
    pub fn min(self, other: VoxelLocation) -> VoxelLocation {
        VoxelLocation::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum
    pub fn max(self, other: VoxelLocation) -> VoxelLocation {
        VoxelLocation::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }
}

impl Add for VoxelLocation {
    type Output = VoxelLocation;

    fn add(self, rhs: VoxelLocation) -> VoxelLocation {
        VoxelLocation::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for VoxelLocation {
    type Output = VoxelLocation;

    fn sub(self, rhs: VoxelLocation) -> VoxelLocation {
        VoxelLocation::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for VoxelLocation {
    type Output = VoxelLocation;

    fn neg(self) -> VoxelLocation {
        VoxelLocation::new(-self.x, -self.y, -self.z)
    }
}

/// Scale a cell index by a cell extent (e.g. chunk index to chunk origin).
impl Mul<Dimensions3D> for VoxelLocation {
    type Output = VoxelLocation;

    fn mul(self, rhs: Dimensions3D) -> VoxelLocation {
        VoxelLocation::new(
            self.x * rhs.width as i32,
            self.y * rhs.height as i32,
            self.z * rhs.depth as i32,
        )
    }
}

impl From<IVec3> for VoxelLocation {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<VoxelLocation> for IVec3 {
    fn from(v: VoxelLocation) -> Self {
        v.to_ivec3()
    }
}

impl fmt::Display for VoxelLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Extent of a box of voxels
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct Dimensions3D {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Dimensions3D {
    pub const ZERO: Dimensions3D = Dimensions3D { width: 0, height: 0, depth: 0 };
    pub const ONE: Dimensions3D = Dimensions3D { width: 1, height: 1, depth: 1 };

    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self { width, height, depth }
    }

    pub const fn cube(size: u32) -> Self {
        Self::new(size, size, size)
    }

    /// Extent of the half-open box `[start, end)`; inverted axes become zero.
    pub fn between(start: VoxelLocation, end: VoxelLocation) -> Self {
        let extent = |a: i32, b: i32| (b - a).max(0) as u32;
        Self::new(extent(start.x, end.x), extent(start.y, end.y), extent(start.z, end.z))
    }

    /// Number of cells
    pub fn volume(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    /// Number of cells, or `None` if it does not fit in `usize`
    pub fn checked_volume(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.depth as usize)
    }

    /// True if any axis has zero extent
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0 || self.depth == 0
    }

    /// Check a local coordinate against `[0, self)`
    pub fn contains(&self, local: VoxelLocation) -> bool {
        local.x >= 0 && local.y >= 0 && local.z >= 0
            && (local.x as u32) < self.width
            && (local.y as u32) < self.height
            && (local.z as u32) < self.depth
    }

    /// True if no axis exceeds the corresponding axis of `other`
    pub fn fits_within(&self, other: Dimensions3D) -> bool {
        self.width <= other.width && self.height <= other.height && self.depth <= other.depth
    }

    pub fn to_location(self) -> VoxelLocation {
        VoxelLocation::new(self.width as i32, self.height as i32, self.depth as i32)
    }

    /// Halve every axis. The upper half absorbs the odd remainder, so
    /// `lower + upper == self` exactly.
    pub fn split(&self) -> (Dimensions3D, Dimensions3D) {
        let lower = Dimensions3D::new(self.width / 2, self.height / 2, self.depth / 2);
        let upper = Dimensions3D::new(
            self.width - lower.width,
            self.height - lower.height,
            self.depth - lower.depth,
        );
        (lower, upper)
    }

    /// Offset and extent of an octant after [`split`](Self::split).
    ///
    /// index: 0-7 (bit 0=x, bit 1=y, bit 2=z); a set bit selects the upper half.
    pub fn octant(&self, index: u8) -> (VoxelLocation, Dimensions3D) {
        debug_assert!(index < 8);
        let (lower, upper) = self.split();
        let pick = |bit: u8, lo: u32, hi: u32| if index & bit != 0 { (lo, hi) } else { (0, lo) };
        let (ox, w) = pick(1, lower.width, upper.width);
        let (oy, h) = pick(2, lower.height, upper.height);
        let (oz, d) = pick(4, lower.depth, upper.depth);
        (
            VoxelLocation::new(ox as i32, oy as i32, oz as i32),
            Dimensions3D::new(w, h, d),
        )
    }

    /// Octant index holding `local`, and `local` re-expressed inside that octant.
    pub fn octant_of(&self, local: VoxelLocation) -> (u8, VoxelLocation) {
        let (lower, _) = self.split();
        let mut index = 0u8;
        let mut offset = VoxelLocation::ZERO;
        if local.x >= lower.width as i32 {
            index |= 1;
            offset.x = lower.width as i32;
        }
        if local.y >= lower.height as i32 {
            index |= 2;
            offset.y = lower.height as i32;
        }
        if local.z >= lower.depth as i32 {
            index |= 4;
            offset.z = lower.depth as i32;
        }
        (index, local - offset)
    }

    /// Linear index of a contained local coordinate, x varying fastest.
    pub fn linear_index(&self, local: VoxelLocation) -> Option<usize> {
        if !self.contains(local) {
            return None;
        }
        Some(
            local.z as usize * self.height as usize * self.width as usize
                + local.y as usize * self.width as usize
                + local.x as usize,
        )
    }

    /// Every local coordinate in `[0, self)`, x varying fastest.
    pub fn locations(self) -> impl Iterator<Item = VoxelLocation> {
        let (w, h, d) = (self.width as i32, self.height as i32, self.depth as i32);
        (0..d).flat_map(move |z| {
            (0..h).flat_map(move |y| (0..w).map(move |x| VoxelLocation::new(x, y, z)))
        })
    }
}

/// Octant index from per-axis half selectors, each 0 or 1.
pub fn octant_index(i: u8, j: u8, k: u8) -> u8 {
    debug_assert!(i < 2 && j < 2 && k < 2);
    i | (j << 1) | (k << 2)
}

impl fmt::Display for Dimensions3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_arithmetic() {
        let a = VoxelLocation::new(1, 2, 3);
        let b = VoxelLocation::new(4, -5, 6);
        assert_eq!(a + b, VoxelLocation::new(5, -3, 9));
        assert_eq!(b - a, VoxelLocation::new(3, -7, 3));
        assert_eq!(-a, VoxelLocation::new(-1, -2, -3));
        assert_eq!(a * Dimensions3D::new(2, 3, 4), VoxelLocation::new(2, 6, 12));
        assert_eq!(VoxelLocation::ZERO, VoxelLocation::default());
    }

    #[test]
    fn test_split_even() {
        let (lower, upper) = Dimensions3D::cube(8).split();
        assert_eq!(lower, Dimensions3D::cube(4));
        assert_eq!(upper, Dimensions3D::cube(4));
    }

    #[test]
    fn test_split_odd_remainder_goes_up() {
        let (lower, upper) = Dimensions3D::new(5, 1, 3).split();
        assert_eq!(lower, Dimensions3D::new(2, 0, 1));
        assert_eq!(upper, Dimensions3D::new(3, 1, 2));
    }

    #[test]
    fn test_octants_partition_volume() {
        let dims = Dimensions3D::new(5, 7, 3);
        let total: usize = (0..8).map(|i| dims.octant(i).1.volume()).sum();
        assert_eq!(total, dims.volume());

        let (offset, size) = dims.octant(octant_index(1, 1, 1));
        assert_eq!(offset, VoxelLocation::new(2, 3, 1));
        assert_eq!(size, Dimensions3D::new(3, 4, 2));
    }

    #[test]
    fn test_octant_of_matches_octant() {
        let dims = Dimensions3D::new(5, 6, 7);
        for local in dims.locations() {
            let (index, inner) = dims.octant_of(local);
            let (offset, size) = dims.octant(index);
            assert_eq!(offset + inner, local);
            assert!(size.contains(inner));
        }
    }

    #[test]
    fn test_contains_and_index() {
        let dims = Dimensions3D::new(2, 3, 4);
        assert!(dims.contains(VoxelLocation::new(1, 2, 3)));
        assert!(!dims.contains(VoxelLocation::new(2, 0, 0)));
        assert!(!dims.contains(VoxelLocation::new(0, -1, 0)));
        assert_eq!(dims.linear_index(VoxelLocation::new(1, 2, 3)), Some(23));
        assert_eq!(dims.locations().count(), 24);
    }

    #[test]
    fn test_checked_volume() {
        assert_eq!(Dimensions3D::new(2, 3, 4).checked_volume(), Some(24));
        assert_eq!(Dimensions3D::new(u32::MAX, u32::MAX, 2).checked_volume(), None);
    }

    #[test]
    fn test_between() {
        let dims = Dimensions3D::between(VoxelLocation::new(-2, 0, 5), VoxelLocation::new(2, 3, 4));
        assert_eq!(dims, Dimensions3D::new(4, 3, 0));
        assert!(dims.is_degenerate());
    }
}
