//! Coordinate-rewriting views over another mesh.
//!
//! Views never copy cells: reads and writes go straight to the wrapped mesh,
//! which may be borrowed (`&T`, `&mut T`) or owned. A view over `&T` is
//! read-only by construction.

use crate::core::types::Result;
use crate::voxel::location::{Dimensions3D, VoxelLocation};
use crate::voxel::mesh::{out_of_range, MeshKind, VoxelMesh, VoxelMeshMut};
use crate::voxel::voxel::Voxel;

/// Re-anchors a mesh so its first cell is addressed as `start`.
///
/// The translation is fixed when the view is created. A parent whose bounds
/// move later (a sparse map gaining chunks) keeps its cells where they were
/// in the view's frame, and the view's bounds move along with it.
#[derive(Clone, Debug)]
pub struct AbsoluteVoxelMesh<M> {
    parent: M,
    start: VoxelLocation,
    /// Parent location that `start` maps to
    anchor: VoxelLocation,
}

impl<M: VoxelMesh> AbsoluteVoxelMesh<M> {
    pub fn new(parent: M, start: VoxelLocation) -> Self {
        let anchor = parent.start();
        Self::anchored(parent, start, anchor)
    }

    /// View mapping `start` onto the parent location `anchor`
    pub fn anchored(parent: M, start: VoxelLocation, anchor: VoxelLocation) -> Self {
        Self { parent, start, anchor }
    }

    pub fn parent(&self) -> &M {
        &self.parent
    }

    pub fn into_parent(self) -> M {
        self.parent
    }

    /// Location in the parent's frame
    pub fn to_parent(&self, location: VoxelLocation) -> VoxelLocation {
        location - self.start + self.anchor
    }
}

impl<M: VoxelMesh> VoxelMesh for AbsoluteVoxelMesh<M> {
    fn start(&self) -> VoxelLocation {
        self.start + (self.parent.start() - self.anchor)
    }

    fn dimensions(&self) -> Dimensions3D {
        self.parent.dimensions()
    }

    // Unbounded parents accept any location
    fn contains(&self, location: VoxelLocation) -> bool {
        self.parent.contains(self.to_parent(location))
    }

    fn get(&self, location: VoxelLocation) -> Result<Voxel> {
        if !self.contains(location) {
            return Err(out_of_range(location, self.dimensions()));
        }
        self.parent.get(self.to_parent(location))
    }

    fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    fn is_full(&self) -> bool {
        self.parent.is_full()
    }

    // Offsets inside the parent's hierarchy are relative, so traversal can
    // descend through the re-anchoring.
    fn kind(&self) -> MeshKind<'_> {
        self.parent.kind()
    }
}

impl<M: VoxelMeshMut> VoxelMeshMut for AbsoluteVoxelMesh<M> {
    fn set(&mut self, location: VoxelLocation, voxel: Voxel) -> Result<()> {
        if !self.contains(location) {
            return Err(out_of_range(location, self.dimensions()));
        }
        let target = self.to_parent(location);
        self.parent.set(target, voxel)
    }

    fn clear(&mut self) -> Result<()> {
        self.parent.clear()
    }
}

/// Bounded box inside a parent frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    /// Offset from the parent's start
    pub offset: VoxelLocation,
    pub dimensions: Dimensions3D,
}

impl Window {
    pub fn new(offset: VoxelLocation, dimensions: Dimensions3D) -> Self {
        Self { offset, dimensions }
    }

    /// Map a window-local location to an offset from the parent's start.
    /// Out-of-window locations are an error, never clamped.
    pub fn map(&self, local: VoxelLocation) -> Result<VoxelLocation> {
        if !self.dimensions.contains(local) {
            return Err(out_of_range(local, self.dimensions));
        }
        Ok(self.offset + local)
    }

    /// Sub-window in this window's own frame
    pub fn narrow(&self, offset: VoxelLocation, dimensions: Dimensions3D) -> Window {
        Window::new(self.offset + offset, dimensions)
    }

    /// Whether the window lies inside a mesh of the given bounds
    pub fn fits<M: VoxelMesh + ?Sized>(&self, parent: &M) -> bool {
        if self.dimensions.is_degenerate() {
            return true;
        }
        let first = parent.start() + self.offset;
        let last = first + self.dimensions.to_location() - VoxelLocation::new(1, 1, 1);
        parent.contains(first) && parent.contains(last)
    }
}

/// Window into a parent mesh, addressed locally from zero.
#[derive(Clone, Debug)]
pub struct SubMesh<M> {
    parent: M,
    window: Window,
}

impl<M: VoxelMesh> SubMesh<M> {
    /// Fails with `OutOfRange` unless the window lies within `parent`.
    pub fn new(parent: M, offset: VoxelLocation, dimensions: Dimensions3D) -> Result<Self> {
        let window = Window::new(offset, dimensions);
        if !window.fits(&parent) {
            return Err(out_of_range(parent.start() + offset, parent.dimensions()));
        }
        Ok(Self { parent, window })
    }

    /// Skip the containment check; the caller guarantees it.
    pub(crate) fn from_window(parent: M, window: Window) -> Self {
        Self { parent, window }
    }

    pub fn parent(&self) -> &M {
        &self.parent
    }

    pub fn window(&self) -> Window {
        self.window
    }

    /// Location in the parent's frame
    pub fn to_parent(&self, local: VoxelLocation) -> Result<VoxelLocation> {
        Ok(self.parent.start() + self.window.map(local)?)
    }
}

impl<M: VoxelMesh> VoxelMesh for SubMesh<M> {
    fn dimensions(&self) -> Dimensions3D {
        self.window.dimensions
    }

    fn get(&self, location: VoxelLocation) -> Result<Voxel> {
        self.parent.get(self.to_parent(location)?)
    }
}

impl<M: VoxelMeshMut> VoxelMeshMut for SubMesh<M> {
    fn set(&mut self, location: VoxelLocation, voxel: Voxel) -> Result<()> {
        let target = self.to_parent(location)?;
        self.parent.set(target, voxel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::voxel::array::ArrayVoxelMesh;
    use crate::voxel::builder::ArrayBuilder;
    use crate::voxel::map::MapVoxelMesh;

    const RED: Voxel = Voxel::rgb(255, 0, 0);

    #[test]
    fn test_absolute_rebases_frame() {
        let mut array = ArrayVoxelMesh::new(Dimensions3D::cube(4));
        array.set(VoxelLocation::new(1, 2, 3), RED).unwrap();

        let view = AbsoluteVoxelMesh::new(&array, VoxelLocation::new(100, -50, 7));
        assert_eq!(view.get(VoxelLocation::new(101, -48, 10)).unwrap(), RED);
        assert_eq!(view.end(), VoxelLocation::new(104, -46, 11));
        assert!(view.get(VoxelLocation::new(1, 2, 3)).is_err());
    }

    #[test]
    fn test_absolute_writes_through() {
        let mut array = ArrayVoxelMesh::new(Dimensions3D::cube(2));
        {
            let mut view = AbsoluteVoxelMesh::new(&mut array, VoxelLocation::new(10, 10, 10));
            view.set(VoxelLocation::new(11, 10, 10), RED).unwrap();
            assert_eq!(view.get(VoxelLocation::new(11, 10, 10)).unwrap(), RED);
        }
        assert_eq!(array.get(VoxelLocation::new(1, 0, 0)).unwrap(), RED);
    }

    #[test]
    fn test_absolute_over_map_is_unbounded() {
        let mut map = MapVoxelMesh::new(Dimensions3D::cube(4), Box::new(ArrayBuilder)).unwrap();
        map.set(VoxelLocation::new(1, 1, 1), RED).unwrap();
        {
            let mut view = AbsoluteVoxelMesh::new(&mut map, VoxelLocation::new(100, 100, 100));
            // Far outside the materialized chunks
            view.set(VoxelLocation::new(140, 90, 100), RED).unwrap();
            assert_eq!(view.get(VoxelLocation::new(101, 101, 101)).unwrap(), RED);
            assert_eq!(view.get(VoxelLocation::new(140, 90, 100)).unwrap(), RED);
            assert!(view.get(VoxelLocation::new(-500, 0, 0)).unwrap().is_empty());
            // Bounds follow the map as it grows
            assert_eq!(view.start(), VoxelLocation::new(100, 88, 100));
        }
        assert_eq!(map.get(VoxelLocation::new(40, -10, 0)).unwrap(), RED);
    }

    #[test]
    fn test_sub_mesh_maps_and_bounds_checks() {
        let mut array = ArrayVoxelMesh::new(Dimensions3D::cube(8));
        {
            let mut sub = SubMesh::new(&mut array, VoxelLocation::new(2, 3, 4), Dimensions3D::new(2, 2, 2)).unwrap();
            sub.set(VoxelLocation::new(1, 1, 1), RED).unwrap();
            assert!(matches!(
                sub.set(VoxelLocation::new(2, 0, 0), RED),
                Err(Error::OutOfRange { .. })
            ));
            assert!(matches!(
                sub.get(VoxelLocation::new(0, -1, 0)),
                Err(Error::OutOfRange { .. })
            ));
        }
        assert_eq!(array.get(VoxelLocation::new(3, 4, 5)).unwrap(), RED);
    }

    #[test]
    fn test_sub_mesh_must_fit_parent() {
        let array = ArrayVoxelMesh::new(Dimensions3D::cube(4));
        assert!(SubMesh::new(&array, VoxelLocation::new(3, 0, 0), Dimensions3D::cube(2)).is_err());
        assert!(SubMesh::new(&array, VoxelLocation::new(-1, 0, 0), Dimensions3D::cube(1)).is_err());
        assert!(SubMesh::new(&array, VoxelLocation::new(2, 2, 2), Dimensions3D::cube(2)).is_ok());
    }

    #[test]
    fn test_sub_mesh_empty_full() {
        let mut array = ArrayVoxelMesh::new(Dimensions3D::cube(4));
        array.set(VoxelLocation::ZERO, RED).unwrap();
        let solid = SubMesh::new(&array, VoxelLocation::ZERO, Dimensions3D::ONE).unwrap();
        let air = SubMesh::new(&array, VoxelLocation::new(1, 0, 0), Dimensions3D::cube(3)).unwrap();
        assert!(solid.is_full());
        assert!(air.is_empty());
    }

    #[test]
    fn test_views_share_writes() {
        let mut array = ArrayVoxelMesh::new(Dimensions3D::cube(4));
        SubMesh::new(&mut array, VoxelLocation::new(1, 1, 1), Dimensions3D::cube(2))
            .unwrap()
            .set(VoxelLocation::ZERO, RED)
            .unwrap();
        let absolute = AbsoluteVoxelMesh::new(&array, VoxelLocation::new(-1, -1, -1));
        assert_eq!(absolute.get(VoxelLocation::ZERO).unwrap(), RED);
    }
}
