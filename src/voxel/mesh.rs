//! Read/write contract shared by every voxel mesh variant.

use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::location::{Dimensions3D, VoxelLocation};
use crate::voxel::map::MapVoxelMesh;
use crate::voxel::octree::OctreeVoxelMesh;
use crate::voxel::voxel::Voxel;

/// Storage variants the traversal algorithms know how to descend into.
///
/// Everything else is subdivided generically by bisection.
#[derive(Clone, Copy, Debug)]
pub enum MeshKind<'a> {
    /// Sparse chunk map; only materialized chunks are visited
    Map(&'a MapVoxelMesh),
    /// Octree node; only built children are visited
    Octree(&'a OctreeVoxelMesh),
    Other,
}

/// Readable voxel mesh occupying the half-open box `[start, end)`.
pub trait VoxelMesh {
    /// Minimum corner of the addressable region
    fn start(&self) -> VoxelLocation {
        VoxelLocation::ZERO
    }

    fn dimensions(&self) -> Dimensions3D;

    /// Exclusive maximum corner; `end - start == dimensions`
    fn end(&self) -> VoxelLocation {
        self.start() + self.dimensions().to_location()
    }

    fn contains(&self, location: VoxelLocation) -> bool {
        self.dimensions().contains(location - self.start())
    }

    /// Voxel at `location`, in this mesh's own frame.
    fn get(&self, location: VoxelLocation) -> Result<Voxel>;

    /// True iff every cell is [`Voxel::EMPTY`]
    fn is_empty(&self) -> bool {
        let start = self.start();
        self.dimensions()
            .locations()
            .all(|local| matches!(self.get(start + local), Ok(v) if v.is_empty()))
    }

    /// True iff no cell is [`Voxel::EMPTY`]
    fn is_full(&self) -> bool {
        let start = self.start();
        self.dimensions()
            .locations()
            .all(|local| matches!(self.get(start + local), Ok(v) if !v.is_empty()))
    }

    fn kind(&self) -> MeshKind<'_> {
        MeshKind::Other
    }
}

/// Writable voxel mesh
pub trait VoxelMeshMut: VoxelMesh {
    fn set(&mut self, location: VoxelLocation, voxel: Voxel) -> Result<()>;

    /// Reset every cell to [`Voxel::EMPTY`]
    fn clear(&mut self) -> Result<()> {
        let start = self.start();
        for local in self.dimensions().locations() {
            self.set(start + local, Voxel::EMPTY)?;
        }
        Ok(())
    }
}

/// Range error for `location` against a mesh's frame.
pub fn out_of_range(location: VoxelLocation, dimensions: Dimensions3D) -> Error {
    Error::OutOfRange { location, dimensions }
}

/// Occupancy test that treats cells outside the mesh as empty.
pub fn is_occupied<M: VoxelMesh + ?Sized>(mesh: &M, location: VoxelLocation) -> bool {
    mesh.contains(location) && matches!(mesh.get(location), Ok(v) if !v.is_empty())
}

macro_rules! forward_voxel_mesh {
    ($($ty:ty),*) => {$(
        impl<T: VoxelMesh + ?Sized> VoxelMesh for $ty {
            fn start(&self) -> VoxelLocation { (**self).start() }
            fn dimensions(&self) -> Dimensions3D { (**self).dimensions() }
            fn end(&self) -> VoxelLocation { (**self).end() }
            fn contains(&self, location: VoxelLocation) -> bool { (**self).contains(location) }
            fn get(&self, location: VoxelLocation) -> Result<Voxel> { (**self).get(location) }
            fn is_empty(&self) -> bool { (**self).is_empty() }
            fn is_full(&self) -> bool { (**self).is_full() }
            fn kind(&self) -> MeshKind<'_> { (**self).kind() }
        }
    )*};
}

forward_voxel_mesh!(&T, &mut T, Box<T>);

impl<T: VoxelMeshMut + ?Sized> VoxelMeshMut for &mut T {
    fn set(&mut self, location: VoxelLocation, voxel: Voxel) -> Result<()> {
        (**self).set(location, voxel)
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }
}

impl<T: VoxelMeshMut + ?Sized> VoxelMeshMut for Box<T> {
    fn set(&mut self, location: VoxelLocation, voxel: Voxel) -> Result<()> {
        (**self).set(location, voxel)
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }
}
