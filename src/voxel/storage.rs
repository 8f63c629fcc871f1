//! Owned storage produced by builders: a dense leaf or an octree node

use crate::core::types::Result;
use crate::voxel::array::ArrayVoxelMesh;
use crate::voxel::location::{Dimensions3D, VoxelLocation};
use crate::voxel::mesh::{MeshKind, VoxelMesh, VoxelMeshMut};
use crate::voxel::octree::OctreeVoxelMesh;
use crate::voxel::voxel::Voxel;

#[derive(Clone, Debug)]
pub enum VoxelStorage {
    Array(ArrayVoxelMesh),
    Octree(OctreeVoxelMesh),
}

impl VoxelStorage {
    pub fn as_array(&self) -> Option<&ArrayVoxelMesh> {
        match self {
            VoxelStorage::Array(array) => Some(array),
            VoxelStorage::Octree(_) => None,
        }
    }

    pub fn as_octree(&self) -> Option<&OctreeVoxelMesh> {
        match self {
            VoxelStorage::Octree(octree) => Some(octree),
            VoxelStorage::Array(_) => None,
        }
    }

    fn mesh(&self) -> &dyn VoxelMesh {
        match self {
            VoxelStorage::Array(array) => array,
            VoxelStorage::Octree(octree) => octree,
        }
    }

    fn mesh_mut(&mut self) -> &mut dyn VoxelMeshMut {
        match self {
            VoxelStorage::Array(array) => array,
            VoxelStorage::Octree(octree) => octree,
        }
    }
}

impl From<ArrayVoxelMesh> for VoxelStorage {
    fn from(array: ArrayVoxelMesh) -> Self {
        VoxelStorage::Array(array)
    }
}

impl From<OctreeVoxelMesh> for VoxelStorage {
    fn from(octree: OctreeVoxelMesh) -> Self {
        VoxelStorage::Octree(octree)
    }
}

impl VoxelMesh for VoxelStorage {
    fn start(&self) -> VoxelLocation {
        self.mesh().start()
    }

    fn dimensions(&self) -> Dimensions3D {
        self.mesh().dimensions()
    }

    fn get(&self, location: VoxelLocation) -> Result<Voxel> {
        self.mesh().get(location)
    }

    fn is_empty(&self) -> bool {
        self.mesh().is_empty()
    }

    fn is_full(&self) -> bool {
        self.mesh().is_full()
    }

    fn kind(&self) -> MeshKind<'_> {
        self.mesh().kind()
    }
}

impl VoxelMeshMut for VoxelStorage {
    fn set(&mut self, location: VoxelLocation, voxel: Voxel) -> Result<()> {
        self.mesh_mut().set(location, voxel)
    }

    fn clear(&mut self) -> Result<()> {
        self.mesh_mut().clear()
    }
}
