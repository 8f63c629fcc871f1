//! Construction policies for octree children and map chunks

use std::fmt::Debug;

use crate::voxel::array::ArrayVoxelMesh;
use crate::voxel::location::Dimensions3D;
use crate::voxel::octree::OctreeVoxelMesh;
use crate::voxel::storage::VoxelStorage;

/// Decides what storage backs a region of a given extent.
///
/// Every octree node keeps its own copy of the policy it was built with, so a
/// tree and its not-yet-built subtrees always agree on how to grow.
pub trait VoxelMeshBuilder: Debug {
    fn build(&self, dimensions: Dimensions3D) -> VoxelStorage;

    fn clone_box(&self) -> Box<dyn VoxelMeshBuilder>;
}

impl Clone for Box<dyn VoxelMeshBuilder> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Always builds a dense leaf
#[derive(Clone, Copy, Debug, Default)]
pub struct ArrayBuilder;

impl VoxelMeshBuilder for ArrayBuilder {
    fn build(&self, dimensions: Dimensions3D) -> VoxelStorage {
        VoxelStorage::Array(ArrayVoxelMesh::new(dimensions))
    }

    fn clone_box(&self) -> Box<dyn VoxelMeshBuilder> {
        Box::new(*self)
    }
}

/// Builds octree nodes until a region fits within `min_leaf`, then dense leaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OctreeNodeBuilder {
    min_leaf: Dimensions3D,
}

impl OctreeNodeBuilder {
    pub fn new(min_leaf: Dimensions3D) -> Self {
        Self { min_leaf }
    }

    pub fn min_leaf(&self) -> Dimensions3D {
        self.min_leaf
    }
}

impl VoxelMeshBuilder for OctreeNodeBuilder {
    fn build(&self, dimensions: Dimensions3D) -> VoxelStorage {
        // Single cells cannot be split further, whatever the policy says.
        if dimensions.fits_within(self.min_leaf) || dimensions.volume() <= 1 {
            VoxelStorage::Array(ArrayVoxelMesh::new(dimensions))
        } else {
            VoxelStorage::Octree(OctreeVoxelMesh::new(dimensions, self.clone_box()))
        }
    }

    fn clone_box(&self) -> Box<dyn VoxelMeshBuilder> {
        Box::new(*self)
    }
}
