//! Dense leaf storage

use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::location::{Dimensions3D, VoxelLocation};
use crate::voxel::mesh::{out_of_range, VoxelMesh, VoxelMeshMut};
use crate::voxel::voxel::Voxel;

/// One voxel per cell in a buffer sized exactly to the mesh extent.
///
/// Cells are stored in Z-Y-X order (x varies fastest).
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayVoxelMesh {
    start: VoxelLocation,
    dimensions: Dimensions3D,
    voxels: Vec<Voxel>,
}

impl ArrayVoxelMesh {
    /// Empty mesh anchored at the origin
    pub fn new(dimensions: Dimensions3D) -> Self {
        Self::with_start(VoxelLocation::ZERO, dimensions)
    }

    /// Empty mesh whose first cell is addressed as `start`
    pub fn with_start(start: VoxelLocation, dimensions: Dimensions3D) -> Self {
        Self {
            start,
            dimensions,
            voxels: vec![Voxel::EMPTY; dimensions.volume()],
        }
    }

    /// Wrap an existing Z-Y-X ordered buffer
    pub fn from_voxels(dimensions: Dimensions3D, voxels: Vec<Voxel>) -> Result<Self> {
        if dimensions.checked_volume() != Some(voxels.len()) {
            return Err(Error::InvalidData(format!(
                "{} voxels supplied for a {} mesh",
                voxels.len(),
                dimensions
            )));
        }
        Ok(Self { start: VoxelLocation::ZERO, dimensions, voxels })
    }

    /// Mesh whose cell at each local location is `f(location)`
    pub fn from_fn(dimensions: Dimensions3D, f: impl FnMut(VoxelLocation) -> Voxel) -> Self {
        Self {
            start: VoxelLocation::ZERO,
            dimensions,
            voxels: dimensions.locations().map(f).collect(),
        }
    }

    /// Mesh of the given extent with every cell set to `voxel`
    pub fn filled(dimensions: Dimensions3D, voxel: Voxel) -> Self {
        Self {
            start: VoxelLocation::ZERO,
            dimensions,
            voxels: vec![voxel; dimensions.volume()],
        }
    }

    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    pub fn fill(&mut self, voxel: Voxel) {
        self.voxels.fill(voxel);
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        self.fill(Voxel::EMPTY);
    }

    /// Number of occupied cells
    pub fn solid_count(&self) -> usize {
        self.voxels.iter().filter(|v| !v.is_empty()).count()
    }

    fn index(&self, location: VoxelLocation) -> Result<usize> {
        self.dimensions
            .linear_index(location - self.start)
            .ok_or_else(|| out_of_range(location, self.dimensions))
    }
}

impl VoxelMesh for ArrayVoxelMesh {
    fn start(&self) -> VoxelLocation {
        self.start
    }

    fn dimensions(&self) -> Dimensions3D {
        self.dimensions
    }

    fn get(&self, location: VoxelLocation) -> Result<Voxel> {
        Ok(self.voxels[self.index(location)?])
    }

    fn is_empty(&self) -> bool {
        self.voxels.iter().all(|v| v.is_empty())
    }

    fn is_full(&self) -> bool {
        self.voxels.iter().all(|v| !v.is_empty())
    }
}

impl VoxelMeshMut for ArrayVoxelMesh {
    fn set(&mut self, location: VoxelLocation, voxel: Voxel) -> Result<()> {
        let index = self.index(location)?;
        self.voxels[index] = voxel;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        ArrayVoxelMesh::clear(self);
        Ok(())
    }
}
