//! Chunks of a sparse voxel map

use crate::core::types::Result;
use crate::voxel::location::{Dimensions3D, VoxelLocation};
use crate::voxel::mesh::{MeshKind, VoxelMesh, VoxelMeshMut};
use crate::voxel::storage::VoxelStorage;
use crate::voxel::voxel::Voxel;

/// Integer coordinate identifying a chunk in the map grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk holding a voxel location. Floors, so negative locations land in
    /// negative chunks.
    pub fn from_location(location: VoxelLocation, chunk_size: Dimensions3D) -> Self {
        Self {
            x: location.x.div_euclid(chunk_size.width as i32),
            y: location.y.div_euclid(chunk_size.height as i32),
            z: location.z.div_euclid(chunk_size.depth as i32),
        }
    }

    /// Location of the chunk's minimum corner
    pub fn origin(&self, chunk_size: Dimensions3D) -> VoxelLocation {
        VoxelLocation::new(self.x, self.y, self.z) * chunk_size
    }

    /// `location` relative to the origin of the chunk that holds it
    pub fn local(location: VoxelLocation, chunk_size: Dimensions3D) -> VoxelLocation {
        VoxelLocation::new(
            location.x.rem_euclid(chunk_size.width as i32),
            location.y.rem_euclid(chunk_size.height as i32),
            location.z.rem_euclid(chunk_size.depth as i32),
        )
    }
}

/// A materialized chunk: storage in chunk-local coordinates plus dirty tracking
#[derive(Clone, Debug)]
pub struct ChunkVoxelMesh {
    coord: ChunkCoord,
    storage: VoxelStorage,
    dirty: bool,
    /// Bumped on every modification, for cache invalidation downstream
    generation: u32,
}

impl ChunkVoxelMesh {
    pub fn new(coord: ChunkCoord, storage: VoxelStorage) -> Self {
        Self {
            coord,
            storage,
            dirty: false,
            generation: 0,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn storage(&self) -> &VoxelStorage {
        &self.storage
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn storage_mut(&mut self) -> &mut VoxelStorage {
        &mut self.storage
    }
}

impl VoxelMesh for ChunkVoxelMesh {
    fn dimensions(&self) -> Dimensions3D {
        self.storage.dimensions()
    }

    fn get(&self, location: VoxelLocation) -> Result<Voxel> {
        self.storage.get(location)
    }

    fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    fn is_full(&self) -> bool {
        self.storage.is_full()
    }

    fn kind(&self) -> MeshKind<'_> {
        self.storage.kind()
    }
}

impl VoxelMeshMut for ChunkVoxelMesh {
    fn set(&mut self, location: VoxelLocation, voxel: Voxel) -> Result<()> {
        self.storage.set(location, voxel)?;
        self.mark_dirty();
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.storage.clear()?;
        self.mark_dirty();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::array::ArrayVoxelMesh;

    #[test]
    fn test_from_location() {
        let size = Dimensions3D::cube(16);
        assert_eq!(ChunkCoord::from_location(VoxelLocation::new(0, 15, 16), size), ChunkCoord::new(0, 0, 1));
        assert_eq!(ChunkCoord::from_location(VoxelLocation::new(-1, -16, -17), size), ChunkCoord::new(-1, -1, -2));
    }

    #[test]
    fn test_origin_and_local_round_trip() {
        let size = Dimensions3D::new(4, 8, 2);
        for location in [VoxelLocation::new(5, -3, 7), VoxelLocation::new(-9, 0, -1)] {
            let coord = ChunkCoord::from_location(location, size);
            let local = ChunkCoord::local(location, size);
            assert!(size.contains(local));
            assert_eq!(coord.origin(size) + local, location);
        }
    }

    #[test]
    fn test_writes_mark_dirty() {
        let storage = ArrayVoxelMesh::new(Dimensions3D::cube(2)).into();
        let mut chunk = ChunkVoxelMesh::new(ChunkCoord::new(0, 0, 0), storage);
        assert!(!chunk.is_dirty());

        chunk.set(VoxelLocation::ZERO, Voxel::rgb(1, 2, 3)).unwrap();
        assert!(chunk.is_dirty());
        assert_eq!(chunk.generation(), 1);

        chunk.mark_clean();
        chunk.clear().unwrap();
        assert!(chunk.is_dirty());
        assert_eq!(chunk.generation(), 2);
        assert!(chunk.is_empty());
    }
}
