//! Sparse, logically unbounded voxel map made of lazily created chunks

use std::collections::HashMap;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::builder::VoxelMeshBuilder;
use crate::voxel::chunk::{ChunkCoord, ChunkVoxelMesh};
use crate::voxel::location::{Dimensions3D, VoxelLocation};
use crate::voxel::mesh::{MeshKind, VoxelMesh, VoxelMeshMut};
use crate::voxel::storage::VoxelStorage;
use crate::voxel::voxel::Voxel;

/// Chunk coordinate -> chunk mesh. Any location is addressable; reads of
/// chunks that were never written return empty without materializing them.
///
/// `start`/`dimensions` report the bounding box of materialized chunks.
#[derive(Clone, Debug)]
pub struct MapVoxelMesh {
    chunk_size: Dimensions3D,
    chunks: HashMap<ChunkCoord, ChunkVoxelMesh>,
    builder: Box<dyn VoxelMeshBuilder>,
}

impl MapVoxelMesh {
    /// Create an empty map whose chunks are built by `builder`
    pub fn new(chunk_size: Dimensions3D, builder: Box<dyn VoxelMeshBuilder>) -> Result<Self> {
        if chunk_size.is_degenerate() {
            return Err(Error::InvalidData(format!("chunk size {} has a zero extent", chunk_size)));
        }
        Ok(Self {
            chunk_size,
            chunks: HashMap::new(),
            builder,
        })
    }

    pub fn chunk_size(&self) -> Dimensions3D {
        self.chunk_size
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Materialized chunk coordinates, sorted
    pub fn keys(&self) -> Vec<ChunkCoord> {
        let mut keys: Vec<ChunkCoord> = self.chunks.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkVoxelMesh> {
        self.chunks.get(&coord)
    }

    pub fn chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut ChunkVoxelMesh> {
        self.chunks.get_mut(&coord)
    }

    /// Chunk at `coord`, built on first reference
    pub fn chunk_or_create(&mut self, coord: ChunkCoord) -> &mut ChunkVoxelMesh {
        let chunk_size = self.chunk_size;
        let builder = &self.builder;
        self.chunks.entry(coord).or_insert_with(|| {
            log::debug!("Materializing chunk {:?} ({})", coord, chunk_size);
            ChunkVoxelMesh::new(coord, builder.build(chunk_size))
        })
    }

    /// Install pre-built chunk storage. Fails if the coordinate is taken.
    pub fn insert_chunk(&mut self, coord: ChunkCoord, storage: VoxelStorage) -> Result<()> {
        if storage.dimensions() != self.chunk_size {
            return Err(Error::InvalidData(format!(
                "chunk storage {} does not match chunk size {}",
                storage.dimensions(),
                self.chunk_size
            )));
        }
        if self.chunks.contains_key(&coord) {
            return Err(Error::DoubleInitialization(format!("chunk {:?}", coord)));
        }
        let mut chunk = ChunkVoxelMesh::new(coord, storage);
        chunk.mark_dirty();
        self.chunks.insert(coord, chunk);
        Ok(())
    }

    pub fn remove_chunk(&mut self, coord: ChunkCoord) -> Option<ChunkVoxelMesh> {
        self.chunks.remove(&coord)
    }

    /// Drop chunks that no longer hold any solid cell
    pub fn prune(&mut self) {
        let before = self.chunks.len();
        self.chunks.retain(|_, chunk| !chunk.is_empty());
        if self.chunks.len() != before {
            log::debug!("Pruned {} empty chunks", before - self.chunks.len());
        }
    }

    /// Coordinates of chunks modified since the last [`take_dirty_chunks`](Self::take_dirty_chunks)
    pub fn dirty_chunks(&self) -> Vec<ChunkCoord> {
        let mut dirty: Vec<ChunkCoord> = self
            .chunks
            .values()
            .filter(|chunk| chunk.is_dirty())
            .map(ChunkVoxelMesh::coord)
            .collect();
        dirty.sort();
        dirty
    }

    pub fn is_chunk_dirty(&self, coord: ChunkCoord) -> bool {
        self.chunks.get(&coord).is_some_and(ChunkVoxelMesh::is_dirty)
    }

    pub fn has_dirty(&self) -> bool {
        self.chunks.values().any(ChunkVoxelMesh::is_dirty)
    }

    /// Take all dirty chunk coordinates and mark those chunks clean
    pub fn take_dirty_chunks(&mut self) -> Vec<ChunkCoord> {
        let dirty = self.dirty_chunks();
        for coord in &dirty {
            if let Some(chunk) = self.chunks.get_mut(coord) {
                chunk.mark_clean();
            }
        }
        dirty
    }

    /// Min and max (inclusive) materialized chunk coordinates
    fn chunk_range(&self) -> Option<(ChunkCoord, ChunkCoord)> {
        let mut keys = self.chunks.keys();
        let first = *keys.next()?;
        Some(keys.fold((first, first), |(lo, hi), c| {
            (
                ChunkCoord::new(lo.x.min(c.x), lo.y.min(c.y), lo.z.min(c.z)),
                ChunkCoord::new(hi.x.max(c.x), hi.y.max(c.y), hi.z.max(c.z)),
            )
        }))
    }
}

impl VoxelMesh for MapVoxelMesh {
    fn start(&self) -> VoxelLocation {
        self.chunk_range()
            .map_or(VoxelLocation::ZERO, |(lo, _)| lo.origin(self.chunk_size))
    }

    fn dimensions(&self) -> Dimensions3D {
        match self.chunk_range() {
            Some((lo, hi)) => {
                let end = ChunkCoord::new(hi.x + 1, hi.y + 1, hi.z + 1).origin(self.chunk_size);
                Dimensions3D::between(lo.origin(self.chunk_size), end)
            }
            None => Dimensions3D::ZERO,
        }
    }

    /// Unbounded: every location maps to some chunk
    fn contains(&self, _location: VoxelLocation) -> bool {
        true
    }

    fn get(&self, location: VoxelLocation) -> Result<Voxel> {
        let coord = ChunkCoord::from_location(location, self.chunk_size);
        match self.chunks.get(&coord) {
            Some(chunk) => chunk.get(ChunkCoord::local(location, self.chunk_size)),
            None => Ok(Voxel::EMPTY),
        }
    }

    fn is_empty(&self) -> bool {
        self.chunks.values().all(|chunk| chunk.is_empty())
    }

    /// Full iff the materialized chunks tile their bounding box and are all full
    fn is_full(&self) -> bool {
        let Some((lo, hi)) = self.chunk_range() else {
            return true;
        };
        let grid = (hi.x - lo.x + 1) as usize * (hi.y - lo.y + 1) as usize * (hi.z - lo.z + 1) as usize;
        grid == self.chunks.len() && self.chunks.values().all(|chunk| chunk.is_full())
    }

    fn kind(&self) -> MeshKind<'_> {
        MeshKind::Map(self)
    }
}

impl VoxelMeshMut for MapVoxelMesh {
    fn set(&mut self, location: VoxelLocation, voxel: Voxel) -> Result<()> {
        let coord = ChunkCoord::from_location(location, self.chunk_size);
        let local = ChunkCoord::local(location, self.chunk_size);
        if voxel.is_empty() {
            // Writing air into an unmaterialized chunk changes nothing
            return match self.chunks.get_mut(&coord) {
                Some(chunk) => chunk.set(local, voxel),
                None => Ok(()),
            };
        }
        self.chunk_or_create(coord).set(local, voxel)
    }

    /// Clear every materialized chunk. Chunks stay materialized and dirty so
    /// downstream consumers see the change; use [`prune`](Self::prune) to drop them.
    fn clear(&mut self) -> Result<()> {
        for chunk in self.chunks.values_mut() {
            chunk.clear()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::builder::{ArrayBuilder, OctreeNodeBuilder};

    const RED: Voxel = Voxel::rgb(255, 0, 0);

    fn map() -> MapVoxelMesh {
        MapVoxelMesh::new(Dimensions3D::cube(4), Box::new(ArrayBuilder)).unwrap()
    }

    #[test]
    fn test_empty_map() {
        let map = map();
        assert!(map.is_empty());
        assert_eq!(map.dimensions(), Dimensions3D::ZERO);
        assert_eq!(map.get(VoxelLocation::new(-100, 5, 1000)).unwrap(), Voxel::EMPTY);
        assert_eq!(map.chunk_count(), 0);
    }

    #[test]
    fn test_set_materializes_only_touched_chunk() {
        let mut map = map();
        map.set(VoxelLocation::new(5, -1, 0), RED).unwrap();
        assert_eq!(map.keys(), vec![ChunkCoord::new(1, -1, 0)]);
        assert_eq!(map.get(VoxelLocation::new(5, -1, 0)).unwrap(), RED);
        assert_eq!(map.start(), VoxelLocation::new(4, -4, 0));
        assert_eq!(map.dimensions(), Dimensions3D::cube(4));
    }

    #[test]
    fn test_empty_write_does_not_materialize() {
        let mut map = map();
        map.set(VoxelLocation::new(1, 1, 1), Voxel::EMPTY).unwrap();
        assert_eq!(map.chunk_count(), 0);
    }

    #[test]
    fn test_dirty_tracking_per_chunk() {
        let mut map = map();
        map.set(VoxelLocation::new(0, 0, 0), RED).unwrap();
        map.set(VoxelLocation::new(9, 0, 0), RED).unwrap();
        assert_eq!(map.take_dirty_chunks(), vec![ChunkCoord::new(0, 0, 0), ChunkCoord::new(2, 0, 0)]);
        assert!(!map.has_dirty());

        map.set(VoxelLocation::new(10, 0, 0), RED).unwrap();
        assert!(map.is_chunk_dirty(ChunkCoord::new(2, 0, 0)));
        assert!(!map.is_chunk_dirty(ChunkCoord::new(0, 0, 0)));
        assert_eq!(map.dirty_chunks(), vec![ChunkCoord::new(2, 0, 0)]);
    }

    #[test]
    fn test_bounds_span_chunks() {
        let mut map = map();
        map.set(VoxelLocation::new(-1, 0, 0), RED).unwrap();
        map.set(VoxelLocation::new(4, 4, 4), RED).unwrap();
        assert_eq!(map.start(), VoxelLocation::new(-4, 0, 0));
        assert_eq!(map.end(), VoxelLocation::new(8, 8, 8));
        assert!(!map.is_full());
    }

    #[test]
    fn test_full_single_chunk() {
        let mut map = map();
        for local in Dimensions3D::cube(4).locations() {
            map.set(local, RED).unwrap();
        }
        assert!(map.is_full());
        map.clear().unwrap();
        assert!(map.is_empty());
        assert_eq!(map.chunk_count(), 1);
        map.prune();
        assert_eq!(map.chunk_count(), 0);
    }

    #[test]
    fn test_insert_chunk_twice_fails() {
        let mut map = MapVoxelMesh::new(
            Dimensions3D::cube(4),
            Box::new(OctreeNodeBuilder::new(Dimensions3D::cube(2))),
        ).unwrap();
        let coord = ChunkCoord::new(3, 3, 3);
        map.insert_chunk(coord, ArrayBuilder.build(Dimensions3D::cube(4))).unwrap();
        assert!(matches!(
            map.insert_chunk(coord, ArrayBuilder.build(Dimensions3D::cube(4))),
            Err(Error::DoubleInitialization(_))
        ));
        assert!(map.insert_chunk(ChunkCoord::new(0, 0, 0), ArrayBuilder.build(Dimensions3D::cube(2))).is_err());
    }

    #[test]
    fn test_rejects_degenerate_chunk_size() {
        assert!(MapVoxelMesh::new(Dimensions3D::new(4, 0, 4), Box::new(ArrayBuilder)).is_err());
    }
}
