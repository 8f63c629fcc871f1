//! Octree node storage with lazily built children

use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::builder::VoxelMeshBuilder;
use crate::voxel::location::{Dimensions3D, VoxelLocation};
use crate::voxel::mesh::{out_of_range, MeshKind, VoxelMesh, VoxelMeshMut};
use crate::voxel::storage::VoxelStorage;
use crate::voxel::voxel::Voxel;

/// Internal node owning up to 8 children.
///
/// Child extents come from [`Dimensions3D::octant`], so odd extents give the
/// upper octants the extra cell. A missing child reads as empty; children are
/// built through the node's builder on the first non-empty write into them.
#[derive(Clone, Debug)]
pub struct OctreeVoxelMesh {
    dimensions: Dimensions3D,
    children: [Option<Box<VoxelStorage>>; 8],
    builder: Box<dyn VoxelMeshBuilder>,
}

impl OctreeVoxelMesh {
    /// Create an empty node
    pub fn new(dimensions: Dimensions3D, builder: Box<dyn VoxelMeshBuilder>) -> Self {
        Self {
            dimensions,
            children: Default::default(),
            builder,
        }
    }

    pub fn builder(&self) -> &dyn VoxelMeshBuilder {
        self.builder.as_ref()
    }

    /// Child at octant `index` (bit 0=x, bit 1=y, bit 2=z), if built
    pub fn child(&self, index: u8) -> Option<&VoxelStorage> {
        self.children.get(index as usize)?.as_deref()
    }

    /// Built children with their octant index and offset within this node
    pub fn children(&self) -> impl Iterator<Item = (u8, VoxelLocation, &VoxelStorage)> + '_ {
        self.children.iter().enumerate().filter_map(move |(index, child)| {
            let index = index as u8;
            let child = child.as_deref()?;
            Some((index, self.dimensions.octant(index).0, child))
        })
    }

    /// Install a pre-built child. Fails if the octant is already occupied or
    /// `storage` does not have the octant's extent.
    pub fn init_child(&mut self, index: u8, storage: VoxelStorage) -> Result<()> {
        if index >= 8 {
            return Err(Error::InvalidData(format!("octant index {} out of range", index)));
        }
        let (offset, expected) = self.dimensions.octant(index);
        if storage.dimensions() != expected {
            return Err(Error::InvalidData(format!(
                "child of extent {} does not fit octant {} of extent {}",
                storage.dimensions(),
                index,
                expected
            )));
        }
        let slot = &mut self.children[index as usize];
        if slot.is_some() {
            return Err(Error::DoubleInitialization(format!("octant {} at {}", index, offset)));
        }
        *slot = Some(Box::new(storage));
        Ok(())
    }

    /// Drop children that no longer hold any solid cell
    pub fn prune(&mut self) {
        for slot in &mut self.children {
            let keep = match slot.as_deref_mut() {
                Some(VoxelStorage::Octree(octree)) => {
                    octree.prune();
                    !octree.is_empty()
                }
                Some(child) => !child.is_empty(),
                None => false,
            };
            if !keep {
                *slot = None;
            }
        }
    }

    /// Reset every cell by dropping all children
    pub fn clear(&mut self) {
        self.children = Default::default();
    }

    /// Number of octree nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .map(|(_, _, child)| child.as_octree().map_or(0, OctreeVoxelMesh::node_count))
            .sum::<usize>()
    }

    /// Number of dense leaves in this subtree
    pub fn leaf_count(&self) -> usize {
        self.children()
            .map(|(_, _, child)| match child {
                VoxelStorage::Array(_) => 1,
                VoxelStorage::Octree(octree) => octree.leaf_count(),
            })
            .sum()
    }

    fn locate(&self, location: VoxelLocation) -> Result<(usize, VoxelLocation)> {
        if !self.dimensions.contains(location) {
            return Err(out_of_range(location, self.dimensions));
        }
        let (index, local) = self.dimensions.octant_of(location);
        Ok((index as usize, local))
    }
}

impl VoxelMesh for OctreeVoxelMesh {
    fn dimensions(&self) -> Dimensions3D {
        self.dimensions
    }

    fn get(&self, location: VoxelLocation) -> Result<Voxel> {
        let (index, local) = self.locate(location)?;
        match &self.children[index] {
            Some(child) => child.get(local),
            None => Ok(Voxel::EMPTY),
        }
    }

    fn is_empty(&self) -> bool {
        self.children().all(|(_, _, child)| child.is_empty())
    }

    fn is_full(&self) -> bool {
        (0..8u8).all(|index| {
            let (_, extent) = self.dimensions.octant(index);
            extent.is_degenerate()
                || self.child(index).is_some_and(|child| child.is_full())
        })
    }

    fn kind(&self) -> MeshKind<'_> {
        MeshKind::Octree(self)
    }
}

impl VoxelMeshMut for OctreeVoxelMesh {
    fn set(&mut self, location: VoxelLocation, voxel: Voxel) -> Result<()> {
        let (index, local) = self.locate(location)?;
        let slot = &mut self.children[index];
        match slot {
            Some(child) => child.set(local, voxel),
            None if voxel.is_empty() => Ok(()),
            None => {
                let (_, extent) = self.dimensions.octant(index as u8);
                let mut child = self.builder.build(extent);
                child.set(local, voxel)?;
                *slot = Some(Box::new(child));
                Ok(())
            }
        }
    }

    fn clear(&mut self) -> Result<()> {
        OctreeVoxelMesh::clear(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::array::ArrayVoxelMesh;
    use crate::voxel::builder::{ArrayBuilder, OctreeNodeBuilder};

    const RED: Voxel = Voxel::rgb(255, 0, 0);

    fn octree(size: u32, min_leaf: u32) -> OctreeVoxelMesh {
        OctreeVoxelMesh::new(
            Dimensions3D::cube(size),
            Box::new(OctreeNodeBuilder::new(Dimensions3D::cube(min_leaf))),
        )
    }

    #[test]
    fn test_reads_do_not_build() {
        let mesh = octree(8, 2);
        assert_eq!(mesh.get(VoxelLocation::new(7, 7, 7)).unwrap(), Voxel::EMPTY);
        assert_eq!(mesh.node_count(), 1);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_set_get_builds_path() {
        let mut mesh = octree(8, 2);
        mesh.set(VoxelLocation::new(5, 6, 7), RED).unwrap();
        assert_eq!(mesh.get(VoxelLocation::new(5, 6, 7)).unwrap(), RED);
        assert!(mesh.get(VoxelLocation::new(5, 6, 6)).unwrap().is_empty());
        // 8 -> 4 -> 2: root, one inner node, one leaf
        assert_eq!(mesh.node_count(), 2);
        assert_eq!(mesh.leaf_count(), 1);
    }

    #[test]
    fn test_empty_write_does_not_build() {
        let mut mesh = octree(8, 2);
        mesh.set(VoxelLocation::new(1, 1, 1), Voxel::EMPTY).unwrap();
        assert_eq!(mesh.leaf_count(), 0);
    }

    #[test]
    fn test_write_read_every_cell_odd_extent() {
        let mut mesh = OctreeVoxelMesh::new(
            Dimensions3D::new(5, 3, 7),
            Box::new(OctreeNodeBuilder::new(Dimensions3D::cube(1))),
        );
        for (i, location) in mesh.dimensions().locations().enumerate() {
            mesh.set(location, Voxel::rgb(i as u8, 0, 1)).unwrap();
        }
        for (i, location) in mesh.dimensions().locations().enumerate() {
            assert_eq!(mesh.get(location).unwrap(), Voxel::rgb(i as u8, 0, 1));
        }
        assert!(mesh.is_full());
    }

    #[test]
    fn test_out_of_range() {
        let mut mesh = octree(4, 2);
        assert!(matches!(
            mesh.set(VoxelLocation::new(4, 0, 0), RED),
            Err(Error::OutOfRange { .. })
        ));
        assert!(mesh.get(VoxelLocation::new(-1, 0, 0)).is_err());
    }

    #[test]
    fn test_full_and_clear() {
        let mut mesh = octree(4, 2);
        for location in mesh.dimensions().locations() {
            mesh.set(location, RED).unwrap();
        }
        assert!(mesh.is_full());
        assert!(!mesh.is_empty());

        mesh.clear();
        assert!(mesh.is_empty());
        assert!(!mesh.is_full());
        assert_eq!(mesh.leaf_count(), 0);
    }

    #[test]
    fn test_prune_drops_emptied_children() {
        let mut mesh = octree(8, 2);
        mesh.set(VoxelLocation::new(0, 0, 0), RED).unwrap();
        mesh.set(VoxelLocation::new(7, 7, 7), RED).unwrap();
        mesh.set(VoxelLocation::new(7, 7, 7), Voxel::EMPTY).unwrap();
        assert_eq!(mesh.leaf_count(), 2);

        mesh.prune();
        assert_eq!(mesh.leaf_count(), 1);
        assert_eq!(mesh.get(VoxelLocation::ZERO).unwrap(), RED);
    }

    #[test]
    fn test_init_child() {
        let mut mesh = OctreeVoxelMesh::new(Dimensions3D::cube(4), Box::new(ArrayBuilder));
        let leaf = ArrayVoxelMesh::filled(Dimensions3D::cube(2), RED);
        mesh.init_child(7, leaf.clone().into()).unwrap();
        assert_eq!(mesh.get(VoxelLocation::new(3, 3, 3)).unwrap(), RED);

        assert!(matches!(
            mesh.init_child(7, leaf.into()),
            Err(Error::DoubleInitialization(_))
        ));
        assert!(mesh
            .init_child(0, ArrayVoxelMesh::new(Dimensions3D::cube(3)).into())
            .is_err());
    }

    #[test]
    fn test_copy_is_independent() {
        let mut original = octree(8, 2);
        original.set(VoxelLocation::new(1, 2, 3), RED).unwrap();
        let mut copy = original.clone();
        copy.set(VoxelLocation::new(1, 2, 3), Voxel::EMPTY).unwrap();
        copy.set(VoxelLocation::new(6, 6, 6), RED).unwrap();

        assert_eq!(original.get(VoxelLocation::new(1, 2, 3)).unwrap(), RED);
        assert!(original.get(VoxelLocation::new(6, 6, 6)).unwrap().is_empty());
    }
}
