//! Decomposition of a mesh's solid volume into disjoint solid boxes.
//!
//! The walker descends the mesh's own hierarchy (map chunks, octree
//! children) and falls back to bisection for anything else, skipping empty
//! regions and stopping at full ones. Work is proportional to the number of
//! mixed regions, not to the voxel count.

use std::fmt;

use crate::core::types::Result;
use crate::voxel::chunk::ChunkCoord;
use crate::voxel::location::{Dimensions3D, VoxelLocation};
use crate::voxel::mesh::{MeshKind, VoxelMesh};
use crate::voxel::view::{AbsoluteVoxelMesh, SubMesh, Window};
use crate::voxel::voxel::Voxel;

/// A region visited by the walker: a node of the hierarchy, or a bisected
/// window of a node that has no hierarchy of its own.
#[derive(Clone, Copy)]
pub enum OutlineRegion<'a> {
    Node(&'a dyn VoxelMesh),
    Window(&'a dyn VoxelMesh, Window),
}

impl fmt::Debug for OutlineRegion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlineRegion::Node(node) => f
                .debug_struct("Node")
                .field("start", &node.start())
                .field("dimensions", &node.dimensions())
                .finish(),
            OutlineRegion::Window(_, window) => f.debug_tuple("Window").field(window).finish(),
        }
    }
}

impl<'a> OutlineRegion<'a> {
    /// Octant `index` of this region, as a window. Valid for any region kind.
    fn bisect(&self, index: u8) -> (OutlineRegion<'a>, VoxelLocation) {
        let (offset, extent) = self.dimensions().octant(index);
        let region = match *self {
            OutlineRegion::Node(node) => OutlineRegion::Window(node, Window::new(offset, extent)),
            OutlineRegion::Window(base, window) => {
                OutlineRegion::Window(base, window.narrow(offset, extent))
            }
        };
        (region, offset)
    }
}

impl VoxelMesh for OutlineRegion<'_> {
    fn start(&self) -> VoxelLocation {
        match self {
            OutlineRegion::Node(node) => node.start(),
            OutlineRegion::Window(..) => VoxelLocation::ZERO,
        }
    }

    fn dimensions(&self) -> Dimensions3D {
        match self {
            OutlineRegion::Node(node) => node.dimensions(),
            OutlineRegion::Window(_, window) => window.dimensions,
        }
    }

    fn get(&self, location: VoxelLocation) -> Result<Voxel> {
        match *self {
            OutlineRegion::Node(node) => node.get(location),
            OutlineRegion::Window(base, window) => SubMesh::from_window(base, window).get(location),
        }
    }

    fn is_empty(&self) -> bool {
        match *self {
            OutlineRegion::Node(node) => node.is_empty(),
            OutlineRegion::Window(base, window) => SubMesh::from_window(base, window).is_empty(),
        }
    }

    fn is_full(&self) -> bool {
        match *self {
            OutlineRegion::Node(node) => node.is_full(),
            OutlineRegion::Window(base, window) => SubMesh::from_window(base, window).is_full(),
        }
    }

    fn kind(&self) -> MeshKind<'_> {
        match self {
            OutlineRegion::Node(node) => node.kind(),
            OutlineRegion::Window(..) => MeshKind::Other,
        }
    }
}

/// A solid box yielded by the walker, anchored in absolute space
pub type OutlineVolume<'a> = AbsoluteVoxelMesh<OutlineRegion<'a>>;

/// Extent-only summary of a yielded box
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OutlineBox {
    pub start: VoxelLocation,
    pub dimensions: Dimensions3D,
}

impl OutlineBox {
    pub fn end(&self) -> VoxelLocation {
        self.start + self.dimensions.to_location()
    }

    pub fn contains(&self, location: VoxelLocation) -> bool {
        self.dimensions.contains(location - self.start)
    }
}

impl From<&OutlineVolume<'_>> for OutlineBox {
    fn from(volume: &OutlineVolume<'_>) -> Self {
        Self {
            start: volume.start(),
            dimensions: volume.dimensions(),
        }
    }
}

/// Traversal state for one mixed region
struct WalkState<'a> {
    region: OutlineRegion<'a>,
    /// Absolute location of `region.start()`
    origin: VoxelLocation,
    cursor: usize,
    /// Materialized chunks, snapshotted when the region is a map
    chunk_keys: Vec<ChunkCoord>,
}

impl<'a> WalkState<'a> {
    fn new(region: OutlineRegion<'a>, origin: VoxelLocation) -> Self {
        let chunk_keys = match region {
            OutlineRegion::Node(node) => match node.kind() {
                MeshKind::Map(map) => map.keys(),
                _ => Vec::new(),
            },
            OutlineRegion::Window(..) => Vec::new(),
        };
        Self { region, origin, cursor: 0, chunk_keys }
    }

    /// Next unvisited sub-region and its offset from `region.start()`
    fn next_sub_region(&mut self) -> Option<(OutlineRegion<'a>, VoxelLocation)> {
        let node = match self.region {
            OutlineRegion::Node(node) => node,
            OutlineRegion::Window(..) => return self.next_octant(),
        };
        match node.kind() {
            MeshKind::Map(map) => {
                let coord = *self.chunk_keys.get(self.cursor)?;
                self.cursor += 1;
                // Chunks removed since the snapshot are simply skipped
                let chunk: &'a dyn VoxelMesh = match map.chunk(coord) {
                    Some(chunk) => chunk,
                    None => return self.next_sub_region(),
                };
                let offset = coord.origin(map.chunk_size()) - map.start();
                Some((OutlineRegion::Node(chunk), offset))
            }
            MeshKind::Octree(octree) => {
                while self.cursor < 8 {
                    let index = self.cursor as u8;
                    self.cursor += 1;
                    if let Some(child) = octree.child(index) {
                        let (offset, _) = octree.dimensions().octant(index);
                        return Some((OutlineRegion::Node(child), offset));
                    }
                }
                None
            }
            MeshKind::Other => self.next_octant(),
        }
    }

    /// Generic adapter: the 8 bisected windows of the region
    fn next_octant(&mut self) -> Option<(OutlineRegion<'a>, VoxelLocation)> {
        if self.cursor >= 8 {
            return None;
        }
        let index = self.cursor as u8;
        self.cursor += 1;
        Some(self.region.bisect(index))
    }
}

/// Outcome of a single walker step
pub enum WalkStep<'a> {
    /// A solid box was found
    Yield(OutlineVolume<'a>),
    /// A region was skipped, pushed or finished; call again
    Continue,
    Done,
}

/// Pull-based, explicit-stack traversal yielding disjoint solid boxes that
/// together cover exactly the non-empty cells of a mesh.
///
/// Boxes are anchored at the same absolute locations the source mesh uses.
pub struct OctreeOutlineWalker<'a> {
    stack: Vec<WalkState<'a>>,
    root: Option<OutlineRegion<'a>>,
    visited: usize,
}

impl<'a> OctreeOutlineWalker<'a> {
    pub fn new(mesh: &'a dyn VoxelMesh) -> Self {
        Self {
            stack: Vec::new(),
            root: Some(OutlineRegion::Node(mesh)),
            visited: 0,
        }
    }

    /// Number of regions classified so far
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Current stack depth
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Advance by one region
    pub fn step(&mut self) -> WalkStep<'a> {
        if let Some(root) = self.root.take() {
            let origin = root.start();
            return self.visit(root, origin);
        }
        let Some(top) = self.stack.last_mut() else {
            return WalkStep::Done;
        };
        match top.next_sub_region() {
            Some((region, offset)) => {
                let origin = top.origin + offset;
                self.visit(region, origin)
            }
            None => {
                self.stack.pop();
                WalkStep::Continue
            }
        }
    }

    fn visit(&mut self, region: OutlineRegion<'a>, origin: VoxelLocation) -> WalkStep<'a> {
        self.visited += 1;
        if region.is_empty() {
            WalkStep::Continue
        } else if region.is_full() {
            log::trace!("Solid box at {} ({})", origin, region.dimensions());
            WalkStep::Yield(AbsoluteVoxelMesh::new(region, origin))
        } else {
            self.stack.push(WalkState::new(region, origin));
            WalkStep::Continue
        }
    }
}

impl<'a> Iterator for OctreeOutlineWalker<'a> {
    type Item = OutlineVolume<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.step() {
                WalkStep::Yield(volume) => return Some(volume),
                WalkStep::Continue => continue,
                WalkStep::Done => return None,
            }
        }
    }
}

/// Collect the solid boxes of `mesh`
pub fn outline_boxes(mesh: &dyn VoxelMesh) -> Vec<OutlineBox> {
    let mut walker = OctreeOutlineWalker::new(mesh);
    let boxes: Vec<OutlineBox> = walker.by_ref().map(|volume| OutlineBox::from(&volume)).collect();
    log::debug!("Outlined {} boxes after visiting {} regions", boxes.len(), walker.visited());
    boxes
}
