//! Scene node types
//!
//! IDs, node content variants and the per-node bookkeeping the scene keeps
//! alongside them.

use std::fmt;

use crate::voxel::location::VoxelLocation;
use crate::voxel::map::MapVoxelMesh;
use crate::voxel::shape::{CommitState, ShapeVoxelMesh};
use crate::voxel::storage::VoxelStorage;
use crate::voxel::view::Window;

/// Unique identifier for a mesh in a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u64);

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle of a registered [`CommitListener`](super::CommitListener).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// What a scene node is.
///
/// The first three variants own voxel data. The rest are views that refer
/// to their parent by id and own nothing.
#[derive(Clone, Debug)]
pub enum MeshNode {
    /// Dense leaf or octree
    Storage(VoxelStorage),

    /// Sparse chunk map
    Map(MapVoxelMesh),

    /// Declarative shape; no per-cell writes
    Shape(ShapeVoxelMesh),

    /// Parent re-anchored so its location `anchor` is addressed as `start`
    Absolute { parent: MeshId, start: VoxelLocation, anchor: VoxelLocation },

    /// Bounded window of the parent, addressed from zero
    Sub { parent: MeshId, window: Window },

    /// Identity pass-through
    Proxy { parent: MeshId },

    /// Read-only projection; every write through it fails
    ReadOnly { source: MeshId },
}

impl MeshNode {
    /// Mesh this node reads through, if it is a view
    pub fn parent(&self) -> Option<MeshId> {
        match *self {
            MeshNode::Storage(_) | MeshNode::Map(_) | MeshNode::Shape(_) => None,
            MeshNode::Absolute { parent, .. }
            | MeshNode::Sub { parent, .. }
            | MeshNode::Proxy { parent } => Some(parent),
            MeshNode::ReadOnly { source } => Some(source),
        }
    }

    pub fn is_view(&self) -> bool {
        self.parent().is_some()
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, MeshNode::ReadOnly { .. })
    }
}

/// Commit notification target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Subscriber {
    /// Dependent view; forwards notifications to its own subscribers
    View(MeshId),
    External(ListenerId),
}

/// A node plus the scene's bookkeeping for it
#[derive(Debug)]
pub(crate) struct SceneEntry {
    pub node: MeshNode,
    pub state: CommitState,
    /// Lazily created read-only projection
    pub read_only: Option<MeshId>,
    /// In registration order
    pub subscribers: Vec<Subscriber>,
}

impl SceneEntry {
    pub fn new(node: MeshNode) -> Self {
        Self {
            node,
            state: CommitState::Clean,
            read_only: None,
            subscribers: Vec::new(),
        }
    }
}
