//! Voxel mesh storage, views and traversal algorithms

pub mod voxel;
pub mod location;
pub mod mesh;
pub mod array;
pub mod builder;
pub mod storage;
pub mod octree;
pub mod chunk;
pub mod map;
pub mod shape;
pub mod view;
pub mod outline;
pub mod collision;

pub use voxel::Voxel;
pub use location::{Dimensions3D, VoxelLocation};
pub use mesh::{MeshKind, VoxelMesh, VoxelMeshMut};
pub use array::ArrayVoxelMesh;
pub use builder::{ArrayBuilder, OctreeNodeBuilder, VoxelMeshBuilder};
pub use storage::VoxelStorage;
pub use octree::OctreeVoxelMesh;
pub use chunk::{ChunkCoord, ChunkVoxelMesh};
pub use map::MapVoxelMesh;
pub use shape::{CommitState, Shape, ShapeVoxelMesh};
pub use view::{AbsoluteVoxelMesh, SubMesh, Window};
pub use outline::{outline_boxes, OctreeOutlineWalker, OutlineBox, OutlineRegion, OutlineVolume, WalkStep};
pub use collision::RayCollider;
