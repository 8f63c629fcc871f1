//! Voxmesh - hierarchical voxel meshes with views, commit observers and
//! solid-volume traversal

pub mod core;
pub mod math;
pub mod voxel;
pub mod scene;
pub mod meshing;
pub mod io;
