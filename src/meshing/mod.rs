//! Render-ready geometry built from voxel meshes

pub mod cubic;

pub use cubic::{build_cubic_mesh, CubicMesh, CubicVertex, FaceDirection};
