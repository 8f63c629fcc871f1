//! Error types for voxel mesh operations

use thiserror::Error;

use crate::scene::MeshId;
use crate::voxel::location::{Dimensions3D, VoxelLocation};

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Index outside a mesh's declared extent. Never clamped or wrapped.
    #[error("location {location} is outside mesh extent {dimensions}")]
    OutOfRange {
        location: VoxelLocation,
        dimensions: Dimensions3D,
    },

    /// Write attempted through a read-only projection or a declarative mesh
    #[error("mesh {0} is not modifiable")]
    Unmodifiable(MeshId),

    #[error("{0} is already initialized")]
    DoubleInitialization(String),

    #[error("no mesh {0} in scene")]
    UnknownMesh(MeshId),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
