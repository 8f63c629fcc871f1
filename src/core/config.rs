//! Mesh construction configuration.

use std::path::Path;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::builder::{OctreeNodeBuilder, VoxelMeshBuilder};
use crate::voxel::location::Dimensions3D;
use crate::voxel::map::MapVoxelMesh;

/// Host-supplied settings for building octrees and sparse maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Largest extent that is stored as a dense leaf instead of an octree node.
    pub min_leaf: Dimensions3D,
    /// Extent of one chunk in a sparse map.
    pub chunk_size: Dimensions3D,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            min_leaf: Dimensions3D::cube(8),
            chunk_size: Dimensions3D::cube(16),
        }
    }
}

impl MeshConfig {
    /// Reject configurations that would build zero-volume leaves or chunks.
    pub fn validate(&self) -> Result<()> {
        if self.min_leaf.is_degenerate() {
            return Err(Error::Config(format!("min_leaf {} has a zero extent", self.min_leaf)));
        }
        if self.chunk_size.is_degenerate() {
            return Err(Error::Config(format!("chunk_size {} has a zero extent", self.chunk_size)));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MeshConfig = serde_json::from_str(json)
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save as a JSON config file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Builder honoring `min_leaf`.
    pub fn builder(&self) -> Box<dyn VoxelMeshBuilder> {
        Box::new(OctreeNodeBuilder::new(self.min_leaf))
    }

    /// Empty sparse map with this config's chunk size and leaf policy.
    pub fn new_map(&self) -> Result<MapVoxelMesh> {
        self.validate()?;
        MapVoxelMesh::new(self.chunk_size, self.builder())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = MeshConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_leaf, Dimensions3D::cube(8));
        assert_eq!(config.chunk_size, Dimensions3D::cube(16));
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config = MeshConfig::from_json(
            r#"{ "min_leaf": { "width": 4, "height": 4, "depth": 2 } }"#,
        ).unwrap();
        assert_eq!(config.min_leaf, Dimensions3D::new(4, 4, 2));
        assert_eq!(config.chunk_size, MeshConfig::default().chunk_size);
    }

    #[test]
    fn test_rejects_zero_extent() {
        let result = MeshConfig::from_json(
            r#"{ "chunk_size": { "width": 0, "height": 4, "depth": 4 } }"#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("mesh.json");
        let config = MeshConfig {
            min_leaf: Dimensions3D::cube(2),
            chunk_size: Dimensions3D::new(8, 4, 8),
        };
        config.save(&path).unwrap();
        assert_eq!(MeshConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_new_map_uses_chunk_size() {
        let config = MeshConfig::default();
        let map = config.new_map().unwrap();
        assert_eq!(map.chunk_size(), config.chunk_size);
        assert_eq!(map.chunk_count(), 0);
    }
}
