//! Mesh serialization and disk I/O
//!
//! File layout: 4 magic bytes, a little-endian `u32` format version, then an
//! LZ4 block (size-prepended) holding the rkyv archive.

use std::path::Path;

use rkyv::{Archive, Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::array::ArrayVoxelMesh;
use crate::voxel::builder::VoxelMeshBuilder;
use crate::voxel::chunk::ChunkCoord;
use crate::voxel::location::{Dimensions3D, VoxelLocation};
use crate::voxel::map::MapVoxelMesh;
use crate::voxel::mesh::{VoxelMesh, VoxelMeshMut};
use crate::voxel::storage::VoxelStorage;
use crate::voxel::view::AbsoluteVoxelMesh;
use crate::voxel::voxel::Voxel;

const MESH_MAGIC: &[u8; 4] = b"VXMS";
const MAP_MAGIC: &[u8; 4] = b"VXMP";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 8;

/// Flattened mesh: extent plus every cell in x-fastest order
#[derive(Clone, Debug, PartialEq, Archive, Deserialize, Serialize)]
pub struct MeshData {
    pub start: [i32; 3],
    pub dimensions: [u32; 3],
    pub cells: Vec<Voxel>,
}

impl MeshData {
    /// Flatten any readable mesh
    pub fn from_mesh<M: VoxelMesh + ?Sized>(mesh: &M) -> Result<Self> {
        let start = mesh.start();
        let dimensions = mesh.dimensions();
        let cells = dimensions
            .locations()
            .map(|local| mesh.get(start + local))
            .collect::<Result<Vec<Voxel>>>()?;
        Ok(Self {
            start: [start.x, start.y, start.z],
            dimensions: [dimensions.width, dimensions.height, dimensions.depth],
            cells,
        })
    }

    pub fn start(&self) -> VoxelLocation {
        VoxelLocation::new(self.start[0], self.start[1], self.start[2])
    }

    pub fn dimensions(&self) -> Dimensions3D {
        Dimensions3D::new(self.dimensions[0], self.dimensions[1], self.dimensions[2])
    }

    fn validate(&self) -> Result<()> {
        let dimensions = self.dimensions();
        let Some(volume) = dimensions.checked_volume() else {
            return Err(Error::InvalidData(format!("{} mesh is too large", dimensions)));
        };
        if self.cells.len() != volume {
            return Err(Error::InvalidData(format!(
                "{} cells stored for a {} mesh",
                self.cells.len(),
                dimensions
            )));
        }
        if !addressable(self.start.map(i64::from), self.dimensions) {
            return Err(Error::InvalidData(format!(
                "{} mesh at {} leaves the addressable range",
                dimensions,
                self.start()
            )));
        }
        Ok(())
    }

    /// Rebuild through `builder`, anchored at the origin. Only solid cells
    /// are written, so sparse builders stay sparse.
    pub fn to_storage(&self, builder: &dyn VoxelMeshBuilder) -> Result<VoxelStorage> {
        self.validate()?;
        let dimensions = self.dimensions();
        let mut storage = builder.build(dimensions);
        for (local, voxel) in dimensions.locations().zip(&self.cells) {
            if !voxel.is_empty() {
                storage.set(local, *voxel)?;
            }
        }
        Ok(storage)
    }

    /// Rebuild as a dense mesh at the stored start
    pub fn to_array(&self) -> Result<ArrayVoxelMesh> {
        self.validate()?;
        let start = self.start();
        let dimensions = self.dimensions();
        let mut array = ArrayVoxelMesh::with_start(start, dimensions);
        for (local, voxel) in dimensions.locations().zip(&self.cells) {
            array.set(start + local, *voxel)?;
        }
        Ok(array)
    }
}

/// Whether every cell of `[start, start + dimensions)` has an `i32` address
fn addressable(start: [i64; 3], dimensions: [u32; 3]) -> bool {
    start.into_iter().zip(dimensions).all(|(start, extent)| {
        extent <= i32::MAX as u32
            && start >= i64::from(i32::MIN)
            && start + i64::from(extent) <= i64::from(i32::MAX)
    })
}

/// One materialized chunk of a map, in chunk-local order
#[derive(Clone, Debug, PartialEq, Archive, Deserialize, Serialize)]
pub struct ChunkData {
    pub coord: [i32; 3],
    pub cells: Vec<Voxel>,
}

/// Serializable sparse map
#[derive(Clone, Debug, PartialEq, Archive, Deserialize, Serialize)]
pub struct MapData {
    pub chunk_size: [u32; 3],
    pub chunks: Vec<ChunkData>,
}

impl MapData {
    pub fn from_map(map: &MapVoxelMesh) -> Result<Self> {
        let chunk_size = map.chunk_size();
        let mut chunks = Vec::with_capacity(map.chunk_count());
        for coord in map.keys() {
            let Some(chunk) = map.chunk(coord) else {
                continue;
            };
            let cells = chunk_size
                .locations()
                .map(|local| chunk.get(local))
                .collect::<Result<Vec<Voxel>>>()?;
            chunks.push(ChunkData {
                coord: [coord.x, coord.y, coord.z],
                cells,
            });
        }
        Ok(Self {
            chunk_size: [chunk_size.width, chunk_size.height, chunk_size.depth],
            chunks,
        })
    }

    /// Rebuild a map whose chunks come from `builder`. The result is clean.
    pub fn to_map(&self, builder: Box<dyn VoxelMeshBuilder>) -> Result<MapVoxelMesh> {
        let chunk_size = Dimensions3D::new(self.chunk_size[0], self.chunk_size[1], self.chunk_size[2]);
        if chunk_size.checked_volume().is_none() || !addressable([0; 3], self.chunk_size) {
            return Err(Error::InvalidData(format!("chunk size {} is too large", chunk_size)));
        }
        let mut map = MapVoxelMesh::new(chunk_size, builder.clone())?;
        for chunk in &self.chunks {
            let origin: [i64; 3] = std::array::from_fn(|axis| {
                i64::from(chunk.coord[axis]) * i64::from(self.chunk_size[axis])
            });
            if !addressable(origin, self.chunk_size) {
                return Err(Error::InvalidData(format!(
                    "chunk {:?} leaves the addressable range",
                    chunk.coord
                )));
            }
            let data = MeshData {
                start: [0; 3],
                dimensions: self.chunk_size,
                cells: chunk.cells.clone(),
            };
            let coord = ChunkCoord::new(chunk.coord[0], chunk.coord[1], chunk.coord[2]);
            map.insert_chunk(coord, data.to_storage(builder.as_ref())?)?;
        }
        map.take_dirty_chunks();
        Ok(map)
    }
}

fn wrap(magic: &[u8; 4], archive: &[u8]) -> Vec<u8> {
    let compressed = lz4_flex::compress_prepend_size(archive);
    let mut out = Vec::with_capacity(HEADER_LEN + compressed.len());
    out.extend_from_slice(magic);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&compressed);
    out
}

/// Check the header and return the decompressed archive, aligned for rkyv
fn unwrap(magic: &[u8; 4], bytes: &[u8]) -> Result<rkyv::util::AlignedVec<16>> {
    if bytes.len() < HEADER_LEN {
        return Err(Error::InvalidData("Truncated header".to_string()));
    }
    if &bytes[..4] != magic {
        return Err(Error::InvalidData("Invalid magic bytes".to_string()));
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != VERSION {
        return Err(Error::InvalidData(format!("Unsupported version: {}", version)));
    }
    let decompressed = lz4_flex::decompress_size_prepended(&bytes[HEADER_LEN..])
        .map_err(|e| Error::Serialization(format!("LZ4 decompression failed: {}", e)))?;
    let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(decompressed.len());
    aligned.extend_from_slice(&decompressed);
    Ok(aligned)
}

/// Serialize any readable mesh (compressed, with header)
pub fn serialize_mesh<M: VoxelMesh + ?Sized>(mesh: &M) -> Result<Vec<u8>> {
    let data = MeshData::from_mesh(mesh)?;
    let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&data)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    Ok(wrap(MESH_MAGIC, &bytes))
}

/// Decode the raw mesh data without rebuilding a mesh
pub fn decode_mesh(bytes: &[u8]) -> Result<MeshData> {
    let aligned = unwrap(MESH_MAGIC, bytes)?;
    let data = rkyv::from_bytes::<MeshData, rkyv::rancor::Error>(&aligned)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    data.validate()?;
    Ok(data)
}

/// Rebuild a serialized mesh through `builder`, re-anchored at its saved start
pub fn deserialize_mesh(bytes: &[u8], builder: &dyn VoxelMeshBuilder) -> Result<AbsoluteVoxelMesh<VoxelStorage>> {
    let data = decode_mesh(bytes)?;
    Ok(AbsoluteVoxelMesh::new(data.to_storage(builder)?, data.start()))
}

pub fn serialize_map(map: &MapVoxelMesh) -> Result<Vec<u8>> {
    let data = MapData::from_map(map)?;
    let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&data)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    Ok(wrap(MAP_MAGIC, &bytes))
}

pub fn deserialize_map(bytes: &[u8], builder: Box<dyn VoxelMeshBuilder>) -> Result<MapVoxelMesh> {
    let aligned = unwrap(MAP_MAGIC, bytes)?;
    let data = rkyv::from_bytes::<MapData, rkyv::rancor::Error>(&aligned)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    data.to_map(builder)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Save a mesh to disk (compressed)
pub fn save_mesh<M: VoxelMesh + ?Sized>(path: impl AsRef<Path>, mesh: &M) -> Result<()> {
    write_file(path.as_ref(), &serialize_mesh(mesh)?)
}

pub fn load_mesh(path: impl AsRef<Path>, builder: &dyn VoxelMeshBuilder) -> Result<AbsoluteVoxelMesh<VoxelStorage>> {
    let bytes = std::fs::read(path.as_ref())?;
    deserialize_mesh(&bytes, builder)
}

pub fn save_map(path: impl AsRef<Path>, map: &MapVoxelMesh) -> Result<()> {
    write_file(path.as_ref(), &serialize_map(map)?)
}

pub fn load_map(path: impl AsRef<Path>, builder: Box<dyn VoxelMeshBuilder>) -> Result<MapVoxelMesh> {
    let bytes = std::fs::read(path.as_ref())?;
    deserialize_map(&bytes, builder)
}
