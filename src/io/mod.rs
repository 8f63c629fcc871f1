//! Persistence of voxel meshes

pub mod disk_io;

pub use disk_io::{
    decode_mesh, deserialize_map, deserialize_mesh, load_map, load_mesh, save_map, save_mesh, serialize_map,
    serialize_mesh, ChunkData, MapData, MeshData,
};
