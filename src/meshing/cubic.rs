//! Naive cube meshing: one quad per exposed cell face, no face merging.
//!
//! Solid cells are found with the outline walker, so empty space is never
//! scanned cell by cell.

use bytemuck::{Pod, Zeroable};
use glam::IVec3;

use crate::voxel::location::VoxelLocation;
use crate::voxel::mesh::{is_occupied, VoxelMesh};
use crate::voxel::outline::outline_boxes;

/// Vertex layout for direct upload into a vertex buffer
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CubicVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    /// Always zero; faces are flat-colored
    pub uv: [f32; 2],
}

/// Outward direction of a cube face
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceDirection {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl FaceDirection {
    pub const ALL: [FaceDirection; 6] = [
        FaceDirection::PosX,
        FaceDirection::NegX,
        FaceDirection::PosY,
        FaceDirection::NegY,
        FaceDirection::PosZ,
        FaceDirection::NegZ,
    ];

    pub fn normal(self) -> IVec3 {
        match self {
            FaceDirection::PosX => IVec3::X,
            FaceDirection::NegX => IVec3::NEG_X,
            FaceDirection::PosY => IVec3::Y,
            FaceDirection::NegY => IVec3::NEG_Y,
            FaceDirection::PosZ => IVec3::Z,
            FaceDirection::NegZ => IVec3::NEG_Z,
        }
    }

    /// Unit-cube corners of the face, counter-clockwise seen from outside
    pub fn corners(self) -> [[f32; 3]; 4] {
        match self {
            FaceDirection::PosX => [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
            FaceDirection::NegX => [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
            FaceDirection::PosY => [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
            FaceDirection::NegY => [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
            FaceDirection::PosZ => [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
            FaceDirection::NegZ => [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
        }
    }
}

/// Indexed triangle list
#[derive(Clone, Debug, Default)]
pub struct CubicMesh {
    pub vertices: Vec<CubicVertex>,
    pub indices: Vec<u32>,
}

impl CubicMesh {
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn push_face(&mut self, cell: VoxelLocation, face: FaceDirection, color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        let origin = cell.to_vec3();
        let normal = face.normal().as_vec3().to_array();
        for corner in face.corners() {
            self.vertices.push(CubicVertex {
                position: (origin + glam::Vec3::from_array(corner)).to_array(),
                normal,
                color,
                uv: [0.0; 2],
            });
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// One quad for every face of a solid cell whose neighbor is empty. Cells
/// outside the mesh count as empty.
pub fn build_cubic_mesh(mesh: &dyn VoxelMesh) -> CubicMesh {
    let mut out = CubicMesh::default();
    for solid in outline_boxes(mesh) {
        for local in solid.dimensions.locations() {
            let cell = solid.start + local;
            let Ok(voxel) = mesh.get(cell) else {
                continue;
            };
            let color = voxel.to_f32_array();
            for face in FaceDirection::ALL {
                let neighbor = cell + VoxelLocation::from(face.normal());
                if !is_occupied(mesh, neighbor) {
                    out.push_face(cell, face, color);
                }
            }
        }
    }
    log::debug!("Cubic mesh: {} faces", out.face_count());
    out
}
