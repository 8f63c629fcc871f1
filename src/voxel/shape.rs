//! Declarative meshes defined by buffered shape parameters

use crate::core::types::Result;
use crate::voxel::array::ArrayVoxelMesh;
use crate::voxel::location::{Dimensions3D, VoxelLocation};
use crate::voxel::mesh::VoxelMesh;
use crate::voxel::voxel::Voxel;

/// Whether buffered changes still need to be committed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommitState {
    #[default]
    Clean,
    Dirty,
}

/// Parametric shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Ball inscribed in a `2r` cube, centered between the middle cells
    Sphere { radius: u32 },
    /// Solid box
    Cuboid { dimensions: Dimensions3D },
}

impl Shape {
    pub fn dimensions(&self) -> Dimensions3D {
        match *self {
            Shape::Sphere { radius } => Dimensions3D::cube(radius * 2),
            Shape::Cuboid { dimensions } => dimensions,
        }
    }

    /// Whether the cell at `local` lies inside the shape
    pub fn contains(&self, local: VoxelLocation) -> bool {
        match *self {
            Shape::Sphere { radius } => {
                let center = radius as f32;
                let offset = local.to_vec3() + glam::Vec3::splat(0.5) - glam::Vec3::splat(center);
                offset.length() <= center
            }
            Shape::Cuboid { dimensions } => dimensions.contains(local),
        }
    }
}

/// Mesh whose cells are generated from a [`Shape`] and a color.
///
/// `set_shape`/`set_color` only buffer the new parameters and mark the mesh
/// dirty; reads keep returning the last committed cells until
/// [`commit`](Self::commit) regenerates them.
#[derive(Clone, Debug)]
pub struct ShapeVoxelMesh {
    shape: Shape,
    color: Voxel,
    state: CommitState,
    data: ArrayVoxelMesh,
    solid_count: usize,
}

impl ShapeVoxelMesh {
    /// Create and immediately generate a shape
    pub fn new(shape: Shape, color: Voxel) -> Self {
        let mut mesh = Self {
            shape,
            color,
            state: CommitState::Dirty,
            data: ArrayVoxelMesh::new(Dimensions3D::ZERO),
            solid_count: 0,
        };
        mesh.commit();
        mesh
    }

    pub fn sphere(radius: u32, color: Voxel) -> Self {
        Self::new(Shape::Sphere { radius }, color)
    }

    pub fn cuboid(dimensions: Dimensions3D, color: Voxel) -> Self {
        Self::new(Shape::Cuboid { dimensions }, color)
    }

    /// Buffered (possibly uncommitted) shape
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Buffered (possibly uncommitted) color
    pub fn color(&self) -> Voxel {
        self.color
    }

    pub fn state(&self) -> CommitState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == CommitState::Dirty
    }

    pub fn set_shape(&mut self, shape: Shape) {
        if shape != self.shape {
            self.shape = shape;
            self.state = CommitState::Dirty;
        }
    }

    pub fn set_color(&mut self, color: Voxel) {
        if color != self.color {
            self.color = color;
            self.state = CommitState::Dirty;
        }
    }

    pub fn mark_dirty(&mut self) {
        self.state = CommitState::Dirty;
    }

    /// Regenerate cells from the buffered parameters
    pub fn commit(&mut self) {
        let (shape, color) = (self.shape, self.color);
        let data = ArrayVoxelMesh::from_fn(shape.dimensions(), |local| {
            if shape.contains(local) { color } else { Voxel::EMPTY }
        });
        self.solid_count = data.solid_count();
        self.data = data;
        self.state = CommitState::Clean;
        log::trace!("Committed {:?} ({} solid cells)", self.shape, self.solid_count);
    }

    /// Committed cells
    pub fn data(&self) -> &ArrayVoxelMesh {
        &self.data
    }
}

impl VoxelMesh for ShapeVoxelMesh {
    fn dimensions(&self) -> Dimensions3D {
        self.data.dimensions()
    }

    fn get(&self, location: VoxelLocation) -> Result<Voxel> {
        self.data.get(location)
    }

    fn is_empty(&self) -> bool {
        self.solid_count == 0
    }

    fn is_full(&self) -> bool {
        self.solid_count == self.data.dimensions().volume()
    }
}
