//! Ray against voxel volume intersection.
//!
//! The search bisects the mesh's bounding box (not its storage hierarchy)
//! and only descends into child boxes the ray passes through. The reported
//! hit is the first occupied cell found in depth-first octant order, which
//! is not necessarily the one closest to the ray origin.

use crate::core::types::Vec3;
use crate::math::{Aabb, Ray};
use crate::voxel::location::{Dimensions3D, VoxelLocation};
use crate::voxel::mesh::{is_occupied, VoxelMesh};

#[derive(Clone, Copy, Debug)]
pub struct RayCollider {
    ray: Ray,
    /// Boxes entered beyond this distance along the ray are ignored
    max_distance: f32,
}

impl RayCollider {
    /// Unbounded ray
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            max_distance: f32::INFINITY,
        }
    }

    pub fn with_max_distance(ray: Ray, max_distance: f32) -> Self {
        Self { ray, max_distance }
    }

    /// Line segment from `from` to `to`. `None` if the points coincide.
    pub fn segment(from: Vec3, to: Vec3) -> Option<Self> {
        let (ray, length) = Ray::between(from, to)?;
        Some(Self::with_max_distance(ray, length))
    }

    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Whether the ray passes through any occupied cell
    pub fn collides<M: VoxelMesh + ?Sized>(&self, mesh: &M) -> bool {
        self.first_hit(mesh).is_some()
    }

    /// First occupied cell found along the ray, in traversal order
    pub fn first_hit<M: VoxelMesh + ?Sized>(&self, mesh: &M) -> Option<VoxelLocation> {
        self.search(mesh, mesh.start(), mesh.dimensions())
    }

    fn hits_box(&self, start: VoxelLocation, dimensions: Dimensions3D) -> bool {
        self.ray
            .intersects_aabb(&Aabb::from_voxels(start, dimensions))
            .is_some_and(|(t_near, _)| t_near <= self.max_distance)
    }

    fn search<M: VoxelMesh + ?Sized>(
        &self,
        mesh: &M,
        start: VoxelLocation,
        dimensions: Dimensions3D,
    ) -> Option<VoxelLocation> {
        if dimensions.is_degenerate() || !self.hits_box(start, dimensions) {
            return None;
        }
        if dimensions.volume() == 1 {
            return is_occupied(mesh, start).then_some(start);
        }
        (0..8u8).find_map(|index| {
            let (offset, extent) = dimensions.octant(index);
            self.search(mesh, start + offset, extent)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Result;
    use crate::voxel::array::ArrayVoxelMesh;
    use crate::voxel::builder::ArrayBuilder;
    use crate::voxel::map::MapVoxelMesh;
    use crate::voxel::mesh::VoxelMeshMut;
    use crate::voxel::voxel::Voxel;
    use std::cell::Cell;

    const RED: Voxel = Voxel::rgb(255, 0, 0);

    /// Counts cell reads
    struct CountingMesh<'a> {
        inner: &'a ArrayVoxelMesh,
        reads: Cell<usize>,
    }

    impl VoxelMesh for CountingMesh<'_> {
        fn dimensions(&self) -> Dimensions3D {
            self.inner.dimensions()
        }

        fn get(&self, location: VoxelLocation) -> Result<Voxel> {
            self.reads.set(self.reads.get() + 1);
            self.inner.get(location)
        }
    }

    fn x_ray(y: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(-10.5, y, z), Vec3::X)
    }

    #[test]
    fn test_hits_single_cell() {
        let mut mesh = ArrayVoxelMesh::new(Dimensions3D::cube(8));
        mesh.set(VoxelLocation::new(5, 2, 3), RED).unwrap();

        let collider = RayCollider::new(x_ray(2.5, 3.5));
        assert!(collider.collides(&mesh));
        assert_eq!(collider.first_hit(&mesh), Some(VoxelLocation::new(5, 2, 3)));

        let beside = RayCollider::new(x_ray(2.5, 4.5));
        assert!(!beside.collides(&mesh));
    }

    #[test]
    fn test_miss_inspects_no_cells() {
        let mesh = ArrayVoxelMesh::filled(Dimensions3D::cube(8), RED);
        let counting = CountingMesh { inner: &mesh, reads: Cell::new(0) };

        let collider = RayCollider::new(x_ray(20.5, 3.5));
        assert!(!collider.collides(&counting));
        assert_eq!(counting.reads.get(), 0);

        // Pointing away from the box
        let away = RayCollider::new(Ray::new(Vec3::new(-1.5, 3.5, 3.5), -Vec3::X));
        assert!(!away.collides(&counting));
        assert_eq!(counting.reads.get(), 0);
    }

    #[test]
    fn test_only_cells_along_the_ray_are_read() {
        let mesh = ArrayVoxelMesh::new(Dimensions3D::cube(16));
        let counting = CountingMesh { inner: &mesh, reads: Cell::new(0) };
        assert!(!RayCollider::new(x_ray(7.5, 7.5)).collides(&counting));
        assert_eq!(counting.reads.get(), 16);
    }

    #[test]
    fn test_segment_stops_short() {
        let mut mesh = ArrayVoxelMesh::new(Dimensions3D::cube(8));
        mesh.set(VoxelLocation::new(6, 0, 0), RED).unwrap();

        let short = RayCollider::segment(Vec3::new(-2.5, 0.5, 0.5), Vec3::new(3.5, 0.5, 0.5)).unwrap();
        assert!(!short.collides(&mesh));
        let long = RayCollider::segment(Vec3::new(-2.5, 0.5, 0.5), Vec3::new(9.5, 0.5, 0.5)).unwrap();
        assert!(long.collides(&mesh));
        assert!(RayCollider::segment(Vec3::ONE, Vec3::ONE).is_none());
    }

    #[test]
    fn test_ray_on_cell_boundary_plane() {
        let mesh = ArrayVoxelMesh::filled(Dimensions3D::cube(8), RED);

        let on_plane = RayCollider::new(Ray::new(Vec3::new(-10.0, 2.0, 3.5), Vec3::X));
        assert!(on_plane.collides(&mesh));
        assert_eq!(on_plane.first_hit(&mesh), Some(VoxelLocation::new(0, 1, 3)));

        let off_plane = RayCollider::new(Ray::new(Vec3::new(-10.0, 2.01, 3.5), Vec3::X));
        assert_eq!(off_plane.first_hit(&mesh), Some(VoxelLocation::new(0, 2, 3)));
    }

    #[test]
    fn test_segment_between_integer_points() {
        let mesh = ArrayVoxelMesh::filled(Dimensions3D::cube(8), RED);
        let segment = RayCollider::segment(Vec3::new(-2.0, 4.0, 4.0), Vec3::new(20.0, 4.0, 4.0)).unwrap();
        assert_eq!(segment.first_hit(&mesh), Some(VoxelLocation::new(0, 3, 3)));

        // Ends exactly on the first face
        let touching = RayCollider::segment(Vec3::new(-2.0, 4.0, 4.0), Vec3::new(0.0, 4.0, 4.0)).unwrap();
        assert!(touching.collides(&mesh));
        let short = RayCollider::segment(Vec3::new(-3.0, 4.0, 4.0), Vec3::new(-1.0, 4.0, 4.0)).unwrap();
        assert!(!short.collides(&mesh));
    }

    #[test]
    fn test_first_hit_is_traversal_order() {
        let mut mesh = ArrayVoxelMesh::new(Dimensions3D::new(8, 1, 1));
        mesh.set(VoxelLocation::new(1, 0, 0), RED).unwrap();
        mesh.set(VoxelLocation::new(6, 0, 0), RED).unwrap();

        // Coming from +x, the far cell in octant 0 is still found first
        let from_right = RayCollider::new(Ray::new(Vec3::new(20.5, 0.5, 0.5), -Vec3::X));
        assert_eq!(from_right.first_hit(&mesh), Some(VoxelLocation::new(1, 0, 0)));
    }

    #[test]
    fn test_offset_map() {
        let mut map = MapVoxelMesh::new(Dimensions3D::cube(4), Box::new(ArrayBuilder)).unwrap();
        map.set(VoxelLocation::new(-6, 1, 1), RED).unwrap();

        let down = RayCollider::new(Ray::new(Vec3::new(-5.5, 10.5, 1.5), -Vec3::Y));
        assert_eq!(down.first_hit(&map), Some(VoxelLocation::new(-6, 1, 1)));
        let empty = MapVoxelMesh::new(Dimensions3D::cube(4), Box::new(ArrayBuilder)).unwrap();
        assert!(!down.collides(&empty));
    }
}
