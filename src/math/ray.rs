//! Ray type and slab intersection

use crate::core::types::Vec3;
use super::aabb::Aabb;

/// A ray defined by origin and direction
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    /// Precomputed 1/direction for fast AABB intersection
    pub inv_direction: Vec3,
}

impl Ray {
    /// Create a new ray (direction should be normalized)
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
        }
    }

    /// Ray from `from` towards `to`, plus the distance between them.
    /// Returns `None` when the points coincide.
    pub fn between(from: Vec3, to: Vec3) -> Option<(Ray, f32)> {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }
        Some((Ray::new(from, delta / length), length))
    }

    /// Get point along ray at parameter t
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Ray-AABB intersection using slab method
    /// Returns Some((t_near, t_far)) if intersection, None otherwise.
    /// Boxes are closed, so a ray running along a face touches the box.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> Option<(f32, f32)> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            // Parallel to this slab: 0 * inf would poison the interval with NaN
            if self.direction[axis] == 0.0 {
                if origin < aabb.min[axis] || origin > aabb.max[axis] {
                    return None;
                }
                continue;
            }
            let t1 = (aabb.min[axis] - origin) * self.inv_direction[axis];
            let t2 = (aabb.max[axis] - origin) * self.inv_direction[axis];
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
        }

        if t_near <= t_far && t_far >= 0.0 {
            Some((t_near.max(0.0), t_far))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(ray.at(5.0), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_between() {
        let (ray, length) = Ray::between(Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0)).unwrap();
        assert!((length - 5.0).abs() < 1e-5);
        assert!((ray.direction - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-5);
        assert!(Ray::between(Vec3::ONE, Vec3::ONE).is_none());
    }

    #[test]
    fn test_intersects_aabb_hit() {
        let ray = Ray::new(Vec3::new(-2.0, 0.5, 0.5), Vec3::X);
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let (t_near, t_far) = ray.intersects_aabb(&aabb).unwrap();
        assert!((t_near - 2.0).abs() < 0.001);
        assert!((t_far - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_intersects_aabb_miss() {
        let ray = Ray::new(Vec3::new(-2.0, 5.0, 0.5), Vec3::X);
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(ray.intersects_aabb(&aabb).is_none());
    }

    #[test]
    fn test_intersects_aabb_inside() {
        let ray = Ray::new(Vec3::splat(0.5), Vec3::X);
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let (t_near, _) = ray.intersects_aabb(&aabb).unwrap();
        assert_eq!(t_near, 0.0);
    }

    #[test]
    fn test_intersects_aabb_along_face() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let on_face = Ray::new(Vec3::new(-2.0, 1.0, 0.5), Vec3::X);
        let (t_near, t_far) = on_face.intersects_aabb(&aabb).unwrap();
        assert!((t_near - 2.0).abs() < 0.001);
        assert!((t_far - 3.0).abs() < 0.001);

        let on_edge = Ray::new(Vec3::new(-2.0, 0.0, 0.0), Vec3::X);
        assert!(on_edge.intersects_aabb(&aabb).is_some());

        let beside = Ray::new(Vec3::new(-2.0, 1.001, 0.5), Vec3::X);
        assert!(beside.intersects_aabb(&aabb).is_none());
    }
}
