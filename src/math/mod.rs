//! Geometry helpers for spatial queries over voxel meshes

pub mod aabb;
pub mod ray;

pub use aabb::Aabb;
pub use ray::Ray;
