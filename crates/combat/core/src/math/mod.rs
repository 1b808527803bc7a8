//! Minimal 3D math for aiming: vectors and axis-aligned boxes.
mod aabb;
mod vec3;

pub use aabb::Aabb;
pub use vec3::Vec3;
