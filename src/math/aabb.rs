//! Axis-aligned bounding box in world space

use crate::core::types::DVec3;

/// Axis-aligned bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// Create AABB from min and max corners
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Check if point is inside AABB (closed)
    pub fn contains_point(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Check if every vertex of a triangle is inside
    pub fn contains_triangle(&self, vertices: &[DVec3; 3]) -> bool {
        vertices.iter().all(|&v| self.contains_point(v))
    }
}
