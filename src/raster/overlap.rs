//! Triangle/box overlap using the separating axis theorem
//!
//! Boxes are closed: a triangle touching a face, edge or corner overlaps.

use crate::core::types::DVec3;

/// Axes shorter than this are skipped as degenerate
const AXIS_EPSILON: f64 = 1e-18;

/// Check whether a triangle overlaps an axis-aligned box
///
/// Tests the 3 box axes, the triangle normal and the 9 edge cross products.
/// Degenerate triangles (needles, points) skip the axes they cannot define,
/// which keeps the test conservative.
///
/// # Arguments
/// * `center` - Box center
/// * `half` - Box half-extents
/// * `tri` - Triangle vertices
pub fn tri_box_overlap(center: DVec3, half: DVec3, tri: &[DVec3; 3]) -> bool {
    // Translate triangle to box-local space
    let v0 = tri[0] - center;
    let v1 = tri[1] - center;
    let v2 = tri[2] - center;

    // Box axes
    let lo = v0.min(v1).min(v2);
    let hi = v0.max(v1).max(v2);
    if lo.cmpgt(half).any() || hi.cmplt(-half).any() {
        return false;
    }

    let edges = [v1 - v0, v2 - v1, v0 - v2];

    // Triangle plane
    let normal = edges[0].cross(edges[1]);
    if normal.length_squared() > AXIS_EPSILON {
        let radius = half.dot(normal.abs());
        if normal.dot(v0).abs() > radius {
            return false;
        }
    }

    // Box edges x triangle edges
    for axis in [DVec3::X, DVec3::Y, DVec3::Z] {
        for edge in &edges {
            let a = axis.cross(*edge);
            if a.length_squared() <= AXIS_EPSILON {
                continue;
            }
            let p0 = a.dot(v0);
            let p1 = a.dot(v1);
            let p2 = a.dot(v2);
            let radius = half.dot(a.abs());
            if p0.min(p1).min(p2) > radius || p0.max(p1).max(p2) < -radius {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF: DVec3 = DVec3::splat(0.5);

    #[test]
    fn test_triangle_through_box() {
        let tri = [
            DVec3::new(-2.0, -2.0, 0.1),
            DVec3::new(2.0, -2.0, 0.1),
            DVec3::new(0.0, 2.0, 0.1),
        ];
        assert!(tri_box_overlap(DVec3::ZERO, HALF, &tri));
    }

    #[test]
    fn test_separated_by_box_axis() {
        let tri = [
            DVec3::new(-2.0, -2.0, 0.6),
            DVec3::new(2.0, -2.0, 0.6),
            DVec3::new(0.0, 2.0, 0.6),
        ];
        assert!(!tri_box_overlap(DVec3::ZERO, HALF, &tri));
    }

    #[test]
    fn test_touching_face_overlaps() {
        let tri = [
            DVec3::new(-2.0, -2.0, 0.5),
            DVec3::new(2.0, -2.0, 0.5),
            DVec3::new(0.0, 2.0, 0.5),
        ];
        assert!(tri_box_overlap(DVec3::ZERO, HALF, &tri));
    }

    #[test]
    fn test_separated_by_plane() {
        // Tilted plane x + y + z = 1.6 misses the corner at (0.5, 0.5, 0.5)
        let tri = [
            DVec3::new(1.6, 0.0, 0.0),
            DVec3::new(0.0, 1.6, 0.0),
            DVec3::new(0.0, 0.0, 1.6),
        ];
        assert!(!tri_box_overlap(DVec3::ZERO, HALF, &tri));

        let tri = tri.map(|v| v * 0.9);
        assert!(tri_box_overlap(DVec3::ZERO, HALF, &tri));
    }

    #[test]
    fn test_separated_by_edge_axis() {
        // Bounding boxes and plane overlap, only an edge cross axis separates
        let tri = [
            DVec3::new(0.9, 0.0, 0.0),
            DVec3::new(0.0, 0.9, 0.0),
            DVec3::new(0.9, 0.9, 0.0),
        ];
        assert!(tri_box_overlap(DVec3::ZERO, HALF, &tri));

        let tri = [
            DVec3::new(1.2, 0.0, 0.0),
            DVec3::new(0.0, 1.2, 0.0),
            DVec3::new(1.2, 1.2, 0.0),
        ];
        assert!(!tri_box_overlap(DVec3::ZERO, HALF, &tri));
    }

    #[test]
    fn test_degenerate_point() {
        let inside = [DVec3::splat(0.2); 3];
        let outside = [DVec3::splat(0.7); 3];
        assert!(tri_box_overlap(DVec3::ZERO, HALF, &inside));
        assert!(!tri_box_overlap(DVec3::ZERO, HALF, &outside));
    }

    #[test]
    fn test_degenerate_needle() {
        let through = [
            DVec3::new(-3.0, 0.0, 0.0),
            DVec3::new(3.0, 0.0, 0.0),
            DVec3::new(3.0, 0.0, 0.0),
        ];
        assert!(tri_box_overlap(DVec3::ZERO, HALF, &through));

        // Diagonal needle passing beside the corner
        let beside = [
            DVec3::new(1.2, 0.0, 0.0),
            DVec3::new(0.0, 1.2, 0.0),
            DVec3::new(0.0, 1.2, 0.0),
        ];
        assert!(!tri_box_overlap(DVec3::ZERO, HALF, &beside));
    }
}
