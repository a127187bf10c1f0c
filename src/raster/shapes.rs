//! Procedural closed meshes

use crate::core::types::DVec3;
use crate::raster::rasterizer::Triangle;

/// Two triangles covering the quad `a b c d` (counter-clockwise)
pub fn quad(a: DVec3, b: DVec3, c: DVec3, d: DVec3, material: i32) -> [Triangle; 2] {
    [
        Triangle::new(a, b, c, material),
        Triangle::new(a, c, d, material),
    ]
}

/// Closed axis-aligned box surface, outward facing
pub fn cuboid(min: DVec3, max: DVec3, material: i32) -> Vec<Triangle> {
    let corner = |x: bool, y: bool, z: bool| {
        DVec3::new(
            if x { max.x } else { min.x },
            if y { max.y } else { min.y },
            if z { max.z } else { min.z },
        )
    };
    let faces = [
        // -x, +x
        [corner(false, false, false), corner(false, false, true), corner(false, true, true), corner(false, true, false)],
        [corner(true, false, false), corner(true, true, false), corner(true, true, true), corner(true, false, true)],
        // -y, +y
        [corner(false, false, false), corner(true, false, false), corner(true, false, true), corner(false, false, true)],
        [corner(false, true, false), corner(false, true, true), corner(true, true, true), corner(true, true, false)],
        // -z, +z
        [corner(false, false, false), corner(false, true, false), corner(true, true, false), corner(true, false, false)],
        [corner(false, false, true), corner(true, false, true), corner(true, true, true), corner(false, true, true)],
    ];
    faces
        .iter()
        .flat_map(|&[a, b, c, d]| quad(a, b, c, d, material))
        .collect()
}

/// Row of `rooms` cubic rooms of edge `size` along +x, sharing their partition walls
pub fn room_row(origin: DVec3, rooms: usize, size: f64, material: i32) -> Vec<Triangle> {
    (0..rooms)
        .flat_map(|i| {
            let min = origin + DVec3::new(i as f64 * size, 0.0, 0.0);
            cuboid(min, min + DVec3::splat(size), material)
        })
        .collect()
}
