//! Conservative triangle rasterization into the label grid
//!
//! Every cell whose closed box touches a triangle is stamped with the
//! triangle's material. Paired with the 6-connected flood fill this keeps a
//! watertight mesh free of diagonal leaks.

use crate::core::error::Error;
use crate::core::types::{DVec3, IVec3, Result};
use crate::math::CellBox;
use crate::raster::overlap::tri_box_overlap;
use crate::storage::ChunkedGrid;
use crate::voxel::Domain;
use rayon::prelude::*;
use serde::Serialize;

/// Inflation of the cell half-size in grid units, absorbs rounding on shared faces
const BOX_EPSILON: f64 = 1e-9;

/// Triangles whose doubled area in grid units is below this count as degenerate
const DEGENERATE_AREA: f64 = 1e-12;

/// Triangles processed per parallel batch
const PARALLEL_BATCH: usize = 4096;

/// Triangle with the material of the boundary it belongs to
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub vertices: [DVec3; 3],
    pub material: i32,
}

impl Triangle {
    pub fn new(a: DVec3, b: DVec3, c: DVec3, material: i32) -> Self {
        Self {
            vertices: [a, b, c],
            material,
        }
    }
}

/// Counters accumulated over ingestion
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub triangles: u64,
    /// Triangles partly or fully outside the grid
    pub clipped: u64,
    /// Triangles reaching past the configured model box into the margin
    pub outside_model: u64,
    /// Triangles with (near) zero area
    pub degenerate: u64,
    pub cells_written: u64,
}

/// Cells overlapped by one triangle
#[derive(Clone, Debug, Default)]
pub struct Coverage {
    pub cells: Vec<IVec3>,
    pub clipped: bool,
    pub outside_model: bool,
    pub degenerate: bool,
}

/// Validate a material id and convert it to its stored form
pub fn material_label(material: i32) -> Result<i16> {
    i16::try_from(material)
        .ok()
        .filter(|&m| m >= 1)
        .ok_or(Error::InvalidMaterial(material))
}

/// Compute the cells a triangle overlaps, clipped to the grid
pub fn covered_cells(domain: &Domain, vertices: &[DVec3; 3]) -> Coverage {
    let g = vertices.map(|v| domain.to_grid_space(v));
    if !g.iter().all(|p| p.is_finite()) {
        return Coverage {
            clipped: true,
            outside_model: true,
            ..Default::default()
        };
    }

    let dims = domain.dims().as_dvec3();
    let lo = g[0].min(g[1]).min(g[2]);
    let hi = g[0].max(g[1]).max(g[2]);
    let clipped = lo.cmplt(DVec3::ZERO).any() || hi.cmpgt(dims).any();
    let degenerate = (g[1] - g[0]).cross(g[2] - g[0]).length_squared() < DEGENERATE_AREA;

    let candidates = CellBox::new(
        (lo - DVec3::splat(BOX_EPSILON)).floor().max(DVec3::ZERO).as_ivec3(),
        ((hi + DVec3::splat(BOX_EPSILON)).floor() + DVec3::ONE)
            .min(dims)
            .as_ivec3(),
    );

    let half = DVec3::splat(0.5 + BOX_EPSILON);
    let mut cells: Vec<IVec3> = candidates
        .cells()
        .filter(|cell| tri_box_overlap(cell.as_dvec3() + DVec3::splat(0.5), half, &g))
        .collect();

    if cells.is_empty() && degenerate {
        let centroid = (vertices[0] + vertices[1] + vertices[2]) / 3.0;
        cells.extend(domain.cell_of(centroid));
    }

    Coverage {
        cells,
        clipped,
        outside_model: !domain.model().contains_triangle(vertices),
        degenerate,
    }
}

/// Write a triangle's material into every cell it overlaps
pub fn rasterize(
    grid: &mut ChunkedGrid,
    domain: &Domain,
    triangle: &Triangle,
    stats: &mut IngestStats,
) -> Result<()> {
    let material = material_label(triangle.material)?;
    let coverage = covered_cells(domain, &triangle.vertices);
    stamp(grid, &coverage, material, stats)
}

/// Rasterize a batch, computing overlaps in parallel and writing in input order
///
/// Produces the same grid as calling [`rasterize`] on each triangle in turn.
/// Materials are validated up front so a bad id leaves the grid untouched.
pub fn rasterize_batch(
    grid: &mut ChunkedGrid,
    domain: &Domain,
    triangles: &[Triangle],
    stats: &mut IngestStats,
) -> Result<()> {
    let materials = triangles
        .iter()
        .map(|t| material_label(t.material))
        .collect::<Result<Vec<_>>>()?;

    for (batch, labels) in triangles
        .chunks(PARALLEL_BATCH)
        .zip(materials.chunks(PARALLEL_BATCH))
    {
        let coverages: Vec<Coverage> = batch
            .par_iter()
            .map(|t| covered_cells(domain, &t.vertices))
            .collect();
        for (coverage, &material) in coverages.iter().zip(labels) {
            stamp(grid, coverage, material, stats)?;
        }
    }
    Ok(())
}

fn stamp(
    grid: &mut ChunkedGrid,
    coverage: &Coverage,
    material: i16,
    stats: &mut IngestStats,
) -> Result<()> {
    for &cell in &coverage.cells {
        grid.set(cell, material)?;
    }
    stats.triangles += 1;
    stats.cells_written += coverage.cells.len() as u64;
    if coverage.clipped {
        stats.clipped += 1;
    }
    if coverage.outside_model {
        stats.outside_model += 1;
    }
    if coverage.degenerate {
        stats.degenerate += 1;
    }
    Ok(())
}
