//! World-to-cell mapping of the voxel grid
//!
//! The lattice is aligned so that cell centers fall on `model.min + n * voxel_size`.
//! The model box is padded by [`MARGIN_CELLS`] cells plus half a cell on every side,
//! so the model is always surrounded by exterior air.

use crate::core::error::Error;
use crate::core::types::{DVec3, IVec3, Result};
use crate::math::{Aabb, CellBox};

/// Cells of exterior air kept between the model box and the grid boundary
pub const MARGIN_CELLS: i32 = 2;

/// Largest number of cells allowed along one axis
pub const MAX_AXIS_CELLS: i32 = 1 << 16;

/// Largest number of cells allowed in the whole grid
pub const MAX_TOTAL_CELLS: u64 = 1 << 36;

/// Immutable geometry of the voxel grid
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    model: Aabb,
    voxel_size: f64,
    min_corner: DVec3,
    dims: IVec3,
}

impl Domain {
    /// Build the grid geometry for a model bounding box
    ///
    /// # Arguments
    /// * `min` - Minimum corner of the model
    /// * `max` - Maximum corner of the model
    /// * `voxel_size` - Edge length of one cubic cell
    ///
    /// # Errors
    /// `Configuration` for non-finite input, a non-positive voxel size,
    /// an empty box or a grid that is too large.
    pub fn new(min: DVec3, max: DVec3, voxel_size: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || !voxel_size.is_finite() {
            return Err(Error::Configuration(
                "domain bounds and voxel size must be finite".into(),
            ));
        }
        if voxel_size <= 0.0 {
            return Err(Error::Configuration(format!(
                "voxel size must be positive, got {voxel_size}"
            )));
        }
        if !max.cmpgt(min).all() {
            return Err(Error::Configuration(format!(
                "max corner ({}, {}, {}) must exceed min corner ({}, {}, {}) on every axis",
                max.x, max.y, max.z, min.x, min.y, min.z
            )));
        }

        let span = (max - min) / voxel_size;
        let limit = f64::from(MAX_AXIS_CELLS - 2 * MARGIN_CELLS - 1);
        if span.max_element() > limit {
            return Err(Error::Configuration(format!(
                "grid too large: more than {MAX_AXIS_CELLS} cells along one axis"
            )));
        }
        // Absorb rounding noise so an exact multiple does not gain a cell
        let inner = (span - DVec3::splat(1e-9)).ceil().max(DVec3::ZERO).as_ivec3();
        let dims = inner + IVec3::splat(2 * MARGIN_CELLS + 1);

        let total = dims.x as u64 * dims.y as u64 * dims.z as u64;
        if total > MAX_TOTAL_CELLS {
            return Err(Error::Configuration(format!(
                "grid too large: {total} cells exceeds {MAX_TOTAL_CELLS}"
            )));
        }

        let min_corner = min - DVec3::splat((f64::from(MARGIN_CELLS) + 0.5) * voxel_size);
        Ok(Self {
            model: Aabb::new(min, max),
            voxel_size,
            min_corner,
            dims,
        })
    }

    /// Model box the domain was configured with
    pub fn model(&self) -> Aabb {
        self.model
    }

    pub fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    /// World position of the grid's minimum corner (padded lattice origin)
    pub fn min_corner(&self) -> DVec3 {
        self.min_corner
    }

    /// Cell counts per axis
    pub fn dims(&self) -> IVec3 {
        self.dims
    }

    /// Every cell of the grid
    pub fn cell_box(&self) -> CellBox {
        CellBox::new(IVec3::ZERO, self.dims)
    }

    pub fn cell_count(&self) -> u64 {
        self.cell_box().cell_count()
    }

    /// Number of cells along the longest axis
    pub fn longest_axis_cells(&self) -> usize {
        self.dims.max_element() as usize
    }

    /// Volume of one cell in cubic world units
    pub fn cell_measure(&self) -> f64 {
        self.voxel_size * self.voxel_size * self.voxel_size
    }

    /// Convert a world position into continuous grid-index space
    pub fn to_grid_space(&self, point: DVec3) -> DVec3 {
        (point - self.min_corner) / self.voxel_size
    }

    /// Cell containing a world position, or `None` outside the grid
    pub fn cell_of(&self, point: DVec3) -> Option<IVec3> {
        let g = self.to_grid_space(point).floor();
        if !g.is_finite() {
            return None;
        }
        if g.cmplt(DVec3::ZERO).any() || g.cmpge(self.dims.as_dvec3()).any() {
            return None;
        }
        Some(g.as_ivec3())
    }

    pub fn contains_cell(&self, cell: IVec3) -> bool {
        self.cell_box().contains(cell)
    }

    /// World coordinates of a cell center
    pub fn cell_center(&self, cell: IVec3) -> DVec3 {
        self.min_corner + (cell.as_dvec3() + DVec3::splat(0.5)) * self.voxel_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> Domain {
        Domain::new(DVec3::ZERO, DVec3::splat(5.0), 0.5).unwrap()
    }

    #[test]
    fn test_dims_include_margin() {
        let d = unit_cube();
        assert_eq!(d.dims(), IVec3::splat(15));
        assert_eq!(d.min_corner(), DVec3::splat(-1.25));
        assert_eq!(d.longest_axis_cells(), 15);
        assert_eq!(d.cell_count(), 15 * 15 * 15);
    }

    #[test]
    fn test_centers_on_model_lattice() {
        let d = unit_cube();
        assert_eq!(d.cell_center(IVec3::splat(MARGIN_CELLS)), DVec3::ZERO);
        assert_eq!(d.cell_center(IVec3::splat(12)), DVec3::splat(5.0));
        assert_eq!(d.cell_of(DVec3::splat(2.5)), Some(IVec3::splat(7)));
    }

    #[test]
    fn test_cell_of_center_is_left_inverse() {
        let d = Domain::new(DVec3::new(-3.0, 1.0, 0.5), DVec3::new(4.0, 2.5, 9.0), 0.3).unwrap();
        for cell in d.cell_box().cells().step_by(7) {
            assert_eq!(d.cell_of(d.cell_center(cell)), Some(cell));
        }
    }

    #[test]
    fn test_cell_of_outside() {
        let d = unit_cube();
        assert_eq!(d.cell_of(DVec3::splat(-2.0)), None);
        assert_eq!(d.cell_of(DVec3::new(2.0, 2.0, 6.25)), None);
        assert_eq!(d.cell_of(DVec3::new(f64::NAN, 0.0, 0.0)), None);
        assert_eq!(d.cell_of(DVec3::splat(-1.25)), Some(IVec3::ZERO));
    }

    #[test]
    fn test_uneven_axes() {
        let d = Domain::new(DVec3::ZERO, DVec3::new(1.0, 2.0, 0.2), 0.5).unwrap();
        assert_eq!(d.dims(), IVec3::new(7, 9, 6));
        assert!(d.model().contains_point(DVec3::new(1.0, 2.0, 0.2)));
        let far = DVec3::new(1.0, 2.0, 0.2) + DVec3::splat(0.5);
        assert!(!d.model().contains_point(far));
        assert!(d.cell_of(far).is_some());
    }

    #[test]
    fn test_invalid_configuration() {
        let bad = [
            Domain::new(DVec3::ZERO, DVec3::ONE, 0.0),
            Domain::new(DVec3::ZERO, DVec3::ONE, -1.0),
            Domain::new(DVec3::ZERO, DVec3::ONE, f64::NAN),
            Domain::new(DVec3::ONE, DVec3::ONE, 0.1),
            Domain::new(DVec3::ZERO, DVec3::new(1.0, 0.0, 1.0), 0.1),
            Domain::new(DVec3::ZERO, DVec3::new(f64::INFINITY, 1.0, 1.0), 0.1),
            Domain::new(DVec3::ZERO, DVec3::splat(1.0e6), 1.0e-3),
        ];
        for result in bad {
            assert!(matches!(result, Err(Error::Configuration(_))));
        }
    }
}
