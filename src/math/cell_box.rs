//! Integer bounding boxes in cell space

use crate::core::types::IVec3;
use serde::{Deserialize, Serialize};

/// Box of grid cells, `min` inclusive and `max` exclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellBox {
    pub min: IVec3,
    pub max: IVec3,
}

impl CellBox {
    /// Box covering `min..max`
    pub fn new(min: IVec3, max: IVec3) -> Self {
        Self { min, max }
    }

    /// Box with no cells; including any cell turns it into that single cell
    pub fn empty() -> Self {
        Self {
            min: IVec3::MAX,
            max: IVec3::MIN,
        }
    }

    /// Box holding exactly one cell
    pub fn from_cell(cell: IVec3) -> Self {
        Self::new(cell, cell + IVec3::ONE)
    }

    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y || self.max.z <= self.min.z
    }

    /// Grow to include a cell
    pub fn include_cell(&mut self, cell: IVec3) {
        self.min = self.min.min(cell);
        self.max = self.max.max(cell + IVec3::ONE);
    }

    /// Grow to include another box
    pub fn include_box(&mut self, other: &CellBox) {
        if other.is_empty() {
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Overlap of two boxes, possibly empty
    pub fn intersection(&self, other: &CellBox) -> CellBox {
        CellBox::new(self.min.max(other.min), self.max.min(other.max))
    }

    pub fn contains(&self, cell: IVec3) -> bool {
        cell.cmpge(self.min).all() && cell.cmplt(self.max).all()
    }

    /// Extent along each axis (zero for empty boxes)
    pub fn shape(&self) -> IVec3 {
        (self.max - self.min).max(IVec3::ZERO)
    }

    pub fn cell_count(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        let s = self.shape();
        s.x as u64 * s.y as u64 * s.z as u64
    }

    /// Box grown by `cells` on every side
    pub fn padded(&self, cells: i32) -> CellBox {
        CellBox::new(self.min - IVec3::splat(cells), self.max + IVec3::splat(cells))
    }

    /// Cells of the box, x slowest and z fastest
    pub fn cells(&self) -> impl Iterator<Item = IVec3> + '_ {
        let (min, max) = (self.min, self.max);
        let empty = self.is_empty();
        (min.x..max.x)
            .flat_map(move |x| (min.y..max.y).map(move |y| (x, y)))
            .flat_map(move |(x, y)| (min.z..max.z).map(move |z| IVec3::new(x, y, z)))
            .filter(move |_| !empty)
    }
}
