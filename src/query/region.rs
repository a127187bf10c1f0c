//! Owned extraction buffers

use crate::core::error::Error;
use crate::core::types::{IVec3, Result};
use crate::math::CellBox;
use crate::voxel::label::OUT_OF_DOMAIN;

/// Window of raw labels copied out of the grid
///
/// Data is stored in C order with `k` fastest: `data[(i * nj + j) * nk + k]`
/// holds grid cell `origin + (i, j, k)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionBuffer {
    origin: IVec3,
    shape: [usize; 3],
    data: Vec<i16>,
}

impl RegionBuffer {
    /// Buffer of `shape` cells at `origin`, filled with [`OUT_OF_DOMAIN`]
    pub fn new(origin: IVec3, shape: [usize; 3]) -> Result<Self> {
        let len = shape
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or(Error::BufferShape { len: 0, shape })?;
        Ok(Self {
            origin,
            shape,
            data: vec![OUT_OF_DOMAIN; len],
        })
    }

    /// Buffer covering a cell box
    pub fn covering(cells: &CellBox) -> Result<Self> {
        let s = cells.shape();
        Self::new(cells.min, [s.x as usize, s.y as usize, s.z as usize])
    }

    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn data(&self) -> &[i16] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [i16] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<i16> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Linear index of a buffer position
    pub fn index(&self, [i, j, k]: [usize; 3]) -> usize {
        (i * self.shape[1] + j) * self.shape[2] + k
    }

    /// Value at a buffer position
    pub fn get(&self, pos: [usize; 3]) -> Option<i16> {
        let [ni, nj, nk] = self.shape;
        if pos[0] < ni && pos[1] < nj && pos[2] < nk {
            Some(self.data[self.index(pos)])
        } else {
            None
        }
    }

    /// Value copied from a grid cell, if the cell lies in the window
    pub fn at_cell(&self, cell: IVec3) -> Option<i16> {
        let d = cell - self.origin;
        if d.cmplt(IVec3::ZERO).any() {
            return None;
        }
        self.get([d.x as usize, d.y as usize, d.z as usize])
    }

    /// The `i`/`j` plane at depth `k`, one row per `i`
    pub fn slice_k(&self, k: usize) -> Vec<Vec<i16>> {
        let [ni, nj, nk] = self.shape;
        if k >= nk {
            return Vec::new();
        }
        (0..ni)
            .map(|i| (0..nj).map(|j| self.data[self.index([i, j, k])]).collect())
            .collect()
    }

    /// Number of values equal to `raw`
    pub fn count(&self, raw: i16) -> usize {
        self.data.iter().filter(|&&v| v == raw).count()
    }
}
