//! Chunk layout and per-chunk storage

use crate::core::types::IVec3;
use crate::math::CellBox;
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

/// Splits a grid of `dims` cells into cubic chunks of `edge` cells
///
/// Chunks are numbered x-major with z fastest; cells inside a chunk use the
/// same order. Chunks on the high faces may hang past the grid; their cells
/// outside the grid are stored but never read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkLayout {
    dims: IVec3,
    edge: i32,
    counts: IVec3,
}

impl ChunkLayout {
    pub fn new(dims: IVec3, edge: u32) -> Self {
        let edge = edge.max(1) as i32;
        let counts = (dims + IVec3::splat(edge - 1)) / edge;
        Self { dims, edge, counts }
    }

    pub fn dims(&self) -> IVec3 {
        self.dims
    }

    pub fn edge(&self) -> i32 {
        self.edge
    }

    /// Chunk counts per axis
    pub fn counts(&self) -> IVec3 {
        self.counts
    }

    pub fn chunk_count(&self) -> usize {
        self.counts.x as usize * self.counts.y as usize * self.counts.z as usize
    }

    /// Cells stored per chunk, including any past the grid
    pub fn cells_per_chunk(&self) -> usize {
        let e = self.edge as usize;
        e * e * e
    }

    pub fn chunk_bytes(&self) -> usize {
        self.cells_per_chunk() * std::mem::size_of::<i16>()
    }

    /// Chunk id from chunk coordinates
    pub fn chunk_id(&self, coord: IVec3) -> usize {
        (coord.x as usize * self.counts.y as usize + coord.y as usize) * self.counts.z as usize
            + coord.z as usize
    }

    /// Chunk coordinates from a chunk id
    pub fn chunk_coord(&self, id: usize) -> IVec3 {
        let nz = self.counts.z as usize;
        let ny = self.counts.y as usize;
        IVec3::new(
            (id / (ny * nz)) as i32,
            ((id / nz) % ny) as i32,
            (id % nz) as i32,
        )
    }

    /// Chunk id and local index of an in-grid cell
    pub fn locate(&self, cell: IVec3) -> (usize, usize) {
        let coord = cell / self.edge;
        let local = cell - coord * self.edge;
        (self.chunk_id(coord), self.local_index(local))
    }

    /// Linear index of a cell offset inside its chunk
    pub fn local_index(&self, local: IVec3) -> usize {
        let e = self.edge as usize;
        (local.x as usize * e + local.y as usize) * e + local.z as usize
    }

    /// Cells of a chunk that lie inside the grid
    pub fn chunk_box(&self, id: usize) -> CellBox {
        let min = self.chunk_coord(id) * self.edge;
        CellBox::new(min, (min + IVec3::splat(self.edge)).min(self.dims))
    }

    /// Ids of the chunks overlapping a box already clipped to the grid
    pub fn chunks_overlapping(&self, region: &CellBox) -> Vec<usize> {
        let range = if region.is_empty() {
            CellBox::empty()
        } else {
            CellBox::new(
                region.min / self.edge,
                (region.max - IVec3::ONE) / self.edge + IVec3::ONE,
            )
        };
        range.cells().map(|coord| self.chunk_id(coord)).collect()
    }

    /// Whether every in-grid cell of a chunk holds the same value
    pub fn uniform_value(&self, id: usize, cells: &[i16]) -> Option<i16> {
        let bounds = self.chunk_box(id);
        let origin = bounds.min;
        let first = *cells.first()?;
        bounds
            .cells()
            .all(|cell| cells[self.local_index(cell - origin)] == first)
            .then_some(first)
    }
}

/// Storage state of one chunk
#[derive(Debug)]
pub enum ChunkSlot {
    /// Every in-grid cell holds this value; nothing allocated
    Uniform(i16),
    /// Materialized cells, accounted in the memory budget
    Resident(Box<[i16]>),
    /// LZ4-compressed cells kept in memory
    Packed(Vec<u8>),
    /// LZ4-compressed cells written to a spill file
    Spilled(PathBuf),
}

impl ChunkSlot {
    pub fn is_resident(&self) -> bool {
        matches!(self, ChunkSlot::Resident(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChunkSlot::Uniform(_) => "uniform",
            ChunkSlot::Resident(_) => "resident",
            ChunkSlot::Packed(_) => "packed",
            ChunkSlot::Spilled(_) => "spilled",
        }
    }

    /// Value of the chunk when it is stored as uniform
    pub fn uniform(&self) -> Option<i16> {
        match self {
            ChunkSlot::Uniform(v) => Some(*v),
            _ => None,
        }
    }
}

/// Decoded read-only view of one chunk
#[derive(Debug)]
pub enum ChunkView<'a> {
    Uniform(i16),
    Cells(Cow<'a, [i16]>),
    /// Cells decoded once and shared between readers of a frozen grid
    Shared(Arc<[i16]>),
}

impl ChunkView<'_> {
    pub fn get(&self, local: usize) -> i16 {
        match self {
            ChunkView::Uniform(v) => *v,
            ChunkView::Cells(cells) => cells[local],
            ChunkView::Shared(cells) => cells[local],
        }
    }
}
