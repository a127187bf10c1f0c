//! Chunked label grid with paging under a memory budget
//!
//! Chunks start as `Uniform(0)` and only allocate when a differing value is
//! written. Once the resident chunks exceed the budget, the least recently
//! used one is collapsed to uniform or LZ4-packed, optionally to a spill file.
//! Reads of packed chunks in a frozen grid go through a small shared set of
//! decoded copies, so repeated lookups cost one decode per chunk.

use crate::core::error::Error;
use crate::core::types::{IVec3, Result};
use crate::math::CellBox;
use crate::storage::budget::MemoryBudget;
use crate::storage::cache::{ChunkCache, DecodedChunks};
use crate::storage::chunk::{ChunkLayout, ChunkSlot, ChunkView};
use crate::storage::config::GridConfig;
use crate::storage::disk_io::{pack_cells, read_spilled, unpack_cells, SpillDir};
use crate::voxel::label::{filter_label, OUT_OF_DOMAIN, UNSET};
use serde::Serialize;
use std::borrow::Cow;
use std::fs;
use std::sync::{Arc, Mutex, PoisonError};

/// Decoded packed chunks kept for reads after freezing
const DECODED_CHUNKS: usize = 8;

/// Snapshot of chunk storage states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GridStats {
    pub chunks: usize,
    pub uniform: usize,
    pub resident: usize,
    pub packed: usize,
    pub spilled: usize,
    pub resident_bytes: usize,
    pub decoded: usize,
}

/// 3-D grid of `i16` labels split into paged chunks
pub struct ChunkedGrid {
    layout: ChunkLayout,
    slots: Vec<ChunkSlot>,
    budget: MemoryBudget,
    cache: ChunkCache,
    spill: Option<SpillDir>,
    decoded: Mutex<DecodedChunks>,
    frozen: bool,
}

impl ChunkedGrid {
    /// Create a grid with every cell unset
    pub fn new(dims: IVec3, config: &GridConfig) -> Result<Self> {
        config.validate()?;
        if !dims.cmpgt(IVec3::ZERO).all() {
            return Err(Error::Configuration(format!(
                "grid dimensions must be positive, got ({}, {}, {})",
                dims.x, dims.y, dims.z
            )));
        }

        let layout = ChunkLayout::new(dims, config.chunk_edge);
        let spill = config
            .spill_dir
            .as_deref()
            .map(SpillDir::new_in)
            .transpose()?;
        let slots = (0..layout.chunk_count())
            .map(|_| ChunkSlot::Uniform(UNSET))
            .collect();

        log::debug!(
            "Grid {}x{}x{} in {} chunks of {}^3, budget {} bytes",
            dims.x,
            dims.y,
            dims.z,
            layout.chunk_count(),
            layout.edge(),
            config.memory_budget_bytes
        );

        Ok(Self {
            layout,
            slots,
            budget: MemoryBudget::new(config.memory_budget_bytes),
            cache: ChunkCache::new(),
            spill,
            decoded: Mutex::new(DecodedChunks::new(DECODED_CHUNKS)),
            frozen: false,
        })
    }

    pub fn dims(&self) -> IVec3 {
        self.layout.dims()
    }

    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    /// Every cell of the grid
    pub fn cell_box(&self) -> CellBox {
        CellBox::new(IVec3::ZERO, self.dims())
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn check(&self, cell: IVec3) -> Result<()> {
        if self.cell_box().contains(cell) {
            Ok(())
        } else {
            Err(Error::OutOfDomainCell(cell))
        }
    }

    /// Read a cell, decoding its chunk if it is not resident
    pub fn get(&self, cell: IVec3) -> Result<i16> {
        self.check(cell)?;
        let (id, local) = self.layout.locate(cell);
        Ok(self.view(id)?.get(local))
    }

    /// Read a cell through the cache, making its chunk resident unless uniform
    pub fn fetch(&mut self, cell: IVec3) -> Result<i16> {
        self.check(cell)?;
        let (id, local) = self.layout.locate(cell);
        if let Some(value) = self.slots[id].uniform() {
            return Ok(value);
        }
        if self.frozen {
            return Ok(self.view(id)?.get(local));
        }
        Ok(self.cells_mut(id)?[local])
    }

    /// Write a cell
    pub fn set(&mut self, cell: IVec3, raw: i16) -> Result<()> {
        self.ensure_writable()?;
        self.check(cell)?;
        let (id, local) = self.layout.locate(cell);
        if self.slots[id].uniform() == Some(raw) {
            return Ok(());
        }
        self.cells_mut(id)?[local] = raw;
        Ok(())
    }

    /// Value of a chunk stored as uniform
    pub fn uniform_label(&self, id: usize) -> Option<i16> {
        self.slots[id].uniform()
    }

    /// Overwrite every cell of a chunk with one value
    pub fn fill_chunk(&mut self, id: usize, raw: i16) -> Result<()> {
        self.ensure_writable()?;
        match std::mem::replace(&mut self.slots[id], ChunkSlot::Uniform(raw)) {
            ChunkSlot::Resident(_) => {
                self.budget.remove(self.layout.chunk_bytes());
                self.cache.remove(id);
            }
            ChunkSlot::Spilled(path) => fs::remove_file(path)?,
            ChunkSlot::Uniform(_) | ChunkSlot::Packed(_) => {}
        }
        Ok(())
    }

    /// Decoded view of a chunk
    pub fn view(&self, id: usize) -> Result<ChunkView<'_>> {
        let n = self.layout.cells_per_chunk();
        Ok(match &self.slots[id] {
            ChunkSlot::Uniform(v) => ChunkView::Uniform(*v),
            ChunkSlot::Resident(cells) => ChunkView::Cells(Cow::Borrowed(&cells[..])),
            ChunkSlot::Packed(_) | ChunkSlot::Spilled(_) if self.frozen => {
                ChunkView::Shared(self.decoded(id)?)
            }
            ChunkSlot::Packed(bytes) => ChunkView::Cells(Cow::Owned(unpack_cells(bytes, n)?.into_vec())),
            ChunkSlot::Spilled(path) => ChunkView::Cells(Cow::Owned(read_spilled(path, n)?.into_vec())),
        })
    }

    fn decoded(&self, id: usize) -> Result<Arc<[i16]>> {
        let mut decoded = self.decoded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cells) = decoded.get(id) {
            return Ok(cells);
        }
        let n = self.layout.cells_per_chunk();
        let cells: Arc<[i16]> = match &self.slots[id] {
            ChunkSlot::Packed(bytes) => unpack_cells(bytes, n)?.into(),
            ChunkSlot::Spilled(path) => read_spilled(path, n)?.into(),
            slot => {
                return Err(Error::Storage(format!(
                    "chunk {id} is {}, not packed",
                    slot.kind()
                )))
            }
        };
        decoded.insert(id, Arc::clone(&cells));
        Ok(cells)
    }

    /// Replace each label `raw` in `0..table.len()` by `table[raw]`, in place
    ///
    /// Packed and spilled chunks are rewritten without becoming resident.
    pub fn relabel(&mut self, table: &[i16]) -> Result<()> {
        self.ensure_writable()?;
        let map = |raw: i16| {
            usize::try_from(raw)
                .ok()
                .and_then(|i| table.get(i).copied())
                .unwrap_or(raw)
        };
        let n = self.layout.cells_per_chunk();
        for slot in &mut self.slots {
            match slot {
                ChunkSlot::Uniform(v) => *v = map(*v),
                ChunkSlot::Resident(cells) => cells.iter_mut().for_each(|c| *c = map(*c)),
                ChunkSlot::Packed(bytes) => {
                    let mut cells = unpack_cells(bytes, n)?;
                    cells.iter_mut().for_each(|c| *c = map(*c));
                    *bytes = pack_cells(&cells);
                }
                ChunkSlot::Spilled(path) => {
                    let mut cells = read_spilled(path, n)?;
                    cells.iter_mut().for_each(|c| *c = map(*c));
                    fs::write(path, pack_cells(&cells))?;
                }
            }
        }
        Ok(())
    }

    /// Number of in-grid cells holding `raw`
    pub fn count_value(&self, raw: i16) -> Result<u64> {
        let mut count = 0;
        for id in 0..self.slots.len() {
            let bounds = self.layout.chunk_box(id);
            match self.view(id)? {
                ChunkView::Uniform(v) => {
                    if v == raw {
                        count += bounds.cell_count();
                    }
                }
                view => {
                    count += bounds
                        .cells()
                        .filter(|&cell| view.get(self.layout.local_index(cell - bounds.min)) == raw)
                        .count() as u64;
                }
            }
        }
        Ok(count)
    }

    /// Copy a window of `shape` cells starting at `origin` into `dest` (C order, z fastest)
    ///
    /// The window may start at negative indices or extend past the grid;
    /// cells outside the grid are written as [`OUT_OF_DOMAIN`].
    pub fn copy_region(&self, dest: &mut [i16], shape: [usize; 3], origin: IVec3) -> Result<()> {
        self.copy_mapped(dest, shape, origin, |raw| raw)
    }

    /// Same as [`copy_region`](Self::copy_region) with each label mapped through `filter[label]`
    ///
    /// Labels outside `0..filter.len()` become [`OUT_OF_DOMAIN`].
    pub fn copy_region_filtered(
        &self,
        dest: &mut [i16],
        shape: [usize; 3],
        origin: IVec3,
        filter: &[i16],
    ) -> Result<()> {
        self.copy_mapped(dest, shape, origin, |raw| filter_label(filter, raw))
    }

    fn copy_mapped(
        &self,
        dest: &mut [i16],
        shape: [usize; 3],
        origin: IVec3,
        map: impl Fn(i16) -> i16,
    ) -> Result<()> {
        let dest_len = dest.len();
        let shape_error = || Error::BufferShape { len: dest_len, shape };
        let len = shape.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n));
        if len != Some(dest_len) {
            return Err(shape_error());
        }
        let extent = window_extent(shape).ok_or_else(shape_error)?;
        let window_max = checked_add(origin, extent).ok_or_else(shape_error)?;

        dest.fill(OUT_OF_DOMAIN);
        let clipped = CellBox::new(origin, window_max).intersection(&self.cell_box());
        if clipped.is_empty() {
            return Ok(());
        }

        let [_, sy, sz] = shape;
        for id in self.layout.chunks_overlapping(&clipped) {
            let bounds = self.layout.chunk_box(id);
            let view = self.view(id)?;
            for cell in bounds.intersection(&clipped).cells() {
                let d = cell - origin;
                let index = (d.x as usize * sy + d.y as usize) * sz + d.z as usize;
                dest[index] = map(view.get(self.layout.local_index(cell - bounds.min)));
            }
        }
        Ok(())
    }

    /// Compact uniform resident chunks and reject further writes
    pub fn freeze(&mut self) {
        for id in 0..self.slots.len() {
            let collapsed = match &self.slots[id] {
                ChunkSlot::Resident(cells) => self.layout.uniform_value(id, cells),
                _ => None,
            };
            if let Some(value) = collapsed {
                self.slots[id] = ChunkSlot::Uniform(value);
                self.budget.remove(self.layout.chunk_bytes());
                self.cache.remove(id);
            }
        }
        self.frozen = true;
        log::debug!("Grid frozen: {:?}", self.stats());
    }

    /// Count chunks by storage state
    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats {
            chunks: self.slots.len(),
            resident_bytes: self.budget.used(),
            decoded: self.decoded.lock().unwrap_or_else(PoisonError::into_inner).held(),
            ..Default::default()
        };
        for slot in &self.slots {
            match slot {
                ChunkSlot::Uniform(_) => stats.uniform += 1,
                ChunkSlot::Resident(_) => stats.resident += 1,
                ChunkSlot::Packed(_) => stats.packed += 1,
                ChunkSlot::Spilled(_) => stats.spilled += 1,
            }
        }
        stats
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.frozen {
            Err(Error::Storage("grid is frozen".into()))
        } else {
            Ok(())
        }
    }

    fn cells_mut(&mut self, id: usize) -> Result<&mut [i16]> {
        self.make_resident(id)?;
        match &mut self.slots[id] {
            ChunkSlot::Resident(cells) => Ok(&mut cells[..]),
            _ => Err(Error::Storage(format!("chunk {id} is not resident"))),
        }
    }

    fn make_resident(&mut self, id: usize) -> Result<()> {
        if self.slots[id].is_resident() {
            self.cache.touch(id);
            return Ok(());
        }

        let cells = self.materialize(id)?;
        let bytes = self.layout.chunk_bytes();
        while !self.budget.can_load(bytes) {
            match self.cache.least_recent() {
                Some(victim) => self.evict(victim)?,
                None => break,
            }
        }

        self.slots[id] = ChunkSlot::Resident(cells);
        self.budget.add(bytes);
        self.cache.touch(id);
        Ok(())
    }

    fn materialize(&self, id: usize) -> Result<Box<[i16]>> {
        let n = self.layout.cells_per_chunk();
        match &self.slots[id] {
            ChunkSlot::Uniform(v) => Ok(vec![*v; n].into_boxed_slice()),
            ChunkSlot::Resident(cells) => Ok(cells.clone()),
            ChunkSlot::Packed(bytes) => unpack_cells(bytes, n),
            ChunkSlot::Spilled(path) => {
                let cells = read_spilled(path, n)?;
                fs::remove_file(path)?;
                Ok(cells)
            }
        }
    }

    fn evict(&mut self, id: usize) -> Result<()> {
        let compacted = match &self.slots[id] {
            ChunkSlot::Resident(cells) => self.compact(id, cells)?,
            _ => {
                self.cache.remove(id);
                return Ok(());
            }
        };
        log::trace!("Evicted chunk {} as {}", id, compacted.kind());
        self.slots[id] = compacted;
        self.budget.remove(self.layout.chunk_bytes());
        self.cache.remove(id);
        Ok(())
    }

    fn compact(&self, id: usize, cells: &[i16]) -> Result<ChunkSlot> {
        if let Some(value) = self.layout.uniform_value(id, cells) {
            return Ok(ChunkSlot::Uniform(value));
        }
        let packed = pack_cells(cells);
        match &self.spill {
            Some(spill) => Ok(ChunkSlot::Spilled(spill.write(id, &packed)?)),
            None => Ok(ChunkSlot::Packed(packed)),
        }
    }
}

fn window_extent(shape: [usize; 3]) -> Option<IVec3> {
    Some(IVec3::new(
        i32::try_from(shape[0]).ok()?,
        i32::try_from(shape[1]).ok()?,
        i32::try_from(shape[2]).ok()?,
    ))
}

fn checked_add(a: IVec3, b: IVec3) -> Option<IVec3> {
    Some(IVec3::new(
        a.x.checked_add(b.x)?,
        a.y.checked_add(b.y)?,
        a.z.checked_add(b.z)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_config() -> GridConfig {
        GridConfig {
            chunk_edge: 4,
            memory_budget_bytes: 128,
            spill_dir: None,
        }
    }

    fn pattern(cell: IVec3) -> i16 {
        ((cell.x * 7 + cell.y * 3 + cell.z) % 11) as i16 + 1
    }

    #[test]
    fn test_new_grid_is_unset_and_unallocated() {
        let grid = ChunkedGrid::new(IVec3::new(10, 9, 8), &GridConfig::default()).unwrap();
        assert_eq!(grid.get(IVec3::new(9, 8, 7)).unwrap(), UNSET);
        let stats = grid.stats();
        assert_eq!(stats.chunks, 1);
        assert_eq!(stats.uniform, 1);
        assert_eq!(stats.resident_bytes, 0);
    }

    #[test]
    fn test_invalid_dims() {
        let result = ChunkedGrid::new(IVec3::new(0, 4, 4), &GridConfig::default());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_set_get() {
        let mut grid = ChunkedGrid::new(IVec3::splat(10), &GridConfig::default()).unwrap();
        grid.set(IVec3::new(1, 2, 3), 42).unwrap();
        assert_eq!(grid.get(IVec3::new(1, 2, 3)).unwrap(), 42);
        assert_eq!(grid.fetch(IVec3::new(1, 2, 3)).unwrap(), 42);
        assert_eq!(grid.get(IVec3::new(3, 2, 1)).unwrap(), UNSET);
    }

    #[test]
    fn test_out_of_domain_cell() {
        let mut grid = ChunkedGrid::new(IVec3::splat(4), &GridConfig::default()).unwrap();
        assert!(matches!(grid.get(IVec3::new(4, 0, 0)), Err(Error::OutOfDomainCell(_))));
        assert!(matches!(grid.get(IVec3::new(0, -1, 0)), Err(Error::OutOfDomainCell(_))));
        assert!(matches!(grid.set(IVec3::new(0, 0, 9), 1), Err(Error::OutOfDomainCell(_))));
    }

    #[test]
    fn test_writing_uniform_value_does_not_allocate() {
        let mut grid = ChunkedGrid::new(IVec3::splat(8), &GridConfig::default()).unwrap();
        grid.set(IVec3::ONE, UNSET).unwrap();
        assert_eq!(grid.fetch(IVec3::ONE).unwrap(), UNSET);
        assert_eq!(grid.stats().resident, 0);
    }

    #[test]
    fn test_eviction_under_tiny_budget() {
        let dims = IVec3::new(10, 7, 9);
        let mut grid = ChunkedGrid::new(dims, &tiny_config()).unwrap();
        let cells: Vec<IVec3> = grid.cell_box().cells().collect();
        for &cell in &cells {
            grid.set(cell, pattern(cell)).unwrap();
        }

        let stats = grid.stats();
        assert_eq!(stats.resident, 1);
        assert!(stats.resident_bytes <= 128);
        assert!(stats.packed > 0);

        for &cell in &cells {
            assert_eq!(grid.get(cell).unwrap(), pattern(cell));
        }
        for &cell in cells.iter().rev() {
            assert_eq!(grid.fetch(cell).unwrap(), pattern(cell));
        }
    }

    #[test]
    fn test_eviction_collapses_uniform_chunks() {
        let mut grid = ChunkedGrid::new(IVec3::splat(8), &tiny_config()).unwrap();
        for cell in CellBox::new(IVec3::ZERO, IVec3::splat(4)).cells() {
            grid.set(cell, 9).unwrap();
        }
        grid.set(IVec3::splat(5), 1).unwrap();
        assert_eq!(grid.uniform_label(0), Some(9));
        assert_eq!(grid.stats().resident, 1);
    }

    #[test]
    fn test_spill_to_disk() {
        let parent = tempfile::tempdir().unwrap();
        let config = GridConfig {
            spill_dir: Some(parent.path().to_path_buf()),
            ..tiny_config()
        };
        let mut grid = ChunkedGrid::new(IVec3::splat(8), &config).unwrap();
        let cells: Vec<IVec3> = grid.cell_box().cells().collect();
        for &cell in &cells {
            grid.set(cell, pattern(cell)).unwrap();
        }
        assert!(grid.stats().spilled > 0);
        for &cell in &cells {
            assert_eq!(grid.get(cell).unwrap(), pattern(cell));
            assert_eq!(grid.fetch(cell).unwrap(), pattern(cell));
        }

        drop(grid);
        assert_eq!(fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_fill_chunk() {
        let mut grid = ChunkedGrid::new(IVec3::splat(8), &tiny_config()).unwrap();
        grid.set(IVec3::ZERO, 3).unwrap();
        grid.fill_chunk(0, 5).unwrap();
        assert_eq!(grid.uniform_label(0), Some(5));
        assert_eq!(grid.get(IVec3::splat(3)).unwrap(), 5);
        assert_eq!(grid.stats().resident_bytes, 0);
    }

    #[test]
    fn test_count_value() {
        let mut grid = ChunkedGrid::new(IVec3::splat(6), &tiny_config()).unwrap();
        grid.set(IVec3::ZERO, 2).unwrap();
        grid.set(IVec3::splat(5), 2).unwrap();
        assert_eq!(grid.count_value(2).unwrap(), 2);
        assert_eq!(grid.count_value(UNSET).unwrap(), 6 * 6 * 6 - 2);
    }

    #[test]
    fn test_copy_region_with_outside_window() {
        let mut grid = ChunkedGrid::new(IVec3::splat(5), &tiny_config()).unwrap();
        for cell in grid.cell_box().cells().collect::<Vec<_>>() {
            grid.set(cell, pattern(cell)).unwrap();
        }

        let shape = [3, 4, 7];
        let origin = IVec3::new(-1, 2, 0);
        let mut dest = vec![0i16; 3 * 4 * 7];
        grid.copy_region(&mut dest, shape, origin).unwrap();

        for i in 0..3 {
            for j in 0..4 {
                for k in 0..7 {
                    let cell = origin + IVec3::new(i, j, k);
                    let expected = grid.get(cell).unwrap_or(OUT_OF_DOMAIN);
                    let index = (i as usize * 4 + j as usize) * 7 + k as usize;
                    assert_eq!(dest[index], expected, "cell {:?}", cell);
                }
            }
        }
    }

    #[test]
    fn test_copy_region_fully_outside() {
        let grid = ChunkedGrid::new(IVec3::splat(5), &GridConfig::default()).unwrap();
        let mut dest = vec![7i16; 8];
        grid.copy_region(&mut dest, [2, 2, 2], IVec3::splat(-10)).unwrap();
        assert!(dest.iter().all(|&v| v == OUT_OF_DOMAIN));
    }

    #[test]
    fn test_copy_region_filtered() {
        let mut grid = ChunkedGrid::new(IVec3::splat(4), &GridConfig::default()).unwrap();
        grid.set(IVec3::new(1, 0, 0), 1).unwrap();
        grid.set(IVec3::new(2, 0, 0), 2).unwrap();
        grid.set(IVec3::new(3, 0, 0), 9).unwrap();

        let filter = [0i16, 10, 20];
        let mut dest = vec![0i16; 6];
        grid.copy_region_filtered(&mut dest, [6, 1, 1], IVec3::new(-1, 0, 0), &filter)
            .unwrap();
        assert_eq!(dest, vec![OUT_OF_DOMAIN, 0, 10, 20, OUT_OF_DOMAIN, OUT_OF_DOMAIN]);
    }

    #[test]
    fn test_buffer_shape_mismatch() {
        let grid = ChunkedGrid::new(IVec3::splat(4), &GridConfig::default()).unwrap();
        let mut dest = vec![0i16; 7];
        let result = grid.copy_region(&mut dest, [2, 2, 2], IVec3::ZERO);
        assert!(matches!(result, Err(Error::BufferShape { len: 7, .. })));
    }

    #[test]
    fn test_frozen_reads_decode_each_packed_chunk_once() {
        let mut grid = ChunkedGrid::new(IVec3::splat(8), &tiny_config()).unwrap();
        let cells: Vec<IVec3> = grid.cell_box().cells().collect();
        for &cell in &cells {
            grid.set(cell, pattern(cell)).unwrap();
        }
        grid.freeze();
        let packed = grid.stats().packed;
        assert!(packed > 0);
        assert_eq!(grid.stats().decoded, 0);

        let (id, _) = grid.layout().locate(IVec3::ZERO);
        assert!(matches!(grid.slots[id], ChunkSlot::Packed(_)));
        for _ in 0..3 {
            assert_eq!(grid.get(IVec3::ZERO).unwrap(), pattern(IVec3::ZERO));
        }
        assert_eq!(grid.stats().decoded, 1);

        for &cell in &cells {
            assert_eq!(grid.get(cell).unwrap(), pattern(cell));
        }
        assert_eq!(grid.stats().decoded, packed.min(DECODED_CHUNKS));
    }

    #[test]
    fn test_relabel_every_storage_state() {
        let parent = tempfile::tempdir().unwrap();
        for spill_dir in [None, Some(parent.path().to_path_buf())] {
            let config = GridConfig {
                spill_dir,
                ..tiny_config()
            };
            let mut grid = ChunkedGrid::new(IVec3::splat(8), &config).unwrap();
            let cells: Vec<IVec3> = grid.cell_box().cells().collect();
            for &cell in &cells {
                grid.set(cell, pattern(cell)).unwrap();
            }
            grid.fill_chunk(0, 3).unwrap();

            // Swap labels 3 and 4, leave everything else
            let table = [0i16, 1, 2, 4, 3];
            grid.relabel(&table).unwrap();
            for &cell in &cells {
                let before = if grid.layout().locate(cell).0 == 0 { 3 } else { pattern(cell) };
                let expected = match before {
                    3 => 4,
                    4 => 3,
                    v => v,
                };
                assert_eq!(grid.get(cell).unwrap(), expected, "cell {:?}", cell);
            }
        }
    }

    #[test]
    fn test_freeze() {
        let mut grid = ChunkedGrid::new(IVec3::splat(8), &GridConfig::default()).unwrap();
        grid.set(IVec3::ZERO, 4).unwrap();
        grid.fill_chunk(0, 4).unwrap();
        grid.set(IVec3::ONE, 6).unwrap();
        grid.set(IVec3::ONE, 4).unwrap();
        grid.freeze();

        assert!(grid.is_frozen());
        assert_eq!(grid.stats().uniform, 1);
        assert_eq!(grid.stats().resident_bytes, 0);
        assert!(matches!(grid.set(IVec3::ZERO, 1), Err(Error::Storage(_))));
        assert!(matches!(grid.relabel(&[0]), Err(Error::Storage(_))));
        assert_eq!(grid.fetch(IVec3::ONE).unwrap(), 4);
    }
}
