//! Enclosed volume discovery
//!
//! Unset cells on the grid boundary are flooded first and together form the
//! exterior, which takes the first volume id. The remaining unset cells are
//! then scanned chunk by chunk; each one found seeds a breadth-first
//! 6-connected flood that claims its whole component. A flood entering a
//! chunk that is still uniformly unset claims the chunk in one step.
//!
//! Enclosed volume ids follow a whole-grid scan in x, then y, then z order:
//! each component remembers its first cell in that order, and components are
//! renumbered by it once every flood is done. Chunk size never changes ids.

use crate::core::error::Error;
use crate::core::types::{IVec3, Result};
use crate::math::CellBox;
use crate::segment::volume::{Segmentation, VolumeInfo};
use crate::storage::ChunkedGrid;
use crate::voxel::label::UNSET;
use std::collections::VecDeque;

/// Face neighbors
const NEIGHBORS_6: [IVec3; 6] = [
    IVec3::new(-1, 0, 0),
    IVec3::new(1, 0, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(0, 0, -1),
    IVec3::new(0, 0, 1),
];

/// Labels every unset cell of a grid with a volume id
pub struct Segmenter<'a> {
    grid: &'a mut ChunkedGrid,
    first_volume_index: i32,
    cell_measure: f64,
    queue: VecDeque<IVec3>,
}

/// Running totals of the volume being flooded
struct Component {
    bounds: CellBox,
    cell_count: u64,
    /// Earliest claimed cell in whole-grid scan order
    first: Option<IVec3>,
}

impl Component {
    fn new() -> Self {
        Self {
            bounds: CellBox::empty(),
            cell_count: 0,
            first: None,
        }
    }

    fn include(&mut self, cells: &CellBox) {
        self.bounds.include_box(cells);
        self.cell_count += cells.cell_count();
        self.first = Some(match self.first {
            Some(first) if scan_key(first) <= scan_key(cells.min) => first,
            _ => cells.min,
        });
    }
}

impl<'a> Segmenter<'a> {
    /// # Arguments
    /// * `grid` - Grid holding materials and unset cells
    /// * `first_volume_index` - Id given to the first volume found
    /// * `cell_measure` - Volume of one cell in cubic world units
    pub fn new(grid: &'a mut ChunkedGrid, first_volume_index: i32, cell_measure: f64) -> Self {
        Self {
            grid,
            first_volume_index,
            cell_measure,
            queue: VecDeque::new(),
        }
    }

    /// Run the scan, returning the volumes and material bounds
    pub fn run(mut self) -> Result<Segmentation> {
        let layout = *self.grid.layout();
        let mut result = Segmentation {
            first_volume_index: self.first_volume_index,
            ..Default::default()
        };

        if let Some(exterior) = self.flood_exterior()? {
            result.volumes.push(exterior);
            result.has_exterior = true;
        }

        let mut enclosed = Vec::new();
        for chunk in 0..layout.chunk_count() {
            let chunk_box = layout.chunk_box(chunk);

            if let Some(raw) = self.grid.uniform_label(chunk) {
                if raw == UNSET {
                    let found = result.volumes.len() + enclosed.len();
                    enclosed.push(self.flood(chunk_box.min, found)?);
                } else if self.is_material(raw) {
                    include(&mut result, raw, &chunk_box);
                }
                continue;
            }

            for cell in chunk_box.cells() {
                let raw = self.grid.fetch(cell)?;
                if raw == UNSET {
                    let found = result.volumes.len() + enclosed.len();
                    enclosed.push(self.flood(cell, found)?);
                } else if self.is_material(raw) {
                    include(&mut result, raw, &CellBox::from_cell(cell));
                }
            }
        }

        self.renumber(&mut result, enclosed)?;
        Ok(result)
    }

    fn is_material(&self, raw: i16) -> bool {
        raw > UNSET && i32::from(raw) < self.first_volume_index
    }

    /// Id for the volume following `found` earlier ones
    fn next_id(&self, found: usize) -> Result<i16> {
        let capacity = (i32::from(i16::MAX) - self.first_volume_index + 1).max(0) as usize;
        i32::try_from(found)
            .ok()
            .and_then(|n| self.first_volume_index.checked_add(n))
            .and_then(|id| i16::try_from(id).ok())
            .ok_or(Error::LabelSpaceExhausted(capacity))
    }

    /// Claim every unset cell reachable from the grid boundary under one id
    fn flood_exterior(&mut self) -> Result<Option<VolumeInfo>> {
        let layout = *self.grid.layout();
        let domain = self.grid.cell_box();
        let last = domain.max - IVec3::ONE;
        let mut component = Component::new();
        let mut id = None;

        self.queue.clear();
        for chunk in 0..layout.chunk_count() {
            let chunk_box = layout.chunk_box(chunk);
            let on_boundary =
                chunk_box.min.cmpeq(domain.min).any() || chunk_box.max.cmpeq(domain.max).any();
            if !on_boundary || self.grid.uniform_label(chunk).is_some_and(|raw| raw != UNSET) {
                continue;
            }
            for cell in chunk_box.cells() {
                if !(cell.cmpeq(domain.min).any() || cell.cmpeq(last).any()) {
                    continue;
                }
                if self.grid.fetch(cell)? != UNSET {
                    continue;
                }
                let label = match id {
                    Some(label) => label,
                    None => {
                        let label = self.next_id(0)?;
                        id = Some(label);
                        label
                    }
                };
                self.claim(cell, label, &mut component)?;
                self.drain(label, &mut component)?;
            }
        }

        Ok(id.map(|id| self.finish(id, component)))
    }

    fn flood(&mut self, seed: IVec3, found: usize) -> Result<(VolumeInfo, IVec3)> {
        let id = self.next_id(found)?;
        let mut component = Component::new();

        self.queue.clear();
        self.claim(seed, id, &mut component)?;
        self.drain(id, &mut component)?;
        let first = component.first.unwrap_or(seed);
        Ok((self.finish(id, component), first))
    }

    fn drain(&mut self, id: i16, component: &mut Component) -> Result<()> {
        let domain = self.grid.cell_box();
        while let Some(cell) = self.queue.pop_front() {
            for offset in NEIGHBORS_6 {
                let next = cell + offset;
                if domain.contains(next) && self.grid.fetch(next)? == UNSET {
                    self.claim(next, id, component)?;
                }
            }
        }
        Ok(())
    }

    fn finish(&self, id: i16, component: Component) -> VolumeInfo {
        log::trace!(
            "Volume {}: {} cells in {:?}..{:?}",
            id,
            component.cell_count,
            component.bounds.min,
            component.bounds.max
        );
        VolumeInfo {
            id,
            bounds: component.bounds,
            cell_count: component.cell_count,
            measure: component.cell_count as f64 * self.cell_measure,
        }
    }

    /// Label an unset cell, or its whole chunk when the chunk is uniformly unset
    fn claim(&mut self, cell: IVec3, id: i16, component: &mut Component) -> Result<()> {
        let layout = *self.grid.layout();
        let (chunk, _) = layout.locate(cell);

        if self.grid.uniform_label(chunk) == Some(UNSET) {
            let chunk_box = layout.chunk_box(chunk);
            self.grid.fill_chunk(chunk, id)?;
            component.include(&chunk_box);
            self.queue.extend(face_cells(&chunk_box));
        } else {
            self.grid.set(cell, id)?;
            component.include(&CellBox::from_cell(cell));
            self.queue.push_back(cell);
        }
        Ok(())
    }

    /// Give enclosed volumes ids in order of their first cell and relabel the grid to match
    fn renumber(
        &mut self,
        result: &mut Segmentation,
        mut enclosed: Vec<(VolumeInfo, IVec3)>,
    ) -> Result<()> {
        let offset = result.volumes.len();
        enclosed.sort_by_key(|&(_, first)| scan_key(first));

        let mut renamed = Vec::new();
        for (rank, (volume, _)) in enclosed.iter_mut().enumerate() {
            let id = self.next_id(offset + rank)?;
            if id != volume.id {
                renamed.push((volume.id, id));
                volume.id = id;
            }
        }

        if !renamed.is_empty() {
            let len = renamed.iter().map(|&(old, _)| old as usize + 1).max().unwrap_or(0);
            let mut table: Vec<i16> = (0..len).map(|raw| raw as i16).collect();
            for &(old, new) in &renamed {
                table[old as usize] = new;
            }
            log::debug!(
                "Renumbered {} of {} enclosed volumes into scan order",
                renamed.len(),
                enclosed.len()
            );
            self.grid.relabel(&table)?;
        }

        result
            .volumes
            .extend(enclosed.into_iter().map(|(volume, _)| volume));
        Ok(())
    }
}

/// Position of a cell in a whole-grid scan, x slowest and z fastest
fn scan_key(cell: IVec3) -> (i32, i32, i32) {
    (cell.x, cell.y, cell.z)
}

fn include(result: &mut Segmentation, material: i16, cells: &CellBox) {
    result
        .material_bounds
        .entry(material)
        .or_insert_with(CellBox::empty)
        .include_box(cells);
}

/// Cells on the surface of a box
fn face_cells(cells: &CellBox) -> Vec<IVec3> {
    let (min, last) = (cells.min, cells.max - IVec3::ONE);
    cells
        .cells()
        .filter(|c| c.cmpeq(min).any() || c.cmpeq(last).any())
        .collect()
}
