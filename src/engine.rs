//! Voxelization engine
//!
//! [`Voxelizer`] sequences the pipeline as an explicit state machine:
//! configure the domain, push triangles, segment once, then serve reads.
//! After segmentation the grid is frozen and every query takes `&self`.

use crate::core::error::Error;
use crate::core::types::{DVec3, IVec3, Result};
use crate::math::CellBox;
use crate::query::{filter, RegionBuffer};
use crate::raster::rasterizer::{self, IngestStats, Triangle};
use crate::segment::{Segmentation, Segmenter, VolumeInfo};
use crate::storage::{ChunkedGrid, GridConfig, GridStats};
use crate::voxel::label::{Label, OUT_OF_DOMAIN, UNSET};
use crate::voxel::Domain;
use serde::Serialize;
use std::fmt;

/// Pipeline phase of a [`Voxelizer`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for the domain
    Configuring,
    /// Accepting triangles
    Ingesting,
    /// Volumes labeled, grid read-only
    Segmented,
    /// Segmentation failed; only `phase()` is meaningful
    Poisoned,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Configuring => "configuring",
            Phase::Ingesting => "ingesting",
            Phase::Segmented => "segmented",
            Phase::Poisoned => "poisoned",
        };
        f.write_str(name)
    }
}

/// Cell and label found for a world point
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PointLabel {
    pub point: DVec3,
    /// `None` when the point lies outside the grid
    pub cell: Option<IVec3>,
    /// Raw label, [`OUT_OF_DOMAIN`] when the point lies outside the grid
    pub label: i16,
}

/// Grid and bookkeeping shared by the ingesting and segmented phases
struct Workspace {
    domain: Domain,
    grid: ChunkedGrid,
    ingest: IngestStats,
    max_material: i16,
}

impl Workspace {
    fn first_volume_index(&self) -> i32 {
        i32::from(self.max_material) + 1
    }

    fn check_cell(&self, cell: IVec3) -> Result<()> {
        if self.domain.contains_cell(cell) {
            Ok(())
        } else {
            Err(Error::OutOfDomainCell(cell))
        }
    }
}

enum State {
    Configuring,
    Ingesting(Workspace),
    Segmented {
        work: Workspace,
        segmentation: Segmentation,
    },
    Poisoned,
}

/// Voxelizes closed meshes and labels the enclosed volumes
pub struct Voxelizer {
    config: GridConfig,
    state: State,
}

impl Voxelizer {
    /// Create an engine with the given store configuration
    pub fn new(config: GridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: State::Configuring,
        })
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Configuring => Phase::Configuring,
            State::Ingesting(_) => Phase::Ingesting,
            State::Segmented { .. } => Phase::Segmented,
            State::Poisoned => Phase::Poisoned,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    // --- Configuring ---

    /// Set the model bounding box and voxel size, allocating the grid
    ///
    /// # Arguments
    /// * `min` - Minimum corner of the model
    /// * `max` - Maximum corner of the model
    /// * `voxel_size` - Edge length of one cubic cell
    pub fn configure(&mut self, min: DVec3, max: DVec3, voxel_size: f64) -> Result<()> {
        if !matches!(self.state, State::Configuring) {
            return Err(Error::phase("configure", self.phase()));
        }

        let domain = Domain::new(min, max, voxel_size)?;
        let grid = ChunkedGrid::new(domain.dims(), &self.config)?;
        let dims = domain.dims();
        log::info!(
            "Configured {}x{}x{} cells of {} ({} chunks of {}^3)",
            dims.x,
            dims.y,
            dims.z,
            voxel_size,
            grid.layout().chunk_count(),
            grid.layout().edge()
        );

        self.state = State::Ingesting(Workspace {
            domain,
            grid,
            ingest: IngestStats::default(),
            max_material: 0,
        });
        Ok(())
    }

    // --- Ingesting ---

    /// Rasterize one triangle, writing `material_id` into every cell it touches
    pub fn push_triangle(&mut self, a: DVec3, b: DVec3, c: DVec3, material_id: i32) -> Result<()> {
        let work = self.ingesting_mut("push_triangle")?;
        let triangle = Triangle::new(a, b, c, material_id);
        rasterizer::rasterize(&mut work.grid, &work.domain, &triangle, &mut work.ingest)?;
        work.max_material = work.max_material.max(rasterizer::material_label(material_id)?);
        Ok(())
    }

    /// Rasterize many triangles; same result as pushing them one by one
    pub fn push_triangles(&mut self, triangles: &[Triangle]) -> Result<()> {
        let work = self.ingesting_mut("push_triangles")?;
        rasterizer::rasterize_batch(&mut work.grid, &work.domain, triangles, &mut work.ingest)?;
        if let Some(max) = triangles
            .iter()
            .filter_map(|t| rasterizer::material_label(t.material).ok())
            .max()
        {
            work.max_material = work.max_material.max(max);
        }
        log::debug!("Pushed {} triangles", triangles.len());
        Ok(())
    }

    /// Label every unset cell with a volume id and freeze the grid
    ///
    /// On failure the engine is poisoned and rejects every further operation.
    pub fn segment(&mut self) -> Result<()> {
        if !matches!(self.state, State::Ingesting(_)) {
            return Err(Error::phase("segment", self.phase()));
        }
        let State::Ingesting(mut work) = std::mem::replace(&mut self.state, State::Poisoned) else {
            return Err(Error::phase("segment", Phase::Poisoned));
        };

        if work.ingest.clipped > 0 {
            log::warn!(
                "{} of {} triangles extended past the domain and were clipped",
                work.ingest.clipped,
                work.ingest.triangles
            );
        }
        if work.ingest.outside_model > 0 {
            log::warn!(
                "{} triangles reach past the model box into the exterior margin",
                work.ingest.outside_model
            );
        }

        let start = std::time::Instant::now();
        let first_volume_index = work.first_volume_index();
        let cell_measure = work.domain.cell_measure();
        let segmentation = match Segmenter::new(&mut work.grid, first_volume_index, cell_measure).run() {
            Ok(segmentation) => segmentation,
            Err(e) => {
                log::error!("Segmentation failed: {}", e);
                return Err(e);
            }
        };
        work.grid.freeze();

        let elapsed = start.elapsed();
        log::info!(
            "Segmented {} volumes ({} enclosed) from {} triangles in {:.2}s",
            segmentation.volume_count(),
            segmentation.enclosed_count(),
            work.ingest.triangles,
            elapsed.as_secs_f64()
        );

        self.state = State::Segmented { work, segmentation };
        Ok(())
    }

    // --- Queries ---

    /// Geometry of the grid
    pub fn domain(&self) -> Result<&Domain> {
        Ok(&self.workspace("domain")?.domain)
    }

    /// Cell counts per axis
    pub fn dims(&self) -> Result<IVec3> {
        Ok(self.workspace("dims")?.domain.dims())
    }

    /// Cells along the longest axis; a cube of this edge at the origin covers the grid
    pub fn domain_size(&self) -> Result<usize> {
        Ok(self.workspace("domain_size")?.domain.longest_axis_cells())
    }

    /// Smallest raw label denoting a volume (largest material id pushed, plus one)
    pub fn first_volume_index(&self) -> Result<i32> {
        Ok(self.workspace("first_volume_index")?.first_volume_index())
    }

    pub fn ingest_stats(&self) -> Result<IngestStats> {
        Ok(self.workspace("ingest_stats")?.ingest)
    }

    pub fn grid_stats(&self) -> Result<GridStats> {
        Ok(self.workspace("grid_stats")?.grid.stats())
    }

    /// Cell containing a world point
    pub fn cell_index_for_coord(&self, point: DVec3) -> Result<IVec3> {
        self.workspace("cell_index_for_coord")?
            .domain
            .cell_of(point)
            .ok_or(Error::OutOfDomainCoordinate(point))
    }

    /// World coordinates of a cell center
    pub fn cell_center(&self, cell: IVec3) -> Result<DVec3> {
        let work = self.workspace("cell_center")?;
        work.check_cell(cell)?;
        Ok(work.domain.cell_center(cell))
    }

    /// Decoded label of a cell
    pub fn label_at(&self, cell: IVec3) -> Result<Label> {
        let work = self.workspace("label_at")?;
        let raw = work.grid.get(cell)?;
        Ok(Label::decode(raw, work.first_volume_index()))
    }

    /// Cell and raw label for each point; points outside the grid get [`OUT_OF_DOMAIN`]
    pub fn translate_points(&self, points: &[DVec3]) -> Result<Vec<PointLabel>> {
        let work = self.workspace("translate_points")?;
        points
            .iter()
            .map(|&point| {
                let cell = work.domain.cell_of(point);
                let label = match cell {
                    Some(cell) => work.grid.get(cell)?,
                    None => OUT_OF_DOMAIN,
                };
                Ok(PointLabel { point, cell, label })
            })
            .collect()
    }

    /// Copy a window into a caller buffer (C order, `k` fastest)
    ///
    /// The window may start at negative indices or extend past the grid;
    /// cells outside it are written as [`OUT_OF_DOMAIN`].
    pub fn copy_region(&self, dest: &mut [i16], shape: [usize; 3], origin: IVec3) -> Result<()> {
        self.workspace("copy_region")?
            .grid
            .copy_region(dest, shape, origin)
    }

    /// Copy a window mapping every label through `filter[label]`
    pub fn copy_region_filtered(
        &self,
        dest: &mut [i16],
        shape: [usize; 3],
        origin: IVec3,
        filter: &[i16],
    ) -> Result<()> {
        self.workspace("copy_region_filtered")?
            .grid
            .copy_region_filtered(dest, shape, origin, filter)
    }

    /// Copy a window into a new buffer
    pub fn extract(&self, origin: IVec3, shape: [usize; 3]) -> Result<RegionBuffer> {
        let work = self.workspace("extract")?;
        let mut buffer = RegionBuffer::new(origin, shape)?;
        work.grid.copy_region(buffer.data_mut(), shape, origin)?;
        Ok(buffer)
    }

    /// Number of cells still unset; zero after segmentation
    pub fn unset_cell_count(&self) -> Result<u64> {
        self.workspace("unset_cell_count")?
            .grid
            .count_value(UNSET)
    }

    // --- Segmented queries ---

    /// Results of segmentation
    pub fn segmentation(&self) -> Result<&Segmentation> {
        Ok(self.segmented("segmentation")?.1)
    }

    /// Number of volumes, the exterior included
    pub fn volume_count(&self) -> Result<usize> {
        Ok(self.segmented("volume_count")?.1.volume_count())
    }

    /// Number of volumes other than the exterior
    pub fn enclosed_volume_count(&self) -> Result<usize> {
        Ok(self.segmented("enclosed_volume_count")?.1.enclosed_count())
    }

    /// Cell bounds of a volume or material, min inclusive and max exclusive
    pub fn bounding_box_of(&self, label: i16) -> Result<CellBox> {
        self.segmented("bounding_box_of")?
            .1
            .bounds_of(label)
            .ok_or(Error::UnknownLabel(label))
    }

    pub fn volume(&self, id: i16) -> Result<VolumeInfo> {
        self.segmented("volume")?
            .1
            .volume(id)
            .copied()
            .ok_or(Error::UnknownLabel(id))
    }

    /// All volumes in id order
    pub fn volumes(&self) -> Result<&[VolumeInfo]> {
        Ok(&self.segmented("volumes")?.1.volumes)
    }

    /// Volumes sorted by decreasing measure
    pub fn volume_stats(&self) -> Result<Vec<VolumeInfo>> {
        Ok(self.segmented("volume_stats")?.1.by_measure())
    }

    pub fn largest_volume(&self) -> Result<Option<VolumeInfo>> {
        Ok(self.segmented("largest_volume")?.1.largest().copied())
    }

    /// The unbounded air around the model
    pub fn exterior_volume(&self) -> Result<Option<VolumeInfo>> {
        Ok(self.segmented("exterior_volume")?.1.exterior().copied())
    }

    /// Filter table keeping only `label`; other labels map to unset
    pub fn isolate_filter(&self, label: i16) -> Result<Vec<i16>> {
        let segmentation = self.segmented("isolate_filter")?.1;
        let table_len = segmentation.first_volume_index as usize + segmentation.volume_count();
        Ok(filter::isolate_filter(label, table_len))
    }

    /// Copy the bounding box of a label grown by `padding` cells
    pub fn extract_label(&self, label: i16, padding: i32) -> Result<RegionBuffer> {
        let (work, segmentation) = self.segmented("extract_label")?;
        let bounds = segmentation
            .bounds_of(label)
            .ok_or(Error::UnknownLabel(label))?
            .padded(padding.max(0));
        let mut buffer = RegionBuffer::covering(&bounds)?;
        let shape = buffer.shape();
        work.grid.copy_region(buffer.data_mut(), shape, bounds.min)?;
        Ok(buffer)
    }

    // --- Phase guards ---

    fn workspace(&self, operation: &'static str) -> Result<&Workspace> {
        match &self.state {
            State::Ingesting(work) | State::Segmented { work, .. } => Ok(work),
            _ => Err(Error::phase(operation, self.phase())),
        }
    }

    fn segmented(&self, operation: &'static str) -> Result<(&Workspace, &Segmentation)> {
        match &self.state {
            State::Segmented { work, segmentation } => Ok((work, segmentation)),
            _ => Err(Error::phase(operation, self.phase())),
        }
    }

    fn ingesting_mut(&mut self, operation: &'static str) -> Result<&mut Workspace> {
        let phase = self.phase();
        match &mut self.state {
            State::Ingesting(work) => Ok(work),
            _ => Err(Error::phase(operation, phase)),
        }
    }
}
