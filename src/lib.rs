//! FastVoxel - voxelization of closed polygonal models and enclosed volume segmentation
//!
//! Triangles are rasterized conservatively into a chunked label grid, then a
//! 6-connected flood fill labels every connected region of empty cells.
//!
//! ```
//! use fastvoxel::{DVec3, GridConfig, Voxelizer};
//! use fastvoxel::raster::shapes;
//!
//! let mut vox = Voxelizer::new(GridConfig::default())?;
//! vox.configure(DVec3::ZERO, DVec3::splat(4.0), 0.5)?;
//! vox.push_triangles(&shapes::cuboid(DVec3::ZERO, DVec3::splat(4.0), 1))?;
//! vox.segment()?;
//! assert_eq!(vox.enclosed_volume_count()?, 1);
//! # Ok::<(), fastvoxel::Error>(())
//! ```

pub mod core;
pub mod engine;
pub mod math;
pub mod query;
pub mod raster;
pub mod segment;
pub mod storage;
pub mod voxel;

pub use crate::core::{DVec3, Error, IVec3, Result};
pub use engine::{Phase, PointLabel, Voxelizer};
pub use math::CellBox;
pub use query::RegionBuffer;
pub use raster::Triangle;
pub use segment::VolumeInfo;
pub use storage::GridConfig;
pub use voxel::Label;
