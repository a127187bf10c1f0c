//! Triangle rasterization

pub mod overlap;
pub mod rasterizer;
pub mod shapes;

pub use overlap::tri_box_overlap;
pub use rasterizer::{Coverage, IngestStats, Triangle};
