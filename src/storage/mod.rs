//! Chunked, paged storage for the label grid

pub mod budget;
pub mod cache;
pub mod chunk;
pub mod config;
pub mod disk_io;
pub mod grid;

pub use budget::MemoryBudget;
pub use chunk::{ChunkLayout, ChunkSlot, ChunkView};
pub use config::GridConfig;
pub use grid::{ChunkedGrid, GridStats};
