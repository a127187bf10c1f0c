//! Extraction buffers and filter tables

pub mod filter;
pub mod region;

pub use filter::isolate_filter;
pub use region::RegionBuffer;
