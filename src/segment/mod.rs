//! Segmentation of empty space into enclosed volumes

pub mod segmenter;
pub mod volume;

pub use segmenter::Segmenter;
pub use volume::{Segmentation, VolumeInfo};
