//! Mathematical utilities and data structures

pub mod aabb;
pub mod cell_box;

pub use aabb::Aabb;
pub use cell_box::CellBox;
