//! Voxel grid geometry and cell labels

pub mod domain;
pub mod label;

pub use domain::{Domain, MARGIN_CELLS};
pub use label::{filter_label, Label, OUT_OF_DOMAIN, UNSET};
