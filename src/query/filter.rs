//! Filter tables for extraction

use crate::voxel::label::UNSET;

/// Table of `table_len` entries mapping `label` to itself and everything else to unset
pub fn isolate_filter(label: i16, table_len: usize) -> Vec<i16> {
    let mut filter = vec![UNSET; table_len];
    if let Some(slot) = usize::try_from(label).ok().and_then(|i| filter.get_mut(i)) {
        *slot = label;
    }
    filter
}
