//! Volume records produced by segmentation

use crate::math::CellBox;
use serde::Serialize;
use std::collections::BTreeMap;

/// One connected component of formerly unset cells
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct VolumeInfo {
    pub id: i16,
    /// Cell bounds, min inclusive and max exclusive
    pub bounds: CellBox,
    pub cell_count: u64,
    /// Cell count times the cell volume, in cubic world units
    pub measure: f64,
}

/// Result of the segmentation pass
#[derive(Clone, Debug, Default, Serialize)]
pub struct Segmentation {
    pub first_volume_index: i32,
    /// Volumes in id order
    pub volumes: Vec<VolumeInfo>,
    /// Whether the first volume is the exterior, flooded from the grid boundary
    pub has_exterior: bool,
    /// Cell bounds of every material present in the grid
    pub material_bounds: BTreeMap<i16, CellBox>,
}

impl Segmentation {
    pub fn volume_count(&self) -> usize {
        self.volumes.len()
    }

    /// Look up a volume by id
    pub fn volume(&self, id: i16) -> Option<&VolumeInfo> {
        let index = i32::from(id) - self.first_volume_index;
        usize::try_from(index).ok().and_then(|i| self.volumes.get(i))
    }

    /// Bounds of any label present in the grid
    pub fn bounds_of(&self, raw: i16) -> Option<CellBox> {
        if i32::from(raw) >= self.first_volume_index {
            self.volume(raw).map(|v| v.bounds)
        } else {
            self.material_bounds.get(&raw).copied()
        }
    }

    /// The unbounded exterior, when any boundary cell was unset
    pub fn exterior(&self) -> Option<&VolumeInfo> {
        self.volumes.first().filter(|_| self.has_exterior)
    }

    /// Volumes other than the exterior
    pub fn enclosed_count(&self) -> usize {
        self.volumes.len() - usize::from(self.has_exterior)
    }

    /// Volume with the most cells; the lowest id wins ties
    pub fn largest(&self) -> Option<&VolumeInfo> {
        self.volumes
            .iter()
            .rev()
            .max_by_key(|v| v.cell_count)
    }

    /// Volumes sorted by decreasing measure, ids ascending on ties
    pub fn by_measure(&self) -> Vec<VolumeInfo> {
        let mut sorted = self.volumes.clone();
        sorted.sort_by(|a, b| b.cell_count.cmp(&a.cell_count).then(a.id.cmp(&b.id)));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IVec3;

    fn volume(id: i16, cells: u64) -> VolumeInfo {
        VolumeInfo {
            id,
            bounds: CellBox::from_cell(IVec3::splat(id as i32)),
            cell_count: cells,
            measure: cells as f64 * 0.125,
        }
    }

    fn sample() -> Segmentation {
        let mut material_bounds = BTreeMap::new();
        material_bounds.insert(4, CellBox::new(IVec3::ZERO, IVec3::ONE));
        Segmentation {
            first_volume_index: 10,
            volumes: vec![volume(10, 500), volume(11, 20), volume(12, 80), volume(13, 80)],
            has_exterior: true,
            material_bounds,
        }
    }

    #[test]
    fn test_volume_lookup() {
        let s = sample();
        assert_eq!(s.volume(12).map(|v| v.cell_count), Some(80));
        assert!(s.volume(9).is_none());
        assert!(s.volume(14).is_none());
        assert!(s.volume(-1).is_none());
    }

    #[test]
    fn test_bounds_of() {
        let s = sample();
        assert_eq!(s.bounds_of(11), Some(CellBox::from_cell(IVec3::splat(11))));
        assert_eq!(s.bounds_of(4), Some(CellBox::new(IVec3::ZERO, IVec3::ONE)));
        assert_eq!(s.bounds_of(5), None);
        assert_eq!(s.bounds_of(0), None);
    }

    #[test]
    fn test_exterior_and_enclosed() {
        let s = sample();
        assert_eq!(s.exterior().map(|v| v.id), Some(10));
        assert_eq!(s.enclosed_count(), 3);
        assert_eq!(Segmentation::default().enclosed_count(), 0);

        let sealed = Segmentation {
            has_exterior: false,
            ..sample()
        };
        assert!(sealed.exterior().is_none());
        assert_eq!(sealed.enclosed_count(), 4);
    }

    #[test]
    fn test_largest_and_ordering() {
        let s = sample();
        assert_eq!(s.largest().map(|v| v.id), Some(10));
        let ids: Vec<_> = s.by_measure().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![10, 12, 13, 11]);

        let tie = Segmentation {
            first_volume_index: 1,
            volumes: vec![volume(1, 5), volume(2, 5)],
            ..Default::default()
        };
        assert_eq!(tie.largest().map(|v| v.id), Some(1));
    }
}
