//! Cell labels
//!
//! Each cell stores one `i16`: `0` unset, `1..first_volume_index` boundary
//! materials, `first_volume_index..` volumes. [`OUT_OF_DOMAIN`] only appears
//! in extraction buffers.

use std::fmt;

/// Raw value of a cell no triangle or volume has claimed yet
pub const UNSET: i16 = 0;

/// Raw value written into extraction buffers for cells outside the grid
pub const OUT_OF_DOMAIN: i16 = -1;

/// Decoded cell label
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    Unset,
    Material(i16),
    Volume(i16),
}

impl Label {
    /// Interpret a raw cell value
    ///
    /// # Arguments
    /// * `raw` - Stored cell value
    /// * `first_volume_index` - Smallest raw value that denotes a volume
    pub fn decode(raw: i16, first_volume_index: i32) -> Self {
        if raw <= UNSET {
            Label::Unset
        } else if i32::from(raw) < first_volume_index {
            Label::Material(raw)
        } else {
            Label::Volume(raw)
        }
    }

    /// Stored `i16` value
    pub fn raw(self) -> i16 {
        match self {
            Label::Unset => UNSET,
            Label::Material(id) | Label::Volume(id) => id,
        }
    }

    pub fn is_material(self) -> bool {
        matches!(self, Label::Material(_))
    }

    pub fn is_volume(self) -> bool {
        matches!(self, Label::Volume(_))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Unset => write!(f, "unset"),
            Label::Material(id) => write!(f, "material {id}"),
            Label::Volume(id) => write!(f, "volume {id}"),
        }
    }
}

/// Map a raw label through a filter table, [`OUT_OF_DOMAIN`] when outside it
pub fn filter_label(filter: &[i16], raw: i16) -> i16 {
    usize::try_from(raw)
        .ok()
        .and_then(|index| filter.get(index).copied())
        .unwrap_or(OUT_OF_DOMAIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        assert_eq!(Label::decode(0, 101), Label::Unset);
        assert_eq!(Label::decode(66, 101), Label::Material(66));
        assert_eq!(Label::decode(100, 101), Label::Material(100));
        assert_eq!(Label::decode(101, 101), Label::Volume(101));
        assert_eq!(Label::decode(102, 101), Label::Volume(102));
    }

    #[test]
    fn test_raw_round_trip() {
        for raw in [0, 1, 50, 101, i16::MAX] {
            assert_eq!(Label::decode(raw, 101).raw(), raw);
        }
    }

    #[test]
    fn test_no_materials() {
        assert_eq!(Label::decode(1, 1), Label::Volume(1));
    }

    #[test]
    fn test_filter_label() {
        let filter = [0, 0, 7];
        assert_eq!(filter_label(&filter, 2), 7);
        assert_eq!(filter_label(&filter, 1), 0);
        assert_eq!(filter_label(&filter, 3), OUT_OF_DOMAIN);
        assert_eq!(filter_label(&filter, OUT_OF_DOMAIN), OUT_OF_DOMAIN);
        assert_eq!(filter_label(&[], 0), OUT_OF_DOMAIN);
    }

    #[test]
    fn test_display() {
        assert_eq!(Label::Material(3).to_string(), "material 3");
        assert_eq!(Label::Volume(7).to_string(), "volume 7");
        assert_eq!(Label::Unset.to_string(), "unset");
    }
}
