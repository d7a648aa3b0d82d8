//! Per-picture-pair epipoles for the geodesic camera-pose model.

use std::collections::BTreeMap;

use log::debug;
use nalgebra::Vector3;
use omnimv_core::{fixed_to_floating, floating_to_fixed, Vec3};
use thiserror::Error;

/// Fractional bits of the stored epipole components.
pub const EPIPOLE_PRECISION_FIXED: u32 = 14;

/// Key component meaning "any picture".
pub const ANY_POC: i32 = -1;

const GLOBAL_KEY: (i32, i32) = (ANY_POC, ANY_POC);

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EpipoleError {
    #[error("no available epipole for current POC {cur_poc}, reference POC {ref_poc}")]
    NotFound { cur_poc: i32, ref_poc: i32 },
    #[error("epipole predictor for POC {cur_poc} requires the global epipole to be available")]
    GlobalUnavailable { cur_poc: i32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct EpipoleEntry {
    epipole: Vector3<i32>,
    is_available: bool,
}

/// Epipoles keyed by `(current POC, reference POC)`.
///
/// Either key component may be [`ANY_POC`]. The global entry
/// `(ANY_POC, ANY_POC)` always exists and starts as an unavailable zero
/// vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpipoleList {
    entries: BTreeMap<(i32, i32), EpipoleEntry>,
}

impl Default for EpipoleList {
    fn default() -> Self {
        Self::new()
    }
}

impl EpipoleList {
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            GLOBAL_KEY,
            EpipoleEntry {
                epipole: Vector3::zeros(),
                is_available: false,
            },
        );
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store or overwrite the epipole for `(cur_poc, ref_poc)`.
    ///
    /// The vector is stored in fixed point with
    /// [`EPIPOLE_PRECISION_FIXED`] fractional bits.
    pub fn add_epipole(&mut self, epipole: &Vec3, cur_poc: i32, ref_poc: i32, make_available: bool) {
        let fixed = epipole.map(|c| floating_to_fixed(c, EPIPOLE_PRECISION_FIXED));
        debug!(
            "epipole ({cur_poc}, {ref_poc}) = [{}, {}, {}] available={make_available}",
            fixed.x, fixed.y, fixed.z
        );
        self.entries.insert(
            (cur_poc, ref_poc),
            EpipoleEntry {
                epipole: fixed,
                is_available: make_available,
            },
        );
    }

    /// Mark every entry whose current POC is `cur_poc` as available.
    pub fn make_available(&mut self, cur_poc: i32) {
        let mut count = 0usize;
        for (_, entry) in self
            .entries
            .iter_mut()
            .filter(|((cur, _), _)| *cur == cur_poc)
        {
            entry.is_available = true;
            count += 1;
        }
        debug!("made {count} epipole(s) available for POC {cur_poc}");
    }

    fn available(&self, key: (i32, i32)) -> Option<&EpipoleEntry> {
        self.entries.get(&key).filter(|e| e.is_available)
    }

    /// Epipole for a picture pair, falling back to the current picture's
    /// entry and then to the global entry.
    ///
    /// Only available entries qualify at each tier.
    pub fn find_epipole(&self, cur_poc: i32, ref_poc: i32) -> Result<Vec3, EpipoleError> {
        self.available((cur_poc, ref_poc))
            .or_else(|| self.available((cur_poc, ANY_POC)))
            .or_else(|| self.available(GLOBAL_KEY))
            .map(|e| to_floating(&e.epipole))
            .ok_or(EpipoleError::NotFound { cur_poc, ref_poc })
    }

    /// Predict the epipole of `cur_poc` from the entries of the nearest
    /// pictures.
    ///
    /// Every available entry takes part, the global one included (its
    /// current POC is [`ANY_POC`]). The nearest by `|cur_poc - entry POC|`
    /// wins; when the two nearest are equally distant their average is
    /// used. Entries are scanned in key order and the first of equally
    /// distant entries is kept as the closest.
    pub fn derive_predictor(&self, cur_poc: i32) -> Result<Vec3, EpipoleError> {
        if self.available(GLOBAL_KEY).is_none() {
            return Err(EpipoleError::GlobalUnavailable { cur_poc });
        }

        let mut closest: Option<(i64, &EpipoleEntry)> = None;
        let mut second: Option<(i64, &EpipoleEntry)> = None;
        for (&(poc, _), entry) in &self.entries {
            if !entry.is_available {
                continue;
            }
            let distance = (i64::from(cur_poc) - i64::from(poc)).abs();
            match closest {
                Some((best, _)) if distance >= best => {
                    if second.map_or(true, |(d, _)| distance < d) {
                        second = Some((distance, entry));
                    }
                }
                _ => {
                    second = closest;
                    closest = Some((distance, entry));
                }
            }
        }

        let (best, nearest) = closest.ok_or(EpipoleError::GlobalUnavailable { cur_poc })?;
        Ok(match second {
            Some((distance, other)) if distance == best => {
                (to_floating(&nearest.epipole) + to_floating(&other.epipole)) / 2.0
            }
            _ => to_floating(&nearest.epipole),
        })
    }
}

fn to_floating(fixed: &Vector3<i32>) -> Vec3 {
    fixed.map(|c| fixed_to_floating(c, EPIPOLE_PRECISION_FIXED))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> EpipoleList {
        let mut list = EpipoleList::new();
        list.add_epipole(&Vec3::new(1.0, 0.0, 0.0), ANY_POC, ANY_POC, true);
        list.add_epipole(&Vec3::new(0.0, 1.0, 0.0), 5, ANY_POC, true);
        list.add_epipole(&Vec3::new(0.0, 0.0, 1.0), 5, 3, true);
        list
    }

    #[test]
    fn new_list_has_an_unavailable_global_entry() {
        let list = EpipoleList::new();
        assert_eq!(list.len(), 1);
        assert_eq!(
            list.find_epipole(0, 0),
            Err(EpipoleError::NotFound {
                cur_poc: 0,
                ref_poc: 0
            })
        );
        assert_eq!(
            list.derive_predictor(4),
            Err(EpipoleError::GlobalUnavailable { cur_poc: 4 })
        );
    }

    #[test]
    fn find_falls_back_from_pair_to_picture_to_global() {
        let list = list();
        assert_eq!(list.find_epipole(5, 3).unwrap(), Vec3::z());
        assert_eq!(list.find_epipole(5, 9).unwrap(), Vec3::y());
        assert_eq!(list.find_epipole(9, 9).unwrap(), Vec3::x());
    }

    #[test]
    fn unavailable_entries_are_skipped() {
        let mut list = list();
        list.add_epipole(&Vec3::new(0.5, 0.5, 0.0), 7, 2, false);
        assert_eq!(list.find_epipole(7, 2).unwrap(), Vec3::x());
        list.make_available(7);
        assert_eq!(list.find_epipole(7, 2).unwrap(), Vec3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn make_available_covers_every_reference_of_the_picture() {
        let mut list = EpipoleList::new();
        list.add_epipole(&Vec3::x(), 4, 0, false);
        list.add_epipole(&Vec3::y(), 4, 8, false);
        list.add_epipole(&Vec3::z(), 6, 4, false);
        list.make_available(4);
        assert_eq!(list.find_epipole(4, 0).unwrap(), Vec3::x());
        assert_eq!(list.find_epipole(4, 8).unwrap(), Vec3::y());
        assert!(list.find_epipole(6, 4).is_err());
    }

    #[test]
    fn values_are_stored_in_fixed_point() {
        let mut list = EpipoleList::new();
        list.add_epipole(&Vec3::new(0.1, -0.2, 0.3), ANY_POC, ANY_POC, true);
        let e = list.find_epipole(0, 0).unwrap();
        let step = 1.0 / f64::from(1 << EPIPOLE_PRECISION_FIXED);
        assert!((e - Vec3::new(0.1, -0.2, 0.3)).amax() <= step / 2.0);
        assert_eq!((e.x / step).fract(), 0.0);
    }

    #[test]
    fn predictor_takes_the_nearest_picture() {
        let mut list = EpipoleList::new();
        list.add_epipole(&Vec3::x(), ANY_POC, ANY_POC, true);
        list.add_epipole(&Vec3::y(), 2, ANY_POC, true);
        list.add_epipole(&Vec3::z(), 9, ANY_POC, true);
        assert_eq!(list.derive_predictor(3).unwrap(), Vec3::y());
        assert_eq!(list.derive_predictor(8).unwrap(), Vec3::z());
    }

    #[test]
    fn predictor_averages_equally_distant_pictures() {
        let mut list = EpipoleList::new();
        list.add_epipole(&Vec3::x(), ANY_POC, ANY_POC, true);
        list.add_epipole(&Vec3::new(0.0, 1.0, 0.0), 4, ANY_POC, true);
        list.add_epipole(&Vec3::new(0.0, 0.0, 1.0), 8, ANY_POC, true);
        assert_eq!(list.derive_predictor(6).unwrap(), Vec3::new(0.0, 0.5, 0.5));
    }

    #[test]
    fn predictor_counts_the_global_entry_as_a_picture() {
        let mut list = EpipoleList::new();
        list.add_epipole(&Vec3::x(), ANY_POC, ANY_POC, true);
        list.add_epipole(&Vec3::y(), 2, ANY_POC, true);
        // Global at distance 1, picture 2 at distance 2.
        assert_eq!(list.derive_predictor(0).unwrap(), Vec3::x());
        // Equally distant from the global entry and picture 1.
        list.add_epipole(&Vec3::y(), 1, ANY_POC, true);
        assert_eq!(list.derive_predictor(0).unwrap(), Vec3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn predictor_falls_back_to_global() {
        let mut list = EpipoleList::new();
        list.add_epipole(&Vec3::x(), ANY_POC, ANY_POC, true);
        list.add_epipole(&Vec3::y(), 2, ANY_POC, false);
        assert_eq!(list.derive_predictor(3).unwrap(), Vec3::x());
    }
}
