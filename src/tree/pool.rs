use std::collections::HashSet;

use super::arena::{ImageId, Orientation};
use crate::error::{CollageError, Result};

/// Relative slack under which the stacked pair must beat the side-by-side
/// pair before it is preferred. Keeps exact ties on `Vertical`.
const TIE_EPSILON: f64 = 1e-12;

/// One image's aspect ratio, waiting in the pool to be bound to a leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatioUnit {
    pub id: ImageId,
    /// width / height
    pub ratio: f64,
    /// height / width
    pub reciprocal: f64,
}

impl AspectRatioUnit {
    /// Validated unit. Rejects zero, negative, NaN and infinite ratios.
    pub fn new(id: ImageId, ratio: f64) -> Result<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(CollageError::InvalidRatio { id, ratio });
        }
        let reciprocal = 1.0 / ratio;
        if !reciprocal.is_finite() {
            return Err(CollageError::InvalidRatio { id, ratio });
        }
        Ok(Self {
            id,
            ratio,
            reciprocal,
        })
    }

    pub fn from_dimensions(id: ImageId, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CollageError::InvalidRatio {
                id,
                ratio: width as f64 / height as f64,
            });
        }
        Ok(Self {
            id,
            ratio: width as f64 / height as f64,
            reciprocal: height as f64 / width as f64,
        })
    }
}

/// Outcome of a pair search: the two units and how they should be joined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairMatch {
    pub orientation: Orientation,
    pub first: AspectRatioUnit,
    pub second: AspectRatioUnit,
    /// Combined ratio of the pair under `orientation`.
    pub ratio: f64,
}

/// Symmetric multiplicative distance between two ratios. 1.0 means equal.
pub fn ratio_distance(actual: f64, target: f64) -> f64 {
    (actual / target).max(target / actual)
}

/// Working set of aspect ratios, sorted ascending by `ratio`.
///
/// Units leave the pool permanently when matched. One pool is threaded
/// through an entire tree build so every image lands on exactly one leaf.
#[derive(Debug, Clone)]
pub struct AspectRatioPool {
    units: Vec<AspectRatioUnit>,
}

impl AspectRatioPool {
    /// Build a pool, validating every unit. An empty input is rejected, as
    /// is an id that appears more than once. Reciprocals are recomputed from
    /// the ratios, so the two never disagree inside the pool.
    pub fn from_units(units: Vec<AspectRatioUnit>) -> Result<Self> {
        if units.is_empty() {
            return Err(CollageError::NoImages);
        }
        let mut seen = HashSet::with_capacity(units.len());
        let mut units = units
            .into_iter()
            .map(|unit| {
                if !seen.insert(unit.id) {
                    return Err(CollageError::DuplicateImage(unit.id));
                }
                AspectRatioUnit::new(unit.id, unit.ratio)
            })
            .collect::<Result<Vec<_>>>()?;
        // Stable: equal ratios keep their input order.
        units.sort_by(|a, b| a.ratio.total_cmp(&b.ratio));
        Ok(Self { units })
    }

    /// Convenience constructor assigning ids 0..n in input order.
    pub fn from_ratios(ratios: &[f64]) -> Result<Self> {
        let units = ratios
            .iter()
            .enumerate()
            .map(|(i, &ratio)| AspectRatioUnit::new(ImageId(i as u32), ratio))
            .collect::<Result<Vec<_>>>()?;
        Self::from_units(units)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Remaining units, ascending by ratio.
    pub fn units(&self) -> &[AspectRatioUnit] {
        &self.units
    }

    /// Remove and return the unit whose ratio is numerically closest to
    /// `target`. Equidistant neighbours resolve to the narrower one.
    pub fn take_best_single(&mut self, target: f64) -> Option<AspectRatioUnit> {
        if self.units.is_empty() {
            return None;
        }
        let upper = self.units.partition_point(|u| u.ratio < target);
        let best = if upper == self.units.len() {
            upper - 1
        } else if upper == 0 || self.units[upper].ratio == target {
            upper
        } else {
            let below = upper - 1;
            if target - self.units[below].ratio <= self.units[upper].ratio - target {
                below
            } else {
                upper
            }
        };
        Some(self.units.remove(best))
    }

    /// Remove and return the pair whose combination best approximates
    /// `target`, either side by side (`Vertical`) or stacked (`Horizontal`).
    pub fn take_best_pair(&mut self, target: f64) -> Option<PairMatch> {
        if self.units.len() < 2 {
            return None;
        }

        let (vi, vj) = self.closest_sum_pair(target);
        let (hi, hj) = self.closest_reciprocal_pair(target);

        let side_by_side =
            Orientation::Vertical.combine(self.units[vi].ratio, self.units[vj].ratio);
        let stacked =
            Orientation::Horizontal.combine(self.units[hi].ratio, self.units[hj].ratio);

        let v_dist = ratio_distance(side_by_side, target);
        let h_dist = ratio_distance(stacked, target);

        let (orientation, i, j, ratio) = if h_dist < v_dist * (1.0 - TIE_EPSILON) {
            (Orientation::Horizontal, hi, hj, stacked)
        } else {
            (Orientation::Vertical, vi, vj, side_by_side)
        };

        // j > i always; drop the higher index first so i stays valid.
        let second = self.units.remove(j);
        let first = self.units.remove(i);
        Some(PairMatch {
            orientation,
            first,
            second,
            ratio,
        })
    }

    /// Two-pointer walk for the pair whose ratio sum is closest to `target`.
    fn closest_sum_pair(&self, target: f64) -> (usize, usize) {
        let (mut i, mut j) = (0, self.units.len() - 1);
        let mut best = (i, j);
        let mut best_diff = f64::INFINITY;

        while i < j {
            let sum = self.units[i].ratio + self.units[j].ratio;
            let diff = (sum - target).abs();
            if diff < best_diff {
                best_diff = diff;
                best = (i, j);
            }
            if sum == target {
                break;
            }
            if sum > target {
                j -= 1;
            } else {
                i += 1;
            }
        }
        best
    }

    /// Same walk over reciprocals against `1 / target`. Reciprocals descend
    /// as the index grows, so the pointer moves are mirrored.
    fn closest_reciprocal_pair(&self, target: f64) -> (usize, usize) {
        let goal = 1.0 / target;
        let (mut i, mut j) = (0, self.units.len() - 1);
        let mut best = (i, j);
        let mut best_diff = f64::INFINITY;

        while i < j {
            let sum = self.units[i].reciprocal + self.units[j].reciprocal;
            let diff = (sum - goal).abs();
            if diff < best_diff {
                best_diff = diff;
                best = (i, j);
            }
            if sum == goal {
                break;
            }
            if sum > goal {
                i += 1;
            } else {
                j -= 1;
            }
        }
        best
    }
}
