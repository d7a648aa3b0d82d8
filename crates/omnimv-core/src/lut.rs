//! Sampled monotonic 1D functions.
//!
//! A [`LookupTable`] samples a function at `N` uniformly spaced inputs over a
//! closed range. Forward lookup snaps to the nearest sample (no
//! interpolation); inverse lookup binary-searches the sorted outputs and
//! returns the input of the nearest output sample.

use crate::{Grid, Real};

/// Uniformly sampled, monotonically increasing function.
#[derive(Clone, Debug)]
pub struct LookupTable {
    lo: Real,
    hi: Real,
    inputs: Vec<Real>,
    outputs: Vec<Real>,
}

impl LookupTable {
    /// Sample `f` at `samples` points spread uniformly over `[lo, hi]`.
    ///
    /// The outputs must be non-decreasing for [`LookupTable::inverse_lookup`]
    /// to be meaningful; this is not checked.
    ///
    /// # Arguments
    /// * `lo`, `hi` - Closed input range
    /// * `samples` - Number of samples, including both ends
    /// * `f` - Function to tabulate
    ///
    /// # Panics
    /// Panics if `samples < 2` or `hi <= lo`.
    ///
    /// # Example
    /// ```
    /// use omnimv_core::LookupTable;
    ///
    /// let table = LookupTable::new(0.0, 2.0, 5, |x| x * x);
    /// assert_eq!(table.lookup(1.1), 1.0);
    /// assert_eq!(table.inverse_lookup(2.0), 1.5);
    /// ```
    pub fn new(lo: Real, hi: Real, samples: usize, f: impl Fn(Real) -> Real) -> Self {
        assert!(samples >= 2, "lookup table needs at least 2 samples, got {samples}");
        assert!(hi > lo, "lookup table range is empty: [{lo}, {hi}]");
        let step = (hi - lo) / (samples - 1) as Real;
        let inputs: Vec<Real> = (0..samples).map(|i| lo + i as Real * step).collect();
        let outputs = inputs.iter().map(|&x| f(x)).collect();
        Self {
            lo,
            hi,
            inputs,
            outputs,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Input range `(lo, hi)`.
    pub fn range(&self) -> (Real, Real) {
        (self.lo, self.hi)
    }

    /// Output of the sample nearest to `x`; `x` is clamped to the range.
    ///
    /// A NaN input yields NaN.
    pub fn lookup(&self, x: Real) -> Real {
        if x.is_nan() {
            return Real::NAN;
        }
        let fraction = ((x - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0);
        let index = (fraction * (self.len() - 1) as Real).round() as usize;
        self.outputs[index]
    }

    /// Input of the sample whose output is nearest to `y`.
    ///
    /// Values outside the sampled output range clamp to the boundary input.
    /// When `y` lies exactly halfway between two outputs the lower sample
    /// wins. A NaN input yields NaN.
    pub fn inverse_lookup(&self, y: Real) -> Real {
        if y.is_nan() {
            return Real::NAN;
        }
        let index = self.outputs.partition_point(|&v| v < y);
        if index == 0 {
            return self.inputs[0];
        }
        if index == self.len() {
            return self.inputs[self.len() - 1];
        }
        if self.outputs[index] == y {
            return self.inputs[index];
        }
        let below = y - self.outputs[index - 1];
        let above = self.outputs[index] - y;
        if above < below {
            self.inputs[index]
        } else {
            self.inputs[index - 1]
        }
    }

    /// Element-wise [`LookupTable::lookup`].
    pub fn lookup_grid(&self, x: &Grid) -> Grid {
        x.map(|v| self.lookup(v))
    }

    /// Element-wise [`LookupTable::inverse_lookup`].
    pub fn inverse_lookup_grid(&self, y: &Grid) -> Grid {
        y.map(|v| self.inverse_lookup(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_table() -> LookupTable {
        // inputs 0, 0.5, ..., 4; outputs x^2
        LookupTable::new(0.0, 4.0, 9, |x| x * x)
    }

    #[test]
    fn lookup_snaps_to_nearest_sample() {
        let t = square_table();
        assert_eq!(t.lookup(1.0), 1.0);
        assert_eq!(t.lookup(1.2), 1.0);
        assert_eq!(t.lookup(1.3), 2.25);
        assert_eq!(t.lookup(-5.0), 0.0);
        assert_eq!(t.lookup(10.0), 16.0);
    }

    #[test]
    fn inverse_lookup_returns_nearest_input() {
        let t = square_table();
        assert_eq!(t.inverse_lookup(4.0), 2.0);
        assert_eq!(t.inverse_lookup(4.5), 2.0);
        assert_eq!(t.inverse_lookup(6.0), 2.5);
        assert_eq!(t.inverse_lookup(-1.0), 0.0);
        assert_eq!(t.inverse_lookup(100.0), 4.0);
        // 2.25 and 4.0 bracket 3.125 at equal distance.
        assert_eq!(t.inverse_lookup(3.125), 1.5);
    }

    #[test]
    fn grid_forms_match_scalar_forms() {
        let t = square_table();
        let x = Grid::from_fn(3, 4, |r, c| (r * 4 + c) as Real * 0.37 - 0.5);
        let fwd = t.lookup_grid(&x);
        let inv = t.inverse_lookup_grid(&x);
        for i in 0..x.len() {
            assert_eq!(fwd[i], t.lookup(x[i]));
            assert_eq!(inv[i], t.inverse_lookup(x[i]));
        }
    }

    #[test]
    fn nan_is_passed_through() {
        let t = square_table();
        assert!(t.lookup(Real::NAN).is_nan());
        assert!(t.inverse_lookup(Real::NAN).is_nan());
    }

    #[test]
    #[should_panic(expected = "range is empty")]
    fn empty_range_is_rejected() {
        let _ = LookupTable::new(1.0, 1.0, 4, |x| x);
    }
}
