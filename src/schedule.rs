// Piecewise-linear gain schedules
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use alloc::vec::Vec;

use num_traits::Float;

use crate::pid::PidConfigError;

/// A gain scheduled against an operating variable, typically vehicle speed.
///
/// The table is an ordered sequence of `(breakpoint, value)` pairs with strictly increasing
/// breakpoints. Lookups clamp to the first/last value outside the breakpoint range and linearly
/// interpolate between neighbouring breakpoints inside it. A scalar gain is a one-point table and
/// evaluates to the same value at every speed.
#[derive(Debug, Clone, PartialEq)]
pub struct GainTable<F: Float> {
    points: Vec<(F, F)>,
}

impl<F: Float> GainTable<F> {
    /// Creates a table from `(breakpoint, value)` pairs.
    ///
    /// # Returns
    /// - `Err(PidConfigError::EmptyGainTable)` if `points` is empty.
    /// - `Err(PidConfigError::NonFiniteGain)` if any breakpoint or value is NaN or infinite.
    /// - `Err(PidConfigError::UnorderedBreakpoints)` if breakpoints are not strictly increasing.
    pub fn new(points: &[(F, F)]) -> Result<Self, PidConfigError> {
        if points.is_empty() {
            return Err(PidConfigError::EmptyGainTable);
        }
        if points.iter().any(|(b, v)| !b.is_finite() || !v.is_finite()) {
            return Err(PidConfigError::NonFiniteGain);
        }
        if points.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(PidConfigError::UnorderedBreakpoints);
        }
        Ok(Self {
            points: points.to_vec(),
        })
    }

    /// Creates a table from separate breakpoint and value lists of equal length.
    pub fn from_breakpoints(breakpoints: &[F], values: &[F]) -> Result<Self, PidConfigError> {
        if breakpoints.len() != values.len() {
            return Err(PidConfigError::MismatchedGainTable);
        }
        let points: Vec<(F, F)> = breakpoints
            .iter()
            .copied()
            .zip(values.iter().copied())
            .collect();
        Self::new(&points)
    }

    /// A gain that does not depend on speed.
    ///
    /// Non-finite gains are not rejected here; `PidConfigBuilder::build` validates every table.
    pub fn constant(gain: F) -> Self {
        Self {
            points: alloc::vec![(F::zero(), gain)],
        }
    }

    /// Returns the `(breakpoint, value)` pairs.
    pub fn points(&self) -> &[(F, F)] {
        &self.points
    }

    /// Returns true if the table evaluates to the same value at every speed.
    pub fn is_constant(&self) -> bool {
        self.points.len() == 1
    }

    pub(crate) fn validate(&self) -> Result<(), PidConfigError> {
        Self::new(&self.points).map(|_| ())
    }

    /// Evaluates the gain at `x`.
    pub fn evaluate(&self, x: F) -> F {
        let n = self.points.len();
        let (first, last) = (self.points[0], self.points[n - 1]);
        if x <= first.0 {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }
        if x.is_nan() {
            return x;
        }

        // first.0 < x < last.0, so the split lands strictly inside the table
        let upper = self.points.partition_point(|&(b, _)| b <= x);
        let (x0, y0) = self.points[upper - 1];
        let (x1, y1) = self.points[upper];
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

impl<F: Float> From<F> for GainTable<F> {
    fn from(gain: F) -> Self {
        Self::constant(gain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_table_ignores_speed() {
        let table = GainTable::<f64>::from(0.25);
        assert!(table.is_constant());
        for speed in [-10.0, 0.0, 3.0, 1e6] {
            assert_eq!(table.evaluate(speed), 0.25);
        }
    }

    #[test]
    fn test_clamps_outside_breakpoints() {
        let table = GainTable::new(&[(5.0, 0.2), (35.0, 0.1)]).unwrap();
        assert_eq!(table.evaluate(0.0), 0.2);
        assert_eq!(table.evaluate(5.0), 0.2);
        assert_eq!(table.evaluate(35.0), 0.1);
        assert_eq!(table.evaluate(100.0), 0.1);
    }

    #[test]
    fn test_interpolates_between_neighbours() {
        let table =
            GainTable::from_breakpoints(&[0.0, 10.0, 20.0, 40.0], &[1.0, 3.0, 3.0, -1.0]).unwrap();
        assert_relative_eq!(table.evaluate(5.0), 2.0);
        assert_relative_eq!(table.evaluate(10.0), 3.0);
        assert_relative_eq!(table.evaluate(15.0), 3.0);
        assert_relative_eq!(table.evaluate(30.0), 1.0);
        assert_relative_eq!(table.evaluate(39.0), -0.8);
    }

    #[test]
    fn test_nan_lookup_propagates() {
        let table = GainTable::new(&[(0.0, 1.0), (1.0, 2.0)]).unwrap();
        assert!(table.evaluate(f64::NAN).is_nan());
    }

    #[test]
    fn test_rejects_malformed_tables() {
        assert_eq!(
            GainTable::<f64>::new(&[]),
            Err(PidConfigError::EmptyGainTable)
        );
        assert_eq!(
            GainTable::new(&[(0.0, 1.0), (0.0, 2.0)]),
            Err(PidConfigError::UnorderedBreakpoints)
        );
        assert_eq!(
            GainTable::new(&[(1.0, 1.0), (0.0, 2.0)]),
            Err(PidConfigError::UnorderedBreakpoints)
        );
        assert_eq!(
            GainTable::new(&[(0.0, f64::NAN)]),
            Err(PidConfigError::NonFiniteGain)
        );
        assert_eq!(
            GainTable::from_breakpoints(&[0.0, 1.0], &[1.0]),
            Err(PidConfigError::MismatchedGainTable)
        );
    }
}
