// Tick rate of the control loop and the constants derived from it
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

use core::time::Duration;

use num_traits::Float;

use crate::pid::PidConfigError;

/// Fraction of the integral that override mode unwinds per second.
const UNWIND_PER_SECOND: f64 = 0.3;

/// The fixed rate, in ticks per second, at which the controller is stepped.
///
/// The controller never measures time. Every quantity that would normally depend on elapsed time,
/// i.e. the integration step, the override unwind step and the length of the derivative window,
/// is derived once from this rate.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TickRate<F: Float> {
    hz: F,
    dt: F,
    unwind_step: F,
}

impl<F: Float> TickRate<F> {
    /// Creates a tick rate from a frequency in Hz.
    ///
    /// # Returns
    /// - `Err(PidConfigError::InvalidTickRate)` if `hz` is not finite or not strictly positive.
    /// - `Err(PidConfigError::UnrepresentableConstant)` if the unwind fraction does not fit in `F`.
    pub fn new(hz: F) -> Result<Self, PidConfigError> {
        if !hz.is_finite() || hz <= F::zero() {
            return Err(PidConfigError::InvalidTickRate);
        }
        let unwind =
            F::from(UNWIND_PER_SECOND).ok_or(PidConfigError::UnrepresentableConstant)?;
        Ok(Self {
            hz,
            dt: F::one() / hz,
            unwind_step: unwind / hz,
        })
    }

    /// Returns the rate in ticks per second.
    pub fn hz(&self) -> F {
        self.hz
    }

    /// Returns the duration of one tick in seconds.
    pub fn dt(&self) -> F {
        self.dt
    }

    /// Returns how far the integral moves toward zero on each overridden tick.
    pub fn unwind_step(&self) -> F {
        self.unwind_step
    }

    /// Converts a duration into a whole number of ticks, rounding to the nearest tick.
    ///
    /// Exact halves round to the even tick count, so 25 ms at 100 Hz is 2 ticks.
    /// Returns `None` if the tick count cannot be represented as a `usize`.
    pub fn samples_in(&self, duration: Duration) -> Option<usize> {
        let secs = F::from(duration.as_secs_f64())?;
        round_half_even(secs * self.hz).to_usize()
    }
}

fn round_half_even<F: Float>(x: F) -> F {
    let two = F::one() + F::one();
    let rounded = x.round();
    // `round` takes halves away from zero; step back when that lands on an odd value.
    if (rounded - x).abs() == F::one() / two && (rounded / two).fract() != F::zero() {
        rounded - x.signum()
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_constants() {
        let rate = TickRate::new(100.0).unwrap();
        assert_eq!(rate.hz(), 100.0);
        assert_eq!(rate.dt(), 0.01);
        assert_eq!(rate.unwind_step(), 0.3 / 100.0);
    }

    #[test]
    fn test_rejects_invalid_rates() {
        for hz in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(TickRate::new(hz), Err(PidConfigError::InvalidTickRate));
        }
    }

    #[test]
    fn test_samples_in_rounds_to_nearest_tick() {
        let rate = TickRate::new(100.0f64).unwrap();
        assert_eq!(rate.samples_in(Duration::from_secs(1)), Some(100));
        assert_eq!(rate.samples_in(Duration::from_millis(54)), Some(5));
        assert_eq!(rate.samples_in(Duration::from_millis(56)), Some(6));
        assert_eq!(rate.samples_in(Duration::ZERO), Some(0));

        let slow = TickRate::new(20.0f32).unwrap();
        assert_eq!(slow.samples_in(Duration::from_millis(250)), Some(5));
    }

    #[test]
    fn test_samples_in_rounds_halves_to_even() {
        let rate = TickRate::new(100.0f64).unwrap();
        assert_eq!(rate.samples_in(Duration::from_millis(25)), Some(2));

        let hertz = TickRate::new(1.0f64).unwrap();
        assert_eq!(hertz.samples_in(Duration::from_millis(500)), Some(0));
        assert_eq!(hertz.samples_in(Duration::from_millis(1500)), Some(2));
        assert_eq!(hertz.samples_in(Duration::from_millis(2500)), Some(2));
        assert_eq!(hertz.samples_in(Duration::from_millis(3500)), Some(4));

        let slow = TickRate::new(2.0f32).unwrap();
        assert_eq!(slow.samples_in(Duration::from_millis(1250)), Some(2));
    }
}
