// Gain-scheduled PID controller for fixed-rate loops

use core::time::Duration;

use num_traits::Float;

use crate::schedule::GainTable;
use crate::tick::TickRate;
use crate::window::ErrorWindow;

const DEFAULT_RATE_HZ: f64 = 100.0;
const DEFAULT_DERIVATIVE_PERIOD: Duration = Duration::from_secs(1);

/// Reasons a `PidConfig` (or one of its parts) can be rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum PidConfigError {
    /// A gain table must hold at least one breakpoint.
    #[cfg_attr(feature = "std", error("Gain table must contain at least one breakpoint"))]
    EmptyGainTable,

    /// Gain table breakpoints must be strictly increasing.
    #[cfg_attr(feature = "std", error("Gain table breakpoints must be strictly increasing"))]
    UnorderedBreakpoints,

    /// Breakpoint and value lists have different lengths.
    #[cfg_attr(
        feature = "std",
        error("Gain table needs exactly one value per breakpoint")
    )]
    MismatchedGainTable,

    /// A gain, breakpoint or feedforward gain is NaN or infinite.
    #[cfg_attr(feature = "std", error("Gains and breakpoints must be finite"))]
    NonFiniteGain,

    /// The output limits were never set.
    #[cfg_attr(feature = "std", error("Output limits are required"))]
    MissingOutputLimits,

    /// The negative limit exceeds the positive limit, or either is NaN.
    #[cfg_attr(
        feature = "std",
        error("Negative output limit must not exceed the positive output limit")
    )]
    InvalidOutputLimits,

    /// The tick rate is not finite or not strictly positive.
    #[cfg_attr(feature = "std", error("Tick rate must be finite and positive"))]
    InvalidTickRate,

    /// The derivative period spans less than one tick.
    #[cfg_attr(
        feature = "std",
        error("Derivative period must span at least one tick")
    )]
    InvalidDerivativePeriod,

    /// A built-in constant cannot be represented in the chosen float type.
    #[cfg_attr(
        feature = "std",
        error("Constant is not representable in the controller's float type")
    )]
    UnrepresentableConstant,
}

/// Errors raised by queries on a running controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum PidError {
    /// The integral gain is exactly zero at the queried speed, so the integral cannot be expressed
    /// as an equivalent error.
    #[cfg_attr(feature = "std", error("Integral gain is zero at the queried speed"))]
    ZeroIntegralGain,
}

/// Immutable configuration of a `PidController`.
///
/// Build one with `PidConfigBuilder`. The p/i/d gains are scheduled against speed; the
/// feedforward gain is a plain scalar.
#[derive(Clone, Debug, PartialEq)]
pub struct PidConfig<F: Float> {
    kp: GainTable<F>,
    ki: GainTable<F>,
    kd: GainTable<F>,
    kf: F,
    output_min: F,
    output_max: F,
    rate: TickRate<F>,
    derivative_period: Duration,
    derivative_samples: usize,

    // derivative_samples, cast once at build time
    derivative_divisor: F,
}

impl<F: Float> PidConfig<F> {
    /// Returns the proportional gain at `speed`.
    pub fn kp(&self, speed: F) -> F {
        self.kp.evaluate(speed)
    }

    /// Returns the integral gain at `speed`.
    pub fn ki(&self, speed: F) -> F {
        self.ki.evaluate(speed)
    }

    /// Returns the derivative gain at `speed`.
    pub fn kd(&self, speed: F) -> F {
        self.kd.evaluate(speed)
    }

    /// Convenience method that returns the proportional, integral, and derivative gains at `speed`
    /// together as a tuple.
    pub fn gains(&self, speed: F) -> (F, F, F) {
        (self.kp(speed), self.ki(speed), self.kd(speed))
    }

    /// Returns the feedforward gain. It is not speed-scheduled.
    pub fn kf(&self) -> F {
        self.kf
    }

    /// The proportional gain schedule.
    pub fn kp_table(&self) -> &GainTable<F> {
        &self.kp
    }

    /// The integral gain schedule.
    pub fn ki_table(&self) -> &GainTable<F> {
        &self.ki
    }

    /// The derivative gain schedule.
    pub fn kd_table(&self) -> &GainTable<F> {
        &self.kd
    }

    /// Returns the minimum (negative) output limit.
    pub fn output_min(&self) -> F {
        self.output_min
    }

    /// Returns the maximum (positive) output limit.
    pub fn output_max(&self) -> F {
        self.output_max
    }

    /// Returns `(output_min, output_max)`.
    pub fn output_limits(&self) -> (F, F) {
        (self.output_min, self.output_max)
    }

    /// Returns the tick rate the controller is stepped at.
    pub fn rate(&self) -> TickRate<F> {
        self.rate
    }

    /// Returns the derivative window as configured, in seconds.
    pub fn derivative_period(&self) -> Duration {
        self.derivative_period
    }

    /// Returns the derivative window in ticks, `round(derivative_period * rate)`.
    pub fn derivative_samples(&self) -> usize {
        self.derivative_samples
    }
}

/// Builder for `PidConfig`.
///
/// Gains default to zero, the tick rate to 100 Hz and the derivative period to one second. The
/// output limits have no default and must be set.
///
/// ```rust
/// use scheduled_pid::pid::PidConfigBuilder;
/// use scheduled_pid::schedule::GainTable;
///
/// let steer_kp = GainTable::new(&[(0.0, 0.5), (40.0, 0.25)]).expect("Invalid gain table");
/// let config = PidConfigBuilder::<f64>::default()
///     .kp(steer_kp)
///     .ki(0.05)
///     .output_limits(-1.0, 1.0)
///     .build()
///     .expect("Invalid PID config");
/// assert_eq!(config.kp(20.0), 0.375);
/// assert_eq!(config.derivative_samples(), 100);
/// ```
#[derive(Clone, Debug)]
pub struct PidConfigBuilder<F: Float> {
    kp: GainTable<F>,
    ki: GainTable<F>,
    kd: GainTable<F>,
    kf: F,
    output_limits: Option<(F, F)>,
    rate: Option<F>,
    derivative_period: Duration,
}

impl<F: Float> Default for PidConfigBuilder<F> {
    fn default() -> Self {
        Self {
            kp: GainTable::constant(F::zero()),
            ki: GainTable::constant(F::zero()),
            kd: GainTable::constant(F::zero()),
            kf: F::zero(),
            output_limits: None,
            rate: None,
            derivative_period: DEFAULT_DERIVATIVE_PERIOD,
        }
    }
}

impl<F: Float> PidConfigBuilder<F> {
    /// Sets the proportional gain, either a scalar or a `GainTable`.
    pub fn kp(mut self, kp: impl Into<GainTable<F>>) -> Self {
        self.kp = kp.into();
        self
    }

    /// Sets the integral gain, either a scalar or a `GainTable`.
    pub fn ki(mut self, ki: impl Into<GainTable<F>>) -> Self {
        self.ki = ki.into();
        self
    }

    /// Sets the derivative gain, either a scalar or a `GainTable`.
    pub fn kd(mut self, kd: impl Into<GainTable<F>>) -> Self {
        self.kd = kd.into();
        self
    }

    /// Sets the feedforward gain.
    pub fn kf(mut self, kf: F) -> Self {
        self.kf = kf;
        self
    }

    /// Sets the negative and positive output limits.
    pub fn output_limits(mut self, neg_limit: F, pos_limit: F) -> Self {
        self.output_limits = Some((neg_limit, pos_limit));
        self
    }

    /// Sets the tick rate in ticks per second.
    pub fn rate(mut self, hz: F) -> Self {
        self.rate = Some(hz);
        self
    }

    /// Sets the span of the derivative window. It is rounded to a whole number of ticks.
    pub fn derivative_period(mut self, period: Duration) -> Self {
        self.derivative_period = period;
        self
    }

    /// Validates the configuration.
    ///
    /// # Returns
    /// - `Err(PidConfigError::NonFiniteGain)` and friends if a gain table is malformed.
    /// - `Err(PidConfigError::MissingOutputLimits)` if `output_limits` was never called.
    /// - `Err(PidConfigError::InvalidOutputLimits)` if the negative limit exceeds the positive
    ///   one or either is NaN. Infinite limits are allowed and disable clamping on that side.
    /// - `Err(PidConfigError::InvalidTickRate)` if the rate is not finite and positive.
    /// - `Err(PidConfigError::InvalidDerivativePeriod)` if the derivative window rounds to zero
    ///   ticks.
    pub fn build(self) -> Result<PidConfig<F>, PidConfigError> {
        self.kp.validate()?;
        self.ki.validate()?;
        self.kd.validate()?;
        if !self.kf.is_finite() {
            return Err(PidConfigError::NonFiniteGain);
        }

        let (output_min, output_max) = self
            .output_limits
            .ok_or(PidConfigError::MissingOutputLimits)?;
        if output_min.is_nan() || output_max.is_nan() || output_min > output_max {
            return Err(PidConfigError::InvalidOutputLimits);
        }

        let hz = match self.rate {
            Some(hz) => hz,
            None => F::from(DEFAULT_RATE_HZ).ok_or(PidConfigError::UnrepresentableConstant)?,
        };
        let rate = TickRate::new(hz)?;

        let derivative_samples = rate
            .samples_in(self.derivative_period)
            .filter(|&n| n > 0)
            .ok_or(PidConfigError::InvalidDerivativePeriod)?;
        let derivative_divisor =
            F::from(derivative_samples).ok_or(PidConfigError::UnrepresentableConstant)?;

        log::debug!(
            "PID config: {} Hz, derivative window {} ticks, scheduled gains p/i/d: {}/{}/{}",
            hz.to_f64().unwrap_or(f64::NAN),
            derivative_samples,
            !self.kp.is_constant(),
            !self.ki.is_constant(),
            !self.kd.is_constant(),
        );

        Ok(PidConfig {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            kf: self.kf,
            output_min,
            output_max,
            rate,
            derivative_period: self.derivative_period,
            derivative_samples,
            derivative_divisor,
        })
    }
}

/// Everything the caller supplies on one control tick.
///
/// ```rust
/// use scheduled_pid::pid::PidInput;
///
/// let input = PidInput::<f64>::new(0.5).with_speed(20.0).with_feedforward(0.1);
/// assert!(!input.override_integrator);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidInput<F: Float> {
    /// Setpoint minus measurement.
    pub error: F,

    /// Rate of change of the error as computed by the caller.
    ///
    /// Accepted so callers can pass the same inputs to every controller in the stack, but the
    /// controller estimates the derivative from its own error history and never reads this.
    pub error_rate: F,

    /// Operating point the gains are scheduled against.
    pub speed: F,

    /// Open-loop term, scaled by the feedforward gain and added to the output.
    pub feedforward: F,

    /// Ignore the error and unwind the integral toward zero this tick.
    pub override_integrator: bool,

    /// Hold the integral unchanged this tick.
    pub freeze_integrator: bool,
}

impl<F: Float> Default for PidInput<F> {
    fn default() -> Self {
        Self {
            error: F::zero(),
            error_rate: F::zero(),
            speed: F::zero(),
            feedforward: F::zero(),
            override_integrator: false,
            freeze_integrator: false,
        }
    }
}

impl<F: Float> PidInput<F> {
    /// An input carrying only an error; everything else is zero or unset.
    pub fn new(error: F) -> Self {
        Self {
            error,
            ..Self::default()
        }
    }

    /// Sets the externally measured error rate. The controller ignores it.
    pub fn with_error_rate(mut self, error_rate: F) -> Self {
        self.error_rate = error_rate;
        self
    }

    /// Sets the speed the gains are scheduled on.
    pub fn with_speed(mut self, speed: F) -> Self {
        self.speed = speed;
        self
    }

    /// Sets the feedforward signal, scaled by `kf`.
    pub fn with_feedforward(mut self, feedforward: F) -> Self {
        self.feedforward = feedforward;
        self
    }

    /// Unwinds the integral toward zero on this tick instead of integrating.
    pub fn with_override(mut self, override_integrator: bool) -> Self {
        self.override_integrator = override_integrator;
        self
    }

    /// Holds the integral at its current value on this tick.
    pub fn with_frozen_integrator(mut self, freeze_integrator: bool) -> Self {
        self.freeze_integrator = freeze_integrator;
        self
    }
}

/// Working variables of a `PidController`, zeroed at construction and on `reset`.
#[derive(Clone, Debug, PartialEq)]
pub struct PidState<F: Float> {
    p_term: F,
    i_term: F,
    d_term: F,
    f_term: F,
    last_output: F,
    speed: F,
    errors: ErrorWindow<F>,
}

impl<F: Float> PidState<F> {
    fn new(derivative_samples: usize) -> Self {
        Self {
            p_term: F::zero(),
            i_term: F::zero(),
            d_term: F::zero(),
            f_term: F::zero(),
            last_output: F::zero(),
            speed: F::zero(),
            errors: ErrorWindow::with_capacity(derivative_samples),
        }
    }

    fn reset(&mut self) {
        self.p_term = F::zero();
        self.i_term = F::zero();
        self.d_term = F::zero();
        self.f_term = F::zero();
        self.last_output = F::zero();
        self.errors.clear();
    }

    /// Proportional term of the last update.
    pub fn p_term(&self) -> F {
        self.p_term
    }

    /// The integral accumulator. It is already scaled by the integral gain.
    pub fn i_term(&self) -> F {
        self.i_term
    }

    /// Derivative term of the last update.
    pub fn d_term(&self) -> F {
        self.d_term
    }

    /// Feedforward term of the last update.
    pub fn f_term(&self) -> F {
        self.f_term
    }

    /// The clamped output of the last `update`, or zero after a reset.
    pub fn output(&self) -> F {
        self.last_output
    }

    /// The speed passed to the last `update`. A reset keeps it.
    pub fn speed(&self) -> F {
        self.speed
    }

    /// Raw errors of the previous ticks, at most `derivative_samples` of them.
    pub fn errors(&self) -> &ErrorWindow<F> {
        &self.errors
    }
}

/// A PID controller stepped at a fixed rate with speed-scheduled gains.
///
/// Each `update` computes
///
/// - a proportional term `error * kp(speed)`,
/// - a feedforward term `feedforward * kf`,
/// - a derivative term, the backward difference between the current error and the error
///   `derivative_samples` ticks ago, divided by `derivative_samples` and scaled by `kd(speed)`.
///   It is zero until that many errors have been recorded since the last reset,
/// - an integral term, accumulated with anti-windup,
///
/// and returns their sum clamped to the output limits.
///
/// The controller holds mutable state and must be stepped by a single owner once per tick.
pub struct PidController<F: Float> {
    config: PidConfig<F>,
    state: PidState<F>,
}

impl<F: Float> PidController<F> {
    /// Creates a controller with zeroed state.
    pub fn new(config: PidConfig<F>) -> Self {
        let state = PidState::new(config.derivative_samples);
        Self { config, state }
    }

    /// The configuration the controller was built with.
    pub fn config(&self) -> &PidConfig<F> {
        &self.config
    }

    /// Terms, integral and error history after the last update.
    pub fn state(&self) -> &PidState<F> {
        &self.state
    }

    /// Returns the clamped output of the last `update`.
    pub fn output(&self) -> F {
        self.state.last_output
    }

    /// Returns the integral accumulator.
    pub fn i_term(&self) -> F {
        self.state.i_term
    }

    /// Zeroes the proportional, integral, derivative, and feedforward terms and the last output,
    /// and forgets the error history. Call this when the loop is re-engaged.
    pub fn reset(&mut self) {
        self.state.reset();
        log::debug!("PID state reset");
    }

    /// Runs one control tick and returns the clamped output.
    pub fn update(&mut self, input: PidInput<F>) -> F {
        let PidInput {
            error,
            speed,
            feedforward,
            override_integrator,
            freeze_integrator,
            ..
        } = input;
        let cfg = &self.config;
        let st = &mut self.state;

        st.speed = speed;
        st.p_term = error * cfg.kp(speed);
        st.f_term = feedforward * cfg.kf;

        // sample_from_end(n - 1) is the error n ticks ago, present once n errors are held
        st.d_term = st
            .errors
            .sample_from_end(cfg.derivative_samples - 1)
            .map(|past| (error - past) / cfg.derivative_divisor * cfg.kd(speed))
            .unwrap_or_else(F::zero);

        if override_integrator {
            st.i_term = unwind_toward_zero(st.i_term, cfg.rate.unwind_step());
        } else {
            let i_term = st.i_term + error * cfg.ki(speed) * cfg.rate.dt();
            let control = st.p_term + st.f_term + i_term + st.d_term;

            // Integrate unless doing so pushes a saturated output further past its limit. Moving
            // the integral back toward zero is always allowed.
            let zero = F::zero();
            let may_rise = error >= zero && (control <= cfg.output_max || i_term < zero);
            let may_fall = error <= zero && (control >= cfg.output_min || i_term > zero);
            if (may_rise || may_fall) && !freeze_integrator {
                st.i_term = i_term;
            }
        }

        let control = st.p_term + st.f_term + st.i_term + st.d_term;
        st.errors.push(error);

        st.last_output = num_traits::clamp(control, cfg.output_min, cfg.output_max);

        log::trace!(
            "PID tick: p={:?} i={:?} d={:?} f={:?} out={:?}",
            st.p_term.to_f64(),
            st.i_term.to_f64(),
            st.d_term.to_f64(),
            st.f_term.to_f64(),
            st.last_output.to_f64(),
        );

        st.last_output
    }

    /// The integral expressed as the constant error that would have produced it, at the speed of
    /// the last `update`.
    ///
    /// # Returns
    /// - `Err(PidError::ZeroIntegralGain)` if the integral gain is exactly zero at that speed.
    pub fn error_integral(&self) -> Result<F, PidError> {
        self.error_integral_at(self.state.speed)
    }

    /// Like `error_integral`, but with the integral gain looked up at `speed`.
    pub fn error_integral_at(&self, speed: F) -> Result<F, PidError> {
        let ki = self.config.ki(speed);
        if ki == F::zero() {
            return Err(PidError::ZeroIntegralGain);
        }
        Ok(self.state.i_term / ki)
    }
}

/// Moves `value` toward zero by `step` without crossing it.
fn unwind_toward_zero<F: Float>(value: F, step: F) -> F {
    if value.abs() <= step {
        F::zero()
    } else {
        value - step * value.signum()
    }
}
