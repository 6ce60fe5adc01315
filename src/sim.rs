use nalgebra as na;

/// Shape of a reference signal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum WaveForm {
    Sine,
    Square,
    Step,
}

/// Generates a reference signal sampled at a fixed tick rate.
pub struct SignalGenerator {
    fcn: fn(f64) -> f64,
    rate_hz: f64,
    amplitude: f64,
    offset: f64,
}

impl SignalGenerator {
    pub fn new(waveform: WaveForm, rate_hz: f64, amplitude: f64, offset: f64) -> Self {
        Self {
            fcn: match waveform {
                WaveForm::Sine => f64::sin,
                WaveForm::Square => |x| x.sin().signum(),
                WaveForm::Step => |_| 1.0,
            },
            rate_hz,
            amplitude,
            offset,
        }
    }

    /// Value of the signal at `tick`, where tick 0 is time zero.
    pub fn generate(&self, tick: usize) -> f64 {
        self.amplitude * (self.fcn)(tick as f64 / self.rate_hz) + self.offset
    }
}

pub struct MassSpringDamper {
    pub natural_frequency: f64,
    pub damping_ratio: f64,
}

impl MassSpringDamper {
    /// Implements the state-space realization of the mass-spring-damper system:
    /// ┌     ┐   ┌              ┐┌    ┐   ┌     ┐
    /// │ p'  │ = │  0     1     ││ p  │ + │ 0   │ u
    /// │ p'' │   │  -ωₙ²  -2ζωₙ ││ p' │   │ ωₙ² │
    /// └     ┘   └              ┘└    ┘   └     ┘
    ///     ┌      ┐┌    ┐
    /// p = │ 1  0 ││ p  │
    ///     └      ┘│ p' │
    ///             └    ┘
    pub fn f(&self, x: na::Vector2<f64>, u: f64) -> na::Vector2<f64> {
        let omega_sq = self.natural_frequency.powi(2);
        let two_zeta_omega = 2.0 * self.natural_frequency * self.damping_ratio;

        let mat_a = na::Matrix2::new(0.0, 1.0, -omega_sq, -two_zeta_omega);
        let mat_b = na::Vector2::new(0.0, omega_sq);

        mat_a * x + mat_b * u
    }

    pub fn h(&self, x: na::Vector2<f64>) -> f64 {
        x[0]
    }

    /// Advances the state by one tick of length `dt` with a forward Euler step, holding `u`.
    pub fn euler_step(&self, x: na::Vector2<f64>, u: f64, dt: f64) -> na::Vector2<f64> {
        x + self.f(x, u) * dt
    }
}

/// A closed loop of a controller driving a `MassSpringDamper` toward a reference.
///
/// The loop error is `reference - position`, and the plant's output at tick `k` is the result of
/// the control computed at tick `k - 1`.
pub struct ClosedLoop {
    pub plant: MassSpringDamper,
    pub state: na::Vector2<f64>,
    pub dt: f64,
}

impl ClosedLoop {
    pub fn new(plant: MassSpringDamper, rate_hz: f64) -> Self {
        Self {
            plant,
            state: na::Vector2::zeros(),
            dt: 1.0 / rate_hz,
        }
    }

    /// Current plant output.
    pub fn position(&self) -> f64 {
        self.plant.h(self.state)
    }

    /// Applies `control` for one tick and returns the new plant output.
    pub fn step(&mut self, control: f64) -> f64 {
        self.state = self.plant.euler_step(self.state, control, self.dt);
        self.position()
    }
}
