#![warn(missing_docs)]

//! # Scheduled PID Controller Library
//!
//! This library provides a discrete PID (Proportional-Integral-Derivative) controller for loops
//! stepped at a constant tick rate, such as 100 Hz steering or speed control.
//!
//! ## Features
//!
//! - Speed-dependent gain scheduling:
//!   - Each of the p/i/d gains is a scalar or a piecewise-linear table over speed.
//!   - Gain lookups are pure functions of speed, independent of call order.
//!
//! - Anti reset-windup:
//!   - Bounded output.
//!   - Integration is blocked whenever it would push a saturated output further past its limit,
//!     and always allowed when it moves the integral back toward zero.
//!   - Per-tick override (unwind the integral toward zero) and freeze (hold it) flags.
//!
//! - Windowed derivative:
//!   - Backward difference over a configurable window, kept in a fixed-capacity ring buffer.
//!
//! - Feedforward injection with its own (unscheduled) gain.
//!
//! ## Usage
//!
//! ```rust
//! use scheduled_pid::pid::{PidConfigBuilder, PidController, PidInput};
//! use scheduled_pid::schedule::GainTable;
//!
//! let kp = GainTable::from_breakpoints(&[5.0, 35.0], &[0.2, 0.1]).expect("Invalid gain table");
//! let config = PidConfigBuilder::<f64>::default()
//!     .kp(kp)
//!     .ki(0.05)
//!     .kf(1.0)
//!     .output_limits(-1.0, 1.0)
//!     .build()
//!     .expect("Invalid PID config");
//! let mut pid = PidController::new(config);
//!
//! let speed = 20.0;
//! let error = 0.4;
//! let output = pid.update(PidInput::new(error).with_speed(speed).with_feedforward(0.1));
//! assert!(output > 0.0 && output <= 1.0);
//!
//! // Re-engaging the loop starts from zeroed state
//! pid.reset();
//! assert_eq!(pid.output(), 0.0);
//! ```
//!
//! ## License
//!
#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

/// The PID controller, its configuration and its errors.
pub mod pid;

/// Gain schedules over an operating variable.
pub mod schedule;

/// The tick rate of the control loop.
pub mod tick;

/// The bounded error history behind the derivative term.
pub mod window;

/// Best-effort progress reporting to an external display process.
#[cfg(feature = "std")]
pub mod progress;

#[doc(hidden)]
#[cfg(feature = "simulation")]
pub mod sim;

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
