//! # DOPRI5: Dormand-Prince 5(4) Integrator with Dense Output
//!
//! An adaptive ODE integrator for initial-value problems
//! dz/dt = f(t, z), sampling the solution at arbitrary times through
//! dense-output interpolation of the internally chosen steps.
//!
//! ## Features
//!
//! - 7-stage embedded RK5(4) pair (Dormand-Prince coefficients)
//! - Adaptive step-size control with 4th-order error estimation
//! - **Dense output**: every accepted step retains its stage
//!   derivatives, so a completed [`Trajectory`] can be sampled at any
//!   time in the integrated span without re-integrating
//! - Mixed absolute/relative tolerance control, per-component if needed
//! - Minimal dependencies (no external linear algebra required)
//!
//! ## Basic Usage
//!
//! The derivative function is any [`OdeSystem`] implementation. Model
//! constants live on the implementing type, never in process-wide
//! state, so systems stay pure and independent integrations can run in
//! parallel. Here, the kinematic bicycle model with state [x, y, θ]:
//!
//! ```rust
//! use dopri5::{Dopri5, OdeSystem, Tolerances};
//!
//! struct Bicycle {
//!     speed: f64,     // v (m/s)
//!     wheelbase: f64, // L (m)
//!     steering: f64,  // u (rad), constant input
//! }
//!
//! impl OdeSystem<3> for Bicycle {
//!     fn rhs(&self, _t: f64, z: &[f64; 3], dzdt: &mut [f64; 3]) {
//!         dzdt[0] = self.speed * z[2].cos();
//!         dzdt[1] = self.speed * z[2].sin();
//!         dzdt[2] = self.speed * self.steering.tan() / self.wheelbase;
//!     }
//! }
//!
//! let sys = Bicycle {
//!     speed: 5.0,
//!     wheelbase: 2.3,
//!     steering: -2.0_f64.to_radians(),
//! };
//!
//! // Integrate z(0) = [0, 0.3, 5.0] over [0, 2] with default
//! // tolerances (atol = 1e-6, rtol = 1e-3)
//! let mut solver = Dopri5::new(Tolerances::default());
//! let trajectory = solver
//!     .integrate(&sys, 0.0, &[0.0, 0.3, 5.0], 2.0, None)
//!     .unwrap();
//!
//! // Sample wherever the caller wants, independent of the step grid
//! let samples = trajectory.sample(&[0.0, 0.5, 1.0, 1.5, 2.0]).unwrap();
//! assert_eq!(samples[0], [0.0, 0.3, 5.0]); // t0 returns z0 exactly
//! ```
//!
//! ## Trajectory Sampling
//!
//! [`Dopri5::integrate`] returns the full [`Trajectory`] of accepted
//! steps rather than just the final state. The internal step grid is
//! chosen by the error controller and is generally irregular;
//! [`Trajectory::sample`] maps it to whatever evaluation grid the
//! caller requests, in request order, via a 4th-order interpolant whose
//! error does not exceed the tolerance the controller already accepted.
//! Requests outside the integrated span are rejected, never
//! extrapolated.
//!
//! ## Error Handling
//!
//! Integration failures are reported as [`IntegrationError`] values and
//! never yield a partial trajectory: a step floor rejection
//! (stiffness), a step-attempt ceiling (runaway guard), a non-finite
//! derivative, or invalid inputs. Sampling reports
//! [`SampleError::OutOfRange`] for times outside the span.
//!
//! ## References
//!
//! 1. Dormand, J.R. & Prince, P.J. (1980). "A family of embedded
//!    Runge-Kutta formulae". J. Comp. Appl. Math., 6(1), 19-26.
//!
//! 2. Hairer, E., Nørsett, S.P., & Wanner, G. (1993). "Solving
//!    Ordinary Differential Equations I: Nonstiff Problems".
//!    Springer.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod coefficients;
pub mod solver;
pub mod trajectory;

pub use solver::{
    Dopri5, IntegrationError, OdeSystem, Stats, StepController, StepResult, Tolerances,
};
pub use trajectory::{SampleError, Step, Trajectory};
