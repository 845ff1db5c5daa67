//! Dormand-Prince 5(4) Integrator
//!
//! A 7-stage embedded RK5(4) pair with adaptive step-size control for
//! initial-value problems dz/dt = f(t, z). Every accepted step is
//! recorded in a [`Trajectory`] together with its stage derivatives, so
//! the solution can later be sampled at arbitrary times through the
//! dense-output interpolant.
//!
//! Reference: Dormand & Prince (1980), and Hairer, Nørsett & Wanner,
//! "Solving Ordinary Differential Equations I".

use crate::coefficients::{A, B, C, E, EMBEDDED_ORDER, STAGES};
use crate::trajectory::{Step, Trajectory};
use thiserror::Error;

/// System of ordinary differential equations: dy/dt = f(t, y)
///
/// Implementations must be pure: the same `(t, y)` must always produce
/// the same derivative, with no side effects. The solver evaluates the
/// right-hand side at trial points that are later discarded when a step
/// is rejected, so any hidden state would corrupt the integration.
pub trait OdeSystem<const N: usize> {
    /// Evaluate the right-hand side of the ODE system
    ///
    /// # Arguments
    /// * `t` - Current time
    /// * `y` - Current state vector
    /// * `dydt` - Output: derivative dy/dt
    fn rhs(&self, t: f64, y: &[f64; N], dydt: &mut [f64; N]);
}

/// Result from a single trial step
#[derive(Debug, Clone)]
pub struct StepResult<const N: usize> {
    /// New state after the step (5th order solution)
    pub y: [f64; N],
    /// New time value
    pub t: f64,
    /// Normalized error estimate (should be ≤ 1.0 for acceptance)
    pub error: f64,
    /// Suggested step size for next attempt
    pub h_next: f64,
    /// Whether the step was accepted
    pub accepted: bool,
    /// Stage derivatives of this attempt, retained for dense output
    pub stages: [[f64; N]; STAGES],
}

/// Integration statistics for diagnostics
#[derive(Debug, Clone, Default)]
pub struct Stats {
    /// Total number of function evaluations
    pub fn_evals: u64,
    /// Number of accepted steps
    pub accepted_steps: u64,
    /// Number of rejected steps
    pub rejected_steps: u64,
}

/// Step-size controller
///
/// On acceptance the next step size is
/// h_new = h * min(max_factor, max(min_factor, safety * norm^(-1/5)))
/// where the exponent is 1/(q + 1) with q = 4 the embedded order.
/// Rejected steps are halved, bounded below by the step floor.
#[derive(Clone)]
pub struct StepController {
    /// Safety factor (0.8-0.9 typical)
    pub safety: f64,
    /// Maximum growth factor per step
    pub max_factor: f64,
    /// Minimum reduction factor per step
    pub min_factor: f64,
    /// Exponent = 1/(q + 1) where q is the embedded order
    exponent: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self {
            safety: 0.9,
            max_factor: 5.0,
            min_factor: 0.2,
            exponent: 1.0 / (EMBEDDED_ORDER as f64 + 1.0),
        }
    }
}

impl StepController {
    /// Compute the step size adjustment factor for an accepted step
    pub fn compute_factor(&self, error: f64) -> f64 {
        if error == 0.0 {
            return self.max_factor;
        }

        let factor = self.safety * error.powf(-self.exponent);
        factor.clamp(self.min_factor, self.max_factor)
    }
}

/// Tolerance specification for error control
///
/// Each error component is scaled by atol + rtol * max(|y|, |y_new|)
/// before the components are combined into one RMS norm.
#[derive(Debug, Clone)]
pub struct Tolerances<const N: usize> {
    /// Absolute tolerance per component
    pub atol: [f64; N],
    /// Relative tolerance per component
    pub rtol: [f64; N],
}

impl<const N: usize> Tolerances<N> {
    /// Create tolerances with uniform values
    pub fn new(atol: f64, rtol: f64) -> Self {
        Self {
            atol: [atol; N],
            rtol: [rtol; N],
        }
    }

    /// Create tolerances with per-component values
    pub fn with_components(atol: [f64; N], rtol: [f64; N]) -> Self {
        Self { atol, rtol }
    }
}

impl<const N: usize> Default for Tolerances<N> {
    /// atol = 1e-6, rtol = 1e-3
    fn default() -> Self {
        Self::new(1e-6, 1e-3)
    }
}

/// Dormand-Prince 5(4) integrator
///
/// # Type Parameters
/// * `N` - Dimension of the state vector
///
/// # Example
/// ```ignore
/// use dopri5::{Dopri5, OdeSystem, Tolerances};
///
/// struct ExpDecay;
///
/// impl OdeSystem<1> for ExpDecay {
///     fn rhs(&self, _t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) {
///         dydt[0] = -y[0];
///     }
/// }
///
/// let mut solver = Dopri5::new(Tolerances::new(1e-9, 1e-9));
/// let trajectory = solver.integrate(&ExpDecay, 0.0, &[1.0], 5.0, None).unwrap();
/// let y_final = trajectory.final_state();
/// ```
#[derive(Clone)]
pub struct Dopri5<const N: usize> {
    /// Tolerance specification
    tol: Tolerances<N>,
    /// Step-size controller
    controller: StepController,
    /// Minimum step size (the floor; a rejected step at the floor is fatal)
    pub h_min: f64,
    /// Maximum step size
    pub h_max: f64,
    /// Maximum number of step attempts before giving up
    pub max_steps: u64,
    /// Stage evaluations (pre-allocated workspace)
    k: [[f64; N]; STAGES],
    /// Integration statistics
    pub stats: Stats,
}

impl<const N: usize> Dopri5<N> {
    /// Create a new Dormand-Prince 5(4) solver with specified tolerances
    pub fn new(tol: Tolerances<N>) -> Self {
        Self {
            tol,
            controller: StepController::default(),
            h_min: 1e-14,
            h_max: f64::INFINITY,
            max_steps: 10_000,
            k: [[0.0; N]; STAGES],
            stats: Stats::default(),
        }
    }

    /// Set minimum and maximum step sizes
    pub fn set_step_limits(&mut self, h_min: f64, h_max: f64) {
        self.h_min = h_min;
        self.h_max = h_max;
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = Stats::default();
    }

    /// Perform a single trial step of size `h > 0` from `(t, y)`
    ///
    /// Computes the 7 stages, forms the 5th-order solution, estimates
    /// the scaled error norm, and determines acceptance. The stage
    /// derivatives are returned so an accepted step can be recorded for
    /// dense output without recomputation.
    ///
    /// # Errors
    ///
    /// [`IntegrationError::NonFiniteDerivative`] if the right-hand side
    /// produced NaN or infinity at any stage. This is reported
    /// immediately: shrinking the step cannot fix a defective
    /// derivative function.
    pub fn step<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        t: f64,
        y: &[f64; N],
        h: f64,
    ) -> Result<StepResult<N>, IntegrationError> {
        self.compute_stages(sys, t, y, h)?;

        let y_new = self.compute_solution(y, h);
        let error = self.compute_error(y, &y_new, h);

        let accepted = error <= 1.0;

        let h_next = if accepted {
            (h * self.controller.compute_factor(error)).clamp(self.h_min, self.h_max)
        } else {
            // Rejected: halve and retry from the same point
            (h * 0.5).max(self.h_min)
        };

        self.stats.fn_evals += STAGES as u64;
        if accepted {
            self.stats.accepted_steps += 1;
        } else {
            self.stats.rejected_steps += 1;
        }

        Ok(StepResult {
            y: y_new,
            t: t + h,
            error,
            h_next,
            accepted,
            stages: self.k,
        })
    }

    /// Integrate from t0 to t1 and return the complete trajectory
    ///
    /// # Arguments
    /// * `sys` - The ODE system to integrate
    /// * `t0` - Initial time
    /// * `y0` - Initial state
    /// * `t1` - Final time, t1 ≥ t0
    /// * `h0` - Initial step size guess; `None` selects one
    ///   heuristically from the initial derivative magnitude
    ///
    /// The returned trajectory covers [t0, t1] contiguously: its first
    /// step starts at t0, its last step ends at t1 exactly, and every
    /// step starts where the previous one ended. A degenerate span
    /// t0 == t1 yields a single zero-length step holding `y0`.
    ///
    /// # Errors
    ///
    /// No partial trajectory is ever returned:
    /// * [`IntegrationError::StepSizeTooSmall`] - a step at the floor
    ///   `h_min` still failed the error test (stiffness or malformed
    ///   dynamics)
    /// * [`IntegrationError::MaxStepsExceeded`] - the attempt ceiling
    ///   was hit before reaching t1
    /// * [`IntegrationError::NonFiniteDerivative`] - the right-hand
    ///   side produced NaN or infinity
    /// * [`IntegrationError::InvalidInput`] - non-finite or otherwise
    ///   malformed arguments
    pub fn integrate<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        t0: f64,
        y0: &[f64; N],
        t1: f64,
        h0: Option<f64>,
    ) -> Result<Trajectory<N>, IntegrationError> {
        self.validate_inputs(t0, y0, t1, h0)?;

        let mut trajectory = Trajectory::new();

        if t0 == t1 {
            trajectory.push(Step::new(t0, t0, *y0, *y0, [[0.0; N]; STAGES]));
            return Ok(trajectory);
        }

        let mut t = t0;
        let mut y = *y0;
        let mut h = match h0 {
            Some(h) => h.min(t1 - t0).clamp(self.h_min, self.h_max),
            None => self.initial_step(sys, t0, y0, t1)?,
        };

        let mut attempts = 0u64;

        while t < t1 {
            attempts += 1;
            if attempts > self.max_steps {
                return Err(IntegrationError::MaxStepsExceeded {
                    t,
                    max_steps: self.max_steps,
                });
            }

            // Clip the final step so the trajectory ends on t1 exactly
            let clipped = t + h >= t1;
            if clipped {
                h = t1 - t;
            }

            let result = self.step(sys, t, &y, h)?;

            if result.accepted {
                let t_end = if clipped { t1 } else { result.t };
                trajectory.push(Step::new(t, t_end, y, result.y, result.stages));
                t = t_end;
                y = result.y;
            } else if h <= self.h_min {
                // Already at the floor and still failing the error test
                return Err(IntegrationError::StepSizeTooSmall { t, h });
            }

            h = result.h_next;
        }

        Ok(trajectory)
    }

    /// Compute all 7 stages
    #[allow(clippy::needless_range_loop)]
    fn compute_stages<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        t: f64,
        y: &[f64; N],
        h: f64,
    ) -> Result<(), IntegrationError> {
        let mut y_temp = [0.0; N];

        // Stage 0: k[0] = f(t, y)
        sys.rhs(t, y, &mut self.k[0]);

        // Stages 1-6
        for i in 1..STAGES {
            // y_temp = y + h * sum_{j=0}^{i-1} a[i][j] * k[j]
            for n in 0..N {
                let mut sum = 0.0;
                for j in 0..i {
                    sum += A[i][j] * self.k[j][n];
                }
                y_temp[n] = y[n] + h * sum;
            }

            // k[i] = f(t + c[i]*h, y_temp)
            sys.rhs(t + C[i] * h, &y_temp, &mut self.k[i]);
        }

        for stage in &self.k {
            if !stage.iter().all(|v| v.is_finite()) {
                return Err(IntegrationError::NonFiniteDerivative { t });
            }
        }
        Ok(())
    }

    /// Compute the 5th order solution from the stages
    #[allow(clippy::needless_range_loop)]
    fn compute_solution(&self, y: &[f64; N], h: f64) -> [f64; N] {
        let mut y_new = [0.0; N];

        for n in 0..N {
            let mut sum = 0.0;
            for i in 0..STAGES {
                sum += B[i] * self.k[i][n];
            }
            y_new[n] = y[n] + h * sum;
        }

        y_new
    }

    /// Compute the normalized error estimate
    ///
    /// Uses the RMS norm of the scaled error:
    /// error = sqrt(mean_n((h * sum_i e[i] * k[i][n] / scale[n])^2))
    /// where scale[n] = atol[n] + rtol[n] * max(|y[n]|, |y_new[n]|)
    #[allow(clippy::needless_range_loop)]
    fn compute_error(&self, y: &[f64; N], y_new: &[f64; N], h: f64) -> f64 {
        let mut sum_sq = 0.0;

        for n in 0..N {
            let mut err_n = 0.0;
            for i in 0..STAGES {
                err_n += E[i] * self.k[i][n];
            }
            err_n *= h;

            let scale = self.tol.atol[n] + self.tol.rtol[n] * y[n].abs().max(y_new[n].abs());
            let scaled = err_n / scale;
            sum_sq += scaled * scaled;
        }

        (sum_sq / N as f64).sqrt()
    }

    /// Choose an initial step size from the initial derivative magnitude
    ///
    /// Standard two-phase heuristic: a crude guess h0 from the ratio of
    /// state to derivative norms, refined by an explicit Euler probe
    /// that bounds the second derivative.
    fn initial_step<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        t0: f64,
        y0: &[f64; N],
        t1: f64,
    ) -> Result<f64, IntegrationError> {
        let mut f0 = [0.0; N];
        sys.rhs(t0, y0, &mut f0);
        self.stats.fn_evals += 1;
        if !f0.iter().all(|v| v.is_finite()) {
            return Err(IntegrationError::NonFiniteDerivative { t: t0 });
        }

        let d0 = self.scaled_rms(y0, y0);
        let d1 = self.scaled_rms(&f0, y0);

        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };

        // Euler probe to estimate the curvature of the solution
        let mut y1 = *y0;
        for n in 0..N {
            y1[n] += h0 * f0[n];
        }
        let mut f1 = [0.0; N];
        sys.rhs(t0 + h0, &y1, &mut f1);
        self.stats.fn_evals += 1;
        if !f1.iter().all(|v| v.is_finite()) {
            return Err(IntegrationError::NonFiniteDerivative { t: t0 + h0 });
        }

        let mut df = [0.0; N];
        for n in 0..N {
            df[n] = f1[n] - f0[n];
        }
        let d2 = self.scaled_rms(&df, y0) / h0;

        let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(1.0 / (EMBEDDED_ORDER as f64 + 1.0))
        };

        Ok((100.0 * h0).min(h1).min(t1 - t0).clamp(self.h_min, self.h_max))
    }

    /// RMS of `v` with each component scaled by atol + rtol * |y_ref|
    fn scaled_rms(&self, v: &[f64; N], y_ref: &[f64; N]) -> f64 {
        let mut sum_sq = 0.0;
        for n in 0..N {
            let scale = self.tol.atol[n] + self.tol.rtol[n] * y_ref[n].abs();
            let scaled = v[n] / scale;
            sum_sq += scaled * scaled;
        }
        (sum_sq / N as f64).sqrt()
    }

    /// Validate integration inputs
    fn validate_inputs(
        &self,
        t0: f64,
        y0: &[f64; N],
        t1: f64,
        h0: Option<f64>,
    ) -> Result<(), IntegrationError> {
        if !t0.is_finite() || !t1.is_finite() {
            return Err(IntegrationError::InvalidInput {
                message: "t0 and t1 must be finite".to_string(),
            });
        }
        if t1 < t0 {
            return Err(IntegrationError::InvalidInput {
                message: format!("t1 = {} must not precede t0 = {}", t1, t0),
            });
        }
        if let Some(h) = h0 {
            if !h.is_finite() || h <= 0.0 {
                return Err(IntegrationError::InvalidInput {
                    message: "h0 must be finite and positive".to_string(),
                });
            }
        }
        for (i, &val) in y0.iter().enumerate() {
            if !val.is_finite() {
                return Err(IntegrationError::InvalidInput {
                    message: format!("y0[{}] is not finite", i),
                });
            }
        }
        for (i, (&a, &r)) in self.tol.atol.iter().zip(self.tol.rtol.iter()).enumerate() {
            if !a.is_finite() || a <= 0.0 {
                return Err(IntegrationError::InvalidInput {
                    message: format!("atol[{}] must be positive and finite", i),
                });
            }
            if !r.is_finite() || r < 0.0 {
                return Err(IntegrationError::InvalidInput {
                    message: format!("rtol[{}] must be non-negative and finite", i),
                });
            }
        }
        Ok(())
    }
}

/// Errors that can occur during integration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    /// A step at the floor h_min still failed the error test
    #[error("step size {h:e} at the floor was rejected at t = {t}")]
    StepSizeTooSmall {
        /// Time at which progress stalled
        t: f64,
        /// The rejected step size
        h: f64,
    },
    /// The step-attempt ceiling was exceeded before reaching t1
    #[error("exceeded {max_steps} step attempts at t = {t}")]
    MaxStepsExceeded {
        /// Time reached when the ceiling was hit
        t: f64,
        /// The configured attempt ceiling
        max_steps: u64,
    },
    /// The derivative function produced NaN or infinity
    #[error("derivative produced a non-finite value at t = {t}")]
    NonFiniteDerivative {
        /// Time of the offending evaluation
        t: f64,
    },
    /// Invalid input parameters
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the invalid input
        message: String,
    },
}
