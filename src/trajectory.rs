//! Trajectory storage and dense-output sampling
//!
//! The integrator records every accepted step together with its stage
//! derivatives. That is enough to evaluate the solution anywhere inside
//! the integrated span without re-invoking the right-hand side: each
//! step carries a 4th-order interpolating polynomial in the normalized
//! local variable θ = (t - t_start) / (t_end - t_start).

use crate::coefficients::{DENSE_DEGREE, P, STAGES};
use thiserror::Error;

/// One accepted integration step
///
/// Covers the half-open-in-spirit interval [t_start, t_end]; consecutive
/// steps of a [`Trajectory`] share their boundary point. The stage
/// derivatives are retained so the dense-output interpolant can be
/// evaluated without recomputation.
#[derive(Debug, Clone)]
pub struct Step<const N: usize> {
    /// Time at the start of the step
    pub t_start: f64,
    /// Time at the end of the step
    pub t_end: f64,
    /// State at the start of the step
    pub y_start: [f64; N],
    /// State at the end of the step (5th-order solution)
    pub y_end: [f64; N],
    /// Stage derivatives recorded during the step
    k: [[f64; N]; STAGES],
}

impl<const N: usize> Step<N> {
    pub(crate) fn new(
        t_start: f64,
        t_end: f64,
        y_start: [f64; N],
        y_end: [f64; N],
        k: [[f64; N]; STAGES],
    ) -> Self {
        Self {
            t_start,
            t_end,
            y_start,
            y_end,
            k,
        }
    }

    /// Step size h = t_end - t_start
    pub fn h(&self) -> f64 {
        self.t_end - self.t_start
    }

    /// Whether `t` lies within [t_start, t_end]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.t_start && t <= self.t_end
    }

    /// Evaluate the dense-output interpolant at `t`
    ///
    /// y(θ) = y_start + h * sum_i k_i * p_i(θ), where p_i is the quartic
    /// polynomial given by row i of the dense-output matrix.
    ///
    /// θ ≤ 0 returns `y_start` exactly and θ ≥ 1 returns `y_end` exactly,
    /// so step boundaries carry no interpolation error. This also covers
    /// the zero-length step produced by a degenerate time span.
    pub fn eval(&self, t: f64) -> [f64; N] {
        let h = self.h();
        if h == 0.0 || t <= self.t_start {
            return self.y_start;
        }
        if t >= self.t_end {
            return self.y_end;
        }

        let theta = (t - self.t_start) / h;

        let mut y = self.y_start;
        for i in 0..STAGES {
            // Horner evaluation of p_i(θ) = θ * (P[i][0] + θ * (P[i][1] + ...))
            let mut p = 0.0;
            for j in (0..DENSE_DEGREE).rev() {
                p = P[i][j] + theta * p;
            }
            p *= theta;

            for (y_n, k_n) in y.iter_mut().zip(self.k[i].iter()) {
                *y_n += h * p * k_n;
            }
        }
        y
    }
}

/// Complete integration result: the ordered sequence of accepted steps
///
/// Strictly increasing in time and gapless — each step starts where the
/// previous one ended — covering the full requested span. Produced by
/// [`Dopri5::integrate`](crate::Dopri5::integrate) and immutable
/// afterwards. Never empty.
#[derive(Debug, Clone)]
pub struct Trajectory<const N: usize> {
    steps: Vec<Step<N>>,
}

impl<const N: usize> Trajectory<N> {
    pub(crate) fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub(crate) fn push(&mut self, step: Step<N>) {
        self.steps.push(step);
    }

    /// The accepted steps, in time order
    pub fn steps(&self) -> &[Step<N>] {
        &self.steps
    }

    /// Number of accepted steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the trajectory holds no steps
    ///
    /// Integration always produces at least one step, so this is only
    /// true for a trajectory still under construction.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Start of the integrated span
    pub fn t_start(&self) -> f64 {
        self.steps[0].t_start
    }

    /// End of the integrated span
    pub fn t_end(&self) -> f64 {
        self.steps[self.steps.len() - 1].t_end
    }

    /// Initial state z0
    pub fn initial_state(&self) -> &[f64; N] {
        &self.steps[0].y_start
    }

    /// Final accepted state
    pub fn final_state(&self) -> &[f64; N] {
        &self.steps[self.steps.len() - 1].y_end
    }

    /// Evaluate the solution at a single time within the integrated span
    ///
    /// Binary search locates the containing step in O(log n), then the
    /// step's dense-output interpolant is evaluated. `t_start` and
    /// `t_end` of the span return the stored endpoint states exactly.
    ///
    /// # Errors
    ///
    /// [`SampleError::OutOfRange`] if `t` lies outside the integrated
    /// span. The request is rejected, never clamped or extrapolated.
    pub fn sample_at(&self, t: f64) -> Result<[f64; N], SampleError> {
        // Negated form so a NaN request is rejected, not interpolated
        if !(t >= self.t_start() && t <= self.t_end()) {
            return Err(SampleError::OutOfRange {
                t,
                t_start: self.t_start(),
                t_end: self.t_end(),
            });
        }

        // First step whose t_end reaches t; in range, so idx < len
        let idx = self.steps.partition_point(|s| s.t_end < t);
        Ok(self.steps[idx].eval(t))
    }

    /// Evaluate the solution at each requested time, in request order
    ///
    /// Times need not be sorted or unique; each is resolved
    /// independently, so the result for a given time does not depend on
    /// its position in the request.
    ///
    /// # Errors
    ///
    /// [`SampleError::OutOfRange`] on the first request outside the
    /// integrated span.
    pub fn sample(&self, times: &[f64]) -> Result<Vec<[f64; N]>, SampleError> {
        times.iter().map(|&t| self.sample_at(t)).collect()
    }
}

/// Errors from sampling a completed trajectory
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    /// A requested time lies outside the integrated span
    #[error("requested time {t} outside integrated span [{t_start}, {t_end}]")]
    OutOfRange {
        /// The offending requested time
        t: f64,
        /// Start of the integrated span
        t_start: f64,
        /// End of the integrated span
        t_end: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::C;
    use approx::assert_abs_diff_eq;

    /// Build a single step with stage derivatives from a pure-time RHS,
    /// for which k_i = f(t_start + c_i * h) exactly.
    fn step_from_rhs<F: Fn(f64) -> f64>(t0: f64, t1: f64, y0: f64, y1: f64, f: F) -> Step<1> {
        let h = t1 - t0;
        let mut k = [[0.0; 1]; STAGES];
        for (i, ki) in k.iter_mut().enumerate() {
            ki[0] = f(t0 + C[i] * h);
        }
        Step::new(t0, t1, [y0], [y1], k)
    }

    #[test]
    fn test_eval_endpoints_exact() {
        let step = step_from_rhs(0.0, 1.0, 0.25, 1.25, |_| 1.0);
        assert_eq!(step.eval(0.0), [0.25]);
        assert_eq!(step.eval(1.0), [1.25]);
        // Outside the step clamps to the stored endpoints
        assert_eq!(step.eval(-0.5), [0.25]);
        assert_eq!(step.eval(1.5), [1.25]);
    }

    #[test]
    fn test_eval_reproduces_linear() {
        // y' = 1 over [0, 1]: interpolant must return y(t) = t exactly
        let step = step_from_rhs(0.0, 1.0, 0.0, 1.0, |_| 1.0);
        for t in [0.1, 0.25, 0.5, 0.75, 0.9] {
            assert_abs_diff_eq!(step.eval(t)[0], t, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_eval_reproduces_quadratic_and_cubic() {
        // y' = 2t: y = t², and y' = 3t²: y = t³. The quartic interpolant
        // reproduces both without truncation error.
        let quad = step_from_rhs(0.0, 1.0, 0.0, 1.0, |t| 2.0 * t);
        let cubic = step_from_rhs(0.0, 1.0, 0.0, 1.0, |t| 3.0 * t * t);
        for t in [0.2, 0.5, 0.8] {
            assert_abs_diff_eq!(quad.eval(t)[0], t * t, epsilon = 1e-12);
            assert_abs_diff_eq!(cubic.eval(t)[0], t * t * t, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_eval_offset_step() {
        // Same linear problem shifted to [3, 5]: y(t) = t - 3
        let step = step_from_rhs(3.0, 5.0, 0.0, 2.0, |_| 1.0);
        assert_abs_diff_eq!(step.eval(3.7)[0], 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(step.eval(4.5)[0], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_length_step() {
        let step = Step::new(2.0, 2.0, [7.0], [7.0], [[0.0; 1]; STAGES]);
        assert_eq!(step.eval(2.0), [7.0]);
        assert_eq!(step.h(), 0.0);
        assert!(step.contains(2.0));
    }

    fn two_step_trajectory() -> Trajectory<1> {
        // y' = 1, y(0) = 0, split as [0, 1] and [1, 3]
        let mut trajectory = Trajectory::new();
        trajectory.push(step_from_rhs(0.0, 1.0, 0.0, 1.0, |_| 1.0));
        trajectory.push(step_from_rhs(1.0, 3.0, 1.0, 3.0, |_| 1.0));
        trajectory
    }

    #[test]
    fn test_sample_locates_correct_step() {
        let trajectory = two_step_trajectory();
        assert_abs_diff_eq!(trajectory.sample_at(0.5).unwrap()[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(trajectory.sample_at(2.0).unwrap()[0], 2.0, epsilon = 1e-12);
        // Shared boundary returns the stored state exactly
        assert_eq!(trajectory.sample_at(1.0).unwrap(), [1.0]);
    }

    #[test]
    fn test_sample_span_endpoints_exact() {
        let trajectory = two_step_trajectory();
        assert_eq!(trajectory.sample_at(0.0).unwrap(), *trajectory.initial_state());
        assert_eq!(trajectory.sample_at(3.0).unwrap(), *trajectory.final_state());
    }

    #[test]
    fn test_sample_order_independence() {
        let trajectory = two_step_trajectory();
        let forward = trajectory.sample(&[0.5, 2.5]).unwrap();
        let backward = trajectory.sample(&[2.5, 0.5]).unwrap();
        assert_eq!(forward[0], backward[1]);
        assert_eq!(forward[1], backward[0]);
    }

    #[test]
    fn test_sample_duplicates_and_unsorted() {
        let trajectory = two_step_trajectory();
        let samples = trajectory.sample(&[2.0, 0.5, 2.0, 0.0]).unwrap();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], samples[2]);
        assert_eq!(samples[3], [0.0]);
    }

    #[test]
    fn test_sample_out_of_range_rejected() {
        let trajectory = two_step_trajectory();
        let below = trajectory.sample_at(-0.1);
        let above = trajectory.sample(&[1.0, 4.0]);
        assert!(matches!(below, Err(SampleError::OutOfRange { .. })));
        assert!(matches!(above, Err(SampleError::OutOfRange { t, .. }) if t == 4.0));
    }

    #[test]
    fn test_sample_nan_time_rejected() {
        // NaN compares false to every bound, so it must hit the range
        // guard, never the interpolant
        let trajectory = two_step_trajectory();
        assert!(matches!(
            trajectory.sample_at(f64::NAN),
            Err(SampleError::OutOfRange { .. })
        ));
        assert!(trajectory.sample(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_trajectory_accessors() {
        let trajectory = two_step_trajectory();
        assert_eq!(trajectory.len(), 2);
        assert!(!trajectory.is_empty());
        assert_eq!(trajectory.t_start(), 0.0);
        assert_eq!(trajectory.t_end(), 3.0);
        assert_eq!(trajectory.steps()[1].t_start, 1.0);
    }
}
