//! Basic DOPRI5 usage — harmonic oscillator.
//!
//! Integrates y'' + ω²y = 0 for one period, compares the final state
//! with the exact solution, and checks a few dense-output samples.
//!
//! Run with:
//!   cargo run --example harmonic_oscillator

use dopri5::{Dopri5, OdeSystem, Tolerances};

/// Simple harmonic oscillator: y'' + ω²y = 0
///
/// State vector: [y, y']
struct HarmonicOscillator {
    omega: f64,
}

impl OdeSystem<2> for HarmonicOscillator {
    fn rhs(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) {
        dydt[0] = y[1];
        dydt[1] = -self.omega * self.omega * y[0];
    }
}

fn main() {
    let omega = 2.0;
    let sys = HarmonicOscillator { omega };

    // Integrate for one full period: T = 2π/ω
    let period = 2.0 * std::f64::consts::PI / omega;
    let y0 = [1.0, 0.0]; // y(0) = 1, y'(0) = 0

    let mut solver = Dopri5::new(Tolerances::new(1e-9, 1e-9));
    let trajectory = solver
        .integrate(&sys, 0.0, &y0, period, None)
        .expect("integration failed");

    // Exact solution: y(t) = cos(ωt), y'(t) = -ω sin(ωt)
    let yf = trajectory.final_state();
    let y_exact = (omega * period).cos();
    let v_exact = -omega * (omega * period).sin();

    println!("Harmonic Oscillator (ω = {omega})");
    println!("  Period:      {period:.6} s");
    println!();
    println!("  y(T)  = {:.15}   (exact: {:.15})", yf[0], y_exact);
    println!("  y'(T) = {:.15}   (exact: {:.15})", yf[1], v_exact);
    println!();
    println!("  Position error: {:.2e}", (yf[0] - y_exact).abs());
    println!("  Velocity error: {:.2e}", (yf[1] - v_exact).abs());
    println!();

    // Dense output at quarter periods, far from the internal step grid
    println!("  Dense-output samples:");
    for i in 1..4 {
        let t = period * i as f64 / 4.0;
        let y = trajectory.sample_at(t).expect("sample in range");
        let exact = (omega * t).cos();
        println!(
            "    y({:.4}) = {:>12.9}   (exact {:>12.9}, err {:.2e})",
            t,
            y[0],
            exact,
            (y[0] - exact).abs()
        );
    }

    println!();
    println!("  Accepted steps: {}", solver.stats.accepted_steps);
    println!("  Rejected steps: {}", solver.stats.rejected_steps);
    println!("  Function evals: {}", solver.stats.fn_evals);
}
