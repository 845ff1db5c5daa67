//! Bicycle-model trajectory under constant steering.
//!
//! Integrates the kinematic bicycle model
//!
//!   x' = v cos θ,  y' = v sin θ,  θ' = v tan(u) / L
//!
//! for a constant steering input and samples the path on an even grid.
//! The printed columns are ready for any external plotting tool.
//!
//! Run with:
//!   cargo run --example bicycle_trajectory

use dopri5::{Dopri5, OdeSystem, Tolerances};

/// Kinematic bicycle model with constant steering input.
///
/// State vector: [x, y, θ]  (m, m, rad)
struct Bicycle {
    /// Forward speed v (m/s)
    speed: f64,
    /// Wheelbase L (m)
    wheelbase: f64,
    /// Steering angle u (rad)
    steering: f64,
}

impl OdeSystem<3> for Bicycle {
    fn rhs(&self, _t: f64, z: &[f64; 3], dzdt: &mut [f64; 3]) {
        dzdt[0] = self.speed * z[2].cos();
        dzdt[1] = self.speed * z[2].sin();
        dzdt[2] = self.speed * self.steering.tan() / self.wheelbase;
    }
}

fn main() {
    let sys = Bicycle {
        speed: 5.0,                        // 5 m/s
        wheelbase: 2.3,                    // 2.3 m
        steering: -2.0_f64.to_radians(),   // -2 degrees
    };

    // z(0) = [x(0), y(0), θ(0)]
    let z0 = [0.0, 0.3, 5.0];
    let t_final = 2.0;

    let mut solver = Dopri5::new(Tolerances::default());
    let trajectory = solver
        .integrate(&sys, 0.0, &z0, t_final, None)
        .expect("integration failed");

    // Sample on an even 21-point grid, independent of the step grid
    let n = 20;
    let times: Vec<f64> = (0..=n).map(|i| t_final * i as f64 / n as f64).collect();
    let samples = trajectory.sample(&times).expect("sampling failed");

    println!("Bicycle trajectory (v = 5 m/s, L = 2.3 m, u = -2°)");
    println!();
    println!("{:>8} {:>12} {:>12} {:>12}", "t (s)", "x (m)", "y (m)", "θ (rad)");
    for (t, z) in times.iter().zip(samples.iter()) {
        println!("{:>8.2} {:>12.6} {:>12.6} {:>12.6}", t, z[0], z[1], z[2]);
    }

    println!();
    println!("  Internal steps:  {}", trajectory.len());
    println!("  Accepted steps:  {}", solver.stats.accepted_steps);
    println!("  Rejected steps:  {}", solver.stats.rejected_steps);
    println!("  Function evals:  {}", solver.stats.fn_evals);
}
