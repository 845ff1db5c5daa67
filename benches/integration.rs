use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dopri5::{Dopri5, OdeSystem, Tolerances};

/// Kinematic bicycle model (3-state)
struct Bicycle {
    speed: f64,
    wheelbase: f64,
    steering: f64,
}

impl OdeSystem<3> for Bicycle {
    fn rhs(&self, _t: f64, z: &[f64; 3], dzdt: &mut [f64; 3]) {
        dzdt[0] = self.speed * z[2].cos();
        dzdt[1] = self.speed * z[2].sin();
        dzdt[2] = self.speed * self.steering.tan() / self.wheelbase;
    }
}

/// Harmonic oscillator (2-state)
struct HarmonicOscillator {
    omega: f64,
}

impl OdeSystem<2> for HarmonicOscillator {
    fn rhs(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) {
        dydt[0] = y[1];
        dydt[1] = -self.omega * self.omega * y[0];
    }
}

fn bench_bicycle_integrate(c: &mut Criterion) {
    let sys = Bicycle {
        speed: 5.0,
        wheelbase: 2.3,
        steering: -2.0_f64.to_radians(),
    };
    let z0 = [0.0, 0.3, 5.0];

    c.bench_function("bicycle_integrate_2s", |b| {
        b.iter(|| {
            let mut solver = Dopri5::new(Tolerances::default());
            solver
                .integrate(&sys, 0.0, black_box(&z0), 2.0, None)
                .unwrap()
        })
    });
}

fn bench_bicycle_sample_grid(c: &mut Criterion) {
    let sys = Bicycle {
        speed: 5.0,
        wheelbase: 2.3,
        steering: -2.0_f64.to_radians(),
    };
    let z0 = [0.0, 0.3, 5.0];

    let mut solver = Dopri5::new(Tolerances::new(1e-9, 1e-9));
    let trajectory = solver.integrate(&sys, 0.0, &z0, 2.0, None).unwrap();
    let times: Vec<f64> = (0..=1000).map(|i| 2.0 * i as f64 / 1000.0).collect();

    c.bench_function("bicycle_sample_1000pts", |b| {
        b.iter(|| trajectory.sample(black_box(&times)).unwrap())
    });
}

fn bench_harmonic_oscillator_1period(c: &mut Criterion) {
    let omega = 1.0;
    let y0 = [1.0, 0.0];
    let period = 2.0 * std::f64::consts::PI;
    let sys = HarmonicOscillator { omega };

    c.bench_function("harmonic_oscillator_1period", |b| {
        b.iter(|| {
            let mut solver = Dopri5::new(Tolerances::new(1e-9, 1e-9));
            solver
                .integrate(&sys, 0.0, black_box(&y0), period, None)
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_bicycle_integrate,
    bench_bicycle_sample_grid,
    bench_harmonic_oscillator_1period
);
criterion_main!(benches);
