//! Dormand-Prince 5(4) Coefficients
//!
//! Coefficients for the 7-stage embedded RK5(4) pair from:
//! Dormand, J.R. & Prince, P.J. (1980). "A family of embedded
//! Runge-Kutta formulae". Journal of Computational and Applied
//! Mathematics, 6(1), 19-26.
//!
//! This method provides a 5th-order solution with a 4th-order
//! embedded method for error estimation and adaptive step control,
//! plus a 4th-order continuous extension (dense output) built from
//! the same stage evaluations.

/// Number of stages in the Dormand-Prince 5(4) method
///
/// The 7th stage is the derivative at the step endpoint; it carries no
/// weight in the 5th-order solution but enters the error estimate and
/// the dense-output interpolant.
pub const STAGES: usize = 7;

/// Order of the higher-order method (used for advancing the solution)
pub const ORDER: u8 = 5;

/// Order of the embedded method (used for error estimation)
pub const EMBEDDED_ORDER: u8 = 4;

/// Degree of the dense-output polynomial in the normalized variable θ
pub const DENSE_DEGREE: usize = 4;

/// Node coefficients (c_i) - the points at which f(t,y) is evaluated
/// c[i] represents t_n + c[i]*h
pub const C: [f64; STAGES] = [
    0.0,        // c[0]
    1.0 / 5.0,  // c[1]
    3.0 / 10.0, // c[2]
    4.0 / 5.0,  // c[3]
    8.0 / 9.0,  // c[4]
    1.0,        // c[5]
    1.0,        // c[6]  (endpoint stage, FSAL in the classical formulation)
];

/// Runge-Kutta matrix (a_ij) coefficients
///
/// This is the lower-triangular matrix where:
/// k_i = f(t_n + c_i*h, y_n + h * sum_{j=0}^{i-1} a_{i,j} * k_j)
///
/// Stored as A[i][j] for row i, column j (j < i). The last row equals
/// the solution weights B, so k_6 is evaluated at the accepted endpoint.
pub const A: [[f64; 6]; STAGES] = [
    // Row 0: k_0 = f(t_n, y_n)
    [0.0; 6],
    // Row 1
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    // Row 2
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    // Row 3
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    // Row 4
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    // Row 5
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
    ],
    // Row 6: identical to B, so the stage point is the 5th-order solution
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];

/// Weights for the 5th-order solution (b_i)
///
/// y_{n+1} = y_n + h * sum_{i=0}^{6} b[i] * k_i
pub const B: [f64; STAGES] = [
    35.0 / 384.0,     // b[0]
    0.0,              // b[1]
    500.0 / 1113.0,   // b[2]
    125.0 / 192.0,    // b[3]
    -2187.0 / 6784.0, // b[4]
    11.0 / 84.0,      // b[5]
    0.0,              // b[6]
];

/// Error weights: B[i] - B_HAT[i]
///
/// The local truncation error estimate is:
/// err ≈ h * sum_{i=0}^{6} (b[i] - b_hat[i]) * k_i
///
/// where b_hat are the embedded 4th-order weights.
pub const E: [f64; STAGES] = [
    71.0 / 57600.0,      // e[0]
    0.0,                 // e[1]
    -71.0 / 16695.0,     // e[2]
    71.0 / 1920.0,       // e[3]
    -17253.0 / 339200.0, // e[4]
    22.0 / 525.0,        // e[5]
    -1.0 / 40.0,         // e[6]
];

/// Dense-output polynomial matrix
///
/// Within an accepted step, with θ = (t - t_n) / h ∈ [0, 1]:
///
/// y(θ) = y_n + h * sum_{i=0}^{6} k_i * p_i(θ)
/// p_i(θ) = sum_{j=0}^{3} P[i][j] * θ^(j+1)
///
/// The interpolant is 4th-order accurate, so interpolation error never
/// dominates the local truncation error the step controller accepted.
/// At θ = 1, sum_j P[i][j] = b_i, recovering the 5th-order endpoint.
pub const P: [[f64; DENSE_DEGREE]; STAGES] = [
    [
        1.0,
        -8048581381.0 / 2820520608.0,
        8663915743.0 / 2820520608.0,
        -12715105075.0 / 11282082432.0,
    ],
    [0.0, 0.0, 0.0, 0.0],
    [
        0.0,
        131558114200.0 / 32700410799.0,
        -68118460800.0 / 10900136933.0,
        87487479700.0 / 32700410799.0,
    ],
    [
        0.0,
        -1754552775.0 / 470086768.0,
        14199869525.0 / 1410260304.0,
        -10690763975.0 / 1880347072.0,
    ],
    [
        0.0,
        127303824393.0 / 49829197408.0,
        -318862633887.0 / 49829197408.0,
        701980252875.0 / 199316789632.0,
    ],
    [
        0.0,
        -282668133.0 / 205662961.0,
        2019193451.0 / 616988883.0,
        -1453857185.0 / 822651844.0,
    ],
    [
        0.0,
        40617522.0 / 29380423.0,
        -110615467.0 / 29380423.0,
        69997945.0 / 29380423.0,
    ],
];
