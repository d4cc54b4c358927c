//! WENO reconstruction from a one-dimensional stencil.
//!
//! A stencil holds `2N - 1` values ordered from upwind to downwind. The
//! element at position `N - 1` is the *target*: the value is reconstructed
//! at its downwind edge. Candidate `r` (`0..N`) covers positions
//! `N-1-r ..= 2N-2-r`, so `r = 0` is the most downwind candidate and
//! `r = N-1` the most upwind one.
//!
//! All tables are derived at construction from cell-average interpolation
//! conditions on a unit-width grid:
//!
//! ```text
//! (1/h_t) ∫_{cell t} p_r(ξ) dξ = v_t        p_r of degree N - 1
//! q_r      = p_r(0)                          candidate value
//! β_r      = Σ_l ∫_{-1}^{0} (p_r^{(l)})² dξ  smoothness
//! Σ_r d_r q_r = p(0) of the full 2N-1 stencil
//! ```
//!
//! Nonlinear weights follow Jiang & Shu (`α = d / (β + ε)²`) or Borges et
//! al. (`α = d (1 + (τ / (β + ε))²)`). `ε` regularises smooth data where
//! every `β` vanishes; it is part of the scheme, not an error path.

use faer::{Mat, linalg::solvers::Solve};

use crate::error::ConfigurationError;

/// Highest supported reconstruction order.
pub const MAX_WENO_ORDER: usize = 6;

/// Widest stencil, `2 * MAX_WENO_ORDER - 1`.
pub const MAX_STENCIL: usize = 2 * MAX_WENO_ORDER - 1;

/// Regulariser in the nonlinear weights.
pub const WENO_EPSILON: f64 = 1e-8;

/// Candidate reconstruction coefficients, `[r][t]`.
pub type CandidateCoefficients = [[f64; MAX_WENO_ORDER]; MAX_WENO_ORDER];

/// Nonlinear weighting rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum WenoVariant {
    /// Jiang–Shu weights.
    #[default]
    Plain,
    /// Weights boosted by a global smoothness indicator `τ`.
    Z,
}

/// Where smoothness indicators are measured.
#[derive(Clone, Copy, Debug)]
pub enum Smoothness<'a> {
    /// On the reconstructed values themselves.
    Scalar,
    /// Average of the indicators of two velocity stencils.
    VelocityBlended { u: &'a [f64], v: &'a [f64] },
    /// On a separate stencil of auxiliary values.
    Function { psi: &'a [f64] },
}

// ============================================================================
// Table derivation
// ============================================================================

/// Inverse of the cell-average matrix for elements bounded by `edges`.
///
/// Row `q` of the result maps element averages to the `ξ^q` coefficient of
/// the interpolating polynomial.
fn cell_average_inverse(edges: &[f64]) -> Mat<f64> {
    let m = edges.len() - 1;
    let mut a = Mat::zeros(m, m);
    for t in 0..m {
        let (lo, hi) = (edges[t], edges[t + 1]);
        for q in 0..m {
            let p = (q + 1) as i32;
            a[(t, q)] = (hi.powi(p) - lo.powi(p)) / (p as f64 * (hi - lo));
        }
    }
    let lu = a.as_ref().full_piv_lu();
    let mut inv = Mat::zeros(m, m);
    for col in 0..m {
        let mut rhs = Mat::zeros(m, 1);
        rhs[(col, 0)] = 1.0;
        let sol = lu.solve(&rhs);
        for row in 0..m {
            inv[(row, col)] = sol[(row, 0)];
        }
    }
    inv
}

/// Coefficients reconstructing the value at `ξ = 0` from the averages of
/// the elements bounded by `edges`.
pub(crate) fn point_value_coefficients(edges: &[f64]) -> Vec<f64> {
    let inv = cell_average_inverse(edges);
    (0..edges.len() - 1).map(|t| inv[(0, t)]).collect()
}

/// Unit-width element edges of candidate `r` of order `n`.
fn uniform_candidate_edges(n: usize, r: usize) -> Vec<f64> {
    (0..=n).map(|t| t as f64 - r as f64 - 1.0).collect()
}

/// `Σ_l ∫_{-1}^{0} (d^l ξ^a)(d^l ξ^b) dξ` for `a, b < n`.
fn derivative_gram(n: usize) -> Mat<f64> {
    let falling = |q: usize, l: usize| ((q - l + 1)..=q).map(|x| x as f64).product::<f64>();
    let mut g = Mat::zeros(n, n);
    for a in 0..n {
        for b in 0..n {
            let mut s = 0.0;
            for l in 1..=a.min(b) {
                let e = (a - l) + (b - l);
                let sign = if e % 2 == 0 { 1.0 } else { -1.0 };
                let integral = sign / (e + 1) as f64;
                s += falling(a, l) * falling(b, l) * integral;
            }
            g[(a, b)] = s;
        }
    }
    g
}

/// Coefficients of `τ` per order, applied to `β_0 .. β_{N-1}`.
fn tau_coefficients(n: usize) -> [f64; MAX_WENO_ORDER] {
    let mut tau = [0.0; MAX_WENO_ORDER];
    let c: &[f64] = match n {
        2 => &[1.0, -1.0],
        3 => &[1.0, 0.0, -1.0],
        4 => &[1.0, 3.0, -3.0, -1.0],
        5 => &[1.0, 2.0, -6.0, 2.0, 1.0],
        6 => &[1.0, 36.0, 135.0, -135.0, -36.0, -1.0],
        _ => &[],
    };
    tau[..c.len()].copy_from_slice(c);
    tau
}

// ============================================================================
// Tables
// ============================================================================

/// Precomputed coefficients for one reconstruction order.
#[derive(Clone, Debug, PartialEq)]
pub struct WenoTables {
    order: usize,
    candidate: CandidateCoefficients,
    optimal: [f64; MAX_WENO_ORDER],
    /// Smoothness quadratic form of each candidate, `[r][t1][t2]`.
    beta: [[[f64; MAX_WENO_ORDER]; MAX_WENO_ORDER]; MAX_WENO_ORDER],
    tau: [f64; MAX_WENO_ORDER],
}

impl WenoTables {
    /// Derive the tables of one order.
    ///
    /// # Errors
    ///
    /// `UnsupportedWenoOrder` outside `1..=MAX_WENO_ORDER`.
    pub fn new(order: usize) -> Result<Self, ConfigurationError> {
        if !(1..=MAX_WENO_ORDER).contains(&order) {
            return Err(ConfigurationError::UnsupportedWenoOrder {
                order,
                min: 1,
                max: MAX_WENO_ORDER,
            });
        }
        let n = order;
        let mut candidate = [[0.0; MAX_WENO_ORDER]; MAX_WENO_ORDER];
        let mut beta = [[[0.0; MAX_WENO_ORDER]; MAX_WENO_ORDER]; MAX_WENO_ORDER];
        let gram = derivative_gram(n);

        for r in 0..n {
            let inv = cell_average_inverse(&uniform_candidate_edges(n, r));
            for t in 0..n {
                candidate[r][t] = inv[(0, t)];
            }
            // M = Ainv^T G Ainv
            for t1 in 0..n {
                for t2 in 0..n {
                    let mut s = 0.0;
                    for a in 0..n {
                        for b in 0..n {
                            s += inv[(a, t1)] * gram[(a, b)] * inv[(b, t2)];
                        }
                    }
                    beta[r][t1][t2] = s;
                }
            }
        }

        // Full stencil: positions s = 0..2N-1, element s spans [s-N, s-N+1].
        let full_edges: Vec<f64> = (0..=2 * n - 1).map(|s| s as f64 - n as f64).collect();
        let full = point_value_coefficients(&full_edges);

        // Position s = N-1-r+t of candidate r. Solve upwind to downwind.
        let mut optimal = [0.0; MAX_WENO_ORDER];
        for s in 0..n {
            let r = n - 1 - s;
            let mut rest = full[s];
            for (rr, d) in optimal.iter().enumerate().take(n).skip(r + 1) {
                let t = s + rr + 1 - n;
                rest -= d * candidate[rr][t];
            }
            optimal[r] = rest / candidate[r][0];
        }

        Ok(Self {
            order,
            candidate,
            optimal,
            beta,
            tau: tau_coefficients(n),
        })
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Uniform-grid candidate coefficients.
    #[inline]
    pub fn candidate(&self) -> &CandidateCoefficients {
        &self.candidate
    }

    /// Optimal linear weights `d_r`.
    #[inline]
    pub fn optimal_weights(&self) -> &[f64] {
        &self.optimal[..self.order]
    }

    /// Smoothness indicators of every candidate of a stencil.
    #[inline]
    pub fn smoothness(&self, stencil: &[f64]) -> [f64; MAX_WENO_ORDER] {
        let n = self.order;
        let mut b = [0.0; MAX_WENO_ORDER];
        for (r, out) in b.iter_mut().enumerate().take(n) {
            let sub = &stencil[n - 1 - r..2 * n - 1 - r];
            let form = &self.beta[r];
            let mut s = 0.0;
            for t1 in 0..n {
                let mut row = 0.0;
                for t2 in 0..n {
                    row += form[t1][t2] * sub[t2];
                }
                s += sub[t1] * row;
            }
            *out = s;
        }
        b
    }

    /// Normalised nonlinear weights from smoothness indicators.
    #[inline]
    pub fn weights(&self, variant: WenoVariant, beta: &[f64; MAX_WENO_ORDER]) -> [f64; MAX_WENO_ORDER] {
        let n = self.order;
        let mut w = [0.0; MAX_WENO_ORDER];
        match variant {
            WenoVariant::Plain => {
                for r in 0..n {
                    let b = beta[r] + WENO_EPSILON;
                    w[r] = self.optimal[r] / (b * b);
                }
            }
            WenoVariant::Z => {
                let tau: f64 = (0..n).map(|r| self.tau[r] * beta[r]).sum::<f64>().abs();
                for r in 0..n {
                    let q = tau / (beta[r] + WENO_EPSILON);
                    w[r] = self.optimal[r] * (1.0 + q * q);
                }
            }
        }
        let sum: f64 = w[..n].iter().sum();
        for x in &mut w[..n] {
            *x /= sum;
        }
        w
    }

    /// Reconstruct the downwind-edge value of the target element.
    ///
    /// `stencil` and any smoothness stencils have `2N - 1` entries ordered
    /// upwind to downwind. `candidate` overrides the uniform coefficients,
    /// for stretched grids.
    #[inline]
    pub fn reconstruct(
        &self,
        variant: WenoVariant,
        smoothness: Smoothness<'_>,
        stencil: &[f64],
        candidate: Option<&CandidateCoefficients>,
    ) -> f64 {
        let n = self.order;
        debug_assert!(stencil.len() >= 2 * n - 1);
        if n == 1 {
            return stencil[0];
        }
        let beta = match smoothness {
            Smoothness::Scalar => self.smoothness(stencil),
            Smoothness::Function { psi } => self.smoothness(psi),
            Smoothness::VelocityBlended { u, v } => {
                let (bu, bv) = (self.smoothness(u), self.smoothness(v));
                let mut b = [0.0; MAX_WENO_ORDER];
                for r in 0..n {
                    b[r] = 0.5 * (bu[r] + bv[r]);
                }
                b
            }
        };
        let w = self.weights(variant, &beta);
        let coeff = candidate.unwrap_or(&self.candidate);
        let mut value = 0.0;
        for r in 0..n {
            let sub = &stencil[n - 1 - r..2 * n - 1 - r];
            let q: f64 = (0..n).map(|t| coeff[r][t] * sub[t]).sum();
            value += w[r] * q;
        }
        value
    }
}
