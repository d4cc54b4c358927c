//! Candidate coefficients on non-uniform axes.
//!
//! On a stretched axis the candidate reconstruction weights depend on the
//! actual element widths around every flux point. They are solved once per
//! flux point, bias and reduced order when the scheme is built and looked
//! up by index afterwards. Optimal weights and smoothness forms keep their
//! uniform values.

use super::weno::{CandidateCoefficients, MAX_WENO_ORDER, point_value_coefficients};
use crate::grid::AxisCoordinates;
use crate::types::Location;

/// Coefficients of one flux point, indexed by `order - 1`.
#[derive(Clone, Debug, PartialEq)]
struct FluxPointCoefficients {
    left: Vec<CandidateCoefficients>,
    right: Vec<CandidateCoefficients>,
}

/// Stretched-grid candidate coefficients along one axis, for values at one
/// staggering.
///
/// Flux points of center values are faces; flux points of face values are
/// centers. Points `0 ..= N+1` are stored.
#[derive(Clone, Debug, PartialEq)]
pub struct StretchedWenoCoefficients {
    loc: Location,
    points: Vec<FluxPointCoefficients>,
}

impl StretchedWenoCoefficients {
    /// Solve coefficients for every order up to `max_order`.
    pub fn new(coords: &AxisCoordinates, loc: Location, max_order: usize) -> Self {
        let n_points = coords.n() as isize + 1;
        let points = (0..=n_points)
            .map(|p| FluxPointCoefficients {
                left: (1..=max_order).map(|n| Self::solve(coords, loc, p, n, false)).collect(),
                right: (1..=max_order).map(|n| Self::solve(coords, loc, p, n, true)).collect(),
            })
            .collect();
        Self { loc, points }
    }

    /// Staggering of the reconstructed values.
    #[inline]
    pub fn loc(&self) -> Location {
        self.loc
    }

    /// Coefficients at flux point `p`, if stored.
    #[inline]
    pub fn get(&self, p: isize, order: usize, right_biased: bool) -> Option<&CandidateCoefficients> {
        let point = self.points.get(usize::try_from(p).ok()?)?;
        let table = if right_biased { &point.right } else { &point.left };
        table.get(order.checked_sub(1)?)
    }

    /// Element `m` bounds along the axis.
    fn element(coords: &AxisCoordinates, loc: Location, m: isize) -> (f64, f64) {
        match loc {
            Location::Center => (coords.face(m), coords.face(m + 1)),
            Location::Face => (coords.center(m - 1), coords.center(m)),
        }
    }

    fn solve(coords: &AxisCoordinates, loc: Location, p: isize, n: usize, right: bool) -> CandidateCoefficients {
        let x_p = match loc {
            Location::Center => coords.face(p),
            Location::Face => coords.center(p),
        };
        let off = match loc {
            Location::Center => -1,
            Location::Face => 0,
        };
        let ni = n as isize;
        // Stencil position s -> element index and upwind-positive-downwind bounds.
        let bounds = |s: isize| {
            if right {
                let m = p + off + 1 + (ni - 1) - s;
                let (lo, hi) = Self::element(coords, loc, m);
                (x_p - hi, x_p - lo)
            } else {
                let m = p + off - (ni - 1) + s;
                let (lo, hi) = Self::element(coords, loc, m);
                (lo - x_p, hi - x_p)
            }
        };

        let mut c = [[0.0; MAX_WENO_ORDER]; MAX_WENO_ORDER];
        for (r, row) in c.iter_mut().enumerate().take(n) {
            let first = ni - 1 - r as isize;
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(bounds(first).0);
            for t in 0..ni {
                edges.push(bounds(first + t).1);
            }
            for (t, v) in point_value_coefficients(&edges).into_iter().enumerate() {
                row[t] = v;
            }
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advection::weno::WenoTables;
    use crate::grid::Spacing;
    use crate::types::{Axis, Topology};
    use approx::assert_relative_eq;

    fn axis(spacing: Spacing) -> AxisCoordinates {
        AxisCoordinates::new(Axis::X, 12, 3, Topology::Bounded, &spacing).unwrap()
    }

    #[test]
    fn test_uniform_axis_recovers_uniform_tables() {
        let ax = axis(Spacing::Uniform { start: 0.0, end: 12.0 });
        let s = StretchedWenoCoefficients::new(&ax, Location::Center, 3);
        let uniform = WenoTables::new(3).unwrap();
        for right in [false, true] {
            let c = s.get(6, 3, right).unwrap();
            for r in 0..3 {
                for t in 0..3 {
                    assert_relative_eq!(c[r][t], uniform.candidate()[r][t], epsilon = 1e-10);
                }
            }
        }
    }

    #[test]
    fn test_stretched_coefficients_are_consistent() {
        let faces: Vec<f64> = (0..=12).map(|i| (i as f64 / 12.0).powi(2)).collect();
        let ax = axis(Spacing::Stretched(faces));
        let s = StretchedWenoCoefficients::new(&ax, Location::Center, 3);
        for p in 2..=11 {
            for right in [false, true] {
                let c = s.get(p, 3, right).unwrap();
                for row in c.iter().take(3) {
                    let sum: f64 = row[..3].iter().sum();
                    assert_relative_eq!(sum, 1.0, epsilon = 1e-10);
                }
            }
        }
        assert!(s.get(40, 3, false).is_none());
        assert!(s.get(-1, 3, false).is_none());
    }
}
