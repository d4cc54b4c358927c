//! Advection schemes and upwind-biased interpolation on a grid.
//!
//! [`AdvectionScheme::biased_interpolate`] is the single entry point used by
//! every operator: it gathers the stencil of values around a flux point,
//! picks the bias from the sign of the advecting velocity, and reduces the
//! WENO order where the stencil would touch inactive cells.
//!
//! # Topologically conditional order
//!
//! At a flux point the order used is the largest `n <= N` such that every
//! element of *both* biased stencils of order `n` is active. Moving toward
//! a solid cell or a bounded edge therefore never increases the order, and
//! a flux point touching an inactive element falls back to first-order
//! upwinding.

use tracing::warn;

use super::stretched::StretchedWenoCoefficients;
use super::weno::{MAX_STENCIL, MAX_WENO_ORDER, Smoothness, WenoTables, WenoVariant};
use crate::error::ConfigurationError;
use crate::grid::{GridMetrics, RectilinearGrid};
use crate::immersed::ImmersedMetrics;
use crate::types::{Axis, Loc3, Location};

/// Where smoothness is sensed, as element-index getters along the
/// reconstruction axis.
#[derive(Clone, Copy)]
pub enum SmoothnessSource<'a> {
    Scalar,
    VelocityBlended {
        u: &'a dyn Fn(isize) -> f64,
        v: &'a dyn Fn(isize) -> f64,
    },
    Function {
        psi: &'a dyn Fn(isize) -> f64,
    },
}

/// WENO scheme of a fixed maximum order.
#[derive(Clone, Debug, PartialEq)]
pub struct WenoScheme {
    order: usize,
    variant: WenoVariant,
    /// Tables for orders `1..=order`, index `n - 1`.
    tables: Vec<WenoTables>,
    /// Per axis: coefficients for center values and face values on
    /// stretched axes.
    stretched: [Option<[StretchedWenoCoefficients; 2]>; 3],
}

impl WenoScheme {
    /// Uniform-grid WENO of order `order` (stencil width `2 * order - 1`).
    ///
    /// # Example
    ///
    /// ```
    /// use fv_ocean::advection::{WenoScheme, WenoVariant};
    ///
    /// let weno5 = WenoScheme::new(3, WenoVariant::Z)?;
    /// assert_eq!(weno5.required_halo(), 3);
    /// assert!(WenoScheme::new(9, WenoVariant::Plain).is_err());
    /// # Ok::<(), fv_ocean::ConfigurationError>(())
    /// ```
    pub fn new(order: usize, variant: WenoVariant) -> Result<Self, ConfigurationError> {
        if !(1..=MAX_WENO_ORDER).contains(&order) {
            return Err(ConfigurationError::UnsupportedWenoOrder {
                order,
                min: 1,
                max: MAX_WENO_ORDER,
            });
        }
        let tables = (1..=order).map(WenoTables::new).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            order,
            variant,
            tables,
            stretched: [None, None, None],
        })
    }

    /// WENO with candidate coefficients solved for the grid's stretched axes.
    pub fn stretched(order: usize, variant: WenoVariant, grid: &RectilinearGrid) -> Result<Self, ConfigurationError> {
        let mut scheme = Self::new(order, variant)?;
        for axis in Axis::ALL {
            let coords = grid.axis(axis);
            if coords.is_uniform() || coords.topology().is_flat() {
                continue;
            }
            scheme.stretched[axis.index()] = Some([
                StretchedWenoCoefficients::new(coords, Location::Center, order),
                StretchedWenoCoefficients::new(coords, Location::Face, order),
            ]);
        }
        Ok(scheme)
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn variant(&self) -> WenoVariant {
        self.variant
    }

    /// Tables of a reduced order `n <= order`.
    #[inline]
    pub fn tables(&self, n: usize) -> &WenoTables {
        &self.tables[n.clamp(1, self.order) - 1]
    }

    /// Halo width needed by the full stencil.
    #[inline]
    pub fn required_halo(&self) -> usize {
        self.order
    }

    #[inline]
    fn stretched_for(&self, axis: Axis, loc: Location) -> Option<&StretchedWenoCoefficients> {
        self.stretched[axis.index()].as_ref().map(|s| match loc {
            Location::Center => &s[0],
            Location::Face => &s[1],
        })
    }
}

/// Advection scheme for tracers and momentum.
#[derive(Clone, Debug, PartialEq)]
pub enum AdvectionScheme {
    /// Second-order centered interpolation.
    Centered2,
    /// First-order upwinding.
    UpwindFirstOrder,
    /// Upwind-biased WENO.
    Weno(WenoScheme),
}

impl From<WenoScheme> for AdvectionScheme {
    fn from(w: WenoScheme) -> Self {
        Self::Weno(w)
    }
}

impl AdvectionScheme {
    /// Halo width needed by the scheme's widest stencil.
    pub fn required_halo(&self) -> usize {
        match self {
            Self::Centered2 | Self::UpwindFirstOrder => 1,
            Self::Weno(w) => w.required_halo(),
        }
    }

    /// Check that a grid carries enough halo for the scheme.
    ///
    /// Halo on a bounded axis is only read through the order fallback, but
    /// periodic and connected axes read full stencils.
    pub fn check_halo(&self, grid: &impl GridMetrics) -> Result<(), ConfigurationError> {
        let need = self.required_halo();
        for axis in Axis::ALL {
            if grid.is_flat(axis) {
                continue;
            }
            let h = grid.halo()[axis.index()];
            if h < need {
                warn!(%axis, halo = h, required = need, "halo narrower than the advection stencil");
                return Err(ConfigurationError::insufficient_halo(axis, h, need, "advection scheme"));
            }
        }
        Ok(())
    }

    /// Value at a flux point, upwind-biased by `velocity`.
    ///
    /// `loc` is the staggering of the interpolated values and `(i, j, k)`
    /// the flux point, which differs from `loc` along `axis`. `value(m)`
    /// returns the element with index `m` along `axis`.
    #[allow(clippy::too_many_arguments)]
    pub fn biased_interpolate<G: ImmersedMetrics + ?Sized>(
        &self,
        grid: &G,
        axis: Axis,
        loc: Loc3,
        (i, j, k): (isize, isize, isize),
        velocity: f64,
        value: &dyn Fn(isize) -> f64,
        smoothness: SmoothnessSource<'_>,
    ) -> f64 {
        let p = [i, j, k][axis.index()];
        // Left-biased target element.
        let target = match loc.along(axis) {
            Location::Center => p - 1,
            Location::Face => p,
        };
        let right = velocity < 0.0;
        match self {
            Self::Centered2 => 0.5 * (value(target) + value(target + 1)),
            Self::UpwindFirstOrder => {
                if right {
                    value(target + 1)
                } else {
                    value(target)
                }
            }
            Self::Weno(w) => {
                let n = conditional_order(grid, axis, loc, (i, j, k), target, w.order);
                if n == 1 {
                    return if right { value(target + 1) } else { value(target) };
                }
                let ni = n as isize;
                let element = |s: isize| {
                    if right {
                        target + 1 + (ni - 1) - s
                    } else {
                        target - (ni - 1) + s
                    }
                };
                let gather = |f: &dyn Fn(isize) -> f64| {
                    let mut buf = [0.0; MAX_STENCIL];
                    for (s, out) in buf.iter_mut().enumerate().take(2 * n - 1) {
                        *out = f(element(s as isize));
                    }
                    buf
                };
                let stencil = gather(value);
                let candidate = w
                    .stretched_for(axis, loc.along(axis))
                    .and_then(|s| s.get(p, n, right));
                let tables = w.tables(n);
                match smoothness {
                    SmoothnessSource::Scalar => tables.reconstruct(w.variant, Smoothness::Scalar, &stencil, candidate),
                    SmoothnessSource::Function { psi } => {
                        let psi = gather(psi);
                        tables.reconstruct(w.variant, Smoothness::Function { psi: &psi }, &stencil, candidate)
                    }
                    SmoothnessSource::VelocityBlended { u, v } => {
                        let (u, v) = (gather(u), gather(v));
                        tables.reconstruct(
                            w.variant,
                            Smoothness::VelocityBlended { u: &u, v: &v },
                            &stencil,
                            candidate,
                        )
                    }
                }
            }
        }
    }
}

/// Largest order `n <= max_order` whose stencils around the flux point
/// only touch active elements.
///
/// `target` is the left-biased target element along `axis`; the union of
/// both stencils of order `n` is `target - n + 1 ..= target + n`.
pub fn conditional_order<G: ImmersedMetrics + ?Sized>(
    grid: &G,
    axis: Axis,
    loc: Loc3,
    (i, j, k): (isize, isize, isize),
    target: isize,
    max_order: usize,
) -> usize {
    let at = |m: isize| {
        let mut idx = [i, j, k];
        idx[axis.index()] = m;
        grid.inactive_node(loc, idx[0], idx[1], idx[2])
    };
    for d in 1..=max_order as isize {
        if at(target - d + 1) || at(target + d) {
            return (d as usize - 1).max(1);
        }
    }
    max_order
}
