//! Logically rectangular grids.

use tracing::debug;

use super::coordinates::{AxisCoordinates, Spacing};
use super::metrics::{Geometry, GridMetrics};
use crate::error::ConfigurationError;
use crate::types::{Axis, Loc3, Location, Topology};

/// Largest extent supported along any axis.
///
/// Index arithmetic on halo-padded fields is done in `isize`, and the
/// widest packed active-cell tier is `u64`; `2^48` keeps both comfortable.
pub const MAX_SUPPORTED_EXTENT: usize = 1 << 48;

/// A structured grid with per-axis coordinates.
///
/// Immutable once built. Flat axes are stored with one cell and no halo.
#[derive(Clone, Debug)]
pub struct RectilinearGrid {
    x: AxisCoordinates,
    y: AxisCoordinates,
    z: AxisCoordinates,
    geometry: Geometry,
}

impl RectilinearGrid {
    /// Build a grid from per-axis specifications.
    pub fn new(
        size: [usize; 3],
        halo: [usize; 3],
        topology: [Topology; 3],
        spacing: [Spacing; 3],
        geometry: Geometry,
    ) -> Result<Self, ConfigurationError> {
        for axis in Axis::ALL {
            let n = size[axis.index()];
            if n > MAX_SUPPORTED_EXTENT {
                return Err(ConfigurationError::ExtentTooLarge {
                    axis,
                    extent: n,
                    max: MAX_SUPPORTED_EXTENT,
                });
            }
            let h = halo[axis.index()];
            if topology[axis.index()] == Topology::Periodic && h > n && n > 0 {
                debug!(%axis, n, h, "periodic halo wider than the interior wraps more than once");
            }
        }
        if topology[2] == Topology::Periodic {
            return Err(ConfigurationError::Invalid(
                "the vertical axis cannot be periodic".into(),
            ));
        }
        if let Geometry::LatitudeLongitude { radius } = geometry {
            if !(radius > 0.0) {
                return Err(ConfigurationError::Invalid(format!(
                    "sphere radius must be positive, got {radius}"
                )));
            }
        }

        let [sx, sy, sz] = spacing;
        let x = AxisCoordinates::new(Axis::X, size[0], halo[0], topology[0], &sx)?;
        let y = AxisCoordinates::new(Axis::Y, size[1], halo[1], topology[1], &sy)?;
        let z = AxisCoordinates::new(Axis::Z, size[2], halo[2], topology[2], &sz)?;

        Ok(Self { x, y, z, geometry })
    }

    /// Uniform Cartesian grid on `[0, Lx] × [0, Ly] × [-Lz, 0]`.
    ///
    /// # Example
    ///
    /// ```
    /// use fv_ocean::grid::{GridMetrics, RectilinearGrid};
    /// use fv_ocean::types::{Loc3, Topology};
    ///
    /// let grid = RectilinearGrid::uniform(
    ///     [10, 10, 4],
    ///     [3, 3, 3],
    ///     [1000.0, 1000.0, 40.0],
    ///     [Topology::Periodic, Topology::Bounded, Topology::Bounded],
    /// )?;
    /// assert_eq!(grid.size(), [10, 10, 4]);
    /// assert!((grid.dz(1, 1, 1, Loc3::CCC) - 10.0).abs() < 1e-12);
    /// # Ok::<(), fv_ocean::ConfigurationError>(())
    /// ```
    pub fn uniform(
        size: [usize; 3],
        halo: [usize; 3],
        extent: [f64; 3],
        topology: [Topology; 3],
    ) -> Result<Self, ConfigurationError> {
        Self::new(
            size,
            halo,
            topology,
            [
                Spacing::Uniform {
                    start: 0.0,
                    end: extent[0],
                },
                Spacing::Uniform {
                    start: 0.0,
                    end: extent[1],
                },
                Spacing::Uniform {
                    start: -extent[2],
                    end: 0.0,
                },
            ],
            Geometry::Cartesian,
        )
    }

    /// Coordinates along an axis.
    #[inline]
    pub fn axis(&self, axis: Axis) -> &AxisCoordinates {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Total number of interior cells.
    pub fn n_cells(&self) -> usize {
        self.x.n() * self.y.n() * self.z.n()
    }

    /// Whether every non-flat axis has uniform spacing.
    pub fn is_uniform(&self) -> bool {
        self.x.is_uniform() && self.y.is_uniform() && self.z.is_uniform()
    }

    /// The sub-grid covering interior cells `offset+1 ..= offset+n` along
    /// `axis`, tagged with `topology` on that axis.
    pub fn subgrid(
        &self,
        axis: Axis,
        offset: usize,
        n: usize,
        topology: Topology,
    ) -> Result<Self, ConfigurationError> {
        let ax = self.axis(axis);
        if offset + n > ax.n() {
            return Err(ConfigurationError::Invalid(format!(
                "subgrid {}..{} exceeds the {axis} extent {}",
                offset + 1,
                offset + n,
                ax.n()
            )));
        }
        let rebuilt = ax.window(offset, n, topology);
        let mut grid = self.clone();
        match axis {
            Axis::X => grid.x = rebuilt,
            Axis::Y => grid.y = rebuilt,
            Axis::Z => grid.z = rebuilt,
        }
        Ok(grid)
    }

    #[inline]
    fn deg2rad(d: f64) -> f64 {
        d * std::f64::consts::PI / 180.0
    }
}

impl GridMetrics for RectilinearGrid {
    #[inline]
    fn size(&self) -> [usize; 3] {
        [self.x.n(), self.y.n(), self.z.n()]
    }

    #[inline]
    fn halo(&self) -> [usize; 3] {
        [self.x.halo(), self.y.halo(), self.z.halo()]
    }

    #[inline]
    fn topology(&self) -> [Topology; 3] {
        [self.x.topology(), self.y.topology(), self.z.topology()]
    }

    #[inline]
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[inline]
    fn node(&self, axis: Axis, loc: Location, idx: isize) -> f64 {
        self.axis(axis).node(loc, idx)
    }

    #[inline]
    fn dx(&self, i: isize, j: isize, _k: isize, loc: Loc3) -> f64 {
        let d = self.x.spacing(loc.x, i);
        match self.geometry {
            Geometry::Cartesian => d,
            Geometry::LatitudeLongitude { radius } => {
                if self.x.topology().is_flat() {
                    return d;
                }
                let phi = Self::deg2rad(self.y.node(loc.y, j));
                radius * phi.cos() * Self::deg2rad(d)
            }
        }
    }

    #[inline]
    fn dy(&self, _i: isize, j: isize, _k: isize, loc: Loc3) -> f64 {
        let d = self.y.spacing(loc.y, j);
        match self.geometry {
            Geometry::Cartesian => d,
            Geometry::LatitudeLongitude { radius } => {
                if self.y.topology().is_flat() {
                    d
                } else {
                    radius * Self::deg2rad(d)
                }
            }
        }
    }

    #[inline]
    fn dz(&self, _i: isize, _j: isize, k: isize, loc: Loc3) -> f64 {
        self.z.spacing(loc.z, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> RectilinearGrid {
        RectilinearGrid::uniform(
            [8, 4, 2],
            [3, 3, 1],
            [8.0, 4.0, 2.0],
            [Topology::Periodic, Topology::Bounded, Topology::Bounded],
        )
        .unwrap()
    }

    #[test]
    fn test_uniform_metrics() {
        let grid = channel();
        assert_eq!(grid.n_cells(), 64);
        assert!((grid.volume(1, 1, 1, Loc3::CCC) - 1.0).abs() < 1e-14);
        assert!((grid.area(Axis::X, 3, 2, 1, Loc3::FCC) - 1.0).abs() < 1e-14);
        assert!((grid.node(Axis::Z, Location::Center, 1) + 1.5).abs() < 1e-14);
        assert!(grid.is_uniform());
    }

    #[test]
    fn test_latitude_longitude_metrics_shrink_poleward() {
        let grid = RectilinearGrid::new(
            [36, 18, 1],
            [2, 2, 1],
            [Topology::Periodic, Topology::Bounded, Topology::Bounded],
            [
                Spacing::Uniform { start: 0.0, end: 360.0 },
                Spacing::Uniform { start: -90.0, end: 90.0 },
                Spacing::Uniform { start: -100.0, end: 0.0 },
            ],
            Geometry::LatitudeLongitude { radius: 6.371e6 },
        )
        .unwrap();
        let equator = grid.dx(1, 9, 1, Loc3::CCC);
        let polar = grid.dx(1, 18, 1, Loc3::CCC);
        assert!(polar < equator);
        let dy = grid.dy(1, 9, 1, Loc3::CCC);
        assert!((dy - 6.371e6 * 10.0_f64.to_radians()).abs() < 1e-6);
        assert!(grid.geometry().is_curvilinear());
    }

    #[test]
    fn test_extent_limit() {
        let err = RectilinearGrid::uniform(
            [MAX_SUPPORTED_EXTENT + 1, 1, 1],
            [1, 1, 1],
            [1.0, 1.0, 1.0],
            [Topology::Bounded, Topology::Flat, Topology::Flat],
        );
        assert!(matches!(err, Err(ConfigurationError::ExtentTooLarge { .. })));
    }

    #[test]
    fn test_subgrid_keeps_coordinates() {
        let grid = channel();
        let sub = grid.subgrid(Axis::X, 4, 4, Topology::Connected).unwrap();
        assert_eq!(sub.size(), [4, 4, 2]);
        assert!((sub.node(Axis::X, Location::Face, 1) - 4.0).abs() < 1e-14);
        assert_eq!(sub.topology()[0], Topology::Connected);
        // Halo cells keep the neighbouring rank's coordinates.
        assert!((sub.node(Axis::X, Location::Center, 0) - 3.5).abs() < 1e-14);
    }

    #[test]
    fn test_periodic_vertical_rejected() {
        let err = RectilinearGrid::uniform(
            [4, 4, 4],
            [1, 1, 1],
            [1.0, 1.0, 1.0],
            [Topology::Periodic, Topology::Periodic, Topology::Periodic],
        );
        assert!(err.is_err());
    }
}
