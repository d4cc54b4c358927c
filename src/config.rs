//! JSON run configuration.
//!
//! A [`RunConfig`] describes one run: the global grid, the advection
//! scheme, the closure and the horizontal rank layout. It is parsed with
//! `serde_json`, checked once by [`RunConfig::validate`], and then turned
//! into the grid, scheme, dynamics and partition the model is built from.
//!
//! ```json
//! {
//!   "grid": {
//!     "size": [64, 32, 16],
//!     "halo": [3, 3, 3],
//!     "extent": [64000.0, 32000.0, 1000.0],
//!     "topology": ["Periodic", "Bounded", "Bounded"]
//!   },
//!   "advection": { "order": 3, "variant": "Z" },
//!   "closure": { "SmagorinskyLilly": { "coefficient": 0.16, "prandtl": 1.0, "vertical": 1e-5 } },
//!   "partition": { "ranks": [4, 1] }
//! }
//! ```
//!
//! # Example
//!
//! ```
//! use fv_ocean::config::RunConfig;
//!
//! let config = RunConfig::from_json_str(
//!     r#"{
//!         "grid": {
//!             "size": [16, 8, 4],
//!             "halo": [3, 3, 3],
//!             "extent": [16.0, 8.0, 4.0],
//!             "topology": ["Periodic", "Periodic", "Bounded"]
//!         },
//!         "partition": { "ranks": [2, 1] }
//!     }"#,
//! )?;
//! assert_eq!(config.advection.order, 3);
//! assert_eq!(config.build_partition(1)?.coords(), [1, 0]);
//! # Ok::<(), fv_ocean::Error>(())
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::advection::{AdvectionScheme, MomentumForm, WenoScheme, WenoVariant};
use crate::closure::{ConstantDiffusivity, DiffusivityClosure, SmagorinskyLilly};
use crate::distributed::{DEFAULT_HALO_TIMEOUT, Partition};
use crate::error::{ConfigurationError, Result};
use crate::grid::{Geometry, RectilinearGrid, Spacing};
use crate::model::Dynamics;
use crate::types::Topology;

fn default_order() -> usize {
    3
}

fn default_ranks() -> [usize; 2] {
    [1, 1]
}

fn default_halo_timeout_ms() -> u64 {
    DEFAULT_HALO_TIMEOUT.as_millis() as u64
}

/// Global grid layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridConfig {
    /// Interior cells `[Nx, Ny, Nz]`.
    pub size: [usize; 3],
    /// Halo widths `[Hx, Hy, Hz]`.
    pub halo: [usize; 3],
    /// Cartesian: `[Lx, Ly, Lz]` in metres. Latitude-longitude: longitude
    /// and latitude spans in degrees, then depth in metres.
    pub extent: [f64; 3],
    pub topology: [Topology; 3],
    #[serde(default)]
    pub geometry: Geometry,
    /// South-west corner in degrees for latitude-longitude grids.
    #[serde(default)]
    pub origin: [f64; 2],
    /// Explicit vertical faces, bottom to top, overriding the uniform
    /// spacing from `extent[2]`.
    #[serde(default)]
    pub z_faces: Option<Vec<f64>>,
}

/// Advection scheme selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvectionConfig {
    #[serde(default)]
    pub scheme: SchemeKind,
    /// WENO order `N`; the stencil spans `2N - 1` cells.
    #[serde(default = "default_order")]
    pub order: usize,
    #[serde(default)]
    pub variant: WenoVariant,
    #[serde(default)]
    pub momentum: MomentumForm,
}

impl Default for AdvectionConfig {
    fn default() -> Self {
        Self {
            scheme: SchemeKind::default(),
            order: default_order(),
            variant: WenoVariant::default(),
            momentum: MomentumForm::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SchemeKind {
    #[default]
    Weno,
    Centered2,
    UpwindFirstOrder,
}

/// Ranks along `x` and `y`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartitionConfig {
    #[serde(default = "default_ranks")]
    pub ranks: [usize; 2],
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self { ranks: default_ranks() }
    }
}

/// Turbulence closure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ClosureConfig {
    Constant(ConstantDiffusivity),
    SmagorinskyLilly(SmagorinskyLilly),
}

impl Default for ClosureConfig {
    fn default() -> Self {
        Self::Constant(ConstantDiffusivity::default())
    }
}

impl ClosureConfig {
    fn required_halo(&self) -> usize {
        match self {
            Self::Constant(c) => c.required_halo(),
            Self::SmagorinskyLilly(c) => c.required_halo(),
        }
    }
}

/// Top-level run configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub grid: GridConfig,
    #[serde(default)]
    pub advection: AdvectionConfig,
    #[serde(default)]
    pub closure: ClosureConfig,
    #[serde(default)]
    pub partition: PartitionConfig,
    /// Tracer names, in storage order.
    #[serde(default)]
    pub tracers: Vec<String>,
    /// Tracer read as buoyancy by the hydrostatic pressure.
    #[serde(default)]
    pub buoyancy: Option<String>,
    /// Upper bound on a single halo wait.
    #[serde(default = "default_halo_timeout_ms")]
    pub halo_timeout_ms: u64,
}

impl RunConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        info!(path = %path.display(), size = ?config.grid.size, ranks = ?config.partition.ranks, "loaded run configuration");
        Ok(config)
    }

    /// Check everything that can be checked before any rank starts.
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        if self.advection.scheme == SchemeKind::Weno {
            WenoScheme::new(self.advection.order, self.advection.variant)?;
        }
        let grid = self.build_grid()?;
        let dynamics = self.build_dynamics(&grid)?;
        dynamics.advection.check_halo(&grid)?;
        dynamics.closure.check_halo(&grid)?;

        Partition::for_grid(self.partition.ranks, 0, &grid)?.validate(&grid)?;

        if let Some(b) = &self.buoyancy {
            if !self.tracers.contains(b) {
                return Err(ConfigurationError::Invalid(format!(
                    "buoyancy tracer '{b}' is not among the tracers {:?}",
                    self.tracers
                )));
            }
        }
        let mut names = self.tracers.clone();
        names.sort();
        names.dedup();
        if names.len() != self.tracers.len() {
            return Err(ConfigurationError::Invalid(format!(
                "tracer names must be unique, got {:?}",
                self.tracers
            )));
        }
        if self.halo_timeout_ms == 0 {
            return Err(ConfigurationError::Invalid("halo timeout must be positive".into()));
        }
        Ok(())
    }

    /// The global grid.
    pub fn build_grid(&self) -> std::result::Result<RectilinearGrid, ConfigurationError> {
        let g = &self.grid;
        let [lx, ly, lz] = g.extent;
        let [x0, y0] = match g.geometry {
            Geometry::Cartesian => [0.0, 0.0],
            Geometry::LatitudeLongitude { .. } => g.origin,
        };
        let z = match &g.z_faces {
            Some(faces) => Spacing::Stretched(faces.clone()),
            None => Spacing::Uniform { start: -lz, end: 0.0 },
        };
        RectilinearGrid::new(
            g.size,
            g.halo,
            g.topology,
            [
                Spacing::Uniform { start: x0, end: x0 + lx },
                Spacing::Uniform { start: y0, end: y0 + ly },
                z,
            ],
            g.geometry,
        )
    }

    /// The advection scheme, with stretched-grid coefficients where `grid`
    /// is not uniform.
    pub fn build_scheme(&self, grid: &RectilinearGrid) -> std::result::Result<AdvectionScheme, ConfigurationError> {
        let a = &self.advection;
        Ok(match a.scheme {
            SchemeKind::Centered2 => AdvectionScheme::Centered2,
            SchemeKind::UpwindFirstOrder => AdvectionScheme::UpwindFirstOrder,
            SchemeKind::Weno if grid.is_uniform() => WenoScheme::new(a.order, a.variant)?.into(),
            SchemeKind::Weno => WenoScheme::stretched(a.order, a.variant, grid)?.into(),
        })
    }

    pub fn build_dynamics(&self, grid: &RectilinearGrid) -> std::result::Result<Dynamics, ConfigurationError> {
        let mut dynamics = Dynamics::new(self.build_scheme(grid)?).with_momentum(self.advection.momentum);
        dynamics = match self.closure {
            ClosureConfig::Constant(c) => dynamics.with_closure(c),
            ClosureConfig::SmagorinskyLilly(c) => dynamics.with_closure(c),
        };
        if let Some(b) = &self.buoyancy {
            dynamics = dynamics.with_buoyancy(b.clone());
        }
        Ok(dynamics)
    }

    /// The partition as seen from `rank`, wrapping along the periodic axes
    /// of the configured grid.
    pub fn build_partition(&self, rank: usize) -> std::result::Result<Partition, ConfigurationError> {
        Partition::for_grid(self.partition.ranks, rank, &self.build_grid()?)
    }

    /// Halo width every axis needs for the configured scheme and closure.
    pub fn required_halo(&self) -> usize {
        let advection = match self.advection.scheme {
            SchemeKind::Weno => self.advection.order,
            SchemeKind::Centered2 | SchemeKind::UpwindFirstOrder => 1,
        };
        advection.max(self.closure.required_halo() + 1)
    }

    pub fn tracer_names(&self) -> Vec<&str> {
        self.tracers.iter().map(String::as_str).collect()
    }

    #[inline]
    pub fn halo_timeout(&self) -> Duration {
        Duration::from_millis(self.halo_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::grid::GridMetrics;
    use std::io::Write;

    fn config() -> RunConfig {
        RunConfig {
            grid: GridConfig {
                size: [16, 8, 4],
                halo: [3, 3, 3],
                extent: [16.0, 8.0, 4.0],
                topology: [Topology::Periodic, Topology::Periodic, Topology::Bounded],
                geometry: Geometry::Cartesian,
                origin: [0.0, 0.0],
                z_faces: None,
            },
            advection: AdvectionConfig::default(),
            closure: ClosureConfig::default(),
            partition: PartitionConfig { ranks: [2, 2] },
            tracers: vec!["T".into(), "S".into()],
            buoyancy: None,
            halo_timeout_ms: default_halo_timeout_ms(),
        }
    }

    #[test]
    fn test_defaults() {
        let json = r#"{ "grid": { "size": [8, 8, 2], "halo": [3, 3, 3], "extent": [1.0, 1.0, 1.0],
            "topology": ["Periodic", "Bounded", "Bounded"] } }"#;
        let config = RunConfig::from_json_str(json).unwrap();
        assert_eq!(config.advection.scheme, SchemeKind::Weno);
        assert_eq!(config.advection.order, 3);
        assert_eq!(config.partition.ranks, [1, 1]);
        assert_eq!(config.halo_timeout(), DEFAULT_HALO_TIMEOUT);
        assert_eq!(config.closure, ClosureConfig::Constant(ConstantDiffusivity::default()));
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_rejects_unsupported_order() {
        let mut c = config();
        c.advection.order = 7;
        assert!(matches!(
            c.validate(),
            Err(ConfigurationError::UnsupportedWenoOrder { order: 7, .. })
        ));
    }

    #[test]
    fn test_rejects_narrow_halo() {
        let mut c = config();
        c.advection.order = 4;
        assert!(matches!(c.validate(), Err(ConfigurationError::InsufficientHalo { .. })));

        let mut c = config();
        c.advection.scheme = SchemeKind::UpwindFirstOrder;
        c.grid.halo = [1, 1, 1];
        c.closure = ClosureConfig::SmagorinskyLilly(SmagorinskyLilly::default());
        assert_eq!(c.required_halo(), 2);
        assert!(matches!(c.validate(), Err(ConfigurationError::InsufficientHalo { .. })));
    }

    #[test]
    fn test_rejects_indivisible_partition() {
        let mut c = config();
        c.partition.ranks = [3, 1];
        assert!(matches!(
            c.validate(),
            Err(ConfigurationError::IndivisiblePartition { ranks: 3, .. })
        ));
    }

    #[test]
    fn test_bounded_axis_split_keeps_walls() {
        let mut c = config();
        c.grid.topology = [Topology::Bounded, Topology::Periodic, Topology::Bounded];
        c.partition.ranks = [2, 1];
        assert!(c.validate().is_ok());
        let p = c.build_partition(0).unwrap();
        assert_eq!(p.periodic(), [false, true]);
        assert_eq!(p.neighbour(crate::types::Side::West), None);
        let local = p.local_grid(&c.build_grid().unwrap()).unwrap();
        assert_eq!(local.topology()[0], Topology::RightConnected);
    }

    #[test]
    fn test_rejects_unknown_buoyancy_and_duplicates() {
        let mut c = config();
        c.buoyancy = Some("b".into());
        assert!(c.validate().is_err());

        let mut c = config();
        c.tracers = vec!["T".into(), "T".into()];
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_stretched_vertical_uses_stretched_weno() {
        let mut c = config();
        c.grid.z_faces = Some(vec![-10.0, -6.0, -3.0, -1.0, 0.0]);
        let grid = c.build_grid().unwrap();
        assert!(!grid.is_uniform());
        assert!((grid.dz(1, 1, 1, crate::types::Loc3::CCC) - 4.0).abs() < 1e-12);
        assert!(matches!(c.build_scheme(&grid).unwrap(), AdvectionScheme::Weno(_)));
    }

    #[test]
    fn test_latitude_longitude_origin() {
        let mut c = config();
        c.grid.geometry = Geometry::LatitudeLongitude { radius: 6.371e6 };
        c.grid.origin = [-8.0, -4.0];
        let grid = c.build_grid().unwrap();
        assert!((grid.node(crate::types::Axis::Y, crate::types::Location::Face, 1) + 4.0).abs() < 1e-12);
        assert!(grid.geometry().is_curvilinear());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string_pretty(&config()).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        let loaded = RunConfig::load(file.path()).unwrap();
        assert_eq!(loaded, config());
        assert_eq!(loaded.tracer_names(), vec!["T", "S"]);
    }

    #[test]
    fn test_load_reports_parse_and_io_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(RunConfig::load(file.path()), Err(Error::Json(_))));
        assert!(matches!(
            RunConfig::load("/nonexistent/run.json"),
            Err(Error::Io(_))
        ));
    }
}
