//! One-dimensional node coordinates along a grid axis.
//!
//! Faces are stored for every index from `1 - H` to `N + H + 2`, so every
//! stored center, including the trailing slot `N + H + 1`, has two faces
//! and spacings can be evaluated inside the halo without branching. Halo faces
//! are generated once at construction: periodic axes wrap the interior
//! spacing around, bounded and connected axes repeat the edge spacing.

use crate::error::ConfigurationError;
use crate::types::{Axis, Location, Topology};

/// How cell faces are distributed along an axis.
#[derive(Clone, Debug, PartialEq)]
pub enum Spacing {
    /// `N` equal cells spanning `[start, end]`.
    Uniform { start: f64, end: f64 },
    /// Explicit interior face positions, `N + 1` strictly increasing values.
    Stretched(Vec<f64>),
}

/// Node positions and spacings along one axis.
#[derive(Clone, Debug)]
pub struct AxisCoordinates {
    n: usize,
    halo: usize,
    topology: Topology,
    /// Face positions for indices `1 - halo ..= n + halo + 2`.
    faces: Vec<f64>,
    uniform: bool,
}

impl AxisCoordinates {
    /// Build coordinates for an axis.
    ///
    /// Flat axes ignore `halo` and `spacing` and report unit spacing.
    pub fn new(
        axis: Axis,
        n: usize,
        halo: usize,
        topology: Topology,
        spacing: &Spacing,
    ) -> Result<Self, ConfigurationError> {
        if topology.is_flat() {
            return Ok(Self {
                n: 1,
                halo: 0,
                topology,
                faces: vec![0.0, 1.0, 2.0],
                uniform: true,
            });
        }
        if n == 0 {
            return Err(ConfigurationError::InvalidExtent {
                axis,
                reason: "a non-flat axis needs at least one cell".into(),
            });
        }

        let (interior, uniform) = match spacing {
            Spacing::Uniform { start, end } => {
                if !(end > start) || !start.is_finite() || !end.is_finite() {
                    return Err(ConfigurationError::invalid_spacing(
                        axis,
                        format!("domain [{start}, {end}] is empty or non-finite"),
                    ));
                }
                let d = (end - start) / n as f64;
                let faces: Vec<f64> = (0..=n).map(|m| start + m as f64 * d).collect();
                (faces, true)
            }
            Spacing::Stretched(faces) => {
                if faces.len() != n + 1 {
                    return Err(ConfigurationError::invalid_spacing(
                        axis,
                        format!("expected {} face positions, got {}", n + 1, faces.len()),
                    ));
                }
                if faces.windows(2).any(|w| !(w[1] > w[0]) || !w[1].is_finite()) {
                    return Err(ConfigurationError::invalid_spacing(
                        axis,
                        "face positions must be finite and strictly increasing",
                    ));
                }
                (faces.clone(), false)
            }
        };

        let length = interior[n] - interior[0];
        let mut faces = Vec::with_capacity(n + 2 * halo + 2);
        for m in (1..=halo).rev() {
            let face = match topology {
                Topology::Periodic => {
                    // Wrap index n - m (0-based face) to the left of the domain.
                    let src = (n as isize - m as isize).rem_euclid(n as isize) as usize;
                    let wraps = ((m as isize - 1) / n as isize + 1) as f64;
                    interior[src] - wraps * length
                }
                _ => interior[0] - m as f64 * (interior[1] - interior[0]),
            };
            faces.push(face);
        }
        faces.extend_from_slice(&interior);
        for m in 1..=halo + 1 {
            let face = match topology {
                Topology::Periodic => {
                    let src = m % n;
                    let wraps = (m / n) as f64 + 1.0;
                    interior[src] + wraps * length
                }
                _ => interior[n] + m as f64 * (interior[n] - interior[n - 1]),
            };
            faces.push(face);
        }

        Ok(Self {
            n,
            halo,
            topology,
            faces,
            uniform,
        })
    }

    /// The piece of this axis covering interior cells `offset+1 ..= offset+n`.
    ///
    /// Halo faces are taken from this axis, so a window keeps the true
    /// positions of its neighbours' cells.
    pub fn window(&self, offset: usize, n: usize, topology: Topology) -> Self {
        let h = self.halo as isize;
        let lo = offset as isize + 1 - h;
        let hi = (offset + n) as isize + 2 + h;
        Self {
            n,
            halo: self.halo,
            topology,
            faces: (lo..=hi).map(|i| self.face(i)).collect(),
            uniform: self.uniform,
        }
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn halo(&self) -> usize {
        self.halo
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Whether all interior cells have the same width.
    #[inline]
    pub fn is_uniform(&self) -> bool {
        self.uniform
    }

    /// Clamp an index into the stored face range.
    #[inline]
    fn slot(&self, i: isize) -> usize {
        let lo = 1 - self.halo as isize;
        let hi = (self.n + self.halo + 2) as isize;
        (i.clamp(lo, hi) - lo) as usize
    }

    /// Position of face `i`.
    #[inline]
    pub fn face(&self, i: isize) -> f64 {
        self.faces[self.slot(i)]
    }

    /// Position of center `i`.
    #[inline]
    pub fn center(&self, i: isize) -> f64 {
        0.5 * (self.face(i) + self.face(i + 1))
    }

    /// Node position at a given staggering.
    #[inline]
    pub fn node(&self, loc: Location, i: isize) -> f64 {
        match loc {
            Location::Center => self.center(i),
            Location::Face => self.face(i),
        }
    }

    /// Coordinate spacing around a node.
    ///
    /// For centers this is the cell width; for faces it is the distance
    /// between the two adjacent centers. Flat axes always return one.
    #[inline]
    pub fn spacing(&self, loc: Location, i: isize) -> f64 {
        if self.topology.is_flat() {
            return 1.0;
        }
        let lo = 1 - self.halo as isize;
        let hi = (self.n + self.halo + 1) as isize;
        match loc {
            Location::Center => {
                let i = i.clamp(lo, hi);
                self.face(i + 1) - self.face(i)
            }
            Location::Face => {
                if i <= lo || i > hi {
                    self.spacing(Location::Center, i)
                } else {
                    self.center(i) - self.center(i - 1)
                }
            }
        }
    }

    /// Interior domain length.
    pub fn length(&self) -> f64 {
        self.face(self.n as isize + 1) - self.face(1)
    }
}
