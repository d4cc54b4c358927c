//! Cubed-sphere region adjacency derived from cube geometry.
//!
//! Each of the six panels carries a right-handed frame: outward normal `n`
//! and local axes `ex`, `ey` with `ex × ey = n`. Panels are subdivided into
//! `R × R` regions. A region's neighbour across a side is either the next
//! region on the same panel or, on a panel edge, the region of the panel
//! whose normal points along that side. The side it touches and whether the
//! tangential index runs backwards (`flip`) both come from dot products of
//! the two frames, so no adjacency table is written out by hand.

use crate::error::ConfigurationError;
use crate::types::{HorizontalSides, RegionId, Side};

pub type Vec3 = [f64; 3];

#[inline]
fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
fn neg(a: Vec3) -> Vec3 {
    [-a[0], -a[1], -a[2]]
}

/// Orientation of one cube panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelFrame {
    pub normal: Vec3,
    pub ex: Vec3,
    pub ey: Vec3,
}

impl PanelFrame {
    /// Outward direction of `side` in 3-D.
    pub fn outward(&self, side: Side) -> Vec3 {
        match side {
            Side::West => neg(self.ex),
            Side::East => self.ex,
            Side::South => neg(self.ey),
            Side::North => self.ey,
        }
    }

    /// Direction of increasing tangential index along `side`.
    pub fn tangent(&self, side: Side) -> Vec3 {
        match side {
            Side::West | Side::East => self.ey,
            Side::South | Side::North => self.ex,
        }
    }

    /// Point on the unit cube at local coordinates `(ξ, η) ∈ [-1, 1]²`.
    pub fn point(&self, xi: f64, eta: f64) -> Vec3 {
        std::array::from_fn(|c| self.normal[c] + xi * self.ex[c] + eta * self.ey[c])
    }
}

/// The six panel frames.
///
/// Every panel edge joins the east or north side of one panel to the west
/// or south side of the other, so the face on a panel edge belongs to the
/// panel it opens into.
pub const PANELS: [PanelFrame; 6] = [
    PanelFrame {
        normal: [1.0, 0.0, 0.0],
        ex: [0.0, 1.0, 0.0],
        ey: [0.0, 0.0, 1.0],
    },
    PanelFrame {
        normal: [0.0, 1.0, 0.0],
        ex: [-1.0, 0.0, 0.0],
        ey: [0.0, 0.0, 1.0],
    },
    PanelFrame {
        normal: [0.0, 0.0, 1.0],
        ex: [-1.0, 0.0, 0.0],
        ey: [0.0, -1.0, 0.0],
    },
    PanelFrame {
        normal: [-1.0, 0.0, 0.0],
        ex: [0.0, 0.0, -1.0],
        ey: [0.0, -1.0, 0.0],
    },
    PanelFrame {
        normal: [0.0, -1.0, 0.0],
        ex: [0.0, 0.0, -1.0],
        ey: [1.0, 0.0, 0.0],
    },
    PanelFrame {
        normal: [0.0, 0.0, -1.0],
        ex: [0.0, 1.0, 0.0],
        ey: [1.0, 0.0, 0.0],
    },
];

/// The region across one side and how it is oriented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionConnection {
    /// Neighbouring region.
    pub region: RegionId,
    /// The neighbour's side that touches this region.
    pub side: Side,
    /// Whether the tangential index runs in opposite directions on the two
    /// sides of the interface.
    pub flip: bool,
}

/// One region of the arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub id: RegionId,
    pub panel: usize,
    /// Position `(a, b)` within the panel's `R × R` subdivision.
    pub position: [usize; 2],
    pub neighbours: HorizontalSides<RegionConnection>,
}

/// Arena of `6 R²` regions with their adjacency.
///
/// Region `p R² + b R + a` is subdivision `(a, b)` of panel `p`.
///
/// # Example
///
/// ```
/// use fv_ocean::multi_region::CubedSphereConnectivity;
/// use fv_ocean::types::{RegionId, Side};
///
/// let cube = CubedSphereConnectivity::new(2)?;
/// assert_eq!(cube.len(), 24);
/// // Within a panel, the east neighbour is the next region along x.
/// let east = cube.connection(RegionId::new(0), Side::East);
/// assert_eq!(east.region, RegionId::new(1));
/// assert_eq!(east.side, Side::West);
/// assert!(!east.flip);
/// # Ok::<(), fv_ocean::ConfigurationError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CubedSphereConnectivity {
    subdivision: usize,
    regions: Vec<Region>,
}

impl CubedSphereConnectivity {
    pub fn new(subdivision: usize) -> Result<Self, ConfigurationError> {
        if subdivision == 0 {
            return Err(ConfigurationError::Invalid(
                "cubed-sphere subdivision must be at least 1".into(),
            ));
        }
        let r = subdivision;
        let mut regions = Vec::with_capacity(6 * r * r);
        for (panel, _) in PANELS.iter().enumerate() {
            for b in 0..r {
                for a in 0..r {
                    let position = [a, b];
                    let connection = |side| Self::neighbour(r, panel, position, side);
                    let neighbours = HorizontalSides::new(
                        connection(Side::West)?,
                        connection(Side::East)?,
                        connection(Side::South)?,
                        connection(Side::North)?,
                    );
                    regions.push(Region {
                        id: Self::id(r, panel, position),
                        panel,
                        position,
                        neighbours,
                    });
                }
            }
        }
        tracing::debug!(subdivision, regions = regions.len(), "built cubed-sphere connectivity");
        Ok(Self {
            subdivision,
            regions,
        })
    }

    #[inline]
    fn id(r: usize, panel: usize, [a, b]: [usize; 2]) -> RegionId {
        RegionId::new(panel * r * r + b * r + a)
    }

    fn neighbour(r: usize, panel: usize, [a, b]: [usize; 2], side: Side) -> Result<RegionConnection, ConfigurationError> {
        let inside = match side {
            Side::West => a.checked_sub(1).map(|a| [a, b]),
            Side::East => (a + 1 < r).then_some([a + 1, b]),
            Side::South => b.checked_sub(1).map(|b| [a, b]),
            Side::North => (b + 1 < r).then_some([a, b + 1]),
        };
        if let Some(position) = inside {
            return Ok(RegionConnection {
                region: Self::id(r, panel, position),
                side: side.opposite(),
                flip: false,
            });
        }

        let frame = PANELS[panel];
        let outward = frame.outward(side);
        let across = PANELS
            .iter()
            .position(|q| dot(q.normal, outward) > 0.5)
            .ok_or_else(|| ConfigurationError::Invalid(format!("no panel beyond side {side} of panel {panel}")))?;
        let other = PANELS[across];
        let back = Side::ALL
            .into_iter()
            .find(|&s| dot(other.outward(s), frame.normal) > 0.5)
            .ok_or_else(|| ConfigurationError::Invalid(format!("panel {across} does not touch panel {panel}")))?;
        let flip = dot(frame.tangent(side), other.tangent(back)) < 0.0;

        let along = match side {
            Side::West | Side::East => b,
            Side::South | Side::North => a,
        };
        let along = if flip { r - 1 - along } else { along };
        let position = match back {
            Side::West => [0, along],
            Side::East => [r - 1, along],
            Side::South => [along, 0],
            Side::North => [along, r - 1],
        };
        Ok(RegionConnection {
            region: Self::id(r, across, position),
            side: back,
            flip,
        })
    }

    #[inline]
    pub fn subdivision(&self) -> usize {
        self.subdivision
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id]
    }

    /// The connection across `side` of `id`.
    pub fn connection(&self, id: RegionId, side: Side) -> RegionConnection {
        self.regions[id].neighbours[side]
    }

    /// Frame of the panel holding `id`.
    pub fn frame(&self, id: RegionId) -> PanelFrame {
        PANELS[self.regions[id].panel]
    }

    /// Cube-surface position of cell center `(i, j)` of region `id` with
    /// `n × n` cells.
    pub fn cell_center(&self, id: RegionId, n: usize, i: isize, j: isize) -> Vec3 {
        self.position(id, n, i as f64 - 0.5, j as f64 - 0.5)
    }

    /// Cube-surface position at continuous index coordinates `(x, y)` of
    /// region `id`, where cell `i` spans `x ∈ [i - 1, i]`. Face `i` sits at
    /// `x = i - 1`.
    pub fn position(&self, id: RegionId, n: usize, x: f64, y: f64) -> Vec3 {
        let region = &self.regions[id];
        let cells = (self.subdivision * n) as f64;
        let gx = (region.position[0] * n) as f64 + x;
        let gy = (region.position[1] * n) as f64 + y;
        PANELS[region.panel].point(2.0 * gx / cells - 1.0, 2.0 * gy / cells - 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_right_handed() {
        for p in PANELS {
            let cross = [
                p.ex[1] * p.ey[2] - p.ex[2] * p.ey[1],
                p.ex[2] * p.ey[0] - p.ex[0] * p.ey[2],
                p.ex[0] * p.ey[1] - p.ex[1] * p.ey[0],
            ];
            assert_eq!(cross, p.normal);
        }
    }

    #[test]
    fn test_connections_are_symmetric() {
        for r in 1..=3 {
            let cube = CubedSphereConnectivity::new(r).unwrap();
            for region in cube.regions() {
                for (side, c) in region.neighbours.iter() {
                    assert_ne!(c.region, region.id);
                    let back = cube.connection(c.region, c.side);
                    assert_eq!(back.region, region.id, "R={r} {} {side}", region.id);
                    assert_eq!(back.side, side);
                    assert_eq!(back.flip, c.flip);
                }
            }
        }
    }

    #[test]
    fn test_edges_join_high_and_low_sides() {
        for r in 1..=2 {
            let cube = CubedSphereConnectivity::new(r).unwrap();
            for region in cube.regions() {
                for (side, c) in region.neighbours.iter() {
                    assert_ne!(side.is_high(), c.side.is_high(), "R={r} {} {side} -> {}", region.id, c.side);
                }
            }
        }
        let cube = CubedSphereConnectivity::new(1).unwrap();
        let north = cube.connection(RegionId::new(0), Side::North);
        assert_eq!((north.region, north.side, north.flip), (RegionId::new(2), Side::West, true));
        let east = cube.connection(RegionId::new(1), Side::East);
        assert_eq!((east.region, east.side, east.flip), (RegionId::new(3), Side::South, true));
    }

    #[test]
    fn test_single_region_panels_never_touch_opposite_panel() {
        let cube = CubedSphereConnectivity::new(1).unwrap();
        for region in cube.regions() {
            let n = cube.frame(region.id).normal;
            let mut seen: Vec<_> = region.neighbours.iter().map(|(_, c)| c.region).collect();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), 4);
            for id in seen {
                assert!(dot(cube.frame(id).normal, n).abs() < 0.5);
            }
        }
    }

    #[test]
    fn test_adjacent_centers_are_close() {
        let n = 4;
        let cube = CubedSphereConnectivity::new(2).unwrap();
        let h = 2.0 / (2 * n) as f64;
        for region in cube.regions() {
            for (side, c) in region.neighbours.iter() {
                // First cell on the side and the cell facing it.
                let (i, j) = match side {
                    Side::West => (1, 2),
                    Side::East => (n as isize, 2),
                    Side::South => (2, 1),
                    Side::North => (2, n as isize),
                };
                let t = 2;
                let t2 = if c.flip { n as isize + 1 - t } else { t };
                let (qi, qj) = match c.side {
                    Side::West => (1, t2),
                    Side::East => (n as isize, t2),
                    Side::South => (t2, 1),
                    Side::North => (t2, n as isize),
                };
                let p = cube.cell_center(region.id, n, i, j);
                let q = cube.cell_center(c.region, n, qi, qj);
                let d = (0..3).map(|k| (p[k] - q[k]).powi(2)).sum::<f64>().sqrt();
                assert!(d < 1.01 * h, "{} {side}: distance {d}", region.id);
            }
        }
    }
}
