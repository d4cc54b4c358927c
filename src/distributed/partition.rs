//! Horizontal rank decomposition.

use tracing::debug;

use crate::error::ConfigurationError;
use crate::grid::{GridMetrics, RectilinearGrid};
use crate::immersed::ImmersedBoundaryGrid;
use crate::types::{Axis, HorizontalSides, RankId, Side, Topology};

/// A `Rx × Ry` decomposition of the horizontal plane and this rank's place
/// in it.
///
/// Ranks are numbered `x` fastest: rank `cx + Rx * cy` owns the block at
/// coordinates `(cx, cy)`. A split periodic axis wraps, so every rank has a
/// neighbour on both of its sides. A split bounded axis does not: the first
/// and last blocks keep the wall on their outer side.
///
/// # Example
///
/// ```
/// use fv_ocean::distributed::Partition;
/// use fv_ocean::types::{RankId, Side};
///
/// let p = Partition::new([2, 1], 1)?;
/// assert_eq!(p.coords(), [1, 0]);
/// assert_eq!(p.communicating(), [true, false]);
/// assert_eq!(p.neighbour(Side::East), Some(RankId::new(0)));
/// assert_eq!(p.neighbour(Side::North), None);
///
/// let walled = p.with_periodicity([false, false]);
/// assert_eq!(walled.neighbour(Side::East), None);
/// assert_eq!(walled.neighbour(Side::West), Some(RankId::new(0)));
/// # Ok::<(), fv_ocean::ConfigurationError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    ranks: [usize; 2],
    rank: RankId,
    /// Whether each horizontal axis wraps around.
    periodic: [bool; 2],
}

impl Partition {
    /// A partition of a horizontally periodic domain.
    pub fn new(ranks: [usize; 2], rank: usize) -> Result<Self, ConfigurationError> {
        if ranks.contains(&0) {
            return Err(ConfigurationError::Invalid(format!(
                "rank counts must be positive, got {ranks:?}"
            )));
        }
        let size = ranks[0] * ranks[1];
        if rank >= size {
            return Err(ConfigurationError::InvalidRank { rank, size });
        }
        Ok(Self {
            ranks,
            rank: RankId::new(rank),
            periodic: [true, true],
        })
    }

    /// A partition matching the horizontal topology of `global`.
    pub fn for_grid(ranks: [usize; 2], rank: usize, global: &impl GridMetrics) -> Result<Self, ConfigurationError> {
        let [tx, ty, _] = global.topology();
        Ok(Self::new(ranks, rank)?.with_periodicity([tx == Topology::Periodic, ty == Topology::Periodic]))
    }

    /// Set which horizontal axes wrap around.
    pub fn with_periodicity(mut self, periodic: [bool; 2]) -> Self {
        self.periodic = periodic;
        self
    }

    /// A single rank owning the whole grid.
    pub fn serial() -> Self {
        Self {
            ranks: [1, 1],
            rank: RankId::new(0),
            periodic: [true, true],
        }
    }

    #[inline]
    pub fn ranks(&self) -> [usize; 2] {
        self.ranks
    }

    #[inline]
    pub fn rank(&self) -> RankId {
        self.rank
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.ranks[0] * self.ranks[1]
    }

    #[inline]
    pub fn periodic(&self) -> [bool; 2] {
        self.periodic
    }

    /// Block coordinates `(cx, cy)` of this rank.
    pub fn coords(&self) -> [usize; 2] {
        let r = self.rank.get();
        [r % self.ranks[0], r / self.ranks[0]]
    }

    /// Whether each horizontal axis is split over more than one rank.
    #[inline]
    pub fn communicating(&self) -> [bool; 2] {
        [self.ranks[0] > 1, self.ranks[1] > 1]
    }

    /// Whether each side of this rank faces another rank.
    pub fn connected_sides(&self) -> HorizontalSides<bool> {
        HorizontalSides::new(
            self.neighbour(Side::West).is_some(),
            self.neighbour(Side::East).is_some(),
            self.neighbour(Side::South).is_some(),
            self.neighbour(Side::North).is_some(),
        )
    }

    /// Rank across `side`: none if that axis is not split, or if `side` is
    /// the outer edge of a non-periodic axis.
    pub fn neighbour(&self, side: Side) -> Option<RankId> {
        let a = side.axis().index();
        let r = self.ranks[a];
        if r == 1 {
            return None;
        }
        let mut c = self.coords();
        c[a] = match (side.is_high(), self.periodic[a]) {
            (true, _) if c[a] + 1 < r => c[a] + 1,
            (true, true) => 0,
            (false, _) if c[a] > 0 => c[a] - 1,
            (false, true) => r - 1,
            _ => return None,
        };
        Some(RankId::new(c[0] + self.ranks[0] * c[1]))
    }

    /// Topology of this rank's block along a split axis.
    fn local_topology(&self, axis: Axis) -> Topology {
        let a = axis.index();
        let c = self.coords()[a];
        if self.periodic[a] {
            Topology::Connected
        } else if c == 0 {
            Topology::RightConnected
        } else if c + 1 == self.ranks[a] {
            Topology::LeftConnected
        } else {
            Topology::Connected
        }
    }

    /// Check that `global` can be split this way: split axes must be
    /// periodic or bounded as this partition expects, divisible by their
    /// rank count, and leave each rank at least one cell more than the halo.
    pub fn validate(&self, global: &impl GridMetrics) -> Result<(), ConfigurationError> {
        for axis in [Axis::X, Axis::Y] {
            let a = axis.index();
            let ranks = self.ranks[a];
            if ranks == 1 {
                continue;
            }
            let extent = global.size()[a];
            let topology = global.topology()[a];
            let expected = if self.periodic[a] { Topology::Periodic } else { Topology::Bounded };
            if topology != expected {
                return Err(ConfigurationError::Invalid(format!(
                    "partition expects {axis} to be {expected:?} but the grid is {topology:?}"
                )));
            }
            if extent % ranks != 0 {
                return Err(ConfigurationError::IndivisiblePartition { axis, extent, ranks });
            }
            let halo = global.halo()[a];
            if extent / ranks <= halo {
                return Err(ConfigurationError::Invalid(format!(
                    "{} cells per rank along {axis} do not exceed the halo {halo}",
                    extent / ranks
                )));
            }
        }
        Ok(())
    }

    /// Global index offset of this rank's first interior cell.
    pub fn local_offset(&self, global: &impl GridMetrics) -> [usize; 2] {
        let c = self.coords();
        let size = global.size();
        [
            c[0] * size[0] / self.ranks[0],
            c[1] * size[1] / self.ranks[1],
        ]
    }

    /// This rank's block of `global`. Split axes are tagged
    /// [`Topology::Connected`], or one-sided connected on the outer blocks
    /// of a bounded axis.
    pub fn local_grid(&self, global: &RectilinearGrid) -> Result<RectilinearGrid, ConfigurationError> {
        self.validate(global)?;
        let offset = self.local_offset(global);
        let mut local = global.clone();
        for axis in [Axis::X, Axis::Y] {
            let a = axis.index();
            if self.ranks[a] > 1 {
                let n = global.size()[a] / self.ranks[a];
                local = local.subgrid(axis, offset[a], n, self.local_topology(axis))?;
            }
        }
        debug!(
            rank = self.rank.get(),
            ranks = ?self.ranks,
            offset = ?offset,
            size = ?local.size(),
            topology = ?local.topology(),
            "built local grid"
        );
        Ok(local)
    }

    /// This rank's block of an immersed-boundary grid. The boundary is
    /// sampled from the global one, halos included.
    pub fn local_immersed_grid(
        &self,
        global: &ImmersedBoundaryGrid<RectilinearGrid>,
    ) -> Result<ImmersedBoundaryGrid<RectilinearGrid>, ConfigurationError> {
        let local = self.local_grid(global.underlying())?;
        let boundary = global.boundary().restrict(&local, self.local_offset(global));
        Ok(ImmersedBoundaryGrid::new(local, boundary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(tx: Topology) -> RectilinearGrid {
        RectilinearGrid::uniform([12, 8, 2], [3, 3, 1], [12.0, 8.0, 2.0], [tx, Topology::Bounded, Topology::Bounded])
            .unwrap()
    }

    #[test]
    fn test_rank_layout_and_neighbours() {
        let p = Partition::new([3, 2], 4).unwrap();
        assert_eq!(p.coords(), [1, 1]);
        assert_eq!(p.neighbour(Side::West), Some(RankId::new(3)));
        assert_eq!(p.neighbour(Side::East), Some(RankId::new(5)));
        assert_eq!(p.neighbour(Side::South), Some(RankId::new(1)));
        assert_eq!(p.neighbour(Side::North), Some(RankId::new(1)));
        assert!(Partition::new([2, 2], 4).is_err());
        assert!(Partition::new([0, 1], 0).is_err());
    }

    #[test]
    fn test_bounded_outer_edges_have_no_neighbour() {
        let g = global(Topology::Bounded);
        let first = Partition::for_grid([3, 1], 0, &g).unwrap();
        assert_eq!(first.neighbour(Side::West), None);
        assert_eq!(first.neighbour(Side::East), Some(RankId::new(1)));
        let middle = Partition::for_grid([3, 1], 1, &g).unwrap();
        assert_eq!(middle.connected_sides(), HorizontalSides::new(true, true, false, false));
        let last = Partition::for_grid([3, 1], 2, &g).unwrap();
        assert_eq!(last.neighbour(Side::East), None);
        assert_eq!(last.neighbour(Side::West), Some(RankId::new(1)));
    }

    #[test]
    fn test_indivisible_partition() {
        let p = Partition::new([5, 1], 0).unwrap();
        assert!(matches!(
            p.validate(&global(Topology::Periodic)),
            Err(ConfigurationError::IndivisiblePartition { extent: 12, ranks: 5, .. })
        ));
    }

    #[test]
    fn test_partition_must_match_grid_periodicity() {
        // A wrapping partition over a bounded axis would exchange across the walls.
        let p = Partition::new([2, 1], 0).unwrap();
        assert!(p.validate(&global(Topology::Bounded)).is_err());
        let q = Partition::new([2, 1], 0).unwrap().with_periodicity([false, true]);
        assert!(q.validate(&global(Topology::Periodic)).is_err());
        assert!(q.validate(&global(Topology::Bounded)).is_ok());
        let flat = Partition::for_grid([2, 1], 0, &global(Topology::Flat)).unwrap();
        assert!(flat.validate(&global(Topology::Flat)).is_err());
    }

    #[test]
    fn test_split_bounded_axis_keeps_outer_walls() {
        let g = global(Topology::Bounded);
        let topologies: Vec<_> = (0..3)
            .map(|r| Partition::for_grid([3, 1], r, &g).unwrap().local_grid(&g).unwrap().topology()[0])
            .collect();
        assert_eq!(
            topologies,
            vec![Topology::RightConnected, Topology::Connected, Topology::LeftConnected]
        );
        let q = Partition::for_grid([1, 2], 1, &g).unwrap();
        assert_eq!(q.local_grid(&g).unwrap().topology()[1], Topology::LeftConnected);
    }

    #[test]
    fn test_local_grid_keeps_positions() {
        let g = global(Topology::Periodic);
        let p = Partition::new([2, 1], 1).unwrap();
        let local = p.local_grid(&g).unwrap();
        assert_eq!(local.size(), [6, 8, 2]);
        assert_eq!(local.topology()[0], Topology::Connected);
        assert_eq!(p.local_offset(&g), [6, 0]);
        let x_local = local.node(Axis::X, crate::types::Location::Center, 1);
        let x_global = g.node(Axis::X, crate::types::Location::Center, 7);
        assert!((x_local - x_global).abs() < 1e-12);
    }

    #[test]
    fn test_narrow_blocks_rejected() {
        let p = Partition::new([4, 1], 0).unwrap();
        assert!(p.validate(&global(Topology::Periodic)).is_err());
    }
}
