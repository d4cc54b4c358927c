//! Boundary-adjacent tendency recompute after halos arrive.
//!
//! The interior pass runs while halo messages are in flight and may write
//! tendencies next to communicating edges from stale halo data. Once the
//! halos are complete, the slabs along those edges are recomputed in two
//! stages:
//!
//! 1. auxiliary fields (`w`, pressure, diffusivity) over each slab widened
//!    by their own stencil
//! 2. tendencies over each slab, overwriting the interior pass
//!
//! The slabs are planned once from the rank count per axis.

use tracing::{debug, info_span};

use super::{Architecture, StateExchange};
use crate::error::CommunicationError;
use crate::field::IndexBox;
use crate::grid::GridMetrics;
use crate::immersed::ImmersedMetrics;
use crate::model::Model;
use crate::types::Side;

/// Index ranges recomputed after each halo exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundarySlabs {
    communicating: [bool; 2],
    slabs: Vec<(Side, IndexBox)>,
}

impl BoundarySlabs {
    /// Slabs of halo width along every communicating side, full depth:
    /// west `[1, Hx]`, east `[Nx-Hx+1, Nx]`, south `[1, Hy]`,
    /// north `[Ny-Hy+1, Ny]`.
    ///
    /// A side gets a slab when its axis is flagged in `communicating` and
    /// the grid has no wall at that end. Walled ends of a split bounded
    /// axis fill their halos locally.
    ///
    /// # Example
    ///
    /// ```
    /// use fv_ocean::distributed::BoundarySlabs;
    /// use fv_ocean::grid::RectilinearGrid;
    /// use fv_ocean::types::{Side, Topology};
    ///
    /// let grid = RectilinearGrid::uniform(
    ///     [16, 8, 4],
    ///     [3, 3, 1],
    ///     [16.0, 8.0, 4.0],
    ///     [Topology::Connected, Topology::Bounded, Topology::Bounded],
    /// )?;
    /// let slabs = BoundarySlabs::plan(&grid, [true, false]);
    /// let sides: Vec<_> = slabs.iter().map(|(s, _)| *s).collect();
    /// assert_eq!(sides, vec![Side::West, Side::East]);
    /// assert_eq!(slabs.iter().next().map(|(_, b)| b.len()), Some(3 * 8 * 4));
    /// # Ok::<(), fv_ocean::ConfigurationError>(())
    /// ```
    pub fn plan(grid: &impl GridMetrics, communicating: [bool; 2]) -> Self {
        let [nx, ny, nz] = grid.size().map(|n| n as isize);
        let [hx, hy, _] = grid.halo().map(|h| h as isize);
        let topology = grid.topology();
        let slabs: Vec<_> = Side::ALL
            .into_iter()
            .filter(|side| {
                let a = side.axis().index();
                communicating[a] && !topology[a].has_wall(side.is_high())
            })
            .map(|side| {
                let b = match side {
                    Side::West => IndexBox::new(1..=hx, 1..=ny, 1..=nz),
                    Side::East => IndexBox::new(nx - hx + 1..=nx, 1..=ny, 1..=nz),
                    Side::South => IndexBox::new(1..=nx, 1..=hy, 1..=nz),
                    Side::North => IndexBox::new(1..=nx, ny - hy + 1..=ny, 1..=nz),
                };
                (side, b)
            })
            .collect();
        for (side, b) in &slabs {
            debug!(%side, i = ?b.i, j = ?b.j, cells = b.len(), "planned boundary slab");
        }
        Self { communicating, slabs }
    }

    #[inline]
    pub fn communicating(&self) -> [bool; 2] {
        self.communicating
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Side, IndexBox)> {
        self.slabs.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.slabs.is_empty()
    }
}

/// Recompute auxiliary fields, then tendencies, on every boundary slab.
///
/// Halos of the prognostic fields must be complete.
pub fn recompute_boundary_tendencies<G: ImmersedMetrics>(model: &mut Model<G>, slabs: &BoundarySlabs) {
    if slabs.is_empty() {
        return;
    }
    let span = info_span!("recompute_boundary_tendencies", slabs = slabs.slabs.len());
    let _guard = span.enter();
    for (_, slab) in slabs.iter() {
        model.compute_auxiliary_fields(slab);
    }
    for (side, slab) in slabs.iter() {
        model.compute_edge_tendencies(*side, slab);
    }
}

/// One rank's tendency update with communication hidden behind the
/// interior pass.
///
/// Launches every halo exchange, computes interior tendencies, waits for
/// the halos, then recomputes the boundary slabs.
pub fn update_tendencies<G: ImmersedMetrics>(
    arch: &Architecture,
    model: &mut Model<G>,
    exchange: &mut StateExchange,
    slabs: &BoundarySlabs,
) -> Result<(), CommunicationError> {
    exchange.launch(arch, model.state_mut())?;
    model.compute_interior_tendencies(slabs.communicating());
    exchange.complete(arch, model.state_mut())?;
    recompute_boundary_tendencies(model, slabs);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::RectilinearGrid;
    use crate::types::Topology;

    #[test]
    fn test_single_rank_axes_have_no_slabs() {
        let g = RectilinearGrid::uniform(
            [10, 12, 2],
            [2, 3, 1],
            [10.0, 12.0, 2.0],
            [Topology::Periodic, Topology::Connected, Topology::Bounded],
        )
        .unwrap();
        let slabs = BoundarySlabs::plan(&g, [false, true]);
        let planned: Vec<_> = slabs.iter().cloned().collect();
        assert_eq!(
            planned,
            vec![
                (Side::South, IndexBox::new(1..=10, 1..=3, 1..=2)),
                (Side::North, IndexBox::new(1..=10, 10..=12, 1..=2)),
            ]
        );
        assert!(BoundarySlabs::plan(&g, [false, false]).is_empty());
    }

    #[test]
    fn test_walled_end_has_no_slab() {
        let g = RectilinearGrid::uniform(
            [10, 12, 2],
            [2, 3, 1],
            [10.0, 12.0, 2.0],
            [Topology::RightConnected, Topology::Periodic, Topology::Bounded],
        )
        .unwrap();
        let slabs = BoundarySlabs::plan(&g, [true, false]);
        let planned: Vec<_> = slabs.iter().cloned().collect();
        assert_eq!(planned, vec![(Side::East, IndexBox::new(9..=10, 1..=12, 1..=2))]);
    }
}
