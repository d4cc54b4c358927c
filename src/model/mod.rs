//! Hydrostatic model state and tendency evaluation on one region.
//!
//! A [`Model`] bundles a grid, its [`Dynamics`] (advection scheme, momentum
//! form, closure, buoyancy tracer), the [`ModelState`] fields and their
//! [`Tendencies`]. Evaluating tendencies is two staged passes:
//!
//! 1. auxiliary fields (`w` from continuity, hydrostatic pressure,
//!    diffusivity) over column ranges wide enough for the next stage
//! 2. tendency kernels over an [`IndexSet`]: active cells, a subset of
//!    them, or a rectangular slab
//!
//! # Example
//!
//! ```
//! use fv_ocean::advection::{AdvectionScheme, WenoScheme, WenoVariant};
//! use fv_ocean::grid::RectilinearGrid;
//! use fv_ocean::model::{Dynamics, Model};
//! use fv_ocean::types::Topology;
//!
//! let grid = RectilinearGrid::uniform(
//!     [16, 1, 1],
//!     [3, 0, 0],
//!     [16.0, 1.0, 1.0],
//!     [Topology::Periodic, Topology::Flat, Topology::Flat],
//! )?;
//! let scheme = AdvectionScheme::from(WenoScheme::new(3, WenoVariant::Plain)?);
//! let mut model = Model::new(grid, Dynamics::new(scheme), &["c"])?;
//! model.state_mut().u.fill(1.0);
//! model.update_tendencies();
//! assert!(model.tendencies().tracers[0].data().iter().all(|g| *g == 0.0));
//! # Ok::<(), fv_ocean::ConfigurationError>(())
//! ```

mod diagnostics;
mod kernels;
mod state;

pub use diagnostics::{compute_hydrostatic_pressure, compute_w_from_continuity};
pub use kernels::{IndexSet, compute_tendencies, launch, tracer_tendency, u_tendency, v_tendency};
pub use state::{ModelState, Tendencies};

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::advection::{AdvectionScheme, MomentumForm, Velocities};
use crate::closure::{ConstantDiffusivity, DiffusivityClosure, compute_diffusivities};
use crate::error::ConfigurationError;
use crate::field::IndexBox;
use crate::immersed::{ActiveCellIndex, ImmersedMetrics};
use crate::types::{Axis, Side};

// ============================================================================
// Dynamics
// ============================================================================

/// Numerical and physical choices shared by every kernel.
#[derive(Clone)]
pub struct Dynamics {
    pub advection: AdvectionScheme,
    pub momentum: MomentumForm,
    pub closure: Arc<dyn DiffusivityClosure>,
    /// Name of the tracer read as buoyancy by the hydrostatic pressure.
    pub buoyancy: Option<String>,
}

impl Dynamics {
    /// Flux-form momentum, no diffusion, no buoyancy.
    pub fn new(advection: AdvectionScheme) -> Self {
        Self {
            advection,
            momentum: MomentumForm::default(),
            closure: Arc::new(ConstantDiffusivity::default()),
            buoyancy: None,
        }
    }

    pub fn with_momentum(mut self, momentum: MomentumForm) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn with_closure(mut self, closure: impl DiffusivityClosure + 'static) -> Self {
        self.closure = Arc::new(closure);
        self
    }

    pub fn with_buoyancy(mut self, tracer: impl Into<String>) -> Self {
        self.buoyancy = Some(tracer.into());
        self
    }

    /// Halo the grid must carry for these dynamics.
    pub fn required_halo(&self) -> usize {
        self.advection.required_halo().max(self.closure.required_halo() + 1)
    }
}

impl fmt::Debug for Dynamics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dynamics")
            .field("advection", &self.advection)
            .field("momentum", &self.momentum)
            .field("closure", &self.closure.name())
            .field("buoyancy", &self.buoyancy)
            .finish()
    }
}

// ============================================================================
// Model
// ============================================================================

/// One region's fields, tendencies and the operators acting on them.
#[derive(Debug)]
pub struct Model<G> {
    grid: G,
    dynamics: Dynamics,
    buoyancy: Option<usize>,
    state: ModelState,
    tendencies: Tendencies,
    active_cells: Option<ActiveCellIndex>,
}

impl<G: ImmersedMetrics> Model<G> {
    /// Build a model, checking the grid halo against the dynamics.
    pub fn new(grid: G, dynamics: Dynamics, tracers: &[&str]) -> Result<Self, ConfigurationError> {
        dynamics.advection.check_halo(&grid)?;
        dynamics.closure.check_halo(&grid)?;
        let state = ModelState::new(&grid, tracers);
        let buoyancy = match &dynamics.buoyancy {
            Some(name) => Some(state.tracer_index(name).ok_or_else(|| {
                ConfigurationError::Invalid(format!("buoyancy tracer {name:?} is not among the model tracers"))
            })?),
            None => None,
        };
        let tendencies = Tendencies::new(&grid, tracers.len());
        debug!(size = ?grid.size(), halo = ?grid.halo(), ?dynamics, "built model");
        Ok(Self {
            grid,
            dynamics,
            buoyancy,
            state,
            tendencies,
            active_cells: None,
        })
    }

    /// Restrict kernels to fluid cells, with edge subsets split off along
    /// the communicating horizontal axes.
    pub fn with_active_cells(mut self, communicating: [bool; 2]) -> Result<Self, ConfigurationError> {
        self.active_cells = Some(ActiveCellIndex::build_split(&self.grid, communicating)?);
        Ok(self)
    }

    #[inline]
    pub fn grid(&self) -> &G {
        &self.grid
    }

    #[inline]
    pub fn dynamics(&self) -> &Dynamics {
        &self.dynamics
    }

    #[inline]
    pub fn state(&self) -> &ModelState {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut ModelState {
        &mut self.state
    }

    #[inline]
    pub fn tendencies(&self) -> &Tendencies {
        &self.tendencies
    }

    #[inline]
    pub fn active_cells(&self) -> Option<&ActiveCellIndex> {
        self.active_cells.as_ref()
    }

    /// Interior cells, full depth.
    pub fn interior(&self) -> IndexBox {
        let [nx, ny, nz] = self.grid.size();
        IndexBox::new(1..=nx as isize, 1..=ny as isize, 1..=nz as isize)
    }

    /// Interior cells at least one halo width away from every
    /// communicating edge. Walled ends of a split axis do not shrink the box.
    pub fn interior_away_from(&self, communicating: [bool; 2]) -> IndexBox {
        let halo = self.grid.halo();
        let topology = self.grid.topology();
        let b = self.interior();
        let shift = |a: usize, high: bool| {
            if communicating[a] && !topology[a].has_wall(high) {
                halo[a] as isize
            } else {
                0
            }
        };
        IndexBox::new(
            b.i.start() + shift(0, false)..=b.i.end() - shift(0, true),
            b.j.start() + shift(1, false)..=b.j.end() - shift(1, true),
            b.k,
        )
    }

    /// Horizontal growth of `columns` by `by` cells, capped at `cap` cells
    /// into the halo. Flat axes do not grow.
    pub fn widen(&self, columns: &IndexBox, by: usize, cap: [usize; 2]) -> IndexBox {
        let grow = |axis: Axis, n: usize| {
            if self.grid.is_flat(axis) {
                0
            } else {
                by.min(n) as isize
            }
        };
        let limit = self.interior().expand(
            if self.grid.is_flat(Axis::X) { 0 } else { cap[0] as isize },
            if self.grid.is_flat(Axis::Y) { 0 } else { cap[1] as isize },
        );
        columns
            .expand(grow(Axis::X, cap[0]), grow(Axis::Y, cap[1]))
            .intersect(&limit)
    }

    /// Column ranges over which `w`/pressure and the diffusivity can be
    /// computed from the current halos.
    fn computable(&self) -> ([usize; 2], [usize; 2]) {
        let [hx, hy, _] = self.grid.halo();
        let rh = self.dynamics.closure.required_halo();
        (
            [hx.saturating_sub(1), hy.saturating_sub(1)],
            [hx.saturating_sub(rh), hy.saturating_sub(rh)],
        )
    }

    /// Recompute `w`, pressure and diffusivity for tendencies on `columns`:
    /// `w` and pressure one column wider, the diffusivity one column plus
    /// the closure's own halo wider.
    pub fn compute_auxiliary_fields(&mut self, columns: &IndexBox) {
        let (aux_cap, kappa_cap) = self.computable();
        let aux = self.widen(columns, 1, aux_cap);
        let kappa_range = self.widen(columns, 1 + self.dynamics.closure.required_halo(), kappa_cap);
        let grid = &self.grid;
        let state = &mut self.state;
        compute_w_from_continuity(grid, &state.u, &state.v, &mut state.w, &aux);
        if let Some(b) = self.buoyancy {
            compute_hydrostatic_pressure(grid, &state.tracers[b], &mut state.pressure, &aux);
        }
        let kappa_range = IndexBox::new(kappa_range.i, kappa_range.j, 1..=grid.size()[2] as isize);
        compute_diffusivities(
            self.dynamics.closure.as_ref(),
            grid,
            Velocities::new(&state.u, &state.v, &state.w),
            &mut state.diffusivity,
            &kappa_range,
        );
    }

    /// Auxiliary fields over every column they can be computed on.
    pub fn compute_all_auxiliary_fields(&mut self) {
        let (aux_cap, _) = self.computable();
        let everything = self.widen(&self.interior(), usize::MAX, aux_cap);
        self.compute_auxiliary_fields(&everything);
    }

    /// Tendencies at the indices of `set`.
    pub fn compute_tendencies_over<S: IndexSet + ?Sized>(&mut self, set: &S) {
        compute_tendencies(&self.grid, &self.dynamics, &self.state, &mut self.tendencies, set);
    }

    /// Interior pass: auxiliary fields everywhere, then tendencies on the
    /// cells that cannot read halo data.
    ///
    /// With an active-cell index this is its interior subset; otherwise the
    /// box away from the communicating edges.
    pub fn compute_interior_tendencies(&mut self, communicating: [bool; 2]) {
        self.compute_all_auxiliary_fields();
        let away = self.interior_away_from(communicating);
        match &self.active_cells {
            Some(index) => compute_tendencies(
                &self.grid,
                &self.dynamics,
                &self.state,
                &mut self.tendencies,
                index.interior(),
            ),
            None => compute_tendencies(&self.grid, &self.dynamics, &self.state, &mut self.tendencies, &away),
        }
    }

    /// Tendencies next to a communicating edge: the active-cell subset of
    /// `side` when the index is split, otherwise the whole `slab`.
    pub fn compute_edge_tendencies(&mut self, side: Side, slab: &IndexBox) {
        match self.active_cells.as_ref().and_then(|index| index.edge(side)) {
            Some(edge) => compute_tendencies(&self.grid, &self.dynamics, &self.state, &mut self.tendencies, edge),
            None => compute_tendencies(&self.grid, &self.dynamics, &self.state, &mut self.tendencies, slab),
        }
    }

    /// Single-region update: local halo fill, auxiliary fields, then every
    /// tendency.
    pub fn update_tendencies(&mut self) {
        self.state.fill_halo_regions();
        self.compute_all_auxiliary_fields();
        let interior = self.interior();
        let (grid, dynamics, state) = (&self.grid, &self.dynamics, &self.state);
        let tendencies = &mut self.tendencies;
        match &self.active_cells {
            Some(index) => {
                compute_tendencies(grid, dynamics, state, tendencies, index.interior());
                for side in Side::ALL {
                    if let Some(edge) = index.edge(side) {
                        compute_tendencies(grid, dynamics, state, tendencies, edge);
                    }
                }
            }
            None => compute_tendencies(grid, dynamics, state, tendencies, &interior),
        }
    }
}
