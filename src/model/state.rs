//! Prognostic, diagnostic and tendency fields of one region.

use crate::advection::Velocities;
use crate::field::Field;
use crate::grid::GridMetrics;
use crate::types::Loc3;

/// Right-hand sides of the prognostic equations.
#[derive(Clone, Debug, PartialEq)]
pub struct Tendencies {
    pub u: Field,
    pub v: Field,
    pub tracers: Vec<Field>,
}

impl Tendencies {
    /// Zeroed tendencies for `n_tracers` tracers.
    pub fn new(grid: &impl GridMetrics, n_tracers: usize) -> Self {
        Self {
            u: Field::new(grid, Loc3::FCC),
            v: Field::new(grid, Loc3::CFC),
            tracers: (0..n_tracers).map(|_| Field::new(grid, Loc3::CCC)).collect(),
        }
    }

    /// Every tendency field, `u` and `v` first.
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        [&self.u, &self.v].into_iter().chain(self.tracers.iter())
    }
}

/// Fields of a hydrostatic model on one region.
///
/// `u`, `v` and the tracers are prognostic. `w`, `pressure` and
/// `diffusivity` are diagnosed from them before tendencies are computed.
/// Tendencies are kept apart so kernels can read the state while writing
/// them.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelState {
    pub u: Field,
    pub v: Field,
    pub w: Field,
    pub tracers: Vec<Field>,
    tracer_names: Vec<String>,
    /// Hydrostatic pressure anomaly at cell centers.
    pub pressure: Field,
    /// Horizontal eddy diffusivity at cell centers.
    pub diffusivity: Field,
}

impl ModelState {
    /// Zero-initialised state with the named tracers.
    pub fn new(grid: &impl GridMetrics, tracer_names: &[&str]) -> Self {
        Self {
            u: Field::new(grid, Loc3::FCC),
            v: Field::new(grid, Loc3::CFC),
            w: Field::new(grid, Loc3::CCF),
            tracers: tracer_names.iter().map(|_| Field::new(grid, Loc3::CCC)).collect(),
            tracer_names: tracer_names.iter().map(|s| s.to_string()).collect(),
            pressure: Field::new(grid, Loc3::CCC),
            diffusivity: Field::new(grid, Loc3::CCC),
        }
    }

    #[inline]
    pub fn n_tracers(&self) -> usize {
        self.tracers.len()
    }

    pub fn tracer_names(&self) -> &[String] {
        &self.tracer_names
    }

    /// Position of a tracer by name.
    pub fn tracer_index(&self, name: &str) -> Option<usize> {
        self.tracer_names.iter().position(|n| n == name)
    }

    pub fn tracer(&self, name: &str) -> Option<&Field> {
        self.tracer_index(name).map(|n| &self.tracers[n])
    }

    pub fn tracer_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.tracer_index(name).map(move |n| &mut self.tracers[n])
    }

    #[inline]
    pub fn velocities(&self) -> Velocities<'_> {
        Velocities::new(&self.u, &self.v, &self.w)
    }

    /// Fields whose halos must be exchanged before tendencies are valid:
    /// `u`, `v`, then every tracer.
    pub fn prognostic_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        [&mut self.u, &mut self.v].into_iter().chain(self.tracers.iter_mut())
    }

    /// Number of prognostic fields.
    pub fn n_prognostic(&self) -> usize {
        2 + self.tracers.len()
    }

    /// Fill local halos of the prognostic fields from their topology.
    pub fn fill_halo_regions(&mut self) {
        for field in self.prognostic_mut() {
            field.fill_halo_regions();
        }
    }
}
