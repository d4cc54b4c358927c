//! Constant diffusivity.

use serde::{Deserialize, Serialize};

use super::DiffusivityClosure;
use crate::advection::Velocities;
use crate::immersed::ImmersedMetrics;

/// Spatially uniform horizontal and vertical diffusivities (m²/s).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstantDiffusivity {
    pub horizontal: f64,
    pub vertical: f64,
}

impl ConstantDiffusivity {
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self { horizontal, vertical }
    }
}

impl Default for ConstantDiffusivity {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl DiffusivityClosure for ConstantDiffusivity {
    fn name(&self) -> &'static str {
        "ConstantDiffusivity"
    }

    fn horizontal_diffusivity(
        &self,
        _grid: &dyn ImmersedMetrics,
        _velocities: Velocities<'_>,
        _i: isize,
        _j: isize,
        _k: isize,
    ) -> f64 {
        self.horizontal
    }

    fn vertical_diffusivity(&self) -> f64 {
        self.vertical
    }
}
