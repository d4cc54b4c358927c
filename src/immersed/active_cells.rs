//! Compacted index of fluid cells.
//!
//! The index lists every interior cell whose center is not solid, in scan
//! order (`i` fastest, then `j`, then `k`). Indices are packed into the
//! narrowest unsigned integer tier able to hold `max(Nx, Ny, Nz)`.
//!
//! On a partitioned grid the list is split into five disjoint subsets: the
//! bulk `interior`, computable before halos arrive, and one subset per
//! communicating edge. A cell near several edges belongs to the first of
//! west, east, south, north that claims it.
//!
//! Construction streams one horizontal slab at a time; only the current
//! slab's mask is ever materialized.

use tracing::debug;

use super::grid::ImmersedMetrics;
use crate::error::ConfigurationError;
use crate::grid::MAX_SUPPORTED_EXTENT;
use crate::types::{Axis, HorizontalSides, Loc3, Side};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ============================================================================
// Integer tiers
// ============================================================================

/// Storage width of packed indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum IndexWidth {
    U8,
    U16,
    U32,
    U64,
}

impl IndexWidth {
    /// Narrowest tier that can represent indices up to `extent` along
    /// `axis`.
    pub fn for_extent(axis: Axis, extent: usize) -> Result<Self, ConfigurationError> {
        if extent > MAX_SUPPORTED_EXTENT {
            return Err(ConfigurationError::ExtentTooLarge {
                axis,
                extent,
                max: MAX_SUPPORTED_EXTENT,
            });
        }
        Ok(if extent <= u8::MAX as usize {
            Self::U8
        } else if extent <= u16::MAX as usize {
            Self::U16
        } else if extent <= u32::MAX as usize {
            Self::U32
        } else {
            Self::U64
        })
    }

    /// Narrowest tier for every index of a grid of `size`.
    pub fn for_size(size: [usize; 3]) -> Result<Self, ConfigurationError> {
        let mut widest = Self::U8;
        for axis in Axis::ALL {
            widest = widest.max(Self::for_extent(axis, size[axis.index()])?);
        }
        Ok(widest)
    }

    pub const fn bits(self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::U32 => 32,
            Self::U64 => 64,
        }
    }
}

/// A list of `(i, j, k)` triples stored at one integer width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PackedIndices {
    U8(Vec<[u8; 3]>),
    U16(Vec<[u16; 3]>),
    U32(Vec<[u32; 3]>),
    U64(Vec<[u64; 3]>),
}

impl PackedIndices {
    pub fn new(width: IndexWidth) -> Self {
        match width {
            IndexWidth::U8 => Self::U8(Vec::new()),
            IndexWidth::U16 => Self::U16(Vec::new()),
            IndexWidth::U32 => Self::U32(Vec::new()),
            IndexWidth::U64 => Self::U64(Vec::new()),
        }
    }

    pub fn width(&self) -> IndexWidth {
        match self {
            Self::U8(_) => IndexWidth::U8,
            Self::U16(_) => IndexWidth::U16,
            Self::U32(_) => IndexWidth::U32,
            Self::U64(_) => IndexWidth::U64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an interior index. The caller guarantees it fits the tier.
    #[inline]
    fn push(&mut self, i: usize, j: usize, k: usize) {
        match self {
            Self::U8(v) => v.push([i as u8, j as u8, k as u8]),
            Self::U16(v) => v.push([i as u16, j as u16, k as u16]),
            Self::U32(v) => v.push([i as u32, j as u32, k as u32]),
            Self::U64(v) => v.push([i as u64, j as u64, k as u64]),
        }
    }

    /// The `n`-th index.
    #[inline]
    pub fn get(&self, n: usize) -> (isize, isize, isize) {
        match self {
            Self::U8(v) => unpack(v[n]),
            Self::U16(v) => unpack(v[n]),
            Self::U32(v) => unpack(v[n]),
            Self::U64(v) => unpack(v[n]),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (isize, isize, isize)> + '_ {
        (0..self.len()).map(move |n| self.get(n))
    }

    fn shrink_to_fit(&mut self) {
        match self {
            Self::U8(v) => v.shrink_to_fit(),
            Self::U16(v) => v.shrink_to_fit(),
            Self::U32(v) => v.shrink_to_fit(),
            Self::U64(v) => v.shrink_to_fit(),
        }
    }
}

#[inline]
fn unpack<T: Copy + TryInto<isize>>(t: [T; 3]) -> (isize, isize, isize) {
    let c = |x: T| x.try_into().unwrap_or(isize::MAX);
    (c(t[0]), c(t[1]), c(t[2]))
}

// ============================================================================
// Index
// ============================================================================

/// Fluid cells of one region, optionally split by partition edge.
#[derive(Clone, Debug)]
pub struct ActiveCellIndex {
    width: IndexWidth,
    size: [usize; 3],
    interior: PackedIndices,
    edges: HorizontalSides<Option<PackedIndices>>,
    surface: Vec<bool>,
}

impl ActiveCellIndex {
    /// Index every fluid cell without splitting.
    pub fn build(grid: &impl ImmersedMetrics) -> Result<Self, ConfigurationError> {
        Self::build_split(grid, [false, false])
    }

    /// Index every fluid cell, splitting off edge subsets along the
    /// horizontal axes flagged in `communicating` (`[x, y]`). A walled end
    /// of a split bounded axis gets no subset and leaves its cells in the
    /// interior.
    pub fn build_split(grid: &impl ImmersedMetrics, communicating: [bool; 2]) -> Result<Self, ConfigurationError> {
        let [nx, ny, nz] = grid.size();
        let [hx, hy, _] = grid.halo();
        let width = IndexWidth::for_size(grid.size())?;

        let topology = grid.topology();
        let split = |side: Side| {
            let a = side.axis().index();
            communicating[a] && !topology[a].has_wall(side.is_high())
        };

        let mut interior = PackedIndices::new(width);
        let mut edges = HorizontalSides::new(
            split(Side::West).then(|| PackedIndices::new(width)),
            split(Side::East).then(|| PackedIndices::new(width)),
            split(Side::South).then(|| PackedIndices::new(width)),
            split(Side::North).then(|| PackedIndices::new(width)),
        );
        let mut surface = vec![false; nx * ny];

        let (hx, hy) = (hx as isize, hy as isize);
        let (nxi, nyi) = (nx as isize, ny as isize);
        let claims = |side: Side, i: isize, j: isize| {
            split(side)
                && match side {
                    Side::West => i <= hx,
                    Side::East => i >= nxi - hx,
                    Side::South => j <= hy,
                    Side::North => j >= nyi - hy,
                }
        };

        for k in 1..=nz {
            let slab = fluid_slab(grid, k as isize);
            for (n, _) in slab.iter().enumerate().filter(|(_, fluid)| **fluid) {
                let (i, j) = (n % nx + 1, n / nx + 1);
                surface[n] = true;
                let owner = Side::ALL
                    .into_iter()
                    .find(|&side| claims(side, i as isize, j as isize));
                match owner.and_then(|side| edges[side].as_mut()) {
                    Some(list) => list.push(i, j, k),
                    None => interior.push(i, j, k),
                }
            }
        }

        interior.shrink_to_fit();
        let index = Self {
            width,
            size: [nx, ny, nz],
            interior,
            edges: edges.map(|list| {
                list.map(|mut l| {
                    l.shrink_to_fit();
                    l
                })
            }),
            surface,
        };
        debug!(
            width = index.width.bits(),
            interior = index.interior.len(),
            west = index.edge_len(Side::West),
            east = index.edge_len(Side::East),
            south = index.edge_len(Side::South),
            north = index.edge_len(Side::North),
            active_columns = index.n_active_columns(),
            "built active cell index"
        );
        Ok(index)
    }

    #[inline]
    pub fn width(&self) -> IndexWidth {
        self.width
    }

    /// Indices away from every communicating edge, or all indices when
    /// unsplit.
    #[inline]
    pub fn interior(&self) -> &PackedIndices {
        &self.interior
    }

    /// The subset next to one edge, if that edge communicates.
    #[inline]
    pub fn edge(&self, side: Side) -> Option<&PackedIndices> {
        self.edges[side].as_ref()
    }

    fn edge_len(&self, side: Side) -> usize {
        self.edge(side).map_or(0, PackedIndices::len)
    }

    /// Whether the index was built with edge subsets.
    pub fn is_split(&self) -> bool {
        self.edges.iter().any(|(_, e)| e.is_some())
    }

    /// Total number of active cells.
    pub fn len(&self) -> usize {
        self.interior.len() + Side::ALL.into_iter().map(|s| self.edge_len(s)).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every active index: interior first, then the edge subsets in
    /// west, east, south, north order.
    pub fn iter(&self) -> impl Iterator<Item = (isize, isize, isize)> + '_ {
        let edges = Side::ALL.into_iter().filter_map(move |s| self.edge(s));
        std::iter::once(&self.interior).chain(edges).flat_map(PackedIndices::iter)
    }

    /// Whether column `(i, j)` holds at least one fluid cell.
    #[inline]
    pub fn is_surface_active(&self, i: isize, j: isize) -> bool {
        let nx = self.size[0];
        if i < 1 || j < 1 || i as usize > nx || j as usize > self.size[1] {
            return false;
        }
        self.surface[(i - 1) as usize + nx * (j - 1) as usize]
    }

    pub fn n_active_columns(&self) -> usize {
        self.surface.iter().filter(|&&a| a).count()
    }
}

/// Fluid flags of slab `k`, `i` fastest.
fn fluid_slab(grid: &impl ImmersedMetrics, k: isize) -> Vec<bool> {
    let [nx, ny, _] = grid.size();
    let fluid = |n: usize| {
        let (i, j) = ((n % nx + 1) as isize, (n / nx + 1) as isize);
        !grid.solid_node(Loc3::CCC, i, j, k)
    };
    #[cfg(feature = "parallel")]
    {
        (0..nx * ny).into_par_iter().map(fluid).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..nx * ny).map(fluid).collect()
    }
}

/// Build the active-cell index of a grid.
///
/// `communicating` flags the horizontal axes (`[x, y]`) split across more
/// than one rank.
pub fn build_active_cell_index(
    grid: &impl ImmersedMetrics,
    communicating: [bool; 2],
) -> Result<ActiveCellIndex, ConfigurationError> {
    ActiveCellIndex::build_split(grid, communicating)
}
