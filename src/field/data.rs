//! Halo-padded field storage.

use super::IndexBox;
use crate::grid::GridMetrics;
use crate::types::{Axis, Loc3, Location, Topology};

/// A dense array over one region's index space at a fixed staggering.
///
/// Each axis stores indices `1-H ..= N+H+1` (the extra slot holds the last
/// face of a bounded axis), laid out with `i` fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    loc: Loc3,
    size: [usize; 3],
    halo: [usize; 3],
    topology: [Topology; 3],
    strides: [usize; 3],
    data: Vec<f64>,
}

impl Field {
    /// A zero-initialised field on a grid.
    pub fn new(grid: &impl GridMetrics, loc: Loc3) -> Self {
        Self::with_shape(grid.size(), grid.halo(), grid.topology(), loc)
    }

    /// A zero-initialised field from raw shape information.
    pub fn with_shape(size: [usize; 3], halo: [usize; 3], topology: [Topology; 3], loc: Loc3) -> Self {
        let len = |a: usize| size[a] + 2 * halo[a] + 1;
        let strides = [1, len(0), len(0) * len(1)];
        let total = len(0) * len(1) * len(2);
        Self {
            loc,
            size,
            halo,
            topology,
            strides,
            data: vec![0.0; total],
        }
    }

    #[inline]
    pub fn loc(&self) -> Loc3 {
        self.loc
    }

    #[inline]
    pub fn size(&self) -> [usize; 3] {
        self.size
    }

    #[inline]
    pub fn halo(&self) -> [usize; 3] {
        self.halo
    }

    #[inline]
    pub fn topology(&self) -> [Topology; 3] {
        self.topology
    }

    /// Raw storage.
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    fn offset(&self, i: isize, j: isize, k: isize) -> usize {
        let o = |a: usize, idx: isize| {
            let slot = idx + self.halo[a] as isize - 1;
            debug_assert!(
                slot >= 0 && (slot as usize) < self.size[a] + 2 * self.halo[a] + 1,
                "index {idx} out of range along axis {a}"
            );
            slot as usize
        };
        o(0, i) + self.strides[1] * o(1, j) + self.strides[2] * o(2, k)
    }

    /// Value at `(i, j, k)`.
    #[inline]
    pub fn get(&self, i: isize, j: isize, k: isize) -> f64 {
        self.data[self.offset(i, j, k)]
    }

    /// Set the value at `(i, j, k)`.
    #[inline]
    pub fn set(&mut self, i: isize, j: isize, k: isize, value: f64) {
        let o = self.offset(i, j, k);
        self.data[o] = value;
    }

    /// Mutable reference to the value at `(i, j, k)`.
    #[inline]
    pub fn get_mut(&mut self, i: isize, j: isize, k: isize) -> &mut f64 {
        let o = self.offset(i, j, k);
        &mut self.data[o]
    }

    /// Last interior index along an axis for this staggering.
    ///
    /// Face locations on axes with a high-end wall carry one more interior
    /// index.
    #[inline]
    pub fn last_interior(&self, axis: Axis) -> isize {
        let a = axis.index();
        let n = self.size[a] as isize;
        match self.loc.along(axis) {
            Location::Face if self.topology[a].has_wall(true) => n + 1,
            _ => n,
        }
    }

    /// All interior indices.
    pub fn interior(&self) -> IndexBox {
        IndexBox::new(
            1..=self.last_interior(Axis::X),
            1..=self.last_interior(Axis::Y),
            1..=self.last_interior(Axis::Z),
        )
    }

    /// Interior plus halo indices.
    pub fn with_halo(&self) -> IndexBox {
        let r = |a: usize| 1 - self.halo[a] as isize..=(self.size[a] + self.halo[a]) as isize;
        IndexBox::new(r(0), r(1), r(2))
    }

    /// Every stored index, including the trailing face slot.
    pub fn storage(&self) -> IndexBox {
        let r = |a: usize| 1 - self.halo[a] as isize..=(self.size[a] + self.halo[a]) as isize + 1;
        IndexBox::new(r(0), r(1), r(2))
    }

    /// Set every value, halo included.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Set interior values from a function of the node coordinates.
    pub fn set_fn(&mut self, grid: &impl GridMetrics, f: impl Fn(f64, f64, f64) -> f64) {
        let loc = self.loc;
        for (i, j, k) in self.interior().iter() {
            let x = grid.node(Axis::X, loc.x, i);
            let y = grid.node(Axis::Y, loc.y, j);
            let z = grid.node(Axis::Z, loc.z, k);
            self.set(i, j, k, f(x, y, z));
        }
    }

    /// Copy the values inside `region` into a flat buffer, `i` fastest.
    pub fn pack(&self, region: &IndexBox) -> Vec<f64> {
        region.iter().map(|(i, j, k)| self.get(i, j, k)).collect()
    }

    /// Write a flat buffer produced by [`Field::pack`] into `region`.
    ///
    /// Returns the number of values written.
    pub fn unpack(&mut self, region: &IndexBox, buffer: &[f64]) -> usize {
        let mut n = 0;
        for ((i, j, k), &v) in region.iter().zip(buffer) {
            self.set(i, j, k, v);
            n += 1;
        }
        n
    }

    /// Largest absolute difference to another field over a region.
    pub fn max_abs_diff(&self, other: &Field, region: &IndexBox) -> f64 {
        region
            .iter()
            .map(|(i, j, k)| (self.get(i, j, k) - other.get(i, j, k)).abs())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::RectilinearGrid;

    fn grid() -> RectilinearGrid {
        RectilinearGrid::uniform(
            [4, 3, 2],
            [2, 2, 1],
            [4.0, 3.0, 2.0],
            [Topology::Periodic, Topology::Bounded, Topology::Bounded],
        )
        .unwrap()
    }

    #[test]
    fn test_get_set_with_halo() {
        let g = grid();
        let mut f = Field::new(&g, Loc3::CCC);
        f.set(-1, 0, 0, 3.0);
        f.set(6, 5, 3, 4.0);
        assert_eq!(f.get(-1, 0, 0), 3.0);
        assert_eq!(f.get(6, 5, 3), 4.0);
        assert_eq!(f.get(1, 1, 1), 0.0);
    }

    #[test]
    fn test_interior_depends_on_staggering() {
        let g = grid();
        let v = Field::new(&g, Loc3::CFC);
        assert_eq!(v.interior(), IndexBox::new(1..=4, 1..=4, 1..=2));
        let u = Field::new(&g, Loc3::FCC);
        assert_eq!(u.interior(), IndexBox::new(1..=4, 1..=3, 1..=2));
    }

    #[test]
    fn test_pack_unpack() {
        let g = grid();
        let mut f = Field::new(&g, Loc3::CCC);
        f.set_fn(&g, |x, y, _| x + 10.0 * y);
        let region = IndexBox::new(1..=2, 1..=3, 1..=1);
        let buf = f.pack(&region);
        assert_eq!(buf.len(), 6);

        let mut h = Field::new(&g, Loc3::CCC);
        assert_eq!(h.unpack(&region, &buf), 6);
        assert_eq!(h.max_abs_diff(&f, &region), 0.0);
    }
}
