//! Local halo fill from axis topology.
//!
//! Periodic axes copy the opposite end of the interior. Bounded axes use a
//! zero-gradient halo for centered values and an impenetrable (zero) value
//! for face-located values, which on a bounded axis are normal-flow
//! components. Connected ends are left untouched: their halos belong to the
//! distributed or multi-region exchange. Axes of a split bounded domain
//! are handled one end at a time. Flat axes have no halo.
//!
//! Axes are filled in x, y, z order over the full storage range of the
//! other axes, so corner halos of doubly periodic fields end up consistent.

use super::{Field, IndexBox};
use crate::types::{Axis, Location, Topology};

impl Field {
    /// Fill halo cells for every non-connected axis.
    pub fn fill_halo_regions(&mut self) {
        for axis in Axis::ALL {
            self.fill_halo_along(axis);
        }
    }

    /// Fill halo cells along one axis according to its topology.
    pub fn fill_halo_along(&mut self, axis: Axis) {
        let a = axis.index();
        let n = self.size()[a] as isize;
        let h = self.halo()[a] as isize;
        let loc = self.loc().along(axis);

        let plane = |field: &Field, idx: isize| {
            let IndexBox { i, j, k } = field.storage();
            let mut r = [i, j, k];
            r[a] = idx..=idx;
            let [i, j, k] = r;
            IndexBox::new(i, j, k)
        };

        let topology = self.topology()[a];
        if topology == Topology::Periodic {
            for idx in (1 - h..=0).chain(n + 1..=n + h + 1) {
                let src = (idx - 1).rem_euclid(n) + 1;
                self.copy_plane(&plane(self, src), &plane(self, idx));
            }
            return;
        }
        if topology.has_wall(false) {
            match loc {
                Location::Center => {
                    for idx in 1 - h..=0 {
                        self.copy_plane(&plane(self, 1), &plane(self, idx));
                    }
                }
                Location::Face => {
                    for idx in 1 - h..=1 {
                        let p = plane(self, idx);
                        self.set_plane(&p, 0.0);
                    }
                }
            }
        }
        if topology.has_wall(true) {
            match loc {
                Location::Center => {
                    for idx in n + 1..=n + h + 1 {
                        self.copy_plane(&plane(self, n), &plane(self, idx));
                    }
                }
                Location::Face => {
                    for idx in n + 1..=n + h + 1 {
                        let p = plane(self, idx);
                        self.set_plane(&p, 0.0);
                    }
                }
            }
        }
    }

    fn copy_plane(&mut self, src: &IndexBox, dst: &IndexBox) {
        let values = self.pack(src);
        self.unpack(dst, &values);
    }

    fn set_plane(&mut self, dst: &IndexBox, value: f64) {
        for (i, j, k) in dst.iter() {
            self.set(i, j, k, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::field::Field;
    use crate::grid::RectilinearGrid;
    use crate::types::{Loc3, Topology};

    fn grid(tx: Topology) -> RectilinearGrid {
        RectilinearGrid::uniform(
            [5, 3, 2],
            [2, 2, 1],
            [5.0, 3.0, 2.0],
            [tx, Topology::Bounded, Topology::Bounded],
        )
        .unwrap()
    }

    #[test]
    fn test_periodic_fill() {
        let g = grid(Topology::Periodic);
        let mut c = Field::new(&g, Loc3::CCC);
        c.set_fn(&g, |x, _, _| x);
        c.fill_halo_regions();
        assert_eq!(c.get(0, 1, 1), c.get(5, 1, 1));
        assert_eq!(c.get(-1, 1, 1), c.get(4, 1, 1));
        assert_eq!(c.get(6, 2, 1), c.get(1, 2, 1));
        assert_eq!(c.get(7, 2, 2), c.get(2, 2, 2));
    }

    #[test]
    fn test_bounded_center_is_zero_gradient() {
        let g = grid(Topology::Bounded);
        let mut c = Field::new(&g, Loc3::CCC);
        c.set_fn(&g, |x, y, _| x + y);
        c.fill_halo_regions();
        assert_eq!(c.get(0, 2, 1), c.get(1, 2, 1));
        assert_eq!(c.get(6, 2, 1), c.get(5, 2, 1));
        assert_eq!(c.get(3, 0, 1), c.get(3, 1, 1));
        assert_eq!(c.get(3, 2, 0), c.get(3, 2, 1));
    }

    #[test]
    fn test_bounded_face_is_impenetrable() {
        let g = grid(Topology::Bounded);
        let mut u = Field::new(&g, Loc3::FCC);
        u.fill(1.0);
        u.fill_halo_regions();
        assert_eq!(u.get(1, 2, 1), 0.0);
        assert_eq!(u.get(6, 2, 1), 0.0);
        assert_eq!(u.get(0, 2, 1), 0.0);
        assert_eq!(u.get(3, 2, 1), 1.0);
    }

    #[test]
    fn test_one_sided_walls() {
        let g = grid(Topology::RightConnected);
        let mut u = Field::new(&g, Loc3::FCC);
        u.fill(1.0);
        u.fill_halo_regions();
        assert_eq!(u.get(1, 2, 1), 0.0);
        assert_eq!(u.get(0, 2, 1), 0.0);
        assert_eq!(u.get(6, 2, 1), 1.0);
        assert_eq!(u.interior().i, 1..=5);

        let g = grid(Topology::LeftConnected);
        let mut c = Field::new(&g, Loc3::CCC);
        c.set_fn(&g, |x, _, _| x);
        c.set(0, 2, 1, -7.0);
        c.fill_halo_regions();
        assert_eq!(c.get(0, 2, 1), -7.0);
        assert_eq!(c.get(7, 2, 1), c.get(5, 2, 1));
        assert_eq!(Field::new(&g, Loc3::FCC).interior().i, 1..=6);
    }

    #[test]
    fn test_connected_axis_untouched() {
        let g = grid(Topology::Connected);
        let mut c = Field::new(&g, Loc3::CCC);
        c.fill(2.0);
        c.set(0, 1, 1, -7.0);
        c.fill_halo_regions();
        assert_eq!(c.get(0, 1, 1), -7.0);
    }
}
