//! Rectangular index ranges.

use std::ops::RangeInclusive;

/// An inclusive box of `(i, j, k)` indices.
///
/// Iteration runs `i` fastest, then `j`, then `k`. Empty ranges (start
/// greater than end) give an empty box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexBox {
    pub i: RangeInclusive<isize>,
    pub j: RangeInclusive<isize>,
    pub k: RangeInclusive<isize>,
}

impl IndexBox {
    pub fn new(i: RangeInclusive<isize>, j: RangeInclusive<isize>, k: RangeInclusive<isize>) -> Self {
        Self { i, j, k }
    }

    #[inline]
    fn extent(r: &RangeInclusive<isize>) -> usize {
        if r.end() < r.start() {
            0
        } else {
            (r.end() - r.start() + 1) as usize
        }
    }

    /// Number of indices in the box.
    pub fn len(&self) -> usize {
        Self::extent(&self.i) * Self::extent(&self.j) * Self::extent(&self.k)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, i: isize, j: isize, k: isize) -> bool {
        self.i.contains(&i) && self.j.contains(&j) && self.k.contains(&k)
    }

    /// Grow the horizontal ranges by `di` and `dj` on both ends.
    pub fn expand(&self, di: isize, dj: isize) -> Self {
        Self {
            i: self.i.start() - di..=self.i.end() + di,
            j: self.j.start() - dj..=self.j.end() + dj,
            k: self.k.clone(),
        }
    }

    /// Intersection with another box.
    pub fn intersect(&self, other: &Self) -> Self {
        let cut = |a: &RangeInclusive<isize>, b: &RangeInclusive<isize>| {
            *a.start().max(b.start())..=*a.end().min(b.end())
        };
        Self {
            i: cut(&self.i, &other.i),
            j: cut(&self.j, &other.j),
            k: cut(&self.k, &other.k),
        }
    }

    /// The `n`-th index in iteration order.
    #[inline]
    pub fn get(&self, n: usize) -> (isize, isize, isize) {
        let ei = Self::extent(&self.i);
        let ej = Self::extent(&self.j);
        let (a, b, c) = (n % ei, (n / ei) % ej, n / (ei * ej));
        (
            self.i.start() + a as isize,
            self.j.start() + b as isize,
            self.k.start() + c as isize,
        )
    }

    /// Iterate indices, `i` fastest.
    pub fn iter(&self) -> impl Iterator<Item = (isize, isize, isize)> + '_ {
        let (i, j) = (self.i.clone(), self.j.clone());
        self.k.clone().flat_map(move |k| {
            let i = i.clone();
            j.clone().flat_map(move |j| i.clone().map(move |i| (i, j, k)))
        })
    }
}
