//! Strongly-typed index newtypes.
//!
//! Regions and ranks are both addressed by small integers; these types
//! keep them from being mixed up with each other or with cell indices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Macro to generate index newtypes with common functionality.
macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Create a new index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// Iterate over `[0, n)`.
            pub fn iter(n: usize) -> impl ExactSizeIterator<Item = Self> {
                (0..n).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }
    };
}

define_index!(
    /// Region index into a multi-region arena.
    ///
    /// # Example
    ///
    /// ```
    /// use fv_ocean::types::RegionId;
    ///
    /// let region = RegionId::new(4);
    /// assert_eq!(region.get(), 4);
    /// assert_eq!(region.to_string(), "R4");
    /// ```
    RegionId,
    "R"
);

define_index!(
    /// Rank index in a distributed partition.
    ///
    /// # Example
    ///
    /// ```
    /// use fv_ocean::types::RankId;
    ///
    /// let ranks: Vec<_> = RankId::iter(3).collect();
    /// assert_eq!(ranks[2].get(), 2);
    /// ```
    RankId,
    "P"
);
