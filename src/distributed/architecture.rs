//! The execution context handed to every distributed entry point.

use std::time::Duration;

use crate::error::ConfigurationError;
use crate::grid::GridMetrics;
use crate::types::{HorizontalSides, RankId};

use super::{Communicator, Partition};

/// Default wait for a halo message before giving up.
pub const DEFAULT_HALO_TIMEOUT: Duration = Duration::from_secs(30);

/// Partition, communicator endpoint and halo timeout of one rank.
///
/// Built once at setup and only read afterwards. Which edges communicate
/// is fixed here, from the rank count per axis and the periodicity of the
/// partition.
#[derive(Debug)]
pub struct Architecture {
    partition: Partition,
    communicator: Communicator,
    halo_timeout: Duration,
}

impl Architecture {
    pub fn new(partition: Partition, communicator: Communicator) -> Result<Self, ConfigurationError> {
        if communicator.size() != partition.size() || communicator.rank() != partition.rank() {
            return Err(ConfigurationError::Invalid(format!(
                "communicator rank {} of {} does not match partition rank {} of {}",
                communicator.rank(),
                communicator.size(),
                partition.rank(),
                partition.size()
            )));
        }
        Ok(Self {
            partition,
            communicator,
            halo_timeout: DEFAULT_HALO_TIMEOUT,
        })
    }

    /// Single rank, no communication.
    pub fn serial() -> Self {
        Self {
            partition: Partition::serial(),
            communicator: Communicator::serial(),
            halo_timeout: DEFAULT_HALO_TIMEOUT,
        }
    }

    /// One context per rank of an `Rx × Ry` decomposition, index `r`
    /// belonging to rank `r`.
    ///
    /// # Example
    ///
    /// ```
    /// use fv_ocean::distributed::Architecture;
    ///
    /// let ranks = Architecture::world([2, 2])?;
    /// assert_eq!(ranks.len(), 4);
    /// assert_eq!(ranks[3].partition().coords(), [1, 1]);
    /// assert_eq!(ranks[0].communicating(), [true, true]);
    /// # Ok::<(), fv_ocean::ConfigurationError>(())
    /// ```
    pub fn world(ranks: [usize; 2]) -> Result<Vec<Self>, ConfigurationError> {
        let size = ranks[0] * ranks[1];
        Communicator::world(size)
            .into_iter()
            .enumerate()
            .map(|(rank, comm)| Self::new(Partition::new(ranks, rank)?, comm))
            .collect()
    }

    /// One context per rank for splitting `global`, which may be bounded
    /// along a split axis.
    ///
    /// # Example
    ///
    /// ```
    /// use fv_ocean::distributed::Architecture;
    /// use fv_ocean::grid::RectilinearGrid;
    /// use fv_ocean::types::{Side, Topology};
    ///
    /// let global = RectilinearGrid::uniform(
    ///     [16, 8, 2],
    ///     [3, 3, 1],
    ///     [16.0, 8.0, 2.0],
    ///     [Topology::Bounded, Topology::Periodic, Topology::Bounded],
    /// )?;
    /// let ranks = Architecture::world_for(&global, [2, 1])?;
    /// assert!(!ranks[0].connected_sides()[Side::West]);
    /// assert!(ranks[0].connected_sides()[Side::East]);
    /// # Ok::<(), fv_ocean::ConfigurationError>(())
    /// ```
    pub fn world_for(global: &impl GridMetrics, ranks: [usize; 2]) -> Result<Vec<Self>, ConfigurationError> {
        let size = ranks[0] * ranks[1];
        Communicator::world(size)
            .into_iter()
            .enumerate()
            .map(|(rank, comm)| {
                let partition = Partition::for_grid(ranks, rank, global)?;
                partition.validate(global)?;
                Self::new(partition, comm)
            })
            .collect()
    }

    pub fn with_halo_timeout(mut self, timeout: Duration) -> Self {
        self.halo_timeout = timeout;
        self
    }

    #[inline]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    #[inline]
    pub fn communicator(&self) -> &Communicator {
        &self.communicator
    }

    #[inline]
    pub fn rank(&self) -> RankId {
        self.partition.rank()
    }

    #[inline]
    pub fn halo_timeout(&self) -> Duration {
        self.halo_timeout
    }

    #[inline]
    pub fn communicating(&self) -> [bool; 2] {
        self.partition.communicating()
    }

    /// Sides of this rank that exchange halos with another rank.
    #[inline]
    pub fn connected_sides(&self) -> HorizontalSides<bool> {
        self.partition.connected_sides()
    }

    #[inline]
    pub fn is_serial(&self) -> bool {
        self.partition.size() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatched_communicator_rejected() {
        let mut comms = Communicator::world(2);
        let second = comms.pop().unwrap();
        let partition = Partition::new([2, 1], 0).unwrap();
        assert!(Architecture::new(partition, second).is_err());
        assert!(Architecture::serial().is_serial());
        assert_eq!(
            Architecture::serial().with_halo_timeout(Duration::from_millis(5)).halo_timeout(),
            Duration::from_millis(5)
        );
    }
}
