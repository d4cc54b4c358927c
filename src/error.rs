//! Error types.
//!
//! Two families of failure are surfaced to callers:
//!
//! - [`ConfigurationError`]: detected once while building grids, schemes,
//!   partitions and index sets. Constructors return these before anything
//!   usable has been handed out.
//! - [`CommunicationError`]: halo transfers that do not finish within the
//!   configured timeout, or peers that disappeared.
//!
//! Per-cell numerical edge cases (the WENO `ε` regulariser, order fallback
//! next to solid cells) are part of the discretisation and never produce
//! errors.

use std::time::Duration;

use thiserror::Error;

use crate::types::Axis;

/// Setup-time configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A grid extent exceeds the widest supported index tier.
    #[error("Grid extent {extent} along {axis} exceeds the maximum supported extent {max}")]
    ExtentTooLarge { axis: Axis, extent: usize, max: usize },

    /// A grid extent of zero on a non-flat axis.
    #[error("Invalid extent along {axis}: {reason}")]
    InvalidExtent { axis: Axis, reason: String },

    /// WENO order outside the tabulated range.
    #[error("Unsupported WENO order {order}: supported orders are {min}..={max}")]
    UnsupportedWenoOrder { order: usize, min: usize, max: usize },

    /// Rank count along an axis does not divide the global extent.
    #[error("{ranks} ranks do not divide the {axis} extent {extent}")]
    IndivisiblePartition { axis: Axis, extent: usize, ranks: usize },

    /// Rank index outside the partition.
    #[error("Rank {rank} is outside a partition of {size} ranks")]
    InvalidRank { rank: usize, size: usize },

    /// Halo narrower than a stencil requires.
    #[error("Halo {halo} along {axis} is narrower than the {required} cells required by {by}")]
    InsufficientHalo {
        axis: Axis,
        halo: usize,
        required: usize,
        by: String,
    },

    /// Bottom height array does not match the horizontal grid shape.
    #[error("Bottom height array has {actual} entries, expected {expected}")]
    BottomShapeMismatch { expected: usize, actual: usize },

    /// Solid mask array does not match the grid shape.
    #[error("Solid mask has {actual} entries, expected {expected}")]
    MaskShapeMismatch { expected: usize, actual: usize },

    /// Non-positive or non-finite cell spacing.
    #[error("Invalid spacing along {axis}: {reason}")]
    InvalidSpacing { axis: Axis, reason: String },

    /// Any other invalid setting.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigurationError {
    /// Create an insufficient-halo error.
    pub fn insufficient_halo(axis: Axis, halo: usize, required: usize, by: impl Into<String>) -> Self {
        Self::InsufficientHalo {
            axis,
            halo,
            required,
            by: by.into(),
        }
    }

    /// Create an invalid-spacing error.
    pub fn invalid_spacing(axis: Axis, reason: impl Into<String>) -> Self {
        Self::InvalidSpacing {
            axis,
            reason: reason.into(),
        }
    }
}

/// Halo communication failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommunicationError {
    /// A halo message did not arrive in time.
    #[error("Rank {rank} timed out after {waited:?} waiting for tag {tag} from rank {peer}")]
    Timeout {
        rank: usize,
        peer: usize,
        tag: u64,
        waited: Duration,
    },

    /// The sending side of a channel was dropped.
    #[error("Rank {rank} lost its connection to rank {peer}")]
    PeerDisconnected { rank: usize, peer: usize },

    /// A received buffer does not match the halo slab it is meant for.
    #[error("Halo buffer for tag {tag} has {actual} values, expected {expected}")]
    BufferSizeMismatch {
        tag: u64,
        expected: usize,
        actual: usize,
    },

    /// A message was left unconsumed when none should remain.
    #[error("Rank {rank} holds an unexpected message with tag {tag} from rank {peer}")]
    UnexpectedMessage { rank: usize, peer: usize, tag: u64 },

    /// A peer rank index outside the communicator.
    #[error("Rank {rank} is not part of a communicator of size {size}")]
    UnknownRank { rank: usize, size: usize },
}

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Communication(#[from] CommunicationError),

    /// Malformed configuration document.
    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
