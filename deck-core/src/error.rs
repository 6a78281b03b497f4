//! Error types for deck operations.

use thiserror::Error;

/// Result type for deck operations.
pub type DeckResult<T> = Result<T, DeckError>;

/// Errors that can occur in deck operations.
///
/// Capacity violations leave the tree untouched; the caller decides whether
/// to surface them to the user.
#[derive(Debug, Error)]
pub enum DeckError {
    /// Resource not found in the scene.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// A resource with this name is already registered.
    #[error("Duplicate resource name: {0}")]
    DuplicateName(String),

    /// A layout record names a parent that has not been loaded.
    #[error("Unknown parent resource: {0}")]
    UnknownParent(String),

    /// Invalid operation on a resource.
    #[error("Invalid operation on resource: {0}")]
    InvalidOperation(String),

    /// Aspirating more liquid than the container holds.
    #[error("Aspirating {requested}uL from {container} with {available}uL")]
    InsufficientVolume {
        /// Container name.
        container: String,
        /// Requested volume in microlitres.
        requested: f64,
        /// Volume currently in the container.
        available: f64,
    },

    /// Dispensing beyond the container's maximum volume.
    #[error(
        "Adding {requested}uL to {container} with {current}uL would exceed max volume of {max}uL"
    )]
    OverCapacity {
        /// Container name.
        container: String,
        /// Requested volume in microlitres.
        requested: f64,
        /// Volume currently in the container.
        current: f64,
        /// Maximum volume of the container.
        max: f64,
    },

    /// Negative or non-finite volume.
    #[error("Invalid volume: {0}")]
    InvalidVolume(f64),

    /// Picking up a tip from an empty tip spot.
    #[error("No tip to pick up at {0}")]
    NoTipPresent(String),

    /// Dropping a tip onto an occupied tip spot.
    #[error("Tip spot {0} already has a tip")]
    TipAlreadyPresent(String),

    /// Liquid operation on a resource that is not a container.
    #[error("Resource is not a container: {0}")]
    NotAContainer(String),

    /// Tip operation on a resource that is not a tip spot.
    #[error("Resource is not a tip spot: {0}")]
    NotATipSpot(String),

    /// Layout serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DeckError {
    /// Whether this error is a capacity violation (liquid or tip state).
    #[must_use]
    pub fn is_capacity_violation(&self) -> bool {
        matches!(
            self,
            Self::InsufficientVolume { .. }
                | Self::OverCapacity { .. }
                | Self::NoTipPresent(_)
                | Self::TipAlreadyPresent(_)
        )
    }
}
