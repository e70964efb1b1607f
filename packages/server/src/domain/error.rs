//! Domain errors.

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// Room name is empty
    #[error("Room name must not be empty")]
    EmptyRoomName,

    /// Room name exceeds the maximum length
    #[error("Room name is too long (max {max} characters, got {actual})")]
    RoomNameTooLong { max: usize, actual: usize },

    /// Room name contains characters outside of the allowed charset
    #[error("Invalid room name '{0}': only letters, digits, hyphens and periods are allowed")]
    InvalidRoomName(String),
}

/// Outbound delivery errors for a single connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The connection is closing or already closed
    #[error("connection is closed")]
    Closed,

    /// The outbound queue is full
    #[error("outbound queue is saturated")]
    Saturated,
}

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The connection is bound to a different room than the one it tries to join
    #[error("Connection '{connection_id}' belongs to room '{owner}', cannot join '{requested}'")]
    RoomMismatch {
        connection_id: String,
        owner: String,
        requested: String,
    },

    /// Internal bookkeeping is inconsistent (programming error)
    #[error("Registry invariant violated: {0}")]
    InvariantViolation(String),
}
