//! UseCase errors.

use thiserror::Error;

use crate::domain::{RegistryError, ValueObjectError};

/// Join failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error(transparent)]
    InvalidRoomName(#[from] ValueObjectError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Message sending failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("Broadcast failed: {0}")]
    BroadcastFailed(#[from] RegistryError),
}

/// Room lookup failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error(transparent)]
    InvalidRoomName(#[from] ValueObjectError),

    #[error("Room not found")]
    RoomNotFound,
}
