//! Domain layer for the relay.
//!
//! This module contains the room membership model and the interfaces
//! (`Connection`, `RoomRegistry`) that the infrastructure layer implements.

pub mod connection;
pub mod entity;
pub mod error;
pub mod event;
pub mod registry;
pub mod value_object;

pub use connection::{Connection, ConnectionState};
pub use entity::{Member, Room};
pub use error::{DeliveryError, RegistryError, ValueObjectError};
pub use event::RoomEvent;
pub use registry::{
    BroadcastReport, BroadcastScope, JoinOutcome, LeaveOutcome, MemberInfo, RoomDetail,
    RoomRegistry, RoomSummary,
};
pub use value_object::{ConnectionId, MessageContent, RoomName, Timestamp};

#[cfg(test)]
pub use connection::MockConnection;
#[cfg(test)]
pub use registry::MockRoomRegistry;
