//! Infrastructure layer: concrete implementations of the domain interfaces
//! and the wire format.

pub mod connection;
pub mod dto;
pub mod registry;
