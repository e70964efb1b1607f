//! Connection trait 定義
//!
//! 1 クライアントのセッション（ちょうど 1 つの Room に属する）を表す。
//! Room はこの trait を参照として保持するだけで、所有はしない
//! （所有者は Dispatcher）。

use std::sync::Arc;

use super::{ConnectionId, DeliveryError, RoomEvent, RoomName};

/// Lifecycle of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closing,
    Closed,
}

/// A single addressable client endpoint.
///
/// `enqueue` must never block: it either hands the event to the
/// connection's private outbound path or fails immediately.
#[cfg_attr(test, mockall::automock)]
pub trait Connection: Send + Sync {
    /// Opaque identity of this connection
    fn id(&self) -> &ConnectionId;

    /// The room this connection belongs to
    fn room(&self) -> &RoomName;

    /// Current lifecycle state
    fn state(&self) -> ConnectionState;

    /// Hand an event to the outbound path without waiting.
    ///
    /// # Errors
    ///
    /// * `DeliveryError::Closed` - the connection is closing or closed
    /// * `DeliveryError::Saturated` - the outbound queue is full
    fn enqueue(&self, event: Arc<RoomEvent>) -> Result<(), DeliveryError>;

    /// Transition to `Closed` and release the outbound path. Idempotent.
    fn close(&self);
}
