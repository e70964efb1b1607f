//! tokio の bounded mpsc を使った Connection 実装
//!
//! ## 責務
//!
//! - 送信キュー（`mpsc::Sender`）の保持と、ブロックしない enqueue
//! - close による送信キューの解放
//!
//! キューの受信側（`OutboundReceiver`）は UI 層の writer タスクが所有し、
//! WebSocket へ書き出します。全ての `Sender` が解放されると受信側は
//! キューに残ったイベントを書き出した後に終了します。

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::{
    mpsc::{self, error::TrySendError},
    watch,
};

use crate::domain::{
    Connection, ConnectionId, ConnectionState, DeliveryError, RoomEvent, RoomName,
};

/// Receiving half of a connection's outbound queue
pub type OutboundReceiver = mpsc::Receiver<Arc<RoomEvent>>;

/// Connection backed by a bounded mpsc queue.
pub struct ChannelConnection {
    id: ConnectionId,
    room: RoomName,
    /// `None` once the connection has been closed
    sender: Mutex<Option<mpsc::Sender<Arc<RoomEvent>>>>,
    /// Flips to `true` on close
    closed: watch::Sender<bool>,
}

impl ChannelConnection {
    /// Create a connection for `room` with an outbound queue of `capacity`
    /// events (at least 1).
    pub fn new(room: RoomName, capacity: usize) -> (Self, OutboundReceiver) {
        Self::with_id(ConnectionId::generate(), room, capacity)
    }

    pub fn with_id(id: ConnectionId, room: RoomName, capacity: usize) -> (Self, OutboundReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let connection = Self {
            id,
            room,
            sender: Mutex::new(Some(tx)),
            closed: watch::Sender::new(false),
        };
        (connection, rx)
    }

    /// Resolves once `close()` has run, whoever called it.
    ///
    /// Lets the inbound loop stop when the registry drops this connection.
    pub fn closed(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut closed = self.closed.subscribe();
        async move {
            let _ = closed.wait_for(|closed| *closed).await;
        }
    }

    fn sender(&self) -> MutexGuard<'_, Option<mpsc::Sender<Arc<RoomEvent>>>> {
        // the guarded value stays consistent even if a holder panicked
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Connection for ChannelConnection {
    fn id(&self) -> &ConnectionId {
        &self.id
    }

    fn room(&self) -> &RoomName {
        &self.room
    }

    /// `Closing` means the writer side is gone but `close()` has not run yet.
    fn state(&self) -> ConnectionState {
        match self.sender().as_ref() {
            Some(sender) if sender.is_closed() => ConnectionState::Closing,
            Some(_) => ConnectionState::Open,
            None => ConnectionState::Closed,
        }
    }

    fn enqueue(&self, event: Arc<RoomEvent>) -> Result<(), DeliveryError> {
        let sender = self.sender();
        let Some(sender) = sender.as_ref() else {
            return Err(DeliveryError::Closed);
        };

        sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Saturated,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    fn close(&self) {
        if self.sender().take().is_some() {
            self.closed.send_replace(true);
            tracing::debug!("Connection '{}' closed", self.id);
        }
    }
}
