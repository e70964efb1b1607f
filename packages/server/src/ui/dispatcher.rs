//! Per-connection dispatcher.
//!
//! Translates transport events into registry operations and tracks the
//! connection lifecycle: `Connecting -> Joined -> Closed`. The dispatcher
//! is transport-agnostic; the WebSocket handler feeds it decoded events.

use std::{fmt, future::Future, sync::Arc};

use thiserror::Error;

use crate::{
    domain::{BroadcastReport, Connection, ConnectionId, ConnectionState},
    infrastructure::{
        connection::{ChannelConnection, OutboundReceiver},
        dto::websocket::{DecodeError, decode_inbound},
    },
    usecase::{JoinError, SendMessageError},
};

use super::state::AppState;

/// Lifecycle of a dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Connecting,
    Joined,
    Closed,
}

impl fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Joined => "joined",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Dispatcher errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Joining the room failed; the connection never became `Joined`
    #[error("Join failed: {0}")]
    Join(#[from] JoinError),

    /// The inbound frame could not be decoded; the connection was closed
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The broadcast failed; the connection stays open
    #[error(transparent)]
    Send(#[from] SendMessageError),

    /// The operation is not valid in the current state
    #[error("Operation not allowed while {0}")]
    InvalidState(DispatcherState),
}

/// Drives one client session.
pub struct Dispatcher {
    app: Arc<AppState>,
    state: DispatcherState,
    connection: Option<Arc<ChannelConnection>>,
}

impl Dispatcher {
    pub fn new(app: Arc<AppState>) -> Self {
        Self {
            app,
            state: DispatcherState::Connecting,
            connection: None,
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.connection.as_ref().map(|connection| *connection.id())
    }

    /// Resolves once the connection is closed, by this dispatcher or by the
    /// registry dropping it after a failed delivery. Resolves immediately
    /// if nothing has been opened.
    pub fn closed(&self) -> impl Future<Output = ()> + Send + 'static {
        let closed = self.connection.as_ref().map(|connection| connection.closed());
        async move {
            if let Some(closed) = closed {
                closed.await;
            }
        }
    }

    /// Validate the room name, create the connection and join its room.
    ///
    /// Returns the receiving half of the connection's outbound queue, to be
    /// drained by the transport writer. Any failure moves the dispatcher
    /// straight to `Closed`.
    pub async fn open(&mut self, room_name: &str) -> Result<OutboundReceiver, DispatchError> {
        if self.state != DispatcherState::Connecting {
            return Err(DispatchError::InvalidState(self.state));
        }

        let room_name = match self.app.join_room_usecase.validate(room_name) {
            Ok(room_name) => room_name,
            Err(e) => {
                self.state = DispatcherState::Closed;
                return Err(e.into());
            }
        };

        let (connection, rx) = ChannelConnection::new(room_name, self.app.outbound_capacity);
        let connection = Arc::new(connection);

        match self.app.join_room_usecase.execute(connection.clone()).await {
            Ok(outcome) => {
                tracing::debug!(
                    "Connection '{}' opened in room '{}' ({:?})",
                    connection.id(),
                    connection.room(),
                    outcome
                );
                self.connection = Some(connection);
                self.state = DispatcherState::Joined;
                Ok(rx)
            }
            Err(e) => {
                connection.close();
                self.state = DispatcherState::Closed;
                Err(e.into())
            }
        }
    }

    /// Handle an inbound text frame.
    ///
    /// A malformed frame closes the connection before the error is returned.
    pub async fn handle_text(&mut self, text: &str) -> Result<BroadcastReport, DispatchError> {
        let connection = self.joined().await?;

        let inbound = match decode_inbound(text) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::warn!("Closing connection '{}': {}", connection.id(), e);
                self.close().await;
                return Err(e.into());
            }
        };

        Ok(self
            .app
            .send_message_usecase
            .execute(connection.room(), connection.id(), inbound.into())
            .await?)
    }

    /// Reject a frame the protocol does not carry (e.g. binary) and close.
    pub async fn reject_frame(&mut self, kind: &'static str) -> DispatchError {
        if let Err(e) = self.joined().await {
            return e;
        }
        self.close().await;
        DecodeError::UnsupportedFrame(kind).into()
    }

    /// Leave the room, release the outbound queue and move to `Closed`.
    /// Idempotent.
    pub async fn close(&mut self) {
        if self.state == DispatcherState::Closed {
            return;
        }

        if let Some(connection) = &self.connection {
            let outcome = self
                .app
                .leave_room_usecase
                .execute(connection.room(), connection.id())
                .await;
            connection.close();
            tracing::info!(
                "Connection '{}' closed in room '{}' ({:?})",
                connection.id(),
                connection.room(),
                outcome
            );
        }

        self.state = DispatcherState::Closed;
    }

    /// The joined connection, as long as it is still open.
    ///
    /// A connection the registry has already closed moves the dispatcher to
    /// `Closed` instead.
    async fn joined(&mut self) -> Result<Arc<ChannelConnection>, DispatchError> {
        let connection = match (&self.state, &self.connection) {
            (DispatcherState::Joined, Some(connection)) => connection.clone(),
            _ => return Err(DispatchError::InvalidState(self.state)),
        };

        if connection.state() != ConnectionState::Open {
            tracing::info!(
                "Connection '{}' is no longer open in room '{}'",
                connection.id(),
                connection.room()
            );
            self.close().await;
            return Err(DispatchError::InvalidState(self.state));
        }

        Ok(connection)
    }
}
