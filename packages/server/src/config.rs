//! Server configuration.

use std::time::Duration;

use clap::Parser;

use crate::domain::BroadcastScope;

/// Default size of each connection's outbound queue
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

/// Command line configuration of the relay server
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "hiroba-server")]
#[command(about = "Room-scoped WebSocket chat relay", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = 8080)]
    pub port: u16,

    /// Outbound queue size per connection; a full queue drops the connection
    #[arg(long, default_value_t = DEFAULT_OUTBOUND_CAPACITY)]
    pub outbound_capacity: usize,

    /// Do not echo messages back to their sender
    #[arg(long)]
    pub exclude_sender: bool,

    /// Milliseconds a closing connection may spend flushing queued frames
    #[arg(long, default_value_t = 1000)]
    pub close_grace_ms: u64,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "debug")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn broadcast_scope(&self) -> BroadcastScope {
        if self.exclude_sender {
            BroadcastScope::ExcludeSender
        } else {
            BroadcastScope::IncludeSender
        }
    }

    pub fn close_grace(&self) -> Duration {
        Duration::from_millis(self.close_grace_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::parse_from(["hiroba-server"])
    }
}
