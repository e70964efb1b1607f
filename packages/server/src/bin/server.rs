//! Room-scoped WebSocket chat relay.
//!
//! Clients connect to `/ws/chat/<room_name>` and every text frame
//! `{"message": "..."}` is relayed to all members of the same room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --exclude-sender
//! ```

use std::sync::Arc;

use clap::Parser;
use hiroba_server::{
    config::ServerConfig, infrastructure::registry::InMemoryRoomRegistry, ui::Server,
    ui::state::AppState,
};
use hiroba_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    tracing::debug!("Starting with {:?}", config);

    // Initialize dependencies in order:
    // 1. Registry
    // 2. AppState (UseCases)
    // 3. Server
    let registry = Arc::new(InMemoryRoomRegistry::new());
    let state = AppState::new(registry, &config);
    let server = Server::new(state);

    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
