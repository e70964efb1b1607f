//! WebSocket relay server implementation.

mod dispatcher;
mod handler;
mod server;
mod signal;
pub mod state;

pub use dispatcher::{DispatchError, Dispatcher, DispatcherState};
pub use server::Server;
pub use signal::shutdown_signal;
