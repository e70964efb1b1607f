//! `Connection` trait の実装
//!
//! - `channel`: tokio の bounded mpsc を送信キューとして使う実装

pub mod channel;

pub use channel::{ChannelConnection, OutboundReceiver};
