//! WebSocket layer: channel tasks and the JSON login messages.
//!
//! A session opens two client connections, one for authentication and one
//! for the realtime situation stream. Each runs in its own task driven by
//! [`connection::run_channel`].

pub mod connection;
pub mod messages;
