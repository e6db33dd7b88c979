//! # wnt-gateway
//!
//! Realtime situation client and gateway response builder for mesh network
//! telemetry backends.
//!
//! The client logs in over an authentication WebSocket, authenticates a
//! second realtime situation WebSocket with the obtained session id, waits
//! until the startup situation has loaded every announced node, and then
//! logs live telemetry. The response builder assembles the protobuf
//! envelopes a gateway sends back to its clients.
//!
//! ## Architecture
//!
//! ```text
//! Backend (authentication WS, realtime situation WS)
//!     │
//!     ├── Channel tasks (ws/)
//!     │
//!     ├── Session runner (service/)
//!     ├── SessionDriver (service/)
//!     │
//!     ├── SessionState, NodeLoad (domain/)
//!     └── Telemetry messages (proto/)
//!
//! Gateway clients
//!     │
//!     └── ResponseBuilder (response/) ── envelope messages (proto/)
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod proto;
pub mod response;
pub mod service;
pub mod ws;
