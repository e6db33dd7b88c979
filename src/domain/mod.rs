//! Domain layer: session state, identifiers, and channel events.
//!
//! This module contains the client-side domain model: the linear
//! handshake state machine, the session token, startup situation progress,
//! and the events and actions that flow between channel tasks and the
//! session driver.

pub mod channel_event;
pub mod node_load;
pub mod session_id;
pub mod session_state;

pub use channel_event::{Channel, ChannelEvent, DriverAction, Frame};
pub use node_load::NodeLoad;
pub use session_id::SessionId;
pub use session_state::SessionState;
