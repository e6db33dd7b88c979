//! Protobuf message types exchanged with the backend and with gateway
//! clients.
//!
//! Messages are hand-declared with `prost` derives; there is no build-time
//! code generation step.
//!
//! - [`wnt`]: telemetry records streamed on the realtime situation channel
//! - [`gateway`]: response header and customer response envelope

pub mod gateway;
pub mod wnt;
