//! Service layer: the session driver and the runner that wires it to the
//! WebSocket channel tasks.

pub mod session;
pub mod session_driver;

pub use session::{SessionOutcome, drive_session, run_session};
pub use session_driver::{Credentials, SessionDriver, SessionResult};
