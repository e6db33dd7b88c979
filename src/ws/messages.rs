//! JSON messages of the authentication and realtime situation login
//! exchange.
//!
//! Requests share a `{"version", "type", "data"}` envelope; responses
//! carry `{"type", "result", "data"}`. A `result` of [`RESULT_OK`] means
//! success.

use serde::{Deserialize, Serialize};

use crate::domain::SessionId;
use crate::error::ClientError;

/// `result` value reported for a successful request.
pub const RESULT_OK: u32 = 1;

/// Discriminator for request and response types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// User login on the authentication channel.
    Login,
    /// Session login on the realtime situation channel.
    RealtimeSituationLogin,
}

impl MessageType {
    /// Returns the wire code of this message type.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Login => 1,
            Self::RealtimeSituationLogin => 2,
        }
    }
}

/// Outgoing request envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request<T> {
    /// Protocol version.
    pub version: u32,
    /// [`MessageType`] wire code.
    #[serde(rename = "type")]
    pub msg_type: u32,
    /// Type specific payload.
    pub data: T,
}

/// Payload of a login request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginData {
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Payload of a realtime situation login request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionData {
    /// Token obtained from login.
    pub session_id: SessionId,
}

/// Incoming response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    /// [`MessageType`] wire code, when the backend echoes it.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub msg_type: Option<u32>,
    /// Result code; [`RESULT_OK`] on success.
    pub result: u32,
    /// Type specific payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Response {
    /// Returns `true` if the result indicates success.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result == RESULT_OK
    }
}

/// Builds login requests and validates their responses.
///
/// Keeps the session id obtained from login so the realtime situation
/// login can reuse it.
#[derive(Debug, Clone)]
pub struct RealtimeSituationMessages {
    protocol_version: u32,
    session_id: Option<SessionId>,
}

impl RealtimeSituationMessages {
    /// Creates a message helper for the given protocol version.
    #[must_use]
    pub const fn new(protocol_version: u32) -> Self {
        Self {
            protocol_version,
            session_id: None,
        }
    }

    /// Session id from the last successful login.
    #[must_use]
    pub const fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Serializes a login request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Json`] if serialization fails.
    pub fn message_login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let request = Request {
            version: self.protocol_version,
            msg_type: MessageType::Login.code(),
            data: LoginData {
                username: username.to_string(),
                password: password.to_string(),
            },
        };
        Ok(serde_json::to_string(&request)?)
    }

    /// Serializes a realtime situation login request carrying `session_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Json`] if serialization fails.
    pub fn message_realtime_situation_login(
        &self,
        session_id: &SessionId,
    ) -> Result<String, ClientError> {
        let request = Request {
            version: self.protocol_version,
            msg_type: MessageType::RealtimeSituationLogin.code(),
            data: SessionData {
                session_id: session_id.clone(),
            },
        };
        Ok(serde_json::to_string(&request)?)
    }

    /// Validates a login response and records its session id.
    ///
    /// Returns `false` for malformed JSON, a non-OK result, or a missing
    /// session id.
    pub fn parse_login(&mut self, text: &str) -> bool {
        let Some(response) = parse_response(text, MessageType::Login) else {
            return false;
        };

        match response.data.get("session_id").and_then(|v| v.as_str()) {
            Some(token) if !token.is_empty() => {
                self.session_id = Some(SessionId::new(token));
                tracing::info!("login succeeded");
                true
            }
            _ => {
                tracing::error!("login response carries no session id");
                false
            }
        }
    }

    /// Validates a realtime situation login response.
    pub fn parse_realtime_situation_login(&self, text: &str) -> bool {
        let ok = parse_response(text, MessageType::RealtimeSituationLogin).is_some();
        if ok {
            tracing::info!("realtime situation login succeeded");
        }
        ok
    }
}

/// Decodes a response and keeps it only when it reports success.
fn parse_response(text: &str, expected: MessageType) -> Option<Response> {
    let response = match serde_json::from_str::<Response>(text) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, kind = ?expected, "malformed response");
            return None;
        }
    };

    if !response.is_ok() {
        tracing::error!(result = response.result, kind = ?expected, "request failed");
        return None;
    }

    Some(response)
}
