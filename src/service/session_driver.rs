//! Session handshake state machine.
//!
//! [`SessionDriver`] is sans-IO: it consumes [`ChannelEvent`]s and returns
//! [`DriverAction`]s for the session runner to execute. It is the only
//! owner of the session state, the node load counters, and the session
//! result, so events from both channels are applied one at a time.

use crate::domain::{Channel, ChannelEvent, DriverAction, Frame, NodeLoad, SessionState};
use crate::error::ClientError;
use crate::proto::wnt;
use crate::ws::messages::RealtimeSituationMessages;

/// Login credentials for the authentication channel.
#[derive(Clone)]
pub struct Credentials {
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Final outcome recorded by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionResult {
    /// Still running, or stopped externally without failure.
    Pending,
    /// Reached [`SessionState::End`].
    Succeeded,
    /// A response failed validation or a channel broke.
    Failed,
}

/// Drives the login handshake and startup situation tracking.
#[derive(Debug)]
pub struct SessionDriver {
    state: SessionState,
    credentials: Credentials,
    messages: RealtimeSituationMessages,
    node_load: NodeLoad,
    result: SessionResult,
    stopping: bool,
}

impl SessionDriver {
    /// Creates a driver in the state right after [`SessionState::Start`].
    #[must_use]
    pub fn new(credentials: Credentials, messages: RealtimeSituationMessages) -> Self {
        Self {
            state: SessionState::initial(),
            credentials,
            messages,
            node_load: NodeLoad::new(),
            result: SessionResult::Pending,
            stopping: false,
        }
    }

    /// Current handshake state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Outcome recorded so far.
    #[must_use]
    pub const fn result(&self) -> SessionResult {
        self.result
    }

    /// Startup situation progress.
    #[must_use]
    pub const fn node_load(&self) -> &NodeLoad {
        &self.node_load
    }

    /// Login helper, including the session id once obtained.
    #[must_use]
    pub const fn messages(&self) -> &RealtimeSituationMessages {
        &self.messages
    }

    /// Returns `true` once both channels have been asked to stop.
    #[must_use]
    pub const fn is_stopping(&self) -> bool {
        self.stopping
    }

    /// Dispatches one channel event to its handler.
    pub fn handle(&mut self, event: ChannelEvent) -> Vec<DriverAction> {
        match event {
            ChannelEvent::Opened(channel) => self.on_open(channel),
            ChannelEvent::Received(Channel::Authentication, frame) => {
                self.on_auth_message(&frame.to_text())
            }
            ChannelEvent::Received(Channel::RealtimeSituation, frame) => {
                self.on_realtime_message(&frame)
            }
            ChannelEvent::Failed {
                channel,
                error,
                running,
            } => self.on_error(channel, &error, running),
            ChannelEvent::Closed(channel) => self.on_close(channel),
        }
    }

    /// Builds the request for the current state.
    ///
    /// Only [`SessionState::Login`] and
    /// [`SessionState::RealtimeSituationLogin`] send anything.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Json`] if the request cannot be serialized,
    /// or [`ClientError::Protocol`] if the realtime situation login is due
    /// before a session id was obtained.
    pub fn send_request(&self) -> Result<Option<DriverAction>, ClientError> {
        let action = match self.state {
            SessionState::Login => Some(DriverAction::Send {
                channel: Channel::Authentication,
                text: self
                    .messages
                    .message_login(&self.credentials.username, &self.credentials.password)?,
            }),
            SessionState::RealtimeSituationLogin => {
                let Some(session_id) = self.messages.session_id() else {
                    return Err(ClientError::Protocol(
                        "realtime situation login requires a session id".to_string(),
                    ));
                };
                Some(DriverAction::Send {
                    channel: Channel::RealtimeSituation,
                    text: self.messages.message_realtime_situation_login(session_id)?,
                })
            }
            _ => None,
        };
        Ok(action)
    }

    /// Validates an authentication channel response for the current state.
    ///
    /// Only login responses have a parser; in every other state the
    /// authentication channel is not expected to talk and any message is
    /// reported as a failure.
    pub fn parse_response(&mut self, text: &str) -> bool {
        match self.state {
            SessionState::Login => self.messages.parse_login(text),
            state => {
                tracing::warn!(%state, "no authentication response expected");
                false
            }
        }
    }

    /// Handles a channel becoming ready.
    pub fn on_open(&mut self, channel: Channel) -> Vec<DriverAction> {
        tracing::info!(%channel, "socket open");
        let mut actions = Vec::new();
        if channel == Channel::Authentication {
            self.push_request(&mut actions);
        }
        actions
    }

    /// Handles a message on the authentication channel.
    pub fn on_auth_message(&mut self, text: &str) -> Vec<DriverAction> {
        let mut actions = Vec::new();
        if self.stopping {
            tracing::debug!("ignoring authentication message during shutdown");
            return actions;
        }

        if !self.parse_response(text) {
            tracing::error!(state = %self.state, "session failed, exiting");
            self.fail(&mut actions);
            return actions;
        }

        if self.state.is_passive() {
            return actions;
        }

        self.advance();
        if self.state.is_terminal() {
            self.result = SessionResult::Succeeded;
            actions.extend(self.stop_connections());
        } else {
            self.push_request(&mut actions);
        }
        actions
    }

    /// Handles a frame on the realtime situation channel.
    pub fn on_realtime_message(&mut self, frame: &Frame) -> Vec<DriverAction> {
        let mut actions = Vec::new();
        if self.stopping {
            tracing::debug!("ignoring realtime situation message during shutdown");
            return actions;
        }

        match self.state {
            SessionState::RealtimeSituationLogin => {
                if self
                    .messages
                    .parse_realtime_situation_login(&frame.to_text())
                {
                    self.advance();
                    self.push_request(&mut actions);
                } else {
                    tracing::error!(state = %self.state, "session failed, exiting");
                    self.fail(&mut actions);
                }
                return actions;
            }
            SessionState::WaitForStartupSituation => match wnt::decode_message(frame.as_bytes()) {
                Ok(message) => {
                    if self.node_load.observe(&message) {
                        tracing::info!(
                            nodes = self.node_load.loaded(),
                            "startup situation loaded"
                        );
                        self.advance();
                    }
                }
                Err(e) => tracing::warn!(
                    error = %e,
                    code = e.error_code(),
                    "undecodable startup situation message"
                ),
            },
            _ => {}
        }

        // Frames are either a batch or a single heartbeat; only batches
        // are logged.
        if let Ok(collection) = wnt::decode_collection(frame.as_bytes()) {
            for record in &collection.message_collection {
                tracing::info!(?record, "telemetry");
            }
        }
        actions
    }

    /// Handles a transport error.
    ///
    /// Errors are only reported while the channel was meant to be running;
    /// such an error ends the session.
    pub fn on_error(&mut self, channel: Channel, error: &str, running: bool) -> Vec<DriverAction> {
        let mut actions = Vec::new();
        if running && !self.stopping {
            tracing::error!(%channel, %error, "socket error");
            self.fail(&mut actions);
        }
        actions
    }

    /// Handles a channel closing.
    ///
    /// A close is normal once the channel has done its part of the
    /// handshake: the authentication channel is only logged, and a lost
    /// realtime situation channel ends the run without recording a
    /// failure. A close before the channel's login answer arrived means
    /// the handshake cannot complete and fails the session.
    pub fn on_close(&mut self, channel: Channel) -> Vec<DriverAction> {
        let mut actions = Vec::new();
        match channel {
            Channel::Authentication => tracing::info!(%channel, "socket close"),
            Channel::RealtimeSituation => tracing::warn!(%channel, "socket close"),
        }
        if self.stopping {
            return actions;
        }

        if self.awaits_login(channel) {
            tracing::error!(%channel, state = %self.state, "channel closed during handshake");
            self.fail(&mut actions);
        } else if channel == Channel::RealtimeSituation {
            tracing::info!(state = %self.state, "realtime situation ended by backend");
            actions.extend(self.stop_connections());
        }
        actions
    }

    /// Requests both channels to stop. Only the first call emits
    /// [`DriverAction::Stop`].
    pub fn stop_connections(&mut self) -> Option<DriverAction> {
        if self.stopping {
            return None;
        }
        self.stopping = true;
        Some(DriverAction::Stop)
    }

    /// Whether `channel` still has a login answer outstanding.
    const fn awaits_login(&self, channel: Channel) -> bool {
        match channel {
            Channel::Authentication => matches!(self.state, SessionState::Login),
            Channel::RealtimeSituation => matches!(
                self.state,
                SessionState::Login | SessionState::RealtimeSituationLogin
            ),
        }
    }

    fn advance(&mut self) {
        let next = self.state.next();
        tracing::debug!(from = %self.state, to = %next, "state transition");
        self.state = next;
    }

    fn push_request(&mut self, actions: &mut Vec<DriverAction>) {
        match self.send_request() {
            Ok(Some(action)) => actions.push(action),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, code = e.error_code(), "cannot build request");
                self.fail(actions);
            }
        }
    }

    fn fail(&mut self, actions: &mut Vec<DriverAction>) {
        if self.result != SessionResult::Succeeded {
            self.result = SessionResult::Failed;
        }
        actions.extend(self.stop_connections());
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use prost::Message as _;
    use serde_json::json;

    use super::*;
    use crate::domain::SessionId;
    use crate::proto::wnt::{Message, MessageCollection, RtSituationMetadata};

    fn driver() -> SessionDriver {
        SessionDriver::new(
            Credentials {
                username: "operator".to_string(),
                password: "secret".to_string(),
            },
            RealtimeSituationMessages::new(2),
        )
    }

    fn login_ok(session_id: &str) -> String {
        json!({ "type": 1, "result": 1, "data": { "session_id": session_id } }).to_string()
    }

    fn rts_login(result: u32) -> Frame {
        Frame::Text(json!({ "type": 2, "result": result }).to_string())
    }

    fn metadata(count: u32) -> Frame {
        let msg = Message {
            rtsituation_metadata: Some(RtSituationMetadata {
                node_count: Some(count),
            }),
            ..Message::default()
        };
        Frame::Binary(msg.encode_to_vec())
    }

    fn node(address: u32) -> Frame {
        let msg = Message {
            source_address: Some(address),
            network_id: Some(9),
            ..Message::default()
        };
        Frame::Binary(msg.encode_to_vec())
    }

    fn logged_in() -> SessionDriver {
        let mut d = driver();
        d.on_auth_message(&login_ok("s-1"));
        d.on_realtime_message(&rts_login(1));
        d
    }

    #[test]
    fn starts_in_login_and_pending() {
        let d = driver();
        assert_eq!(d.state(), SessionState::Login);
        assert_eq!(d.result(), SessionResult::Pending);
    }

    #[test]
    fn auth_open_sends_login() {
        let mut d = driver();
        let actions = d.on_open(Channel::Authentication);
        let [DriverAction::Send { channel, text }] = actions.as_slice() else {
            panic!("expected a single send, got {actions:?}");
        };
        assert_eq!(*channel, Channel::Authentication);
        assert!(text.contains("operator"));
    }

    #[test]
    fn realtime_open_sends_nothing() {
        let mut d = driver();
        assert!(d.on_open(Channel::RealtimeSituation).is_empty());
    }

    #[test]
    fn login_success_sends_realtime_login_with_session_id() {
        let mut d = driver();
        let actions = d.on_auth_message(&login_ok("s-77"));
        assert_eq!(d.state(), SessionState::RealtimeSituationLogin);
        assert_eq!(d.messages().session_id(), Some(&SessionId::new("s-77")));

        let [DriverAction::Send { channel, text }] = actions.as_slice() else {
            panic!("expected a single send, got {actions:?}");
        };
        assert_eq!(*channel, Channel::RealtimeSituation);
        let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
            panic!("request should be JSON");
        };
        assert_eq!(value["data"]["session_id"], "s-77");
    }

    #[test]
    fn login_failure_stops_session() {
        let mut d = driver();
        let actions = d.on_auth_message(r#"{"type":1,"result":5}"#);
        assert_eq!(actions, vec![DriverAction::Stop]);
        assert_eq!(d.state(), SessionState::Login);
        assert_eq!(d.result(), SessionResult::Failed);
    }

    #[test]
    fn realtime_login_failure_stops_session() {
        let mut d = driver();
        d.on_auth_message(&login_ok("s-1"));
        let actions = d.on_realtime_message(&rts_login(0));
        assert_eq!(actions, vec![DriverAction::Stop]);
        assert_eq!(d.state(), SessionState::RealtimeSituationLogin);
        assert_eq!(d.result(), SessionResult::Failed);
    }

    #[test]
    fn realtime_login_success_waits_for_startup() {
        let d = logged_in();
        assert_eq!(d.state(), SessionState::WaitForStartupSituation);
        assert_eq!(d.result(), SessionResult::Pending);
    }

    #[test]
    fn startup_situation_completes_after_third_node() {
        let mut d = logged_in();
        d.on_realtime_message(&metadata(3));
        d.on_realtime_message(&node(1));
        d.on_realtime_message(&node(2));
        assert_eq!(d.state(), SessionState::WaitForStartupSituation);
        d.on_realtime_message(&node(3));
        assert_eq!(d.state(), SessionState::WaitForever);
        d.on_realtime_message(&node(4));
        assert_eq!(d.state(), SessionState::WaitForever);
    }

    #[test]
    fn collections_are_accepted_in_any_state() {
        let mut d = logged_in();
        d.on_realtime_message(&metadata(0));
        assert_eq!(d.state(), SessionState::WaitForever);
        let batch = MessageCollection {
            message_collection: vec![Message::default(), Message::default()],
        };
        let actions = d.on_realtime_message(&Frame::Binary(batch.encode_to_vec()));
        assert!(actions.is_empty());
        assert_eq!(d.state(), SessionState::WaitForever);
    }

    #[test]
    fn auth_message_in_passive_state_fails() {
        let mut d = logged_in();
        let actions = d.on_auth_message(&login_ok("s-2"));
        assert_eq!(actions, vec![DriverAction::Stop]);
        assert_eq!(d.result(), SessionResult::Failed);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut d = driver();
        assert_eq!(d.stop_connections(), Some(DriverAction::Stop));
        assert_eq!(d.stop_connections(), None);
        assert!(d.is_stopping());
    }

    #[test]
    fn messages_after_stop_are_ignored() {
        let mut d = driver();
        d.on_auth_message("garbage");
        assert!(d.on_auth_message(&login_ok("s-1")).is_empty());
        assert_eq!(d.state(), SessionState::Login);
    }

    #[test]
    fn error_while_running_fails_session() {
        let mut d = logged_in();
        let actions = d.on_error(Channel::RealtimeSituation, "reset", true);
        assert_eq!(actions, vec![DriverAction::Stop]);
        assert_eq!(d.result(), SessionResult::Failed);
    }

    #[test]
    fn error_during_shutdown_is_silent() {
        let mut d = logged_in();
        assert!(d.on_error(Channel::Authentication, "reset", false).is_empty());
        assert_eq!(d.result(), SessionResult::Pending);
    }

    #[test]
    fn close_after_stop_keeps_result() {
        let mut d = logged_in();
        d.stop_connections();
        assert!(d.on_close(Channel::RealtimeSituation).is_empty());
        assert_eq!(d.result(), SessionResult::Pending);
    }

    #[test]
    fn auth_close_after_login_keeps_session_running() {
        let mut d = logged_in();
        d.on_realtime_message(&metadata(0));
        assert!(d.on_close(Channel::Authentication).is_empty());
        assert_eq!(d.result(), SessionResult::Pending);
        assert_eq!(d.state(), SessionState::WaitForever);
        assert!(!d.is_stopping());
    }

    #[test]
    fn auth_close_while_realtime_login_pending_is_harmless() {
        let mut d = driver();
        d.on_auth_message(&login_ok("s-1"));
        assert!(d.on_close(Channel::Authentication).is_empty());
        d.on_realtime_message(&rts_login(1));
        assert_eq!(d.state(), SessionState::WaitForStartupSituation);
        assert_eq!(d.result(), SessionResult::Pending);
    }

    #[test]
    fn realtime_close_after_handshake_stops_without_failure() {
        let mut d = logged_in();
        let actions = d.on_close(Channel::RealtimeSituation);
        assert_eq!(actions, vec![DriverAction::Stop]);
        assert_eq!(d.result(), SessionResult::Pending);
    }

    #[test]
    fn close_before_login_answer_fails_session() {
        let mut d = driver();
        let actions = d.on_close(Channel::Authentication);
        assert_eq!(actions, vec![DriverAction::Stop]);
        assert_eq!(d.result(), SessionResult::Failed);

        let mut d = driver();
        d.on_auth_message(&login_ok("s-1"));
        let actions = d.on_close(Channel::RealtimeSituation);
        assert_eq!(actions, vec![DriverAction::Stop]);
        assert_eq!(d.result(), SessionResult::Failed);
    }

    #[test]
    fn realtime_login_without_session_id_is_protocol_error() {
        let mut d = driver();
        d.state = SessionState::RealtimeSituationLogin;
        let Err(err) = d.send_request() else {
            panic!("send_request should fail without a session id");
        };
        assert!(matches!(err, ClientError::Protocol(_)));
        assert_eq!(err.error_code(), 3003);
    }

    #[test]
    fn undecodable_startup_frame_is_tolerated() {
        let mut d = logged_in();
        assert!(d.on_realtime_message(&Frame::Binary(vec![0xff])).is_empty());
        assert_eq!(d.state(), SessionState::WaitForStartupSituation);
        assert_eq!(d.result(), SessionResult::Pending);
    }

    #[test]
    fn every_transition_moves_one_step() {
        let mut d = driver();
        let mut seen = vec![d.state()];
        while !d.state().is_terminal() {
            d.advance();
            seen.push(d.state());
        }
        assert_eq!(
            seen,
            vec![
                SessionState::Login,
                SessionState::RealtimeSituationLogin,
                SessionState::WaitForStartupSituation,
                SessionState::WaitForever,
                SessionState::End,
            ]
        );
    }

    #[test]
    fn no_request_outside_login_states() {
        let mut d = driver();
        for state in [
            SessionState::WaitForStartupSituation,
            SessionState::WaitForever,
            SessionState::End,
        ] {
            d.state = state;
            let Ok(request) = d.send_request() else {
                panic!("send_request should not fail in {state}");
            };
            assert!(request.is_none());
        }
    }
}
