//! Linear session state machine.
//!
//! [`SessionState`] is a closed enum with an explicit successor table, so
//! reordering variants can never make a transition skip a step.

use std::fmt;

/// Phase of the realtime session handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionState {
    /// Before anything happened. Never observed after construction.
    Start,
    /// Login request sent on the authentication channel.
    Login,
    /// Realtime situation login sent with the session id.
    RealtimeSituationLogin,
    /// Passively counting nodes of the startup situation.
    WaitForStartupSituation,
    /// Logging telemetry until the run is stopped externally.
    WaitForever,
    /// Terminal state.
    End,
}

impl SessionState {
    /// State a new session starts in, one step past [`SessionState::Start`].
    #[must_use]
    pub const fn initial() -> Self {
        Self::Start.next()
    }

    /// Returns the successor state. [`SessionState::End`] is its own
    /// successor.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Start => Self::Login,
            Self::Login => Self::RealtimeSituationLogin,
            Self::RealtimeSituationLogin => Self::WaitForStartupSituation,
            Self::WaitForStartupSituation => Self::WaitForever,
            Self::WaitForever | Self::End => Self::End,
        }
    }

    /// Returns `true` for [`SessionState::End`].
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::End)
    }

    /// Returns `true` for the states advanced by the realtime situation
    /// channel rather than by authentication responses.
    #[must_use]
    pub const fn is_passive(self) -> bool {
        matches!(self, Self::WaitForStartupSituation | Self::WaitForever)
    }

    /// Returns the state name as a static string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Login => "login",
            Self::RealtimeSituationLogin => "realtime_situation_login",
            Self::WaitForStartupSituation => "wait_for_startup_situation",
            Self::WaitForever => "wait_forever",
            Self::End => "end",
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: [SessionState; 6] = [
        SessionState::Start,
        SessionState::Login,
        SessionState::RealtimeSituationLogin,
        SessionState::WaitForStartupSituation,
        SessionState::WaitForever,
        SessionState::End,
    ];

    #[test]
    fn initial_is_login() {
        assert_eq!(SessionState::initial(), SessionState::Login);
        assert_eq!(SessionState::default(), SessionState::Login);
    }

    #[test]
    fn next_advances_exactly_one_step() {
        for pair in ORDER.windows(2) {
            let [from, to] = pair else { continue };
            assert_eq!(from.next(), *to);
            assert!(from.next() > *from);
        }
    }

    #[test]
    fn end_is_fixed_point() {
        assert_eq!(SessionState::End.next(), SessionState::End);
        assert!(SessionState::End.is_terminal());
    }

    #[test]
    fn passive_states() {
        let passive: Vec<_> = ORDER.iter().filter(|s| s.is_passive()).collect();
        assert_eq!(
            passive,
            [
                &SessionState::WaitForStartupSituation,
                &SessionState::WaitForever
            ]
        );
    }

    #[test]
    fn display_uses_snake_case() {
        assert_eq!(
            SessionState::RealtimeSituationLogin.to_string(),
            "realtime_situation_login"
        );
    }
}
