//! Session runner.
//!
//! Spawns one task per channel, funnels their events into a single
//! [`SessionDriver`], and executes the driver's actions. The whole run is
//! bounded by [`SessionConfig::session_timeout`]; the driver normally stops
//! the channels earlier on its own.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::session_driver::{Credentials, SessionDriver, SessionResult};
use crate::config::SessionConfig;
use crate::domain::{Channel, DriverAction, SessionState};
use crate::error::ClientError;
use crate::ws::connection::run_channel;
use crate::ws::messages::RealtimeSituationMessages;

/// How long a channel task may take to wind down after the stop signal.
pub const CHANNEL_JOIN_GRACE: Duration = Duration::from_secs(1);

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Result recorded by the driver.
    pub result: SessionResult,
    /// State the driver was in when the run ended.
    pub state: SessionState,
    /// Whether the run hit the time limit.
    pub timed_out: bool,
}

impl SessionOutcome {
    /// Process exit code: `-1` for a failed session, `0` otherwise.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self.result {
            SessionResult::Failed => -1,
            SessionResult::Pending | SessionResult::Succeeded => 0,
        }
    }
}

/// Runs a session and maps the outcome to a process exit code.
///
/// Returns `0` when the session completed or the time limit elapsed
/// without a failure, `-1` otherwise.
pub async fn run_session(config: &SessionConfig) -> i32 {
    match drive_session(config).await {
        Ok(outcome) => {
            tracing::info!(
                result = ?outcome.result,
                state = %outcome.state,
                timed_out = outcome.timed_out,
                "session finished"
            );
            outcome.exit_code()
        }
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "session aborted");
            -1
        }
    }
}

/// Runs a session to completion and returns its outcome.
///
/// # Errors
///
/// Returns [`ClientError::TaskFailed`] if a channel task panicked.
pub async fn drive_session(config: &SessionConfig) -> Result<SessionOutcome, ClientError> {
    let buffer = config.channel_buffer;
    let (event_tx, mut event_rx) = mpsc::channel(buffer);
    let (stop_tx, stop_rx) = watch::channel(false);
    let (auth_tx, auth_rx) = mpsc::channel::<String>(buffer);
    let (rts_tx, rts_rx) = mpsc::channel::<String>(buffer);

    let mut rts_task = tokio::spawn(run_channel(
        Channel::RealtimeSituation,
        config.realtime_situation_url(),
        rts_rx,
        event_tx.clone(),
        stop_rx.clone(),
    ));
    let mut auth_task = tokio::spawn(run_channel(
        Channel::Authentication,
        config.authentication_url(),
        auth_rx,
        event_tx,
        stop_rx,
    ));

    let mut driver = SessionDriver::new(
        Credentials {
            username: config.username.clone(),
            password: config.password.clone(),
        },
        RealtimeSituationMessages::new(config.protocol_version),
    );

    let outbound = Outbound {
        authentication: auth_tx,
        realtime_situation: rts_tx,
    };

    // Ends once both channel tasks have dropped their event senders.
    let pump = async {
        while let Some(event) = event_rx.recv().await {
            for action in driver.handle(event) {
                if let Err(e) = execute(action, &outbound, &stop_tx).await {
                    tracing::warn!(error = %e, code = e.error_code(), "request dropped");
                }
            }
        }
    };

    let timed_out = tokio::time::timeout(config.session_timeout, pump)
        .await
        .is_err();
    if timed_out {
        tracing::info!(
            timeout_secs = config.session_timeout.as_secs(),
            "session time limit reached"
        );
    }
    stop_tx.send_replace(true);

    let rts_joined = join_channel(Channel::RealtimeSituation, &mut rts_task).await;
    let auth_joined = join_channel(Channel::Authentication, &mut auth_task).await;
    rts_joined?;
    auth_joined?;

    Ok(SessionOutcome {
        result: driver.result(),
        state: driver.state(),
        timed_out,
    })
}

/// Outbound queues of the two channel tasks.
#[derive(Debug)]
struct Outbound {
    authentication: mpsc::Sender<String>,
    realtime_situation: mpsc::Sender<String>,
}

impl Outbound {
    const fn sender(&self, channel: Channel) -> &mpsc::Sender<String> {
        match channel {
            Channel::Authentication => &self.authentication,
            Channel::RealtimeSituation => &self.realtime_situation,
        }
    }
}

/// Performs one driver action.
async fn execute(
    action: DriverAction,
    outbound: &Outbound,
    stop_tx: &watch::Sender<bool>,
) -> Result<(), ClientError> {
    match action {
        DriverAction::Send { channel, text } => outbound
            .sender(channel)
            .send(text)
            .await
            .map_err(|_| ClientError::ChannelClosed(channel.as_str())),
        DriverAction::Stop => {
            tracing::debug!("stopping both channels");
            stop_tx.send_replace(true);
            Ok(())
        }
    }
}

async fn join_channel(
    channel: Channel,
    task: &mut JoinHandle<Result<(), ClientError>>,
) -> Result<(), ClientError> {
    match tokio::time::timeout(CHANNEL_JOIN_GRACE, &mut *task).await {
        Ok(Ok(Ok(()))) => Ok(()),
        Ok(Ok(Err(e))) => {
            tracing::warn!(%channel, error = %e, "channel ended with error");
            Ok(())
        }
        Ok(Err(join_error)) => Err(ClientError::TaskFailed(format!(
            "{channel} channel: {join_error}"
        ))),
        Err(_) => {
            tracing::warn!(%channel, "channel did not stop in time, aborting");
            task.abort();
            Ok(())
        }
    }
}
