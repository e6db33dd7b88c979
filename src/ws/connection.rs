//! WebSocket channel task.
//!
//! Runs the read/write loop for one client connection, forwarding inbound
//! frames to the session runner as [`ChannelEvent`]s and writing queued
//! outbound text until the shared stop signal is raised.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::domain::{Channel, ChannelEvent, Frame};
use crate::error::ClientError;

/// Connects to `url` and runs the channel until stopped or closed.
///
/// - Emits [`ChannelEvent::Opened`] after the handshake.
/// - Forwards text and binary frames as [`ChannelEvent::Received`].
/// - Writes every string from `outbound_rx` as a text frame.
/// - Emits [`ChannelEvent::Closed`] on the way out, whatever the reason.
///
/// # Errors
///
/// Returns [`ClientError::Connect`] if the handshake fails and
/// [`ClientError::Transport`] if the connection breaks while the channel
/// was meant to be running.
pub async fn run_channel(
    channel: Channel,
    url: String,
    mut outbound_rx: mpsc::Receiver<String>,
    events: mpsc::Sender<ChannelEvent>,
    stop_rx: watch::Receiver<bool>,
) -> Result<(), ClientError> {
    tracing::debug!(%channel, %url, "connecting");
    let mut stop_wait = stop_rx.clone();

    let connected = tokio::select! {
        result = connect_async(url.as_str()) => Some(result),
        _ = wait_for_stop(&mut stop_wait) => None,
    };

    let socket = match connected {
        Some(Ok((socket, _))) => socket,
        Some(Err(source)) => {
            let running = !*stop_rx.borrow();
            let _ = events
                .send(ChannelEvent::Failed {
                    channel,
                    error: source.to_string(),
                    running,
                })
                .await;
            let _ = events.send(ChannelEvent::Closed(channel)).await;
            return Err(ClientError::Connect { url, source });
        }
        None => {
            let _ = events.send(ChannelEvent::Closed(channel)).await;
            return Ok(());
        }
    };

    if events.send(ChannelEvent::Opened(channel)).await.is_err() {
        return Ok(());
    }

    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut outcome = Ok(());

    loop {
        tokio::select! {
            // Shutdown requested by the session runner
            _ = wait_for_stop(&mut stop_wait) => {
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }
            // Outbound request
            text = outbound_rx.recv() => {
                let Some(text) = text else { break };
                if let Err(e) = ws_tx.send(Message::text(text)).await {
                    outcome = report_failure(channel, e, &events, &stop_rx).await;
                    break;
                }
            }
            // Incoming frame from the backend
            msg = ws_rx.next() => {
                let frame = match msg {
                    Some(Ok(Message::Text(text))) => Frame::Text(text.as_str().to_owned()),
                    Some(Ok(Message::Binary(data))) => Frame::Binary(data.to_vec()),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        outcome = report_failure(channel, e, &events, &stop_rx).await;
                        break;
                    }
                };
                if events.send(ChannelEvent::Received(channel, frame)).await.is_err() {
                    break;
                }
            }
        }
    }

    let _ = events.send(ChannelEvent::Closed(channel)).await;
    tracing::debug!(%channel, "channel task finished");
    outcome
}

/// Resolves once the stop flag is `true` or its sender is gone.
async fn wait_for_stop(stop_rx: &mut watch::Receiver<bool>) {
    let _ = stop_rx.wait_for(|stop| *stop).await;
}

async fn report_failure(
    channel: Channel,
    error: tokio_tungstenite::tungstenite::Error,
    events: &mpsc::Sender<ChannelEvent>,
    stop_rx: &watch::Receiver<bool>,
) -> Result<(), ClientError> {
    let running = !*stop_rx.borrow();
    let _ = events
        .send(ChannelEvent::Failed {
            channel,
            error: error.to_string(),
            running,
        })
        .await;
    if running {
        Err(ClientError::Transport(error))
    } else {
        Ok(())
    }
}
