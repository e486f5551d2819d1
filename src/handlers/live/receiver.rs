//! Turn/event state machine for the backend event stream.
//!
//! Consumes session events in arrival order, updates the turn state, and
//! translates each event into outbound client messages. Emission order is
//! preserved end to end: the dispatcher writes messages in the order they
//! are enqueued here.

use std::sync::Arc;

use base64::prelude::*;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::messages::{OutboundRoute, ServerMessage};
use super::turn::TurnTracker;
use crate::core::live::{LiveEvent, LiveEvents, SessionHandle};

/// Reason string reported with `interrupted` messages.
const INTERRUPTED_REASON: &str = "Response interrupted by user input";

/// Run the state machine until the backend stream ends or the session is
/// cancelled. The end of the backend stream is a terminal condition for the
/// whole session, so the token is cancelled on exit.
pub async fn event_receiver(
    mut events: Box<dyn LiveEvents>,
    outbound: mpsc::Sender<OutboundRoute>,
    turns: Arc<TurnTracker>,
    resumption: Arc<Mutex<Option<SessionHandle>>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            event = events.next() => match event {
                None => {
                    tracing::info!("backend event stream ended");
                    break;
                }
                Some(event) => {
                    if translate(event, &outbound, &turns, &resumption).await.is_err() {
                        // Dispatcher gone; nothing left to deliver to.
                        break;
                    }
                }
            }
        }
    }

    cancel.cancel();
    tracing::debug!("event receiver ended");
}

/// Translate one backend event into zero or more outbound messages.
///
/// Errors only when the outbound channel is closed.
async fn translate(
    event: LiveEvent,
    outbound: &mpsc::Sender<OutboundRoute>,
    turns: &TurnTracker,
    resumption: &Mutex<Option<SessionHandle>>,
) -> Result<(), ()> {
    match event {
        LiveEvent::Audio { data } => {
            turns.model_output();
            send(
                outbound,
                ServerMessage::Audio {
                    data: BASE64_STANDARD.encode(&data),
                },
            )
            .await
        }

        LiveEvent::OutputTranscript { text } => {
            turns.model_output();
            send(outbound, ServerMessage::Text { data: text }).await
        }

        LiveEvent::InputTranscript { text } => {
            tracing::debug!(transcript = %text, "input transcription");
            Ok(())
        }

        LiveEvent::Interrupted => {
            turns.interrupt();
            send(
                outbound,
                ServerMessage::Interrupted {
                    data: INTERRUPTED_REASON.to_string(),
                },
            )
            .await?;
            // Enqueue order is delivery order, so the report is on its way.
            turns.interrupt_acknowledged();
            Ok(())
        }

        LiveEvent::TurnComplete => {
            turns.model_complete();
            // Strict pairing: complete, then ready, nothing in between.
            send(outbound, ServerMessage::TurnComplete).await?;
            send(outbound, ServerMessage::ReadyForInput).await
        }

        LiveEvent::SessionResumption { handle } => {
            tracing::info!(handle = %handle, "new resumption handle");
            *resumption.lock() = Some(handle.clone());
            send(
                outbound,
                ServerMessage::SessionId {
                    data: handle.into_string(),
                },
            )
            .await
        }

        LiveEvent::GoingAway { time_left } => {
            tracing::warn!(
                time_left = time_left.as_deref().unwrap_or("unknown"),
                "backend will terminate the session"
            );
            Ok(())
        }
    }
}

async fn send(outbound: &mpsc::Sender<OutboundRoute>, msg: ServerMessage) -> Result<(), ()> {
    outbound
        .send(OutboundRoute::Message(msg))
        .await
        .map_err(|_| ())
}
