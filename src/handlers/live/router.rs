//! Inbound message router.
//!
//! Classifies each frame arriving from the client transport and dispatches
//! it: binary audio and base64 `audio` control frames go onto the ingress
//! queue, `end` enqueues the turn-boundary sentinel, `text` bypasses the
//! queue and goes straight to the backend, `close` shuts the write path and
//! stops the loop. A malformed frame is logged and dropped; it never stops
//! the router.

use std::sync::Arc;

use base64::prelude::*;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::ingress::{AudioChunk, IngressItem};
use super::messages::{ClientFrame, ClientMessage, OutboundRoute};
use super::turn::TurnTracker;
use crate::core::live::LiveSink;

/// Run the router until the transport ends, the client asks to close, or the
/// session is cancelled. Cancels the session token on exit so the first
/// terminal condition tears the whole task set down.
pub async fn client_router<S>(
    mut frames: S,
    ingress: mpsc::Sender<IngressItem>,
    sink: Arc<dyn LiveSink>,
    outbound: mpsc::Sender<OutboundRoute>,
    turns: Arc<TurnTracker>,
    cancel: CancellationToken,
    default_sample_rate: u32,
) where
    S: Stream<Item = ClientFrame> + Unpin + Send,
{
    // Negotiated input rate: starts at the configured default, follows the
    // most recent rate the client declared.
    let mut sample_rate = default_sample_rate;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            frame = frames.next() => match frame {
                None | Some(ClientFrame::Close) => {
                    tracing::info!("client transport closed");
                    break;
                }

                Some(ClientFrame::Binary(data)) => {
                    turns.user_input();
                    let chunk = AudioChunk { data, sample_rate };
                    if ingress.send(IngressItem::Chunk(chunk)).await.is_err() {
                        break;
                    }
                }

                Some(ClientFrame::Text(text)) => {
                    let msg = match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(msg) => msg,
                        Err(e) => {
                            tracing::warn!("Invalid control message: {}", e);
                            continue;
                        }
                    };

                    match msg {
                        ClientMessage::Audio { data, rate } => {
                            if data.is_empty() {
                                continue;
                            }
                            let bytes = match BASE64_STANDARD.decode(&data) {
                                Ok(b) => Bytes::from(b),
                                Err(e) => {
                                    tracing::warn!("Invalid audio payload: {}", e);
                                    continue;
                                }
                            };
                            if let Some(rate) = rate {
                                sample_rate = rate;
                            }
                            turns.user_input();
                            let chunk = AudioChunk { data: bytes, sample_rate };
                            if ingress.send(IngressItem::Chunk(chunk)).await.is_err() {
                                break;
                            }
                        }

                        ClientMessage::End => {
                            tracing::debug!("end-of-turn received");
                            if ingress.send(IngressItem::TurnBoundary).await.is_err() {
                                break;
                            }
                        }

                        ClientMessage::Text { data } => {
                            if data.is_empty() {
                                continue;
                            }
                            // Text turns are complete in themselves; they
                            // bypass the audio queue entirely.
                            turns.user_input();
                            match sink.send_text(&data).await {
                                Ok(()) => {
                                    turns.user_commit();
                                    tracing::debug!("text turn forwarded");
                                }
                                Err(e) => tracing::warn!("Failed to forward text turn: {}", e),
                            }
                        }

                        ClientMessage::Close => {
                            tracing::info!("client requested close");
                            let _ = outbound.send(OutboundRoute::Close).await;
                            break;
                        }
                    }
                }
            }
        }
    }

    cancel.cancel();
    tracing::debug!("inbound router ended");
}
