//! Audio ingress queue and session bridge.
//!
//! The bounded queue is the only synchronization point between the inbound
//! router and the session bridge. A full queue blocks the router, which is
//! the relay's backpressure point: a slow backend throttles how fast the
//! client can push audio.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::turn::TurnTracker;
use crate::core::live::LiveSink;

/// One audio chunk as received from the client.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Raw PCM bytes
    pub data: Bytes,
    /// Sample rate the client declared for this chunk
    pub sample_rate: u32,
}

/// Item on the audio ingress queue.
#[derive(Debug)]
pub enum IngressItem {
    Chunk(AudioChunk),
    /// End-of-turn sentinel. FIFO ordering guarantees every chunk enqueued
    /// before it is forwarded before the turn is committed.
    TurnBoundary,
}

/// Create the bounded ingress queue.
pub fn ingress_queue(capacity: usize) -> (mpsc::Sender<IngressItem>, mpsc::Receiver<IngressItem>) {
    mpsc::channel(capacity.max(1))
}

/// Session bridge: drains the ingress queue into the backend session.
///
/// A failed forward drops that chunk and keeps going; the commit for a turn
/// is issued only once the sentinel is dequeued, i.e. after every chunk of
/// the turn has been forwarded. Exits on cancellation or when the queue
/// closes (router gone).
pub async fn session_bridge(
    mut ingress: mpsc::Receiver<IngressItem>,
    sink: Arc<dyn LiveSink>,
    turns: Arc<TurnTracker>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            item = ingress.recv() => match item {
                None => break,
                Some(IngressItem::Chunk(chunk)) => {
                    let len = chunk.data.len();
                    if let Err(e) = sink.send_audio(chunk.data, chunk.sample_rate).await {
                        tracing::warn!(bytes = len, "Failed to forward audio chunk: {}", e);
                    }
                }
                Some(IngressItem::TurnBoundary) => {
                    match sink.commit_turn().await {
                        Ok(()) => {
                            turns.user_commit();
                            tracing::debug!("audio turn committed");
                        }
                        Err(e) => tracing::warn!("Failed to commit turn: {}", e),
                    }
                }
            }
        }
    }
    tracing::debug!("session bridge ended");
}
