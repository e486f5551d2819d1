//! Live relay WebSocket handler.
//!
//! Each upgraded socket owns exactly one backend session and a set of three
//! relay tasks (inbound router, session bridge, event receiver) plus an
//! outbound dispatcher, supervised here. The first of {client disconnect,
//! backend stream end} cancels the shared token; the supervisor then waits
//! for all three tasks before releasing the session and the registry entry.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::Stream;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::ingress::{ingress_queue, session_bridge};
use super::messages::{ClientFrame, OutboundRoute, ServerMessage};
use super::receiver::event_receiver;
use super::registry::{ClientHandle, ClientRegistry, LifecycleState};
use super::router::client_router;
use super::turn::TurnTracker;
use crate::core::live::{GeminiLive, GeminiLiveConfig, LiveConnection};
use crate::state::AppState;

/// Outbound dispatcher channel capacity.
const OUTBOUND_CHANNEL_CAPACITY: usize = 1024;

/// Maximum WebSocket frame size (10 MB)
const MAX_WS_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Maximum WebSocket message size (10 MB)
const MAX_WS_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Live WebSocket handler.
///
/// Upgrades the HTTP connection; one upgraded socket is one conversation
/// session against one backend session.
pub async fn live_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    info!("live WebSocket connection upgrade requested");

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_live_socket(socket, state))
}

/// Handle one upgraded live socket end to end.
async fn handle_live_socket(socket: WebSocket, state: Arc<AppState>) {
    let client_id = Uuid::new_v4();
    info!(client_id = %client_id, "live WebSocket connection established");

    let (mut ws_sink, ws_receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) =
        mpsc::channel::<OutboundRoute>(OUTBOUND_CHANNEL_CAPACITY);

    // Dispatcher task: writes outbound messages in enqueue order, no
    // reordering or batching.
    let send_task = tokio::spawn(async move {
        while let Some(route) = outbound_rx.recv().await {
            let should_close = matches!(route, OutboundRoute::Close);

            let result = match route {
                OutboundRoute::Message(msg) => match serde_json::to_string(&msg) {
                    Ok(json) => ws_sink.send(Message::Text(json.into())).await,
                    Err(e) => {
                        error!("Failed to serialize outbound message: {}", e);
                        continue;
                    }
                },
                OutboundRoute::Close => {
                    info!("closing live WebSocket connection");
                    ws_sink.send(Message::Close(None)).await
                }
            };

            if let Err(e) = result {
                debug!("Failed to send WebSocket message: {}", e);
                break;
            }
            if should_close {
                break;
            }
        }
    });

    let handle = ClientHandle::new(outbound_tx.clone());
    state.registry.register(client_id, handle.clone());

    // Transport is up; the backend session is not bound yet.
    let _ = outbound_tx
        .send(OutboundRoute::Message(ServerMessage::Ready))
        .await;

    let live_config = GeminiLiveConfig {
        api_key: state.config.google_api_key.clone().unwrap_or_default(),
        model: state.config.model.clone(),
        voice: state.config.voice.clone(),
        language_code: state.config.language_code.clone(),
        system_instruction: Some(state.config.system_instruction.clone()),
        resume_handle: None,
    };

    let connection = match GeminiLive::connect(live_config).await {
        Ok(connection) => connection,
        Err(e) => {
            // Fatal for this client only.
            error!(client_id = %client_id, "Failed to open backend session: {}", e);
            let _ = outbound_tx
                .send(OutboundRoute::Message(ServerMessage::Error {
                    code: Some("session_error".to_string()),
                    message: format!("Failed to open backend session: {e}"),
                }))
                .await;
            let _ = outbound_tx.send(OutboundRoute::Close).await;
            drop(outbound_tx);
            handle.set_lifecycle(LifecycleState::Closed);
            state.registry.unregister(client_id);
            let _ = send_task.await;
            return;
        }
    };

    handle.set_lifecycle(LifecycleState::Active);
    let _ = outbound_tx
        .send(OutboundRoute::Message(ServerMessage::Connected {
            model: state.config.model.clone(),
        }))
        .await;

    let frames = ws_receiver
        .filter_map(|msg| async move { classify_frame(msg) })
        .boxed();

    run_session(
        client_id,
        frames,
        handle,
        connection,
        state.registry.clone(),
        state.config.audio_queue_capacity,
        state.config.input_sample_rate,
    )
    .await;

    let _ = outbound_tx.send(OutboundRoute::Close).await;
    drop(outbound_tx);
    let _ = send_task.await;

    info!(client_id = %client_id, "live WebSocket connection terminated");
}

/// Map one raw WebSocket message onto a classified client frame.
fn classify_frame(msg: Result<Message, axum::Error>) -> Option<ClientFrame> {
    match msg {
        Ok(Message::Binary(data)) => Some(ClientFrame::Binary(data)),
        Ok(Message::Text(text)) => Some(ClientFrame::Text(text.to_string())),
        Ok(Message::Close(_)) => Some(ClientFrame::Close),
        // axum answers pings at the protocol level
        Ok(_) => None,
        Err(e) => {
            debug!("live WebSocket read error: {}", e);
            Some(ClientFrame::Close)
        }
    }
}

/// Supervise one relay session: start the three tasks, wait for all of them,
/// then release the backend session and the registry entry exactly once.
///
/// Router and receiver each cancel the shared token when their input stream
/// terminates, so the first terminal condition (client disconnect or backend
/// stream end) drives every other task to its next suspension point and out.
pub async fn run_session<S>(
    client_id: Uuid,
    frames: S,
    handle: ClientHandle,
    connection: LiveConnection,
    registry: Arc<ClientRegistry>,
    queue_capacity: usize,
    default_sample_rate: u32,
) where
    S: Stream<Item = ClientFrame> + Unpin + Send + 'static,
{
    let LiveConnection { sink, events } = connection;
    let cancel = CancellationToken::new();
    let turns = Arc::new(TurnTracker::new());
    let (ingress_tx, ingress_rx) = ingress_queue(queue_capacity);

    let router_task = tokio::spawn(client_router(
        frames,
        ingress_tx,
        sink.clone(),
        handle.outbound.clone(),
        turns.clone(),
        cancel.clone(),
        default_sample_rate,
    ));
    let bridge_task = tokio::spawn(session_bridge(
        ingress_rx,
        sink.clone(),
        turns.clone(),
        cancel.clone(),
    ));
    let receiver_task = tokio::spawn(event_receiver(
        events,
        handle.outbound.clone(),
        turns,
        handle.resumption.clone(),
        cancel.clone(),
    ));

    // Cancellation is the expected exit for most of these; join failures
    // would only come from a panicked task.
    let (router_res, bridge_res, receiver_res) =
        tokio::join!(router_task, bridge_task, receiver_task);
    for res in [router_res, bridge_res, receiver_res] {
        if let Err(e) = res {
            error!(client_id = %client_id, "relay task panicked: {}", e);
        }
    }

    handle.set_lifecycle(LifecycleState::Closing);
    if let Err(e) = sink.close().await {
        warn!(client_id = %client_id, "Failed to close backend session: {}", e);
    }
    handle.set_lifecycle(LifecycleState::Closed);
    let removed = registry.unregister(client_id);
    debug!(client_id = %client_id, removed, "session released");
}
