//! Manages the WebSocket connection lifecycle for a chat session.
//!
//! Each connection owns a fresh session state. Turns are strictly
//! sequential: a user message is fully handled (state mutated, assistant
//! reply committed) before the next one is read from the socket.

use super::protocol::{ClientMessage, ServerMessage};
use crate::state::ServiceState;
use anyhow::Result;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{
    SinkExt, StreamExt,
    stream::SplitSink,
};
use std::sync::Arc;
use studychat_core::{engine::TurnOutput, state::AppState};
use tokio::sync::{Mutex, mpsc};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ServiceState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: ServiceState) {
    let session_id = Uuid::new_v4();
    let session_span = tracing::info_span!("chat_session", %session_id);

    async move {
        info!("New WebSocket connection.");
        let (socket_tx, mut socket_rx) = socket.split();
        let socket_tx = Arc::new(Mutex::new(socket_tx));
        let mut app_state = AppState::new(Arc::clone(&state.catalog));

        // Tell the client study mode starts out inactive.
        if send_msg(&mut *socket_tx.lock().await, badge(&app_state))
            .await
            .is_err()
        {
            return;
        }

        while let Some(msg_result) = socket_rx.next().await {
            match msg_result {
                Ok(Message::Text(text)) => {
                    let client_msg = match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(msg) => msg,
                        Err(err) => {
                            warn!(error = %err, "Ignoring unparseable client message");
                            let _ = send_msg(
                                &mut *socket_tx.lock().await,
                                ServerMessage::Error {
                                    message: format!("unrecognized message: {err}"),
                                },
                            )
                            .await;
                            continue;
                        }
                    };
                    if let Err(e) = dispatch(&state, &socket_tx, &mut app_state, client_msg).await {
                        error!(error = ?e, "Failed to handle client message; closing session");
                        break;
                    }
                }
                Ok(Message::Close(_)) => {
                    info!("Client sent close frame. Shutting down session.");
                    break;
                }
                Ok(Message::Binary(_) | Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => {
                    error!("Error receiving from client WebSocket: {:?}", e);
                    break;
                }
            }
        }
        info!("WebSocket connection closed.");
    }
    .instrument(session_span)
    .await
}

/// Routes one client message to the orchestrator.
async fn dispatch(
    state: &ServiceState,
    socket_tx: &Arc<Mutex<SplitSink<WebSocket, Message>>>,
    app_state: &mut AppState,
    msg: ClientMessage,
) -> Result<()> {
    match msg {
        ClientMessage::UserMessage { text } => run_turn(state, socket_tx, app_state, &text).await,
        ClientMessage::StartLesson { lesson_id } => {
            match state.orchestrator.start_lesson(app_state, &lesson_id) {
                Ok(output) => send_output(socket_tx, app_state, output).await,
                Err(err) => {
                    send_msg(
                        &mut *socket_tx.lock().await,
                        ServerMessage::Error {
                            message: err.to_string(),
                        },
                    )
                    .await
                }
            }
        }
        ClientMessage::CancelLesson => {
            let cancelled = state.orchestrator.cancel_lesson(app_state);
            let mut sink = socket_tx.lock().await;
            if let Some(message) = cancelled {
                send_msg(
                    &mut sink,
                    ServerMessage::Assistant {
                        content: message.content,
                    },
                )
                .await?;
            }
            send_msg(&mut sink, badge(app_state)).await
        }
    }
}

/// Drives one user turn: streams fragments to the client while the
/// orchestrator works, then delivers the committed messages.
async fn run_turn(
    state: &ServiceState,
    socket_tx: &Arc<Mutex<SplitSink<WebSocket, Message>>>,
    app_state: &mut AppState,
    text: &str,
) -> Result<()> {
    send_msg(&mut *socket_tx.lock().await, ServerMessage::ResponseStart).await?;

    let (fragment_tx, mut fragment_rx) = mpsc::channel::<String>(32);
    let forwarder = {
        let socket_tx = Arc::clone(socket_tx);
        tokio::spawn(async move {
            while let Some(chunk) = fragment_rx.recv().await {
                let mut sink = socket_tx.lock().await;
                if send_msg(&mut sink, ServerMessage::ResponseChunk { chunk })
                    .await
                    .is_err()
                {
                    break;
                }
            }
        })
    };

    let result = state
        .orchestrator
        .handle_turn(app_state, text, Some(fragment_tx))
        .await;
    // The turn dropped its sender, so the forwarder drains and exits.
    let _ = forwarder.await;

    send_msg(&mut *socket_tx.lock().await, ServerMessage::ResponseEnd).await?;

    match result {
        Ok(output) => send_output(socket_tx, app_state, output).await,
        Err(err) => {
            // No state was mutated, so the client may retry the same turn.
            warn!(error = %err, "Turn failed");
            send_msg(
                &mut *socket_tx.lock().await,
                ServerMessage::Error {
                    message: err.to_string(),
                },
            )
            .await
        }
    }
}

/// Sends a turn's committed messages, artifact notification and the
/// refreshed badge state.
async fn send_output(
    socket_tx: &Arc<Mutex<SplitSink<WebSocket, Message>>>,
    app_state: &AppState,
    output: TurnOutput,
) -> Result<()> {
    let mut sink = socket_tx.lock().await;
    for message in &output.messages {
        send_msg(
            &mut sink,
            ServerMessage::Assistant {
                content: message.content.clone(),
            },
        )
        .await?;
    }
    if let Some(path) = output.artifact {
        send_msg(
            &mut sink,
            ServerMessage::ArtifactReady {
                path: path.display().to_string(),
            },
        )
        .await?;
    }
    send_msg(&mut sink, badge(app_state)).await
}

/// The study-mode badge for the current lesson state.
fn badge(app_state: &AppState) -> ServerMessage {
    match app_state.active_lesson() {
        Some(lesson) => ServerMessage::LessonBadge {
            active: true,
            lesson_id: Some(lesson.id.clone()),
            title: Some(lesson.title.clone()),
            step: Some(app_state.lesson.current_step_index + 1),
        },
        None => ServerMessage::LessonBadge {
            active: false,
            lesson_id: None,
            title: None,
            step: None,
        },
    }
}

/// A helper function to serialize and send a `ServerMessage` to the client.
pub(crate) async fn send_msg(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    msg: ServerMessage,
) -> Result<()> {
    let serialized = serde_json::to_string(&msg)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}
