//! Defines the WebSocket message protocol between the browser client and the API server.

use serde::{Deserialize, Serialize};

/// Messages sent from the client (browser) to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A text message from the user.
    UserMessage { text: String },
    /// Starts a lesson directly by id (the lesson-list equivalent of a
    /// "teach me X" chat message).
    StartLesson { lesson_id: String },
    /// Abandons the active lesson, if any.
    CancelLesson,
}

/// Messages sent from the server to the client (browser).
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Signals the beginning of a streamed text response.
    ResponseStart,
    /// A fragment of a streamed text response. Display-only; the committed
    /// message arrives separately as `Assistant`.
    ResponseChunk { chunk: String },
    /// Signals the end of a streamed text response.
    ResponseEnd,
    /// A complete assistant message, committed to the session history.
    Assistant { content: String },
    /// Current study-mode badge state; `step` is 1-based for display.
    LessonBadge {
        active: bool,
        lesson_id: Option<String>,
        title: Option<String>,
        step: Option<usize>,
    },
    /// A completed lesson produced an export artifact.
    ArtifactReady { path: String },
    /// Reports an error to the client.
    Error { message: String },
}
