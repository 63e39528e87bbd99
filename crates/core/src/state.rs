//! Session State
//!
//! `AppState` is the mutable record of one chat session: the conversation
//! history plus the lesson workflow state. It is created when a session
//! opens, threaded through every handler call, and dropped when the session
//! ends. Nothing here is shared between sessions, so no locking is needed.

use crate::catalog::LessonCatalog;
use crate::lesson::LessonDefinition;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// One recorded user attempt for a lesson step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub step_index: usize,
    pub text: String,
}

/// Mutable record of an in-progress lesson instance.
///
/// While `active` is true, `current_step_index` stays within
/// `[0, step_count)` and `submissions` holds exactly one entry per completed
/// step index. The state leaves `active` only through full completion or an
/// explicit cancel, both of which go through [`LessonState::reset`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonState {
    pub active: bool,
    pub lesson_id: Option<String>,
    pub current_step_index: usize,
    pub submissions: Vec<Submission>,
    pub completed: bool,
}

impl LessonState {
    /// Activates a fresh lesson instance at step 0.
    pub fn start(lesson_id: impl Into<String>) -> Self {
        Self {
            active: true,
            lesson_id: Some(lesson_id.into()),
            current_step_index: 0,
            submissions: Vec::new(),
            completed: false,
        }
    }

    /// Returns the state to Inactive, clearing id, index and submissions.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn submission_for(&self, step_index: usize) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.step_index == step_index)
    }

    /// Records the submission for a step. Each step index is recorded at
    /// most once; a duplicate replaces the earlier text rather than adding
    /// a second entry.
    pub fn record_submission(&mut self, step_index: usize, text: impl Into<String>) {
        let text = text.into();
        match self.submissions.iter_mut().find(|s| s.step_index == step_index) {
            Some(existing) => existing.text = text,
            None => self.submissions.push(Submission { step_index, text }),
        }
    }
}

/// The full per-session context passed to every handler call.
pub struct AppState {
    pub messages: Vec<ChatMessage>,
    pub lesson: LessonState,
    pub catalog: Arc<LessonCatalog>,
}

impl AppState {
    pub fn new(catalog: Arc<LessonCatalog>) -> Self {
        Self {
            messages: Vec::new(),
            lesson: LessonState::default(),
            catalog,
        }
    }

    /// The definition of the lesson the session is currently working
    /// through, if one is active.
    pub fn active_lesson(&self) -> Option<&LessonDefinition> {
        if !self.lesson.active {
            return None;
        }
        self.lesson
            .lesson_id
            .as_deref()
            .and_then(|id| self.catalog.get(id))
    }
}
