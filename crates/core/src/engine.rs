//! Turn Orchestration
//!
//! Drives one user turn through the router and the matching handler: plain
//! chat, lesson kickoff, step coaching, or completion. All state mutation
//! happens after the model stream finishes cleanly, so a failed turn leaves
//! the session exactly as it was and the user can retry the same message.

use crate::error::{IncompleteLessonError, ModelError, UnknownLessonError};
use crate::export::{ExportRegistry, StepRecord};
use crate::lesson::LessonDefinition;
use crate::llm::ChatClient;
use crate::prompt;
use crate::router::{self, Destination};
use crate::state::{AppState, ChatMessage, LessonState};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Everything a single turn produced: the assistant messages that were
/// committed to history (or emitted locally, for reprompts) and the export
/// artifact, when completion generated one.
#[derive(Debug, Default)]
pub struct TurnOutput {
    pub messages: Vec<ChatMessage>,
    pub artifact: Option<PathBuf>,
}

impl TurnOutput {
    fn message(msg: ChatMessage) -> Self {
        Self {
            messages: vec![msg],
            artifact: None,
        }
    }
}

/// The session turn engine. Holds the collaborators every handler needs;
/// the per-session [`AppState`] is passed into each call.
pub struct Orchestrator {
    chat_client: Arc<dyn ChatClient>,
    exporters: ExportRegistry,
    system_prompt: Arc<String>,
}

impl Orchestrator {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        exporters: ExportRegistry,
        system_prompt: Arc<String>,
    ) -> Self {
        Self {
            chat_client,
            exporters,
            system_prompt,
        }
    }

    /// Handles one user turn. Fragments of the streamed reply are forwarded
    /// to `fragments` as they arrive (display concern only); the committed
    /// assistant message is always the full concatenation.
    pub async fn handle_turn(
        &self,
        state: &mut AppState,
        user_text: &str,
        fragments: Option<mpsc::Sender<String>>,
    ) -> Result<TurnOutput, ModelError> {
        match router::route(user_text, state) {
            Destination::Chat => self.chat_turn(state, user_text, fragments).await,
            Destination::Kickoff { lesson_id } => {
                let catalog = Arc::clone(&state.catalog);
                match catalog.get(&lesson_id) {
                    Some(lesson) => {
                        state.messages.push(ChatMessage::user(user_text));
                        Ok(TurnOutput::message(self.kickoff(state, lesson)))
                    }
                    // The router filters unknown ids; treat a miss as chat.
                    None => self.chat_turn(state, user_text, fragments).await,
                }
            }
            Destination::Step => self.step_turn(state, user_text, fragments).await,
            Destination::Completion => {
                state.messages.push(ChatMessage::user(user_text));
                Ok(self.finalize(state))
            }
        }
    }

    /// Starts a lesson by id, bypassing intent detection (the caller's UI
    /// equivalent of picking a lesson from the list). Replaces any lesson
    /// already in progress.
    pub fn start_lesson(
        &self,
        state: &mut AppState,
        lesson_id: &str,
    ) -> Result<TurnOutput, UnknownLessonError> {
        let catalog = Arc::clone(&state.catalog);
        let lesson = catalog
            .get(lesson_id)
            .ok_or_else(|| UnknownLessonError(lesson_id.to_string()))?;
        Ok(TurnOutput::message(self.kickoff(state, lesson)))
    }

    /// Explicitly abandons the active lesson. Returns `None` when no lesson
    /// is active.
    pub fn cancel_lesson(&self, state: &mut AppState) -> Option<ChatMessage> {
        if !state.lesson.active {
            return None;
        }
        let title = state
            .active_lesson()
            .map(|l| l.title.clone())
            .or_else(|| state.lesson.lesson_id.clone())
            .unwrap_or_else(|| "lesson".to_string());
        state.lesson.reset();
        info!(lesson = %title, "Lesson cancelled");
        let msg = ChatMessage::assistant(format!(
            "Lesson '{title}' cancelled. We can pick it up again any time."
        ));
        state.messages.push(msg.clone());
        Some(msg)
    }

    async fn chat_turn(
        &self,
        state: &mut AppState,
        user_text: &str,
        fragments: Option<mpsc::Sender<String>>,
    ) -> Result<TurnOutput, ModelError> {
        let system = prompt::system_prompt(&self.system_prompt, None);
        let mut context = state.messages.clone();
        context.push(ChatMessage::user(user_text));

        let reply = self.stream_to_completion(system, context, fragments).await?;

        // The stream finished; commit the whole turn at once.
        state.messages.push(ChatMessage::user(user_text));
        let mut output = TurnOutput::default();
        if !reply.trim().is_empty() {
            let assistant = ChatMessage::assistant(reply);
            state.messages.push(assistant.clone());
            output.messages.push(assistant);
        }
        Ok(output)
    }

    /// Activates the lesson at step 0 and emits the kickoff message. No
    /// model call and no user input required.
    fn kickoff(&self, state: &mut AppState, lesson: &LessonDefinition) -> ChatMessage {
        state.lesson = LessonState::start(&lesson.id);
        info!(lesson = %lesson.id, "Lesson started");
        let msg = ChatMessage::assistant(prompt::kickoff_message(lesson));
        state.messages.push(msg.clone());
        msg
    }

    async fn step_turn(
        &self,
        state: &mut AppState,
        user_text: &str,
        fragments: Option<mpsc::Sender<String>>,
    ) -> Result<TurnOutput, ModelError> {
        let catalog = Arc::clone(&state.catalog);
        let Some(lesson) = state
            .lesson
            .lesson_id
            .as_deref()
            .and_then(|id| catalog.get(id))
        else {
            // The catalog no longer knows this id; resetting beats a stuck lesson.
            warn!(lesson_id = ?state.lesson.lesson_id, "Active lesson missing from catalog; resetting");
            state.lesson.reset();
            let msg = ChatMessage::assistant(
                "Something went wrong and the lesson could not be continued. Please restart it.",
            );
            state.messages.push(msg.clone());
            return Ok(TurnOutput::message(msg));
        };

        let step_index = state.lesson.current_step_index;
        let Some(step) = lesson.step(step_index) else {
            warn!(
                lesson = %lesson.id,
                step_index, "Step index out of range; forcing completion"
            );
            state.lesson.completed = true;
            return Ok(self.finalize(state));
        };

        if user_text.trim().is_empty() {
            // Not a submission: reprompt locally, mutate nothing.
            return Ok(TurnOutput::message(ChatMessage::assistant(
                prompt::reprompt_message(step),
            )));
        }

        let system = prompt::system_prompt(&self.system_prompt, Some((lesson, step_index)));
        let mut context = state.messages.clone();
        context.push(ChatMessage::user(user_text));
        context.push(ChatMessage::assistant(prompt::coaching_preamble(step)));

        let reply = self.stream_to_completion(system, context, fragments).await?;

        // Stream done; record the submission and advance in one commit.
        state.messages.push(ChatMessage::user(user_text));
        let mut output = TurnOutput::default();
        if !reply.trim().is_empty() {
            let assistant = ChatMessage::assistant(reply);
            state.messages.push(assistant.clone());
            output.messages.push(assistant);
        }
        state.lesson.record_submission(step_index, user_text);
        state.lesson.current_step_index += 1;
        info!(lesson = %lesson.id, step = step_index, "Step submission recorded");

        if state.lesson.current_step_index >= lesson.step_count() {
            state.lesson.completed = true;
            let completion = self.finalize(state);
            output.messages.extend(completion.messages);
            output.artifact = completion.artifact;
        }
        Ok(output)
    }

    /// Finalizes a completed lesson: joins submissions with step metadata,
    /// invokes the registered exporter (if any), and resets the lesson so a
    /// new one can start immediately. Every branch resets and every branch
    /// tells the user what happened.
    fn finalize(&self, state: &mut AppState) -> TurnOutput {
        let catalog = Arc::clone(&state.catalog);
        let Some(lesson) = state
            .lesson
            .lesson_id
            .as_deref()
            .and_then(|id| catalog.get(id))
        else {
            warn!(lesson_id = ?state.lesson.lesson_id, "Completing lesson missing from catalog");
            state.lesson.reset();
            let msg = ChatMessage::assistant(
                "Something went wrong and the lesson could not be completed. Please restart it.",
            );
            state.messages.push(msg.clone());
            return TurnOutput::message(msg);
        };

        let records = match build_step_records(&state.lesson, lesson) {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "Completion invariant violated; resetting lesson");
                state.lesson.reset();
                let msg = ChatMessage::assistant(
                    "Something went wrong and the lesson could not be completed. Please restart it.",
                );
                state.messages.push(msg.clone());
                return TurnOutput::message(msg);
            }
        };

        let mut output = TurnOutput::default();
        let msg = match self.exporters.get(&lesson.id) {
            None => {
                info!(lesson = %lesson.id, "Lesson complete; no exporter registered");
                ChatMessage::assistant(format!("Lesson '{}' complete. Nice work!", lesson.title))
            }
            Some(exporter) => match exporter.export(&lesson.id, &records) {
                Ok(path) => {
                    info!(lesson = %lesson.id, artifact = %path.display(), "Lesson artifact exported");
                    let msg = ChatMessage::assistant(format!(
                        "Lesson '{}' complete. Your summary deck is ready at {}.",
                        lesson.title,
                        path.display()
                    ));
                    output.artifact = Some(path);
                    msg
                }
                Err(err) => {
                    warn!(lesson = %lesson.id, error = %err, "Artifact export failed");
                    ChatMessage::assistant(format!(
                        "Lesson '{}' is complete, but the summary could not be generated: {err}",
                        lesson.title
                    ))
                }
            },
        };

        state.lesson.reset();
        state.messages.push(msg.clone());
        output.messages.push(msg);
        output
    }

    /// Consumes the model stream to the end, forwarding fragments for
    /// display. A mid-stream error discards the partial text entirely.
    async fn stream_to_completion(
        &self,
        system_prompt: String,
        context: Vec<ChatMessage>,
        fragments: Option<mpsc::Sender<String>>,
    ) -> Result<String, ModelError> {
        let mut stream = self.chat_client.stream_chat(system_prompt, context).await?;
        let mut accumulated = String::new();
        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            if let Some(sink) = &fragments {
                // A dropped display receiver must not fail the turn.
                let _ = sink.send(fragment.clone()).await;
            }
            accumulated.push_str(&fragment);
        }
        Ok(accumulated)
    }
}

/// Joins submissions with step metadata on step index. Every index in
/// `[0, step_count)` must have a submission.
fn build_step_records(
    lesson_state: &LessonState,
    lesson: &LessonDefinition,
) -> Result<Vec<StepRecord>, IncompleteLessonError> {
    (0..lesson.step_count())
        .map(|index| {
            let submission =
                lesson_state
                    .submission_for(index)
                    .ok_or_else(|| IncompleteLessonError {
                        lesson_id: lesson.id.clone(),
                        step_index: index,
                    })?;
            let step = &lesson.steps[index];
            Ok(StepRecord {
                step: step.name.clone(),
                user_input: submission.text.clone(),
                goals: step.goals.clone(),
                best_practices: step.best_practices.clone(),
            })
        })
        .collect()
}
