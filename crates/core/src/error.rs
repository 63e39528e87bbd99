//! Error types for the lesson orchestration core.

use std::path::PathBuf;

/// Reasons a lesson source is rejected at catalog load.
///
/// A malformed source is skipped with a warning; it never aborts loading
/// the remaining sources.
#[derive(Debug, thiserror::Error)]
pub enum MalformedLessonError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("missing required field `id`")]
    MissingId,
    #[error("lesson '{id}' defines no steps")]
    NoSteps { id: String },
}

/// Internal invariant violation detected at completion: a step inside the
/// lesson's range has no recorded submission.
///
/// The step handler records exactly one submission per step, so this should
/// be unreachable; the completion handler still checks and recovers by
/// resetting the lesson.
#[derive(Debug, thiserror::Error)]
#[error("lesson '{lesson_id}' has no submission for step {step_index}")]
pub struct IncompleteLessonError {
    pub lesson_id: String,
    pub step_index: usize,
}

/// Artifact generation failure from an export collaborator.
///
/// Export is an enrichment: this error is reported to the user but never
/// blocks lesson completion.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write artifact '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact generation failed: {0}")]
    Generation(String),
}

/// Language-model collaborator failure.
///
/// Surfaced verbatim to the user; the turn mutates no state, so the same
/// message can simply be retried.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Api(#[from] async_openai::error::OpenAIError),
    #[error("model unavailable: {0}")]
    Unavailable(String),
}

/// Returned when a lesson start is requested for an id the catalog does not
/// contain.
#[derive(Debug, thiserror::Error)]
#[error("unknown lesson id '{0}'")]
pub struct UnknownLessonError(pub String);
