//! Artifact Export
//!
//! When a lesson completes, its recorded steps can be turned into a
//! downloadable artifact. Exporters register per lesson id; completion
//! looks the exporter up instead of branching on ids, so new lessons plug
//! in without touching the completion handler.

use crate::error::ExportError;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Read-only projection of one completed step, joined from the user's
/// submission and the step's definition. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: String,
    pub user_input: String,
    pub goals: Vec<String>,
    pub best_practices: Vec<String>,
}

/// A post-completion artifact producer for one lesson.
pub trait ArtifactExporter: Send + Sync {
    /// Produces the artifact for a completed lesson and returns its path.
    fn export(&self, lesson_id: &str, records: &[StepRecord]) -> Result<PathBuf, ExportError>;
}

/// Maps lesson ids to their registered exporter. Lessons without an entry
/// still complete normally; they just produce no artifact.
#[derive(Default, Clone)]
pub struct ExportRegistry {
    exporters: HashMap<String, Arc<dyn ArtifactExporter>>,
}

impl ExportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, lesson_id: impl Into<String>, exporter: Arc<dyn ArtifactExporter>) {
        self.exporters.insert(lesson_id.into(), exporter);
    }

    pub fn get(&self, lesson_id: &str) -> Option<Arc<dyn ArtifactExporter>> {
        self.exporters.get(lesson_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullExporter;

    impl ArtifactExporter for NullExporter {
        fn export(&self, _lesson_id: &str, _records: &[StepRecord]) -> Result<PathBuf, ExportError> {
            Ok(PathBuf::from("/dev/null"))
        }
    }

    #[test]
    fn registry_lookup_is_per_lesson_id() {
        let mut registry = ExportRegistry::new();
        registry.register("dmaic", Arc::new(NullExporter));

        assert!(registry.get("dmaic").is_some());
        assert!(registry.get("five_whys").is_none());
    }
}
