//! Lesson Catalog
//!
//! Loads declarative YAML lesson definitions and serves them read-only for
//! the rest of the system. A malformed source is skipped with a warning so
//! one bad file never takes down the whole catalog.

use crate::error::MalformedLessonError;
use crate::lesson::{LessonDefinition, StepDefinition};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// A named, unparsed lesson document. The name is only used for logging.
#[derive(Debug, Clone)]
pub struct LessonSource {
    pub name: String,
    pub contents: String,
}

impl LessonSource {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Shape of a lesson document before validation. `id` is optional here so a
/// missing id can be reported distinctly from a YAML syntax error.
#[derive(Debug, Deserialize)]
struct RawLesson {
    id: Option<String>,
    title: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    steps: Vec<StepDefinition>,
}

/// Parsed lesson definitions keyed by id. Read-only after load.
#[derive(Debug, Default)]
pub struct LessonCatalog {
    lessons: HashMap<String, LessonDefinition>,
}

impl LessonCatalog {
    /// Parses each source into a [`LessonDefinition`]. Sources that fail to
    /// parse, lack an `id`, or define zero steps are skipped and logged;
    /// loading always continues with the remaining sources.
    pub fn from_sources(sources: impl IntoIterator<Item = LessonSource>) -> Self {
        let mut lessons: HashMap<String, LessonDefinition> = HashMap::new();
        for source in sources {
            match parse_lesson(&source.contents) {
                Ok(lesson) => {
                    if let Some(previous) = lessons.insert(lesson.id.clone(), lesson) {
                        warn!(
                            source = %source.name,
                            id = %previous.id,
                            "Duplicate lesson id; keeping the later definition"
                        );
                    }
                }
                Err(err) => {
                    warn!(source = %source.name, error = %err, "Skipping malformed lesson source");
                }
            }
        }
        Self { lessons }
    }

    /// Discovers `*.yaml`/`*.yml` files in a directory and loads them. A
    /// missing directory yields an empty catalog rather than an error; an
    /// unreadable file is skipped like a malformed one.
    pub fn load_dir(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Ok(Self::default());
        }

        let mut sources = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
            if !path.is_file() || !is_yaml {
                continue;
            }
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match std::fs::read_to_string(&path) {
                Ok(contents) => sources.push(LessonSource::new(name, contents)),
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "Skipping unreadable lesson file");
                }
            }
        }
        Ok(Self::from_sources(sources))
    }

    /// Pure read; returns `None` for ids no source declared.
    pub fn get(&self, id: &str) -> Option<&LessonDefinition> {
        self.lessons.get(id)
    }

    /// All lessons, sorted by title (then id) for deterministic presentation.
    pub fn list(&self) -> Vec<&LessonDefinition> {
        let mut lessons: Vec<_> = self.lessons.values().collect();
        lessons.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        lessons
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }
}

fn parse_lesson(contents: &str) -> Result<LessonDefinition, MalformedLessonError> {
    let raw: RawLesson = serde_yaml::from_str(contents)?;
    let id = raw.id.ok_or(MalformedLessonError::MissingId)?;
    if raw.steps.is_empty() {
        return Err(MalformedLessonError::NoSteps { id });
    }
    let title = raw.title.unwrap_or_else(|| id.clone());
    Ok(LessonDefinition {
        id,
        title,
        description: raw.description,
        steps: raw.steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DMAIC: &str = r#"
id: dmaic
title: DMAIC
description: A structured improvement cycle.
steps:
  - name: Define
    goals: ["State the problem"]
    prompts_for_user: ["Describe your problem statement."]
  - name: Measure
    goals: ["Quantify the baseline"]
"#;

    const NO_ID: &str = r#"
title: Orphan
steps:
  - name: Only step
"#;

    const NO_STEPS: &str = r#"
id: hollow
title: Hollow
steps: []
"#;

    #[test]
    fn loads_valid_sources_and_skips_malformed_ones() {
        let catalog = LessonCatalog::from_sources(vec![
            LessonSource::new("dmaic.yaml", DMAIC),
            LessonSource::new("orphan.yaml", NO_ID),
            LessonSource::new("hollow.yaml", NO_STEPS),
            LessonSource::new("broken.yaml", ": not yaml ["),
        ]);

        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("dmaic").is_some());
        assert!(catalog.get("hollow").is_none());
        let titles: Vec<_> = catalog.list().iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["DMAIC"]);
    }

    #[test]
    fn missing_id_is_reported_distinctly_from_bad_yaml() {
        assert!(matches!(
            parse_lesson(NO_ID),
            Err(MalformedLessonError::MissingId)
        ));
        assert!(matches!(
            parse_lesson(NO_STEPS),
            Err(MalformedLessonError::NoSteps { .. })
        ));
        assert!(matches!(
            parse_lesson(": not yaml ["),
            Err(MalformedLessonError::Yaml(_))
        ));
    }

    #[test]
    fn title_defaults_to_id_when_absent() {
        let lesson = parse_lesson("id: bare\nsteps:\n  - name: Step one\n").unwrap();
        assert_eq!(lesson.title, "bare");
    }

    #[test]
    fn list_is_sorted_by_title() {
        let catalog = LessonCatalog::from_sources(vec![
            LessonSource::new("b.yaml", "id: b\ntitle: Zeta\nsteps:\n  - name: S\n"),
            LessonSource::new("a.yaml", "id: a\ntitle: Alpha\nsteps:\n  - name: S\n"),
        ]);
        let ids: Vec<_> = catalog.list().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn load_dir_reads_yaml_files_and_ignores_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dmaic.yaml"), DMAIC).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a lesson").unwrap();
        std::fs::write(dir.path().join("orphan.yml"), NO_ID).unwrap();

        let catalog = LessonCatalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("dmaic").is_some());
    }

    #[test]
    fn load_dir_on_missing_directory_is_an_empty_catalog() {
        let catalog = LessonCatalog::load_dir("/does/not/exist").unwrap();
        assert!(catalog.is_empty());
    }
}
