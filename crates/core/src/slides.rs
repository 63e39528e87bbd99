//! Markdown Slide Deck Export
//!
//! Renders a completed lesson as a slide-deck-shaped Markdown document: a
//! title slide, an overview, a step index, then one slide per step with the
//! user's input alongside the step's goals and best practices.

use crate::error::ExportError;
use crate::export::{ArtifactExporter, StepRecord};
use chrono::Local;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

/// Placeholder for empty inputs and empty goal/practice lists.
const EMPTY_FIELD: &str = "—";

/// Writes a timestamped `<lesson_id>_summary_*.md` deck into an output
/// directory, creating the directory on first use.
pub struct MarkdownDeckExporter {
    output_dir: PathBuf,
    deck_title: String,
}

impl MarkdownDeckExporter {
    pub fn new(output_dir: impl Into<PathBuf>, deck_title: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            deck_title: deck_title.into(),
        }
    }

    fn render(&self, records: &[StepRecord], generated_at: &str) -> String {
        let mut out = String::new();

        // Title slide
        let _ = writeln!(out, "# {}\n", self.deck_title);
        let _ = writeln!(out, "Generated {generated_at}\n");

        // Overview slide
        let _ = writeln!(out, "---\n");
        let _ = writeln!(out, "## Overview\n");
        let _ = writeln!(out, "Your session at a glance.\n");

        // Index slide
        let _ = writeln!(out, "---\n");
        let _ = writeln!(out, "## Steps Covered\n");
        for (i, record) in records.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, record.step);
        }
        let _ = writeln!(out);

        // One slide per step
        for record in records {
            let _ = writeln!(out, "---\n");
            let _ = writeln!(out, "## {}\n", record.step);

            let _ = writeln!(out, "### Your Input\n");
            let input = record.user_input.trim();
            let _ = writeln!(out, "{}\n", if input.is_empty() { EMPTY_FIELD } else { input });

            let _ = writeln!(out, "### Goals\n");
            write_bullets(&mut out, &record.goals);

            let _ = writeln!(out, "### Best Practices\n");
            write_bullets(&mut out, &record.best_practices);
        }

        out
    }
}

fn write_bullets(out: &mut String, items: &[String]) {
    if items.is_empty() {
        let _ = writeln!(out, "{EMPTY_FIELD}\n");
        return;
    }
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
    let _ = writeln!(out);
}

impl ArtifactExporter for MarkdownDeckExporter {
    fn export(&self, lesson_id: &str, records: &[StepRecord]) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| ExportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let now = Local::now();
        let contents = self.render(records, &now.format("%Y-%m-%d %H:%M").to_string());
        let path = self
            .output_dir
            .join(format!("{lesson_id}_summary_{}.md", now.format("%Y%m%d_%H%M%S")));
        fs::write(&path, contents).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<StepRecord> {
        vec![
            StepRecord {
                step: "Define".to_string(),
                user_input: "Scrap rate is too high on line 3.".to_string(),
                goals: vec!["State the problem".to_string()],
                best_practices: vec!["Be specific".to_string()],
            },
            StepRecord {
                step: "Measure".to_string(),
                user_input: "  ".to_string(),
                goals: vec![],
                best_practices: vec![],
            },
        ]
    }

    #[test]
    fn render_contains_one_section_per_step_in_order() {
        let exporter = MarkdownDeckExporter::new("exports", "DMAIC Summary");
        let deck = exporter.render(&records(), "2026-08-07 12:00");

        assert!(deck.starts_with("# DMAIC Summary"));
        assert!(deck.contains("## Steps Covered"));
        assert!(deck.contains("1. Define"));
        assert!(deck.contains("2. Measure"));
        let define = deck.find("## Define").unwrap();
        let measure = deck.find("## Measure").unwrap();
        assert!(define < measure);
        assert!(deck.contains("Scrap rate is too high on line 3."));
    }

    #[test]
    fn empty_fields_render_as_placeholder() {
        let exporter = MarkdownDeckExporter::new("exports", "DMAIC Summary");
        let deck = exporter.render(&records(), "2026-08-07 12:00");
        let measure_section = &deck[deck.find("## Measure").unwrap()..];
        assert!(measure_section.contains(EMPTY_FIELD));
    }

    #[test]
    fn export_writes_a_markdown_file_under_the_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = MarkdownDeckExporter::new(dir.path().join("exports"), "DMAIC Summary");

        let path = exporter.export("dmaic", &records()).unwrap();

        assert!(path.starts_with(dir.path().join("exports")));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("dmaic_summary_"));
        assert!(name.ends_with(".md"));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("## Define"));
    }
}
