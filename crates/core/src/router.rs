//! Turn Routing
//!
//! Pure classification of an incoming user message against the current
//! session state. The router never mutates anything; it only decides which
//! handler a turn belongs to, so calling it twice with the same inputs
//! always yields the same destination.

use crate::catalog::LessonCatalog;
use crate::state::AppState;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Where a user turn is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Ordinary chat; no lesson involvement.
    Chat,
    /// The message asked to start a lesson; kick off step 0.
    Kickoff { lesson_id: String },
    /// An active lesson is mid-flight; treat the message as a step attempt.
    Step,
    /// The final step has been submitted; finalize the lesson.
    Completion,
}

/// Verbs that signal a lesson-start request ("teach me X", "I want to learn
/// X", "let's study X").
const TRIGGER_VERBS: [&str; 3] = ["teach", "learn", "study"];

/// Minimum `SkimMatcherV2` score for a title/id to count as requested.
/// Exact substring containment short-circuits this entirely.
const MATCH_THRESHOLD: i64 = 60;

/// Classifies one user turn. Priority order: an active lesson always wins
/// over intent detection, and completion-eligible state wins over stepping.
pub fn route(message: &str, state: &AppState) -> Destination {
    if state.lesson.active && !state.lesson.completed {
        return Destination::Step;
    }
    if state.lesson.active && state.lesson.completed {
        return Destination::Completion;
    }
    match detect_lesson_request(message, &state.catalog) {
        // An id that vanished from the catalog is treated as ordinary chat.
        Some(id) if state.catalog.get(&id).is_some() => Destination::Kickoff { lesson_id: id },
        _ => Destination::Chat,
    }
}

/// Returns the id of the lesson the message asks to start, if any.
///
/// A message qualifies when it contains a trigger verb and names a lesson,
/// either by exact (case-insensitive) title/id containment or by a fuzzy
/// match strong enough to clear [`MATCH_THRESHOLD`].
pub fn detect_lesson_request(message: &str, catalog: &LessonCatalog) -> Option<String> {
    let lowered = message.to_lowercase();
    if !TRIGGER_VERBS.iter().any(|verb| lowered.contains(verb)) {
        return None;
    }

    for lesson in catalog.list() {
        if lowered.contains(&lesson.title.to_lowercase()) || lowered.contains(&lesson.id.to_lowercase())
        {
            return Some(lesson.id.clone());
        }
    }

    let matcher = SkimMatcherV2::default();
    let mut best: Option<(i64, &str)> = None;
    for lesson in catalog.list() {
        let score = matcher
            .fuzzy_match(&lowered, &lesson.title.to_lowercase())
            .max(matcher.fuzzy_match(&lowered, &lesson.id.to_lowercase()));
        if let Some(score) = score {
            if score >= MATCH_THRESHOLD && best.is_none_or(|(b, _)| score > b) {
                best = Some((score, lesson.id.as_str()));
            }
        }
    }
    best.map(|(_, id)| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LessonSource;
    use crate::state::LessonState;
    use std::sync::Arc;

    fn catalog() -> Arc<LessonCatalog> {
        Arc::new(LessonCatalog::from_sources(vec![
            LessonSource::new(
                "dmaic.yaml",
                "id: dmaic\ntitle: DMAIC\nsteps:\n  - name: Define\n",
            ),
            LessonSource::new(
                "five_whys.yaml",
                "id: five_whys\ntitle: Five Whys\nsteps:\n  - name: Ask why\n",
            ),
        ]))
    }

    fn idle_state() -> AppState {
        AppState::new(catalog())
    }

    #[test]
    fn trigger_plus_title_routes_to_kickoff() {
        let state = idle_state();
        assert_eq!(
            route("Teach me about DMAIC", &state),
            Destination::Kickoff {
                lesson_id: "dmaic".to_string()
            }
        );
    }

    #[test]
    fn trigger_without_a_known_lesson_routes_to_chat() {
        let state = idle_state();
        assert_eq!(route("teach me about quantum physics", &state), Destination::Chat);
    }

    #[test]
    fn lesson_name_without_a_trigger_verb_routes_to_chat() {
        let state = idle_state();
        assert_eq!(route("what does DMAIC stand for?", &state), Destination::Chat);
    }

    #[test]
    fn active_lesson_always_routes_to_step() {
        let mut state = idle_state();
        state.lesson = LessonState::start("dmaic");
        // Even a message that looks like a start request stays in the step flow.
        assert_eq!(route("teach me about five whys", &state), Destination::Step);
    }

    #[test]
    fn completed_lesson_routes_to_completion() {
        let mut state = idle_state();
        state.lesson = LessonState::start("dmaic");
        state.lesson.completed = true;
        assert_eq!(route("anything", &state), Destination::Completion);
    }

    #[test]
    fn routing_is_idempotent() {
        let state = idle_state();
        let message = "I'd like to study the five whys";
        assert_eq!(route(message, &state), route(message, &state));
    }

    #[test]
    fn detection_matches_id_as_well_as_title() {
        let hit = detect_lesson_request("let's study five_whys today", &catalog());
        assert_eq!(hit.as_deref(), Some("five_whys"));
    }

    #[test]
    fn detection_is_case_insensitive() {
        let hit = detect_lesson_request("TEACH ME ABOUT dmaic", &catalog());
        assert_eq!(hit.as_deref(), Some("dmaic"));
    }
}
