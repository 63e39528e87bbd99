//! Prompt Composition
//!
//! Builds the system prompt, the per-step coaching context, and the canned
//! lesson messages. The no-spoiler rule lives here: every piece of lesson
//! context handed to the model covers only the current and earlier steps,
//! so later goals and prompts cannot leak no matter what the model is told.

use crate::lesson::{LessonDefinition, StepDefinition};
use std::fmt::Write as _;

/// Default assistant behavior when no prompt file overrides it.
pub const SYSTEM_PROMPT_BASE: &str = "You are a helpful, expert chat assistant. Keep answers \
    practical and concise, and ask clarifying questions when needed. If the user requests \
    learning a lesson, activate step-by-step tutoring. Avoid performing all steps at once; \
    coach the user through each step with feedback and encouragement.";

/// Composes the system prompt for one turn. With an active lesson the base
/// prompt gains the study-mode modifier and an outline truncated at the
/// current step.
pub fn system_prompt(base: &str, lesson: Option<(&LessonDefinition, usize)>) -> String {
    let Some((lesson, step_index)) = lesson else {
        return base.to_string();
    };

    let mut out = String::from(base);
    let _ = write!(
        out,
        "\n\nStudy & Learn mode is ACTIVE for lesson '{}'. Teach strictly step-by-step. \
         For the current step: review the user's attempt, give precise feedback, and suggest \
         exactly ONE improvement. The outline below ends at the current step; do not invent \
         or reveal anything beyond it.\n\nLesson outline so far:\n",
        lesson.title
    );
    for (i, step) in lesson.steps.iter().take(step_index + 1).enumerate() {
        let goals: Vec<&str> = step.goals.iter().take(3).map(String::as_str).collect();
        let _ = writeln!(out, "{}. {} — goals: {}", i + 1, step.name, goals.join(", "));
    }
    out
}

/// The coaching preamble for the current step, appended to the generation
/// context as the last assistant message.
pub fn coaching_preamble(step: &StepDefinition) -> String {
    format!(
        "You are coaching the user through step '{}'.\n\
         Goals: {}\n\
         Best practices: {}\n\
         Prompts to ask the user: {}\n\
         Give precise feedback on the user's attempt and suggest exactly ONE improvement.\n\
         Keep the reply concise and focused on this step only.",
        step.name,
        step.goals.join("; "),
        step.best_practices.join("; "),
        step.prompts_for_user.join("; "),
    )
}

/// The single assistant message that opens a lesson: title, description and
/// the Step-1 prompt. Emitted without any model call.
pub fn kickoff_message(lesson: &LessonDefinition) -> String {
    let mut out = format!("**Starting lesson: {}**\n\n", lesson.title);
    if !lesson.description.is_empty() {
        let _ = write!(out, "{}\n\n", lesson.description);
    }

    // The catalog rejects zero-step lessons, so the first step exists.
    let Some(first) = lesson.step(0) else {
        let _ = write!(out, "_This lesson has no steps defined._");
        return out;
    };

    let _ = write!(out, "**Step 1 — {}**\n", first.name);
    let short_goals: Vec<&str> = first.goals.iter().take(2).map(String::as_str).collect();
    if !short_goals.is_empty() {
        let _ = write!(out, "_Goal(s):_ {}\n\n", short_goals.join("; "));
    }
    let _ = write!(
        out,
        "{}\n\nGo ahead and give it a try!",
        first.first_prompt()
    );
    out
}

/// Local reply for a whitespace-only step attempt; nothing is recorded and
/// the step does not advance.
pub fn reprompt_message(step: &StepDefinition) -> String {
    format!(
        "I need an attempt from you before we move on. {}",
        step.first_prompt()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson() -> LessonDefinition {
        LessonDefinition {
            id: "dmaic".to_string(),
            title: "DMAIC".to_string(),
            description: "A structured improvement cycle.".to_string(),
            steps: vec![
                StepDefinition {
                    name: "Define".to_string(),
                    goals: vec!["State the problem".to_string()],
                    best_practices: vec!["Be specific".to_string()],
                    prompts_for_user: vec!["Describe your problem statement.".to_string()],
                },
                StepDefinition {
                    name: "Measure".to_string(),
                    goals: vec!["Quantify the baseline".to_string()],
                    best_practices: vec!["Use real data".to_string()],
                    prompts_for_user: vec!["What will you measure?".to_string()],
                },
                StepDefinition {
                    name: "Analyze".to_string(),
                    goals: vec!["Find root causes".to_string()],
                    best_practices: vec![],
                    prompts_for_user: vec!["List likely root causes.".to_string()],
                },
            ],
        }
    }

    #[test]
    fn outline_never_includes_later_steps() {
        let lesson = lesson();
        for step_index in 0..lesson.step_count() {
            let context = format!(
                "{}\n{}",
                system_prompt(SYSTEM_PROMPT_BASE, Some((&lesson, step_index))),
                coaching_preamble(&lesson.steps[step_index]),
            );
            for later in &lesson.steps[step_index + 1..] {
                assert!(!context.contains(&later.name), "step {step_index} leaks a later name");
                for goal in &later.goals {
                    assert!(!context.contains(goal), "step {step_index} leaks a later goal");
                }
                for prompt in &later.prompts_for_user {
                    assert!(!context.contains(prompt), "step {step_index} leaks a later prompt");
                }
            }
        }
    }

    #[test]
    fn outline_includes_current_and_earlier_steps() {
        let prompt = system_prompt(SYSTEM_PROMPT_BASE, Some((&lesson(), 1)));
        assert!(prompt.contains("1. Define"));
        assert!(prompt.contains("2. Measure"));
        assert!(!prompt.contains("Analyze"));
    }

    #[test]
    fn no_lesson_means_base_prompt_only() {
        assert_eq!(system_prompt(SYSTEM_PROMPT_BASE, None), SYSTEM_PROMPT_BASE);
    }

    #[test]
    fn kickoff_names_the_lesson_and_first_step_prompt() {
        let msg = kickoff_message(&lesson());
        assert!(msg.contains("Starting lesson: DMAIC"));
        assert!(msg.contains("Step 1 — Define"));
        assert!(msg.contains("Describe your problem statement."));
        assert!(!msg.contains("Measure"));
    }

    #[test]
    fn preamble_carries_the_single_improvement_instruction() {
        let preamble = coaching_preamble(&lesson().steps[0]);
        assert!(preamble.contains("exactly ONE improvement"));
        assert!(preamble.contains("Define"));
    }
}
