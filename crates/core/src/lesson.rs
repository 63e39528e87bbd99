use serde::{Deserialize, Serialize};

/// A single step of a lesson.
///
/// Goals and best practices are coaching material fed to the model; the
/// user-facing prompts are what the assistant asks the learner to attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub name: String,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub best_practices: Vec<String>,
    #[serde(default)]
    pub prompts_for_user: Vec<String>,
}

impl StepDefinition {
    /// The first prompt to put in front of the user, with a generic fallback
    /// for steps that define none.
    pub fn first_prompt(&self) -> &str {
        self.prompts_for_user
            .first()
            .map(String::as_str)
            .unwrap_or("Share your initial attempt for this step.")
    }
}

/// A fully parsed lesson: an ordered sequence of steps under a unique id.
///
/// Immutable once loaded into the catalog. A valid lesson always has at
/// least one step; `LessonCatalog` rejects sources that do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<StepDefinition>,
}

impl LessonDefinition {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LessonDefinition {
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
                    goals: vec![],
                    best_practices: vec![],
                    prompts_for_user: vec![],
                },
            ],
        }
    }

    #[test]
    fn yaml_round_trip_preserves_id_title_and_step_order() {
        let lesson = sample();
        let yaml = serde_yaml::to_string(&lesson).unwrap();
        let parsed: LessonDefinition = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed.id, lesson.id);
        assert_eq!(parsed.title, lesson.title);
        let names: Vec<_> = parsed.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Define", "Measure"]);
        assert_eq!(parsed, lesson);
    }

    #[test]
    fn first_prompt_falls_back_when_step_defines_none() {
        let lesson = sample();
        assert_eq!(
            lesson.steps[0].first_prompt(),
            "Describe your problem statement."
        );
        assert_eq!(
            lesson.steps[1].first_prompt(),
            "Share your initial attempt for this step."
        );
    }

    #[test]
    fn step_lookup_is_bounds_checked() {
        let lesson = sample();
        assert_eq!(lesson.step_count(), 2);
        assert!(lesson.step(1).is_some());
        assert!(lesson.step(2).is_none());
    }
}
