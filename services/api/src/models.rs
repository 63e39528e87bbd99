//! REST API Models
//!
//! DTOs for the lesson catalog endpoints, with `utoipa` schemas for the
//! generated OpenAPI documentation. They are projections of the core types
//! so the core crate stays free of HTTP concerns.

use serde::{Deserialize, Serialize};
use studychat_core::lesson::{LessonDefinition, StepDefinition};
use utoipa::ToSchema;

/// One catalog entry as shown in the lesson list.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct LessonSummary {
    #[schema(example = "dmaic")]
    pub id: String,
    #[schema(example = "DMAIC")]
    pub title: String,
    pub description: String,
    pub step_count: usize,
}

impl From<&LessonDefinition> for LessonSummary {
    fn from(lesson: &LessonDefinition) -> Self {
        Self {
            id: lesson.id.clone(),
            title: lesson.title.clone(),
            description: lesson.description.clone(),
            step_count: lesson.step_count(),
        }
    }
}

/// Full lesson detail, steps included.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct LessonDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub steps: Vec<StepDetail>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct StepDetail {
    pub name: String,
    pub goals: Vec<String>,
    pub best_practices: Vec<String>,
    pub prompts_for_user: Vec<String>,
}

impl From<&StepDefinition> for StepDetail {
    fn from(step: &StepDefinition) -> Self {
        Self {
            name: step.name.clone(),
            goals: step.goals.clone(),
            best_practices: step.best_practices.clone(),
            prompts_for_user: step.prompts_for_user.clone(),
        }
    }
}

impl From<&LessonDefinition> for LessonDetail {
    fn from(lesson: &LessonDefinition) -> Self {
        Self {
            id: lesson.id.clone(),
            title: lesson.title.clone(),
            description: lesson.description.clone(),
            steps: lesson.steps.iter().map(StepDetail::from).collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson() -> LessonDefinition {
        LessonDefinition {
            id: "dmaic".to_string(),
            title: "DMAIC".to_string(),
            description: "A structured improvement cycle.".to_string(),
            steps: vec![StepDefinition {
                name: "Define".to_string(),
                goals: vec!["State the problem".to_string()],
                best_practices: vec![],
                prompts_for_user: vec!["Describe your problem statement.".to_string()],
            }],
        }
    }

    #[test]
    fn summary_projects_id_title_and_step_count() {
        let summary = LessonSummary::from(&lesson());
        assert_eq!(summary.id, "dmaic");
        assert_eq!(summary.title, "DMAIC");
        assert_eq!(summary.step_count, 1);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"step_count\":1"));
        let back: LessonSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn detail_preserves_step_order_and_content() {
        let detail = LessonDetail::from(&lesson());
        assert_eq!(detail.steps.len(), 1);
        assert_eq!(detail.steps[0].name, "Define");
        assert_eq!(
            detail.steps[0].prompts_for_user,
            vec!["Describe your problem statement."]
        );
    }

    #[test]
    fn error_response_serialization() {
        let error = ErrorResponse {
            message: "Lesson not found".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"message":"Lesson not found"}"#);
    }
}
