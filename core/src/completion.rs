//! Completion tracking for questionnaires.
//!
//! Whether a question is complete depends only on its type, its response
//! and its prerequisite, so every surface that shows a question reports the
//! same status for it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::survey::{QuestionIndex, QuestionType, SurveyQuestion, Visibility, visibility};

/// Whether a response satisfies the completion rule for its question type,
/// ignoring visibility.
pub fn response_complete(question_type: QuestionType, response: Option<&Value>) -> bool {
    let Some(response) = response else {
        return false;
    };
    match question_type {
        QuestionType::Measurement => field_present(response, "value") && field_present(response, "assessment"),
        QuestionType::Text => field_present(response, "assessment"),
        QuestionType::Checklist => selected_options(response).is_some_and(|items| !items.is_empty()),
        // Whitespace-only strings read as empty, as they do everywhere
        // answers are compared.
        QuestionType::YesNo | QuestionType::Condition | QuestionType::Rating => match response {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        },
        QuestionType::MultipleChoice | QuestionType::Number | QuestionType::Other => is_truthy(response),
    }
}

fn field_present(response: &Value, key: &str) -> bool {
    match response.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

fn selected_options(response: &Value) -> Option<&Vec<Value>> {
    response
        .get("selected_options")
        .or_else(|| response.get("selectedOptions"))
        .and_then(Value::as_array)
}

/// Loose truthiness: null, false, 0, NaN and "" are falsy; containers are
/// truthy even when empty.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn complete_with(question: &SurveyQuestion, visibility: Visibility) -> bool {
    visibility.is_auto_complete() || response_complete(question.question_type, question.response.as_ref())
}

/// Completion of one question against the full collection it belongs to.
///
/// A conditional question whose prerequisite is unanswered (or absent)
/// is complete whatever its own response.
pub fn is_complete(question: &SurveyQuestion, all_questions: &[SurveyQuestion]) -> bool {
    complete_with(question, visibility(question, all_questions))
}

/// Completed out of total, as counts and a percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// 0..=100, and 0 when there is nothing to answer.
    pub percent: f64,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            completed as f64 * 100.0 / total as f64
        };
        Self {
            completed,
            total,
            percent,
        }
    }

    fn record(&mut self, complete: bool) {
        *self = Progress::new(self.completed + usize::from(complete), self.total + 1);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryProgress {
    pub category: String,
    pub all: Progress,
    pub visible: Progress,
}

/// Progress over every question and over the visible slice only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompletionReport {
    /// Every question; auto-complete conditionals count as done.
    pub all: Progress,
    /// Only questions whose prerequisite (if any) is answered and matches.
    pub visible: Progress,
    /// In order of first appearance.
    pub categories: Vec<CategoryProgress>,
}

/// Progress over every question.
pub fn progress(questions: &[SurveyQuestion]) -> Progress {
    completion_report(questions).all
}

/// Progress over visible questions only.
pub fn visible_progress(questions: &[SurveyQuestion]) -> Progress {
    completion_report(questions).visible
}

pub fn completion_report(questions: &[SurveyQuestion]) -> CompletionReport {
    let index = QuestionIndex::new(questions);
    let mut all = Progress::default();
    let mut visible = Progress::default();
    let mut categories: Vec<CategoryProgress> = Vec::new();

    for question in questions {
        let status = index.visibility(question);
        let complete = complete_with(question, status);

        let position = match categories.iter().position(|c| c.category == question.category) {
            Some(position) => position,
            None => {
                categories.push(CategoryProgress {
                    category: question.category.clone(),
                    all: Progress::default(),
                    visible: Progress::default(),
                });
                categories.len() - 1
            }
        };
        let category = &mut categories[position];

        all.record(complete);
        category.all.record(complete);
        if status.is_visible() {
            visible.record(complete);
            category.visible.record(complete);
        }
    }

    CompletionReport {
        all,
        visible,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::survey::fixtures::{conditional, question};

    #[test]
    fn measurement_needs_value_and_assessment() {
        let t = QuestionType::Measurement;
        assert!(response_complete(t, Some(&json!({"value": 12, "assessment": "adequate"}))));
        assert!(!response_complete(t, Some(&json!({"value": 12}))));
        assert!(!response_complete(t, Some(&json!({"value": null, "assessment": "poor"}))));
        assert!(!response_complete(t, None));
    }

    #[test]
    fn text_needs_assessment_only() {
        let t = QuestionType::Text;
        assert!(response_complete(t, Some(&json!({"assessment": "good"}))));
        assert!(response_complete(t, Some(&json!({"assessment": "good", "text": ""}))));
        assert!(!response_complete(t, Some(&json!({"text": "Gate is rusty"}))));
    }

    #[test]
    fn checklist_needs_selected_options() {
        let t = QuestionType::Checklist;
        assert!(response_complete(t, Some(&json!({"selected_options": ["badge"]}))));
        assert!(response_complete(t, Some(&json!({"selectedOptions": ["pin"]}))));
        assert!(!response_complete(t, Some(&json!({"selected_options": []}))));
        assert!(!response_complete(t, Some(&json!("badge"))));
    }

    #[test]
    fn scalar_types_need_non_empty_answer() {
        for t in [QuestionType::YesNo, QuestionType::Condition, QuestionType::Rating] {
            assert!(response_complete(t, Some(&json!("yes"))));
            assert!(!response_complete(t, Some(&json!(""))));
            assert!(!response_complete(t, Some(&json!("  "))));
            assert!(response_complete(t, Some(&json!(0))));
            assert!(!response_complete(t, Some(&Value::Null)));
        }
    }

    #[test]
    fn other_types_use_truthiness() {
        assert!(response_complete(QuestionType::Number, Some(&json!(3))));
        assert!(!response_complete(QuestionType::Number, Some(&json!(0))));
        assert!(response_complete(QuestionType::MultipleChoice, Some(&json!("b"))));
        assert!(!response_complete(QuestionType::Other, Some(&json!(false))));
        assert!(response_complete(QuestionType::Other, Some(&json!([]))));
    }

    #[test]
    fn conditional_with_unanswered_prerequisite_is_complete() {
        let questions = vec![
            question("cctv", QuestionType::YesNo, None),
            conditional("cctv-retention", "cctv", "yes", None),
        ];
        assert!(is_complete(&questions[1], &questions));
        assert!(!is_complete(&questions[0], &questions));
    }

    #[test]
    fn auto_complete_ignores_the_conditional_questions_own_response() {
        let mut gate_lux = question("gate-lux", QuestionType::Measurement, Some(json!({"value": 12})));
        gate_lux.conditional_on_question_id = Some("gate".to_string());
        gate_lux.show_when_answer = Some("yes".to_string());
        let questions = vec![
            question("gate", QuestionType::YesNo, None),
            conditional("gate-guard", "gate", "yes", Some(json!(""))),
            gate_lux,
        ];
        assert!(!response_complete(QuestionType::YesNo, Some(&json!(""))));
        assert!(is_complete(&questions[1], &questions));
        assert!(is_complete(&questions[2], &questions));
    }

    #[test]
    fn blank_prerequisite_does_not_inflate_visible_progress() {
        let questions = vec![
            question("cctv", QuestionType::YesNo, Some(json!("   "))),
            conditional("cctv-retention", "cctv", "yes", None),
        ];
        let report = completion_report(&questions);
        assert_eq!(report.visible, Progress::new(0, 1));
        assert_eq!(report.all, Progress::new(1, 2));
    }

    #[test]
    fn empty_object_prerequisite_hides_rather_than_auto_completes() {
        let questions = vec![
            question("cctv", QuestionType::YesNo, Some(json!({}))),
            conditional("cctv-retention", "cctv", "yes", None),
        ];
        assert!(is_complete(&questions[0], &questions));
        assert!(!is_complete(&questions[1], &questions));
        assert_eq!(completion_report(&questions).all, Progress::new(1, 2));
    }

    #[test]
    fn conditional_with_missing_prerequisite_is_complete() {
        let questions = vec![conditional("cctv-retention", "cctv", "yes", None)];
        assert!(is_complete(&questions[0], &questions));
    }

    #[test]
    fn empty_collection_has_zero_progress() {
        assert_eq!(progress(&[]), Progress { completed: 0, total: 0, percent: 0.0 });
        assert_eq!(visible_progress(&[]), Progress::new(0, 0));
        assert!(completion_report(&[]).categories.is_empty());
    }

    #[test]
    fn report_separates_all_and_visible_slices() {
        let mut lighting = question("lighting", QuestionType::Rating, Some(json!(4)));
        lighting.category = "Lighting".to_string();
        let questions = vec![
            question("cctv", QuestionType::YesNo, Some(json!("no"))),
            // hidden: prerequisite answered "no"
            conditional("cctv-retention", "cctv", "yes", None),
            question("fence", QuestionType::YesNo, None),
            question("alarm", QuestionType::YesNo, None),
            // auto-complete: prerequisite unanswered
            conditional("alarm-monitoring", "alarm", "yes", None),
            lighting,
        ];

        let report = completion_report(&questions);
        assert_eq!(report.all.total, 6);
        assert_eq!(report.all.completed, 3);
        assert_eq!(report.all.percent, 50.0);
        assert_eq!(report.visible.total, 4);
        assert_eq!(report.visible.completed, 2);
        assert_eq!(report.visible.percent, 50.0);

        assert_eq!(report.categories.len(), 2);
        assert_eq!(report.categories[0].category, "Perimeter");
        assert_eq!(report.categories[0].all, Progress::new(2, 5));
        assert_eq!(report.categories[1].category, "Lighting");
        assert_eq!(report.categories[1].visible, Progress::new(1, 1));

        assert_eq!(progress(&questions), report.all);
    }

    #[test]
    fn status_is_the_same_through_every_entry_point() {
        let questions = vec![
            question("cctv", QuestionType::YesNo, Some(json!("yes"))),
            conditional("cctv-retention", "cctv", "yes", Some(json!("30 days"))),
        ];
        let report = completion_report(&questions);
        let individually = questions.iter().filter(|q| is_complete(q, &questions)).count();
        assert_eq!(report.all.completed, individually);
    }
}
