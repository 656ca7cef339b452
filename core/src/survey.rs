//! Survey question records and the conditional-visibility rule shared by
//! every questionnaire surface.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::completion::response_complete;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    Condition,
    Measurement,
    YesNo,
    Rating,
    Text,
    Checklist,
    MultipleChoice,
    Number,
    /// Any type this engine has no dedicated rule for.
    #[serde(other)]
    Other,
}

/// Which answer is the safe one. On a `positive` question "yes" means the
/// safeguard is in place; on a `negative` question "yes" means a problem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskDirection {
    #[default]
    Positive,
    Negative,
}

/// One question of a facility-security questionnaire, with its answer.
///
/// `response` is type dependent (a string for yes-no, an object with
/// `value`/`assessment` for measurements, ...) and is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SurveyQuestion {
    /// Stable key from the questionnaire template
    pub template_id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Opaque references to photos or documents
    #[serde(default)]
    pub evidence: Vec<String>,
    /// `template_id` of the question this one depends on
    #[serde(default)]
    pub conditional_on_question_id: Option<String>,
    #[serde(default)]
    pub show_when_answer: Option<String>,
    #[serde(default)]
    pub risk_direction: RiskDirection,
}

impl SurveyQuestion {
    pub fn is_conditional(&self) -> bool {
        self.conditional_on_question_id.is_some()
    }

    /// Normalized text of the answer, if it is a scalar.
    pub fn answer_text(&self) -> Option<String> {
        self.response.as_ref().and_then(answer_text)
    }

    /// Answered under the completion rule for this question's type. The
    /// visibility check of dependent questions uses the same rule.
    pub fn is_answered(&self) -> bool {
        response_complete(self.question_type, self.response.as_ref())
    }
}

/// Trimmed, lowercased text of a scalar answer. Booleans read as yes/no.
pub fn answer_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
        }
        Value::Bool(true) => Some("yes".to_string()),
        Value::Bool(false) => Some("no".to_string()),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

/// `4.0` reads as `4` so stored floats match integer keys.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// Where a question stands under the conditional-visibility rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Unconditional, or the prerequisite answer matches.
    Visible,
    /// The prerequisite was answered with something else.
    Hidden,
    /// The prerequisite has no answer yet.
    PrerequisiteUnanswered,
    /// The prerequisite is not in the supplied collection.
    PrerequisiteMissing,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }

    /// Questions waiting on an unanswered or absent prerequisite count as
    /// complete so they never block overall progress.
    pub fn is_auto_complete(self) -> bool {
        matches!(
            self,
            Visibility::PrerequisiteUnanswered | Visibility::PrerequisiteMissing
        )
    }
}

/// Lookup of questions by `template_id`. The first occurrence of a key wins.
pub struct QuestionIndex<'a> {
    by_template: HashMap<&'a str, &'a SurveyQuestion>,
}

impl<'a> QuestionIndex<'a> {
    pub fn new(questions: &'a [SurveyQuestion]) -> Self {
        let mut by_template = HashMap::with_capacity(questions.len());
        for question in questions {
            by_template
                .entry(question.template_id.as_str())
                .or_insert(question);
        }
        Self { by_template }
    }

    pub fn get(&self, template_id: &str) -> Option<&'a SurveyQuestion> {
        self.by_template.get(template_id).copied()
    }

    pub fn visibility(&self, question: &SurveyQuestion) -> Visibility {
        let Some(prerequisite_id) = question.conditional_on_question_id.as_deref() else {
            return Visibility::Visible;
        };
        match self.get(prerequisite_id) {
            Some(prerequisite) => prerequisite_visibility(question, prerequisite),
            None => Visibility::PrerequisiteMissing,
        }
    }
}

/// Visibility of `question` when only the full collection is at hand.
pub fn visibility(question: &SurveyQuestion, all_questions: &[SurveyQuestion]) -> Visibility {
    let Some(prerequisite_id) = question.conditional_on_question_id.as_deref() else {
        return Visibility::Visible;
    };
    match all_questions.iter().find(|q| q.template_id == prerequisite_id) {
        Some(prerequisite) => prerequisite_visibility(question, prerequisite),
        None => Visibility::PrerequisiteMissing,
    }
}

fn prerequisite_visibility(question: &SurveyQuestion, prerequisite: &SurveyQuestion) -> Visibility {
    if !prerequisite.is_answered() {
        return Visibility::PrerequisiteUnanswered;
    }
    let Some(expected) = question.show_when_answer.as_deref() else {
        return Visibility::Visible;
    };
    match prerequisite.answer_text() {
        Some(actual) if actual.eq_ignore_ascii_case(expected.trim()) => Visibility::Visible,
        _ => Visibility::Hidden,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::Value;

    use super::{QuestionType, RiskDirection, SurveyQuestion};

    pub fn question(template_id: &str, question_type: QuestionType, response: Option<Value>) -> SurveyQuestion {
        SurveyQuestion {
            template_id: template_id.to_string(),
            category: "Perimeter".to_string(),
            subcategory: None,
            question_type,
            response,
            notes: None,
            evidence: Vec::new(),
            conditional_on_question_id: None,
            show_when_answer: None,
            risk_direction: RiskDirection::Positive,
        }
    }

    pub fn conditional(
        template_id: &str,
        prerequisite: &str,
        show_when: &str,
        response: Option<Value>,
    ) -> SurveyQuestion {
        SurveyQuestion {
            conditional_on_question_id: Some(prerequisite.to_string()),
            show_when_answer: Some(show_when.to_string()),
            ..question(template_id, QuestionType::YesNo, response)
        }
    }
}
