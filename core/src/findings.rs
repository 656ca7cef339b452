//! Severity roll-up of survey answers: which visible answers point at a
//! security gap, counted per category.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::survey::{QuestionIndex, QuestionType, RiskDirection, SurveyQuestion, answer_text};

/// Condition answers that count as a gap.
const GAP_CONDITIONS: &[&str] = &["poor", "critical"];

/// An answer that indicates a missing or failing safeguard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Finding {
    pub template_id: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub answer: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryFindings {
    pub category: String,
    pub gaps: usize,
    /// Visible questions with an answer that the gap rules can judge.
    pub answered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FindingsReport {
    pub findings: Vec<Finding>,
    /// In order of first appearance.
    pub by_category: Vec<CategoryFindings>,
}

/// Judge one answer. `None` means the question type or answer shape is not
/// something the gap rules cover.
pub fn is_gap(question: &SurveyQuestion) -> Option<bool> {
    let response = question.response.as_ref()?;
    match question.question_type {
        QuestionType::YesNo => {
            let answer = answer_text(response)?;
            match (answer.as_str(), question.risk_direction) {
                ("yes", RiskDirection::Positive) | ("no", RiskDirection::Negative) => Some(false),
                ("no", RiskDirection::Positive) | ("yes", RiskDirection::Negative) => Some(true),
                _ => None,
            }
        }
        QuestionType::Condition => {
            let answer = answer_text(response)?;
            Some(GAP_CONDITIONS.contains(&answer.as_str()))
        }
        QuestionType::Rating => {
            let rating = rating_value(response)?;
            Some(match question.risk_direction {
                RiskDirection::Positive => rating <= 2.0,
                RiskDirection::Negative => rating >= 4.0,
            })
        }
        _ => None,
    }
}

fn rating_value(response: &Value) -> Option<f64> {
    match response {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Collect gaps over visible questions. Hidden and auto-complete
/// conditionals never produce findings.
pub fn findings(questions: &[SurveyQuestion]) -> FindingsReport {
    let index = QuestionIndex::new(questions);
    let mut report = FindingsReport {
        findings: Vec::new(),
        by_category: Vec::new(),
    };

    for question in questions {
        if !index.visibility(question).is_visible() {
            continue;
        }
        let Some(gap) = is_gap(question) else {
            continue;
        };

        let position = match report
            .by_category
            .iter()
            .position(|c| c.category == question.category)
        {
            Some(position) => position,
            None => {
                report.by_category.push(CategoryFindings {
                    category: question.category.clone(),
                    gaps: 0,
                    answered: 0,
                });
                report.by_category.len() - 1
            }
        };
        let category = &mut report.by_category[position];
        category.answered += 1;

        if gap {
            category.gaps += 1;
            report.findings.push(Finding {
                template_id: question.template_id.clone(),
                category: question.category.clone(),
                subcategory: question.subcategory.clone(),
                question_type: question.question_type,
                answer: question.response.clone().unwrap_or(Value::Null),
            });
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::survey::fixtures::{conditional, question};

    #[test]
    fn yes_no_gap_follows_risk_direction() {
        let mut q = question("locks", QuestionType::YesNo, Some(json!("No")));
        assert_eq!(is_gap(&q), Some(true));
        q.risk_direction = RiskDirection::Negative;
        assert_eq!(is_gap(&q), Some(false));
        q.response = Some(json!("yes"));
        assert_eq!(is_gap(&q), Some(true));
        q.response = Some(json!("n/a"));
        assert_eq!(is_gap(&q), None);
    }

    #[test]
    fn condition_gaps_are_poor_or_critical() {
        let poor = question("gate", QuestionType::Condition, Some(json!("Poor")));
        let fair = question("gate", QuestionType::Condition, Some(json!("fair")));
        assert_eq!(is_gap(&poor), Some(true));
        assert_eq!(is_gap(&fair), Some(false));
    }

    #[test]
    fn rating_gap_thresholds() {
        let mut q = question("lighting", QuestionType::Rating, Some(json!(2)));
        assert_eq!(is_gap(&q), Some(true));
        q.response = Some(json!("3"));
        assert_eq!(is_gap(&q), Some(false));
        q.risk_direction = RiskDirection::Negative;
        q.response = Some(json!(4));
        assert_eq!(is_gap(&q), Some(true));
    }

    #[test]
    fn unanswered_and_unjudged_types_are_skipped() {
        assert_eq!(is_gap(&question("a", QuestionType::YesNo, None)), None);
        assert_eq!(is_gap(&question("b", QuestionType::Text, Some(json!({"assessment": "poor"})))), None);
    }

    #[test]
    fn findings_ignore_hidden_questions() {
        let mut lobby = question("lobby-guard", QuestionType::YesNo, Some(json!("no")));
        lobby.category = "Interior".to_string();
        let questions = vec![
            question("cctv", QuestionType::YesNo, Some(json!("no"))),
            conditional("cctv-recording", "cctv", "yes", Some(json!("no"))),
            question("fence", QuestionType::YesNo, Some(json!("yes"))),
            lobby,
        ];

        let report = findings(&questions);
        let ids: Vec<&str> = report.findings.iter().map(|f| f.template_id.as_str()).collect();
        assert_eq!(ids, vec!["cctv", "lobby-guard"]);
        assert_eq!(
            report.by_category,
            vec![
                CategoryFindings { category: "Perimeter".to_string(), gaps: 1, answered: 2 },
                CategoryFindings { category: "Interior".to_string(), gaps: 1, answered: 1 },
            ]
        );
    }
}
