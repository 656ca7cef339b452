use clap::Subcommand;
use serde::Deserialize;
use vantage_core::completion::completion_report;
use vantage_core::findings::findings;
use vantage_core::survey::SurveyQuestion;

use crate::util::{api_request, load_json_or_exit, parse_snapshot, print_result};

#[derive(Subcommand)]
pub enum SurveyCommands {
    /// Completion over all questions and over the visible ones, per category
    Progress {
        /// JSON file with {questions} (use '-' for stdin)
        #[arg(long)]
        file: String,
        /// Send to the API instead of computing locally
        #[arg(long)]
        remote: bool,
    },
    /// Visible answers that indicate a security gap
    Findings {
        /// JSON file with {questions} (use '-' for stdin)
        #[arg(long)]
        file: String,
        /// Send to the API instead of computing locally
        #[arg(long)]
        remote: bool,
    },
}

#[derive(Debug, Deserialize)]
struct SurveySnapshot {
    questions: Vec<SurveyQuestion>,
}

pub async fn run(api_url: &str, raw: bool, command: SurveyCommands) -> i32 {
    let (file, remote, path) = match &command {
        SurveyCommands::Progress { file, remote } => (file, *remote, "/v1/surveys/progress"),
        SurveyCommands::Findings { file, remote } => (file, *remote, "/v1/surveys/findings"),
    };

    let snapshot = load_json_or_exit(file);
    if remote {
        return api_request(api_url, reqwest::Method::POST, path, Some(snapshot), raw).await;
    }

    let snapshot: SurveySnapshot = match parse_snapshot(file, snapshot, raw) {
        Ok(s) => s,
        Err(code) => return code,
    };
    tracing::debug!(questions = snapshot.questions.len(), "survey snapshot loaded");

    match command {
        SurveyCommands::Progress { .. } => print_result(&completion_report(&snapshot.questions), raw),
        SurveyCommands::Findings { .. } => print_result(&findings(&snapshot.questions), raw),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn snapshot_parses_survey_questions() {
        let snapshot: SurveySnapshot = serde_json::from_value(json!({
            "questions": [
                {"template_id": "fence", "category": "Perimeter", "type": "condition", "response": "poor"},
                {"template_id": "gate-log", "category": "Perimeter", "type": "checklist",
                 "response": {"selectedOptions": ["badge"]}}
            ]
        }))
        .expect("snapshot should parse");

        let report = completion_report(&snapshot.questions);
        assert_eq!(report.all.completed, 2);
        assert_eq!(report.categories.len(), 1);

        let gaps = findings(&snapshot.questions);
        assert_eq!(gaps.findings.len(), 1);
        assert_eq!(gaps.findings[0].template_id, "fence");
    }

    #[test]
    fn unknown_question_type_is_tolerated() {
        let snapshot: SurveySnapshot = serde_json::from_value(json!({
            "questions": [{"template_id": "photo", "type": "photo-upload", "response": "x.jpg"}]
        }))
        .expect("unknown types fall back to Other");
        assert_eq!(completion_report(&snapshot.questions).all.total, 1);
    }
}
