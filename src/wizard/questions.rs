//! Context question generator.
//!
//! Derives the questions step's content deterministically from the intent
//! text and the selected tools. Recomputed on every request — cheap enough
//! that caching isn't worth it.

use serde::{Deserialize, Serialize};

/// Sentinel option value meaning "let the agent pick".
pub const AI_DECIDE: &str = "ai";

/// A selectable answer for a context question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: String,
    pub label: String,
}

impl QuestionOption {
    fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
        }
    }

    fn ai_decide() -> Self {
        Self {
            value: AI_DECIDE.to_string(),
            label: "Let AI decide".to_string(),
        }
    }
}

/// A context question shown on the questions step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_badge: Option<String>,
    pub options: Vec<QuestionOption>,
}

impl Question {
    fn new(id: &str, text: &str, badge: Option<&str>, options: Vec<QuestionOption>) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            tool_badge: badge.map(str::to_string),
            options,
        }
    }
}

/// The three fixed calendar questions, also used as the fallback set.
fn calendar_questions() -> Vec<Question> {
    vec![
        Question::new(
            "duration",
            "What is the standard duration for an appointment?",
            Some("Calendar"),
            vec![
                QuestionOption::new("30 min"),
                QuestionOption::new("45 min"),
                QuestionOption::new("60 min"),
                QuestionOption::ai_decide(),
            ],
        ),
        Question::new(
            "appointment_types",
            "Which appointment types should the agent schedule?",
            Some("Calendar"),
            vec![
                QuestionOption::new("Initial consultation"),
                QuestionOption::new("Follow-up"),
                QuestionOption::new("Telehealth"),
                QuestionOption::ai_decide(),
            ],
        ),
        Question::new(
            "confirmations",
            "How should clients receive confirmations?",
            Some("Calendar"),
            vec![
                QuestionOption::new("Email"),
                QuestionOption::new("Calendar invite"),
                QuestionOption::new("Both"),
                QuestionOption::new("No confirmation needed"),
                QuestionOption::ai_decide(),
            ],
        ),
    ]
}

fn response_style_question(has_sheets: bool) -> Question {
    Question::new(
        "response_style",
        "How should the agent respond to inquiries?",
        has_sheets.then_some("Sheets"),
        vec![
            QuestionOption::new("Professional and formal"),
            QuestionOption::new("Friendly and casual"),
            QuestionOption::new("Concise and direct"),
            QuestionOption::ai_decide(),
        ],
    )
}

/// Generate the context questions for the given intent and tool selection.
///
/// Pure and deterministic. When fewer than 3 questions accumulate, the whole
/// list is replaced by the fixed calendar fallback rather than topped up.
/// Known quirk: that override can drop a sheets-badged question entirely;
/// kept as-is pending product review.
pub fn get_questions(intent: &str, selected_tools: &[String]) -> Vec<Question> {
    let intent_lower = intent.to_lowercase();
    let has_calendar = selected_tools
        .iter()
        .any(|t| t.to_lowercase().contains("calendar"))
        || intent_lower.contains("schedule");
    let has_sheets = selected_tools
        .iter()
        .any(|t| t.to_lowercase().contains("sheet"));

    let mut questions = Vec::new();

    if has_calendar {
        questions.extend(calendar_questions());
    }

    if questions.is_empty() || has_sheets {
        questions.push(response_style_question(has_sheets));
    }

    if questions.len() < 3 {
        let mut fallback = calendar_questions();
        fallback.truncate(3);
        return fallback;
    }

    questions.truncate(4);
    questions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn ids(questions: &[Question]) -> Vec<&str> {
        questions.iter().map(|q| q.id.as_str()).collect()
    }

    #[test]
    fn schedule_intent_yields_calendar_questions() {
        // Exactly 3 questions — the <3 fallback must not trigger here.
        let questions = get_questions("I want to schedule appointments", &[]);
        assert_eq!(ids(&questions), vec!["duration", "appointment_types", "confirmations"]);
        assert!(questions.iter().all(|q| q.tool_badge.as_deref() == Some("Calendar")));
    }

    #[test]
    fn calendar_tool_matches_case_insensitively() {
        let questions = get_questions("hello", &tools(&["MS CALENDAR"]));
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].id, "duration");
    }

    #[test]
    fn no_signals_falls_back_to_calendar_set() {
        // No calendar, no sheets: one response-style question accumulates,
        // then the <3 fallback replaces it wholesale.
        let questions = get_questions("hello", &[]);
        assert_eq!(ids(&questions), vec!["duration", "appointment_types", "confirmations"]);
    }

    #[test]
    fn sheets_only_loses_its_question_to_the_fallback() {
        // Documented quirk: the fallback overrides rather than appends, so
        // the sheets-badged question disappears entirely.
        let questions = get_questions("hello", &tools(&["Google Sheets"]));
        assert_eq!(ids(&questions), vec!["duration", "appointment_types", "confirmations"]);
        assert!(questions.iter().all(|q| q.tool_badge.as_deref() != Some("Sheets")));
    }

    #[test]
    fn calendar_plus_sheets_appends_badged_style_question() {
        let questions =
            get_questions("schedule things", &tools(&["Google Calendar", "Google Sheets"]));
        assert_eq!(
            ids(&questions),
            vec!["duration", "appointment_types", "confirmations", "response_style"]
        );
        assert_eq!(questions[3].tool_badge.as_deref(), Some("Sheets"));
    }

    #[test]
    fn list_is_capped_at_four() {
        let questions =
            get_questions("schedule", &tools(&["Google Calendar", "Google Sheets", "Gmail"]));
        assert!(questions.len() <= 4);
    }

    #[test]
    fn every_question_offers_an_ai_escape() {
        let questions =
            get_questions("schedule", &tools(&["Google Calendar", "Google Sheets"]));
        for q in &questions {
            assert!(
                q.options.iter().any(|o| o.value == AI_DECIDE),
                "{} should offer Let AI decide",
                q.id
            );
        }
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let a = get_questions("schedule a demo", &tools(&["Google Sheets"]));
        let b = get_questions("schedule a demo", &tools(&["Google Sheets"]));
        assert_eq!(a, b);
    }
}
