//! Wizard state machine — tracks which step the user is on and the answers
//! collected so far.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::WizardError;
use crate::wizard::model::{AccountDraft, format_elapsed};

/// The five steps of the onboarding wizard.
///
/// Progresses linearly: Intent → Tools → Questions → Account → Reveal.
/// Every step offers a transition back to its immediate predecessor, except
/// Reveal — completing the account step is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Intent,
    Tools,
    Questions,
    Account,
    Reveal,
}

impl WizardStep {
    /// 1-based step number shown in the progress chrome.
    pub fn number(&self) -> u8 {
        match self {
            Self::Intent => 1,
            Self::Tools => 2,
            Self::Questions => 3,
            Self::Account => 4,
            Self::Reveal => 5,
        }
    }

    /// Check if a transition from `self` to `target` is valid.
    ///
    /// Steps only offer transitions to their immediate neighbors, and there
    /// is no path back out of Reveal.
    pub fn can_transition_to(&self, target: WizardStep) -> bool {
        use WizardStep::*;
        matches!(
            (self, target),
            (Intent, Tools)
                | (Tools, Intent)
                | (Tools, Questions)
                | (Questions, Tools)
                | (Questions, Account)
                | (Account, Questions)
                | (Account, Reveal)
        )
    }

    /// Whether this step is terminal (the agent has been "created").
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Reveal)
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<WizardStep> {
        use WizardStep::*;
        match self {
            Intent => Some(Tools),
            Tools => Some(Questions),
            Questions => Some(Account),
            Account => Some(Reveal),
            Reveal => None,
        }
    }

    /// Get the previous step, if the wizard allows going back from here.
    pub fn prev(&self) -> Option<WizardStep> {
        use WizardStep::*;
        match self {
            Intent => None,
            Tools => Some(Intent),
            Questions => Some(Tools),
            Account => Some(Questions),
            // One-way: no path back from the reveal.
            Reveal => None,
        }
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::Intent
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Intent => "intent",
            Self::Tools => "tools",
            Self::Questions => "questions",
            Self::Account => "account",
            Self::Reveal => "reveal",
        };
        write!(f, "{s}")
    }
}

/// Everything the wizard has collected in the current session.
///
/// Held in memory only — refreshing or leaving the page discards it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardState {
    /// Current step.
    pub step: WizardStep,
    /// Free-text description of what the agent should do.
    pub intent: String,
    /// Selected integrations, in selection order, no duplicates.
    pub selected_tools: Vec<String>,
    /// Answers to the context questions, keyed by question id.
    pub context_answers: BTreeMap<String, String>,
    /// Account form data.
    pub account: AccountDraft,
    /// Epoch seconds of the first intent submission. Set exactly once per
    /// session, never reset.
    pub timer_start: Option<i64>,
    /// Elapsed time at completion, formatted `M:SS`.
    pub completed_elapsed: Option<String>,
    /// True iff the account step was submitted and the wizard reached Reveal.
    pub is_complete: bool,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: WizardStep::default(),
            intent: String::new(),
            selected_tools: Vec::new(),
            context_answers: BTreeMap::new(),
            account: AccountDraft::default(),
            timer_start: None,
            completed_elapsed: None,
            is_complete: false,
        }
    }
}

impl WizardState {
    /// Submit the intent text (step 1).
    ///
    /// Records the session timer start on the first submission only. A blank
    /// submission keeps the wizard on Intent rather than advancing with no
    /// input.
    pub fn submit_intent(&mut self, text: &str, now_epoch: i64) {
        self.intent = text.to_string();
        if self.timer_start.is_none() {
            self.timer_start = Some(now_epoch);
        }
        self.step = if text.trim().is_empty() {
            WizardStep::Intent
        } else {
            WizardStep::Tools
        };
    }

    /// Move to a neighboring step. Returns an error for any transition the
    /// steps themselves do not offer.
    pub fn goto(&mut self, target: WizardStep) -> Result<(), WizardError> {
        if !self.step.can_transition_to(target) {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                to: target,
            });
        }
        self.step = target;
        Ok(())
    }

    /// Complete the account step (step 4 → 5, one-way).
    ///
    /// Computes the elapsed time since the first intent submission (zero if
    /// the timer was never started) and marks the wizard complete. Returns
    /// the formatted elapsed time.
    pub fn complete_account_step(&mut self, now_epoch: i64) -> String {
        let elapsed_secs = self
            .timer_start
            .map(|start| (now_epoch - start).max(0))
            .unwrap_or(0);
        let elapsed = format_elapsed(elapsed_secs as u64);
        self.completed_elapsed = Some(elapsed.clone());
        self.step = WizardStep::Reveal;
        self.is_complete = true;
        elapsed
    }

    /// Replace the tool selection, dropping duplicates but keeping order.
    pub fn set_tools(&mut self, tools: Vec<String>) {
        let mut seen = Vec::with_capacity(tools.len());
        for tool in tools {
            if !seen.contains(&tool) {
                seen.push(tool);
            }
        }
        self.selected_tools = seen;
    }

    /// Toggle a single tool in or out of the selection.
    pub fn toggle_tool(&mut self, name: &str) {
        if let Some(pos) = self.selected_tools.iter().position(|t| t == name) {
            self.selected_tools.remove(pos);
        } else {
            self.selected_tools.push(name.to_string());
        }
    }

    /// Record an answer to a context question.
    pub fn set_answer(&mut self, question_id: &str, value: &str) {
        self.context_answers
            .insert(question_id.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use WizardStep::*;
        let transitions = [
            (Intent, Tools),
            (Tools, Intent),
            (Tools, Questions),
            (Questions, Tools),
            (Questions, Account),
            (Account, Questions),
            (Account, Reveal),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use WizardStep::*;
        // Skip steps
        assert!(!Intent.can_transition_to(Questions));
        assert!(!Tools.can_transition_to(Account));
        // Reveal is one-way
        assert!(!Reveal.can_transition_to(Account));
        assert!(!Reveal.can_transition_to(Intent));
        // Self-transition
        assert!(!Tools.can_transition_to(Tools));
    }

    #[test]
    fn next_and_prev_walk_the_line() {
        use WizardStep::*;
        assert_eq!(Intent.next(), Some(Tools));
        assert_eq!(Account.next(), Some(Reveal));
        assert_eq!(Reveal.next(), None);
        assert_eq!(Intent.prev(), None);
        assert_eq!(Account.prev(), Some(Questions));
        assert_eq!(Reveal.prev(), None);
    }

    #[test]
    fn step_numbers_cover_one_through_five() {
        use WizardStep::*;
        let numbers: Vec<u8> = [Intent, Tools, Questions, Account, Reveal]
            .iter()
            .map(|s| s.number())
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert!(Reveal.is_terminal());
        assert!(!Account.is_terminal());
    }

    #[test]
    fn display_matches_serde() {
        use WizardStep::*;
        for step in [Intent, Tools, Questions, Account, Reveal] {
            let display = format!("{step}");
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }

    #[test]
    fn blank_intent_stays_on_step_one() {
        let mut state = WizardState::default();
        state.submit_intent("   ", 1000);
        assert_eq!(state.step, WizardStep::Intent);
        // Timer still starts — the landing CTA enters the wizard with an
        // empty prompt and the clock runs from there.
        assert_eq!(state.timer_start, Some(1000));
    }

    #[test]
    fn intent_advances_and_timer_starts_once() {
        let mut state = WizardState::default();
        state.submit_intent("Schedule demos", 1000);
        assert_eq!(state.step, WizardStep::Tools);
        assert_eq!(state.timer_start, Some(1000));

        // Going back and re-submitting must not restart the clock.
        state.goto(WizardStep::Intent).unwrap();
        state.submit_intent("Answer calls", 1500);
        assert_eq!(state.timer_start, Some(1000));
        assert_eq!(state.step, WizardStep::Tools);
    }

    #[test]
    fn goto_rejects_skips() {
        let mut state = WizardState::default();
        let err = state.goto(WizardStep::Account).unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition { .. }));
        assert_eq!(state.step, WizardStep::Intent);
    }

    #[test]
    fn complete_account_step_formats_elapsed() {
        let mut state = WizardState::default();
        state.submit_intent("support", 1000);
        state.goto(WizardStep::Questions).unwrap();
        state.goto(WizardStep::Account).unwrap();

        let elapsed = state.complete_account_step(1000 + 125);
        assert_eq!(elapsed, "2:05");
        assert_eq!(state.completed_elapsed.as_deref(), Some("2:05"));
        assert_eq!(state.step, WizardStep::Reveal);
        assert!(state.is_complete);
    }

    #[test]
    fn complete_without_timer_is_zero() {
        let mut state = WizardState::default();
        state.step = WizardStep::Account;
        assert_eq!(state.complete_account_step(99999), "0:00");
    }

    #[test]
    fn tool_selection_dedupes_and_toggles() {
        let mut state = WizardState::default();
        state.set_tools(vec![
            "Gmail".into(),
            "Slack".into(),
            "Gmail".into(),
        ]);
        assert_eq!(state.selected_tools, vec!["Gmail", "Slack"]);

        state.toggle_tool("Slack");
        assert_eq!(state.selected_tools, vec!["Gmail"]);
        state.toggle_tool("Teams");
        assert_eq!(state.selected_tools, vec!["Gmail", "Teams"]);
    }

    #[test]
    fn state_serde_roundtrip() {
        let mut state = WizardState::default();
        state.submit_intent("Schedule meetings", 42);
        state.set_answer("duration", "30 min");

        let json = serde_json::to_string(&state).unwrap();
        let parsed: WizardState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.step, WizardStep::Tools);
        assert_eq!(parsed.intent, "Schedule meetings");
        assert_eq!(parsed.context_answers["duration"], "30 min");
    }
}
