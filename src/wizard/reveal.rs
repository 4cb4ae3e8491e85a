//! Reveal/loading sequence — the simulated "generating your agent" phase and
//! the reveal screen that follows it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};

use crate::config::WizardConfig;
use crate::wizard::events::WizardEvent;

/// Rotating status messages shown while "generating" the agent.
pub const LOADING_MESSAGES: [&str; 6] = [
    "Analyzing your business requirements...",
    "Configuring your AI Agent personality...",
    "Connecting your tools...",
    "Generating conversation flows...",
    "Assigning your phone number...",
    "Running final checks...",
];

/// The phone number every demo agent "receives".
pub const AGENT_PHONE_NUMBER: &str = "+1 (551) 360-6500";

/// Reveal phases: a fixed-duration loading simulation, then the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealPhase {
    Loading,
    Reveal,
}

impl Default for RevealPhase {
    fn default() -> Self {
        Self::Loading
    }
}

/// State of the reveal sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevealState {
    pub phase: RevealPhase,
    /// Loading progress, 0..=100.
    pub progress: u8,
    /// Index into [`LOADING_MESSAGES`].
    pub message_index: usize,
    /// Integrations the user has "connected" on the reveal screen.
    pub connected_tools: Vec<String>,
}

/// A line of the sample conversation shown on the reveal screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMessage {
    pub role: SampleRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleRole {
    User,
    Agent,
}

fn message(role: SampleRole, content: &str) -> SampleMessage {
    SampleMessage {
        role,
        content: content.to_string(),
    }
}

/// Canned demo conversation, keyed off the intent text.
pub fn sample_messages(intent: &str) -> Vec<SampleMessage> {
    use SampleRole::{Agent, User};
    let lower = intent.to_lowercase();
    if lower.contains("schedule") || lower.contains("meeting") {
        return vec![
            message(User, "Hi, I'd like to schedule a consultation for next week."),
            message(
                Agent,
                "I'd be happy to help! What day works best for you? I have openings on Tuesday and Thursday.",
            ),
            message(User, "Thursday afternoon would work."),
            message(
                Agent,
                "Perfect! I've booked you for Thursday at 2:00 PM. You'll receive a calendar invite shortly.",
            ),
        ];
    }
    if lower.contains("support") || lower.contains("customer") {
        return vec![
            message(User, "I'm having trouble with my order #12345."),
            message(
                Agent,
                "I'm sorry to hear that. Let me look that up. Can you tell me what issue you're experiencing?",
            ),
            message(User, "It hasn't arrived yet and it's been a week."),
            message(
                Agent,
                "I've escalated this to our support team. They'll reach out within 2 hours with tracking info.",
            ),
        ];
    }
    vec![
        message(User, "Hi, I have a question about your services."),
        message(Agent, "Hello! I'd be glad to help. What would you like to know?"),
        message(User, "What are your business hours?"),
        message(
            Agent,
            "We're available Monday through Friday, 9 AM to 6 PM EST. I can also take messages after hours!",
        ),
    ]
}

/// Spawn the progress ticker.
///
/// Adds `progress_step` percent per `progress_tick` until 100, then flips
/// the phase to `Reveal`, emits the one-shot celebration event, and exits.
/// Exits early if the phase is no longer `Loading`.
pub fn spawn_progress_task(
    state: Arc<RwLock<RevealState>>,
    config: WizardConfig,
    events: broadcast::Sender<WizardEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.progress_tick);
        // The first interval tick fires immediately; skip it so each tick
        // after represents one elapsed period.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let mut reveal = state.write().await;
            if reveal.phase != RevealPhase::Loading {
                break;
            }
            reveal.progress = reveal.progress.saturating_add(config.progress_step).min(100);
            let _ = events.send(WizardEvent::RevealProgress {
                percent: reveal.progress,
            });
            if reveal.progress >= 100 {
                reveal.phase = RevealPhase::Reveal;
                let _ = events.send(WizardEvent::RevealReady);
                break;
            }
        }
    })
}

/// Spawn the rotating-message ticker.
///
/// Cycles through [`LOADING_MESSAGES`] on its own faster interval,
/// independent of the progress percentage, and exits once loading ends.
pub fn spawn_message_task(
    state: Arc<RwLock<RevealState>>,
    config: WizardConfig,
    events: broadcast::Sender<WizardEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.message_tick);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let mut reveal = state.write().await;
            if reveal.phase != RevealPhase::Loading {
                break;
            }
            reveal.message_index = (reveal.message_index + 1) % LOADING_MESSAGES.len();
            let _ = events.send(WizardEvent::RevealMessageChanged {
                index: reveal.message_index,
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fast_config() -> WizardConfig {
        WizardConfig {
            progress_tick: Duration::from_millis(10),
            progress_step: 20,
            message_tick: Duration::from_millis(25),
            ..WizardConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn progress_reaches_100_and_flips_phase() {
        let state = Arc::new(RwLock::new(RevealState::default()));
        let (tx, mut rx) = broadcast::channel(64);
        let handle = spawn_progress_task(Arc::clone(&state), fast_config(), tx);

        handle.await.unwrap();
        let reveal = state.read().await;
        assert_eq!(reveal.progress, 100);
        assert_eq!(reveal.phase, RevealPhase::Reveal);

        // 5 progress events then the celebration, exactly once.
        let mut progress_events = 0;
        let mut ready_events = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                WizardEvent::RevealProgress { .. } => progress_events += 1,
                WizardEvent::RevealReady => ready_events += 1,
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert_eq!(progress_events, 5);
        assert_eq!(ready_events, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn messages_rotate_and_wrap_independently() {
        let state = Arc::new(RwLock::new(RevealState::default()));
        let (tx, mut rx) = broadcast::channel(64);
        let _messages = spawn_message_task(Arc::clone(&state), fast_config(), tx.clone());

        tokio::time::sleep(Duration::from_millis(25 * 7 + 1)).await;
        {
            // 7 ticks: index walked 1,2,3,4,5,0,1.
            let reveal = state.read().await;
            assert_eq!(reveal.message_index, 1);
        }

        // Ending the loading phase stops the rotation.
        state.write().await.phase = RevealPhase::Reveal;
        tokio::time::sleep(Duration::from_millis(100)).await;
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn sample_conversation_keys_off_intent() {
        let booking = sample_messages("Schedule meetings for the team");
        assert!(booking[0].content.contains("schedule a consultation"));

        let support = sample_messages("handle customer complaints");
        assert!(support[0].content.contains("order #12345"));

        let generic = sample_messages("something else entirely");
        assert!(generic[0].content.contains("question about your services"));
    }
}
