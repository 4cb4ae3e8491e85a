//! WizardManager — owns one session's wizard state and sequences every
//! transition: steps, verification timers, and the reveal sequence.
//!
//! Step clients never mutate state directly; they propose changes through
//! the manager's methods and observe the committed result via snapshots and
//! the event stream.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::WizardConfig;
use crate::error::{Result, WizardError};
use crate::wizard::events::WizardEvent;
use crate::wizard::model::{
    AccountDraft, FieldError, agent_display_name, derive_company_name, is_known_integration,
};
use crate::wizard::questions::{Question, get_questions};
use crate::wizard::reveal::{
    AGENT_PHONE_NUMBER, RevealState, SampleMessage, sample_messages, spawn_message_task,
    spawn_progress_task,
};
use crate::wizard::state::{WizardState, WizardStep};
use crate::wizard::validate::{is_valid_email, is_valid_phone, validate_account};
use crate::wizard::verifier::CodeVerifier;
use crate::wizard::verify::{Channel, VerificationState, VerifyPhase};

/// Broadcast channel capacity for wizard events.
const EVENT_CAPACITY: usize = 256;

/// Full serializable view of a session, rendered by the client as-is.
#[derive(Debug, Clone, Serialize)]
pub struct WizardSnapshot {
    pub state: WizardState,
    pub email_verify: VerificationState,
    pub phone_verify: VerificationState,
    pub field_errors: Vec<FieldError>,
    pub questions: Vec<Question>,
    pub company_name: String,
    pub agent_name: String,
    pub agent_phone: String,
    pub sample_conversation: Vec<SampleMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal: Option<RevealState>,
}

/// Background tasks owned by the session. All of them are aborted when the
/// session is torn down so no timer fires into a dead session.
#[derive(Default)]
struct Tasks {
    email_verify: Option<JoinHandle<()>>,
    phone_verify: Option<JoinHandle<()>>,
    reveal: Vec<JoinHandle<()>>,
    connects: Vec<JoinHandle<()>>,
}

impl Tasks {
    fn verify_slot(&mut self, channel: Channel) -> &mut Option<JoinHandle<()>> {
        match channel {
            Channel::Email => &mut self.email_verify,
            Channel::Phone => &mut self.phone_verify,
        }
    }

    fn abort_all(&mut self) {
        for handle in self
            .email_verify
            .take()
            .into_iter()
            .chain(self.phone_verify.take())
            .chain(self.reveal.drain(..))
            .chain(self.connects.drain(..))
        {
            handle.abort();
        }
    }
}

/// Orchestrator for one onboarding session.
pub struct WizardManager {
    config: WizardConfig,
    verifier: Arc<dyn CodeVerifier>,
    state: Arc<RwLock<WizardState>>,
    email: Arc<RwLock<VerificationState>>,
    phone: Arc<RwLock<VerificationState>>,
    field_errors: Arc<RwLock<Vec<FieldError>>>,
    reveal: Arc<RwLock<RevealState>>,
    events: broadcast::Sender<WizardEvent>,
    tasks: std::sync::Mutex<Tasks>,
}

impl WizardManager {
    pub fn new(config: WizardConfig, verifier: Arc<dyn CodeVerifier>) -> Arc<Self> {
        let (events, _rx) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            config,
            verifier,
            state: Arc::new(RwLock::new(WizardState::default())),
            email: Arc::new(RwLock::new(VerificationState::default())),
            phone: Arc::new(RwLock::new(VerificationState::default())),
            field_errors: Arc::new(RwLock::new(Vec::new())),
            reveal: Arc::new(RwLock::new(RevealState::default())),
            events,
            tasks: std::sync::Mutex::new(Tasks::default()),
        })
    }

    /// Subscribe to the session's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: WizardEvent) {
        // Ok if nobody is listening.
        let _ = self.events.send(event);
    }

    fn channel_state(&self, channel: Channel) -> &Arc<RwLock<VerificationState>> {
        match channel {
            Channel::Email => &self.email,
            Channel::Phone => &self.phone,
        }
    }

    /// Full view of the session.
    pub async fn snapshot(&self) -> WizardSnapshot {
        let state = self.state.read().await.clone();
        let company_name = derive_company_name(&state.account.company_website);
        let reveal = if state.is_complete {
            Some(self.reveal.read().await.clone())
        } else {
            None
        };
        WizardSnapshot {
            email_verify: self.email.read().await.clone(),
            phone_verify: self.phone.read().await.clone(),
            field_errors: self.field_errors.read().await.clone(),
            questions: get_questions(&state.intent, &state.selected_tools),
            agent_name: agent_display_name(&company_name),
            agent_phone: AGENT_PHONE_NUMBER.to_string(),
            sample_conversation: sample_messages(&state.intent),
            company_name,
            reveal,
            state,
        }
    }

    // ── Step transitions ────────────────────────────────────────────────

    /// Submit the intent text (step 1). Blank text keeps the wizard on the
    /// intent step.
    pub async fn submit_intent(&self, text: &str) {
        let mut state = self.state.write().await;
        let before = state.step;
        state.submit_intent(text, chrono::Utc::now().timestamp());
        if state.step != before {
            self.emit(WizardEvent::StepChanged { step: state.step });
        }
    }

    /// Move to a neighboring step.
    pub async fn goto(&self, target: WizardStep) -> Result<()> {
        let mut state = self.state.write().await;
        state.goto(target).map_err(crate::error::Error::from)?;
        self.emit(WizardEvent::StepChanged { step: state.step });
        Ok(())
    }

    // ── Collected answers ───────────────────────────────────────────────

    /// Replace the tool selection (step 2).
    pub async fn set_tools(&self, tools: Vec<String>) {
        self.state.write().await.set_tools(tools);
    }

    /// Toggle one tool in or out of the selection (step 2 card click).
    pub async fn toggle_tool(&self, name: &str) {
        self.state.write().await.toggle_tool(name);
    }

    /// Add a catalog tool from the reveal screen's "add more" list.
    pub async fn add_tool(&self, name: &str) -> Result<()> {
        if !is_known_integration(name) {
            return Err(WizardError::UnknownIntegration {
                name: name.to_string(),
            }
            .into());
        }
        let mut state = self.state.write().await;
        if !state.selected_tools.iter().any(|t| t == name) {
            state.selected_tools.push(name.to_string());
        }
        Ok(())
    }

    /// Record a context question answer (step 3).
    pub async fn set_answer(&self, question_id: &str, value: &str) {
        self.state.write().await.set_answer(question_id, value);
    }

    /// Apply an account form edit (step 4).
    ///
    /// Editing a verified contact value resets that channel's verification
    /// to idle with its code cleared — only the edited channel is affected.
    pub async fn update_account(&self, draft: AccountDraft) {
        let (email_changed, phone_changed) = {
            let mut state = self.state.write().await;
            let email_changed = state.account.email != draft.email;
            let phone_changed = state.account.phone != draft.phone;
            state.account = draft;
            (email_changed, phone_changed)
        };
        if email_changed {
            self.reset_if_verified(Channel::Email).await;
        }
        if phone_changed {
            self.reset_if_verified(Channel::Phone).await;
        }
    }

    async fn reset_if_verified(&self, channel: Channel) {
        let mut verify = self.channel_state(channel).write().await;
        if verify.phase == VerifyPhase::Verified {
            verify.reset();
            self.emit(WizardEvent::VerifyPhaseChanged {
                channel,
                phase: verify.phase,
            });
        }
    }

    // ── Verification ────────────────────────────────────────────────────

    /// Request (or re-request) a verification code for a channel.
    ///
    /// Format-invalid contact values record a field error and leave the
    /// channel idle. A valid request enters `Sending`; when the simulated
    /// send resolves the channel reaches `CodeSent` with a cleared code and
    /// focus on the first cell. A resend restarts the send timer.
    pub async fn send_code(&self, channel: Channel) {
        let destination = {
            let state = self.state.read().await;
            match channel {
                Channel::Email => state.account.email.clone(),
                Channel::Phone => state.account.phone.clone(),
            }
        };

        let (field, error_message, valid) = match channel {
            Channel::Email => ("email", "Enter a valid email address", is_valid_email(&destination)),
            Channel::Phone => ("phone", "Enter a valid phone number", is_valid_phone(&destination)),
        };

        if !valid {
            let mut errors = self.field_errors.write().await;
            errors.retain(|e| e.field != field);
            errors.push(FieldError::new(field, error_message));
            self.emit(WizardEvent::FieldErrors {
                errors: errors.clone(),
            });
            return;
        }

        {
            let mut verify = self.channel_state(channel).write().await;
            if !verify.phase.can_send() {
                debug!(%channel, phase = %verify.phase, "send_code ignored");
                return;
            }
            verify.phase = VerifyPhase::Sending;
            self.emit(WizardEvent::VerifyPhaseChanged {
                channel,
                phase: verify.phase,
            });
        }

        {
            let mut errors = self.field_errors.write().await;
            errors.retain(|e| e.field != field);
        }

        let verifier = Arc::clone(&self.verifier);
        let verify_state = Arc::clone(self.channel_state(channel));
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = verifier.send_code(channel, &destination).await {
                tracing::warn!(%channel, "code send failed: {e}");
                return;
            }
            let mut verify = verify_state.write().await;
            // A concurrent reset or restart wins.
            if verify.phase == VerifyPhase::Sending {
                verify.phase = VerifyPhase::CodeSent;
                verify.code.clear();
                let _ = events.send(WizardEvent::VerifyPhaseChanged {
                    channel,
                    phase: verify.phase,
                });
            }
        });

        let mut tasks = self.tasks.lock().expect("task registry poisoned");
        if let Some(prev) = tasks.verify_slot(channel).replace(handle) {
            prev.abort();
        }
    }

    /// Enter (or clear) a single code cell.
    pub async fn input_digit(
        &self,
        channel: Channel,
        index: usize,
        value: Option<char>,
    ) -> Result<()> {
        {
            let mut verify = self.channel_state(channel).write().await;
            if !verify.phase.accepts_digits() {
                return Ok(());
            }
            verify.code.set_cell(index, value)?;
        }
        self.maybe_begin_check(channel).await;
        Ok(())
    }

    /// Backspace in a code cell.
    pub async fn backspace_digit(&self, channel: Channel, index: usize) -> Result<()> {
        let mut verify = self.channel_state(channel).write().await;
        if !verify.phase.accepts_digits() {
            return Ok(());
        }
        verify.code.backspace(index)?;
        Ok(())
    }

    /// Paste a string into the code cells.
    pub async fn paste_code(&self, channel: Channel, text: &str) {
        {
            let mut verify = self.channel_state(channel).write().await;
            if !verify.phase.accepts_digits() {
                return;
            }
            verify.code.paste(text);
        }
        self.maybe_begin_check(channel).await;
    }

    /// Once all six cells are filled while a code is outstanding, move to
    /// `Verifying` and schedule the simulated check. The simulator never
    /// rejects, so the check resolves to `Verified`.
    async fn maybe_begin_check(&self, channel: Channel) {
        let code = {
            let mut verify = self.channel_state(channel).write().await;
            if verify.phase != VerifyPhase::CodeSent || !verify.code.is_complete() {
                return;
            }
            verify.phase = VerifyPhase::Verifying;
            self.emit(WizardEvent::VerifyPhaseChanged {
                channel,
                phase: verify.phase,
            });
            verify.code.digits()
        };

        let verifier = Arc::clone(&self.verifier);
        let verify_state = Arc::clone(self.channel_state(channel));
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            match verifier.check_code(channel, &code).await {
                Ok(true) => {
                    let mut verify = verify_state.write().await;
                    if verify.phase == VerifyPhase::Verifying {
                        verify.phase = VerifyPhase::Verified;
                        let _ = events.send(WizardEvent::VerifyPhaseChanged {
                            channel,
                            phase: verify.phase,
                        });
                    }
                }
                Ok(false) => {
                    // Unreachable with the simulated backend; a real one
                    // would surface a wrong-code state here.
                    tracing::warn!(%channel, "code rejected");
                }
                Err(e) => tracing::warn!(%channel, "code check failed: {e}"),
            }
        });

        let mut tasks = self.tasks.lock().expect("task registry poisoned");
        if let Some(prev) = tasks.verify_slot(channel).replace(handle) {
            prev.abort();
        }
    }

    // ── Submission & reveal ─────────────────────────────────────────────

    /// Submit the account step.
    ///
    /// Returns the field errors; an empty list means the submission was
    /// accepted, the wizard moved to the reveal step, and the loading
    /// sequence started.
    pub async fn submit_account(&self) -> Result<Vec<FieldError>> {
        let mut state = self.state.write().await;
        if state.step != WizardStep::Account {
            return Err(WizardError::WrongStep {
                required: WizardStep::Account,
                actual: state.step,
            }
            .into());
        }

        let errors = validate_account(
            &state.account,
            self.email.read().await.phase,
            self.phone.read().await.phase,
        );
        *self.field_errors.write().await = errors.clone();
        self.emit(WizardEvent::FieldErrors {
            errors: errors.clone(),
        });
        if !errors.is_empty() {
            return Ok(errors);
        }

        let elapsed = state.complete_account_step(chrono::Utc::now().timestamp());
        self.emit(WizardEvent::Completed {
            elapsed: elapsed.clone(),
        });
        self.emit(WizardEvent::StepChanged { step: state.step });
        drop(state);

        tracing::info!(elapsed, "wizard complete, starting reveal");
        let mut tasks = self.tasks.lock().expect("task registry poisoned");
        tasks.reveal.push(spawn_progress_task(
            Arc::clone(&self.reveal),
            self.config.clone(),
            self.events.clone(),
        ));
        tasks.reveal.push(spawn_message_task(
            Arc::clone(&self.reveal),
            self.config.clone(),
            self.events.clone(),
        ));
        Ok(Vec::new())
    }

    /// Simulate connecting an integration from the reveal screen.
    pub async fn connect_integration(&self, name: &str) -> Result<()> {
        {
            let state = self.state.read().await;
            if !state.is_complete {
                return Err(WizardError::WrongStep {
                    required: WizardStep::Reveal,
                    actual: state.step,
                }
                .into());
            }
        }
        if !is_known_integration(name) {
            return Err(WizardError::UnknownIntegration {
                name: name.to_string(),
            }
            .into());
        }

        let reveal = Arc::clone(&self.reveal);
        let events = self.events.clone();
        let name = name.to_string();
        let auth_delay = self.config.connect_delay;
        let confirm_delay = self.config.connect_confirm_delay;
        let handle = tokio::spawn(async move {
            // Simulated OAuth hop, then the success screen lingers briefly.
            tokio::time::sleep(auth_delay).await;
            tokio::time::sleep(confirm_delay).await;
            let mut reveal = reveal.write().await;
            if !reveal.connected_tools.iter().any(|t| t == &name) {
                reveal.connected_tools.push(name.clone());
                let _ = events.send(WizardEvent::IntegrationConnected { name });
            }
        });
        self.tasks
            .lock()
            .expect("task registry poisoned")
            .connects
            .push(handle);
        Ok(())
    }

    /// Abort every outstanding timer task. Called on session teardown; safe
    /// to call more than once.
    pub fn shutdown(&self) {
        self.tasks.lock().expect("task registry poisoned").abort_all();
    }
}

impl Drop for WizardManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
