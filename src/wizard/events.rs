//! Wizard events broadcast to interested clients.

use serde::{Deserialize, Serialize};

use crate::wizard::model::FieldError;
use crate::wizard::state::WizardStep;
use crate::wizard::verify::{Channel, VerifyPhase};

/// Event fanned out on every observable wizard change.
///
/// A rendering client can drive its whole UI from this stream plus an
/// initial snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    /// The current step changed.
    StepChanged { step: WizardStep },
    /// A channel's verification phase changed.
    VerifyPhaseChanged { channel: Channel, phase: VerifyPhase },
    /// The last action produced field errors (possibly empty, clearing
    /// earlier ones).
    FieldErrors { errors: Vec<FieldError> },
    /// The account step was submitted successfully.
    Completed { elapsed: String },
    /// Reveal loading progress advanced.
    RevealProgress { percent: u8 },
    /// The rotating loading message moved on.
    RevealMessageChanged { index: usize },
    /// Loading finished — fire the one-time celebration and show the agent.
    RevealReady,
    /// An integration finished its simulated connection.
    IntegrationConnected { name: String },
}
