//! Error types for Agent Launch.

use uuid::Uuid;

use crate::wizard::state::WizardStep;
use crate::wizard::verify::Channel;

/// Top-level error type for the wizard service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Verification error: {0}")]
    Verify(#[from] VerifyError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Session registry errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session {id} not found (expired or never created)")]
    NotFound { id: Uuid },
}

/// Wizard state machine errors.
///
/// Note: user input problems (bad email, empty name, unverified channel) are
/// NOT errors — they become field-scoped [`FieldError`] values on the wizard
/// state. This enum only covers contract violations by the caller.
///
/// [`FieldError`]: crate::wizard::model::FieldError
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Cannot move from step {from} to step {to}")]
    InvalidTransition { from: WizardStep, to: WizardStep },

    #[error("Operation requires step {required}, but wizard is at {actual}")]
    WrongStep {
        required: WizardStep,
        actual: WizardStep,
    },

    #[error("Code cell index {index} out of range (0..6)")]
    CellOutOfRange { index: usize },

    #[error("Unknown integration: {name}")]
    UnknownIntegration { name: String },
}

/// Verification backend errors.
///
/// The simulated backend never fails, but the [`CodeVerifier`] seam keeps
/// room for a real service that can.
///
/// [`CodeVerifier`]: crate::wizard::verifier::CodeVerifier
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("Send failed on channel {channel}: {reason}")]
    SendFailed { channel: Channel, reason: String },

    #[error("Check failed on channel {channel}: {reason}")]
    CheckFailed { channel: Channel, reason: String },
}

/// Result type alias for the wizard service.
pub type Result<T> = std::result::Result<T, Error>;
