//! Onboarding wizard core.
//!
//! Five linear steps — intent, tools, context questions, account, reveal —
//! driven by a per-session [`manager::WizardManager`]. Each step's client
//! renders a slice of the snapshot and proposes changes through manager
//! calls; the manager commits them and broadcasts the result. All backend
//! work (code delivery, code checks, agent generation) is simulated with
//! fixed timers behind the [`verifier::CodeVerifier`] seam.

pub mod events;
pub mod manager;
pub mod model;
pub mod questions;
pub mod reveal;
pub mod state;
pub mod validate;
pub mod verifier;
pub mod verify;

pub use events::WizardEvent;
pub use manager::{WizardManager, WizardSnapshot};
pub use model::{AccountDraft, FieldError, derive_company_name};
pub use questions::{Question, get_questions};
pub use state::{WizardState, WizardStep};
pub use verifier::{CodeVerifier, SimulatedVerifier};
pub use verify::{Channel, CodeEntry, VerificationState, VerifyPhase};
