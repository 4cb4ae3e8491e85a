//! Verification backend seam.
//!
//! The wizard never talks to a real delivery service; the [`CodeVerifier`]
//! trait isolates "send a code" and "check a code" so the fixed-delay
//! simulation can later be swapped for a real backend without touching the
//! state machine's transition logic.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::WizardConfig;
use crate::error::VerifyError;
use crate::wizard::verify::Channel;

/// Backend that delivers and checks verification codes.
#[async_trait]
pub trait CodeVerifier: Send + Sync {
    /// Deliver a code to `destination` on `channel`. Resolves when the code
    /// is considered sent.
    async fn send_code(&self, channel: Channel, destination: &str) -> Result<(), VerifyError>;

    /// Check an entered code. Resolves with whether the code is accepted.
    async fn check_code(&self, channel: Channel, code: &str) -> Result<bool, VerifyError>;
}

/// Fixed-delay simulation of a verification backend.
///
/// Sending always succeeds after the send delay; any 6-digit code is
/// accepted after the check delay. There is no wrong-code outcome — there is
/// no real backend to be wrong against.
pub struct SimulatedVerifier {
    send_delay: Duration,
    check_delay: Duration,
}

impl SimulatedVerifier {
    pub fn new(config: &WizardConfig) -> Self {
        Self {
            send_delay: config.send_code_delay,
            check_delay: config.check_code_delay,
        }
    }
}

#[async_trait]
impl CodeVerifier for SimulatedVerifier {
    async fn send_code(&self, channel: Channel, destination: &str) -> Result<(), VerifyError> {
        tracing::debug!(%channel, destination, "simulating code send");
        tokio::time::sleep(self.send_delay).await;
        Ok(())
    }

    async fn check_code(&self, channel: Channel, code: &str) -> Result<bool, VerifyError> {
        tracing::debug!(%channel, code_len = code.len(), "simulating code check");
        tokio::time::sleep(self.check_delay).await;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn simulated_send_resolves_after_delay() {
        let verifier = SimulatedVerifier::new(&WizardConfig::default());
        let start = tokio::time::Instant::now();
        verifier.send_code(Channel::Email, "a@b.co").await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_check_always_accepts() {
        let verifier = SimulatedVerifier::new(&WizardConfig::default());
        let accepted = verifier.check_code(Channel::Phone, "000000").await.unwrap();
        assert!(accepted);
    }
}
