//! Configuration types.

use std::time::Duration;

/// Wizard service configuration.
///
/// All the "backend" work in this service is simulated with fixed delays;
/// the delays live here so tests can shrink them and a future real backend
/// can drop them entirely.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Service name for identification.
    pub name: String,
    /// Simulated delay between requesting a verification code and it being
    /// "sent" to the contact address.
    pub send_code_delay: Duration,
    /// Simulated delay for checking a fully entered 6-digit code.
    pub check_code_delay: Duration,
    /// Reveal sequence: interval between progress ticks.
    pub progress_tick: Duration,
    /// Reveal sequence: percent added per progress tick.
    pub progress_step: u8,
    /// Reveal sequence: interval between rotating status messages.
    pub message_tick: Duration,
    /// Simulated delay for the authorization step when connecting an
    /// integration after the reveal.
    pub connect_delay: Duration,
    /// Simulated pause on the success screen before a connected integration
    /// is committed.
    pub connect_confirm_delay: Duration,
    /// Session idle timeout (sessions are pruned after this duration).
    pub session_idle_timeout: Duration,
    /// Interval for the session pruning sweep.
    pub prune_interval: Duration,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            name: "agent-launch".to_string(),
            send_code_delay: Duration::from_millis(1500),
            check_code_delay: Duration::from_millis(1200),
            progress_tick: Duration::from_millis(80),
            progress_step: 2,
            message_tick: Duration::from_millis(800),
            connect_delay: Duration::from_millis(1500),
            connect_confirm_delay: Duration::from_millis(800),
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            prune_interval: Duration::from_secs(60),
        }
    }
}
