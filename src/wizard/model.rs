//! Account form data, field errors, and small derived values shared across
//! the wizard.

use serde::{Deserialize, Serialize};

/// The fixed integration catalog offered on the tools step.
pub const INTEGRATIONS: [&str; 11] = [
    "Gmail",
    "Google Calendar",
    "Google Sheets",
    "Google Contacts",
    "Salesforce",
    "Slack",
    "Outlook",
    "MS Calendar",
    "Excel",
    "MS Contacts",
    "Teams",
];

/// Check whether `name` is in the integration catalog.
pub fn is_known_integration(name: &str) -> bool {
    INTEGRATIONS.contains(&name)
}

/// Account form data collected on the account step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDraft {
    pub full_name: String,
    pub email: String,
    pub company_website: String,
    pub send_sms: bool,
    pub phone: String,
}

/// A field-scoped validation error, displayed inline next to the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field key, e.g. "email" or "phone_verify".
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Derive a display company name from the account's website field.
///
/// Fails soft: prefixes `https://` when no scheme is present, parses the
/// result as a URL, strips a leading `www.`, and returns the host. Empty
/// input or any parse failure yields an empty string — no error ever reaches
/// the caller.
pub fn derive_company_name(website: &str) -> String {
    let trimmed = website.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let normalized = if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    match url::Url::parse(&normalized) {
        Ok(parsed) => parsed
            .host_str()
            .map(|host| host.strip_prefix("www.").unwrap_or(host).to_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// Display name for the generated agent.
pub fn agent_display_name(company_name: &str) -> String {
    if company_name.is_empty() {
        "Your AI Agent".to_string()
    } else {
        format!("{company_name} AI Agent")
    }
}

/// Format elapsed seconds as `M:SS`.
pub fn format_elapsed(seconds: u64) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    format!("{mins}:{secs:02}")
}

/// Completion-time percentile shown next to the final timer.
pub fn completion_percentile(seconds: u64) -> u8 {
    match seconds {
        0..=120 => 99,
        121..=150 => 95,
        151..=180 => 90,
        181..=210 => 80,
        211..=240 => 70,
        241..=300 => 50,
        _ => 30,
    }
}
