//! Verification state machine data — one instance per contact channel.

use serde::{Deserialize, Serialize};

use crate::error::WizardError;

/// Number of cells in a verification code.
pub const CODE_LEN: usize = 6;

/// A contact channel that can be verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Phone,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Phone => write!(f, "phone"),
        }
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            other => Err(format!("unknown channel: {other}")),
        }
    }
}

/// The phases of a channel's verification.
///
/// `Idle → Sending → CodeSent → Verifying → Verified`, with
/// `Verified → Idle` when the underlying contact value is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyPhase {
    Idle,
    Sending,
    CodeSent,
    Verifying,
    Verified,
}

impl Default for VerifyPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl VerifyPhase {
    /// Whether a (re)send may be requested in this phase. The initial send
    /// only happens from `Idle`; the resend link is offered while a code is
    /// outstanding.
    pub fn can_send(&self) -> bool {
        matches!(self, Self::Idle | Self::CodeSent | Self::Verifying)
    }

    /// Whether code cells are editable in this phase.
    pub fn accepts_digits(&self) -> bool {
        matches!(self, Self::CodeSent | Self::Verifying)
    }
}

impl std::fmt::Display for VerifyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Sending => "sending",
            Self::CodeSent => "code-sent",
            Self::Verifying => "verifying",
            Self::Verified => "verified",
        };
        write!(f, "{s}")
    }
}

/// The six code cells plus the focused cell index.
///
/// Each cell holds a single digit or nothing. Focus movement mirrors the
/// input widgets: entering a digit advances, backspace over an empty cell
/// retreats, paste lands after the last filled cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub cells: [Option<char>; CODE_LEN],
    pub focus: usize,
}

impl CodeEntry {
    /// Clear all cells and put focus on the first one.
    pub fn clear(&mut self) {
        self.cells = [None; CODE_LEN];
        self.focus = 0;
    }

    /// Set one cell to a digit, or clear it with `None`.
    ///
    /// Non-digit characters are rejected without touching state. Entering a
    /// digit advances focus to the next cell.
    pub fn set_cell(&mut self, index: usize, value: Option<char>) -> Result<(), WizardError> {
        if index >= CODE_LEN {
            return Err(WizardError::CellOutOfRange { index });
        }
        if let Some(c) = value {
            if !c.is_ascii_digit() {
                return Ok(());
            }
            self.cells[index] = Some(c);
            if index < CODE_LEN - 1 {
                self.focus = index + 1;
            } else {
                self.focus = index;
            }
        } else {
            self.cells[index] = None;
            self.focus = index;
        }
        Ok(())
    }

    /// Handle a backspace key in the given cell. A backspace over a filled
    /// cell clears it; over an empty cell it moves focus to the previous one.
    pub fn backspace(&mut self, index: usize) -> Result<(), WizardError> {
        if index >= CODE_LEN {
            return Err(WizardError::CellOutOfRange { index });
        }
        if self.cells[index].is_some() {
            self.cells[index] = None;
            self.focus = index;
        } else if index > 0 {
            self.focus = index - 1;
        }
        Ok(())
    }

    /// Bulk paste: strip non-digits, truncate to 6, distribute left-to-right
    /// (clearing any trailing cells), focus after the last filled cell.
    ///
    /// A paste with no digits at all is a no-op.
    pub fn paste(&mut self, text: &str) {
        let digits: Vec<char> = text.chars().filter(char::is_ascii_digit).take(CODE_LEN).collect();
        if digits.is_empty() {
            return;
        }
        for i in 0..CODE_LEN {
            self.cells[i] = digits.get(i).copied();
        }
        self.focus = digits.len().min(CODE_LEN - 1);
    }

    /// Whether all six cells are filled.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Concatenation of the filled cells.
    pub fn digits(&self) -> String {
        self.cells.iter().flatten().collect()
    }
}

/// Full verification state for one channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationState {
    pub phase: VerifyPhase,
    pub code: CodeEntry,
}

impl VerificationState {
    /// Reset to `Idle` with the code cleared. Applied when the underlying
    /// contact value changes after verification.
    pub fn reset(&mut self) {
        self.phase = VerifyPhase::Idle;
        self.code.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_serde_matches_wire_strings() {
        assert_eq!(serde_json::to_string(&VerifyPhase::CodeSent).unwrap(), "\"code-sent\"");
        assert_eq!(serde_json::to_string(&VerifyPhase::Idle).unwrap(), "\"idle\"");
        let parsed: VerifyPhase = serde_json::from_str("\"verifying\"").unwrap();
        assert_eq!(parsed, VerifyPhase::Verifying);
    }

    #[test]
    fn send_availability_per_phase() {
        assert!(VerifyPhase::Idle.can_send());
        assert!(VerifyPhase::CodeSent.can_send());
        assert!(VerifyPhase::Verifying.can_send());
        assert!(!VerifyPhase::Sending.can_send());
        assert!(!VerifyPhase::Verified.can_send());
    }

    #[test]
    fn digit_entry_advances_focus() {
        let mut code = CodeEntry::default();
        code.set_cell(0, Some('4')).unwrap();
        assert_eq!(code.focus, 1);
        code.set_cell(1, Some('2')).unwrap();
        assert_eq!(code.focus, 2);
        assert_eq!(code.digits(), "42");
        assert!(!code.is_complete());
    }

    #[test]
    fn last_cell_keeps_focus() {
        let mut code = CodeEntry::default();
        for i in 0..CODE_LEN {
            code.set_cell(i, Some('7')).unwrap();
        }
        assert_eq!(code.focus, 5);
        assert!(code.is_complete());
        assert_eq!(code.digits(), "777777");
    }

    #[test]
    fn non_digit_is_ignored() {
        let mut code = CodeEntry::default();
        code.set_cell(0, Some('x')).unwrap();
        assert_eq!(code.cells[0], None);
        assert_eq!(code.focus, 0);
    }

    #[test]
    fn backspace_clears_or_retreats() {
        let mut code = CodeEntry::default();
        code.set_cell(0, Some('1')).unwrap();
        code.set_cell(1, Some('2')).unwrap();

        // Filled cell: clears in place.
        code.backspace(1).unwrap();
        assert_eq!(code.cells[1], None);
        assert_eq!(code.focus, 1);

        // Empty cell: focus moves back.
        code.backspace(1).unwrap();
        assert_eq!(code.focus, 0);

        // Empty first cell: nowhere to go.
        code.backspace(0).unwrap();
        assert_eq!(code.focus, 0);
    }

    #[test]
    fn cell_index_out_of_range() {
        let mut code = CodeEntry::default();
        assert!(code.set_cell(6, Some('1')).is_err());
        assert!(code.backspace(9).is_err());
    }

    #[test]
    fn paste_distributes_and_truncates() {
        let mut code = CodeEntry::default();
        code.paste("code: 12-34-56-78");
        assert_eq!(code.digits(), "123456");
        assert!(code.is_complete());
        assert_eq!(code.focus, 5);
    }

    #[test]
    fn partial_paste_clears_tail_and_focuses_next() {
        let mut code = CodeEntry::default();
        for i in 0..CODE_LEN {
            code.set_cell(i, Some('9')).unwrap();
        }
        code.paste("12 3");
        assert_eq!(code.digits(), "123");
        assert_eq!(code.cells[3], None);
        assert_eq!(code.focus, 3);
    }

    #[test]
    fn digitless_paste_is_a_noop() {
        let mut code = CodeEntry::default();
        code.set_cell(0, Some('5')).unwrap();
        code.paste("hello!");
        assert_eq!(code.digits(), "5");
        assert_eq!(code.focus, 1);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut state = VerificationState {
            phase: VerifyPhase::Verified,
            ..Default::default()
        };
        state.code.paste("123456");
        state.reset();
        assert_eq!(state.phase, VerifyPhase::Idle);
        assert_eq!(state.code.digits(), "");
        assert_eq!(state.code.focus, 0);
    }

    #[test]
    fn channel_parse_and_display() {
        assert_eq!("email".parse::<Channel>().unwrap(), Channel::Email);
        assert_eq!("phone".parse::<Channel>().unwrap(), Channel::Phone);
        assert!("fax".parse::<Channel>().is_err());
        assert_eq!(Channel::Email.to_string(), "email");
    }
}
