//! Decision callbacks the engine asks of whoever drives it.
//!
//! Branching and the controller never talk to a terminal or a dialog
//! directly; they ask a [`Prompter`], so the same flows run unattended in
//! tests or in a one-shot command.

/// Synchronous user decisions.
pub trait Prompter: Send + Sync {
    /// Asks for a topic title. `None` means the user cancelled.
    fn request_title(&self) -> Option<String>;

    /// Asks whether a suggested branch should be created.
    fn confirm_branch(&self, suggested_title: &str) -> bool;

    /// Asks for a new name for a freshly created session.
    fn request_session_name(&self, current_name: &str) -> Option<String>;
}

/// A prompter that never asks: every request is cancelled or declined.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unattended;

impl Prompter for Unattended {
    fn request_title(&self) -> Option<String> {
        None
    }

    fn confirm_branch(&self, _suggested_title: &str) -> bool {
        false
    }

    fn request_session_name(&self, _current_name: &str) -> Option<String> {
        None
    }
}
