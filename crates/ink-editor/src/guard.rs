//! Unsaved-changes confirmation before destructive document actions.

use ink_core::EditorResult;

use crate::state::DocumentState;

pub const PROMPT_TITLE: &str = "Unsaved Changes";
pub const PROMPT_MESSAGE: &str = "There are unsaved changes. What would you like to do?";

/// Actions that would discard the current document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardAction {
    Close,
    Reload,
    NewDocument,
}

impl GuardAction {
    pub fn discard_label(self) -> &'static str {
        match self {
            Self::Close => "Quit without Saving",
            Self::Reload => "Reload without Saving",
            Self::NewDocument => "New without Saving",
        }
    }
}

/// What the host dialog shows. Button order is Save, discard, Cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub title: &'static str,
    pub message: &'static str,
    pub buttons: [&'static str; 3],
    pub default_button: usize,
    pub cancel_button: usize,
}

impl PromptRequest {
    pub fn for_action(action: GuardAction) -> Self {
        Self {
            title: PROMPT_TITLE,
            message: PROMPT_MESSAGE,
            buttons: ["Save", action.discard_label(), "Cancel"],
            default_button: 0,
            cancel_button: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    Save,
    Discard,
    Cancel,
}

/// Host-provided confirmation dialog.
pub trait UnsavedPrompt {
    fn ask(&mut self, request: &PromptRequest) -> EditorResult<PromptChoice>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Proceed,
    /// Save first; carry on with the action only if the save succeeds.
    SaveThenProceed,
    Stay,
}

#[derive(Debug, Default)]
pub struct UnsavedChangesGuard;

impl UnsavedChangesGuard {
    /// Clean documents proceed without asking. A dialog that fails to show
    /// lets the action proceed.
    pub fn check(
        &self,
        action: GuardAction,
        state: &DocumentState,
        prompt: &mut dyn UnsavedPrompt,
    ) -> GuardOutcome {
        if !state.is_dirty() {
            return GuardOutcome::Proceed;
        }

        match prompt.ask(&PromptRequest::for_action(action)) {
            Ok(PromptChoice::Save) => GuardOutcome::SaveThenProceed,
            Ok(PromptChoice::Discard) => GuardOutcome::Proceed,
            Ok(PromptChoice::Cancel) => GuardOutcome::Stay,
            Err(error) => {
                tracing::warn!(%error, ?action, "unsaved-changes prompt failed; proceeding");
                GuardOutcome::Proceed
            }
        }
    }
}
