//! User intents flowing from the presenters up to the page controller.

use tasklist_core::TaskId;

/// One discrete user interaction.
///
/// Presenters never touch the store; they produce an `Intent` and the page
/// controller ([`crate::tui::app::App`]) applies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Submit the new-task input.
    Add(String),
    Toggle(TaskId),
    Remove(TaskId),
    StartEdit(TaskId),
    CancelEdit(TaskId),
    /// Replace the in-progress draft of an editing row.
    SetDraft(TaskId, String),
    /// Submit the title field of an editing row. `None` commits whatever the
    /// row's draft holds.
    CommitEdit(TaskId, Option<String>),
}

impl Intent {
    /// Intents that only touch per-row transient state.
    #[must_use]
    pub const fn is_row_local(&self) -> bool {
        matches!(
            self,
            Self::StartEdit(_) | Self::CancelEdit(_) | Self::SetDraft(..)
        )
    }
}
