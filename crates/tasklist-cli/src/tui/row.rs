//! Row presenter: one task, plus the row's edit-mode state machine.
//!
//! A row is either viewing or editing. While editing, the title cell is
//! writable and owns the terminal cursor; the delete affordance is disabled.
//! Toggling done is allowed in both modes.

use super::input::{LineBuffer, LineEdit};
use crate::intent::Intent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Row},
};
use tasklist_core::{Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowMode {
    #[default]
    Viewing,
    Editing,
}

/// Transient per-row UI state. Never stored on the task itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowState {
    id: TaskId,
    mode: RowMode,
    draft: LineBuffer,
}

impl RowState {
    pub fn new(task: &Task) -> Self {
        Self {
            id: task.id,
            mode: RowMode::Viewing,
            draft: LineBuffer::new(task.title.as_str()),
        }
    }

    pub const fn id(&self) -> TaskId {
        self.id
    }

    #[cfg(test)]
    pub const fn mode(&self) -> RowMode {
        self.mode
    }

    pub const fn is_editing(&self) -> bool {
        matches!(self.mode, RowMode::Editing)
    }

    /// The title field accepts input only while editing.
    pub const fn is_title_writable(&self) -> bool {
        self.is_editing()
    }

    /// Whether the title field holds input focus (the terminal cursor).
    pub const fn has_focus(&self) -> bool {
        self.is_editing()
    }

    pub const fn can_delete(&self) -> bool {
        !self.is_editing()
    }

    pub fn draft(&self) -> &str {
        self.draft.value()
    }

    /// Draft text left of the cursor.
    pub fn draft_before_cursor(&self) -> &str {
        self.draft.before_cursor()
    }

    /// Viewing -> Editing. The draft starts from the current title.
    pub fn start_edit(&mut self, task: &Task) {
        if self.is_editing() {
            return;
        }
        self.draft.set(&task.title);
        self.mode = RowMode::Editing;
    }

    /// Editing -> Viewing, discarding the draft.
    pub fn cancel_edit(&mut self, task: &Task) {
        self.reset(task);
    }

    /// Editing -> Viewing after the rename has been applied.
    pub fn finish_edit(&mut self, task: &Task) {
        self.reset(task);
    }

    /// Replace the draft wholesale. Ignored unless editing.
    pub fn set_draft(&mut self, text: &str) {
        if self.is_title_writable() {
            self.draft.set(text);
        }
    }

    /// Keep a viewing row's displayed title in step with the task.
    pub fn sync_title(&mut self, task: &Task) {
        if !self.is_editing() && self.draft.value() != task.title {
            self.draft.set(&task.title);
        }
    }

    /// Intent to submit the title field. `None` unless editing.
    pub fn commit(&self) -> Option<Intent> {
        self.is_editing()
            .then(|| Intent::CommitEdit(self.id, Some(self.draft.value().to_string())))
    }

    pub fn toggle(&self) -> Intent {
        Intent::Toggle(self.id)
    }

    /// Intent to delete the task. `None` while editing.
    pub fn request_delete(&self) -> Option<Intent> {
        if self.can_delete() {
            Some(Intent::Remove(self.id))
        } else {
            None
        }
    }

    /// Feed a key to an editing row.
    ///
    /// Enter commits, Esc cancels, Ctrl-T toggles done, everything else edits
    /// the draft.
    pub fn handle_edit_key(&mut self, key: KeyEvent) -> Option<Intent> {
        if !self.is_editing() {
            return None;
        }
        if key.code == KeyCode::Char('t') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(self.toggle());
        }
        match self.draft.handle_key(key) {
            LineEdit::Submit => self.commit(),
            LineEdit::Cancel => Some(Intent::CancelEdit(self.id)),
            LineEdit::Changed | LineEdit::Ignored => None,
        }
    }

    fn reset(&mut self, task: &Task) {
        self.mode = RowMode::Viewing;
        self.draft.set(&task.title);
    }

    /// Build the table row: marker, title field, edit/cancel, delete.
    pub fn render(&self, task: &Task) -> Row<'static> {
        let marker = if task.done {
            Span::styled(
                "[✓]",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("[ ]", Style::default().fg(Color::Gray))
        };

        let title_style = if self.is_editing() {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::UNDERLINED)
        } else if task.done {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default().fg(Color::Gray)
        };
        let title = Span::styled(self.draft.value().to_string(), title_style);

        let edit = if self.is_editing() {
            Span::styled("cancel", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("edit", Style::default().fg(Color::Cyan))
        };

        let delete_style = if self.can_delete() {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM)
        };
        let delete = Span::styled("del", delete_style);

        Row::new(vec![
            Cell::from(Line::from(marker)),
            Cell::from(Line::from(title)),
            Cell::from(Line::from(edit)),
            Cell::from(Line::from(delete)),
        ])
    }
}
