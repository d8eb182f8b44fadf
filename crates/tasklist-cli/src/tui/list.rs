//! List presenter: renders the task sequence as one row per task.
//!
//! Row state is keyed by task id, not by position, so removing or inserting
//! tasks never hands one task's edit state to another.

use super::row::RowState;
use crate::intent::Intent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Position, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::Span,
    widgets::{Block, Borders, Row, Table, TableState},
};
use std::collections::HashMap;
use tasklist_core::{Task, TaskId};

const MARKER_WIDTH: u16 = 3;
const EDIT_WIDTH: u16 = 6;
const DELETE_WIDTH: u16 = 3;
const COLUMN_SPACING: u16 = 1;

/// Per-row state and the selection cursor.
#[derive(Debug, Default)]
pub struct ListPresenter {
    rows: HashMap<TaskId, RowState>,
    table_state: TableState,
}

impl ListPresenter {
    pub fn new(tasks: &[Task]) -> Self {
        let mut list = Self::default();
        list.sync(tasks);
        list
    }

    /// Reconcile row state with the current sequence.
    ///
    /// Rows of tasks that are gone are dropped, new tasks get a fresh viewing
    /// row, and the selection is clamped to the new length.
    pub fn sync(&mut self, tasks: &[Task]) {
        self.rows
            .retain(|id, _| tasks.iter().any(|task| task.id == *id));
        for task in tasks {
            self.rows
                .entry(task.id)
                .and_modify(|row| row.sync_title(task))
                .or_insert_with(|| RowState::new(task));
        }

        match (self.table_state.selected(), tasks.len()) {
            (_, 0) => self.table_state.select(None),
            (None, _) => self.table_state.select(Some(0)),
            (Some(idx), len) if idx >= len => self.table_state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn row(&self, id: TaskId) -> Option<&RowState> {
        self.rows.get(&id)
    }

    pub fn row_mut(&mut self, id: TaskId) -> Option<&mut RowState> {
        self.rows.get_mut(&id)
    }

    /// Id of the row currently in edit mode, if any.
    pub fn editing_id(&self) -> Option<TaskId> {
        self.rows
            .values()
            .find(|row| row.is_editing())
            .map(RowState::id)
    }

    #[cfg(test)]
    pub fn selected_index(&self) -> Option<usize> {
        self.table_state.selected()
    }

    pub fn selected_id(&self, tasks: &[Task]) -> Option<TaskId> {
        self.table_state
            .selected()
            .and_then(|idx| tasks.get(idx))
            .map(|task| task.id)
    }

    pub fn select_id(&mut self, id: TaskId, tasks: &[Task]) {
        if let Some(idx) = tasks.iter().position(|task| task.id == id) {
            self.table_state.select(Some(idx));
        }
    }

    fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = self
            .table_state
            .selected()
            .map_or(0, |i| if i + 1 >= len { 0 } else { i + 1 });
        self.table_state.select(Some(i));
    }

    fn select_prev(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = self
            .table_state
            .selected()
            .map_or(0, |i| if i == 0 { len - 1 } else { i - 1 });
        self.table_state.select(Some(i));
    }

    /// Start editing `id`, cancelling any other row that is mid-edit.
    pub fn start_edit(&mut self, task: &Task, tasks: &[Task]) {
        if let Some(other) = self.editing_id().filter(|other| *other != task.id) {
            if let (Some(row), Some(other_task)) = (
                self.rows.get_mut(&other),
                tasks.iter().find(|t| t.id == other),
            ) {
                row.cancel_edit(other_task);
            }
        }
        if let Some(row) = self.rows.get_mut(&task.id) {
            row.start_edit(task);
        }
        self.select_id(task.id, tasks);
    }

    /// Dispatch a key while the list has focus.
    ///
    /// An editing row receives every key first; otherwise keys act on the
    /// selected row.
    pub fn handle_key(&mut self, key: KeyEvent, tasks: &[Task]) -> Option<Intent> {
        if let Some(id) = self.editing_id() {
            return self.rows.get_mut(&id)?.handle_edit_key(key);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next(tasks.len());
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_prev(tasks.len());
                None
            }
            KeyCode::Char(' ' | 'x') => self.selected_row(tasks).map(RowState::toggle),
            KeyCode::Char('t') if ctrl => self.selected_row(tasks).map(RowState::toggle),
            KeyCode::Char('e') | KeyCode::Enter => self
                .selected_id(tasks)
                .map(Intent::StartEdit),
            KeyCode::Char('d') | KeyCode::Delete => {
                self.selected_row(tasks).and_then(RowState::request_delete)
            }
            _ => None,
        }
    }

    fn selected_row(&self, tasks: &[Task]) -> Option<&RowState> {
        self.selected_id(tasks).and_then(|id| self.rows.get(&id))
    }

    /// Render every task in store order and, when a row is editing and the
    /// list is focused, place the terminal cursor in its title cell.
    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect, tasks: &[Task], focused: bool) {
        let rows: Vec<Row<'static>> = tasks
            .iter()
            .map(|task| {
                self.rows
                    .get(&task.id)
                    .map_or_else(|| RowState::new(task).render(task), |row| row.render(task))
            })
            .collect();

        let border_style = if focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let widths = [
            Constraint::Length(MARKER_WIDTH),
            Constraint::Fill(1),
            Constraint::Length(EDIT_WIDTH),
            Constraint::Length(DELETE_WIDTH),
        ];
        let table = Table::new(rows, widths)
            .column_spacing(COLUMN_SPACING)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_set(border::ROUNDED)
                    .border_style(border_style),
            )
            .row_highlight_style(if focused {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            });

        frame.render_stateful_widget(table, area, &mut self.table_state);

        if focused {
            if let Some(position) = self.cursor_position(area, tasks) {
                frame.set_cursor_position(position);
            }
        }
    }

    /// Terminal cursor inside the title cell of the focused row, clipped to
    /// that cell. `None` when no row has focus or it is scrolled out of view.
    fn cursor_position(&self, area: Rect, tasks: &[Task]) -> Option<Position> {
        let (idx, row) = tasks.iter().enumerate().find_map(|(idx, task)| {
            self.rows
                .get(&task.id)
                .filter(|row| row.has_focus())
                .map(|row| (idx, row))
        })?;

        let line = u16::try_from(idx.checked_sub(self.table_state.offset())?).ok()?;
        if line >= area.height.saturating_sub(2) {
            return None;
        }

        let title_width = area
            .width
            .saturating_sub(2)
            .saturating_sub(MARKER_WIDTH + EDIT_WIDTH + DELETE_WIDTH + 3 * COLUMN_SPACING);
        if title_width == 0 {
            return None;
        }
        let column = u16::try_from(Span::raw(row.draft_before_cursor()).width())
            .unwrap_or(u16::MAX)
            .min(title_width - 1);

        Some(Position::new(
            area.x + 1 + MARKER_WIDTH + COLUMN_SPACING + column,
            area.y + 1 + line,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn tasks(titles: &[&str]) -> Vec<Task> {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| Task::new(TaskId(i as u64 + 1), *t))
            .collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn cursor_after_render(list: &mut ListPresenter, ts: &[Task], width: u16) -> Position {
        let backend = TestBackend::new(width, 6);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| list.render(frame, frame.area(), ts, true))
            .expect("draw");
        terminal.get_cursor_position().expect("cursor")
    }

    #[test]
    fn sync_creates_one_row_per_task() {
        let ts = tasks(&["a", "b", "c"]);
        let list = ListPresenter::new(&ts);
        for task in &ts {
            assert!(list.row(task.id).is_some());
        }
        assert_eq!(list.selected_index(), Some(0));
    }

    #[test]
    fn edit_state_follows_id_when_earlier_row_removed() {
        let mut ts = tasks(&["a", "b", "c"]);
        let mut list = ListPresenter::new(&ts);
        let c = ts[2].clone();
        list.start_edit(&c, &ts);
        list.row_mut(c.id).expect("row").set_draft("c-draft");

        ts.remove(0);
        list.sync(&ts);

        assert_eq!(list.editing_id(), Some(TaskId(3)));
        assert_eq!(list.row(TaskId(3)).map(RowState::draft), Some("c-draft"));
        assert!(list.row(TaskId(1)).is_none());
        assert!(!list.row(TaskId(2)).expect("row").is_editing());
    }

    #[test]
    fn selection_clamped_after_removal() {
        let mut ts = tasks(&["a", "b"]);
        let mut list = ListPresenter::new(&ts);
        list.handle_key(key(KeyCode::Down), &ts);
        assert_eq!(list.selected_index(), Some(1));
        ts.pop();
        list.sync(&ts);
        assert_eq!(list.selected_index(), Some(0));
        ts.clear();
        list.sync(&ts);
        assert_eq!(list.selected_index(), None);
    }

    #[test]
    fn navigation_wraps() {
        let ts = tasks(&["a", "b", "c"]);
        let mut list = ListPresenter::new(&ts);
        list.handle_key(key(KeyCode::Up), &ts);
        assert_eq!(list.selected_id(&ts), Some(TaskId(3)));
        list.handle_key(key(KeyCode::Char('j')), &ts);
        assert_eq!(list.selected_id(&ts), Some(TaskId(1)));
    }

    #[test]
    fn keys_map_to_intents_for_selected_row() {
        let ts = tasks(&["a", "b"]);
        let mut list = ListPresenter::new(&ts);
        list.handle_key(key(KeyCode::Down), &ts);
        assert_eq!(
            list.handle_key(key(KeyCode::Char(' ')), &ts),
            Some(Intent::Toggle(TaskId(2)))
        );
        assert_eq!(
            list.handle_key(key(KeyCode::Char('d')), &ts),
            Some(Intent::Remove(TaskId(2)))
        );
        assert_eq!(
            list.handle_key(key(KeyCode::Char('e')), &ts),
            Some(Intent::StartEdit(TaskId(2)))
        );
    }

    #[test]
    fn editing_row_captures_keys() {
        let ts = tasks(&["a", "b"]);
        let mut list = ListPresenter::new(&ts);
        list.start_edit(&ts[0], &ts);
        assert_eq!(list.handle_key(key(KeyCode::Char('d')), &ts), None);
        assert_eq!(list.row(TaskId(1)).map(RowState::draft), Some("ad"));
        assert_eq!(
            list.handle_key(key(KeyCode::Enter), &ts),
            Some(Intent::CommitEdit(TaskId(1), Some("ad".to_string())))
        );
    }

    #[test]
    fn starting_second_edit_cancels_first() {
        let ts = tasks(&["a", "b"]);
        let mut list = ListPresenter::new(&ts);
        list.start_edit(&ts[0], &ts);
        list.row_mut(TaskId(1)).expect("row").set_draft("zzz");
        list.start_edit(&ts[1], &ts);
        let first = list.row(TaskId(1)).expect("row");
        assert!(!first.is_editing());
        assert_eq!(first.draft(), "a");
        assert_eq!(list.editing_id(), Some(TaskId(2)));
        assert_eq!(list.selected_id(&ts), Some(TaskId(2)));
    }

    #[test]
    fn empty_list_ignores_actions() {
        let ts: Vec<Task> = Vec::new();
        let mut list = ListPresenter::new(&ts);
        assert_eq!(list.handle_key(key(KeyCode::Char(' ')), &ts), None);
        assert_eq!(list.handle_key(key(KeyCode::Char('d')), &ts), None);
        assert_eq!(list.handle_key(key(KeyCode::Down), &ts), None);
        assert_eq!(list.selected_index(), None);
    }

    #[test]
    fn cursor_counts_display_width_of_wide_chars() {
        let ts = tasks(&["漢字"]);
        let mut list = ListPresenter::new(&ts);
        list.start_edit(&ts[0], &ts);
        // title cell starts at x = 1 + 3 + 1; each CJK char is two columns
        assert_eq!(cursor_after_render(&mut list, &ts, 40), Position::new(5 + 4, 1));
    }

    #[test]
    fn cursor_stays_inside_title_column() {
        let ts = tasks(&["a title far longer than the narrow column"]);
        let mut list = ListPresenter::new(&ts);
        list.start_edit(&ts[0], &ts);
        // inner 28 wide, minus marker, edit, delete and three gaps: 13 columns
        assert_eq!(cursor_after_render(&mut list, &ts, 30), Position::new(5 + 12, 1));
    }

    #[test]
    fn no_cursor_for_viewing_rows() {
        let ts = tasks(&["a"]);
        let list = ListPresenter::new(&ts);
        assert_eq!(list.cursor_position(Rect::new(0, 0, 40, 6), &ts), None);
    }
}
