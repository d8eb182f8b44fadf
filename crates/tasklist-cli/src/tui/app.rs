//! Page controller: sole owner of the task store.
//!
//! Presenters hand [`Intent`]s up; [`App::apply`] routes each one through the
//! store's named operations, then reconciles the list presenter with the new
//! sequence. The screen shows a header with the task counter, the new-task
//! input, the list, and a status line. A duplicate title raises a modal
//! [`Notice`] that blocks other input until dismissed.

use super::input::{LineBuffer, LineEdit};
use super::list::ListPresenter;
use crate::intent::Intent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use serde::Serialize;
use std::time::{Duration, Instant};
use tasklist_core::config::Config;
use tasklist_core::{AddRejection, Task, TaskId, TaskStore};
use tracing::{debug, info};

/// Blocking user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    /// Notice for a rejected add, or `None` when the rejection is silent.
    pub fn from_rejection(rejection: &AddRejection) -> Option<Self> {
        if !rejection.is_user_visible() {
            return None;
        }
        let code = rejection.code();
        Some(Self {
            title: code.message().to_string(),
            message: code.hint().unwrap_or_default().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    List,
}

pub struct App {
    store: TaskStore,
    list: ListPresenter,
    input: LineBuffer,
    focus: Focus,
    notice: Option<Notice>,
    /// Task awaiting y/n when delete confirmation is on.
    pending_delete: Option<TaskId>,
    confirm_delete: bool,
    status_msg: Option<(String, Instant)>,
    status_ttl: Duration,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let store = TaskStore::with_strategy(config.store.id_strategy);
        let list = ListPresenter::new(store.tasks());
        Self {
            store,
            list,
            input: LineBuffer::default(),
            focus: Focus::default(),
            notice: None,
            pending_delete: None,
            confirm_delete: config.ui.confirm_delete,
            status_msg: None,
            status_ttl: Duration::from_secs(config.ui.status_secs),
            should_quit: false,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn task_count(&self) -> usize {
        self.store.len()
    }

    #[cfg(test)]
    pub const fn list(&self) -> &ListPresenter {
        &self.list
    }

    #[cfg(test)]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub const fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    #[cfg(test)]
    pub const fn focus(&self) -> Focus {
        self.focus
    }

    #[cfg(test)]
    pub fn input(&self) -> &str {
        self.input.value()
    }

    #[cfg(test)]
    pub const fn pending_delete(&self) -> Option<TaskId> {
        self.pending_delete
    }

    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status(&self) -> Option<&str> {
        self.status_msg.as_ref().map(|(msg, _)| msg.as_str())
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_msg = Some((msg.into(), Instant::now()));
    }

    /// Expire the status line.
    pub fn tick(&mut self) {
        if self
            .status_msg
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() >= self.status_ttl)
        {
            self.status_msg = None;
        }
    }

    // -----------------------------------------------------------------------
    // Intent application
    // -----------------------------------------------------------------------

    /// Apply one intent. The only place the store is mutated.
    pub fn apply(&mut self, intent: Intent) {
        if intent.is_row_local() {
            debug!(?intent, "row intent");
        } else {
            info!(?intent, "store intent");
        }

        match intent {
            Intent::Add(title) => self.add(&title),
            Intent::Toggle(id) => {
                if self.store.toggle_done(id) {
                    let done = self.store.get(id).is_some_and(|task| task.done);
                    self.set_status(if done { "Marked done" } else { "Marked not done" });
                }
            }
            Intent::Remove(id) => {
                if self.list.row(id).is_some_and(|row| !row.can_delete()) {
                    debug!(%id, "remove ignored: row is editing");
                    return;
                }
                if self.store.remove(id) {
                    self.set_status("Task removed");
                }
            }
            Intent::StartEdit(id) => {
                if let Some(task) = self.store.get(id).cloned() {
                    self.list.start_edit(&task, self.store.tasks());
                    self.focus = Focus::List;
                }
            }
            Intent::CancelEdit(id) => {
                if let (Some(task), Some(row)) = (self.store.get(id), self.list.row_mut(id)) {
                    row.cancel_edit(task);
                }
            }
            Intent::SetDraft(id, text) => {
                if let Some(row) = self.list.row_mut(id) {
                    row.set_draft(&text);
                }
            }
            Intent::CommitEdit(id, title) => {
                let Some(row) = self.list.row(id).filter(|row| row.is_editing()) else {
                    debug!(%id, "commit ignored: row is not editing");
                    return;
                };
                let title = title.unwrap_or_else(|| row.draft().to_string());
                self.store.rename(id, &title);
                if let (Some(task), Some(row)) = (self.store.get(id), self.list.row_mut(id)) {
                    row.finish_edit(task);
                }
                self.set_status("Task renamed");
            }
        }

        self.list.sync(self.store.tasks());
    }

    fn add(&mut self, title: &str) {
        match self.store.add(title) {
            Ok(id) => {
                self.input.clear();
                self.list.select_id(id, self.store.tasks());
                self.set_status("Task added");
            }
            Err(rejection) => {
                self.notice = Notice::from_rejection(&rejection);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Key handling
    // -----------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.notice = None;
            }
            return;
        }

        if let Some(id) = self.pending_delete {
            match key.code {
                KeyCode::Char('y' | 'Y') => {
                    self.pending_delete = None;
                    self.apply(Intent::Remove(id));
                }
                KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                    self.pending_delete = None;
                    self.set_status("Delete cancelled");
                }
                _ => {}
            }
            return;
        }

        match self.focus {
            Focus::Input => self.handle_input_key(key),
            Focus::List => self.handle_list_key(key),
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Tab {
            self.focus = Focus::List;
            return;
        }
        match self.input.handle_key(key) {
            LineEdit::Submit => {
                let title = self.input.value().to_string();
                self.apply(Intent::Add(title));
            }
            LineEdit::Cancel => self.focus = Focus::List,
            LineEdit::Changed | LineEdit::Ignored => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let editing = self.list.editing_id().is_some();
        if !editing {
            match key.code {
                KeyCode::Tab | KeyCode::Char('a' | 'i') => {
                    self.focus = Focus::Input;
                    return;
                }
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                _ => {}
            }
        }

        let Some(intent) = self.list.handle_key(key, self.store.tasks()) else {
            return;
        };
        match intent {
            Intent::Remove(id) if self.confirm_delete => {
                self.pending_delete = Some(id);
            }
            other => self.apply(other),
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        render_header(frame, chunks[0], self.store.len());
        self.render_input(frame, chunks[1]);

        let list_focused = self.focus == Focus::List && self.notice.is_none();
        self.list
            .render(frame, chunks[2], self.store.tasks(), list_focused);

        frame.render_widget(Paragraph::new(self.status_line()), chunks[3]);

        if let Some(notice) = &self.notice {
            render_notice(frame, area, notice);
        }
    }

    fn render_input(&self, frame: &mut Frame<'_>, area: Rect) {
        let focused = self.focus == Focus::Input && self.notice.is_none();
        let border_style = if focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let content = if self.input.is_empty() && !focused {
            Span::styled("Add new task", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(self.input.value().to_string())
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(border_style)
            .title(" New task ");
        frame.render_widget(Paragraph::new(Line::from(content)).block(block), area);

        if focused {
            let cursor = u16::try_from(Span::raw(self.input.before_cursor()).width())
                .unwrap_or(u16::MAX);
            let x = area
                .x
                .saturating_add(1)
                .saturating_add(cursor)
                .min(area.right().saturating_sub(2));
            frame.set_cursor_position(Position::new(x, area.y + 1));
        }
    }

    fn status_line(&self) -> Line<'static> {
        let hint_style = Style::default().fg(Color::DarkGray);
        if let Some(id) = self.pending_delete {
            let title = self
                .store
                .get(id)
                .map(|task| task.title.clone())
                .unwrap_or_default();
            return Line::from(vec![
                Span::styled(
                    format!(" Remove \"{title}\"? "),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled("y/n", hint_style),
            ]);
        }
        if let Some(msg) = self.status() {
            return Line::from(Span::styled(
                format!(" {msg}"),
                Style::default().fg(Color::Cyan),
            ));
        }
        let hints = match (self.focus, self.list.editing_id().is_some()) {
            (Focus::Input, _) => " enter add  tab list  ctrl-c quit",
            (Focus::List, false) => {
                " j/k move  space toggle  e edit  d delete  a add  q quit"
            }
            (Focus::List, true) => " enter save  esc cancel  ctrl-t toggle",
        };
        Line::from(Span::styled(hints, hint_style))
    }
}

/// "You have N tasks" counter.
pub fn counter_text(count: usize) -> String {
    if count == 1 {
        "You have 1 task".to_string()
    } else {
        format!("You have {count} tasks")
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, count: usize) {
    let line = Line::from(vec![
        Span::styled(
            " todo ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(counter_text(count), Style::default().fg(Color::Gray)),
    ]);
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_notice(frame: &mut Frame<'_>, area: Rect, notice: &Notice) {
    let dialog_w: u16 = 50.min(area.width.saturating_sub(4));
    let dialog_h: u16 = 6.min(area.height.saturating_sub(2));
    let dialog_area = Rect {
        x: area.x + area.width.saturating_sub(dialog_w) / 2,
        y: area.y + area.height.saturating_sub(dialog_h) / 2,
        width: dialog_w,
        height: dialog_h,
    };

    frame.render_widget(Clear, dialog_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .title(format!(" {} ", notice.title))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    let body = vec![
        Line::from(notice.message.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "[enter] OK",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(body)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        dialog_area,
    );
}
