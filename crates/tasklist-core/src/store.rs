//! In-memory task store.
//!
//! The store is the only owner of the task sequence. Callers read it through
//! [`TaskStore::tasks`] and change it only through the four named operations:
//! [`TaskStore::add`], [`TaskStore::toggle_done`], [`TaskStore::remove`] and
//! [`TaskStore::rename`].
//!
//! Lookups by an unknown id are not errors: the operation leaves the
//! sequence untouched and reports `false`.

use crate::error::ErrorCode;
use crate::model::task::{Task, TaskId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How [`TaskStore::add`] picks the id of a new task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Counter starting at 1 that never goes backwards; ids are never reused.
    #[default]
    Monotonic,
    /// `current length + 1`. Can hand out an id that is still in use after a
    /// removal.
    Length,
}

/// Why an add was refused. The sequence is unchanged in both cases.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddRejection {
    #[error("task title is empty")]
    EmptyTitle,
    #[error("task already registered: {title}")]
    DuplicateTitle { title: String },
}

impl AddRejection {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyTitle => ErrorCode::EmptyTitle,
            Self::DuplicateTitle { .. } => ErrorCode::DuplicateTitle,
        }
    }

    /// Whether the rejection should be shown to the user as a notice.
    ///
    /// Empty titles are dropped silently.
    #[must_use]
    pub const fn is_user_visible(&self) -> bool {
        matches!(self, Self::DuplicateTitle { .. })
    }
}

/// Ordered, append-only-at-insert sequence of tasks.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    strategy: IdStrategy,
    next_id: u64,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_strategy(IdStrategy::default())
    }

    #[must_use]
    pub const fn with_strategy(strategy: IdStrategy) -> Self {
        Self {
            tasks: Vec::new(),
            strategy,
            next_id: 1,
        }
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    #[must_use]
    pub const fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Append a new task with the given title.
    ///
    /// # Errors
    ///
    /// Returns [`AddRejection::EmptyTitle`] for an empty title and
    /// [`AddRejection::DuplicateTitle`] when a task with exactly the same
    /// title already exists. The sequence is not modified in either case.
    pub fn add(&mut self, title: &str) -> Result<TaskId, AddRejection> {
        if title.is_empty() {
            debug!("add ignored: empty title");
            return Err(AddRejection::EmptyTitle);
        }

        if self.tasks.iter().any(|task| task.title == title) {
            info!(title, "add rejected: duplicate title");
            return Err(AddRejection::DuplicateTitle {
                title: title.to_string(),
            });
        }

        let id = self.allocate_id();
        self.tasks.push(Task::new(id, title));
        debug!(%id, title, len = self.tasks.len(), "task added");
        Ok(id)
    }

    /// Flip `done` on every task with `id`. Returns whether a task matched.
    ///
    /// Ids are unique under [`IdStrategy::Monotonic`]; under
    /// [`IdStrategy::Length`] all colliding tasks are flipped, like
    /// [`TaskStore::remove`] drops all of them.
    pub fn toggle_done(&mut self, id: TaskId) -> bool {
        let mut matched = 0_usize;
        for task in self.tasks.iter_mut().filter(|task| task.id == id) {
            task.done = !task.done;
            matched += 1;
        }
        if matched == 0 {
            debug!(%id, "toggle ignored: unknown id");
            return false;
        }
        debug!(%id, matched, "task toggled");
        true
    }

    /// Remove every task with `id`, keeping the order of the rest.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            debug!(%id, len = self.tasks.len(), "task removed");
        } else {
            debug!(%id, "remove ignored: unknown id");
        }
        removed
    }

    /// Replace the title of every task with `id`.
    ///
    /// Unlike [`TaskStore::add`], the new title is not checked for emptiness
    /// or uniqueness. Returns whether a task matched.
    pub fn rename(&mut self, id: TaskId, new_title: &str) -> bool {
        let mut matched = 0_usize;
        for task in self.tasks.iter_mut().filter(|task| task.id == id) {
            new_title.clone_into(&mut task.title);
            matched += 1;
        }
        if matched == 0 {
            debug!(%id, "rename ignored: unknown id");
            return false;
        }
        debug!(%id, title = new_title, matched, "task renamed");
        true
    }

    fn allocate_id(&mut self) -> TaskId {
        match self.strategy {
            IdStrategy::Monotonic => {
                let id = self.next_id;
                self.next_id += 1;
                TaskId(id)
            }
            IdStrategy::Length => TaskId(self.tasks.len() as u64 + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(store: &TaskStore) -> Vec<&str> {
        store.tasks().iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn add_appends_in_order() {
        let mut store = TaskStore::new();
        assert_eq!(store.add("a"), Ok(TaskId(1)));
        assert_eq!(store.add("b"), Ok(TaskId(2)));
        assert_eq!(store.add("c"), Ok(TaskId(3)));
        assert_eq!(titles(&store), vec!["a", "b", "c"]);
        assert!(store.tasks().iter().all(|t| !t.done));
    }

    #[test]
    fn add_empty_is_rejected_silently() {
        let mut store = TaskStore::new();
        let err = store.add("").expect_err("empty must be rejected");
        assert_eq!(err, AddRejection::EmptyTitle);
        assert!(!err.is_user_visible());
        assert!(store.is_empty());
    }

    #[test]
    fn add_duplicate_is_rejected_with_notice() {
        let mut store = TaskStore::new();
        store.add("Buy milk").expect("first add");
        let err = store.add("Buy milk").expect_err("duplicate");
        assert!(err.is_user_visible());
        assert_eq!(err.code(), ErrorCode::DuplicateTitle);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_check_is_exact_match() {
        let mut store = TaskStore::new();
        store.add("Buy milk").expect("add");
        assert!(store.add("buy milk").is_ok());
        assert!(store.add("Buy milk ").is_ok());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut store = TaskStore::new();
        store.add("a").expect("add");
        let before = store.tasks().to_vec();
        assert!(!store.toggle_done(TaskId(99)));
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut store = TaskStore::new();
        let id = store.add("a").expect("add");
        assert!(store.toggle_done(id));
        assert!(store.get(id).is_some_and(|t| t.done));
        assert!(store.toggle_done(id));
        assert!(store.get(id).is_some_and(|t| !t.done));
    }

    #[test]
    fn remove_keeps_relative_order() {
        let mut store = TaskStore::new();
        for title in ["a", "b", "c", "d"] {
            store.add(title).expect("add");
        }
        assert!(store.remove(TaskId(2)));
        assert_eq!(titles(&store), vec!["a", "c", "d"]);
        assert!(!store.remove(TaskId(2)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn rename_skips_duplicate_and_empty_checks() {
        let mut store = TaskStore::new();
        let a = store.add("a").expect("add");
        store.add("b").expect("add");
        assert!(store.rename(a, "b"));
        assert_eq!(titles(&store), vec!["b", "b"]);
        assert!(store.rename(a, ""));
        assert_eq!(store.get(a).map(|t| t.title.as_str()), Some(""));
    }

    #[test]
    fn rename_unknown_id_is_noop() {
        let mut store = TaskStore::new();
        store.add("a").expect("add");
        assert!(!store.rename(TaskId(7), "z"));
        assert_eq!(titles(&store), vec!["a"]);
    }

    #[test]
    fn monotonic_ids_survive_removal() {
        let mut store = TaskStore::new();
        let first = store.add("a").expect("add");
        store.add("b").expect("add");
        store.remove(first);
        assert_eq!(store.add("c"), Ok(TaskId(3)));
        let ids: Vec<_> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TaskId(2), TaskId(3)]);
    }

    #[test]
    fn length_strategy_reuses_live_id_after_removal() {
        let mut store = TaskStore::with_strategy(IdStrategy::Length);
        let first = store.add("a").expect("add");
        store.add("b").expect("add");
        store.remove(first);
        assert_eq!(store.add("c"), Ok(TaskId(2)));
        let ids: Vec<_> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TaskId(2), TaskId(2)]);
    }

    #[test]
    fn length_strategy_collision_toggles_and_renames_all() {
        let mut store = TaskStore::with_strategy(IdStrategy::Length);
        let first = store.add("a").expect("add");
        store.add("b").expect("add");
        store.remove(first);
        store.add("c").expect("add");

        assert!(store.toggle_done(TaskId(2)));
        let done: Vec<bool> = store.tasks().iter().map(|t| t.done).collect();
        assert_eq!(done, vec![true, true]);

        assert!(store.rename(TaskId(2), "z"));
        assert_eq!(titles(&store), vec!["z", "z"]);

        assert!(store.remove(TaskId(2)));
        assert!(store.is_empty());
    }

    #[test]
    fn id_strategy_parses_lowercase() {
        #[derive(serde::Deserialize)]
        struct Wrap {
            s: IdStrategy,
        }
        let w: Wrap = toml::from_str("s = \"length\"").expect("parse");
        assert_eq!(w.s, IdStrategy::Length);
    }
}
