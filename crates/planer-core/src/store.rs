use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::category::CategoryRegistry;
use crate::filter::ActiveView;
use crate::task::{IdGenerator, Task, TaskId};

/// Result of a mutating operation. None of these is an error: anything other
/// than `Applied` means the store was left exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    NotFound,
    UnknownCategory,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        self == Outcome::Applied
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added { id: TaskId },
    Completed { id: TaskId },
    Deleted { id: TaskId },
    Categorized { id: TaskId, category: String },
    CompletedCleared { count: usize },
    QueryChanged { query: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Owns every task, the search query and the category registry.
///
/// Mutations that change the active collection clear the search query before
/// listeners hear about them, so a re-read after any event shows the
/// unfiltered list.
pub struct TaskStore {
    active: Vec<Task>,
    completed: Vec<Task>,
    query: String,
    registry: CategoryRegistry,
    ids: IdGenerator,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new(CategoryRegistry::default())
    }
}

impl fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskStore")
            .field("active", &self.active)
            .field("completed", &self.completed)
            .field("query", &self.query)
            .field("registry", &self.registry)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl TaskStore {
    pub fn new(registry: CategoryRegistry) -> Self {
        debug!(categories = ?registry.labels(), "created task store");
        Self {
            active: Vec::new(),
            completed: Vec::new(),
            query: String::new(),
            registry,
            ids: IdGenerator::default(),
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn add_task(&mut self, raw_text: &str) -> Option<TaskId> {
        self.add_task_at(raw_text, Utc::now())
    }

    #[instrument(skip(self, raw_text, now))]
    pub fn add_task_at(&mut self, raw_text: &str, now: DateTime<Utc>) -> Option<TaskId> {
        if raw_text.trim().is_empty() {
            debug!("ignoring blank task text");
            return None;
        }

        let id = self.ids.next_id();
        let task = Task::new(id, raw_text, now)?;
        info!(id = %id, text = %task.text, "task added");
        self.active.push(task);

        self.after_active_change(StoreEvent::Added { id });
        Some(id)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub fn complete_task(&mut self, id: TaskId) -> Outcome {
        let Some(idx) = self.active_index(id) else {
            debug!("complete: task not active");
            return Outcome::NotFound;
        };

        let task = self.active.remove(idx);
        self.completed.push(task);
        info!(
            active = self.active.len(),
            completed = self.completed.len(),
            "task completed"
        );

        self.after_active_change(StoreEvent::Completed { id });
        Outcome::Applied
    }

    #[instrument(skip(self), fields(id = %id))]
    pub fn delete_task(&mut self, id: TaskId) -> Outcome {
        let Some(idx) = self.active_index(id) else {
            debug!("delete: task not active");
            return Outcome::NotFound;
        };

        self.active.remove(idx);
        info!(active = self.active.len(), "task deleted");

        self.after_active_change(StoreEvent::Deleted { id });
        Outcome::Applied
    }

    #[instrument(skip(self), fields(id = %id))]
    pub fn assign_category(&mut self, id: TaskId, category: &str) -> Outcome {
        if !self.registry.contains(category) {
            debug!(category, "assign: unknown category");
            return Outcome::UnknownCategory;
        }

        let Some(task) = self.active.iter_mut().find(|task| task.id == id) else {
            debug!("assign: task not active");
            return Outcome::NotFound;
        };

        task.category = Some(category.to_string());
        info!(category, "category assigned");

        self.after_active_change(StoreEvent::Categorized {
            id,
            category: category.to_string(),
        });
        Outcome::Applied
    }

    /// Drops every completed task. Returns how many were removed.
    #[instrument(skip(self))]
    pub fn clear_completed(&mut self) -> usize {
        let count = self.completed.len();
        self.completed.clear();
        info!(count, "cleared completed tasks");

        if count > 0 {
            self.emit(&StoreEvent::CompletedCleared { count });
        }
        count
    }

    #[instrument(skip(self, query))]
    pub fn set_search_query(&mut self, query: &str) {
        if self.query == query {
            return;
        }

        debug!(query, "search query changed");
        self.query = query.to_string();
        self.emit(&StoreEvent::QueryChanged {
            query: self.query.clone(),
        });
    }

    pub fn search_query(&self) -> &str {
        &self.query
    }

    /// Active tasks whose text contains `query`, ignoring case.
    pub fn active_view<'a>(&'a self, query: &str) -> ActiveView<'a> {
        ActiveView::new(&self.active, query)
    }

    /// Active tasks filtered by the store's own search query.
    pub fn visible_tasks(&self) -> ActiveView<'_> {
        ActiveView::new(&self.active, &self.query)
    }

    pub fn active(&self) -> &[Task] {
        &self.active
    }

    pub fn completed(&self) -> &[Task] {
        &self.completed
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn get(&self, id: TaskId) -> Option<(Location, &Task)> {
        if let Some(task) = self.active.iter().find(|task| task.id == id) {
            return Some((Location::Active, task));
        }
        self.completed
            .iter()
            .find(|task| task.id == id)
            .map(|task| (Location::Completed, task))
    }

    /// Registers a listener that runs after every state change.
    pub fn on_change<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        debug!(listeners = self.listeners.len(), "listener registered");
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        before != self.listeners.len()
    }

    fn active_index(&self, id: TaskId) -> Option<usize> {
        self.active.iter().position(|task| task.id == id)
    }

    fn after_active_change(&mut self, event: StoreEvent) {
        if !self.query.is_empty() {
            debug!(query = %self.query, "resetting search query");
            self.query.clear();
        }
        self.emit(&event);
    }

    fn emit(&mut self, event: &StoreEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}
