//! Category picker contract.
//!
//! The store hands out one [`CategoryOption`] per registry label; whatever
//! presents them (a prompt, a menu, a dialog) calls [`CategoryOption::commit`]
//! on the one the user picked.

use tracing::debug;

use crate::store::{Outcome, TaskStore};
use crate::task::TaskId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    task: TaskId,
    label: String,
}

impl CategoryOption {
    pub fn task(&self) -> TaskId {
        self.task
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Assigns this option's label to its task. Exactly one assignment.
    pub fn commit(&self, store: &mut TaskStore) -> Outcome {
        debug!(id = %self.task, label = %self.label, "committing category option");
        store.assign_category(self.task, &self.label)
    }
}

impl TaskStore {
    /// Options in registry order. Built for any id; committing against a task
    /// that is no longer active is a no-op.
    pub fn category_options(&self, id: TaskId) -> Vec<CategoryOption> {
        self.categories()
            .labels()
            .iter()
            .map(|label| CategoryOption {
                task: id,
                label: label.clone(),
            })
            .collect()
    }
}
