use std::iter::FusedIterator;
use std::slice;

use tracing::trace;

use crate::task::Task;

/// Case-insensitive substring match on task
/// text. An empty query matches everything.
#[derive(Debug, Clone, Default)]
pub struct TextQuery {
  needle: Option<String>
}

impl TextQuery {
  pub fn new(query: &str) -> Self {
    if query.is_empty() {
      return Self::default();
    }

    Self {
      needle: Some(query.to_lowercase())
    }
  }

  pub fn is_empty(&self) -> bool {
    self.needle.is_none()
  }

  pub fn matches(
    &self,
    task: &Task
  ) -> bool {
    let Some(needle) =
      self.needle.as_deref()
    else {
      return true;
    };

    let ok = task
      .text
      .to_lowercase()
      .contains(needle);
    trace!(id = %task.id, ok, "query match");
    ok
  }
}

/// Filtered pass over the active
/// collection.
///
/// Borrows the store, so it can never
/// observe a mutation halfway through.
/// Cloning it gives a fresh cursor at the
/// same position, which is how callers
/// restart a view.
#[derive(Debug, Clone)]
pub struct ActiveView<'a> {
  tasks: slice::Iter<'a, Task>,
  query: TextQuery
}

impl<'a> ActiveView<'a> {
  pub(crate) fn new(
    tasks: &'a [Task],
    query: &str
  ) -> Self {
    Self {
      tasks: tasks.iter(),
      query: TextQuery::new(query)
    }
  }
}

impl<'a> Iterator for ActiveView<'a> {
  type Item = &'a Task;

  fn next(
    &mut self
  ) -> Option<Self::Item> {
    let query = &self.query;
    self
      .tasks
      .by_ref()
      .find(|task| query.matches(task))
  }

  fn size_hint(
    &self
  ) -> (usize, Option<usize>) {
    if self.query.is_empty() {
      self.tasks.size_hint()
    } else {
      (0, self.tasks.size_hint().1)
    }
  }
}

impl FusedIterator for ActiveView<'_> {}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::{
    ActiveView,
    TextQuery
  };
  use crate::task::{
    IdGenerator,
    Task
  };

  fn tasks(texts: &[&str]) -> Vec<Task> {
    let now = Utc::now();
    let mut ids = IdGenerator::default();
    texts
      .iter()
      .map(|text| {
        Task::new(ids.next_id(), text, now)
          .unwrap()
      })
      .collect()
  }

  fn texts<'a>(
    view: ActiveView<'a>
  ) -> Vec<&'a str> {
    view.map(|t| t.text.as_str()).collect()
  }

  #[test]
  fn empty_query_yields_everything_in_order()
  {
    let all = tasks(&[
      "Wash car",
      "Read book",
      "Call mom"
    ]);
    let view = ActiveView::new(&all, "");
    assert_eq!(view.size_hint(), (3, Some(3)));
    assert_eq!(
      texts(view),
      ["Wash car", "Read book", "Call mom"]
    );
  }

  #[test]
  fn matches_substring_ignoring_case() {
    let all = tasks(&[
      "Wash car",
      "Read book",
      "READ mail",
      "Bread"
    ]);
    assert_eq!(
      texts(ActiveView::new(&all, "read")),
      ["Read book", "READ mail", "Bread"]
    );
    assert_eq!(
      texts(ActiveView::new(&all, "CAR")),
      ["Wash car"]
    );
    assert!(
      texts(ActiveView::new(&all, "xyz"))
        .is_empty()
    );
  }

  #[test]
  fn lowercases_beyond_ascii() {
    let all =
      tasks(&["Urađeni ZADACI", "Čitanje"]);
    assert_eq!(
      texts(ActiveView::new(&all, "čit")),
      ["Čitanje"]
    );
    assert_eq!(
      texts(ActiveView::new(&all, "ađeni z")),
      ["Urađeni ZADACI"]
    );
  }

  #[test]
  fn whitespace_query_is_not_trimmed() {
    let all = tasks(&["Wash car", "Read"]);
    assert_eq!(
      texts(ActiveView::new(&all, " ")),
      ["Wash car"]
    );
    assert!(!TextQuery::new(" ").is_empty());
  }

  #[test]
  fn cloned_view_restarts_independently() {
    let all =
      tasks(&["a one", "b", "a two"]);
    let mut view =
      ActiveView::new(&all, "a");
    let fresh = view.clone();

    assert_eq!(
      view.next().map(|t| t.text.as_str()),
      Some("a one")
    );
    assert_eq!(texts(fresh).len(), 2);
    assert_eq!(texts(view), ["a two"]);
  }
}
