use std::io::Write;

use anyhow::{
  Context,
  anyhow
};
use serde_json::json;
use tracing::{
  debug,
  info,
  instrument,
  warn
};

use crate::render::Renderer;
use crate::selection::CategoryOption;
use crate::store::{
  Location,
  Outcome,
  TaskStore
};
use crate::task::TaskId;

pub fn known_command_names()
-> Vec<&'static str> {
  vec![
    "add",
    "done",
    "delete",
    "category",
    "categories",
    "search",
    "list",
    "clear",
    "export",
    "help",
    "quit",
    "exit",
  ]
}

pub fn expand_command_abbrev<'a>(
  token: &'a str,
  known: &[&'a str]
) -> Option<&'a str> {
  if known.contains(&token) {
    return Some(token);
  }

  let mut matches = known
    .iter()
    .copied()
    .filter(|name| name.starts_with(token));
  let first = matches.next()?;
  if matches.next().is_some() {
    None
  } else {
    Some(first)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
  Continue,
  Quit
}

/// One interactive session: a store
/// that lives as long as the process,
/// plus the renderer that redraws it.
#[derive(Debug)]
pub struct Session {
  store:    TaskStore,
  renderer: Renderer
}

impl Session {
  pub fn new(
    store: TaskStore,
    renderer: Renderer
  ) -> Self {
    Self {
      store,
      renderer
    }
  }

  pub fn store(&self) -> &TaskStore {
    &self.store
  }

  /// Runs one input line.
  #[instrument(skip(self, out))]
  pub fn execute<W: Write>(
    &mut self,
    line: &str,
    out: &mut W
  ) -> anyhow::Result<Flow> {
    let line = line
      .trim_end_matches(['\r', '\n'])
      .trim_start();
    if line.is_empty() {
      return Ok(Flow::Continue);
    }

    let (token, args) = line
      .split_once(char::is_whitespace)
      .map(|(cmd, rest)| {
        (cmd, rest.trim_start())
      })
      .unwrap_or((line, ""));

    let known = known_command_names();
    let command =
      expand_command_abbrev(token, &known)
        .ok_or_else(|| {
          anyhow!(
            "unknown or ambiguous command: \
             {token}"
          )
        })?;

    debug!(command, args, "dispatching command");

    match command {
      "add" => self.cmd_add(args, out),
      "done" => self.cmd_done(args, out),
      "delete" => {
        self.cmd_delete(args, out)
      }
      "category" => {
        self.cmd_category(args, out)
      }
      "categories" => {
        self.cmd_categories(out)
      }
      "search" => {
        self.cmd_search(args, out)
      }
      "list" => self.cmd_list(out),
      "clear" => self.cmd_clear(out),
      "export" => self.cmd_export(out),
      "help" => cmd_help(out),
      "quit" | "exit" => {
        info!("session ended by user");
        return Ok(Flow::Quit);
      }
      other => Err(anyhow!(
        "unknown command: {other}"
      ))
    }?;

    Ok(Flow::Continue)
  }

  fn cmd_add<W: Write>(
    &mut self,
    args: &str,
    out: &mut W
  ) -> anyhow::Result<()> {
    match self.store.add_task(args) {
      Some(id) => {
        writeln!(out, "Created task {id}.")?
      }
      None => {
        writeln!(out, "Nothing to add.")?;
        return Ok(());
      }
    }
    self.redraw(out)
  }

  fn cmd_done<W: Write>(
    &mut self,
    args: &str,
    out: &mut W
  ) -> anyhow::Result<()> {
    let id = parse_id(args)?;
    let outcome =
      self.store.complete_task(id);
    self.report(id, outcome, out)
  }

  fn cmd_delete<W: Write>(
    &mut self,
    args: &str,
    out: &mut W
  ) -> anyhow::Result<()> {
    let id = parse_id(args)?;
    let outcome =
      self.store.delete_task(id);
    self.report(id, outcome, out)
  }

  fn cmd_category<W: Write>(
    &mut self,
    args: &str,
    out: &mut W
  ) -> anyhow::Result<()> {
    let (id_text, choice) = args
      .split_once(char::is_whitespace)
      .map(|(id, rest)| (id, rest.trim()))
      .unwrap_or((args, ""));
    let id = parse_id(id_text)?;

    let task = match self.store.get(id) {
      Some((Location::Active, task)) => {
        task
      }
      _ => {
        writeln!(
          out,
          "No active task {id}."
        )?;
        return Ok(());
      }
    };

    let options =
      self.store.category_options(id);
    if choice.is_empty() {
      return self
        .renderer
        .print_category_options(
          out, task, &options
        );
    }

    let Some(option) =
      pick_option(&options, choice)
    else {
      writeln!(
        out,
        "Unknown category {choice}."
      )?;
      return Ok(());
    };

    let outcome =
      option.commit(&mut self.store);
    self.report(id, outcome, out)
  }

  fn cmd_categories<W: Write>(
    &self,
    out: &mut W
  ) -> anyhow::Result<()> {
    for label in
      self.store.categories().labels()
    {
      writeln!(out, "{label}")?;
    }
    Ok(())
  }

  fn cmd_search<W: Write>(
    &mut self,
    args: &str,
    out: &mut W
  ) -> anyhow::Result<()> {
    self.store.set_search_query(args);
    self.redraw(out)
  }

  fn cmd_list<W: Write>(
    &self,
    out: &mut W
  ) -> anyhow::Result<()> {
    self.redraw(out)
  }

  fn cmd_clear<W: Write>(
    &mut self,
    out: &mut W
  ) -> anyhow::Result<()> {
    let count =
      self.store.clear_completed();
    writeln!(
      out,
      "Cleared {count} completed \
       task(s)."
    )?;
    self.redraw(out)
  }

  fn cmd_export<W: Write>(
    &self,
    out: &mut W
  ) -> anyhow::Result<()> {
    let payload = json!({
      "query": self.store.search_query(),
      "categories": self.store.categories().labels(),
      "active": self.store.active(),
      "completed": self.store.completed(),
    });
    let text =
      serde_json::to_string_pretty(
        &payload
      )
      .context(
        "failed to serialize tasks"
      )?;
    writeln!(out, "{text}")?;
    Ok(())
  }

  fn report<W: Write>(
    &self,
    id: TaskId,
    outcome: Outcome,
    out: &mut W
  ) -> anyhow::Result<()> {
    match outcome {
      Outcome::Applied => {
        self.redraw(out)
      }
      Outcome::NotFound => {
        warn!(id = %id, "no active task");
        writeln!(
          out,
          "No active task {id}."
        )?;
        Ok(())
      }
      Outcome::UnknownCategory => {
        writeln!(
          out,
          "Unknown category."
        )?;
        Ok(())
      }
    }
  }

  fn redraw<W: Write>(
    &self,
    out: &mut W
  ) -> anyhow::Result<()> {
    self
      .renderer
      .print_board(out, &self.store)
  }
}

fn parse_id(
  text: &str
) -> anyhow::Result<TaskId> {
  let text = text.trim();
  if text.is_empty() {
    return Err(anyhow!(
      "a task id is required"
    ));
  }
  text.parse()
}

/// Accepts a 1-based option number or
/// an exact label.
fn pick_option<'a>(
  options: &'a [CategoryOption],
  choice: &str
) -> Option<&'a CategoryOption> {
  if let Ok(n) = choice.parse::<usize>()
  {
    return n
      .checked_sub(1)
      .and_then(|idx| options.get(idx));
  }
  options
    .iter()
    .find(|option| option.label() == choice)
}

fn cmd_help<W: Write>(
  out: &mut W
) -> anyhow::Result<()> {
  writeln!(
    out,
    "Commands:\n  \
     add <text>             add a task\n  \
     done <id>              mark a task as done\n  \
     delete <id>            delete an active task\n  \
     category <id> [n|name] show or pick a category\n  \
     categories             list categories\n  \
     search [text]          filter active tasks (empty clears)\n  \
     list                   show tasks\n  \
     clear                  remove all completed tasks\n  \
     export                 print tasks as JSON\n  \
     quit                   leave"
  )?;
  Ok(())
}
