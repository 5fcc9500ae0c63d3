pub mod category;
pub mod cli;
pub mod commands;
pub mod config;
pub mod filter;
pub mod render;
pub mod selection;
pub mod store;
pub mod task;

use std::ffi::OsString;
use std::io::{
  self,
  BufRead,
  IsTerminal,
  Write
};

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info,
  warn
};

pub use category::CategoryRegistry;
pub use selection::CategoryOption;
pub use store::{
  Outcome,
  StoreEvent,
  TaskStore
};
pub use task::{
  Task,
  TaskId
};

use crate::commands::{
  Flow,
  Session
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting planer"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.planerrc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let store = TaskStore::new(
    cfg.category_registry()
  );
  let renderer =
    render::Renderer::new(&cfg);
  let mut session =
    Session::new(store, renderer);

  let scripted =
    cli::split_command_lines(&cli.rest);
  let mut out = io::stdout().lock();

  if scripted.is_empty() {
    run_interactive(&mut session, &mut out)?;
  } else {
    run_script(
      &mut session,
      &scripted,
      &mut out
    )?;
  }

  info!("done");
  Ok(())
}

/// Runs each command line in order and
/// stops at the first failure.
fn run_script<W: Write>(
  session: &mut Session,
  lines: &[String],
  out: &mut W
) -> anyhow::Result<()> {
  for line in lines {
    let flow = session
      .execute(line, out)
      .with_context(|| {
        format!("command failed: {line}")
      })?;
    if flow == Flow::Quit {
      break;
    }
  }
  out.flush()?;
  Ok(())
}

/// Reads commands from stdin until EOF
/// or `quit`. A failing command is
/// reported and the session goes on.
fn run_interactive<W: Write>(
  session: &mut Session,
  out: &mut W
) -> anyhow::Result<()> {
  let stdin = io::stdin();
  let prompt = stdin.is_terminal();
  let mut input = stdin.lock();

  let mut line = String::new();
  loop {
    if prompt {
      write!(out, "planer> ")?;
      out.flush()?;
    }

    line.clear();
    let read = input
      .read_line(&mut line)
      .context(
        "failed to read from stdin"
      )?;
    if read == 0 {
      break;
    }

    match session.execute(&line, out) {
      Ok(Flow::Quit) => break,
      Ok(Flow::Continue) => {}
      Err(err) => {
        warn!(error = %err, "command failed");
        writeln!(out, "error: {err:#}")?;
      }
    }
    out.flush()?;
  }

  Ok(())
}
