use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::category::{
  CategoryRegistry,
  DEFAULT_CATEGORIES
};

pub const DEFAULT_TITLE: &str =
  "FONtastični planer";
pub const DEFAULT_EMPTY_MESSAGE: &str =
  "Za danas nema zadataka";
pub const DEFAULT_COMPLETED_TITLE: &str =
  "Urađeni zadaci \u{2713}";

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "categories".to_string(),
      DEFAULT_CATEGORIES.join(",")
    );
    map.insert(
      "color".to_string(),
      "on".to_string()
    );
    map.insert(
      "title".to_string(),
      DEFAULT_TITLE.to_string()
    );
    map.insert(
      "empty.message".to_string(),
      DEFAULT_EMPTY_MESSAGE.to_string()
    );
    map.insert(
      "completed.title".to_string(),
      DEFAULT_COMPLETED_TITLE.to_string()
    );

    Self {
      map,
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let rc =
      resolve_rc_path(rc_override)?;
    if let Some(path) = rc {
      info!(planerrc = %path.display(), "loading planerrc");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no planerrc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  /// Comma-separated values, trimmed,
  /// blanks dropped.
  pub fn get_list(
    &self,
    key: &str
  ) -> Option<Vec<String>> {
    self.map.get(key).map(|raw| {
      raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
    })
  }

  pub fn category_registry(
    &self
  ) -> CategoryRegistry {
    match self.get_list("categories") {
      Some(labels)
        if !labels.is_empty() =>
      {
        CategoryRegistry::from_labels(
          labels
        )
      }
      _ => {
        warn!(
          "no categories configured; \
           using defaults"
        );
        CategoryRegistry::default()
      }
    }
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self.parse_text(&path, &text)?;
    self
      .loaded_files
      .push(path);
    Ok(())
  }

  fn parse_text(
    &mut self,
    path: &Path,
    text: &str
  ) -> anyhow::Result<()> {
    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if line.is_empty()
        || line.starts_with('#')
      {
        continue;
      }

      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      if key.is_empty() {
        return Err(anyhow!(
          "empty config key at {}:{}",
          path.display(),
          line_num + 1
        ));
      }
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var("PLANERRC")
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping planerrc"
    );
    return Ok(None);
  };
  let candidate = home.join(".planerrc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}
