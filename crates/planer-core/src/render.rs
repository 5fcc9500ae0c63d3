use std::io::{self, IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::config::{Config, DEFAULT_COMPLETED_TITLE, DEFAULT_EMPTY_MESSAGE, DEFAULT_TITLE};
use crate::selection::CategoryOption;
use crate::store::TaskStore;
use crate::task::Task;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    title: String,
    empty_message: String,
    completed_title: String,
}

impl Renderer {
    /// Colour needs both the `color` setting and a terminal on stdout.
    pub fn new(cfg: &Config) -> Self {
        let color = cfg.get_bool("color").unwrap_or(true) && io::stdout().is_terminal();

        Self {
            color,
            title: cfg.get("title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            empty_message: cfg
                .get("empty.message")
                .unwrap_or_else(|| DEFAULT_EMPTY_MESSAGE.to_string()),
            completed_title: cfg
                .get("completed.title")
                .unwrap_or_else(|| DEFAULT_COMPLETED_TITLE.to_string()),
        }
    }

    /// Title, the filtered active list, then the completed list.
    #[tracing::instrument(skip_all)]
    pub fn print_board<W: Write>(&self, out: &mut W, store: &TaskStore) -> anyhow::Result<()> {
        writeln!(out, "{}", self.paint(&self.title, "1"))?;
        if !store.search_query().is_empty() {
            writeln!(out, "search: {}", store.search_query())?;
        }
        writeln!(out)?;

        let visible: Vec<&Task> = store.visible_tasks().collect();
        if visible.is_empty() {
            writeln!(out, "{}", self.empty_message)?;
        } else {
            self.print_task_table(out, &visible)?;
        }

        writeln!(out)?;
        self.print_completed(out, store.completed())
    }

    pub fn print_task_table<W: Write>(&self, out: &mut W, tasks: &[&Task]) -> anyhow::Result<()> {
        let headers = vec!["ID".to_string(), "Category".to_string(), "Task".to_string()];

        let rows = tasks
            .iter()
            .map(|task| {
                let category = task
                    .category()
                    .map(|label| self.paint(label, "36"))
                    .unwrap_or_default();
                vec![
                    self.paint(&task.id.to_string(), "33"),
                    category,
                    task.text.clone(),
                ]
            })
            .collect();

        write_table(out, headers, rows)
    }

    pub fn print_completed<W: Write>(&self, out: &mut W, tasks: &[Task]) -> anyhow::Result<()> {
        writeln!(out, "{}", self.paint(&self.completed_title, "32"))?;
        for task in tasks {
            writeln!(out, "  {}", task.text)?;
        }
        Ok(())
    }

    pub fn print_category_options<W: Write>(
        &self,
        out: &mut W,
        task: &Task,
        options: &[CategoryOption],
    ) -> anyhow::Result<()> {
        writeln!(out, "Pick a category for \"{}\":", task.text)?;
        for (idx, option) in options.iter().enumerate() {
            writeln!(out, "  {}) {}", idx + 1, option.label())?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    writer: &mut W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(header, *width))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(writer, "{}", header_line.trim_end())?;

    let rule = widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(writer, "{rule}")?;

    for row in rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", line.trim_end())?;
    }

    Ok(())
}

fn pad(cell: &str, width: usize) -> String {
    let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
    format!("{cell}{}", " ".repeat(width.saturating_sub(visible_width)))
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{Renderer, strip_ansi};
    use crate::config::Config;
    use crate::store::TaskStore;

    fn plain_renderer() -> Renderer {
        let mut cfg = Config::default();
        cfg.apply_overrides([("color".to_string(), "off".to_string())]);
        Renderer::new(&cfg)
    }

    fn render(store: &TaskStore) -> String {
        let mut buf = Vec::new();
        plain_renderer().print_board(&mut buf, store).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn empty_board_shows_placeholder() {
        let out = render(&TaskStore::default());
        assert!(out.starts_with("FONtastični planer\n"));
        assert!(out.contains("Za danas nema zadataka"));
        assert!(out.contains("Urađeni zadaci \u{2713}"));
    }

    #[test]
    fn board_pads_columns_by_display_width() {
        let mut store = TaskStore::default();
        let a = store.add_task("Čitanje").unwrap();
        store.add_task("Wash car").unwrap();
        store.assign_category(a, "Zabava");

        let out = render(&store);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[2], "ID Category Task");
        assert_eq!(lines[3], "-- -------- --------");
        assert_eq!(lines[4], "1  Zabava   Čitanje");
        assert_eq!(lines[5], "2           Wash car");
    }

    #[test]
    fn board_lists_completed_and_query() {
        let mut store = TaskStore::default();
        let a = store.add_task("Wash car").unwrap();
        store.add_task("Read book").unwrap();
        store.complete_task(a);
        store.set_search_query("zzz");

        let out = render(&store);
        assert!(out.contains("search: zzz"));
        assert!(out.contains("Za danas nema zadataka"));
        assert!(out.ends_with("Urađeni zadaci \u{2713}\n  Wash car\n"));
    }

    #[test]
    fn color_follows_boolean_setting() {
        for value in ["off", "no", "0", "purple"] {
            let mut cfg = Config::default();
            cfg.apply_overrides([("color".to_string(), value.to_string())]);
            assert!(!Renderer::new(&cfg).color, "color = {value}");
        }
    }

    #[test]
    fn section_titles_come_from_config() {
        let mut cfg = Config::default();
        cfg.apply_overrides([
            ("color".to_string(), "off".to_string()),
            ("completed.title".to_string(), "Done".to_string()),
            ("empty.message".to_string(), "Nothing today".to_string()),
        ]);

        let mut buf = Vec::new();
        Renderer::new(&cfg).print_board(&mut buf, &TaskStore::default()).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("Nothing today"));
        assert!(out.ends_with("\nDone\n"));
    }

    #[test]
    fn strip_ansi_removes_escapes() {
        assert_eq!(strip_ansi("\x1b[33m12\x1b[0m"), "12");
    }
}
