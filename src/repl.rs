use std::borrow::Cow;

use anyhow::{anyhow, Result};
use crossterm::style::Stylize;
use reedline::{
    Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline, Signal,
};
use tracing::debug;

use crate::columns::ColumnSpec;
use crate::data::record_exporter::ExportSpec;
use crate::data::record_filter::FilterSpec;
use crate::data::table_view::TableView;
use crate::page_renderer::{self, RenderOptions};

/// One parsed REPL command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Show,
    Count,
    Search(Option<String>),
    Filter { field: String, value: String },
    Filters,
    Sort(Option<String>),
    First,
    Prev,
    Next,
    Last,
    Page(usize),
    PageSize(usize),
    Export,
    Help,
    Quit,
}

/// Result of executing one command.
#[derive(Debug)]
pub enum Outcome {
    Continue(String),
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next().ok_or_else(|| anyhow!("empty command"))?;
    let rest: Vec<&str> = parts.collect();

    match head.to_lowercase().as_str() {
        "show" | "s" => Ok(Command::Show),
        "count" => Ok(Command::Count),
        "search" => Ok(Command::Search(if rest.is_empty() {
            None
        } else {
            Some(rest.join(" "))
        })),
        "filter" => match rest.split_first() {
            Some((field, value)) if !value.is_empty() => Ok(Command::Filter {
                field: field.to_string(),
                value: value.join(" "),
            }),
            _ => Err(anyhow!("usage: filter <field> <value|all>")),
        },
        "filters" => Ok(Command::Filters),
        "sort" => match rest.first() {
            Some(&"none") => Ok(Command::Sort(None)),
            Some(field) => Ok(Command::Sort(Some(field.to_string()))),
            None => Err(anyhow!("usage: sort <field|none>")),
        },
        "first" => Ok(Command::First),
        "prev" | "previous" => Ok(Command::Prev),
        "next" => Ok(Command::Next),
        "last" => Ok(Command::Last),
        "page" => {
            let n: usize = rest
                .first()
                .and_then(|p| p.parse().ok())
                .ok_or_else(|| anyhow!("usage: page <number>"))?;
            if n == 0 {
                return Err(anyhow!("pages are numbered from 1"));
            }
            Ok(Command::Page(n))
        }
        "pagesize" | "size" => {
            let n: usize = rest
                .first()
                .and_then(|p| p.parse().ok())
                .ok_or_else(|| anyhow!("usage: pagesize <5|10|20|50>"))?;
            Ok(Command::PageSize(n))
        }
        "export" => Ok(Command::Export),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(anyhow!("unknown command '{}', try 'help'", other)),
    }
}

pub fn help_text() -> String {
    [
        "Commands:",
        "  show                     render the current page",
        "  count                    show the match count",
        "  search <text>            free-text search (search alone clears it)",
        "  filter <field> <value>   set a field filter ('all' clears it)",
        "  filters                  list filters and their option sets",
        "  sort <field>             sort by a field; repeat to flip direction",
        "  sort none                clear sorting",
        "  first / prev / next / last   page navigation",
        "  page <n>                 jump to page n",
        "  pagesize <n>             page size (5, 10, 20 or 50)",
        "  export                   export all matching rows to CSV",
        "  quit                     leave",
    ]
    .join("\n")
}

/// Everything one interactive session operates on: the view engine plus
/// the caller-supplied configuration.
pub struct ReplSession {
    pub view: TableView,
    pub columns: Vec<ColumnSpec>,
    pub filters: Vec<FilterSpec>,
    pub export: Option<ExportSpec>,
    pub options: RenderOptions,
}

impl ReplSession {
    pub fn new(view: TableView, columns: Vec<ColumnSpec>) -> Self {
        Self {
            view,
            columns,
            filters: Vec::new(),
            export: None,
            options: RenderOptions::default(),
        }
    }

    fn render(&self) -> String {
        page_renderer::render_page(&self.view, &self.columns, &self.options)
    }

    fn count_line(&self) -> String {
        format!(
            "{} of {} records match",
            self.view.filtered_count(),
            self.view.source_count()
        )
    }

    fn sortable_fields(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter_map(|c| c.sort_field())
            .collect()
    }

    pub fn execute(&mut self, command: Command) -> Outcome {
        debug!("executing {:?}", command);
        match command {
            Command::Show => Outcome::Continue(self.render()),
            Command::Count => Outcome::Continue(self.count_line()),
            Command::Search(query) => {
                self.view.set_search(query.unwrap_or_default());
                Outcome::Continue(self.render())
            }
            Command::Filter { field, value } => {
                if !self.filters.is_empty() && !self.filters.iter().any(|f| f.field == field) {
                    let known: Vec<&str> =
                        self.filters.iter().map(|f| f.field.as_str()).collect();
                    return Outcome::Continue(format!(
                        "no filter on '{}'; available: {}",
                        field,
                        known.join(", ")
                    ));
                }
                self.view.set_filter(field, value);
                Outcome::Continue(self.render())
            }
            Command::Filters => {
                if self.filters.is_empty() {
                    return Outcome::Continue("no filters configured".to_string());
                }
                let active = self.view.active_filters().clone();
                let lines: Vec<String> = self
                    .filters
                    .iter()
                    .map(|spec| {
                        let options = self.view.filter_options(spec);
                        let current = active
                            .get(&spec.field)
                            .map(|v| format!(" [active: {}]", v))
                            .unwrap_or_default();
                        format!(
                            "{} ({}){}: {}",
                            spec.label,
                            spec.field,
                            current,
                            options.join(", ")
                        )
                    })
                    .collect();
                Outcome::Continue(lines.join("\n"))
            }
            Command::Sort(None) => {
                self.view.clear_sort();
                Outcome::Continue(self.render())
            }
            Command::Sort(Some(field)) => {
                let sortable = self.sortable_fields();
                if !sortable.is_empty() && !sortable.contains(&field.as_str()) {
                    return Outcome::Continue(format!(
                        "'{}' is not sortable; sortable fields: {}",
                        field,
                        sortable.join(", ")
                    ));
                }
                self.view.toggle_sort(field);
                Outcome::Continue(self.render())
            }
            Command::First => {
                self.view.first_page();
                Outcome::Continue(self.render())
            }
            Command::Prev => {
                self.view.prev_page();
                Outcome::Continue(self.render())
            }
            Command::Next => {
                self.view.next_page();
                Outcome::Continue(self.render())
            }
            Command::Last => {
                self.view.last_page();
                Outcome::Continue(self.render())
            }
            Command::Page(n) => {
                self.view.set_page(n - 1);
                Outcome::Continue(self.render())
            }
            Command::PageSize(n) => {
                if !self.view.set_page_size(n) {
                    return Outcome::Continue(format!(
                        "page size must be one of 5, 10, 20, 50 (got {})",
                        n
                    ));
                }
                Outcome::Continue(self.render())
            }
            Command::Export => match self.view.export(self.export.as_ref()) {
                Ok(path) => Outcome::Continue(format!(
                    "{}",
                    format!(
                        "Exported {} rows to {}",
                        self.view.filtered_count(),
                        path.display()
                    )
                    .green()
                )),
                Err(err) => {
                    Outcome::Continue(format!("{}", format!("Export failed: {}", err).red()))
                }
            },
            Command::Help => Outcome::Continue(help_text()),
            Command::Quit => Outcome::Quit,
        }
    }
}

struct ViewPrompt;

impl Prompt for ViewPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed("view> ")
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse search: {})",
            prefix, history_search.term
        ))
    }
}

/// Read-eval loop over an interactive session. Returns on quit or EOF.
pub fn run(session: &mut ReplSession) -> Result<()> {
    let mut line_editor = Reedline::create();
    let prompt = ViewPrompt;

    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match parse_command(line) {
                    Ok(command) => match session.execute(command) {
                        Outcome::Continue(output) => println!("{}", output),
                        Outcome::Quit => break,
                    },
                    Err(err) => println!("{}", err.to_string().red()),
                }
            }
            Signal::CtrlC | Signal::CtrlD => break,
        }
    }
    Ok(())
}
