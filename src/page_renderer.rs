use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use crate::columns::ColumnSpec;
use crate::data::table_view::{SortDirection, TableView, PAGE_SIZES};

/// Presentation options for the rendered page.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub show_row_numbers: bool,
    /// Truncate cells longer than this many characters; 0 disables.
    pub max_cell_width: usize,
    /// Set while the data-fetch collaborator is refreshing the
    /// collection; suppresses the table body.
    pub loading: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_row_numbers: false,
            max_cell_width: 40,
            loading: false,
        }
    }
}

/// Render the current page of the view: the table itself, a results-count
/// line, and the pagination line.
pub fn render_page(view: &TableView, columns: &[ColumnSpec], options: &RenderOptions) -> String {
    if options.loading {
        return "Loading records...".to_string();
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut headers: Vec<Cell> = Vec::new();
    if options.show_row_numbers {
        headers.push(Cell::new("#").add_attribute(Attribute::Bold));
    }
    for column in columns {
        let mut label = column.header.clone();
        if let (Some(field), Some((active, direction))) = (column.sort_field(), view.sort_state())
        {
            if field == active {
                label.push_str(match direction {
                    SortDirection::Ascending => " ^",
                    SortDirection::Descending => " v",
                });
            }
        }
        headers.push(Cell::new(label).add_attribute(Attribute::Bold));
    }
    table.set_header(headers);

    let first_row_number = view.current_page() * view.page_size() + 1;
    for (offset, record) in view.page_records().iter().enumerate() {
        let mut row: Vec<String> = Vec::new();
        if options.show_row_numbers {
            row.push((first_row_number + offset).to_string());
        }
        for column in columns {
            row.push(truncate(column.cell_text(record), options.max_cell_width));
        }
        table.add_row(row);
    }

    let mut out = table.to_string();
    out.push('\n');

    if view.filtered_count() == view.source_count() {
        out.push_str(&format!("{} records\n", view.source_count()));
    } else {
        out.push_str(&format!(
            "{} of {} records match\n",
            view.filtered_count(),
            view.source_count()
        ));
    }

    let sizes: Vec<String> = PAGE_SIZES.iter().map(|s| s.to_string()).collect();
    out.push_str(&format!(
        "Page {} of {} ({} per page; sizes: {})",
        view.current_page() + 1,
        view.total_pages(),
        view.page_size(),
        sizes.join("/")
    ));
    out
}

fn truncate(text: String, max_width: usize) -> String {
    if max_width == 0 || text.chars().count() <= max_width {
        return text;
    }
    let mut shortened: String = text.chars().take(max_width.saturating_sub(3)).collect();
    shortened.push_str("...");
    shortened
}
