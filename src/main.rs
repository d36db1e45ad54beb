use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use crossterm::style::Stylize;
use tracing::warn;

use tableview::columns::{self, ColumnKind};
use tableview::config::config::Config;
use tableview::data::record_exporter::ExportSpec;
use tableview::data::record_filter::FilterSpec;
use tableview::data::record_loaders;
use tableview::data::table_view::TableView;
use tableview::logging;
use tableview::page_renderer::{self, RenderOptions};
use tableview::repl::{self, ReplSession};

struct CliArgs {
    file: PathBuf,
    id_field: Option<String>,
    search_field: Option<String>,
    page_size: Option<usize>,
    filter_fields: Vec<String>,
}

fn print_usage() {
    println!("Usage: tableview <records.json|records.csv> [options]");
    println!();
    println!("Options:");
    println!("  --id-field <field>       record identifier field (default: id)");
    println!("  --search-field <field>   primary free-text search field");
    println!("  --page-size <n>          initial page size (5, 10, 20 or 50)");
    println!("  --filter <field>         offer a dropdown filter on this field");
    println!("                           (repeatable; options derived from the data)");
    println!("  -h, --help               show this help");
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut file = None;
    let mut id_field = None;
    let mut search_field = None;
    let mut page_size = None;
    let mut filter_fields = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--id-field" => {
                id_field = Some(
                    iter.next()
                        .ok_or_else(|| anyhow!("--id-field needs a value"))?
                        .clone(),
                );
            }
            "--search-field" => {
                search_field = Some(
                    iter.next()
                        .ok_or_else(|| anyhow!("--search-field needs a value"))?
                        .clone(),
                );
            }
            "--page-size" => {
                let raw = iter
                    .next()
                    .ok_or_else(|| anyhow!("--page-size needs a value"))?;
                page_size = Some(
                    raw.parse()
                        .map_err(|_| anyhow!("invalid page size '{}'", raw))?,
                );
            }
            "--filter" => {
                filter_fields.push(
                    iter.next()
                        .ok_or_else(|| anyhow!("--filter needs a field"))?
                        .clone(),
                );
            }
            other if other.starts_with('-') => {
                return Err(anyhow!("unknown option '{}'", other));
            }
            other => {
                if file.replace(PathBuf::from(other)).is_some() {
                    return Err(anyhow!("only one input file is supported"));
                }
            }
        }
    }

    Ok(CliArgs {
        file: file.ok_or_else(|| anyhow!("no input file given"))?,
        id_field,
        search_field,
        page_size,
        filter_fields,
    })
}

fn run(args: &[String]) -> Result<()> {
    let cli = parse_args(args)?;

    logging::init_logging("info")?;

    let config = Config::load().unwrap_or_else(|err| {
        warn!("could not load config, using defaults: {:#}", err);
        Config::default()
    });

    let id_field = cli
        .id_field
        .unwrap_or_else(|| config.behavior.id_field.clone());
    let is_csv = cli
        .file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    let records = if is_csv {
        record_loaders::load_csv_records(&cli.file, &id_field)?
    } else {
        record_loaders::load_json_records(&cli.file, &id_field)?
    };
    println!("Loaded {} records from {}", records.len(), cli.file.display());

    let column_specs = columns::columns_from_records(&records);
    let search_field = cli
        .search_field
        .unwrap_or_else(|| config.behavior.search_field.clone());

    let mut view = TableView::new(Arc::new(records), search_field)
        .with_additional_search_fields(config.behavior.additional_search_fields.clone());
    if let Some(size) = cli.page_size {
        if !view.set_page_size(size) {
            return Err(anyhow!(
                "page size must be one of 5, 10, 20, 50 (got {})",
                size
            ));
        }
    } else {
        view.set_page_size(config.behavior.default_page_size);
    }

    let filters: Vec<FilterSpec> = cli
        .filter_fields
        .iter()
        .map(|field| FilterSpec::new(field.clone(), field.clone()))
        .collect();

    let headers: Vec<(String, String)> = column_specs
        .iter()
        .filter_map(|column| match &column.kind {
            ColumnKind::Text { accessor } => Some((accessor.clone(), column.header.clone())),
            ColumnKind::Custom { .. } => None,
        })
        .collect();
    let export = ExportSpec::new(headers, config.export.file_base_name.clone())
        .with_directory(config.export.directory.clone());

    let mut session = ReplSession::new(view, column_specs);
    session.filters = filters;
    session.export = Some(export);
    session.options = RenderOptions {
        show_row_numbers: config.display.show_row_numbers,
        max_cell_width: config.display.max_cell_width,
        loading: false,
    };

    println!(
        "{}",
        page_renderer::render_page(&session.view, &session.columns, &session.options)
    );
    println!("Type 'help' for commands.");
    repl::run(&mut session)
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return;
    }

    if let Err(err) = run(&args) {
        eprintln!("{}", format!("Error: {:#}", err).red());
        process::exit(1);
    }
}
