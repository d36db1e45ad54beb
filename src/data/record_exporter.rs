use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use tracing::info;

use crate::data::field_path;
use crate::data::record::Record;

/// Column layout and naming for an export.
#[derive(Debug, Clone)]
pub struct ExportSpec {
    /// Ordered (field, header label) pairs; fields key into the row map.
    pub headers: Vec<(String, String)>,
    pub file_base_name: String,
    pub directory: PathBuf,
}

impl ExportSpec {
    pub fn new(headers: Vec<(String, String)>, file_base_name: impl Into<String>) -> Self {
        Self {
            headers,
            file_base_name: file_base_name.into(),
            directory: PathBuf::from("."),
        }
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }
}

/// Writes record subsets out as delimited files.
pub struct RecordExporter;

impl RecordExporter {
    /// Write the given records to a timestamped CSV file and return its
    /// path.
    ///
    /// Callers hand this the filtered subset, never a single page. The row
    /// mapper turns a record into field -> display text; fields missing
    /// from the map come out as empty cells.
    pub fn export_csv(
        records: &[&Record],
        spec: &ExportSpec,
        mapper: &dyn Fn(&Record) -> HashMap<String, String>,
    ) -> Result<PathBuf> {
        if records.is_empty() {
            return Err(anyhow!("No data to export"));
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{}_{}.csv", spec.file_base_name, timestamp);
        let path = spec.directory.join(filename);

        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("creating export file {}", path.display()))?;

        writer.write_record(spec.headers.iter().map(|(_, label)| label.as_str()))?;

        for record in records {
            let row = mapper(record);
            let cells: Vec<&str> = spec
                .headers
                .iter()
                .map(|(field, _)| row.get(field).map(String::as_str).unwrap_or(""))
                .collect();
            writer.write_record(&cells)?;
        }

        writer.flush()?;
        info!("exported {} rows to {}", records.len(), path.display());
        Ok(path)
    }

    /// Default mapper: resolve each header field on the record payload and
    /// join fanned-out values with "; ".
    pub fn default_row_mapper(spec: &ExportSpec) -> impl Fn(&Record) -> HashMap<String, String> + '_ {
        move |record| {
            spec.headers
                .iter()
                .map(|(field, _)| {
                    let text = field_path::resolve_text(record.fields(), field).join("; ");
                    (field.clone(), text)
                })
                .collect()
        }
    }
}
