use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use tracing::debug;

use crate::data::record::Record;

/// Load records from a JSON file containing an array of objects.
pub fn load_json_records(path: &Path, id_field: &str) -> Result<Vec<Record>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    let items = value
        .as_array()
        .ok_or_else(|| anyhow!("{}: expected a JSON array of records", path.display()))?;
    records_from_values(items, id_field)
}

/// Build records from in-memory JSON objects. Each object must carry a
/// unique, non-empty id under `id_field`.
pub fn records_from_values(items: &[Value], id_field: &str) -> Result<Vec<Record>> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| anyhow!("record {} is not an object", index))?;
        let id = obj
            .get(id_field)
            .and_then(id_text)
            .ok_or_else(|| anyhow!("record {} has no usable '{}' field", index, id_field))?;
        if !seen.insert(id.clone()) {
            return Err(anyhow!("duplicate record id '{}'", id));
        }
        records.push(Record::new(id, item.clone()));
    }

    debug!("loaded {} records", records.len());
    Ok(records)
}

/// Load records from a CSV file with a header row. Every cell becomes a
/// string field; the id comes from the `id_field` column, or the row
/// index when that column is absent.
pub fn load_csv_records(path: &Path, id_field: &str) -> Result<Vec<Record>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("reading {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("reading headers of {}", path.display()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row =
            result.with_context(|| format!("reading row {} of {}", index + 1, path.display()))?;
        let mut fields = Map::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            fields.insert(header.clone(), Value::String(cell.to_string()));
        }
        let id = fields
            .get(id_field)
            .and_then(id_text)
            .unwrap_or_else(|| index.to_string());
        if !seen.insert(id.clone()) {
            return Err(anyhow!("duplicate record id '{}'", id));
        }
        records.push(Record::new(id, Value::Object(fields)));
    }

    debug!("loaded {} records from csv", records.len());
    Ok(records)
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
