use std::fmt;

use crate::data::field_path;
use crate::data::record::Record;

/// How a column produces its cell text.
pub enum ColumnKind {
    /// Default rendering: resolve the accessor path and join the values.
    /// The accessor doubles as the sort field when the column is sortable.
    Text { accessor: String },
    /// Caller-supplied renderer over the whole row.
    Custom {
        render: Box<dyn Fn(&Record) -> String + Send + Sync>,
    },
}

impl fmt::Debug for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Text { accessor } => f.debug_struct("Text").field("accessor", accessor).finish(),
            ColumnKind::Custom { .. } => f.debug_struct("Custom").finish_non_exhaustive(),
        }
    }
}

/// One rendered column of the view.
#[derive(Debug)]
pub struct ColumnSpec {
    pub id: Option<String>,
    pub header: String,
    pub sortable: bool,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn text(header: impl Into<String>, accessor: impl Into<String>) -> Self {
        Self {
            id: None,
            header: header.into(),
            sortable: false,
            kind: ColumnKind::Text {
                accessor: accessor.into(),
            },
        }
    }

    pub fn custom(
        header: impl Into<String>,
        render: impl Fn(&Record) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: None,
            header: header.into(),
            sortable: false,
            kind: ColumnKind::Custom {
                render: Box::new(render),
            },
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Key used when consumers need a stable identity for the column.
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.header)
    }

    /// Field the view sorts by when this column's header is activated.
    /// Only text columns sort; a custom renderer has no accessor.
    pub fn sort_field(&self) -> Option<&str> {
        match &self.kind {
            ColumnKind::Text { accessor } if self.sortable => Some(accessor),
            _ => None,
        }
    }

    pub fn cell_text(&self, record: &Record) -> String {
        match &self.kind {
            ColumnKind::Text { accessor } => {
                field_path::resolve_text(record.fields(), accessor).join(", ")
            }
            ColumnKind::Custom { render } => render(record),
        }
    }
}

/// Build sortable text columns from the keys of the first record, for
/// callers that bring no column configuration of their own.
pub fn columns_from_records(records: &[Record]) -> Vec<ColumnSpec> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    let Some(obj) = first.fields().as_object() else {
        return Vec::new();
    };
    obj.keys()
        .map(|key| ColumnSpec::text(key.clone(), key.clone()).sortable())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_column_resolves_and_joins() {
        let record = Record::new("1", json!({"tags": ["a", "b"]}));
        let column = ColumnSpec::text("Tags", "tags");
        assert_eq!(column.cell_text(&record), "a, b");
    }

    #[test]
    fn test_custom_column_uses_renderer() {
        let record = Record::new("1", json!({"first": "Awa", "last": "Diallo"}));
        let column = ColumnSpec::custom("Full name", |r: &Record| {
            format!(
                "{} {}",
                r.field("first").and_then(|v| v.as_str()).unwrap_or(""),
                r.field("last").and_then(|v| v.as_str()).unwrap_or("")
            )
        });
        assert_eq!(column.cell_text(&record), "Awa Diallo");
    }

    #[test]
    fn test_only_sortable_text_columns_expose_a_sort_field() {
        let text = ColumnSpec::text("Name", "name").sortable();
        let unsortable = ColumnSpec::text("Name", "name");
        let custom = ColumnSpec::custom("X", |_| String::new()).sortable();

        assert_eq!(text.sort_field(), Some("name"));
        assert_eq!(unsortable.sort_field(), None);
        assert_eq!(custom.sort_field(), None);
    }

    #[test]
    fn test_columns_from_records_cover_first_record_keys() {
        let records = vec![Record::new("1", json!({"id": "1", "name": "Awa"}))];
        let columns = columns_from_records(&records);
        let headers: Vec<&str> = columns.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(headers, vec!["id", "name"]);
    }
}
