use serde_json::Value;

/// A single entity flowing through the view engine.
///
/// The payload is an opaque JSON object; the engine only ever reads it
/// through field paths. The id is stable for the lifetime of the record
/// and is handed back to consumers as a render key, nothing more.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: String,
    fields: Value,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Value) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &Value {
        &self.fields
    }

    /// Direct top-level field access. The sort path reads through this,
    /// never through the nested resolver.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}
