use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub id: i64,
    pub dataset_id: i64,
    pub name: String,
    pub hidden: bool,
    /// Column descriptors ordered by their declared position.
    pub fields: Vec<Field>,
}

/// Descriptor for one column of a table's backing data.
///
/// `show_on_frontend` and `obfuscate` are interpreted uniformly by the
/// paginated view and the CSV export, so both surfaces always agree on
/// what is visible and what is masked. `is_search_field` marks the
/// internal full-text column, which is never exposed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub show_on_frontend: bool,
    pub obfuscate: bool,
    pub is_search_field: bool,
}

impl Field {
    /// Whether this field appears in client-facing projections.
    pub fn visible(&self) -> bool {
        self.show_on_frontend && !self.is_search_field
    }
}
