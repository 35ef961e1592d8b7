use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub show: bool,
    /// Landing page for bulk downloads of this dataset.
    pub files_url: Option<String>,
}

/// One downloadable file listed in a dataset's file manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    pub id: i64,
    pub name: String,
    pub size: i64,
    pub sha512: Option<String>,
    pub url: String,
}
