use serde::{Deserialize, Serialize};

/// One published capture of a dataset. The version with the highest
/// `ord` is the one surfaced on dataset pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub id: i64,
    pub dataset_id: i64,
    pub name: String,
    pub ord: i64,
    pub collected_at: Option<String>,
    pub download_url: Option<String>,
}
