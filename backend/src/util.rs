use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

/// Masks a personally-identifying value for display and export.
///
/// Values of four characters or fewer are fully masked; longer values
/// keep their first three characters so rows stay distinguishable.
pub fn obfuscate(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let prefix: String = chars[..3].iter().collect();
    format!("{}{}", prefix, "*".repeat(chars.len() - 3))
}

/// TTL cache in front of JSON GETs to external endpoints, shared as
/// `web::Data` across workers.
pub struct JsonCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, Value)>>,
}

impl JsonCache {
    pub fn new(ttl: Duration) -> Self {
        JsonCache {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fetches `url` as JSON, serving from the cache while the entry is
    /// younger than the TTL.
    pub async fn get_json(&self, url: &str) -> Result<Value, String> {
        {
            let entries = self.entries.read().await;
            if let Some((fetched_at, value)) = entries.get(url) {
                if fetched_at.elapsed() < self.ttl {
                    return Ok(value.clone());
                }
            }
        }

        let client = awc::Client::default();
        let mut response = client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request to {} failed: {}", url, e))?;
        let value: Value = response
            .json()
            .await
            .map_err(|e| format!("invalid JSON from {}: {}", url, e))?;

        let mut entries = self.entries.write().await;
        entries.insert(url.to_string(), (Instant::now(), value.clone()));
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obfuscate_keeps_short_prefix() {
        assert_eq!(obfuscate("12345678901"), "123********");
        assert_eq!(obfuscate("maria"), "ma***");
    }

    #[test]
    fn obfuscate_masks_short_values_entirely() {
        assert_eq!(obfuscate("abcd"), "****");
        assert_eq!(obfuscate("a"), "*");
        assert_eq!(obfuscate(""), "");
    }

    #[actix_web::test]
    async fn cache_serves_entries_within_ttl_without_refetching() {
        let cache = JsonCache::new(Duration::from_secs(300));
        {
            let mut entries = cache.entries.write().await;
            entries.insert(
                "http://127.0.0.1:1/x.json".to_string(),
                (Instant::now(), serde_json::json!({"ok": true})),
            );
        }
        // The URL is unreachable; a hit proves no fetch happened.
        let value = cache.get_json("http://127.0.0.1:1/x.json").await.unwrap();
        assert_eq!(value["ok"], true);
    }
}
