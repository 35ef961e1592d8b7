//! Process configuration.
//!
//! Every tunable consumed by the request layer (page sizes, export
//! ceilings, blocked agents, mail settings) is read once at startup and
//! carried in an immutable [`AppConfig`] injected as `web::Data`.
//! Handlers never read the environment directly.

use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: String,
    pub bind_host: String,
    pub bind_port: u16,
    /// Default page size for table views when `items` is not given.
    pub rows_per_page: i64,
    /// Hard ceiling on the number of rows a CSV export may return.
    pub csv_export_max_rows: i64,
    /// Case-insensitive substrings matched against the User-Agent of
    /// CSV export requests.
    pub blocked_agents: Vec<String>,
    /// Callers presenting this token in `X-Admin-Token` may see hidden
    /// tables. Unset means nobody is privileged.
    pub admin_token: Option<String>,
    pub default_from_email: String,
    pub contributors_url: String,
    pub donate_url: String,
    /// Directory where outgoing contact emails are spooled for the
    /// external relay.
    pub mail_spool_dir: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        let blocked_agents = env_or("BLOCKED_AGENTS", "wget,curl,python-requests")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        AppConfig {
            database_path: env_or("CATALOG_DB", "catalog.sqlite"),
            bind_host: env_or("BIND_HOST", "127.0.0.1"),
            bind_port: env_parse("BIND_PORT", 8080),
            rows_per_page: env_parse("ROWS_PER_PAGE", 20),
            csv_export_max_rows: env_parse("CSV_EXPORT_MAX_ROWS", 200_000),
            blocked_agents,
            admin_token: env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
            default_from_email: env_or("DEFAULT_FROM_EMAIL", "contact@catalog.local"),
            contributors_url: env_or(
                "CONTRIBUTORS_URL",
                "https://data.catalog.local/meta/contributors.json",
            ),
            donate_url: env_or("DONATE_URL", "https://apoia.se/catalog"),
            mail_spool_dir: env_or("MAIL_SPOOL_DIR", "mail-spool"),
        }
    }
}

#[cfg(test)]
impl Default for AppConfig {
    /// Fixed values for handler tests, independent of the environment.
    fn default() -> Self {
        AppConfig {
            database_path: String::new(),
            bind_host: "127.0.0.1".to_string(),
            bind_port: 0,
            rows_per_page: 20,
            csv_export_max_rows: 200_000,
            blocked_agents: vec![
                "wget".to_string(),
                "curl".to_string(),
                "python-requests".to_string(),
            ],
            admin_token: None,
            default_from_email: "contact@catalog.local".to_string(),
            contributors_url: "http://127.0.0.1:1/contributors.json".to_string(),
            donate_url: "https://apoia.se/catalog".to_string(),
            mail_spool_dir: String::new(),
        }
    }
}
