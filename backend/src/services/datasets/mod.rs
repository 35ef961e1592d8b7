//! Dataset pages: the searchable list, the per-table detail view with
//! its CSV export, and the file-manifest listing.
//!
//! Routes (all GET):
//! - `/dataset` — visible datasets, optionally filtered by `search`.
//! - `/dataset/{slug}` — redirect to the dataset's default table.
//! - `/dataset/{slug}/files` — file manifest, or a redirect to the
//!   latest version dump when no manifest exists.
//! - `/dataset/{slug}/{tablename}` — paginated table view; with
//!   `format=csv` a guarded streaming export.

use actix_web::web::{get, scope};
use actix_web::Scope;

mod detail;
mod export;
mod files;
mod list;

const API_PATH: &str = "/dataset";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        // "files" must win over the `{tablename}` pattern.
        .route("/{slug}/files", get().to(files::process))
        .route("/{slug}/{tablename}", get().to(detail::process))
        .route("/{slug}", get().to(detail::redirect_to_default))
}
