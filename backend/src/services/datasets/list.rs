use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};

use crate::catalog::store::CatalogStore;
use crate::render;
use crate::services::server_error_page;

/// `GET /dataset` — visible datasets, optionally narrowed by a
/// space-separated `search` string.
pub async fn process(
    query: web::Query<BTreeMap<String, String>>,
    store: web::Data<CatalogStore>,
) -> HttpResponse {
    let search = query.get("search").cloned().unwrap_or_default();
    match store.list_datasets(&search) {
        Ok(datasets) => HttpResponse::Ok()
            .content_type(render::HTML)
            .body(render::dataset_list_page(&datasets, &search)),
        Err(e) => server_error_page(&e),
    }
}
