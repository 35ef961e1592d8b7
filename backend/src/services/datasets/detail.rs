//! The dataset table view: resolves slug + table name, translates the
//! remaining query parameters into a composed query and either renders
//! a page of rows or hands off to the CSV export.

use std::collections::BTreeMap;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::catalog::query::{
    clamp_page, compose_query, echo_querystring, normalize_querystring, parse_querystring,
};
use crate::catalog::store::{data_table_name, CatalogStore};
use crate::config::AppConfig;
use crate::services::{not_found_page, server_error_page};
use crate::{render, traffic};

use super::export;

/// Whether the caller may see hidden tables: requires a configured
/// admin token and a matching `X-Admin-Token` header.
fn privileged(req: &HttpRequest, config: &AppConfig) -> bool {
    match &config.admin_token {
        Some(token) => {
            req.headers()
                .get("X-Admin-Token")
                .and_then(|v| v.to_str().ok())
                == Some(token.as_str())
        }
        None => false,
    }
}

/// `GET /dataset/{slug}` — one canonical URL per table, so the bare
/// dataset URL always redirects instead of rendering.
pub async fn redirect_to_default(
    path: web::Path<String>,
    store: web::Data<CatalogStore>,
) -> HttpResponse {
    let slug = path.into_inner();
    let dataset = match store.dataset(&slug) {
        Ok(Some(dataset)) => dataset,
        Ok(None) => return not_found_page("Dataset does not exist"),
        Err(e) => return server_error_page(&e),
    };
    match store.default_table(dataset.id) {
        Ok(Some(table)) => HttpResponse::Found()
            .insert_header(("Location", format!("/dataset/{}/{}", slug, table.name)))
            .finish(),
        Ok(None) => not_found_page("Table does not exist"),
        Err(e) => server_error_page(&e),
    }
}

/// `GET /dataset/{slug}/{tablename}`.
pub async fn process(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    query: web::Query<BTreeMap<String, String>>,
    store: web::Data<CatalogStore>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    let (slug, tablename) = path.into_inner();

    let dataset = match store.dataset(&slug) {
        Ok(Some(dataset)) => dataset,
        Ok(None) => return not_found_page("Dataset does not exist"),
        Err(e) => return server_error_page(&e),
    };

    let allow_hidden = privileged(&req, &config);
    let table = match store.table(dataset.id, &tablename, allow_hidden) {
        Ok(Some(table)) => table,
        Ok(None) => {
            // Audit the miss only when the name exists as a hidden
            // table; a failed probe lookup is expected and ignored.
            if let Ok(Some(_)) = store.table(dataset.id, &tablename, true) {
                traffic::log_blocked_request(&req, 404);
            }
            return not_found_page("Table does not exist");
        }
        Err(e) => return server_error_page(&e),
    };

    let params = match normalize_querystring(query.into_inner(), &config) {
        Ok(params) => params,
        Err(message) => return not_found_page(&message),
    };

    let parsed = parse_querystring(&params.filters, &table);
    let data_table = data_table_name(&slug, &table.name);
    let composed = compose_query(&data_table, &table, &parsed);

    if params.export_csv {
        return export::respond(&req, &store, &config, &dataset, &table, composed).await;
    }

    let conn = match store.open() {
        Ok(conn) => conn,
        Err(e) => return server_error_page(&e),
    };
    let total = match composed.count(&conn) {
        Ok(total) => total,
        Err(e) => return server_error_page(&e.to_string()),
    };
    let window = clamp_page(params.page, total, params.items);
    let rows = match composed.rows(&conn, &table.fields, params.items, window.offset) {
        Ok(rows) => rows,
        Err(e) => return server_error_page(&e.to_string()),
    };
    drop(conn);

    let version = match store.latest_version(dataset.id) {
        Ok(version) => version,
        Err(e) => return server_error_page(&e),
    };
    let querystring = echo_querystring(&params.filters);

    let html = render::dataset_detail_page(&render::DetailContext {
        dataset: &dataset,
        table: &table,
        version: version.as_ref(),
        fields: &table.fields,
        rows: &rows,
        page: window.number,
        num_pages: window.num_pages,
        total_count: total,
        max_export_rows: config.csv_export_max_rows,
        querystring: &querystring,
    });
    HttpResponse::Ok().content_type(render::HTML).body(html)
}
