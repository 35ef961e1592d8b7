//! Guarded, streaming CSV export of a composed table query.
//!
//! The encoder runs on a blocking thread and pushes encoded chunks
//! through a bounded channel that backs the response body, so the full
//! result set never sits in memory. The export guard runs first: no
//! unfiltered dumps, no blocklisted user-agents, nothing above the
//! configured row ceiling.

use std::io;

use actix_web::{web, HttpRequest, HttpResponse};
use common::model::dataset::Dataset;
use common::model::table::{Field, Table};
use futures_util::stream;
use log::error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::catalog::query::ComposedQuery;
use crate::catalog::store::CatalogStore;
use crate::config::AppConfig;
use crate::render;
use crate::services::server_error_page;

/// `io::Write` adapter pushing encoded chunks into the response
/// channel. A closed channel means the client went away, reported as a
/// broken pipe so the cursor stops.
struct ChannelWriter {
    tx: mpsc::Sender<Result<web::Bytes, io::Error>>,
}

impl io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.tx
            .blocking_send(Ok(web::Bytes::copy_from_slice(buf)))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "client disconnected"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn agent_blocked(user_agent: &str, config: &AppConfig) -> bool {
    let ua = user_agent.to_lowercase();
    config
        .blocked_agents
        .iter()
        .any(|token| ua.contains(&token.to_lowercase()))
}

pub async fn respond(
    req: &HttpRequest,
    store: &CatalogStore,
    config: &AppConfig,
    dataset: &Dataset,
    table: &Table,
    composed: ComposedQuery,
) -> HttpResponse {
    let user_agent = req
        .headers()
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !(composed.has_filters || composed.has_search)
        || user_agent.is_empty()
        || agent_blocked(user_agent, config)
    {
        return HttpResponse::BadRequest()
            .content_type(render::HTML)
            .body(render::csv_without_filters(dataset.files_url.as_deref()));
    }

    let total = {
        let conn = match store.open() {
            Ok(conn) => conn,
            Err(e) => return server_error_page(&e),
        };
        match composed.count(&conn) {
            Ok(total) => total,
            Err(e) => return server_error_page(&e.to_string()),
        }
    };
    if total > config.csv_export_max_rows {
        return HttpResponse::BadRequest()
            .content_type(render::HTML)
            .body(render::error_4xx("Max rows exceeded."));
    }

    let filename = format!("{}-{}.csv", dataset.slug, Uuid::new_v4().simple());
    let (tx, rx) = mpsc::channel::<Result<web::Bytes, io::Error>>(64);
    let producer_store = store.clone();
    let fields = table.fields.clone();
    tokio::task::spawn_blocking(move || {
        stream_rows_blocking(producer_store, fields, composed, tx)
    });

    let body = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|chunk| (chunk, rx))
    });
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .streaming(body)
}

fn stream_rows_blocking(
    store: CatalogStore,
    fields: Vec<Field>,
    composed: ComposedQuery,
    tx: mpsc::Sender<Result<web::Bytes, io::Error>>,
) {
    if let Err(e) = encode_rows(&store, &fields, &composed, tx.clone()) {
        // A disconnected client is routine; anything else aborts the
        // response mid-stream (partial output, no rollback of bytes
        // already sent).
        if e.contains("client disconnected") {
            return;
        }
        error!("csv export aborted: {}", e);
        let _ = tx.blocking_send(Err(io::Error::new(io::ErrorKind::Other, e)));
    }
}

fn encode_rows(
    store: &CatalogStore,
    fields: &[Field],
    composed: &ComposedQuery,
    tx: mpsc::Sender<Result<web::Bytes, io::Error>>,
) -> Result<(), String> {
    let conn = store.open()?;
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(ChannelWriter { tx });

    // The header comes from the first projected row's key order, so a
    // query with no matches streams an empty file.
    let mut header_written = false;
    composed.for_each_row(&conn, fields, |row| {
        if !header_written {
            writer
                .write_record(row.iter().map(|(name, _)| name.as_bytes()))
                .map_err(|e| e.to_string())?;
            header_written = true;
        }
        writer
            .write_record(row.iter().map(|(_, value)| value.as_bytes()))
            .map_err(|e| e.to_string())?;
        writer.flush().map_err(|e| e.to_string())
    })?;
    writer.flush().map_err(|e| e.to_string())
}
